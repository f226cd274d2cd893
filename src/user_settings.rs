use crate::config::{find_network, Config};
use crate::types::SendMode;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "multisender_settings.json";

fn default_network() -> String {
    "testnet".to_string()
}

fn default_deposit_value() -> String {
    "100".to_string()
}

fn default_chunk_delay_ms() -> u64 {
    100
}

/// User settings that persist between sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    /// Selected network id (`mainnet` / `testnet`)
    #[serde(default = "default_network")]
    pub selected_network: String,
    /// Custom RPC overrides per network id
    #[serde(default)]
    pub custom_rpcs: HashMap<String, String>,
    /// Last account signed in with
    #[serde(default)]
    pub account_id: Option<String>,
    /// Amount pre-filled in the manual deposit field, in whole tokens
    #[serde(default = "default_deposit_value")]
    pub default_deposit_value: String,
    /// Pause between submitted chunks (milliseconds)
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
    #[serde(default)]
    pub preferred_send_mode: SendMode,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            selected_network: default_network(),
            custom_rpcs: HashMap::new(),
            account_id: None,
            default_deposit_value: default_deposit_value(),
            chunk_delay_ms: default_chunk_delay_ms(),
            preferred_send_mode: SendMode::default(),
        }
    }
}

impl UserSettings {
    /// Get the settings file path
    fn settings_path() -> PathBuf {
        crate::operation_log::app_data_dir().join(SETTINGS_FILE)
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => {
                        tracing::info!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse settings file: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read settings file: {}", e);
                }
            }
        }
        tracing::info!("Using default settings");
        Self::default()
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Get custom RPC for a network, or None if using default
    pub fn get_custom_rpc(&self, network_id: &str) -> Option<&String> {
        self.custom_rpcs.get(network_id).filter(|s| !s.is_empty())
    }

    /// Set custom RPC for a network (empty string removes the override)
    pub fn set_custom_rpc(&mut self, network_id: &str, rpc: String) {
        if rpc.trim().is_empty() {
            self.custom_rpcs.remove(network_id);
        } else {
            self.custom_rpcs
                .insert(network_id.to_string(), rpc.trim().to_string());
        }
    }

    /// Apply these settings on top of a config for `config.network_id`.
    ///
    /// The custom RPC saved for that network replaces its default node, and
    /// the saved account is used when nobody is signed in yet.
    pub fn apply_to(&self, config: &mut Config) -> Result<()> {
        if let Some(rpc) = self.get_custom_rpc(&config.network_id) {
            config.set_rpc_url(rpc)?;
        }
        if config.account_id.is_none() {
            if let Some(account) = &self.account_id {
                config.sign_in(account);
            }
        }
        config.chunk_delay_ms = self.chunk_delay_ms;
        Ok(())
    }

    /// Config for `network_id` (the selected network when `None`) with these
    /// settings applied.
    pub fn to_config(&self, network_id: Option<&str>) -> Result<Config> {
        let network_id = network_id.unwrap_or(&self.selected_network);
        let network = find_network(network_id)
            .ok_or_else(|| anyhow!("Unknown NEAR network '{}'", network_id))?;
        let mut config = Config::from_network(network);
        self.apply_to(&mut config)?;
        Ok(config)
    }
}
