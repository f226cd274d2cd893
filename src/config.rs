use crate::chain::DEFAULT_GAS;
use crate::rpc::NearRpcClient;
use crate::storage_check::STORAGE_BOND_PER_ACCOUNT;
use crate::types::SendMode;
use anyhow::{anyhow, Result};
use ethers::types::U256;
use std::env;
use std::sync::{Arc, OnceLock};
use url::Url;

/// A NEAR network with its RPC node, explorer and default contracts.
#[derive(Clone, Debug)]
pub struct NearNetwork {
    pub label: &'static str,
    pub network_id: &'static str,
    pub default_rpc: &'static str,
    pub explorer: &'static str,
    pub multisender_contract: &'static str,
    pub token_contract: &'static str,
}

impl NearNetwork {
    pub const fn new(
        label: &'static str,
        network_id: &'static str,
        default_rpc: &'static str,
        explorer: &'static str,
        multisender_contract: &'static str,
        token_contract: &'static str,
    ) -> Self {
        Self {
            label,
            network_id,
            default_rpc,
            explorer,
            multisender_contract,
            token_contract,
        }
    }
}

pub const NETWORKS: &[NearNetwork] = &[
    NearNetwork::new(
        "Mainnet",
        "mainnet",
        "https://rpc.mainnet.near.org",
        "https://explorer.mainnet.near.org",
        "multisender.lnc.near",
        "lnc.factory.tokenhub.near",
    ),
    NearNetwork::new(
        "Testnet",
        "testnet",
        "https://rpc.testnet.near.org",
        "https://explorer.testnet.near.org",
        "multisender.lnc.testnet",
        "lnc.factory.tokenhub.testnet",
    ),
];

/// Find a network by its id (`mainnet`, `testnet`)
pub fn find_network(network_id: &str) -> Option<&'static NearNetwork> {
    NETWORKS.iter().find(|n| n.network_id == network_id)
}

/// Explorer page for an account on `network_id`
pub fn account_explorer_url(network_id: &str, account_id: &str) -> String {
    format!("https://explorer.{}.near.org/accounts/{}", network_id, account_id)
}

#[derive(Clone, Debug)]
pub struct Config {
    pub network_id: String,
    pub rpc_url: String,
    pub multisender_contract: String,
    pub token_contract: String,
    pub token_ticker: String,
    /// Signed-in account; `None` while signed out.
    pub account_id: Option<String>,
    pub gas: u64,
    pub safe_chunk_size: usize,
    pub unsafe_chunk_size: usize,
    /// Group size for account and storage checks.
    pub check_group_size: usize,
    pub chunk_delay_ms: u64,
    /// Storage bond per recipient, in yoctoNEAR.
    pub storage_bond: U256,
    client: Arc<OnceLock<Arc<NearRpcClient>>>,
}

impl Config {
    pub fn from_network(network: &NearNetwork) -> Self {
        Self {
            network_id: network.network_id.to_string(),
            rpc_url: network.default_rpc.to_string(),
            multisender_contract: network.multisender_contract.to_string(),
            token_contract: network.token_contract.to_string(),
            token_ticker: "LNC".to_string(),
            account_id: None,
            gas: DEFAULT_GAS,
            safe_chunk_size: 7,
            unsafe_chunk_size: 25,
            check_group_size: 500,
            chunk_delay_ms: 100,
            storage_bond: U256::from(STORAGE_BOND_PER_ACCOUNT),
            client: Arc::new(OnceLock::new()),
        }
    }

    /// Apply `NEAR_RPC_URL`, `MULTISENDER_CONTRACT`, `TOKEN_CONTRACT`,
    /// `NEAR_ACCOUNT_ID` and `CHUNK_DELAY_MS` when set.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(rpc) = env::var("NEAR_RPC_URL") {
            self.set_rpc_url(&rpc)?;
        }
        if let Ok(contract) = env::var("MULTISENDER_CONTRACT") {
            self.multisender_contract = contract;
        }
        if let Ok(token) = env::var("TOKEN_CONTRACT") {
            self.token_contract = token;
        }
        if let Ok(account) = env::var("NEAR_ACCOUNT_ID") {
            self.sign_in(&account);
        }
        if let Some(delay) = env::var("CHUNK_DELAY_MS").ok().and_then(|v| v.parse().ok()) {
            self.chunk_delay_ms = delay;
        }
        Ok(())
    }

    /// Replace the RPC endpoint; the cached client is dropped with it.
    pub fn set_rpc_url(&mut self, rpc_url: &str) -> Result<()> {
        let url = Url::parse(rpc_url.trim())
            .map_err(|e| anyhow!("Invalid RPC URL '{}': {}", rpc_url, e))?;
        self.rpc_url = url.to_string();
        self.client = Arc::new(OnceLock::new());
        Ok(())
    }

    pub fn sign_in(&mut self, account_id: &str) {
        let trimmed = account_id.trim();
        self.account_id = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        };
    }

    pub fn is_signed_in(&self) -> bool {
        self.account_id.is_some()
    }

    pub fn chunk_size(&self, mode: SendMode) -> usize {
        match mode {
            SendMode::Safe => self.safe_chunk_size,
            SendMode::Unsafe => self.unsafe_chunk_size,
        }
    }

    pub fn network_label(&self) -> &str {
        find_network(&self.network_id)
            .map(|n| n.label)
            .unwrap_or("Custom")
    }

    /// RPC client for this config, built on first use and shared afterwards.
    pub fn get_client(&self) -> Result<Arc<NearRpcClient>> {
        if let Some(client) = self.client.get() {
            return Ok(Arc::clone(client));
        }
        let client = Arc::new(NearRpcClient::new(
            &self.rpc_url,
            &self.token_contract,
            &self.multisender_contract,
        )?);
        let _ = self.client.set(Arc::clone(&client));
        Ok(self.client.get().map(Arc::clone).unwrap_or(client))
    }
}

impl Default for Config {
    fn default() -> Self {
        if let Some(testnet) = find_network("testnet") {
            Self::from_network(testnet)
        } else {
            Self::from_network(&NETWORKS[0])
        }
    }
}
