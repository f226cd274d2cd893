//! [`ChainCalls`] that only logs what would be sent.
//!
//! Signing stays with the wallet, so the CLI drives the pipeline through this
//! client to preview the exact calls, chunk by chunk.

use crate::chain::ChainCalls;
use crate::error::Result;
use crate::types::TransferEntry;
use crate::utils;
use async_trait::async_trait;
use ethers::types::U256;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug)]
pub struct DryRunCalls {
    multisender_contract: String,
    token_contract: String,
    log: Mutex<Vec<String>>,
}

impl DryRunCalls {
    pub fn new(multisender_contract: &str, token_contract: &str) -> Self {
        Self {
            multisender_contract: multisender_contract.to_string(),
            token_contract: token_contract.to_string(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// One line per call, in call order.
    pub fn recorded(&self) -> Vec<String> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn record(&self, line: String) {
        info!("[dry-run] {}", line);
        if let Ok(mut log) = self.log.lock() {
            log.push(line);
        }
    }

    fn describe_chunk(chunk: &[TransferEntry]) -> String {
        chunk
            .iter()
            .map(|e| format!("{}={}", e.account_id, utils::format_token(e.amount)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[async_trait]
impl ChainCalls for DryRunCalls {
    async fn multisend(&self, chunk: &[TransferEntry], gas: u64) -> Result<()> {
        self.record(format!(
            "{}.multisend_from_balance gas={} [{}]",
            self.multisender_contract,
            gas,
            Self::describe_chunk(chunk)
        ));
        Ok(())
    }

    async fn multisend_unsafe(&self, chunk: &[TransferEntry], gas: u64, attached: U256) -> Result<()> {
        self.record(format!(
            "{}.multisend_from_balance_unsafe gas={} attached={} [{}]",
            self.multisender_contract,
            gas,
            attached,
            Self::describe_chunk(chunk)
        ));
        Ok(())
    }

    async fn register_storage(&self, accounts: &[String], bond: U256, gas: u64) -> Result<()> {
        self.record(format!(
            "{}.multi_storage_deposit gas={} bond={} NEAR accounts=[{}]",
            self.multisender_contract,
            gas,
            utils::format_near(bond),
            accounts.join(", ")
        ));
        Ok(())
    }

    async fn deposit_to_app(&self, amount: U256, gas: u64, attached: U256) -> Result<()> {
        self.record(format!(
            "{}.ft_transfer_call receiver={} amount={} gas={} attached={}",
            self.token_contract,
            self.multisender_contract,
            utils::format_token(amount),
            gas,
            attached
        ));
        Ok(())
    }

    async fn withdraw_all(&self, account_id: &str, gas: u64, attached: U256) -> Result<()> {
        self.record(format!(
            "{}.withdraw_all account_id={} gas={} attached={}",
            self.multisender_contract, account_id, gas, attached
        ));
        Ok(())
    }

    async fn storage_deposit(&self, account_id: &str, gas: u64, attached: U256) -> Result<()> {
        self.record(format!(
            "{}.storage_deposit account_id={} gas={} attached={} NEAR",
            self.token_contract,
            account_id,
            gas,
            utils::format_near(attached)
        ));
        Ok(())
    }
}
