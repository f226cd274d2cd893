//! In-memory chain double shared by the unit tests.

use crate::chain::{ChainCalls, ChainView};
use crate::checkpoint::{CheckpointStore, MemoryCheckpointStore};
use crate::error::{Error, Result};
use crate::types::TransferEntry;
use async_trait::async_trait;
use ethers::types::U256;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Multisend { entries: Vec<TransferEntry>, unsafe_mode: bool },
    RegisterStorage { accounts: Vec<String>, bond: U256 },
    DepositToApp { amount: U256 },
    WithdrawAll { account_id: String },
    StorageDeposit { account_id: String, attached: U256 },
}

#[derive(Default)]
pub struct MockChain {
    pub existing: Mutex<HashSet<String>>,
    pub registered: Mutex<HashSet<String>>,
    pub deposit: Mutex<U256>,
    pub unreachable: AtomicBool,
    /// Zero-based chunk index whose submission fails.
    pub fail_chunk: Mutex<Option<usize>>,
    pub lookups: AtomicUsize,
    in_flight: AtomicUsize,
    /// Lookups in flight, counting itself, as seen by each lookup when it starts.
    pub concurrency: Mutex<Vec<usize>>,
    pub calls: Mutex<Vec<Call>>,
    /// Checkpoint contents observed at each multisend call.
    pub observed_checkpoints: Mutex<Vec<Vec<TransferEntry>>>,
    pub checkpoint: Option<Arc<MemoryCheckpointStore>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checkpoint(store: Arc<MemoryCheckpointStore>) -> Self {
        Self {
            checkpoint: Some(store),
            ..Self::default()
        }
    }

    pub fn add_accounts(&self, ids: &[&str]) {
        let mut existing = self.existing.lock().unwrap();
        existing.extend(ids.iter().map(|s| s.to_string()));
    }

    pub fn add_registered(&self, ids: &[&str]) {
        let mut registered = self.registered.lock().unwrap();
        registered.extend(ids.iter().map(|s| s.to_string()));
    }

    pub fn set_deposit(&self, amount: U256) {
        *self.deposit.lock().unwrap() = amount;
    }

    pub fn fail_at_chunk(&self, index: usize) {
        *self.fail_chunk.lock().unwrap() = Some(index);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn multisend_chunks(&self) -> Vec<Vec<TransferEntry>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Multisend { entries, .. } => Some(entries),
                _ => None,
            })
            .collect()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    /// Highest number of lookups that were in flight at once.
    pub fn peak_concurrency(&self) -> usize {
        self.concurrency.lock().unwrap().iter().copied().max().unwrap_or(0)
    }

    async fn tracked_lookup(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.concurrency.lock().unwrap().push(now);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn record_multisend(&self, chunk: &[TransferEntry], unsafe_mode: bool) -> Result<()> {
        self.check_reachable()?;
        if let Some(store) = &self.checkpoint {
            self.observed_checkpoints
                .lock()
                .unwrap()
                .push(store.load()?);
        }
        let index = self.multisend_chunks().len();
        if *self.fail_chunk.lock().unwrap() == Some(index) {
            return Err(Error::CallFailed {
                method: "multisend_from_balance".to_string(),
                reason: "Exceeded the prepaid gas".to_string(),
            });
        }
        let sent = chunk
            .iter()
            .fold(U256::zero(), |acc, e| acc + e.amount);
        let mut deposit = self.deposit.lock().unwrap();
        *deposit = deposit.saturating_sub(sent);
        self.calls.lock().unwrap().push(Call::Multisend {
            entries: chunk.to_vec(),
            unsafe_mode,
        });
        Ok(())
    }
}

#[async_trait]
impl ChainView for MockChain {
    async fn account_exists(&self, account_id: &str) -> Result<bool> {
        self.check_reachable()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.tracked_lookup().await;
        Ok(self.existing.lock().unwrap().contains(account_id))
    }

    async fn is_storage_registered(&self, account_id: &str) -> Result<bool> {
        self.check_reachable()?;
        self.tracked_lookup().await;
        Ok(self.registered.lock().unwrap().contains(account_id))
    }

    async fn get_deposit(&self, _account_id: &str) -> Result<U256> {
        self.check_reachable()?;
        Ok(*self.deposit.lock().unwrap())
    }
}

#[async_trait]
impl ChainCalls for MockChain {
    async fn multisend(&self, chunk: &[TransferEntry], _gas: u64) -> Result<()> {
        self.record_multisend(chunk, false)
    }

    async fn multisend_unsafe(&self, chunk: &[TransferEntry], _gas: u64, _attached: U256) -> Result<()> {
        self.record_multisend(chunk, true)
    }

    async fn register_storage(&self, accounts: &[String], bond: U256, _gas: u64) -> Result<()> {
        self.check_reachable()?;
        self.registered
            .lock()
            .unwrap()
            .extend(accounts.iter().cloned());
        self.calls.lock().unwrap().push(Call::RegisterStorage {
            accounts: accounts.to_vec(),
            bond,
        });
        Ok(())
    }

    async fn deposit_to_app(&self, amount: U256, _gas: u64, _attached: U256) -> Result<()> {
        self.check_reachable()?;
        let mut deposit = self.deposit.lock().unwrap();
        *deposit += amount;
        self.calls.lock().unwrap().push(Call::DepositToApp { amount });
        Ok(())
    }

    async fn withdraw_all(&self, account_id: &str, _gas: u64, _attached: U256) -> Result<()> {
        self.check_reachable()?;
        *self.deposit.lock().unwrap() = U256::zero();
        self.calls.lock().unwrap().push(Call::WithdrawAll {
            account_id: account_id.to_string(),
        });
        Ok(())
    }

    async fn storage_deposit(&self, account_id: &str, _gas: u64, attached: U256) -> Result<()> {
        self.check_reachable()?;
        self.registered.lock().unwrap().insert(account_id.to_string());
        self.calls.lock().unwrap().push(Call::StorageDeposit {
            account_id: account_id.to_string(),
            attached,
        });
        Ok(())
    }
}

pub fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}
