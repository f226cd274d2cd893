//! Application state and the operations that mutate it.
//!
//! All state lives in [`AppState`]; every operation replaces the pieces it owns
//! at a well-defined point and the presentation layer derives control
//! enablement from [`App::aggregate`] afterwards. `run_in_progress` stands in for
//! disabling the form: it is set for the duration of any multi-step run and
//! cleared on success and failure alike.

use crate::aggregate::AggregateState;
use crate::chain::{ChainCalls, ChainView};
use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::notifications::{push_notification, NotificationEntry};
use crate::operation_log;
use crate::recipients::{parse_recipients, RecipientList};
use crate::storage_check::{check_storage_registration, StorageCheckOutcome};
use crate::submission::{SubmissionConfig, SubmissionEngine, SubmissionProgress, SubmissionReport};
use crate::types::SendMode;
use crate::utils;
use crate::validator::{verify_accounts, VerificationOutcome};
use ethers::types::U256;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Raw recipients text as last entered.
    pub input_text: String,
    pub recipients: RecipientList,
    /// App balance of the signed-in account, in base units.
    pub balance: U256,
    pub verified: bool,
    pub run_in_progress: bool,
    /// Chunks accepted in the current submission run.
    pub chunks_processed: usize,
    pub notifications: VecDeque<NotificationEntry>,
}

pub struct App {
    config: Config,
    view: Arc<dyn ChainView>,
    calls: Arc<dyn ChainCalls>,
    store: Arc<dyn CheckpointStore>,
    progress_sender: Option<mpsc::UnboundedSender<SubmissionProgress>>,
    log_path: PathBuf,
    pub state: AppState,
}

impl App {
    pub fn new(
        config: Config,
        view: Arc<dyn ChainView>,
        calls: Arc<dyn ChainCalls>,
        store: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            config,
            view,
            calls,
            store,
            progress_sender: None,
            log_path: operation_log::log_path(),
            state: AppState::default(),
        }
    }

    /// Write the operation log somewhere other than the app data directory.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Forward per-chunk progress of every submission run to `sender`.
    pub fn set_progress_sender(&mut self, sender: mpsc::UnboundedSender<SubmissionProgress>) {
        self.progress_sender = Some(sender);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn aggregate(&self) -> AggregateState {
        AggregateState::derive(
            &self.state.recipients,
            self.state.balance,
            self.state.verified,
            self.config.is_signed_in(),
        )
    }

    fn account_id(&self) -> Result<String> {
        self.config.account_id.clone().ok_or(Error::NotSignedIn)
    }

    /// Refuse an operation whose control is disabled, the way the form would.
    fn require(&self, enabled: bool, operation: &'static str, reason: &'static str) -> Result<()> {
        if enabled {
            Ok(())
        } else {
            Err(Error::NotAvailable { operation, reason })
        }
    }

    fn require_recipients(&self) -> Result<()> {
        if self.state.recipients.is_empty() {
            return Err(Error::NothingToSend);
        }
        Ok(())
    }

    fn notify(&mut self, entry: NotificationEntry) {
        push_notification(&mut self.state.notifications, entry);
    }

    fn begin_run(&mut self) -> Result<()> {
        if self.state.run_in_progress {
            return Err(Error::RunInProgress);
        }
        self.state.run_in_progress = true;
        Ok(())
    }

    /// Re-enable controls and surface a failure, whatever the outcome.
    fn end_run<T>(&mut self, operation: &str, result: Result<T>) -> Result<T> {
        self.state.run_in_progress = false;
        if let Err(e) = &result {
            self.notify(NotificationEntry::failure(e));
            self.log_operation(operation, &format!("Failed: {e}"));
        }
        result
    }

    fn log_operation(&self, operation: &str, details: &str) {
        let network_id = &self.config.network_id;
        if let Err(e) = operation_log::append_log(&self.log_path, operation, network_id, details) {
            warn!("Failed to write operation log: {}", e);
        }
    }

    /// Replace the working list with whatever `text` parses to.
    pub fn set_input(&mut self, text: &str) {
        self.state.input_text = text.to_string();
        self.state.recipients = parse_recipients(text);
        self.state.verified = false;
    }

    /// Load recipients left by an interrupted run. Returns how many were restored.
    pub fn restore_checkpoint(&mut self) -> Result<usize> {
        let pending = RecipientList::from_entries(self.store.load()?);
        if pending.is_empty() {
            return Ok(0);
        }
        info!("Restored {} pending recipient(s) from checkpoint", pending.len());
        self.state.input_text = pending.to_text();
        self.state.recipients = pending;
        self.state.verified = false;
        Ok(self.state.recipients.len())
    }

    /// Re-query the app balance of the signed-in account.
    pub async fn refresh_balance(&mut self) -> Result<U256> {
        let account_id = self.account_id()?;
        let balance = self.view.get_deposit(&account_id).await?;
        self.state.balance = balance;
        Ok(balance)
    }

    async fn reconcile_balance(&mut self) {
        if let Err(e) = self.refresh_balance().await {
            warn!("Failed to refresh app balance: {}", e);
        }
    }

    /// Drop recipients that are not live accounts.
    pub async fn verify_accounts(&mut self) -> Result<VerificationOutcome> {
        self.begin_run()?;
        let result = verify_accounts(
            self.view.as_ref(),
            &self.state.recipients,
            self.config.check_group_size,
        )
        .await;
        let outcome = self.end_run("Verify accounts", result)?;

        self.state.recipients = outcome.recipients.clone();
        self.state.input_text = outcome.recipients.to_text();
        self.state.verified = true;
        self.notify(NotificationEntry::text(outcome.summary()));
        Ok(outcome)
    }

    /// Register every recipient that lacks token storage, in one call.
    pub async fn check_storage(&mut self) -> Result<StorageCheckOutcome> {
        self.account_id()?;
        self.require_recipients()?;
        self.require(
            self.aggregate().storage_check_enabled,
            "Storage check",
            "accounts must be verified first",
        )?;
        self.begin_run()?;
        let result = match self.store.save(&self.state.recipients.to_transfer_entries()) {
            Ok(()) => {
                check_storage_registration(
                    self.view.as_ref(),
                    self.calls.as_ref(),
                    &self.state.recipients,
                    self.config.check_group_size,
                    self.config.storage_bond,
                    self.config.gas,
                )
                .await
            }
            Err(e) => Err(e),
        };
        let outcome = self.end_run("Storage check", result)?;

        if outcome.registered_now() > 0 {
            self.notify(NotificationEntry::text(format!(
                "Registered {} account(s)",
                outcome.registered_now()
            )));
            self.log_operation(
                "Storage registration",
                &format!(
                    "Accounts: {}\nBond: {} NEAR",
                    outcome.unregistered.join(", "),
                    utils::format_near(outcome.bond)
                ),
            );
        }
        self.state.verified = true;
        self.notify(NotificationEntry::text("All accounts are registered"));
        self.reconcile_balance().await;
        Ok(outcome)
    }

    /// Send the working list in chunks through `mode`.
    pub async fn send(&mut self, mode: SendMode) -> Result<SubmissionReport> {
        self.account_id()?;
        self.require_recipients()?;
        let aggregate = self.aggregate();
        let enabled = match mode {
            SendMode::Safe => aggregate.send_enabled,
            SendMode::Unsafe => aggregate.send_unsafe_enabled,
        };
        self.require(enabled, "Send", "app balance does not cover the list total")?;
        self.begin_run()?;
        self.state.chunks_processed = 0;

        let settings = SubmissionConfig::for_mode(&self.config, mode);
        let result = {
            let mut engine = SubmissionEngine::new(self.calls.as_ref(), self.store.as_ref());
            if let Some(sender) = &self.progress_sender {
                engine = engine.with_progress(sender.clone());
            }
            engine.submit(&self.state.recipients, &settings).await
        };

        if let Err(Error::ChunkFailed { index, .. }) = &result {
            self.state.chunks_processed = index - 1;
        }
        let report = self.end_run(mode.method_name(), result)?;

        self.log_operation(
            mode.method_name(),
            &format!(
                "Recipients: {}\nChunks: {} of up to {}\n{}\nTotal sent: {} {}",
                report.recipients,
                report.chunks,
                settings.chunk_size,
                self.state.recipients.to_text(),
                utils::format_token(report.total),
                self.config.token_ticker
            ),
        );

        self.state.chunks_processed = 0;
        self.state.recipients = RecipientList::new();
        self.state.input_text.clear();
        self.state.verified = false;
        self.notify(NotificationEntry::complete(report.summary()));
        self.reconcile_balance().await;
        Ok(report)
    }

    /// Top up the app balance by exactly what the list is missing.
    pub async fn deposit_missing(&mut self) -> Result<U256> {
        let amount = self.aggregate().shortfall(self.state.balance);
        if amount.is_zero() {
            return Ok(amount);
        }
        self.deposit(amount).await?;
        Ok(amount)
    }

    /// Move `amount` tokens from the wallet into the app balance.
    pub async fn deposit(&mut self, amount: U256) -> Result<()> {
        self.account_id()?;
        self.require_recipients()?;
        if amount.is_zero() {
            return Err(Error::InvalidAmount("deposit must be greater than zero".to_string()));
        }
        self.begin_run()?;
        let result = match self.store.save(&self.state.recipients.to_transfer_entries()) {
            Ok(()) => {
                self.calls
                    .deposit_to_app(amount, self.config.gas, U256::from(utils::ONE_YOCTO))
                    .await
            }
            Err(e) => Err(e),
        };
        self.end_run("Deposit", result)?;

        self.log_operation(
            "Deposit",
            &format!("Amount: {} {}", utils::format_token(amount), self.config.token_ticker),
        );
        self.reconcile_balance().await;
        Ok(())
    }

    /// Withdraw the entire app balance back to the signed-in account.
    pub async fn withdraw_all(&mut self) -> Result<()> {
        let account_id = self.account_id()?;
        self.require(
            self.aggregate().withdraw_enabled,
            "Withdraw all",
            "app balance is empty",
        )?;
        self.begin_run()?;
        let result = self
            .calls
            .withdraw_all(&account_id, self.config.gas, U256::from(utils::ONE_YOCTO))
            .await;
        self.end_run("Withdraw all", result)?;

        self.log_operation(
            "Withdraw all",
            &format!(
                "Withdrawn: {} {}",
                utils::format_token(self.state.balance),
                self.config.token_ticker
            ),
        );
        self.reconcile_balance().await;
        Ok(())
    }

    /// Register the signed-in account itself on the token contract.
    pub async fn request_storage(&mut self) -> Result<()> {
        let account_id = self.account_id()?;
        self.begin_run()?;
        let result = self
            .calls
            .storage_deposit(&account_id, self.config.gas, self.config.storage_bond)
            .await;
        self.end_run("Request storage", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::MemoryCheckpointStore;
    use crate::notifications::NotificationKind;
    use crate::testing::{tokens, Call, MockChain};
    use crate::types::TransferEntry;
    use std::sync::atomic::Ordering;

    fn signed_in_config() -> Config {
        let mut config = Config::default();
        config.sign_in("me.testnet");
        config.chunk_delay_ms = 0;
        config
    }

    fn app_with(chain: &Arc<MockChain>, store: &Arc<MemoryCheckpointStore>) -> App {
        App::new(
            signed_in_config(),
            chain.clone(),
            chain.clone(),
            store.clone(),
        )
        .with_log_path(test_log_path())
    }

    fn test_log_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("multisender-app-{}", std::process::id()))
            .join("operation_log.txt")
    }

    fn last_message(app: &App) -> String {
        app.state
            .notifications
            .back()
            .map(|n| n.message.clone())
            .unwrap_or_default()
    }

    // ==================== set_input / aggregate tests ====================

    #[test]
    fn test_set_input_replaces_list_and_clears_verified() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);

        app.set_input("a 1\nb 2");
        app.state.verified = true;
        app.set_input("b 2");

        assert_eq!(app.state.recipients.len(), 1);
        assert!(!app.state.verified);
        assert_eq!(app.aggregate().total, tokens(2));
    }

    #[test]
    fn test_aggregate_follows_balance_changes() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.set_input("a 5");

        assert!(app.aggregate().deposit_enabled);
        app.state.balance = tokens(5);
        assert!(app.aggregate().send_enabled);
        assert!(!app.aggregate().deposit_enabled);
    }

    // ==================== restore_checkpoint tests ====================

    #[test]
    fn test_restore_checkpoint_fills_list_and_text() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        store
            .save(&[TransferEntry::new("alice.near", tokens(2))])
            .unwrap();
        let mut app = app_with(&chain, &store);

        assert_eq!(app.restore_checkpoint().unwrap(), 1);
        assert_eq!(app.state.input_text, "alice.near 2");
        assert_eq!(app.state.recipients.get("alice.near"), Some(tokens(2)));
    }

    #[test]
    fn test_restore_empty_checkpoint_is_noop() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        store.clear().unwrap();
        let mut app = app_with(&chain, &store);
        app.set_input("x 1");

        assert_eq!(app.restore_checkpoint().unwrap(), 0);
        assert!(app.state.recipients.contains("x"));
    }

    // ==================== verify_accounts tests ====================

    #[tokio::test]
    async fn test_verify_accounts_replaces_list() {
        let chain = Arc::new(MockChain::new());
        chain.add_accounts(&["a.near"]);
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.set_input("a.near 1\nghost.near 2");

        let outcome = app.verify_accounts().await.unwrap();

        assert_eq!(outcome.removed, 1);
        assert_eq!(app.state.input_text, "a.near 1");
        assert!(app.state.verified);
        assert!(!app.state.run_in_progress);
        assert!(app.aggregate().storage_check_enabled);
        assert_eq!(last_message(&app), "Removed 1 invalid account(s)");
    }

    #[tokio::test]
    async fn test_verify_accounts_transport_failure_keeps_list() {
        let chain = Arc::new(MockChain::new());
        chain.unreachable.store(true, Ordering::SeqCst);
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.set_input("a.near 1\nb.near 2");

        assert!(app.verify_accounts().await.is_err());
        assert_eq!(app.state.recipients.len(), 2);
        assert!(!app.state.run_in_progress);
        assert_eq!(
            app.state.notifications.back().map(|n| n.kind),
            Some(NotificationKind::Failure)
        );
    }

    #[tokio::test]
    async fn test_run_in_progress_rejects_second_run() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.state.run_in_progress = true;

        assert!(matches!(app.verify_accounts().await, Err(Error::RunInProgress)));
        assert!(app.state.run_in_progress);
    }

    // ==================== check_storage tests ====================

    #[tokio::test]
    async fn test_check_storage_registers_and_marks_verified() {
        let chain = Arc::new(MockChain::new());
        chain.add_accounts(&["a", "b"]);
        chain.add_registered(&["a"]);
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.set_input("a 1\nb 1");
        app.verify_accounts().await.unwrap();

        let outcome = app.check_storage().await.unwrap();

        assert_eq!(outcome.unregistered, vec!["b".to_string()]);
        assert!(app.state.verified);
        assert_eq!(store.load().unwrap().len(), 2);
        let messages: Vec<_> = app.state.notifications.iter().map(|n| n.message.clone()).collect();
        assert!(messages.contains(&"Registered 1 account(s)".to_string()));
        assert_eq!(last_message(&app), "All accounts are registered");
    }

    #[tokio::test]
    async fn test_check_storage_requires_sign_in() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = App::new(Config::default(), chain.clone(), chain.clone(), store.clone())
            .with_log_path(test_log_path());
        app.set_input("a 1");

        assert!(matches!(app.check_storage().await, Err(Error::NotSignedIn)));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_check_storage_refused_until_verified() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.set_input("b 5");
        assert!(!app.aggregate().storage_check_enabled);

        let err = app.check_storage().await.unwrap_err();

        assert!(matches!(err, Error::NotAvailable { operation: "Storage check", .. }));
        assert!(chain.calls().is_empty());
        assert!(store.raw().is_none());
        assert!(!app.state.run_in_progress);
    }

    // ==================== send tests ====================

    #[tokio::test]
    async fn test_send_success_clears_list_and_reconciles_balance() {
        let chain = Arc::new(MockChain::new());
        chain.set_deposit(tokens(20));
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        let text = (0..10).map(|i| format!("user{i}.near 1")).collect::<Vec<_>>().join("\n");
        app.set_input(&text);
        app.refresh_balance().await.unwrap();
        assert!(app.aggregate().send_enabled);

        let report = app.send(SendMode::Safe).await.unwrap();

        assert_eq!(report.chunks, 2);
        assert_eq!(chain.multisend_chunks().len(), 2);
        assert!(app.state.recipients.is_empty());
        assert_eq!(app.state.balance, tokens(10));
        assert_eq!(app.state.chunks_processed, 0);
        assert!(!app.state.run_in_progress);
        assert!(!app.aggregate().send_enabled);
        assert!(store.load().unwrap().is_empty());
        assert_eq!(
            app.state.notifications.back().map(|n| n.kind),
            Some(NotificationKind::Complete)
        );
    }

    #[tokio::test]
    async fn test_send_failure_leaves_remainder_for_resume() {
        let chain = Arc::new(MockChain::new());
        chain.set_deposit(tokens(100));
        chain.fail_at_chunk(1);
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        let text = (0..30).map(|i| format!("user{i}.near 1")).collect::<Vec<_>>().join("\n");
        app.set_input(&text);
        app.refresh_balance().await.unwrap();

        let err = app.send(SendMode::Unsafe).await.unwrap_err();

        assert!(matches!(err, Error::ChunkFailed { index: 2, total: 2, .. }));
        assert_eq!(app.state.chunks_processed, 1);
        assert!(!app.state.run_in_progress);
        assert_eq!(app.state.recipients.len(), 30);
        assert_eq!(store.load().unwrap().len(), 5);

        // A reload restores only the unsent remainder
        let mut reloaded = app_with(&chain, &store);
        assert_eq!(reloaded.restore_checkpoint().unwrap(), 5);
        reloaded.refresh_balance().await.unwrap();
        *chain.fail_chunk.lock().unwrap() = None;
        reloaded.send(SendMode::Unsafe).await.unwrap();

        let sent: usize = chain.multisend_chunks().iter().map(|c| c.len()).sum();
        assert_eq!(sent, 30);
    }

    #[tokio::test]
    async fn test_send_forwards_progress() {
        let chain = Arc::new(MockChain::new());
        chain.set_deposit(tokens(1));
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        let (tx, mut rx) = mpsc::unbounded_channel();
        app.set_progress_sender(tx);
        app.set_input("a 1");
        app.refresh_balance().await.unwrap();

        app.send(SendMode::Safe).await.unwrap();

        assert_eq!(rx.try_recv().unwrap(), SubmissionProgress::Started { total_chunks: 1 });
    }

    #[tokio::test]
    async fn test_send_refused_when_balance_short() {
        let chain = Arc::new(MockChain::new());
        chain.set_deposit(tokens(4));
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.set_input("a 5");
        app.refresh_balance().await.unwrap();
        assert!(!app.aggregate().send_enabled);

        for mode in [SendMode::Safe, SendMode::Unsafe] {
            let err = app.send(mode).await.unwrap_err();
            assert!(matches!(err, Error::NotAvailable { operation: "Send", .. }));
        }
        assert!(chain.calls().is_empty());
        assert!(store.raw().is_none());
        assert!(!app.state.run_in_progress);
        assert_eq!(app.state.recipients.len(), 1);
    }

    #[tokio::test]
    async fn test_send_empty_list_is_refused() {
        let chain = Arc::new(MockChain::new());
        chain.set_deposit(tokens(4));
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.refresh_balance().await.unwrap();

        assert!(matches!(app.send(SendMode::Safe).await, Err(Error::NothingToSend)));
        assert!(chain.calls().is_empty());
    }

    // ==================== deposit / withdraw tests ====================

    #[tokio::test]
    async fn test_deposit_missing_covers_shortfall() {
        let chain = Arc::new(MockChain::new());
        chain.set_deposit(tokens(3));
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.set_input("a 5\nb 3");
        app.refresh_balance().await.unwrap();

        let amount = app.deposit_missing().await.unwrap();

        assert_eq!(amount, tokens(5));
        assert_eq!(chain.calls(), vec![Call::DepositToApp { amount: tokens(5) }]);
        assert_eq!(app.state.balance, tokens(8));
        assert!(app.aggregate().send_enabled);
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_deposit_zero_is_rejected() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.set_input("a 1");
        assert!(matches!(app.deposit(U256::zero()).await, Err(Error::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn test_deposit_refused_without_recipients() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);

        assert!(matches!(app.deposit(tokens(100)).await, Err(Error::NothingToSend)));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_withdraw_all_refused_with_empty_balance() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.refresh_balance().await.unwrap();

        let err = app.withdraw_all().await.unwrap_err();

        assert!(matches!(err, Error::NotAvailable { operation: "Withdraw all", .. }));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_withdraw_all_empties_balance() {
        let chain = Arc::new(MockChain::new());
        chain.set_deposit(tokens(4));
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);
        app.refresh_balance().await.unwrap();
        assert!(app.aggregate().withdraw_enabled);

        app.withdraw_all().await.unwrap();

        assert_eq!(app.state.balance, U256::zero());
        assert!(!app.aggregate().withdraw_enabled);
        assert_eq!(
            chain.calls(),
            vec![Call::WithdrawAll { account_id: "me.testnet".to_string() }]
        );
    }

    #[tokio::test]
    async fn test_request_storage_attaches_bond() {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut app = app_with(&chain, &store);

        app.request_storage().await.unwrap();

        assert_eq!(
            chain.calls(),
            vec![Call::StorageDeposit {
                account_id: "me.testnet".to_string(),
                attached: app.config().storage_bond,
            }]
        );
    }
}
