//! Capabilities consumed from the external chain client.
//!
//! Reads ([`ChainView`]) and signed contract calls ([`ChainCalls`]) are split so the
//! read side can be served straight from an RPC node while calls go through
//! whatever holds the signing keys.

use crate::error::Result;
use crate::types::TransferEntry;
use async_trait::async_trait;
use ethers::types::U256;

/// Gas attached to every contract call (300 TGas).
pub const DEFAULT_GAS: u64 = 300_000_000_000_000;

#[async_trait]
pub trait ChainView: Send + Sync {
    /// Whether `account_id` resolves to a live account.
    ///
    /// A failed lookup for this one id is `Ok(false)`; `Err` is reserved for
    /// transport failures that make every lookup meaningless.
    async fn account_exists(&self, account_id: &str) -> Result<bool>;

    /// Whether `account_id` holds a storage registration on the token contract.
    async fn is_storage_registered(&self, account_id: &str) -> Result<bool>;

    /// The signed-in account's balance inside the multisender app, in base units.
    async fn get_deposit(&self, account_id: &str) -> Result<U256>;
}

#[async_trait]
pub trait ChainCalls: Send + Sync {
    /// `multisend_from_balance`: one chunk, every transfer confirmed by the contract.
    async fn multisend(&self, chunk: &[TransferEntry], gas: u64) -> Result<()>;

    /// `multisend_from_balance_unsafe`: one chunk, transfer outcomes not awaited.
    async fn multisend_unsafe(&self, chunk: &[TransferEntry], gas: u64, attached: U256) -> Result<()>;

    /// `multi_storage_deposit`: register `accounts` on the token, paying `bond` in total.
    async fn register_storage(&self, accounts: &[String], bond: U256, gas: u64) -> Result<()>;

    /// `ft_transfer_call` of `amount` into the multisender app balance.
    async fn deposit_to_app(&self, amount: U256, gas: u64, attached: U256) -> Result<()>;

    /// `withdraw_all` of the app balance back to `account_id`.
    async fn withdraw_all(&self, account_id: &str, gas: u64, attached: U256) -> Result<()>;

    /// `storage_deposit` on the token contract for `account_id`.
    async fn storage_deposit(&self, account_id: &str, gas: u64, attached: U256) -> Result<()>;
}
