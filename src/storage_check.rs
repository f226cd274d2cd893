//! Storage registration check for recipients of the token contract.
//!
//! A recipient must hold a storage registration on the token before it can be
//! credited. Unregistered recipients are registered in one
//! `multi_storage_deposit` call, paying a fixed bond per account.

use crate::chain::{ChainCalls, ChainView};
use crate::error::Result;
use crate::recipients::RecipientList;
use crate::utils;
use crate::validator::group_ids;
use ethers::types::U256;
use futures::future::join_all;
use tracing::{info, warn};

/// Storage bond per account: 125 bytes at 1e19 yocto per byte (0.00125 NEAR).
pub const STORAGE_BOND_PER_ACCOUNT: u128 = 1_250_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageCheckOutcome {
    /// Recipients that had no registration, in list order.
    pub unregistered: Vec<String>,
    pub already_registered: usize,
    /// Deposit attached to the registration call (zero when none was made).
    pub bond: U256,
}

impl StorageCheckOutcome {
    pub fn registered_now(&self) -> usize {
        self.unregistered.len()
    }
}

/// Total bond for registering `count` accounts.
pub fn storage_bond(count: usize, per_account: U256) -> U256 {
    U256::from(count).saturating_mul(per_account)
}

/// Collect unregistered recipients and register them with a single call.
///
/// Grouping matches account validation: groups of at most `group_size` checked
/// one after another, lookups inside a group in parallel.
pub async fn check_storage_registration<V, C>(
    view: &V,
    calls: &C,
    recipients: &RecipientList,
    group_size: usize,
    bond_per_account: U256,
    gas: u64,
) -> Result<StorageCheckOutcome>
where
    V: ChainView + ?Sized,
    C: ChainCalls + ?Sized,
{
    let ids: Vec<&str> = recipients.account_ids().collect();
    let mut unregistered: Vec<String> = Vec::new();
    let mut already_registered = 0usize;

    for group in group_ids(&ids, group_size) {
        let checks = group
            .iter()
            .map(|id| async move { (*id, view.is_storage_registered(id).await) });
        for (id, result) in join_all(checks).await {
            if result? {
                already_registered += 1;
            } else {
                warn!("Not registered account: {}", id);
                unregistered.push(id.to_string());
            }
        }
        info!("Storage check: {} already registered so far", already_registered);
    }

    let bond = storage_bond(unregistered.len(), bond_per_account);
    if !unregistered.is_empty() {
        info!(
            "Registering {} account(s), total storage bond {} NEAR",
            unregistered.len(),
            utils::format_near(bond)
        );
        calls.register_storage(&unregistered, bond, gas).await?;
    }

    Ok(StorageCheckOutcome {
        unregistered,
        already_registered,
        bond,
    })
}
