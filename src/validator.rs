//! Account validation: drop recipients that do not resolve to a live account.

use crate::chain::ChainView;
use crate::error::Result;
use crate::recipients::RecipientList;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{info, warn};

/// Ids of this length are raw public keys (implicit accounts) and need no lookup.
pub const PUBLIC_KEY_ID_LEN: usize = 44;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// Replacement for the working list, holding confirmed accounts only.
    pub recipients: RecipientList,
    /// How many entries were dropped.
    pub removed: usize,
}

impl VerificationOutcome {
    pub fn summary(&self) -> String {
        if self.removed > 0 {
            format!("Removed {} invalid account(s)", self.removed)
        } else {
            "All accounts are valid".to_string()
        }
    }
}

/// Split ids into consecutive groups of at most `group_size`.
pub fn group_ids<'a>(ids: &[&'a str], group_size: usize) -> Vec<Vec<&'a str>> {
    ids.chunks(group_size.max(1)).map(|g| g.to_vec()).collect()
}

async fn exists<V: ChainView + ?Sized>(view: &V, account_id: &str) -> Result<bool> {
    if account_id.len() == PUBLIC_KEY_ID_LEN {
        return Ok(true);
    }
    view.account_exists(account_id).await
}

/// Check every recipient against the chain and return the filtered list.
///
/// Groups run one after another; lookups inside a group run concurrently.
/// Any transport error aborts the whole run and nothing is returned, so the
/// caller's list stays untouched.
pub async fn verify_accounts<V: ChainView + ?Sized>(
    view: &V,
    recipients: &RecipientList,
    group_size: usize,
) -> Result<VerificationOutcome> {
    let ids: Vec<&str> = recipients.account_ids().collect();
    let groups = group_ids(&ids, group_size);
    let mut valid: HashSet<String> = HashSet::with_capacity(ids.len());

    for (group_index, group) in groups.iter().enumerate() {
        let checks = group.iter().map(|id| async move { (*id, exists(view, id).await) });
        for (id, result) in join_all(checks).await {
            if result? {
                valid.insert(id.to_string());
            } else {
                warn!("Invalid account: {}", id);
            }
        }
        info!(
            "Checked account group {}/{} ({} ids)",
            group_index + 1,
            groups.len(),
            group.len()
        );
    }

    let filtered = recipients.retain_accounts(|id| valid.contains(id));
    let removed = recipients.len() - filtered.len();
    Ok(VerificationOutcome {
        recipients: filtered,
        removed,
    })
}
