//! Derived totals and control enablement.
//!
//! Nothing here is cached: callers derive a fresh [`AggregateState`] after every
//! change to the recipient list, the balance, or the verified flag.

use crate::recipients::RecipientList;
use ethers::types::U256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateState {
    pub total: U256,
    pub count: usize,
    pub send_enabled: bool,
    pub send_unsafe_enabled: bool,
    pub deposit_enabled: bool,
    pub withdraw_enabled: bool,
    pub storage_check_enabled: bool,
    pub verify_visible: bool,
}

impl AggregateState {
    pub fn derive(
        recipients: &RecipientList,
        balance: U256,
        verified: bool,
        signed_in: bool,
    ) -> Self {
        let total = recipients.total();
        let has_recipients = !recipients.is_empty();
        let can_send = signed_in && has_recipients && !total.is_zero() && balance >= total;

        Self {
            total,
            count: recipients.len(),
            send_enabled: can_send,
            send_unsafe_enabled: can_send,
            deposit_enabled: signed_in && has_recipients && !total.is_zero() && balance < total,
            withdraw_enabled: signed_in && !balance.is_zero(),
            storage_check_enabled: signed_in && has_recipients && verified,
            verify_visible: signed_in && has_recipients,
        }
    }

    /// Amount still missing from the app balance to cover the list.
    pub fn shortfall(&self, balance: U256) -> U256 {
        self.total.saturating_sub(balance)
    }
}
