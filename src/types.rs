//! Common types shared across modules.

use ethers::types::U256;
use serde::{Deserialize, Serialize};

/// One transfer as sent to the multisender contract and as kept in the checkpoint.
///
/// Serialises as `{"account_id": "...", "amount": "<base units>"}`; the amount is a
/// decimal string because the contract takes `U128` JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEntry {
    pub account_id: String,
    #[serde(with = "base_units_string")]
    pub amount: U256,
}

impl TransferEntry {
    pub fn new(account_id: impl Into<String>, amount: U256) -> Self {
        Self {
            account_id: account_id.into(),
            amount,
        }
    }
}

/// Which contract entry point a submission run goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendMode {
    /// `multisend_from_balance`: each transfer is confirmed by a callback.
    Safe,
    /// `multisend_from_balance_unsafe`: cheaper, transfer results are not observed.
    Unsafe,
}

impl SendMode {
    pub fn method_name(&self) -> &'static str {
        match self {
            SendMode::Safe => "multisend_from_balance",
            SendMode::Unsafe => "multisend_from_balance_unsafe",
        }
    }
}

impl Default for SendMode {
    fn default() -> Self {
        SendMode::Safe
    }
}

impl std::str::FromStr for SendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "safe" => Ok(SendMode::Safe),
            "unsafe" => Ok(SendMode::Unsafe),
            other => Err(format!("unknown send mode '{other}' (expected safe or unsafe)")),
        }
    }
}

mod base_units_string {
    use ethers::types::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_dec_str(&raw).map_err(|e| D::Error::custom(format!("invalid amount '{raw}': {e}")))
    }
}
