use anyhow::{anyhow, Result};
use ethers::types::U256;

/// Decimals of the token handled by the multisender contract.
pub const TOKEN_DECIMALS: u32 = 18;

/// Decimals of NEAR itself, used for attached deposits and storage bonds.
pub const NEAR_DECIMALS: u32 = 24;

/// Whole-token digits that always fit in a U256 once scaled to base units.
const MAX_WHOLE_DIGITS: usize = 59;

/// One yoctoNEAR, attached to calls that require a confirmed signature.
pub const ONE_YOCTO: u128 = 1;

/// Format a base-unit amount as a human-readable token amount.
///
/// Trailing zeros of the fractional part are removed (`1500000000000000000` -> `1.5`).
pub fn format_token(amount: U256) -> String {
    let formatted = ethers::utils::format_units(amount, TOKEN_DECIMALS)
        .unwrap_or_else(|_| "0.0".to_string());
    trim_fraction(&formatted)
}

/// Format a yoctoNEAR amount (24 decimals) as NEAR.
pub fn format_near(yocto: U256) -> String {
    let formatted = ethers::utils::format_units(yocto, NEAR_DECIMALS)
        .unwrap_or_else(|_| "0.0".to_string());
    trim_fraction(&formatted)
}

fn trim_fraction(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => formatted.to_string(),
    }
}

/// Parse a strict decimal token string (`"12"`, `"0.5"`) into base units.
///
/// Fractional digits past the token precision are truncated. This is integer
/// arithmetic only, so `0.123456789012345678` survives exactly.
///
/// # Errors
/// Returns an error if the string is empty or not a plain decimal number
pub fn parse_token_str_to_base_units(input: &str) -> Result<U256> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Token amount cannot be empty"));
    }
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let valid = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !valid(whole) || !valid(fraction) {
        return Err(anyhow!("Invalid token amount '{}'", trimmed));
    }

    if whole.trim_start_matches('0').len() > MAX_WHOLE_DIGITS {
        return Err(anyhow!("Token amount '{}' is too large", trimmed));
    }

    let precision = TOKEN_DECIMALS as usize;
    let fraction = &fraction[..fraction.len().min(precision)];
    let normalized = format!(
        "{}.{}",
        if whole.is_empty() { "0" } else { whole },
        if fraction.is_empty() { "0" } else { fraction }
    );

    ethers::utils::parse_units(&normalized, TOKEN_DECIMALS)
        .map(|pu| pu.into())
        .map_err(|e| anyhow!("Failed to convert '{}' to base units: {}", trimmed, e))
}

/// Parse a base-unit integer string, as returned by contract views (`U128` JSON strings).
pub fn parse_base_units(input: &str) -> Result<U256> {
    U256::from_dec_str(input.trim().trim_matches('"'))
        .map_err(|e| anyhow!("Invalid base-unit amount '{}': {}", input, e))
}

/// Shorten long account ids for display: first 14 chars, an ellipsis, last 14 chars.
pub fn trim_account_id(account_id: &str) -> String {
    let chars: Vec<char> = account_id.chars().collect();
    if chars.len() > 14 + 14 + 1 {
        let head: String = chars[..14].iter().collect();
        let tail: String = chars[chars.len() - 14..].iter().collect();
        format!("{head}…{tail}")
    } else {
        account_id.to_string()
    }
}
