//! Recipient list parsing.
//!
//! Turns pasted free-form text into a [`RecipientList`]. One recipient per line:
//!
//! ```text
//! <account_id><separator><amount>
//! ```
//!
//! - `account_id`: first char `[0-9A-Za-z]`, then `[-_0-9A-Za-z.]*`, lowercased
//! - `separator`: exactly one of tab, `,`, `|`, `=`, space
//! - `amount`: `[0-9.,]+`, the first `,` acting as decimal point
//!
//! Lines that do not match are skipped without error, as are zero amounts.
//! Repeated account ids are merged by summing their amounts.

use crate::types::TransferEntry;
use crate::utils;
use ethers::types::U256;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

static LINE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn line_pattern() -> &'static Regex {
    LINE_PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9A-Za-z][-_0-9A-Za-z.]*)[\t,|= ]([0-9.,]+)$")
            .expect("recipient line pattern is invalid - this is a programming error")
    })
}

/// Ordered mapping of lowercase account id to amount in base units.
///
/// Insertion order is the order in which ids first appeared in the source text;
/// chunking and checkpointing rely on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientList {
    entries: Vec<TransferEntry>,
    index: HashMap<String, usize>,
    total: U256,
}

impl RecipientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `account_id`, inserting it at the end if unseen.
    ///
    /// Returns `false` and leaves the list unchanged when the entry or the
    /// list total would overflow.
    pub fn add(&mut self, account_id: &str, amount: U256) -> bool {
        let Some(total) = self.total.checked_add(amount) else {
            tracing::warn!("Skipping {}: list total would overflow", account_id);
            return false;
        };
        let key = account_id.to_lowercase();
        match self.index.get(&key) {
            Some(&pos) => {
                let entry = &mut self.entries[pos];
                // Bounded by the total check above
                entry.amount += amount;
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(TransferEntry::new(key, amount));
            }
        }
        self.total = total;
        true
    }

    /// Rebuild a list from transfer records, e.g. a restored checkpoint.
    pub fn from_entries<I: IntoIterator<Item = TransferEntry>>(entries: I) -> Self {
        let mut list = Self::new();
        for entry in entries {
            list.add(&entry.account_id, entry.amount);
        }
        list
    }

    /// New list with only the accounts `keep` accepts, order preserved.
    pub fn retain_accounts<F: FnMut(&str) -> bool>(&self, mut keep: F) -> Self {
        Self::from_entries(
            self.entries
                .iter()
                .filter(|e| keep(&e.account_id))
                .cloned(),
        )
    }

    pub fn get(&self, account_id: &str) -> Option<U256> {
        self.index
            .get(&account_id.to_lowercase())
            .map(|&pos| self.entries[pos].amount)
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.index.contains_key(&account_id.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TransferEntry] {
        &self.entries
    }

    pub fn account_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.account_id.as_str())
    }

    /// Sum of all amounts.
    pub fn total(&self) -> U256 {
        self.total
    }

    /// Ordered `{account_id, amount}` records as submitted to the contract.
    pub fn to_transfer_entries(&self) -> Vec<TransferEntry> {
        self.entries.clone()
    }

    /// Canonical text form, one `"<account_id> <amount>"` per line.
    ///
    /// Parsing this text yields an equal list.
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} {}", e.account_id, utils::format_token(e.amount)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse pasted text into a fresh [`RecipientList`].
///
/// Pure: the result depends only on `input`.
pub fn parse_recipients(input: &str) -> RecipientList {
    let mut recipients = RecipientList::new();
    let mut skipped = 0usize;

    for line in input.split(['\n', '\r']) {
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some((account_id, amount)) if recipients.add(account_id, amount) => {}
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} unparseable recipient line(s)", skipped);
    }
    recipients
}

fn parse_line(line: &str) -> Option<(&str, U256)> {
    let caps = line_pattern().captures(line)?;
    let account_id = caps.get(1)?.as_str();
    if account_id.is_empty() {
        return None;
    }
    let amount = parse_lenient_amount(caps.get(2)?.as_str())?;
    if amount.is_zero() {
        return None;
    }
    Some((account_id, amount))
}

/// Interpret an amount the way a float prefix-parser would, but exactly.
///
/// The first `,` becomes `.`, spaces are dropped and the longest leading
/// `digits[.digits]` prefix is used, so `"1,5"` is 1.5 and `"1.2.3"` is 1.2.
/// Returns `None` when there is no digit in that prefix.
fn parse_lenient_amount(raw: &str) -> Option<U256> {
    let normalized = raw.replacen(',', ".", 1).replace(' ', "");

    let mut prefix = String::new();
    let mut seen_dot = false;
    for c in normalized.chars() {
        match c {
            '0'..='9' => prefix.push(c),
            '.' if !seen_dot => {
                seen_dot = true;
                prefix.push(c);
            }
            _ => break,
        }
    }

    if !prefix.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    utils::parse_token_str_to_base_units(&prefix).ok()
}
