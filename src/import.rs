//! Load recipient text from a file.
//!
//! `.csv` files are read as `account,amount` records (a header row is fine, it
//! simply fails to parse as a recipient). Anything else is taken as raw text.
//! Either way the result goes through the regular recipient parser.

use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;

pub fn load_recipients_file(path: &Path) -> Result<String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        csv_to_recipient_text(&contents)
    } else {
        Ok(contents)
    }
}

/// Convert CSV records into `"<account> <amount>"` lines.
pub fn csv_to_recipient_text(contents: &str) -> Result<String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let mut result_lines = Vec::new();
    let mut skipped = 0usize;

    for (line_num, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| anyhow!("CSV parsing error at line {}: {}", line_num + 1, e))?;
        let account = record.get(0).unwrap_or("").trim_matches('"');
        let amount = record.get(1).unwrap_or("").trim_matches('"');

        if account.is_empty() || amount.is_empty() {
            skipped += 1;
            continue;
        }
        result_lines.push(format!("{} {}", account, amount));
    }

    if skipped > 0 {
        tracing::warn!("{} CSV record(s) without account and amount were skipped", skipped);
    }

    Ok(result_lines.join("\n"))
}
