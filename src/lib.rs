pub mod aggregate;
pub mod app;
pub mod chain;
pub mod checkpoint;
pub mod config;
pub mod dry_run;
pub mod error;
pub mod import;
pub mod notifications;
pub mod operation_log;
pub mod recipients;
pub mod rpc;
pub mod storage_check;
pub mod submission;
pub mod types;
pub mod user_settings;
pub mod utils;
pub mod validator;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use recipients::{parse_recipients, RecipientList};
pub use types::{SendMode, TransferEntry};
