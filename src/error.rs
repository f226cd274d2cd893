//! Error type for the multisend pipeline.

use thiserror::Error;

/// Specialisation of `std::Result`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The chain client could not be reached at all.
    #[error("Chain client unreachable: {0}")]
    Transport(String),
    /// The chain answered, but with an error for a query we cannot treat as a miss.
    #[error("Chain query failed: {0}")]
    Query(String),
    #[error("Chunk {index} of {total} failed: {reason}")]
    ChunkFailed {
        index: usize,
        total: usize,
        reason: String,
    },
    #[error("Contract call '{method}' failed: {reason}")]
    CallFailed { method: String, reason: String },
    #[error("Checkpoint store error: {0}")]
    Checkpoint(String),
    #[error("Another run is already in progress")]
    RunInProgress,
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Recipient list is empty")]
    NothingToSend,
    /// The operation's control would be disabled in the current state.
    #[error("{operation} is not available: {reason}")]
    NotAvailable {
        operation: &'static str,
        reason: &'static str,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
