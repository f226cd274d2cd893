//! Batch submission of a recipient list to the multisender contract.
//!
//! The list is split into fixed-size chunks that are sent strictly one after
//! another. Before each chunk goes out, the checkpoint is rewritten to hold
//! that chunk and everything after it, so an interrupted run resumes exactly
//! where it stopped.

use crate::chain::ChainCalls;
use crate::checkpoint::CheckpointStore;
use crate::error::{Error, Result};
use crate::recipients::RecipientList;
use crate::types::{SendMode, TransferEntry};
use crate::utils;
use ethers::types::U256;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Progress update for a running submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionProgress {
    /// Run started with this many chunks.
    Started { total_chunks: usize },
    /// `submitted` chunks have been accepted so far.
    ChunkSubmitted { submitted: usize, total_chunks: usize },
    /// Chunk number `index` (1-based) failed; the checkpoint still holds it.
    Failed { index: usize, error: String },
    Completed { total_chunks: usize },
}

/// Submission settings for one run
#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    pub mode: SendMode,
    pub chunk_size: usize,
    pub gas: u64,
    /// Deposit attached to unsafe-mode calls.
    pub attached: U256,
    /// Pause between consecutive chunks.
    pub chunk_delay: Duration,
}

impl SubmissionConfig {
    pub fn for_mode(config: &crate::config::Config, mode: SendMode) -> Self {
        Self {
            mode,
            chunk_size: config.chunk_size(mode),
            gas: config.gas,
            attached: U256::from(utils::ONE_YOCTO),
            chunk_delay: Duration::from_millis(config.chunk_delay_ms),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub mode: SendMode,
    pub recipients: usize,
    pub chunks: usize,
    pub total: U256,
}

impl SubmissionReport {
    pub fn summary(&self) -> String {
        format!(
            "Request '{}' complete! {} recipient(s) in {} chunk(s), {} tokens",
            self.mode.method_name(),
            self.recipients,
            self.chunks,
            utils::format_token(self.total)
        )
    }
}

/// Split entries into contiguous chunks of at most `chunk_size`, order kept.
pub fn chunk_entries(entries: &[TransferEntry], chunk_size: usize) -> Vec<&[TransferEntry]> {
    entries.chunks(chunk_size.max(1)).collect()
}

/// Sends chunks through a [`ChainCalls`] client, checkpointing as it goes.
pub struct SubmissionEngine<'a, C: ?Sized, S: ?Sized> {
    calls: &'a C,
    store: &'a S,
    progress_sender: Option<mpsc::UnboundedSender<SubmissionProgress>>,
}

impl<'a, C, S> SubmissionEngine<'a, C, S>
where
    C: ChainCalls + ?Sized,
    S: CheckpointStore + ?Sized,
{
    pub fn new(calls: &'a C, store: &'a S) -> Self {
        Self {
            calls,
            store,
            progress_sender: None,
        }
    }

    /// Stream [`SubmissionProgress`] updates to `sender`.
    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<SubmissionProgress>) -> Self {
        self.progress_sender = Some(sender);
        self
    }

    fn report(&self, progress: SubmissionProgress) {
        if let Some(sender) = &self.progress_sender {
            let _ = sender.send(progress);
        }
    }

    /// Submit the whole list, chunk by chunk.
    ///
    /// Stops at the first failing chunk without retrying. The checkpoint then
    /// holds the failed chunk and everything after it. After the last chunk is
    /// accepted the checkpoint is reset to the empty sequence.
    pub async fn submit(
        &self,
        recipients: &RecipientList,
        settings: &SubmissionConfig,
    ) -> Result<SubmissionReport> {
        if recipients.is_empty() {
            return Err(Error::NothingToSend);
        }

        let entries = recipients.to_transfer_entries();
        self.store.save(&entries)?;

        let chunk_size = settings.chunk_size.max(1);
        let chunks = chunk_entries(&entries, chunk_size);
        let total_chunks = chunks.len();
        info!(
            "Submitting {} recipient(s) in {} chunk(s) of up to {} via {}",
            entries.len(),
            total_chunks,
            chunk_size,
            settings.mode.method_name()
        );
        self.report(SubmissionProgress::Started { total_chunks });

        for (index, chunk) in chunks.iter().enumerate() {
            // Everything from this chunk on is still unsent
            self.store.save(&entries[index * chunk_size..])?;

            let result = match settings.mode {
                SendMode::Safe => self.calls.multisend(chunk, settings.gas).await,
                SendMode::Unsafe => {
                    self.calls
                        .multisend_unsafe(chunk, settings.gas, settings.attached)
                        .await
                }
            };

            if let Err(e) = result {
                error!("Chunk {}/{} failed: {}", index + 1, total_chunks, e);
                self.report(SubmissionProgress::Failed {
                    index: index + 1,
                    error: e.to_string(),
                });
                return Err(Error::ChunkFailed {
                    index: index + 1,
                    total: total_chunks,
                    reason: e.to_string(),
                });
            }

            info!("Chunk {}/{} accepted ({} recipients)", index + 1, total_chunks, chunk.len());
            self.report(SubmissionProgress::ChunkSubmitted {
                submitted: index + 1,
                total_chunks,
            });

            if index + 1 < total_chunks && !settings.chunk_delay.is_zero() {
                tokio::time::sleep(settings.chunk_delay).await;
            }
        }

        self.store.clear()?;
        self.report(SubmissionProgress::Completed { total_chunks });

        Ok(SubmissionReport {
            mode: settings.mode,
            recipients: entries.len(),
            chunks: total_chunks,
            total: recipients.total(),
        })
    }
}
