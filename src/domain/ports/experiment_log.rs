//! Experiment log port.
//!
//! Appends are best-effort from the pipeline's point of view: a log failure
//! must never fail the ad being processed, so the orchestrator logs a warning
//! and moves on.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::JournalEntry;

/// Append-only experiment log with campaign-scoped recall.
#[async_trait]
pub trait ExperimentLog: Send + Sync {
    /// Append one entry.
    async fn append(&self, entry: JournalEntry) -> Result<()>;

    /// Most recent entries for a campaign, oldest first, capped at `limit`.
    /// Used to build memory context for later ads in the same run.
    async fn recent_for_campaign(&self, campaign: &str, limit: usize) -> Result<Vec<JournalEntry>>;
}

/// No-op log for runs that disable journaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExperimentLog;

#[async_trait]
impl ExperimentLog for NullExperimentLog {
    async fn append(&self, _entry: JournalEntry) -> Result<()> {
        Ok(())
    }

    async fn recent_for_campaign(
        &self,
        _campaign: &str,
        _limit: usize,
    ) -> Result<Vec<JournalEntry>> {
        Ok(Vec::new())
    }
}
