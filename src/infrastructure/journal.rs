//! JSONL experiment journal.
//!
//! One JSON object per line, append-only. Reads are lenient: lines that fail
//! to parse are skipped so one corrupt record never hides the rest.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::domain::models::JournalEntry;
use crate::domain::ports::ExperimentLog;

/// File-backed [`ExperimentLog`].
#[derive(Debug, Clone)]
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<JournalEntry>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            // No journal yet is an empty journal.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        let mut entries = Vec::new();
        for (lineno, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!(path = %self.path.display(), lineno = lineno + 1, error = %err,
                        "skipping unparseable journal line");
                }
            }
        }
        Ok(entries)
    }
}

#[async_trait]
impl ExperimentLog for JsonlJournal {
    async fn append(&self, entry: JournalEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating journal directory {}", parent.display()))?;
            }
        }
        let mut line = serde_json::to_string(&entry).context("serializing journal entry")?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .context("appending journal entry")?;
        file.flush().await.context("flushing journal")?;
        Ok(())
    }

    async fn recent_for_campaign(&self, campaign: &str, limit: usize) -> Result<Vec<JournalEntry>> {
        let mut matching: Vec<JournalEntry> = self
            .read_all()
            .await?
            .into_iter()
            .filter(|e| e.campaign == campaign)
            .collect();
        // Keep the newest `limit`, returned oldest first.
        if matching.len() > limit {
            matching.drain(..matching.len() - limit);
        }
        Ok(matching)
    }
}
