//! Pipeline error taxonomy.
//!
//! Parse errors and cache/journal failures never reach this level; they
//! degrade in place. What does propagate is spend control (budget) and
//! provider transport failure, which must terminate the run.

use thiserror::Error;

use crate::domain::ports::ProviderError;

/// Terminal errors for a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The per-run call budget was reached; the run should stop spending.
    #[error("call budget exceeded (max_calls_per_run={limit})")]
    BudgetExceeded { limit: u32 },

    /// A provider call failed after exhausting retries, or failed with a
    /// non-retryable error.
    #[error("provider failure: {0}")]
    Provider(#[source] ProviderError),
}

impl From<ProviderError> for PipelineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::BudgetExceeded { limit } => Self::BudgetExceeded { limit },
            other => Self::Provider(other),
        }
    }
}
