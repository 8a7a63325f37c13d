//! Run-scoped statistics accumulators.

use serde::{Deserialize, Serialize};

/// Snapshot of provider activity for one pipeline run.
///
/// `call_count` counts only successful, budget-consuming calls; retried
/// transient failures show up in `retry_count` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub call_count: u64,
    pub retry_count: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl ProviderStats {
    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }
}

/// Cache hit/miss counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    pub fn new(hits: u64, misses: u64) -> Self {
        let total = hits + misses;
        let hit_rate = if total > 0 {
            // Round to 4 decimal places for stable reporting
            (hits as f64 / total as f64 * 10_000.0).round() / 10_000.0
        } else {
            0.0
        };
        Self {
            hits,
            misses,
            hit_rate,
        }
    }
}
