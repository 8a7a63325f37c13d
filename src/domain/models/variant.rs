//! Variant rows and the run summary.

use serde::{Deserialize, Serialize};

use super::stats::{CacheStats, ProviderStats};

/// One headline x description combination for one ad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantRow {
    pub campaign: String,
    pub ad_group: String,
    pub ad_id: String,
    pub original_headline: String,
    pub original_description: String,
    pub variant_headline: String,
    pub variant_description: String,
    /// Run-scoped, time-ordered identifier shared by all rows of one ad.
    pub variant_set_id: String,
    /// Stable zero-padded tag within the set, e.g. "V001".
    pub tag: String,
}

/// Run-level summary accumulated by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ads seen in the input (the core receives a pre-filtered list, so this
    /// equals `selected` unless the caller overrides it for reporting).
    pub total_ads: usize,
    pub selected: usize,
    pub variants_generated: usize,
    /// Copy pieces that survived generation and all filters.
    pub pass_count: u64,
    /// Candidates rejected by validation across all rounds.
    pub fail_count: u64,
    /// Checker violations still standing after the replacement loop.
    pub checker_violations: u64,
    /// Risky claims filtered by the rule-based compliance pass (live mode).
    pub compliance_failures: u64,
    pub message: String,
    pub provider_stats: ProviderStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_stats: Option<CacheStats>,
}
