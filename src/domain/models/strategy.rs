//! Per-ad improvement strategy.

use serde::{Deserialize, Serialize};

/// A short natural-language directive for the generation sub-agents, derived
/// once per ad and reused for both copy kinds. Lifetime = one pipeline pass
/// over one ad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub ad_id: String,
    /// The creative directive, e.g. "Test urgency + price-anchor angle".
    pub directive: String,
    /// Optional root-cause analysis produced alongside the directive.
    #[serde(default)]
    pub analysis: String,
}

impl Strategy {
    /// Safe fallback used when the model response cannot be parsed, so the
    /// pipeline never stalls on a malformed strategy.
    pub fn fallback(ad_id: impl Into<String>) -> Self {
        let ad_id = ad_id.into();
        Self {
            directive: format!("Improve engagement for ad {ad_id}"),
            analysis: String::new(),
            ad_id,
        }
    }
}
