//! Ad record domain model.
//!
//! One row of the unified ads/performance schema. Records arrive from the
//! upstream selector already filtered and annotated with an `issue` string;
//! the pipeline consumes them read-only.

use serde::{Deserialize, Serialize};

/// Source platform for an ad record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    GoogleAds,
    MetaAds,
    #[default]
    Manual,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoogleAds => "google_ads",
            Self::MetaAds => "meta_ads",
            Self::Manual => "manual",
        }
    }
}

/// A single advertisement with its current copy and performance metrics.
///
/// Immutable once read from input; the pipeline never mutates a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdRecord {
    pub ad_id: String,
    pub campaign: String,
    pub ad_group: String,
    #[serde(default)]
    pub platform: Platform,

    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub final_url: Option<String>,

    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub conversions: f64,
    #[serde(default)]
    pub revenue: f64,

    /// Click-through rate, derived from clicks / impressions.
    #[serde(default)]
    pub ctr: f64,
    /// Cost per acquisition, derived from spend / conversions.
    #[serde(default)]
    pub cpa: f64,
    /// Return on ad spend, derived from revenue / spend.
    #[serde(default)]
    pub roas: f64,

    /// Human-readable underperformance annotation from the selector,
    /// e.g. "CTR 0.0100 < 0.02; ROAS 0.40 < 2.0".
    #[serde(default)]
    pub issue: String,
}

impl AdRecord {
    /// Create a record with identity fields set and everything else defaulted.
    pub fn new(
        ad_id: impl Into<String>,
        campaign: impl Into<String>,
        ad_group: impl Into<String>,
    ) -> Self {
        Self {
            ad_id: ad_id.into(),
            campaign: campaign.into(),
            ad_group: ad_group.into(),
            ..Self::default()
        }
    }

    /// Recompute the derived metrics from the raw counters.
    ///
    /// Ratios with a zero denominator stay at 0.0 rather than NaN so that
    /// downstream comparisons behave.
    pub fn recompute_metrics(&mut self) {
        self.ctr = if self.impressions > 0 {
            self.clicks as f64 / self.impressions as f64
        } else {
            0.0
        };
        self.cpa = if self.conversions > 0.0 {
            self.spend / self.conversions
        } else {
            0.0
        };
        self.roas = if self.spend > 0.0 {
            self.revenue / self.spend
        } else {
            0.0
        };
    }
}
