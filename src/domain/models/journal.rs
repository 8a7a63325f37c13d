//! Experiment journal entries.
//!
//! One JSON object per line in the journal file. Entries link a hypothesis to
//! the copy generated for it; the optional `results` block is filled later
//! when performance data is ingested.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Copy produced in one run for one ad.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedCopy {
    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

/// A single experiment-journal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: DateTime<Utc>,
    pub campaign: String,
    #[serde(default)]
    pub ad_group: String,
    #[serde(default)]
    pub ad_id: String,
    pub hypothesis: String,
    /// Creative-angle label, free text.
    #[serde(default)]
    pub angle: String,
    /// Optional run tag / label.
    #[serde(default)]
    pub tag: String,
    pub variant_set_id: String,
    #[serde(default)]
    pub generated: GeneratedCopy,
    #[serde(default)]
    pub notes: String,
    /// Performance metrics once measured (ctr, cpa, roas, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<HashMap<String, f64>>,
}

impl JournalEntry {
    pub fn new(
        campaign: impl Into<String>,
        hypothesis: impl Into<String>,
        variant_set_id: impl Into<String>,
    ) -> Self {
        Self {
            date: Utc::now(),
            campaign: campaign.into(),
            ad_group: String::new(),
            ad_id: String::new(),
            hypothesis: hypothesis.into(),
            angle: String::new(),
            tag: String::new(),
            variant_set_id: variant_set_id.into(),
            generated: GeneratedCopy::default(),
            notes: String::new(),
            results: None,
        }
    }

    pub fn with_ad(mut self, ad_id: impl Into<String>, ad_group: impl Into<String>) -> Self {
        self.ad_id = ad_id.into();
        self.ad_group = ad_group.into();
        self
    }

    pub fn with_generated(mut self, generated: GeneratedCopy) -> Self {
        self.generated = generated;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}
