//! Pipeline configuration model.
//!
//! All knobs are serde-deserializable with per-section defaults so a partial
//! YAML file or environment overlay only has to name what it changes.

use serde::{Deserialize, Serialize};

use super::candidate::CopyKind;

/// Whether a run is allowed to spend money on external calls.
///
/// Dry runs use the mock provider and skip live-only passes (brand voice,
/// rule-based compliance filtering).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Dry,
    Live,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dry => "dry",
            Self::Live => "live",
        }
    }
}

/// Candidate counts, character ceilings, and retry bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Target headline candidates per generation pass.
    pub num_headlines: usize,
    /// Target description candidates per generation pass.
    pub num_descriptions: usize,
    /// Hard ceiling in Unicode code points, spaces included.
    pub max_headline_chars: usize,
    pub max_description_chars: usize,
    /// Cap on headlines returned to the pipeline (below num_headlines, to
    /// bound downstream combinatorics).
    pub max_variants_headline: usize,
    /// Cap on descriptions returned to the pipeline.
    pub max_variants_desc: usize,
    /// Validation-retry rounds inside a generation sub-agent.
    pub max_retries_validation: usize,
    /// Cap on cross-product combinations per ad.
    pub max_variants_per_run: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            num_headlines: 10,
            num_descriptions: 6,
            max_headline_chars: 30,
            max_description_chars: 90,
            max_variants_headline: 5,
            max_variants_desc: 3,
            max_retries_validation: 2,
            max_variants_per_run: 100,
        }
    }
}

impl GenerationConfig {
    /// Target candidate count for one copy kind.
    pub fn target_count(&self, kind: CopyKind) -> usize {
        match kind {
            CopyKind::Headline => self.num_headlines,
            CopyKind::Description => self.num_descriptions,
        }
    }

    /// Character ceiling for one copy kind.
    pub fn max_chars(&self, kind: CopyKind) -> usize {
        match kind {
            CopyKind::Headline => self.max_headline_chars,
            CopyKind::Description => self.max_description_chars,
        }
    }

    /// Output cap for one copy kind (intentionally lower than the target).
    pub fn output_cap(&self, kind: CopyKind) -> usize {
        match kind {
            CopyKind::Headline => self.max_variants_headline,
            CopyKind::Description => self.max_variants_desc,
        }
    }
}

/// Near-duplicate removal and angle-diversity quotas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupeConfig {
    /// Fuzzy-similarity threshold on a 0-100 scale; candidates scoring at or
    /// above it against any kept text are discarded.
    pub similarity_threshold: u8,
    /// Minimum number of distinct creative angles among accepted headlines.
    pub min_distinct_angles: usize,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 85,
            min_distinct_angles: 3,
        }
    }
}

/// Regex blocklist applied to every candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub blocked_patterns: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            blocked_patterns: vec![
                r"(?i)cam kết".to_string(),
                r"(?i)tuyệt đối".to_string(),
                r"(?i)\bno\.?\s*1\b".to_string(),
                r"(?i)\bbest\b".to_string(),
                r"(?i)\bguarantee[d]?\b".to_string(),
                r"(?i)\b#1\b".to_string(),
                r"(?i)100%".to_string(),
            ],
        }
    }
}

/// Brand tone constraints injected into live-mode prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandVoiceConfig {
    pub tone: String,
    pub audience: String,
    pub forbidden_words: Vec<String>,
}

impl Default for BrandVoiceConfig {
    fn default() -> Self {
        Self {
            tone: "clear, credible, and action-oriented".to_string(),
            audience: "prospects comparing options".to_string(),
            forbidden_words: vec![
                "guarantee".to_string(),
                "best".to_string(),
                "no.1".to_string(),
                "#1".to_string(),
                "100%".to_string(),
            ],
        }
    }
}

/// Text-generation model settings. These feed the cache fingerprint: changing
/// the model or temperature invalidates cached candidate lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            temperature: 0.8,
            max_tokens: 2048,
        }
    }
}

/// Hard caps to control live API spending.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Total successful generate() calls per run; 0 = unlimited.
    pub max_calls_per_run: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_calls_per_run: 50,
        }
    }
}

/// Exponential-backoff settings for live API calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_api_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_api_retries: 3,
            backoff_base_ms: 1_000,
            backoff_max_ms: 60_000,
        }
    }
}

/// SQLite-backed response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "cache/llm_cache.db".to_string(),
        }
    }
}

/// Experiment journal location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub path: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: "journal/experiments.jsonl".to_string(),
        }
    }
}

/// Top-level pipeline configuration, one instance per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub generation: GenerationConfig,
    pub dedupe: DedupeConfig,
    pub policy: PolicyConfig,
    pub brand_voice: BrandVoiceConfig,
    pub provider: ProviderConfig,
    pub budget: BudgetConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
    pub journal: JournalConfig,
}
