//! copyforge: an ad-copy variant generation and validation pipeline.
//!
//! Takes underperforming ads, derives a creative strategy per ad, generates
//! validated headline and description candidates through an LLM provider,
//! reviews them with a checker pass and a rule-based compliance filter, and
//! emits a capped cross-product of variants plus a run summary.
//!
//! Layers:
//! - [`domain`]: models, ports, and the error taxonomy, free of I/O
//! - [`services`]: agents, validation, dedupe, and the orchestrator
//! - [`infrastructure`]: HTTP provider, SQLite cache, JSONL journal, config

pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::models::{
    AdRecord, CopyKind, PipelineConfig, RunMode, RunSummary, VariantRow,
};
pub use domain::ports::{ProviderError, TextProvider};
pub use domain::PipelineError;
pub use services::{Pipeline, RunOutcome};
