//! Domain models for the copy-variant pipeline.

pub mod ad;
pub mod candidate;
pub mod config;
pub mod journal;
pub mod stats;
pub mod strategy;
pub mod variant;

pub use ad::{AdRecord, Platform};
pub use candidate::{CopyKind, Violation};
pub use config::{
    BrandVoiceConfig, BudgetConfig, CacheConfig, DedupeConfig, GenerationConfig, JournalConfig,
    PipelineConfig, PolicyConfig, ProviderConfig, RetryConfig, RunMode,
};
pub use journal::{GeneratedCopy, JournalEntry};
pub use stats::{CacheStats, ProviderStats};
pub use strategy::Strategy;
pub use variant::{RunSummary, VariantRow};
