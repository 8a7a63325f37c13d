//! Trait seams between the pipeline and the outside world.

pub mod experiment_log;
pub mod provider;

pub use experiment_log::{ExperimentLog, NullExperimentLog};
pub use provider::{ProviderError, TextProvider};
