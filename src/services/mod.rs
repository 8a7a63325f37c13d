//! Pipeline services: agents, validation, dedupe, and orchestration.

pub mod brand_voice;
pub mod checker;
pub mod compliance;
pub mod copy_agent;
pub mod dedupe;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod strategy;
pub mod validator;

pub use pipeline::{Pipeline, RunOutcome};
