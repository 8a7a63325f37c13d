//! Adapters to the outside world: HTTP provider, SQLite cache, JSONL
//! journal, config files, and logging.

pub mod cache;
pub mod config;
pub mod journal;
pub mod logging;
pub mod provider;
