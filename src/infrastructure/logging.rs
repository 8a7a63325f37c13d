//! Tracing setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber. Respects `RUST_LOG`; defaults to `info`
/// for this crate and `warn` for everything else. Safe to call twice (the
/// second call is a no-op).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,copyforge=info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
