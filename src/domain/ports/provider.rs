//! Text-generation provider port.
//!
//! One required capability (`generate`) and one optional one (`stats`).
//! Implementations: the retrying HTTP provider for live runs and the mock
//! provider for dry runs and tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::ProviderStats;

/// Errors surfaced by a text-generation provider.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Invalid request parameters or malformed request (HTTP 400 class).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed due to invalid or missing API key.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limit exceeded; the server may supply a wait hint in seconds.
    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: Option<f64> },

    /// Server is overloaded; retry later.
    #[error("server overloaded")]
    Overloaded { retry_after_secs: Option<f64> },

    /// Server-side error (5xx class).
    #[error("server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out waiting for a response.
    #[error("timeout waiting for response")]
    Timeout,

    /// The per-run call budget was reached; no network attempt was made.
    #[error("call budget exceeded (max_calls_per_run={limit})")]
    BudgetExceeded { limit: u32 },

    /// Anything the status mapping does not recognise.
    #[error("unexpected response (HTTP {status}): {message}")]
    Unexpected { status: u16, message: String },
}

impl ProviderError {
    /// True for failures worth retrying with backoff: rate limits, overload,
    /// 5xx responses, connection failures, and timeouts.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::Overloaded { .. }
                | Self::ServerError { .. }
                | Self::Network(_)
                | Self::Timeout
        )
    }

    /// Server-supplied wait hint, when one was present on the response.
    pub fn retry_after_secs(&self) -> Option<f64> {
        match self {
            Self::RateLimited { retry_after_secs } | Self::Overloaded { retry_after_secs } => {
                *retry_after_secs
            }
            _ => None,
        }
    }

    /// Map an HTTP status code and body to an error variant.
    pub fn from_status(status: u16, body: String, retry_after_secs: Option<f64>) -> Self {
        match status {
            400 => Self::InvalidRequest(body),
            401 | 403 => Self::AuthenticationFailed(body),
            429 => Self::RateLimited { retry_after_secs },
            529 => Self::Overloaded { retry_after_secs },
            s if (500..600).contains(&s) => Self::ServerError {
                status: s,
                message: body,
            },
            s => Self::Unexpected {
                status: s,
                message: body,
            },
        }
    }
}

/// The boundary to the text-generation service.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Send a prompt and return the raw text response.
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, ProviderError>;

    /// Optional capability: accumulated call/retry/token statistics.
    fn stats(&self) -> ProviderStats {
        ProviderStats::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::RateLimited {
            retry_after_secs: None
        }
        .is_transient());
        assert!(ProviderError::Overloaded {
            retry_after_secs: Some(5.0)
        }
        .is_transient());
        assert!(ProviderError::ServerError {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(ProviderError::Timeout.is_transient());
        assert!(ProviderError::Network("reset".into()).is_transient());

        assert!(!ProviderError::InvalidRequest("bad".into()).is_transient());
        assert!(!ProviderError::AuthenticationFailed("key".into()).is_transient());
        assert!(!ProviderError::BudgetExceeded { limit: 1 }.is_transient());
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ProviderError::from_status(400, "bad".into(), None),
            ProviderError::InvalidRequest(_)
        ));
        assert!(matches!(
            ProviderError::from_status(401, "key".into(), None),
            ProviderError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, String::new(), Some(2.0)),
            ProviderError::RateLimited {
                retry_after_secs: Some(_)
            }
        ));
        assert!(matches!(
            ProviderError::from_status(529, String::new(), None),
            ProviderError::Overloaded { .. }
        ));
        assert!(matches!(
            ProviderError::from_status(503, "down".into(), None),
            ProviderError::ServerError { status: 503, .. }
        ));
        assert!(matches!(
            ProviderError::from_status(418, "teapot".into(), None),
            ProviderError::Unexpected { status: 418, .. }
        ));
    }

    #[test]
    fn test_retry_after_hint() {
        let err = ProviderError::RateLimited {
            retry_after_secs: Some(5.0),
        };
        assert_eq!(err.retry_after_secs(), Some(5.0));
        assert_eq!(ProviderError::Timeout.retry_after_secs(), None);
    }
}
