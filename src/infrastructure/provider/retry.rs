//! Retrying, budget-enforcing provider.
//!
//! Wraps a [`Transport`] with exponential backoff for transient errors and a
//! hard per-run call budget. The budget counts successful calls only; a call
//! that fails after all retries has cost nothing against the budget.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::models::{BudgetConfig, ProviderConfig, ProviderStats, RetryConfig};
use crate::domain::ports::{ProviderError, TextProvider};

use super::transport::{TextRequest, Transport};

/// A [`TextProvider`] built from a transport plus retry and budget policy.
pub struct RetryingProvider<T: Transport> {
    transport: T,
    provider: ProviderConfig,
    retry: RetryConfig,
    budget: BudgetConfig,
    call_count: AtomicU64,
    retry_count: AtomicU64,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl<T: Transport> RetryingProvider<T> {
    pub fn new(
        transport: T,
        provider: ProviderConfig,
        retry: RetryConfig,
        budget: BudgetConfig,
    ) -> Self {
        Self {
            transport,
            provider,
            retry,
            budget,
            call_count: AtomicU64::new(0),
            retry_count: AtomicU64::new(0),
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// Access the wrapped transport (used by tests to inspect fakes).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn record_error(&self, err: &ProviderError) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = Some(err.to_string());
        }
    }

    /// Backoff before retry `attempt` (0-based): the server's hint when one
    /// was given, otherwise capped exponential growth with jitter.
    fn backoff(&self, attempt: u32, err: &ProviderError) -> Duration {
        if let Some(hint) = err.retry_after_secs() {
            return Duration::from_secs_f64(hint.max(0.0));
        }
        let base = self.retry.backoff_base_ms;
        let exp = base.saturating_mul(2u64.saturating_pow(attempt));
        let jitter = rand::rng().random_range(0..=base / 2);
        Duration::from_millis(exp.saturating_add(jitter).min(self.retry.backoff_max_ms))
    }
}

#[async_trait]
impl<T: Transport> TextProvider for RetryingProvider<T> {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, ProviderError> {
        let limit = self.budget.max_calls_per_run;
        if limit > 0 && self.call_count.load(Ordering::SeqCst) >= u64::from(limit) {
            let err = ProviderError::BudgetExceeded { limit };
            self.record_error(&err);
            return Err(err);
        }

        let request = TextRequest {
            prompt: prompt.to_string(),
            system: system.to_string(),
            model: self.provider.model.clone(),
            temperature: self.provider.temperature,
            max_tokens: self.provider.max_tokens,
        };

        let mut attempt: u32 = 0;
        loop {
            match self.transport.send(&request).await {
                Ok(response) => {
                    self.call_count.fetch_add(1, Ordering::SeqCst);
                    if let Some(usage) = response.usage {
                        self.input_tokens
                            .fetch_add(usage.input_tokens, Ordering::Relaxed);
                        self.output_tokens
                            .fetch_add(usage.output_tokens, Ordering::Relaxed);
                    }
                    return Ok(response.text);
                }
                Err(err) if err.is_transient() && attempt < self.retry.max_api_retries => {
                    let delay = self.backoff(attempt, &err);
                    warn!(
                        attempt = attempt + 1,
                        max = self.retry.max_api_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient provider error, backing off"
                    );
                    self.retry_count.fetch_add(1, Ordering::SeqCst);
                    self.record_error(&err);
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(attempt, error = %err, "provider call failed");
                    self.record_error(&err);
                    return Err(err);
                }
            }
        }
    }

    fn stats(&self) -> ProviderStats {
        ProviderStats {
            call_count: self.call_count.load(Ordering::SeqCst),
            retry_count: self.retry_count.load(Ordering::SeqCst),
            total_input_tokens: self.input_tokens.load(Ordering::Relaxed),
            total_output_tokens: self.output_tokens.load(Ordering::Relaxed),
            last_error: self.last_error.lock().ok().and_then(|g| g.clone()),
        }
    }
}
