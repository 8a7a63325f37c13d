//! Transport seam beneath the retrying provider.
//!
//! A transport performs exactly one request attempt with no retry, budget,
//! or accounting behavior. That all lives in
//! [`super::retry::RetryingProvider`], which is generic over this trait so
//! tests can script failures without a network.

use async_trait::async_trait;

use crate::domain::ports::ProviderError;

/// One model invocation.
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub prompt: String,
    pub system: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Token counts reported by the server for one response.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// One model response.
#[derive(Debug, Clone)]
pub struct TextResponse {
    pub text: String,
    /// Absent for transports that do not meter tokens.
    pub usage: Option<TokenUsage>,
}

/// A single-attempt request executor.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &TextRequest) -> Result<TextResponse, ProviderError>;
}
