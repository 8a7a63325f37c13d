//! Provider implementations: live Anthropic HTTP, retry/budget policy, and
//! the offline mock.

pub mod anthropic;
pub mod mock;
pub mod retry;
pub mod transport;

pub use anthropic::{anthropic_provider, AnthropicProvider, HttpTransport};
pub use mock::MockProvider;
pub use retry::RetryingProvider;
pub use transport::{TextRequest, TextResponse, TokenUsage, Transport};
