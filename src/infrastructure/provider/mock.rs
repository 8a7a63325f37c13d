//! Deterministic mock provider for dry runs and tests.
//!
//! Classifies each prompt by the JSON shape it asks for and answers from
//! fixed pools that pass every validation rule, so a dry run exercises the
//! full pipeline without spending anything.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::models::ProviderStats;
use crate::domain::ports::{ProviderError, TextProvider};

const HEADLINE_POOL: [&str; 10] = [
    "Order today, ends soon",
    "Trusted by 12k+ shoppers",
    "Fix slow checkout fast",
    "Discover smarter picks",
    "Save more every visit",
    "Deals ending tonight",
    "Rated by real users",
    "Solve returns hassles",
    "Why shoppers switch",
    "Easy savings daily",
];

const DESCRIPTION_POOL: [&str; 6] = [
    "Shop curated picks with free shipping on every order over fifty dollars.",
    "Join thousands of happy customers who upgraded their routine this season.",
    "Tired of slow deliveries? Get your order at the door within two days.",
    "Discover what makes our spring collection different from the rest.",
    "Save on everyday essentials with member pricing and easy returns.",
    "New arrivals drop weekly, so there is always something fresh to try.",
];

/// Offline [`TextProvider`] with canned, validation-safe responses.
#[derive(Debug, Default)]
pub struct MockProvider {
    call_count: AtomicU64,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    fn respond(prompt: &str) -> String {
        if prompt.contains("\"violations\"") {
            return r#"{"violations": []}"#.to_string();
        }
        if prompt.contains("\"directive\"") {
            return r#"{"analysis": "CTR trails the group average.", "directive": "Test an urgency angle with a concrete offer."}"#
                .to_string();
        }
        if prompt.contains("brand-voice guideline") {
            return "Keep sentences short and concrete. Lead with the offer, \
                    never with the brand."
                .to_string();
        }
        if prompt.contains("\"descriptions\"") {
            let items: Vec<String> = DESCRIPTION_POOL
                .iter()
                .map(|d| format!("\"{d}\""))
                .collect();
            return format!("{{\"descriptions\": [{}]}}", items.join(", "));
        }
        let items: Vec<String> = HEADLINE_POOL.iter().map(|h| format!("\"{h}\"")).collect();
        format!("{{\"headlines\": [{}]}}", items.join(", "))
    }
}

#[async_trait]
impl TextProvider for MockProvider {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.prompts.lock() {
            guard.push(prompt.to_string());
        }
        Ok(Self::respond(prompt))
    }

    fn stats(&self) -> ProviderStats {
        ProviderStats {
            call_count: self.call_count.load(Ordering::SeqCst),
            ..ProviderStats::default()
        }
    }
}
