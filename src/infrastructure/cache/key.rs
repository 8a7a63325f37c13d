//! Cache key derivation.
//!
//! Keys bind a response to the ad, the strategy hypothesis, and every config
//! field that changes model output, so stale entries can never be served
//! after a prompt-affecting config change.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::models::PipelineConfig;

/// The config fields that affect generated text. Field order is fixed, so
/// the serialized form is deterministic.
#[derive(Serialize)]
struct Fingerprint<'a> {
    num_headlines: usize,
    num_descriptions: usize,
    max_headline_chars: usize,
    max_description_chars: usize,
    model: &'a str,
    temperature: f32,
}

/// Serialize the model-affecting slice of the config.
pub fn config_fingerprint(config: &PipelineConfig) -> String {
    let fp = Fingerprint {
        num_headlines: config.generation.num_headlines,
        num_descriptions: config.generation.num_descriptions,
        max_headline_chars: config.generation.max_headline_chars,
        max_description_chars: config.generation.max_description_chars,
        model: &config.provider.model,
        temperature: config.provider.temperature,
    };
    serde_json::to_string(&fp).unwrap_or_default()
}

/// SHA-256 over the identity triple, hex-encoded. Callers append a
/// kind-specific suffix to namespace headline and description entries.
pub fn make_cache_key(ad_id: &str, fingerprint: &str, hypothesis: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ad_id.as_bytes());
    hasher.update(b"|");
    hasher.update(fingerprint.as_bytes());
    hasher.update(b"|");
    hasher.update(hypothesis.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_hex_sha256() {
        let key = make_cache_key("AD001", "fp", "hyp");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_is_deterministic() {
        assert_eq!(
            make_cache_key("AD001", "fp", "hyp"),
            make_cache_key("AD001", "fp", "hyp")
        );
    }

    #[test]
    fn test_key_varies_with_each_input() {
        let base = make_cache_key("AD001", "fp", "hyp");
        assert_ne!(base, make_cache_key("AD002", "fp", "hyp"));
        assert_ne!(base, make_cache_key("AD001", "fp2", "hyp"));
        assert_ne!(base, make_cache_key("AD001", "fp", "hyp2"));
    }

    #[test]
    fn test_fingerprint_tracks_model_settings() {
        let a = config_fingerprint(&PipelineConfig::default());
        let mut cfg = PipelineConfig::default();
        cfg.provider.temperature = 0.2;
        let b = config_fingerprint(&cfg);
        assert_ne!(a, b);

        // Fields outside the fingerprint must not invalidate the cache.
        let mut cfg = PipelineConfig::default();
        cfg.budget.max_calls_per_run = 5;
        assert_eq!(a, config_fingerprint(&cfg));
    }
}
