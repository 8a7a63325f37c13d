//! Generation sub-agent behavior against scripted providers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use copyforge::domain::models::{AdRecord, CopyKind, PipelineConfig, Strategy};
use copyforge::domain::ports::{ProviderError, TextProvider};
use copyforge::infrastructure::cache::{config_fingerprint, make_cache_key, CacheStore};
use copyforge::infrastructure::provider::MockProvider;
use copyforge::services::copy_agent::CopyAgent;
use copyforge::services::prompts::PromptContext;
use copyforge::services::validator::PolicyRules;

fn sample_ad(id: &str) -> AdRecord {
    let mut ad = AdRecord::new(id, "Summer_Sale", "Group_A");
    ad.headline = "Great shoes".to_string();
    ad.description = "Shoes for everyone".to_string();
    ad.impressions = 10_000;
    ad.clicks = 100;
    ad.issue = "CTR 0.0100 < 0.02".to_string();
    ad.recompute_metrics();
    ad
}

/// Counts calls and never produces parseable output.
struct GarbageProvider {
    calls: AtomicU64,
}

#[async_trait]
impl TextProvider for GarbageProvider {
    async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("nothing structured in here".to_string())
    }
}

/// Returns the same canned response on every call.
struct EchoProvider {
    response: String,
}

#[async_trait]
impl TextProvider for EchoProvider {
    async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, ProviderError> {
        Ok(self.response.clone())
    }
}

/// Plays back responses in order and records every prompt it saw.
struct ScriptedCopywriter {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCopywriter {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| (*r).to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextProvider for ScriptedCopywriter {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| r#"{"headlines": []}"#.to_string()))
    }
}

#[tokio::test]
async fn unparseable_rounds_stop_at_the_retry_limit() {
    let config = PipelineConfig::default();
    let rules = PolicyRules::compile(&config.policy).unwrap();
    let fingerprint = config_fingerprint(&config);
    let provider = GarbageProvider {
        calls: AtomicU64::new(0),
    };
    let agent = CopyAgent::new(&provider, &config, &rules, &fingerprint);

    let set = agent
        .generate(
            &sample_ad("AD001"),
            &Strategy::fallback("AD001"),
            CopyKind::Headline,
            &PromptContext::default(),
            None,
        )
        .await
        .unwrap();

    assert!(set.accepted.is_empty());
    assert_eq!(set.fail_count, 0);
    // One provider call per round, no extra round past the limit.
    assert_eq!(
        provider.calls.load(Ordering::SeqCst),
        u64::try_from(config.generation.max_retries_validation).unwrap()
    );
}

#[tokio::test]
async fn near_duplicates_are_dropped_without_counting_as_failures() {
    let config = PipelineConfig::default();
    let rules = PolicyRules::compile(&config.policy).unwrap();
    let fingerprint = config_fingerprint(&config);
    let provider = EchoProvider {
        response: r#"{"headlines": [
            "Save more on every visit",
            "Save more on every visits",
            "THIS ONE IS ALL CAPS"
        ]}"#
        .to_string(),
    };
    let agent = CopyAgent::new(&provider, &config, &rules, &fingerprint);

    let set = agent
        .generate(
            &sample_ad("AD001"),
            &Strategy::fallback("AD001"),
            CopyKind::Headline,
            &PromptContext::default(),
            None,
        )
        .await
        .unwrap();

    // The near-duplicate is silently skipped in both rounds; only the
    // all-caps candidate counts against the ad, once per round.
    assert_eq!(set.accepted, vec!["Save more on every visit".to_string()]);
    assert_eq!(set.fail_count, 2);
}

#[tokio::test]
async fn cache_stores_exactly_the_returned_capped_list() {
    let config = PipelineConfig::default();
    let rules = PolicyRules::compile(&config.policy).unwrap();
    let fingerprint = config_fingerprint(&config);
    let provider = MockProvider::new();
    let agent = CopyAgent::new(&provider, &config, &rules, &fingerprint);
    let cache = CacheStore::in_memory().await.unwrap();

    let ad = sample_ad("AD001");
    let strategy = Strategy::fallback("AD001");
    let set = agent
        .generate(
            &ad,
            &strategy,
            CopyKind::Headline,
            &PromptContext::default(),
            Some(&cache),
        )
        .await
        .unwrap();
    assert_eq!(set.accepted.len(), config.generation.max_variants_headline);

    let key = format!(
        "{}{}",
        make_cache_key(&ad.ad_id, &fingerprint, &strategy.directive),
        CopyKind::Headline.cache_suffix()
    );
    let raw = cache.get(&key).await.unwrap().unwrap();
    let cached: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(cached, set.accepted);
}

#[tokio::test]
async fn retry_prompts_report_only_the_latest_rejections() {
    let mut config = PipelineConfig::default();
    config.generation.max_retries_validation = 3;
    let rules = PolicyRules::compile(&config.policy).unwrap();
    let fingerprint = config_fingerprint(&config);
    let provider = ScriptedCopywriter::new(&[
        r#"{"headlines": ["THIS IS ALL CAPS ONE"]}"#,
        r#"{"headlines": ["THIS IS ALL CAPS TWO"]}"#,
    ]);
    let agent = CopyAgent::new(&provider, &config, &rules, &fingerprint);

    let set = agent
        .generate(
            &sample_ad("AD001"),
            &Strategy::fallback("AD001"),
            CopyKind::Headline,
            &PromptContext::default(),
            None,
        )
        .await
        .unwrap();

    assert!(set.accepted.is_empty());
    assert_eq!(set.fail_count, 2);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[1].contains("THIS IS ALL CAPS ONE"));
    // The third round's feedback covers the second round's rejection only.
    assert!(prompts[2].contains("THIS IS ALL CAPS TWO"));
    assert!(!prompts[2].contains("THIS IS ALL CAPS ONE"));
}
