//! Generation sub-agent: produces validated, deduplicated, angle-diverse
//! copy for one ad and one copy kind.
//!
//! The agent is cache-first. On a miss it runs a bounded generate/validate
//! loop: round zero asks for the full candidate count, later rounds ask only
//! for what is still missing and name the rejections so the model can steer
//! away from them.

use tracing::{debug, warn};

use crate::domain::models::{AdRecord, CopyKind, PipelineConfig, Strategy};
use crate::domain::ports::{ProviderError, TextProvider};
use crate::infrastructure::cache::{make_cache_key, CacheStore};

use super::dedupe::{self, Angle};
use super::parse;
use super::prompts::{self, PromptContext};
use super::validator::{self, PolicyRules};

/// A rejected candidate with the reason it was rejected. Fed back into
/// targeted-retry prompts.
#[derive(Debug, Clone)]
pub struct Failure {
    pub text: String,
    pub reason: String,
}

/// Output of one generation pass.
#[derive(Debug, Clone, Default)]
pub struct GeneratedSet {
    /// Accepted copy, already capped for downstream combinatorics.
    pub accepted: Vec<String>,
    /// Candidates rejected by validation across all rounds.
    pub fail_count: u64,
}

/// One generation sub-agent, parameterized by copy kind at call time.
pub struct CopyAgent<'a> {
    provider: &'a dyn TextProvider,
    config: &'a PipelineConfig,
    rules: &'a PolicyRules,
    /// Cache fingerprint for the model-affecting config fields.
    fingerprint: &'a str,
}

impl<'a> CopyAgent<'a> {
    pub fn new(
        provider: &'a dyn TextProvider,
        config: &'a PipelineConfig,
        rules: &'a PolicyRules,
        fingerprint: &'a str,
    ) -> Self {
        Self {
            provider,
            config,
            rules,
            fingerprint,
        }
    }

    fn cache_key(&self, ad: &AdRecord, strategy: &Strategy, kind: CopyKind) -> String {
        format!(
            "{}{}",
            make_cache_key(&ad.ad_id, self.fingerprint, &strategy.directive),
            kind.cache_suffix()
        )
    }

    async fn try_cache_get(&self, cache: Option<&CacheStore>, key: &str) -> Option<Vec<String>> {
        let cache = cache?;
        match cache.get(key).await {
            Ok(Some(json)) => serde_json::from_str::<Vec<String>>(&json).ok(),
            Ok(None) => None,
            Err(err) => {
                // A broken cache downgrades to a miss, never a failed ad.
                warn!(key, error = %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn try_cache_set(&self, cache: Option<&CacheStore>, key: &str, accepted: &[String]) {
        let Some(cache) = cache else { return };
        match serde_json::to_string(accepted) {
            Ok(json) => {
                if let Err(err) = cache.set(key, &json).await {
                    warn!(key, error = %err, "cache write failed");
                }
            }
            Err(err) => warn!(key, error = %err, "cache serialization failed"),
        }
    }

    /// Angles still uncovered among the accepted headlines, capped at the
    /// configured minimum.
    fn missing_angles(&self, accepted: &[String]) -> Vec<Angle> {
        let min = self
            .config
            .dedupe
            .min_distinct_angles
            .clamp(1, Angle::ALL.len());
        let dist = dedupe::angle_distribution(accepted);
        let present = dist.values().filter(|&&n| n > 0).count();
        if present >= min {
            return Vec::new();
        }
        Angle::ALL
            .iter()
            .filter(|a| dist.get(a).copied().unwrap_or(0) == 0)
            .take(min - present)
            .copied()
            .collect()
    }

    /// Generate copy of one kind for one ad.
    ///
    /// Returns the accepted set (possibly short of the target; never an
    /// error for quality shortfalls) or a provider error when the API itself
    /// failed.
    pub async fn generate(
        &self,
        ad: &AdRecord,
        strategy: &Strategy,
        kind: CopyKind,
        ctx: &PromptContext,
        cache: Option<&CacheStore>,
    ) -> Result<GeneratedSet, ProviderError> {
        let cap = self.config.generation.output_cap(kind);
        let key = self.cache_key(ad, strategy, kind);

        if let Some(mut cached) = self.try_cache_get(cache, &key).await {
            debug!(ad_id = %ad.ad_id, kind = %kind, "cache hit");
            cached.truncate(cap);
            return Ok(GeneratedSet {
                accepted: cached,
                fail_count: 0,
            });
        }

        let gen_cfg = &self.config.generation;
        let target = gen_cfg.target_count(kind);
        let threshold = f64::from(self.config.dedupe.similarity_threshold);
        let max_chars = gen_cfg.max_chars(kind);

        let mut accepted: Vec<String> = Vec::new();
        // Only the previous round's rejections feed the retry prompt.
        let mut failures: Vec<Failure> = Vec::new();
        let mut fail_count: u64 = 0;

        for round in 0..gen_cfg.max_retries_validation {
            let missing = if kind == CopyKind::Headline {
                self.missing_angles(&accepted)
            } else {
                Vec::new()
            };
            if accepted.len() >= target && missing.is_empty() {
                break;
            }

            let prompt = if round == 0 {
                prompts::generation_prompt(ad, strategy, kind, gen_cfg, ctx)
            } else {
                let needed = target.saturating_sub(accepted.len()).max(1);
                prompts::retry_prompt(
                    ad, strategy, kind, gen_cfg, ctx, &failures, &missing, needed,
                )
            };

            let raw = self
                .provider
                .generate(&prompt, prompts::COPYWRITER_SYSTEM)
                .await?;
            let candidates = parse::extract_string_array(&raw, kind.json_key());
            failures.clear();
            if candidates.is_empty() {
                debug!(ad_id = %ad.ad_id, kind = %kind, round, "round yielded no parseable candidates");
                continue;
            }

            for text in candidates {
                let errors = validator::validate_text(&text, kind, max_chars, self.rules);
                if !errors.is_empty() {
                    fail_count += 1;
                    failures.push(Failure {
                        text,
                        reason: errors.join("; "),
                    });
                    continue;
                }
                // Near-duplicates are dropped quietly, not counted as
                // failures.
                if dedupe::is_near_duplicate(&text, &accepted, threshold) {
                    continue;
                }
                accepted.push(text);
            }

            // Headlines are re-ranked for angle coverage every round.
            if kind == CopyKind::Headline {
                accepted = dedupe::enforce_diversity(
                    &accepted,
                    threshold,
                    self.config.dedupe.min_distinct_angles,
                    target,
                )
                .selected;
            }
        }

        let mut final_set = accepted;
        final_set.truncate(cap);
        if !final_set.is_empty() {
            self.try_cache_set(cache, &key, &final_set).await;
        }

        Ok(GeneratedSet {
            accepted: final_set,
            fail_count,
        })
    }

    /// Generate up to `needed` replacements for checker-flagged copy.
    ///
    /// Bounded like the main loop; may return fewer than requested.
    pub async fn generate_replacements(
        &self,
        ad: &AdRecord,
        strategy: &Strategy,
        kind: CopyKind,
        ctx: &PromptContext,
        flagged: &[Failure],
        existing: &[String],
        needed: usize,
    ) -> Result<Vec<String>, ProviderError> {
        if needed == 0 {
            return Ok(Vec::new());
        }
        let gen_cfg = &self.config.generation;
        let threshold = f64::from(self.config.dedupe.similarity_threshold);
        let max_chars = gen_cfg.max_chars(kind);

        let mut replacements: Vec<String> = Vec::new();
        let mut failures: Vec<Failure> = flagged.to_vec();

        for _ in 0..gen_cfg.max_retries_validation {
            if replacements.len() >= needed {
                break;
            }
            let still_needed = needed - replacements.len();
            let prompt = prompts::retry_prompt(
                ad,
                strategy,
                kind,
                gen_cfg,
                ctx,
                &failures,
                &[],
                still_needed,
            );
            let raw = self
                .provider
                .generate(&prompt, prompts::COPYWRITER_SYSTEM)
                .await?;

            for text in parse::extract_string_array(&raw, kind.json_key()) {
                if replacements.len() >= needed {
                    break;
                }
                let errors = validator::validate_text(&text, kind, max_chars, self.rules);
                if !errors.is_empty() {
                    failures.push(Failure {
                        text,
                        reason: errors.join("; "),
                    });
                    continue;
                }
                let mut seen: Vec<String> = existing.to_vec();
                seen.extend(replacements.iter().cloned());
                if dedupe::is_near_duplicate(&text, &seen, threshold) {
                    continue;
                }
                replacements.push(text);
            }
        }
        Ok(replacements)
    }
}
