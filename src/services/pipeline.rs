//! Run orchestrator.
//!
//! Drives the per-ad sequence: memory context, brand voice (live), strategy,
//! headline and description generation, then a bounded review loop of
//! checker review, rule-based compliance filtering (live), and targeted
//! replacements for removed copy, and finally the capped cross-product of
//! surviving copy.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::errors::PipelineError;
use crate::domain::models::{
    AdRecord, CopyKind, GeneratedCopy, JournalEntry, PipelineConfig, RunMode, RunSummary,
    VariantRow,
};
use crate::domain::ports::{ExperimentLog, NullExperimentLog, TextProvider};
use crate::infrastructure::cache::{config_fingerprint, CacheStore};

use super::brand_voice::brand_voice_guideline;
use super::checker::check_copy;
use super::compliance::{self, filter_risky_claims};
use super::copy_agent::{CopyAgent, Failure};
use super::dedupe::classify_angle;
use super::prompts::PromptContext;
use super::strategy::derive_strategy;
use super::validator::PolicyRules;

/// How many recent journal entries feed the memory context per campaign.
const MEMORY_CONTEXT_LIMIT: usize = 5;

/// Everything a completed run produces.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub rows: Vec<VariantRow>,
    pub summary: RunSummary,
}

/// The ad-variant pipeline, wired once per run.
pub struct Pipeline {
    provider: Arc<dyn TextProvider>,
    cache: Option<CacheStore>,
    journal: Arc<dyn ExperimentLog>,
    config: PipelineConfig,
    policy: PolicyRules,
    mode: RunMode,
}

struct AdOutcome {
    rows: Vec<VariantRow>,
    pass_count: u64,
    fail_count: u64,
    checker_violations: u64,
    compliance_failures: u64,
}

impl Pipeline {
    pub fn new(
        provider: Arc<dyn TextProvider>,
        config: PipelineConfig,
        mode: RunMode,
    ) -> anyhow::Result<Self> {
        let policy = PolicyRules::compile(&config.policy)?;
        Ok(Self {
            provider,
            cache: None,
            journal: Arc::new(NullExperimentLog),
            config,
            policy,
            mode,
        })
    }

    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_journal(mut self, journal: Arc<dyn ExperimentLog>) -> Self {
        self.journal = journal;
        self
    }

    /// Process every ad and build the run summary.
    ///
    /// A run either completes with a summary or aborts with a typed error:
    /// budget exhaustion and unretryable provider failures both propagate.
    pub async fn run(&self, ads: &[AdRecord]) -> Result<RunOutcome, PipelineError> {
        let fingerprint = config_fingerprint(&self.config);
        let agent = CopyAgent::new(
            self.provider.as_ref(),
            &self.config,
            &self.policy,
            &fingerprint,
        );

        let mut summary = RunSummary {
            total_ads: ads.len(),
            selected: ads.len(),
            ..RunSummary::default()
        };
        let mut rows: Vec<VariantRow> = Vec::new();
        let mut voices: HashMap<(String, String), String> = HashMap::new();
        let run_stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();

        for (idx, ad) in ads.iter().enumerate() {
            let variant_set_id = format!("vs_{run_stamp}_{idx:03}");
            let outcome = self
                .process_ad(&agent, ad, &variant_set_id, &mut voices)
                .await?;
            summary.pass_count += outcome.pass_count;
            summary.fail_count += outcome.fail_count;
            summary.checker_violations += outcome.checker_violations;
            summary.compliance_failures += outcome.compliance_failures;
            rows.extend(outcome.rows);
        }

        summary.variants_generated = rows.len();
        summary.provider_stats = self.provider.stats();
        if let Some(cache) = &self.cache {
            summary.cache_stats = Some(cache.stats());
        }
        summary.message = format!(
            "generated {} variants across {} ads",
            summary.variants_generated, summary.selected
        );
        info!(
            variants = summary.variants_generated,
            ads = summary.selected,
            mode = self.mode.as_str(),
            "run complete"
        );

        Ok(RunOutcome { rows, summary })
    }

    async fn memory_context(&self, campaign: &str) -> String {
        match self
            .journal
            .recent_for_campaign(campaign, MEMORY_CONTEXT_LIMIT)
            .await
        {
            Ok(entries) if !entries.is_empty() => entries
                .iter()
                .map(|e| {
                    format!(
                        "- {} [{}] {}",
                        e.date.format("%Y-%m-%d"),
                        e.angle,
                        e.hypothesis
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Ok(_) => String::new(),
            Err(err) => {
                warn!(campaign, error = %err, "journal read failed, skipping memory context");
                String::new()
            }
        }
    }

    async fn prompt_context(
        &self,
        ad: &AdRecord,
        voices: &mut HashMap<(String, String), String>,
    ) -> Result<PromptContext, PipelineError> {
        let memory_context = self.memory_context(&ad.campaign).await;
        let brand_voice = if self.mode == RunMode::Live {
            let key = (ad.campaign.clone(), ad.ad_group.clone());
            match voices.get(&key) {
                Some(v) => v.clone(),
                None => {
                    let v = brand_voice_guideline(
                        self.provider.as_ref(),
                        &self.config.brand_voice,
                        &ad.campaign,
                        &ad.ad_group,
                    )
                    .await?;
                    voices.insert(key, v.clone());
                    v
                }
            }
        } else {
            String::new()
        };
        Ok(PromptContext {
            memory_context,
            brand_voice,
        })
    }

    async fn process_ad(
        &self,
        agent: &CopyAgent<'_>,
        ad: &AdRecord,
        variant_set_id: &str,
        voices: &mut HashMap<(String, String), String>,
    ) -> Result<AdOutcome, PipelineError> {
        let ctx = self.prompt_context(ad, voices).await?;
        let strategy = derive_strategy(self.provider.as_ref(), ad).await?;

        let headline_set = agent
            .generate(
                ad,
                &strategy,
                CopyKind::Headline,
                &ctx,
                self.cache.as_ref(),
            )
            .await?;
        let description_set = agent
            .generate(
                ad,
                &strategy,
                CopyKind::Description,
                &ctx,
                self.cache.as_ref(),
            )
            .await?;
        let fail_count = headline_set.fail_count + description_set.fail_count;

        // Review loop: checker, then the deterministic compliance backstop
        // (live runs only), then targeted replacements for whatever was
        // removed. Replacements go through the next round's review; anything
        // still flagged when the rounds run out is removed and counted.
        let mut headlines = headline_set.accepted;
        let mut descriptions = description_set.accepted;
        let mut checker_violations = 0u64;
        let mut compliance_failures = 0u64;
        let review_rounds = self.config.generation.max_retries_validation.max(1);

        for round in 0..review_rounds {
            let checked = check_copy(self.provider.as_ref(), ad, headlines, descriptions).await?;
            checker_violations = checked.violations.len() as u64;
            headlines = checked.headlines;
            descriptions = checked.descriptions;
            let mut flagged = checked.violations;

            if self.mode == RunMode::Live {
                let (clean_h, clean_d, violations) = filter_risky_claims(headlines, descriptions);
                compliance_failures += violations.len() as u64;
                headlines = clean_h;
                descriptions = clean_d;
                flagged.extend(violations);
            }

            if flagged.is_empty() || round + 1 == review_rounds {
                break;
            }

            for kind in [CopyKind::Headline, CopyKind::Description] {
                let kind_flagged: Vec<Failure> = flagged
                    .iter()
                    .filter(|v| v.kind == kind)
                    .map(|v| Failure {
                        text: v.text.clone(),
                        reason: v.reason.clone(),
                    })
                    .collect();
                if kind_flagged.is_empty() {
                    continue;
                }
                let (existing, needed) = match kind {
                    CopyKind::Headline => (&mut headlines, kind_flagged.len()),
                    CopyKind::Description => (&mut descriptions, kind_flagged.len()),
                };
                let mut replacements = agent
                    .generate_replacements(
                        ad,
                        &strategy,
                        kind,
                        &ctx,
                        &kind_flagged,
                        existing,
                        needed,
                    )
                    .await?;
                // Replacements go through the same risk screen as the copy
                // they stand in for.
                if self.mode == RunMode::Live {
                    replacements.retain(|t| compliance::risk_reasons(t).is_empty());
                }
                existing.extend(replacements);
            }
        }

        let pass_count = (headlines.len() + descriptions.len()) as u64;
        let rows = self.cross_product(ad, &headlines, &descriptions, variant_set_id);

        self.journal_append(ad, &strategy.directive, variant_set_id, &headlines, &descriptions)
            .await;

        Ok(AdOutcome {
            rows,
            pass_count,
            fail_count,
            checker_violations,
            compliance_failures,
        })
    }

    fn cross_product(
        &self,
        ad: &AdRecord,
        headlines: &[String],
        descriptions: &[String],
        variant_set_id: &str,
    ) -> Vec<VariantRow> {
        let cap = self.config.generation.max_variants_per_run;
        let mut rows = Vec::new();
        'outer: for h in headlines {
            for d in descriptions {
                if rows.len() >= cap {
                    break 'outer;
                }
                rows.push(VariantRow {
                    campaign: ad.campaign.clone(),
                    ad_group: ad.ad_group.clone(),
                    ad_id: ad.ad_id.clone(),
                    original_headline: ad.headline.clone(),
                    original_description: ad.description.clone(),
                    variant_headline: h.clone(),
                    variant_description: d.clone(),
                    variant_set_id: variant_set_id.to_string(),
                    tag: format!("V{:03}", rows.len() + 1),
                });
            }
        }
        rows
    }

    async fn journal_append(
        &self,
        ad: &AdRecord,
        hypothesis: &str,
        variant_set_id: &str,
        headlines: &[String],
        descriptions: &[String],
    ) {
        if headlines.is_empty() && descriptions.is_empty() {
            return;
        }
        let angle = headlines
            .first()
            .map(|h| classify_angle(h).as_str().to_string())
            .unwrap_or_default();
        let mut entry = JournalEntry::new(&ad.campaign, hypothesis, variant_set_id)
            .with_ad(&ad.ad_id, &ad.ad_group)
            .with_generated(GeneratedCopy {
                headlines: headlines.to_vec(),
                descriptions: descriptions.to_vec(),
            })
            .with_notes(&ad.issue);
        entry.angle = angle;
        if let Err(err) = self.journal.append(entry).await {
            warn!(ad_id = %ad.ad_id, error = %err, "journal append failed");
        }
    }
}
