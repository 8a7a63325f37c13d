//! Prompt builders for the generation, checker, strategy, and brand-voice
//! agents.
//!
//! Every prompt that expects structured output ends with an explicit JSON
//! shape instruction; the parsers in [`super::parse`] are the other half of
//! that contract.

use std::fmt::Write as _;

use crate::domain::models::{AdRecord, CopyKind, GenerationConfig, Strategy};

use super::copy_agent::Failure;
use super::dedupe::Angle;

pub const COPYWRITER_SYSTEM: &str = "You are a senior performance-marketing copywriter. \
You write concise, concrete ad copy and always answer with valid JSON only.";

pub const ANALYST_SYSTEM: &str = "You are a paid-media analyst. You diagnose why ads \
underperform and propose one testable creative direction. Answer with valid JSON only.";

pub const REVIEWER_SYSTEM: &str = "You are a strict ad-quality reviewer. You flag weak, \
vague, or non-compliant copy. Answer with valid JSON only.";

/// Per-run context threaded into every generation prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    /// Summary of recent experiments for the same campaign, or empty.
    pub memory_context: String,
    /// Brand-voice guideline (live mode), or empty.
    pub brand_voice: String,
}

fn push_context(out: &mut String, ctx: &PromptContext) {
    if !ctx.brand_voice.is_empty() {
        let _ = writeln!(out, "\nBrand voice guideline:\n{}", ctx.brand_voice);
    }
    if !ctx.memory_context.is_empty() {
        let _ = writeln!(
            out,
            "\nRecent experiments in this campaign (avoid repeating these directions):\n{}",
            ctx.memory_context
        );
    }
}

fn ad_summary(ad: &AdRecord) -> String {
    format!(
        "Campaign: {}\nAd group: {}\nAd ID: {}\nCurrent headline: {}\nCurrent description: {}\n\
         Metrics: CTR {:.4}, CPA {:.2}, ROAS {:.2}\nDiagnosed issue: {}",
        ad.campaign,
        ad.ad_group,
        ad.ad_id,
        ad.headline,
        ad.description,
        ad.ctr,
        ad.cpa,
        ad.roas,
        ad.issue
    )
}

fn json_instruction(kind: CopyKind) -> String {
    format!(
        "Return ONLY valid JSON: {{\"{}\": [\"...\", \"...\"]}}",
        kind.json_key()
    )
}

/// Prompt for the per-ad strategy agent.
pub fn strategy_prompt(ad: &AdRecord) -> String {
    format!(
        "Analyze this underperforming ad and propose one creative direction to test.\n\n{}\n\n\
         Return ONLY valid JSON: {{\"analysis\": \"...\", \"directive\": \"...\"}}",
        ad_summary(ad)
    )
}

/// First-round generation prompt for either copy kind.
pub fn generation_prompt(
    ad: &AdRecord,
    strategy: &Strategy,
    kind: CopyKind,
    cfg: &GenerationConfig,
    ctx: &PromptContext,
) -> String {
    let count = cfg.target_count(kind);
    let max_chars = cfg.max_chars(kind);
    let label = match kind {
        CopyKind::Headline => "headlines",
        CopyKind::Description => "descriptions",
    };
    let mut out = format!(
        "Write {count} ad {label} for this ad.\n\n{}\n\nCreative direction: {}\n\n\
         Rules:\n- At most {max_chars} characters each, spaces included\n\
         - No ALL-CAPS\n- No superlative or guarantee claims\n\
         - Vary the creative angle across candidates (urgency, social proof, \
         problem/solution, curiosity, benefit)",
        ad_summary(ad),
        strategy.directive
    );
    push_context(&mut out, ctx);
    let _ = write!(out, "\n{}", json_instruction(kind));
    out
}

/// Targeted-retry prompt: names recent failures and uncovered angles, and
/// asks for exactly the number of replacements still needed.
pub fn retry_prompt(
    ad: &AdRecord,
    strategy: &Strategy,
    kind: CopyKind,
    cfg: &GenerationConfig,
    ctx: &PromptContext,
    failures: &[Failure],
    missing_angles: &[Angle],
    needed: usize,
) -> String {
    let max_chars = cfg.max_chars(kind);
    let label = match kind {
        CopyKind::Headline => "headlines",
        CopyKind::Description => "descriptions",
    };
    let mut out = format!(
        "Write {needed} new ad {label} for this ad. Previous candidates were rejected.\n\n\
         {}\n\nCreative direction: {}\n",
        ad_summary(ad),
        strategy.directive
    );
    if !failures.is_empty() {
        let _ = writeln!(out, "\nRejected candidates (do not repeat these mistakes):");
        for f in failures.iter().take(5) {
            let _ = writeln!(out, "- \"{}\": {}", f.text, f.reason);
        }
    }
    if !missing_angles.is_empty() {
        let names: Vec<&str> = missing_angles.iter().map(Angle::as_str).collect();
        let _ = writeln!(
            out,
            "\nCover these creative angles that are still missing: {}",
            names.join(", ")
        );
    }
    let _ = write!(
        out,
        "\nRules:\n- At most {max_chars} characters each, spaces included\n\
         - No ALL-CAPS\n- No superlative or guarantee claims"
    );
    push_context(&mut out, ctx);
    let _ = write!(out, "\n{}", json_instruction(kind));
    out
}

/// Prompt for the checker agent over the full accepted sets.
pub fn checker_prompt(ad: &AdRecord, headlines: &[String], descriptions: &[String]) -> String {
    let mut out = format!(
        "Review this generated ad copy for quality and compliance problems.\n\n\
         Campaign: {}\nAd group: {}\n\nHeadlines:\n",
        ad.campaign, ad.ad_group
    );
    for (i, h) in headlines.iter().enumerate() {
        let _ = writeln!(out, "{i}. {h}");
    }
    let _ = writeln!(out, "\nDescriptions:");
    for (i, d) in descriptions.iter().enumerate() {
        let _ = writeln!(out, "{i}. {d}");
    }
    let _ = write!(
        out,
        "\nFlag copy that is vague, misleading, repetitive, or risky. Use the zero-based \
         index shown above.\nReturn ONLY valid JSON: {{\"violations\": [{{\"type\": \
         \"HEADLINE\"|\"DESCRIPTION\", \"index\": 0, \"issue\": \"...\", \
         \"suggestion\": \"...\"}}]}}\nIf everything is acceptable return \
         {{\"violations\": []}}"
    );
    out
}

/// Prompt for the brand-voice agent (live mode, once per campaign/ad-group).
pub fn brand_voice_prompt(
    campaign: &str,
    ad_group: &str,
    tone: &str,
    audience: &str,
    forbidden_words: &[String],
) -> String {
    format!(
        "Write a short brand-voice guideline for ad copy in this campaign.\n\n\
         Campaign: {campaign}\nAd group: {ad_group}\nDesired tone: {tone}\n\
         Audience: {audience}\nNever use these words: {}\n\n\
         Answer in 2-4 plain sentences a copywriter can follow.",
        forbidden_words.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad() -> AdRecord {
        let mut ad = AdRecord::new("AD001", "Summer_Sale", "Group_A");
        ad.headline = "Old headline".to_string();
        ad.description = "Old description".to_string();
        ad.issue = "CTR 0.0100 < 0.02".to_string();
        ad
    }

    #[test]
    fn test_generation_prompt_names_shape() {
        let cfg = GenerationConfig::default();
        let p = generation_prompt(
            &ad(),
            &Strategy::fallback("AD001"),
            CopyKind::Headline,
            &cfg,
            &PromptContext::default(),
        );
        assert!(p.contains("Write 10 ad headlines"));
        assert!(p.contains("At most 30 characters"));
        assert!(p.contains(r#"{"headlines": ["...", "..."]}"#));
    }

    #[test]
    fn test_retry_prompt_caps_failures_at_five() {
        let cfg = GenerationConfig::default();
        let failures: Vec<Failure> = (0..8)
            .map(|i| Failure {
                text: format!("candidate {i}"),
                reason: "too long".to_string(),
            })
            .collect();
        let p = retry_prompt(
            &ad(),
            &Strategy::fallback("AD001"),
            CopyKind::Description,
            &cfg,
            &PromptContext::default(),
            &failures,
            &[],
            3,
        );
        assert!(p.contains("Write 3 new ad descriptions"));
        assert!(p.contains("candidate 4"));
        assert!(!p.contains("candidate 5"));
        assert!(p.contains(r#"{"descriptions": ["...", "..."]}"#));
    }

    #[test]
    fn test_retry_prompt_lists_missing_angles() {
        let cfg = GenerationConfig::default();
        let p = retry_prompt(
            &ad(),
            &Strategy::fallback("AD001"),
            CopyKind::Headline,
            &cfg,
            &PromptContext::default(),
            &[],
            &[Angle::Urgency, Angle::Curiosity],
            2,
        );
        assert!(p.contains("urgency, curiosity"));
    }

    #[test]
    fn test_checker_prompt_indexes_from_zero() {
        let p = checker_prompt(
            &ad(),
            &["First".to_string(), "Second".to_string()],
            &["Only one".to_string()],
        );
        assert!(p.contains("0. First"));
        assert!(p.contains("1. Second"));
        assert!(p.contains("0. Only one"));
        assert!(p.contains(r#"{"violations": []}"#));
    }

    #[test]
    fn test_context_sections_appear_when_set() {
        let cfg = GenerationConfig::default();
        let ctx = PromptContext {
            memory_context: "- tried urgency last week".to_string(),
            brand_voice: "Warm and direct.".to_string(),
        };
        let p = generation_prompt(
            &ad(),
            &Strategy::fallback("AD001"),
            CopyKind::Headline,
            &cfg,
            &ctx,
        );
        assert!(p.contains("Brand voice guideline"));
        assert!(p.contains("tried urgency last week"));
    }
}
