//! Checker agent: a second-opinion review pass over the accepted copy.
//!
//! The checker only ever removes copy. A violation must name a known type
//! tag and an in-range index to take effect; anything else is ignored, and
//! an entirely malformed response leaves the sets untouched.

use tracing::{debug, warn};

use crate::domain::models::{AdRecord, CopyKind, Violation};
use crate::domain::ports::{ProviderError, TextProvider};

use super::parse;
use super::prompts;

/// Result of a checker pass.
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
    /// Headlines that survived the review.
    pub headlines: Vec<String>,
    /// Descriptions that survived the review.
    pub descriptions: Vec<String>,
    /// Violations that were actually applied (valid type + index).
    pub violations: Vec<Violation>,
}

/// Run the checker agent over both accepted sets.
///
/// Skips the provider call entirely when there is nothing to review.
pub async fn check_copy(
    provider: &dyn TextProvider,
    ad: &AdRecord,
    headlines: Vec<String>,
    descriptions: Vec<String>,
) -> Result<CheckOutcome, ProviderError> {
    if headlines.is_empty() && descriptions.is_empty() {
        return Ok(CheckOutcome::default());
    }

    let prompt = prompts::checker_prompt(ad, &headlines, &descriptions);
    let raw = provider
        .generate(&prompt, prompts::REVIEWER_SYSTEM)
        .await?;
    let reported = parse::extract_violations(&raw);
    if reported.is_empty() {
        debug!(ad_id = %ad.ad_id, "checker reported no violations");
        return Ok(CheckOutcome {
            headlines,
            descriptions,
            violations: Vec::new(),
        });
    }

    let mut violations: Vec<Violation> = Vec::new();
    let mut drop_headlines: Vec<usize> = Vec::new();
    let mut drop_descriptions: Vec<usize> = Vec::new();

    for rv in reported {
        let (Some(kind), Some(index)) = (rv.kind, rv.index) else {
            warn!(ad_id = %ad.ad_id, reason = %rv.reason, "ignoring malformed violation");
            continue;
        };
        let (texts, drops) = match kind {
            CopyKind::Headline => (&headlines, &mut drop_headlines),
            CopyKind::Description => (&descriptions, &mut drop_descriptions),
        };
        if index >= texts.len() {
            warn!(ad_id = %ad.ad_id, %kind, index, "ignoring out-of-range violation");
            continue;
        }
        if !drops.contains(&index) {
            drops.push(index);
        }
        violations.push(Violation {
            kind,
            index,
            text: texts[index].clone(),
            reason: rv.reason,
            suggestion: rv.suggestion,
        });
    }

    let keep = |texts: Vec<String>, drops: &[usize]| -> Vec<String> {
        texts
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !drops.contains(i))
            .map(|(_, t)| t)
            .collect()
    };

    Ok(CheckOutcome {
        headlines: keep(headlines, &drop_headlines),
        descriptions: keep(descriptions, &drop_descriptions),
        violations,
    })
}
