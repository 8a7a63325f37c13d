//! Rule-based compliance filter for live runs.
//!
//! A deterministic backstop behind the LLM checker: copy matching a risk
//! pattern is removed outright, with a softened rewrite attached as a
//! suggestion for the operator. No provider calls are made here.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::models::{CopyKind, Violation};

struct RiskRule {
    pattern: &'static LazyLock<Regex>,
    reason: &'static str,
}

static GUARANTEE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bguarantee[ds]?\b").expect("valid regex"));
static BEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbest\b").expect("valid regex"));
static NUMBER_ONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bno\.?\s*1\b|#1").expect("valid regex"));
static HUNDRED_PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"100%").expect("valid regex"));
static ABSOLUTE_VI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)cam kết|tuyệt đối").expect("valid regex"));
static MEDICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcure[sd]?\b|\bheal(?:s|ing)?\b").expect("valid regex"));
static FINANCIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\binvest(?:ment)?\s+returns?\b|\bprofit\s+guarantee\b").expect("valid regex")
});

static RISK_RULES: LazyLock<Vec<RiskRule>> = LazyLock::new(|| {
    vec![
        RiskRule {
            pattern: &GUARANTEE_RE,
            reason: "guarantee claim",
        },
        RiskRule {
            pattern: &BEST_RE,
            reason: "unverifiable superlative",
        },
        RiskRule {
            pattern: &NUMBER_ONE_RE,
            reason: "number-one claim",
        },
        RiskRule {
            pattern: &HUNDRED_PERCENT_RE,
            reason: "absolute percentage claim",
        },
        RiskRule {
            pattern: &ABSOLUTE_VI_RE,
            reason: "absolute claim",
        },
        RiskRule {
            pattern: &MEDICAL_RE,
            reason: "medical claim",
        },
        RiskRule {
            pattern: &FINANCIAL_RE,
            reason: "financial-return claim",
        },
    ]
});

/// Every matching risk reason, in rule order. Also used to screen
/// replacement copy before it rejoins the accepted set.
pub fn risk_reasons(text: &str) -> Vec<&'static str> {
    RISK_RULES
        .iter()
        .filter(|r| r.pattern.is_match(text))
        .map(|r| r.reason)
        .collect()
}

/// Soften risky wording with lexical substitutions. Best-effort; the result
/// is offered as a suggestion, never silently swapped in.
pub fn suggest_revision(text: &str) -> String {
    let mut out = GUARANTEE_RE.replace_all(text, "designed to deliver").to_string();
    out = BEST_RE.replace_all(&out, "leading").to_string();
    out = NUMBER_ONE_RE.replace_all(&out, "top-rated").to_string();
    out = HUNDRED_PERCENT_RE.replace_all(&out, "fully").to_string();
    out = ABSOLUTE_VI_RE.replace_all(&out, "hướng tới").to_string();
    out
}

/// Remove risky claims from both sets, reporting what was removed.
pub fn filter_risky_claims(
    headlines: Vec<String>,
    descriptions: Vec<String>,
) -> (Vec<String>, Vec<String>, Vec<Violation>) {
    let mut violations = Vec::new();

    let mut filter = |texts: Vec<String>, kind: CopyKind| -> Vec<String> {
        texts
            .into_iter()
            .enumerate()
            .filter_map(|(index, text)| {
                let reasons = risk_reasons(&text);
                if reasons.is_empty() {
                    return Some(text);
                }
                violations.push(Violation {
                    kind,
                    index,
                    suggestion: Some(suggest_revision(&text)),
                    text,
                    reason: reasons.join("; "),
                });
                None
            })
            .collect()
    };

    let clean_headlines = filter(headlines, CopyKind::Headline);
    let clean_descriptions = filter(descriptions, CopyKind::Description);
    (clean_headlines, clean_descriptions, violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_copy_passes_through() {
        let (h, d, v) = filter_risky_claims(
            vec!["Fresh spring offers".to_string()],
            vec!["Browse seasonal picks today".to_string()],
        );
        assert_eq!(h.len(), 1);
        assert_eq!(d.len(), 1);
        assert!(v.is_empty());
    }

    #[test]
    fn test_risky_claims_are_removed_with_suggestions() {
        let (h, d, v) = filter_risky_claims(
            vec![
                "Guaranteed savings".to_string(),
                "Quality picks daily".to_string(),
            ],
            vec!["The best results, 100% of the time".to_string()],
        );
        assert_eq!(h, vec!["Quality picks daily".to_string()]);
        assert!(d.is_empty());
        assert_eq!(v.len(), 2);
        assert!(v.iter().all(|x| x.suggestion.is_some()));
        let headline_v = v.iter().find(|x| x.kind == CopyKind::Headline).unwrap();
        assert_eq!(headline_v.reason, "guarantee claim");
        let description_v = v.iter().find(|x| x.kind == CopyKind::Description).unwrap();
        assert_eq!(
            description_v.reason,
            "unverifiable superlative; absolute percentage claim"
        );
    }

    #[test]
    fn test_vietnamese_absolutes_flagged() {
        let (h, _, v) = filter_risky_claims(vec!["Cam kết hoàn tiền".to_string()], vec![]);
        assert!(h.is_empty());
        assert_eq!(v[0].reason, "absolute claim");
    }

    #[test]
    fn test_medical_and_financial_rules() {
        assert_eq!(risk_reasons("Cures everything fast"), vec!["medical claim"]);
        assert_eq!(
            risk_reasons("Huge investment returns await"),
            vec!["financial-return claim"]
        );
        assert!(risk_reasons("A solid everyday choice").is_empty());
    }

    #[test]
    fn test_compound_claims_report_every_rule() {
        assert_eq!(
            risk_reasons("Guaranteed best cure, 100% natural"),
            vec![
                "guarantee claim",
                "unverifiable superlative",
                "absolute percentage claim",
                "medical claim"
            ]
        );
    }

    #[test]
    fn test_suggest_revision_softens() {
        let s = suggest_revision("Guaranteed best results");
        assert!(!GUARANTEE_RE.is_match(&s));
        assert!(!BEST_RE.is_match(&s));
    }
}
