//! Tolerant parsing of model responses.
//!
//! Model output is treated as hostile: markdown fences, prose around the
//! JSON, missing keys, and wrong value types all degrade to empty results
//! instead of errors. The generation loop compensates with retries.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::domain::models::{CopyKind, Strategy};

static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```(?:json)?\s*$").expect("valid regex"));
static BRACE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Strip markdown code fences so the payload parses as bare JSON.
pub fn strip_fences(raw: &str) -> String {
    FENCE_OPEN_RE.replace_all(raw.trim(), "").trim().to_string()
}

fn parse_json_lenient(raw: &str) -> Option<Value> {
    let cleaned = strip_fences(raw);
    if let Ok(v) = serde_json::from_str::<Value>(&cleaned) {
        return Some(v);
    }
    // Fall back to the first {...} block embedded in surrounding prose.
    let block = BRACE_BLOCK_RE.find(&cleaned)?;
    serde_json::from_str(block.as_str()).ok()
}

/// Extract `{"<key>": ["...", ...]}` from a model response.
///
/// Non-string array elements are skipped; a missing key, a non-array value,
/// or unparseable JSON all yield an empty vec.
pub fn extract_string_array(raw: &str, key: &str) -> Vec<String> {
    let Some(value) = parse_json_lenient(raw) else {
        return Vec::new();
    };
    let Some(items) = value.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(|s| s.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A checker-reported violation before index/kind validation.
#[derive(Debug, Clone)]
pub struct RawViolation {
    pub kind: Option<CopyKind>,
    pub index: Option<usize>,
    pub reason: String,
    pub suggestion: Option<String>,
}

fn field_str(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract `{"violations": [...]}` from a checker response.
///
/// Each element is read field-by-field so one malformed entry does not
/// poison the rest. An unparseable response yields an empty list, which the
/// checker interprets as "no violations found".
pub fn extract_violations(raw: &str) -> Vec<RawViolation> {
    let Some(value) = parse_json_lenient(raw) else {
        return Vec::new();
    };
    let Some(items) = value.get("violations").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let kind = obj
                .get("type")
                .and_then(Value::as_str)
                .and_then(CopyKind::parse_tag);
            let index = obj
                .get("index")
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok());
            let reason = field_str(item, "issue")
                .or_else(|| field_str(item, "reason"))
                .unwrap_or_else(|| "unspecified".to_string());
            Some(RawViolation {
                kind,
                index,
                reason,
                suggestion: field_str(item, "suggestion"),
            })
        })
        .collect()
}

/// Parse a strategy response; any shortfall falls back to a generic
/// directive so generation can always proceed.
pub fn parse_strategy(raw: &str, ad_id: &str) -> Strategy {
    let Some(value) = parse_json_lenient(raw) else {
        return Strategy::fallback(ad_id);
    };
    let Some(directive) = field_str(&value, "directive").or_else(|| field_str(&value, "hypothesis"))
    else {
        return Strategy::fallback(ad_id);
    };
    Strategy {
        ad_id: ad_id.to_string(),
        directive,
        analysis: field_str(&value, "analysis").unwrap_or_default(),
    }
}

/// Parse a brand-voice guideline response. Plain text is accepted as-is;
/// a JSON object may carry it under "guideline".
pub fn parse_brand_voice(raw: &str) -> Option<String> {
    let cleaned = strip_fences(raw);
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return field_str(&value, "guideline");
    }
    Some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        let raw = "```json\n{\"headlines\": []}\n```";
        assert_eq!(strip_fences(raw), "{\"headlines\": []}");
        assert_eq!(strip_fences("plain"), "plain");
    }

    #[test]
    fn test_extract_string_array_happy_path() {
        let raw = r#"{"headlines": ["One", " Two ", ""]}"#;
        assert_eq!(
            extract_string_array(raw, "headlines"),
            vec!["One".to_string(), "Two".to_string()]
        );
    }

    #[test]
    fn test_extract_string_array_fenced() {
        let raw = "```json\n{\"descriptions\": [\"A fine thing\"]}\n```";
        assert_eq!(
            extract_string_array(raw, "descriptions"),
            vec!["A fine thing".to_string()]
        );
    }

    #[test]
    fn test_extract_string_array_degrades_to_empty() {
        assert!(extract_string_array("not json at all", "headlines").is_empty());
        assert!(extract_string_array(r#"{"other": []}"#, "headlines").is_empty());
        assert!(extract_string_array(r#"{"headlines": "oops"}"#, "headlines").is_empty());
        assert!(extract_string_array(r#"{"headlines": [1, 2]}"#, "headlines").is_empty());
    }

    #[test]
    fn test_extract_violations_with_prose_fallback() {
        let raw = r#"Here is my review:
{"violations": [{"type": "headline", "index": 2, "issue": "too vague", "suggestion": "Name the offer"}]}
Hope that helps."#;
        let v = extract_violations(raw);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, Some(CopyKind::Headline));
        assert_eq!(v[0].index, Some(2));
        assert_eq!(v[0].reason, "too vague");
        assert_eq!(v[0].suggestion.as_deref(), Some("Name the offer"));
    }

    #[test]
    fn test_extract_violations_tolerates_bad_entries() {
        let raw = r#"{"violations": [
            {"type": "banner", "index": 0, "reason": "unknown type"},
            {"type": "DESCRIPTION", "reason": "no index"},
            "not an object"
        ]}"#;
        let v = extract_violations(raw);
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].kind, None);
        assert_eq!(v[1].kind, Some(CopyKind::Description));
        assert_eq!(v[1].index, None);
        assert_eq!(v[1].reason, "no index");
    }

    #[test]
    fn test_extract_violations_malformed_is_empty() {
        assert!(extract_violations("sorry, I cannot").is_empty());
        assert!(extract_violations(r#"{"violations": "none"}"#).is_empty());
    }

    #[test]
    fn test_parse_strategy_fallback() {
        let s = parse_strategy("no json here", "ad-7");
        assert_eq!(s.ad_id, "ad-7");
        assert!(s.directive.contains("ad-7"));
    }

    #[test]
    fn test_parse_strategy_accepts_hypothesis_key() {
        let s = parse_strategy(
            r#"{"hypothesis": "Lead with speed", "analysis": "CTR is low"}"#,
            "ad-1",
        );
        assert_eq!(s.directive, "Lead with speed");
        assert_eq!(s.analysis, "CTR is low");
    }

    #[test]
    fn test_parse_brand_voice() {
        assert_eq!(
            parse_brand_voice("Keep it warm and direct."),
            Some("Keep it warm and direct.".to_string())
        );
        assert_eq!(
            parse_brand_voice(r#"{"guideline": "Short sentences"}"#),
            Some("Short sentences".to_string())
        );
        assert_eq!(parse_brand_voice("   "), None);
    }
}
