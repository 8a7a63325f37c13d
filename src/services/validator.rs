//! Deterministic copy validation: character ceilings, casing, and the policy
//! regex blocklist.
//!
//! Character limits count Unicode code points, not bytes, so Vietnamese and
//! other multi-byte copy is measured the way ad platforms measure it.

use anyhow::Context;
use regex::Regex;

use crate::domain::models::{CopyKind, PolicyConfig};

/// Compiled policy blocklist. Built once per run from config.
#[derive(Debug, Clone, Default)]
pub struct PolicyRules {
    patterns: Vec<Regex>,
}

impl PolicyRules {
    /// Compile every pattern in the config; a single bad pattern fails the
    /// whole build so misconfiguration surfaces at startup, not mid-run.
    pub fn compile(config: &PolicyConfig) -> anyhow::Result<Self> {
        let patterns = config
            .blocked_patterns
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("invalid policy pattern: {p}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// First matching blocked pattern, if any.
    pub fn first_violation(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|re| re.is_match(text))
            .map(Regex::as_str)
    }
}

/// Visible length in Unicode code points, spaces included.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// True when the text has at least one letter and every letter is uppercase.
fn is_all_caps(text: &str) -> bool {
    let mut saw_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            saw_letter = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    saw_letter
}

fn check_length(text: &str, max_chars: usize) -> Option<String> {
    let n = char_count(text);
    (n > max_chars).then(|| format!("Exceeds {max_chars} chars (has {n})"))
}

fn check_policy(text: &str, rules: &PolicyRules) -> Option<String> {
    rules
        .first_violation(text)
        .map(|pat| format!("Policy violation: matches blocked pattern {pat}"))
}

/// Validate one candidate. Headlines additionally reject all-caps copy.
/// Returns every failed check, not just the first.
pub fn validate_text(
    text: &str,
    kind: CopyKind,
    max_chars: usize,
    rules: &PolicyRules,
) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(e) = check_length(text, max_chars) {
        errors.push(e);
    }
    if kind == CopyKind::Headline && is_all_caps(text) {
        errors.push("All caps not allowed".to_string());
    }
    if let Some(e) = check_policy(text, rules) {
        errors.push(e);
    }
    errors
}
