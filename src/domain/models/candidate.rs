//! Copy-kind tags and violation records.

use serde::{Deserialize, Serialize};

/// Which category of ad copy a candidate or violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CopyKind {
    Headline,
    Description,
}

impl CopyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Headline => "HEADLINE",
            Self::Description => "DESCRIPTION",
        }
    }

    /// JSON key the generation sub-agent expects in model responses.
    pub fn json_key(&self) -> &'static str {
        match self {
            Self::Headline => "headlines",
            Self::Description => "descriptions",
        }
    }

    /// Cache namespace suffix appended to the composite key.
    pub fn cache_suffix(&self) -> &'static str {
        match self {
            Self::Headline => ":headlines",
            Self::Description => ":descriptions",
        }
    }

    /// Parse a checker-response type tag. Case-insensitive; unknown tags map
    /// to None so malformed violations are ignored rather than misfiled.
    pub fn parse_tag(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "HEADLINE" => Some(Self::Headline),
            "DESCRIPTION" => Some(Self::Description),
            _ => None,
        }
    }
}

impl std::fmt::Display for CopyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flagged piece of copy, produced by validators, the checker agent, or the
/// rule-based compliance filter. Consumed to build targeted-retry prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub kind: CopyKind,
    pub index: usize,
    pub text: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_case_insensitive() {
        assert_eq!(CopyKind::parse_tag("headline"), Some(CopyKind::Headline));
        assert_eq!(
            CopyKind::parse_tag("Description"),
            Some(CopyKind::Description)
        );
        assert_eq!(CopyKind::parse_tag("banner"), None);
    }

    #[test]
    fn test_cache_suffix() {
        assert_eq!(CopyKind::Headline.cache_suffix(), ":headlines");
        assert_eq!(CopyKind::Description.cache_suffix(), ":descriptions");
    }
}
