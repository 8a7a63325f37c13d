//! Near-duplicate removal and creative-angle diversity enforcement.
//!
//! Similarity is a normalized Levenshtein ratio on a 0-100 scale, computed
//! over Unicode code points so multi-byte scripts compare correctly. Angle
//! classification is a fixed-priority keyword match over five buckets.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Fixed creative-intent buckets. `Benefit` is the fallback bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Angle {
    Urgency,
    SocialProof,
    ProblemSolution,
    Curiosity,
    Benefit,
}

impl Angle {
    /// All buckets, in classification priority order. `Benefit` is last and
    /// doubles as the default when no pattern matches.
    pub const ALL: [Angle; 5] = [
        Angle::Urgency,
        Angle::SocialProof,
        Angle::ProblemSolution,
        Angle::Curiosity,
        Angle::Benefit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgency => "urgency",
            Self::SocialProof => "social_proof",
            Self::ProblemSolution => "problem_solution",
            Self::Curiosity => "curiosity",
            Self::Benefit => "benefit",
        }
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static URGENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(now|today|limited|ending|deadline|hurry|ngay|hom nay|co han)\b")
        .expect("valid regex")
});
static SOCIAL_PROOF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+k|\d+\+|customers|users|trusted|review|đánh giá|khach hang)\b")
        .expect("valid regex")
});
static PROBLEM_SOLUTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(problem|pain|issue|fix|solve|solution|giai phap|khac phuc)\b")
        .expect("valid regex")
});
static CURIOSITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(discover|secret|why|what if|bi mat|kham pha|tai sao)\b").expect("valid regex")
});
static BENEFIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(save|better|easy|faster|value|benefit|tiet kiem|de dang|hieu qua)\b")
        .expect("valid regex")
});

fn angle_pattern(angle: Angle) -> &'static Regex {
    match angle {
        Angle::Urgency => &URGENCY_RE,
        Angle::SocialProof => &SOCIAL_PROOF_RE,
        Angle::ProblemSolution => &PROBLEM_SOLUTION_RE,
        Angle::Curiosity => &CURIOSITY_RE,
        Angle::Benefit => &BENEFIT_RE,
    }
}

/// Classify a text into one creative-angle bucket.
///
/// Buckets are tested in `Angle::ALL` order, case-insensitively; blank input
/// and non-matching input land in `Benefit`.
pub fn classify_angle(text: &str) -> Angle {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return Angle::Benefit;
    }
    for angle in Angle::ALL {
        if angle_pattern(angle).is_match(&t) {
            return angle;
        }
    }
    Angle::Benefit
}

/// Counts per angle bucket for the given texts (blanks skipped).
pub fn angle_distribution<S: AsRef<str>>(texts: &[S]) -> BTreeMap<Angle, usize> {
    let mut counts: BTreeMap<Angle, usize> = Angle::ALL.iter().map(|a| (*a, 0)).collect();
    for t in texts {
        let t = t.as_ref();
        if t.trim().is_empty() {
            continue;
        }
        *counts.entry(classify_angle(t)).or_default() += 1;
    }
    counts
}

/// Levenshtein distance over Unicode code points.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, val) in dp[0].iter_mut().enumerate() {
        *val = j;
    }
    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }
    dp[m][n]
}

/// Normalized edit-distance similarity on a 0-100 scale.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }
    let dist = levenshtein(a, b);
    (1.0 - dist as f64 / max_len as f64) * 100.0
}

/// True when the candidate scores at or above the threshold against any kept
/// text. Comparison is case-insensitive.
pub fn is_near_duplicate(candidate: &str, kept: &[String], threshold: f64) -> bool {
    let lower = candidate.to_lowercase();
    kept.iter()
        .any(|k| similarity_ratio(&lower, &k.to_lowercase()) >= threshold)
}

/// Remove near-duplicates, keeping the first occurrence.
///
/// Blank/whitespace-only entries are dropped unconditionally. Output order is
/// a subsequence of input order.
pub fn dedupe_texts<S: AsRef<str>>(texts: &[S], threshold: f64) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for t in texts {
        let trimmed = t.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if !is_near_duplicate(trimmed, &kept, threshold) {
            kept.push(trimmed.to_string());
        }
    }
    kept
}

/// Result of a diversity-enforcement pass.
#[derive(Debug, Clone)]
pub struct DiversityOutcome {
    /// Selected texts, at most `target_count` of them.
    pub selected: Vec<String>,
    /// Buckets still uncovered when the population was insufficient. Fed
    /// back into the next targeted-retry prompt.
    pub missing_angles: Vec<Angle>,
    /// Angle counts over the selected texts.
    pub distribution: BTreeMap<Angle, usize>,
}

/// Dedupe the input, then greedily cover distinct angles before filling the
/// remaining slots with further non-duplicates, in input order.
pub fn enforce_diversity<S: AsRef<str>>(
    texts: &[S],
    threshold: f64,
    min_distinct_angles: usize,
    target_count: usize,
) -> DiversityOutcome {
    let min_distinct_angles = min_distinct_angles.clamp(1, Angle::ALL.len());

    let deduped = dedupe_texts(texts, threshold);
    if deduped.is_empty() {
        return DiversityOutcome {
            selected: Vec::new(),
            missing_angles: Angle::ALL[..min_distinct_angles].to_vec(),
            distribution: Angle::ALL.iter().map(|a| (*a, 0)).collect(),
        };
    }

    let mut selected: Vec<String> = Vec::new();
    let mut used_angles: std::collections::BTreeSet<Angle> = std::collections::BTreeSet::new();

    // First pass: maximize angle coverage.
    for t in &deduped {
        let angle = classify_angle(t);
        if !used_angles.contains(&angle) {
            selected.push(t.clone());
            used_angles.insert(angle);
            if used_angles.len() >= min_distinct_angles {
                break;
            }
        }
    }

    // Second pass: fill to target_count while respecting the threshold.
    for t in &deduped {
        if selected.len() >= target_count {
            break;
        }
        if selected.contains(t) {
            continue;
        }
        if !is_near_duplicate(t, &selected, threshold) {
            selected.push(t.clone());
            used_angles.insert(classify_angle(t));
        }
    }

    let distribution = angle_distribution(&selected);
    let present = distribution.values().filter(|&&n| n > 0).count();
    let missing_angles = if present >= min_distinct_angles {
        Vec::new()
    } else {
        Angle::ALL
            .iter()
            .filter(|a| distribution.get(a).copied().unwrap_or(0) == 0)
            .take(min_distinct_angles - present)
            .copied()
            .collect()
    };

    DiversityOutcome {
        selected,
        missing_angles,
        distribution,
    }
}
