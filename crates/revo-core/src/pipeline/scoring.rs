//! Relevance scoring and file selection
//!
//! Every path gets the sum of the weights of the table patterns it contains.
//! Binary and junk files always get [`EXCLUDED_SCORE`] and are never selected.

use crate::error::{RevoError, RevoResult};
use crate::types::ScoredFile;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Hard-exclude sentinel for binary and junk files
pub const EXCLUDED_SCORE: i32 = -999;

static JUNK_EXTENSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(png|jpg|jpeg|gif|svg|ico|map|lock|zip|pdf|mp4|exe|dll)$")
        .expect("valid junk extension regex")
});

/// Whether a path names a binary or otherwise useless file
pub fn is_junk(path: &str) -> bool {
    JUNK_EXTENSION_RE.is_match(path)
}

/// A `(substring, weight)` pair of the scoring table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedPattern {
    pub pattern: String,
    pub weight: i32,
}

impl WeightedPattern {
    pub fn new(pattern: impl Into<String>, weight: i32) -> Self {
        Self {
            pattern: pattern.into(),
            weight,
        }
    }
}

/// Ordered pattern table plus the extension set used when nothing scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTable {
    pub patterns: Vec<WeightedPattern>,
    pub fallback_extensions: Vec<String>,
}

impl Default for ScoringTable {
    fn default() -> Self {
        let patterns = [
            ("readme", 10),
            ("package.json", 10),
            ("requirements.txt", 10),
            ("setup.py", 10),
            ("pyproject.toml", 10),
            ("main.", 9),
            ("index.", 9),
            ("app.", 9),
            ("src/", 7),
            ("lib/", 7),
            ("core/", 7),
            ("backend/", 6),
            ("components/", 6),
            ("dockerfile", 5),
            (".github/workflows", 4),
            ("tests/", 4),
            ("docs/", 3),
            (".env.example", 3),
            ("makefile", 3),
            ("license", 2),
        ]
        .into_iter()
        .map(|(pattern, weight)| WeightedPattern::new(pattern, weight))
        .collect();

        let fallback_extensions = ["js", "ts", "py", "java", "go", "md", "json", "yaml", "yml"]
            .into_iter()
            .map(String::from)
            .collect();

        Self {
            patterns,
            fallback_extensions,
        }
    }
}

impl ScoringTable {
    /// Reject empty patterns and extensions
    pub fn validate(&self) -> RevoResult<()> {
        if let Some(empty) = self.patterns.iter().position(|p| p.pattern.trim().is_empty()) {
            return Err(RevoError::config(format!(
                "scoring pattern #{} is empty",
                empty + 1
            )));
        }
        if self.fallback_extensions.iter().any(|e| e.trim().is_empty()) {
            return Err(RevoError::config("fallback extensions must not be empty"));
        }
        Ok(())
    }

    /// Score one path against the table
    pub fn score(&self, path: &str) -> i32 {
        if is_junk(path) {
            return EXCLUDED_SCORE;
        }
        let lower = path.to_lowercase();
        self.patterns
            .iter()
            .filter(|p| lower.contains(&p.pattern.to_lowercase()))
            .map(|p| p.weight)
            .sum()
    }

    fn has_fallback_extension(&self, path: &str) -> bool {
        let Some((_, ext)) = path.rsplit_once('.') else {
            return false;
        };
        if ext.contains('/') {
            return false;
        }
        self.fallback_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

/// Outcome of one selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Paths to fetch, most relevant first
    pub paths: Vec<String>,
    /// Set when no path scored positively and the extension fallback was used
    pub used_fallback: bool,
}

/// Ranks candidate paths and picks the ones worth sampling
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    table: ScoringTable,
}

impl RelevanceScorer {
    pub fn new(table: ScoringTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ScoringTable {
        &self.table
    }

    /// All positively scored paths, highest first, ties in input order
    pub fn rank(&self, paths: &[String]) -> Vec<ScoredFile> {
        let mut ranked: Vec<ScoredFile> = paths
            .iter()
            .map(|path| ScoredFile {
                path: path.clone(),
                score: self.table.score(path),
            })
            .filter(|f| f.score > 0)
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    /// Select at most `limit` paths for sampling
    pub fn select(&self, paths: &[String], limit: usize) -> Selection {
        let ranked = self.rank(paths);
        if !ranked.is_empty() {
            return Selection {
                paths: ranked.into_iter().take(limit).map(|f| f.path).collect(),
                used_fallback: false,
            };
        }

        let paths = paths
            .iter()
            .filter(|p| !is_junk(p) && self.table.has_fallback_extension(p))
            .take(limit)
            .cloned()
            .collect();
        Selection {
            paths,
            used_fallback: true,
        }
    }
}
