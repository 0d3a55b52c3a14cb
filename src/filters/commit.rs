use super::CommitFilter;
use crate::error::{ConfigError, Result};
use crate::git::CommitInfo;
use chrono::{DateTime, Utc};
use regex::Regex;

/// Words that mark a commit as a bug fix unless configured otherwise
pub const DEFAULT_FIX_KEYWORDS: [&str; 4] = ["fix", "fixed", "fixes", "fixing"];

/// Passes commits whose message mentions fixing something.
///
/// Keywords match as whole words, case-insensitively.
#[derive(Debug, Clone)]
pub struct FixKeywordFilter {
    pattern: Regex,
}

impl FixKeywordFilter {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "analysis.fix_keywords".to_string(),
                reason: "must contain at least one keyword".to_string(),
            }
            .into());
        }

        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).map_err(
            |e| ConfigError::InvalidValue {
                key: "analysis.fix_keywords".to_string(),
                reason: e.to_string(),
            },
        )?;

        Ok(Self { pattern })
    }
}

impl Default for FixKeywordFilter {
    fn default() -> Self {
        let words = DEFAULT_FIX_KEYWORDS.join("|");
        Self {
            pattern: Regex::new(&format!(r"(?i)\b(?:{})\b", words))
                .expect("default fix keywords form a valid pattern"),
        }
    }
}

impl CommitFilter for FixKeywordFilter {
    fn filter(&self, commit: &CommitInfo) -> bool {
        self.pattern.is_match(&commit.message)
    }

    fn name(&self) -> &'static str {
        "fix-keyword"
    }
}

/// Passes commits authored inside an optional, inclusive time window
#[derive(Debug, Clone, Default)]
pub struct DateRangeFilter {
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

impl DateRangeFilter {
    pub fn new(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        Self { since, until }
    }
}

impl CommitFilter for DateRangeFilter {
    fn filter(&self, commit: &CommitInfo) -> bool {
        self.since.is_none_or(|since| commit.author_date >= since)
            && self.until.is_none_or(|until| commit.author_date <= until)
    }

    fn name(&self) -> &'static str {
        "date-range"
    }
}
