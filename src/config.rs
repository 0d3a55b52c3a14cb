/// Configuration system for mclocalizer
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::blame::{BlameMode, BlameResolver};
use crate::error::{ConfigError, LocalizerError};
use crate::explorer::ExplorerFactory;
use crate::filters::{
    CommitFilters, DateRangeFilter, ExtensionFileFilter, FileFilters, FixKeywordFilter,
    GlobExcludeFilter, NoTestDirFilter, DEFAULT_FIX_KEYWORDS,
};
use crate::git::WalkOptions;
use crate::locator::DeclarationGrammar;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File looked up in the analysed repository when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = ".mclocalizer.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// What is localized and which commits and files count
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Which part of the history is walked
    #[serde(default)]
    pub history: HistoryConfig,

    /// Bug-introduction tracing
    #[serde(default)]
    pub blame: BlameConfig,

    /// Where results are written
    #[serde(default)]
    pub output: OutputConfig,
}

/// Subject of the investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum TargetKind {
    /// Every touched file
    #[default]
    File,
    /// Top-level Java type declarations
    JavaClass,
    /// Touched Java files
    JavaFile,
}

impl TargetKind {
    pub fn is_java(&self) -> bool {
        matches!(self, TargetKind::JavaClass | TargetKind::JavaFile)
    }

    /// Explorer factory for this target kind
    pub fn explorer_factory(&self) -> Result<ExplorerFactory, LocalizerError> {
        Ok(match self {
            TargetKind::File | TargetKind::JavaFile => ExplorerFactory::File,
            TargetKind::JavaClass => {
                ExplorerFactory::Declaration(Arc::new(DeclarationGrammar::java()?))
            }
        })
    }
}

/// Blame tracing setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BlameSetting {
    #[default]
    None,
    All,
    Oldest,
}

impl BlameSetting {
    pub fn resolver(&self) -> Option<BlameResolver> {
        match self {
            BlameSetting::None => None,
            BlameSetting::All => Some(BlameResolver::new(BlameMode::All)),
            BlameSetting::Oldest => Some(BlameResolver::new(BlameMode::Oldest)),
        }
    }
}

/// Analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Target kind: "file", "java_class" or "java_file"
    #[serde(default)]
    pub target: TargetKind,

    /// Inspect every commit instead of only fixing ones
    #[serde(default)]
    pub all_commits: bool,

    /// Keep changes made under test directories
    #[serde(default)]
    pub include_test_dirs: bool,

    /// Words marking a commit message as a fix
    #[serde(default = "default_fix_keywords")]
    pub fix_keywords: Vec<String>,

    /// Glob patterns of paths to ignore
    #[serde(default)]
    pub exclude_globs: Vec<String>,

    /// Earliest author date, RFC 3339 or YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,

    /// Latest author date, RFC 3339 or YYYY-MM-DD (whole day included)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

/// History walk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Revision the walk starts from
    #[serde(default = "default_rev")]
    pub rev: String,

    /// Only inspect the newest N commits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<usize>,

    /// Oldest commits first
    #[serde(default)]
    pub reverse: bool,

    /// Parallel partitions of the history
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

/// Blame configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlameConfig {
    /// "none", "all" or "oldest"
    #[serde(default)]
    pub mode: BlameSetting,

    /// Do not blame blank and comment-only lines
    #[serde(default = "default_skip_trivial_lines")]
    pub skip_trivial_lines: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Per-commit CSV
    #[serde(default = "default_result_path")]
    pub result_path: PathBuf,

    /// Ranked statistics CSV
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_path: Option<PathBuf>,

    /// Write a row for every report kind, not only COMPLETE
    #[serde(default)]
    pub include_all_kinds: bool,
}

// Default value functions
fn default_fix_keywords() -> Vec<String> {
    DEFAULT_FIX_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_rev() -> String {
    "HEAD".to_string()
}

fn default_jobs() -> usize {
    1
}

fn default_skip_trivial_lines() -> bool {
    true
}

fn default_result_path() -> PathBuf {
    PathBuf::from("result.csv")
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target: TargetKind::default(),
            all_commits: false,
            include_test_dirs: false,
            fix_keywords: default_fix_keywords(),
            exclude_globs: Vec::new(),
            since: None,
            until: None,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            rev: default_rev(),
            max_count: None,
            reverse: false,
            jobs: default_jobs(),
        }
    }
}

impl Default for BlameConfig {
    fn default() -> Self {
        Self {
            mode: BlameSetting::default(),
            skip_trivial_lines: default_skip_trivial_lines(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_path: default_result_path(),
            stats_path: None,
            include_all_kinds: false,
        }
    }
}

impl AnalysisConfig {
    pub fn since_date(&self) -> Result<Option<DateTime<Utc>>, LocalizerError> {
        self.since
            .as_deref()
            .map(|s| parse_date("analysis.since", s, false))
            .transpose()
    }

    pub fn until_date(&self) -> Result<Option<DateTime<Utc>>, LocalizerError> {
        self.until
            .as_deref()
            .map(|s| parse_date("analysis.until", s, true))
            .transpose()
    }

    /// Fix-keyword filter unless every commit is inspected, then the date window
    pub fn commit_filters(&self) -> Result<CommitFilters, LocalizerError> {
        let mut filters = CommitFilters::new();
        if !self.all_commits {
            filters.push(FixKeywordFilter::new(&self.fix_keywords)?);
        }
        let (since, until) = (self.since_date()?, self.until_date()?);
        if since.is_some() || until.is_some() {
            filters.push(DateRangeFilter::new(since, until));
        }
        Ok(filters)
    }

    /// Java extension for Java targets, then test directories, then globs
    pub fn file_filters(&self) -> Result<FileFilters, LocalizerError> {
        let mut filters = FileFilters::new();
        if self.target.is_java() {
            filters.push(ExtensionFileFilter::java());
        }
        if !self.include_test_dirs {
            filters.push(NoTestDirFilter::new());
        }
        if !self.exclude_globs.is_empty() {
            filters.push(GlobExcludeFilter::new(&self.exclude_globs)?);
        }
        Ok(filters)
    }
}

impl HistoryConfig {
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            rev: self.rev.clone(),
            max_count: self.max_count,
            reverse: self.reverse,
        }
    }
}

/// Parse an RFC 3339 timestamp or a bare date.
///
/// A bare date means midnight UTC, or the last second of that day when
/// `end_of_day` is set.
fn parse_date(key: &str, value: &str, end_of_day: bool) -> Result<DateTime<Utc>, LocalizerError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        reason: format!("expected RFC 3339 or YYYY-MM-DD, got '{}'", value),
    };
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    Ok(time.ok_or_else(invalid)?.and_utc())
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, LocalizerError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        Ok(config)
    }

    /// Load `explicit` if given, else the repository's own config file, else defaults
    pub fn load_or_default(explicit: Option<&Path>, repo: &Path) -> Result<Self, LocalizerError> {
        if let Some(path) = explicit {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let repo_config = repo.join(DEFAULT_CONFIG_FILE);
        if repo_config.exists() {
            tracing::info!("Loading config from: {}", repo_config.display());
            Self::from_file(&repo_config)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values once every layer has been applied
    pub fn validate(&self) -> Result<(), LocalizerError> {
        // Keywords are unused when every commit is inspected
        if !self.analysis.all_commits
            && self.analysis.fix_keywords.iter().all(|k| k.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                key: "analysis.fix_keywords".to_string(),
                reason: "must contain at least one keyword".to_string(),
            }
            .into());
        }

        // Reports the offending pattern
        GlobExcludeFilter::new(&self.analysis.exclude_globs)?;

        let (since, until) = (self.analysis.since_date()?, self.analysis.until_date()?);
        if let (Some(since), Some(until)) = (since, until)
            && since > until
        {
            return Err(ConfigError::InvalidValue {
                key: "analysis.since".to_string(),
                reason: format!("{} is after analysis.until {}", since, until),
            }
            .into());
        }

        if self.history.jobs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "history.jobs".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.history.max_count == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "history.max_count".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.history.rev.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "history.rev".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(target) = std::env::var("MCLOCALIZER_TARGET")
            && let Some(kind) = parse_enum::<TargetKind>(&target)
        {
            self.analysis.target = kind;
        }

        if let Some(all) = env_flag("MCLOCALIZER_ALL_COMMITS") {
            self.analysis.all_commits = all;
        }

        if let Some(include) = env_flag("MCLOCALIZER_INCLUDE_TEST_DIRS") {
            self.analysis.include_test_dirs = include;
        }

        // Comma separated
        if let Ok(keywords) = std::env::var("MCLOCALIZER_FIX_KEYWORDS") {
            self.analysis.fix_keywords = keywords
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }

        if let Ok(rev) = std::env::var("MCLOCALIZER_REV") {
            self.history.rev = rev;
        }

        if let Ok(max_count) = std::env::var("MCLOCALIZER_MAX_COUNT")
            && let Ok(count) = max_count.parse()
        {
            self.history.max_count = Some(count);
        }

        if let Ok(jobs) = std::env::var("MCLOCALIZER_JOBS")
            && let Ok(jobs) = jobs.parse()
        {
            self.history.jobs = jobs;
        }

        if let Ok(mode) = std::env::var("MCLOCALIZER_BLAME")
            && let Some(mode) = parse_enum::<BlameSetting>(&mode)
        {
            self.blame.mode = mode;
        }

        if let Ok(path) = std::env::var("MCLOCALIZER_OUTPUT") {
            self.output.result_path = PathBuf::from(path);
        }
    }

    /// Create a new Config from the config file and environment overrides.
    ///
    /// The result is not validated; callers apply CLI flags first and then
    /// call [`Config::validate`].
    pub fn new(explicit: Option<&Path>, repo: &Path) -> Result<Self, LocalizerError> {
        let mut config = Self::load_or_default(explicit, repo)?;
        config.apply_env_overrides();
        Ok(config)
    }
}

fn parse_enum<T: clap::ValueEnum>(value: &str) -> Option<T> {
    T::from_str(value.trim(), true).ok()
}

fn env_flag(name: &str) -> Option<bool> {
    match std::env::var(name).ok()?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::{commit_with_message, file_with_paths};
    use chrono::TimeZone;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.target, TargetKind::File);
        assert!(!config.analysis.all_commits);
        assert_eq!(config.analysis.fix_keywords, vec!["fix", "fixed", "fixes", "fixing"]);
        assert_eq!(config.history.rev, "HEAD");
        assert_eq!(config.history.jobs, 1);
        assert_eq!(config.blame.mode, BlameSetting::None);
        assert!(config.blame.skip_trivial_lines);
        assert_eq!(config.output.result_path, PathBuf::from("result.csv"));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_keywords() {
        let mut config = Config::default();
        config.analysis.fix_keywords = vec![" ".to_string()];
        assert!(matches!(
            config.validate(),
            Err(LocalizerError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_validate_ignores_keywords_when_all_commits() {
        let mut config = Config::default();
        config.analysis.fix_keywords.clear();
        config.analysis.all_commits = true;
        assert!(config.validate().is_ok());
        assert!(config.analysis.commit_filters().unwrap().is_empty());
    }

    #[test]
    fn test_from_file_does_not_validate() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[history]\njobs = 0\n").unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(config.history.jobs, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_jobs_and_max_count() {
        let mut config = Config::default();
        config.history.jobs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.history.max_count = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_dates() {
        let mut config = Config::default();
        config.analysis.since = Some("last tuesday".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.since = Some("2024-06-01".to_string());
        config.analysis.until = Some("2024-01-01".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_invalid_glob() {
        let mut config = Config::default();
        config.analysis.exclude_globs = vec!["src/[oops".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_date_forms() {
        let mut config = Config::default();
        config.analysis.since = Some("2024-03-01".to_string());
        config.analysis.until = Some("2024-03-01".to_string());
        assert_eq!(
            config.analysis.since_date().unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            config.analysis.until_date().unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap())
        );

        config.analysis.since = Some("2024-03-01T12:00:00+02:00".to_string());
        assert_eq!(
            config.analysis.since_date().unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_from_file_partial_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let partial = r#"
[analysis]
target = "java_class"
exclude_globs = ["**/generated/**"]

[blame]
mode = "oldest"
"#;
        std::fs::write(temp_file.path(), partial).unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(config.analysis.target, TargetKind::JavaClass);
        assert_eq!(config.analysis.exclude_globs, vec!["**/generated/**"]);
        assert_eq!(config.blame.mode, BlameSetting::Oldest);
        // Untouched sections keep their defaults
        assert_eq!(config.history.rev, "HEAD");
        assert_eq!(config.analysis.fix_keywords.len(), 4);
    }

    #[test]
    fn test_from_file_empty_file_is_default() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "").unwrap();
        let config = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(config.history.jobs, 1);
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "invalid toml {{{ content").unwrap();

        let result = Config::from_file(temp_file.path());
        assert!(matches!(
            result.unwrap_err(),
            LocalizerError::Config(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn test_from_file_unknown_target() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[analysis]\ntarget = \"cobol_paragraph\"\n").unwrap();
        assert!(Config::from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::from_file(Path::new("/nonexistent/mclocalizer.toml"));
        assert!(matches!(
            result.unwrap_err(),
            LocalizerError::Config(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_or_default_finds_repo_config() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            Config::load_or_default(None, dir.path()).unwrap().history.jobs,
            1
        );

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[history]\njobs = 4\n").unwrap();
        assert_eq!(
            Config::load_or_default(None, dir.path()).unwrap().history.jobs,
            4
        );
    }

    #[test]
    fn test_toml_round_trip_keeps_sections() {
        let mut config = Config::default();
        config.output.stats_path = Some(PathBuf::from("stats.csv"));
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("fix_keywords"));
        assert!(toml_str.contains("stats_path"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.output.stats_path, Some(PathBuf::from("stats.csv")));
    }

    #[test]
    fn test_apply_env_overrides() {
        // Safety: This test is single-threaded and we clean up after ourselves
        unsafe {
            std::env::set_var("MCLOCALIZER_TARGET", "java_class");
            std::env::set_var("MCLOCALIZER_ALL_COMMITS", "true");
            std::env::set_var("MCLOCALIZER_FIX_KEYWORDS", "bug, patch");
            std::env::set_var("MCLOCALIZER_JOBS", "not_a_number");
            std::env::set_var("MCLOCALIZER_BLAME", "all");
        }

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.analysis.target, TargetKind::JavaClass);
        assert!(config.analysis.all_commits);
        assert_eq!(config.analysis.fix_keywords, vec!["bug", "patch"]);
        // Unparsable values are ignored
        assert_eq!(config.history.jobs, 1);
        assert_eq!(config.blame.mode, BlameSetting::All);

        // Safety: This test is single-threaded and we're cleaning up test state
        unsafe {
            std::env::remove_var("MCLOCALIZER_TARGET");
            std::env::remove_var("MCLOCALIZER_ALL_COMMITS");
            std::env::remove_var("MCLOCALIZER_FIX_KEYWORDS");
            std::env::remove_var("MCLOCALIZER_JOBS");
            std::env::remove_var("MCLOCALIZER_BLAME");
        }
    }

    #[test]
    fn test_java_class_preset_filters() {
        let mut analysis = AnalysisConfig::default();
        analysis.target = TargetKind::JavaClass;

        let files = analysis.file_filters().unwrap();
        assert_eq!(files.names(), vec!["extension", "no-test-dir"]);
        assert!(files.passes(&file_with_paths(None, Some("src/main/Foo.java"))));
        assert!(!files.passes(&file_with_paths(None, Some("src/test/FooTest.java"))));
        assert!(!files.passes(&file_with_paths(None, Some("README.md"))));

        let commits = analysis.commit_filters().unwrap();
        assert!(commits.passes(&commit_with_message("Fixes #12")));
        assert!(!commits.passes(&commit_with_message("Add feature")));
    }

    #[test]
    fn test_file_preset_with_all_commits_and_tests() {
        let analysis = AnalysisConfig {
            all_commits: true,
            include_test_dirs: true,
            ..AnalysisConfig::default()
        };
        assert!(analysis.file_filters().unwrap().is_empty());
        assert!(analysis.commit_filters().unwrap().is_empty());
    }

    #[test]
    fn test_date_window_adds_commit_filter() {
        let analysis = AnalysisConfig {
            all_commits: true,
            since: Some("2024-01-01".to_string()),
            ..AnalysisConfig::default()
        };
        assert_eq!(analysis.commit_filters().unwrap().names(), vec!["date-range"]);
    }

    #[test]
    fn test_explorer_factory_per_target() {
        assert!(matches!(
            TargetKind::JavaFile.explorer_factory().unwrap(),
            ExplorerFactory::File
        ));
        assert!(matches!(
            TargetKind::JavaClass.explorer_factory().unwrap(),
            ExplorerFactory::Declaration(_)
        ));
    }

    #[test]
    fn test_blame_setting_resolver() {
        assert!(BlameSetting::None.resolver().is_none());
        assert_eq!(
            BlameSetting::Oldest.resolver().map(|r| r.mode()),
            Some(BlameMode::Oldest)
        );
    }

    #[test]
    fn test_walk_options_from_history() {
        let history = HistoryConfig {
            rev: "main".to_string(),
            max_count: Some(5),
            reverse: true,
            jobs: 2,
        };
        let walk = history.walk_options();
        assert_eq!(walk.rev, "main");
        assert_eq!(walk.max_count, Some(5));
        assert!(walk.reverse);
    }
}
