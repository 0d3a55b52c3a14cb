use clap::Parser;
use mclocalizer::config::{BlameSetting, Config, TargetKind};
use std::path::PathBuf;

/// Find what is notoriously broken in a software repository.
///
/// Processes fixing commits and identifies the code entities they change.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the git repository
    pub repo: PathBuf,

    /// Subject of the investigation
    #[arg(short, long, value_enum)]
    pub target: Option<TargetKind>,

    /// Process every commit, not only the ones whose message mentions a fix
    #[arg(long)]
    pub all_commits: bool,

    /// Include changes made in test directories
    #[arg(long)]
    pub include_test_dirs: bool,

    /// Add a column with the commits blamed for the lines each fix removed
    #[arg(long)]
    pub blame: bool,

    /// Like --blame, but keep only the oldest blamed commit
    #[arg(long, conflicts_with = "blame")]
    pub oldest_blame: bool,

    /// Per-commit CSV output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the ranked statistics to this CSV
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Revision to start walking from
    #[arg(long)]
    pub rev: Option<String>,

    /// Only inspect the newest N commits
    #[arg(long)]
    pub max_count: Option<usize>,

    /// Walk from the oldest commit to the newest
    #[arg(long)]
    pub reverse: bool,

    /// Earliest author date (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Latest author date (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,

    /// Ignore paths matching this glob (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Split the history into this many parallel partitions
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Record commits whose contents cannot be read as ERROR rows and continue
    #[arg(long)]
    pub keep_going: bool,

    /// Write a row for every commit, with its classification
    #[arg(long)]
    pub all_rows: bool,

    /// Configuration file (defaults to .mclocalizer.toml in the repository)
    #[arg(short, long, env = "MCLOCALIZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of top targets printed when done
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Overlay the flags that were given on top of `config`
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(target) = self.target {
            config.analysis.target = target;
        }
        if self.all_commits {
            config.analysis.all_commits = true;
        }
        if self.include_test_dirs {
            config.analysis.include_test_dirs = true;
        }
        if self.since.is_some() {
            config.analysis.since = self.since.clone();
        }
        if self.until.is_some() {
            config.analysis.until = self.until.clone();
        }
        config.analysis.exclude_globs.extend(self.exclude.iter().cloned());

        if let Some(rev) = &self.rev {
            config.history.rev = rev.clone();
        }
        if self.max_count.is_some() {
            config.history.max_count = self.max_count;
        }
        if self.reverse {
            config.history.reverse = true;
        }
        if let Some(jobs) = self.jobs {
            config.history.jobs = jobs;
        }

        if self.oldest_blame {
            config.blame.mode = BlameSetting::Oldest;
        } else if self.blame {
            config.blame.mode = BlameSetting::All;
        }

        if let Some(output) = &self.output {
            config.output.result_path = output.clone();
        }
        if self.stats.is_some() {
            config.output.stats_path = self.stats.clone();
        }
        if self.all_rows {
            config.output.include_all_kinds = true;
        }
    }

    /// Log filter directive for the verbosity flags
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "mclocalizer=debug"
        } else if self.quiet {
            "mclocalizer=warn"
        } else {
            "mclocalizer=info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "mclocalizer",
            "repo",
            "-t",
            "java_class",
            "--oldest-blame",
            "--max-count",
            "50",
            "--exclude",
            "**/gen/**",
            "-o",
            "out.csv",
        ]);
        let mut config = Config::default();
        config.analysis.exclude_globs.push("docs/**".to_string());
        args.apply_to(&mut config);

        assert_eq!(config.analysis.target, TargetKind::JavaClass);
        assert_eq!(config.blame.mode, BlameSetting::Oldest);
        assert_eq!(config.history.max_count, Some(50));
        assert_eq!(config.analysis.exclude_globs, vec!["docs/**", "**/gen/**"]);
        assert_eq!(config.output.result_path, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let args = Args::parse_from(["mclocalizer", "repo"]);
        let mut config = Config::default();
        config.analysis.all_commits = true;
        config.history.jobs = 3;
        args.apply_to(&mut config);

        assert!(config.analysis.all_commits);
        assert_eq!(config.history.jobs, 3);
        assert_eq!(config.blame.mode, BlameSetting::None);
        assert_eq!(args.log_directive(), "mclocalizer=info");
    }

    #[test]
    fn test_flags_override_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(mclocalizer::config::DEFAULT_CONFIG_FILE),
            "[analysis]\nfix_keywords = []\n\n[history]\njobs = 0\n",
        )
        .unwrap();
        let repo = dir.path().to_string_lossy().to_string();

        let args = Args::parse_from(["mclocalizer", repo.as_str(), "--jobs", "4", "--all-commits"]);
        let mut config = Config::new(args.config.as_deref(), &args.repo).unwrap();
        args.apply_to(&mut config);

        assert_eq!(config.history.jobs, 4);
        assert!(config.validate().is_ok());

        // Without the overriding flags the file values are still rejected
        let args = Args::parse_from(["mclocalizer", repo.as_str()]);
        let mut config = Config::new(args.config.as_deref(), &args.repo).unwrap();
        args.apply_to(&mut config);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blame_flags_conflict() {
        assert!(Args::try_parse_from(["mclocalizer", "repo", "--blame", "--oldest-blame"]).is_err());
    }
}
