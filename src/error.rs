/// Centralized error types for mclocalizer using thiserror
///
/// Parse failures of analysed source are not errors here: the declaration
/// locator degrades to an empty span list instead of failing.
use thiserror::Error;

/// Main error type for the localizer
#[derive(Error, Debug)]
pub enum LocalizerError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by the commit history and blame providers
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git repository not found at: {0}")]
    RepoNotFound(String),

    #[error("Failed to resolve revision '{rev}': {reason}")]
    RevisionNotFound { rev: String, reason: String },

    #[error("Failed to walk history: {0}")]
    WalkFailed(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Failed to diff commit {commit}: {reason}")]
    DiffFailed { commit: String, reason: String },

    #[error("Failed to read blob for '{path}' in {commit}: {reason}")]
    ContentUnreadable {
        commit: String,
        path: String,
        reason: String,
    },

    #[error("Failed to blame '{path}' at {commit}: {reason}")]
    BlameFailed {
        commit: String,
        path: String,
        reason: String,
    },
}

impl GitError {
    /// True when the failure is scoped to a single commit's contents rather
    /// than to the history as a whole.
    pub fn is_commit_scoped(&self) -> bool {
        matches!(
            self,
            GitError::DiffFailed { .. }
                | GitError::ContentUnreadable { .. }
                | GitError::BlameFailed { .. }
        )
    }
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors raised while preparing a declaration grammar
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to set parser language: {0}")]
    LanguageRejected(String),

    #[error("Invalid declaration query: {0}")]
    InvalidQuery(String),

    #[error("Declaration query has no capture named '{0}'")]
    MissingCapture(String),
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, LocalizerError>;

// Conversion from anyhow::Error to LocalizerError
impl From<anyhow::Error> for LocalizerError {
    fn from(err: anyhow::Error) -> Self {
        LocalizerError::Other(format!("{:#}", err))
    }
}

impl LocalizerError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        LocalizerError::Other(msg.into())
    }

    /// Whether a scan may record this failure against one commit and move on
    pub fn is_commit_scoped(&self) -> bool {
        matches!(self, LocalizerError::Git(err) if err.is_commit_scoped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LocalizerError::Git(GitError::CommitNotFound("abc123".to_string()));
        assert_eq!(err.to_string(), "Git error: Commit not found: abc123");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LocalizerError = io_err.into();
        assert!(matches!(err, LocalizerError::Io(_)));
    }

    #[test]
    fn test_error_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("test error");
        let err: LocalizerError = anyhow_err.into();
        assert!(matches!(err, LocalizerError::Other(_)));
    }

    #[test]
    fn test_commit_scoped_classification() {
        let scoped: LocalizerError = GitError::DiffFailed {
            commit: "abc".to_string(),
            reason: "corrupt tree".to_string(),
        }
        .into();
        assert!(scoped.is_commit_scoped());

        let fatal: LocalizerError = GitError::WalkFailed("broken ref".to_string()).into();
        assert!(!fatal.is_commit_scoped());

        let io: LocalizerError =
            std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert!(!io.is_commit_scoped());
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            key: "history.jobs".to_string(),
            reason: "must be greater than 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'history.jobs': must be greater than 0"
        );
    }

    #[test]
    fn test_blame_failed_display() {
        let err = GitError::BlameFailed {
            commit: "deadbeef".to_string(),
            path: "src/Foo.java".to_string(),
            reason: "path not in tree".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to blame 'src/Foo.java' at deadbeef: path not in tree"
        );
    }

    #[test]
    fn test_other() {
        let err = LocalizerError::other("custom error message");
        assert_eq!(err.to_string(), "custom error message");
    }
}
