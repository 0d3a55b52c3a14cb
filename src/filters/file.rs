use super::FileFilter;
use crate::error::{ConfigError, Result};
use crate::git::ModifiedFile;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::sync::LazyLock;

/// Passes files whose old or new path carries the given extension
#[derive(Debug, Clone)]
pub struct ExtensionFileFilter {
    suffix: String,
}

impl ExtensionFileFilter {
    /// `extension` may be given with or without the leading dot
    pub fn new(extension: &str) -> Self {
        Self {
            suffix: format!(".{}", extension.trim_start_matches('.')),
        }
    }

    pub fn java() -> Self {
        Self::new("java")
    }
}

impl FileFilter for ExtensionFileFilter {
    fn filter(&self, file: &ModifiedFile) -> bool {
        file.paths().any(|path| path.ends_with(&self.suffix))
    }

    fn name(&self) -> &'static str {
        "extension"
    }
}

static TEST_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/(?:test|tests|tested|testing)/").expect("test directory pattern is valid")
});

/// Rejects files that live under a test directory on either side of the change
#[derive(Debug, Clone, Default)]
pub struct NoTestDirFilter;

impl NoTestDirFilter {
    pub fn new() -> Self {
        Self
    }

    fn in_test_dir(path: &str) -> bool {
        // Anchor so a top-level `test/` directory matches too
        TEST_DIR.is_match(&format!("/{}", path.trim_start_matches('/')))
    }
}

impl FileFilter for NoTestDirFilter {
    fn filter(&self, file: &ModifiedFile) -> bool {
        !file.paths().any(Self::in_test_dir)
    }

    fn name(&self) -> &'static str {
        "no-test-dir"
    }
}

/// Rejects files whose old or new path matches any of the configured globs
#[derive(Debug, Clone)]
pub struct GlobExcludeFilter {
    set: GlobSet,
}

impl GlobExcludeFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern.as_ref()).map_err(|e| ConfigError::InvalidValue {
                key: "analysis.exclude_globs".to_string(),
                reason: format!("invalid glob '{}': {}", pattern.as_ref(), e),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| ConfigError::InvalidValue {
            key: "analysis.exclude_globs".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { set })
    }
}

impl FileFilter for GlobExcludeFilter {
    fn filter(&self, file: &ModifiedFile) -> bool {
        !file.paths().any(|path| self.set.is_match(path))
    }

    fn name(&self) -> &'static str {
        "glob-exclude"
    }
}
