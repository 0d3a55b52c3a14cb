use chrono::{DateTime, Utc};

/// Metadata of one commit in the history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full commit SHA hash (40 characters)
    pub hash: String,
    /// Commit message (first line and body)
    pub message: String,
    /// Author's name
    pub author_name: String,
    /// Author's email address
    pub author_email: String,
    /// Authoring timestamp
    pub author_date: DateTime<Utc>,
    /// SHA hashes of parent commits
    pub parent_hashes: Vec<String>,
}

impl CommitInfo {
    pub fn is_merge(&self) -> bool {
        self.parent_hashes.len() > 1
    }

    /// Abbreviated hash for log lines
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(10)]
    }
}

/// Kind of change a commit applied to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Added,
    Deleted,
    Modified,
    Renamed,
}

/// One changed line as reported by the history provider.
///
/// `number` uses the provider's 1-based numbering: the line in the new
/// version for additions and in the old version for deletions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub number: usize,
    pub text: String,
}

impl DiffLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// One file touched by a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedFile {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub change_type: ChangeType,
    /// Content before the commit, absent for added files
    pub content_before: Option<Vec<u8>>,
    /// Content after the commit, absent for deleted files
    pub content: Option<Vec<u8>>,
    /// Added lines in new-file order
    pub diff_added: Vec<DiffLine>,
    /// Deleted lines in old-file order
    pub diff_deleted: Vec<DiffLine>,
}

impl ModifiedFile {
    /// Path the commit's deleted lines belong to
    pub fn pre_image_path(&self) -> Option<&str> {
        match self.change_type {
            ChangeType::Renamed | ChangeType::Deleted => self.old_path.as_deref(),
            _ => self.new_path.as_deref().or(self.old_path.as_deref()),
        }
    }

    /// Every non-null path in (old, new) order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.old_path
            .as_deref()
            .into_iter()
            .chain(self.new_path.as_deref())
    }

    /// Most recent path of the file, for log lines
    pub fn display_path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or("<unknown>")
    }
}
