//! Narrow interfaces through which the analysis consumes git history.

use crate::error::Result;
use crate::git::model::{CommitInfo, ModifiedFile};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};

/// Blame result: pre-image path -> hashes of the commits that last touched
/// the lines deleted from it
pub type BlameMap = IndexMap<String, IndexSet<String>>;

/// Source of commits and their per-file changes
pub trait HistoryProvider {
    /// Commit hashes in the provider's fixed delivery order
    fn commit_ids(&self) -> Result<Vec<String>>;

    /// Number of commits a full scan will visit
    fn total_commits(&self) -> Result<usize> {
        Ok(self.commit_ids()?.len())
    }

    fn commit(&self, hash: &str) -> Result<CommitInfo>;

    /// Files modified by `commit`, in provider order
    fn modified_files(&self, commit: &CommitInfo) -> Result<Vec<ModifiedFile>>;
}

/// Source of line-level blame for the lines a commit removes
pub trait BlameProvider {
    /// For each file, the commits that last modified the lines `commit`
    /// deletes from it
    fn blame(&self, commit: &CommitInfo, files: &[&ModifiedFile]) -> Result<BlameMap>;

    /// Authoring time of an arbitrary commit
    fn author_date(&self, hash: &str) -> Result<DateTime<Utc>>;
}
