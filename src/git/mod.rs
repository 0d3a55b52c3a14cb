//! Git history access for the analysis
//!
//! The analysis only sees commits, modified files and blame through the
//! provider traits; [`GitRepository`] serves them from a libgit2 handle.

/// Commit and modified-file records
pub mod model;
/// Provider traits consumed by the inspector and blame resolver
pub mod provider;
/// libgit2-backed history walking, diffing and blame
pub mod walker;

pub use model::{ChangeType, CommitInfo, DiffLine, ModifiedFile};
pub use provider::{BlameMap, BlameProvider, HistoryProvider};
pub use walker::{GitRepository, WalkOptions};
