//! # mclocalizer - What Keeps Getting Fixed
//!
//! Walks a git history, picks out the commits that fix bugs and localizes the
//! code entities they touch: files, or top-level type declarations found by
//! mapping changed lines onto tree-sitter declaration spans. Fix counts are
//! aggregated per entity into a ranked summary. Optionally every fix is traced
//! back to the commits that last touched the lines it removed (SZZ-style
//! blame).
//!
//! ## Pipeline
//!
//! ```text
//! GitRepository ──commits──> RepoInspector ──CommitReport──> TargetTracker
//!                               │      │                          │
//!                    CommitFilters  FileFilters              gen_stats()
//!                               │      │
//!                      TargetExplorer  BlameResolver
//!                               │
//!                      DeclarationLocator (tree-sitter)
//! ```
//!
//! ## Modules
//!
//! - [`target`]: Target identity and the insertion-ordered target set
//! - [`filters`]: Commit and file predicates and their conjunction
//! - [`git`]: Commit/file records, provider traits and the libgit2 provider
//! - [`locator`]: Top-level declaration spans from one source buffer
//! - [`explorer`]: Strategies that decide which targets a file touched
//! - [`blame`]: Tracing fixes back to bug-introducing commits
//! - [`inspection`]: Per-commit state machine and the report stream
//! - [`tracker`]: Per-target fix counts and the ranked summary
//! - [`report`]: CSV output
//! - [`config`]: Configuration file, environment overrides and presets
//! - [`error`]: Error types and result aliases
//!
//! ## Usage Example
//!
//! ```no_run
//! use mclocalizer::config::{Config, TargetKind};
//! use mclocalizer::git::GitRepository;
//! use mclocalizer::inspection::RepoInspector;
//! use mclocalizer::tracker::TargetTracker;
//!
//! fn main() -> mclocalizer::Result<()> {
//!     let mut config = Config::default();
//!     config.analysis.target = TargetKind::JavaClass;
//!
//!     let mut inspector = RepoInspector::new(
//!         GitRepository::discover("path/to/repo")?,
//!         config.analysis.commit_filters()?,
//!         config.analysis.file_filters()?,
//!         config.analysis.target.explorer_factory()?.build()?,
//!     );
//!
//!     let mut tracker = TargetTracker::new();
//!     for report in inspector.reports()? {
//!         tracker.collect(&report?);
//!     }
//!     for (identifier, count) in tracker.gen_stats() {
//!         println!("{count} {identifier}");
//!     }
//!     Ok(())
//! }
//! ```

/// Tracing fixes back to the commits that introduced the bug
pub mod blame;

/// Configuration management with environment variable overrides
pub mod config;

/// Error types and utilities
pub mod error;

/// Target explorers: path-based and declaration-based
pub mod explorer;

/// Commit and file filters
pub mod filters;

/// Git history access: records, provider traits and the libgit2 provider
pub mod git;

/// Orchestration of one scan and the per-commit report stream
pub mod inspection;

/// Tree-sitter based top-level declaration spans
pub mod locator;

/// CSV writers for commit rows and statistics
pub mod report;

/// Trackable code entities
pub mod target;

/// Fix count aggregation
pub mod tracker;

pub use error::{LocalizerError, Result};
