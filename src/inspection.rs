//! Per-commit orchestration: filters, exploration, blame and classification
//!
//! [`RepoInspector`] turns the provider's commit sequence into a lazily
//! produced sequence of [`CommitReport`]s, one per commit and in delivery
//! order. Dropping the [`Reports`] iterator stops the scan between commits.

use crate::blame::{self, BlameResolver};
use crate::error::Result;
use crate::explorer::TargetExplorer;
use crate::filters::{CommitFilters, FileFilters};
use crate::git::{BlameProvider, CommitInfo, HistoryProvider};
use crate::target::Target;
use crate::tracker::TargetTracker;
use rayon::prelude::*;
use std::fmt;

/// Classification of one processed commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// The commit's contents could not be read; only produced in keep-going mode
    Error,
    /// A commit filter rejected the commit
    Filtered,
    /// The commit passed but touched no target
    Empty,
    /// At least one target was touched
    Complete,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Error => "ERROR",
            ReportKind::Filtered => "FILTERED",
            ReportKind::Empty => "EMPTY",
            ReportKind::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable outcome of processing one commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    pub commit: CommitInfo,
    pub kind: ReportKind,
    /// Touched targets, deduped by identifier, in accumulation order
    pub targets: Vec<Target>,
    /// Blamed hashes when blame tracing is enabled
    pub blame: Option<Vec<String>>,
    /// Failure description for [`ReportKind::Error`]
    pub error: Option<String>,
}

impl CommitReport {
    fn filtered(commit: CommitInfo) -> Self {
        Self {
            commit,
            kind: ReportKind::Filtered,
            targets: Vec::new(),
            blame: None,
            error: None,
        }
    }

    fn failed(commit: CommitInfo, error: String) -> Self {
        Self {
            commit,
            kind: ReportKind::Error,
            targets: Vec::new(),
            blame: None,
            error: Some(error),
        }
    }

    pub fn hash(&self) -> &str {
        &self.commit.hash
    }

    pub fn is_complete(&self) -> bool {
        self.kind == ReportKind::Complete
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.targets.iter().map(Target::identifier).collect()
    }

    /// Target identifiers joined with `"; "`
    pub fn targets_column(&self) -> String {
        self.identifiers().join("; ")
    }

    /// Blamed hashes joined with `"; "`, empty without blame
    pub fn blame_column(&self) -> String {
        self.blame.as_deref().map(blame::render).unwrap_or_default()
    }
}

/// Drives filters, explorer and blame over a history provider
pub struct RepoInspector<P> {
    provider: P,
    commit_filters: CommitFilters,
    file_filters: FileFilters,
    explorer: Box<dyn TargetExplorer>,
    blame: Option<BlameResolver>,
    keep_going: bool,
}

impl<P: HistoryProvider + BlameProvider> RepoInspector<P> {
    pub fn new(
        provider: P,
        commit_filters: CommitFilters,
        file_filters: FileFilters,
        explorer: Box<dyn TargetExplorer>,
    ) -> Self {
        Self {
            provider,
            commit_filters,
            file_filters,
            explorer,
            blame: None,
            keep_going: false,
        }
    }

    /// Trace every inspected commit back to the commits it blames
    pub fn with_blame(mut self, resolver: BlameResolver) -> Self {
        self.blame = Some(resolver);
        self
    }

    /// Record commit-scoped provider failures as [`ReportKind::Error`]
    /// instead of ending the scan
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Reports for the provider's whole history
    pub fn reports(&mut self) -> Result<Reports<'_, P>> {
        let ids = self.provider.commit_ids()?;
        tracing::info!(
            "Inspecting {} commits with the {} explorer",
            ids.len(),
            self.explorer.name()
        );
        Ok(self.reports_for(ids))
    }

    /// Reports for the given commits, in the given order
    pub fn reports_for(&mut self, ids: Vec<String>) -> Reports<'_, P> {
        Reports {
            inspector: self,
            ids: ids.into_iter(),
            failed: false,
        }
    }

    /// Process one commit by hash
    pub fn inspect(&mut self, hash: &str) -> Result<CommitReport> {
        let commit = self.provider.commit(hash)?;
        match self.inspect_commit(&commit) {
            Ok(report) => Ok(report),
            Err(e) if self.keep_going && e.is_commit_scoped() => {
                tracing::warn!("Skipping commit {}: {}", commit.short_hash(), e);
                Ok(CommitReport::failed(commit, e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn inspect_commit(&mut self, commit: &CommitInfo) -> Result<CommitReport> {
        if !self.commit_filters.passes(commit) {
            tracing::debug!("{} FILTERED", commit.short_hash());
            return Ok(CommitReport::filtered(commit.clone()));
        }

        self.explorer.reset();

        let files = self.provider.modified_files(commit)?;
        for file in &files {
            if self.file_filters.passes(file) {
                self.explorer.find_modified(file);
            }
        }

        let blame = match &self.blame {
            Some(resolver) => {
                Some(resolver.resolve(&self.provider, commit, &files, &self.file_filters)?)
            }
            None => None,
        };

        let targets = self.explorer.collected_targets().to_vec();
        let kind = if targets.is_empty() {
            ReportKind::Empty
        } else {
            ReportKind::Complete
        };
        tracing::debug!(
            "{} {} ({} files, {} targets)",
            commit.short_hash(),
            kind,
            files.len(),
            targets.len()
        );

        Ok(CommitReport {
            commit: commit.clone(),
            kind,
            targets,
            blame,
            error: None,
        })
    }
}

/// Lazy report sequence.
///
/// Yields `Err` at most once; nothing follows a failure.
pub struct Reports<'a, P> {
    inspector: &'a mut RepoInspector<P>,
    ids: std::vec::IntoIter<String>,
    failed: bool,
}

impl<P: HistoryProvider + BlameProvider> Iterator for Reports<'_, P> {
    type Item = Result<CommitReport>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let hash = self.ids.next()?;
        let result = self.inspector.inspect(&hash);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.ids.len()))
        }
    }
}

/// Reports in commit order plus the statistics folded from them
#[derive(Debug, Default)]
pub struct PartitionedScan {
    pub reports: Vec<CommitReport>,
    pub tracker: TargetTracker,
}

/// Inspect `ids` in `jobs` contiguous partitions on the rayon pool.
///
/// Every partition gets its own inspector from `factory`, so no provider
/// handle or explorer is shared between threads. Reports come back in the
/// order of `ids`; `on_report` is called as each one is produced, in no
/// particular order across partitions.
pub fn scan_partitioned<P, F, C>(
    ids: Vec<String>,
    jobs: usize,
    factory: F,
    on_report: C,
) -> Result<PartitionedScan>
where
    P: HistoryProvider + BlameProvider,
    F: Fn() -> Result<RepoInspector<P>> + Sync,
    C: Fn(&CommitReport) + Sync,
{
    if ids.is_empty() {
        return Ok(PartitionedScan::default());
    }
    let chunk_size = ids.len().div_ceil(jobs.max(1));
    tracing::info!(
        "Inspecting {} commits in {} partitions",
        ids.len(),
        ids.len().div_ceil(chunk_size)
    );

    let partitions: Vec<Result<PartitionedScan>> = ids
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut inspector = factory()?;
            let mut part = PartitionedScan::default();
            for report in inspector.reports_for(chunk.to_vec()) {
                let report = report?;
                on_report(&report);
                part.tracker.collect(&report);
                part.reports.push(report);
            }
            Ok(part)
        })
        .collect();

    let mut scan = PartitionedScan {
        reports: Vec::with_capacity(ids.len()),
        tracker: TargetTracker::new(),
    };
    for part in partitions {
        let part = part?;
        scan.reports.extend(part.reports);
        scan.tracker.merge(part.tracker);
    }
    Ok(scan)
}
