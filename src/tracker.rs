//! Per-target fix counts aggregated over a scan

use crate::inspection::{CommitReport, ReportKind};
use indexmap::IndexMap;

/// Running fix counts keyed by target identifier.
///
/// Counts only grow. Identifiers keep the order in which they were first
/// observed, which is also the tie-break order of [`gen_stats`](Self::gen_stats).
#[derive(Debug, Clone, Default)]
pub struct TargetTracker {
    counts: IndexMap<String, usize>,
}

impl TargetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count each target of a COMPLETE report once; other kinds are ignored
    pub fn collect(&mut self, report: &CommitReport) {
        if report.kind != ReportKind::Complete {
            return;
        }
        for target in &report.targets {
            *self.counts.entry(target.identifier()).or_insert(0) += 1;
        }
    }

    /// Fold in counts gathered over a later part of the same history
    pub fn merge(&mut self, other: TargetTracker) {
        for (identifier, count) in other.counts {
            *self.counts.entry(identifier).or_insert(0) += count;
        }
    }

    /// `(identifier, count)` by descending count; equal counts stay in
    /// first-observed order
    pub fn gen_stats(&self) -> Vec<(String, usize)> {
        let mut stats: Vec<(String, usize)> = self
            .counts
            .iter()
            .map(|(id, count)| (id.clone(), *count))
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1));
        stats
    }

    pub fn count(&self, identifier: &str) -> usize {
        self.counts.get(identifier).copied().unwrap_or(0)
    }

    /// Number of distinct targets seen
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}
