//! Side-effect-free predicates over commits and modified files
//!
//! A [`FilterChain`] is the logical AND of its filters, evaluated in insertion
//! order and stopping at the first rejection. An empty chain passes everything.

mod commit;
mod file;

pub use commit::{DEFAULT_FIX_KEYWORDS, DateRangeFilter, FixKeywordFilter};
pub use file::{ExtensionFileFilter, GlobExcludeFilter, NoTestDirFilter};

use crate::git::{CommitInfo, ModifiedFile};
use std::fmt;
use std::sync::Arc;

/// Decides whether a commit is worth inspecting
pub trait CommitFilter: Send + Sync {
    fn filter(&self, commit: &CommitInfo) -> bool;

    /// Short label for log lines
    fn name(&self) -> &'static str;
}

/// Decides whether a modified file is worth inspecting
pub trait FileFilter: Send + Sync {
    fn filter(&self, file: &ModifiedFile) -> bool;

    /// Short label for log lines
    fn name(&self) -> &'static str;
}

/// Ordered conjunction of filters.
///
/// Filters are reference counted so a chain can be shared between the
/// inspector, the blame resolver and parallel partitions.
pub struct FilterChain<F: ?Sized> {
    filters: Vec<Arc<F>>,
}

pub type CommitFilters = FilterChain<dyn CommitFilter>;
pub type FileFilters = FilterChain<dyn FileFilter>;

impl<F: ?Sized> FilterChain<F> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<F: ?Sized> Default for FilterChain<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> Clone for FilterChain<F> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
        }
    }
}

impl FilterChain<dyn CommitFilter> {
    pub fn push<T: CommitFilter + 'static>(&mut self, filter: T) {
        self.filters.push(Arc::new(filter));
    }

    pub fn with<T: CommitFilter + 'static>(mut self, filter: T) -> Self {
        self.push(filter);
        self
    }

    pub fn passes(&self, commit: &CommitInfo) -> bool {
        self.filters.iter().all(|f| f.filter(commit))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl FilterChain<dyn FileFilter> {
    pub fn push<T: FileFilter + 'static>(&mut self, filter: T) {
        self.filters.push(Arc::new(filter));
    }

    pub fn with<T: FileFilter + 'static>(mut self, filter: T) -> Self {
        self.push(filter);
        self
    }

    pub fn passes(&self, file: &ModifiedFile) -> bool {
        self.filters.iter().all(|f| f.filter(file))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl fmt::Debug for FilterChain<dyn CommitFilter> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl fmt::Debug for FilterChain<dyn FileFilter> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
