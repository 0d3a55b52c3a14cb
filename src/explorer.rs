//! Strategies that decide which targets a modified file touched
//!
//! An explorer accumulates targets across every file of one commit; the
//! inspector resets it before each commit.

use crate::error::Result;
use crate::git::{DiffLine, ModifiedFile};
use crate::locator::{DeclarationGrammar, DeclarationLocator, DeclarationSpan};
use crate::target::{Target, TargetSet};
use std::sync::Arc;

/// Finds the targets touched by modified files
pub trait TargetExplorer {
    /// Forget every target collected so far
    fn reset(&mut self);

    /// Add the targets `file` touched to the collected set
    fn find_modified(&mut self, file: &ModifiedFile);

    /// Targets collected since the last reset, in first-seen order
    fn collected_targets(&self) -> &TargetSet;

    /// Short label for log lines
    fn name(&self) -> &'static str;
}

/// Treats every touched path as a target.
///
/// A rename contributes both its old and its new path.
#[derive(Debug, Default)]
pub struct FileExplorer {
    collected: TargetSet,
}

impl FileExplorer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TargetExplorer for FileExplorer {
    fn reset(&mut self) {
        self.collected.clear();
    }

    fn find_modified(&mut self, file: &ModifiedFile) {
        for path in file.paths() {
            self.collected.insert(Target::file(path));
        }
    }

    fn collected_targets(&self) -> &TargetSet {
        &self.collected
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Converts a provider diff line number (1-based) to a span line (0-based).
///
/// This is the only place where the two numbering schemes meet. Line 0 is
/// not a valid provider line and maps to nothing.
pub fn span_line(diff_line_number: usize) -> Option<usize> {
    diff_line_number.checked_sub(1)
}

/// Attributes changed lines to the top-level declarations enclosing them
pub struct DeclarationExplorer {
    locator: DeclarationLocator,
    collected: TargetSet,
}

impl DeclarationExplorer {
    pub fn new(grammar: Arc<DeclarationGrammar>) -> Result<Self> {
        Ok(Self {
            locator: DeclarationLocator::new(grammar)?,
            collected: TargetSet::new(),
        })
    }

    pub fn java() -> Result<Self> {
        Self::new(Arc::new(DeclarationGrammar::java()?))
    }

    /// Add the target of every span that contains one of `lines`
    fn attribute(&mut self, lines: &[DiffLine], source: &[u8]) {
        let spans = self.locator.locate(source);
        if spans.is_empty() {
            return;
        }
        for target in attributed_targets(&spans, lines) {
            self.collected.insert(target);
        }
    }
}

/// Targets hit by `lines`, in line order; lines outside every span hit nothing
fn attributed_targets<'a>(
    spans: &'a [DeclarationSpan],
    lines: &'a [DiffLine],
) -> impl Iterator<Item = Target> + 'a {
    lines
        .iter()
        .filter_map(|line| span_line(line.number))
        .flat_map(move |line| spans.iter().filter(move |span| span.contains(line)))
        .map(DeclarationSpan::target)
}

impl TargetExplorer for DeclarationExplorer {
    fn reset(&mut self) {
        self.collected.clear();
    }

    fn find_modified(&mut self, file: &ModifiedFile) {
        if !file.diff_added.is_empty() {
            if let Some(content) = file.content.as_deref() {
                self.attribute(&file.diff_added, content);
            }
        }
        if !file.diff_deleted.is_empty() {
            if let Some(content_before) = file.content_before.as_deref() {
                self.attribute(&file.diff_deleted, content_before);
            }
        }
    }

    fn collected_targets(&self) -> &TargetSet {
        &self.collected
    }

    fn name(&self) -> &'static str {
        "type-declaration"
    }
}

/// Builds a fresh explorer per inspector; declaration explorers share one
/// immutable grammar.
#[derive(Debug, Clone)]
pub enum ExplorerFactory {
    File,
    Declaration(Arc<DeclarationGrammar>),
}

impl ExplorerFactory {
    pub fn build(&self) -> Result<Box<dyn TargetExplorer>> {
        Ok(match self {
            ExplorerFactory::File => Box::new(FileExplorer::new()),
            ExplorerFactory::Declaration(grammar) => {
                Box::new(DeclarationExplorer::new(Arc::clone(grammar))?)
            }
        })
    }
}
