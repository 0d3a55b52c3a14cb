//! SZZ-style tracing of a fix back to the commits that introduced the bug
//!
//! The lines a fixing commit removes are blamed at its parent; whoever last
//! touched those lines is a candidate bug-introducing commit.

use crate::error::Result;
use crate::filters::FileFilters;
use crate::git::{BlameProvider, CommitInfo, ModifiedFile};
use indexmap::IndexSet;

/// How the blamed hashes of one commit are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlameMode {
    /// Every distinct hash, in provider enumeration order
    All,
    /// Only the hash with the earliest author date
    Oldest,
}

#[derive(Debug, Clone)]
pub struct BlameResolver {
    mode: BlameMode,
}

impl BlameResolver {
    pub fn new(mode: BlameMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> BlameMode {
        self.mode
    }

    /// Blame hashes for `commit`, considering only the files that pass
    /// `filters`.
    ///
    /// Nothing passing the filters means nothing to blame.
    pub fn resolve<B: BlameProvider + ?Sized>(
        &self,
        provider: &B,
        commit: &CommitInfo,
        files: &[ModifiedFile],
        filters: &FileFilters,
    ) -> Result<Vec<String>> {
        let passing: Vec<&ModifiedFile> = files.iter().filter(|f| filters.passes(f)).collect();
        if passing.is_empty() {
            return Ok(Vec::new());
        }

        let hashes = blame_files(provider, commit, &passing)?;
        self.reduce(provider, hashes)
    }

    fn reduce<B: BlameProvider + ?Sized>(
        &self,
        provider: &B,
        hashes: IndexSet<String>,
    ) -> Result<Vec<String>> {
        match self.mode {
            BlameMode::All => Ok(hashes.into_iter().collect()),
            BlameMode::Oldest => Ok(oldest(provider, hashes)?.into_iter().collect()),
        }
    }
}

/// Union of the blamed hashes over every file
pub fn blame_files<B: BlameProvider + ?Sized>(
    provider: &B,
    commit: &CommitInfo,
    files: &[&ModifiedFile],
) -> Result<IndexSet<String>> {
    let per_file = provider.blame(commit, files)?;
    Ok(per_file.into_values().flatten().collect())
}

/// The hash authored first; equal dates keep the earlier-enumerated hash
fn oldest<B: BlameProvider + ?Sized>(
    provider: &B,
    hashes: IndexSet<String>,
) -> Result<Option<String>> {
    let mut dated = Vec::with_capacity(hashes.len());
    for hash in hashes {
        let date = provider.author_date(&hash)?;
        dated.push((hash, date));
    }
    Ok(dated
        .into_iter()
        .min_by_key(|(_, date)| *date)
        .map(|(hash, _)| hash))
}

/// Blame column text: hashes joined with `"; "`
pub fn render(hashes: &[String]) -> String {
    hashes.join("; ")
}
