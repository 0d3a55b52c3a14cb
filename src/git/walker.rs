use crate::error::{GitError, LocalizerError, Result};
use crate::git::model::{ChangeType, CommitInfo, DiffLine, ModifiedFile};
use crate::git::provider::{BlameMap, BlameProvider, HistoryProvider};
use chrono::{DateTime, Utc};
use git2::{
    BlameOptions, Delta, Diff, DiffFindOptions, DiffOptions, FileMode, Oid, Patch, Repository,
    Sort,
};
use indexmap::IndexSet;
use std::path::Path;

/// Which part of the history a scan visits
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Revision the walk starts from
    pub rev: String,
    /// Keep only the newest `max_count` commits
    pub max_count: Option<usize>,
    /// Deliver oldest commits first
    pub reverse: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            rev: "HEAD".to_string(),
            max_count: None,
            reverse: false,
        }
    }
}

/// Git repository backed by libgit2, serving both history and blame
pub struct GitRepository {
    repo: Repository,
    walk: WalkOptions,
    skip_trivial_lines: bool,
}

impl GitRepository {
    /// Discover and open a git repository from any path within it
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::discover(path)
            .map_err(|e| GitError::RepoNotFound(format!("{}: {}", path.display(), e.message())))?;

        let root = repo.workdir().unwrap_or_else(|| repo.path());
        tracing::info!("Opened git repository at: {}", root.display());

        Ok(Self {
            repo,
            walk: WalkOptions::default(),
            skip_trivial_lines: true,
        })
    }

    pub fn with_walk_options(mut self, walk: WalkOptions) -> Self {
        self.walk = walk;
        self
    }

    /// Do not blame blank or comment-only deleted lines
    pub fn with_skip_trivial_lines(mut self, skip: bool) -> Self {
        self.skip_trivial_lines = skip;
        self
    }

    pub fn walk_options(&self) -> &WalkOptions {
        &self.walk
    }

    fn find_commit(&self, hash: &str) -> Result<git2::Commit<'_>> {
        let oid = Oid::from_str(hash)
            .map_err(|e| GitError::CommitNotFound(format!("{}: {}", hash, e.message())))?;
        self.repo
            .find_commit(oid)
            .map_err(|e| GitError::CommitNotFound(format!("{}: {}", hash, e.message())).into())
    }

    fn start_oid(&self) -> Result<Oid> {
        let rev_err = |e: git2::Error| GitError::RevisionNotFound {
            rev: self.walk.rev.clone(),
            reason: e.message().to_string(),
        };
        let object = self.repo.revparse_single(&self.walk.rev).map_err(rev_err)?;
        let commit = object.peel_to_commit().map_err(rev_err)?;
        Ok(commit.id())
    }

    /// Extract detailed information from a commit
    fn extract_commit_info(commit: &git2::Commit<'_>) -> CommitInfo {
        let author = commit.author();
        CommitInfo {
            hash: commit.id().to_string(),
            message: commit.message().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("Unknown").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            author_date: to_utc(author.when()),
            parent_hashes: commit.parent_ids().map(|id| id.to_string()).collect(),
        }
    }

    /// Read a blob, or nothing for absent sides and submodule entries
    fn read_blob(&self, commit: &str, path: &str, oid: Oid, mode: FileMode) -> Result<Option<Vec<u8>>> {
        if oid.is_zero() || mode == FileMode::Commit {
            return Ok(None);
        }
        let blob = self
            .repo
            .find_blob(oid)
            .map_err(|e| GitError::ContentUnreadable {
                commit: commit.to_string(),
                path: path.to_string(),
                reason: e.message().to_string(),
            })?;
        Ok(Some(blob.content().to_vec()))
    }

    fn tree_diff(&self, commit: &git2::Commit<'_>) -> std::result::Result<Diff<'_>, git2::Error> {
        let tree = commit.tree()?;

        // Root commits diff against the empty tree
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut diff_opts = DiffOptions::new();
        diff_opts.context_lines(0).ignore_whitespace(false);

        let mut diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut diff_opts))?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        Ok(diff)
    }
}

impl HistoryProvider for GitRepository {
    fn commit_ids(&self) -> Result<Vec<String>> {
        let walk_err = |e: git2::Error| GitError::WalkFailed(e.message().to_string());

        let mut revwalk = self.repo.revwalk().map_err(walk_err)?;
        revwalk
            .set_sorting(Sort::TIME | Sort::TOPOLOGICAL)
            .map_err(walk_err)?;
        revwalk.push(self.start_oid()?).map_err(walk_err)?;

        let max = self.walk.max_count.unwrap_or(usize::MAX);
        let mut ids = Vec::new();
        for oid in revwalk.take(max) {
            ids.push(oid.map_err(walk_err)?.to_string());
        }

        // Truncate newest-first, then flip, like `git log -n N --reverse`
        if self.walk.reverse {
            ids.reverse();
        }

        tracing::debug!("Walk from {} yields {} commits", self.walk.rev, ids.len());
        Ok(ids)
    }

    fn commit(&self, hash: &str) -> Result<CommitInfo> {
        let commit = self.find_commit(hash)?;
        Ok(Self::extract_commit_info(&commit))
    }

    fn modified_files(&self, info: &CommitInfo) -> Result<Vec<ModifiedFile>> {
        let commit = self.find_commit(&info.hash)?;

        // Merge commits carry no modifications of their own
        if commit.parent_count() > 1 {
            tracing::debug!("Skipping diff of merge commit {}", info.short_hash());
            return Ok(Vec::new());
        }

        let diff_err = |e: git2::Error| -> LocalizerError {
            GitError::DiffFailed {
                commit: info.hash.clone(),
                reason: e.message().to_string(),
            }
            .into()
        };

        let diff = self.tree_diff(&commit).map_err(diff_err)?;

        let mut files = Vec::with_capacity(diff.deltas().len());
        for idx in 0..diff.deltas().len() {
            let Some(delta) = diff.get_delta(idx) else {
                continue;
            };

            let change_type = match delta.status() {
                Delta::Added => ChangeType::Added,
                Delta::Deleted => ChangeType::Deleted,
                Delta::Renamed => ChangeType::Renamed,
                _ => ChangeType::Modified,
            };

            let old_path = match change_type {
                ChangeType::Added => None,
                _ => delta.old_file().path().map(path_to_string),
            };
            let new_path = match change_type {
                ChangeType::Deleted => None,
                _ => delta.new_file().path().map(path_to_string),
            };

            let content_before = match &old_path {
                Some(path) => self.read_blob(
                    &info.hash,
                    path,
                    delta.old_file().id(),
                    delta.old_file().mode(),
                )?,
                None => None,
            };
            let content = match &new_path {
                Some(path) => self.read_blob(
                    &info.hash,
                    path,
                    delta.new_file().id(),
                    delta.new_file().mode(),
                )?,
                None => None,
            };

            let (diff_added, diff_deleted) = collect_diff_lines(&diff, idx).map_err(diff_err)?;

            files.push(ModifiedFile {
                old_path,
                new_path,
                change_type,
                content_before,
                content,
                diff_added,
                diff_deleted,
            });
        }

        Ok(files)
    }
}

impl BlameProvider for GitRepository {
    fn blame(&self, commit: &CommitInfo, files: &[&ModifiedFile]) -> Result<BlameMap> {
        let mut result = BlameMap::new();

        // Nothing predates a root commit
        let Some(parent_hash) = commit.parent_hashes.first() else {
            return Ok(result);
        };
        let parent = self.find_commit(parent_hash)?.id();

        for file in files {
            if file.diff_deleted.is_empty() {
                continue;
            }
            let Some(path) = file.pre_image_path() else {
                continue;
            };

            let blame_err = |e: git2::Error| GitError::BlameFailed {
                commit: commit.hash.clone(),
                path: path.to_string(),
                reason: e.message().to_string(),
            };

            let mut opts = BlameOptions::new();
            opts.newest_commit(parent);
            let blame = self
                .repo
                .blame_file(Path::new(path), Some(&mut opts))
                .map_err(blame_err)?;

            let mut hashes = IndexSet::new();
            for line in &file.diff_deleted {
                if self.skip_trivial_lines && is_trivial_line(&line.text) {
                    continue;
                }
                if let Some(hunk) = blame.get_line(line.number) {
                    hashes.insert(hunk.final_commit_id().to_string());
                }
            }

            if !hashes.is_empty() {
                result.entry(path.to_string()).or_default().extend(hashes);
            }
        }

        Ok(result)
    }

    fn author_date(&self, hash: &str) -> Result<DateTime<Utc>> {
        let commit = self.find_commit(hash)?;
        Ok(to_utc(commit.author().when()))
    }
}

/// Added and deleted lines of one delta, keyed by git's 1-based numbers
fn collect_diff_lines(
    diff: &Diff<'_>,
    idx: usize,
) -> std::result::Result<(Vec<DiffLine>, Vec<DiffLine>), git2::Error> {
    let mut added = Vec::new();
    let mut deleted = Vec::new();

    // Binary or unchanged content
    let Some(patch) = Patch::from_diff(diff, idx)? else {
        return Ok((added, deleted));
    };

    for hunk_idx in 0..patch.num_hunks() {
        for line_idx in 0..patch.num_lines_in_hunk(hunk_idx)? {
            let line = patch.line_in_hunk(hunk_idx, line_idx)?;
            let text = String::from_utf8_lossy(line.content())
                .trim_end_matches(['\n', '\r'])
                .to_string();
            match line.origin() {
                '+' => {
                    if let Some(number) = line.new_lineno() {
                        added.push(DiffLine::new(number as usize, text));
                    }
                }
                '-' => {
                    if let Some(number) = line.old_lineno() {
                        deleted.push(DiffLine::new(number as usize, text));
                    }
                }
                _ => {}
            }
        }
    }

    Ok((added, deleted))
}

/// Blank and comment-only lines say nothing about who introduced a defect
pub fn is_trivial_line(text: &str) -> bool {
    let line = text.trim();
    line.is_empty()
        || ["//", "#", "/*", "*", "'''", "\"\"\""]
            .iter()
            .any(|prefix| line.starts_with(prefix))
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn to_utc(time: git2::Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.seconds(), 0).unwrap_or_default()
}
