#![allow(dead_code)]

use git2::{IndexAddOption, Oid, Repository, Signature, Time};
use std::path::Path;
use tempfile::TempDir;

/// Throwaway repository with a deterministic clock.
///
/// Every commit is authored one hour after the previous one.
pub struct TestRepo {
    dir: TempDir,
    repo: Repository,
    clock: i64,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self {
            dir,
            repo,
            clock: 1_600_000_000,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    pub fn remove(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).unwrap();
    }

    /// Stage the whole work tree, deletions included, and commit it on HEAD
    pub fn commit(&mut self, message: &str) -> String {
        let head = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .map(|c| c.id());
        let parents: Vec<Oid> = head.into_iter().collect();
        self.commit_with(message, &parents, Some("HEAD"))
    }

    /// Commit the staged work tree with explicit parents, optionally without
    /// moving any ref
    pub fn commit_with(&mut self, message: &str, parents: &[Oid], update_ref: Option<&str>) -> String {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        self.clock += 3600;
        let signature =
            Signature::new("Test User", "test@example.com", &Time::new(self.clock, 0)).unwrap();
        let parent_commits: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|id| self.repo.find_commit(*id).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();

        self.repo
            .commit(update_ref, &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
            .to_string()
    }

    pub fn oid(hash: &str) -> Oid {
        Oid::from_str(hash).unwrap()
    }
}

pub const FOO_V1: &str = "package com.acme;

public class Foo {
    public int value(Object o) {
        return o.hashCode();
    }
}
";

pub const FOO_V2: &str = "package com.acme;

public class Foo {
    public int value(Object o) {
        return o == null ? 0 : o.hashCode();
    }
}
";

pub const FOO_V3: &str = "package com.acme;

public class Foo {
    public int value(Object o) {
        return o == null ? -1 : o.hashCode();
    }
}
";

pub const BAR_V1: &str = "package com.acme;

public class Bar {
    int total(int a, int b) {
        return a + b;
    }
}
";

pub const BAR_V2: &str = "package com.acme;

public class Bar {
    int total(int left, int right) {
        return left + right;
    }
}
";

pub const BAR_V3: &str = "package com.acme;

public class Bar {
    int total(int left, int right) {
        return Math.addExact(left, right);
    }
}
";

pub const FOO_PATH: &str = "src/main/java/com/acme/Foo.java";
pub const BAR_PATH: &str = "src/main/java/com/acme/Bar.java";
pub const FOO_TEST_PATH: &str = "src/test/java/com/acme/FooTest.java";

/// Hashes of the commits of [`java_history`], oldest first
pub struct JavaHistory {
    pub repo: TestRepo,
    /// "Add Foo and Bar"
    pub add: String,
    /// "Fix null check in Foo": Foo, FooTest and README
    pub fix_foo: String,
    /// "Refactor Bar"
    pub refactor: String,
    /// "Fixes #2: Bar overflow and Foo default": Bar and Foo
    pub fix_both: String,
}

pub fn java_history() -> JavaHistory {
    let mut repo = TestRepo::new();

    repo.write(FOO_PATH, FOO_V1);
    repo.write(BAR_PATH, BAR_V1);
    repo.write(FOO_TEST_PATH, "package com.acme;\n\nclass FooTest {\n}\n");
    repo.write("README.md", "hello\n");
    let add = repo.commit("Add Foo and Bar");

    repo.write(FOO_PATH, FOO_V2);
    repo.write(
        FOO_TEST_PATH,
        "package com.acme;\n\nclass FooTest {\n    void nullValue() {}\n}\n",
    );
    repo.write("README.md", "hello world\n");
    let fix_foo = repo.commit("Fix null check in Foo");

    repo.write(BAR_PATH, BAR_V2);
    let refactor = repo.commit("Refactor Bar");

    repo.write(BAR_PATH, BAR_V3);
    repo.write(FOO_PATH, FOO_V3);
    let fix_both = repo.commit("Fixes #2: Bar overflow and Foo default");

    JavaHistory {
        repo,
        add,
        fix_foo,
        refactor,
        fix_both,
    }
}
