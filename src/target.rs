//! Trackable code entities and the per-commit accumulator that dedups them.

use indexmap::IndexMap;
use std::fmt;

/// A code entity whose fix history is aggregated.
///
/// Two targets seen in the same commit are the same entity iff their
/// [`identifier`](Target::identifier)s are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A file, identified by its repository-relative path
    File { path: String },
    /// A top-level type declaration, identified by its qualified name
    TypeDeclaration { package: String, name: String },
}

impl Target {
    pub fn file(path: impl Into<String>) -> Self {
        Target::File { path: path.into() }
    }

    pub fn type_declaration(package: impl Into<String>, name: impl Into<String>) -> Self {
        Target::TypeDeclaration {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Dedup and aggregation key.
    ///
    /// Declarations in the default package are identified by their bare name.
    pub fn identifier(&self) -> String {
        match self {
            Target::File { path } => path.clone(),
            Target::TypeDeclaration { package, name } if package.is_empty() => name.clone(),
            Target::TypeDeclaration { package, name } => format!("{}.{}", package, name),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

/// Insertion-ordered set of targets keyed by identifier.
///
/// Iteration order is first-insertion order; re-adding a known identifier
/// leaves both the stored target and its position untouched.
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    entries: IndexMap<String, Target>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target, returning `true` if its identifier was not yet present
    pub fn insert(&mut self, target: Target) -> bool {
        let key = target.identifier();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, target);
        true
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.entries.values()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Owned snapshot in insertion order
    pub fn to_vec(&self) -> Vec<Target> {
        self.entries.values().cloned().collect()
    }
}

impl Extend<Target> for TargetSet {
    fn extend<I: IntoIterator<Item = Target>>(&mut self, iter: I) {
        for target in iter {
            self.insert(target);
        }
    }
}

impl FromIterator<Target> for TargetSet {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        let mut set = TargetSet::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_identifier_is_path() {
        let target = Target::file("src/main/java/com/acme/Foo.java");
        assert_eq!(target.identifier(), "src/main/java/com/acme/Foo.java");
    }

    #[test]
    fn test_declaration_identifier_is_qualified() {
        let target = Target::type_declaration("com.acme", "Foo");
        assert_eq!(target.identifier(), "com.acme.Foo");
        assert_eq!(target.to_string(), "com.acme.Foo");
    }

    #[test]
    fn test_default_package_has_no_leading_dot() {
        let target = Target::type_declaration("", "Foo");
        assert_eq!(target.identifier(), "Foo");
    }

    #[test]
    fn test_set_dedups_by_identifier_and_keeps_order() {
        let mut set = TargetSet::new();
        assert!(set.insert(Target::file("b.java")));
        assert!(set.insert(Target::file("a.java")));
        assert!(!set.insert(Target::file("b.java")));

        let ids: Vec<&str> = set.identifiers().collect();
        assert_eq!(ids, vec!["b.java", "a.java"]);
    }

    #[test]
    fn test_set_dedups_across_variants_with_equal_identifiers() {
        // A file literally named like a qualified type collapses with it.
        let mut set = TargetSet::new();
        set.insert(Target::type_declaration("com.acme", "Foo"));
        assert!(!set.insert(Target::file("com.acme.Foo")));
        assert_eq!(set.len(), 1);
        assert!(matches!(
            set.to_vec()[0],
            Target::TypeDeclaration { .. }
        ));
    }

    #[test]
    fn test_clear() {
        let mut set: TargetSet = vec![Target::file("a"), Target::file("b")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains("a"));
    }
}
