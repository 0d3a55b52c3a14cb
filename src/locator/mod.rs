//! Top-level type declaration spans from one version of a source buffer
//!
//! A [`DeclarationGrammar`] bundles a tree-sitter language with a query that
//! names the pieces the locator needs:
//!
//! - `@definition`: the whole declaration node, whose extent gives the span
//! - `@name`: the declaration's simple name
//! - `@package` (optional): the enclosing package or namespace name
//!
//! Only declarations whose parent is the root node are reported, so nested
//! and inner types never produce spans of their own.

mod java;

use crate::error::{ParserError, Result};
use crate::target::Target;
use std::sync::Arc;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, QueryMatch, StreamingIterator};

/// Line range of one top-level declaration.
///
/// Lines are zero-based and both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationSpan {
    pub package: String,
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl DeclarationSpan {
    pub fn contains(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    pub fn target(&self) -> Target {
        Target::type_declaration(self.package.clone(), self.name.clone())
    }
}

/// Immutable parser configuration for one language
pub struct DeclarationGrammar {
    name: &'static str,
    language: Language,
    query: Query,
    package_capture: Option<u32>,
    name_capture: u32,
    definition_capture: u32,
}

impl DeclarationGrammar {
    /// Compile `query_source` against `language`
    pub fn new(name: &'static str, language: Language, query_source: &str) -> Result<Self> {
        let query = Query::new(&language, query_source)
            .map_err(|e| ParserError::InvalidQuery(e.to_string()))?;

        let name_capture = query
            .capture_index_for_name("name")
            .ok_or_else(|| ParserError::MissingCapture("name".to_string()))?;
        let definition_capture = query
            .capture_index_for_name("definition")
            .ok_or_else(|| ParserError::MissingCapture("definition".to_string()))?;
        let package_capture = query.capture_index_for_name("package");

        Ok(Self {
            name,
            language,
            query,
            package_capture,
            name_capture,
            definition_capture,
        })
    }

    /// Java classes, interfaces, enums, records and annotation types
    pub fn java() -> Result<Self> {
        Self::new("Java", tree_sitter_java::LANGUAGE.into(), java::DECLARATION_QUERY)
    }
}

impl std::fmt::Debug for DeclarationGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclarationGrammar")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Finds top-level declaration spans with a shared grammar
pub struct DeclarationLocator {
    parser: Parser,
    grammar: Arc<DeclarationGrammar>,
}

impl DeclarationLocator {
    pub fn new(grammar: Arc<DeclarationGrammar>) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&grammar.language)
            .map_err(|e| ParserError::LanguageRejected(e.to_string()))?;

        Ok(Self { parser, grammar })
    }

    /// Spans of every top-level declaration in `source`.
    ///
    /// A buffer that does not parse cleanly yields no spans.
    pub fn locate(&mut self, source: &[u8]) -> Vec<DeclarationSpan> {
        let Some(tree) = self.parser.parse(source, None) else {
            tracing::debug!("{} parser gave up on a {} byte buffer", self.grammar.name, source.len());
            return Vec::new();
        };

        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!(
                "Ignoring {} buffer with syntax errors ({} bytes)",
                self.grammar.name,
                source.len()
            );
            return Vec::new();
        }

        let grammar = &self.grammar;
        let mut package: Option<String> = None;
        let mut found = Vec::new();

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&grammar.query, root, source);
        while let Some(m) = matches.next() {
            if let Some(package_node) = grammar.package_capture.and_then(|idx| captured(m, idx)) {
                package.get_or_insert_with(|| node_text(package_node, source));
                continue;
            }

            let (Some(definition), Some(name)) = (
                captured(m, grammar.definition_capture),
                captured(m, grammar.name_capture),
            ) else {
                continue;
            };

            if definition.parent().map(|p| p.id()) != Some(root.id()) {
                continue;
            }

            found.push((
                node_text(name, source),
                definition.start_position().row,
                definition.end_position().row,
            ));
        }

        let package = package.unwrap_or_default();
        found
            .into_iter()
            .map(|(name, start_line, end_line)| DeclarationSpan {
                package: package.clone(),
                name,
                start_line,
                end_line,
            })
            .collect()
    }
}

fn captured<'tree>(m: &QueryMatch<'_, 'tree>, index: u32) -> Option<Node<'tree>> {
    m.captures.iter().find(|c| c.index == index).map(|c| c.node)
}

fn node_text(node: Node<'_>, source: &[u8]) -> String {
    String::from_utf8_lossy(&source[node.byte_range()]).into_owned()
}
