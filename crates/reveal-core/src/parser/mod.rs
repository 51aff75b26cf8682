//! AST parsing subsystem using tree-sitter.
//!
//! This module provides language-agnostic AST parsing with per-language
//! structural extractors. Each supported language registers an analyzer
//! that maps tree-sitter AST nodes to reveal's structural elements.
//!
//! ## Architecture
//!
//! ```text
//! Source File -> Language Detection -> tree-sitter Grammar
//!            -> Parse -> CST
//!            -> Structural Extraction -> Vec<StructuralElement>
//!            -> Complexity Walk -> per-element cyclomatic count
//! ```
//!
//! The parser is stateless: each call builds its own `tree_sitter::Parser`
//! and throws away the tree once extraction is done.

pub mod registry;
pub mod languages;

use std::path::Path;

use crate::error::{RevealError, RevealResult};
use crate::model::{DependencyKind, ElementKind, ImportStatement, Language, Visibility};

/// A structural element extracted from an AST.
#[derive(Debug, Clone)]
pub struct StructuralElement {
    /// Fully qualified name of this element.
    pub symbol_path: String,
    /// Short name (last component of symbol_path).
    pub name: String,
    /// What kind of construct this is.
    pub kind: ElementKind,
    /// Visibility specifier.
    pub visibility: Visibility,
    /// Starting line (1-indexed).
    pub line_start: u32,
    /// Ending line (1-indexed, inclusive).
    pub line_end: u32,
    /// Raw source code of this element.
    pub content: String,
    /// Extracted doc comment, if present.
    pub doc_comment: Option<String>,
    /// Symbols referenced within this element (for dependency extraction).
    pub references: Vec<String>,
}

/// A `StructuralElement` paired with its cyclomatic complexity, as returned
/// by `parse_file`. Kept separate from `StructuralElement` itself so the
/// per-language extractors don't need a complexity field threaded through
/// every construction site; the complexity walk runs once, independently,
/// over the whole tree.
#[derive(Debug, Clone)]
pub struct ParsedElement {
    /// The extracted element.
    pub element: StructuralElement,
    /// McCabe cyclomatic complexity (`decisions + 1`) for this element's span.
    pub complexity: u32,
}

/// Trait that each language analyzer must implement.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "python", "rust").
    fn language_id(&self) -> &str;

    /// Returns the tree-sitter `Language` for this analyzer.
    fn tree_sitter_language(&self) -> tree_sitter::Language;

    /// Extract structural elements from a parsed tree.
    fn extract_structure(
        &self,
        tree: &tree_sitter::Tree,
        source: &[u8],
        file_path: &Path,
    ) -> Vec<StructuralElement>;

    /// Extract import statements from a parsed tree for dependency graph construction.
    ///
    /// Default implementation returns empty (languages can override).
    fn extract_imports(
        &self,
        _tree: &tree_sitter::Tree,
        _source: &[u8],
        _file_path: &Path,
    ) -> Vec<ImportStatement> {
        Vec::new()
    }

    /// Node kinds that introduce a branch/decision point for this grammar,
    /// used by the cyclomatic-complexity walk. Defaults to a reasonable
    /// cross-language set; languages override to refine it.
    fn decision_node_kinds(&self) -> &'static [&'static str] {
        &[
            "if_statement",
            "for_statement",
            "while_statement",
            "case_clause",
            "catch_clause",
            "conditional_expression",
            "match_arm",
        ]
    }

    /// `(container_kind, child_kind)` pairs where the child is itself a
    /// counted decision but structurally nested inside a sibling container
    /// that is *also* in `decision_node_kinds` -- e.g. Python's
    /// `elif_clause` living inside an `if_statement`. Without this, walking
    /// both the outer and inner node double-counts a single decision.
    fn decision_keyword_pairs(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// The category with the most elements in `parsed`, ties broken by whichever
/// category was encountered first. `@N` ordinal addressing indexes within
/// this category rather than across the full mixed-category list, so it
/// agrees with a `:LINE` lookup resolving into the same category.
#[must_use]
pub fn dominant_category(parsed: &[ParsedElement]) -> Option<&'static str> {
    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    for p in parsed {
        let category = p.element.kind.category();
        match counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, n)) => *n += 1,
            None => counts.push((category, 1)),
        }
    }
    counts.into_iter().max_by_key(|(_, n)| *n).map(|(c, _)| c)
}

/// Builds a module-name-like string from a file path by stripping the
/// extension and joining the remaining components with `.`. Callers that
/// need a different separator (`::` for C/C++, `/` for JS) replace it
/// themselves; this just gives a language-neutral starting point.
#[must_use]
pub fn build_module_name_from_path(path: &Path) -> String {
    let stem = path.with_extension("");
    stem.components()
        .filter_map(|c| c.as_os_str().to_str())
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join(".")
}

fn build_parser(
    analyzer: &dyn LanguageAnalyzer,
    file_path: &Path,
) -> RevealResult<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&analyzer.tree_sitter_language())
        .map_err(|e| RevealError::ParseDegraded {
            path: file_path.to_path_buf(),
            message: format!("failed to set tree-sitter language: {e}"),
        })?;
    Ok(parser)
}

fn lookup_analyzer(file_path: &Path, language: Language) -> RevealResult<&'static dyn LanguageAnalyzer> {
    registry::global_registry().get(language).ok_or_else(|| RevealError::ParseDegraded {
        path: file_path.to_path_buf(),
        message: format!("no analyzer registered for language: {language}"),
    })
}

/// Parse a source file and extract its structural elements, including a
/// per-element cyclomatic complexity score.
///
/// This is the primary entry point for the parser. It:
/// 1. Looks up the language's registered analyzer
/// 2. Parses the source with tree-sitter
/// 3. Extracts structural elements via the language analyzer
/// 4. Walks the tree a second time to assign complexity per element span
pub fn parse_file(
    file_path: &Path,
    source: &[u8],
    language: Language,
) -> RevealResult<Vec<ParsedElement>> {
    let analyzer = lookup_analyzer(file_path, language)?;
    let mut parser = build_parser(analyzer, file_path)?;

    let tree = parser.parse(source, None).ok_or_else(|| RevealError::ParseDegraded {
        path: file_path.to_path_buf(),
        message: "tree-sitter returned None (parse timeout or cancellation)".into(),
    })?;

    let elements = analyzer.extract_structure(&tree, source, file_path);
    let decisions = compute_complexity(analyzer, &tree);
    Ok(elements
        .into_iter()
        .map(|element| {
            let complexity = complexity_for_span(&decisions, element.line_start, element.line_end);
            ParsedElement { element, complexity }
        })
        .collect())
}

/// Extract import statements from a source file.
///
/// Uses the same tree-sitter parse infrastructure as `parse_file`.
pub fn parse_imports(
    file_path: &Path,
    source: &[u8],
    language: Language,
) -> RevealResult<Vec<ImportStatement>> {
    let analyzer = lookup_analyzer(file_path, language)?;
    let mut parser = build_parser(analyzer, file_path)?;

    let tree = parser.parse(source, None).ok_or_else(|| RevealError::ParseDegraded {
        path: file_path.to_path_buf(),
        message: "tree-sitter returned None".into(),
    })?;

    Ok(analyzer.extract_imports(&tree, source, file_path))
}

// ---------------------------------------------------------------------------
// Cyclomatic complexity
// ---------------------------------------------------------------------------

/// One decision point found while walking the tree, recorded with the
/// 1-indexed source line it starts on so it can be attributed back to the
/// enclosing `StructuralElement` by line range.
struct Decision {
    line: u32,
}

/// Walk the whole tree once, counting decision points per line. Cyclomatic
/// complexity per McCabe is `decisions + 1`; this returns the raw per-line
/// decision list and `complexity_for_span` turns a line range into a count.
fn compute_complexity(analyzer: &dyn LanguageAnalyzer, tree: &tree_sitter::Tree) -> Vec<Decision> {
    let decision_kinds = analyzer.decision_node_kinds();
    let keyword_pairs = analyzer.decision_keyword_pairs();
    let mut decisions = Vec::new();

    let mut cursor = tree.walk();
    walk_node(&mut cursor, None, decision_kinds, keyword_pairs, &mut decisions);
    decisions
}

fn walk_node(
    cursor: &mut tree_sitter::TreeCursor,
    parent_kind: Option<&str>,
    decision_kinds: &[&str],
    keyword_pairs: &[(&str, &str)],
    decisions: &mut Vec<Decision>,
) {
    let node = cursor.node();
    let kind = node.kind();

    let is_decision = decision_kinds.contains(&kind);
    let double_counted = parent_kind.is_some_and(|parent| keyword_pairs.contains(&(parent, kind)));

    if is_decision && !double_counted {
        decisions.push(Decision { line: node.start_position().row as u32 + 1 });
    }

    if cursor.goto_first_child() {
        loop {
            walk_node(cursor, Some(kind), decision_kinds, keyword_pairs, decisions);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

fn complexity_for_span(decisions: &[Decision], line_start: u32, line_end: u32) -> u32 {
    let count = decisions
        .iter()
        .filter(|d| d.line >= line_start && d.line <= line_end)
        .count() as u32;
    count + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_file_unknown_language_returns_error() {
        let result = parse_file(Path::new("test.xyz"), b"hello world", Language::Unknown);
        assert!(result.is_err());
    }

    #[test]
    fn module_name_from_path_joins_with_dots() {
        assert_eq!(build_module_name_from_path(Path::new("src/foo/bar.py")), "src.foo.bar");
    }

    #[test]
    fn complexity_for_span_is_decisions_plus_one() {
        let decisions = vec![Decision { line: 5 }, Decision { line: 8 }, Decision { line: 20 }];
        assert_eq!(complexity_for_span(&decisions, 1, 10), 3);
        assert_eq!(complexity_for_span(&decisions, 1, 30), 4);
    }
}
