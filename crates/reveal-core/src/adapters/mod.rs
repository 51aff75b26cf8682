//! Built-in adapters. Each module implements one `Adapter` for one scheme.

pub mod ast;
pub mod claude;
pub mod diff;
pub mod domain;
pub mod env;
pub mod file;
pub mod git;
pub mod git_support;
pub mod help;
pub mod imports;
pub mod json;
pub mod jsonl;
pub mod markdown;
pub mod mysql;
pub mod python;
pub mod reveal_self;
pub mod sqlite;
pub mod ssl;
pub mod stats;
pub mod xlsx;

use std::path::Path;

use crate::model::{Element, Language};
use crate::parser::ParsedElement;
use crate::query::FieldTable;

/// Detect the `Language` of a file from its extension, well-known filename,
/// or (failing both) its shebang line.
#[must_use]
pub fn detect_language(path: &Path, first_line: Option<&str>) -> Language {
    if let Some(name) = path.file_name().and_then(std::ffi::OsStr::to_str) {
        if let Some(lang) = Language::from_filename(name) {
            return lang;
        }
    }
    if let Some(ext) = path.extension().and_then(std::ffi::OsStr::to_str) {
        let lang = Language::from_extension(ext);
        if lang != Language::Unknown {
            return lang;
        }
    }
    if let Some(line) = first_line {
        if let Some(lang) = Language::from_shebang(line) {
            return lang;
        }
    }
    Language::Unknown
}

/// Project a `ParsedElement` (parser-internal) into the Output Contract's
/// `Element` shape, recursing is not needed since the parser already
/// returns a flat list per file; adapters group by `ElementKind::category`.
#[must_use]
pub fn project_element(parsed: &ParsedElement) -> Element {
    let e = &parsed.element;
    Element::new(e.name.clone(), e.line_start, e.line_end)
        .with_attr("kind", e.kind.as_str())
        .with_attr("visibility", e.visibility.as_str())
        .with_attr("symbol_path", &e.symbol_path)
        .with_attr("complexity", parsed.complexity)
        .with_attr("signature", first_line(&e.content))
        .with_attr("doc_comment", e.doc_comment.clone())
}

fn first_line(content: &str) -> String {
    content.lines().next().unwrap_or_default().trim().to_string()
}

/// Standard queryable-field table for code Elements (functions/classes/...),
/// shared by the `ast`, `file`, and `stats` adapters so `?complexity>10`
/// means the same thing everywhere.
#[must_use]
pub fn element_field_table<'a>() -> FieldTable<'a, Element> {
    FieldTable::new()
        .field("name", |e| Some(serde_json::Value::String(e.name.clone())))
        .field("kind", |e| e.attr::<String>("kind").map(serde_json::Value::String))
        .field("visibility", |e| e.attr::<String>("visibility").map(serde_json::Value::String))
        .field("complexity", |e| e.attr::<u32>("complexity").map(serde_json::Value::from))
        .field("line_start", |e| Some(serde_json::Value::from(e.line_start)))
        .field("line_end", |e| Some(serde_json::Value::from(e.line_end)))
}

/// Group projected elements into Output Contract categories keyed by
/// `ElementKind::category()`.
#[must_use]
pub fn categorize(parsed: Vec<ParsedElement>) -> indexmap::IndexMap<String, Vec<Element>> {
    let mut categories: indexmap::IndexMap<String, Vec<Element>> = indexmap::IndexMap::new();
    for p in &parsed {
        let category = p.element.kind.category();
        categories.entry(category.to_string()).or_default().push(project_element(p));
    }
    categories
}
