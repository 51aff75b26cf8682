//! The structural Diff Core: compares two directories or two files by
//! identity (relative path for directories; name+kind for elements within
//! a file), never by line position. A file whose language has no analyzer
//! degrades to an `unknown-shape` byte comparison rather than a line diff.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::adapters::detect_language;
use crate::config::FilterSettings;
use crate::error::RevealResult;
use crate::filter;
use crate::model::Language;
use crate::parser::{self, ParsedElement};

/// One path's fate in a directory comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryChange {
    /// Present only in the right-hand side.
    Added,
    /// Present only in the left-hand side.
    Removed,
    /// Present on both sides with different content.
    Modified,
    /// Present on both sides, byte-identical.
    Unchanged,
}

/// A single relative path's classification.
#[derive(Debug, Clone)]
pub struct DirectoryDiffEntry {
    /// Path relative to each side's root.
    pub relative_path: String,
    pub change: EntryChange,
}

/// Compare two directory trees by relative path identity.
pub fn diff_directories(left_root: &Path, right_root: &Path, filter_settings: &FilterSettings) -> Vec<DirectoryDiffEntry> {
    let left_files: HashSet<String> = filter::walk(left_root, filter_settings, &[])
        .into_iter()
        .map(|p| p.strip_prefix(left_root).unwrap_or(&p).display().to_string())
        .collect();
    let right_files: HashSet<String> = filter::walk(right_root, filter_settings, &[])
        .into_iter()
        .map(|p| p.strip_prefix(right_root).unwrap_or(&p).display().to_string())
        .collect();

    let mut entries = Vec::new();
    let mut all_paths: Vec<&String> = left_files.union(&right_files).collect();
    all_paths.sort();

    for relative in all_paths {
        let change = match (left_files.contains(relative), right_files.contains(relative)) {
            (true, false) => EntryChange::Removed,
            (false, true) => EntryChange::Added,
            (true, true) => {
                let left_bytes = std::fs::read(left_root.join(relative)).unwrap_or_default();
                let right_bytes = std::fs::read(right_root.join(relative)).unwrap_or_default();
                if left_bytes == right_bytes {
                    EntryChange::Unchanged
                } else {
                    EntryChange::Modified
                }
            }
            (false, false) => continue,
        };
        entries.push(DirectoryDiffEntry { relative_path: relative.clone(), change });
    }
    entries
}

/// How one named element changed between two parses of the same file.
#[derive(Debug, Clone)]
pub struct ElementChange {
    pub identity: String,
    pub change: EntryChange,
    /// `(attribute, old, new)` triples, populated only for `Modified`.
    pub attribute_changes: Vec<(String, String, String)>,
}

/// Disambiguate same-name-and-kind elements within one file by assigning
/// each occurrence an ordinal suffix (`foo#1`, `foo#2`, ...), so a second
/// overload doesn't silently shadow the first in the identity map.
fn index_by_identity(parsed: &[ParsedElement]) -> HashMap<String, &ParsedElement> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut indexed = HashMap::new();
    for p in parsed {
        let base = format!("{}:{}", p.element.kind.as_str(), p.element.name);
        let count = counts.entry(base.clone()).or_insert(0);
        *count += 1;
        let identity = if *count == 1 { base } else { format!("{base}#{count}") };
        indexed.insert(identity, p);
    }
    indexed
}

/// Compare two files element-by-element. Falls back to a single
/// `unknown-shape` entry (never a line diff) when either side's language
/// has no structural analyzer.
pub fn diff_files(left_path: &Path, right_path: &Path) -> RevealResult<Vec<ElementChange>> {
    let left_source = std::fs::read(left_path).unwrap_or_default();
    let right_source = std::fs::read(right_path).unwrap_or_default();
    let left_lang = detect_language(left_path, String::from_utf8_lossy(&left_source).lines().next());
    let right_lang = detect_language(right_path, String::from_utf8_lossy(&right_source).lines().next());

    if left_lang == Language::Unknown || right_lang == Language::Unknown {
        let change = if left_source == right_source { EntryChange::Unchanged } else { EntryChange::Modified };
        return Ok(vec![ElementChange {
            identity: "unknown-shape".to_string(),
            change,
            attribute_changes: Vec::new(),
        }]);
    }

    let left_parsed = parser::parse_file(left_path, &left_source, left_lang)?;
    let right_parsed = parser::parse_file(right_path, &right_source, right_lang)?;
    let left_index = index_by_identity(&left_parsed);
    let right_index = index_by_identity(&right_parsed);

    let mut identities: Vec<&String> = left_index.keys().chain(right_index.keys()).collect();
    identities.sort();
    identities.dedup();

    let mut changes = Vec::new();
    for identity in identities {
        let left = left_index.get(identity);
        let right = right_index.get(identity);
        match (left, right) {
            (Some(_), None) => changes.push(ElementChange {
                identity: identity.clone(),
                change: EntryChange::Removed,
                attribute_changes: Vec::new(),
            }),
            (None, Some(_)) => changes.push(ElementChange {
                identity: identity.clone(),
                change: EntryChange::Added,
                attribute_changes: Vec::new(),
            }),
            (Some(l), Some(r)) => {
                let mut attribute_changes = Vec::new();
                if l.element.visibility != r.element.visibility {
                    attribute_changes.push((
                        "visibility".to_string(),
                        l.element.visibility.as_str().to_string(),
                        r.element.visibility.as_str().to_string(),
                    ));
                }
                if l.complexity != r.complexity {
                    attribute_changes.push(("complexity".to_string(), l.complexity.to_string(), r.complexity.to_string()));
                }
                if l.element.content != r.element.content {
                    attribute_changes.push(("content".to_string(), "...".to_string(), "...".to_string()));
                }
                let change = if attribute_changes.is_empty() { EntryChange::Unchanged } else { EntryChange::Modified };
                changes.push(ElementChange { identity: identity.clone(), change, attribute_changes });
            }
            (None, None) => unreachable!("identity came from one of the two maps"),
        }
    }
    Ok(changes)
}
