//! `diff://leftPath:rightPath` -- structural comparison of two files or
//! two directory trees, wrapping the top-level `crate::diff` core. A side
//! may itself be scheme-qualified (`diff://path:git://path@ref`).

use std::path::PathBuf;

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::diff::{self, EntryChange};
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `diff://`.
pub struct DiffAdapter;

fn change_name(change: &EntryChange) -> &'static str {
    match change {
        EntryChange::Added => "added",
        EntryChange::Removed => "removed",
        EntryChange::Modified => "modified",
        EntryChange::Unchanged => "unchanged",
    }
}

/// Split `left:right` on the first `:` that isn't a Windows drive letter
/// (a single ASCII letter at the start of a path segment, e.g. `C:`). The
/// right side may be a plain path or itself scheme-qualified
/// (`git://path@ref`); since its own `:` falls after the one we pick here,
/// it's never mistaken for the separator.
fn split_sides(resource: &str) -> RevealResult<(PathBuf, PathBuf)> {
    let chars: Vec<char> = resource.chars().collect();
    let mut search_from = 0;
    loop {
        let Some(rel_idx) = chars[search_from..].iter().position(|&c| c == ':') else {
            return Err(RevealError::UriParse {
                input: resource.to_string(),
                message: "diff:// resource must be 'left:right'".to_string(),
            });
        };
        let idx = search_from + rel_idx;
        let is_drive_letter = idx >= 1
            && chars[idx - 1].is_ascii_alphabetic()
            && (idx == 1 || !chars[idx - 2].is_ascii_alphanumeric());
        if is_drive_letter {
            search_from = idx + 1;
            continue;
        }

        let left: String = chars[..idx].iter().collect();
        let right: String = chars[idx + 1..].iter().collect();
        if left.is_empty() || right.is_empty() {
            return Err(RevealError::UriParse {
                input: resource.to_string(),
                message: "diff:// resource must be 'left:right'".to_string(),
            });
        }
        return Ok((PathBuf::from(left), PathBuf::from(right)));
    }
}

impl Adapter for DiffAdapter {
    fn scheme(&self) -> &'static str {
        "diff"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, config: &Config) -> RevealResult<Structure> {
        let (left, right) = split_sides(&uri.resource)?;
        let left_is_dir = std::fs::metadata(&left).map(|m| m.is_dir()).unwrap_or(false);

        let mut structure = Structure::new("diff_structure", uri.resource.clone(), SourceType::Other);

        if left_is_dir {
            let entries = diff::diff_directories(&left, &right, &config.filter);
            let elements: Vec<Element> = entries
                .into_iter()
                .map(|e| Element::new(e.relative_path, 0, 0).with_attr("change", change_name(&e.change)))
                .collect();
            structure = structure.with_category("entries", elements);
        } else {
            let changes = diff::diff_files(&left, &right)?;
            let elements: Vec<Element> = changes
                .into_iter()
                .map(|c| {
                    let attrs: Vec<String> = c.attribute_changes.iter().map(|(k, old, new)| format!("{k}: {old} -> {new}")).collect();
                    Element::new(c.identity, 0, 0).with_attr("change", change_name(&c.change)).with_attr("attribute_changes", attrs)
                })
                .collect();
            structure = structure.with_category("elements", elements);
        }
        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        Err(RevealError::NoSuchElement { resource: uri.resource.clone(), element: format!("{element:?}") })
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "diff".to_string(),
            summary: "Structural comparison of two files or directory trees".to_string(),
            examples: vec!["diff://v1/src:v2/src".to_string(), "diff://old.py:new.py".to_string()],
            queryable_fields: vec!["change".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_paths_on_colon() {
        let (l, r) = split_sides("a.py:b.py").unwrap();
        assert_eq!(l, PathBuf::from("a.py"));
        assert_eq!(r, PathBuf::from("b.py"));
    }

    #[test]
    fn right_side_may_be_scheme_qualified() {
        let (l, r) = split_sides("src/app.py:git://src/app.py@HEAD~1").unwrap();
        assert_eq!(l, PathBuf::from("src/app.py"));
        assert_eq!(r, PathBuf::from("git://src/app.py@HEAD~1"));
    }

    #[test]
    fn windows_drive_letters_are_not_mistaken_for_the_separator() {
        let (l, r) = split_sides(r"C:\old\a.py:C:\new\a.py").unwrap();
        assert_eq!(l, PathBuf::from(r"C:\old\a.py"));
        assert_eq!(r, PathBuf::from(r"C:\new\a.py"));
    }

    #[test]
    fn missing_separator_is_an_error() {
        assert!(split_sides("onlyonepath.py").is_err());
    }
}
