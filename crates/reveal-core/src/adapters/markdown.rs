//! `markdown://` -- heading-delimited sections plus front matter, with the
//! Schema Validator hook for custom front-matter rules.

use std::path::PathBuf;

use crate::adapter::{Adapter, HelpRecord};
use crate::adapters::detect_language;
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, Language, SourceType, Structure};
use crate::parser;
use crate::query::CompiledQuery;
use crate::schema;
use crate::uri::{ElementRef, Uri};

/// Handles `markdown://`.
pub struct MarkdownAdapter;

/// Split a leading `---` front-matter block off the document body.
/// Returns `(front_matter_lines, body_start_line)`.
fn split_front_matter(source: &str) -> (Vec<(String, String)>, u32) {
    let mut lines = source.lines();
    if lines.next() != Some("---") {
        return (Vec::new(), 1);
    }

    let mut pairs = Vec::new();
    let mut consumed = 1u32;
    for line in lines {
        consumed += 1;
        if line.trim() == "---" {
            return (pairs, consumed + 1);
        }
        if let Some((key, value)) = line.split_once(':') {
            pairs.push((key.trim().to_string(), value.trim().trim_matches('"').to_string()));
        }
    }
    (Vec::new(), 1)
}

impl Adapter for MarkdownAdapter {
    fn scheme(&self) -> &'static str {
        "markdown"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let source = std::fs::read(&path).map_err(|e| RevealError::ResourceUnavailable {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;
        let source_str = String::from_utf8_lossy(&source);
        let (front_matter, _) = split_front_matter(&source_str);

        let mut structure = Structure::new("markdown_structure", path.display().to_string(), SourceType::Document);

        if !front_matter.is_empty() {
            let elements: Vec<Element> = front_matter
                .iter()
                .map(|(k, v)| Element::new(k.clone(), 0, 0).with_attr("value", v.clone()))
                .collect();
            structure = structure.with_category("frontmatter", elements);

            for notice in schema::validate_front_matter(&front_matter) {
                structure.warn(notice.0, notice.1);
            }
        }

        let language = detect_language(&path, Some("---"));
        let language = if language == Language::Unknown { Language::Markdown } else { language };
        let parsed = parser::parse_file(&path, &source, language).unwrap_or_default();
        let elements = parsed.into_iter().map(|p| crate::adapters::project_element(&p)).collect();
        structure = structure.with_category("sections", elements);

        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let source = std::fs::read(&path).map_err(|e| RevealError::ResourceUnavailable {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;
        let parsed = parser::parse_file(&path, &source, Language::Markdown)?;

        let found = match element {
            ElementRef::Ordinal(n) => parsed.get(n.saturating_sub(1)),
            ElementRef::Line(line) => {
                parsed.iter().find(|p| p.element.line_start <= *line && *line <= p.element.line_end)
            }
            ElementRef::Name(parts) => {
                let joined = parts.join(" ");
                parsed.iter().find(|p| p.element.name == joined)
            }
            ElementRef::TypedOrdinal(_, n) => parsed.get(n.saturating_sub(1)),
        }
        .ok_or_else(|| RevealError::NoSuchElement {
            resource: path.display().to_string(),
            element: format!("{element:?}"),
        })?;

        let mut structure = Structure::new("markdown_element", path.display().to_string(), SourceType::Document);
        let el = crate::adapters::project_element(found).with_attr("content", &found.element.content);
        structure = structure.with_category("section", vec![el]);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "markdown".to_string(),
            summary: "Heading-delimited sections and front matter".to_string(),
            examples: vec!["markdown://README.md".to_string(), "markdown://post.md/Introduction".to_string()],
            queryable_fields: vec!["name".into()],
        }
    }
}
