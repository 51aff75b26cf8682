//! `ast://` -- direct access to the parsed structural-element tree and its
//! per-element cyclomatic complexity, independent of `file://`'s directory
//! listing behavior. Mirrors `--show-ast`.

use std::path::{Path, PathBuf};

use crate::adapter::{Adapter, HelpRecord};
use crate::adapters::{categorize, detect_language, element_field_table};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::filter;
use crate::model::{Element, SourceType, Structure};
use crate::parser;
use crate::query::{self, CompiledQuery};
use crate::uri::{ElementRef, Uri};

/// Handles `ast://`.
pub struct AstAdapter;

impl AstAdapter {
    fn parse_one(path: &Path) -> RevealResult<Vec<parser::ParsedElement>> {
        let source = std::fs::read(path).map_err(|e| RevealError::ResourceUnavailable {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;
        let language = detect_language(path, String::from_utf8_lossy(&source).lines().next());
        parser::parse_file(path, &source, language)
    }
}

impl Adapter for AstAdapter {
    fn scheme(&self) -> &'static str {
        "ast"
    }

    fn get_structure(&self, uri: &Uri, query: &CompiledQuery, config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let metadata = std::fs::metadata(&path).map_err(|e| RevealError::ResourceUnavailable {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut all = Vec::new();
        if metadata.is_dir() {
            for file in filter::walk(&path, &config.filter, &[]) {
                if let Ok(parsed) = Self::parse_one(&file) {
                    all.extend(parsed);
                }
            }
        } else {
            all = Self::parse_one(&path)?;
        }

        let mut structure = Structure::new("ast_structure", path.display().to_string(), SourceType::File);
        let categories = categorize(all);
        let fields = element_field_table();
        for (name, elements) in categories {
            let filtered: Vec<Element> =
                elements.into_iter().filter(|e| query::matches(&query.filter, e, &fields)).collect();
            let (page, truncated, total) =
                query::paginate(filtered, query.sort.as_ref(), query.offset, query.limit, |e, f| fields.get(e, f));
            if truncated {
                structure.next_cursor = Some((query.offset + page.len()).to_string());
            }
            structure.truncated |= truncated;
            structure.categories.insert(name, page);
            structure.total_available = Some(structure.total_available.unwrap_or(0) + total);
        }
        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let parsed = Self::parse_one(&path)?;

        let found = match element {
            ElementRef::Line(line) => {
                parsed.iter().find(|p| p.element.line_start <= *line && *line <= p.element.line_end)
            }
            ElementRef::Ordinal(n) => {
                let dominant = parser::dominant_category(&parsed);
                parsed.iter().filter(|p| Some(p.element.kind.category()) == dominant).nth(n.saturating_sub(1))
            }
            ElementRef::TypedOrdinal(kind, n) => {
                parsed.iter().filter(|p| p.element.kind.as_str() == kind).nth(n.saturating_sub(1))
            }
            ElementRef::Name(parts) => {
                let joined = parts.join(".");
                parsed.iter().find(|p| p.element.symbol_path.ends_with(&joined))
            }
        }
        .ok_or_else(|| RevealError::NoSuchElement {
            resource: path.display().to_string(),
            element: format!("{element:?}"),
        })?;

        let mut structure = Structure::new("ast_element", path.display().to_string(), SourceType::File);
        let el = crate::adapters::project_element(found).with_attr("content", &found.element.content);
        structure = structure.with_category(found.element.kind.category(), vec![el]);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "ast".to_string(),
            summary: "Parsed structural elements with cyclomatic complexity".to_string(),
            examples: vec!["ast://src?complexity>10".to_string()],
            queryable_fields: vec!["name".into(), "kind".into(), "complexity".into()],
        }
    }
}
