//! `file://` -- the default adapter for a single source file or a
//! directory tree. Bare paths on the CLI are synthesized into this scheme
//! by `Uri::parse`.

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

/// Handles `file://` (and bare paths promoted to it).
pub struct FileAdapter;

impl FileAdapter {
    fn structure_for_file(path: &Path, query: &CompiledQuery) -> RevealResult<Structure> {
        let source = std::fs::read(path).map_err(|e| RevealError::ResourceUnavailable {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;
        let first_line = String::from_utf8_lossy(&source).lines().next().map(str::to_string);
        let language = detect_language(path, first_line.as_deref());

        let mut structure = Structure::new("file_structure", path.display().to_string(), SourceType::File);

        if language == crate::model::Language::Unknown {
            structure.warn("unsupported_language", "no analyzer registered; returning raw line count only");
            structure.parse_mode = Some(crate::model::ParseMode::Heuristic);
            structure.confidence = Some(crate::model::ParseMode::Heuristic.default_confidence());
            let line_count = source.iter().filter(|&&b| b == b'\n').count() as u32 + 1;
            structure = structure.with_category(
                "lines",
                vec![Element::new(path.display().to_string(), 1, line_count)],
            );
            return Ok(structure);
        }

        match parser::parse_file(path, &source, language) {
            Ok(parsed) => {
                structure.parse_mode = Some(crate::model::ParseMode::Full);
                structure.confidence = Some(crate::model::ParseMode::Full.default_confidence());
                let categories = categorize(parsed);
                let fields = element_field_table();
                for (name, elements) in categories {
                    let filtered: Vec<Element> =
                        elements.into_iter().filter(|e| query::matches(&query.filter, e, &fields)).collect();
                    structure.categories.insert(name, filtered);
                }
            }
            Err(RevealError::ParseDegraded { message, .. }) => {
                structure.parse_mode = Some(crate::model::ParseMode::Fallback);
                structure.confidence = Some(crate::model::ParseMode::Fallback.default_confidence());
                structure.warn("parse_degraded", message);
            }
            Err(e) => return Err(e),
        }

        for unknown in &query.unknown_fields {
            structure.warn("unknown_field", format!("'{unknown}' is not a queryable field on this resource"));
        }

        Ok(structure)
    }

    fn structure_for_directory(path: &Path, query: &CompiledQuery, config: &Config) -> RevealResult<Structure> {
        let mut structure = Structure::new("directory_structure", path.display().to_string(), SourceType::Directory);
        let files = filter::walk(path, &config.filter, &[]);

        let mut entries = Vec::new();
        for file in &files {
            let relative = file.strip_prefix(path).unwrap_or(file);
            let size = std::fs::metadata(file).map(|m| m.len()).unwrap_or(0);
            entries.push(
                Element::new(relative.display().to_string(), 0, 0)
                    .with_attr("size_bytes", size)
                    .with_attr("language", detect_language(file, None).as_str()),
            );
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        structure.total_available = Some(entries.len());

        let fields = crate::query::FieldTable::new()
            .field("name", |e: &Element| Some(serde_json::Value::String(e.name.clone())))
            .field("size_bytes", |e: &Element| e.attr::<u64>("size_bytes").map(serde_json::Value::from))
            .field("language", |e: &Element| e.attr::<String>("language").map(serde_json::Value::String));
        let filtered: Vec<Element> = entries.into_iter().filter(|e| query::matches(&query.filter, e, &fields)).collect();

        let (page, truncated, total) =
            query::paginate(filtered, query.sort.as_ref(), query.offset, query.limit, |e, f| fields.get(e, f));
        structure.truncated = truncated;
        if truncated {
            structure.next_cursor = Some((query.offset + page.len()).to_string());
        }
        structure.returned = Some(page.len());
        structure.total_available = Some(total);
        structure = structure.with_category("entries", page);

        for unknown in &query.unknown_fields {
            structure.warn("unknown_field", format!("'{unknown}' is not a queryable field on this resource"));
        }

        Ok(structure)
    }

    fn resolve_path(uri: &Uri) -> PathBuf {
        PathBuf::from(&uri.resource)
    }
}

impl Adapter for FileAdapter {
    fn scheme(&self) -> &'static str {
        "file"
    }

    fn get_structure(&self, uri: &Uri, query: &CompiledQuery, config: &Config) -> RevealResult<Structure> {
        let path = Self::resolve_path(uri);
        let metadata = std::fs::metadata(&path).map_err(|e| RevealError::ResourceUnavailable {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;

        if metadata.is_dir() {
            Self::structure_for_directory(&path, query, config)
        } else {
            Self::structure_for_file(&path, query)
        }
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = Self::resolve_path(uri);
        let source = std::fs::read(&path).map_err(|e| RevealError::ResourceUnavailable {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;
        let language = detect_language(&path, String::from_utf8_lossy(&source).lines().next());
        let parsed = parser::parse_file(&path, &source, language)?;

        let found = match element {
            ElementRef::Line(line) => {
                parsed.iter().find(|p| p.element.line_start <= *line && *line <= p.element.line_end)
            }
            ElementRef::Ordinal(n) => {
                let dominant = parser::dominant_category(&parsed);
                parsed.iter().filter(|p| Some(p.element.kind.category()) == dominant).nth(n.saturating_sub(1))
            }
            ElementRef::TypedOrdinal(kind, n) => parsed
                .iter()
                .filter(|p| p.element.kind.as_str() == kind)
                .nth(n.saturating_sub(1)),
            ElementRef::Name(parts) => {
                let joined = parts.join(".");
                parsed.iter().find(|p| p.element.symbol_path.ends_with(&joined) || p.element.name == joined)
            }
        };

        let found = found.ok_or_else(|| RevealError::NoSuchElement {
            resource: path.display().to_string(),
            element: format!("{element:?}"),
        })?;

        let mut structure = Structure::new("file_element", path.display().to_string(), SourceType::File);
        let mut el = crate::adapters::project_element(found);
        el = el.with_attr("content", &found.element.content);
        structure = structure.with_category(found.element.kind.category(), vec![el]);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "file".to_string(),
            summary: "A single source file or a directory tree".to_string(),
            examples: vec!["file://src/main.rs".to_string(), "file://src?language=rust".to_string()],
            queryable_fields: vec!["name".into(), "kind".into(), "complexity".into(), "size_bytes".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ParsedQuery;

    #[test]
    fn get_structure_for_python_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.py");
        std::fs::write(&path, "def foo(x):\n    return x\n").unwrap();

        let uri = Uri::parse(&format!("file://{}", path.display())).unwrap();
        let config = Config::defaults(dir.path());
        let query = query::compile(&ParsedQuery::default(), &element_field_table());
        let structure = FileAdapter.get_structure(&uri, &query, &config).unwrap();

        assert_eq!(structure.source_type, SourceType::File);
        assert!(structure.categories.get("functions").is_some_and(|v| !v.is_empty()));
    }

    #[test]
    fn unreadable_path_is_resource_unavailable() {
        let uri = Uri::parse("file:///definitely/not/a/real/path").unwrap();
        let config = Config::defaults(Path::new("."));
        let query = query::compile(&ParsedQuery::default(), &element_field_table());
        let err = FileAdapter.get_structure(&uri, &query, &config).unwrap_err();
        assert!(matches!(err, RevealError::ResourceUnavailable { .. }));
    }
}
