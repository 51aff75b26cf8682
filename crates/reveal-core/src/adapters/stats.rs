//! `stats://` -- aggregate line/element/complexity counts over a file or
//! directory, without the per-element detail `file://`/`ast://` return.

use std::path::{Path, PathBuf};

use crate::adapter::{Adapter, HelpRecord};
use crate::adapters::detect_language;
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::filter;
use crate::model::{Element, SourceType, Structure};
use crate::parser;
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `stats://`.
pub struct StatsAdapter;

#[derive(Default)]
struct FileStats {
    path: String,
    lines: u32,
    elements: usize,
    max_complexity: u32,
    total_complexity: u64,
}

impl StatsAdapter {
    fn stats_for_file(path: &Path) -> Option<FileStats> {
        let source = std::fs::read(path).ok()?;
        let lines = source.iter().filter(|&&b| b == b'\n').count() as u32 + 1;
        let language = detect_language(path, String::from_utf8_lossy(&source).lines().next());
        if language == crate::model::Language::Unknown {
            return Some(FileStats { path: path.display().to_string(), lines, ..Default::default() });
        }
        let parsed = parser::parse_file(path, &source, language).ok()?;
        let elements = parsed.len();
        let max_complexity = parsed.iter().map(|p| p.complexity).max().unwrap_or(0);
        let total_complexity: u64 = parsed.iter().map(|p| u64::from(p.complexity)).sum();
        Some(FileStats { path: path.display().to_string(), lines, elements, max_complexity, total_complexity })
    }
}

impl Adapter for StatsAdapter {
    fn scheme(&self) -> &'static str {
        "stats"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let metadata = std::fs::metadata(&path).map_err(|e| RevealError::ResourceUnavailable {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;

        let files: Vec<PathBuf> =
            if metadata.is_dir() { filter::walk(&path, &config.filter, &[]) } else { vec![path.clone()] };

        let per_file: Vec<FileStats> = files.iter().filter_map(|f| Self::stats_for_file(f)).collect();

        let total_lines: u64 = per_file.iter().map(|f| u64::from(f.lines)).sum();
        let total_elements: usize = per_file.iter().map(|f| f.elements).sum();
        let total_complexity: u64 = per_file.iter().map(|f| f.total_complexity).sum();
        let avg_complexity =
            if total_elements == 0 { 0.0 } else { total_complexity as f64 / total_elements as f64 };

        let mut structure = Structure::new("stats_structure", path.display().to_string(), SourceType::File);
        structure = structure.with_category(
            "summary",
            vec![Element::new("totals", 0, 0)
                .with_attr("files", per_file.len())
                .with_attr("lines", total_lines)
                .with_attr("elements", total_elements)
                .with_attr("average_complexity", avg_complexity)],
        );

        let mut per_file_elements: Vec<Element> = per_file
            .into_iter()
            .map(|f| {
                Element::new(f.path, 1, f.lines)
                    .with_attr("elements", f.elements)
                    .with_attr("max_complexity", f.max_complexity)
            })
            .collect();
        per_file_elements.sort_by(|a, b| b.attr::<u32>("max_complexity").cmp(&a.attr::<u32>("max_complexity")));
        structure = structure.with_category("files", per_file_elements);

        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        Err(RevealError::NoSuchElement {
            resource: path.display().to_string(),
            element: format!("{element:?}"),
        })
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "stats".to_string(),
            summary: "Aggregate line/element/complexity counts".to_string(),
            examples: vec!["stats://src".to_string()],
            queryable_fields: vec![],
        }
    }
}
