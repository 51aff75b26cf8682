//! `jsonl://` -- newline-delimited JSON, addressed by record index rather
//! than the dotted-path navigation `json://` offers within one document.

use std::path::PathBuf;

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::{self, CompiledQuery, FieldTable};
use crate::uri::{ElementRef, Uri};

/// Handles `jsonl://`.
pub struct JsonlAdapter;

fn load_records(path: &std::path::Path) -> RevealResult<Vec<serde_json::Value>> {
    let text = std::fs::read_to_string(path).map_err(|e| RevealError::ResourceUnavailable {
        resource: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(v) => records.push(v),
            Err(e) => {
                return Err(RevealError::ParseDegraded {
                    path: path.to_path_buf(),
                    message: format!("line {}: {e}", i + 1),
                })
            }
        }
    }
    Ok(records)
}

fn record_field_table<'a>() -> FieldTable<'a, (usize, serde_json::Value)> {
    FieldTable::new()
        .field("index", |(i, _)| Some(serde_json::Value::from(*i)))
        .field("type", |(_, v)| {
            Some(serde_json::Value::String(
                match v {
                    serde_json::Value::Object(_) => "object",
                    serde_json::Value::Array(_) => "array",
                    _ => "scalar",
                }
                .to_string(),
            ))
        })
}

impl Adapter for JsonlAdapter {
    fn scheme(&self) -> &'static str {
        "jsonl"
    }

    fn get_structure(&self, uri: &Uri, query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let records = load_records(&path)?;
        let total = records.len();

        let mut structure = Structure::new("jsonl_structure", path.display().to_string(), SourceType::Document);
        let fields = record_field_table();
        let indexed: Vec<(usize, serde_json::Value)> = records.into_iter().enumerate().collect();
        let filtered: Vec<_> = indexed.into_iter().filter(|r| query::matches(&query.filter, r, &fields)).collect();

        let (page, truncated, returned_total) =
            query::paginate(filtered, query.sort.as_ref(), query.offset, query.limit, |r, f| fields.get(r, f));
        structure.truncated = truncated;
        if truncated {
            structure.next_cursor = Some((query.offset + page.len()).to_string());
        }
        structure.total_available = Some(returned_total.max(total));
        structure.returned = Some(page.len());

        let elements = page
            .into_iter()
            .map(|(i, v)| {
                Element::new(i.to_string(), u32::try_from(i + 1).unwrap_or(u32::MAX), u32::try_from(i + 1).unwrap_or(u32::MAX))
                    .with_attr("record", v)
            })
            .collect();
        structure = structure.with_category("records", elements);
        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let records = load_records(&path)?;

        let index = match element {
            ElementRef::Ordinal(n) => n.saturating_sub(1),
            ElementRef::Line(n) => (*n as usize).saturating_sub(1),
            _ => {
                return Err(RevealError::NoSuchElement {
                    resource: path.display().to_string(),
                    element: format!("{element:?}"),
                })
            }
        };

        let record = records.get(index).ok_or_else(|| RevealError::NoSuchElement {
            resource: path.display().to_string(),
            element: index.to_string(),
        })?;

        let mut structure = Structure::new("jsonl_element", path.display().to_string(), SourceType::Document);
        let el = Element::new(index.to_string(), 0, 0).with_attr("record", record.clone());
        structure = structure.with_category("record", vec![el]);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "jsonl".to_string(),
            summary: "Newline-delimited JSON, addressed by record index".to_string(),
            examples: vec!["jsonl://events.log@3".to_string()],
            queryable_fields: vec!["index".into(), "type".into()],
        }
    }
}
