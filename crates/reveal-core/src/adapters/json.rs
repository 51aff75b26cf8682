//! `json://` -- progressive disclosure over a JSON document's top-level
//! shape, with dotted-path navigation down into nested values.

use std::path::PathBuf;

use serde_json::Value;

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `json://`.
pub struct JsonAdapter;

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn preview(v: &Value) -> String {
    match v {
        Value::Object(map) => format!("{{{} fields}}", map.len()),
        Value::Array(items) => format!("[{} items]", items.len()),
        other => {
            let s = other.to_string();
            if s.len() > 80 {
                format!("{}...", &s[..80])
            } else {
                s
            }
        }
    }
}

fn load(path: &std::path::Path) -> RevealResult<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| RevealError::ResourceUnavailable {
        resource: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| RevealError::ParseDegraded {
        path: path.to_path_buf(),
        message: format!("invalid JSON: {e}"),
    })
}

fn navigate<'a>(root: &'a Value, parts: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

impl Adapter for JsonAdapter {
    fn scheme(&self) -> &'static str {
        "json"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let value = load(&path)?;

        let mut structure = Structure::new("json_structure", path.display().to_string(), SourceType::Document);
        let elements = match &value {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| {
                    Element::new(k.clone(), 0, 0).with_attr("type", type_name(v)).with_attr("preview", preview(v))
                })
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    Element::new(i.to_string(), 0, 0).with_attr("type", type_name(v)).with_attr("preview", preview(v))
                })
                .collect(),
            other => vec![Element::new("value", 0, 0).with_attr("type", type_name(other)).with_attr("preview", preview(other))],
        };
        structure = structure.with_category("fields", elements);
        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let value = load(&path)?;

        let ElementRef::Name(parts) = element else {
            return Err(RevealError::NoSuchElement {
                resource: path.display().to_string(),
                element: format!("{element:?}"),
            });
        };

        let found = navigate(&value, parts).ok_or_else(|| RevealError::NoSuchElement {
            resource: path.display().to_string(),
            element: parts.join("."),
        })?;

        let mut structure = Structure::new("json_element", path.display().to_string(), SourceType::Document);
        let el = Element::new(parts.join("."), 0, 0)
            .with_attr("type", type_name(found))
            .with_attr("value", found.clone());
        structure = structure.with_category("value", vec![el]);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "json".to_string(),
            summary: "Progressive disclosure over a JSON document".to_string(),
            examples: vec!["json://package.json".to_string(), "json://data.json/users.0.name".to_string()],
            queryable_fields: vec!["type".into()],
        }
    }
}
