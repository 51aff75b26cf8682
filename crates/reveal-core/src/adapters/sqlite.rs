//! `sqlite://` -- tables as a category, rows as elements within a table.
//! Read-only: every connection is opened with `SQLITE_OPEN_READ_ONLY` since
//! resource mutation is out of scope.

use std::path::PathBuf;

use rusqlite::{Connection, OpenFlags};

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `sqlite://`.
pub struct SqliteAdapter;

fn open(path: &std::path::Path) -> RevealResult<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|e| {
        RevealError::ResourceUnavailable { resource: path.display().to_string(), message: e.to_string() }
    })
}

impl Adapter for SqliteAdapter {
    fn scheme(&self) -> &'static str {
        "sqlite"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let conn = open(&path)?;

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")?;
        let table_names: Vec<String> =
            stmt.query_map([], |row| row.get(0))?.filter_map(Result::ok).collect();

        let mut structure = Structure::new("sqlite_structure", path.display().to_string(), SourceType::Database);
        let elements: Vec<Element> = table_names
            .into_iter()
            .map(|name| {
                let count: i64 = conn
                    .query_row(&format!("SELECT COUNT(*) FROM \"{name}\""), [], |row| row.get(0))
                    .unwrap_or(0);
                Element::new(name, 0, 0).with_attr("row_count", count)
            })
            .collect();
        structure = structure.with_category("tables", elements);
        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let conn = open(&path)?;

        let ElementRef::Name(parts) = element else {
            return Err(RevealError::NoSuchElement {
                resource: path.display().to_string(),
                element: format!("{element:?}"),
            });
        };
        let table = parts.first().cloned().unwrap_or_default();

        let mut stmt = conn
            .prepare(&format!("SELECT * FROM \"{table}\" LIMIT 100"))
            .map_err(|_| RevealError::NoSuchElement { resource: path.display().to_string(), element: table.clone() })?;
        let column_names: Vec<String> = stmt.column_names().iter().map(|s| (*s).to_string()).collect();

        let rows: Vec<Element> = stmt
            .query_map([], |row| {
                let values: Vec<String> = (0..column_names.len())
                    .map(|i| row.get::<_, rusqlite::types::Value>(i).map(format_value).unwrap_or_default())
                    .collect();
                Ok(values)
            })?
            .filter_map(Result::ok)
            .enumerate()
            .map(|(i, values)| Element::new(format!("row_{}", i + 1), 0, 0).with_attr("values", values))
            .collect();

        let mut structure = Structure::new("sqlite_element", path.display().to_string(), SourceType::Database);
        structure = structure.with_category("columns", column_names.into_iter().map(|c| Element::new(c, 0, 0)).collect());
        structure = structure.with_category("rows", rows);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "sqlite".to_string(),
            summary: "Read-only table and row introspection".to_string(),
            examples: vec!["sqlite://app.db".to_string(), "sqlite://app.db/users".to_string()],
            queryable_fields: vec![],
        }
    }
}

fn format_value(v: rusqlite::types::Value) -> String {
    match v {
        rusqlite::types::Value::Null => "NULL".to_string(),
        rusqlite::types::Value::Integer(i) => i.to_string(),
        rusqlite::types::Value::Real(f) => f.to_string(),
        rusqlite::types::Value::Text(s) => s,
        rusqlite::types::Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
