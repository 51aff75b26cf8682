//! `xlsx://` -- spreadsheet sheets as a category, rows as elements within a
//! sheet. Backed by `calamine`, which reads the workbook format directly
//! rather than shelling out to a spreadsheet application.

use std::path::PathBuf;

use calamine::{open_workbook_auto, Data, Reader};

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `xlsx://`.
pub struct XlsxAdapter;

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => d.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERROR:{e:?}"),
    }
}

impl Adapter for XlsxAdapter {
    fn scheme(&self) -> &'static str {
        "xlsx"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let mut workbook = open_workbook_auto(&path).map_err(|e| RevealError::ResourceUnavailable {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut structure = Structure::new("xlsx_structure", path.display().to_string(), SourceType::Document);
        let names = workbook.sheet_names().to_owned();
        let elements: Vec<Element> = names
            .into_iter()
            .map(|name| {
                let (rows, cols) = workbook
                    .worksheet_range(&name)
                    .map(|r| (r.height(), r.width()))
                    .unwrap_or((0, 0));
                Element::new(name, 0, 0).with_attr("rows", rows).with_attr("columns", cols)
            })
            .collect();
        structure = structure.with_category("sheets", elements);
        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let path = PathBuf::from(&uri.resource);
        let mut workbook = open_workbook_auto(&path).map_err(|e| RevealError::ResourceUnavailable {
            resource: path.display().to_string(),
            message: e.to_string(),
        })?;

        let ElementRef::Name(parts) = element else {
            return Err(RevealError::NoSuchElement {
                resource: path.display().to_string(),
                element: format!("{element:?}"),
            });
        };
        let sheet_name = parts.first().cloned().unwrap_or_default();
        let range = workbook.worksheet_range(&sheet_name).map_err(|_| RevealError::NoSuchElement {
            resource: path.display().to_string(),
            element: sheet_name.clone(),
        })?;

        let mut structure = Structure::new("xlsx_element", path.display().to_string(), SourceType::Document);
        let rows: Vec<Element> = range
            .rows()
            .enumerate()
            .map(|(i, row)| {
                let values: Vec<String> = row.iter().map(cell_to_string).collect();
                Element::new(format!("row_{}", i + 1), u32::try_from(i + 1).unwrap_or(u32::MAX), u32::try_from(i + 1).unwrap_or(u32::MAX))
                    .with_attr("values", values)
            })
            .collect();
        structure = structure.with_category("rows", rows);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "xlsx".to_string(),
            summary: "Spreadsheet sheets and rows".to_string(),
            examples: vec!["xlsx://report.xlsx".to_string(), "xlsx://report.xlsx/Sheet1".to_string()],
            queryable_fields: vec![],
        }
    }
}
