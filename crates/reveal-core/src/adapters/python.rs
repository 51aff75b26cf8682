//! `python://` -- the local Python interpreter's own state (version,
//! installed packages), shelling out to `python3`/`pip` rather than
//! parsing `site-packages` metadata directly. A namespace adapter.

use std::process::Command;

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `python://` (not to be confused with the `.py` language
/// analyzer used by `file://`/`ast://`).
pub struct PythonNamespaceAdapter;

fn run(cmd: &str, args: &[&str]) -> Option<String> {
    Command::new(cmd).args(args).output().ok().filter(|o| o.status.success()).map(|o| String::from_utf8_lossy(&o.stdout).into_owned())
}

impl Adapter for PythonNamespaceAdapter {
    fn scheme(&self) -> &'static str {
        "python"
    }

    fn is_namespace(&self) -> bool {
        true
    }

    fn get_structure(&self, _uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let version = run("python3", &["--version"]).unwrap_or_else(|| "unavailable".to_string());
        let mut structure = Structure::new("python_structure", "python://".to_string(), SourceType::Process);
        if version == "unavailable" {
            structure.warn("interpreter_unavailable", "no python3 executable found on PATH");
        }
        structure = structure.with_category(
            "interpreter",
            vec![Element::new("python3", 0, 0).with_attr("version", version.trim().to_string())],
        );
        Ok(structure)
    }

    fn get_element(&self, _uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let ElementRef::Name(parts) = element else {
            return Err(RevealError::NoSuchElement { resource: "python://".to_string(), element: format!("{element:?}") });
        };
        if parts.first().map(String::as_str) != Some("packages") {
            return Err(RevealError::NoSuchElement { resource: "python://".to_string(), element: parts.join(".") });
        }

        let listing = run("pip", &["list", "--format=freeze"]).unwrap_or_default();
        let elements: Vec<Element> = listing
            .lines()
            .filter_map(|line| line.split_once("=="))
            .map(|(name, version)| Element::new(name.to_string(), 0, 0).with_attr("version", version.to_string()))
            .collect();

        let mut structure = Structure::new("python_element", "python://".to_string(), SourceType::Process);
        structure = structure.with_category("packages", elements);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "python".to_string(),
            summary: "Local Python interpreter version and installed packages".to_string(),
            examples: vec!["python://".to_string(), "python://packages".to_string()],
            queryable_fields: vec![],
        }
    }
}
