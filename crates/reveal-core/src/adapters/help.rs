//! `help://` -- lists every registered adapter's `HelpRecord`, or shows one
//! scheme's in detail. A namespace adapter: `help://git` addresses the
//! `git` adapter's help directly.

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::CompiledQuery;
use crate::registry::global_registry;
use crate::uri::{ElementRef, Uri};

/// Handles `help://`.
pub struct HelpAdapter;

fn help_element(help: &HelpRecord) -> Element {
    Element::new(help.scheme.clone(), 0, 0)
        .with_attr("summary", help.summary.clone())
        .with_attr("examples", help.examples.clone())
        .with_attr("queryable_fields", help.queryable_fields.clone())
}

impl Adapter for HelpAdapter {
    fn scheme(&self) -> &'static str {
        "help"
    }

    fn is_namespace(&self) -> bool {
        true
    }

    fn get_structure(&self, _uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let registry = global_registry();
        let mut schemes = registry.schemes();
        schemes.sort_unstable();

        let elements: Vec<Element> =
            schemes.into_iter().filter_map(|s| registry.get(s)).map(|a| help_element(&a.get_help())).collect();

        let mut structure = Structure::new("help_structure", "help://".to_string(), SourceType::Other);
        structure = structure.with_category("schemes", elements);
        Ok(structure)
    }

    fn get_element(&self, _uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let ElementRef::Name(parts) = element else {
            return Err(RevealError::NoSuchElement { resource: "help://".to_string(), element: format!("{element:?}") });
        };
        let scheme = parts.first().cloned().unwrap_or_default();
        let adapter = global_registry().get(&scheme).ok_or_else(|| RevealError::NoSuchElement {
            resource: "help://".to_string(),
            element: scheme.clone(),
        })?;

        let mut structure = Structure::new("help_element", "help://".to_string(), SourceType::Other);
        structure = structure.with_category("scheme", vec![help_element(&adapter.get_help())]);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "help".to_string(),
            summary: "Discover registered adapters and their examples".to_string(),
            examples: vec!["help://".to_string(), "help://git".to_string()],
            queryable_fields: vec![],
        }
    }
}
