//! `env://` -- the invocation's own process environment. A namespace
//! adapter: `env://PATH` addresses a variable directly rather than naming
//! a filesystem resource.

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::{self, CompiledQuery, FieldTable};
use crate::uri::{ElementRef, Uri};

/// Handles `env://`.
pub struct EnvAdapter;

fn field_table<'a>() -> FieldTable<'a, (String, String)> {
    FieldTable::new()
        .field("name", |(k, _)| Some(serde_json::Value::String(k.clone())))
        .field("value", |(_, v)| Some(serde_json::Value::String(v.clone())))
}

impl Adapter for EnvAdapter {
    fn scheme(&self) -> &'static str {
        "env"
    }

    fn is_namespace(&self) -> bool {
        true
    }

    fn get_structure(&self, _uri: &Uri, query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let mut vars: Vec<(String, String)> = std::env::vars().collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));

        let fields = field_table();
        let filtered: Vec<_> = vars.into_iter().filter(|v| query::matches(&query.filter, v, &fields)).collect();
        let (page, truncated, total) =
            query::paginate(filtered, query.sort.as_ref(), query.offset, query.limit, |v, f| fields.get(v, f));

        let mut structure = Structure::new("env_structure", "env://".to_string(), SourceType::Process);
        structure.truncated = truncated;
        if truncated {
            structure.next_cursor = Some((query.offset + page.len()).to_string());
        }
        structure.total_available = Some(total);
        structure.returned = Some(page.len());
        let elements = page.into_iter().map(|(k, v)| Element::new(k, 0, 0).with_attr("value", v)).collect();
        structure = structure.with_category("variables", elements);
        Ok(structure)
    }

    fn get_element(&self, _uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let ElementRef::Name(parts) = element else {
            return Err(RevealError::NoSuchElement { resource: "env://".to_string(), element: format!("{element:?}") });
        };
        let name = parts.join("_");
        let value = std::env::var(&name).map_err(|_| RevealError::NoSuchElement {
            resource: "env://".to_string(),
            element: name.clone(),
        })?;

        let mut structure = Structure::new("env_element", "env://".to_string(), SourceType::Process);
        structure = structure.with_category("variable", vec![Element::new(name, 0, 0).with_attr("value", value)]);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "env".to_string(),
            summary: "The invocation's own process environment".to_string(),
            examples: vec!["env://".to_string(), "env://PATH".to_string()],
            queryable_fields: vec!["name".into(), "value".into()],
        }
    }
}
