//! `mysql://` -- registered for scheme completeness and `--adapters`
//! discoverability, but out of scope: reveal ships no MySQL client driver.
//! Every call reports `ResourceUnavailable` with a pointer to a supported
//! alternative rather than silently doing nothing.

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::Structure;
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `mysql://` (stub; see module docs).
pub struct MysqlAdapter;

impl Adapter for MysqlAdapter {
    fn scheme(&self) -> &'static str {
        "mysql"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        Err(RevealError::ResourceUnavailable {
            resource: uri.resource.clone(),
            message: "mysql:// is out of scope; use sqlite:// for a local database or export to csv/json".to_string(),
        })
    }

    fn get_element(&self, uri: &Uri, _element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        Err(RevealError::ResourceUnavailable {
            resource: uri.resource.clone(),
            message: "mysql:// is out of scope".to_string(),
        })
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "mysql".to_string(),
            summary: "Not supported -- use sqlite:// instead".to_string(),
            examples: vec![],
            queryable_fields: vec![],
        }
    }
}
