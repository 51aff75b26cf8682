//! The Adapter contract: the trait every scheme handler implements, plus
//! the self-describing metadata (`HelpRecord`, `Schema`) the `help://` and
//! `--capabilities` surfaces read back out of each adapter without having
//! to special-case it by scheme.

use crate::config::Config;
use crate::error::RevealResult;
use crate::model::Structure;
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// What an adapter tells `help://<scheme>` about itself.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HelpRecord {
    /// The scheme this record describes.
    pub scheme: String,
    /// One-line description.
    pub summary: String,
    /// Example URIs a user could try.
    pub examples: Vec<String>,
    /// Query fields this adapter's Elements expose.
    pub queryable_fields: Vec<String>,
}

/// A minimal JSON-Schema-shaped description of one category's Element
/// attributes, for `--show-ast`/schema introspection and the Schema
/// Validator's field-presence checks.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Schema {
    /// Category name this schema describes (e.g. "functions").
    pub category: String,
    /// Attribute name -> JSON type tag ("string", "number", "boolean", "array").
    pub fields: Vec<(String, String)>,
}

/// The contract every scheme handler implements. An adapter is either an
/// *element-namespace* adapter (`env://`, `python://`, `help://`,
/// `claude://` -- the "resource" names a logical namespace, not a
/// filesystem/network target) or a *resource-as-target* adapter (`file://`,
/// `git://`, `json://`, ...).
pub trait Adapter: Send + Sync {
    /// The scheme this adapter handles, e.g. `"file"`.
    fn scheme(&self) -> &'static str;

    /// Resolve a URI into a Structure: the top-level progressive-disclosure
    /// view of the resource (categories of Elements, not their full detail).
    fn get_structure(&self, uri: &Uri, query: &CompiledQuery, config: &Config) -> RevealResult<Structure>;

    /// Resolve a single Element within the resource named by `uri`, per the
    /// given addressing form. `query` carries the same compiled filter/sort/
    /// select directives `get_structure` receives, so an element-addressed
    /// request never silently drops its query string.
    fn get_element(&self, uri: &Uri, element: &ElementRef, query: &CompiledQuery, config: &Config) -> RevealResult<Structure>;

    /// Self-describing help record for `help://<scheme>`.
    fn get_help(&self) -> HelpRecord;

    /// Schema(s) this adapter's categories expose, for `--show-ast`-style
    /// introspection and the Schema Validator. Default: no declared schema.
    fn get_schema(&self) -> Vec<Schema> {
        Vec::new()
    }

    /// Whether this scheme treats its `resource` as a namespace (`env`,
    /// `python`, `help`, `claude`) rather than an addressable target the
    /// Filter/Dispatcher must locate on disk or network. Namespace
    /// adapters skip path resolution in the dispatcher.
    fn is_namespace(&self) -> bool {
        false
    }
}
