//! The Dispatcher: the one path every invocation goes through, regardless
//! of scheme. URI parse -> scheme resolve -> Filter Layer (adapters consult
//! `config.filter` themselves) -> Query Layer -> Adapter call -> Output
//! Contract stamping is already guaranteed by `Structure::new`, so this
//! module's job is steps 1-3 and 5: parse, resolve, compile the query, and
//! call the right adapter method.

use crate::config::Config;
use crate::error::RevealResult;
use crate::model::Structure;
use crate::query::{self, CompiledQuery, FieldTable};
use crate::registry::global_registry;
use crate::uri::{ElementRef, Uri};

/// Field names recognized across at least one built-in adapter, used only
/// to decide whether a query parameter is "known" before the resolved
/// adapter gets a chance to match it against its own typed `FieldTable`.
const KNOWN_FIELDS: &[&str] = &[
    "name", "kind", "visibility", "complexity", "line_start", "line_end", "size_bytes", "language",
    "value", "type", "index", "change", "circular", "unused", "depth", "limit", "offset", "sort", "select",
];

/// One fully-resolved invocation: the input string, an optional explicit
/// element argument (as given as a second CLI positional), and the CLI's
/// own `--format` flag (for conflict detection against a `?format=` query
/// parameter on the same URI).
pub struct Request<'a> {
    pub input: &'a str,
    pub element: Option<&'a str>,
    pub cli_format: Option<&'a str>,
}

/// Run one request through the full dispatch pipeline and return the
/// resulting Structure, ready for the Renderer.
pub fn dispatch(request: &Request<'_>, config: &mut Config) -> RevealResult<Structure> {
    let mut uri = Uri::parse(request.input)?;
    if let Some(element) = request.element {
        uri = uri.with_element(element);
    }

    let query_format = uri.query.flags.get("format").and_then(|v| match v {
        query::QueryValue::Text(t) => Some(t.as_str()),
        query::QueryValue::Flag => None,
    });
    config.apply_format_override(request.cli_format, query_format)?;

    let adapter = global_registry().resolve(&uri.scheme)?;
    let known_fields = FieldTable::declared(KNOWN_FIELDS);
    let compiled: CompiledQuery = query::compile(&uri.query, &known_fields);

    match &uri.element {
        Some(raw) => {
            let element_ref = ElementRef::parse(raw)?;
            adapter.get_element(&uri, &element_ref, &compiled, config)
        }
        None => adapter.get_structure(&uri, &compiled, config),
    }
}
