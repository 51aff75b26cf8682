//! The pluggable rule engine `--check` runs: bug-pattern, security-shaped,
//! complexity, link, import, maintainability, duplicate, schema, and
//! self-validation rules, identified by a `PREFIX+NNN` code.
//!
//! Every rule operates on an already-dispatched `Structure` plus the raw
//! source text, never re-parsing or doing its own I/O -- `check(file,
//! structure, source)` is the entire contract.

pub mod builtin;
pub mod error;
pub mod filter;
pub mod noqa;
pub mod registry;
pub mod rule;

pub use error::{RuleError, RuleResult};
pub use filter::RuleFilter;
pub use registry::{global_registry, RuleRegistry};
pub use rule::{Detection, Rule, Severity};
