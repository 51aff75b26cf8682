//! The `Rule` contract: one check that walks an already-built `Structure`
//! (plus the raw source, for line-level suppression and text-only checks)
//! and reports zero or more detections.

use reveal_core::Structure;
use std::path::Path;

/// Minimum severity a detection can carry. Ordered so `>=` comparisons work
/// for `fail_on` thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// One rule firing at one location.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Detection {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    /// 1-indexed source line, when the detection is anchored to one.
    pub line: u32,
}

impl Detection {
    #[must_use]
    pub fn new(code: &'static str, severity: Severity, message: impl Into<String>, line: u32) -> Self {
        Self { code, severity, message: message.into(), line }
    }
}

/// A pluggable check. `check` receives the file path (for context in
/// messages only -- rules must not do their own I/O beyond what's already
/// in `source`), the dispatched Structure, and the raw source text.
pub trait Rule: Send + Sync {
    /// Stable `PREFIX+NNN` code, e.g. `"C001"`.
    fn code(&self) -> &'static str;
    /// One-line description, surfaced by `--rules`.
    fn description(&self) -> &'static str;
    /// Severity assigned when this rule fires, absent an override.
    fn default_severity(&self) -> Severity;
    /// Run the check, returning any detections.
    fn check(&self, file: &Path, structure: &Structure, source: &str) -> Vec<Detection>;
}
