//! Error types for reveal-core.
//!
//! Uses a hierarchical error enum so the dispatcher and CLI can pattern-match
//! on the failure category instead of parsing messages. Each variant maps to
//! one of the invocation-level failure categories the CLI translates into an
//! exit code: malformed invocation, broken resource, or a clean "found
//! nothing" result.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all reveal-core operations.
#[derive(Debug, Error)]
pub enum RevealError {
    // ---- Invocation-shaped (exit code 2: bad input before any adapter ran) ----
    /// The URI (or bare path) could not be parsed at all.
    #[error("could not parse {input:?} as a URI: {message}")]
    UriParse {
        /// The raw input that failed to parse.
        input: String,
        /// Human-readable parse failure.
        message: String,
    },

    /// The scheme named in the URI has no registered adapter.
    #[error("unknown scheme {scheme:?}{}", suggestion.as_ref().map(|s| format!(" -- did you mean {s:?}?")).unwrap_or_default())]
    UnknownScheme {
        /// The scheme that was requested.
        scheme: String,
        /// Closest registered scheme, if any, by edit distance.
        suggestion: Option<String>,
    },

    /// Two sources of truth (CLI flag vs. query parameter) disagreed.
    #[error("configuration conflict: {0}")]
    ConfigurationConflict(String),

    // ---- Resource-shaped (exit code 1: the target could not be read) ----
    /// The resource named by the URI does not exist or could not be opened.
    #[error("resource unavailable: {resource}: {message}")]
    ResourceUnavailable {
        /// The resource that was requested.
        resource: String,
        /// Human-readable cause.
        message: String,
    },

    /// The named element does not exist within an otherwise-readable resource.
    #[error("no such element {element:?} in {resource}")]
    NoSuchElement {
        /// The resource that was successfully opened.
        resource: String,
        /// The element address that failed to resolve.
        element: String,
    },

    // ---- Degraded-but-returned (not an error return, kept for logging) ----
    /// Parsing succeeded only through a fallback strategy; the result still
    /// renders but carries `parse_mode`/`confidence`/`warnings` metadata.
    #[error("degraded parse of {path}: {message}")]
    ParseDegraded {
        /// Path to the file that could not be fully parsed.
        path: PathBuf,
        /// What fallback was used and why.
        message: String,
    },

    /// A `--check` run produced one or more rule findings. Carried as an
    /// error only at the CLI boundary, to drive the exit-code mapping; the
    /// findings themselves are rendered normally.
    #[error("{0} rule finding(s)")]
    RuleFinding(usize),

    // ---- Wrapped external errors ----
    /// SQLite error (sqlite adapter).
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML (de)serialization error (config layer).
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic internal error for unexpected conditions.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for Results in reveal-core.
pub type RevealResult<T> = Result<T, RevealError>;

impl RevealError {
    /// Maps an error to the process exit code the CLI reports for it.
    ///
    /// `0` is reserved for success and is never returned here; `3` (findings
    /// present under `--check`) is likewise decided by the caller, not by
    /// the error itself, since a finding set is a normal return value.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UriParse { .. } | Self::UnknownScheme { .. } | Self::ConfigurationConflict(_) => 2,
            Self::ResourceUnavailable { .. } | Self::NoSuchElement { .. } => 1,
            Self::RuleFinding(_) => 3,
            _ => 1,
        }
    }
}
