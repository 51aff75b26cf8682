//! The Adapter Registry: scheme name -> `Adapter` lookup, with a
//! Levenshtein-distance "did you mean" suggestion for typo'd schemes.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::adapter::Adapter;
use crate::adapters;
use crate::error::{RevealError, RevealResult};

/// Global, process-wide adapter registry. Built once, on first use.
pub struct AdapterRegistry {
    adapters: HashMap<&'static str, Box<dyn Adapter>>,
}

static REGISTRY: OnceLock<AdapterRegistry> = OnceLock::new();

/// Get the global adapter registry, building it on first access.
pub fn global_registry() -> &'static AdapterRegistry {
    REGISTRY.get_or_init(AdapterRegistry::new)
}

impl AdapterRegistry {
    fn new() -> Self {
        let mut adapters: HashMap<&'static str, Box<dyn Adapter>> = HashMap::new();

        let all: Vec<Box<dyn Adapter>> = vec![
            Box::new(adapters::file::FileAdapter),
            Box::new(adapters::ast::AstAdapter),
            Box::new(adapters::imports::ImportsAdapter),
            Box::new(adapters::stats::StatsAdapter),
            Box::new(adapters::diff::DiffAdapter),
            Box::new(adapters::git::GitAdapter),
            Box::new(adapters::json::JsonAdapter),
            Box::new(adapters::markdown::MarkdownAdapter),
            Box::new(adapters::jsonl::JsonlAdapter),
            Box::new(adapters::xlsx::XlsxAdapter),
            Box::new(adapters::sqlite::SqliteAdapter),
            Box::new(adapters::mysql::MysqlAdapter),
            Box::new(adapters::ssl::SslAdapter),
            Box::new(adapters::domain::DomainAdapter),
            Box::new(adapters::env::EnvAdapter),
            Box::new(adapters::python::PythonNamespaceAdapter),
            Box::new(adapters::help::HelpAdapter),
            Box::new(adapters::claude::ClaudeAdapter),
            Box::new(adapters::reveal_self::RevealSelfAdapter),
        ];

        for adapter in all {
            adapters.insert(adapter.scheme(), adapter);
        }

        Self { adapters }
    }

    /// Look up an adapter by scheme.
    #[must_use]
    pub fn get(&self, scheme: &str) -> Option<&dyn Adapter> {
        self.adapters.get(scheme).map(std::convert::AsRef::as_ref)
    }

    /// All registered scheme names, in registration order.
    #[must_use]
    pub fn schemes(&self) -> Vec<&'static str> {
        self.adapters.keys().copied().collect()
    }

    /// Resolve a scheme, or produce an `UnknownScheme` error carrying the
    /// closest registered scheme by edit distance as a "did you mean".
    pub fn resolve(&self, scheme: &str) -> RevealResult<&dyn Adapter> {
        self.get(scheme).ok_or_else(|| RevealError::UnknownScheme {
            scheme: scheme.to_string(),
            suggestion: self.closest_scheme(scheme),
        })
    }

    fn closest_scheme(&self, scheme: &str) -> Option<String> {
        self.schemes()
            .into_iter()
            .map(|candidate| (candidate, levenshtein(scheme, candidate)))
            .filter(|(_, dist)| *dist <= 2)
            .min_by_key(|(_, dist)| *dist)
            .map(|(candidate, _)| candidate.to_string())
    }
}

/// Classic Levenshtein edit distance, used only for scheme-typo suggestions
/// (small strings, no need for a crate).
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, &ca) in a.iter().enumerate() {
        let mut prev_diag = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let temp = row[j + 1];
            row[j + 1] = (row[j + 1] + 1).min(row[j] + 1).min(prev_diag + cost);
            prev_diag = temp;
        }
    }

    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_scheme_suggests_closest_match() {
        let registry = global_registry();
        let err = registry.resolve("flie").unwrap_err();
        match err {
            RevealError::UnknownScheme { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("file"));
            }
            _ => panic!("expected UnknownScheme"),
        }
    }

    #[test]
    fn known_scheme_resolves() {
        let registry = global_registry();
        assert!(registry.resolve("file").is_ok());
    }

    #[test]
    fn levenshtein_distance_basic() {
        assert_eq!(levenshtein("file", "flie"), 2);
        assert_eq!(levenshtein("git", "git"), 0);
    }
}
