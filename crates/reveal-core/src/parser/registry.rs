//! Language analyzer registry.
//!
//! Central registration point for all language analyzers. The registry
//! is initialized once at startup and provides thread-safe access to
//! language-specific analyzers.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::model::Language;
use super::LanguageAnalyzer;

/// Global registry instance.
static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Get the global language analyzer registry.
pub fn global_registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Registry of language analyzers.
pub struct Registry {
    analyzers: HashMap<Language, Box<dyn LanguageAnalyzer>>,
}

impl Registry {
    fn new() -> Self {
        let mut analyzers: HashMap<Language, Box<dyn LanguageAnalyzer>> = HashMap::new();

        use super::languages::*;

        analyzers.insert(Language::Python, Box::new(python::PythonAnalyzer));
        analyzers.insert(Language::Rust, Box::new(rust::RustAnalyzer));
        analyzers.insert(Language::TypeScript, Box::new(typescript::TypeScriptAnalyzer));
        analyzers.insert(Language::JavaScript, Box::new(javascript::JavaScriptAnalyzer));
        analyzers.insert(Language::Go, Box::new(go::GoAnalyzer));
        analyzers.insert(Language::Java, Box::new(java::JavaAnalyzer));
        analyzers.insert(Language::C, Box::new(c::CAnalyzer));
        analyzers.insert(Language::Cpp, Box::new(cpp::CppAnalyzer));
        analyzers.insert(Language::CSharp, Box::new(csharp::CSharpAnalyzer));
        analyzers.insert(Language::Css, Box::new(css::CssAnalyzer));
        analyzers.insert(Language::Ruby, Box::new(ruby::RubyAnalyzer));
        analyzers.insert(Language::Php, Box::new(php::PhpAnalyzer));
        analyzers.insert(Language::Swift, Box::new(swift::SwiftAnalyzer));
        analyzers.insert(Language::Kotlin, Box::new(kotlin::KotlinAnalyzer));
        analyzers.insert(Language::Markdown, Box::new(document::DocumentAnalyzer::new(Language::Markdown)));
        analyzers.insert(Language::Toml, Box::new(document::DocumentAnalyzer::new(Language::Toml)));

        Self { analyzers }
    }

    /// Get the analyzer for a given language.
    #[must_use]
    pub fn get(&self, language: Language) -> Option<&dyn LanguageAnalyzer> {
        self.analyzers.get(&language).map(|a| a.as_ref())
    }

    /// List all registered languages.
    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        self.analyzers.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_core_languages() {
        let reg = global_registry();
        assert!(reg.get(Language::Python).is_some());
        assert!(reg.get(Language::Rust).is_some());
        assert!(reg.get(Language::TypeScript).is_some());
        assert!(reg.get(Language::JavaScript).is_some());
        assert!(reg.get(Language::Go).is_some());
        assert!(reg.get(Language::Markdown).is_some());
    }

    #[test]
    fn registry_returns_none_for_unknown() {
        let reg = global_registry();
        assert!(reg.get(Language::Unknown).is_none());
    }
}
