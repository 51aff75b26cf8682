//! `reveal://` -- introspection of reveal itself: registered adapters,
//! supported languages, and build version. Backs `--capabilities`,
//! `--adapters`, and `--languages`.

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, Language, SourceType, Structure};
use crate::query::CompiledQuery;
use crate::registry::global_registry;
use crate::uri::{ElementRef, Uri};

/// Handles `reveal://`.
pub struct RevealSelfAdapter;

/// Every language the Parser Frontend can analyze, for `reveal://languages`
/// and `--languages`.
pub const LANGUAGES: &[Language] = &[
    Language::Python,
    Language::TypeScript,
    Language::JavaScript,
    Language::Rust,
    Language::Go,
    Language::Java,
    Language::C,
    Language::Cpp,
    Language::CSharp,
    Language::Css,
    Language::Ruby,
    Language::Php,
    Language::Swift,
    Language::Kotlin,
    Language::Markdown,
    Language::Toml,
];

impl Adapter for RevealSelfAdapter {
    fn scheme(&self) -> &'static str {
        "reveal"
    }

    fn is_namespace(&self) -> bool {
        true
    }

    fn get_structure(&self, _uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let mut structure = Structure::new("reveal_structure", "reveal://".to_string(), SourceType::Other);
        let mut schemes = global_registry().schemes();
        schemes.sort_unstable();

        structure = structure.with_category(
            "adapters",
            schemes.into_iter().map(|s| Element::new(s, 0, 0)).collect(),
        );
        structure = structure.with_category(
            "languages",
            LANGUAGES.iter().map(|l| Element::new(l.as_str(), 0, 0)).collect(),
        );
        structure = structure.with_category(
            "version",
            vec![Element::new(env!("CARGO_PKG_VERSION"), 0, 0)],
        );
        Ok(structure)
    }

    fn get_element(&self, _uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        Err(RevealError::NoSuchElement { resource: "reveal://".to_string(), element: format!("{element:?}") })
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "reveal".to_string(),
            summary: "reveal's own adapters, languages, and version".to_string(),
            examples: vec!["reveal://".to_string()],
            queryable_fields: vec![],
        }
    }
}
