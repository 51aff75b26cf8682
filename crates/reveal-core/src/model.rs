//! Core domain types shared across the dispatcher, the parser frontend, and
//! every adapter.
//!
//! These types form the Output Contract: the Structure/Element shape every
//! adapter returns, stamped identically regardless of scheme, so the
//! renderer and query layer never special-case a particular adapter.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Current Output Contract version. Bumped only for breaking changes;
/// new fields are additive within a major version.
pub const CONTRACT_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Output Contract: Structure / Element
// ---------------------------------------------------------------------------

/// How confidently an Element's data was extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Full grammar-backed extraction, no degradation.
    Full,
    /// Tree-sitter error recovery kicked in; some elements may be missing.
    Fallback,
    /// No grammar available; extraction used a regular expression pass.
    Regex,
    /// No structural extraction at all; best-effort heuristic only.
    Heuristic,
}

impl ParseMode {
    /// A monotonic-in-completeness confidence heuristic for this mode.
    ///
    /// The exact scale is an implementation choice (spec Open Question);
    /// this one only needs to be non-decreasing in how complete the parse
    /// was, which `full > fallback > regex > heuristic` satisfies.
    #[must_use]
    pub fn default_confidence(self) -> f64 {
        match self {
            Self::Full => 1.0,
            Self::Fallback => 0.6,
            Self::Regex => 0.3,
            Self::Heuristic => 0.2,
        }
    }
}

/// A single warning or error attached to a Structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    /// Short machine-readable code (e.g. `unknown_field`, `parse_degraded`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl Notice {
    /// Build a notice from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

/// One extractable unit within a Structure: a function, a heading, a table
/// row, a record -- whatever the owning category represents.
///
/// Category-specific attributes (signature, decorators, complexity, depth,
/// frontmatter, column types, ...) live in `attributes` rather than as
/// dedicated fields, since which ones apply varies per adapter and per
/// category; `attributes` preserves insertion order so the JSON renderer's
/// field order matches how the adapter built the Element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Category-local identifier (e.g. a function name, a heading title).
    pub name: String,
    /// First line of this element's span (1-indexed, inclusive).
    pub line_start: u32,
    /// Last line of this element's span (1-indexed, inclusive).
    pub line_end: u32,
    /// Category-specific attributes, in the order the adapter set them.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, serde_json::Value>,
    /// Nested elements, for hierarchical extraction (e.g. a class's methods).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    /// Construct a bare element with no attributes or children.
    pub fn new(name: impl Into<String>, line_start: u32, line_end: u32) -> Self {
        Self {
            name: name.into(),
            line_start,
            line_end,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.attributes.insert(key.to_string(), v);
        }
        self
    }

    /// Fetch an attribute back out as a typed value, if present and the
    /// right shape.
    pub fn attr<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Coarse category of the thing a Structure describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// A single file.
    File,
    /// A directory tree.
    Directory,
    /// A tabular database (sqlite, mysql).
    Database,
    /// A network-addressed resource (certificate host, DNS name).
    Remote,
    /// A version-control repository.
    Repository,
    /// A structured document (JSON, Markdown, JSONL, spreadsheet).
    Document,
    /// Process/environment state local to the invocation.
    Process,
    /// A conversation transcript.
    Conversation,
    /// Anything not covered by the above.
    Other,
}

/// The standard result payload every adapter returns.
///
/// `categories` maps category name (functions, classes, headings, entries,
/// ...) to an ordered sequence of Elements; category order is declaration
/// order and, within a category, Elements are in source order unless the
/// Query Layer reorders them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    /// Output Contract schema version.
    pub contract_version: String,
    /// Snake-case kind tag (e.g. `file_structure`, `git_history`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Echo of the resolved URI that produced this Structure.
    pub source: String,
    /// Coarse category of the source.
    pub source_type: SourceType,
    /// How the data was extracted, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    /// Confidence score in `[0.0, 1.0]`, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Non-fatal issues encountered while building this Structure.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Notice>,
    /// Fatal-for-a-sub-part issues; the Structure still carries whatever
    /// could be salvaged.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Notice>,
    /// True when `limit=` cut off more results than were returned.
    #[serde(default)]
    pub truncated: bool,
    /// Total matching elements before `limit=` was applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_available: Option<usize>,
    /// Number of elements actually returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned: Option<usize>,
    /// Opaque cursor for fetching the next page, when truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Category name -> ordered Elements.
    pub categories: IndexMap<String, Vec<Element>>,
}

impl Structure {
    /// Start a new Structure with only the required stamping fields set.
    pub fn new(kind: impl Into<String>, source: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            contract_version: CONTRACT_VERSION.to_string(),
            kind: kind.into(),
            source: source.into(),
            source_type,
            parse_mode: None,
            confidence: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            truncated: false,
            total_available: None,
            returned: None,
            next_cursor: None,
            categories: IndexMap::new(),
        }
    }

    /// Attach a category of elements.
    #[must_use]
    pub fn with_category(mut self, name: impl Into<String>, elements: Vec<Element>) -> Self {
        self.categories.insert(name.into(), elements);
        self
    }

    /// Push a warning onto this Structure.
    pub fn warn(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Notice::new(code, message));
    }

    /// Total element count across all categories.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Supported programming languages and document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python (.py)
    Python,
    /// TypeScript (.ts, .tsx)
    TypeScript,
    /// JavaScript (.js, .jsx)
    JavaScript,
    /// Rust (.rs)
    Rust,
    /// Go (.go)
    Go,
    /// Java (.java)
    Java,
    /// C (.c, .h)
    C,
    /// C++ (.cpp, .cc, .cxx, .hpp, .hxx)
    Cpp,
    /// C# (.cs)
    CSharp,
    /// CSS / SCSS (.css, .scss)
    Css,
    /// Ruby (.rb)
    Ruby,
    /// PHP (.php)
    Php,
    /// Swift (.swift)
    Swift,
    /// Kotlin (.kt, .kts)
    Kotlin,
    /// HTML (.html, .htm)
    Html,
    /// Shell / Bash (.sh, .bash, .zsh)
    Shell,
    /// Markdown (.md, .mdx)
    Markdown,
    /// TOML configuration (.toml)
    Toml,
    /// YAML configuration (.yml, .yaml)
    Yaml,
    /// JSON data (.json, .jsonc)
    Json,
    /// Newline-delimited JSON (.jsonl, .ndjson)
    Jsonl,
    /// Unknown / unsupported
    Unknown,
}

impl Language {
    /// Detect language from file extension (no leading dot).
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "py" => Self::Python,
            "ts" | "tsx" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "rs" => Self::Rust,
            "go" => Self::Go,
            "java" => Self::Java,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Self::Cpp,
            "cs" => Self::CSharp,
            "css" | "scss" => Self::Css,
            "rb" => Self::Ruby,
            "php" => Self::Php,
            "swift" => Self::Swift,
            "kt" | "kts" => Self::Kotlin,
            "html" | "htm" => Self::Html,
            "sh" | "bash" | "zsh" => Self::Shell,
            "md" | "mdx" => Self::Markdown,
            "toml" => Self::Toml,
            "yml" | "yaml" => Self::Yaml,
            "json" | "jsonc" => Self::Json,
            "jsonl" | "ndjson" => Self::Jsonl,
            _ => Self::Unknown,
        }
    }

    /// Detect language from a well-known filename when the extension alone
    /// is uninformative (Makefile, Dockerfile, ...).
    #[must_use]
    pub fn from_filename(name: &str) -> Option<Self> {
        match name {
            "Dockerfile" | "Containerfile" => Some(Self::Shell),
            "Makefile" | "makefile" | "GNUmakefile" => Some(Self::Shell),
            _ => None,
        }
    }

    /// Detect language from a shebang line (`#!/usr/bin/env python3`).
    #[must_use]
    pub fn from_shebang(first_line: &str) -> Option<Self> {
        if !first_line.starts_with("#!") {
            return None;
        }
        let line = first_line.to_ascii_lowercase();
        if line.contains("python") {
            Some(Self::Python)
        } else if line.contains("node") {
            Some(Self::JavaScript)
        } else if line.contains("ruby") {
            Some(Self::Ruby)
        } else if line.contains("sh") {
            Some(Self::Shell)
        } else {
            None
        }
    }

    /// Returns the language identifier string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "csharp",
            Self::Css => "css",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::Swift => "swift",
            Self::Kotlin => "kotlin",
            Self::Html => "html",
            Self::Shell => "shell",
            Self::Markdown => "markdown",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Jsonl => "jsonl",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true if this is an AST-parseable programming language.
    #[must_use]
    pub fn is_code(&self) -> bool {
        matches!(
            self,
            Self::Python
                | Self::TypeScript
                | Self::JavaScript
                | Self::Rust
                | Self::Go
                | Self::Java
                | Self::C
                | Self::Cpp
                | Self::CSharp
                | Self::Css
                | Self::Ruby
                | Self::Php
                | Self::Swift
                | Self::Kotlin
        )
    }

    /// Returns true if this is a documentation or config format.
    #[must_use]
    pub fn is_document(&self) -> bool {
        matches!(
            self,
            Self::Markdown | Self::Toml | Self::Yaml | Self::Json | Self::Jsonl | Self::Html | Self::Shell
        )
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Structural element kind (parser-internal, before projection to Element)
// ---------------------------------------------------------------------------

/// The kind of code construct a `StructuralElement` represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Function or method definition.
    Function,
    /// Class, struct, or record definition.
    Class,
    /// Trait, interface, or protocol definition.
    Trait,
    /// Implementation block (Rust `impl`, Java anonymous class, etc.).
    Impl,
    /// Constant or static variable.
    Const,
    /// Type alias or definition.
    TypeDef,
    /// Module or namespace declaration.
    Module,
    /// Test function or test block.
    Test,
    /// Top-level statements that don't fit other categories.
    TopLevel,
}

impl ElementKind {
    /// Convert to the category name it appears under in a Structure.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Function => "functions",
            Self::Class => "classes",
            Self::Trait => "traits",
            Self::Impl => "impls",
            Self::Const => "constants",
            Self::TypeDef => "types",
            Self::Module => "modules",
            Self::Test => "tests",
            Self::TopLevel => "top_level",
        }
    }

    /// Convert to a stable string tag (used in `kind` attributes and diff
    /// identity).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Trait => "trait",
            Self::Impl => "impl",
            Self::Const => "const",
            Self::TypeDef => "typedef",
            Self::Module => "module",
            Self::Test => "test",
            Self::TopLevel => "top_level",
        }
    }
}

/// Visibility of a code symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Accessible from outside the module/crate.
    Public,
    /// Accessible only within the current crate/package.
    Crate,
    /// Accessible from parent class or subclasses.
    Protected,
    /// Accessible only within the defining scope.
    Private,
}

impl Visibility {
    /// Convert to a stable string tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Crate => "crate",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

// ---------------------------------------------------------------------------
// Dependency / import types (imports:// adapter)
// ---------------------------------------------------------------------------

/// The kind of dependency relationship between two symbols or files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// File/module A imports module B.
    Imports,
    /// Function A calls function B.
    Calls,
    /// Class A extends/inherits from class B.
    Extends,
    /// Struct/class A implements trait/interface B.
    Implements,
}

/// A directed edge in the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Source file or symbol.
    pub source_id: i64,
    /// Target file or symbol.
    pub target_id: i64,
    /// Kind of dependency.
    pub kind: DependencyKind,
}

/// An import statement extracted from source code.
#[derive(Debug, Clone)]
pub struct ImportStatement {
    /// The raw import path (e.g. `os.path`, `crate::config`, `./utils`).
    pub import_path: String,
    /// Optional specific names imported (e.g. `["Config", "load"]`).
    pub imported_names: Vec<String>,
    /// Line number where the import appears.
    pub line: u32,
    /// Kind of dependency this import represents.
    pub kind: DependencyKind,
}

/// Metadata about a file discovered during directory traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    /// Path relative to the traversal root.
    pub path: PathBuf,
    /// Detected programming language.
    pub language: Language,
    /// File size in bytes.
    pub size_bytes: u64,
}
