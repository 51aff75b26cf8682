//! `imports://` -- the dependency graph over a directory's import
//! statements. Supports `?circular` (Tarjan SCC), `?unused` (imported names
//! never referenced in the importing file), `?violations` (layer-rule
//! violations against `config.imports.layers`), and plain upstream/
//! downstream traversal from a given file element.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::adapter::{Adapter, HelpRecord};
use crate::adapters::detect_language;
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::filter;
use crate::graph::DependencyGraph;
use crate::model::{Element, ImportStatement, Language, SourceType, Structure};
use crate::parser;
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `imports://`.
pub struct ImportsAdapter;

impl ImportsAdapter {
    /// Walk `root`, parse every recognized source file's imports, and
    /// return the graph plus the raw per-file import lists (the latter
    /// feeds `?unused`, which needs the importing file's own source text,
    /// not just the resolved edges).
    fn scan(root: &Path, config: &Config) -> Vec<(PathBuf, String, Vec<u8>, Language, Vec<ImportStatement>)> {
        let mut scanned = Vec::new();
        for file in filter::walk(root, &config.filter, &[]) {
            let relative = file.strip_prefix(root).unwrap_or(&file).display().to_string().replace('\\', "/");
            let Ok(source) = std::fs::read(&file) else { continue };
            let language = detect_language(&file, String::from_utf8_lossy(&source).lines().next());
            if language == Language::Unknown {
                continue;
            }
            let imports = parser::parse_imports(&file, &source, language).unwrap_or_default();
            scanned.push((file, relative, source, language, imports));
        }
        scanned
    }

    fn build_graph(scanned: &[(PathBuf, String, Vec<u8>, Language, Vec<ImportStatement>)]) -> DependencyGraph<String> {
        let graph = DependencyGraph::new();
        let stems = stem_index(scanned);

        for (_, relative, _, language, imports) in scanned {
            let _ = graph.add_node(relative.clone());
            for import in imports {
                if let Some(target) = resolve_import(relative, &import.import_path, *language, &stems) {
                    let _ = graph.add_edge(relative.clone(), target, import.kind);
                }
            }
        }
        graph
    }

    /// Imported names whose bound identifier never appears anywhere else in
    /// the importing file's source text.
    fn find_unused(scanned: &[(PathBuf, String, Vec<u8>, Language, Vec<ImportStatement>)]) -> Vec<Element> {
        let mut unused = Vec::new();
        for (_, relative, source, _, imports) in scanned {
            let text = String::from_utf8_lossy(source);
            for import in imports {
                for name in bound_names(import) {
                    if name == "*" || referenced_outside_line(&text, &name, import.line) {
                        continue;
                    }
                    unused.push(
                        Element::new(name, import.line, import.line)
                            .with_attr("file", relative.clone())
                            .with_attr("import_path", import.import_path.clone()),
                    );
                }
            }
        }
        unused
    }

    fn find_violations(graph: &DependencyGraph<String>, layers: &[String]) -> RevealResult<Vec<Element>> {
        if layers.is_empty() {
            return Ok(Vec::new());
        }
        let mut violations = Vec::new();
        for (source, target) in graph.edges()? {
            let (Some(source_layer), Some(target_layer)) = (layer_index(layers, &source), layer_index(layers, &target))
            else {
                continue;
            };
            // A layer may depend on its own layer or any layer below it;
            // an edge pointing from a lower layer up to a higher one is a
            // violation.
            if source_layer < target_layer {
                violations.push(
                    Element::new(format!("{source} -> {target}"), 0, 0)
                        .with_attr("source", source)
                        .with_attr("target", target)
                        .with_attr("source_layer", layers[source_layer].clone())
                        .with_attr("target_layer", layers[target_layer].clone()),
                );
            }
        }
        Ok(violations)
    }
}

impl Adapter for ImportsAdapter {
    fn scheme(&self) -> &'static str {
        "imports"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, config: &Config) -> RevealResult<Structure> {
        let root = PathBuf::from(&uri.resource);
        if !root.exists() {
            return Err(RevealError::ResourceUnavailable {
                resource: root.display().to_string(),
                message: "no such directory".to_string(),
            });
        }
        let scanned = Self::scan(&root, config);
        let graph = Self::build_graph(&scanned);

        let mut structure = Structure::new("imports_structure", root.display().to_string(), SourceType::Directory);

        // `?circular` / `?unused` / `?violations` are bare flags handled
        // directly rather than through the generic query compiler, since
        // each selects a whole different category rather than filtering
        // elements within one.
        if uri.query.flags.contains_key("circular") {
            let cycles = graph.find_cycles()?;
            let elements: Vec<Element> = cycles
                .into_iter()
                .enumerate()
                .map(|(i, cycle)| Element::new(format!("cycle_{}", i + 1), 0, 0).with_attr("members", cycle))
                .collect();
            structure = structure.with_category("cycles", elements);
            return Ok(structure);
        }

        if uri.query.flags.contains_key("unused") {
            let elements = Self::find_unused(&scanned);
            structure = structure.with_category("unused", elements);
            return Ok(structure);
        }

        if uri.query.flags.contains_key("violations") {
            if config.imports.layers.is_empty() {
                structure.warn(
                    "no_layers_configured",
                    "imports.layers is empty in project config; no layer-violation checking is possible",
                );
            }
            let elements = Self::find_violations(&graph, &config.imports.layers)?;
            structure = structure.with_category("violations", elements);
            return Ok(structure);
        }

        Ok(structure.with_category(
            "summary",
            vec![Element::new("graph", 0, 0)
                .with_attr("node_count", graph.node_count())
                .with_attr("edge_count", graph.edge_count())
                .with_attr("has_cycles", graph.has_cycles())],
        ))
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, config: &Config) -> RevealResult<Structure> {
        let root = PathBuf::from(&uri.resource);
        let scanned = Self::scan(&root, config);
        let graph = Self::build_graph(&scanned);

        let ElementRef::Name(parts) = element else {
            return Err(RevealError::NoSuchElement {
                resource: root.display().to_string(),
                element: format!("{element:?}"),
            });
        };
        let target = parts.join("/");
        let depth = uri
            .query
            .flags
            .get("depth")
            .and_then(|v| match v {
                crate::query::QueryValue::Text(t) => t.parse().ok(),
                crate::query::QueryValue::Flag => None,
            })
            .unwrap_or(1);

        let upstream = graph.upstream(&target, depth)?;
        let downstream = graph.downstream(&target, depth)?;

        let mut structure = Structure::new("imports_element", root.display().to_string(), SourceType::Directory);
        structure = structure.with_category("depends_on", upstream.into_iter().map(|n| Element::new(n, 0, 0)).collect());
        structure = structure.with_category(
            "depended_on_by",
            downstream.into_iter().map(|n| Element::new(n, 0, 0)).collect(),
        );
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "imports".to_string(),
            summary: "Import dependency graph over a directory".to_string(),
            examples: vec![
                "imports://src?circular".to_string(),
                "imports://src?unused".to_string(),
                "imports://src?violations".to_string(),
            ],
            queryable_fields: vec!["circular".into(), "unused".into(), "violations".into(), "depth".into()],
        }
    }
}

/// Bound identifier(s) a reference in the importing file's body would use:
/// the explicitly named imports for `from x import a, b`, or the first
/// path segment for a bare `import a.b.c` (Python binds `a`).
fn bound_names(import: &ImportStatement) -> Vec<String> {
    if import.imported_names.is_empty() {
        let first = import.import_path.split(['.', '/']).next().unwrap_or(&import.import_path);
        vec![first.to_string()]
    } else {
        import.imported_names.clone()
    }
}

/// Whether `name` appears, as a whole word, on any line other than the
/// import statement's own line.
fn referenced_outside_line(text: &str, name: &str, import_line: u32) -> bool {
    let Ok(re) = regex::Regex::new(&format!(r"\b{}\b", regex::escape(name))) else {
        return true;
    };
    text.lines().enumerate().any(|(i, line)| (i as u32 + 1) != import_line && re.is_match(line))
}

/// Maps a relative path with its extension stripped (e.g. `"src/pkg/b"`) to
/// its full relative path (e.g. `"src/pkg/b.py"`), so `resolve_import` can
/// look up an unresolved module path against files actually on disk.
fn stem_index(scanned: &[(PathBuf, String, Vec<u8>, Language, Vec<ImportStatement>)]) -> HashMap<String, String> {
    let mut stems = HashMap::new();
    for (_, relative, ..) in scanned {
        let stem = relative.rsplit_once('.').map_or(relative.as_str(), |(s, _)| s);
        stems.insert(stem.to_string(), relative.clone());
        // Package-style directory import (`pkg` resolving to `pkg/__init__.py`
        // or `pkg/index.ts`).
        if let Some(dir) = stem.strip_suffix("/__init__").or_else(|| stem.strip_suffix("/index")) {
            stems.entry(dir.to_string()).or_insert_with(|| relative.clone());
        }
    }
    stems
}

/// Resolve a raw, unresolved import path (as extracted by the Parser
/// Frontend, e.g. `"pkg.mod"`, `"./utils"`, `"b"`) to the in-tree relative
/// file path it names, or `None` if it names something outside the tree
/// (an external package, a stdlib module, or nothing that exists).
fn resolve_import(
    importer_relative: &str,
    import_path: &str,
    language: Language,
    stems: &HashMap<String, String>,
) -> Option<String> {
    let first_segment = import_path.split(['.', '/']).next().unwrap_or(import_path);
    if is_stdlib_name(language, first_segment) {
        return None;
    }

    let importer_dir = Path::new(importer_relative).parent().unwrap_or(Path::new(""));
    let dotted = import_path.replace('.', "/");

    let mut candidates = Vec::new();
    if import_path.contains('/') {
        let trimmed = import_path.trim_start_matches("./");
        candidates.push(normalize(&importer_dir.join(trimmed)));
        candidates.push(normalize(Path::new(trimmed)));
    }
    candidates.push(normalize(&importer_dir.join(&dotted)));
    candidates.push(normalize(Path::new(&dotted)));

    candidates.iter().find_map(|c| stems.get(c)).cloned()
}

fn normalize(path: &Path) -> String {
    path.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}

/// Whether `first_segment` names a well-known standard-library module for
/// `language`, so a same-named in-tree file (`logging.py` importing stdlib
/// `logging`) doesn't get mistaken for a self-edge.
fn is_stdlib_name(language: Language, first_segment: &str) -> bool {
    const PYTHON: &[&str] = &[
        "os", "sys", "re", "json", "math", "time", "datetime", "collections", "itertools", "functools",
        "typing", "pathlib", "logging", "subprocess", "threading", "asyncio", "unittest", "argparse", "io",
        "abc", "copy", "enum", "random", "string", "socket", "http", "urllib", "shutil", "csv", "sqlite3",
        "hashlib", "base64", "struct", "traceback", "dataclasses", "contextlib", "warnings",
    ];
    const GO: &[&str] =
        &["fmt", "os", "strings", "strconv", "time", "errors", "context", "sync", "net", "io", "bytes", "sort", "math", "encoding"];
    const JS: &[&str] =
        &["fs", "path", "http", "https", "crypto", "os", "util", "events", "stream", "assert", "url", "querystring", "child_process"];

    let list: &[&str] = match language {
        Language::Python => PYTHON,
        Language::Go => GO,
        Language::JavaScript | Language::TypeScript => JS,
        Language::Java => &["java", "javax"],
        Language::CSharp => &["System"],
        _ => &[],
    };
    list.contains(&first_segment)
}

/// Index of the configured layer `relative`'s top-level directory belongs
/// to, if any.
fn layer_index(layers: &[String], relative: &str) -> Option<usize> {
    let first = relative.split('/').next()?;
    layers.iter().position(|l| l == first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_dotted_import_to_sibling_file() {
        let mut stems = HashMap::new();
        stems.insert("a/b".to_string(), "a/b.py".to_string());
        let resolved = resolve_import("a/main.py", "b", Language::Python, &stems);
        assert_eq!(resolved, Some("a/b.py".to_string()));
    }

    #[test]
    fn stdlib_name_never_resolves_even_with_same_named_file() {
        let mut stems = HashMap::new();
        stems.insert("logging".to_string(), "logging.py".to_string());
        let resolved = resolve_import("main.py", "logging", Language::Python, &stems);
        assert_eq!(resolved, None);
    }

    #[test]
    fn external_package_does_not_resolve() {
        let stems = HashMap::new();
        let resolved = resolve_import("main.py", "numpy", Language::Python, &stems);
        assert_eq!(resolved, None);
    }

    #[test]
    fn unused_import_detected_when_name_never_referenced() {
        let source = "import os\nimport sys\n\nprint(sys.argv)\n";
        let stmt = ImportStatement {
            import_path: "os".to_string(),
            imported_names: vec![],
            line: 1,
            kind: crate::model::DependencyKind::Imports,
        };
        assert!(!referenced_outside_line(source, "os", stmt.line));
        assert!(referenced_outside_line(source, "sys", 2));
    }

    #[test]
    fn violation_flagged_only_when_lower_layer_imports_higher() {
        let graph: DependencyGraph<String> = DependencyGraph::new();
        graph.add_edge("core/a.py".to_string(), "api/b.py".to_string(), crate::model::DependencyKind::Imports).unwrap();
        graph.add_edge("api/c.py".to_string(), "core/d.py".to_string(), crate::model::DependencyKind::Imports).unwrap();
        let layers = vec!["core".to_string(), "services".to_string(), "api".to_string()];
        let violations = ImportsAdapter::find_violations(&graph, &layers).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].attr::<String>("source").as_deref(), Some("core/a.py"));
    }

    #[test]
    fn no_layers_configured_yields_no_violations() {
        let graph: DependencyGraph<String> = DependencyGraph::new();
        graph.add_edge("a.py".to_string(), "b.py".to_string(), crate::model::DependencyKind::Imports).unwrap();
        assert!(ImportsAdapter::find_violations(&graph, &[]).unwrap().is_empty());
    }
}
