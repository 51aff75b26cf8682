//! `git://` -- repository overview, commit history, and blame, backed
//! entirely by `adapters::git_support`'s shell-outs to `git`.
//!
//! The resource is a filesystem path with an optional `@ref` suffix
//! selecting a commit, branch, tag, or `HEAD~N` expression. With no query
//! the adapter reports a repository overview (branches, tags, recent
//! commits, status); `?type=history` lists commits touching a path;
//! `?type=blame` runs blame, optionally restricted to the line span of a
//! named element (`&element=name`) resolved through the parser, and
//! optionally returning full per-line hunks instead of an author tally
//! (`&detail=full`).

use std::path::{Path, PathBuf};

use crate::adapter::{Adapter, HelpRecord};
use crate::adapters::{detect_language, git_support};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::parser;
use crate::query::{CompiledQuery, QueryValue};
use crate::uri::{ElementRef, Uri};

/// Handles `git://`.
pub struct GitAdapter;

impl GitAdapter {
    fn query_text<'a>(uri: &'a Uri, key: &str) -> Option<&'a str> {
        uri.query.flags.get(key).and_then(|v| match v {
            QueryValue::Text(t) => Some(t.as_str()),
            QueryValue::Flag => None,
        })
    }

    fn query_limit(uri: &Uri, default: usize) -> usize {
        Self::query_text(uri, "limit").and_then(|t| t.parse().ok()).unwrap_or(default)
    }

    /// Split `path@ref` into the target path and an optional git reference.
    fn split_ref(resource: &str) -> (PathBuf, Option<String>) {
        match resource.rsplit_once('@') {
            Some((path, git_ref)) if !git_ref.is_empty() => (PathBuf::from(path), Some(git_ref.to_string())),
            _ => (PathBuf::from(resource), None),
        }
    }

    /// Walk up from `target` to the nearest ancestor containing `.git`.
    fn find_repo_root(target: &Path) -> PathBuf {
        let mut current: PathBuf = if target.is_dir() {
            target.to_path_buf()
        } else {
            target.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
        };
        loop {
            if current.join(".git").exists() {
                return current;
            }
            match current.parent() {
                Some(parent) if parent != current => current = parent.to_path_buf(),
                _ => return current,
            }
        }
    }

    /// `target`'s path relative to `repo_root`, or `None` when `target` names
    /// the repository as a whole.
    fn relative_to_root(repo_root: &Path, target: &Path) -> Option<String> {
        if target == Path::new(".") || target == repo_root {
            return None;
        }
        let relative = if repo_root == Path::new(".") {
            target.to_path_buf()
        } else {
            target.strip_prefix(repo_root).ok()?.to_path_buf()
        };
        let text = relative.display().to_string().replace('\\', "/");
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Resolve `element` (by name) against the parsed structure of `file_path`
    /// and return its inclusive 1-indexed line span.
    fn resolve_element_range(file_path: &Path, element: &str) -> RevealResult<(u32, u32)> {
        let source = std::fs::read(file_path).map_err(|e| RevealError::ResourceUnavailable {
            resource: file_path.display().to_string(),
            message: e.to_string(),
        })?;
        let language = detect_language(file_path, String::from_utf8_lossy(&source).lines().next());
        let parsed = parser::parse_file(file_path, &source, language)?;
        parsed
            .iter()
            .find(|p| p.element.name == element || p.element.symbol_path.ends_with(element))
            .map(|p| (p.element.line_start, p.element.line_end))
            .ok_or_else(|| RevealError::NoSuchElement {
                resource: file_path.display().to_string(),
                element: element.to_string(),
            })
    }

    fn overview(repo_root: &Path, git_ref: Option<&str>) -> RevealResult<Structure> {
        let branches = git_support::branches(repo_root)?;
        let tags = git_support::tags(repo_root)?;
        let status = git_support::status(repo_root)?;
        let recent = git_support::log(repo_root, 10, git_ref, None)?;

        let mut structure = Structure::new("git_overview", repo_root.display().to_string(), SourceType::Repository);
        structure = structure.with_category("branches", branches.into_iter().map(|b| Element::new(b, 0, 0)).collect());
        structure = structure.with_category("tags", tags.into_iter().map(|t| Element::new(t, 0, 0)).collect());
        structure = structure.with_category(
            "status",
            status.into_iter().map(|s| Element::new(s, 0, 0)).collect(),
        );
        structure = structure.with_category(
            "recent_commits",
            recent
                .into_iter()
                .map(|c| Element::new(c.hash, 0, 0).with_attr("message", c.message).with_attr("author", c.author))
                .collect(),
        );
        Ok(structure)
    }

    fn history(repo_root: &Path, git_ref: Option<&str>, relative: Option<&str>, limit: usize) -> RevealResult<Structure> {
        let commits = git_support::log(repo_root, limit, git_ref, relative)?;
        let mut structure = Structure::new("git_log", repo_root.display().to_string(), SourceType::Repository);
        let elements = commits
            .into_iter()
            .map(|c| {
                Element::new(c.hash, 0, 0)
                    .with_attr("message", c.message)
                    .with_attr("author", c.author)
                    .with_attr("timestamp", c.timestamp)
                    .with_attr("files_changed", c.files_changed)
            })
            .collect();
        structure = structure.with_category("commits", elements);
        Ok(structure)
    }

    fn blame(repo_root: &Path, git_ref: Option<&str>, relative: &str, uri: &Uri) -> RevealResult<Structure> {
        let range = match Self::query_text(uri, "element") {
            Some(name) => Some(Self::resolve_element_range(&repo_root.join(relative), name)?),
            None => None,
        };
        let lines = git_support::blame(repo_root, relative, git_ref, range)?;

        let mut structure = Structure::new("git_blame", repo_root.display().to_string(), SourceType::Repository);
        if Self::query_text(uri, "detail") == Some("full") {
            let elements = lines
                .into_iter()
                .map(|l| Element::new(l.hash.clone(), l.line, l.line).with_attr("author", l.author))
                .collect();
            structure = structure.with_category("lines", elements);
        } else {
            let tally = git_support::tally_by_author(&lines);
            let elements = tally
                .into_iter()
                .map(|(author, count)| Element::new(author, 0, 0).with_attr("lines", count))
                .collect();
            structure = structure.with_category("authors", elements);
        }
        Ok(structure)
    }
}

impl Adapter for GitAdapter {
    fn scheme(&self) -> &'static str {
        "git"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let (target, git_ref) = Self::split_ref(&uri.resource);
        let repo_root = Self::find_repo_root(&target);
        let relative = Self::relative_to_root(&repo_root, &target);

        match Self::query_text(uri, "type") {
            None => Self::overview(&repo_root, git_ref.as_deref()),
            Some("history") => Self::history(&repo_root, git_ref.as_deref(), relative.as_deref(), Self::query_limit(uri, 30)),
            Some("blame") => {
                let relative = relative.ok_or_else(|| RevealError::UriParse {
                    input: uri.resource.clone(),
                    message: "git:// ?type=blame requires a file path, not a repository root".to_string(),
                })?;
                Self::blame(&repo_root, git_ref.as_deref(), &relative, uri)
            }
            Some(other) => Err(RevealError::UriParse {
                input: uri.resource.clone(),
                message: format!("unknown git:// ?type={other}"),
            }),
        }
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        Err(RevealError::NoSuchElement { resource: uri.resource.clone(), element: format!("{element:?}") })
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "git".to_string(),
            summary: "Repository overview, commit history, and blame".to_string(),
            examples: vec![
                "git://.".to_string(),
                "git://.?type=history&limit=20".to_string(),
                "git://src/app.py?type=blame&element=authenticate".to_string(),
            ],
            queryable_fields: vec!["type".into(), "limit".into(), "element".into(), "detail".into()],
        }
    }
}
