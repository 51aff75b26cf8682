//! `claude://` -- conversation transcript introspection: lists session
//! transcripts (one JSONL file per session) under a directory and exposes
//! each session's first user message as a preview, without re-rendering
//! the whole transcript into the Structure until an element is requested.

use std::path::PathBuf;

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `claude://`.
pub struct ClaudeAdapter;

fn first_user_message(path: &std::path::Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    for line in text.lines() {
        let value: serde_json::Value = serde_json::from_str(line).ok()?;
        if value.get("type").and_then(serde_json::Value::as_str) == Some("user") {
            if let Some(content) = value.pointer("/message/content").and_then(serde_json::Value::as_str) {
                return Some(content.chars().take(120).collect());
            }
        }
    }
    None
}

impl Adapter for ClaudeAdapter {
    fn scheme(&self) -> &'static str {
        "claude"
    }

    fn is_namespace(&self) -> bool {
        true
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let dir = PathBuf::from(&uri.resource);
        if !dir.is_dir() {
            return Err(RevealError::ResourceUnavailable {
                resource: dir.display().to_string(),
                message: "not a conversation log directory".to_string(),
            });
        }

        let mut sessions = Vec::new();
        if let Ok(entries) = std::fs::read_dir(&dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(std::ffi::OsStr::to_str) == Some("jsonl") {
                    let id = path.file_stem().and_then(std::ffi::OsStr::to_str).unwrap_or("unknown").to_string();
                    let preview = first_user_message(&path).unwrap_or_default();
                    sessions.push(Element::new(id, 0, 0).with_attr("first_message", preview));
                }
            }
        }
        sessions.sort_by(|a, b| a.name.cmp(&b.name));

        let mut structure = Structure::new("claude_structure", dir.display().to_string(), SourceType::Conversation);
        structure = structure.with_category("sessions", sessions);
        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let dir = PathBuf::from(&uri.resource);
        let ElementRef::Name(parts) = element else {
            return Err(RevealError::NoSuchElement { resource: dir.display().to_string(), element: format!("{element:?}") });
        };
        let session_id = parts.join(".");
        let path = dir.join(format!("{session_id}.jsonl"));
        let text = std::fs::read_to_string(&path).map_err(|e| RevealError::NoSuchElement {
            resource: dir.display().to_string(),
            element: format!("{session_id}: {e}"),
        })?;

        let messages: Vec<Element> = text
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let value: serde_json::Value = serde_json::from_str(line).ok()?;
                let kind = value.get("type").and_then(serde_json::Value::as_str)?.to_string();
                Some(Element::new(format!("message_{}", i + 1), 0, 0).with_attr("type", kind))
            })
            .collect();

        let mut structure = Structure::new("claude_element", dir.display().to_string(), SourceType::Conversation);
        structure = structure.with_category("messages", messages);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "claude".to_string(),
            summary: "Conversation transcript sessions under a log directory".to_string(),
            examples: vec!["claude://~/.claude/projects/my-repo".to_string()],
            queryable_fields: vec![],
        }
    }
}
