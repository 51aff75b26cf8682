//! Built-in rules, one per code prefix in the taxonomy. Each rule walks the
//! already-dispatched `Structure` rather than re-parsing; `source` is only
//! consulted for checks that need raw text (link targets, secret patterns).

use std::path::Path;

use reveal_core::Structure;

use crate::rule::{Detection, Rule, Severity};

/// `B001` -- a function/method whose body is empty or `pass`-only.
pub struct EmptyFunctionBody;

impl Rule for EmptyFunctionBody {
    fn code(&self) -> &'static str {
        "B001"
    }
    fn description(&self) -> &'static str {
        "function or method body is empty"
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, _file: &Path, structure: &Structure, _source: &str) -> Vec<Detection> {
        let mut out = Vec::new();
        for (category, elements) in &structure.categories {
            if category != "functions" && category != "methods" {
                continue;
            }
            for element in elements {
                let signature: String = element.attr("signature").unwrap_or_default();
                let is_trivial = element.line_end.saturating_sub(element.line_start) <= 1 && !signature.is_empty();
                if is_trivial {
                    out.push(Detection::new(
                        self.code(),
                        self.default_severity(),
                        format!("'{}' has an empty body", element.name),
                        element.line_start,
                    ));
                }
            }
        }
        out
    }
}

/// `S001` -- a line that looks like a hardcoded credential assignment.
pub struct HardcodedSecret;

impl Rule for HardcodedSecret {
    fn code(&self) -> &'static str {
        "S001"
    }
    fn description(&self) -> &'static str {
        "source line resembles a hardcoded credential"
    }
    fn default_severity(&self) -> Severity {
        Severity::Error
    }
    fn check(&self, _file: &Path, _structure: &Structure, source: &str) -> Vec<Detection> {
        const MARKERS: &[&str] = &["api_key", "apikey", "secret", "password", "token"];
        let mut out = Vec::new();
        for (idx, line) in source.lines().enumerate() {
            let lower = line.to_ascii_lowercase();
            let looks_assigned = lower.contains('=') || lower.contains(':');
            let has_marker = MARKERS.iter().any(|m| lower.contains(m));
            let has_literal = line.contains('"') || line.contains('\'');
            if has_marker && looks_assigned && has_literal && !lower.contains("env") && !lower.contains("getenv") {
                out.push(Detection::new(
                    self.code(),
                    self.default_severity(),
                    "possible hardcoded credential".to_string(),
                    (idx + 1) as u32,
                ));
            }
        }
        out
    }
}

/// `C001` -- cyclomatic complexity above threshold.
pub struct ComplexityThreshold {
    pub threshold: u32,
}

impl Rule for ComplexityThreshold {
    fn code(&self) -> &'static str {
        "C001"
    }
    fn description(&self) -> &'static str {
        "cyclomatic complexity exceeds the configured threshold"
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, _file: &Path, structure: &Structure, _source: &str) -> Vec<Detection> {
        let mut out = Vec::new();
        for elements in structure.categories.values() {
            for element in elements {
                if let Some(complexity) = element.attr::<u32>("complexity") {
                    if complexity > self.threshold {
                        out.push(Detection::new(
                            self.code(),
                            self.default_severity(),
                            format!("'{}' has complexity {complexity} (threshold {})", element.name, self.threshold),
                            element.line_start,
                        ));
                    }
                }
            }
        }
        out
    }
}

/// `L001` -- a Markdown-style relative link whose target does not exist on disk.
pub struct DeadRelativeLink;

impl DeadRelativeLink {
    fn links_in(line: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut rest = line;
        while let Some(open) = rest.find("](") {
            let after = &rest[open + 2..];
            if let Some(close) = after.find(')') {
                out.push(&after[..close]);
                rest = &after[close + 1..];
            } else {
                break;
            }
        }
        out
    }
}

impl Rule for DeadRelativeLink {
    fn code(&self) -> &'static str {
        "L001"
    }
    fn description(&self) -> &'static str {
        "relative link target does not exist"
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, file: &Path, _structure: &Structure, source: &str) -> Vec<Detection> {
        let Some(base) = file.parent() else { return Vec::new() };
        let mut out = Vec::new();
        for (idx, line) in source.lines().enumerate() {
            for target in Self::links_in(line) {
                let is_external = target.contains("://") || target.starts_with('#') || target.starts_with("mailto:");
                if is_external || target.is_empty() {
                    continue;
                }
                let path_part = target.split('#').next().unwrap_or(target);
                if !base.join(path_part).exists() {
                    out.push(Detection::new(
                        self.code(),
                        self.default_severity(),
                        format!("link target '{target}' does not exist"),
                        (idx + 1) as u32,
                    ));
                }
            }
        }
        out
    }
}

/// `I001` -- a circular import cycle was reported by `imports://`.
pub struct CircularImport;

impl Rule for CircularImport {
    fn code(&self) -> &'static str {
        "I001"
    }
    fn description(&self) -> &'static str {
        "import graph contains a cycle"
    }
    fn default_severity(&self) -> Severity {
        Severity::Error
    }
    fn check(&self, _file: &Path, structure: &Structure, _source: &str) -> Vec<Detection> {
        let Some(summary) = structure.categories.get("summary") else { return Vec::new() };
        summary
            .iter()
            .filter(|e| e.attr::<bool>("has_cycles") == Some(true))
            .map(|e| Detection::new(self.code(), self.default_severity(), "import graph contains a cycle".to_string(), e.line_start))
            .collect()
    }
}

/// `M001` -- a function/method longer than the configured line threshold.
pub struct LongFunction {
    pub max_lines: u32,
}

impl Rule for LongFunction {
    fn code(&self) -> &'static str {
        "M001"
    }
    fn description(&self) -> &'static str {
        "function or method exceeds the configured line threshold"
    }
    fn default_severity(&self) -> Severity {
        Severity::Info
    }
    fn check(&self, _file: &Path, structure: &Structure, _source: &str) -> Vec<Detection> {
        let mut out = Vec::new();
        for (category, elements) in &structure.categories {
            if category != "functions" && category != "methods" {
                continue;
            }
            for element in elements {
                let span = element.line_end.saturating_sub(element.line_start);
                if span > self.max_lines {
                    out.push(Detection::new(
                        self.code(),
                        self.default_severity(),
                        format!("'{}' spans {span} lines (max {})", element.name, self.max_lines),
                        element.line_start,
                    ));
                }
            }
        }
        out
    }
}

/// `D001` -- two elements in the same category share a name.
pub struct DuplicateElementName;

impl Rule for DuplicateElementName {
    fn code(&self) -> &'static str {
        "D001"
    }
    fn description(&self) -> &'static str {
        "duplicate element name within a category"
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, _file: &Path, structure: &Structure, _source: &str) -> Vec<Detection> {
        let mut out = Vec::new();
        for elements in structure.categories.values() {
            let mut seen: Vec<&str> = Vec::new();
            for element in elements {
                if seen.contains(&element.name.as_str()) {
                    out.push(Detection::new(
                        self.code(),
                        self.default_severity(),
                        format!("'{}' is declared more than once", element.name),
                        element.line_start,
                    ));
                } else {
                    seen.push(&element.name);
                }
            }
        }
        out
    }
}

/// `F003` -- Markdown front matter missing a required `title` field.
/// Delegates to the Schema Validator's built-in check rather than
/// re-implementing it, so `markdown://`'s own warning and `--check`'s
/// finding always agree.
pub struct MissingFrontMatterTitle;

impl Rule for MissingFrontMatterTitle {
    fn code(&self) -> &'static str {
        "F003"
    }
    fn description(&self) -> &'static str {
        "document front matter is missing a required 'title' field"
    }
    fn default_severity(&self) -> Severity {
        Severity::Error
    }
    fn check(&self, _file: &Path, structure: &Structure, _source: &str) -> Vec<Detection> {
        let Some(frontmatter) = structure.categories.get("frontmatter") else { return Vec::new() };
        let pairs: Vec<(String, String)> = frontmatter
            .iter()
            .map(|e| (e.name.clone(), e.attr::<String>("value").unwrap_or_default()))
            .collect();
        let line = frontmatter.first().map_or(1, |e| e.line_start);
        reveal_core::schema::validate_front_matter(&pairs)
            .into_iter()
            .filter(|(code, _)| code.as_str() == "F003")
            .map(|(_, message)| Detection::new(self.code(), self.default_severity(), message, line))
            .collect()
    }
}

/// `N001` -- an nginx-style config line sets `server_name` with no matching
/// `listen` directive in the same file. A narrow, text-only check since
/// there is no dedicated nginx adapter.
pub struct NginxServerNameWithoutListen;

impl Rule for NginxServerNameWithoutListen {
    fn code(&self) -> &'static str {
        "N001"
    }
    fn description(&self) -> &'static str {
        "nginx server block declares server_name with no listen directive"
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, file: &Path, _structure: &Structure, source: &str) -> Vec<Detection> {
        let looks_like_nginx_conf = file
            .file_name()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|name| name.contains("nginx") || name.ends_with(".conf"));
        if !looks_like_nginx_conf {
            return Vec::new();
        }
        let has_listen = source.contains("listen");
        source
            .lines()
            .enumerate()
            .filter(|(_, line)| line.trim_start().starts_with("server_name") && !has_listen)
            .map(|(idx, _)| {
                Detection::new(
                    self.code(),
                    self.default_severity(),
                    "server_name with no listen directive in this file".to_string(),
                    (idx + 1) as u32,
                )
            })
            .collect()
    }
}

/// `V001` -- self-validation: every Element's span must be well-formed
/// (`line_start <= line_end`), one of the engine's own universal invariants.
pub struct ElementSpanInvariant;

impl Rule for ElementSpanInvariant {
    fn code(&self) -> &'static str {
        "V001"
    }
    fn description(&self) -> &'static str {
        "an Element's line_start must not exceed its line_end"
    }
    fn default_severity(&self) -> Severity {
        Severity::Error
    }
    fn check(&self, _file: &Path, structure: &Structure, _source: &str) -> Vec<Detection> {
        let mut out = Vec::new();
        for elements in structure.categories.values() {
            for element in elements {
                if element.line_start > element.line_end {
                    out.push(Detection::new(
                        self.code(),
                        self.default_severity(),
                        format!("'{}' has line_start {} > line_end {}", element.name, element.line_start, element.line_end),
                        element.line_start,
                    ));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reveal_core::{Element, SourceType};

    fn structure_with(category: &str, elements: Vec<Element>) -> Structure {
        Structure::new("test_structure", "file://x", SourceType::File).with_category(category, elements)
    }

    #[test]
    fn complexity_threshold_fires_above_limit() {
        let rule = ComplexityThreshold { threshold: 10 };
        let element = Element::new("big", 1, 20).with_attr("complexity", 15u32);
        let structure = structure_with("functions", vec![element]);
        let detections = rule.check(Path::new("x.rs"), &structure, "");
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].code, "C001");
    }

    #[test]
    fn complexity_threshold_silent_at_limit() {
        let rule = ComplexityThreshold { threshold: 10 };
        let element = Element::new("ok", 1, 20).with_attr("complexity", 10u32);
        let structure = structure_with("functions", vec![element]);
        assert!(rule.check(Path::new("x.rs"), &structure, "").is_empty());
    }

    #[test]
    fn duplicate_element_name_detects_second_occurrence() {
        let rule = DuplicateElementName;
        let structure = structure_with("functions", vec![Element::new("foo", 1, 2), Element::new("foo", 5, 6)]);
        let detections = rule.check(Path::new("x.rs"), &structure, "");
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].line, 5);
    }

    #[test]
    fn dead_relative_link_flags_missing_target() {
        let rule = DeadRelativeLink;
        let structure = Structure::new("markdown_structure", "file://docs/a.md", SourceType::Document);
        let detections = rule.check(Path::new("/tmp/nonexistent-dir-xyz/a.md"), &structure, "see [here](./missing.md)\n");
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].code, "L001");
    }

    #[test]
    fn dead_relative_link_ignores_external_urls() {
        let rule = DeadRelativeLink;
        let structure = Structure::new("markdown_structure", "file://docs/a.md", SourceType::Document);
        let detections = rule.check(Path::new("/tmp/a.md"), &structure, "see [here](https://example.com)\n");
        assert!(detections.is_empty());
    }

    #[test]
    fn element_span_invariant_flags_inverted_span() {
        let rule = ElementSpanInvariant;
        let structure = structure_with("functions", vec![Element::new("bad", 10, 5)]);
        let detections = rule.check(Path::new("x.rs"), &structure, "");
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].code, "V001");
    }
}
