//! Output renderers: the last step before a Structure reaches the
//! terminal. Every renderer consumes the same Output Contract shape, so
//! adding a renderer never requires touching an adapter.

use crate::model::{Element, Structure};

/// The set of renderers `--format` can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Indented, human-readable tree (the default).
    Tree,
    /// The Structure serialized as pretty JSON.
    Json,
    /// One `path:line: text` line per element, for piping into `grep`/editors.
    Grep,
    /// Comma-separated values, one row per element, flattened attributes as columns.
    Csv,
}

impl Format {
    /// Parse a `--format`/`?format=` value, defaulting to `tree` on anything
    /// unrecognized rather than erroring -- an unknown format name is a
    /// user typo, not a broken invocation.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "grep" => Self::Grep,
            "csv" => Self::Csv,
            _ => Self::Tree,
        }
    }
}

/// Render a Structure in the given format.
#[must_use]
pub fn render(structure: &Structure, format: Format) -> String {
    match format {
        Format::Tree => render_tree(structure),
        Format::Json => render_json(structure),
        Format::Grep => render_grep(structure),
        Format::Csv => render_csv(structure),
    }
}

fn render_tree(structure: &Structure) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", structure.source, structure.kind));

    for (category, elements) in &structure.categories {
        out.push_str(&format!("  {category}/\n"));
        for element in elements {
            write_tree_element(&mut out, element, 2);
        }
    }

    for warning in &structure.warnings {
        out.push_str(&format!("warning: {}: {}\n", warning.code, warning.message));
    }
    for error in &structure.errors {
        out.push_str(&format!("error: {}: {}\n", error.code, error.message));
    }
    if structure.truncated {
        out.push_str(&format!(
            "... truncated ({} of {} shown)\n",
            structure.returned.unwrap_or(0),
            structure.total_available.unwrap_or(0)
        ));
    }
    out
}

fn write_tree_element(out: &mut String, element: &Element, depth: usize) {
    let indent = "  ".repeat(depth);
    if element.line_start > 0 {
        out.push_str(&format!("{indent}{} :{}-{}\n", element.name, element.line_start, element.line_end));
    } else {
        out.push_str(&format!("{indent}{}\n", element.name));
    }
    for child in &element.children {
        write_tree_element(out, child, depth + 1);
    }
}

fn render_json(structure: &Structure) -> String {
    serde_json::to_string_pretty(structure).unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

fn render_grep(structure: &Structure) -> String {
    let mut out = String::new();
    for (category, elements) in &structure.categories {
        for element in elements {
            out.push_str(&format!(
                "{}:{}: {}/{}\n",
                structure.source,
                element.line_start.max(1),
                category,
                element.name
            ));
        }
    }
    out
}

fn render_csv(structure: &Structure) -> String {
    let mut out = String::from("category,name,line_start,line_end\n");
    for (category, elements) in &structure.categories {
        for element in elements {
            out.push_str(&format!(
                "{},{},{},{}\n",
                csv_escape(category),
                csv_escape(&element.name),
                element.line_start,
                element.line_end
            ));
        }
    }
    out
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceType;

    fn sample_structure() -> Structure {
        Structure::new("file_structure", "file://src/main.rs", SourceType::File)
            .with_category("functions", vec![Element::new("main", 1, 3)])
    }

    #[test]
    fn tree_includes_category_and_element() {
        let rendered = render(&sample_structure(), Format::Tree);
        assert!(rendered.contains("functions/"));
        assert!(rendered.contains("main :1-3"));
    }

    #[test]
    fn json_round_trips_kind() {
        let rendered = render(&sample_structure(), Format::Json);
        assert!(rendered.contains("\"type\": \"file_structure\""));
    }

    #[test]
    fn grep_produces_path_line_format() {
        let rendered = render(&sample_structure(), Format::Grep);
        assert_eq!(rendered.trim(), "file://src/main.rs:1: functions/main");
    }

    #[test]
    fn csv_escapes_commas() {
        let structure = Structure::new("x", "s", SourceType::Other)
            .with_category("cat,egory", vec![Element::new("a,b", 0, 0)]);
        let rendered = render(&structure, Format::Csv);
        assert!(rendered.contains("\"cat,egory\",\"a,b\""));
    }

    #[test]
    fn format_parse_defaults_to_tree() {
        assert_eq!(Format::parse("bogus"), Format::Tree);
        assert_eq!(Format::parse("JSON"), Format::Json);
    }
}
