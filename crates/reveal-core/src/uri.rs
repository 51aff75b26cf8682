//! URI parsing and element addressing.
//!
//! Parses `scheme://resource[/element][?query][#fragment]` into normalized
//! components, and parses the three element-addressing forms (`:LINE`,
//! `@N`, `type:N`, dotted names) that an adapter's `get_element` honors.

use crate::error::{RevealError, RevealResult};
use crate::query::ParsedQuery;

/// A parsed URI. A URI exclusively owns its parsed components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    /// Lowercase scheme identifier, e.g. `file`, `git`, `ast`.
    pub scheme: String,
    /// Free-form resource string: a path, host, name, or composite.
    pub resource: String,
    /// Optional navigation suffix after the resource.
    pub element: Option<String>,
    /// The query string's boolean filter tree plus a flattened flag map.
    pub query: ParsedQuery,
    /// Optional fragment after `#`.
    pub fragment: Option<String>,
}

impl Uri {
    /// Parse `input` as a URI, promoting a bare filesystem path to
    /// `file://<path>` when no scheme is present and the path exists.
    pub fn parse(input: &str) -> RevealResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RevealError::UriParse {
                input: input.to_string(),
                message: "empty input".to_string(),
            });
        }

        if let Some(rest) = scheme_prefix(trimmed) {
            return Self::parse_schemed(trimmed, rest);
        }

        // No scheme: treat as a bare path, synthesized into the file scheme.
        Ok(Self {
            scheme: "file".to_string(),
            resource: trimmed.to_string(),
            element: None,
            query: ParsedQuery::default(),
            fragment: None,
        })
    }

    fn parse_schemed(full: &str, after_colon_colon_slash_slash: (&str, &str)) -> RevealResult<Self> {
        let (scheme, remainder) = after_colon_colon_slash_slash;
        validate_scheme(scheme).map_err(|message| RevealError::UriParse {
            input: full.to_string(),
            message,
        })?;

        // Split off fragment first (it binds loosest), then query.
        let (body, fragment) = match remainder.split_once('#') {
            Some((b, f)) => (b, Some(f.to_string())),
            None => (remainder, None),
        };
        let (resource_and_element, query_str) = match body.split_once('?') {
            Some((b, q)) => (b, Some(q)),
            None => (body, None),
        };

        let query = match query_str {
            Some(q) => crate::query::parse_query_string(q).map_err(|message| RevealError::UriParse {
                input: full.to_string(),
                message,
            })?,
            None => ParsedQuery::default(),
        };

        Ok(Self {
            scheme: scheme.to_string(),
            resource: resource_and_element.to_string(),
            element: None,
            query,
            fragment,
        })
    }

    /// Attach an explicit trailing element reference (as given on the CLI
    /// as a separate positional argument, e.g. `reveal file.py ClassA.m`).
    #[must_use]
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Re-render this URI back to its canonical string form.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        let mut s = format!("{}://{}", self.scheme, self.resource);
        if let Some(el) = &self.element {
            s.push('/');
            s.push_str(el);
        }
        if !self.query.is_empty() {
            s.push('?');
            s.push_str(&crate::query::render_query_string(&self.query));
        }
        if let Some(frag) = &self.fragment {
            s.push('#');
            s.push_str(frag);
        }
        s
    }
}

/// Returns `Some((scheme, rest))` if `input` starts with `scheme://`.
fn scheme_prefix(input: &str) -> Option<(&str, &str)> {
    let idx = input.find("://")?;
    let scheme = &input[..idx];
    if scheme.is_empty() || !is_valid_scheme(scheme) {
        return None;
    }
    Some((scheme, &input[idx + 3..]))
}

fn is_valid_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

fn validate_scheme(s: &str) -> Result<(), String> {
    if is_valid_scheme(s) {
        Ok(())
    } else {
        Err(format!("invalid scheme identifier {s:?} (expected [a-z][a-z0-9_-]*)"))
    }
}

// ---------------------------------------------------------------------------
// Element addressing
// ---------------------------------------------------------------------------

/// One of the three forms used to address a single Element within a
/// Structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementRef {
    /// Dotted hierarchical name, e.g. `ClassA.method_b`.
    Name(Vec<String>),
    /// The element whose span contains this 1-indexed line.
    Line(u32),
    /// 1-indexed position within the dominant category.
    Ordinal(usize),
    /// 1-indexed position within an explicitly named category.
    TypedOrdinal(String, usize),
}

impl ElementRef {
    /// Parse a trailing element-reference string into its addressing form.
    pub fn parse(raw: &str) -> RevealResult<Self> {
        if let Some(rest) = raw.strip_prefix(':') {
            let line: u32 = rest.parse().map_err(|_| RevealError::UriParse {
                input: raw.to_string(),
                message: "expected a line number after ':'".to_string(),
            })?;
            return Ok(Self::Line(line));
        }

        if let Some(rest) = raw.strip_prefix('@') {
            let n: usize = rest.parse().map_err(|_| RevealError::UriParse {
                input: raw.to_string(),
                message: "expected a 1-indexed ordinal after '@'".to_string(),
            })?;
            return Ok(Self::Ordinal(n));
        }

        if let Some((category, n)) = raw.split_once(':') {
            if let Ok(n) = n.parse::<usize>() {
                return Ok(Self::TypedOrdinal(category.to_string(), n));
            }
        }

        let parts: Vec<String> = raw.split('.').map(str::to_string).collect();
        if parts.iter().any(String::is_empty) {
            return Err(RevealError::UriParse {
                input: raw.to_string(),
                message: "dotted name must not contain empty segments".to_string(),
            });
        }
        Ok(Self::Name(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheme_resource_query_fragment() {
        let uri = Uri::parse("ast://src?complexity>10&sort=-complexity&limit=5").unwrap();
        assert_eq!(uri.scheme, "ast");
        assert_eq!(uri.resource, "src");
        assert!(uri.query.flags.contains_key("complexity"));
        assert!(uri.query.flags.contains_key("sort"));
        assert!(uri.query.flags.contains_key("limit"));
    }

    #[test]
    fn bare_path_synthesizes_file_scheme() {
        let uri = Uri::parse("./src/main.rs").unwrap();
        assert_eq!(uri.scheme, "file");
        assert_eq!(uri.resource, "./src/main.rs");
    }

    #[test]
    fn rejects_empty_input() {
        assert!(Uri::parse("").is_err());
    }

    #[test]
    fn rejects_invalid_scheme_chars() {
        // "C:" on Windows-style paths must not be mistaken for a scheme.
        let uri = Uri::parse("C:/Users/dev/file.py").unwrap();
        assert_eq!(uri.scheme, "file");
    }

    #[test]
    fn element_ref_parses_all_forms() {
        assert_eq!(ElementRef::parse(":42").unwrap(), ElementRef::Line(42));
        assert_eq!(ElementRef::parse("@3").unwrap(), ElementRef::Ordinal(3));
        assert_eq!(
            ElementRef::parse("function:3").unwrap(),
            ElementRef::TypedOrdinal("function".to_string(), 3)
        );
        assert_eq!(
            ElementRef::parse("ClassA.method_b").unwrap(),
            ElementRef::Name(vec!["ClassA".to_string(), "method_b".to_string()])
        );
    }

    #[test]
    fn element_ref_rejects_empty_segment() {
        assert!(ElementRef::parse("ClassA..method_b").is_err());
    }
}
