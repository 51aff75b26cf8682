//! Schema Validator: checks Markdown front matter against a small set of
//! built-in rules plus user-supplied predicate expressions, without
//! shelling out or evaluating anything beyond a restricted grammar --
//! no I/O, no process spawn, no arbitrary field lookup.
//!
//! Predicate grammar: `field OP value` chained with `&&`/`||`, where `OP`
//! is one of `==`, `!=`, `exists`. Anything outside that grammar is a
//! validator configuration error (`F005`), never a crash.

use std::collections::HashMap;

use regex::Regex;

/// A single custom front-matter rule, as configured in `.reveal/schema.toml`.
#[derive(Debug, Clone)]
pub struct FrontMatterRule {
    /// Rule name, surfaced in the notice code.
    pub name: String,
    /// The predicate expression to evaluate against the front matter.
    pub predicate: String,
}

/// Required-field + custom-predicate checks run on every `markdown://`
/// document with front matter. Returns `(code, message)` notices; never
/// panics on malformed input.
#[must_use]
pub fn validate_front_matter(pairs: &[(String, String)]) -> Vec<(String, String)> {
    let mut notices = Vec::new();
    let fields: HashMap<&str, &str> = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    if !fields.contains_key("title") {
        notices.push(("F003".to_string(), "required front-matter field 'title' is missing".to_string()));
    }

    notices
}

/// Validate front matter against explicit custom rules (e.g. loaded from
/// project configuration), in addition to the built-in checks.
#[must_use]
pub fn validate_with_rules(pairs: &[(String, String)], rules: &[FrontMatterRule]) -> Vec<(String, String)> {
    let mut notices = validate_front_matter(pairs);
    let fields: HashMap<&str, &str> = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    for rule in rules {
        match eval_predicate(&rule.predicate, &fields) {
            Ok(true) => {}
            Ok(false) => notices.push(("F005".to_string(), format!("rule '{}' failed: {}", rule.name, rule.predicate))),
            Err(message) => notices.push(("F005".to_string(), format!("rule '{}' is malformed: {message}", rule.name))),
        }
    }
    notices
}

/// Evaluate a restricted boolean predicate against a flat field map.
///
/// Supports `field == "literal"`, `field != "literal"`, `field exists`,
/// `field contains "substring"`, `field matches "regex"`, joined with
/// `&&` / `||` (left-to-right, no operator precedence beyond that --
/// parenthesized grouping is out of scope for this grammar).
pub fn eval_predicate(expr: &str, fields: &HashMap<&str, &str>) -> Result<bool, String> {
    if let Some((lhs, rhs)) = expr.split_once("&&") {
        return Ok(eval_predicate(lhs.trim(), fields)? && eval_predicate(rhs.trim(), fields)?);
    }
    if let Some((lhs, rhs)) = expr.split_once("||") {
        return Ok(eval_predicate(lhs.trim(), fields)? || eval_predicate(rhs.trim(), fields)?);
    }
    eval_comparison(expr.trim(), fields)
}

fn eval_comparison(expr: &str, fields: &HashMap<&str, &str>) -> Result<bool, String> {
    if let Some(field) = expr.strip_suffix("exists").map(str::trim) {
        return Ok(fields.contains_key(field));
    }
    if let Some((field, literal)) = expr.split_once(" contains ") {
        let value = fields.get(field.trim()).copied().unwrap_or("");
        return Ok(value.contains(unquote(literal.trim())));
    }
    if let Some((field, pattern)) = expr.split_once(" matches ") {
        let value = fields.get(field.trim()).copied().unwrap_or("");
        let pattern = unquote(pattern.trim());
        let re = Regex::new(pattern).map_err(|e| format!("invalid regex {pattern:?}: {e}"))?;
        return Ok(re.is_match(value));
    }
    if let Some((field, literal)) = expr.split_once("==") {
        return Ok(fields.get(field.trim()) == Some(&unquote(literal.trim())));
    }
    if let Some((field, literal)) = expr.split_once("!=") {
        return Ok(fields.get(field.trim()) != Some(&unquote(literal.trim())));
    }
    Err(format!("unrecognized predicate: {expr:?}"))
}

fn unquote(s: &str) -> &str {
    s.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_title_triggers_f003() {
        let notices = validate_front_matter(&[("date".to_string(), "2024-01-01".to_string())]);
        assert!(notices.iter().any(|(code, _)| code == "F003"));
    }

    #[test]
    fn present_title_is_clean() {
        let notices = validate_front_matter(&[("title".to_string(), "Hello".to_string())]);
        assert!(notices.is_empty());
    }

    #[test]
    fn predicate_eq_and_exists() {
        let fields: HashMap<&str, &str> = [("status", "published")].into_iter().collect();
        assert!(eval_predicate("status == \"published\"", &fields).unwrap());
        assert!(eval_predicate("status exists && status == \"published\"", &fields).unwrap());
        assert!(!eval_predicate("status != \"published\"", &fields).unwrap());
    }

    #[test]
    fn predicate_unknown_field_is_false_not_error() {
        let fields: HashMap<&str, &str> = HashMap::new();
        assert!(!eval_predicate("title exists", &fields).unwrap());
    }

    #[test]
    fn predicate_contains_and_matches() {
        let fields: HashMap<&str, &str> = [("slug", "hello-world-2024")].into_iter().collect();
        assert!(eval_predicate("slug contains \"world\"", &fields).unwrap());
        assert!(eval_predicate("slug matches \"^hello-[a-z-]+-[0-9]{4}$\"", &fields).unwrap());
        assert!(!eval_predicate("slug matches \"^[0-9]+$\"", &fields).unwrap());
    }

    #[test]
    fn predicate_malformed_regex_is_an_error_not_a_panic() {
        let fields: HashMap<&str, &str> = [("slug", "x")].into_iter().collect();
        assert!(eval_predicate("slug matches \"[\"", &fields).is_err());
    }
}
