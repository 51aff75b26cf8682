//! The universal query sublanguage.
//!
//! Parses filter/sort/limit/select expressions attached to a URI's query
//! string (or supplied as CLI flags) into a typed `AlgebraicFilter` tree,
//! and evaluates that tree against whatever fields an adapter exposes for
//! its Elements. Unknown field names degrade to a warning, never a hard
//! error, so agent exploration stays forgiving.

use std::cmp::Ordering;
use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;

/// One value attached to a query key: a flag with no value, or a string
/// payload (numeric/range/glob parsing happens lazily at filter-compile
/// time, since the same raw string can mean different things per operator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// `field` with no `=value` (a bare flag, e.g. `?circular`).
    Flag,
    /// `field=value` or any of the comparison/glob/range operator forms;
    /// the operator character(s), if any, are retained as part of the key
    /// by `parse_query_string` so `compile` can dispatch on it; equality
    /// (`field=value`) strips the `=` from the key.
    Text(String),
}

/// The raw boolean query-string parse tree, built once by
/// `parse_query_string` and independent of any particular adapter's field
/// table. A leaf's key retains its operator suffix exactly as
/// `parse_query_string` found it (e.g. `"complexity>"`, `"name~="`, bare
/// `"circular"`, or `"!field"` for an explicit absence leaf); `compile`
/// walks this tree against a concrete `FieldTable` to validate field names
/// and produce a typed `AlgebraicFilter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawExpr {
    /// An empty query, or a branch fully consumed by a reserved directive.
    True,
    /// One `field[<op>][value]` unit.
    Leaf(String, QueryValue),
    /// All sub-expressions must match (`&`).
    And(Vec<RawExpr>),
    /// Any sub-expression must match (`|`).
    Or(Vec<RawExpr>),
    /// Negation (`!(...)`, or `!field` folded into a single absence leaf).
    Not(Box<RawExpr>),
}

impl Default for RawExpr {
    fn default() -> Self {
        Self::True
    }
}

/// Everything `parse_query_string` extracts from a raw query string: the
/// boolean filter tree for field comparisons, plus a flattened bare-name
/// map for callers that just need "was this key given, and what's its raw
/// text" -- adapter-routing flags like `?type=blame` or `?circular` that
/// sit outside the Element filter algebra, and reserved directives before
/// `compile` pulls them into a `CompiledQuery`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuery {
    /// Bare field name -> its raw value, one entry per leaf encountered
    /// anywhere in the tree (regardless of `&`/`|`/`!`/`(...)` nesting).
    pub flags: IndexMap<String, QueryValue>,
    /// The boolean expression over field comparisons.
    pub filter: RawExpr,
}

impl ParsedQuery {
    /// Whether the query string this was parsed from was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.filter, RawExpr::True) && self.flags.is_empty()
    }
}

/// Parse a raw query string (the part after `?`, before `#`) into a
/// boolean expression tree plus a flattened flag map. Grammar, left-to-right
/// with explicit grouping, per the query sublanguage's boolean-composition
/// operators:
///
/// ```text
/// or_expr   := and_expr ( '|' and_expr )*
/// and_expr  := unary ( '&' unary )*
/// unary     := '!' unary | '(' or_expr ')' | leaf
/// leaf      := field[<op>value]
/// ```
pub fn parse_query_string(raw: &str) -> Result<ParsedQuery, String> {
    if raw.is_empty() {
        return Ok(ParsedQuery::default());
    }
    let chars: Vec<char> = raw.chars().collect();
    let mut flags = IndexMap::new();
    let mut pos = 0;
    let filter = parse_or(&chars, &mut pos, &mut flags)?;
    skip_ws(&chars, &mut pos);
    if pos != chars.len() {
        return Err(format!("unexpected character {:?} at position {pos} in query {raw:?}", chars[pos]));
    }
    Ok(ParsedQuery { flags, filter })
}

fn parse_or(chars: &[char], pos: &mut usize, flags: &mut IndexMap<String, QueryValue>) -> Result<RawExpr, String> {
    let mut parts = vec![parse_and(chars, pos, flags)?];
    loop {
        skip_ws(chars, pos);
        if chars.get(*pos) == Some(&'|') {
            *pos += 1;
            parts.push(parse_and(chars, pos, flags)?);
        } else {
            break;
        }
    }
    Ok(if parts.len() == 1 { parts.remove(0) } else { RawExpr::Or(parts) })
}

fn parse_and(chars: &[char], pos: &mut usize, flags: &mut IndexMap<String, QueryValue>) -> Result<RawExpr, String> {
    let mut parts = vec![parse_unary(chars, pos, flags)?];
    loop {
        skip_ws(chars, pos);
        if chars.get(*pos) == Some(&'&') {
            *pos += 1;
            parts.push(parse_unary(chars, pos, flags)?);
        } else {
            break;
        }
    }
    Ok(if parts.len() == 1 { parts.remove(0) } else { RawExpr::And(parts) })
}

fn parse_unary(chars: &[char], pos: &mut usize, flags: &mut IndexMap<String, QueryValue>) -> Result<RawExpr, String> {
    skip_ws(chars, pos);
    if chars.get(*pos) == Some(&'!') {
        *pos += 1;
        let inner = parse_unary(chars, pos, flags)?;
        return Ok(negate(inner));
    }
    if chars.get(*pos) == Some(&'(') {
        *pos += 1;
        let inner = parse_or(chars, pos, flags)?;
        skip_ws(chars, pos);
        if chars.get(*pos) != Some(&')') {
            return Err("unbalanced '(' in query expression".to_string());
        }
        *pos += 1;
        return Ok(inner);
    }
    parse_leaf(chars, pos, flags)
}

/// `!x` negates a leaf into its natural opposite -- `!field` is sugar for
/// "absent", the dual of `field=*` -- and otherwise wraps a non-leaf
/// sub-expression (a group, another `And`/`Or`) in `Not`.
fn negate(expr: RawExpr) -> RawExpr {
    match expr {
        RawExpr::Leaf(key, QueryValue::Flag) => RawExpr::Leaf(format!("!{key}"), QueryValue::Flag),
        other => RawExpr::Not(Box::new(other)),
    }
}

fn skip_ws(chars: &[char], pos: &mut usize) {
    while matches!(chars.get(*pos), Some(c) if c.is_whitespace()) {
        *pos += 1;
    }
}

/// Consume one `field[<op>value]` token, stopping at the next unescaped
/// boolean-composition character (query values are not expected to embed
/// `&`, `|`, or `)`; percent-encode them upstream if they must).
fn parse_leaf(chars: &[char], pos: &mut usize, flags: &mut IndexMap<String, QueryValue>) -> Result<RawExpr, String> {
    let start = *pos;
    while !matches!(chars.get(*pos), None | Some('&') | Some('|') | Some(')')) {
        *pos += 1;
    }
    let token: String = chars[start..*pos].iter().collect();
    let token = token.trim();
    if token.is_empty() {
        return Err(format!("expected a query term at position {start}"));
    }

    let (field, key, value) = match split_operator(token) {
        Some((field, op, text)) => (field.to_string(), format!("{field}{op}"), QueryValue::Text(text.to_string())),
        None => (token.to_string(), token.to_string(), QueryValue::Flag),
    };
    flags.entry(field).or_insert_with(|| value.clone());
    Ok(RawExpr::Leaf(key, value))
}

/// Render a parsed query tree back to a canonical query string.
#[must_use]
pub fn render_query_string(query: &ParsedQuery) -> String {
    render_expr(&query.filter)
}

fn render_expr(expr: &RawExpr) -> String {
    match expr {
        RawExpr::True => String::new(),
        RawExpr::Leaf(key, QueryValue::Flag) => key.clone(),
        RawExpr::Leaf(key, QueryValue::Text(v)) => format!("{key}{v}"),
        RawExpr::And(parts) => parts.iter().map(render_expr).collect::<Vec<_>>().join("&"),
        RawExpr::Or(parts) => parts.iter().map(render_group).collect::<Vec<_>>().join("|"),
        RawExpr::Not(inner) => format!("!({})", render_expr(inner)),
    }
}

fn render_group(expr: &RawExpr) -> String {
    match expr {
        RawExpr::And(_) | RawExpr::Or(_) => format!("({})", render_expr(expr)),
        other => render_expr(other),
    }
}

/// Split `field<op>value` into its three parts, trying longer operators
/// first so `>=` isn't mistaken for `>`.
fn split_operator(pair: &str) -> Option<(&str, &str, &str)> {
    const OPS: &[&str] = &["!=", ">=", "<=", "~=", "=", ">", "<"];
    for op in OPS {
        if let Some(idx) = pair.find(op) {
            return Some((&pair[..idx], op, &pair[idx + op.len()..]));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Algebraic filter tree
// ---------------------------------------------------------------------------

/// A single comparison against one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// `field=value`
    Eq(String, Value),
    /// `field!=value`
    Ne(String, Value),
    /// `field>N`
    Gt(String, f64),
    /// `field<N`
    Lt(String, f64),
    /// `field>=N`
    Ge(String, f64),
    /// `field<=N`
    Le(String, f64),
    /// `field~=pattern` (substring or glob, case-insensitive)
    Match(String, String),
    /// `field=A..B`
    Range(String, f64, f64),
    /// `field=*`
    Present(String),
    /// `!field`
    Absent(String),
}

impl Comparison {
    fn field(&self) -> &str {
        match self {
            Self::Eq(f, _)
            | Self::Ne(f, _)
            | Self::Gt(f, _)
            | Self::Lt(f, _)
            | Self::Ge(f, _)
            | Self::Le(f, _)
            | Self::Match(f, _)
            | Self::Range(f, _, _)
            | Self::Present(f)
            | Self::Absent(f) => f,
        }
    }
}

/// A boolean combination of comparisons, mirroring the shape of `RawExpr`
/// once every leaf has been validated against a concrete `FieldTable`.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgebraicFilter {
    /// Always matches (no filter supplied).
    True,
    /// A leaf comparison.
    Leaf(Comparison),
    /// All sub-filters must match.
    And(Vec<AlgebraicFilter>),
    /// Any sub-filter must match.
    Or(Vec<AlgebraicFilter>),
    /// Negation.
    Not(Box<AlgebraicFilter>),
}

impl Default for AlgebraicFilter {
    fn default() -> Self {
        Self::True
    }
}

/// What an adapter exposes about its Elements for query evaluation: a field
/// name maps to an extractor returning a JSON value for a given Element-ish
/// input. Kept generic over `T` so both `crate::model::Element` and
/// parser-internal `StructuralElement` can be queried the same way.
pub struct FieldTable<'a, T> {
    extractors: HashMap<&'static str, Box<dyn Fn(&T) -> Option<Value> + 'a>>,
}

impl<'a, T> FieldTable<'a, T> {
    /// An empty field table.
    #[must_use]
    pub fn new() -> Self {
        Self { extractors: HashMap::new() }
    }

    /// Register a queryable field.
    #[must_use]
    pub fn field(mut self, name: &'static str, f: impl Fn(&T) -> Option<Value> + 'a) -> Self {
        self.extractors.insert(name, Box::new(f));
        self
    }

    /// Whether `name` is a registered field.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.extractors.contains_key(name)
    }

    pub(crate) fn get(&self, item: &T, name: &str) -> Option<Value> {
        self.extractors.get(name).and_then(|f| f(item))
    }
}

impl<'a, T> Default for FieldTable<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldTable<'static, ()> {
    /// A field table that declares `names` as known without being able to
    /// extract values for them -- enough for the dispatcher's unknown-field
    /// diagnostics before an adapter-specific, typed `FieldTable` takes over
    /// for actual filtering/sorting.
    #[must_use]
    pub fn declared(names: &[&'static str]) -> Self {
        let mut table = Self::new();
        for name in names {
            table = table.field(name, |()| None);
        }
        table
    }
}

/// Result of compiling a raw query tree: the filter tree plus sort/limit/
/// offset/select directives and any unknown-field warnings.
#[derive(Debug, Clone, Default)]
pub struct CompiledQuery {
    /// The boolean filter to apply to each Element.
    pub filter: AlgebraicFilter,
    /// Field to sort by, and whether descending.
    pub sort: Option<(String, bool)>,
    /// Maximum number of results to return.
    pub limit: Option<usize>,
    /// Number of results to skip before applying `limit`.
    pub offset: usize,
    /// Field projection for rendering.
    pub select: Option<Vec<String>>,
    /// Unknown fields encountered (field name, raw key).
    pub unknown_fields: Vec<String>,
}

/// Compile a parsed query tree into filter + directives, given the set of
/// fields the target adapter declares as queryable. Reserved keys (`sort`,
/// `limit`, `offset`, `select`) are pulled out of the tree rather than
/// treated as field comparisons, wherever in the `&`/`|`/`(...)` structure
/// they appear.
pub fn compile<T>(parsed: &ParsedQuery, fields: &FieldTable<'_, T>) -> CompiledQuery {
    let mut out = CompiledQuery::default();
    out.filter = build_filter(&parsed.filter, fields, &mut out);
    out
}

fn build_filter<T>(expr: &RawExpr, fields: &FieldTable<'_, T>, out: &mut CompiledQuery) -> AlgebraicFilter {
    match expr {
        RawExpr::True => AlgebraicFilter::True,
        RawExpr::Leaf(key, value) => leaf_to_filter(key, value, fields, out),
        RawExpr::And(parts) => {
            let built: Vec<AlgebraicFilter> =
                parts.iter().map(|p| build_filter(p, fields, out)).filter(|p| !matches!(p, AlgebraicFilter::True)).collect();
            match built.len() {
                0 => AlgebraicFilter::True,
                1 => built.remove(0),
                _ => AlgebraicFilter::And(built),
            }
        }
        RawExpr::Or(parts) => {
            AlgebraicFilter::Or(parts.iter().map(|p| build_filter(p, fields, out)).collect())
        }
        RawExpr::Not(inner) => AlgebraicFilter::Not(Box::new(build_filter(inner, fields, out))),
    }
}

fn leaf_to_filter<T>(key: &str, value: &QueryValue, fields: &FieldTable<'_, T>, out: &mut CompiledQuery) -> AlgebraicFilter {
    if let Some(field) = key.strip_prefix('!') {
        if field == "gitignore" {
            // `--no-gitignore` style bare flags are consumed by the
            // dispatcher/filter layer, not the query compiler.
            return AlgebraicFilter::True;
        }
        if !fields.has(field) {
            out.unknown_fields.push(field.to_string());
        }
        return AlgebraicFilter::Leaf(Comparison::Absent(field.to_string()));
    }

    if let Some(field) = key.strip_suffix("!=") {
        reserved_or_leaf(field, value, fields, out, Op::Ne)
    } else if let Some(field) = key.strip_suffix(">=") {
        reserved_or_leaf(field, value, fields, out, Op::Ge)
    } else if let Some(field) = key.strip_suffix("<=") {
        reserved_or_leaf(field, value, fields, out, Op::Le)
    } else if let Some(field) = key.strip_suffix("~=") {
        reserved_or_leaf(field, value, fields, out, Op::Match)
    } else if let Some(field) = key.strip_suffix('>') {
        reserved_or_leaf(field, value, fields, out, Op::Gt)
    } else if let Some(field) = key.strip_suffix('<') {
        reserved_or_leaf(field, value, fields, out, Op::Lt)
    } else {
        reserved_or_leaf(key, value, fields, out, Op::Eq)
    }
}

enum Op {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Match,
}

fn reserved_or_leaf<T>(
    field: &str,
    value: &QueryValue,
    fields: &FieldTable<'_, T>,
    out: &mut CompiledQuery,
    op: Op,
) -> AlgebraicFilter {
    let text = match value {
        QueryValue::Flag => String::new(),
        QueryValue::Text(s) => s.clone(),
    };

    match field {
        "sort" => {
            let (f, desc) = match text.strip_prefix('-') {
                Some(f) => (f.to_string(), true),
                None => (text.clone(), false),
            };
            out.sort = Some((f, desc));
            return AlgebraicFilter::True;
        }
        "limit" => {
            out.limit = text.parse().ok();
            return AlgebraicFilter::True;
        }
        "offset" => {
            out.offset = text.parse().unwrap_or(0);
            return AlgebraicFilter::True;
        }
        "select" => {
            out.select = Some(text.split(',').map(str::to_string).collect());
            return AlgebraicFilter::True;
        }
        _ => {}
    }

    if matches!(value, QueryValue::Flag) {
        if !fields.has(field) {
            out.unknown_fields.push(field.to_string());
        }
        return AlgebraicFilter::Leaf(Comparison::Present(field.to_string()));
    }

    if !fields.has(field) {
        out.unknown_fields.push(field.to_string());
    }

    let comparison = match op {
        Op::Eq => {
            if let Some((lo, hi)) = text.split_once("..") {
                match (lo.parse::<f64>(), hi.parse::<f64>()) {
                    (Ok(lo), Ok(hi)) => Comparison::Range(field.to_string(), lo, hi),
                    _ => Comparison::Eq(field.to_string(), Value::String(text)),
                }
            } else if text == "*" {
                Comparison::Present(field.to_string())
            } else {
                Comparison::Eq(field.to_string(), coerce(&text))
            }
        }
        Op::Ne => Comparison::Ne(field.to_string(), coerce(&text)),
        Op::Gt => Comparison::Gt(field.to_string(), text.parse().unwrap_or(f64::NAN)),
        Op::Lt => Comparison::Lt(field.to_string(), text.parse().unwrap_or(f64::NAN)),
        Op::Ge => Comparison::Ge(field.to_string(), text.parse().unwrap_or(f64::NAN)),
        Op::Le => Comparison::Le(field.to_string(), text.parse().unwrap_or(f64::NAN)),
        Op::Match => Comparison::Match(field.to_string(), text),
    };
    AlgebraicFilter::Leaf(comparison)
}

fn coerce(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        Value::from(i)
    } else if let Ok(f) = text.parse::<f64>() {
        Value::from(f)
    } else if text == "true" || text == "false" {
        Value::from(text == "true")
    } else {
        Value::String(text.to_string())
    }
}

/// Evaluate a compiled filter tree against one item.
pub fn matches<T>(filter: &AlgebraicFilter, item: &T, fields: &FieldTable<'_, T>) -> bool {
    match filter {
        AlgebraicFilter::True => true,
        AlgebraicFilter::Leaf(cmp) => eval_comparison(cmp, item, fields),
        AlgebraicFilter::And(parts) => parts.iter().all(|p| matches(p, item, fields)),
        AlgebraicFilter::Or(parts) => parts.iter().any(|p| matches(p, item, fields)),
        AlgebraicFilter::Not(inner) => !matches(inner, item, fields),
    }
}

fn eval_comparison<T>(cmp: &Comparison, item: &T, fields: &FieldTable<'_, T>) -> bool {
    let field = cmp.field();
    let value = fields.get(item, field);

    match cmp {
        Comparison::Present(_) => value.is_some(),
        Comparison::Absent(_) => value.is_none(),
        Comparison::Eq(_, expected) => value.as_ref() == Some(expected),
        Comparison::Ne(_, expected) => value.as_ref() != Some(expected),
        Comparison::Gt(_, n) => as_f64(value.as_ref()).is_some_and(|v| v > *n),
        Comparison::Lt(_, n) => as_f64(value.as_ref()).is_some_and(|v| v < *n),
        Comparison::Ge(_, n) => as_f64(value.as_ref()).is_some_and(|v| v >= *n),
        Comparison::Le(_, n) => as_f64(value.as_ref()).is_some_and(|v| v <= *n),
        Comparison::Range(_, lo, hi) => as_f64(value.as_ref()).is_some_and(|v| v >= *lo && v <= *hi),
        Comparison::Match(_, pattern) => match value.as_ref().and_then(Value::as_str) {
            Some(s) => glob_or_substring_match(s, pattern),
            None => false,
        },
    }
}

fn as_f64(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

/// Case-insensitive substring match, or glob match when `pattern` contains
/// `*`/`?` wildcards.
fn glob_or_substring_match(haystack: &str, pattern: &str) -> bool {
    let haystack = haystack.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();
    if pattern.contains('*') || pattern.contains('?') {
        glob_match(&haystack, &pattern)
    } else {
        haystack.contains(&pattern)
    }
}

fn glob_match(text: &str, pattern: &str) -> bool {
    let t: Vec<char> = text.chars().collect();
    let p: Vec<char> = pattern.chars().collect();
    let mut memo = vec![vec![None; p.len() + 1]; t.len() + 1];
    glob_match_rec(&t, &p, 0, 0, &mut memo)
}

fn glob_match_rec(t: &[char], p: &[char], ti: usize, pi: usize, memo: &mut [Vec<Option<bool>>]) -> bool {
    if let Some(cached) = memo[ti][pi] {
        return cached;
    }
    let result = if pi == p.len() {
        ti == t.len()
    } else {
        match p[pi] {
            '*' => (ti..=t.len()).any(|i| glob_match_rec(t, p, i, pi + 1, memo)),
            '?' => ti < t.len() && glob_match_rec(t, p, ti + 1, pi + 1, memo),
            c => ti < t.len() && t[ti] == c && glob_match_rec(t, p, ti + 1, pi + 1, memo),
        }
    };
    memo[ti][pi] = Some(result);
    result
}

/// Apply sort/limit/offset to a vector of items that already passed the
/// filter. Returns the page plus whether more results were available.
pub fn paginate<T: Clone>(
    mut items: Vec<T>,
    sort: Option<&(String, bool)>,
    offset: usize,
    limit: Option<usize>,
    key: impl Fn(&T, &str) -> Option<Value>,
) -> (Vec<T>, bool, usize) {
    if let Some((field, desc)) = sort {
        items.sort_by(|a, b| {
            let av = key(a, field);
            let bv = key(b, field);
            let ordering = compare_values(av.as_ref(), bv.as_ref());
            if *desc {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    let total = items.len();
    let windowed: Vec<T> = items.into_iter().skip(offset).collect();
    match limit {
        Some(n) if windowed.len() > n => {
            let truncated = windowed.into_iter().take(n).collect();
            (truncated, true, total)
        }
        _ => {
            let len = windowed.len();
            (windowed, false, total.min(offset + len))
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => match (a.and_then(Value::as_str), b.and_then(Value::as_str)) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => Ordering::Equal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comparison_operators() {
        let q = parse_query_string("complexity>10&sort=-complexity&limit=5").unwrap();
        assert!(q.flags.contains_key("complexity"));
        assert!(matches!(q.flags.get("limit"), Some(QueryValue::Text(s)) if s == "5"));
    }

    #[test]
    fn unknown_field_is_collected_not_fatal() {
        let fields: FieldTable<'_, i64> = FieldTable::new().field("complexity", |n| Some(Value::from(*n)));
        let raw = parse_query_string("bogus_field=1").unwrap();
        let compiled = compile(&raw, &fields);
        assert_eq!(compiled.unknown_fields, vec!["bogus_field".to_string()]);
    }

    #[test]
    fn glob_matches_wildcards() {
        assert!(glob_or_substring_match("test_login", "test_*"));
        assert!(!glob_or_substring_match("login_test", "test_*"));
        assert!(glob_or_substring_match("Anything", "anything"));
    }

    #[test]
    fn range_and_gt_evaluate_numerically() {
        let fields: FieldTable<'_, i64> = FieldTable::new().field("n", |n| Some(Value::from(*n)));
        let raw = parse_query_string("n=1..5").unwrap();
        let compiled = compile(&raw, &fields);
        assert!(matches(&compiled.filter, &3, &fields));
        assert!(!matches(&compiled.filter, &7, &fields));
    }

    #[test]
    fn or_operator_matches_either_side() {
        let fields: FieldTable<'_, i64> = FieldTable::new().field("n", |n| Some(Value::from(*n)));
        let raw = parse_query_string("n>10|n<0").unwrap();
        let compiled = compile(&raw, &fields);
        assert!(matches(&compiled.filter, &20, &fields));
        assert!(matches(&compiled.filter, &-5, &fields));
        assert!(!matches(&compiled.filter, &5, &fields));
    }

    #[test]
    fn parenthesized_group_binds_tighter_than_surrounding_and() {
        let fields: FieldTable<'_, (i64, i64)> =
            FieldTable::new().field("n", |(n, _)| Some(Value::from(*n))).field("m", |(_, m)| Some(Value::from(*m)));
        // n=1 & (m=2 | m=3) -- only the m comparison is grouped.
        let raw = parse_query_string("n=1&(m=2|m=3)").unwrap();
        let compiled = compile(&raw, &fields);
        assert!(matches(&compiled.filter, &(1, 2), &fields));
        assert!(matches(&compiled.filter, &(1, 3), &fields));
        assert!(!matches(&compiled.filter, &(1, 4), &fields));
        assert!(!matches(&compiled.filter, &(9, 2), &fields));
    }

    #[test]
    fn leading_not_negates_a_group() {
        let fields: FieldTable<'_, i64> = FieldTable::new().field("n", |n| Some(Value::from(*n)));
        let raw = parse_query_string("!(n=1|n=2)").unwrap();
        let compiled = compile(&raw, &fields);
        assert!(matches(&compiled.filter, &3, &fields));
        assert!(!matches(&compiled.filter, &1, &fields));
    }

    #[test]
    fn unbalanced_group_is_a_parse_error() {
        assert!(parse_query_string("(n=1").is_err());
    }

    #[test]
    fn mid_expression_complexity_filter_still_works_with_sort() {
        let fields: FieldTable<'_, i64> = FieldTable::new().field("complexity", |n| Some(Value::from(*n)));
        let raw = parse_query_string("complexity>1&sort=-complexity").unwrap();
        let compiled = compile(&raw, &fields);
        assert!(matches(&compiled.filter, &5, &fields));
        assert!(!matches(&compiled.filter, &1, &fields));
        assert_eq!(compiled.sort, Some(("complexity".to_string(), true)));
    }
}
