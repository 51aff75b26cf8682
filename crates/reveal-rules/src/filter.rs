//! `--select`/`--ignore` rule filtering, grounded in
//! `reveal_core::config::RuleSettings`. Patterns are a full code
//! (`"C001"`), a bare prefix (`"C"`), or a prefix wildcard (`"C*"`); all
//! three mean "every rule whose code starts with this prefix".

/// A compiled select/ignore pair. `ignore` is applied after `select`, so a
/// rule must pass both to run.
#[derive(Debug, Clone, Default)]
pub struct RuleFilter {
    select: Vec<String>,
    ignore: Vec<String>,
}

fn prefix_of(pattern: &str) -> &str {
    pattern.strip_suffix('*').unwrap_or(pattern)
}

fn pattern_matches(pattern: &str, code: &str) -> bool {
    code.starts_with(prefix_of(pattern))
}

impl RuleFilter {
    #[must_use]
    pub fn new(select: Vec<String>, ignore: Vec<String>) -> Self {
        Self { select, ignore }
    }

    /// Build a filter from a `RuleSettings` snapshot.
    #[must_use]
    pub fn from_settings(settings: &reveal_core::config::RuleSettings) -> Self {
        Self::new(settings.select.clone(), settings.ignore.clone())
    }

    /// Whether the given rule code should run under this filter.
    #[must_use]
    pub fn matches(&self, code: &str) -> bool {
        let selected = self.select.is_empty() || self.select.iter().any(|p| pattern_matches(p, code));
        let ignored = self.ignore.iter().any(|p| pattern_matches(p, code));
        selected && !ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_select_means_everything_runs() {
        let filter = RuleFilter::new(vec![], vec![]);
        assert!(filter.matches("C001"));
        assert!(filter.matches("F003"));
    }

    #[test]
    fn select_prefix_wildcard_restricts_to_category() {
        let filter = RuleFilter::new(vec!["C*".to_string()], vec![]);
        assert!(filter.matches("C001"));
        assert!(!filter.matches("B001"));
    }

    #[test]
    fn bare_prefix_behaves_like_wildcard() {
        let filter = RuleFilter::new(vec!["C".to_string()], vec![]);
        assert!(filter.matches("C001"));
    }

    #[test]
    fn ignore_wins_over_select() {
        let filter = RuleFilter::new(vec!["C*".to_string()], vec!["C001".to_string()]);
        assert!(!filter.matches("C001"));
        assert!(filter.matches("C002"));
    }
}
