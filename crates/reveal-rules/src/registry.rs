//! The Rule Registry: every built-in rule, registered once at startup, plus
//! the driver that runs a filtered subset against one dispatched Structure
//! and applies `noqa` suppression.

use std::path::Path;
use std::sync::OnceLock;

use reveal_core::Structure;

use crate::builtin;
use crate::error::{RuleError, RuleResult};
use crate::filter::RuleFilter;
use crate::noqa;
use crate::rule::{Detection, Rule};

/// Global, process-wide rule registry. Built once, on first use.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

static REGISTRY: OnceLock<RuleRegistry> = OnceLock::new();

/// Get the global rule registry, building it on first access.
pub fn global_registry() -> &'static RuleRegistry {
    REGISTRY.get_or_init(RuleRegistry::new)
}

impl RuleRegistry {
    fn new() -> Self {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(builtin::EmptyFunctionBody),
            Box::new(builtin::HardcodedSecret),
            Box::new(builtin::ComplexityThreshold { threshold: 10 }),
            Box::new(builtin::DeadRelativeLink),
            Box::new(builtin::CircularImport),
            Box::new(builtin::LongFunction { max_lines: 100 }),
            Box::new(builtin::DuplicateElementName),
            Box::new(builtin::MissingFrontMatterTitle),
            Box::new(builtin::NginxServerNameWithoutListen),
            Box::new(builtin::ElementSpanInvariant),
        ];
        Self { rules }
    }

    /// All registered rules, for `--rules` introspection.
    #[must_use]
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Reject `--select`/`--ignore` patterns that name no registered rule,
    /// so a typo fails loudly instead of silently matching nothing.
    pub fn validate_patterns(&self, patterns: &[String]) -> RuleResult<()> {
        for pattern in patterns {
            let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
            if !self.rules.iter().any(|rule| rule.code().starts_with(prefix)) {
                return Err(RuleError::UnknownCode(pattern.clone()));
            }
        }
        Ok(())
    }

    /// Run every rule that passes `filter` against `structure`/`source`,
    /// applying `noqa` suppression to the combined result.
    #[must_use]
    pub fn run(&self, file: &Path, structure: &Structure, source: &str, filter: &RuleFilter) -> Vec<Detection> {
        let detections: Vec<Detection> = self
            .rules
            .iter()
            .filter(|rule| filter.matches(rule.code()))
            .flat_map(|rule| rule.check(file, structure, source))
            .collect();
        let suppressed = noqa::apply(detections, source);
        tracing::debug!(file = %file.display(), count = suppressed.len(), "rule engine finished");
        suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reveal_core::{Element, SourceType};

    #[test]
    fn registry_runs_matching_rules_and_suppresses_noqa() {
        let structure = Structure::new("ast_structure", "file://x.rs", SourceType::File)
            .with_category("functions", vec![Element::new("big", 2, 2).with_attr("complexity", 50u32)]);
        let source = "fn a() {}\nfn big() {} // noqa: C001\n";
        let filter = RuleFilter::new(vec!["C*".to_string()], vec![]);
        let detections = global_registry().run(Path::new("x.rs"), &structure, source, &filter);
        assert!(detections.is_empty());
    }

    #[test]
    fn registry_respects_select_filter() {
        let structure = Structure::new("ast_structure", "file://x.rs", SourceType::File)
            .with_category("functions", vec![Element::new("big", 2, 2).with_attr("complexity", 50u32)]);
        let filter = RuleFilter::new(vec!["D".to_string()], vec![]);
        let detections = global_registry().run(Path::new("x.rs"), &structure, "fn big() {}\n", &filter);
        assert!(detections.iter().all(|d| d.code.starts_with('D')));
    }

    #[test]
    fn validate_patterns_accepts_known_prefixes_and_rejects_typos() {
        let registry = global_registry();
        assert!(registry.validate_patterns(&["C*".to_string(), "F003".to_string()]).is_ok());
        assert!(registry.validate_patterns(&["Z*".to_string()]).is_err());
    }
}
