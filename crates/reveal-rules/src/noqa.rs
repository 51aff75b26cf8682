//! `noqa` suppression: a detection anchored to a source line is dropped if
//! that line carries a `noqa` comment, bare (suppresses every rule on the
//! line) or qualified (`noqa: CODE` or `noqa: CODE,CODE2`, suppresses only
//! the named codes).

use crate::rule::Detection;

fn noqa_codes(line: &str) -> Option<Option<Vec<&str>>> {
    let idx = line.find("noqa")?;
    let rest = line[idx + 4..].trim_start();
    if let Some(codes) = rest.strip_prefix(':') {
        Some(Some(codes.split(',').map(str::trim).filter(|c| !c.is_empty()).collect()))
    } else {
        Some(None)
    }
}

/// Drop detections suppressed by a `noqa` comment on their line.
#[must_use]
pub fn apply(detections: Vec<Detection>, source: &str) -> Vec<Detection> {
    let lines: Vec<&str> = source.lines().collect();
    detections
        .into_iter()
        .filter(|d| {
            let Some(line_text) = lines.get(d.line.saturating_sub(1) as usize) else {
                return true;
            };
            match noqa_codes(line_text) {
                None => true,
                Some(None) => false,
                Some(Some(codes)) => !codes.contains(&d.code),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Severity;

    #[test]
    fn bare_noqa_suppresses_all_codes_on_line() {
        let source = "let x = 1; // noqa\n";
        let detections = vec![Detection::new("B001", Severity::Warning, "msg", 1)];
        assert!(apply(detections, source).is_empty());
    }

    #[test]
    fn qualified_noqa_suppresses_only_named_codes() {
        let source = "let x = 1; // noqa: C001\n";
        let detections = vec![
            Detection::new("C001", Severity::Warning, "msg", 1),
            Detection::new("B001", Severity::Warning, "msg", 1),
        ];
        let remaining = apply(detections, source);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].code, "B001");
    }

    #[test]
    fn unrelated_line_is_unaffected() {
        let source = "let x = 1;\n";
        let detections = vec![Detection::new("B001", Severity::Warning, "msg", 1)];
        assert_eq!(apply(detections, source).len(), 1);
    }
}
