//! Git history support: shells out to the `git` binary rather than linking
//! a Git library, so the `git://` adapter reads exactly what the user's own
//! `git` would report (hooks, attributes, partial clones, and all) without
//! reimplementing pack-file parsing. Every call re-invokes `git`; nothing
//! is cached or persisted across invocations.
#![allow(clippy::doc_markdown)]

use std::path::Path;

use crate::error::{RevealError, RevealResult};

/// A parsed commit record.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CommitInfo {
    /// Git commit hash (full SHA).
    pub hash: String,
    /// Commit message (first line).
    pub message: String,
    /// Author name.
    pub author: String,
    /// Commit timestamp (ISO 8601).
    pub timestamp: String,
    /// Files changed in this commit.
    pub files_changed: Vec<String>,
}

fn run_git(repo_path: &Path, args: &[&str]) -> RevealResult<String> {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .map_err(|e| RevealError::ResourceUnavailable {
            resource: repo_path.display().to_string(),
            message: format!("failed to spawn git: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RevealError::ResourceUnavailable {
            resource: repo_path.display().to_string(),
            message: format!("git {}: {stderr}", args.join(" ")),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// List the most recent commits reachable from `git_ref` (or `HEAD` when
/// `None`), touching the repository as a whole or, when `path_filter` is
/// given, only commits that touched that path.
pub fn log(repo_path: &Path, limit: usize, git_ref: Option<&str>, path_filter: Option<&str>) -> RevealResult<Vec<CommitInfo>> {
    let limit_arg = format!("-{limit}");
    let mut args = vec!["log", "--format=%H%n%s%n%an%n%aI", "--name-only", limit_arg.as_str()];
    if let Some(r) = git_ref {
        args.push(r);
    }
    if let Some(path) = path_filter {
        args.push("--");
        args.push(path);
    }
    let stdout = run_git(repo_path, &args)?;
    Ok(parse_git_log(&stdout))
}

/// Parse `git log --format=%H%n%s%n%an%n%aI --name-only` output into commit records.
fn parse_git_log(output: &str) -> Vec<CommitInfo> {
    let mut commits = Vec::new();
    let mut lines = output.lines().peekable();

    while lines.peek().is_some() {
        let hash = match lines.next() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => break,
        };
        let message = lines.next().unwrap_or("").to_string();
        let author = lines.next().unwrap_or("").to_string();
        let timestamp = lines.next().unwrap_or("").to_string();

        if let Some(line) = lines.peek() {
            if line.is_empty() {
                lines.next();
            }
        }

        let mut files = Vec::new();
        while let Some(line) = lines.peek() {
            if line.is_empty() {
                lines.next();
                break;
            }
            files.push((*line).to_string());
            lines.next();
        }

        commits.push(CommitInfo { hash, message, author, timestamp, files_changed: files });
    }

    commits
}

/// Local branch names (`git branch --format=%(refname:short)`).
pub fn branches(repo_path: &Path) -> RevealResult<Vec<String>> {
    let stdout = run_git(repo_path, &["branch", "--format=%(refname:short)"])?;
    Ok(stdout.lines().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
}

/// Tag names (`git tag`).
pub fn tags(repo_path: &Path) -> RevealResult<Vec<String>> {
    let stdout = run_git(repo_path, &["tag"])?;
    Ok(stdout.lines().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
}

/// Working-tree status, one porcelain entry per changed path.
pub fn status(repo_path: &Path) -> RevealResult<Vec<String>> {
    let stdout = run_git(repo_path, &["status", "--porcelain"])?;
    Ok(stdout.lines().map(str::to_string).collect())
}

/// One line of `git blame` output for a file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BlameLine {
    /// 1-indexed line number in the current file revision.
    pub line: u32,
    /// Commit hash that last touched this line.
    pub hash: String,
    /// Author of that commit.
    pub author: String,
}

/// Run `git blame --line-porcelain` on a file and return one record per
/// line, optionally restricted to an inclusive `(start, end)` 1-indexed
/// line range and/or a specific revision.
pub fn blame(
    repo_path: &Path,
    relative_path: &str,
    git_ref: Option<&str>,
    range: Option<(u32, u32)>,
) -> RevealResult<Vec<BlameLine>> {
    let range_arg = range.map(|(start, end)| format!("-L{start},{end}"));
    let mut args = vec!["blame", "--line-porcelain"];
    if let Some(r) = &range_arg {
        args.push(r);
    }
    if let Some(r) = git_ref {
        args.push(r);
    }
    args.push("--");
    args.push(relative_path);

    let stdout = run_git(repo_path, &args)?;
    let mut result = Vec::new();
    let mut current_hash = String::new();
    let mut current_author = String::new();
    let mut current_line = 0u32;

    for raw in stdout.lines() {
        if let Some(rest) = raw.strip_prefix("author ") {
            current_author = rest.to_string();
        } else if raw.starts_with('\t') {
            result.push(BlameLine { line: current_line, hash: current_hash.clone(), author: current_author.clone() });
        } else {
            let mut parts = raw.split_whitespace();
            if let Some(hash) = parts.next() {
                if hash.len() == 40 && hash.chars().all(|c| c.is_ascii_hexdigit()) {
                    current_hash = hash.to_string();
                    parts.next(); // original line number, unused
                    if let Some(final_line) = parts.next().and_then(|s| s.parse().ok()) {
                        current_line = final_line;
                    }
                }
            }
        }
    }

    Ok(result)
}

/// Tally line counts per author across a set of blame lines, descending.
#[must_use]
pub fn tally_by_author(lines: &[BlameLine]) -> Vec<(String, usize)> {
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for line in lines {
        *counts.entry(line.author.clone()).or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Tally commit counts per author across the commits touching `relative_path`.
pub fn top_authors(repo_path: &Path, relative_path: &str, limit: usize) -> RevealResult<Vec<(String, usize)>> {
    let commits = log(repo_path, 200, None, Some(relative_path))?;
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for commit in &commits {
        *counts.entry(commit.author.clone()).or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted.truncate(limit);
    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_git_log_output() {
        let log_text = "abc123\nfeat: add login\nJohn Doe\n2024-01-15T10:30:00+00:00\n\nsrc/auth.rs\nsrc/main.rs\n\ndef456\nfix: typo\nJane Smith\n2024-01-14T09:00:00+00:00\n\nREADME.md\n";

        let commits = parse_git_log(log_text);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "abc123");
        assert_eq!(commits[0].message, "feat: add login");
        assert_eq!(commits[0].author, "John Doe");
        assert_eq!(commits[0].files_changed, vec!["src/auth.rs", "src/main.rs"]);
        assert_eq!(commits[1].hash, "def456");
        assert_eq!(commits[1].files_changed, vec!["README.md"]);
    }

    #[test]
    fn parses_empty_log() {
        assert!(parse_git_log("").is_empty());
    }

    #[test]
    fn tally_by_author_sorts_descending() {
        let lines = vec![
            BlameLine { line: 1, hash: "a".into(), author: "Alice".into() },
            BlameLine { line: 2, hash: "b".into(), author: "Bob".into() },
            BlameLine { line: 3, hash: "c".into(), author: "Alice".into() },
        ];
        let tally = tally_by_author(&lines);
        assert_eq!(tally[0], ("Alice".to_string(), 2));
        assert_eq!(tally[1], ("Bob".to_string(), 1));
    }
}
