//! The gitignore-aware Filter Layer: which paths a directory traversal
//! should even consider, before any adapter or query gets a say.
//!
//! Default-noise exclusions (`.git`, `node_modules`, `target`, ...) always
//! apply; `.gitignore` is additionally honored unless `--no-gitignore` was
//! passed or the Configuration Snapshot disabled it.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::config::FilterSettings;

/// Walk `root`, yielding file paths that survive the exclude patterns and
/// (when enabled) `.gitignore` rules. Directories themselves are not
/// yielded; only regular files.
#[must_use]
pub fn walk(root: &Path, settings: &FilterSettings, extra_excludes: &[String]) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder.git_ignore(settings.use_gitignore).git_global(settings.use_gitignore).git_exclude(settings.use_gitignore);
    builder.hidden(false);

    let all_excludes: Vec<&str> =
        settings.exclude_patterns.iter().chain(extra_excludes.iter()).map(String::as_str).collect();

    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    for pattern in &all_excludes {
        let _ = overrides.add(&format!("!{pattern}"));
        let _ = overrides.add(&format!("!**/{pattern}"));
        let _ = overrides.add(&format!("!**/{pattern}/**"));
    }
    if let Ok(built) = overrides.build() {
        builder.overrides(built);
    }

    let mut out = Vec::new();
    for entry in builder.build().flatten() {
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            out.push(entry.into_path());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walk_excludes_default_noise_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/built.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("lib.rs"), "fn main() {}").unwrap();

        let settings = FilterSettings::default();
        let found = walk(dir.path(), &settings, &[]);
        assert!(found.iter().any(|p| p.ends_with("lib.rs")));
        assert!(!found.iter().any(|p| p.ends_with("built.rs")));
    }

    #[test]
    fn walk_honors_extra_excludes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.rs"), "").unwrap();
        fs::write(dir.path().join("skip.generated.rs"), "").unwrap();

        let settings = FilterSettings::default();
        let found = walk(dir.path(), &settings, &["*.generated.rs".to_string()]);
        assert!(found.iter().any(|p| p.ends_with("keep.rs")));
        assert!(!found.iter().any(|p| p.ends_with("skip.generated.rs")));
    }
}
