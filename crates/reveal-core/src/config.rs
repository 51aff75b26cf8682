//! Configuration loading and validation.
//!
//! Configuration is resolved with the following precedence (highest wins):
//!
//! 1. CLI flags
//! 2. Environment variables (`REVEAL_*`)
//! 3. Project config (`.reveal/config.toml`)
//! 4. User config (`~/.config/reveal/config.toml`)
//! 5. Compiled-in defaults
//!
//! Each resolved field remembers which layer it came from (`Provenance`) so
//! `config://` can report where a setting's effective value originated,
//! and so the dispatcher can raise a `ConfigurationConflict` when a CLI
//! flag and a query-string parameter disagree about the same setting.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RevealError, RevealResult};

/// Which configuration layer supplied a field's effective value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Compiled-in default.
    Default,
    /// `~/.config/reveal/config.toml`.
    UserFile,
    /// `<repo>/.reveal/config.toml`.
    ProjectFile,
    /// `REVEAL_*` environment variable.
    Env,
    /// An explicit CLI flag.
    Cli,
}

/// Default-output and exclusion settings, independent of any one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Default renderer when `--format` is not given.
    #[serde(default = "OutputSettings::default_format")]
    pub format: String,
    /// Whether to colorize tree/grep output when stdout is a TTY.
    #[serde(default = "OutputSettings::default_color")]
    pub color: bool,
    /// Default outline depth for `--outline` with no explicit `--depth`.
    #[serde(default = "OutputSettings::default_depth")]
    pub default_depth: u32,
}

impl OutputSettings {
    fn default_format() -> String {
        "tree".to_string()
    }
    fn default_color() -> bool {
        true
    }
    fn default_depth() -> u32 {
        2
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: Self::default_format(),
            color: Self::default_color(),
            default_depth: Self::default_depth(),
        }
    }
}

/// Filter-layer settings (gitignore-aware traversal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Always-excluded path globs, applied ahead of `.gitignore`.
    #[serde(default = "FilterSettings::default_excludes")]
    pub exclude_patterns: Vec<String>,
    /// Whether `.gitignore` rules are honored by default.
    #[serde(default = "FilterSettings::default_use_gitignore")]
    pub use_gitignore: bool,
    /// Files above this size (bytes) are skipped with a warning rather than parsed.
    #[serde(default = "FilterSettings::default_max_file_size")]
    pub max_file_size: u64,
}

impl FilterSettings {
    fn default_excludes() -> Vec<String> {
        vec![
            ".git".into(),
            "node_modules".into(),
            "target".into(),
            "__pycache__".into(),
            ".venv".into(),
            "venv".into(),
            "dist".into(),
            "build".into(),
            ".next".into(),
            "*.lock".into(),
        ]
    }
    fn default_use_gitignore() -> bool {
        true
    }
    fn default_max_file_size() -> u64 {
        5 * 1024 * 1024
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            exclude_patterns: Self::default_excludes(),
            use_gitignore: Self::default_use_gitignore(),
            max_file_size: Self::default_max_file_size(),
        }
    }
}

/// Rule-engine settings (`--check`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuleSettings {
    /// Rule code prefixes to run; empty means "all registered rules".
    #[serde(default)]
    pub select: Vec<String>,
    /// Rule code prefixes to suppress, applied after `select`.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Minimum severity that causes a nonzero exit code.
    #[serde(default = "RuleSettings::default_fail_on")]
    pub fail_on: String,
}

impl RuleSettings {
    fn default_fail_on() -> String {
        "warning".to_string()
    }
}

/// `imports://` layer-rule settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImportSettings {
    /// Ordered directory names from lowest layer to highest. A layer may
    /// import from any layer at or below it; an edge from a lower layer to
    /// a higher one is a violation. Empty means layer-violation checking is
    /// off (no layers declared).
    #[serde(default)]
    pub layers: Vec<String>,
}

/// Logging configuration (tracing-subscriber setup).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// Emit structured JSON logs instead of the human-readable formatter.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".into()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: Self::default_level(), json: false }
    }
}

/// The fully-resolved Configuration Snapshot for one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Working directory the invocation was rooted at.
    pub repo_path: PathBuf,
    /// Output/renderer defaults.
    #[serde(default)]
    pub output: OutputSettings,
    /// Traversal/exclusion defaults.
    #[serde(default)]
    pub filter: FilterSettings,
    /// Rule-engine defaults.
    #[serde(default)]
    pub rules: RuleSettings,
    /// `imports://?violations` layer-rule defaults.
    #[serde(default)]
    pub imports: ImportSettings,
    /// Logging defaults.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Where each top-level section's effective value was last touched from.
    /// Absent keys mean "still at compiled-in default".
    #[serde(skip)]
    pub provenance: HashMap<String, Provenance>,
}

impl Config {
    /// Load configuration from defaults, then overlay user config, project
    /// config, and environment variables, in that order (each overlay wins
    /// over what came before). CLI flags are applied afterward by the
    /// caller via `Config::apply_cli_override`, which also checks for
    /// conflicts with any query-string equivalent.
    pub fn load(repo_path: &Path) -> RevealResult<Self> {
        let mut config = Self::defaults(repo_path);

        if let Some(user_config_dir) = dirs::config_dir() {
            let user_config_path = user_config_dir.join("reveal").join("config.toml");
            if user_config_path.exists() {
                config.merge_from_file(&user_config_path, Provenance::UserFile)?;
            }
        }

        let project_config_path = repo_path.join(".reveal").join("config.toml");
        if project_config_path.exists() {
            config.merge_from_file(&project_config_path, Provenance::ProjectFile)?;
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Create a default configuration for the given repo path.
    #[must_use]
    pub fn defaults(repo_path: &Path) -> Self {
        Self {
            repo_path: repo_path.to_path_buf(),
            output: OutputSettings::default(),
            filter: FilterSettings::default(),
            rules: RuleSettings::default(),
            imports: ImportSettings::default(),
            logging: LoggingConfig::default(),
            provenance: HashMap::new(),
        }
    }

    fn merge_from_file(&mut self, path: &Path, provenance: Provenance) -> RevealResult<()> {
        let content = std::fs::read_to_string(path)?;
        let overlay: toml::Value = toml::from_str(&content).map_err(|e| {
            RevealError::ConfigurationConflict(format!("invalid TOML in {}: {e}", path.display()))
        })?;

        if let Some(output) = overlay.get("output") {
            if let Ok(parsed) = output.clone().try_into::<OutputSettings>() {
                self.output = parsed;
                self.provenance.insert("output".to_string(), provenance);
            }
        }
        if let Some(filter) = overlay.get("filter") {
            if let Ok(parsed) = filter.clone().try_into::<FilterSettings>() {
                self.filter = parsed;
                self.provenance.insert("filter".to_string(), provenance);
            }
        }
        if let Some(rules) = overlay.get("rules") {
            if let Ok(parsed) = rules.clone().try_into::<RuleSettings>() {
                self.rules = parsed;
                self.provenance.insert("rules".to_string(), provenance);
            }
        }
        if let Some(imports) = overlay.get("imports") {
            if let Ok(parsed) = imports.clone().try_into::<ImportSettings>() {
                self.imports = parsed;
                self.provenance.insert("imports".to_string(), provenance);
            }
        }
        if let Some(logging) = overlay.get("logging") {
            if let Ok(parsed) = logging.clone().try_into::<LoggingConfig>() {
                self.logging = parsed;
                self.provenance.insert("logging".to_string(), provenance);
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("REVEAL_LOG_LEVEL") {
            self.logging.level = level;
            self.provenance.insert("logging".to_string(), Provenance::Env);
        }
        if let Ok(format) = std::env::var("REVEAL_FORMAT") {
            self.output.format = format;
            self.provenance.insert("output".to_string(), Provenance::Env);
        }
        if let Ok(val) = std::env::var("REVEAL_NO_GITIGNORE") {
            self.filter.use_gitignore = !matches!(val.as_str(), "1" | "true" | "yes");
            self.provenance.insert("filter".to_string(), Provenance::Env);
        }
    }

    /// Apply a CLI-flag-sourced override for `--format`, raising
    /// `ConfigurationConflict` if a query-string `?format=` parameter on the
    /// same invocation disagreed (flags win, but the conflict is reported).
    pub fn apply_format_override(&mut self, cli_format: Option<&str>, query_format: Option<&str>) -> RevealResult<()> {
        match (cli_format, query_format) {
            (Some(flag), Some(query)) if flag != query => {
                tracing::warn!(flag, query, "CLI --format and query ?format= disagree; CLI flag wins");
                self.output.format = flag.to_string();
                self.provenance.insert("output".to_string(), Provenance::Cli);
            }
            (Some(flag), _) => {
                self.output.format = flag.to_string();
                self.provenance.insert("output".to_string(), Provenance::Cli);
            }
            (None, Some(query)) => {
                self.output.format = query.to_string();
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Returns the data directory conventionally used for any cached
    /// per-repo state (reveal itself persists nothing across invocations,
    /// but adapters that shell out, like `git`, may use this as a scratch
    /// root for temp files).
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".")).join("reveal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::defaults(Path::new("/tmp/test-repo"));
        assert_eq!(config.filter.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.output.format, "tree");
        assert!(config.filter.use_gitignore);
    }

    #[test]
    fn cli_flag_wins_over_query_param_with_warning() {
        let mut config = Config::defaults(Path::new("."));
        config.apply_format_override(Some("json"), Some("grep")).unwrap();
        assert_eq!(config.output.format, "json");
        assert_eq!(config.provenance.get("output"), Some(&Provenance::Cli));
    }

    #[test]
    fn query_param_alone_is_honored() {
        let mut config = Config::defaults(Path::new("."));
        config.apply_format_override(None, Some("csv")).unwrap();
        assert_eq!(config.output.format, "csv");
    }
}
