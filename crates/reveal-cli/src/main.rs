//! reveal CLI.
//!
//! Subcommand-less: `reveal <URI_OR_PATH> [element] [flags]`. Behavior is
//! determined entirely by the resolved scheme and the flags below; this
//! file's job is argument parsing, wiring the Config Layer into the
//! Dispatcher, running the Rule Engine under `--check`, and rendering.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use reveal_core::config::Config;
use reveal_core::dispatch::{self, Request};
use reveal_core::model::{Element, Structure};
use reveal_core::registry::global_registry;
use reveal_core::render::{self, Format};
use reveal_core::RevealError;
use reveal_rules::RuleFilter;

/// reveal - URI-addressable, progressive-disclosure introspection for code,
/// repos, documents, and process state.
#[derive(Parser, Debug)]
#[command(name = "reveal", version, about = "Progressive-disclosure introspection engine")]
struct Cli {
    /// A URI (`scheme://resource[/element][?query]`) or a bare path, promoted to `file://`.
    uri_or_path: Option<String>,

    /// Explicit element address, as a second positional (equivalent to `/element` in the URI).
    element: Option<String>,

    /// Output format: text (default), json, grep, csv.
    #[arg(long)]
    format: Option<String>,

    /// Comma-separated field projection (non-`--check`) or rule selection (`--check`).
    #[arg(long)]
    select: Option<String>,

    /// Run the rule engine instead of rendering the raw Structure.
    #[arg(long)]
    check: bool,

    /// Comma-separated rule codes to suppress, only meaningful with `--check`.
    #[arg(long)]
    ignore: Option<String>,

    /// Hierarchical structure view (caps child nesting at `--depth`).
    #[arg(long)]
    outline: bool,

    /// Directory/outline depth cap.
    #[arg(long)]
    depth: Option<u32>,

    /// Keep only the first N elements per category.
    #[arg(long)]
    head: Option<usize>,

    /// Keep only the last N elements per category.
    #[arg(long)]
    tail: Option<usize>,

    /// Keep only elements in line range `A-B`.
    #[arg(long)]
    range: Option<String>,

    /// Additional exclusion glob, may be repeated.
    #[arg(long)]
    exclude: Vec<String>,

    /// Disable gitignore-aware filtering.
    #[arg(long = "no-gitignore")]
    no_gitignore: bool,

    /// Read target URIs/paths from stdin, one per line, instead of the positional argument.
    #[arg(long)]
    stdin: bool,

    /// With `--stdin`, apply the same flags to every target and print each result in turn.
    #[arg(long)]
    batch: bool,

    /// Extract a named projection (keep only the matching category).
    #[arg(long)]
    extract: Option<String>,

    /// Copy the rendered output to the system clipboard, in addition to stdout.
    #[arg(long)]
    copy: bool,

    /// List every adapter scheme this build supports.
    #[arg(long)]
    list_supported: bool,

    /// Alias for `--list-supported`.
    #[arg(long)]
    adapters: bool,

    /// List every language the Parser Frontend can analyze.
    #[arg(long)]
    languages: bool,

    /// List every registered rule code and description.
    #[arg(long)]
    rules: bool,

    /// Report which adapter and language would handle a given path, without dispatching it.
    #[arg(long)]
    explain_file: Option<String>,

    /// Force `ast://`-style structural output (parsed elements + complexity) for the target.
    #[arg(long)]
    show_ast: bool,

    /// Print adapters, formats, and rule codes as a single JSON capabilities document.
    #[arg(long)]
    capabilities: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.list_supported || cli.adapters {
        print_schemes();
        return Ok(ExitCode::SUCCESS);
    }
    if cli.languages {
        print_languages();
        return Ok(ExitCode::SUCCESS);
    }
    if cli.rules {
        print_rules();
        return Ok(ExitCode::SUCCESS);
    }
    if cli.capabilities {
        print_capabilities();
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(path) = &cli.explain_file {
        print_explain_file(path);
        return Ok(ExitCode::SUCCESS);
    }

    let repo_path = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = Config::load(&repo_path)?;
    if cli.no_gitignore {
        config.filter.use_gitignore = false;
    }
    config.filter.exclude_patterns.extend(cli.exclude.iter().cloned());
    if let Some(depth) = cli.depth {
        config.output.default_depth = depth;
    }

    let targets: Vec<String> = if cli.stdin {
        std::io::stdin().lock().lines().collect::<std::io::Result<Vec<_>>>()?
    } else {
        let Some(target) = cli.uri_or_path.clone() else {
            eprintln!("error: no URI or path given (pass --stdin to read targets from stdin)");
            return Ok(ExitCode::from(2));
        };
        vec![target]
    };

    if cli.stdin && !cli.batch && targets.len() > 1 {
        eprintln!("error: multiple stdin targets given without --batch");
        return Ok(ExitCode::from(2));
    }

    let mut worst_exit = 0i32;
    for target in &targets {
        let target = target.trim();
        if target.is_empty() {
            continue;
        }
        let exit = run_one(target, &cli, &mut config)?;
        worst_exit = worst_exit.max(exit);
    }
    Ok(exit_code(worst_exit))
}

fn exit_code(code: i32) -> ExitCode {
    match code {
        0 => ExitCode::SUCCESS,
        n => ExitCode::from(n as u8),
    }
}

/// Run the full dispatch -> (optional rule engine) -> render pipeline for
/// one target, printing its output and returning the exit code it earned.
fn run_one(target: &str, cli: &Cli, config: &mut Config) -> Result<i32> {
    let input = if cli.show_ast { promote_to_ast(target) } else { target.to_string() };
    tracing::info!(target = %input, check = cli.check, "dispatching");
    let request = Request { input: &input, element: cli.element.as_deref(), cli_format: cli.format.as_deref() };

    let structure = match dispatch::dispatch(&request, config) {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(target = %input, error = %err, "dispatch failed");
            eprintln!("error: {} ({target})", describe_error(&err));
            return Ok(err.exit_code());
        }
    };

    if cli.check {
        return run_check(target, &structure, cli, config);
    }

    let mut structure = structure;
    apply_view_flags(&mut structure, cli);
    let format = Format::parse(cli.format.as_deref().unwrap_or(config.output.format.as_str()));
    let rendered = render::render(&structure, format);
    emit(&rendered, cli.copy)?;
    Ok(0)
}

fn promote_to_ast(target: &str) -> String {
    if target.contains("://") {
        target.to_string()
    } else {
        format!("ast://{target}")
    }
}

fn describe_error(err: &RevealError) -> String {
    match err {
        RevealError::UnknownScheme { scheme, suggestion } => {
            let hint = suggestion.as_ref().map(|s| format!(" (did you mean \"{s}\"?)")).unwrap_or_default();
            format!("unknown scheme \"{scheme}\"{hint}")
        }
        other => other.to_string(),
    }
}

/// Run the Rule Engine against a dispatched Structure, reading the
/// underlying source from disk when the target names a file. Prints each
/// detection and returns 3 iff any un-suppressed detection reaches
/// `config.rules.fail_on`.
fn run_check(target: &str, structure: &Structure, cli: &Cli, config: &Config) -> Result<i32> {
    let select = cli.select.clone().map(|s| split_csv(&s)).unwrap_or_else(|| config.rules.select.clone());
    let ignore = cli.ignore.clone().map(|s| split_csv(&s)).unwrap_or_else(|| config.rules.ignore.clone());

    let registry = reveal_rules::global_registry();
    if let Err(err) = registry.validate_patterns(&select).and_then(|()| registry.validate_patterns(&ignore)) {
        eprintln!("error: {err}");
        return Ok(2);
    }

    let filter = RuleFilter::new(select, ignore);

    let path = resolve_source_path(target);
    let source = path.as_deref().and_then(|p| std::fs::read_to_string(p).ok()).unwrap_or_default();
    let file_for_rules = path.unwrap_or_else(|| PathBuf::from(target));

    let detections = registry.run(&file_for_rules, structure, &source, &filter);
    let fail_on = reveal_rules::Severity::parse(&config.rules.fail_on).unwrap_or(reveal_rules::Severity::Warning);

    for detection in &detections {
        println!("{}:{}: {} {}", file_for_rules.display(), detection.line, detection.code, detection.message);
    }

    let worst = detections.iter().any(|d| d.severity >= fail_on);
    Ok(if worst { 3 } else { 0 })
}

/// Best-effort recovery of a filesystem path from a target string, for
/// rules that need the raw source (links, secrets, noqa). Schemes whose
/// resource already is a path (`file`, `ast`, `markdown`, ...) resolve
/// directly; anything else has no backing source file to read.
fn resolve_source_path(target: &str) -> Option<PathBuf> {
    let resource = target.split_once("://").map_or(target, |(_, rest)| rest);
    let candidate = PathBuf::from(resource.split(['?', '#']).next().unwrap_or(resource));
    candidate.is_file().then_some(candidate)
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Apply `--head`/`--tail`/`--range`/`--extract`/`--select`/`--outline`
/// in-place, ahead of rendering. These are view-layer conveniences on top
/// of the Output Contract, not adapter behavior, so they live here rather
/// than in the Dispatcher.
fn apply_view_flags(structure: &mut Structure, cli: &Cli) {
    if let Some(kind) = &cli.extract {
        structure.categories.retain(|name, _| name == kind);
    }
    if let Some(range) = &cli.range {
        if let Some((a, b)) = range.split_once('-').and_then(|(a, b)| Some((a.parse::<u32>().ok()?, b.parse::<u32>().ok()?))) {
            for elements in structure.categories.values_mut() {
                elements.retain(|e| e.line_start >= a && e.line_end <= b);
            }
        }
    }
    if let Some(n) = cli.head {
        for elements in structure.categories.values_mut() {
            elements.truncate(n);
        }
    }
    if let Some(n) = cli.tail {
        for elements in structure.categories.values_mut() {
            if elements.len() > n {
                let drop = elements.len() - n;
                elements.drain(..drop);
            }
        }
    }
    if cli.outline {
        let depth = config_outline_depth(cli);
        for elements in structure.categories.values_mut() {
            for element in elements.iter_mut() {
                cap_depth(element, depth);
            }
        }
    }
    if let Some(fields) = &cli.select {
        let keep = split_csv(fields);
        for elements in structure.categories.values_mut() {
            project_fields(elements, &keep);
        }
    }
}

fn config_outline_depth(cli: &Cli) -> u32 {
    cli.depth.unwrap_or(2)
}

fn cap_depth(element: &mut Element, remaining: u32) {
    if remaining == 0 {
        element.children.clear();
        return;
    }
    for child in element.children.iter_mut() {
        cap_depth(child, remaining - 1);
    }
}

fn project_fields(elements: &mut [Element], keep: &[String]) {
    for element in elements.iter_mut() {
        element.attributes.retain(|k, _| keep.iter().any(|f| f == k));
        project_fields(&mut element.children, keep);
    }
}

/// Write `rendered` to stdout, flushing per line (per the cancellation
/// contract: no partial writes beyond the last flushed line on SIGINT),
/// and optionally piping a copy to the system clipboard.
fn emit(rendered: &str, copy: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    for line in rendered.lines() {
        writeln!(lock, "{line}")?;
        lock.flush()?;
    }
    if copy {
        copy_to_clipboard(rendered);
    }
    Ok(())
}

fn copy_to_clipboard(text: &str) {
    use std::process::{Command, Stdio};
    let candidates: &[(&str, &[&str])] =
        &[("pbcopy", &[]), ("xclip", &["-selection", "clipboard"]), ("xsel", &["--clipboard", "--input"]), ("clip.exe", &[])];
    for (program, args) in candidates {
        if let Ok(mut child) = Command::new(program).args(*args).stdin(Stdio::piped()).spawn() {
            if let Some(mut stdin) = child.stdin.take() {
                if stdin.write_all(text.as_bytes()).is_ok() {
                    drop(stdin);
                    let _ = child.wait();
                    return;
                }
            }
        }
    }
    eprintln!("warning: no clipboard utility found (tried pbcopy, xclip, xsel, clip.exe); output printed to stdout only");
}

fn print_schemes() {
    for scheme in global_registry().schemes() {
        println!("{scheme}");
    }
}

fn print_languages() {
    for language in reveal_core::adapters::reveal_self::LANGUAGES {
        println!("{}", language.as_str());
    }
}

fn print_rules() {
    for rule in reveal_rules::global_registry().rules() {
        println!("{}\t{}", rule.code(), rule.description());
    }
}

fn print_capabilities() {
    let capabilities = serde_json::json!({
        "adapters": global_registry().schemes(),
        "formats": ["tree", "json", "grep", "csv"],
        "rules": reveal_rules::global_registry().rules().iter().map(|r| r.code()).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&capabilities).unwrap_or_default());
}

fn print_explain_file(path: &str) {
    let path = Path::new(path);
    let source = std::fs::read(path).ok();
    let first_line = source.as_ref().map(|s| String::from_utf8_lossy(s).lines().next().unwrap_or_default().to_string());
    let language = reveal_core::adapters::detect_language(path, first_line.as_deref());
    println!("path: {}", path.display());
    println!("language: {}", language.as_str());
    println!("adapter: file (ast:// for structural view)");
}
