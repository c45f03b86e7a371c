//! patex CLI — driving adapter for the patex expander engine.
//!
//! Subcommands:
//! - `match <pattern> <value-json> [--trace]` — resolve a pattern file and match a value
//! - `check <pattern>` — validate a pattern file resolves without errors
//! - `info` — print registered expander names
//!
//! `--registry <file>` applies a registry alias config before any command.
//! Exit status: 0 on success or match, 1 when the value does not match, 2 on error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use patex::{load_node, Backtrace, ExpanderRegistry, PatternExpander, RegistryConfig, Value};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "patex")]
#[command(about = "Resolve and run expander patterns", version)]
struct Cli {
    /// Registry alias config (JSON or YAML)
    #[arg(long, global = true, value_name = "FILE")]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a pattern and match a JSON value against it
    Match {
        /// Pattern file (JSON or YAML expander tree)
        pattern: PathBuf,
        /// Value to match, as JSON
        value: String,
        /// Print the backtrace after matching
        #[arg(long, short = 't')]
        trace: bool,
    },
    /// Check that a pattern resolves
    Check {
        /// Pattern file (JSON or YAML expander tree)
        pattern: PathBuf,
    },
    /// Print registered expander names
    Info,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool, String> {
    let registry = build_registry(cli.registry.as_deref())?;
    match cli.command {
        Command::Match {
            pattern,
            value,
            trace,
        } => cmd_match(&registry, &pattern, &value, trace),
        Command::Check { pattern } => cmd_check(&registry, &pattern).map(|()| true),
        Command::Info => {
            cmd_info(&registry);
            Ok(true)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_match(
    registry: &ExpanderRegistry,
    pattern: &Path,
    value: &str,
    trace: bool,
) -> Result<bool, String> {
    let (matched, error, backtrace) = evaluate(registry, pattern, value)?;

    if matched {
        println!("matched");
    } else {
        println!("not matched");
        if let Some(error) = error {
            println!("  {error}");
        }
    }

    if trace {
        print!("{backtrace}");
    }

    Ok(matched)
}

fn cmd_check(registry: &ExpanderRegistry, pattern: &Path) -> Result<(), String> {
    let node = load_node(pattern).map_err(|e| e.to_string())?;
    registry
        .resolve(&node, Backtrace::new())
        .map_err(|e| format!("pattern invalid: {e}"))?;

    println!("Pattern valid");
    Ok(())
}

fn cmd_info(registry: &ExpanderRegistry) {
    println!("Registered expanders:");
    for name in registry.names() {
        println!("  {name}");
    }
}

/// Resolve `pattern`, match `value`, and hand back the outcome.
fn evaluate(
    registry: &ExpanderRegistry,
    pattern: &Path,
    value: &str,
) -> Result<(bool, Option<String>, Backtrace), String> {
    let node = load_node(pattern).map_err(|e| e.to_string())?;
    let value = parse_value(value)?;

    let backtrace = Backtrace::new();
    let expander = registry
        .resolve(&node, backtrace.clone())
        .map_err(|e| format!("pattern invalid: {e}"))?;

    debug!(expander = expander.name(), "matching value");
    let matched = expander.matches(&value);
    Ok((matched, expander.error(), backtrace))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry(config: Option<&Path>) -> Result<ExpanderRegistry, String> {
    let mut registry = ExpanderRegistry::new();
    if let Some(path) = config {
        RegistryConfig::from_path(path)
            .and_then(|config| config.apply(&mut registry))
            .map_err(|e| format!("registry config: {e}"))?;
    }
    Ok(registry)
}

fn parse_value(json: &str) -> Result<Value, String> {
    serde_json::from_str(json).map_err(|e| format!("value is not valid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("patex-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_match_with_global_registry() {
        let cli = Cli::try_parse_from([
            "patex",
            "match",
            "pattern.yaml",
            "\"foo\"",
            "--trace",
            "--registry",
            "aliases.yaml",
        ])
        .unwrap();
        assert_eq!(cli.registry, Some(PathBuf::from("aliases.yaml")));
        match cli.command {
            Command::Match { pattern, value, trace } => {
                assert_eq!(pattern, PathBuf::from("pattern.yaml"));
                assert_eq!(value, "\"foo\"");
                assert!(trace);
            }
            other => panic!("expected match command, got {other:?}"),
        }
    }

    #[test]
    fn parse_value_json() {
        assert_eq!(parse_value("42").unwrap(), Value::Int(42));
        assert_eq!(parse_value("\"x\"").unwrap(), Value::from("x"));
        assert!(parse_value("not json").is_err());
    }

    #[test]
    fn build_registry_has_builtins() {
        let registry = build_registry(None).unwrap();
        assert!(registry.contains("startsWith"));
        assert!(registry.contains("isTzIdentifier"));
    }

    #[test]
    fn build_registry_applies_aliases() {
        let config = write_temp("aliases.yaml", "aliases:\n  prefix: startsWith\n");
        let registry = build_registry(Some(&config)).unwrap();
        assert!(registry.contains("prefix"));

        let bad = write_temp("bad-aliases.json", r#"{ "aliases": { "x": "Nope" } }"#);
        let err = build_registry(Some(&bad)).unwrap_err();
        assert!(err.contains("Nope"), "{err}");
    }

    #[test]
    fn evaluate_pattern_file() {
        let pattern = write_temp(
            "one-of.yaml",
            "name: oneOf\narguments:\n  - expander: { name: startsWith, arguments: [a] }\n  - expander: { name: startsWith, arguments: [b] }\n",
        );
        let registry = build_registry(None).unwrap();

        let (matched, error, backtrace) = evaluate(&registry, &pattern, "\"beta\"").unwrap();
        assert!(matched);
        assert!(error.is_none());
        assert!(!backtrace.is_empty());

        let (matched, error, _) = evaluate(&registry, &pattern, "\"gamma\"").unwrap();
        assert!(!matched);
        assert!(error.unwrap().contains("none of the expanders matched"));
    }

    #[test]
    fn check_reports_unknown_expander() {
        let pattern = write_temp("bogus.json", r#"{ "name": "bogus" }"#);
        let registry = build_registry(None).unwrap();
        let err = cmd_check(&registry, &pattern).unwrap_err();
        assert!(err.contains("bogus"), "{err}");
    }
}
