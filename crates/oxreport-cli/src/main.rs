use anyhow::{Context, Result};
use oxreport_alert::{AlertConfig, AlertEvaluator, LogConfig};
use oxreport_common::types::AlertDocument;
use oxreport_expr::Value;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  oxreport check <config.toml>                              Validate alert rules");
    eprintln!("  oxreport eval <config.toml> <reporter> <snapshot.json>    Evaluate a reporter's alerts against a snapshot");
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("check") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("check requires <config.toml> argument")
            })?;
            run_check(config_path)
        }
        Some("eval") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("eval requires <config.toml>, <reporter> and <snapshot.json> arguments")
            })?;
            let reporter = args.get(3).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("eval requires <reporter> argument")
            })?;
            let snapshot_path = args.get(4).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("eval requires <snapshot.json> argument")
            })?;
            run_eval(config_path, reporter, snapshot_path)
        }
        Some("--help" | "-h") | None => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            print_usage();
            anyhow::bail!("unknown command {other:?}")
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `[log].level`.
fn init_logging(log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log.is_json() {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
    }
}

#[allow(clippy::print_stdout)]
fn run_check(config_path: &str) -> Result<()> {
    let config = AlertConfig::load(config_path)?;
    init_logging(&config.log)?;

    for line in summary(&config)? {
        println!("{line}");
    }
    tracing::info!(config = config_path, "Alert configuration is valid");
    Ok(())
}

#[allow(clippy::print_stdout)]
fn run_eval(config_path: &str, reporter: &str, snapshot_path: &str) -> Result<()> {
    let config = AlertConfig::load(config_path)?;
    init_logging(&config.log)?;

    let doc = evaluate_file(&config, reporter, Path::new(snapshot_path))?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// One line per configured reporter with its rule count.
fn summary(config: &AlertConfig) -> Result<Vec<String>> {
    let compiled = config.compile()?;
    Ok(config
        .reporters
        .iter()
        .map(|(name, reporter)| match compiled.get(name) {
            Some(rules) => format!("{name}: {} rule(s)", rules.len()),
            None => format!("{name}: {} rule(s), disabled", reporter.alerts.len()),
        })
        .collect())
}

fn evaluate_file(config: &AlertConfig, reporter: &str, snapshot_path: &Path) -> Result<AlertDocument> {
    let compiled = config.compile()?;
    let rules = compiled
        .get(reporter)
        .ok_or_else(|| anyhow::anyhow!("reporter {reporter:?} is not configured or not enabled"))?;

    let content = std::fs::read_to_string(snapshot_path)
        .with_context(|| format!("reading snapshot {}", snapshot_path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing snapshot {}", snapshot_path.display()))?;

    let evaluator = AlertEvaluator::for_reporter(reporter);
    Ok(evaluator.document(rules, &Value::from(json)))
}
