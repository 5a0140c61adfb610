//! E2E Harness Kit CLI
//!
//! CLI tool for filtering record sets and running scenario fixtures.

use std::path::Path;

use harness_kit::config::Validate;
use harness_kit::{
    collect_leaf_text, DataFilter, EnvConfig, Error, FilterConfig, Result, ScenarioHarness,
};
use serde_json::Value;

const USAGE: &str = "\
Commands:
  filter <config.yaml> <records.json>  Filter a JSON array of records
  texts <file.json>                    Print the leaf text values of a JSON document
  run <fixture-dir>                    Run every scenario fixture in a directory
  env [config.toml]                    Show the active environment

Environment variables:
  E2E=<name>         Select the environment (default: int)
  HARNESS_VERBOSE=1  Log request and response detail";

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("harness-kit");

    let outcome = match args.get(1).map(String::as_str) {
        Some("filter") if args.len() == 4 => filter_command(&args[2], &args[3]).await,
        Some("texts") if args.len() == 3 => texts_command(&args[2]),
        Some("run") if args.len() == 3 => run_command(&args[2]).await,
        Some("env") if args.len() <= 3 => env_command(args.get(2).map(String::as_str)),
        _ => {
            eprintln!("Usage: {} <command> [args]\n", program);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn read_json(path: &str) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn filter_command(config_path: &str, records_path: &str) -> Result<bool> {
    let content = std::fs::read_to_string(config_path)?;
    let config: FilterConfig = serde_yaml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", config_path, e)))?;

    for warning in config.validate().into_result()? {
        tracing::warn!(warning = %warning, "filter configuration");
    }

    let Value::Array(records) = read_json(records_path)? else {
        return Err(Error::InvalidInput(format!(
            "{} must hold a JSON array of records",
            records_path
        )));
    };

    let filtered = DataFilter::from_config(config).filter(&records).await?;
    println!("{}", serde_json::to_string_pretty(&filtered)?);
    Ok(true)
}

fn texts_command(path: &str) -> Result<bool> {
    for (path, text) in collect_leaf_text(&read_json(path)?) {
        println!("{}\t{}", path, text);
    }
    Ok(true)
}

async fn run_command(dir: &str) -> Result<bool> {
    tracing::info!(dir = %dir, "running scenario fixtures");
    let results = ScenarioHarness::new().run_dir(Path::new(dir)).await?;

    let mut failed = 0;
    for result in &results {
        let status = if result.passed { "PASS" } else { "FAIL" };
        println!("[{}] {} ({:?})", status, result.fixture_name, result.duration);
        if let Some(error) = &result.error {
            println!("  error: {}", error);
        }
        if let Some(validation) = &result.validation {
            for message in &validation.messages {
                println!("  {}", message);
            }
        }
        if !result.passed {
            failed += 1;
        }
    }

    println!();
    println!("{} passed, {} failed", results.len() - failed, failed);
    Ok(failed == 0)
}

fn env_command(config_path: Option<&str>) -> Result<bool> {
    let config = match config_path {
        Some(path) => EnvConfig::load(path)?,
        None => EnvConfig::default(),
    };

    let report = config.validate();
    for warning in &report.warnings {
        tracing::warn!(warning = %warning, "environment configuration");
    }
    report.into_result()?;

    let env = config.resolve_active()?;
    println!("Environment: {}", env.name);
    println!("Frontend:    {}", env.frontend_url);
    println!("API:         {}", env.api_url);
    println!("GraphQL:     {}", env.gql_url);
    println!("Verbose:     {}", env.verbose);
    Ok(true)
}
