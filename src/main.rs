//! Billed main entry point

use anyhow::Context;
use billed_api::start_server;
use billed_config::{Config, ConfigError};
use billed_core::build_store;
use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "billed")]
#[command(version = "0.1.0")]
#[command(about = "Employee expense reports: bill list, receipt upload and new bill form", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

/// Startup report for a configuration error: code, field and suggestions
fn config_report(e: &ConfigError) -> String {
    format!("Configuration error\n{}", e.to_details())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (config, missing) = match Config::load(&args.config) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            // No configured level yet
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
            log::error!("{}", config_report(&e));
            return Err(e).with_context(|| format!("loading {}", args.config.display()));
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();

    if missing {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    if let Err(e) = config.validate() {
        log::error!("{}", config_report(&e));
        return Err(e).context("invalid configuration");
    }

    log::info!(
        "Config loaded: store backend={}, session user={}",
        config.store.backend,
        config.session.email
    );

    let store = build_store(&config.store);

    let rt = Runtime::new()?;
    rt.block_on(start_server(config, store))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_report_names_field_and_suggestions() {
        let err = Config::from_yaml("store:\n  backend: remote\n").unwrap_err();
        let report = config_report(&err);
        assert!(report.starts_with("Configuration error\n"));
        assert!(report.contains("store.api_url"));
        assert!(report.contains("Suggestions:"));
    }
}
