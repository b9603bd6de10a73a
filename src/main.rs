//! Command-line entrypoint.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use swap_executor::application::{self, BatchReport, SchedulerError};
use swap_executor::config::AppConfig;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Scheduled multi-account token swaps.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (YAML, TOML or JSON).
    #[arg(long, env = "CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn log_ledger(report: &BatchReport) {
    for entry in &report.accounts {
        let outcome = &entry.outcome;
        if outcome.is_success() {
            info!(
                account = %entry.account,
                tx_hash = ?outcome.tx_hash(),
                result = outcome.label(),
                "{}", outcome
            );
        } else {
            warn!(
                account = %entry.account,
                tx_hash = ?outcome.tx_hash(),
                result = outcome.label(),
                "{}", outcome
            );
        }
    }
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "run complete"
    );
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let app = application::build(&config).await.context("setting up pipeline")?;

    match app.scheduler.run(app.accounts).await {
        Ok(report) => {
            log_ledger(&report);
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ SchedulerError::AccountsFailed { .. }) => {
            log_ledger(e.report());
            error!(error = %e, "batch failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // a missing .env is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.json_logs);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "fatal");
            ExitCode::FAILURE
        }
    }
}
