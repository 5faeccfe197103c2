use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use hyperpay_ledger::{
    bin_utils::{InvocationProcessError, Service},
    config::LedgerConfig,
};
use tracing_subscriber::EnvFilter;

/// Replays a CSV log of ledger invocations against an in-memory ledger and
/// prints the result of every successful invocation as CSV.
#[derive(Parser)]
#[command(name = "hyperpay-ledger", version)]
struct Cli {
    /// Invocation log with columns tx,timestamp,org,function,arg1,arg2,arg3
    input: PathBuf,

    /// JSON ledger configuration, built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => LedgerConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config `{}`", path.display()))?,
        None => LedgerConfig::default(),
    };
    let file = File::open(&cli.input)
        .with_context(|| format!("Failed to open `{}`", cli.input.display()))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        config,
        error_printer: Box::new(|line, err| match err {
            InvocationProcessError::Ledger(err) => {
                tracing::warn!(line, %err, "Invocation rejected")
            }
            err => tracing::error!(line, %err, "Invalid invocation"),
        }),
    };
    service.run()
}
