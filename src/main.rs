//! EODH CLI
//!
//! Command-line interface to the EODH catalogue and workflow services

use anyhow::Context;
use clap::Parser;
use eodh::cli::{Cli, Runner};
use eodh::config::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let debug = cli.verbose || std::env::var(env::DEBUG).is_ok_and(|v| !v.is_empty() && v != "0");
    let level = if debug { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let command = format!("{:?}", cli.command);
    Runner::new(cli)
        .run()
        .await
        .with_context(|| format!("command failed: {command}"))
}
