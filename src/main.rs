//! memcached-itool - Diagnostic client for the memcached statistics protocol
//!
//! # Run Sequence
//! 1. Parse the command line (usage is printed without connecting on error)
//! 2. Initialize tracing to stderr
//! 3. Connect over TCP or a Unix socket within the connect timeout
//! 4. Produce the report of the selected mode
//! 5. Print it as text or JSON and exit

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use memcached_itool::cli::Cli;
use memcached_itool::config::OutputFormat;
use memcached_itool::protocol::connect;
use memcached_itool::report::{self, render_json, render_text};
use memcached_itool::{logging, StatsClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config()?;

    if config.mode.mutates_server() {
        warn!("removeexp fetches expired keys and changes server statistics");
    }

    let stream = connect(&config.target, config.connect_timeout())
        .await
        .with_context(|| format!("cannot reach memcached at {}", config.target))?;
    let mut client = StatsClient::new(stream);

    let now = chrono::Utc::now().timestamp();
    let report = report::run(&mut client, config.mode, now)
        .await
        .with_context(|| format!("{:?} report failed", config.mode))?;

    match config.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", render_json(&report)?),
    }
    Ok(())
}
