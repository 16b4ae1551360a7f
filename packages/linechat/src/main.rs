//! `linechat <local_port> <remote_host> <remote_port>`
//!
//! Lines typed on stdin are sent to the peer; datagrams from the peer are printed as
//! `Received: <line>`. Typing `!`, or receiving it, ends the session on both sides.
//! Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).

use anyhow::{bail, Context, Result};
use clap::{error::ErrorKind, Parser};
use linechat::{
    console::{self, ThreadedLines},
    transport::UdpTransport,
    ChatConfig,
    Session,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Two-way line chat over UDP.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// UDP port to listen on
    local_port: u16,
    /// Host name or IPv4 address of the peer
    remote_host: String,
    /// UDP port the peer listens on
    remote_port: u16,
}

impl From<Cli> for ChatConfig {
    fn from(cli: Cli) -> Self {
        ChatConfig::new(cli.local_port, cli.remote_host, cli.remote_port)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // usage errors exit with 1 rather than clap's default of 2
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli.into()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(config: ChatConfig) -> Result<()> {
    config.validate().context("invalid arguments")?;
    let transport = UdpTransport::bind(&config).context("failed to set up transport")?;
    let reader = ThreadedLines::stdin(config.poll_interval)
        .context("failed to start keyboard reader")?;
    let session = Session::start(reader, console::stdout(), transport)
        .context("failed to start session")?;

    let report = session.wait();
    tracing::info!(cause = %report.cause, "chat ended");
    let panicked = report.panicked().collect::<Vec<_>>();
    if !panicked.is_empty() {
        bail!("session ended by panic in: {}", panicked.join(", "));
    }
    Ok(())
}
