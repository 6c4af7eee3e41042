//! CLI entry point for the biblio-export tool.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use biblio_export::{Exporter, HttpClient, TerminalPrompt};
use clap::{CommandFactory, Parser};
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let Some(biblio_url) = args.biblio_url.clone() else {
        eprintln!("{}", Args::command().render_help());
        return Ok(ExitCode::FAILURE);
    };

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let show_progress = io::stderr().is_terminal() && !args.quiet;
    let config = args.to_config(&biblio_url, show_progress);

    let exporter = Exporter::new(HttpClient::new());
    // Once a Ctrl-C listener has been registered the default SIGINT action is
    // gone for the rest of the process, so every stage listens here.
    let summary = tokio::select! {
        result = exporter.run(&config, &TerminalPrompt) => result?,
        _ = tokio::signal::ctrl_c() => {
            error!("interrupted, export aborted");
            return Ok(ExitCode::FAILURE);
        }
    };

    info!(
        pages = summary.pages_accepted,
        records = summary.records,
        attachments = summary.attachments,
        downloaded = summary.downloaded,
        bytes = summary.bytes,
        bibtex = %config.bibtex_path.display(),
        papers = %config.papers_dir.display(),
        "Finished Biblio export"
    );

    Ok(ExitCode::SUCCESS)
}
