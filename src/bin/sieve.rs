// src/bin/sieve.rs

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use SpamSieve::check_logic::{build_pipeline_from_args, check_lines, check_message};
use SpamSieve::config::Args;

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize tracing subscriber. Logs go to stderr, verdicts to stdout.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")); // Default to info if RUST_LOG is not set
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if args.validate_config {
        // Building also checks blocklist files and environment variables.
        let pipeline = build_pipeline_from_args(&args).context("Invalid pipeline configuration")?;
        info!(pipeline = ?pipeline, "Configuration is valid");
        return Ok(ExitCode::SUCCESS);
    }

    let pipeline = build_pipeline_from_args(&args).context("Failed to build pipeline")?;
    info!(pipeline = ?pipeline, "Sieve starting.");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let all_passed = match &args.text {
        Some(text) => check_message(&pipeline, text, &mut out, args.json)
            .context("Failed to check message")?,
        None => {
            let stdin = io::stdin();
            check_lines(&pipeline, stdin.lock(), &mut out, args.json)
                .context("Failed to check messages from stdin")?
                .all_passed()
        }
    };
    out.flush()?;

    Ok(if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
