//! Epic Crawler CLI binary.

use anyhow::Result;
use epic_crawler::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the epic-crawler CLI.
///
/// Uses tokio's current_thread runtime; blocker queries overlap through
/// buffered futures rather than worker threads.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Settings in a `.env` file feed the same environment fallbacks as real
    // variables; variables already set take precedence
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        return Err(err.into());
    }

    // Controlled via RUST_LOG, e.g. RUST_LOG=epic_crawler=debug
    // Logs go to stderr so `--json` output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("epic_crawler=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting epic-crawler");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("epic-crawler completed successfully");
    Ok(())
}
