//! CLI argument parsing and command dispatch.
//!
//! Without a subcommand the binary runs a crawl. Settings come from flags,
//! environment variables and the config file, in that order of precedence.
//!
//! # Commands
//!
//! - (none): Crawl the root epic and render its dependency graph
//! - `init`: Write the given settings to a config file
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format
//!
//! # Example
//!
//! ```bash
//! epic-crawler --server https://example.atlassian.net --account me@example.com \
//!     --api-token "$TOKEN" --epic EPIC-42 --format svg
//! EPIC_ISSUE=EPIC-42 epic-crawler --json
//! epic-crawler init --server https://example.atlassian.net --epic EPIC-42
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{InitArgs, SettingsArgs};

// Re-export types
pub use types::OutputFormatArg;

// Re-export validators for external use
pub use validators::{validate_concurrency, validate_epic_key, validate_server_url};

/// Epic Crawler - dependency graphs for Jira epics
///
/// Collects an epic's issues and everything blocking them, then renders the
/// result with Graphviz. Blockers from other epics are grouped per epic.
#[derive(Parser, Debug)]
#[command(name = "epic-crawler")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Crawl settings
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a config file
    ///
    /// Saves the given settings to `epic-crawler.yaml` (or `--config`) so
    /// later crawls need no flags. Refuses to overwrite without `--force`.
    Init(InitArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args, output_mode).await,
            None => execute::execute_crawl(&self.settings, output_mode).await,
        }
    }
}
