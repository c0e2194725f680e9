//! CLI argument structs.
//!
//! Crawl settings are shared between the default crawl and `init`, so they
//! live in one flattened [`SettingsArgs`] struct.

use clap::Parser;
use std::path::PathBuf;

use super::types::OutputFormatArg;
use super::validators::{validate_concurrency, validate_epic_key, validate_server_url};
use crate::config::{ConfigFile, CONFIG_FILE_NAME};

/// Settings accepted as flags or environment variables
#[derive(Parser, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Config file to read (or write, for `init`)
    ///
    /// Defaults to `epic-crawler.yaml` in the working directory. A missing
    /// default file is not an error.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Jira server URL (e.g., https://example.atlassian.net)
    #[arg(long, env = "SERVER", value_parser = validate_server_url)]
    pub server: Option<String>,

    /// Account used to authenticate
    #[arg(long, env = "JIRA_USERNAME")]
    pub account: Option<String>,

    /// API token for the account
    #[arg(long = "api-token", env = "API_TOKEN", hide_env_values = true)]
    pub credential: Option<String>,

    /// Root epic to crawl (e.g., EPIC-42)
    #[arg(short, long, env = "EPIC_ISSUE", value_parser = validate_epic_key)]
    pub epic: Option<String>,

    /// Issue field holding the epic link
    #[arg(long, value_name = "FIELD")]
    pub epic_link_field: Option<String>,

    /// Issue field holding the epic name
    #[arg(long, value_name = "FIELD")]
    pub epic_name_field: Option<String>,

    /// Output path for the DOT source; images get the format as extension
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Blocker queries in flight (1-16)
    #[arg(long, value_parser = validate_concurrency)]
    pub concurrency: Option<usize>,

    /// Crawl a JSON tracker snapshot instead of a server
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Skip the `unflatten` pre-pass before layout
    #[arg(long)]
    pub no_unflatten: bool,
}

impl SettingsArgs {
    /// Path of the config file these settings refer to
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// The values given on the command line or through the environment
    pub fn to_layer(&self) -> ConfigFile {
        ConfigFile {
            server: self.server.clone(),
            account: self.account.clone(),
            credential: self.credential.clone(),
            root_epic: self.epic.clone(),
            epic_link_field: self.epic_link_field.clone(),
            epic_name_field: self.epic_name_field.clone(),
            output: self.output.clone(),
            format: self.format.map(Into::into),
            timeout_secs: self.timeout,
            concurrency: self.concurrency,
            unflatten: self.no_unflatten.then_some(false),
            snapshot: self.snapshot.clone(),
        }
    }
}

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Settings to write
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}
