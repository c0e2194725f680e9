//! Configuration for a crawl.
//!
//! Every configuration source (CLI flags, environment variables, the YAML
//! config file) produces a [`ConfigFile`]-shaped layer. Layers are merged
//! with [`ConfigFile::merge`], higher precedence first, and the result is
//! validated into a [`CrawlConfig`].
//!
//! # File format
//!
//! ```yaml
//! server: https://example.atlassian.net
//! account: me@example.com
//! credential: <api token>
//! root-epic: EPIC-1
//! epic-link-field: customfield_10014
//! epic-name-field: customfield_10011
//! output: epic_dependencies_graph
//! format: png
//! timeout-secs: 30
//! concurrency: 1
//! ```

use crate::domain::EpicKey;
use crate::error::{Error, Result};
use crate::render::{OutputFormat, DEFAULT_OUTPUT};
use crate::tracker::jira::{
    JiraSettings, DEFAULT_EPIC_LINK_FIELD, DEFAULT_EPIC_NAME_FIELD, DEFAULT_TIMEOUT,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "epic-crawler.yaml";

/// Maximum number of blocker queries allowed in flight
pub const MAX_CONCURRENCY: usize = 16;

/// One layer of optional configuration values
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    /// Tracker base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Account identifier for authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// API credential for `account`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,

    /// Root epic to crawl
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_epic: Option<String>,

    /// Field holding an issue's epic link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_link_field: Option<String>,

    /// Field holding an epic's name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_name_field: Option<String>,

    /// Artifact base path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Artifact format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Blocker queries in flight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Whether to run the `unflatten` pre-pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unflatten: Option<bool>,

    /// Offline tracker snapshot to crawl instead of a server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

impl ConfigFile {
    /// Load a config file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load a config file if it exists, or an empty layer if it does not
    pub async fn load_if_exists(path: &Path) -> Result<Self> {
        if fs::try_exists(path).await? {
            Self::load(path).await
        } else {
            tracing::debug!(path = %path.display(), "No config file, skipping");
            Ok(Self::default())
        }
    }

    /// Save to a config file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, content).await?;
        Ok(())
    }

    /// Fill every unset value in `self` from `fallback`
    #[must_use]
    pub fn merge(self, fallback: Self) -> Self {
        Self {
            server: self.server.or(fallback.server),
            account: self.account.or(fallback.account),
            credential: self.credential.or(fallback.credential),
            root_epic: self.root_epic.or(fallback.root_epic),
            epic_link_field: self.epic_link_field.or(fallback.epic_link_field),
            epic_name_field: self.epic_name_field.or(fallback.epic_name_field),
            output: self.output.or(fallback.output),
            format: self.format.or(fallback.format),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
            concurrency: self.concurrency.or(fallback.concurrency),
            unflatten: self.unflatten.or(fallback.unflatten),
            snapshot: self.snapshot.or(fallback.snapshot),
        }
    }
}

/// Where issues are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerSource {
    /// A live Jira site
    Jira(JiraSettings),
    /// A JSON snapshot file
    Snapshot(PathBuf),
}

/// How the graph is written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    /// Artifact base path
    pub output: PathBuf,
    /// Artifact format
    pub format: OutputFormat,
    /// Whether to run the `unflatten` pre-pass
    pub unflatten: bool,
}

/// Validated configuration for one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Issue source
    pub tracker: TrackerSource,
    /// Epic to start from
    pub root_epic: EpicKey,
    /// Output settings
    pub render: RenderSettings,
    /// Blocker queries in flight
    pub concurrency: usize,
}

/// Treat blank strings as unset
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(value: Option<String>, name: &'static str) -> Result<String> {
    present(value).ok_or(Error::ConfigurationMissing(name))
}

/// Validate an epic key.
///
/// Expected format: `PROJECT-NUMBER` where the project is a letter followed
/// by letters, digits or underscores, and the number is 1+ digits. Keys end
/// up inside JQL, so nothing else is accepted.
pub fn validate_epic_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::Config("Epic key cannot be empty".to_string()));
    }

    let Some((project, number)) = key.rsplit_once('-') else {
        return Err(Error::Config(format!(
            "Invalid epic key: '{key}'. Expected format: PROJECT-NUMBER (e.g., EPIC-42)"
        )));
    };

    let mut chars = project.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(Error::Config(format!(
            "Epic key project '{project}' must start with a letter"
        )));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::Config(format!(
            "Epic key project '{project}' must contain only letters, digits and underscores"
        )));
    }

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Config(format!(
            "Epic key number '{number}' must be digits"
        )));
    }

    Ok(())
}

/// Validate a tracker server URL and return it without a trailing slash.
///
/// Must be an absolute `http` or `https` URL with a host.
pub fn validate_server_url(url: &str) -> Result<String> {
    let host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| {
            Error::Config(format!(
                "Server URL must start with http:// or https://, got '{url}'"
            ))
        })?;

    if host.trim_end_matches('/').is_empty() {
        return Err(Error::Config("Server URL must include a host".to_string()));
    }
    if host.chars().any(char::is_whitespace) {
        return Err(Error::Config(
            "Server URL cannot contain whitespace".to_string(),
        ));
    }

    Ok(url.trim_end_matches('/').to_string())
}

impl TryFrom<ConfigFile> for CrawlConfig {
    type Error = Error;

    fn try_from(file: ConfigFile) -> Result<Self> {
        let root_epic = require(file.root_epic, "root epic")?;
        validate_epic_key(&root_epic)?;
        let root_epic = EpicKey::new(root_epic);

        if file.timeout_secs == Some(0) {
            return Err(Error::Config(
                "timeout-secs must be at least 1".to_string(),
            ));
        }

        let tracker = match file.snapshot {
            Some(path) => TrackerSource::Snapshot(path),
            None => TrackerSource::Jira(JiraSettings {
                server: validate_server_url(&require(file.server, "server")?)?,
                account: require(file.account, "account")?,
                credential: require(file.credential, "credential")?,
                epic_link_field: present(file.epic_link_field)
                    .unwrap_or_else(|| DEFAULT_EPIC_LINK_FIELD.to_string()),
                epic_name_field: present(file.epic_name_field)
                    .unwrap_or_else(|| DEFAULT_EPIC_NAME_FIELD.to_string()),
                timeout: file
                    .timeout_secs
                    .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            }),
        };

        let concurrency = file.concurrency.unwrap_or(1);
        if concurrency == 0 || concurrency > MAX_CONCURRENCY {
            return Err(Error::Config(format!(
                "concurrency must be between 1 and {MAX_CONCURRENCY}, got {concurrency}"
            )));
        }

        Ok(Self {
            tracker,
            root_epic,
            render: RenderSettings {
                output: file.output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
                format: file.format.unwrap_or_default(),
                unflatten: file.unflatten.unwrap_or(true),
            },
            concurrency,
        })
    }
}
