//! Jira REST API v2 tracker.
//!
//! Epic membership and blocker lookups go through JQL search
//! (`/rest/api/2/search`), paged until the server reports no more results.
//! Epic titles come from a single-issue fetch (`/rest/api/2/issue/{key}`).
//!
//! `ureq` is a blocking client, so every request runs on tokio's blocking
//! pool via `spawn_blocking`.

use super::{EpicSnapshot, TrackerQueryPort};
use crate::domain::{EpicKey, Issue, IssueKey};
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;

/// Default custom field holding an issue's epic link
pub const DEFAULT_EPIC_LINK_FIELD: &str = "customfield_10014";

/// Default custom field holding an epic's display name
pub const DEFAULT_EPIC_NAME_FIELD: &str = "customfield_10011";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Results requested per search page
const SEARCH_PAGE_SIZE: usize = 100;

/// Connection settings for a Jira site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraSettings {
    /// Base URL, e.g. `https://example.atlassian.net`
    pub server: String,
    /// Account used for basic auth (usually an email address)
    pub account: String,
    /// API token for `account`
    pub credential: String,
    /// Field id of the epic link on work issues
    pub epic_link_field: String,
    /// Field id of the epic name on epics
    pub epic_name_field: String,
    /// Per-request timeout
    pub timeout: Duration,
}

/// One page of `/rest/api/2/search`
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<RawIssue>,
}

/// An issue as serialized by Jira, with fields left dynamic
#[derive(Debug, Deserialize)]
struct RawIssue {
    key: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl RawIssue {
    fn string_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    fn into_issue(self, epic_link_field: &str) -> Issue {
        let status = self
            .fields
            .get("status")
            .and_then(|status| status.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let owning_epic = self
            .string_field(epic_link_field)
            .filter(|epic| !epic.is_empty())
            .map(EpicKey::from);

        Issue::new(self.key, status, owning_epic)
    }
}

/// Tracker backed by a Jira site
#[derive(Clone)]
pub struct JiraClient {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
    epic_link_field: String,
    epic_name_field: String,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("epic_link_field", &self.epic_link_field)
            .field("epic_name_field", &self.epic_name_field)
            .field("authorization", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Create a client for the given site
    pub fn new(settings: &JiraSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.timeout)
            .user_agent(concat!("epic-crawler/", env!("CARGO_PKG_VERSION")))
            .build();
        let token = STANDARD.encode(format!("{}:{}", settings.account, settings.credential));

        Self {
            agent,
            base_url: settings.server.trim_end_matches('/').to_string(),
            authorization: format!("Basic {token}"),
            epic_link_field: settings.epic_link_field.clone(),
            epic_name_field: settings.epic_name_field.clone(),
        }
    }

    /// Run a JQL search and collect every page
    async fn search(&self, jql: String) -> Result<Vec<Issue>> {
        let fields = format!("status,{}", self.epic_link_field);
        let mut issues = Vec::new();
        let mut start_at = 0usize;

        loop {
            let query = vec![
                ("jql", jql.clone()),
                ("fields", fields.clone()),
                ("startAt", start_at.to_string()),
                ("maxResults", SEARCH_PAGE_SIZE.to_string()),
            ];
            let page: SearchPage = self
                .get_json("/rest/api/2/search", query, &jql)
                .await?
                .ok_or_else(|| Error::tracker(&jql, "search endpoint returned 404"))?;

            let received = page.issues.len();
            issues.extend(
                page.issues
                    .into_iter()
                    .map(|raw| raw.into_issue(&self.epic_link_field)),
            );
            start_at += received;

            tracing::debug!(jql = %jql, received, total = page.total, "Fetched search page");
            if received == 0 || start_at >= page.total {
                break;
            }
        }

        Ok(issues)
    }

    /// GET a JSON resource. `Ok(None)` means the server answered 404.
    async fn get_json<T>(
        &self,
        path: &str,
        query: Vec<(&'static str, String)>,
        describe: &str,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = self
            .agent
            .get(&format!("{}{path}", self.base_url))
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json");
        let describe = describe.to_string();

        tokio::task::spawn_blocking(move || {
            let request = query
                .iter()
                .fold(request, |req, (name, value)| req.query(name, value));

            match request.call() {
                Ok(response) => response
                    .into_json::<T>()
                    .map(Some)
                    .map_err(|e| Error::tracker(&describe, format!("invalid response body: {e}"))),
                Err(ureq::Error::Status(404, _)) => Ok(None),
                Err(ureq::Error::Status(code, response)) => {
                    let body = response.into_string().unwrap_or_default();
                    Err(Error::tracker(
                        &describe,
                        format!("HTTP {code}: {}", body.trim()),
                    ))
                }
                Err(ureq::Error::Transport(transport)) => Err(Error::tracker(&describe, transport)),
            }
        })
        .await
        .map_err(|e| Error::tracker("blocking request task", e))?
    }
}

/// JQL selecting the members of an epic
pub fn epic_members_jql(epic: &EpicKey) -> String {
    format!("'Epic Link' = {epic}")
}

/// JQL selecting the issues that block `issue`
pub fn blockers_jql(issue: &IssueKey) -> String {
    format!("issueIsBlockedBy = {issue}")
}

/// Pick the display title out of a fetched epic: the epic name field,
/// falling back to the summary.
fn epic_title(raw: &RawIssue, epic_name_field: &str) -> Option<String> {
    raw.string_field(epic_name_field)
        .or_else(|| raw.string_field("summary"))
        .map(str::to_string)
}

#[async_trait]
impl TrackerQueryPort for JiraClient {
    async fn search_issues_by_epic(&self, epic: &EpicKey) -> Result<Vec<Issue>> {
        self.search(epic_members_jql(epic)).await
    }

    async fn search_issues_blocking(&self, issue: &IssueKey) -> Result<Vec<Issue>> {
        self.search(blockers_jql(issue)).await
    }

    async fn fetch_epic(&self, epic: &EpicKey) -> Result<EpicSnapshot> {
        let path = format!("/rest/api/2/issue/{epic}");
        let query = vec![("fields", format!("{},summary", self.epic_name_field))];

        let raw: RawIssue = self
            .get_json(&path, query, &format!("epic {epic}"))
            .await?
            .ok_or_else(|| Error::EpicNotFound(epic.clone()))?;

        Ok(EpicSnapshot {
            key: epic.clone(),
            title: epic_title(&raw, &self.epic_name_field),
        })
    }
}
