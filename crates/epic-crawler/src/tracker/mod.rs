//! Tracker query abstraction.
//!
//! The crawler never talks to a concrete issue tracker directly. It only
//! depends on [`TrackerQueryPort`], which exposes the three read-only
//! queries the traversal needs:
//!
//! - members of an epic
//! - issues blocking a given issue
//! - a single epic, for its display title
//!
//! Two implementations ship with the crate:
//!
//! - [`jira::JiraClient`]: Jira REST API v2 over HTTPS
//! - [`in_memory::InMemoryTracker`]: fixed data held in memory, loadable
//!   from a JSON snapshot, with per-operation call counters
//!
//! # Example
//!
//! ```
//! use epic_crawler::domain::{EpicKey, Issue};
//! use epic_crawler::tracker::TrackerQueryPort;
//! use epic_crawler::tracker::in_memory::InMemoryTracker;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let tracker = InMemoryTracker::new()
//!         .with_epic("EPIC-1", "Launch")
//!         .with_issue(Issue::new("ISS-1", "In Progress", Some(EpicKey::from("EPIC-1"))));
//!
//!     let members = tracker.search_issues_by_epic(&EpicKey::from("EPIC-1")).await?;
//!     assert_eq!(members.len(), 1);
//!     Ok(())
//! }
//! ```

use crate::domain::{EpicKey, Issue, IssueKey};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod in_memory;
pub mod jira;

/// An epic as returned by the tracker, before title normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicSnapshot {
    /// Tracker key
    pub key: EpicKey,

    /// Display title, absent when the tracker has none recorded
    pub title: Option<String>,
}

/// Read-only query interface to an issue tracker.
///
/// Implementations must be `Send + Sync` so blocker queries can be issued
/// concurrently from a single crawl.
///
/// # Error Handling
///
/// - `Error::TrackerQueryFailed`: network, authentication, or query failure
/// - `Error::EpicNotFound`: `fetch_epic` was given a key that does not exist
///
/// Implementations never retry; the first failure is returned as-is.
#[async_trait]
pub trait TrackerQueryPort: Send + Sync {
    /// All issues whose epic membership equals `epic`, in tracker order.
    async fn search_issues_by_epic(&self, epic: &EpicKey) -> Result<Vec<Issue>>;

    /// All issues that block `issue`, in tracker order.
    ///
    /// Duplicates returned by the tracker are passed through unchanged.
    async fn search_issues_blocking(&self, issue: &IssueKey) -> Result<Vec<Issue>>;

    /// Fetch a single epic.
    ///
    /// # Errors
    ///
    /// Returns `Error::EpicNotFound` if `epic` does not resolve.
    async fn fetch_epic(&self, epic: &EpicKey) -> Result<EpicSnapshot>;
}
