//! In-memory tracker backed by fixed data.
//!
//! Useful for offline crawls from a saved JSON snapshot and for tests that
//! need to observe how often each query was issued.
//!
//! # Snapshot format
//!
//! ```json
//! {
//!   "epics": [{ "key": "EPIC-1", "title": "Launch" }, { "key": "EPIC-2", "title": "Infra" }],
//!   "issues": [
//!     { "key": "ISS-1", "status": "In Progress", "epic": "EPIC-1", "blocked_by": ["ISS-9"] },
//!     { "key": "ISS-9", "status": "Testing", "epic": "EPIC-2" }
//!   ]
//! }
//! ```

use super::{EpicSnapshot, TrackerQueryPort};
use crate::domain::{EpicKey, Issue, IssueKey};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Snapshot file contents
#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    epics: Vec<SnapshotEpic>,
    #[serde(default)]
    issues: Vec<SnapshotIssue>,
}

#[derive(Debug, Deserialize)]
struct SnapshotEpic {
    key: EpicKey,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SnapshotIssue {
    key: IssueKey,
    status: String,
    epic: Option<EpicKey>,
    #[serde(default)]
    blocked_by: Vec<IssueKey>,
}

/// Tracker holding issues, blocker links and epics in memory.
///
/// Query results follow insertion order. Every call is counted, and
/// `fetch_epic` calls are additionally counted per epic key.
#[derive(Debug, Default)]
pub struct InMemoryTracker {
    issues: Vec<Issue>,
    blocked_by: HashMap<IssueKey, Vec<IssueKey>>,
    epics: HashMap<EpicKey, Option<String>>,
    failing_blocker_queries: HashSet<IssueKey>,
    epic_searches: AtomicUsize,
    blocker_searches: AtomicUsize,
    epic_fetches: Mutex<HashMap<EpicKey, usize>>,
}

impl InMemoryTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a tracker from a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid snapshot.
    pub async fn from_snapshot_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_snapshot_json(&content)
    }

    /// Build a tracker from snapshot JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the text is not a valid snapshot.
    pub fn from_snapshot_json(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        let mut tracker = Self::new();

        for epic in snapshot.epics {
            tracker.epics.insert(epic.key, epic.title);
        }
        for issue in snapshot.issues {
            if !issue.blocked_by.is_empty() {
                tracker
                    .blocked_by
                    .insert(issue.key.clone(), issue.blocked_by);
            }
            tracker
                .issues
                .push(Issue::new(issue.key, issue.status, issue.epic));
        }

        tracing::debug!(
            issues = tracker.issues.len(),
            epics = tracker.epics.len(),
            "Loaded tracker snapshot"
        );
        Ok(tracker)
    }

    /// Add an issue
    #[must_use]
    pub fn with_issue(mut self, issue: Issue) -> Self {
        self.issues.push(issue);
        self
    }

    /// Record that `blocker` blocks `blocked`. Repeating a pair makes the
    /// blocker query return it twice.
    #[must_use]
    pub fn with_blocker(mut self, blocked: &str, blocker: &str) -> Self {
        self.blocked_by
            .entry(IssueKey::from(blocked))
            .or_default()
            .push(IssueKey::from(blocker));
        self
    }

    /// Add an epic with a title
    #[must_use]
    pub fn with_epic(mut self, key: &str, title: &str) -> Self {
        self.epics.insert(EpicKey::from(key), Some(title.to_string()));
        self
    }

    /// Add an epic that has no title recorded
    #[must_use]
    pub fn with_untitled_epic(mut self, key: &str) -> Self {
        self.epics.insert(EpicKey::from(key), None);
        self
    }

    /// Make the blocker query for `issue` fail
    #[must_use]
    pub fn with_failing_blocker_query(mut self, issue: &str) -> Self {
        self.failing_blocker_queries.insert(IssueKey::from(issue));
        self
    }

    /// Number of `search_issues_by_epic` calls so far
    pub fn epic_search_count(&self) -> usize {
        self.epic_searches.load(Ordering::SeqCst)
    }

    /// Number of `search_issues_blocking` calls so far
    pub fn blocker_search_count(&self) -> usize {
        self.blocker_searches.load(Ordering::SeqCst)
    }

    /// Number of `fetch_epic` calls so far, across all keys
    pub fn epic_fetch_count(&self) -> usize {
        self.fetches().values().sum()
    }

    /// Number of `fetch_epic` calls so far for one key
    pub fn epic_fetch_count_for(&self, key: &str) -> usize {
        self.fetches()
            .get(&EpicKey::from(key))
            .copied()
            .unwrap_or(0)
    }

    fn fetches(&self) -> std::sync::MutexGuard<'_, HashMap<EpicKey, usize>> {
        self.epic_fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn find_issue(&self, key: &IssueKey) -> Option<&Issue> {
        self.issues.iter().find(|issue| &issue.key == key)
    }
}

#[async_trait]
impl TrackerQueryPort for InMemoryTracker {
    async fn search_issues_by_epic(&self, epic: &EpicKey) -> Result<Vec<Issue>> {
        self.epic_searches.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .issues
            .iter()
            .filter(|issue| issue.owning_epic.as_ref() == Some(epic))
            .cloned()
            .collect())
    }

    async fn search_issues_blocking(&self, issue: &IssueKey) -> Result<Vec<Issue>> {
        self.blocker_searches.fetch_add(1, Ordering::SeqCst);

        if self.failing_blocker_queries.contains(issue) {
            return Err(Error::tracker(
                format!("issues blocking {issue}"),
                "simulated tracker failure",
            ));
        }

        let Some(blocker_keys) = self.blocked_by.get(issue) else {
            return Ok(Vec::new());
        };

        blocker_keys
            .iter()
            .map(|key| {
                self.find_issue(key).cloned().ok_or_else(|| {
                    Error::tracker(
                        format!("issues blocking {issue}"),
                        format!("blocker {key} is not a known issue"),
                    )
                })
            })
            .collect()
    }

    async fn fetch_epic(&self, epic: &EpicKey) -> Result<EpicSnapshot> {
        *self.fetches().entry(epic.clone()).or_insert(0) += 1;

        match self.epics.get(epic) {
            Some(title) => Ok(EpicSnapshot {
                key: epic.clone(),
                title: title.clone(),
            }),
            None => Err(Error::EpicNotFound(epic.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InMemoryTracker {
        InMemoryTracker::new()
            .with_epic("EPIC-1", "Launch")
            .with_issue(Issue::new("ISS-1", "Open", Some(EpicKey::from("EPIC-1"))))
            .with_issue(Issue::new("ISS-2", "Open", Some(EpicKey::from("EPIC-1"))))
            .with_issue(Issue::new("ISS-9", "Testing", None))
            .with_blocker("ISS-1", "ISS-9")
    }

    #[tokio::test]
    async fn test_search_by_epic_returns_members_in_order() {
        let tracker = sample();
        let members = tracker
            .search_issues_by_epic(&EpicKey::from("EPIC-1"))
            .await
            .unwrap();

        let keys: Vec<_> = members.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["ISS-1", "ISS-2"]);
        assert_eq!(tracker.epic_search_count(), 1);
    }

    #[tokio::test]
    async fn test_search_blocking_resolves_snapshots() {
        let tracker = sample();
        let blockers = tracker
            .search_issues_blocking(&IssueKey::from("ISS-1"))
            .await
            .unwrap();

        assert_eq!(blockers.len(), 1);
        assert_eq!(blockers[0].status, "Testing");
        assert!(
            tracker
                .search_issues_blocking(&IssueKey::from("ISS-2"))
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(tracker.blocker_search_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_blocker_is_query_failure() {
        let tracker = sample().with_blocker("ISS-2", "ISS-404");
        let err = tracker
            .search_issues_blocking(&IssueKey::from("ISS-2"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TrackerQueryFailed { .. }));
        assert!(err.to_string().contains("ISS-404"));
    }

    #[tokio::test]
    async fn test_fetch_epic_counts_per_key() {
        let tracker = sample();
        let epic = EpicKey::from("EPIC-1");
        tracker.fetch_epic(&epic).await.unwrap();
        tracker.fetch_epic(&epic).await.unwrap();

        assert_eq!(tracker.epic_fetch_count_for("EPIC-1"), 2);
        assert_eq!(tracker.epic_fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_missing_epic_is_not_found() {
        let tracker = sample();
        let err = tracker
            .fetch_epic(&EpicKey::from("EPIC-404"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EpicNotFound(key) if key.as_str() == "EPIC-404"));
    }

    #[test]
    fn test_snapshot_json_loading() {
        let json = r#"{
            "epics": [{ "key": "EPIC-1", "title": "Launch" }, { "key": "EPIC-3" }],
            "issues": [
                { "key": "ISS-1", "status": "Finished", "epic": "EPIC-1", "blocked_by": ["ISS-9"] },
                { "key": "ISS-9", "status": "Testing", "epic": null }
            ]
        }"#;

        let tracker = InMemoryTracker::from_snapshot_json(json).unwrap();
        assert_eq!(tracker.issues.len(), 2);
        assert_eq!(tracker.epics.get(&EpicKey::from("EPIC-3")), Some(&None));
        assert_eq!(
            tracker.blocked_by.get(&IssueKey::from("ISS-1")),
            Some(&vec![IssueKey::from("ISS-9")])
        );
    }

    #[test]
    fn test_snapshot_json_rejects_garbage() {
        let err = InMemoryTracker::from_snapshot_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
