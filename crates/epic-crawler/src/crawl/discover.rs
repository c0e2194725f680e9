//! Two-level traversal: epic members, then the blockers of each member.

use crate::domain::{DependencyMap, EpicKey};
use crate::error::{Error, Result};
use crate::tracker::TrackerQueryPort;
use futures::stream::{self, StreamExt, TryStreamExt};

/// Builds the [`DependencyMap`] of a root epic.
///
/// Blocker lookups run `concurrency` at a time. Results are consumed in
/// source order regardless of completion order, so the map is the same as
/// a sequential crawl.
pub struct DependencyDiscoverer<'a> {
    tracker: &'a dyn TrackerQueryPort,
    concurrency: usize,
}

impl<'a> DependencyDiscoverer<'a> {
    /// Create a sequential discoverer
    pub fn new(tracker: &'a dyn TrackerQueryPort) -> Self {
        Self {
            tracker,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` blocker queries in flight (minimum 1)
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Discover every member issue of `root` and the issues blocking each.
    ///
    /// # Errors
    ///
    /// The first failing tracker query aborts discovery and is returned.
    pub async fn discover(&self, root: &EpicKey) -> Result<DependencyMap> {
        let tracker = self.tracker;
        let sources = tracker.search_issues_by_epic(root).await?;
        tracing::info!(epic = %root, members = sources.len(), "Found epic members");

        let lookups: Vec<_> = stream::iter(sources.into_iter().map(|source| async move {
            let blockers = tracker.search_issues_blocking(&source.key).await?;
            tracing::debug!(issue = %source.key, blockers = blockers.len(), "Found blockers");
            Ok::<_, Error>((source, blockers))
        }))
        .buffered(self.concurrency)
        .try_collect()
        .await?;

        let mut dependencies = DependencyMap::new();
        for (source, blockers) in lookups {
            dependencies.insert(source, blockers);
        }
        Ok(dependencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Issue, IssueKey};
    use crate::tracker::in_memory::InMemoryTracker;
    use rstest::rstest;

    fn member(key: &str, status: &str) -> Issue {
        Issue::new(key, status, Some(EpicKey::from("EPIC-1")))
    }

    fn tracker() -> InMemoryTracker {
        InMemoryTracker::new()
            .with_epic("EPIC-1", "Launch")
            .with_issue(member("ISS-1", "Open"))
            .with_issue(member("ISS-2", "In Progress"))
            .with_issue(member("ISS-3", "Finished"))
            .with_issue(Issue::new("ISS-9", "Testing", Some(EpicKey::from("EPIC-2"))))
            .with_issue(Issue::new("ISS-8", "Open", None))
            .with_blocker("ISS-1", "ISS-9")
            .with_blocker("ISS-1", "ISS-8")
            .with_blocker("ISS-2", "ISS-9")
            .with_blocker("ISS-2", "ISS-9")
    }

    #[rstest]
    #[case::sequential(1)]
    #[case::concurrent(4)]
    #[tokio::test]
    async fn test_discover_builds_ordered_map(#[case] concurrency: usize) {
        let tracker = tracker();
        let map = DependencyDiscoverer::new(&tracker)
            .with_concurrency(concurrency)
            .discover(&EpicKey::from("EPIC-1"))
            .await
            .unwrap();

        let sources: Vec<_> = map.iter().map(|e| e.source.key.as_str()).collect();
        assert_eq!(sources, vec!["ISS-1", "ISS-2", "ISS-3"]);

        let iss1: Vec<_> = map
            .blockers_of(&IssueKey::from("ISS-1"))
            .unwrap()
            .iter()
            .map(|i| i.key.as_str())
            .collect();
        assert_eq!(iss1, vec!["ISS-9", "ISS-8"]);

        // Duplicates returned by the tracker are kept
        assert_eq!(map.blockers_of(&IssueKey::from("ISS-2")).unwrap().len(), 2);
        assert!(map.blockers_of(&IssueKey::from("ISS-3")).unwrap().is_empty());

        assert_eq!(tracker.epic_search_count(), 1);
        assert_eq!(tracker.blocker_search_count(), 3);
    }

    #[tokio::test]
    async fn test_blockers_keep_their_own_epic() {
        let tracker = tracker();
        let map = DependencyDiscoverer::new(&tracker)
            .discover(&EpicKey::from("EPIC-1"))
            .await
            .unwrap();

        let blockers = map.blockers_of(&IssueKey::from("ISS-1")).unwrap();
        assert_eq!(blockers[0].owning_epic, Some(EpicKey::from("EPIC-2")));
        assert_eq!(blockers[1].owning_epic, None);
    }

    #[tokio::test]
    async fn test_epic_without_members_is_empty() {
        let tracker = InMemoryTracker::new().with_epic("EPIC-5", "Empty");
        let map = DependencyDiscoverer::new(&tracker)
            .discover(&EpicKey::from("EPIC-5"))
            .await
            .unwrap();

        assert!(map.is_empty());
        assert_eq!(tracker.blocker_search_count(), 0);
    }

    #[tokio::test]
    async fn test_query_failure_aborts_discovery() {
        let tracker = tracker().with_failing_blocker_query("ISS-2");
        let err = DependencyDiscoverer::new(&tracker)
            .discover(&EpicKey::from("EPIC-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TrackerQueryFailed { .. }));
        assert!(err.to_string().contains("ISS-2"));
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let tracker = InMemoryTracker::new();
        let discoverer = DependencyDiscoverer::new(&tracker).with_concurrency(0);
        assert_eq!(discoverer.concurrency, 1);
    }
}
