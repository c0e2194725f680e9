//! Domain types for epic dependency crawling.
//!
//! Issues and epics are read-only snapshots of tracker state taken during a
//! single crawl. Nothing here is ever written back to the tracker.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Tracker-assigned key of a work issue (e.g. `ISS-12`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueKey(pub String);

impl IssueKey {
    /// Create a new issue key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IssueKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Tracker-assigned key of an epic (e.g. `EPIC-1`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpicKey(pub String);

impl EpicKey {
    /// Create a new epic key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EpicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EpicKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EpicKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Snapshot of an issue as seen during traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker key, the issue's identity
    pub key: IssueKey,

    /// Workflow status label, free text (e.g. "In Progress")
    pub status: String,

    /// Epic this issue itself is classified under, if any
    pub owning_epic: Option<EpicKey>,
}

impl Issue {
    /// Create an issue snapshot
    pub fn new(key: impl Into<IssueKey>, status: impl Into<String>, owning_epic: Option<EpicKey>) -> Self {
        Self {
            key: key.into(),
            status: status.into(),
            owning_epic,
        }
    }

    /// The owning epic, if it is set and differs from `root`.
    ///
    /// Empty or whitespace-only epic keys count as absent. This is the single rule deciding
    /// both cluster membership and foreign-epic title resolution.
    pub fn foreign_epic(&self, root: &EpicKey) -> Option<&EpicKey> {
        self.owning_epic
            .as_ref()
            .filter(|epic| !epic.as_str().trim().is_empty() && *epic != root)
    }
}

/// An epic with its resolved display title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    /// Tracker key
    pub key: EpicKey,

    /// Human-readable title
    pub title: String,
}

impl Epic {
    /// Create an epic record
    pub fn new(key: impl Into<EpicKey>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
        }
    }
}

/// One member issue and the issues blocking it, in query order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    /// Member issue of the root epic
    pub source: Issue,

    /// Issues blocking `source`, duplicates preserved
    pub blockers: Vec<Issue>,
}

/// Insertion-ordered mapping from member issue to its blockers.
///
/// Keyed by issue key. Inserting a key that already exists keeps the
/// original position and replaces the snapshot and blocker list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    entries: Vec<DependencyEntry>,
    index: HashMap<IssueKey, usize>,
}

impl DependencyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the blockers of `source`
    pub fn insert(&mut self, source: Issue, blockers: Vec<Issue>) {
        if let Some(&position) = self.index.get(&source.key) {
            self.entries[position] = DependencyEntry { source, blockers };
        } else {
            self.index.insert(source.key.clone(), self.entries.len());
            self.entries.push(DependencyEntry { source, blockers });
        }
    }

    /// Look up the blockers recorded for a member issue
    pub fn blockers_of(&self, key: &IssueKey) -> Option<&[Issue]> {
        self.index
            .get(key)
            .map(|&position| self.entries[position].blockers.as_slice())
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &DependencyEntry> {
        self.entries.iter()
    }

    /// Iterate every blocker of every entry, in map order
    pub fn all_blockers(&self) -> impl Iterator<Item = &Issue> {
        self.entries.iter().flat_map(|entry| entry.blockers.iter())
    }

    /// Number of distinct member issues
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a DependencyMap {
    type Item = &'a DependencyEntry;
    type IntoIter = std::slice::Iter<'a, DependencyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn issue(key: &str, epic: Option<&str>) -> Issue {
        Issue::new(key, "Open", epic.map(EpicKey::from))
    }

    #[rstest]
    #[case::root_member(Some("EPIC-1"), None)]
    #[case::foreign(Some("EPIC-2"), Some("EPIC-2"))]
    #[case::no_epic(None, None)]
    #[case::empty_epic(Some(""), None)]
    #[case::blank_epic(Some("  "), None)]
    fn test_foreign_epic(#[case] owning: Option<&str>, #[case] expected: Option<&str>) {
        let root = EpicKey::from("EPIC-1");
        let issue = issue("ISS-1", owning);
        assert_eq!(
            issue.foreign_epic(&root).map(EpicKey::as_str),
            expected
        );
    }

    #[test]
    fn test_dependency_map_preserves_insertion_order() {
        let mut map = DependencyMap::new();
        map.insert(issue("ISS-3", None), vec![]);
        map.insert(issue("ISS-1", None), vec![]);
        map.insert(issue("ISS-2", None), vec![]);

        let keys: Vec<_> = map.iter().map(|e| e.source.key.as_str()).collect();
        assert_eq!(keys, vec!["ISS-3", "ISS-1", "ISS-2"]);
    }

    #[test]
    fn test_dependency_map_duplicate_key_collapses() {
        let mut map = DependencyMap::new();
        map.insert(issue("ISS-1", None), vec![issue("ISS-8", None)]);
        map.insert(issue("ISS-2", None), vec![]);
        map.insert(issue("ISS-1", None), vec![issue("ISS-9", None)]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.iter().next().unwrap().source.key.as_str(), "ISS-1");
        let blockers = map.blockers_of(&IssueKey::from("ISS-1")).unwrap();
        assert_eq!(blockers.len(), 1);
        assert_eq!(blockers[0].key.as_str(), "ISS-9");
    }

    #[test]
    fn test_dependency_map_keeps_duplicate_blockers() {
        let mut map = DependencyMap::new();
        map.insert(
            issue("ISS-1", None),
            vec![issue("ISS-9", None), issue("ISS-9", None)],
        );

        assert_eq!(map.all_blockers().count(), 2);
    }

    #[test]
    fn test_issue_key_serializes_transparently() {
        let json = serde_json::to_string(&IssueKey::from("ISS-1")).unwrap();
        assert_eq!(json, "\"ISS-1\"");
    }
}
