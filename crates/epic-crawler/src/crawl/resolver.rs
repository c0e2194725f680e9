//! Epic title resolution with a per-run cache.

use crate::domain::EpicKey;
use crate::error::{Error, Result};
use crate::tracker::TrackerQueryPort;
use std::collections::HashMap;

/// Resolves epic display titles, fetching each distinct key at most once.
pub struct EpicTitleResolver<'a> {
    tracker: &'a dyn TrackerQueryPort,
    titles: HashMap<EpicKey, String>,
    fetches: usize,
}

impl std::fmt::Debug for EpicTitleResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpicTitleResolver")
            .field("tracker", &"<dyn TrackerQueryPort>")
            .field("titles", &self.titles)
            .field("fetches", &self.fetches)
            .finish()
    }
}

impl<'a> EpicTitleResolver<'a> {
    /// Create a resolver with an empty cache
    pub fn new(tracker: &'a dyn TrackerQueryPort) -> Self {
        Self {
            tracker,
            titles: HashMap::new(),
            fetches: 0,
        }
    }

    /// Resolve the display title of `epic`.
    ///
    /// An epic with no recorded title resolves to its own key.
    ///
    /// # Errors
    ///
    /// - `Error::EpicNotFound` if the key is empty or does not exist
    /// - `Error::TrackerQueryFailed` if the fetch itself fails
    pub async fn resolve_title(&mut self, epic: &EpicKey) -> Result<String> {
        if let Some(title) = self.titles.get(epic) {
            return Ok(title.clone());
        }
        if epic.as_str().trim().is_empty() {
            return Err(Error::EpicNotFound(epic.clone()));
        }

        tracing::debug!(epic = %epic, "Fetching epic title");
        self.fetches += 1;
        let snapshot = self.tracker.fetch_epic(epic).await?;

        let title = match snapshot.title.filter(|t| !t.trim().is_empty()) {
            Some(title) => title,
            None => {
                tracing::warn!(epic = %epic, "Epic has no title, labeling it with its key");
                epic.to_string()
            }
        };

        self.titles.insert(epic.clone(), title.clone());
        Ok(title)
    }

    /// Number of remote fetches issued so far
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }
}
