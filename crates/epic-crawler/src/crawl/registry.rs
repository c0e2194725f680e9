//! Registry of the epics a crawl refers to.

use super::resolver::EpicTitleResolver;
use crate::domain::{DependencyMap, Epic, EpicKey};
use crate::error::Result;
use std::collections::HashMap;

/// The root epic plus every foreign epic owning at least one blocker.
///
/// Epics are kept in the order they were first referenced; the root is
/// always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicRegistry {
    epics: Vec<Epic>,
    index: HashMap<EpicKey, usize>,
}

impl EpicRegistry {
    /// A registry holding only the root epic
    pub fn with_root(root: Epic) -> Self {
        let mut index = HashMap::new();
        index.insert(root.key.clone(), 0);
        Self {
            epics: vec![root],
            index,
        }
    }

    /// Build the registry for a discovered dependency map.
    ///
    /// Walks blockers in map order and resolves each foreign epic the first
    /// time it is seen. Blockers with no epic, or owned by the root, are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Propagates the first resolution failure.
    pub async fn build(
        root: &EpicKey,
        root_title: String,
        dependencies: &DependencyMap,
        resolver: &mut EpicTitleResolver<'_>,
    ) -> Result<Self> {
        let mut registry = Self::with_root(Epic::new(root.clone(), root_title));

        for blocker in dependencies.all_blockers() {
            let Some(epic) = blocker.foreign_epic(root) else {
                continue;
            };
            if registry.contains(epic) {
                continue;
            }

            let title = resolver.resolve_title(epic).await?;
            tracing::debug!(epic = %epic, title = %title, via = %blocker.key, "Registered foreign epic");
            registry.insert(Epic::new(epic.clone(), title));
        }

        Ok(registry)
    }

    /// Register an epic. Re-registering a known key is a no-op.
    pub fn insert(&mut self, epic: Epic) {
        if !self.index.contains_key(&epic.key) {
            self.index.insert(epic.key.clone(), self.epics.len());
            self.epics.push(epic);
        }
    }

    /// The root epic
    pub fn root(&self) -> &Epic {
        &self.epics[0]
    }

    /// Look up an epic by key
    pub fn get(&self, key: &EpicKey) -> Option<&Epic> {
        self.index.get(key).map(|&position| &self.epics[position])
    }

    /// Whether `key` is registered
    pub fn contains(&self, key: &EpicKey) -> bool {
        self.index.contains_key(key)
    }

    /// Epics in registration order, root first
    pub fn iter(&self) -> impl Iterator<Item = &Epic> {
        self.epics.iter()
    }

    /// Number of registered epics, root included
    pub fn len(&self) -> usize {
        self.epics.len()
    }

    /// Always false: the root epic is always present
    pub fn is_empty(&self) -> bool {
        self.epics.is_empty()
    }
}
