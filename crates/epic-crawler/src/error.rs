//! Error types for epic-crawler operations.

use crate::domain::EpicKey;
use std::io;
use thiserror::Error;

/// The error type for crawl, assembly and render operations.
///
/// Every variant aborts the run: nothing in the crawler recovers from an
/// error or produces a partial graph.
#[derive(Debug, Error)]
pub enum Error {
    /// A required configuration value was not supplied by any source.
    #[error("Missing configuration value: {0} (set it with a flag, environment variable, or config file)")]
    ConfigurationMissing(&'static str),

    /// A tracker call failed (network, authentication, or query syntax).
    #[error("Tracker query failed for {query}: {reason}")]
    TrackerQueryFailed {
        /// The query or resource that was being requested.
        query: String,
        /// What went wrong.
        reason: String,
    },

    /// An epic key did not resolve to an existing epic.
    #[error("Epic not found: {0}")]
    EpicNotFound(EpicKey),

    /// The rendering engine could not produce the artifact.
    #[error("Render failed: {0}")]
    RenderFailed(String),

    /// Malformed configuration file or value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a [`Error::TrackerQueryFailed`] from a query description and any displayable reason.
    pub fn tracker(query: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::TrackerQueryFailed {
            query: query.into(),
            reason: reason.to_string(),
        }
    }
}

/// A specialized Result type for epic-crawler operations.
pub type Result<T> = std::result::Result<T, Error>;
