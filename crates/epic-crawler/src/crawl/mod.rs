//! The crawl pipeline.
//!
//! A crawl runs four steps in order, each one failing the whole run:
//!
//! 1. resolve the root epic's title ([`resolver::EpicTitleResolver`])
//! 2. discover members and their blockers ([`discover::DependencyDiscoverer`])
//! 3. register every foreign epic ([`registry::EpicRegistry`])
//! 4. assemble the graph ([`crate::graph::assemble`])
//!
//! [`run_crawl`] adds a final render step. All state (title cache,
//! registry, graph) is owned by the call and dropped when it returns.
//!
//! # Example
//!
//! ```
//! use epic_crawler::crawl::build_graph;
//! use epic_crawler::domain::{EpicKey, Issue};
//! use epic_crawler::tracker::in_memory::InMemoryTracker;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let tracker = InMemoryTracker::new()
//!         .with_epic("EPIC-1", "Launch")
//!         .with_issue(Issue::new("ISS-1", "In Progress", Some(EpicKey::from("EPIC-1"))));
//!
//!     let crawl = build_graph(&EpicKey::from("EPIC-1"), &tracker, 1).await?;
//!     assert_eq!(crawl.graph.title(), "Launch");
//!     assert_eq!(crawl.graph.node_count(), 1);
//!     Ok(())
//! }
//! ```

pub mod discover;
pub mod registry;
pub mod resolver;

use crate::domain::{DependencyMap, EpicKey};
use crate::error::Result;
use crate::graph::{assemble, EpicGraph};
use crate::render::GraphRenderPort;
use crate::tracker::TrackerQueryPort;
use discover::DependencyDiscoverer;
use registry::EpicRegistry;
use resolver::EpicTitleResolver;
use serde::Serialize;
use std::path::PathBuf;

/// Everything a crawl produced before rendering
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Members of the root epic and their blockers
    pub dependencies: DependencyMap,
    /// Root and foreign epics
    pub registry: EpicRegistry,
    /// Assembled graph
    pub graph: EpicGraph,
    /// Epic title fetches issued, root included
    pub epic_fetches: usize,
}

/// Summary of a completed, rendered crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    /// Path of the rendered artifact
    pub artifact: PathBuf,
    /// Root epic key
    pub root_epic: String,
    /// Root epic title
    pub title: String,
    /// Distinct issue nodes
    pub nodes: usize,
    /// Blocked-by edges
    pub edges: usize,
    /// Foreign-epic clusters
    pub clusters: usize,
    /// Epic title fetches issued
    pub epic_fetches: usize,
}

/// Crawl `root` and assemble its dependency graph without rendering it.
///
/// # Errors
///
/// - `Error::EpicNotFound` if the root or a foreign epic does not resolve
/// - `Error::TrackerQueryFailed` if any tracker query fails
pub async fn build_graph(
    root: &EpicKey,
    tracker: &dyn TrackerQueryPort,
    concurrency: usize,
) -> Result<CrawlOutcome> {
    let mut resolver = EpicTitleResolver::new(tracker);
    let root_title = resolver.resolve_title(root).await?;
    tracing::info!(epic = %root, title = %root_title, "Crawling epic");

    let dependencies = DependencyDiscoverer::new(tracker)
        .with_concurrency(concurrency)
        .discover(root)
        .await?;

    let registry = EpicRegistry::build(root, root_title, &dependencies, &mut resolver).await?;
    tracing::info!(
        members = dependencies.len(),
        foreign_epics = registry.len() - 1,
        "Discovery complete"
    );

    let graph = assemble(&dependencies, &registry, root)?;

    Ok(CrawlOutcome {
        dependencies,
        registry,
        graph,
        epic_fetches: resolver.fetch_count(),
    })
}

/// Crawl `root`, assemble the graph and render it.
///
/// Nothing is rendered unless every query succeeded.
///
/// # Errors
///
/// Any crawl error, or `Error::RenderFailed` from the renderer.
pub async fn run_crawl(
    root: &EpicKey,
    tracker: &dyn TrackerQueryPort,
    renderer: &dyn GraphRenderPort,
    concurrency: usize,
) -> Result<CrawlReport> {
    let outcome = build_graph(root, tracker, concurrency).await?;
    let artifact = renderer.render(&outcome.graph).await?;
    tracing::info!(artifact = %artifact.display(), "Rendered dependency graph");

    Ok(CrawlReport {
        artifact,
        root_epic: root.to_string(),
        title: outcome.graph.title().to_string(),
        nodes: outcome.graph.node_count(),
        edges: outcome.graph.edge_count(),
        clusters: outcome.graph.clusters().len(),
        epic_fetches: outcome.epic_fetches,
    })
}
