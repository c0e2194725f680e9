//! Application context for a crawl.
//!
//! This module provides the `App` struct that turns a validated
//! [`CrawlConfig`] into concrete tracker and renderer adapters and runs the
//! crawl through them.
//!
//! # Example
//!
//! ```no_run
//! use epic_crawler::app::App;
//! use epic_crawler::config::{ConfigFile, CrawlConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let file = ConfigFile::load(std::path::Path::new("epic-crawler.yaml")).await?;
//!     let app = App::from_config(CrawlConfig::try_from(file)?).await?;
//!     let report = app.run().await?;
//!     println!("{}", report.artifact.display());
//!     Ok(())
//! }
//! ```

use crate::config::{CrawlConfig, RenderSettings, TrackerSource};
use crate::crawl::{run_crawl, CrawlReport};
use crate::domain::EpicKey;
use crate::error::Result;
use crate::render::{DotSourceRenderer, GraphRenderPort, GraphvizRenderer, OutputFormat};
use crate::tracker::in_memory::InMemoryTracker;
use crate::tracker::jira::JiraClient;
use crate::tracker::TrackerQueryPort;

/// Wired-up crawl: a tracker, a renderer and what to crawl.
pub struct App {
    /// The tracker adapter (trait object for polymorphism)
    tracker: Box<dyn TrackerQueryPort>,

    /// The renderer adapter
    renderer: Box<dyn GraphRenderPort>,

    /// Epic to crawl
    root_epic: EpicKey,

    /// Blocker queries in flight
    concurrency: usize,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("root_epic", &self.root_epic)
            .field("concurrency", &self.concurrency)
            .field("tracker", &"<dyn TrackerQueryPort>")
            .field("renderer", &"<dyn GraphRenderPort>")
            .finish()
    }
}

/// Pick the renderer for the configured format
fn renderer_for(settings: &RenderSettings) -> Box<dyn GraphRenderPort> {
    match settings.format {
        OutputFormat::Dot => Box::new(DotSourceRenderer::new(&settings.output)),
        format => Box::new(
            GraphvizRenderer::new(&settings.output, format).with_unflatten(settings.unflatten),
        ),
    }
}

impl App {
    /// Build the adapters described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a tracker snapshot cannot be loaded.
    pub async fn from_config(config: CrawlConfig) -> Result<Self> {
        let tracker: Box<dyn TrackerQueryPort> = match &config.tracker {
            TrackerSource::Jira(settings) => {
                tracing::debug!(server = %settings.server, "Using Jira tracker");
                Box::new(JiraClient::new(settings))
            }
            TrackerSource::Snapshot(path) => {
                tracing::debug!(snapshot = %path.display(), "Using tracker snapshot");
                Box::new(InMemoryTracker::from_snapshot_file(path).await?)
            }
        };

        Ok(Self::with_adapters(
            tracker,
            renderer_for(&config.render),
            config.root_epic,
            config.concurrency,
        ))
    }

    /// Assemble an app from already-built adapters
    pub fn with_adapters(
        tracker: Box<dyn TrackerQueryPort>,
        renderer: Box<dyn GraphRenderPort>,
        root_epic: EpicKey,
        concurrency: usize,
    ) -> Self {
        Self {
            tracker,
            renderer,
            root_epic,
            concurrency,
        }
    }

    /// The epic this app crawls
    pub fn root_epic(&self) -> &EpicKey {
        &self.root_epic
    }

    /// Run the crawl and render the result.
    ///
    /// # Errors
    ///
    /// Any tracker, resolution or render failure; nothing is rendered on a
    /// tracker failure.
    pub async fn run(&self) -> Result<CrawlReport> {
        run_crawl(
            &self.root_epic,
            self.tracker.as_ref(),
            self.renderer.as_ref(),
            self.concurrency,
        )
        .await
    }
}
