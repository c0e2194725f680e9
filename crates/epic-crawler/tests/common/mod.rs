//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use epic_crawler::error::Result;
use epic_crawler::graph::{dot, EpicGraph};
use epic_crawler::render::GraphRenderPort;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;

/// Environment variables the binary reads settings from
const SETTINGS_ENV: [&str; 4] = ["SERVER", "JIRA_USERNAME", "API_TOKEN", "EPIC_ISSUE"];

/// Path of a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Run the epic-crawler binary in `dir` with a clean settings environment
pub fn run_crawler_in_dir(dir: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_epic-crawler"));
    command.args(args).current_dir(dir).env("NO_COLOR", "1");
    for var in SETTINGS_ENV {
        command.env_remove(var);
    }
    command
        .output()
        .expect("Failed to execute epic-crawler binary")
}

/// Renderer that keeps the DOT source of every graph it is given
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    rendered: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of render calls so far
    pub fn calls(&self) -> usize {
        self.rendered.lock().unwrap().len()
    }

    /// DOT source of the last rendered graph
    pub fn last(&self) -> Option<String> {
        self.rendered.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GraphRenderPort for RecordingRenderer {
    async fn render(&self, graph: &EpicGraph) -> Result<PathBuf> {
        self.rendered.lock().unwrap().push(dot::to_dot(graph));
        Ok(PathBuf::from("recorded.dot"))
    }
}
