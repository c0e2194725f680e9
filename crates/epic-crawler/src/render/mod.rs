//! Rendering of assembled graphs into files.
//!
//! Renderers sit behind [`GraphRenderPort`] so the crawl never depends on a
//! particular layout engine:
//!
//! - [`GraphvizRenderer`]: writes the DOT source, runs the `unflatten`
//!   pre-pass, then `dot -T<format>` to produce an image
//! - [`DotSourceRenderer`]: writes the DOT source only
//!
//! A renderer produces exactly one artifact or fails; partially written
//! images are never reported as success. `GraphvizRenderer` stages the DOT
//! source beside the output and moves it into place only after `dot`
//! succeeds, so a failed layout leaves no new source behind.

use crate::error::{Error, Result};
use crate::graph::{dot, EpicGraph};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

/// Default artifact base path (the DOT source; images get an extension)
pub const DEFAULT_OUTPUT: &str = "epic_dependencies_graph";

/// Produces a file from an [`EpicGraph`].
#[async_trait]
pub trait GraphRenderPort: Send + Sync {
    /// Render `graph` and return the path of the produced artifact.
    ///
    /// # Errors
    ///
    /// Returns `Error::RenderFailed` if the artifact cannot be produced.
    async fn render(&self, graph: &EpicGraph) -> Result<PathBuf>;
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG image
    #[default]
    Png,
    /// SVG image
    Svg,
    /// PDF document
    Pdf,
    /// DOT source only, no layout
    Dot,
}

impl OutputFormat {
    /// Graphviz `-T` name and file extension
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
            Self::Dot => "dot",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

async fn write_source(path: &Path, graph: &EpicGraph) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, dot::to_dot(graph)).await?;
    Ok(())
}

/// Writes the DOT source and nothing else
#[derive(Debug, Clone)]
pub struct DotSourceRenderer {
    output: PathBuf,
}

impl DotSourceRenderer {
    /// Write the DOT source to `output`
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

#[async_trait]
impl GraphRenderPort for DotSourceRenderer {
    async fn render(&self, graph: &EpicGraph) -> Result<PathBuf> {
        write_source(&self.output, graph)
            .await
            .map_err(|e| Error::RenderFailed(format!("writing {}: {e}", self.output.display())))?;
        Ok(self.output.clone())
    }
}

/// Renders through the Graphviz command-line tools
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    output: PathBuf,
    format: OutputFormat,
    unflatten: bool,
    dot_program: PathBuf,
    unflatten_program: PathBuf,
}

impl GraphvizRenderer {
    /// Render to `<output>.<format>`, keeping the DOT source at `output`
    pub fn new(output: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            output: output.into(),
            format,
            unflatten: true,
            dot_program: PathBuf::from("dot"),
            unflatten_program: PathBuf::from("unflatten"),
        }
    }

    /// Enable or disable the `unflatten` pre-pass
    #[must_use]
    pub fn with_unflatten(mut self, unflatten: bool) -> Self {
        self.unflatten = unflatten;
        self
    }

    /// Use specific `dot` and `unflatten` executables
    #[must_use]
    pub fn with_programs(mut self, dot: impl Into<PathBuf>, unflatten: impl Into<PathBuf>) -> Self {
        self.dot_program = dot.into();
        self.unflatten_program = unflatten.into();
        self
    }

    /// Path of the image this renderer produces
    pub fn image_path(&self) -> PathBuf {
        let mut name = self.output.clone().into_os_string();
        name.push(".");
        name.push(self.format.as_str());
        PathBuf::from(name)
    }

    /// Path of the DOT source this renderer writes
    pub fn source_path(&self) -> &Path {
        &self.output
    }

    /// Where the source lives until layout succeeds
    fn staging_path(&self) -> PathBuf {
        let mut name = self.output.clone().into_os_string();
        name.push(".partial");
        PathBuf::from(name)
    }

    /// Write `graph` to `source`, run the pre-pass and lay it out
    async fn render_from(&self, source: &Path, graph: &EpicGraph) -> Result<PathBuf> {
        write_source(source, graph)
            .await
            .map_err(|e| Error::RenderFailed(format!("writing {}: {e}", source.display())))?;

        if self.unflatten {
            tracing::debug!(program = %self.unflatten_program.display(), "Running unflatten pre-pass");
            let unflattened = run_tool(&self.unflatten_program, [source.as_os_str()]).await?;
            fs::write(source, unflattened)
                .await
                .map_err(|e| Error::RenderFailed(format!("writing {}: {e}", source.display())))?;
        }

        let image = self.image_path();
        tracing::debug!(image = %image.display(), format = %self.format, "Running dot");
        let args: Vec<OsString> = vec![
            format!("-T{}", self.format).into(),
            "-o".into(),
            image.clone().into(),
            source.into(),
        ];
        run_tool(&self.dot_program, args).await?;

        Ok(image)
    }
}

/// Run a Graphviz tool and return its stdout
async fn run_tool<I, S>(program: &Path, args: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| Error::RenderFailed(format!("failed to run `{}`: {e}", program.display())))?;

    if !output.status.success() {
        return Err(Error::RenderFailed(format!(
            "`{}` exited with {}: {}",
            program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output.stdout)
}

#[async_trait]
impl GraphRenderPort for GraphvizRenderer {
    /// The DOT source only appears at `output` once the image exists.
    async fn render(&self, graph: &EpicGraph) -> Result<PathBuf> {
        let staging = self.staging_path();

        match self.render_from(&staging, graph).await {
            Ok(image) => {
                fs::rename(&staging, &self.output).await.map_err(|e| {
                    Error::RenderFailed(format!("moving source to {}: {e}", self.output.display()))
                })?;
                Ok(image)
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&staging).await {
                    tracing::debug!(path = %staging.display(), error = %cleanup, "No staged source to remove");
                }
                Err(err)
            }
        }
    }
}
