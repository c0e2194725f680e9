//! Command execution.

use anyhow::{bail, Context, Result};

use super::args::{InitArgs, SettingsArgs};
use crate::app::App;
use crate::config::{ConfigFile, CrawlConfig};
use crate::output::{self, OutputMode};

/// Merge command-line settings over the config file
async fn resolve_settings(settings: &SettingsArgs) -> Result<ConfigFile> {
    let path = settings.config_path();

    // An explicitly named config file must exist
    let file = if settings.config.is_some() {
        ConfigFile::load(&path)
            .await
            .with_context(|| format!("Failed to load config file {}", path.display()))?
    } else {
        ConfigFile::load_if_exists(&path).await?
    };

    Ok(settings.to_layer().merge(file))
}

/// Execute a crawl
pub async fn execute_crawl(settings: &SettingsArgs, output_mode: OutputMode) -> Result<()> {
    let config = CrawlConfig::try_from(resolve_settings(settings).await?)?;
    tracing::debug!(epic = %config.root_epic, format = %config.render.format, "Configuration resolved");

    let app = App::from_config(config).await?;
    let report = app.run().await?;

    output::print_report(&report, output_mode)?;
    Ok(())
}

/// Execute the init command
pub async fn execute_init(args: &InitArgs, output_mode: OutputMode) -> Result<()> {
    let path = args.settings.config_path();

    if !args.force && tokio::fs::try_exists(&path).await? {
        bail!(
            "Config file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let layer = args.settings.to_layer();
    layer
        .save(&path)
        .await
        .with_context(|| format!("Failed to write config file {}", path.display()))?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "config_file": path.display().to_string(),
        }))?,
        OutputMode::Text if !args.quiet => {
            println!("Wrote {}", path.display());
            if layer.credential.is_some() {
                println!("  The file contains an API token; keep it out of version control.");
            }
        }
        OutputMode::Text => {}
    }

    Ok(())
}
