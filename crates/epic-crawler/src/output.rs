//! Output formatting for the CLI.
//!
//! Results are printed either as human-readable text or as JSON for
//! programmatic use. Logs go to stderr, so stdout carries only this output.

use crate::crawl::CrawlReport;
use colored::Colorize;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Whether text output may use colors.
///
/// Respects `NO_COLOR` (https://no-color.org/).
fn use_colors() -> bool {
    env::var_os("NO_COLOR").is_none()
}

fn success(text: &str, colors: bool) -> String {
    if colors {
        text.green().bold().to_string()
    } else {
        text.to_string()
    }
}

fn dimmed(text: &str, colors: bool) -> String {
    if colors {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{json}")
}

fn write_report_text<W: Write>(w: &mut W, report: &CrawlReport, colors: bool) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        success("Rendered", colors),
        report.artifact.display()
    )?;
    writeln!(w, "  Epic: {} ({})", report.root_epic, report.title)?;
    writeln!(
        w,
        "  {}",
        dimmed(
            &format!(
                "{} issues, {} blocking links, {} foreign epics",
                report.nodes, report.edges, report.clusters
            ),
            colors
        )
    )
}

/// Print a crawl summary in the specified format
pub fn print_report(report: &CrawlReport, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_report_text(&mut handle, report, use_colors()),
        OutputMode::Json => write_json(&mut handle, report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report() -> CrawlReport {
        CrawlReport {
            artifact: PathBuf::from("epic_dependencies_graph.png"),
            root_epic: "EPIC-1".to_string(),
            title: "Launch".to_string(),
            nodes: 3,
            edges: 2,
            clusters: 1,
            epic_fetches: 2,
        }
    }

    #[test]
    fn test_report_text_without_colors() {
        let mut buf = Vec::new();
        write_report_text(&mut buf, &report(), false).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Rendered epic_dependencies_graph.png\n  Epic: EPIC-1 (Launch)\n  3 issues, 2 blocking links, 1 foreign epics\n"
        );
    }

    #[test]
    fn test_report_json() {
        let mut buf = Vec::new();
        write_json(&mut buf, &report()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["artifact"], "epic_dependencies_graph.png");
        assert_eq!(value["root_epic"], "EPIC-1");
        assert_eq!(value["nodes"], 3);
        assert_eq!(value["clusters"], 1);
    }
}
