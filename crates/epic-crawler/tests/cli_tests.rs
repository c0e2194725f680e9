//! Integration tests for the epic-crawler binary.

mod common;

use common::{fixture_path, run_crawler_in_dir};
use tempfile::TempDir;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_settings() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_crawler_in_dir(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let help = stdout(&output);
    assert!(help.contains("--epic"));
    assert!(help.contains("--api-token"));
    assert!(help.contains("init"));
}

#[test]
fn test_missing_configuration_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_crawler_in_dir(temp_dir.path(), &[]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Missing configuration value"));
    assert!(!temp_dir.path().join("epic_dependencies_graph").exists());
}

#[test]
fn test_missing_credentials_without_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_crawler_in_dir(
        temp_dir.path(),
        &["--epic", "EPIC-1", "--server", "https://example.atlassian.net"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("account"));
}

#[test]
fn test_invalid_epic_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_crawler_in_dir(temp_dir.path(), &["--epic", "EPIC"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Expected format"));
}

#[test]
fn test_snapshot_crawl_json_report() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = fixture_path("launch.json");
    let graph_path = temp_dir.path().join("graph.dot");

    let output = run_crawler_in_dir(
        temp_dir.path(),
        &[
            "--json",
            "--snapshot",
            snapshot.to_str().unwrap(),
            "--epic",
            "EPIC-1",
            "--format",
            "dot",
            "--output",
            graph_path.to_str().unwrap(),
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["title"], "Launch");
    assert_eq!(report["nodes"], 6);
    assert_eq!(report["edges"], 5);
    assert_eq!(report["clusters"], 2);

    let dot = std::fs::read_to_string(&graph_path).unwrap();
    assert!(dot.starts_with("digraph epic_dependencies {"));
    assert!(dot.contains("label=\"Infra\";"));
}

#[test]
fn test_dotenv_file_supplies_settings() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = fixture_path("launch.json");
    std::fs::write(temp_dir.path().join(".env"), "EPIC_ISSUE=EPIC-1\n").unwrap();

    let output = run_crawler_in_dir(
        temp_dir.path(),
        &[
            "--json",
            "--snapshot",
            snapshot.to_str().unwrap(),
            "--format",
            "dot",
            "--output",
            "graph.dot",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["root_epic"], "EPIC-1");
    assert!(temp_dir.path().join("graph.dot").exists());
}

#[test]
fn test_flags_override_dotenv_file() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = fixture_path("launch.json");
    std::fs::write(temp_dir.path().join(".env"), "EPIC_ISSUE=EPIC-1\n").unwrap();

    let output = run_crawler_in_dir(
        temp_dir.path(),
        &[
            "--json",
            "--snapshot",
            snapshot.to_str().unwrap(),
            "--epic",
            "EPIC-2",
            "--format",
            "dot",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["title"], "Infra");
}

#[test]
fn test_snapshot_unknown_epic_fails() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = fixture_path("launch.json");

    let output = run_crawler_in_dir(
        temp_dir.path(),
        &[
            "--snapshot",
            snapshot.to_str().unwrap(),
            "--epic",
            "EPIC-99",
            "--format",
            "dot",
        ],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Epic not found: EPIC-99"));
    assert!(!temp_dir.path().join("epic_dependencies_graph").exists());
}

#[test]
fn test_init_then_crawl_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = fixture_path("launch.json");

    let init = run_crawler_in_dir(
        temp_dir.path(),
        &[
            "init",
            "--snapshot",
            snapshot.to_str().unwrap(),
            "--epic",
            "EPIC-1",
            "--format",
            "dot",
            "--output",
            "graph.dot",
        ],
    );
    assert!(init.status.success(), "stderr: {}", stderr(&init));
    assert!(temp_dir.path().join("epic-crawler.yaml").exists());

    let crawl = run_crawler_in_dir(temp_dir.path(), &[]);
    assert!(crawl.status.success(), "stderr: {}", stderr(&crawl));
    assert!(stdout(&crawl).contains("Rendered graph.dot"));
    assert!(temp_dir.path().join("graph.dot").exists());

    // Flags take precedence over the file
    let flagged = run_crawler_in_dir(temp_dir.path(), &["--epic", "EPIC-2", "--json"]);
    assert!(flagged.status.success(), "stderr: {}", stderr(&flagged));
    let report: serde_json::Value = serde_json::from_str(&stdout(&flagged)).unwrap();
    assert_eq!(report["root_epic"], "EPIC-2");
    assert_eq!(report["title"], "Infra");
}

#[test]
fn test_init_refuses_overwrite() {
    let temp_dir = TempDir::new().unwrap();

    let first = run_crawler_in_dir(temp_dir.path(), &["init", "--epic", "EPIC-1", "-q"]);
    assert!(first.status.success());

    let second = run_crawler_in_dir(temp_dir.path(), &["init", "--epic", "EPIC-2"]);
    assert!(!second.status.success());
    assert!(stderr(&second).contains("already exists"));

    let forced = run_crawler_in_dir(temp_dir.path(), &["init", "--epic", "EPIC-2", "--force"]);
    assert!(forced.status.success());
    let content = std::fs::read_to_string(temp_dir.path().join("epic-crawler.yaml")).unwrap();
    assert!(content.contains("root-epic: EPIC-2"));
}
