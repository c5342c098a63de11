use std::fs::{self, File};

use clap::Parser;
use conduit_cli::{AnnounceFormat, Cli, RunMode, config, run_adapters};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn definitions_for(dir: &std::path::Path) -> String {
    format!(
        r#"
        [[adapter]]
        type = "file-source"
        id = "csv-inbox"
        directory = '{dir}'
        filter = "*.csv"

        [[adapter]]
        type = "file-source"
        id = "everything"
        directory = '{dir}'
        "#,
        dir = dir.display()
    )
}

#[tokio::test]
async fn once_mode_polls_each_adapter_once() {
    let dir = TempDir::new().unwrap();
    File::create(dir.path().join("a.txt")).unwrap();
    File::create(dir.path().join("b.csv")).unwrap();

    let definitions = config::parse(&definitions_for(dir.path())).unwrap();
    let summary = run_adapters(definitions, RunMode::Once, AnnounceFormat::Log)
        .await
        .unwrap();

    assert_eq!(
        summary,
        vec![("csv-inbox".to_string(), 1), ("everything".to_string(), 2)]
    );
}

#[tokio::test]
async fn unknown_adapter_type_aborts() {
    let definitions =
        config::parse("[[adapter]]\ntype = \"unknown-source\"\ndirectory = \"/in\"\n").unwrap();

    let err = run_adapters(definitions, RunMode::Once, AnnounceFormat::Log)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("unknown adapter type"));
}

#[tokio::test]
async fn missing_directory_fails_the_poll() {
    let dir = TempDir::new().unwrap();
    let definitions = config::parse(&definitions_for(&dir.path().join("gone"))).unwrap();

    let err = run_adapters(definitions, RunMode::Once, AnnounceFormat::Log)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("failed to poll"));
}

#[test]
fn parses_command_line() {
    let cli = Cli::try_parse_from(["conduit", "--config", "adapters.toml", "--json"]).unwrap();
    assert_eq!(cli.config, std::path::Path::new("adapters.toml"));
    assert!(cli.json);
    assert!(!cli.once);
}

#[test]
fn loads_definitions_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("adapters.toml");
    fs::write(&path, definitions_for(dir.path())).unwrap();

    let definitions = config::load(&path).unwrap();
    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0].config.get("filter"), Some("*.csv"));
}
