//! Command line parsing and configuration resolution.

use crate::{config_path, resolve_config, run, Cli, Commands};
use chrono::NaiveDate;
use clap::Parser;
use paddle_forecast_lib::config::{Config, CONFIG_FILE};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, NamedTempFile};

#[test]
fn defaults_to_current_conditions() {
    let cli = Cli::try_parse_from(["paddle-forecast"]).unwrap();
    assert_eq!(cli.command, None);
    assert_eq!(cli.config, None);
    assert_eq!(config_path(&cli), Path::new(CONFIG_FILE));
    assert!(!cli.offline);
}

#[test]
fn parses_day_with_date() {
    let cli = Cli::try_parse_from(["paddle-forecast", "day", "--date", "2024-08-17"]).unwrap();
    assert_eq!(
        cli.command,
        Some(Commands::Day {
            date: NaiveDate::from_ymd_opt(2024, 8, 17)
        })
    );
}

#[test]
fn global_flags_follow_the_subcommand() {
    let cli = Cli::try_parse_from([
        "paddle-forecast",
        "json",
        "--offline",
        "--config",
        "/tmp/elsewhere.toml",
    ])
    .unwrap();
    assert_eq!(cli.command, Some(Commands::Json));
    assert!(cli.offline);
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/elsewhere.toml")));
}

#[test]
fn rejects_malformed_dates_and_unknown_commands() {
    assert!(Cli::try_parse_from(["paddle-forecast", "day", "--date", "17/08/2024"]).is_err());
    assert!(Cli::try_parse_from(["paddle-forecast", "weekly"]).is_err());
}

#[test]
fn offline_flag_overrides_config_file() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        r#"
[site]
name = "Half Moon Bay"
latitude = -36.88
longitude = 174.90
utc_offset_hours = 12

[sources]
offline = false
"#,
    )
    .unwrap();

    let path = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["paddle-forecast", "--offline", "--config", path, "now"]).unwrap();
    let config = resolve_config(&cli);
    assert_eq!(config.site.name, "Half Moon Bay");
    assert!(config.sources.offline);

    let cli = Cli::try_parse_from(["paddle-forecast", "--config", path]).unwrap();
    assert!(!resolve_config(&cli).sources.offline);
}

#[test]
fn missing_config_file_uses_defaults() {
    let cli = Cli::try_parse_from([
        "paddle-forecast",
        "--config",
        "/nonexistent/paddle-config.toml",
        "extended",
    ])
    .unwrap();
    let config = resolve_config(&cli);
    assert_eq!(config.site.name, "Ian Shaw Park");
    assert_eq!(config.display.first_hour, 14);
}

#[tokio::test]
async fn init_writes_default_config_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("paddle-config.toml");
    let path_arg = path.to_str().unwrap();

    let cli = Cli::try_parse_from(["paddle-forecast", "init", "--config", path_arg]).unwrap();
    assert_eq!(cli.command, Some(Commands::Init { force: false }));
    run(cli, Config::default()).await.unwrap();

    let written = Config::load_from_path(&path);
    assert_eq!(written.site.name, "Ian Shaw Park");
    assert_eq!(written.route, Config::default().route);

    let again = Cli::try_parse_from(["paddle-forecast", "init", "--config", path_arg]).unwrap();
    let err = run(again, Config::default()).await.unwrap_err();
    assert!(err.to_string().contains("--force"));

    fs::write(&path, "[site]\nname = \"Somewhere\"\n").unwrap();
    let forced =
        Cli::try_parse_from(["paddle-forecast", "init", "--force", "--config", path_arg]).unwrap();
    run(forced, Config::default()).await.unwrap();
    assert_eq!(Config::load_from_path(&path).site.name, "Ian Shaw Park");
}
