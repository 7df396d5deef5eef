use shelfscope::config::AppConfig;
use shelfscope::{source_location, Args, LoadOptions, ViewSettings, DEFAULT_SOURCE};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_config_used_when_args_unset() {
    let mut config = AppConfig::default();
    config.source.delimiter = Some(b'\t');
    config.source.download_timeout_secs = 5;
    config.source.temp_dir = Some("/var/tmp".to_string());
    config.views.top_n = 4;
    config.views.histogram_bins = 8;

    let args = Args::default();

    let opts = LoadOptions::from_args_and_config(&args, &config);
    assert_eq!(opts.delimiter, b'\t');
    assert_eq!(opts.download_timeout, Duration::from_secs(5));
    assert_eq!(opts.temp_dir, Some(PathBuf::from("/var/tmp")));

    let settings = ViewSettings::from_args_and_config(&args, &config);
    assert_eq!(settings.top_n, 4);
    assert_eq!(settings.histogram_bins, 8);
    assert_eq!(settings.preview_rows, 10);

    assert_eq!(source_location(&args, &config), DEFAULT_SOURCE);
}

#[test]
fn test_cli_args_override_config() {
    let mut config = AppConfig::default();
    config.source.location = "/data/configured.csv".to_string();
    config.source.delimiter = Some(b'\t');
    config.views.preview_rows = 25;

    let args = Args {
        source: Some("local.csv".to_string()),
        delimiter: Some(b';'),
        preview_rows: Some(2),
        bins: Some(5),
        ..Args::default()
    };

    let opts = LoadOptions::from_args_and_config(&args, &config);
    assert_eq!(opts.delimiter, b';');

    let settings = ViewSettings::from_args_and_config(&args, &config);
    assert_eq!(settings.preview_rows, 2);
    assert_eq!(settings.histogram_bins, 5);

    assert_eq!(source_location(&args, &config), "local.csv");
}

#[test]
fn test_configured_location_without_arg() {
    let mut config = AppConfig::default();
    config.source.location = "/data/configured.csv".to_string();
    assert_eq!(
        source_location(&Args::default(), &config),
        "/data/configured.csv"
    );
}
