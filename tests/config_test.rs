use shelfscope::config::{AppConfig, ConfigManager, DEFAULT_SOURCE};
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    assert_eq!(config.source.location, DEFAULT_SOURCE);
    assert_eq!(config.source.delimiter, None);
    assert_eq!(config.source.download_timeout_secs, 60);
    assert_eq!(config.source.temp_dir, None);

    assert_eq!(config.views.preview_rows, 10);
    assert_eq!(config.views.top_n, 10);
    assert_eq!(config.views.histogram_bins, 20);

    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("# [source]"));
    assert!(template.contains("# [views]"));
    assert!(template.contains("# [logging]"));
    assert!(template.contains("# Dashboard Views"));
    assert!(template.contains("# top_n = 10"));
    assert!(template.contains("# delimiter = null"));
    assert!(template.contains("# temp_dir = null"));

    // every key line is commented out
    for line in template.lines() {
        let trimmed = line.trim();
        assert!(
            trimmed.is_empty() || trimmed.starts_with('#'),
            "uncommented line: {}",
            line
        );
    }
}

#[test]
fn test_generated_config_parses_to_defaults_when_uncommented() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let template = config_manager.generate_default_config();

    let uncommented: String = template
        .lines()
        .filter_map(|l| l.strip_prefix("# "))
        .filter(|l| l.starts_with('[') || (l.contains(" = ") && !l.contains("null")))
        .map(|l| format!("{}\n", l))
        .collect();
    let parsed: AppConfig = toml::from_str(&uncommented).expect("template should parse");
    assert_eq!(parsed, AppConfig::default());
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(path.exists());
    assert_eq!(path, config_manager.config_path("config.toml"));
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("shelfscope configuration file"));
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("--force"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let path = config_manager.write_default_config(false).unwrap();
    fs::write(&path, "garbage").unwrap();

    config_manager
        .write_default_config(true)
        .expect("Failed to overwrite config");
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("[views]"));
}

#[test]
fn test_load_config_with_no_file() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = AppConfig::load_from(&config_manager).expect("Should load default config");
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_load_and_parse_partial_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    fs::write(
        config_manager.config_path("config.toml"),
        r#"
[source]
location = "/data/bestsellers.csv"
delimiter = 59

[views]
top_n = 5
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&config_manager).unwrap();
    assert_eq!(config.source.location, "/data/bestsellers.csv");
    assert_eq!(config.source.delimiter, Some(b';'));
    assert_eq!(config.views.top_n, 5);
    // untouched fields keep their defaults
    assert_eq!(config.views.preview_rows, 10);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_load_rejects_invalid_values() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    fs::write(
        config_manager.config_path("config.toml"),
        "[views]\nhistogram_bins = 0\n",
    )
    .unwrap();

    let err = AppConfig::load_from(&config_manager).unwrap_err().to_string();
    assert!(err.contains("histogram_bins"), "got: {}", err);
}

#[test]
fn test_load_reports_parse_errors() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    fs::write(config_manager.config_path("config.toml"), "[views\ntop_n = ").unwrap();

    let err = AppConfig::load_from(&config_manager).unwrap_err().to_string();
    assert!(err.contains("Failed to parse config file"), "got: {}", err);
}

#[test]
fn test_validate_config_invalid_version() {
    let mut config = AppConfig::default();
    config.version = "2.0".to_string();
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unsupported config version"));
}

#[test]
fn test_validate_config_zero_timeout() {
    let mut config = AppConfig::default();
    config.source.download_timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_merge_does_not_override_with_defaults() {
    let mut base = AppConfig::default();
    base.views.top_n = 3;
    base.source.temp_dir = Some("/tmp/shelf".to_string());

    base.merge(AppConfig::default());

    assert_eq!(base.views.top_n, 3);
    assert_eq!(base.source.temp_dir.as_deref(), Some("/tmp/shelf"));
}
