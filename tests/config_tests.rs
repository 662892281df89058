//! Integration tests for configuration management

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiz_scholar::config::{Config, ConfigOverrides};

/// Helper to create a temporary config directory
fn setup_temp_config() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_file = temp_dir.path().join("config.toml");
    (temp_dir, config_file)
}

#[test]
fn test_config_from_defaults() {
    let config = Config::from_defaults();

    assert!(
        !config.logging.level.is_empty(),
        "Default log level should not be empty"
    );
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.server.max_upload_mb, 10);
    assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
    assert_eq!(config.storage.folder, "wiz-scholar/pdfs");
    assert!(
        config.storage.api_secret.is_empty(),
        "Credentials are never shipped as defaults"
    );
    assert_eq!(config.ai.endpoint, "http://localhost:8001");
    assert!(config.ai.retry);
    assert!((config.calculator.max_credits - 8.0).abs() < f64::EPSILON);
    assert!(!config.paths.data_dir.is_empty());
    assert!(!config.paths.reports_dir.is_empty());
}

#[test]
fn test_config_from_toml_basic() {
    let toml_str = r#"
[logging]
level = "info"
file = "/tmp/test.log"
verbose = true

[server]
host = "0.0.0.0"
port = 8080
cors_origins = ["http://localhost:5173"]
max_upload_mb = 25

[storage]
cloud_name = "demo"
api_key = "key"
api_secret = "secret"
folder = "notes"

[ai]
endpoint = "http://ai.internal:8001"
timeout_secs = 90
retry = false

[calculator]
max_credits = 6.0

[paths]
data_dir = "./data"
reports_dir = "./reports"
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file, "/tmp/test.log");
    assert!(config.logging.verbose);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
    assert_eq!(config.max_upload_bytes(), 25 * 1024 * 1024);
    assert_eq!(config.storage.cloud_name, "demo");
    assert_eq!(config.storage.folder, "notes");
    assert_eq!(config.ai.endpoint, "http://ai.internal:8001");
    assert_eq!(config.ai.timeout_secs, 90);
    assert!(!config.ai.retry);
    assert!((config.calculator.max_credits - 6.0).abs() < f64::EPSILON);
    assert_eq!(config.data_dir(), PathBuf::from("./data"));
    assert_eq!(config.reports_dir(), PathBuf::from("./reports"));
}

#[test]
fn test_config_from_toml_partial() {
    // Missing sections and fields fall back to serde defaults
    let toml_str = r#"
[logging]
level = "error"
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse partial TOML");

    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, "");
    assert!(!config.logging.verbose);
    assert_eq!(config.server.port, 0);
    assert!(config.server.cors_origins.is_empty());
    assert!(config.ai.retry, "retry defaults to on");
}

#[test]
fn test_config_variable_expansion() {
    let toml_str = r#"
[logging]
file = "$WIZ_SCHOLAR/test.log"

[paths]
data_dir = "$WIZ_SCHOLAR/data"
reports_dir = "$WIZ_SCHOLAR/reports"
"#;

    let config = Config::from_toml(toml_str).expect("Failed to parse TOML with variables");

    for value in [
        &config.logging.file,
        &config.paths.data_dir,
        &config.paths.reports_dir,
    ] {
        assert!(value.contains("wizscholar"), "{value}");
        assert!(!value.contains("$WIZ_SCHOLAR"), "{value}");
    }
}

#[test]
fn test_config_get_set() {
    let mut config = Config::from_defaults();

    assert!(config.get("level").is_some());

    config.set("level", "debug").expect("Failed to set level");
    assert_eq!(config.get("level").unwrap(), "debug");

    config
        .set("verbose", "true")
        .expect("Failed to set verbose");
    assert_eq!(config.get("verbose").unwrap(), "true");
    assert!(config.logging.verbose);

    config.set("server.port", "7000").expect("Failed to set port");
    assert_eq!(config.server.port, 7000);
    assert_eq!(config.get("port").unwrap(), "7000");

    config
        .set("ai.endpoint", "http://ai:9000")
        .expect("Failed to set endpoint");
    assert_eq!(config.get("endpoint").unwrap(), "http://ai:9000");

    config
        .set("max-upload-mb", "20")
        .expect("Dashes and underscores are interchangeable");
    assert_eq!(config.server.max_upload_mb, 20);

    assert!(config.get("unknown_key").is_none());
    assert!(config.set("unknown_key", "value").is_err());
}

#[test]
fn test_config_set_rejects_bad_values() {
    let mut config = Config::from_defaults();

    assert!(config.set("port", "not-a-port").is_err());
    assert!(config.set("port", "70000").is_err());
    assert!(config.set("retry", "maybe").is_err());
    assert!(config.set("max_credits", "0").is_err());
    assert!(config.set("max_credits", "-2").is_err());
    assert!(config.set("max_credits", "NaN").is_err());
    assert_eq!(config.server.port, 5000);
}

#[test]
fn test_config_set_cors_origins_list() {
    let mut config = Config::from_defaults();

    config
        .set("cors_origins", "http://a.test, http://b.test,,")
        .expect("Failed to set origins");
    assert_eq!(
        config.server.cors_origins,
        vec!["http://a.test", "http://b.test"]
    );
    assert_eq!(
        config.get("cors_origins").unwrap(),
        "http://a.test,http://b.test"
    );
}

#[test]
fn test_config_unset() {
    let mut config = Config::from_defaults();
    let defaults = Config::from_defaults();

    config.set("level", "debug").expect("Failed to set level");
    config.set("port", "1234").expect("Failed to set port");

    config
        .unset("level", &defaults)
        .expect("Failed to unset level");
    config
        .unset("server.port", &defaults)
        .expect("Failed to unset port");
    assert_eq!(config.logging.level, defaults.logging.level);
    assert_eq!(config.server.port, defaults.server.port);

    assert!(config.unset("nope", &defaults).is_err());
}

#[test]
fn test_config_save_and_load() {
    let (_temp_dir, config_file) = setup_temp_config();

    let mut config = Config::from_defaults();
    config.set("level", "info").expect("Failed to set level");
    config.set("api_key", "abc").expect("Failed to set api_key");

    // Manually save to our test location
    if let Some(parent) = config_file.parent() {
        fs::create_dir_all(parent).expect("Failed to create dir");
    }
    let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize");
    fs::write(&config_file, toml_str).expect("Failed to write config");

    let content = fs::read_to_string(&config_file).expect("Failed to read config");
    let loaded_config = Config::from_toml(&content).expect("Failed to parse loaded config");

    assert_eq!(loaded_config.logging.level, "info");
    assert_eq!(loaded_config.storage.api_key, "abc");
    assert_eq!(loaded_config.server.port, config.server.port);
}

#[test]
fn test_config_overrides_apply() {
    let mut config = Config::from_defaults();

    let overrides = ConfigOverrides {
        level: Some("error".to_string()),
        file: Some("/custom/path.log".to_string()),
        verbose: Some(true),
        host: Some("10.0.0.1".to_string()),
        port: Some(9999),
        ai_endpoint: Some("http://override:8001".to_string()),
        data_dir: Some("./custom_data".to_string()),
        reports_dir: Some("./custom_reports".to_string()),
    };

    config.apply_overrides(&overrides);

    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, "/custom/path.log");
    assert!(config.logging.verbose);
    assert_eq!(config.server.host, "10.0.0.1");
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.ai.endpoint, "http://override:8001");
    assert_eq!(config.paths.data_dir, "./custom_data");
    assert_eq!(config.paths.reports_dir, "./custom_reports");
}

#[test]
fn test_config_overrides_partial() {
    let mut config = Config::from_defaults();
    let defaults = Config::from_defaults();

    let overrides = ConfigOverrides {
        level: Some("debug".to_string()),
        ..ConfigOverrides::default()
    };

    config.apply_overrides(&overrides);

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.server.port, defaults.server.port);
    assert_eq!(config.paths.data_dir, defaults.paths.data_dir);
}

#[test]
fn test_config_display_format() {
    let mut config = Config::from_defaults();
    config.storage.api_secret = "super-secret".to_string();
    let display_str = format!("{config}");

    for section in [
        "[logging]",
        "[server]",
        "[storage]",
        "[ai]",
        "[calculator]",
        "[paths]",
    ] {
        assert!(display_str.contains(section), "missing {section}");
    }
    assert!(display_str.contains("level"));
    assert!(display_str.contains("max_credits"));
    assert!(
        !display_str.contains("super-secret"),
        "secrets must be masked"
    );
}

#[test]
fn test_merge_defaults_adds_missing_fields() {
    let toml_str = r#"
[logging]
level = "error"
file = ""
verbose = false

[server]
port = 0

[paths]
data_dir = ""
reports_dir = ""
"#;

    let mut config = Config::from_toml(toml_str).expect("Failed to parse minimal config");
    let defaults = Config::from_defaults();

    let changed = config.merge_defaults(&defaults);

    assert!(
        changed,
        "merge_defaults should return true when fields are added"
    );
    assert_eq!(config.server.port, defaults.server.port);
    assert_eq!(config.paths.data_dir, defaults.paths.data_dir);
    assert!((config.calculator.max_credits - defaults.calculator.max_credits).abs() < f64::EPSILON);
    assert!(!config.merge_defaults(&defaults), "second merge is a no-op");
}

#[test]
fn test_merge_defaults_preserves_existing() {
    let toml_str = r#"
[logging]
level = "error"
file = "/my/custom/path.log"
verbose = false

[server]
port = 6001

[calculator]
max_credits = 5.0
"#;

    let mut config = Config::from_toml(toml_str).expect("Failed to parse config");
    let defaults = Config::from_defaults();

    config.merge_defaults(&defaults);

    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.file, "/my/custom/path.log");
    assert_eq!(config.server.port, 6001);
    assert!((config.calculator.max_credits - 5.0).abs() < f64::EPSILON);
}

#[test]
fn test_get_wizscholar_dir() {
    let dir = Config::get_wizscholar_dir();

    assert!(dir.to_string_lossy().contains("wizscholar"));
    assert_ne!(dir, PathBuf::from("."));
}

#[test]
fn test_get_config_file_path() {
    let path = Config::get_config_file_path();

    let path_str = path.to_string_lossy();
    assert!(path_str.ends_with("config.toml") || path_str.ends_with("dconfig.toml"));
}

#[test]
fn test_config_get_masked_hides_credentials() {
    let mut config = Config::from_defaults();
    config.set("storage.api_secret", "s3cr3t").unwrap();
    config.set("api_key", "k3y").unwrap();

    assert_eq!(config.get("api_secret").unwrap(), "s3cr3t");
    assert_eq!(config.get_masked("api_secret").unwrap(), "********");
    assert_eq!(config.get_masked("storage.api-key").unwrap(), "********");
    assert_eq!(config.get_masked("port").unwrap(), "5000");
    assert!(config.get_masked("nope").is_none());

    config.unset("api_secret", &Config::from_defaults()).unwrap();
    assert_eq!(config.get_masked("api_secret").unwrap(), "");
}

#[test]
fn test_config_section_of() {
    assert_eq!(Config::section_of("level"), Some("logging"));
    assert_eq!(Config::section_of("server.max-upload-mb"), Some("server"));
    assert_eq!(Config::section_of("cloud_name"), Some("storage"));
    assert_eq!(Config::section_of("ai.endpoint"), Some("ai"));
    assert_eq!(Config::section_of("max_credits"), Some("calculator"));
    assert_eq!(Config::section_of("reports_dir"), Some("paths"));
    assert_eq!(Config::section_of("unknown"), None);
    assert!(Config::is_secret("api_secret"));
    assert!(!Config::is_secret("cloud_name"));
}
