//! Integration tests for logger behavior.

use std::fs;
use tempfile::TempDir;
use wiz_scholar::logger::{init_file_logging, level, set_level, set_level_from_str, Level};
use wiz_scholar::{debug, error, info, warn};

#[test]
fn level_parse_accepts_valid() {
    assert!(set_level_from_str("error"));
    assert!(set_level_from_str("warn"));
    assert!(set_level_from_str("info"));
    assert!(set_level_from_str("debug"));
}

#[test]
fn level_parse_rejects_invalid() {
    assert!(!set_level_from_str("invalid"));
    assert!(!set_level_from_str(""));
}

#[test]
fn logs_go_to_file_once_installed() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("logs").join("wizscholar.log");

    set_level(Level::Debug);
    assert_eq!(level(), Level::Debug);
    assert!(init_file_logging(&path), "log file should be created");

    info!("info integration");
    warn!("warn integration");
    error!("error integration");
    debug!("debug integration");

    let contents = fs::read_to_string(&path).expect("Failed to read log file");
    assert!(contents.contains("[INFO] info integration"));
    assert!(contents.contains("[WARN] warn integration"));
    assert!(contents.contains("[ERROR] error integration"));
    assert!(contents.contains("[DEBUG] debug integration"));
}
