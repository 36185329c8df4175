//! Integration tests for configuration loading
//!
//! Tests the end-to-end path from a config file to a working client context.

use std::io::Write;

use pawsit_domain::{DeploymentMode, StorageBackend};
use pawsit_infra::{config, ClientContext};

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "mode": "development",
        "default_host": "127.0.0.1",
        "port": 4000,
        "priority_candidates": [
            {"host": "10.0.2.2", "network": "loopback"},
            {"host": "192.168.1.40", "network": "wifi"}
        ],
        "fallback_candidates": [
            {"host": "172.20.10.3", "network": "hotspot"}
        ],
        "probe_timeout_ms": 1500,
        "storage": {"backend": "memory"}
    }"#;

    let mut temp_file = tempfile::Builder::new().suffix(".json").tempfile().expect("temp file");
    temp_file.write_all(json_content.as_bytes()).expect("write config");

    let loaded = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("config should load from JSON");

    assert_eq!(loaded.mode, DeploymentMode::Development);
    assert_eq!(loaded.port, Some(4000));
    assert_eq!(loaded.priority_candidates.len(), 2);
    assert_eq!(loaded.fallback_candidates.len(), 1);
    assert_eq!(loaded.storage.backend, StorageBackend::Memory);
    assert!(loaded.validate().is_ok());

    let context = ClientContext::from_config(loaded).expect("context should build");
    assert_eq!(context.resolver().current(), "http://127.0.0.1:4000/api");
    assert!(!context.resolver().is_connected());
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
        mode = "production"
        production_base_url = "https://staging.pawsit.app/api"
        request_timeout_ms = 15000

        [storage]
        backend = "memory"
    "#;

    let mut temp_file = tempfile::Builder::new().suffix(".toml").tempfile().expect("temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("write config");

    let loaded = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("config should load from TOML");

    let context = ClientContext::from_config(loaded).expect("context should build");
    assert_eq!(context.resolver().current(), "https://staging.pawsit.app/api");
    assert!(context.resolver().is_connected());
}

#[test]
fn test_invalid_config_is_rejected_by_context() {
    let json_content = r#"{ "mode": "production", "production_base_url": "not a url" }"#;

    let mut temp_file = tempfile::Builder::new().suffix(".json").tempfile().expect("temp file");
    temp_file.write_all(json_content.as_bytes()).expect("write config");

    let loaded = config::load_from_file(Some(temp_file.path().to_path_buf())).expect("parses");
    assert!(ClientContext::from_config(loaded).is_err());
}
