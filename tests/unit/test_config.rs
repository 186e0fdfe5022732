//! Unit tests for the config module
//!
//! Tests cover:
//! - Loading from an explicit file
//! - Section defaults for partial files
//! - Validation errors and their exit codes

use nodem_site::config::Config;
use nodem_site::errors::{get_exit_code, SiteError, EXIT_CONFIG_ERROR};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_explicit_file() {
    let file = config_file(
        r#"
        [pipeline]
        source_dir = "assets"
        debounce_ms = 250

        [terminal]
        tick_ms = 35
        version_placeholder = "fetching..."

        [site]
        install_command = "curl -fsSL https://example.com/install.sh | sh"
        "#,
    );

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.pipeline.source_dir, PathBuf::from("assets"));
    assert_eq!(config.pipeline.debounce_ms, 250);
    assert_eq!(config.terminal.tick_ms, 35);
    assert_eq!(config.terminal.version_placeholder, "fetching...");
    assert_eq!(
        config.site.install_command,
        "curl -fsSL https://example.com/install.sh | sh"
    );
    // Untouched sections keep their defaults
    assert_eq!(config.site.developer.name, "marco tulio avila");
    assert_eq!(config.version.timeout_secs, 10);
}

#[test]
fn test_missing_file_exits_with_config_code() {
    let err = Config::load(Some(std::path::Path::new("/no/such/nodem-site.toml"))).unwrap_err();
    assert!(format!("{:#}", err).contains("/no/such/nodem-site.toml"));
    assert_eq!(get_exit_code(&err), EXIT_CONFIG_ERROR);
}

#[test]
fn test_malformed_toml_exits_with_config_code() {
    let file = config_file("[server\nport = ");
    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SiteError>(),
        Some(SiteError::Config(_))
    ));
    assert_eq!(get_exit_code(&err), EXIT_CONFIG_ERROR);
}

#[test]
fn test_zero_tick_fails_validation_with_config_exit_code() {
    let file = config_file("[terminal]\ntick_ms = 0\n");
    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SiteError>(),
        Some(SiteError::Config(_))
    ));
    assert_eq!(get_exit_code(&err), EXIT_CONFIG_ERROR);
}

#[test]
fn test_zero_port_fails_validation() {
    let mut config = Config::default();
    config.server.port = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_roundtrip_through_toml() {
    let config = Config::default();
    let text = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed.server.addr(), "127.0.0.1:8081");
    assert_eq!(parsed.version.proxy_url, config.version.proxy_url);
}
