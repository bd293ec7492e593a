//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! Environment variables > Config file > Defaults

use geostat_core::config::{ConfigSource, LayeredConfig};
use geostat_core::models::ValidityMode;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const ENV_VARS: &[&str] = &[
    "GEOSTAT_MAX_RADIUS_METERS",
    "GEOSTAT_DEFAULT_RADIUS_METERS",
    "GEOSTAT_FEATURE_LIMIT",
    "GEOSTAT_GEOMETRY_VALIDITY",
    "GEOSTAT_MAX_UPLOAD_BYTES",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_default_configuration() {
    let config = LayeredConfig::with_defaults();

    assert_eq!(config.max_radius_meters.value, 5000.0);
    assert_eq!(config.default_radius_meters.value, 1000.0);
    assert_eq!(config.feature_limit.value, 1000);
    assert_eq!(config.geometry_validity.value, ValidityMode::Lenient);
    assert_eq!(config.geometry_validity.source, ConfigSource::Default);
}

#[test]
fn test_partial_file_configuration() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
feature_limit = 250
# Only override the feature limit, leave others as defaults
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.feature_limit.value, 250);
    assert_eq!(config.feature_limit.source, ConfigSource::File);
    assert_eq!(config.max_radius_meters.source, ConfigSource::Default);
    assert_eq!(config.geometry_validity.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("GEOSTAT_MAX_RADIUS_METERS", "8000");
    env::set_var("GEOSTAT_GEOMETRY_VALIDITY", "strict");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
max_radius_meters = 2000.0
geometry_validity = "lenient"
feature_limit = 10
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.max_radius_meters.value, 8000.0);
    assert_eq!(config.max_radius_meters.source, ConfigSource::Environment);
    assert_eq!(config.geometry_validity.value, ValidityMode::Strict);
    assert_eq!(config.feature_limit.value, 10);
    assert_eq!(config.feature_limit.source, ConfigSource::File);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_values_are_ignored() {
    clear_env();
    env::set_var("GEOSTAT_MAX_RADIUS_METERS", "-5");
    env::set_var("GEOSTAT_FEATURE_LIMIT", "lots");
    env::set_var("GEOSTAT_GEOMETRY_VALIDITY", "sloppy");
    env::set_var("GEOSTAT_MAX_UPLOAD_BYTES", "0");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.max_radius_meters.value, 5000.0);
    assert_eq!(config.max_radius_meters.source, ConfigSource::Default);
    assert_eq!(config.feature_limit.source, ConfigSource::Default);
    assert_eq!(config.geometry_validity.source, ConfigSource::Default);
    assert_eq!(config.max_upload_bytes.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_environment_can_break_cross_field_constraint() {
    clear_env();
    env::set_var("GEOSTAT_MAX_RADIUS_METERS", "500");

    let config = LayeredConfig::with_defaults().load_from_env();
    let err = config.validate().unwrap_err();
    assert_eq!(err.field(), Some("default_radius_meters"));

    clear_env();
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let result = LayeredConfig::with_defaults().load_from_file(dir.path().join("geostat.toml"));

    let err = result.unwrap_err();
    assert_eq!(err.field(), Some("file"));
}

#[test]
fn test_malformed_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "max_radius_meters = \"far\"").unwrap();

    assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());
}
