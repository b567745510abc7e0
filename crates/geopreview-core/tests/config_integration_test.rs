//! Integration tests for layered configuration
//!
//! Precedence: CLI arguments > Environment variables > Config file > Defaults

use geopreview_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const ENV_VARS: [&str; 5] = [
    "GEOPREVIEW_TOLERANCE_M",
    "GEOPREVIEW_MAX_EDGE_PX",
    "GEOPREVIEW_COLORMAP",
    "GEOPREVIEW_LABEL_FIELD",
    "GEOPREVIEW_CACHE_CAPACITY",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_partial_file_configuration() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
colormap = "inferno"
# Only override the ramp, leave others as defaults
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.colormap.value, "inferno");
    assert_eq!(config.colormap.source, ConfigSource::File);
    assert_eq!(config.tolerance_m.value, 200.0);
    assert_eq!(config.tolerance_m.source, ConfigSource::Default);
    assert_eq!(config.max_edge_px.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("GEOPREVIEW_TOLERANCE_M", "75.5");
    env::set_var("GEOPREVIEW_COLORMAP", "cividis");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
tolerance_m = 10.0
colormap = "magma"
max_edge_px = 256
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.tolerance_m.value, 75.5);
    assert_eq!(config.tolerance_m.source, ConfigSource::Environment);
    assert_eq!(config.colormap.value, "cividis");
    assert_eq!(config.colormap.source, ConfigSource::Environment);
    assert_eq!(config.max_edge_px.value, 256);
    assert_eq!(config.max_edge_px.source, ConfigSource::File);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_value_is_ignored() {
    clear_env();
    env::set_var("GEOPREVIEW_MAX_EDGE_PX", "zero");
    env::set_var("GEOPREVIEW_TOLERANCE_M", "-20");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.max_edge_px.value, 1024);
    assert_eq!(config.max_edge_px.source, ConfigSource::Default);
    assert_eq!(config.tolerance_m.value, 200.0);
    assert_eq!(config.tolerance_m.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_full_configuration_workflow() {
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("geopreview.toml");
    fs::write(
        &config_path,
        r#"
tolerance_m = 500.0
max_edge_px = 2048
label_field = "NAME_1"
cache_capacity = 8
"#,
    )
    .unwrap();

    env::set_var("GEOPREVIEW_LABEL_FIELD", "NOMBRE");
    env::set_var("GEOPREVIEW_CACHE_CAPACITY", "32");

    let mut config = LayeredConfig::with_defaults()
        .load_from_file(&config_path)
        .unwrap()
        .load_from_env();

    assert_eq!(config.tolerance_m.value, 500.0);
    assert_eq!(config.tolerance_m.source, ConfigSource::File);
    assert_eq!(config.label_field.value, "NOMBRE");
    assert_eq!(config.label_field.source, ConfigSource::Environment);
    assert_eq!(config.cache_capacity.value, 32);

    config.update_from_cli(CliConfigOverrides {
        tolerance_m: Some(0.0),
        label_field: Some("NOMB_UGER".to_string()),
        ..Default::default()
    });

    assert_eq!(config.tolerance_m.value, 0.0);
    assert_eq!(config.tolerance_m.source, ConfigSource::Cli);
    assert_eq!(config.label_field.value, "NOMB_UGER");
    assert_eq!(config.label_field.source, ConfigSource::Cli);
    assert_eq!(config.max_edge_px.value, 2048);
    assert_eq!(config.max_edge_px.source, ConfigSource::File);

    let map = config.to_inspection_map();
    let (capacity, source) = &map["cache_capacity"];
    assert_eq!(capacity, "32");
    assert_eq!(*source, ConfigSource::Environment);

    assert!(ConfigSource::Cli.precedence() > ConfigSource::Environment.precedence());
    assert!(ConfigSource::Environment.precedence() > ConfigSource::File.precedence());
    assert!(ConfigSource::File.precedence() > ConfigSource::Default.precedence());

    clear_env();
}

#[test]
fn test_invalid_toml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "invalid toml content [[[").unwrap();

    assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let non_existent = temp_dir.path().join("does_not_exist.toml");

    assert!(LayeredConfig::with_defaults().load_from_file(&non_existent).is_err());
}
