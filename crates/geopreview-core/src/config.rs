use crate::error::{GeopreviewError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Default simplification tolerance in metres
pub const DEFAULT_TOLERANCE_M: f64 = 200.0;

/// Default maximum raster edge in pixels
pub const DEFAULT_MAX_EDGE_PX: u32 = 1024;

/// Default color ramp
pub const DEFAULT_COLORMAP: &str = "viridis";

/// Preferred label column of the boundary datasets
pub const DEFAULT_LABEL_FIELD: &str = "NOMB_UGER";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the preview pipelines
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub tolerance_m: ConfigValue<f64>,
    pub max_edge_px: ConfigValue<u32>,
    pub colormap: ConfigValue<String>,
    pub label_field: ConfigValue<String>,
    /// Entries per memo cache; 0 keeps every entry
    pub cache_capacity: ConfigValue<usize>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            tolerance_m: ConfigValue::new(DEFAULT_TOLERANCE_M, ConfigSource::Default),
            max_edge_px: ConfigValue::new(DEFAULT_MAX_EDGE_PX, ConfigSource::Default),
            colormap: ConfigValue::new(DEFAULT_COLORMAP.to_string(), ConfigSource::Default),
            label_field: ConfigValue::new(DEFAULT_LABEL_FIELD.to_string(), ConfigSource::Default),
            cache_capacity: ConfigValue::new(0, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeopreviewError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeopreviewError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(tolerance) = file_config.tolerance_m {
            self.tolerance_m.update(validate_tolerance(tolerance)?, ConfigSource::File);
        }

        if let Some(max_edge) = file_config.max_edge_px {
            self.max_edge_px.update(validate_max_edge(max_edge)?, ConfigSource::File);
        }

        if let Some(colormap) = file_config.colormap {
            self.colormap.update(colormap, ConfigSource::File);
        }

        if let Some(label_field) = file_config.label_field {
            self.label_field.update(label_field, ConfigSource::File);
        }

        if let Some(capacity) = file_config.cache_capacity {
            self.cache_capacity.update(capacity, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOPREVIEW_TOLERANCE_M
        if let Ok(raw) = env::var("GEOPREVIEW_TOLERANCE_M") {
            match parse_tolerance(&raw) {
                Ok(tolerance) => self.tolerance_m.update(tolerance, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOPREVIEW_TOLERANCE_M value '{}': expected non-negative metres",
                    raw
                ),
            }
        }

        // GEOPREVIEW_MAX_EDGE_PX
        if let Ok(raw) = env::var("GEOPREVIEW_MAX_EDGE_PX") {
            match parse_max_edge(&raw) {
                Ok(max_edge) => self.max_edge_px.update(max_edge, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOPREVIEW_MAX_EDGE_PX value '{}': expected positive integer",
                    raw
                ),
            }
        }

        // GEOPREVIEW_COLORMAP
        if let Ok(colormap) = env::var("GEOPREVIEW_COLORMAP") {
            self.colormap.update(colormap, ConfigSource::Environment);
        }

        // GEOPREVIEW_LABEL_FIELD
        if let Ok(label_field) = env::var("GEOPREVIEW_LABEL_FIELD") {
            self.label_field.update(label_field, ConfigSource::Environment);
        }

        // GEOPREVIEW_CACHE_CAPACITY
        if let Ok(raw) = env::var("GEOPREVIEW_CACHE_CAPACITY") {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => self.cache_capacity.update(capacity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOPREVIEW_CACHE_CAPACITY value '{}': expected integer",
                    raw
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(tolerance) = overrides.tolerance_m {
            self.tolerance_m.update(tolerance, ConfigSource::Cli);
        }

        if let Some(max_edge) = overrides.max_edge_px {
            self.max_edge_px.update(max_edge, ConfigSource::Cli);
        }

        if let Some(colormap) = overrides.colormap {
            self.colormap.update(colormap, ConfigSource::Cli);
        }

        if let Some(label_field) = overrides.label_field {
            self.label_field.update(label_field, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "tolerance_m".to_string(),
            (self.tolerance_m.value.to_string(), self.tolerance_m.source),
        );

        map.insert(
            "max_edge_px".to_string(),
            (self.max_edge_px.value.to_string(), self.max_edge_px.source),
        );

        map.insert("colormap".to_string(), (self.colormap.value.clone(), self.colormap.source));

        map.insert(
            "label_field".to_string(),
            (self.label_field.value.clone(), self.label_field.source),
        );

        let capacity = match self.cache_capacity.value {
            0 => "unbounded".to_string(),
            n => n.to_string(),
        };
        map.insert("cache_capacity".to_string(), (capacity, self.cache_capacity.source));

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    tolerance_m: Option<f64>,
    max_edge_px: Option<u32>,
    colormap: Option<String>,
    label_field: Option<String>,
    cache_capacity: Option<usize>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub tolerance_m: Option<f64>,
    pub max_edge_px: Option<u32>,
    pub colormap: Option<String>,
    pub label_field: Option<String>,
}

/// Parse a simplification tolerance in metres
pub fn parse_tolerance(s: &str) -> Result<f64> {
    let value = s.trim().parse::<f64>().map_err(|_| GeopreviewError::ConfigInvalid {
        key: "tolerance_m".to_string(),
        reason: format!("Invalid tolerance: {}", s),
    })?;
    validate_tolerance(value)
}

/// Parse a maximum raster edge length in pixels
pub fn parse_max_edge(s: &str) -> Result<u32> {
    let value = s.trim().parse::<u32>().map_err(|_| GeopreviewError::ConfigInvalid {
        key: "max_edge_px".to_string(),
        reason: format!("Invalid pixel count: {}", s),
    })?;
    validate_max_edge(value)
}

fn validate_tolerance(value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(GeopreviewError::ConfigInvalid {
            key: "tolerance_m".to_string(),
            reason: format!("Tolerance must be a non-negative number of metres, got {}", value),
        })
    }
}

fn validate_max_edge(value: u32) -> Result<u32> {
    if value == 0 {
        return Err(GeopreviewError::ConfigInvalid {
            key: "max_edge_px".to_string(),
            reason: "Maximum edge must be at least 1 pixel".to_string(),
        });
    }
    Ok(value)
}
