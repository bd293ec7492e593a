use crate::error::{GeostatError, Result};
use crate::models::ValidityMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
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

/// Layered configuration for the Geostat engine
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Upper bound accepted for `radius_meters`
    pub max_radius_meters: ConfigValue<f64>,
    /// Radius used when a query omits it
    pub default_radius_meters: ConfigValue<f64>,
    /// Default feature cap for GeoJSON exports (0 = unlimited)
    pub feature_limit: ConfigValue<usize>,
    pub geometry_validity: ConfigValue<ValidityMode>,
    pub max_upload_bytes: ConfigValue<usize>,
}

pub const DEFAULT_MAX_RADIUS_METERS: f64 = 5000.0;
pub const DEFAULT_FEATURE_LIMIT: usize = 1000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            max_radius_meters: ConfigValue::new(DEFAULT_MAX_RADIUS_METERS, ConfigSource::Default),
            default_radius_meters: ConfigValue::new(
                crate::models::DEFAULT_RADIUS_METERS,
                ConfigSource::Default,
            ),
            feature_limit: ConfigValue::new(DEFAULT_FEATURE_LIMIT, ConfigSource::Default),
            geometry_validity: ConfigValue::new(ValidityMode::Lenient, ConfigSource::Default),
            max_upload_bytes: ConfigValue::new(DEFAULT_MAX_UPLOAD_BYTES, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeostatError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeostatError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(radius) = file_config.max_radius_meters {
            self.max_radius_meters.update(radius, ConfigSource::File);
        }

        if let Some(radius) = file_config.default_radius_meters {
            self.default_radius_meters.update(radius, ConfigSource::File);
        }

        if let Some(limit) = file_config.feature_limit {
            self.feature_limit.update(limit, ConfigSource::File);
        }

        if let Some(geometry_validity) = file_config.geometry_validity {
            self.geometry_validity.update(geometry_validity, ConfigSource::File);
        }

        if let Some(bytes) = file_config.max_upload_bytes {
            self.max_upload_bytes.update(bytes, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    ///
    /// Unparseable values are logged and ignored.
    pub fn load_from_env(mut self) -> Self {
        // GEOSTAT_MAX_RADIUS_METERS
        if let Ok(raw) = env::var("GEOSTAT_MAX_RADIUS_METERS") {
            match parse_positive_meters("max_radius_meters", &raw) {
                Ok(radius) => self.max_radius_meters.update(radius, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOSTAT_MAX_RADIUS_METERS value '{}': expected a positive number",
                    raw
                ),
            }
        }

        // GEOSTAT_DEFAULT_RADIUS_METERS
        if let Ok(raw) = env::var("GEOSTAT_DEFAULT_RADIUS_METERS") {
            match parse_positive_meters("default_radius_meters", &raw) {
                Ok(radius) => self.default_radius_meters.update(radius, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOSTAT_DEFAULT_RADIUS_METERS value '{}': expected a positive number",
                    raw
                ),
            }
        }

        // GEOSTAT_FEATURE_LIMIT
        if let Ok(raw) = env::var("GEOSTAT_FEATURE_LIMIT") {
            match raw.trim().parse::<usize>() {
                Ok(limit) => self.feature_limit.update(limit, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOSTAT_FEATURE_LIMIT value '{}': expected a non-negative integer",
                    raw
                ),
            }
        }

        // GEOSTAT_GEOMETRY_VALIDITY
        if let Ok(raw) = env::var("GEOSTAT_GEOMETRY_VALIDITY") {
            match parse_validity_mode(&raw) {
                Ok(validity) => self.geometry_validity.update(validity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOSTAT_GEOMETRY_VALIDITY value '{}': expected strict or lenient",
                    raw
                ),
            }
        }

        // GEOSTAT_MAX_UPLOAD_BYTES
        if let Ok(raw) = env::var("GEOSTAT_MAX_UPLOAD_BYTES") {
            match raw.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => {
                    self.max_upload_bytes.update(bytes, ConfigSource::Environment)
                }
                _ => tracing::warn!(
                    "Invalid GEOSTAT_MAX_UPLOAD_BYTES value '{}': expected a positive integer",
                    raw
                ),
            }
        }

        self
    }

    /// Check cross-field constraints after all layers are applied
    pub fn validate(&self) -> Result<()> {
        let max = self.max_radius_meters.value;
        if !max.is_finite() || max <= 0.0 {
            return Err(GeostatError::ConfigInvalid {
                key: "max_radius_meters".to_string(),
                reason: format!("must be a positive number, got {}", max),
            });
        }

        let default = self.default_radius_meters.value;
        if !default.is_finite() || default <= 0.0 || default > max {
            return Err(GeostatError::ConfigInvalid {
                key: "default_radius_meters".to_string(),
                reason: format!("must be in (0, {}], got {}", max, default),
            });
        }

        if self.max_upload_bytes.value == 0 {
            return Err(GeostatError::ConfigInvalid {
                key: "max_upload_bytes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "max_radius_meters".to_string(),
            (format!("{} m", self.max_radius_meters.value), self.max_radius_meters.source),
        );

        map.insert(
            "default_radius_meters".to_string(),
            (format!("{} m", self.default_radius_meters.value), self.default_radius_meters.source),
        );

        map.insert(
            "feature_limit".to_string(),
            (self.feature_limit.value.to_string(), self.feature_limit.source),
        );

        map.insert(
            "geometry_validity".to_string(),
            (format!("{:?}", self.geometry_validity.value), self.geometry_validity.source),
        );

        map.insert(
            "max_upload_bytes".to_string(),
            (self.max_upload_bytes.value.to_string(), self.max_upload_bytes.source),
        );

        map
    }
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    max_radius_meters: Option<f64>,
    default_radius_meters: Option<f64>,
    feature_limit: Option<usize>,
    geometry_validity: Option<ValidityMode>,
    max_upload_bytes: Option<usize>,
}

/// Parse validity mode from string
pub fn parse_validity_mode(s: &str) -> Result<ValidityMode> {
    match s.trim().to_lowercase().as_str() {
        "strict" => Ok(ValidityMode::Strict),
        "lenient" => Ok(ValidityMode::Lenient),
        _ => Err(GeostatError::ConfigInvalid {
            key: "geometry_validity".to_string(),
            reason: format!("Invalid validity mode: {}. Use strict or lenient", s),
        }),
    }
}

fn parse_positive_meters(key: &str, s: &str) -> Result<f64> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(GeostatError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("expected a positive number of meters, got '{}'", s),
        }),
    }
}
