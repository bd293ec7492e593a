use std::env;
use std::path::PathBuf;

use geostat_core::config::LayeredConfig;
use geostat_core::Result;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    /// Optional TOML file with engine settings
    pub config_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 8000, cors_origin: "*".to_string(), config_path: None }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port =
            env::var("GEOSTAT_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(defaults.port);

        let cors_origin = env::var("GEOSTAT_CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        let config_path =
            env::var("GEOSTAT_CONFIG").ok().filter(|p| !p.is_empty()).map(PathBuf::from);

        Self { port, cors_origin, config_path }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Engine settings: defaults, then the config file, then `GEOSTAT_*`
    /// variables
    pub fn engine_config(&self) -> Result<LayeredConfig> {
        let mut config = LayeredConfig::with_defaults();
        if let Some(path) = &self.config_path {
            config = config.load_from_file(path)?;
        }
        let config = config.load_from_env();
        config.validate()?;
        Ok(config)
    }
}
