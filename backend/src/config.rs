//! Configuration management for the Purchase Request Service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PRS_ prefix
//! 4. A bare `PORT` variable, as set by most hosting platforms

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Upload limits
    pub upload: UploadConfig,

    /// Spreadsheet layout of generated reports
    pub layout: LayoutConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Maximum request body size in bytes
    pub max_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    /// Height of every worksheet row, in points
    pub row_height: f64,

    /// Width of the product image column
    pub image_column_width: f64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("PRS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let mut builder = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("upload.max_bytes", 16 * 1024 * 1024)?
            .set_default("layout.row_height", 100.0)?
            .set_default("layout.image_column_width", 25.0)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (PRS_ prefix)
            .add_source(
                Environment::with_prefix("PRS")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        builder.build()?.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            upload: UploadConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 100.0,
            image_column_width: 25.0,
        }
    }
}
