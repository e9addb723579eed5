//! Runtime configuration, read from `LEADTRACK_*` environment variables.

use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend id: "sqlite", "memory" or "json".
    pub backend: String,
    /// Explicit data file path. Defaults to the platform data directory.
    pub data_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    /// "development" or "production". Drives the CORS policy.
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            data_path: None,
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match std::env::var("LEADTRACK_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid LEADTRACK_PORT: {raw}"))?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            backend: std::env::var("LEADTRACK_BACKEND").unwrap_or(defaults.backend),
            data_path: std::env::var("LEADTRACK_DATA").ok().map(PathBuf::from),
            host: std::env::var("LEADTRACK_HOST").unwrap_or(defaults.host),
            port,
            environment: std::env::var("LEADTRACK_ENV").unwrap_or(defaults.environment),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
