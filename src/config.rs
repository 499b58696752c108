//! Runtime configuration read from `AIRCAST_*` environment variables.

use crate::sources::data_source::{DataSource, SourceSpecs};
use crate::utils::default_data_dir;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port '{value}' in {variable}")]
    InvalidPort {
        variable: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    /// Directory holding the prediction store.
    pub data_dir: PathBuf,
    /// Directory holding the dashboard's CSV extracts.
    pub dashboard_dir: PathBuf,
    pub sources: SourceSpecs,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset keys fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("AIRCAST_PORT") {
            Some(value) => value.trim().parse().map_err(|e| ConfigError::InvalidPort {
                variable: "AIRCAST_PORT",
                value,
                source: e,
            })?,
            None => DEFAULT_PORT,
        };
        let dashboard_dir = lookup("AIRCAST_DASHBOARD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut sources = SourceSpecs::defaults(&dashboard_dir);
        for source in DataSource::ALL {
            let Some(spec) = sources.get_mut(source) else {
                continue;
            };
            if let Some(path) = lookup(&format!("AIRCAST_{}_PATH", source.env_name())) {
                spec.path = PathBuf::from(path);
            }
            if let Some(column) = lookup(&format!("AIRCAST_{}_TIME_COLUMN", source.env_name())) {
                spec.time_column = column;
                spec.fallback_time_column = None;
            }
        }

        Ok(Self {
            server: ServerConfig {
                host: lookup("AIRCAST_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
            },
            data_dir: lookup("AIRCAST_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            dashboard_dir,
            sources,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        let dashboard_dir = PathBuf::from(".");
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            data_dir: default_data_dir(),
            sources: SourceSpecs::defaults(&dashboard_dir),
            dashboard_dir,
        }
    }
}
