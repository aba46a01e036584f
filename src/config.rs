//! Process configuration sourced from environment variables.
//!
//! Everything the ingester needs before touching the network is validated
//! here so missing settings fail the run up front instead of per record.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Index receiving every ingested email.
pub const INDEX_NAME: &str = "emails_prueba";

const DEFAULT_MAX_CONCURRENCY: usize = 100;
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} must be set and non-empty")]
    Missing(&'static str),
    #[error("environment variable {key} has invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

fn env_required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn env_usize(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid { key, value })
        }
        _ => Ok(default),
    }
}

fn env_duration_millis(key: &'static str, default_millis: u64) -> Result<Duration, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::Invalid { key, value }),
        _ => Ok(Duration::from_millis(default_millis)),
    }
}

/// Connection settings for the search index service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub index: String,
    pub request_timeout: Duration,
}

impl SearchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env_required("ZINC_URL")?,
            username: env_required("ZINC_USERNAME")?,
            password: env_required("ZINC_PASSWORD")?,
            index: INDEX_NAME.to_string(),
            request_timeout: env_duration_millis("ZINC_TIMEOUT_MS", 30_000)?,
        })
    }

    /// Reject blank settings before any request is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("ZINC_URL", &self.base_url),
            ("ZINC_USERNAME", &self.username),
            ("ZINC_PASSWORD", &self.password),
            ("index name", &self.index),
        ];
        for (key, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(key));
            }
        }
        Ok(())
    }
}

/// Relational store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_connections = env_usize("DATABASE_MAX_CONNECTIONS", 10)?.max(1);
        Ok(Self {
            url: env_required("DATABASE_URL")?,
            max_connections: u32::try_from(max_connections).unwrap_or(u32::MAX),
        })
    }
}

/// Tuning knobs for the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Upper bound on simultaneously active extraction tasks.
    pub max_concurrency: usize,
    /// Capacity of the channel between workers and the collector.
    pub channel_capacity: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::bounded(
            env_usize("INGEST_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?,
            env_usize("INGEST_CHANNEL_CAPACITY", DEFAULT_CHANNEL_CAPACITY)?,
        )
    }

    /// Raise zero values to one and reject a worker count larger than a
    /// semaphore can hand out.
    pub fn bounded(max_concurrency: usize, channel_capacity: usize) -> Result<Self, ConfigError> {
        if max_concurrency > Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid {
                key: "INGEST_MAX_CONCURRENCY",
                value: max_concurrency.to_string(),
            });
        }
        Ok(Self {
            max_concurrency,
            channel_capacity,
        }
        .normalized())
    }

    /// Clamp both settings into the range the worker pool can be built with.
    pub fn normalized(self) -> Self {
        Self {
            max_concurrency: self.max_concurrency.clamp(1, Semaphore::MAX_PERMITS),
            channel_capacity: self.channel_capacity.max(1),
        }
    }
}

/// Full application configuration assembled at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub ingest: IngestConfig,
    pub base_dir: PathBuf,
}

impl AppConfig {
    /// Load every setting, letting `base_dir_override` take precedence over
    /// `BASE_DIR`.
    pub fn load(base_dir_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let base_dir = match base_dir_override {
            Some(path) => path,
            None => PathBuf::from(env_required("BASE_DIR")?),
        };

        let search = SearchConfig::from_env()?;
        search.validate()?;

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            search,
            ingest: IngestConfig::from_env()?,
            base_dir,
        })
    }
}
