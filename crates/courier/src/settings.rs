//! Orchestrator settings

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Prefix of environment variables overriding settings, e.g. `COURIER_TIMEOUT_MS`
pub const ENV_PREFIX: &str = "COURIER";

/// When a successful body may be written to the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheWrite {
    /// Only once the endpoint has completed a live exchange or already has an entry
    #[default]
    AfterFirstExchange,
    /// On every successful response
    Always,
}

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bounded wait of synchronous requests, also the per-attempt transport timeout
    pub timeout_ms: u64,
    /// Dispatch the cached body as a provisional success before the network call
    pub replay_cached: bool,
    /// Cache write policy
    pub cache_write: CacheWrite,
    /// Redb partition opened by `OrchestratorBuilder::cache_file`
    pub cache_partition: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            replay_cached: true,
            cache_write: CacheWrite::default(),
            cache_partition: "courier".to_string(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file cannot be read
    #[must_use]
    pub fn new<P>(config_file_name: Option<P>) -> Self
    where
        P: Into<PathBuf>,
    {
        let Some(config_file_name) = config_file_name else {
            return Self::default();
        };

        match Self::from_file(config_file_name) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!(
                    "Error reading config file, falling back to defaults. Error: {e}"
                );
                Self::default()
            }
        }
    }

    /// Defaults, overridden by a TOML file, overridden by `COURIER_*` variables
    pub fn from_file<P>(config_file_name: P) -> Result<Self, ConfigError>
    where
        P: Into<PathBuf>,
    {
        let config_file_name: PathBuf = config_file_name.into();

        let config: Config = Config::builder()
            // use defaults
            .add_source(Config::try_from(&Self::default())?)
            // override with file contents
            .add_source(File::from(config_file_name))
            // override with environment
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    /// Synchronous wait bound
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert!(settings.replay_cached);
        assert_eq!(settings.cache_write, CacheWrite::AfterFirstExchange);
        assert_eq!(settings.cache_partition, "courier");
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Temp file");
        writeln!(file, "timeout_ms = 2500\ncache_write = \"always\"").expect("Write config");

        let settings = Settings::from_file(file.path()).expect("Valid config");

        assert_eq!(settings.timeout(), Duration::from_millis(2500));
        assert_eq!(settings.cache_write, CacheWrite::Always);
        assert!(settings.replay_cached);
        assert_eq!(settings.cache_partition, "courier");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::new(Some("/nonexistent/courier/config.toml"));
        assert_eq!(settings, Settings::default());

        assert_eq!(Settings::new::<PathBuf>(None), Settings::default());
    }

    #[test]
    fn test_bad_value_is_error() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Temp file");
        writeln!(file, "cache_write = \"sometimes\"").expect("Write config");

        assert!(Settings::from_file(file.path()).is_err());
    }
}
