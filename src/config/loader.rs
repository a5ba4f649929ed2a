//! Configuration Loader
//!
//! Layers defaults, an optional file and `TASKFLOW__*` environment overrides
//! into an [`EngineConfig`], then validates the result.

use config::{Config, Environment, File, Map};
use std::path::Path;
use tracing::debug;

use super::error::{ConfigResult, ConfigurationError};
use super::EngineConfig;

pub struct ConfigLoader;

impl ConfigLoader {
    pub const ENV_PREFIX: &'static str = "TASKFLOW";
    pub const ENV_SEPARATOR: &'static str = "__";

    /// Load from an optional file plus the process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<EngineConfig> {
        Self::load_with_env(path, None)
    }

    /// Load with an explicit environment map instead of the process
    /// environment. Useful for tests that must not touch global state.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> ConfigResult<EngineConfig> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigurationError::file_not_found(path));
            }
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(Self::ENV_PREFIX)
                .prefix_separator(Self::ENV_SEPARATOR)
                .separator(Self::ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        );

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            max_concurrent_steps = ?config.executor.max_concurrent_steps,
            generation_timeout_ms = ?config.executor.generation_timeout_ms,
            queue_capacity = config.sink.queue_capacity,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Current environment name: `TASKFLOW_ENV`, then `APP_ENV`, else
    /// `development`.
    pub fn detect_environment() -> String {
        std::env::var("TASKFLOW_ENV")
            .or_else(|_| std::env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_load_defaults_without_sources() {
        let config = ConfigLoader::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[executor]\nmax_concurrent_steps = 4\n\n[logging]\nformat = \"json\"\nlevel = \"info\""
        )
        .unwrap();

        let config = ConfigLoader::load_with_env(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config.executor.max_concurrent_steps, Some(4));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level.as_deref(), Some("info"));
        assert_eq!(config.sink.queue_capacity, 256);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"executor": {{"generation_timeout_ms": 1000}}}}"#).unwrap();

        let config = ConfigLoader::load_with_env(
            Some(file.path()),
            env(&[
                ("TASKFLOW__EXECUTOR__GENERATION_TIMEOUT_MS", "2500"),
                ("TASKFLOW__SINK__QUEUE_CAPACITY", "8"),
            ]),
        )
        .unwrap();
        assert_eq!(config.executor.generation_timeout_ms, Some(2500));
        assert_eq!(config.sink.queue_capacity, 8);
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_with_env(Some(Path::new("/nonexistent/taskflow.toml")), None)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let err = ConfigLoader::load_with_env(
            None,
            env(&[("TASKFLOW__EXECUTOR__MAX_CONCURRENT_STEPS", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }
}
