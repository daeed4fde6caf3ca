//! Application configuration schemas.
//!
//! Configuration is deserialized via the `config` crate from an optional
//! TOML file merged with `HOOKLINE__`-prefixed environment variables.
//! Every section has defaults, so an empty source yields a usable config.

pub mod commands;
pub mod lifecycle;
pub mod logging;

use serde::{Deserialize, Serialize};

use self::commands::CommandConfig;
use self::lifecycle::LifecycleConfig;
use self::logging::LoggingConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "HOOKLINE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Orchestrator settings.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Command hook settings.
    #[serde(default)]
    pub commands: CommandConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file and the environment.
    ///
    /// A missing file is not an error; environment variables such as
    /// `HOOKLINE__LIFECYCLE__RUN_POLICY=serialized` override file values.
    /// Environment values stay strings until deserialized into their field,
    /// so `HOOKLINE__COMMANDS__SHELL=1` still yields the shell `"1"`.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load), reading overrides from `env` instead of the
    /// process environment when given.
    fn load_with_env(
        path: Option<&str>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::new(path, config::FileFormat::Toml).required(false),
            );
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
