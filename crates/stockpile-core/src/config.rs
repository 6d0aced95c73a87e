//! Configuration loading and typed config structures for the game host.
//!
//! The configuration lives in `stockpile-config.yaml` next to the binary.
//! It only covers how the game is hosted (tick period, randomness, logging);
//! the rules themselves are fixed in [`crate::rules`].

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::demand::NegativeDemand;

/// Environment variable overriding `clock.tick_interval_ms`.
pub const ENV_TICK_INTERVAL_MS: &str = "STOCKPILE_TICK_INTERVAL_MS";

/// Longest accepted tick period, in milliseconds.
pub const MAX_TICK_INTERVAL_MS: u64 = 60_000;

/// Environment variable overriding `demand.seed`.
pub const ENV_SEED: &str = "STOCKPILE_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Tick timing.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Demand randomness.
    #[serde(default)]
    pub demand: DemandConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override file values:
    /// - `STOCKPILE_TICK_INTERVAL_MS` overrides `clock.tick_interval_ms`
    /// - `STOCKPILE_SEED` overrides `demand.seed`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override is not a number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TICK_INTERVAL_MS) {
            self.clock.tick_interval_ms =
                raw.trim().parse().map_err(|_err| ConfigError::Invalid {
                    reason: format!("{ENV_TICK_INTERVAL_MS} is not a number: {raw}"),
                })?;
        }
        if let Some(raw) = lookup(ENV_SEED) {
            let seed = raw.trim().parse().map_err(|_err| ConfigError::Invalid {
                reason: format!("{ENV_SEED} is not a number: {raw}"),
            })?;
            self.demand.seed = Some(seed);
        }
        Ok(())
    }

    /// Reject values the game cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the tick period is zero or longer
    /// than [`MAX_TICK_INTERVAL_MS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "clock.tick_interval_ms must be at least 1".to_owned(),
            });
        }
        if self.clock.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "clock.tick_interval_ms must be at most {MAX_TICK_INTERVAL_MS}, got {}",
                    self.clock.tick_interval_ms
                ),
            });
        }
        Ok(())
    }
}

/// Tick timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl ClockConfig {
    /// The tick period as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Demand randomness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DemandConfig {
    /// Seed for reproducible demand; seeded from the OS when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Treatment of negative daily demand.
    #[serde(default)]
    pub negative_demand: NegativeDemand,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_owned()
}
