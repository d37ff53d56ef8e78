//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `trygr.toml` in the working directory (or the path in
//! `TRYGR_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use trygr_app::trigger_engine::EngineConfig;
use trygr_domain::error::TrygrError;
use trygr_domain::id::PostalCode;
use trygr_domain::trigger::Trigger;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Trigger engine and scheduler settings.
    pub engine: EngineSection,
    /// Initial trigger collection, replaceable at runtime through the API.
    pub triggers: Vec<Trigger>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Engine configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Seconds between scheduler ticks; a time trigger fires on the first tick
    /// at or after its target.
    pub tick_interval_secs: u64,
    /// Notify recipients when an action changed nothing.
    pub notify_on_noop: bool,
    /// Location refreshed from the store on every tick.
    pub postal_code: Option<String>,
    /// UTC offset used for `absoluteTime` triggers until a location is known.
    pub utc_offset_seconds: i32,
    /// Capacity of the in-process event bus.
    pub bus_capacity: usize,
}

impl Config {
    /// Load configuration from `trygr.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("TRYGR_CONFIG").unwrap_or_else(|_| "trygr.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("TRYGR_HOST") {
            self.server.host = val;
        }
        if let Some(val) = var("TRYGR_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = var("TRYGR_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("TRYGR_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("TRYGR_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("TRYGR_POSTAL_CODE") {
            self.engine.postal_code = Some(val).filter(|code| !code.is_empty());
        }
        if let Some(val) = var("TRYGR_TICK_SECS")
            && let Ok(secs) = val.parse()
        {
            self.engine.tick_interval_secs = secs;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "max_connections must be non-zero".to_string(),
            ));
        }
        if self.engine.tick_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "tick_interval_secs must be non-zero".to_string(),
            ));
        }
        if self.engine.bus_capacity == 0 {
            return Err(ConfigError::Validation(
                "bus_capacity must be non-zero".to_string(),
            ));
        }
        if FixedOffset::east_opt(self.engine.utc_offset_seconds).is_none() {
            return Err(ConfigError::Validation(format!(
                "utc_offset_seconds {} is out of range",
                self.engine.utc_offset_seconds
            )));
        }
        for (index, trigger) in self.triggers.iter().enumerate() {
            trigger
                .validate()
                .map_err(|source| ConfigError::Trigger { index, source })?;
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Engine policy derived from the `[engine]` section.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            notify_on_noop: self.engine.notify_on_noop,
            tick_window: self.tick_interval(),
            default_utc_offset: FixedOffset::east_opt(self.engine.utc_offset_seconds)
                .unwrap_or_else(|| Utc.fix()),
        }
    }

    /// Interval between scheduler ticks.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.engine.tick_interval_secs)
    }

    /// The location the scheduler refreshes, if configured.
    #[must_use]
    pub fn postal_code(&self) -> Option<PostalCode> {
        self.engine.postal_code.as_deref().map(PostalCode::from)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:trygr.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "trygrd=info,trygr_app=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            tick_interval_secs: 60,
            notify_on_noop: false,
            postal_code: None,
            utc_offset_seconds: 0,
            bus_capacity: 256,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A configured trigger failed validation.
    #[error("invalid trigger at index {index}")]
    Trigger {
        index: usize,
        #[source]
        source: TrygrError,
    },
}
