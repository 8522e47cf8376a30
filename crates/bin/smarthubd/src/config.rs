//! Daemon settings — `smarthub.toml` layered under `SMARTHUB_*` variables.
//!
//! The file is optional and every key has a default. A variable that is set
//! wins over the file; numeric variables that fail to parse are ignored.

use std::time::Duration;

use serde::Deserialize;

use smarthub_adapter_storage_sqlite_sqlx::Config as StorageConfig;

/// Everything the daemon reads at startup.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub scheduler: SchedulerConfig,
}

/// `[server]`: where the HTTP API listens.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// `[database]`: the device and job store.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite:smarthub.db?mode=rwc`.
    pub url: String,
    pub max_connections: u32,
}

/// `[logging]`
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives.
    pub filter: String,
}

/// `[scheduler]`: firing loop cadence and late-job policy.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Delay between queue scans, in milliseconds.
    pub poll_interval_ms: u64,
    /// Jobs overdue by more than this many seconds are discarded instead of
    /// fired. Unset means late jobs always fire.
    pub misfire_grace_secs: Option<u64>,
}

impl Config {
    /// Read `smarthub.toml` from the working directory, overlay the
    /// environment and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if the
    /// merged settings are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("smarthub.toml")?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(toml::from_str(&content)?)
    }

    /// Overlay variables resolved through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let number = |name: &str| var(name).and_then(|v| v.parse::<u64>().ok());

        if let Some(host) = var("SMARTHUB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = number("SMARTHUB_PORT").and_then(|p| u16::try_from(p).ok()) {
            self.server.port = port;
        }
        // `host:port` in one variable, applied after the separate ones.
        if let Some((host, port)) = var("SMARTHUB_BIND").as_deref().and_then(|b| b.rsplit_once(':')) {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(url) = var("SMARTHUB_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(filter) = var("RUST_LOG").or_else(|| var("SMARTHUB_LOG")) {
            self.logging.filter = filter;
        }
        if let Some(ms) = number("SMARTHUB_SCHEDULER_POLL_MS") {
            self.scheduler.poll_interval_ms = ms;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero"));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be non-zero",
            ));
        }
        if self.scheduler.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "scheduler.poll_interval_ms must be non-zero",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Settings for the `SQLite` adapter.
    #[must_use]
    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            database_url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.scheduler.poll_interval_ms)
    }

    #[must_use]
    pub fn misfire_grace(&self) -> Option<Duration> {
        self.scheduler.misfire_grace_secs.map(Duration::from_secs)
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
            url: "sqlite:smarthub.db?mode=rwc".to_string(),
            max_connections: smarthub_adapter_storage_sqlite_sqlx::DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "smarthubd=info,smarthub_app=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            misfire_grace_secs: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read smarthub.toml")]
    Io(#[from] std::io::Error),
    #[error("smarthub.toml is not valid TOML")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(&'static str),
}
