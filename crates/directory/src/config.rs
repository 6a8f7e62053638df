use serde::Deserialize;

pub use persistence::db::DatabaseConfig;

/// Configuration for a process hosting the client directory.
///
/// Built once at startup and passed by reference to whatever needs it.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. `.env` in the working directory, if present
    /// 2. config/default.toml (optional)
    /// 3. config/local.toml (optional, not in git)
    /// 4. Environment variables with CD__ prefix, e.g. `CD__DATABASE__PASSWORD`
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CD").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing from embedded defaults and overrides,
    /// without touching config files or the environment.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [database]
            host = "localhost"
            port = 5432
            name = "CLIENTSBASE"
            username = ""
            password = ""
            max_connections = 5
            min_connections = 0
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.username.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CD__DATABASE__USERNAME environment variable must be set".to_string(),
            ));
        }

        if self.database.name.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "database.name cannot be empty".to_string(),
            ));
        }

        if self.database.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Database port cannot be 0".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "max_connections must be at least 1".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        Ok(())
    }
}
