use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(super) runtime: RuntimeSettings,
    pub(super) database: DatabaseSettings,
    pub(super) telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct DatabaseSettings {
    pub(crate) mongodb_uri: MongoUri,
    pub(crate) db_name: DatabaseName,
    pub(crate) max_pool_size: u32,
    pub(crate) min_pool_size: u32,
    pub(crate) max_idle_time_ms: u64,
    pub(crate) server_selection_timeout_ms: u64,
    pub(super) uri_configured: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MongoUri(pub(super) String);

#[derive(Debug, Clone)]
pub(crate) struct DatabaseName(pub(super) String);

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid mongodb uri: {0}")]
    InvalidUri(String),
    #[error("invalid database name: {0}")]
    InvalidDatabaseName(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("missing required setting {0}")]
    MissingSecret(&'static str),
}

impl DatabaseSettings {
    pub(crate) fn uri(&self) -> &str {
        &self.mongodb_uri.0
    }

    pub(crate) fn name(&self) -> &str {
        &self.db_name.0
    }

    pub(crate) fn max_idle_time(&self) -> Duration {
        Duration::from_millis(self.max_idle_time_ms)
    }

    pub(crate) fn server_selection_timeout(&self) -> Duration {
        Duration::from_millis(self.server_selection_timeout_ms)
    }
}

impl MongoUri {
    pub(super) fn parse(value: String) -> Result<Self, ConfigError> {
        let trimmed = value.trim();
        if !(trimmed.starts_with("mongodb://") || trimmed.starts_with("mongodb+srv://")) {
            return Err(ConfigError::InvalidUri(value));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl DatabaseName {
    pub(super) fn parse(value: String) -> Result<Self, ConfigError> {
        let invalid = value.trim().is_empty()
            || value.len() > 63
            || value.chars().any(|ch| matches!(ch, '/' | '\\' | '.' | ' ' | '"' | '$'));
        if invalid {
            return Err(ConfigError::InvalidDatabaseName(value));
        }

        Ok(Self(value))
    }
}
