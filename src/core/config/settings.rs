use super::parsing::{env_optional, parse_bool, parse_environment, parse_u32, parse_u64};
use super::types::{
    ConfigError, DatabaseName, DatabaseSettings, MongoUri, RuntimeSettings, Settings,
    TelemetrySettings,
};

const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        Self::from_source(env_optional)
    }

    /// Builds settings from any key lookup; `load` uses the process environment.
    pub(crate) fn from_source<F>(source: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| source(key).unwrap_or_else(|| default.into());

        let environment = parse_environment(source("EDUHUB_ENV").or_else(|| source("ENVIRONMENT")));
        let strict_config =
            source("EDUHUB_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let configured_uri = source("MONGODB_URI");
        let uri_configured = configured_uri.is_some();
        let mongodb_uri = configured_uri.unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string());
        let db_name = or_default("EDUHUB_DB_NAME", "eduhub_db");

        let max_pool_size =
            parse_u32("MONGODB_MAX_POOL_SIZE", or_default("MONGODB_MAX_POOL_SIZE", "50"))?;
        let min_pool_size =
            parse_u32("MONGODB_MIN_POOL_SIZE", or_default("MONGODB_MIN_POOL_SIZE", "10"))?;
        let max_idle_time_ms =
            parse_u64("MONGODB_MAX_IDLE_TIME_MS", or_default("MONGODB_MAX_IDLE_TIME_MS", "45000"))?;
        let server_selection_timeout_ms = parse_u64(
            "MONGODB_SERVER_SELECTION_TIMEOUT_MS",
            or_default("MONGODB_SERVER_SELECTION_TIMEOUT_MS", "5000"),
        )?;

        let log_level = or_default("EDUHUB_LOG_LEVEL", "info");
        let json = source("EDUHUB_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            source("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            database: DatabaseSettings {
                mongodb_uri: MongoUri::parse(mongodb_uri)?,
                db_name: DatabaseName::parse(db_name)?,
                max_pool_size,
                min_pool_size,
                max_idle_time_ms,
                server_selection_timeout_ms,
                uri_configured,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    /// Returns a copy pointing at another database on the same deployment.
    pub(crate) fn with_database_name(&self, name: &str) -> Result<Self, ConfigError> {
        let mut settings = self.clone();
        settings.database.db_name = DatabaseName::parse(name.to_string())?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MONGODB_MAX_POOL_SIZE",
                value: self.database.max_pool_size.to_string(),
            });
        }

        if self.database.min_pool_size > self.database.max_pool_size {
            return Err(ConfigError::InvalidValue {
                field: "MONGODB_MIN_POOL_SIZE",
                value: self.database.min_pool_size.to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if !self.database.uri_configured {
            return Err(ConfigError::MissingSecret("MONGODB_URI"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::core::config::types::Environment;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let values: HashMap<String, String> =
            pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();
        Settings::from_source(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_match_pool_profile() {
        let settings = settings_from(&[]).expect("defaults");
        let db = settings.database();
        assert_eq!(db.uri(), "mongodb://localhost:27017");
        assert_eq!(db.name(), "eduhub_db");
        assert_eq!(db.max_pool_size, 50);
        assert_eq!(db.min_pool_size, 10);
        assert_eq!(db.max_idle_time().as_millis(), 45_000);
        assert_eq!(db.server_selection_timeout().as_millis(), 5_000);
        assert_eq!(settings.runtime().environment, Environment::Development);
        assert!(!settings.telemetry().json);
    }

    #[test]
    fn strict_mode_requires_explicit_uri() {
        let err = settings_from(&[("EDUHUB_ENV", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("MONGODB_URI")));

        let settings = settings_from(&[
            ("EDUHUB_ENV", "production"),
            ("MONGODB_URI", "mongodb+srv://cluster.example.net/"),
        ])
        .expect("production settings");
        assert!(settings.runtime().strict_config);
    }

    #[test]
    fn rejects_min_pool_above_max() {
        let err = settings_from(&[("MONGODB_MAX_POOL_SIZE", "5"), ("MONGODB_MIN_POOL_SIZE", "6")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "MONGODB_MIN_POOL_SIZE", .. }));
    }

    #[test]
    fn rejects_non_mongodb_scheme() {
        let err = settings_from(&[("MONGODB_URI", "postgres://localhost/db")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUri(_)));
    }

    #[test]
    fn with_database_name_validates() {
        let settings = settings_from(&[]).expect("defaults");
        let scoped = settings.with_database_name("eduhub_test_1").expect("scoped");
        assert_eq!(scoped.database().name(), "eduhub_test_1");
        assert!(settings.with_database_name("bad.name").is_err());
    }
}
