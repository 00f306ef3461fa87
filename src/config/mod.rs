use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::db::DEFAULT_LIMIT;

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Row caps applied to the list queries.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub log: LogConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::defaults("development", "lightbnb")?
            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in settings from environment variables (with prefix "LIGHTBNB_")
            // E.g., `LIGHTBNB_DATABASE__MAX_CONNECTIONS=10` sets `Settings.database.max_connections`
            .add_source(Self::environment())
            .build()?;

        s.try_deserialize()
    }

    /// Test settings layered over an explicit variable map instead of the process environment.
    pub fn from_env_map(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::defaults("test", "lightbnb_test")?
            .set_default("database.max_connections", 2)?
            .set_default("database.acquire_timeout_secs", 1)?
            .add_source(Self::environment().source(Some(vars)))
            .build()?
            .try_deserialize()
    }

    fn defaults(
        environment: &str,
        database: &str,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let query = QueryConfig::default();

        Config::builder()
            .set_default("environment", environment)?
            .set_default(
                "database.url",
                format!("postgres://vagrant@localhost/{}", database),
            )?
            .set_default("database.max_connections", 5)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("query.default_limit", query.default_limit)?
            .set_default("query.max_limit", query.max_limit)?
            .set_default("log.level", "info")
    }

    fn environment() -> Environment {
        Environment::with_prefix("lightbnb")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_env_map(Map::new()).expect("Failed to load settings");
        assert_eq!(settings.environment, "test");
        assert_eq!(settings.database.url, "postgres://vagrant@localhost/lightbnb_test");
        assert_eq!(settings.database.max_connections, 2);
        assert_eq!(settings.database.acquire_timeout(), Duration::from_secs(1));
        assert_eq!(settings.query, QueryConfig::default());
        assert_eq!(settings.query.default_limit, 10);
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_environment_override() {
        let settings = Settings::from_env_map(vars(&[
            ("LIGHTBNB_DATABASE__URL", "postgres://test:test@db/lightbnb"),
            ("LIGHTBNB_DATABASE__MAX_CONNECTIONS", "8"),
            ("LIGHTBNB_QUERY__DEFAULT_LIMIT", "25"),
            ("LIGHTBNB_LOG__LEVEL", "debug"),
        ]))
        .expect("Failed to load settings");

        assert_eq!(settings.database.url, "postgres://test:test@db/lightbnb");
        assert_eq!(settings.database.max_connections, 8);
        assert_eq!(settings.query.default_limit, 25);
        assert_eq!(settings.query.max_limit, 100);
        assert_eq!(settings.log.level, "debug");
    }

    #[test]
    fn test_invalid_max_connections() {
        let result = Settings::from_env_map(vars(&[(
            "LIGHTBNB_DATABASE__MAX_CONNECTIONS",
            "plenty",
        )]));

        assert!(result.is_err(), "Expected error for invalid max_connections");
    }
}
