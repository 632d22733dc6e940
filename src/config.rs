//! Runtime configuration, read from the environment at startup.
//!
//! A `.env` file in the working directory is honored outside of tests.

use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(String),
    #[error("invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub log_level: Level,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{log_level_str}' is not a valid log level"),
            )
        })?;

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "DB_MAX_CONNECTIONS".to_string(),
                        format!("'{raw}' is not a positive integer"),
                    )
                })?,
            None => 5,
        };

        Ok(Self {
            database_url,
            log_level,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/burnfree")]))
            .unwrap();
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn database_url_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref var) if var == "DATABASE_URL"));
    }

    #[test]
    fn rejects_bad_log_level() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/burnfree"),
            ("RUST_LOG", "chatty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "RUST_LOG"));
    }

    #[test]
    fn rejects_zero_connections() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/burnfree"),
            ("DB_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "DB_MAX_CONNECTIONS"));
    }
}
