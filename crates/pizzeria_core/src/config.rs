//! Core runtime configuration.
//!
//! # Responsibility
//! - Collect database, logging and listing settings in one value.
//! - Read overrides from environment variables.
//!
//! # Invariants
//! - Missing variables fall back to defaults; malformed ones are errors.
//! - `list_limit_default <= list_limit_max` and both are non-zero.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "PIZZERIA_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PIZZERIA_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PIZZERIA_LOG_DIR";
pub const ENV_LIST_LIMIT: &str = "PIZZERIA_LIST_LIMIT";

const LIST_LIMIT_DEFAULT: u32 = 20;
const LIST_LIMIT_MAX: u32 = 100;

/// Page-size policy for list use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimits {
    pub default: u32,
    pub max: u32,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self {
            default: LIST_LIMIT_DEFAULT,
            max: LIST_LIMIT_MAX,
        }
    }
}

impl ListLimits {
    /// `None` and `Some(0)` use the default; larger values clamp to `max`.
    pub fn normalize(&self, limit: Option<u32>) -> u32 {
        match limit {
            Some(0) | None => self.default,
            Some(value) if value > self.max => self.max,
            Some(value) => value,
        }
    }
}

/// Settings shared by the CLI and any embedding host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Database file. `None` opens an in-memory store.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute log directory. `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    pub list_limits: ListLimits,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            list_limits: ListLimits::default(),
        }
    }
}

impl CoreConfig {
    /// Builds configuration from process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        config.db_path = non_blank(ENV_DB_PATH).map(PathBuf::from);
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = non_blank(ENV_LOG_DIR).map(PathBuf::from);

        if let Some(raw) = non_blank(ENV_LIST_LIMIT) {
            let limit = raw.parse::<u32>().map_err(|err| {
                format!("{ENV_LIST_LIMIT} must be a positive integer, got `{raw}`: {err}")
            })?;
            if limit == 0 {
                return Err(format!("{ENV_LIST_LIMIT} must be greater than zero"));
            }
            config.list_limits.default = limit.min(config.list_limits.max);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, ListLimits, ENV_DB_PATH, ENV_LIST_LIMIT, ENV_LOG_DIR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = CoreConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert!(config.db_path.is_none());
    }

    #[test]
    fn environment_overrides_paths_and_limit() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/menu.db"),
            (ENV_LOG_DIR, " /tmp/logs "),
            (ENV_LIST_LIMIT, "500"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/menu.db")));
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(config.list_limits.default, 100);
    }

    #[test]
    fn malformed_limit_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(ENV_LIST_LIMIT, "ten")])).unwrap_err();
        assert!(err.contains(ENV_LIST_LIMIT));
        assert!(CoreConfig::from_lookup(lookup_from(&[(ENV_LIST_LIMIT, "0")])).is_err());
    }

    #[test]
    fn list_limits_default_and_clamp() {
        let limits = ListLimits::default();
        assert_eq!(limits.normalize(None), 20);
        assert_eq!(limits.normalize(Some(0)), 20);
        assert_eq!(limits.normalize(Some(7)), 7);
        assert_eq!(limits.normalize(Some(1_000)), 100);
    }
}
