use tracing::info;

use crate::storage::DEFAULT_DATABASE_URL;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

/// Server settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    /// Origin the browser frontend is served from
    pub cors_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment, after reading an optional `.env`
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values fall back to the defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            database_url: read("DATABASE_URL", DEFAULT_DATABASE_URL),
            bind_address: read("BIND_ADDRESS", DEFAULT_BIND_ADDRESS),
            cors_origin: read("CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database_url, "sqlite:finance.db");
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite:/tmp/other.db"),
            ("BIND_ADDRESS", "  "),
            ("CORS_ORIGIN", "http://localhost:5173"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.database_url, "sqlite:/tmp/other.db");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.cors_origin, "http://localhost:5173");
    }
}
