//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds applied when a set omits one (0 = no expiry)
    pub default_ttl: u64,
    /// Background expiry sweep interval in seconds (0 disables the sweeper)
    pub check_interval: u64,
    /// Whether reads hand out a deep copy of the stored value
    ///
    /// When false, reads share the stored allocation through an `Arc`.
    pub clone_on_get: bool,
    /// Maximum number of keys the cache may hold (None = unlimited)
    pub max_keys: Option<usize>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 0, no expiry)
    /// - `CACHE_CHECK_INTERVAL` - Sweep frequency in seconds (default: 600)
    /// - `CACHE_CLONE_ON_GET` - Deep-copy values on read (default: true)
    /// - `CACHE_MAX_KEYS` - Key-count limit (default: unlimited)
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            check_interval: env::var("CACHE_CHECK_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            clone_on_get: env::var("CACHE_CLONE_ON_GET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            max_keys: env::var("CACHE_MAX_KEYS").ok().and_then(|v| v.parse().ok()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 0,
            check_interval: 600,
            clone_on_get: true,
            max_keys: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl, 0);
        assert_eq!(config.check_interval, 600);
        assert!(config.clone_on_get);
        assert_eq!(config.max_keys, None);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_DEFAULT_TTL");
        env::remove_var("CACHE_CHECK_INTERVAL");
        env::remove_var("CACHE_CLONE_ON_GET");
        env::remove_var("CACHE_MAX_KEYS");

        let config = Config::from_env();
        assert_eq!(config.default_ttl, 0);
        assert_eq!(config.check_interval, 600);
        assert!(config.clone_on_get);
        assert_eq!(config.max_keys, None);
    }
}
