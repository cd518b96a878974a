//! Configuration loaded from environment variables.

use std::str::FromStr;

use crate::error::ShopError;

/// How cart writes are guarded against concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartWriteMode {
    /// Every write replaces the whole cart; the last writer wins.
    #[default]
    LastWriterWins,

    /// Writes only apply if the stored `cart_version` is the one last read.
    Versioned,
}

impl FromStr for CartWriteMode {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "last-writer-wins" | "lww" => Ok(CartWriteMode::LastWriterWins),
            "versioned" => Ok(CartWriteMode::Versioned),
            other => Err(ShopError::Config(format!("unknown cart write mode: {other}"))),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ShopError::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// Shop configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `DATABASE_URL`: PostgreSQL connection string (default: unset, in-memory store)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `CART_WRITE_MODE`: `last-writer-wins` or `versioned` (default: `last-writer-wins`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub cart_write_mode: CartWriteMode,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl ShopConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ShopError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ShopError> {
        let defaults = Self::default();

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_connections),
            cart_write_mode: lookup("CART_WRITE_MODE")
                .map(|mode| mode.parse())
                .transpose()?
                .unwrap_or(defaults.cart_write_mode),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|format| format.parse())
                .transpose()?
                .unwrap_or(defaults.log_format),
        })
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
            cart_write_mode: CartWriteMode::LastWriterWins,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = ShopConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.cart_write_mode, CartWriteMode::LastWriterWins);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let config = ShopConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("CART_WRITE_MODE", "Versioned"),
            ("RUST_LOG", "debug"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/shop")
        );
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.cart_write_mode, CartWriteMode::Versioned);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unparseable_pool_size_falls_back() {
        let config =
            ShopConfig::from_lookup(lookup(&[("DATABASE_MAX_CONNECTIONS", "many")])).unwrap();
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_empty_database_url_means_in_memory() {
        let config = ShopConfig::from_lookup(lookup(&[("DATABASE_URL", "")])).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_unknown_write_mode_is_rejected() {
        let result = ShopConfig::from_lookup(lookup(&[("CART_WRITE_MODE", "optimistic")]));
        assert!(matches!(result, Err(ShopError::Config(_))));
    }
}
