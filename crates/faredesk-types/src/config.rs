//! Application configuration types.
//!
//! `AppConfig` represents the top-level `config.toml` in the data
//! directory. All fields have sensible defaults so a missing or partial
//! file still yields a working configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the faredesk backend.
///
/// Loaded from `~/.faredesk/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the API server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the API server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Currency assigned to support tickets created through the API.
    /// Sold tickets carry their own currency from the booking pipeline.
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_currency: default_currency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_currency, "USD");
    }

    #[test]
    fn test_config_deserialize_with_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
host = "0.0.0.0"
port = 9090
default_currency = "EUR"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.default_currency, "EUR");
    }
}
