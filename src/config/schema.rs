//! Configuration schema definitions.
//!
//! This module defines the gateway's own settings file (TOML) and the
//! on-disk shape of the backend server list (JSON).
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where the backend server list comes from and how it is watched.
    pub servers: ServersConfig,

    /// Outbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Local admin API.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Backend server list source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServersConfig {
    /// Path to the JSON server list.
    pub path: String,

    /// Reload the list when the file changes.
    pub watch: bool,

    /// Poll interval for platforms where notify falls back to polling.
    pub poll_interval_secs: u64,
}

impl Default for ServersConfig {
    fn default() -> Self {
        Self {
            path: "servers.json".to_string(),
            watch: true,
            poll_interval_secs: 2,
        }
    }
}

/// One entry of the server list file.
///
/// ```json
/// [{ "host": "http://localhost:3001" }, { "host": "http://localhost:3002" }]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerDescriptor {
    /// Base URL of the backend (scheme, host and port).
    pub host: String,
}

/// Timeout configuration for outbound calls.
///
/// Nothing upstream of the gateway bounds a hung backend, so the request
/// timeout is always applied. 30 seconds unless configured.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time for the outbound request and response body, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// Admin API bind address. Unauthenticated, keep it local.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.servers.path, "servers.json");
        assert!(config.servers.watch);
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(!config.admin.enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [timeouts]
            request_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.timeouts.request_secs, 3);
        assert_eq!(config.timeouts.connect_secs, 5);
    }

    #[test]
    fn test_descriptor_ignores_extra_fields() {
        let list: Vec<ServerDescriptor> =
            serde_json::from_str(r#"[{"host": "http://localhost:3001", "name": "one"}]"#).unwrap();
        assert_eq!(list[0].host, "http://localhost:3001");
    }
}
