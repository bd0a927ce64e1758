//! Server configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use kycgate_types::DEMO_USER;
use kycgate_utils::LogFormat;

use crate::RpcError;

/// Header carrying the vendor's webhook signature.
pub const DEFAULT_SIGNATURE_HEADER: &str = "Verification-Signature";

/// Configuration for the API server.
///
/// Can be loaded from a TOML file via [`ServerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to run the WebSocket status feed.
    #[serde(default)]
    pub enable_websocket: bool,

    /// WebSocket port (if enabled).
    #[serde(default = "default_ws_port")]
    pub websocket_port: u16,

    /// User assumed when a request carries no `X-User-Id` header.
    #[serde(default = "default_user")]
    pub default_user: String,

    /// Shared secret for webhook signatures. Without one every webhook is
    /// rejected. Never written back out.
    #[serde(default, skip_serializing)]
    pub webhook_secret: Option<String>,

    /// Name of the header carrying the webhook signature.
    #[serde(default = "default_signature_header")]
    pub signature_header: String,

    /// Expose the simulate endpoint. Development only.
    #[serde(default)]
    pub enable_simulation: bool,

    /// Origin allowed by CORS.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_ws_port() -> u16 {
    3002
}

fn default_user() -> String {
    DEMO_USER.to_string()
}

fn default_signature_header() -> String {
    DEFAULT_SIGNATURE_HEADER.to_string()
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RpcError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RpcError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, RpcError> {
        toml::from_str(s).map_err(|e| RpcError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string. The webhook secret is
    /// omitted.
    pub fn to_toml_string(&self) -> Result<String, RpcError> {
        toml::to_string_pretty(self).map_err(|e| RpcError::Config(e.to_string()))
    }

    /// `bind_address:port` for the HTTP API.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// `bind_address:websocket_port` for the status feed.
    pub fn websocket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.websocket_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            enable_websocket: false,
            websocket_port: default_ws_port(),
            default_user: default_user(),
            webhook_secret: None,
            signature_header: default_signature_header(),
            enable_simulation: false,
            cors_origin: default_cors_origin(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ServerConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.port, 3001);
        assert_eq!(config.websocket_port, 3002);
        assert_eq!(config.default_user, "demo-user");
        assert_eq!(config.signature_header, "Verification-Signature");
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.log_format, LogFormat::Human);
        assert!(!config.enable_simulation);
        assert!(config.webhook_secret.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            port = 8080
            enable_simulation = true
            log_format = "json"
            webhook_secret = "wbhsec_abc"
        "#;
        let config = ServerConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.port, 8080);
        assert!(config.enable_simulation);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.webhook_secret.as_deref(), Some("wbhsec_abc"));
        assert_eq!(config.websocket_port, 3002); // default
    }

    #[test]
    fn secret_is_not_written_back() {
        let config = ServerConfig {
            webhook_secret: Some("wbhsec_abc".into()),
            ..Default::default()
        };
        let toml_str = config.to_toml_string().unwrap();
        assert!(!toml_str.contains("wbhsec_abc"));
        let parsed = ServerConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.port, config.port);
        assert!(parsed.webhook_secret.is_none());
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = ServerConfig::from_toml_str("port = \"high\"").unwrap_err();
        assert!(matches!(err, RpcError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_address = \"0.0.0.0\"\nport = 4000").unwrap();
        let config = ServerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.http_addr(), "0.0.0.0:4000");
        assert_eq!(config.websocket_addr(), "0.0.0.0:3002");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, RpcError::Config(_)));
    }
}
