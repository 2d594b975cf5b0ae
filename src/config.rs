//! # Operator Configuration
//!
//! Operator-level settings loaded from environment variables.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CONNECT_DEPLOYMENT_MANIFEST, DEFAULT_CONNECT_HOST, DEFAULT_CONNECT_NAMESPACE,
    DEFAULT_CONNECT_REQUEST_TIMEOUT_SECS, DEFAULT_CONNECT_SERVICE_MANIFEST,
};

/// Operator-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Clone)]
pub struct OperatorConfig {
    /// Base URL of the 1Password Connect server
    pub connect_host: String,
    /// Bearer token for the Connect server
    /// Never printed by the `Debug` implementation
    pub connect_token: Option<String>,
    /// Bootstrap the Connect Deployment and Service on startup
    pub manage_connect: bool,
    /// Namespace the Connect Deployment and Service live in
    pub connect_namespace: String,
    /// Path to the Connect Deployment manifest (YAML or JSON)
    pub connect_deployment_manifest: PathBuf,
    /// Path to the Connect Service manifest (YAML or JSON)
    pub connect_service_manifest: PathBuf,
    /// Timeout for a single Connect API request (seconds)
    pub connect_request_timeout_secs: u64,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
    /// Enable metrics collection
    pub enable_metrics: bool,
}

impl fmt::Debug for OperatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorConfig")
            .field("connect_host", &self.connect_host)
            .field(
                "connect_token",
                &self.connect_token.as_ref().map(|_| "<redacted>"),
            )
            .field("manage_connect", &self.manage_connect)
            .field("connect_namespace", &self.connect_namespace)
            .field("connect_deployment_manifest", &self.connect_deployment_manifest)
            .field("connect_service_manifest", &self.connect_service_manifest)
            .field(
                "connect_request_timeout_secs",
                &self.connect_request_timeout_secs,
            )
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("enable_metrics", &self.enable_metrics)
            .finish()
    }
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            connect_host: DEFAULT_CONNECT_HOST.to_string(),
            connect_token: None,
            manage_connect: false,
            connect_namespace: DEFAULT_CONNECT_NAMESPACE.to_string(),
            connect_deployment_manifest: PathBuf::from(DEFAULT_CONNECT_DEPLOYMENT_MANIFEST),
            connect_service_manifest: PathBuf::from(DEFAULT_CONNECT_SERVICE_MANIFEST),
            connect_request_timeout_secs: DEFAULT_CONNECT_REQUEST_TIMEOUT_SECS,
            log_level: "INFO".to_string(),
            log_format: "text".to_string(),
            enable_metrics: true,
        }
    }
}

impl OperatorConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            connect_host: env_var_or_default_str("OP_CONNECT_HOST", DEFAULT_CONNECT_HOST),
            connect_token: std::env::var("OP_CONNECT_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
            manage_connect: env_var_or_default_bool("MANAGE_CONNECT", false),
            connect_namespace: env_var_or_default_str(
                "CONNECT_NAMESPACE",
                DEFAULT_CONNECT_NAMESPACE,
            ),
            connect_deployment_manifest: PathBuf::from(env_var_or_default_str(
                "CONNECT_DEPLOYMENT_MANIFEST",
                DEFAULT_CONNECT_DEPLOYMENT_MANIFEST,
            )),
            connect_service_manifest: PathBuf::from(env_var_or_default_str(
                "CONNECT_SERVICE_MANIFEST",
                DEFAULT_CONNECT_SERVICE_MANIFEST,
            )),
            connect_request_timeout_secs: env_var_or_default(
                "CONNECT_REQUEST_TIMEOUT_SECS",
                DEFAULT_CONNECT_REQUEST_TIMEOUT_SECS,
            ),
            log_level: env_var_or_default_str("LOG_LEVEL", "INFO"),
            log_format: env_var_or_default_str("LOG_FORMAT", "text"),
            enable_metrics: env_var_or_default_bool("ENABLE_METRICS", true),
        }
    }

    /// Get Connect request timeout duration
    pub fn connect_request_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_request_timeout_secs)
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as boolean or return default
fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
