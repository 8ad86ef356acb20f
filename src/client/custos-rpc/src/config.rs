//! Client configuration.

use std::time::Duration;

/// API version announced with every call.
pub const API_VERSION: &str = "1.0";

/// Default server address.
pub const DEFAULT_SERVER: &str = "https://localhost/custos";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach the Custos server.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server base URL; calls go to `<server>/json`.
    pub server: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Authentication token.
    pub token: Option<String>,
    /// API version announced to the server.
    pub api_version: String,
}

impl ClientConfig {
    /// Configuration for `server` with defaults elsewhere.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    /// Sets the authentication token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Sets the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// JSON-RPC endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/json", self.server.trim_end_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
            api_version: API_VERSION.to_string(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server", &self.server)
            .field("timeout", &self.timeout)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("api_version", &self.api_version)
            .finish()
    }
}
