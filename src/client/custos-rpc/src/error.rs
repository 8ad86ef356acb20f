//! Transport error types.

use custos_errors::{ErrorKind, Params, PublicError};
use thiserror::Error;
use tracing::warn;

/// Failures below the JSON-RPC layer.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The HTTP client could not be built.
    #[error("cannot build HTTP client: {0}")]
    Client(String),

    /// The server could not be reached.
    #[error("cannot connect to {uri}: {reason}")]
    Connect {
        /// Endpoint URL.
        uri: String,
        /// Underlying failure.
        reason: String,
    },

    /// The server refused the credentials.
    #[error("{uri} rejected the credentials")]
    Unauthorized {
        /// Endpoint URL.
        uri: String,
    },

    /// The server answered with something that is not a JSON-RPC response.
    #[error("malformed response from {uri}: {reason}")]
    Malformed {
        /// Endpoint URL.
        uri: String,
        /// What was wrong.
        reason: String,
    },
}

impl RpcError {
    /// Public error to report for this failure.
    ///
    /// Malformed responses are concealed as a remote internal error; the
    /// detail is only logged.
    pub fn into_public(self) -> PublicError {
        match self {
            Self::Client(reason) => {
                warn!(reason = %reason, "HTTP client setup failed");
                PublicError::internal()
            },
            Self::Connect { uri, reason } => PublicError::transport(uri, reason),
            Self::Unauthorized { uri } => PublicError::with_message(
                ErrorKind::Authentication,
                format!("{} rejected the credentials", uri),
                Params::new(),
            ),
            Self::Malformed { uri, reason } => {
                warn!(uri = %uri, reason = %reason, "malformed response from server");
                PublicError::remote_internal(uri)
            },
        }
    }
}

impl From<RpcError> for PublicError {
    fn from(err: RpcError) -> Self {
        err.into_public()
    }
}
