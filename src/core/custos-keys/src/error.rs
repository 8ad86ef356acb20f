//! Key material error types.

use thiserror::Error;

/// Errors raised by key material adaptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyMaterialError {
    /// The key could not be read, or the unlock secret is wrong.
    #[error("cannot access private key: {0}")]
    KeyAccess(String),

    /// The request template was rejected or the signature operation failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

impl KeyMaterialError {
    /// Detail without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::KeyAccess(detail) | Self::Signing(detail) => detail,
        }
    }
}
