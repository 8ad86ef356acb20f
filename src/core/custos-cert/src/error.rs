//! Mapping of local failures onto public errors.

use custos_errors::{PrivateError, PublicError};
use custos_keys::KeyMaterialError;

/// Re-raises a key material failure as its public counterpart.
pub fn key_material(err: KeyMaterialError) -> PublicError {
    match err {
        KeyMaterialError::KeyAccess(detail) => PublicError::key_access(detail),
        KeyMaterialError::Signing(detail) => PublicError::signing(detail),
    }
}

/// Re-raises a file failure as a validation error of option `name`.
pub fn file_option(name: &str, err: PrivateError) -> PublicError {
    match err {
        PrivateError::File { reason } => PublicError::validation(name, reason),
        other => PublicError::from(other),
    }
}
