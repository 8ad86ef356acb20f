//! Wire format of public errors.
//!
//! ```json
//! {"code": 3007, "name": "ValidationError", "message": "...", "kw": {"name": "...", "error": "..."}}
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::kind::ErrorKind;
use crate::public::{Error, PublicError};
use crate::registry::ErrorRegistry;
use crate::template::{Param, Params};

/// Serialized form of a [`PublicError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    /// Numeric class code.
    pub code: u32,
    /// Class name.
    pub name: String,
    /// Rendered message.
    pub message: String,
    /// Message parameters.
    #[serde(default)]
    pub kw: Params,
}

/// Failures of the codec itself.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Only public errors may be serialized.
    #[error("private errors cannot be sent to a peer")]
    NotPublic,

    /// The payload is not a wire error.
    #[error("malformed wire error: {0}")]
    Malformed(String),
}

impl From<&PublicError> for WireError {
    fn from(err: &PublicError) -> Self {
        Self {
            code: err.code(),
            name: err.name().to_string(),
            message: err.message().to_string(),
            kw: err.params().clone(),
        }
    }
}

/// Encodes `err` for a peer. Private errors are refused.
pub fn encode(err: &Error) -> Result<WireError, CodecError> {
    match err {
        Error::Public(public) => Ok(WireError::from(public)),
        Error::Private(_) => Err(CodecError::NotPublic),
    }
}

/// Rebuilds a public error from its wire form.
///
/// Codes unknown to this process decode as the base class of their range,
/// keeping the original code, name, message and parameters.
pub fn decode(wire: WireError) -> PublicError {
    let kind = ErrorRegistry::global().resolve(wire.code);
    if wire.code == ErrorKind::Internal.code() {
        return PublicError::internal();
    }

    let name = if kind.code() == wire.code {
        Cow::Borrowed(kind.name())
    } else {
        Cow::Owned(wire.name)
    };
    PublicError::from_parts(kind, wire.code, name, wire.message, wire.kw)
}

/// Decodes an error reported by the peer at `uri`.
///
/// A peer's internal error becomes [`ErrorKind::RemoteInternal`] and a peer's
/// unknown-command error becomes [`ErrorKind::RemoteCommand`], both carrying
/// `uri` but none of the peer's own detail.
pub fn decode_from_peer(wire: WireError, uri: &str) -> PublicError {
    match wire.code {
        code if code == ErrorKind::Internal.code() => {
            warn!(uri = uri, "peer reported an internal error");
            PublicError::remote_internal(uri)
        },
        code if code == ErrorKind::Command.code() => {
            let name = match wire.kw.get("name") {
                Some(Param::Str(name)) => name.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            PublicError::remote_command(name, uri)
        },
        _ => decode(wire),
    }
}

/// Encodes a public error as JSON.
pub fn to_json(err: &PublicError) -> Result<String, CodecError> {
    serde_json::to_string(&WireError::from(err)).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Decodes a public error from JSON.
pub fn from_json(json: &str) -> Result<PublicError, CodecError> {
    let wire: WireError =
        serde_json::from_str(json).map_err(|e| CodecError::Malformed(e.to_string()))?;
    Ok(decode(wire))
}
