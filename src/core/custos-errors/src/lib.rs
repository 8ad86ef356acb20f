//! # Custos Errors
//!
//! Coded error taxonomy shared by the Custos client and server.
//!
//! ## Categories
//!
//! - **Private** errors ([`PrivateError`]) stay inside the process.
//! - **Public** errors ([`PublicError`], codes 900 and up) are the only ones
//!   that may cross the RPC boundary, in the [`WireError`] shape.
//!
//! Codes are grouped in fixed ranges (see [`ErrorKind`]); a code never
//! changes once assigned and 904 - 999 stay reserved.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod kind;
pub mod private;
pub mod public;
pub mod registry;
pub mod template;
pub mod wire;

pub use kind::{ErrorKind, ErrorRange};
pub use private::PrivateError;
pub use public::{Error, ExitClass, PublicError};
pub use registry::{Category, ErrorDescriptor, ErrorRegistry};
pub use template::{render, NoTranslation, Param, Params, Translate};
pub use wire::{decode, decode_from_peer, encode, CodecError, WireError};
