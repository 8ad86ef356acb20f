//! # Custos Keys
//!
//! Private key material used to build certificate signing requests.
//!
//! Two sources are supported, chosen once per request through
//! [`KeyMaterialHandle`]:
//!
//! - [`SecurityModuleAdaptor`]: a key database directory. A fresh P-256 key is
//!   generated inside it for each request.
//! - [`KeyFileAdaptor`]: an existing PEM private key (RSA or P-256, PKCS#1,
//!   SEC1 or PKCS#8, optionally encrypted).
//!
//! Both publish a DER SubjectPublicKeyInfo and sign DER
//! `CertificationRequestInfo` templates into PEM CSRs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adaptor;
pub mod database;
pub mod error;
pub mod keyfile;
pub mod secret;

mod key;
mod request;

pub use adaptor::{AdaptorProvider, KeyMaterialAdaptor, KeyMaterialHandle, LocalKeyMaterial};
pub use database::SecurityModuleAdaptor;
pub use error::KeyMaterialError;
pub use keyfile::KeyFileAdaptor;
pub use secret::UnlockSecret;
