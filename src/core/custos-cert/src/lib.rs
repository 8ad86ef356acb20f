//! # Custos Cert
//!
//! Client-side certificate workflows on top of a remote [`CertService`]:
//!
//! - [`CertRequestWorkflow`]: submit a ready CSR, or build and sign one
//!   locally from a key database or key file first.
//! - [`CertRetrieval`]: `cert_show` and `cert_find`.
//!
//! Issued certificates can be written to a file as PEM (see
//! [`retrieve::deliver`]). Every failure is a [`custos_errors::PublicError`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod request;
pub mod retrieve;
pub mod service;

pub use request::{CertRequest, CertRequestWorkflow};
pub use retrieve::{check_writable_file, CertRetrieval, FindRequest, InvocationContext, ShowRequest};
pub use service::{
    CertResult, CertService, FindCriteria, FindResult, IssueOptions, RequestData,
    RequestDataParams, ShowOptions,
};
