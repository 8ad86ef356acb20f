//! # Custos RPC
//!
//! JSON-RPC over HTTP client implementing [`custos_cert::CertService`].
//!
//! Errors reported by the server are decoded with
//! [`custos_errors::decode_from_peer`], so a server-side internal error never
//! shows its detail here. An unreachable server is a `TransportError` (4001).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;

pub use client::{RpcClient, RpcRequest, RpcResponse, TOKEN_HEADER};
pub use config::{ClientConfig, API_VERSION, DEFAULT_SERVER, DEFAULT_TIMEOUT};
pub use error::RpcError;
