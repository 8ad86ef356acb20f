//! Remote certificate service contract.
//!
//! Binary values (public keys, templates, certificates) travel as standard
//! base64 strings.

use async_trait::async_trait;
use custos_errors::PublicError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Input of `cert_get_requestdata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDataParams {
    /// Profile the request template is built from.
    pub profile_id: Option<String>,
    /// Principal the certificate is for.
    pub principal: Option<String>,
    /// Base64 DER SubjectPublicKeyInfo.
    pub public_key_info: String,
}

/// Output of `cert_get_requestdata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestData {
    /// Base64 DER `CertificationRequestInfo` to sign.
    pub request_info: String,
}

/// Options forwarded to `cert_request`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueOptions {
    /// Principal the certificate is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
    /// Issuance profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    /// Create the principal if it does not exist.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub add: bool,
    /// Return the certificate chain.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub chain: bool,
    /// Other server options, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Options forwarded to `cert_show`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowOptions {
    /// Return the certificate chain.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub chain: bool,
    /// Other server options, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Search criteria forwarded to `cert_find`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindCriteria {
    /// Base64 DER certificate to look for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    /// Subject common name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Maximum number of results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizelimit: Option<u32>,
    /// Other server options, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An issued or stored certificate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertResult {
    /// Base64 DER certificate.
    pub certificate: String,
    /// Base64 DER chain, leaf first, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_chain: Option<Vec<String>>,
    /// Everything else the server reported (serial, subject, issuer...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `cert_find`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindResult {
    /// Matching certificates.
    pub result: Vec<CertResult>,
    /// Number of matches returned.
    pub count: u32,
    /// Whether the size limit cut the search short.
    #[serde(default)]
    pub truncated: bool,
}

/// The remote certificate service.
///
/// Errors are already public: they come from the peer through the wire codec
/// or from the transport.
#[async_trait]
pub trait CertService: Send + Sync {
    /// Builds a request template for a public key.
    async fn cert_get_requestdata(
        &self,
        params: RequestDataParams,
    ) -> Result<RequestData, PublicError>;

    /// Submits a PEM CSR for issuance.
    async fn cert_request(&self, csr: String, options: IssueOptions)
        -> Result<CertResult, PublicError>;

    /// Fetches a certificate by serial number.
    async fn cert_show(&self, serial: String, options: ShowOptions)
        -> Result<CertResult, PublicError>;

    /// Searches certificates.
    async fn cert_find(&self, criteria: FindCriteria) -> Result<FindResult, PublicError>;
}
