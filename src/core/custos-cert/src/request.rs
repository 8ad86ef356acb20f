//! Certificate request workflow.
//!
//! A request either carries a ready CSR or names a key source. In the second
//! case the CSR is built here:
//!
//! 1. open the key source (key database or key file)
//! 2. publish its public key to `cert_get_requestdata` and get a template
//! 3. sign the template locally
//!
//! The CSR is then submitted with `cert_request`, and the issued certificate
//! is stored to `certificate_out` when asked.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use custos_errors::PublicError;
use custos_keys::{AdaptorProvider, KeyMaterialHandle};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::key_material;
use crate::retrieve::deliver;
use crate::service::{CertResult, CertService, IssueOptions, RequestDataParams};

/// Input of a certificate request.
#[derive(Debug, Clone, Default)]
pub struct CertRequest {
    /// Ready PEM CSR. Excludes `database` and `private_key`.
    pub csr: Option<String>,
    /// Principal the certificate is for.
    pub principal: Option<String>,
    /// Issuance profile.
    pub profile_id: Option<String>,
    /// Profile used to build the CSR template; overrides `profile_id` there.
    pub csr_profile_id: Option<String>,
    /// Key database directory.
    pub database: Option<PathBuf>,
    /// PEM private key file.
    pub private_key: Option<PathBuf>,
    /// File holding the database or key password.
    pub password_file: Option<PathBuf>,
    /// Where to store the issued certificate.
    pub certificate_out: Option<PathBuf>,
    /// Fetch (and store) the whole chain.
    pub chain: bool,
    /// Create the principal if it does not exist.
    pub add: bool,
    /// Other server options, forwarded untouched.
    pub extra: Map<String, Value>,
}

impl CertRequest {
    /// The key source to build the CSR with. The database wins when both are
    /// given.
    fn key_material(&self) -> Result<KeyMaterialHandle, PublicError> {
        match (&self.database, &self.private_key) {
            (Some(database), private_key) => {
                if private_key.is_some() {
                    warn!("both 'database' and 'private_key' given, using 'database'");
                }
                Ok(KeyMaterialHandle::SecurityModule {
                    location: database.clone(),
                    unlock_secret: self.password_file.clone(),
                })
            },
            (None, Some(private_key)) => Ok(KeyMaterialHandle::KeyFile {
                location: private_key.clone(),
                unlock_secret: self.password_file.clone(),
            }),
            (None, None) => Err(PublicError::invocation(
                "One of 'database' or 'private_key' is required",
            )),
        }
    }

    /// Options sent along with the CSR. Client-side options stay here.
    fn issue_options(&self) -> IssueOptions {
        IssueOptions {
            principal: self.principal.clone(),
            profile_id: self.profile_id.clone(),
            add: self.add,
            chain: self.chain,
            extra: self.extra.clone(),
        }
    }
}

/// Drives one certificate request end to end.
pub struct CertRequestWorkflow<'a> {
    service: &'a dyn CertService,
    provider: &'a dyn AdaptorProvider,
}

impl<'a> CertRequestWorkflow<'a> {
    /// Creates a workflow over `service`, opening key sources with `provider`.
    pub fn new(service: &'a dyn CertService, provider: &'a dyn AdaptorProvider) -> Self {
        Self { service, provider }
    }

    /// Runs the request and returns the issuance result unchanged.
    ///
    /// # Errors
    ///
    /// - `MutuallyExclusiveError` if a CSR and a key source are both given
    /// - `InvocationError` if neither is given
    /// - `KeyAccessError` / `SigningError` from the key source
    /// - `CertificateOperationError` if the template or the generated CSR is
    ///   unusable
    /// - `ValidationError` if `certificate_out` is not writable
    /// - any error reported by the service
    pub async fn execute(&self, request: CertRequest) -> Result<CertResult, PublicError> {
        let has_key_source = request.database.is_some() || request.private_key.is_some();
        if request.csr.is_some() && has_key_source {
            return Err(PublicError::mutually_exclusive(
                "Options 'database' and 'private_key' are not compatible with 'csr'",
            ));
        }

        let csr = match &request.csr {
            Some(csr) => csr.clone(),
            None => self.generate_csr(&request).await?,
        };

        info!(principal = ?request.principal, "submitting certificate request");
        deliver(
            request.certificate_out.as_deref(),
            request.chain,
            self.service.cert_request(csr, request.issue_options()),
        )
        .await
    }

    async fn generate_csr(&self, request: &CertRequest) -> Result<String, PublicError> {
        let handle = request.key_material()?;
        let adaptor = self.provider.open(handle);
        debug!(adaptor = adaptor.name(), "building CSR locally");

        let public_key_info = adaptor.get_subject_public_key_info().map_err(key_material)?;

        let profile_id = request
            .csr_profile_id
            .clone()
            .or_else(|| request.profile_id.clone());
        let data = self
            .service
            .cert_get_requestdata(RequestDataParams {
                profile_id,
                principal: request.principal.clone(),
                public_key_info: STANDARD.encode(public_key_info),
            })
            .await?;

        let request_info = STANDARD.decode(data.request_info.trim()).map_err(|e| {
            PublicError::certificate_operation(format!("invalid CSR template: {}", e))
        })?;
        if request_info.is_empty() {
            return Err(PublicError::certificate_operation("CSR template was empty"));
        }

        let csr = adaptor.sign_csr(&request_info).map_err(key_material)?;
        if csr.is_empty() {
            return Err(PublicError::certificate_operation("Generated CSR was empty"));
        }
        Ok(csr_pem(csr))
    }
}

/// PEM text of a CSR that may be PEM or DER.
fn csr_pem(csr: Vec<u8>) -> String {
    let der = match String::from_utf8(csr) {
        Ok(text) if text.trim_start().starts_with("-----BEGIN") => return text,
        Ok(text) => text.into_bytes(),
        Err(e) => e.into_bytes(),
    };
    pem::encode_config(
        &pem::Pem::new("CERTIFICATE REQUEST", der),
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}
