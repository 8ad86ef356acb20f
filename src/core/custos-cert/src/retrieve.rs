//! Certificate retrieval: persisting issued certificates and the show/find
//! commands.

use std::fs::OpenOptions;
use std::future::Future;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use custos_errors::{PrivateError, PublicError};
use der::Decode;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use x509_cert::Certificate;

use crate::error::file_option;
use crate::service::{CertResult, CertService, FindCriteria, FindResult, ShowOptions};

/// Option name reported for destination file problems.
pub const CERTIFICATE_OUT: &str = "certificate-out";

/// Where a command runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvocationContext {
    /// Interactive command line: local files may be loaded for the caller.
    #[default]
    Cli,
    /// Programmatic caller: values must be supplied decoded.
    Batch,
}

/// Verifies that `path` can be written.
///
/// An existing path must be a regular file openable for writing (it is not
/// truncated). A missing path is created empty.
pub fn check_writable_file(path: &Path) -> Result<(), PrivateError> {
    if path.as_os_str().is_empty() {
        return Err(PrivateError::File {
            reason: "Filename is empty".into(),
        });
    }

    match std::fs::metadata(path) {
        Ok(meta) if !meta.is_file() => Err(PrivateError::File {
            reason: format!("{}: not a regular file", path.display()),
        }),
        Ok(_) => OpenOptions::new()
            .write(true)
            .open(path)
            .map(drop)
            .map_err(|e| PrivateError::file(path, &e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(drop)
            .map_err(|e| PrivateError::file(path, &e)),
        Err(e) => Err(PrivateError::file(path, &e)),
    }
}

/// Certificates to persist from `result`: the chain when `chain` is set,
/// otherwise the single certificate.
pub fn select_certificates(result: &CertResult, chain: bool) -> Result<Vec<&str>, PublicError> {
    if !chain {
        return Ok(vec![result.certificate.as_str()]);
    }
    match &result.certificate_chain {
        Some(certs) if !certs.is_empty() => Ok(certs.iter().map(String::as_str).collect()),
        _ => Err(PublicError::certificate_operation(
            "the result does not include a certificate chain",
        )),
    }
}

/// Decodes a base64 DER certificate, checking that it parses as X.509.
pub fn decode_certificate(b64: &str) -> Result<Vec<u8>, PublicError> {
    let der = STANDARD
        .decode(b64.trim())
        .map_err(|e| PublicError::certificate_format(format!("invalid base64: {}", e)))?;
    Certificate::from_der(&der)
        .map_err(|e| PublicError::certificate_format(format!("invalid certificate: {}", e)))?;
    Ok(der)
}

/// Writes the selected certificates of `result` to `path` as PEM, in order.
pub fn write_certificates(result: &CertResult, path: &Path, chain: bool) -> Result<(), PublicError> {
    let blocks = select_certificates(result, chain)?
        .into_iter()
        .map(|b64| decode_certificate(b64).map(|der| pem::Pem::new("CERTIFICATE", der)))
        .collect::<Result<Vec<_>, _>>()?;

    let text = pem::encode_many_config(
        &blocks,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    );

    std::fs::write(path, text)
        .map_err(|e| file_option(CERTIFICATE_OUT, PrivateError::file(path, &e)))?;

    info!(path = %path.display(), count = blocks.len(), "wrote certificates");
    Ok(())
}

/// Runs `issue` and stores its certificate(s) to `certificate_out`, if set.
///
/// The destination is checked before `issue` is polled. The result is
/// returned unchanged.
pub async fn deliver<F>(
    certificate_out: Option<&Path>,
    chain: bool,
    issue: F,
) -> Result<CertResult, PublicError>
where
    F: Future<Output = Result<CertResult, PublicError>>,
{
    if let Some(path) = certificate_out {
        check_writable_file(path).map_err(|e| file_option(CERTIFICATE_OUT, e))?;
    }

    let result = issue.await?;

    if let Some(path) = certificate_out {
        write_certificates(&result, path, chain)?;
    }
    Ok(result)
}

/// Input of `cert_show`.
#[derive(Debug, Clone, Default)]
pub struct ShowRequest {
    /// Serial number.
    pub serial: String,
    /// Destination file.
    pub certificate_out: Option<PathBuf>,
    /// Deprecated spelling of `certificate_out`.
    pub out: Option<PathBuf>,
    /// Fetch the whole chain.
    pub chain: bool,
    /// Other server options.
    pub extra: Map<String, Value>,
}

/// Input of `cert_find`.
#[derive(Debug, Clone, Default)]
pub struct FindRequest {
    /// Base64 DER certificate.
    pub certificate: Option<String>,
    /// File holding a PEM or DER certificate.
    pub file: Option<PathBuf>,
    /// Subject common name.
    pub subject: Option<String>,
    /// Maximum number of results.
    pub sizelimit: Option<u32>,
    /// Other server options.
    pub extra: Map<String, Value>,
}

/// Client side of `cert_show` and `cert_find`.
pub struct CertRetrieval<'a> {
    service: &'a dyn CertService,
    context: InvocationContext,
}

impl<'a> CertRetrieval<'a> {
    /// Creates a retrieval front for `service`.
    pub fn new(service: &'a dyn CertService, context: InvocationContext) -> Self {
        Self { service, context }
    }

    /// Fetches a certificate and optionally stores it.
    pub async fn show(&self, request: ShowRequest) -> Result<CertResult, PublicError> {
        let ShowRequest {
            serial,
            certificate_out,
            out,
            chain,
            extra,
        } = request;

        let certificate_out = match out {
            Some(out) => {
                warn!("'out' is deprecated, use 'certificate-out' instead");
                Some(out)
            },
            None => certificate_out,
        };

        debug!(serial = %serial, chain, "showing certificate");
        let options = ShowOptions { chain, extra };
        deliver(
            certificate_out.as_deref(),
            chain,
            self.service.cert_show(serial, options),
        )
        .await
    }

    /// Searches certificates, loading `file` for the caller in CLI context.
    pub async fn find(&self, request: FindRequest) -> Result<FindResult, PublicError> {
        let FindRequest {
            certificate,
            file,
            subject,
            sizelimit,
            extra,
        } = request;

        let certificate = match (certificate, file) {
            (Some(_), Some(_)) => {
                return Err(PublicError::mutually_exclusive(
                    "cannot specify both raw certificate and file",
                ))
            },
            (certificate, None) => certificate,
            (None, Some(_)) if self.context == InvocationContext::Batch => {
                return Err(PublicError::option("file"));
            },
            (None, Some(path)) => Some(STANDARD.encode(load_certificate_file(&path)?)),
        };

        let criteria = FindCriteria {
            certificate,
            subject,
            sizelimit,
            extra,
        };
        self.service.cert_find(criteria).await
    }
}

/// Reads a PEM (first `CERTIFICATE` block) or DER certificate file.
pub fn load_certificate_file(path: &Path) -> Result<Vec<u8>, PublicError> {
    let bytes = std::fs::read(path).map_err(|e| file_option("file", PrivateError::file(path, &e)))?;

    let der = if bytes.windows(10).any(|w| w == b"-----BEGIN") {
        let blocks = pem::parse_many(&bytes)
            .map_err(|e| PublicError::certificate_format(e.to_string()))?;
        blocks
            .into_iter()
            .find(|block| block.tag() == "CERTIFICATE")
            .map(pem::Pem::into_contents)
            .ok_or_else(|| {
                PublicError::certificate_format(format!("no certificate in {}", path.display()))
            })?
    } else {
        bytes
    };

    Certificate::from_der(&der)
        .map_err(|e| PublicError::certificate_format(format!("invalid certificate: {}", e)))?;
    Ok(der)
}
