//! Assembly of signed certification requests (PKCS#10).

use der::asn1::BitString;
use der::{Decode, Encode};
use tracing::debug;
use x509_cert::request::{CertReq, CertReqInfo};

use crate::error::KeyMaterialError;
use crate::key::{encode_pem, PrivateKey};

/// Signs a DER `CertificationRequestInfo` with `key`.
///
/// The template must carry `key`'s own public key. Returns the request as a
/// PEM `CERTIFICATE REQUEST`.
pub(crate) fn sign_request_info(
    key: &PrivateKey,
    request_info: &[u8],
) -> Result<Vec<u8>, KeyMaterialError> {
    let info = CertReqInfo::from_der(request_info)
        .map_err(|e| KeyMaterialError::Signing(format!("malformed request template: {}", e)))?;

    let template_key = info
        .public_key
        .to_der()
        .map_err(|e| KeyMaterialError::Signing(format!("malformed request template: {}", e)))?;
    if template_key != key.subject_public_key_info()? {
        return Err(KeyMaterialError::Signing(
            "request template does not carry this key".into(),
        ));
    }

    let tbs = info
        .to_der()
        .map_err(|e| KeyMaterialError::Signing(format!("cannot encode request: {}", e)))?;
    let (algorithm, signature) = key.sign(&tbs)?;

    let request = CertReq {
        info,
        algorithm,
        signature: BitString::from_bytes(&signature)
            .map_err(|e| KeyMaterialError::Signing(e.to_string()))?,
    };
    let der = request
        .to_der()
        .map_err(|e| KeyMaterialError::Signing(format!("cannot encode request: {}", e)))?;

    debug!(algorithm = key.algorithm(), size = der.len(), "signed certification request");
    Ok(encode_pem(&pem::Pem::new("CERTIFICATE REQUEST", der)).into_bytes())
}
