//! Private keys as loaded from PEM, and what can be done with them.
//!
//! Supported: RSA (PKCS#1 or PKCS#8) and NIST P-256 (SEC1 or PKCS#8), the
//! PKCS#8 forms optionally password-encrypted.

use der::asn1::{Any, AnyRef, ObjectIdentifier};
use pkcs8::pkcs5::pbes2;
use pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, EncryptedPrivateKeyInfo, PrivateKeyInfo};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use x509_cert::spki::AlgorithmIdentifierOwned;
use zeroize::Zeroizing;

use crate::error::KeyMaterialError;
use crate::secret::UnlockSecret;

/// ecdsa-with-SHA256 (RFC 5758).
const ECDSA_WITH_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");

/// sha256WithRSAEncryption (RFC 4055).
const SHA256_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");

/// PBKDF2 rounds used when encrypting keys we generate.
const PBKDF2_ITERATIONS: u32 = 100_000;

/// A private key held in memory for the duration of one operation.
pub(crate) enum PrivateKey {
    Rsa(Box<RsaPrivateKey>),
    P256(p256::SecretKey),
}

impl PrivateKey {
    /// Generates a fresh P-256 key.
    pub(crate) fn generate_p256() -> Self {
        Self::P256(p256::SecretKey::random(&mut OsRng))
    }

    /// Parses a single PEM private key block.
    pub(crate) fn from_pem(text: &str, secret: Option<&UnlockSecret>) -> Result<Self, KeyMaterialError> {
        let block = pem::parse(text)
            .map_err(|e| KeyMaterialError::KeyAccess(format!("not a PEM private key: {}", e)))?;

        match block.tag() {
            "PRIVATE KEY" => Self::from_pkcs8_der(block.contents()),
            "ENCRYPTED PRIVATE KEY" => {
                let secret = secret.ok_or_else(|| {
                    KeyMaterialError::KeyAccess(
                        "private key is encrypted but no password file was given".into(),
                    )
                })?;
                let info = EncryptedPrivateKeyInfo::try_from(block.contents()).map_err(|e| {
                    KeyMaterialError::KeyAccess(format!("malformed encrypted private key: {}", e))
                })?;
                let document = info.decrypt(secret.as_bytes()).map_err(|_| {
                    KeyMaterialError::KeyAccess("unable to decrypt private key (wrong password?)".into())
                })?;
                Self::from_pkcs8_der(document.as_bytes())
            },
            "RSA PRIVATE KEY" => RsaPrivateKey::from_pkcs1_der(block.contents())
                .map(|key| Self::Rsa(Box::new(key)))
                .map_err(|e| KeyMaterialError::KeyAccess(format!("malformed RSA private key: {}", e))),
            "EC PRIVATE KEY" => p256::SecretKey::from_sec1_der(block.contents())
                .map(Self::P256)
                .map_err(|e| {
                    KeyMaterialError::KeyAccess(format!("unsupported EC private key: {}", e))
                }),
            other => Err(KeyMaterialError::KeyAccess(format!(
                "unsupported PEM block '{}'",
                other
            ))),
        }
    }

    fn from_pkcs8_der(der: &[u8]) -> Result<Self, KeyMaterialError> {
        if let Ok(key) = p256::SecretKey::from_pkcs8_der(der) {
            return Ok(Self::P256(key));
        }
        RsaPrivateKey::from_pkcs8_der(der)
            .map(|key| Self::Rsa(Box::new(key)))
            .map_err(|e| KeyMaterialError::KeyAccess(format!("unsupported private key: {}", e)))
    }

    /// Serializes as PKCS#8 PEM, encrypted when a secret is given.
    pub(crate) fn to_pem(&self, secret: Option<&UnlockSecret>) -> Result<Zeroizing<String>, KeyMaterialError> {
        let encode_err = |e: pkcs8::Error| KeyMaterialError::KeyAccess(format!("cannot encode private key: {}", e));

        let document = match self {
            Self::Rsa(key) => key.to_pkcs8_der(),
            Self::P256(key) => key.to_pkcs8_der(),
        }
        .map_err(encode_err)?;

        let block = match secret {
            Some(secret) => {
                let mut salt = [0u8; 16];
                let mut iv = [0u8; 16];
                OsRng.fill_bytes(&mut salt);
                OsRng.fill_bytes(&mut iv);

                let params = pbes2::Parameters::pbkdf2_sha256_aes256cbc(PBKDF2_ITERATIONS, &salt, &iv)
                    .map_err(|e| KeyMaterialError::KeyAccess(format!("cannot encrypt private key: {}", e)))?;
                let encrypted = PrivateKeyInfo::try_from(document.as_bytes())
                    .map_err(|e| encode_err(e.into()))?
                    .encrypt_with_params(params, secret.as_bytes())
                    .map_err(encode_err)?;
                pem::Pem::new("ENCRYPTED PRIVATE KEY", encrypted.as_bytes().to_vec())
            },
            None => pem::Pem::new("PRIVATE KEY", document.as_bytes().to_vec()),
        };

        Ok(Zeroizing::new(encode_pem(&block)))
    }

    /// DER-encoded SubjectPublicKeyInfo.
    pub(crate) fn subject_public_key_info(&self) -> Result<Vec<u8>, KeyMaterialError> {
        let document = match self {
            Self::Rsa(key) => key.to_public_key().to_public_key_der(),
            Self::P256(key) => key.public_key().to_public_key_der(),
        }
        .map_err(|e| KeyMaterialError::KeyAccess(format!("cannot encode public key: {}", e)))?;

        Ok(document.as_bytes().to_vec())
    }

    /// Signs `message`, returning the signature algorithm and the signature.
    pub(crate) fn sign(&self, message: &[u8]) -> Result<(AlgorithmIdentifierOwned, Vec<u8>), KeyMaterialError> {
        let sign_err = |e: rsa::signature::Error| KeyMaterialError::Signing(e.to_string());

        match self {
            Self::Rsa(key) => {
                let signer = rsa::pkcs1v15::SigningKey::<Sha256>::new((**key).clone());
                let signature = signer.try_sign(message).map_err(sign_err)?;
                let algorithm = AlgorithmIdentifierOwned {
                    oid: SHA256_WITH_RSA,
                    parameters: Some(Any::from(AnyRef::NULL)),
                };
                Ok((algorithm, signature.to_vec()))
            },
            Self::P256(key) => {
                let signer = p256::ecdsa::SigningKey::from(key);
                let signature: p256::ecdsa::Signature = signer.try_sign(message).map_err(sign_err)?;
                let algorithm = AlgorithmIdentifierOwned {
                    oid: ECDSA_WITH_SHA256,
                    parameters: None,
                };
                Ok((algorithm, signature.to_der().as_bytes().to_vec()))
            },
        }
    }

    /// Short algorithm name for logs.
    pub(crate) fn algorithm(&self) -> &'static str {
        match self {
            Self::Rsa(_) => "rsa",
            Self::P256(_) => "p256",
        }
    }
}

/// PEM with LF line endings.
pub(crate) fn encode_pem(block: &pem::Pem) -> String {
    pem::encode_config(block, pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF))
}
