//! PEM private key file adaptor.

use std::path::PathBuf;

use tracing::debug;

use crate::adaptor::KeyMaterialAdaptor;
use crate::error::KeyMaterialError;
use crate::key::PrivateKey;
use crate::request::sign_request_info;
use crate::secret;

/// Adaptor backed by one PEM private key file.
#[derive(Debug)]
pub struct KeyFileAdaptor {
    location: PathBuf,
    unlock_secret: Option<PathBuf>,
}

impl KeyFileAdaptor {
    /// Creates an adaptor for the key at `location`.
    pub fn new(location: impl Into<PathBuf>, unlock_secret: Option<PathBuf>) -> Self {
        Self {
            location: location.into(),
            unlock_secret,
        }
    }

    fn load(&self) -> Result<PrivateKey, KeyMaterialError> {
        let text = std::fs::read_to_string(&self.location).map_err(|e| {
            KeyMaterialError::KeyAccess(format!("cannot read {}: {}", self.location.display(), e))
        })?;
        let secret = secret::load(self.unlock_secret.as_deref())?;
        let key = PrivateKey::from_pem(&text, secret.as_ref())?;
        debug!(path = %self.location.display(), algorithm = key.algorithm(), "loaded private key");
        Ok(key)
    }
}

impl KeyMaterialAdaptor for KeyFileAdaptor {
    fn get_subject_public_key_info(&self) -> Result<Vec<u8>, KeyMaterialError> {
        self.load()?.subject_public_key_info()
    }

    fn sign_csr(&self, request_info: &[u8]) -> Result<Vec<u8>, KeyMaterialError> {
        let key = self.load()?;
        sign_request_info(&key, request_info)
    }

    fn name(&self) -> &'static str {
        "key-file"
    }
}
