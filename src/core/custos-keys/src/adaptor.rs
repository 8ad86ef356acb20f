//! Key material capability and adaptor selection.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::database::SecurityModuleAdaptor;
use crate::error::KeyMaterialError;
use crate::keyfile::KeyFileAdaptor;

/// A private key source able to publish its public key and sign requests.
pub trait KeyMaterialAdaptor: Send + Sync {
    /// DER-encoded SubjectPublicKeyInfo of the key.
    ///
    /// # Errors
    ///
    /// [`KeyMaterialError::KeyAccess`] if the key cannot be read or the unlock
    /// secret is wrong.
    fn get_subject_public_key_info(&self) -> Result<Vec<u8>, KeyMaterialError>;

    /// Signs a DER `CertificationRequestInfo` template, returning the CSR.
    ///
    /// # Errors
    ///
    /// [`KeyMaterialError::Signing`] if the template is rejected or the
    /// signature fails.
    fn sign_csr(&self, request_info: &[u8]) -> Result<Vec<u8>, KeyMaterialError>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// Reference to a private key source, chosen once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterialHandle {
    /// A key database directory.
    SecurityModule {
        /// Database directory.
        location: PathBuf,
        /// File holding the database password.
        unlock_secret: Option<PathBuf>,
    },
    /// A single PEM private key file.
    KeyFile {
        /// Key file path.
        location: PathBuf,
        /// File holding the key password.
        unlock_secret: Option<PathBuf>,
    },
}

impl KeyMaterialHandle {
    /// Where the key lives.
    pub fn location(&self) -> &Path {
        match self {
            Self::SecurityModule { location, .. } | Self::KeyFile { location, .. } => location,
        }
    }
}

/// Opens adaptors for handles.
pub trait AdaptorProvider: Send + Sync {
    /// Returns the adaptor backing `handle`.
    fn open(&self, handle: KeyMaterialHandle) -> Box<dyn KeyMaterialAdaptor>;
}

/// Opens the local filesystem adaptors.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalKeyMaterial;

impl AdaptorProvider for LocalKeyMaterial {
    fn open(&self, handle: KeyMaterialHandle) -> Box<dyn KeyMaterialAdaptor> {
        debug!(location = %handle.location().display(), "opening key material");
        match handle {
            KeyMaterialHandle::SecurityModule {
                location,
                unlock_secret,
            } => Box::new(SecurityModuleAdaptor::new(location, unlock_secret)),
            KeyMaterialHandle::KeyFile {
                location,
                unlock_secret,
            } => Box::new(KeyFileAdaptor::new(location, unlock_secret)),
        }
    }
}
