//! Unlock secrets with automatic memory zeroization.

use std::path::Path;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::KeyMaterialError;

/// Password protecting a key file or key database.
///
/// The bytes are erased from memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct UnlockSecret {
    bytes: Vec<u8>,
}

impl UnlockSecret {
    /// Wraps raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Reads the secret from the first line of a password file.
    ///
    /// # Errors
    ///
    /// Returns [`KeyMaterialError::KeyAccess`] if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, KeyMaterialError> {
        let contents = Zeroizing::new(std::fs::read(path).map_err(|e| {
            KeyMaterialError::KeyAccess(format!(
                "cannot read password file {}: {}",
                path.display(),
                e
            ))
        })?);

        let line = contents.split(|b| *b == b'\n').next().unwrap_or(&[]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        Ok(Self::new(line))
    }

    /// Returns the raw secret bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for UnlockSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockSecret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Loads the secret at `path`, if one was configured.
pub(crate) fn load(path: Option<&Path>) -> Result<Option<UnlockSecret>, KeyMaterialError> {
    path.map(UnlockSecret::from_file).transpose()
}
