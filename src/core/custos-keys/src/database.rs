//! Key database adaptor.
//!
//! The database is a directory. Each adaptor instance owns one key, stored
//! under a random nickname as `<nickname>.key.pem`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info};

use crate::adaptor::KeyMaterialAdaptor;
use crate::error::KeyMaterialError;
use crate::key::PrivateKey;
use crate::request::sign_request_info;
use crate::secret::{self, UnlockSecret};

/// Adaptor generating and using a key inside a key database directory.
#[derive(Debug)]
pub struct SecurityModuleAdaptor {
    location: PathBuf,
    unlock_secret: Option<PathBuf>,
    nickname: String,
}

impl SecurityModuleAdaptor {
    /// Creates an adaptor for the database at `location`.
    pub fn new(location: impl Into<PathBuf>, unlock_secret: Option<PathBuf>) -> Self {
        let mut bytes = [0u8; 8];
        OsRng.fill_bytes(&mut bytes);
        let nickname = bytes.iter().map(|b| format!("{:02x}", b)).collect();

        Self {
            location: location.into(),
            unlock_secret,
            nickname,
        }
    }

    /// Nickname of this adaptor's key.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Path of this adaptor's key inside the database.
    pub fn key_path(&self) -> PathBuf {
        self.location.join(format!("{}.key.pem", self.nickname))
    }

    fn secret(&self) -> Result<Option<UnlockSecret>, KeyMaterialError> {
        secret::load(self.unlock_secret.as_deref())
    }

    fn check_database(&self) -> Result<(), KeyMaterialError> {
        if self.location.is_dir() {
            Ok(())
        } else {
            Err(KeyMaterialError::KeyAccess(format!(
                "key database {} does not exist",
                self.location.display()
            )))
        }
    }

    fn load(&self, path: &Path) -> Result<PrivateKey, KeyMaterialError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            KeyMaterialError::KeyAccess(format!("cannot read {}: {}", path.display(), e))
        })?;
        PrivateKey::from_pem(&text, self.secret()?.as_ref())
    }

    fn generate(&self, path: &Path) -> Result<PrivateKey, KeyMaterialError> {
        let key = PrivateKey::generate_p256();
        let pem = key.to_pem(self.secret()?.as_ref())?;

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let write_err = |e: std::io::Error| {
            KeyMaterialError::KeyAccess(format!("cannot store key in {}: {}", path.display(), e))
        };
        let mut file = options.open(path).map_err(write_err)?;
        file.write_all(pem.as_bytes()).map_err(write_err)?;

        info!(
            database = %self.location.display(),
            nickname = %self.nickname,
            "generated key in database"
        );
        Ok(key)
    }
}

impl KeyMaterialAdaptor for SecurityModuleAdaptor {
    fn get_subject_public_key_info(&self) -> Result<Vec<u8>, KeyMaterialError> {
        self.check_database()?;
        let path = self.key_path();
        let key = if path.exists() {
            self.load(&path)?
        } else {
            self.generate(&path)?
        };
        key.subject_public_key_info()
    }

    fn sign_csr(&self, request_info: &[u8]) -> Result<Vec<u8>, KeyMaterialError> {
        self.check_database()?;
        let path = self.key_path();
        if !path.exists() {
            return Err(KeyMaterialError::Signing(format!(
                "no key named {} in database",
                self.nickname
            )));
        }
        let key = self.load(&path)?;
        debug!(nickname = %self.nickname, "signing with database key");
        sign_request_info(&key, request_info)
    }

    fn name(&self) -> &'static str {
        "security-module"
    }
}
