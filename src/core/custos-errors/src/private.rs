//! Errors that never leave the process.

use thiserror::Error;

/// Intra-process failures.
///
/// These are never serialized to a peer. Before crossing a boundary they are
/// either re-raised as a specific [`PublicError`](crate::PublicError) or
/// collapsed into an internal error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrivateError {
    /// A sub-process exited with a non-zero status.
    #[error("return code {returncode} from {argv:?}")]
    Subprocess {
        /// Exit status of the child.
        returncode: i32,
        /// Command line that was run.
        argv: Vec<String>,
    },

    /// A plugin does not derive from any allowed base.
    #[error("'{plugin}' not subclass of any base in {bases:?}")]
    PluginSubclass {
        /// Offending plugin.
        plugin: String,
        /// Allowed bases.
        bases: Vec<String>,
    },

    /// The same plugin was registered twice.
    #[error("'{plugin}' was already registered")]
    PluginDuplicate {
        /// Offending plugin.
        plugin: String,
    },

    /// A plugin replaced another without declaring the override.
    #[error("unexpected override of {base}.{name} with '{plugin}'")]
    PluginOverride {
        /// Base namespace.
        base: String,
        /// Name being replaced.
        name: String,
        /// Replacing plugin.
        plugin: String,
    },

    /// A plugin declared an override of something never registered.
    #[error("{base}.{name} not registered, cannot override with '{plugin}'")]
    PluginMissingOverride {
        /// Base namespace.
        base: String,
        /// Name that was expected.
        name: String,
        /// Overriding plugin.
        plugin: String,
    },

    /// A local file could not be accessed.
    #[error("{reason}")]
    File {
        /// What went wrong, including the path.
        reason: String,
    },
}

impl PrivateError {
    /// Builds a [`PrivateError::File`] from an I/O failure on `path`.
    pub fn file(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::File {
            reason: format!("{}: {}", path.display(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subprocess_message() {
        let err = PrivateError::Subprocess {
            returncode: 2,
            argv: vec!["ls".into(), "-lh".into(), "/no-foo/".into()],
        };
        assert_eq!(
            err.to_string(),
            r#"return code 2 from ["ls", "-lh", "/no-foo/"]"#
        );
    }

    #[test]
    fn test_plugin_messages() {
        let err = PrivateError::PluginDuplicate {
            plugin: "my_plugin".into(),
        };
        assert_eq!(err.to_string(), "'my_plugin' was already registered");

        let err = PrivateError::PluginMissingOverride {
            base: "Command".into(),
            name: "env".into(),
            plugin: "my_env".into(),
        };
        assert_eq!(
            err.to_string(),
            "Command.env not registered, cannot override with 'my_env'"
        );
    }

    #[test]
    fn test_file_error_includes_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PrivateError::file(std::path::Path::new("/tmp/cert.pem"), &io);
        assert_eq!(err.to_string(), "/tmp/cert.pem: denied");
    }
}
