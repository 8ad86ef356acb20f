//! Errors that may be forwarded to a remote caller.

use std::borrow::Cow;

use thiserror::Error;
use tracing::error;

use crate::kind::{ErrorKind, ErrorRange};
use crate::private::PrivateError;
use crate::registry::Category;
use crate::template::{render, NoTranslation, Param, Params, Translate};
use crate::params;

fn text(value: impl Into<String>) -> Param {
    Param::Str(value.into())
}

/// A public, wire-safe error instance.
///
/// The message is rendered once at construction from the class template and
/// the parameters, and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct PublicError {
    kind: ErrorKind,
    code: u32,
    name: Cow<'static, str>,
    message: String,
    params: Params,
}

impl PublicError {
    /// Creates an error of `kind`, rendering its template with `params`.
    pub fn new(kind: ErrorKind, params: Params) -> Self {
        Self::localized(kind, params, &NoTranslation)
    }

    /// Like [`PublicError::new`], translating the template first.
    pub fn localized(kind: ErrorKind, params: Params, localizer: &dyn Translate) -> Self {
        if kind == ErrorKind::Internal {
            return Self::concealed(localizer);
        }
        let message = render(&kind.format(localizer), &params);
        Self::from_parts(kind, kind.code(), Cow::Borrowed(kind.name()), message, params)
    }

    /// Creates an error of `kind` with an explicit message instead of the
    /// class template.
    pub fn with_message(kind: ErrorKind, message: impl Into<String>, params: Params) -> Self {
        if kind == ErrorKind::Internal {
            return Self::internal();
        }
        Self::from_parts(
            kind,
            kind.code(),
            Cow::Borrowed(kind.name()),
            message.into(),
            params,
        )
    }

    pub(crate) fn from_parts(
        kind: ErrorKind,
        code: u32,
        name: Cow<'static, str>,
        message: String,
        params: Params,
    ) -> Self {
        Self {
            kind,
            code,
            name,
            message,
            params,
        }
    }

    /// Security: whatever the caller knows about the failure is dropped.
    fn concealed(localizer: &dyn Translate) -> Self {
        let kind = ErrorKind::Internal;
        Self::from_parts(
            kind,
            kind.code(),
            Cow::Borrowed(kind.name()),
            kind.format(localizer).into_owned(),
            Params::new(),
        )
    }

    /// 901: an internal error with every detail concealed.
    pub fn internal() -> Self {
        Self::concealed(&NoTranslation)
    }

    /// 902: the peer at `uri` reported an internal error.
    pub fn remote_internal(uri: impl Into<String>) -> Self {
        Self::new(ErrorKind::RemoteInternal, params! { "uri" => text(uri) })
    }

    /// 903: client and server versions are incompatible.
    pub fn version(
        client: impl Into<String>,
        server: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorKind::Version,
            params! {
                "client" => text(client),
                "server" => text(server),
                "uri" => text(uri),
            },
        )
    }

    /// 3000: a usage error with an explicit message.
    pub fn invocation(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Invocation, message, Params::new())
    }

    /// 3001: unknown command.
    pub fn command(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::Command, params! { "name" => text(name) })
    }

    /// 3002: the peer at `uri` does not know command `name`.
    pub fn remote_command(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::RemoteCommand,
            params! { "name" => text(name), "uri" => text(uri) },
        )
    }

    /// 3003: wrong number of arguments.
    pub fn argument(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument, params! { "name" => text(name) })
    }

    /// 3004: unknown option.
    pub fn option(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::Option, params! { "name" => text(name) })
    }

    /// 3005: required parameter missing.
    pub fn requirement(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::Requirement, params! { "name" => text(name) })
    }

    /// 3006: parameter value could not be converted.
    pub fn conversion(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Conversion,
            params! { "name" => text(name), "error" => text(error) },
        )
    }

    /// 3007: parameter value failed validation.
    pub fn validation(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Validation,
            params! { "name" => text(name), "error" => text(error) },
        )
    }

    /// 4001: the endpoint at `uri` could not be reached.
    pub fn transport(uri: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Transport,
            params! { "uri" => text(uri), "error" => text(error) },
        )
    }

    /// 4301: a certificate operation could not be completed.
    pub fn certificate_operation(error: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::CertificateOperation,
            params! { "error" => text(error) },
        )
    }

    /// 4302: malformed certificate data.
    pub fn certificate_format(error: impl Into<String>) -> Self {
        Self::new(ErrorKind::CertificateFormat, params! { "error" => text(error) })
    }

    /// 4303: options that cannot be combined.
    pub fn mutually_exclusive(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::MutuallyExclusive,
            params! { "reason" => text(reason) },
        )
    }

    /// 4304: private key material could not be read or unlocked.
    pub fn key_access(error: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyAccess, params! { "error" => text(error) })
    }

    /// 4305: the certificate request could not be signed.
    pub fn signing(error: impl Into<String>) -> Self {
        Self::new(ErrorKind::Signing, params! { "error" => text(error) })
    }

    /// Class of this error. For codes unknown to this process this is the
    /// base class of the code's range.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Numeric wire code.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Parameters the message was rendered from.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A single parameter.
    pub fn param(&self, key: &str) -> Option<&Param> {
        self.params.get(key)
    }

    /// Range of the wire code, if it has one.
    pub fn range(&self) -> Option<ErrorRange> {
        ErrorRange::for_code(self.code)
    }

    /// How a command line front-end should exit on this error.
    pub fn exit_class(&self) -> ExitClass {
        match self.range() {
            Some(ErrorRange::Invocation) => ExitClass::Usage,
            Some(ErrorRange::Execution) => ExitClass::Operational,
            _ => ExitClass::Failure,
        }
    }
}

impl From<PrivateError> for PublicError {
    fn from(err: PrivateError) -> Self {
        error!(error = %err, "concealing private error");
        Self::internal()
    }
}

/// Exit status class of a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    /// Generic failure without detail.
    Failure,
    /// The command was invoked incorrectly.
    Usage,
    /// The command was valid but the operation failed.
    Operational,
}

impl ExitClass {
    /// Process exit status.
    pub const fn code(self) -> u8 {
        match self {
            Self::Failure => 1,
            Self::Usage => 2,
            Self::Operational => 3,
        }
    }
}

/// Any error of the taxonomy, public or private.
#[derive(Debug, Error)]
pub enum Error {
    /// Safe to forward.
    #[error(transparent)]
    Public(#[from] PublicError),

    /// Must not leave the process.
    #[error(transparent)]
    Private(#[from] PrivateError),
}

impl Error {
    /// Category of the wrapped error.
    pub fn category(&self) -> Category {
        match self {
            Self::Public(_) => Category::Public,
            Self::Private(_) => Category::Private,
        }
    }

    /// Converts into something safe to forward, concealing private errors.
    pub fn into_public(self) -> PublicError {
        match self {
            Self::Public(err) => err,
            Self::Private(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shouting;

    impl Translate for Shouting {
        fn gettext(&self, msgid: &'static str) -> Cow<'static, str> {
            Cow::Owned(msgid.to_uppercase().replace("%(URI)R", "%(uri)r"))
        }
    }

    #[test]
    fn test_internal_ignores_context() {
        let err = PublicError::new(
            ErrorKind::Internal,
            params! { "password" => "hunter2", "path" => "/etc/secret" },
        );
        assert_eq!(err.code(), 901);
        assert_eq!(err.message(), "an internal error has occurred");
        assert!(err.params().is_empty());
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn test_internal_ignores_explicit_message() {
        let err = PublicError::with_message(
            ErrorKind::Internal,
            "database password is hunter2",
            params! { "password" => "hunter2" },
        );
        assert_eq!(err.message(), "an internal error has occurred");
        assert!(err.params().is_empty());
    }

    #[test]
    fn test_remote_internal_message() {
        let err = PublicError::remote_internal("http://localhost:8888");
        assert_eq!(err.code(), 902);
        assert_eq!(
            err.message(),
            "an internal error has occurred on server 'http://localhost:8888'"
        );
        assert_eq!(err.param("uri"), Some(&Param::from("http://localhost:8888")));
    }

    #[test]
    fn test_version_message() {
        let err = PublicError::version("2.0", "2.1", "http://localhost:8888");
        assert_eq!(
            err.to_string(),
            "2.0 client incompatible with 2.1 server at 'http://localhost:8888'"
        );
    }

    #[test]
    fn test_remote_command_message() {
        let err = PublicError::remote_command("foobar", "http://localhost:8888");
        assert_eq!(err.kind(), ErrorKind::RemoteCommand);
        assert_eq!(
            err.message(),
            "command 'foobar' unknown on server 'http://localhost:8888'"
        );
    }

    #[test]
    fn test_explicit_message_keeps_params() {
        let err = PublicError::with_message(
            ErrorKind::Validation,
            "custom",
            params! { "name" => "certificate-out" },
        );
        assert_eq!(err.message(), "custom");
        assert_eq!(err.param("name"), Some(&Param::from("certificate-out")));
    }

    #[test]
    fn test_localized_template() {
        let err = PublicError::localized(
            ErrorKind::RemoteInternal,
            params! { "uri" => "x" },
            &Shouting,
        );
        assert_eq!(err.message(), "AN INTERNAL ERROR HAS OCCURRED ON SERVER 'x'");
    }

    #[test]
    fn test_exit_class() {
        assert_eq!(
            PublicError::mutually_exclusive("no").exit_class(),
            ExitClass::Operational
        );
        assert_eq!(PublicError::validation("a", "b").exit_class(), ExitClass::Usage);
        assert_eq!(PublicError::invocation("x").exit_class(), ExitClass::Usage);
        assert_eq!(PublicError::internal().exit_class(), ExitClass::Failure);
        assert_eq!(ExitClass::Usage.code(), 2);
    }

    #[test]
    fn test_private_collapses_to_internal() {
        let private = PrivateError::Subprocess {
            returncode: 1,
            argv: vec!["/bin/false".into()],
        };
        let public: PublicError = private.into();
        assert_eq!(public.kind(), ErrorKind::Internal);
        assert!(!public.message().contains("/bin/false"));
    }

    #[test]
    fn test_error_category() {
        let err = Error::from(PublicError::command("x"));
        assert_eq!(err.category(), Category::Public);
        let err = Error::from(PrivateError::PluginDuplicate { plugin: "p".into() });
        assert_eq!(err.category(), Category::Private);
        assert_eq!(err.into_public().code(), 901);
    }
}
