//! The closed set of public error classes and their code ranges.
//!
//! | Code        | Meaning                                   |
//! |-------------|-------------------------------------------|
//! | 900         | generic public base                       |
//! | 901         | internal error (all details concealed)    |
//! | 902         | remote peer reported an internal error    |
//! | 903         | client/server version mismatch            |
//! | 904 - 999   | reserved                                  |
//! | 1000 - 1999 | authentication failures                   |
//! | 2000 - 2999 | authorization failures                    |
//! | 3000 - 3999 | invocation errors                         |
//! | 4000 - 4999 | execution errors                          |
//! | 5000 - 5999 | generic errors                            |

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::template::Translate;

/// Contiguous code range of the public taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorRange {
    /// 900 - 903: base, internal, remote internal, version.
    System,
    /// 1000 - 1999.
    Authentication,
    /// 2000 - 2999.
    Authorization,
    /// 3000 - 3999.
    Invocation,
    /// 4000 - 4999.
    Execution,
    /// 5000 - 5999.
    Generic,
}

impl ErrorRange {
    /// Returns the range a code belongs to, or `None` for codes outside the
    /// taxonomy (including the reserved block 904 - 999).
    pub const fn for_code(code: u32) -> Option<Self> {
        match code {
            900..=903 => Some(Self::System),
            1000..=1999 => Some(Self::Authentication),
            2000..=2999 => Some(Self::Authorization),
            3000..=3999 => Some(Self::Invocation),
            4000..=4999 => Some(Self::Execution),
            5000..=5999 => Some(Self::Generic),
            _ => None,
        }
    }

    /// Base class that stands in for unknown codes of this range.
    pub const fn base(self) -> ErrorKind {
        match self {
            Self::System => ErrorKind::Public,
            Self::Authentication => ErrorKind::Authentication,
            Self::Authorization => ErrorKind::Authorization,
            Self::Invocation => ErrorKind::Invocation,
            Self::Execution => ErrorKind::Execution,
            Self::Generic => ErrorKind::Generic,
        }
    }
}

/// Every public error class known to this process.
///
/// Each variant owns exactly one code. New classes are appended inside their
/// range; existing codes never move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// 900: base of every public error.
    Public,
    /// 901: conceals a non-public failure.
    Internal,
    /// 902: a peer reported an internal error.
    RemoteInternal,
    /// 903: client and server versions are incompatible.
    Version,
    /// 1000: base of authentication errors.
    Authentication,
    /// 2000: base of authorization errors.
    Authorization,
    /// 3000: base of invocation errors.
    Invocation,
    /// 3001: unknown command.
    Command,
    /// 3002: a peer reported an unknown command.
    RemoteCommand,
    /// 3003: wrong number of arguments.
    Argument,
    /// 3004: unknown option.
    Option,
    /// 3005: required parameter missing.
    Requirement,
    /// 3006: parameter value could not be converted.
    Conversion,
    /// 3007: parameter value failed validation.
    Validation,
    /// 4000: base of execution errors.
    Execution,
    /// 4001: the remote endpoint could not be reached.
    Transport,
    /// 4300: base of certificate errors.
    Certificate,
    /// 4301: a certificate operation could not be completed.
    CertificateOperation,
    /// 4302: malformed certificate data.
    CertificateFormat,
    /// 4303: contradictory options were supplied together.
    MutuallyExclusive,
    /// 4304: private key material could not be read or unlocked.
    KeyAccess,
    /// 4305: the certificate request could not be signed.
    Signing,
    /// 5000: base of errors that fit nowhere else.
    Generic,
}

impl ErrorKind {
    /// All classes in ascending code order.
    pub const ALL: [ErrorKind; 23] = [
        Self::Public,
        Self::Internal,
        Self::RemoteInternal,
        Self::Version,
        Self::Authentication,
        Self::Authorization,
        Self::Invocation,
        Self::Command,
        Self::RemoteCommand,
        Self::Argument,
        Self::Option,
        Self::Requirement,
        Self::Conversion,
        Self::Validation,
        Self::Execution,
        Self::Transport,
        Self::Certificate,
        Self::CertificateOperation,
        Self::CertificateFormat,
        Self::MutuallyExclusive,
        Self::KeyAccess,
        Self::Signing,
        Self::Generic,
    ];

    /// Numeric wire code.
    pub const fn code(self) -> u32 {
        match self {
            Self::Public => 900,
            Self::Internal => 901,
            Self::RemoteInternal => 902,
            Self::Version => 903,
            Self::Authentication => 1000,
            Self::Authorization => 2000,
            Self::Invocation => 3000,
            Self::Command => 3001,
            Self::RemoteCommand => 3002,
            Self::Argument => 3003,
            Self::Option => 3004,
            Self::Requirement => 3005,
            Self::Conversion => 3006,
            Self::Validation => 3007,
            Self::Execution => 4000,
            Self::Transport => 4001,
            Self::Certificate => 4300,
            Self::CertificateOperation => 4301,
            Self::CertificateFormat => 4302,
            Self::MutuallyExclusive => 4303,
            Self::KeyAccess => 4304,
            Self::Signing => 4305,
            Self::Generic => 5000,
        }
    }

    /// Class name as it appears on the wire.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Public => "PublicError",
            Self::Internal => "InternalError",
            Self::RemoteInternal => "RemoteInternalError",
            Self::Version => "VersionError",
            Self::Authentication => "AuthenticationError",
            Self::Authorization => "AuthorizationError",
            Self::Invocation => "InvocationError",
            Self::Command => "CommandError",
            Self::RemoteCommand => "RemoteCommandError",
            Self::Argument => "ArgumentError",
            Self::Option => "OptionError",
            Self::Requirement => "RequirementError",
            Self::Conversion => "ConversionError",
            Self::Validation => "ValidationError",
            Self::Execution => "ExecutionError",
            Self::Transport => "TransportError",
            Self::Certificate => "CertificateError",
            Self::CertificateOperation => "CertificateOperationError",
            Self::CertificateFormat => "CertificateFormatError",
            Self::MutuallyExclusive => "MutuallyExclusiveError",
            Self::KeyAccess => "KeyAccessError",
            Self::Signing => "SigningError",
            Self::Generic => "GenericError",
        }
    }

    /// Untranslated message template.
    pub const fn msgid(self) -> &'static str {
        match self {
            Self::Internal => "an internal error has occurred",
            Self::RemoteInternal => "an internal error has occurred on server %(uri)r",
            Self::Version => "%(client)s client incompatible with %(server)s server at %(uri)r",
            Self::Command => "unknown command %(name)r",
            Self::RemoteCommand => "command %(name)r unknown on server %(uri)r",
            Self::Argument => "%(name)s: wrong number of arguments",
            Self::Option => "unknown option %(name)r",
            Self::Requirement => "'%(name)s' is required",
            Self::Conversion | Self::Validation => "invalid '%(name)s': %(error)s",
            Self::Transport => "cannot connect to %(uri)r: %(error)s",
            Self::Certificate => "%(error)s",
            Self::CertificateOperation => "Certificate operation cannot be completed: %(error)s",
            Self::CertificateFormat => "Certificate format error: %(error)s",
            Self::MutuallyExclusive => "%(reason)s",
            Self::KeyAccess => "Cannot access private key: %(error)s",
            Self::Signing => "Cannot sign certificate request: %(error)s",
            Self::Public
            | Self::Authentication
            | Self::Authorization
            | Self::Invocation
            | Self::Execution
            | Self::Generic => "",
        }
    }

    /// Localizable message template, consumed with the instance parameters.
    pub fn format(self, localizer: &dyn Translate) -> Cow<'static, str> {
        localizer.gettext(self.msgid())
    }

    /// Range this class belongs to.
    pub const fn range(self) -> ErrorRange {
        match ErrorRange::for_code(self.code()) {
            Some(range) => range,
            None => ErrorRange::System,
        }
    }

    /// Looks up the class that owns `code`.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL
            .binary_search_by_key(&code, |kind| kind.code())
            .ok()
            .map(|idx| Self::ALL[idx])
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

// Codes must be strictly ascending, inside a range, and clear of 904 - 999.
const _: () = {
    let all = ErrorKind::ALL;
    let mut i = 0;
    while i < all.len() {
        let code = all[i].code();
        assert!(ErrorRange::for_code(code).is_some());
        assert!(code < 904 || code > 999);
        if i > 0 {
            assert!(all[i - 1].code() < code);
        }
        i += 1;
    }
};
