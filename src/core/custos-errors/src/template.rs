//! Message templates, their parameters and the localizer hook.
//!
//! Templates use `%(name)s`, `%(name)r` and `%(name)d` placeholders. `%%`
//! renders a literal percent sign.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Translates message ids into the caller's language.
pub trait Translate: Send + Sync {
    /// Returns the translation of `msgid`, or `msgid` itself.
    fn gettext(&self, msgid: &'static str) -> Cow<'static, str>;
}

/// Localizer that returns every message id unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslation;

impl Translate for NoTranslation {
    fn gettext(&self, msgid: &'static str) -> Cow<'static, str> {
        Cow::Borrowed(msgid)
    }
}

/// A scalar template parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Str(String),
    /// Absent value, rendered as `None`.
    Null,
}

impl Param {
    /// Renders the value the way `%(name)r` shows it.
    pub fn repr(&self) -> String {
        match self {
            Self::Str(s) => {
                let escaped = s.replace('\\', "\\\\");
                if s.contains('\'') && !s.contains('"') {
                    format!("\"{escaped}\"")
                } else {
                    format!("'{}'", escaped.replace('\'', "\\'"))
                }
            },
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Null => f.write_str("None"),
        }
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Named parameters of an error instance.
pub type Params = BTreeMap<String, Param>;

/// Builds a [`Params`] map from `key => value` pairs.
#[macro_export]
macro_rules! params {
    () => { $crate::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $( params.insert(::std::string::String::from($key), $crate::Param::from($value)); )+
        params
    }};
}

/// Renders `template` with `params`.
///
/// A placeholder naming a missing parameter is left in place verbatim.
pub fn render(template: &str, params: &Params) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('%') {
            out.push('%');
            rest = tail;
            continue;
        }

        let Some(named) = after.strip_prefix('(') else {
            out.push('%');
            rest = after;
            continue;
        };
        let Some(close) = named.find(')') else {
            out.push('%');
            rest = after;
            continue;
        };

        let key = &named[..close];
        let mut conv = named[close + 1..].chars();
        let conversion = conv.next();
        let placeholder_len = 1 + 1 + close + 1 + conversion.map_or(0, char::len_utf8);

        match (params.get(key), conversion) {
            (Some(value), Some('s')) => out.push_str(&value.to_string()),
            (Some(value), Some('r')) => out.push_str(&value.repr()),
            (Some(value @ Param::Int(_)), Some('d')) => out.push_str(&value.to_string()),
            _ => {
                debug_assert!(false, "unrenderable placeholder %({key}) in {template:?}");
                out.push_str(&rest[pos..pos + placeholder_len]);
            },
        }
        rest = &rest[pos + placeholder_len..];
    }

    out.push_str(rest);
    out
}
