//! Read-only table of every public error class.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::kind::{ErrorKind, ErrorRange};

/// Whether an error may cross the RPC boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Safe to forward to a peer.
    Public,
    /// Never leaves the process.
    Private,
}

/// Static description of one error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDescriptor {
    /// Wire code.
    pub code: u32,
    /// Class name.
    pub name: &'static str,
    /// Always [`Category::Public`] for registry entries.
    pub category: Category,
    /// Untranslated message template.
    pub message_template: &'static str,
    /// The class itself.
    pub kind: ErrorKind,
}

impl From<ErrorKind> for ErrorDescriptor {
    fn from(kind: ErrorKind) -> Self {
        Self {
            code: kind.code(),
            name: kind.name(),
            category: Category::Public,
            message_template: kind.msgid(),
            kind,
        }
    }
}

/// All public error classes, ordered by code.
#[derive(Debug)]
pub struct ErrorRegistry {
    entries: Vec<ErrorDescriptor>,
}

impl ErrorRegistry {
    fn build() -> Self {
        let entries: Vec<ErrorDescriptor> =
            ErrorKind::ALL.iter().copied().map(ErrorDescriptor::from).collect();
        debug_assert!(entries.windows(2).all(|pair| pair[0].code < pair[1].code));
        Self { entries }
    }

    /// The process-wide registry, built on first use.
    pub fn global() -> &'static ErrorRegistry {
        static REGISTRY: OnceLock<ErrorRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::build)
    }

    /// Entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = &ErrorDescriptor> {
        self.entries.iter()
    }

    /// Number of public classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptor owning exactly `code`.
    pub fn get(&self, code: u32) -> Option<&ErrorDescriptor> {
        self.entries
            .binary_search_by_key(&code, |entry| entry.code)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Class to instantiate for `code`: the exact class when known, else the
    /// base class of its range, else the 900 base.
    pub fn resolve(&self, code: u32) -> ErrorKind {
        match self.get(code) {
            Some(entry) => entry.kind,
            None => ErrorRange::for_code(code)
                .map(ErrorRange::base)
                .unwrap_or(ErrorKind::Public),
        }
    }

    /// Entries belonging to `range`.
    pub fn in_range(&self, range: ErrorRange) -> impl Iterator<Item = &ErrorDescriptor> {
        self.entries
            .iter()
            .filter(move |entry| ErrorRange::for_code(entry.code) == Some(range))
    }
}
