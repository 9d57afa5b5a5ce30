use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by accessors, setters, checks and the file loader.
///
/// Messages name keys and paths but never variable values.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing mandatory environment variable {key}")]
    MissingMandatory { key: String },

    #[error("environment variable {key} can't be empty")]
    EmptyNotAllowed { key: String },

    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cannot write environment variable {key:?}: {reason}")]
    EnvironmentWrite {
        key: String,
        reason: WriteErrorReason,
    },
}

/// A variable value that could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} in {key}{}", .item.map(|item| format!(" at item {item}")).unwrap_or_default())]
pub struct ParseError {
    pub key: String,
    /// Zero-based position of the offending item for list accessors.
    pub item: Option<usize>,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(key: &str, item: Option<usize>, kind: ParseErrorKind) -> Self {
        Self {
            key: key.to_owned(),
            item,
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidBool,
    InvalidInt,
    InvalidFloat,
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBool => write!(f, "invalid boolean"),
            Self::InvalidInt => write!(f, "invalid integer"),
            Self::InvalidFloat => write!(f, "invalid float"),
        }
    }
}

/// Why an environment write was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteErrorReason {
    EmptyKey,
    KeyContainsEquals,
    KeyContainsNul,
    ValueContainsNul,
}

impl Display for WriteErrorReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "key is empty"),
            Self::KeyContainsEquals => write!(f, "key contains '='"),
            Self::KeyContainsNul => write!(f, "key contains a NUL byte"),
            Self::ValueContainsNul => write!(f, "value contains a NUL byte"),
        }
    }
}
