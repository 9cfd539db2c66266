//! Error types for OxiCharset operations.
//!
//! A single error type covers argument validation, charset resolution and
//! archive opening. Search loops use [`OxiCharsetError::is_candidate_failure`]
//! to tell an expected per-candidate failure apart from one that must abort.

use std::io;
use thiserror::Error;

/// The main error type for OxiCharset operations.
#[derive(Debug, Error)]
pub enum OxiCharsetError {
    /// I/O error from the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required argument was absent (empty path, empty label).
    #[error("Missing argument: {argument}")]
    MissingArgument {
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// A required non-empty set was empty.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// The charset label is not known to the registry.
    #[error("Unsupported charset: {label}")]
    UnsupportedCharset {
        /// The label that failed to resolve.
        label: String,
    },

    /// Invalid magic number in archive header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Invalid header format.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// An entry name does not decode under the requested charset.
    #[error("Malformed entry name at offset {offset}: not valid {charset}")]
    MalformedEntryName {
        /// Canonical name of the charset used for decoding.
        charset: &'static str,
        /// Byte offset of the central directory header holding the name.
        offset: u64,
    },
}

/// Result type alias for OxiCharset operations.
pub type Result<T> = std::result::Result<T, OxiCharsetError>;

impl OxiCharsetError {
    /// Create a missing argument error.
    pub fn missing_argument(argument: &'static str) -> Self {
        Self::MissingArgument { argument }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an unsupported charset error.
    pub fn unsupported_charset(label: impl Into<String>) -> Self {
        Self::UnsupportedCharset {
            label: label.into(),
        }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a malformed entry name error.
    pub fn malformed_entry_name(charset: &'static str, offset: u64) -> Self {
        Self::MalformedEntryName { charset, offset }
    }

    /// Whether the bytes could not be opened as an archive under the
    /// attempted charset.
    ///
    /// Truncated or corrupt data surfaces from `read_exact` as
    /// `UnexpectedEof`/`InvalidData`, so those I/O kinds count as format
    /// failures. Every other I/O kind (missing file, permissions) does not.
    pub fn is_archive_open_error(&self) -> bool {
        match self {
            Self::InvalidMagic { .. }
            | Self::InvalidHeader { .. }
            | Self::MalformedEntryName { .. } => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData
            ),
            _ => false,
        }
    }

    /// Whether a multi-candidate search may skip this error and move on to
    /// the next candidate.
    pub fn is_candidate_failure(&self) -> bool {
        self.is_archive_open_error() || matches!(self, Self::UnsupportedCharset { .. })
    }
}
