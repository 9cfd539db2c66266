//! Byte sources.

use crate::error::{OxiCharsetError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// An existing, readable local file holding archive bytes.
///
/// Construction performs no I/O; the only check is that a path was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteSource {
    path: PathBuf,
}

impl ByteSource {
    /// Create a byte source from a path. An empty path counts as absent.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(OxiCharsetError::missing_argument("source"));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// The file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for ByteSource {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
