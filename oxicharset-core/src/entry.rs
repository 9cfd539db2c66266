//! Archive entry metadata.
//!
//! This module defines the `Entry` struct that represents a file or directory
//! listed by an archive reader, with its name already decoded under the
//! reader's charset.

/// Entry type (file or directory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryType {
    /// Regular file.
    #[default]
    File,
    /// Directory.
    Directory,
}

impl EntryType {
    /// Classify an entry by its decoded name; directories end with `/`.
    pub fn from_name(name: &str) -> Self {
        if name.ends_with('/') {
            Self::Directory
        } else {
            Self::File
        }
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// An entry in an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// The decoded name/path of the entry within the archive.
    pub name: String,
    /// The name exactly as stored in the archive.
    pub raw_name: Vec<u8>,
    /// The type of entry.
    pub entry_type: EntryType,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Compressed size in bytes.
    pub compressed_size: u64,
    /// Format-specific compression method identifier.
    pub method: u16,
    /// CRC-32 checksum (if available).
    pub crc32: Option<u32>,
    /// Whether the archive flags the name as UTF-8.
    pub utf8_flag: bool,
    /// Comment (if available).
    pub comment: Option<String>,
    /// Offset of the entry's header in the archive.
    pub offset: u64,
}

impl Entry {
    /// Create a new file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        Self {
            raw_name: name.as_bytes().to_vec(),
            name,
            entry_type: EntryType::File,
            size,
            ..Self::default()
        }
    }

    /// Create a new directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if !name.ends_with('/') {
            name.push('/');
        }
        Self {
            raw_name: name.as_bytes().to_vec(),
            name,
            entry_type: EntryType::Directory,
            ..Self::default()
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.entry_type.is_dir()
    }
}
