//! ZIP archive listing under a chosen charset.

use crate::header::{CentralDirectoryHeader, EndOfCentralDirectory};
use oxicharset_core::error::Result;
use oxicharset_core::{ArchiveOpener, ArchiveReader, ByteSource, Charset, Entry};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::trace;

/// ZIP archive reader.
///
/// All central directory entries are read and decoded when the reader is
/// created, so a reader that exists has names valid in its charset.
pub struct ZipReader<R: Read + Seek> {
    reader: R,
    charset: Charset,
    entries: Vec<Entry>,
}

impl<R: Read + Seek> ZipReader<R> {
    /// Create a new ZIP reader decoding names as UTF-8.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_charset(reader, Charset::UTF_8)
    }

    /// Create a new ZIP reader decoding unflagged names with `charset`.
    pub fn with_charset(mut reader: R, charset: Charset) -> Result<Self> {
        let entries = Self::read_entries(&mut reader, charset)?;
        Ok(Self {
            reader,
            charset,
            entries,
        })
    }

    /// Read all entries from the central directory.
    fn read_entries(reader: &mut R, charset: Charset) -> Result<Vec<Entry>> {
        let eocd = EndOfCentralDirectory::locate(reader)?;

        reader.seek(SeekFrom::Start(eocd.cd_offset))?;
        let mut entries = Vec::with_capacity(eocd.capacity_hint());
        let mut offset = eocd.cd_offset;

        for _ in 0..eocd.total_entries {
            let header = CentralDirectoryHeader::read(reader, offset)?;
            offset += header.written_size();
            entries.push(header.to_entry(charset)?);
        }

        Ok(entries)
    }

    /// Get all entries.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The charset unflagged names were decoded with.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Unwrap the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> ArchiveReader for ZipReader<R> {
    fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn charset(&self) -> Charset {
        self.charset
    }
}

impl<R: Read + Seek> std::fmt::Debug for ZipReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipReader")
            .field("charset", &self.charset)
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// File-backed ZIP archives.
pub struct ZipArchive;

impl ZipArchive {
    /// Open the ZIP file at `path`, decoding unflagged names with `charset`.
    ///
    /// The file handle is owned by the returned reader and closed when it
    /// is dropped.
    pub fn open(path: impl AsRef<Path>, charset: Charset) -> Result<ZipReader<BufReader<File>>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = ZipReader::with_charset(BufReader::new(file), charset)?;
        trace!(
            path = %path.display(),
            charset = charset.name(),
            entries = reader.len(),
            "opened zip archive"
        );
        Ok(reader)
    }
}

/// [`ArchiveOpener`] for ZIP files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipOpener;

impl ArchiveOpener for ZipOpener {
    type Reader = ZipReader<BufReader<File>>;

    fn open(&self, source: &ByteSource, charset: Charset) -> Result<Self::Reader> {
        ZipArchive::open(source.path(), charset)
    }
}
