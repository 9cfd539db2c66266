//! # OxiCharset Testkit
//!
//! Builds small stored ZIP archives whose entry names are raw bytes, so tests
//! can produce archives "written by" tools running under any code page.

#![warn(missing_docs)]

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const LOCAL_FILE_HEADER_SIG: u32 = 0x04034B50;
const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;
const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;
const ZIP64_END_OF_CENTRAL_DIR_SIG: u32 = 0x06064B50;
const ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG: u32 = 0x07064B50;

const FLAG_UTF8: u16 = 0x0800;
const VERSION: u16 = 20;
const VERSION_ZIP64: u16 = 45;
// 1980-01-01 00:00:00
const DOS_DATE: u16 = 0x0021;

/// CRC-32 (IEEE 802.3), bit by bit.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

#[derive(Debug, Clone)]
struct FixtureEntry {
    name: Vec<u8>,
    data: Vec<u8>,
    flags: u16,
}

/// Builder for an in-memory ZIP archive with stored entries.
#[derive(Debug, Clone, Default)]
pub struct ZipFixture {
    entries: Vec<FixtureEntry>,
    comment: Vec<u8>,
    zip64: bool,
}

impl ZipFixture {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty file whose name is stored as `name` verbatim.
    pub fn entry(self, name: impl AsRef<[u8]>) -> Self {
        self.entry_with_data(name, Vec::<u8>::new())
    }

    /// Add a file with contents.
    pub fn entry_with_data(mut self, name: impl AsRef<[u8]>, data: impl AsRef<[u8]>) -> Self {
        self.entries.push(FixtureEntry {
            name: name.as_ref().to_vec(),
            data: data.as_ref().to_vec(),
            flags: 0,
        });
        self
    }

    /// Add a directory entry; `name` should end with `/`.
    pub fn directory(self, name: impl AsRef<[u8]>) -> Self {
        self.entry(name)
    }

    /// Add an empty file with a UTF-8 name and the UTF-8 flag set.
    pub fn utf8_entry(mut self, name: &str) -> Self {
        self.entries.push(FixtureEntry {
            name: name.as_bytes().to_vec(),
            data: Vec::new(),
            flags: FLAG_UTF8,
        });
        self
    }

    /// Set the archive comment.
    pub fn comment(mut self, comment: impl AsRef<[u8]>) -> Self {
        self.comment = comment.as_ref().to_vec();
        self
    }

    /// Write ZIP64 end records in addition to the standard one.
    pub fn zip64(mut self) -> Self {
        self.zip64 = true;
        self
    }

    /// Serialize the archive.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut offsets = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            offsets.push(out.len() as u32);
            let crc = crc32(&entry.data);
            let size = entry.data.len() as u32;

            // Local file header
            put_u32(&mut out, LOCAL_FILE_HEADER_SIG);
            put_u16(&mut out, VERSION);
            put_u16(&mut out, entry.flags);
            put_u16(&mut out, 0); // stored
            put_u16(&mut out, 0); // time
            put_u16(&mut out, DOS_DATE);
            put_u32(&mut out, crc);
            put_u32(&mut out, size);
            put_u32(&mut out, size);
            put_u16(&mut out, entry.name.len() as u16);
            put_u16(&mut out, 0); // extra length
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(&entry.data);
        }

        let cd_offset = out.len();
        for (entry, offset) in self.entries.iter().zip(offsets) {
            let crc = crc32(&entry.data);
            let size = entry.data.len() as u32;

            // Central directory header
            put_u32(&mut out, CENTRAL_DIR_HEADER_SIG);
            put_u16(&mut out, VERSION);
            put_u16(&mut out, VERSION);
            put_u16(&mut out, entry.flags);
            put_u16(&mut out, 0);
            put_u16(&mut out, 0);
            put_u16(&mut out, DOS_DATE);
            put_u32(&mut out, crc);
            put_u32(&mut out, size);
            put_u32(&mut out, size);
            put_u16(&mut out, entry.name.len() as u16);
            put_u16(&mut out, 0); // extra length
            put_u16(&mut out, 0); // comment length
            put_u16(&mut out, 0); // disk number start
            put_u16(&mut out, 0); // internal attributes
            put_u32(&mut out, 0); // external attributes
            put_u32(&mut out, offset);
            out.extend_from_slice(&entry.name);
        }
        let cd_size = out.len() - cd_offset;
        let count = self.entries.len();

        if self.zip64 {
            let record_offset = out.len() as u64;

            // Zip64 end of central directory record
            put_u32(&mut out, ZIP64_END_OF_CENTRAL_DIR_SIG);
            put_u64(&mut out, 44);
            put_u16(&mut out, VERSION_ZIP64);
            put_u16(&mut out, VERSION_ZIP64);
            put_u32(&mut out, 0);
            put_u32(&mut out, 0);
            put_u64(&mut out, count as u64);
            put_u64(&mut out, count as u64);
            put_u64(&mut out, cd_size as u64);
            put_u64(&mut out, cd_offset as u64);

            // Zip64 end of central directory locator
            put_u32(&mut out, ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG);
            put_u32(&mut out, 0);
            put_u64(&mut out, record_offset);
            put_u32(&mut out, 1);
        }

        // End of central directory record
        let (count_16, cd_size_32, cd_offset_32) = if self.zip64 {
            (0xFFFF, 0xFFFF_FFFF, 0xFFFF_FFFF)
        } else {
            (count as u16, cd_size as u32, cd_offset as u32)
        };
        put_u32(&mut out, END_OF_CENTRAL_DIR_SIG);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, count_16);
        put_u16(&mut out, count_16);
        put_u32(&mut out, cd_size_32);
        put_u32(&mut out, cd_offset_32);
        put_u16(&mut out, self.comment.len() as u16);
        out.extend_from_slice(&self.comment);

        out
    }

    /// Write the archive to `dir/file_name`.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> io::Result<PathBuf> {
        let path = dir.join(file_name);
        File::create(&path)?.write_all(&self.to_bytes())?;
        Ok(path)
    }

    /// Write the archive to a temporary file deleted on drop.
    pub fn temp_file(&self) -> io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new().suffix(".zip").tempfile()?;
        file.write_all(&self.to_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

/// Write arbitrary bytes to a temporary file (for non-archive inputs).
pub fn temp_file_with(bytes: &[u8]) -> io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}
