//! ZIP header structures.
//!
//! Only the records needed to list entries are parsed: the end of central
//! directory record (plain and ZIP64) and the central directory headers.
//! Local headers and file data are never touched.

use oxicharset_core::error::{OxiCharsetError, Result};
use oxicharset_core::{Charset, Entry, EntryType};
use std::io::{Read, Seek, SeekFrom};

/// ZIP central directory header signature.
pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;

/// ZIP end of central directory signature.
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;

/// ZIP64 end of central directory signature.
pub const ZIP64_END_OF_CENTRAL_DIR_SIG: u32 = 0x06064B50;

/// ZIP64 end of central directory locator signature.
pub const ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG: u32 = 0x07064B50;

/// ZIP64 extra field header ID.
pub const ZIP64_EXTRA_FIELD_ID: u16 = 0x0001;

/// Marker value for Zip64 (0xFFFFFFFF for 32-bit fields).
pub const ZIP64_MARKER_32: u32 = 0xFFFF_FFFF;

/// Flag bit 11 (EFS): name and comment are UTF-8.
pub const FLAG_UTF8: u16 = 0x0800;

/// Size of the fixed part of the end of central directory record.
const EOCD_LEN: u64 = 22;

/// Maximum length of the archive comment trailing the EOCD record.
const MAX_COMMENT_LEN: u64 = 65535;

/// Size of the fixed part of a central directory header.
const CENTRAL_DIR_HEADER_LEN: usize = 46;

/// Upper bound for pre-allocating entries from an untrusted count.
const MAX_PREALLOCATED_ENTRIES: u64 = 1 << 16;

fn u16_at(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn u64_at(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

/// Location of the central directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Offset of the first central directory header.
    pub cd_offset: u64,
    /// Size of the central directory in bytes.
    pub cd_size: u64,
    /// Total number of entries.
    pub total_entries: u64,
    /// Whether the values came from a ZIP64 record.
    pub zip64: bool,
}

impl EndOfCentralDirectory {
    /// Find and parse the end of central directory record.
    pub fn locate<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        if file_size < EOCD_LEN {
            return Err(OxiCharsetError::invalid_header(
                "End of central directory not found",
            ));
        }

        // Search for EOCD signature (max comment is 65535 bytes)
        let search_start = file_size.saturating_sub(MAX_COMMENT_LEN + EOCD_LEN);
        reader.seek(SeekFrom::Start(search_start))?;

        let mut buf = vec![0u8; (file_size - search_start) as usize];
        reader.read_exact(&mut buf)?;

        // The comment may itself contain the signature, so prefer the record
        // whose comment length ends exactly at end of file. Fall back to the
        // last signature for archives with trailing bytes.
        let eocd_sig = END_OF_CENTRAL_DIR_SIG.to_le_bytes();
        let eocd_offset = buf
            .windows(4)
            .enumerate()
            .rev()
            .filter(|(_, w)| w[..] == eocd_sig[..])
            .map(|(at, _)| at)
            .find(|&at| Self::ends_at_eof(&buf, at))
            .or_else(|| buf.windows(4).rposition(|w| w == eocd_sig))
            .ok_or_else(|| OxiCharsetError::invalid_header("End of central directory not found"))?;

        let eocd_pos = search_start + eocd_offset as u64;
        if eocd_pos >= 20 {
            if let Some(zip64) = Self::read_zip64(reader, eocd_pos)? {
                return Ok(zip64);
            }
        }

        Self::parse_standard(&buf[eocd_offset..])
    }

    /// Whether an EOCD record at `at` and its comment span the rest of `buf`.
    fn ends_at_eof(buf: &[u8], at: usize) -> bool {
        let fixed_end = at + EOCD_LEN as usize;
        fixed_end <= buf.len() && fixed_end + u16_at(buf, at + 20) as usize == buf.len()
    }

    /// Parse standard EOCD record.
    fn parse_standard(buf: &[u8]) -> Result<Self> {
        if buf.len() < EOCD_LEN as usize {
            return Err(OxiCharsetError::invalid_header("EOCD too short"));
        }

        Ok(Self {
            total_entries: u16_at(buf, 10) as u64,
            cd_size: u32_at(buf, 12) as u64,
            cd_offset: u32_at(buf, 16) as u64,
            zip64: false,
        })
    }

    /// Follow the ZIP64 locator preceding the EOCD, if there is one.
    fn read_zip64<R: Read + Seek>(reader: &mut R, eocd_pos: u64) -> Result<Option<Self>> {
        reader.seek(SeekFrom::Start(eocd_pos - 20))?;
        let mut locator = [0u8; 20];
        reader.read_exact(&mut locator)?;

        if u32_at(&locator, 0) != ZIP64_END_OF_CENTRAL_DIR_LOCATOR_SIG {
            return Ok(None);
        }

        let record_offset = u64_at(&locator, 8);
        reader.seek(SeekFrom::Start(record_offset))?;
        let mut record = [0u8; 56];
        reader.read_exact(&mut record)?;

        let signature = u32_at(&record, 0);
        if signature != ZIP64_END_OF_CENTRAL_DIR_SIG {
            return Err(OxiCharsetError::invalid_magic(
                ZIP64_END_OF_CENTRAL_DIR_SIG.to_le_bytes().to_vec(),
                signature.to_le_bytes().to_vec(),
            ));
        }

        Ok(Some(Self {
            total_entries: u64_at(&record, 32),
            cd_size: u64_at(&record, 40),
            cd_offset: u64_at(&record, 48),
            zip64: true,
        }))
    }

    /// Capacity hint for the entry list.
    pub fn capacity_hint(&self) -> usize {
        self.total_entries.min(MAX_PREALLOCATED_ENTRIES) as usize
    }
}

/// A central directory file header, with the name still undecoded.
#[derive(Debug, Clone)]
pub struct CentralDirectoryHeader {
    /// General purpose bit flag.
    pub flags: u16,
    /// Compression method.
    pub method: u16,
    /// CRC-32 of uncompressed data.
    pub crc32: u32,
    /// Compressed size (ZIP64 value if present).
    pub compressed_size: u64,
    /// Uncompressed size (ZIP64 value if present).
    pub uncompressed_size: u64,
    /// Offset of the local file header (ZIP64 value if present).
    pub local_header_offset: u64,
    /// Raw file name bytes.
    pub name: Vec<u8>,
    /// Extra field.
    pub extra: Vec<u8>,
    /// Raw comment bytes.
    pub comment: Vec<u8>,
    /// Offset of this header in the archive.
    pub offset: u64,
}

impl CentralDirectoryHeader {
    /// Read a central directory header starting at `offset`.
    pub fn read<R: Read>(reader: &mut R, offset: u64) -> Result<Self> {
        let mut buf = [0u8; CENTRAL_DIR_HEADER_LEN];
        reader.read_exact(&mut buf)?;

        let signature = u32_at(&buf, 0);
        if signature != CENTRAL_DIR_HEADER_SIG {
            return Err(OxiCharsetError::invalid_magic(
                CENTRAL_DIR_HEADER_SIG.to_le_bytes().to_vec(),
                signature.to_le_bytes().to_vec(),
            ));
        }

        let flags = u16_at(&buf, 8);
        let method = u16_at(&buf, 10);
        let crc32 = u32_at(&buf, 16);
        let compressed_size = u32_at(&buf, 20);
        let uncompressed_size = u32_at(&buf, 24);
        let name_len = u16_at(&buf, 28) as usize;
        let extra_len = u16_at(&buf, 30) as usize;
        let comment_len = u16_at(&buf, 32) as usize;
        let local_header_offset = u32_at(&buf, 42);

        // Read variable-length fields
        let mut name = vec![0u8; name_len];
        reader.read_exact(&mut name)?;

        let mut extra = vec![0u8; extra_len];
        reader.read_exact(&mut extra)?;

        let mut comment = vec![0u8; comment_len];
        reader.read_exact(&mut comment)?;

        let mut header = Self {
            flags,
            method,
            crc32,
            compressed_size: compressed_size as u64,
            uncompressed_size: uncompressed_size as u64,
            local_header_offset: local_header_offset as u64,
            name,
            extra,
            comment,
            offset,
        };
        header.apply_zip64_extra(uncompressed_size, compressed_size, local_header_offset);
        Ok(header)
    }

    /// Replace marked 32-bit fields with their ZIP64 extra field values.
    ///
    /// Order: uncompressed size, compressed size, relative header offset.
    /// Each is present only if the corresponding header field is 0xFFFFFFFF.
    fn apply_zip64_extra(&mut self, uncompressed: u32, compressed: u32, header_offset: u32) {
        if uncompressed != ZIP64_MARKER_32
            && compressed != ZIP64_MARKER_32
            && header_offset != ZIP64_MARKER_32
        {
            return;
        }

        let extra = &self.extra;
        let mut offset = 0;
        while offset + 4 <= extra.len() {
            let header_id = u16_at(extra, offset);
            let data_size = u16_at(extra, offset + 2) as usize;
            offset += 4;

            if header_id == ZIP64_EXTRA_FIELD_ID && offset + data_size <= extra.len() {
                let end = offset + data_size;
                let mut field = offset;

                if uncompressed == ZIP64_MARKER_32 && field + 8 <= end {
                    self.uncompressed_size = u64_at(extra, field);
                    field += 8;
                }
                if compressed == ZIP64_MARKER_32 && field + 8 <= end {
                    self.compressed_size = u64_at(extra, field);
                    field += 8;
                }
                if header_offset == ZIP64_MARKER_32 && field + 8 <= end {
                    self.local_header_offset = u64_at(extra, field);
                }
                return;
            }

            offset += data_size;
        }
    }

    /// Whether the UTF-8 (EFS) flag is set.
    pub fn is_utf8(&self) -> bool {
        self.flags & FLAG_UTF8 != 0
    }

    /// The charset the name must be decoded with: UTF-8 when flagged,
    /// otherwise the requested one.
    pub fn name_charset(&self, requested: Charset) -> Charset {
        if self.is_utf8() {
            Charset::UTF_8
        } else {
            requested
        }
    }

    /// Decode the header into an [`Entry`].
    ///
    /// The name is decoded strictly; a name that is not valid in the
    /// effective charset fails with [`OxiCharsetError::MalformedEntryName`].
    pub fn to_entry(&self, charset: Charset) -> Result<Entry> {
        let charset = self.name_charset(charset);
        let name = charset
            .decode_strict(&self.name)
            .ok_or_else(|| OxiCharsetError::malformed_entry_name(charset.name(), self.offset))?
            .into_owned();

        let comment = if self.comment.is_empty() {
            None
        } else {
            Some(charset.decode_lossy(&self.comment).into_owned())
        };

        Ok(Entry {
            entry_type: EntryType::from_name(&name),
            name,
            raw_name: self.name.clone(),
            size: self.uncompressed_size,
            compressed_size: self.compressed_size,
            method: self.method,
            crc32: Some(self.crc32),
            utf8_flag: self.is_utf8(),
            comment,
            offset: self.local_header_offset,
        })
    }

    /// Size of this header on disk.
    pub fn written_size(&self) -> u64 {
        (CENTRAL_DIR_HEADER_LEN + self.name.len() + self.extra.len() + self.comment.len()) as u64
    }
}
