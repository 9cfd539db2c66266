//! One byte source bound to one candidate charset.

use crate::options::ValidationPolicy;
use oxicharset_core::error::Result;
use oxicharset_core::{ArchiveOpener, ArchiveReader, ByteSource, Charset};
use oxicharset_zip::{ZipOpener, ZipReader};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// A `(source, charset)` candidate.
///
/// Construction performs no I/O. Equality, hashing and ordering are
/// structural over both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidatePairing {
    source: ByteSource,
    charset: Charset,
}

impl CandidatePairing {
    /// Pair the file at `source` with `charset`.
    ///
    /// Fails with `MissingArgument` when `source` is empty.
    pub fn new(source: impl AsRef<Path>, charset: Charset) -> Result<Self> {
        Ok(Self::from_parts(ByteSource::new(source)?, charset))
    }

    /// Pair an already validated source with `charset`.
    pub fn from_parts(source: ByteSource, charset: Charset) -> Self {
        Self { source, charset }
    }

    /// The byte source.
    pub fn source(&self) -> &ByteSource {
        &self.source
    }

    /// The candidate charset.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Open the source as a ZIP archive with names decoded under the charset.
    ///
    /// The reader owns the file handle; dropping it releases the file.
    pub fn open_reader(&self) -> Result<ZipReader<BufReader<File>>> {
        self.open_reader_with(&ZipOpener)
    }

    /// Open the source through `opener`.
    pub fn open_reader_with<O: ArchiveOpener>(&self, opener: &O) -> Result<O::Reader> {
        opener.open(&self.source, self.charset)
    }

    /// Open the source, run `f` on the reader, and release the reader.
    pub fn with_reader<T>(&self, f: impl FnOnce(&ZipReader<BufReader<File>>) -> T) -> Result<T> {
        self.with_reader_using(&ZipOpener, f)
    }

    /// [`with_reader`](Self::with_reader) through `opener`.
    pub fn with_reader_using<O, T>(&self, opener: &O, f: impl FnOnce(&O::Reader) -> T) -> Result<T>
    where
        O: ArchiveOpener,
    {
        let reader = self.open_reader_with(opener)?;
        Ok(f(&reader))
    }

    /// Encode `text` with the charset and decode the bytes back.
    ///
    /// Unmappable characters are substituted during encoding, so the result
    /// can differ from `text`.
    pub fn reencode(&self, text: &str) -> String {
        let (bytes, used) = self.charset.encode(text);
        used.decode_lossy(&bytes).into_owned()
    }

    /// Whether `text` survives [`reencode`](Self::reencode) unchanged.
    ///
    /// This is necessary for the charset to be the archive's original one,
    /// not sufficient.
    pub fn validates_round_trip(&self, text: &str) -> bool {
        self.reencode(text) == text
    }

    /// Whether every entry name of `reader` is round-trip stable, stopping
    /// at the first one that is not.
    pub fn validates_all_entry_names<R: ArchiveReader>(&self, reader: &R) -> bool {
        self.validate_entry_names(reader, ValidationPolicy::ShortCircuit)
    }

    /// Check every entry name of `reader` under `policy`.
    pub fn validate_entry_names<R: ArchiveReader>(
        &self,
        reader: &R,
        policy: ValidationPolicy,
    ) -> bool {
        match policy {
            ValidationPolicy::ShortCircuit => {
                reader.entry_names().all(|name| self.check_entry_name(name))
            }
            ValidationPolicy::FullScan => reader
                .entry_names()
                .fold(true, |valid, name| self.check_entry_name(name) && valid),
        }
    }

    fn check_entry_name(&self, name: &str) -> bool {
        let valid = self.validates_round_trip(name);
        if !valid {
            debug!(
                source = %self.source,
                charset = self.charset.name(),
                name,
                "entry name is not round-trip stable"
            );
        }
        valid
    }
}

impl fmt::Display for CandidatePairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as {}", self.source, self.charset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockOpener, MockReader};
    use oxicharset_core::OxiCharsetError;
    use std::collections::HashSet;
    use tracing_test::traced_test;

    fn pairing(charset: Charset) -> CandidatePairing {
        CandidatePairing::new("legacy.zip", charset).unwrap()
    }

    #[test]
    fn test_new_requires_source() {
        let err = CandidatePairing::new("", Charset::UTF_8).unwrap_err();
        assert!(matches!(err, OxiCharsetError::MissingArgument { argument: "source" }));
    }

    #[test]
    fn test_structural_equality() {
        let a = pairing(Charset::SHIFT_JIS);
        let b = pairing(Charset::SHIFT_JIS);
        let c = pairing(Charset::EUC_JP);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(c < a);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_reencode_mappable_text_is_identity() {
        let sjis = pairing(Charset::SHIFT_JIS);
        assert_eq!(sjis.reencode("日本語.txt"), "日本語.txt");
        assert!(sjis.validates_round_trip("日本語.txt"));
        assert!(sjis.validates_round_trip(""));
    }

    #[test]
    fn test_reencode_unmappable_text_changes() {
        let sjis = pairing(Charset::SHIFT_JIS);
        assert_eq!(sjis.reencode("café"), "caf&#233;");
        assert!(!sjis.validates_round_trip("café"));

        let latin = pairing(Charset::WINDOWS_1252);
        assert!(latin.validates_round_trip("café"));
        assert!(!latin.validates_round_trip("日本語"));
    }

    #[test]
    fn test_reencode_half_width_katakana_under_iso_2022_jp() {
        // The ISO-2022-JP encoder folds half-width katakana to full width.
        let jis = pairing(Charset::ISO_2022_JP);
        assert_eq!(jis.reencode("ｱ"), "ア");
        assert!(!jis.validates_round_trip("ｱ"));
    }

    #[test]
    fn test_validates_all_entry_names() {
        let sjis = pairing(Charset::SHIFT_JIS);
        let good = MockReader::with_names(Charset::SHIFT_JIS, &["a.txt", "資料/表.xls"]);
        let bad = MockReader::with_names(Charset::SHIFT_JIS, &["a.txt", "café", "b.txt"]);
        assert!(sjis.validates_all_entry_names(&good));
        assert!(!sjis.validates_all_entry_names(&bad));
        assert!(sjis.validates_all_entry_names(&MockReader::with_names(Charset::SHIFT_JIS, &[])));
    }

    #[traced_test]
    #[test]
    fn test_short_circuit_logs_first_rejected_name_only() {
        let sjis = pairing(Charset::SHIFT_JIS);
        let reader = MockReader::with_names(Charset::SHIFT_JIS, &["café", "naïve"]);
        assert!(!sjis.validate_entry_names(&reader, ValidationPolicy::ShortCircuit));
        assert!(logs_contain("café"));
        assert!(!logs_contain("naïve"));
    }

    #[traced_test]
    #[test]
    fn test_full_scan_logs_every_rejected_name() {
        let sjis = pairing(Charset::SHIFT_JIS);
        let reader = MockReader::with_names(Charset::SHIFT_JIS, &["café", "ok.txt", "naïve"]);
        assert!(!sjis.validate_entry_names(&reader, ValidationPolicy::FullScan));
        assert!(logs_contain("café"));
        assert!(logs_contain("naïve"));
    }

    #[test]
    fn test_with_reader_releases_reader() {
        let opener = MockOpener::new().names(Charset::UTF_8, &["a.txt"]);
        let utf8 = pairing(Charset::UTF_8);

        let count = utf8
            .with_reader_using(&opener, |reader| reader.entries().len())
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(opener.attempts(), 1);
        assert_eq!(opener.live_readers(), 0);
    }

    #[test]
    fn test_open_reader_propagates_errors() {
        let opener = MockOpener::new();
        let err = pairing(Charset::EUC_JP)
            .open_reader_with(&opener)
            .unwrap_err();
        assert!(err.is_archive_open_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(pairing(Charset::EUC_JP).to_string(), "legacy.zip as EUC-JP");
    }
}
