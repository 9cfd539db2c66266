//! Ordered candidate sets and the search over them.

use crate::facade::EncodedArchive;
use crate::options::SearchOptions;
use crate::pairing::CandidatePairing;
use oxicharset_core::error::{OxiCharsetError, Result};
use oxicharset_core::{ArchiveOpener, ByteSource, Charset};
use oxicharset_zip::ZipOpener;
use std::path::Path;
use std::slice;
use tracing::{debug, trace};

/// An ordered sequence of candidates.
///
/// Insertion order is the search priority. Candidates can only be added
/// through the `collect*` operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateCollection {
    candidates: Vec<CandidatePairing>,
    options: SearchOptions,
}

impl CandidateCollection {
    /// Create an empty collection with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection with `options`.
    pub fn with_options(options: SearchOptions) -> Self {
        Self {
            candidates: Vec::new(),
            options,
        }
    }

    /// One source tried under each of `charsets`, in order.
    pub fn for_file(source: impl AsRef<Path>, charsets: &[Charset]) -> Result<Self> {
        let mut collection = Self::new();
        collection.collect_for_file(source, charsets)?;
        Ok(collection)
    }

    /// The search options.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Append `(source, charset)` for every source (outer) and every
    /// charset (inner).
    ///
    /// All sources are checked before anything is appended, so a
    /// `MissingArgument` failure leaves the collection unchanged.
    pub fn collect<S, C>(&mut self, sources: S, charsets: C) -> Result<&mut Self>
    where
        S: IntoIterator,
        S::Item: AsRef<Path>,
        C: IntoIterator<Item = Charset>,
    {
        let sources = sources
            .into_iter()
            .map(ByteSource::new)
            .collect::<Result<Vec<_>>>()?;
        let charsets: Vec<Charset> = charsets.into_iter().collect();

        self.candidates.reserve(sources.len() * charsets.len());
        for source in &sources {
            for &charset in &charsets {
                self.candidates
                    .push(CandidatePairing::from_parts(source.clone(), charset));
            }
        }
        Ok(self)
    }

    /// Append `source` paired with each of `charsets`.
    ///
    /// Fails with `MissingArgument` on an empty source and with
    /// `InvalidArgument` when `charsets` is empty.
    pub fn collect_for_file(
        &mut self,
        source: impl AsRef<Path>,
        charsets: &[Charset],
    ) -> Result<&mut Self> {
        let source = ByteSource::new(source)?;
        if charsets.is_empty() {
            return Err(OxiCharsetError::invalid_argument("charsets is empty"));
        }
        self.collect([source], charsets.iter().copied())
    }

    /// Append each of `sources` paired with `charset`.
    ///
    /// Fails with `InvalidArgument` when `sources` is empty and with
    /// `MissingArgument` when any source is empty.
    pub fn collect_for_charset<P: AsRef<Path>>(
        &mut self,
        charset: Charset,
        sources: &[P],
    ) -> Result<&mut Self> {
        if sources.is_empty() {
            return Err(OxiCharsetError::invalid_argument("sources is empty"));
        }
        self.collect(sources, [charset])
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate at `index`.
    pub fn get(&self, index: usize) -> Option<&CandidatePairing> {
        self.candidates.get(index)
    }

    /// Candidates in priority order.
    pub fn iter(&self) -> slice::Iter<'_, CandidatePairing> {
        self.candidates.iter()
    }

    /// Candidates as a slice.
    pub fn as_slice(&self) -> &[CandidatePairing] {
        &self.candidates
    }

    /// Return the first candidate whose archive opens and whose entry names
    /// are all round-trip stable, together with its open reader.
    ///
    /// Later candidates are never attempted. Open failures, unknown charsets
    /// and rejected names only move the search on; any other I/O error is
    /// returned.
    pub fn find_first_valid(&self) -> Result<Option<EncodedArchive>> {
        self.find_first_valid_with(&ZipOpener)
    }

    /// [`find_first_valid`](Self::find_first_valid) through `opener`.
    pub fn find_first_valid_with<O: ArchiveOpener>(
        &self,
        opener: &O,
    ) -> Result<Option<EncodedArchive<O::Reader>>> {
        for (index, pairing) in self.candidates.iter().enumerate() {
            trace!(attempt = index + 1, candidate = %pairing, "trying candidate");
            if let Some(reader) = self.accept(pairing, opener)? {
                debug!(candidate = %pairing, "found valid charset");
                return Ok(Some(EncodedArchive::new(pairing.clone(), reader)));
            }
        }
        Ok(None)
    }

    /// Every candidate that passes the open + validate check, in order.
    ///
    /// Always scans the whole collection; each reader is released before the
    /// next candidate is tried.
    pub fn filter_valid(&self) -> Result<CandidateCollection> {
        self.filter_valid_with(&ZipOpener)
    }

    /// [`filter_valid`](Self::filter_valid) through `opener`.
    pub fn filter_valid_with<O: ArchiveOpener>(&self, opener: &O) -> Result<CandidateCollection> {
        let mut valid = Self::with_options(self.options);
        for pairing in &self.candidates {
            let accepted = self.accept(pairing, opener)?.is_some();
            if accepted {
                valid.candidates.push(pairing.clone());
            }
        }
        Ok(valid)
    }

    /// Open and validate one candidate.
    ///
    /// `Ok(None)` means "not a match"; the reader, if one was opened, has
    /// been dropped by the time this returns.
    fn accept<O: ArchiveOpener>(
        &self,
        pairing: &CandidatePairing,
        opener: &O,
    ) -> Result<Option<O::Reader>> {
        let reader = match pairing.open_reader_with(opener) {
            Ok(reader) => reader,
            Err(e) if e.is_candidate_failure() => {
                debug!(candidate = %pairing, error = %e, "failed to open archive");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if pairing.validate_entry_names(&reader, self.options.policy()) {
            Ok(Some(reader))
        } else {
            debug!(candidate = %pairing, "entry names are not round-trip stable");
            Ok(None)
        }
    }
}

impl<'a> IntoIterator for &'a CandidateCollection {
    type Item = &'a CandidatePairing;
    type IntoIter = slice::Iter<'a, CandidatePairing>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockOpener;
    use crate::options::ValidationPolicy;
    use std::io;
    use std::path::PathBuf;
    use tracing_test::traced_test;

    fn charsets(collection: &CandidateCollection) -> Vec<Charset> {
        collection.iter().map(CandidatePairing::charset).collect()
    }

    #[test]
    fn test_collect_for_file_order() {
        let mut collection = CandidateCollection::new();
        collection
            .collect_for_file(
                "test.zip",
                &[Charset::SHIFT_JIS, Charset::UTF_8, Charset::ISO_2022_JP],
            )
            .unwrap();

        assert_eq!(collection.len(), 3);
        for pairing in &collection {
            assert_eq!(pairing.source().path(), Path::new("test.zip"));
        }
        assert_eq!(
            charsets(&collection),
            [Charset::SHIFT_JIS, Charset::UTF_8, Charset::ISO_2022_JP]
        );
    }

    #[test]
    fn test_collect_for_charset_order() {
        let mut collection = CandidateCollection::new();
        collection
            .collect_for_charset(Charset::EUC_JP, &["f1.zip", "f2.zip"])
            .unwrap();

        assert_eq!(
            collection.as_slice(),
            [
                CandidatePairing::new("f1.zip", Charset::EUC_JP).unwrap(),
                CandidatePairing::new("f2.zip", Charset::EUC_JP).unwrap(),
            ]
        );
    }

    #[test]
    fn test_collect_cross_product_sources_outer() {
        let mut collection = CandidateCollection::new();
        collection
            .collect(
                [PathBuf::from("a.zip"), PathBuf::from("b.zip")],
                [Charset::UTF_8, Charset::SHIFT_JIS],
            )
            .unwrap();

        let pairs: Vec<(String, Charset)> = collection
            .iter()
            .map(|p| (p.source().to_string(), p.charset()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("a.zip".to_string(), Charset::UTF_8),
                ("a.zip".to_string(), Charset::SHIFT_JIS),
                ("b.zip".to_string(), Charset::UTF_8),
                ("b.zip".to_string(), Charset::SHIFT_JIS),
            ]
        );
    }

    #[test]
    fn test_collect_appends_to_existing() {
        let mut collection = CandidateCollection::for_file("a.zip", &[Charset::UTF_8]).unwrap();
        collection
            .collect_for_file("a.zip", &[Charset::UTF_8])
            .unwrap();
        // Duplicates are kept: every requested pairing is appended.
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_collect_missing_source() {
        let mut collection = CandidateCollection::new();
        let err = collection
            .collect(["a.zip", ""], [Charset::UTF_8])
            .unwrap_err();
        assert!(matches!(err, OxiCharsetError::MissingArgument { .. }));
        assert!(collection.is_empty());

        let err = collection
            .collect_for_file("", &[Charset::UTF_8])
            .unwrap_err();
        assert!(matches!(err, OxiCharsetError::MissingArgument { .. }));
    }

    #[test]
    fn test_collect_empty_sets() {
        let mut collection = CandidateCollection::new();
        let err = collection.collect_for_file("a.zip", &[]).unwrap_err();
        assert!(matches!(err, OxiCharsetError::InvalidArgument { .. }));

        let none: [&str; 0] = [];
        let err = collection
            .collect_for_charset(Charset::UTF_8, &none)
            .unwrap_err();
        assert!(matches!(err, OxiCharsetError::InvalidArgument { .. }));

        // The general form accepts empty iterables and appends nothing.
        collection.collect(none, [Charset::UTF_8]).unwrap();
        assert!(collection.is_empty());
    }

    fn wrong_wrong_right_wrong() -> CandidateCollection {
        CandidateCollection::for_file(
            "legacy.zip",
            &[
                Charset::UTF_8,
                Charset::EUC_JP,
                Charset::SHIFT_JIS,
                Charset::ISO_2022_JP,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_find_first_valid_stops_at_first_match() {
        let opener = MockOpener::new()
            .names(Charset::SHIFT_JIS, &["日本語.txt"])
            .names(Charset::ISO_2022_JP, &["日本語.txt"]);

        let found = wrong_wrong_right_wrong()
            .find_first_valid_with(&opener)
            .unwrap()
            .unwrap();

        assert_eq!(found.charset(), Charset::SHIFT_JIS);
        assert_eq!(opener.attempts(), 3);
        // Only the returned reader is still open.
        assert_eq!(opener.live_readers(), 1);
        drop(found);
        assert_eq!(opener.live_readers(), 0);
    }

    #[test]
    fn test_find_first_valid_skips_rejected_names() {
        // EUC-JP "opens" but its names do not round-trip.
        let opener = MockOpener::new()
            .names(Charset::EUC_JP, &["café"])
            .names(Charset::SHIFT_JIS, &["日本語.txt"]);

        let found = wrong_wrong_right_wrong()
            .find_first_valid_with(&opener)
            .unwrap()
            .unwrap();
        assert_eq!(found.charset(), Charset::SHIFT_JIS);
        assert_eq!(opener.live_readers(), 1);
    }

    #[test]
    fn test_find_first_valid_exhausted() {
        let opener = MockOpener::new();
        let found = wrong_wrong_right_wrong()
            .find_first_valid_with(&opener)
            .unwrap();
        assert!(found.is_none());
        assert_eq!(opener.attempts(), 4);
        assert!(
            CandidateCollection::new()
                .find_first_valid_with(&opener)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_find_first_valid_aborts_on_fatal_io() {
        let opener = MockOpener::new()
            .fatal(Charset::EUC_JP, io::ErrorKind::PermissionDenied)
            .names(Charset::SHIFT_JIS, &["a.txt"]);

        let err = wrong_wrong_right_wrong()
            .find_first_valid_with(&opener)
            .unwrap_err();
        assert!(matches!(err, OxiCharsetError::Io(_)));
        assert_eq!(opener.attempts(), 2);
    }

    #[test]
    fn test_filter_valid_scans_everything() {
        let opener = MockOpener::new()
            .names(Charset::EUC_JP, &["café"])
            .names(Charset::SHIFT_JIS, &["日本語.txt"]);

        let valid = wrong_wrong_right_wrong()
            .filter_valid_with(&opener)
            .unwrap();

        assert_eq!(charsets(&valid), [Charset::SHIFT_JIS]);
        assert_eq!(opener.attempts(), 4);
        assert_eq!(opener.live_readers(), 0);
    }

    #[test]
    fn test_filter_valid_keeps_order() {
        let opener = MockOpener::new()
            .names(Charset::UTF_8, &["readme.txt"])
            .names(Charset::SHIFT_JIS, &["readme.txt"])
            .names(Charset::ISO_2022_JP, &["readme.txt"]);

        let valid = wrong_wrong_right_wrong()
            .filter_valid_with(&opener)
            .unwrap();
        assert_eq!(
            charsets(&valid),
            [Charset::UTF_8, Charset::SHIFT_JIS, Charset::ISO_2022_JP]
        );
    }

    #[test]
    fn test_filter_valid_carries_options() {
        let options = SearchOptions::new().with_policy(ValidationPolicy::FullScan);
        let mut collection = CandidateCollection::with_options(options);
        collection
            .collect_for_file("a.zip", &[Charset::UTF_8])
            .unwrap();

        let opener = MockOpener::new().names(Charset::UTF_8, &["a.txt"]);
        let valid = collection.filter_valid_with(&opener).unwrap();
        assert_eq!(valid.options(), options);
        assert_eq!(valid.len(), 1);
    }

    #[traced_test]
    #[test]
    fn test_search_failures_are_logged() {
        let opener = MockOpener::new().names(Charset::EUC_JP, &["café"]);
        let found = wrong_wrong_right_wrong()
            .find_first_valid_with(&opener)
            .unwrap();
        assert!(found.is_none());
        assert!(logs_contain("failed to open archive"));
        assert!(logs_contain("entry names are not round-trip stable"));
    }
}
