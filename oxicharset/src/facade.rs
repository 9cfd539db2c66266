//! One-shot "find the right charset" operations.
//!
//! [`EncodedArchive`] is both the search outcome (a pairing with its open
//! reader) and the entry point for the common cases. [`SearchFacade`] carries
//! a custom [`CharsetRegistry`] and [`SearchOptions`] for the rest.

use crate::collection::CandidateCollection;
use crate::options::SearchOptions;
use crate::pairing::CandidatePairing;
use oxicharset_core::error::{OxiCharsetError, Result};
use oxicharset_core::{ArchiveOpener, ArchiveReader, ByteSource, Charset, CharsetRegistry, Entry};
use oxicharset_zip::{ZipOpener, ZipReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// A pairing whose archive is open, with names decoded under its charset.
///
/// Owns the reader; dropping this releases the byte source.
#[derive(Debug)]
pub struct EncodedArchive<R = ZipReader<BufReader<File>>> {
    pairing: CandidatePairing,
    reader: R,
}

impl<R> EncodedArchive<R> {
    /// Bundle a pairing with the reader opened for it.
    pub fn new(pairing: CandidatePairing, reader: R) -> Self {
        Self { pairing, reader }
    }

    /// The matched pairing.
    pub fn pairing(&self) -> &CandidatePairing {
        &self.pairing
    }

    /// The byte source.
    pub fn source(&self) -> &ByteSource {
        self.pairing.source()
    }

    /// The charset names were decoded with.
    pub fn charset(&self) -> Charset {
        self.pairing.charset()
    }

    /// The open reader.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Take the reader, keeping it open.
    pub fn into_reader(self) -> R {
        self.reader
    }

    /// Split into pairing and reader.
    pub fn into_parts(self) -> (CandidatePairing, R) {
        (self.pairing, self.reader)
    }
}

impl<R: ArchiveReader> EncodedArchive<R> {
    /// Entries with decoded names.
    pub fn entries(&self) -> &[Entry] {
        self.reader.entries()
    }
}

impl EncodedArchive {
    /// Pair `source` with `charset` and open it.
    ///
    /// Every failure is returned: missing source, unreadable file, bytes that
    /// are not a ZIP archive, names that do not decode under `charset`.
    pub fn of(charset: Charset, source: impl AsRef<Path>) -> Result<Self> {
        let pairing = CandidatePairing::new(source, charset)?;
        let reader = pairing.open_reader()?;
        Ok(Self::new(pairing, reader))
    }

    /// Like [`of`](Self::of), but also requires round-trip stable names and
    /// turns any failure into `None`.
    ///
    /// Takes an already validated [`ByteSource`] rather than a path, so a
    /// missing source fails at [`ByteSource::new`] instead of disappearing
    /// into `None`.
    pub fn of_optional(charset: Charset, source: &ByteSource) -> Option<Self> {
        SearchFacade::new().of_optional(charset, source)
    }

    /// Try the charsets named by `charset_names`, in order, and return the
    /// first whose decoding of `source` is valid.
    ///
    /// Names the registry does not know are skipped. Fails with
    /// `InvalidArgument` when no names are given, and with `Io` when the
    /// source cannot be read at all.
    pub fn find_first_of<S: AsRef<str>>(
        source: &ByteSource,
        charset_names: &[S],
    ) -> Result<Option<Self>> {
        SearchFacade::new().find_first_of(source, charset_names)
    }

    /// Like [`find_first_of`](Self::find_first_of), with every search error
    /// turned into `None`.
    ///
    /// An empty `charset_names` is still returned as `InvalidArgument`.
    pub fn find_first_of_optional<S: AsRef<str>>(
        source: &ByteSource,
        charset_names: &[S],
    ) -> Result<Option<Self>> {
        SearchFacade::new().find_first_of_optional(source, charset_names)
    }
}

/// Charset search with a custom registry and options.
#[derive(Debug, Clone, Default)]
pub struct SearchFacade {
    registry: CharsetRegistry,
    options: SearchOptions,
}

impl SearchFacade {
    /// Facade with WHATWG labels and default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `registry` to resolve charset names.
    pub fn with_registry(mut self, registry: CharsetRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use `options` for validation.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// The charset registry.
    pub fn registry(&self) -> &CharsetRegistry {
        &self.registry
    }

    /// The search options.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Open and validate `source` under `charset`; `None` on any failure.
    pub fn of_optional(&self, charset: Charset, source: &ByteSource) -> Option<EncodedArchive> {
        self.of_optional_with(&ZipOpener, charset, source)
    }

    /// [`of_optional`](Self::of_optional) through `opener`.
    pub fn of_optional_with<O: ArchiveOpener>(
        &self,
        opener: &O,
        charset: Charset,
        source: &ByteSource,
    ) -> Option<EncodedArchive<O::Reader>> {
        let pairing = CandidatePairing::from_parts(source.clone(), charset);
        let reader = match pairing.open_reader_with(opener) {
            Ok(reader) => reader,
            Err(e) => {
                debug!(candidate = %pairing, error = %e, "failed to open archive");
                return None;
            }
        };

        if pairing.validate_entry_names(&reader, self.options.policy()) {
            Some(EncodedArchive::new(pairing, reader))
        } else {
            debug!(candidate = %pairing, "entry names are not round-trip stable");
            None
        }
    }

    /// Resolve `charset_names` and return the first valid candidate.
    pub fn find_first_of<S: AsRef<str>>(
        &self,
        source: &ByteSource,
        charset_names: &[S],
    ) -> Result<Option<EncodedArchive>> {
        self.find_first_of_with(&ZipOpener, source, charset_names)
    }

    /// [`find_first_of`](Self::find_first_of) through `opener`.
    pub fn find_first_of_with<O: ArchiveOpener, S: AsRef<str>>(
        &self,
        opener: &O,
        source: &ByteSource,
        charset_names: &[S],
    ) -> Result<Option<EncodedArchive<O::Reader>>> {
        require_names(charset_names)?;

        let charsets = self.resolve_all(charset_names);
        if charsets.is_empty() {
            return Ok(None);
        }

        let mut collection = CandidateCollection::with_options(self.options);
        collection.collect_for_file(source, &charsets)?;
        collection.find_first_valid_with(opener)
    }

    /// [`find_first_of`](Self::find_first_of) with every search error turned
    /// into `None`; argument errors are still returned.
    pub fn find_first_of_optional<S: AsRef<str>>(
        &self,
        source: &ByteSource,
        charset_names: &[S],
    ) -> Result<Option<EncodedArchive>> {
        self.find_first_of_optional_with(&ZipOpener, source, charset_names)
    }

    /// [`find_first_of_optional`](Self::find_first_of_optional) through `opener`.
    pub fn find_first_of_optional_with<O: ArchiveOpener, S: AsRef<str>>(
        &self,
        opener: &O,
        source: &ByteSource,
        charset_names: &[S],
    ) -> Result<Option<EncodedArchive<O::Reader>>> {
        require_names(charset_names)?;
        match self.find_first_of_with(opener, source, charset_names) {
            Ok(found) => Ok(found),
            Err(e) => {
                warn!(source = %source, error = %e, "charset search aborted");
                Ok(None)
            }
        }
    }

    /// Resolve names in order, skipping the ones the registry rejects.
    fn resolve_all<S: AsRef<str>>(&self, charset_names: &[S]) -> Vec<Charset> {
        charset_names
            .iter()
            .filter_map(|name| match self.registry.resolve(name.as_ref()) {
                Ok(charset) => Some(charset),
                Err(e) => {
                    debug!(name = name.as_ref(), error = %e, "skipping charset");
                    None
                }
            })
            .collect()
    }
}

fn require_names<S>(charset_names: &[S]) -> Result<()> {
    if charset_names.is_empty() {
        return Err(OxiCharsetError::invalid_argument("charset names is empty"));
    }
    Ok(())
}
