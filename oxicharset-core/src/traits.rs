//! Core traits at the archive-reading seam.
//!
//! The search logic never parses archives itself. It asks an
//! [`ArchiveOpener`] for an [`ArchiveReader`] decoding names under one
//! charset, and inspects the decoded names.

use crate::charset::Charset;
use crate::entry::Entry;
use crate::error::Result;
use crate::source::ByteSource;

/// An opened archive that lists its entries.
///
/// Dropping the reader releases the underlying byte source.
pub trait ArchiveReader {
    /// All entries, in directory order, with names already decoded.
    fn entries(&self) -> &[Entry];

    /// The charset names were decoded with.
    fn charset(&self) -> Charset;

    /// Decoded entry names in directory order.
    fn entry_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries().iter().map(|e| e.name.as_str())
    }

    /// Get an entry by decoded name.
    fn entry_by_name(&self, name: &str) -> Option<&Entry> {
        self.entries().iter().find(|e| e.name == name)
    }
}

/// Opens byte sources as archives under a given charset.
pub trait ArchiveOpener {
    /// The reader handle produced on success.
    type Reader: ArchiveReader;

    /// Open `source`, decoding entry names with `charset`.
    ///
    /// Fails when the bytes are not a structurally valid archive, when a
    /// name does not decode under `charset`, or when the source cannot be read.
    fn open(&self, source: &ByteSource, charset: Charset) -> Result<Self::Reader>;
}

impl<O: ArchiveOpener + ?Sized> ArchiveOpener for &O {
    type Reader = O::Reader;

    fn open(&self, source: &ByteSource, charset: Charset) -> Result<Self::Reader> {
        (**self).open(source, charset)
    }
}
