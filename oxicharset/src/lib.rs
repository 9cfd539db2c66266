//! # OxiCharset
//!
//! Find the charset a legacy ZIP archive's entry names were written in.
//!
//! Older archivers stored entry names as raw bytes in the writer's code page
//! and recorded nothing about which one. This crate tries candidate
//! `(file, charset)` pairings in priority order. A pairing is accepted when
//! the archive opens with names decoded under the charset and every decoded
//! name survives an encode/decode round trip through that same charset.
//!
//! - [`CandidatePairing`]: one file bound to one charset
//! - [`CandidateCollection`]: ordered candidates, first-match and filter searches
//! - [`EncodedArchive`]: the search outcome, plus one-shot entry points
//! - [`SearchFacade`]: one-shot search with a custom registry and options
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxicharset::{ByteSource, EncodedArchive};
//!
//! let source = ByteSource::new("legacy.zip")?;
//! let found = EncodedArchive::find_first_of(&source, &["euc-jp", "UTF-8", "Shift_JIS"])?;
//! if let Some(archive) = found {
//!     println!("{} decodes as {}", archive.source(), archive.charset());
//!     for entry in archive.entries() {
//!         println!("  {}", entry.name);
//!     }
//! }
//! # Ok::<(), oxicharset::OxiCharsetError>(())
//! ```
//!
//! Round-trip stability is necessary for a charset to be the right one, not
//! sufficient: candidate order decides between charsets that all accept the
//! same names.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod collection;
pub mod facade;
pub mod options;
pub mod pairing;

#[cfg(test)]
mod mock;

pub use collection::CandidateCollection;
pub use facade::{EncodedArchive, SearchFacade};
pub use options::{SearchOptions, ValidationPolicy};
pub use pairing::CandidatePairing;

pub use oxicharset_core::{
    ArchiveOpener, ArchiveReader, ByteSource, Charset, CharsetRegistry, Entry, EntryType,
    OxiCharsetError, Result,
};
pub use oxicharset_zip::{ZipArchive, ZipOpener, ZipReader};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::collection::CandidateCollection;
    pub use crate::facade::{EncodedArchive, SearchFacade};
    pub use crate::options::{SearchOptions, ValidationPolicy};
    pub use crate::pairing::CandidatePairing;
    pub use oxicharset_core::prelude::*;
}
