//! # OxiCharset Core
//!
//! Core components for the OxiCharset library.
//!
//! - [`charset`]: Charset handles and the label registry
//! - [`source`]: Byte sources (archive files)
//! - [`entry`]: Archive entry metadata
//! - [`traits`]: The archive-reading seam
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Search                                              │
//! │     CandidatePairing, CandidateCollection, facade       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Container                                           │
//! │     ZIP central directory listing under a charset       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     Charset, ByteSource, Entry, traits, errors          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxicharset_core::Charset;
//!
//! let charset = Charset::for_label("sjis").unwrap();
//! assert_eq!(charset, Charset::SHIFT_JIS);
//!
//! let (bytes, _) = charset.encode("日本語.txt");
//! assert_eq!(charset.decode_strict(&bytes).as_deref(), Some("日本語.txt"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod charset;
pub mod entry;
pub mod error;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use charset::{Charset, CharsetRegistry};
pub use entry::{Entry, EntryType};
pub use error::{OxiCharsetError, Result};
pub use source::ByteSource;
pub use traits::{ArchiveOpener, ArchiveReader};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::charset::{Charset, CharsetRegistry};
    pub use crate::entry::{Entry, EntryType};
    pub use crate::error::{OxiCharsetError, Result};
    pub use crate::source::ByteSource;
    pub use crate::traits::{ArchiveOpener, ArchiveReader};
}
