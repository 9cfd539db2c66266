//! # OxiCharset ZIP
//!
//! Read-only ZIP listing for charset discovery.
//!
//! ZIP archives written by legacy tools store entry names in whatever code
//! page the tool happened to run under, and only modern writers set the
//! UTF-8 flag. This crate reads the central directory and decodes every
//! name strictly under a caller-chosen [`Charset`](oxicharset_core::Charset):
//! an archive whose names are not valid in that charset fails to open.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxicharset_core::Charset;
//! use oxicharset_zip::ZipArchive;
//!
//! let reader = ZipArchive::open("legacy.zip", Charset::SHIFT_JIS).unwrap();
//! for entry in reader.entries() {
//!     println!("{}", entry.name);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod header;
pub mod reader;

// Re-exports
pub use header::{CentralDirectoryHeader, EndOfCentralDirectory, FLAG_UTF8};
pub use reader::{ZipArchive, ZipOpener, ZipReader};
