//! In-memory opener for unit tests.

use oxicharset_core::error::{OxiCharsetError, Result};
use oxicharset_core::{ArchiveOpener, ArchiveReader, ByteSource, Charset, Entry};
use std::cell::Cell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

/// Reader over a fixed name list; tracks how many instances are alive.
#[derive(Debug)]
pub(crate) struct MockReader {
    charset: Charset,
    entries: Vec<Entry>,
    live: Rc<Cell<usize>>,
}

impl MockReader {
    pub(crate) fn with_names(charset: Charset, names: &[&str]) -> Self {
        Self::tracked(charset, names, Rc::new(Cell::new(1)))
    }

    fn tracked(charset: Charset, names: &[&str], live: Rc<Cell<usize>>) -> Self {
        Self {
            charset,
            entries: names.iter().map(|name| Entry::file(*name, 0)).collect(),
            live,
        }
    }
}

impl ArchiveReader for MockReader {
    fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn charset(&self) -> Charset {
        self.charset
    }
}

impl Drop for MockReader {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

enum Outcome {
    Names(Vec<String>),
    Fatal(io::ErrorKind),
}

/// Opener answering per charset: a name listing, a fatal I/O error, or (for
/// unconfigured charsets) a malformed-name open failure.
#[derive(Default)]
pub(crate) struct MockOpener {
    outcomes: HashMap<Charset, Outcome>,
    attempts: Cell<usize>,
    live: Rc<Cell<usize>>,
}

impl MockOpener {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn names(mut self, charset: Charset, names: &[&str]) -> Self {
        let names = names.iter().map(|name| name.to_string()).collect();
        self.outcomes.insert(charset, Outcome::Names(names));
        self
    }

    pub(crate) fn fatal(mut self, charset: Charset, kind: io::ErrorKind) -> Self {
        self.outcomes.insert(charset, Outcome::Fatal(kind));
        self
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.get()
    }

    pub(crate) fn live_readers(&self) -> usize {
        self.live.get()
    }
}

impl ArchiveOpener for MockOpener {
    type Reader = MockReader;

    fn open(&self, _source: &ByteSource, charset: Charset) -> Result<MockReader> {
        self.attempts.set(self.attempts.get() + 1);
        match self.outcomes.get(&charset) {
            Some(Outcome::Names(names)) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                self.live.set(self.live.get() + 1);
                Ok(MockReader::tracked(charset, &names, Rc::clone(&self.live)))
            }
            Some(Outcome::Fatal(kind)) => Err(io::Error::from(*kind).into()),
            None => Err(OxiCharsetError::malformed_entry_name(charset.name(), 0)),
        }
    }
}
