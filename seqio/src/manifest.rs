//! Manifest lines: `<size> <hash-hex> <path>\n`.

use std::path::{Path, PathBuf};

use seqio_stream::hashing::HASH_SIZE;
use seqio_stream::{Handle, ParseError, Stream, StreamError, PATH_MAX};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub size: u64,
    pub hash: [u8; HASH_SIZE],
    pub path: PathBuf,
}

pub fn write_entry<H: Handle>(
    stream: &mut Stream<H>,
    entry: &Entry,
) -> std::result::Result<(), StreamError> {
    stream.write_u64(entry.size)?;
    stream.put_byte(b' ')?;
    stream.write_hex(&entry.hash)?;
    stream.put_byte(b' ')?;
    stream.write_str(&entry.path.to_string_lossy())?;
    stream.put_byte(b'\n')
}

/// Reads manifest entries one line at a time.
pub struct EntryReader<'a, H: Handle> {
    stream: &'a mut Stream<H>,
    source: &'a Path,
    line: u64,
    field: Vec<u8>,
}

impl<'a, H: Handle> EntryReader<'a, H> {
    pub fn new(stream: &'a mut Stream<H>, source: &'a Path) -> Self {
        EntryReader {
            stream,
            source,
            line: 0,
            field: Vec::new(),
        }
    }

    fn parse_error(&self, source: ParseError) -> Error {
        Error::ParseManifest {
            path: self.source.to_path_buf(),
            line: self.line,
            source,
        }
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        match self.stream.get_byte() {
            Ok(Some(c)) if c == expected => Ok(()),
            Ok(_) => Err(Error::ManifestSyntax {
                path: self.source.to_path_buf(),
                line: self.line,
                expected: expected as char,
            }),
            Err(e) => Err(self.parse_error(e.into())),
        }
    }

    /// The next entry, or `None` at the end of the manifest.
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        match self.stream.get_byte() {
            Ok(None) => return Ok(None),
            Ok(Some(_)) => self.stream.unget_byte(),
            Err(e) => return Err(self.parse_error(e.into())),
        }
        self.line += 1;

        let size = self.stream.read_u64().map_err(|e| self.parse_error(e))?;
        self.expect(b' ')?;

        let mut hash = [0u8; HASH_SIZE];
        self.stream
            .read_hex(&mut hash)
            .map_err(|e| self.parse_error(e))?;
        self.expect(b' ')?;

        self.stream
            .read_trimmed_line(&mut self.field, PATH_MAX - 1)
            .map_err(|e| self.parse_error(e))?;
        let path = match std::str::from_utf8(&self.field) {
            Ok(s) => PathBuf::from(s),
            Err(_) => {
                return Err(Error::ManifestPath {
                    path: self.source.to_path_buf(),
                    line: self.line,
                })
            }
        };

        // The line ends at a newline or at the end of the manifest.
        match self.stream.get_byte() {
            Ok(_) => {}
            Err(e) => return Err(self.parse_error(e.into())),
        }

        Ok(Some(Entry { size, hash, path }))
    }
}
