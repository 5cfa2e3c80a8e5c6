use std::path::PathBuf;

use seqio_stream::{ParseError, StreamError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open file `{}`", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: StreamError,
    },

    #[error("Cannot read file `{}`", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: StreamError,
    },

    #[error("Cannot create file `{}`", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: StreamError,
    },

    #[error("Cannot write output")]
    WriteOutput {
        #[source]
        source: StreamError,
    },

    #[error("Cannot parse manifest `{}` at line {line}", .path.display())]
    ParseManifest {
        path: PathBuf,
        line: u64,
        #[source]
        source: ParseError,
    },

    #[error("Manifest `{}` line {line}: expected {expected:?}", .path.display())]
    ManifestSyntax {
        path: PathBuf,
        line: u64,
        expected: char,
    },

    #[error("Path in manifest `{}` line {line} is not valid UTF-8", .path.display())]
    ManifestPath { path: PathBuf, line: u64 },

    #[error("{failed} of {total} files failed verification")]
    VerifyFailed { failed: usize, total: usize },
}
