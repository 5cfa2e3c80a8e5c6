use std::io;

use crate::path::StreamPath;
use crate::stream::Mode;

/// Failures of the underlying handles, or misuse of a stream in the wrong mode.
///
/// Any of these raised by refill, flush or sync leaves the stream `Faulted`.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Cannot open `{path}`")]
    Open {
        path: StreamPath,
        #[source]
        source: io::Error,
    },

    #[error("Cannot advise sequential access on `{path}`")]
    Advise {
        path: StreamPath,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read from `{path}`")]
    Read {
        path: StreamPath,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write to destination {index} `{path}`")]
    Write {
        index: usize,
        path: StreamPath,
        #[source]
        source: io::Error,
    },

    #[error("Cannot sync destination {index} `{path}`")]
    Sync {
        index: usize,
        path: StreamPath,
        #[source]
        source: io::Error,
    },

    #[error("Cannot close destination {index} `{path}`")]
    Close {
        index: usize,
        path: StreamPath,
        #[source]
        source: io::Error,
    },

    #[error("Destination {index} was never attached")]
    Detached { index: usize },

    #[error("Stream is faulted (destination {index} failed)")]
    Faulted { index: usize },

    #[error("Operation needs a {expected:?} stream, but the stream is {actual:?}")]
    WrongMode { expected: Mode, actual: Mode },
}

impl StreamError {
    fn kind(&self) -> io::ErrorKind {
        match self {
            StreamError::Open { source, .. }
            | StreamError::Advise { source, .. }
            | StreamError::Read { source, .. }
            | StreamError::Write { source, .. }
            | StreamError::Sync { source, .. }
            | StreamError::Close { source, .. } => source.kind(),
            StreamError::Detached { .. } => io::ErrorKind::NotConnected,
            StreamError::Faulted { .. } => io::ErrorKind::Other,
            StreamError::WrongMode { .. } => io::ErrorKind::Unsupported,
        }
    }
}

impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        io::Error::new(e.kind(), e)
    }
}

/// Failure of a single parsing call.
///
/// Except for [`ParseError::Stream`], these leave the stream usable at its
/// current position.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("field longer than {max} bytes")]
    TooLong { max: usize },

    #[error("expected a decimal digit")]
    NoDigits,

    #[error("invalid hex digit")]
    InvalidHex,

    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl From<ParseError> for io::Error {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Stream(e) => e.into(),
            ParseError::UnexpectedEof => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            ParseError::TooLong { .. } | ParseError::NoDigits | ParseError::InvalidHex => {
                io::Error::new(io::ErrorKind::InvalidData, e)
            }
        }
    }
}
