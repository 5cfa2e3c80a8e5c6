//! Destination bookkeeping and the replicated write protocol.

use std::fs::{File, OpenOptions};
use std::io;

use crate::error::StreamError;
use crate::handle::Handle;
use crate::path::StreamPath;

/// One slot of a stream's handle list. Write streams start with every slot
/// detached.
pub(crate) struct Destination<H> {
    pub(crate) path: StreamPath,
    pub(crate) handle: Option<H>,
}

impl<H: Handle> Destination<H> {
    pub(crate) fn detached() -> Self {
        Destination {
            path: StreamPath::default(),
            handle: None,
        }
    }

    pub(crate) fn attached(path: StreamPath, handle: H) -> Self {
        Destination {
            path,
            handle: Some(handle),
        }
    }
}

pub(crate) fn create_destination(path: &StreamPath) -> Result<File, StreamError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options
        .open(path.as_path())
        .map_err(|source| StreamError::Open {
            path: path.clone(),
            source,
        })
}

pub(crate) fn read_retrying<H: Handle>(handle: &mut H, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match handle.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

/// Writes `data` to each destination in order, stopping at the first one
/// that errors or takes less than all of it.
///
/// The error carries the index of the failing destination.
pub(crate) fn replicate<H: Handle>(
    destinations: &mut [Destination<H>],
    data: &[u8],
) -> Result<(), (usize, StreamError)> {
    for (index, dest) in destinations.iter_mut().enumerate() {
        let handle = match dest.handle.as_mut() {
            Some(h) => h,
            None => return Err((index, StreamError::Detached { index })),
        };

        let result = match handle.write(data) {
            Ok(n) if n == data.len() => Ok(()),
            Ok(n) => Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", n, data.len()),
            )),
            Err(e) => Err(e),
        };

        if let Err(source) = result {
            return Err((
                index,
                StreamError::Write {
                    index,
                    path: dest.path.clone(),
                    source,
                },
            ));
        }
    }

    Ok(())
}

pub(crate) fn sync_all<H: Handle>(
    destinations: &mut [Destination<H>],
) -> Result<(), (usize, StreamError)> {
    for (index, dest) in destinations.iter_mut().enumerate() {
        let handle = match dest.handle.as_mut() {
            Some(h) => h,
            None => return Err((index, StreamError::Detached { index })),
        };

        if let Err(source) = handle.sync() {
            return Err((
                index,
                StreamError::Sync {
                    index,
                    path: dest.path.clone(),
                    source,
                },
            ));
        }
    }

    Ok(())
}

/// Closes every destination, even after a failure, and reports the first
/// failure seen. A slot that was never attached counts as a failure.
pub(crate) fn close_all<H: Handle>(destinations: Vec<Destination<H>>) -> Result<(), StreamError> {
    let mut first_error = None;

    for (index, dest) in destinations.into_iter().enumerate() {
        let result = match dest.handle {
            Some(handle) => handle.close().map_err(|source| StreamError::Close {
                index,
                path: dest.path,
                source,
            }),
            None => Err(StreamError::Detached { index }),
        };

        if let Err(e) = result {
            tracing::warn!(index, error = %e, "destination close failed");
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
