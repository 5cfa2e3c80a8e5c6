use std::fmt::Write as _;
use std::path::Path;

use seqio_stream::hashing::HASH_SIZE;
use seqio_stream::{ContentHasher, HashKind, Stream, StreamError};

use crate::error::{Error, Result};

pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{:02x}", b);
    }
    s
}

pub fn human_size(bytes: u64) -> String {
    use humansize::{file_size_opts as options, FileSize};

    bytes
        .file_size(options::CONVENTIONAL)
        .unwrap_or_else(|_| format!("{} B", bytes))
}

/// Feeds every buffered chunk of `stream` to `sink` until the source is
/// exhausted.
pub fn drain<F>(stream: &mut Stream, mut sink: F) -> std::result::Result<(), StreamError>
where
    F: FnMut(&[u8]) -> std::result::Result<(), StreamError>,
{
    while stream.refill()?.is_some() {
        stream.unget_byte();
        let chunk = stream.raw_cursor();
        let len = chunk.len();
        sink(chunk)?;
        stream.commit(len);
    }
    Ok(())
}

/// Size and content hash of the file at `path`.
pub fn hash_file(path: &Path, kind: HashKind) -> Result<(u64, [u8; HASH_SIZE])> {
    let mut stream = Stream::open_read(path).map_err(|source| Error::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = ContentHasher::new(kind);
    let read_error = |source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    };

    drain(&mut stream, |chunk| {
        hasher.update(chunk);
        Ok(())
    })
    .map_err(read_error)?;
    stream.close().map_err(read_error)?;

    Ok((hasher.bytes_hashed(), hasher.finalize()))
}
