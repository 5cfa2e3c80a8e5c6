use std::fs::File;
use std::path::Path;

use crate::error::StreamError;
use crate::handle::Handle;
use crate::mem;
use crate::path::StreamPath;

mod bridge;
mod fanout;
mod reader;
mod writer;

#[cfg(test)]
mod tests;

pub(crate) use fanout::Destination;

/// Buffer capacity of every stream.
pub const STREAM_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
    /// The source is exhausted. Terminal.
    EndOfFile,
    /// A read, write or sync failed. Terminal.
    Faulted,
}

/// A buffered sequential reader over one source, or a writer replicating
/// everything it is given to an ordered list of destinations.
///
/// In read mode `buffer[cursor..limit]` holds unread data. In write mode
/// `buffer[..cursor]` holds bytes not yet flushed and `limit` is the capacity.
pub struct Stream<H: Handle = File> {
    buffer: Box<[u8]>,
    cursor: usize,
    limit: usize,
    mode: Mode,
    writer: bool,
    fault_index: usize,
    destinations: Vec<Destination<H>>,
}

impl Stream<File> {
    /// Opens `path` for sequential reading.
    pub fn open_read<P: AsRef<Path>>(path: P) -> Result<Stream<File>, StreamError> {
        let path = StreamPath::new(path);
        let file = File::open(path.as_path()).map_err(|source| StreamError::Open {
            path: path.clone(),
            source,
        })?;

        if let Err(e) = file.advise_sequential() {
            tracing::debug!(path = %path, error = %e, "sequential advice not applied");
        }

        tracing::debug!(path = %path, "opened stream for reading");
        Ok(Stream::from_handle(path, file))
    }

    /// Allocates a write stream with `count` destinations, none attached yet.
    ///
    /// Attach every slot with [`Stream::attach`] before writing.
    pub fn open_write(count: usize) -> Stream<File> {
        Stream::with_slots(count)
    }

    /// Creates (or truncates) the file at `path` as destination `index`.
    ///
    /// On failure the stream must not be used further: attach a replacement
    /// or close it.
    pub fn attach<P: AsRef<Path>>(&mut self, index: usize, path: P) -> Result<(), StreamError> {
        let path = StreamPath::new(path);
        let file = fanout::create_destination(&path)?;

        if let Err(source) = file.advise_sequential() {
            let _ = file.close();
            return Err(StreamError::Advise { path, source });
        }

        self.attach_handle(index, path, file);
        Ok(())
    }

    /// Write stream with a single destination at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Stream<File>, StreamError> {
        let mut stream = Stream::open_write(1);
        if let Err(e) = stream.attach(0, path) {
            let _ = stream.close();
            return Err(e);
        }
        Ok(stream)
    }
}

impl<H: Handle> Stream<H> {
    fn new(mode: Mode, capacity: usize, destinations: Vec<Destination<H>>) -> Self {
        let limit = match mode {
            Mode::Write => capacity,
            _ => 0,
        };

        Stream {
            buffer: mem::alloc_buffer(capacity),
            cursor: 0,
            limit,
            mode,
            writer: mode == Mode::Write,
            fault_index: 0,
            destinations,
        }
    }

    /// Read stream over an already open source.
    pub fn from_handle(path: StreamPath, handle: H) -> Self {
        Self::from_handle_with_capacity(path, handle, STREAM_SIZE)
    }

    pub(crate) fn from_handle_with_capacity(path: StreamPath, handle: H, capacity: usize) -> Self {
        Stream::new(
            Mode::Read,
            capacity,
            vec![Destination::attached(path, handle)],
        )
    }

    /// Write stream with `count` empty destination slots.
    pub fn with_slots(count: usize) -> Self {
        Self::with_slots_and_capacity(count, STREAM_SIZE)
    }

    pub(crate) fn with_slots_and_capacity(count: usize, capacity: usize) -> Self {
        let destinations = (0..count).map(|_| Destination::detached()).collect();
        Stream::new(Mode::Write, capacity, destinations)
    }

    /// Installs an already open handle as destination `index`.
    ///
    /// # Panics
    ///
    /// If `index` is not a slot of this stream.
    pub fn attach_handle(&mut self, index: usize, path: StreamPath, handle: H) {
        tracing::debug!(index, path = %path, "attached destination");
        self.destinations[index] = Destination::attached(path, handle);
    }

    #[inline(always)]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Index of the destination that faulted the stream, if it has faulted.
    pub fn fault_index(&self) -> Option<usize> {
        match self.mode {
            Mode::Faulted => Some(self.fault_index),
            _ => None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes written but not yet flushed. Always zero for read streams.
    pub fn pending(&self) -> usize {
        if self.writer {
            self.cursor
        } else {
            0
        }
    }

    pub fn destination_count(&self) -> usize {
        self.destinations.len()
    }

    pub fn destination_path(&self, index: usize) -> Option<&StreamPath> {
        self.destinations.get(index).map(|d| &d.path)
    }

    fn fault(&mut self, index: usize) {
        tracing::warn!(
            index,
            path = %self.destinations[index].path,
            "stream faulted"
        );
        self.mode = Mode::Faulted;
        self.fault_index = index;
    }

    /// Error for an operation that needs `expected` mode.
    fn mode_error(&self, expected: Mode) -> StreamError {
        match self.mode {
            Mode::Faulted => StreamError::Faulted {
                index: self.fault_index,
            },
            actual => StreamError::WrongMode { expected, actual },
        }
    }

    /// Reads the next buffer-full from the source and returns its first byte.
    ///
    /// `None` means the source is exhausted; every later call returns `None`
    /// as well. A read error faults the stream.
    pub fn refill(&mut self) -> Result<Option<u8>, StreamError> {
        match self.mode {
            Mode::Read => {}
            Mode::EndOfFile => return Ok(None),
            _ => return Err(self.mode_error(Mode::Read)),
        }

        let result = match self.destinations[0].handle.as_mut() {
            Some(handle) => fanout::read_retrying(handle, &mut self.buffer),
            None => return Err(StreamError::Detached { index: 0 }),
        };

        match result {
            Ok(0) => {
                tracing::trace!(path = %self.destinations[0].path, "end of stream");
                self.cursor = 0;
                self.limit = 0;
                self.mode = Mode::EndOfFile;
                Ok(None)
            }
            Ok(n) => {
                tracing::trace!(bytes = n, "refilled");
                self.cursor = 1;
                self.limit = n;
                Ok(Some(self.buffer[0]))
            }
            Err(source) => {
                self.fault(0);
                Err(StreamError::Read {
                    path: self.destinations[0].path.clone(),
                    source,
                })
            }
        }
    }

    /// Writes the pending bytes to every destination, in order.
    ///
    /// Stops at the first destination that fails or accepts fewer bytes than
    /// pending: the stream faults at that index, earlier destinations already
    /// hold the data and later ones are left untouched. With nothing pending
    /// this does not touch any destination.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        if self.mode != Mode::Write {
            return Err(self.mode_error(Mode::Write));
        }

        if self.cursor == 0 {
            return Ok(());
        }

        if let Err((index, e)) =
            fanout::replicate(&mut self.destinations, &self.buffer[..self.cursor])
        {
            self.fault(index);
            return Err(e);
        }

        tracing::trace!(
            bytes = self.cursor,
            destinations = self.destinations.len(),
            "flushed"
        );
        self.cursor = 0;
        Ok(())
    }

    /// Forces every destination to durable storage. Does not flush.
    pub fn sync(&mut self) -> Result<(), StreamError> {
        if self.mode != Mode::Write {
            return Err(self.mode_error(Mode::Write));
        }

        if let Err((index, e)) = fanout::sync_all(&mut self.destinations) {
            self.fault(index);
            return Err(e);
        }
        Ok(())
    }

    /// Flushes a write stream, then closes every handle whatever the flush
    /// did. Reports the flush failure if there was one, else the first close
    /// failure.
    pub fn close(mut self) -> Result<(), StreamError> {
        let flushed = if self.writer { self.flush() } else { Ok(()) };

        // Whatever is still buffered after a failed flush is dropped here.
        self.cursor = 0;

        let destinations = std::mem::take(&mut self.destinations);
        let count = destinations.len();
        let closed = fanout::close_all(destinations);

        tracing::debug!(
            destinations = count,
            ok = flushed.is_ok() && closed.is_ok(),
            "closed stream"
        );
        flushed.and(closed)
    }

    /// Next byte, refilling the buffer when it is exhausted.
    #[inline(always)]
    pub fn get_byte(&mut self) -> Result<Option<u8>, StreamError> {
        if self.cursor < self.limit && self.mode == Mode::Read {
            let b = self.buffer[self.cursor];
            self.cursor += 1;
            Ok(Some(b))
        } else {
            self.refill()
        }
    }

    /// Steps back over the byte returned by the last [`Stream::get_byte`].
    ///
    /// Only one byte of pushback exists: call this at most once per
    /// successful `get_byte`.
    ///
    /// # Panics
    ///
    /// If nothing was read from the current buffer.
    #[inline(always)]
    pub fn unget_byte(&mut self) {
        self.cursor = self
            .cursor
            .checked_sub(1)
            .expect("unget_byte without a preceding get_byte");
    }

    /// Appends one byte, flushing first if the buffer is full.
    #[inline(always)]
    pub fn put_byte(&mut self, b: u8) -> Result<(), StreamError> {
        if self.mode != Mode::Write {
            return Err(self.mode_error(Mode::Write));
        }

        if self.cursor == self.limit {
            self.flush()?;
        }

        self.buffer[self.cursor] = b;
        self.cursor += 1;
        Ok(())
    }
}

impl<H: Handle> Drop for Stream<H> {
    fn drop(&mut self) {
        if self.writer && self.cursor > 0 {
            tracing::warn!(
                pending = self.cursor,
                "Stream dropped without calling close(); pending bytes are lost"
            );
        }
    }
}

impl<H: Handle> std::fmt::Debug for Stream<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("mode", &self.mode)
            .field("cursor", &self.cursor)
            .field("limit", &self.limit)
            .field("capacity", &self.buffer.len())
            .field("fault_index", &self.fault_index)
            .field(
                "destinations",
                &self.destinations.iter().map(|d| &d.path).collect::<Vec<_>>(),
            )
            .finish()
    }
}
