//! Direct access to the buffer, for parsers that can skip the per-byte calls
//! when a whole field is already resident. Nothing here performs I/O.

use super::{Mode, Stream};
use crate::handle::Handle;

impl<H: Handle> Stream<H> {
    /// Whether the next `n` bytes can be read without a refill.
    #[inline(always)]
    pub fn has_contiguous(&self, n: usize) -> bool {
        self.mode == Mode::Read && self.limit - self.cursor >= n
    }

    /// The unread bytes resident in the buffer.
    ///
    /// Empty unless the stream is in read mode.
    #[inline(always)]
    pub fn raw_cursor(&self) -> &[u8] {
        match self.mode {
            Mode::Read => &self.buffer[self.cursor..self.limit],
            _ => &[],
        }
    }

    /// Whether `n` bytes can be written without a flush.
    #[inline(always)]
    pub fn has_room(&self, n: usize) -> bool {
        self.mode == Mode::Write && self.limit - self.cursor >= n
    }

    /// The free space after the pending bytes.
    ///
    /// Empty unless the stream is in write mode.
    #[inline(always)]
    pub fn raw_window_mut(&mut self) -> &mut [u8] {
        match self.mode {
            Mode::Write => &mut self.buffer[self.cursor..self.limit],
            _ => &mut [],
        }
    }

    /// Moves the cursor past `consumed` bytes of the slice last returned by
    /// [`Stream::raw_cursor`] or [`Stream::raw_window_mut`].
    ///
    /// # Panics
    ///
    /// If that would move the cursor past the limit.
    #[inline(always)]
    pub fn commit(&mut self, consumed: usize) {
        assert!(
            consumed <= self.limit - self.cursor,
            "commit past the end of the buffer"
        );
        self.cursor += consumed;
    }
}
