//! Text field parsing on read streams.
//!
//! Every primitive is written once against [`ByteSource`]. When the bytes it
//! can possibly need are already buffered it runs over the resident slice and
//! commits what it consumed; otherwise it runs over the stream byte by byte.
//! Both give the same result and leave the stream at the same position.

use std::io;

use super::Stream;
use crate::error::{ParseError, StreamError};
use crate::handle::Handle;
use crate::hex;

pub(crate) trait ByteSource {
    fn next_byte(&mut self) -> Result<Option<u8>, StreamError>;

    /// Undo the last successful `next_byte`.
    fn push_back(&mut self);
}

/// Bytes already in the buffer. Running off the end reads as end of stream,
/// so callers must size the slice to what they can consume.
struct Resident<'a> {
    data: &'a [u8],
    pos: usize,
}

impl ByteSource for Resident<'_> {
    #[inline(always)]
    fn next_byte(&mut self) -> Result<Option<u8>, StreamError> {
        let b = self.data.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }

    #[inline(always)]
    fn push_back(&mut self) {
        self.pos -= 1;
    }
}

impl<H: Handle> ByteSource for Stream<H> {
    #[inline(always)]
    fn next_byte(&mut self) -> Result<Option<u8>, StreamError> {
        self.get_byte()
    }

    #[inline(always)]
    fn push_back(&mut self) {
        self.unget_byte()
    }
}

fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

fn never(_: u8) -> bool {
    false
}

/// Copies bytes into `out` up to a newline or a byte matching `stop`.
///
/// The terminator stays unread, and a `\r` right before a newline is dropped.
/// Storing more than `max_len` bytes fails, leaving the extra byte unread.
fn scan_field<S: ByteSource>(
    src: &mut S,
    out: &mut Vec<u8>,
    max_len: usize,
    stop: fn(u8) -> bool,
) -> Result<usize, ParseError> {
    out.clear();

    while let Some(c) = src.next_byte()? {
        if c == b'\n' {
            if out.last() == Some(&b'\r') {
                out.pop();
            }
            src.push_back();
            break;
        }
        if stop(c) {
            src.push_back();
            break;
        }
        if out.len() == max_len {
            src.push_back();
            return Err(ParseError::TooLong { max: max_len });
        }
        out.push(c);
    }

    Ok(out.len())
}

/// Feeds each decimal digit to `push`, pushing back the first non-digit.
fn scan_digits<S: ByteSource>(src: &mut S, mut push: impl FnMut(u8)) -> Result<(), ParseError> {
    match src.next_byte()? {
        Some(c) if c.is_ascii_digit() => push(c - b'0'),
        Some(_) => {
            src.push_back();
            return Err(ParseError::NoDigits);
        }
        None => return Err(ParseError::NoDigits),
    }

    while let Some(c) = src.next_byte()? {
        if !c.is_ascii_digit() {
            src.push_back();
            break;
        }
        push(c - b'0');
    }

    Ok(())
}

/// Decodes `out.len()` pairs of hex characters.
///
/// Invalid characters are only detected once every pair has been consumed.
fn decode_hex<S: ByteSource>(src: &mut S, out: &mut [u8]) -> Result<(), ParseError> {
    let mut seen = 0u16;

    for slot in out.iter_mut() {
        let hi = src.next_byte()?.ok_or(ParseError::UnexpectedEof)?;
        let lo = src.next_byte()?.ok_or(ParseError::UnexpectedEof)?;
        let b = hex::decode_pair(hi, lo);
        seen |= b;
        *slot = b as u8;
    }

    if seen > 0xff {
        return Err(ParseError::InvalidHex);
    }
    Ok(())
}

fn copy_bytes<S: ByteSource>(src: &mut S, out: &mut [u8]) -> Result<(), ParseError> {
    for slot in out.iter_mut() {
        *slot = src.next_byte()?.ok_or(ParseError::UnexpectedEof)?;
    }
    Ok(())
}

/// Evaluates `$body` with `$src` bound to the resident bytes when `$needed`
/// of them are buffered, committing what was consumed; otherwise with `$src`
/// bound to the stream.
macro_rules! with_source {
    ($stream:expr, $needed:expr, |$src:ident| $body:expr) => {{
        if $stream.has_contiguous($needed) {
            let mut resident = Resident {
                data: $stream.raw_cursor(),
                pos: 0,
            };
            let result = {
                let $src = &mut resident;
                $body
            };
            let consumed = resident.pos;
            $stream.commit(consumed);
            result
        } else {
            let $src = &mut *$stream;
            $body
        }
    }};
}

impl<H: Handle> Stream<H> {
    /// Reads a field ending at a space, tab, newline or end of stream.
    ///
    /// The delimiter is left unread, so a call right after another returns an
    /// empty token. Fails with [`ParseError::TooLong`] when the field has more
    /// than `max_len` bytes.
    pub fn read_token(&mut self, out: &mut Vec<u8>, max_len: usize) -> Result<usize, ParseError> {
        with_source!(self, max_len.saturating_add(1), |src| {
            scan_field(src, out, max_len, is_blank)
        })
    }

    /// Reads up to (not including) the next newline, dropping a trailing `\r`.
    pub fn read_line(&mut self, out: &mut Vec<u8>, max_len: usize) -> Result<usize, ParseError> {
        with_source!(self, max_len.saturating_add(1), |src| {
            scan_field(src, out, max_len, never)
        })
    }

    /// [`Stream::read_line`] with trailing spaces and tabs removed.
    pub fn read_trimmed_line(
        &mut self,
        out: &mut Vec<u8>,
        max_len: usize,
    ) -> Result<usize, ParseError> {
        self.read_line(out, max_len)?;
        while out.last().map_or(false, |&c| is_blank(c)) {
            out.pop();
        }
        Ok(out.len())
    }

    /// Reads a decimal number. Overflow wraps silently.
    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        let mut value = 0u32;
        scan_digits(self, |d| {
            value = value.wrapping_mul(10).wrapping_add(d as u32);
        })?;
        Ok(value)
    }

    /// Reads a decimal number. Overflow wraps silently.
    pub fn read_u64(&mut self) -> Result<u64, ParseError> {
        let mut value = 0u64;
        scan_digits(self, |d| {
            value = value.wrapping_mul(10).wrapping_add(d as u64);
        })?;
        Ok(value)
    }

    /// Fills `out` from `2 * out.len()` hex characters of either case.
    pub fn read_hex(&mut self, out: &mut [u8]) -> Result<(), ParseError> {
        with_source!(self, out.len().saturating_mul(2), |src| decode_hex(src, out))
    }

    /// Fills `out` with the next `out.len()` raw bytes.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> Result<(), ParseError> {
        if self.has_contiguous(out.len()) {
            out.copy_from_slice(&self.raw_cursor()[..out.len()]);
            self.commit(out.len());
            return Ok(());
        }
        copy_bytes(self, out)
    }
}

impl<H: Handle> io::Read for Stream<H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if !self.has_contiguous(1) {
            match self.refill()? {
                Some(_) => self.unget_byte(),
                None => return Ok(0),
            }
        }

        let resident = self.raw_cursor();
        let n = resident.len().min(buf.len());
        buf[..n].copy_from_slice(&resident[..n]);
        self.commit(n);
        Ok(n)
    }
}
