//! Text field encoding on write streams.

use std::io;

use super::Stream;
use crate::error::StreamError;
use crate::handle::Handle;
use crate::hex;

pub(crate) trait ByteSink {
    fn put(&mut self, b: u8) -> Result<(), StreamError>;
}

/// Free buffer space known to be large enough for everything put into it.
struct Window<'a> {
    data: &'a mut [u8],
    pos: usize,
}

impl ByteSink for Window<'_> {
    #[inline(always)]
    fn put(&mut self, b: u8) -> Result<(), StreamError> {
        self.data[self.pos] = b;
        self.pos += 1;
        Ok(())
    }
}

impl<H: Handle> ByteSink for Stream<H> {
    #[inline(always)]
    fn put(&mut self, b: u8) -> Result<(), StreamError> {
        self.put_byte(b)
    }
}

fn encode_hex<S: ByteSink>(sink: &mut S, data: &[u8]) -> Result<(), StreamError> {
    for &b in data {
        let [hi, lo] = hex::encode_byte(b);
        sink.put(hi)?;
        sink.put(lo)?;
    }
    Ok(())
}

/// Longest decimal rendering of a `u64`.
const DECIMAL_MAX: usize = 20;

/// Renders `value` into the tail of `buf`, least significant digit first.
fn format_decimal(mut value: u64, buf: &mut [u8; DECIMAL_MAX]) -> &[u8] {
    let mut i = buf.len();
    while value != 0 {
        i -= 1;
        buf[i] = b'0' + (value % 10) as u8;
        value /= 10;
    }
    &buf[i..]
}

impl<H: Handle> Stream<H> {
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), StreamError> {
        if self.has_room(data.len()) {
            self.raw_window_mut()[..data.len()].copy_from_slice(data);
            self.commit(data.len());
            return Ok(());
        }
        data.iter().try_for_each(|&b| self.put_byte(b))
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), StreamError> {
        self.write_bytes(s.as_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), StreamError> {
        self.write_u64(value as u64)
    }

    pub fn write_u64(&mut self, value: u64) -> Result<(), StreamError> {
        if value == 0 {
            return self.put_byte(b'0');
        }
        let mut buf = [0u8; DECIMAL_MAX];
        self.write_bytes(format_decimal(value, &mut buf))
    }

    /// Writes `data` as lowercase hex, two characters per byte.
    pub fn write_hex(&mut self, data: &[u8]) -> Result<(), StreamError> {
        let needed = data.len().saturating_mul(2);
        if self.has_room(needed) {
            let mut window = Window {
                data: self.raw_window_mut(),
                pos: 0,
            };
            encode_hex(&mut window, data)?;
            let written = window.pos;
            self.commit(written);
            return Ok(());
        }
        encode_hex(self, data)
    }
}

impl<H: Handle> io::Write for Stream<H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Stream::flush(self).map_err(io::Error::from)
    }
}
