/// Lowercase digits used when encoding.
pub(crate) const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Decode table entry for bytes that are not hex digits.
///
/// Any composed pair containing it is greater than `0xff`.
pub(crate) const HEX_INVALID: u16 = 0x100;

pub(crate) static HEX_DECODE: [u16; 256] = build_decode_table();

const fn build_decode_table() -> [u16; 256] {
    let mut table = [HEX_INVALID; 256];
    let mut i = 0;
    while i < 10 {
        table[b'0' as usize + i] = i as u16;
        i += 1;
    }
    let mut i = 0;
    while i < 6 {
        table[b'a' as usize + i] = 10 + i as u16;
        table[b'A' as usize + i] = 10 + i as u16;
        i += 1;
    }
    table
}

/// Combine two hex characters. The result is above `0xff` if either is invalid.
#[inline(always)]
pub(crate) fn decode_pair(hi: u8, lo: u8) -> u16 {
    (HEX_DECODE[hi as usize] << 4) | HEX_DECODE[lo as usize]
}

#[inline(always)]
pub(crate) fn encode_byte(b: u8) -> [u8; 2] {
    [HEX_DIGITS[(b >> 4) as usize], HEX_DIGITS[(b & 0xf) as usize]]
}
