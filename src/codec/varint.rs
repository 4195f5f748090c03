//! Zig-zag varint primitives
//!
//! Signed integers are zig-zag mapped (0, -1, 1, -2, ... -> 0, 1, 2, 3, ...)
//! then written as little-endian base-128 groups, seven bits per byte, high
//! bit set on every byte except the last.

/// Longest encoding of a 64-bit value
pub const MAX_VARINT_LEN: usize = 10;

#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Appends the zig-zag varint encoding of `n` to `buf`.
pub fn write_varint(buf: &mut Vec<u8>, n: i64) {
    let mut v = zigzag_encode(n);
    while v >= 0x80 {
        buf.push((v as u8 & 0x7F) | 0x80);
        v >>= 7;
    }
    buf.push(v as u8);
}

/// Outcome of reading a varint from a byte slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintRead {
    /// Decoded value and number of bytes consumed
    Value(i64, usize),
    /// Input ended before the final byte
    Incomplete,
    /// More than `MAX_VARINT_LEN` bytes, or bits beyond 64
    Overflow,
}

/// Reads a zig-zag varint from the start of `buf`.
pub fn read_varint(buf: &[u8]) -> VarintRead {
    let mut result: u64 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return VarintRead::Overflow;
        }
        result |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return VarintRead::Value(zigzag_decode(result), i + 1);
        }
    }
    VarintRead::Incomplete
}
