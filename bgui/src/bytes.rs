//! Bounds-checked little-endian reads over an in-memory buffer.
//!
//! Centralized here so C1–C3 never duplicate the "is this offset even in
//! range" check; every helper returns `None` instead of panicking, which
//! callers fold into the recoverable-anomaly path.

use byteorder::{ByteOrder, LittleEndian};

pub fn read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

pub fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    let slice = buf.get(offset..offset.checked_add(4)?)?;
    Some(LittleEndian::read_u32(slice))
}

pub fn read_f32_le(buf: &[u8], offset: usize) -> Option<f32> {
    let slice = buf.get(offset..offset.checked_add(4)?)?;
    Some(LittleEndian::read_f32(slice))
}

pub fn read_bytes<'a>(buf: &'a [u8], offset: usize, len: usize) -> Option<&'a [u8]> {
    buf.get(offset..offset.checked_add(len)?)
}

pub fn slice_eq_at(buf: &[u8], offset: usize, pattern: &[u8]) -> bool {
    match read_bytes(buf, offset, pattern.len()) {
        Some(slice) => slice == pattern,
        None => false,
    }
}

pub fn is_printable_ascii(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

/// Read `len` ASCII bytes at `offset` and require every byte be printable.
pub fn read_ascii<'a>(buf: &'a [u8], offset: usize, len: usize) -> Option<&'a str> {
    let slice = read_bytes(buf, offset, len)?;
    if slice.iter().all(|&b| is_printable_ascii(b)) {
        std::str::from_utf8(slice).ok()
    } else {
        None
    }
}

/// Forward byte-pattern search within `[start, end)`. Returns the first
/// (lowest) matching offset.
pub fn find_forward(buf: &[u8], start: usize, end: usize, pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || end > buf.len() || start >= end {
        return None;
    }
    let window = end.checked_sub(pattern.len())?;
    (start..=window).find(|&offset| slice_eq_at(buf, offset, pattern))
}

/// Backward byte-pattern search within `[start, end)`. Returns the last
/// (highest) matching offset.
pub fn find_backward(buf: &[u8], start: usize, end: usize, pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || end > buf.len() || start >= end {
        return None;
    }
    let window = end.checked_sub(pattern.len())?;
    if window < start {
        return None;
    }
    (start..=window).rev().find(|&offset| slice_eq_at(buf, offset, pattern))
}
