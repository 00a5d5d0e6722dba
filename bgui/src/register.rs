//! C2 — Register Locator.
//!
//! Backward-scans the end of the file for the register signature, then
//! decodes the (id, child_count) pairs that follow it. The register is
//! authoritative for tree topology even when the container scan (C3) can't
//! find a block for one of its ids.

use crate::bytes::{find_backward, read_u32_le};
use crate::error::{BguiError, Result};
use crate::warning::{Warning, WarningKind};

/// `0E` followed by thirteen `00` bytes.
pub const REGISTER_SIGNATURE: [u8; 14] = [
    0x0E, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEntry {
    pub id: u32,
    pub child_count: u32,
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct RegisterLocation {
    pub register_start: usize,
    pub entries: Vec<RegisterEntry>,
}

/// Locate and decode the register. `register_start` bounds the end of the
/// container region for C3.
pub fn locate_register(buf: &[u8], warnings: &mut Vec<Warning>) -> Result<RegisterLocation> {
    let file_len = buf.len();
    let register_start = find_backward(buf, 0, file_len, &REGISTER_SIGNATURE)
        .ok_or(BguiError::RegisterNotFound { file_len })?;

    let signature_end = register_start + REGISTER_SIGNATURE.len();
    let remaining = file_len - signature_end;
    let capacity = remaining / 8;
    let consumed = capacity * 8;
    if remaining > consumed {
        warnings.push(Warning::new(
            WarningKind::TrailingBytes,
            signature_end + consumed,
            format!(
                "{} trailing byte(s) after the last register entry do not form a full 8-byte entry",
                remaining - consumed
            ),
        ));
    }

    let mut entries = Vec::with_capacity(capacity);
    for i in 0..capacity {
        let offset = signature_end + 8 * i;
        // Bounds were established by `capacity`; these reads cannot fail.
        let id = read_u32_le(buf, offset).unwrap();
        let child_count = read_u32_le(buf, offset + 4).unwrap();
        entries.push(RegisterEntry {
            id,
            child_count,
            offset,
        });
    }

    Ok(RegisterLocation {
        register_start,
        entries,
    })
}
