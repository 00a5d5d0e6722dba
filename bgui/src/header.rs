//! C1 — Header Decoder.
//!
//! Parses the magic, the optional sprite path, the project-root marker, and
//! the manifest/page string block. `header_end` is supplied by the
//! container scanner (C3), which runs first and locates the boundary
//! between the header region and the first container block.

use crate::byte_range::ByteRange;
use crate::bytes::{find_forward, read_ascii, read_bytes, read_u32_le};
use crate::warning::{Warning, WarningKind};

pub const MAGIC_STANDARD: [u8; 4] = [0x00, 0x00, 0x10, 0x40];
pub const MAGIC_ALTERNATE: [u8; 4] = [0x7B, 0x14, 0x0E, 0x40];

const PROJECT_ROOT_PREFIX: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
const CONTAINER_LABEL: &str = "Container";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicVariant {
    Standard,
    Alternate,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct HeaderFacts {
    pub magic: [u8; 4],
    pub magic_variant: MagicVariant,
    pub sprite_path: Option<String>,
    pub sprite_range: Option<ByteRange>,
    pub project_root_range: Option<ByteRange>,
    pub manifest_strings: Vec<(String, ByteRange)>,
    pub header_end: usize,
}

/// Decode the header. `header_end` bounds the region scanned for the
/// project-root marker and manifest strings; it is the offset of the first
/// accepted container (or `register_start` if C3 found none).
pub fn parse_header(buf: &[u8], header_end: usize, warnings: &mut Vec<Warning>) -> HeaderFacts {
    let magic = read_bytes(buf, 0, 4)
        .map(|s| [s[0], s[1], s[2], s[3]])
        .unwrap_or([0, 0, 0, 0]);

    let magic_variant = if magic == MAGIC_STANDARD {
        MagicVariant::Standard
    } else if magic == MAGIC_ALTERNATE {
        warnings.push(Warning::new(
            WarningKind::MagicVariant,
            0,
            "alternate magic 7B 14 0E 40 detected; layout is not decoded beyond this point",
        ));
        MagicVariant::Alternate
    } else {
        warnings.push(Warning::new(
            WarningKind::MagicVariant,
            0,
            format!("unrecognized magic {magic:02X?}"),
        ));
        MagicVariant::Unknown
    };

    let (sprite_path, sprite_range) = parse_sprite(buf, warnings);
    let project_root_range = find_project_root(buf, header_end);
    let manifest_strings = scan_manifest_strings(buf, header_end, project_root_range);

    HeaderFacts {
        magic,
        magic_variant,
        sprite_path,
        sprite_range,
        project_root_range,
        manifest_strings,
        header_end,
    }
}

fn parse_sprite(buf: &[u8], warnings: &mut Vec<Warning>) -> (Option<String>, Option<ByteRange>) {
    const MARKER: [u8; 4] = [0x01, 0x00, 0x00, 0x00];
    let ok = read_bytes(buf, 4, 4).map(|s| s == MARKER).unwrap_or(false);
    if !ok {
        warnings.push(Warning::new(WarningKind::SpriteAbsent, 4, "no sprite marker at offset 4"));
        return (None, None);
    }
    let len = match read_u32_le(buf, 8) {
        Some(len) => len as usize,
        None => {
            warnings.push(Warning::new(WarningKind::SpriteAbsent, 4, "sprite length unreadable"));
            return (None, None);
        }
    };
    let path = match read_ascii(buf, 12, len) {
        Some(s) => s,
        None => {
            warnings.push(Warning::new(WarningKind::SpriteAbsent, 4, "sprite string not printable ASCII"));
            return (None, None);
        }
    };
    if !path.ends_with(".bspr") {
        warnings.push(Warning::new(WarningKind::SpriteAbsent, 4, "sprite string does not end in .bspr"));
        return (None, None);
    }
    (Some(path.to_string()), Some(ByteRange::new(4, 12 + len)))
}

fn find_project_root(buf: &[u8], header_end: usize) -> Option<ByteRange> {
    let mut search_from = 4;
    while search_from < header_end {
        let marker_offset = find_forward(buf, search_from, header_end, &PROJECT_ROOT_PREFIX)?;
        let length_offset = marker_offset + PROJECT_ROOT_PREFIX.len();

        // Try a single-byte length prefix first, then a u32 prefix.
        if let Some(range) = try_labeled_string(buf, length_offset, 1, header_end) {
            return Some(ByteRange::new(marker_offset, range.end));
        }
        if let Some(range) = try_labeled_string(buf, length_offset, 4, header_end) {
            return Some(ByteRange::new(marker_offset, range.end));
        }
        search_from = marker_offset + 1;
    }
    None
}

/// Attempt to read a length-prefixed ASCII string at `offset` (prefix is
/// either 1 or 4 bytes) equal to `"Container"`, bounded by `limit`.
fn try_labeled_string(
    buf: &[u8],
    offset: usize,
    prefix_len: usize,
    limit: usize,
) -> Option<ByteRange> {
    let len = if prefix_len == 1 {
        read_bytes(buf, offset, 1)?[0] as usize
    } else {
        read_u32_le(buf, offset)? as usize
    };
    if len != CONTAINER_LABEL.len() {
        return None;
    }
    let str_offset = offset + prefix_len;
    if str_offset + len > limit {
        return None;
    }
    let text = read_ascii(buf, str_offset, len)?;
    if text == CONTAINER_LABEL {
        Some(ByteRange::new(offset, str_offset + len))
    } else {
        None
    }
}

/// Scan the header for Pascal-style strings (u8 length + N printable ASCII
/// bytes), collecting them in file order. Non-printable runs are skipped a
/// byte at a time.
fn scan_manifest_strings(
    buf: &[u8],
    header_end: usize,
    project_root_range: Option<ByteRange>,
) -> Vec<(String, ByteRange)> {
    let mut out = Vec::new();
    let mut offset = 4usize;
    while offset < header_end {
        if let Some(root) = project_root_range {
            if root.contains_offset(offset) {
                offset = root.end;
                continue;
            }
        }
        if let Some(len) = read_bytes(buf, offset, 1).map(|s| s[0] as usize) {
            if len > 0 && offset + 1 + len <= header_end {
                if let Some(text) = read_ascii(buf, offset + 1, len) {
                    out.push((text.to_string(), ByteRange::new(offset, offset + 1 + len)));
                    offset += 1 + len;
                    continue;
                }
            }
        }
        offset += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pascal(s: &str) -> Vec<u8> {
        let mut v = vec![s.len() as u8];
        v.extend_from_slice(s.as_bytes());
        v
    }

    #[test]
    fn standard_magic_is_recognized() {
        let mut buf = MAGIC_STANDARD.to_vec();
        buf.extend_from_slice(&[0u8; 20]);
        let mut warnings = Vec::new();
        let facts = parse_header(&buf, buf.len(), &mut warnings);
        assert_eq!(facts.magic_variant, MagicVariant::Standard);
    }

    #[test]
    fn alternate_magic_warns_but_continues() {
        let mut buf = MAGIC_ALTERNATE.to_vec();
        buf.extend_from_slice(&[0u8; 20]);
        let mut warnings = Vec::new();
        let facts = parse_header(&buf, buf.len(), &mut warnings);
        assert_eq!(facts.magic_variant, MagicVariant::Alternate);
        assert!(warnings.iter().any(|w| w.kind == WarningKind::MagicVariant));
    }

    #[test]
    fn sprite_path_decoded_when_present() {
        let mut buf = MAGIC_STANDARD.to_vec();
        buf.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]);
        let name = b"icon.bspr";
        buf.extend_from_slice(&(name.len() as u32).to_le_bytes());
        buf.extend_from_slice(name);
        let mut warnings = Vec::new();
        let facts = parse_header(&buf, buf.len(), &mut warnings);
        assert_eq!(facts.sprite_path.as_deref(), Some("icon.bspr"));
        assert_eq!(facts.sprite_range, Some(ByteRange::new(4, 12 + name.len())));
    }

    #[test]
    fn project_root_marker_found_with_single_byte_length() {
        let mut buf = MAGIC_STANDARD.to_vec();
        buf.extend_from_slice(&[0u8; 8]); // filler, no sprite marker
        buf.extend_from_slice(&PROJECT_ROOT_PREFIX);
        buf.extend_from_slice(&pascal(CONTAINER_LABEL));
        let header_end = buf.len();
        let mut warnings = Vec::new();
        let facts = parse_header(&buf, header_end, &mut warnings);
        assert!(facts.project_root_range.is_some());
    }

    #[test]
    fn manifest_strings_collected_in_order() {
        let mut buf = MAGIC_STANDARD.to_vec();
        buf.extend_from_slice(&[0u8; 8]);
        buf.extend_from_slice(&pascal("page"));
        buf.extend_from_slice(&pascal("main_menu"));
        let header_end = buf.len();
        let mut warnings = Vec::new();
        let facts = parse_header(&buf, header_end, &mut warnings);
        let names: Vec<&str> = facts.manifest_strings.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(names, vec!["page", "main_menu"]);
    }
}
