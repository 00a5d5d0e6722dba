//! C3 — Container Scanner.
//!
//! Forward-scans `[0, register_start)` for the `03`/`04` marker sequences,
//! validates each candidate before accepting it (the same bytes can occur
//! inside header padding or inside another container's resource string), and
//! decodes the accepted blocks. Also reports `header_end` back to C1.

use std::collections::HashSet;

use crate::byte_range::ByteRange;
use crate::bytes::{find_backward, read_ascii, read_bytes, read_f32_le, read_u32_le};
use crate::warning::{Warning, WarningKind};

pub const MARKER_STANDARD: [u8; 4] = [0x03, 0x00, 0x00, 0x00];
pub const MARKER_TEXT: [u8; 4] = [0x04, 0x00, 0x00, 0x00];
pub const RESOURCE_TAG: [u8; 4] = [0xBD, 0x00, 0x00, 0x00];
pub const RESOURCE_FLAGS: [u8; 5] = [0x00, 0x01, 0x00, 0x00, 0x00];
pub const COLOR_ANCHOR: [u8; 4] = [0x00, 0x00, 0x80, 0x3F];

const NAME_MAX_LEN: usize = 64;
const ID_SANITY_BOUND: u32 = 100_000;
const RESERVED_LEN: usize = 44;
const RESOURCE_START: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Standard,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone)]
pub struct ResourceProperty {
    pub path: String,
    pub range: ByteRange,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct Container {
    pub marker_kind: MarkerKind,
    pub name: String,
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub reserved: Box<[u8; RESERVED_LEN]>,
    pub resource: Option<ResourceProperty>,
    pub color: Option<Color>,
    pub color_range: Option<ByteRange>,
    /// Manifest-only (`id == 0`, empty name): the page-name string table.
    pub manifest_keys: Vec<String>,
    pub marker_offset: usize,
    pub body_offset: usize,
    pub block_end: usize,
}

impl Container {
    pub fn is_manifest(&self) -> bool {
        self.name.is_empty()
    }

    pub fn header_range(&self) -> ByteRange {
        ByteRange::new(self.marker_offset, self.body_offset)
    }

    pub fn body_range(&self) -> ByteRange {
        ByteRange::new(self.body_offset, self.block_end)
    }
}

struct RawCandidate {
    marker_offset: usize,
    kind: MarkerKind,
    name: String,
    id: u32,
    body_offset: usize,
}

/// Scan for and decode every container in `[0, register_start)`.
/// Returns the containers in file order and the computed `header_end`.
pub fn scan_containers(
    buf: &[u8],
    register_start: usize,
    register_ids: &HashSet<u32>,
    warnings: &mut Vec<Warning>,
) -> (Vec<Container>, usize) {
    let raw = scan_candidates(buf, register_start);
    let mut accepted: Vec<RawCandidate> = raw
        .into_iter()
        .filter(|c| register_ids.contains(&c.id))
        .collect();
    accepted.sort_by_key(|c| c.marker_offset);

    let mut seen_ids: HashSet<u32> = HashSet::new();
    let header_end = accepted
        .iter()
        .find(|c| !c.name.is_empty())
        .or_else(|| accepted.first())
        .map(|c| c.marker_offset)
        .unwrap_or(register_start);

    let mut containers = Vec::with_capacity(accepted.len());
    for (i, candidate) in accepted.iter().enumerate() {
        if !seen_ids.insert(candidate.id) {
            warnings.push(Warning::new(
                WarningKind::DuplicateId,
                candidate.marker_offset,
                format!("container id {} appears more than once; first wins", candidate.id),
            ));
        }
        let block_end = accepted
            .get(i + 1)
            .map(|next| next.marker_offset)
            .unwrap_or(register_start);
        containers.push(decode_container(buf, candidate, block_end, warnings));
    }

    (containers, header_end)
}

fn scan_candidates(buf: &[u8], register_start: usize) -> Vec<RawCandidate> {
    let mut out = Vec::new();
    if register_start < 9 {
        return out;
    }
    for marker_offset in 0..=(register_start - 9) {
        let kind = if read_bytes(buf, marker_offset, 4) == Some(&MARKER_STANDARD[..]) {
            MarkerKind::Standard
        } else if read_bytes(buf, marker_offset, 4) == Some(&MARKER_TEXT[..]) {
            MarkerKind::Text
        } else {
            continue;
        };

        // Rule 1: marker_offset + 9 <= register_start (already guaranteed by
        // the loop bound, kept explicit for readability/documentation).
        if marker_offset + 9 > register_start {
            continue;
        }

        // Rule 2: name length + printable ASCII name (or N == 0, manifest).
        let name_len = match read_bytes(buf, marker_offset + 4, 1) {
            Some(b) => b[0] as usize,
            None => continue,
        };
        if name_len > NAME_MAX_LEN {
            continue;
        }
        let name = if name_len == 0 {
            String::new()
        } else {
            match read_ascii(buf, marker_offset + 5, name_len) {
                Some(s) => s.to_string(),
                None => continue,
            }
        };

        let body_offset = marker_offset + 4 + 1 + name_len + 4;
        let id = match read_u32_le(buf, body_offset) {
            Some(id) if id < ID_SANITY_BOUND => id,
            _ => continue,
        };
        if body_offset + 4 > register_start {
            continue;
        }

        out.push(RawCandidate {
            marker_offset,
            kind,
            name,
            id,
            body_offset,
        });
    }
    out
}

fn decode_container(
    buf: &[u8],
    candidate: &RawCandidate,
    block_end: usize,
    warnings: &mut Vec<Warning>,
) -> Container {
    let is_manifest = candidate.name.is_empty();

    let (x, y, size) = if is_manifest {
        (0.0, 0.0, 0.0)
    } else {
        (
            read_f32_le(buf, candidate.body_offset + 4).unwrap_or(0.0),
            read_f32_le(buf, candidate.body_offset + 8).unwrap_or(0.0),
            read_f32_le(buf, candidate.body_offset + 12).unwrap_or(0.0),
        )
    };

    let mut reserved = Box::new([0u8; RESERVED_LEN]);
    if let Some(slice) = read_bytes(buf, candidate.body_offset + 20, RESERVED_LEN) {
        reserved.copy_from_slice(slice);
    }

    let manifest_keys = if is_manifest {
        decode_manifest_keys(buf, candidate.body_offset, block_end)
    } else {
        Vec::new()
    };

    let resource = if is_manifest {
        None
    } else {
        decode_resource(buf, candidate.body_offset, block_end, candidate.marker_offset, warnings)
    };

    let (color, color_range) = decode_color(
        buf,
        candidate.body_offset + RESOURCE_START,
        block_end,
        candidate.marker_offset,
        warnings,
    );

    Container {
        marker_kind: candidate.kind,
        name: candidate.name.clone(),
        id: candidate.id,
        x,
        y,
        size,
        reserved,
        resource,
        color,
        color_range,
        manifest_keys,
        marker_offset: candidate.marker_offset,
        body_offset: candidate.body_offset,
        block_end,
    }
}

fn decode_manifest_keys(buf: &[u8], body_offset: usize, block_end: usize) -> Vec<String> {
    let string_count = match read_u32_le(buf, body_offset + 1) {
        Some(n) => n as usize,
        None => return Vec::new(),
    };

    let mut keys = Vec::new();
    let mut cursor = body_offset + 1 + 4;
    for _ in 0..string_count {
        if cursor >= block_end {
            break;
        }
        let len = match read_bytes(buf, cursor, 1) {
            Some(b) => b[0] as usize,
            None => break,
        };
        if cursor + 1 + len > block_end {
            break;
        }
        let text = match read_bytes(buf, cursor + 1, len) {
            Some(bytes) => String::from_utf8_lossy(bytes).to_string(),
            None => break,
        };
        keys.push(text);
        cursor += 1 + len;
    }
    keys
}

fn decode_resource(
    buf: &[u8],
    body_offset: usize,
    block_end: usize,
    marker_offset: usize,
    warnings: &mut Vec<Warning>,
) -> Option<ResourceProperty> {
    let tag_offset = body_offset + RESOURCE_START;
    if read_bytes(buf, tag_offset, 4) != Some(&RESOURCE_TAG[..]) {
        return None;
    }
    // Flags deviating from the fixed 5-byte `00 01 00 00 00` region are not
    // rejected outright — the decoder still attempts the length-prefixed
    // string that follows, per the Open Question in the design notes.
    let flags_offset = tag_offset + 4;
    let len_offset = flags_offset + RESOURCE_FLAGS.len();
    let declared_len = read_bytes(buf, len_offset, 1)?.get(0).copied()? as usize;
    let str_offset = len_offset + 1;

    let available = block_end.saturating_sub(str_offset);
    let (used_len, truncated) = if declared_len > available {
        warnings.push(Warning::new(
            WarningKind::ResourceTruncated,
            marker_offset,
            format!(
                "resource string declares {declared_len} bytes but only {available} remain before the next block"
            ),
        ));
        (available, true)
    } else {
        (declared_len, false)
    };

    let bytes = read_bytes(buf, str_offset, used_len)?;
    let path = String::from_utf8_lossy(bytes).to_string();
    Some(ResourceProperty {
        path,
        range: ByteRange::new(tag_offset, str_offset + used_len),
        truncated,
    })
}

fn decode_color(
    buf: &[u8],
    search_start: usize,
    block_end: usize,
    marker_offset: usize,
    warnings: &mut Vec<Warning>,
) -> (Option<Color>, Option<ByteRange>) {
    match find_backward(buf, search_start, block_end, &COLOR_ANCHOR) {
        Some(anchor_offset) if anchor_offset >= 3 => {
            let rgb = match read_bytes(buf, anchor_offset - 3, 3) {
                Some(rgb) => rgb,
                None => {
                    warnings.push(Warning::new(
                        WarningKind::ColorMissing,
                        marker_offset,
                        "color anchor found but RGB bytes out of range",
                    ));
                    return (None, None);
                }
            };
            let color = Color {
                r: rgb[0],
                g: rgb[1],
                b: rgb[2],
            };
            (Some(color), Some(ByteRange::new(anchor_offset - 3, anchor_offset + 4)))
        }
        _ => {
            warnings.push(Warning::new(
                WarningKind::ColorMissing,
                marker_offset,
                "no 1.0f color anchor found within the container's range",
            ));
            (None, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_container(id: u32, name: &str, x: f32, y: f32, size: f32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MARKER_STANDARD);
        buf.push(name.len() as u8);
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(&[0u8; 4]); // hash/pad
        buf.extend_from_slice(&id.to_le_bytes());
        buf.extend_from_slice(&x.to_le_bytes());
        buf.extend_from_slice(&y.to_le_bytes());
        buf.extend_from_slice(&size.to_le_bytes());
        buf.extend_from_slice(&[0u8; 4]); // unnamed filler between size and reserved (body+16..20)
        buf.extend_from_slice(&[0u8; 44]); // reserved (body+20..64)
        buf
    }

    fn with_resource(mut buf: Vec<u8>, path: &str) -> Vec<u8> {
        // body_offset is 0 here (buf starts at body for this helper's math);
        // real offsets are computed relative to marker_offset by the caller.
        buf.extend_from_slice(&RESOURCE_TAG);
        buf.extend_from_slice(&RESOURCE_FLAGS);
        buf.push(path.len() as u8);
        buf.extend_from_slice(path.as_bytes());
        buf
    }

    fn with_color(mut buf: Vec<u8>, r: u8, g: u8, b: u8) -> Vec<u8> {
        buf.push(r);
        buf.push(g);
        buf.push(b);
        buf.extend_from_slice(&COLOR_ANCHOR);
        buf
    }

    #[test]
    fn scans_two_standard_containers() {
        let mut buf = standard_container(1, "P", 1.0, 2.0, 3.0);
        let mut second = standard_container(2, "C", 4.0, 5.0, 6.0);
        second = with_resource(second, "r.dds");
        second = with_color(second, 0x11, 0x22, 0x33);
        buf.extend_from_slice(&second);

        let register_start = buf.len();
        let mut ids = HashSet::new();
        ids.insert(1);
        ids.insert(2);
        let mut warnings = Vec::new();
        let (containers, header_end) = scan_containers(&buf, register_start, &ids, &mut warnings);

        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].id, 1);
        assert_eq!(containers[0].name, "P");
        assert_eq!(containers[0].x, 1.0);
        assert_eq!(containers[1].id, 2);
        assert_eq!(containers[1].resource.as_ref().unwrap().path, "r.dds");
        assert_eq!(containers[1].color, Some(Color { r: 0x11, g: 0x22, b: 0x33 }));
        assert_eq!(header_end, 0);
    }

    #[test]
    fn ids_outside_the_register_are_skipped() {
        let buf = standard_container(7, "Ghost", 0.0, 0.0, 0.0);
        let register_start = buf.len();
        let ids = HashSet::new(); // register doesn't mention id 7
        let mut warnings = Vec::new();
        let (containers, _) = scan_containers(&buf, register_start, &ids, &mut warnings);
        assert!(containers.is_empty());
    }

    #[test]
    fn backward_color_search_picks_the_last_anchor() {
        let mut buf = standard_container(1, "X", 0.0, 0.0, 0.0);
        // decoy anchor
        buf = with_color(buf, 0x01, 0x02, 0x03);
        buf.extend_from_slice(&[0u8; 4]); // filler between the two anchors
        // real anchor nearest block_end
        buf = with_color(buf, 0xAA, 0xBB, 0xCC);
        let register_start = buf.len();
        let mut ids = HashSet::new();
        ids.insert(1);
        let mut warnings = Vec::new();
        let (containers, _) = scan_containers(&buf, register_start, &ids, &mut warnings);
        assert_eq!(containers[0].color, Some(Color { r: 0xAA, g: 0xBB, b: 0xCC }));
    }

    #[test]
    fn truncated_resource_is_flagged_and_clipped() {
        let mut buf = standard_container(1, "X", 0.0, 0.0, 0.0);
        buf.extend_from_slice(&RESOURCE_TAG);
        buf.extend_from_slice(&RESOURCE_FLAGS);
        buf.push(50); // declares 50 bytes
        buf.extend_from_slice(&[b'a'; 20]); // but only 20 remain
        let register_start = buf.len();
        let mut ids = HashSet::new();
        ids.insert(1);
        let mut warnings = Vec::new();
        let (containers, _) = scan_containers(&buf, register_start, &ids, &mut warnings);
        let resource = containers[0].resource.as_ref().unwrap();
        assert!(resource.truncated);
        assert_eq!(resource.path.len(), 20);
        assert!(warnings.iter().any(|w| w.kind == WarningKind::ResourceTruncated));
    }

    #[test]
    fn phantom_manifest_in_header_is_accepted_only_when_registered() {
        // A manifest-shaped (name_len 0) `03` marker sitting inside what
        // would be header/page-data filler, not inside any real container's
        // block. Acceptance must turn purely on register membership.
        fn phantom_in_header(id: u32) -> (Vec<u8>, usize) {
            let mut buf = vec![0xFFu8; 16]; // header/page-data filler
            let marker_offset = buf.len();
            buf.extend_from_slice(&MARKER_STANDARD);
            buf.push(0); // name_len 0 -> manifest-shaped
            buf.extend_from_slice(&[0u8; 4]); // hash/pad
            buf.extend_from_slice(&id.to_le_bytes());
            buf.extend_from_slice(&[0u8; 8]); // trailing filler
            (buf, marker_offset)
        }

        let (buf, marker_offset) = phantom_in_header(77);
        let register_start = buf.len();
        let mut ids = HashSet::new();
        ids.insert(77);
        let mut warnings = Vec::new();
        let (containers, _) = scan_containers(&buf, register_start, &ids, &mut warnings);
        assert_eq!(containers.len(), 1);
        assert!(containers[0].is_manifest());
        assert_eq!(containers[0].marker_offset, marker_offset);

        let (buf, _) = phantom_in_header(77);
        let register_start = buf.len();
        let ids = HashSet::new(); // 77 not in the register this time
        let mut warnings = Vec::new();
        let (containers, _) = scan_containers(&buf, register_start, &ids, &mut warnings);
        assert!(containers.is_empty());
    }

    #[test]
    fn manifest_container_decodes_string_table() {
        // `string_count` is read overlapping the id field (body+1, not
        // body+4, per the manifest special case), so a clean small count
        // forces the id away from the conventional 0 — here id=512 (LE
        // bytes 00 02 00 00) makes the body+1 read land on [02 00 00 <pad>].
        let mut buf = Vec::new();
        buf.extend_from_slice(&MARKER_STANDARD);
        buf.push(0); // empty name -> manifest
        buf.extend_from_slice(&[0u8; 4]); // hash/pad
        buf.extend_from_slice(&512u32.to_le_bytes()); // id
        buf.push(0); // body+4: high byte of the overlapping string_count read
        buf.push(1);
        buf.extend_from_slice(b"a");
        buf.push(1);
        buf.extend_from_slice(b"b");
        let register_start = buf.len();
        let mut ids = HashSet::new();
        ids.insert(512);
        let mut warnings = Vec::new();
        let (containers, header_end) = scan_containers(&buf, register_start, &ids, &mut warnings);
        assert_eq!(containers.len(), 1);
        assert!(containers[0].is_manifest());
        assert_eq!(containers[0].manifest_keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(header_end, 0);
    }
}
