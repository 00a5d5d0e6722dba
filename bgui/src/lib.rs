//! BGUI parser core: a heuristic reverse-engineering decoder for the Madness
//! Engine's `.bgui` binary UI description format.
//!
//! The entry point is [`parse`]: it runs the register locator (C2), the
//! container scanner (C3), the header decoder (C1), and the tree builder
//! (C4) over a fully-buffered input, in that order, and returns an owned
//! [`BguiFile`] together with every recoverable anomaly noticed along the
//! way. Parsing never panics on malformed input; unexpected bytes become a
//! [`Warning`] or, for the handful of conditions that make the rest of the
//! file unrecoverable, a [`BguiError`].

pub mod byte_range;
pub mod bytes;
pub mod container;
pub mod error;
pub mod header;
pub mod register;
pub mod tree;
pub mod warning;

use std::collections::{HashMap, HashSet};

pub use byte_range::ByteRange;
pub use container::{Color, Container, MarkerKind, ResourceProperty};
pub use error::{BguiError, Result};
pub use header::{HeaderFacts, MagicVariant};
pub use register::RegisterEntry;
pub use tree::TreeNode;
pub use warning::{Warning, WarningKind};

const MIN_FILE_LEN: usize = 8;

/// Knobs for [`parse`]. Mirrors the `Default`-with-override shape used
/// elsewhere in this workspace for reader construction.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Collect [`Warning`]s while parsing. Disabling this skips the
    /// allocations behind the diagnostics list on tight loops; the parser's
    /// decode decisions are unaffected either way.
    pub collect_warnings: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            collect_warnings: true,
        }
    }
}

/// The byte-range footprint of a single decoded entity, as exposed to a
/// host viewer for highlighting.
#[derive(Debug, Clone, Default)]
pub struct EntityRanges {
    pub header: Option<ByteRange>,
    pub body: Option<ByteRange>,
    pub reserved: Option<ByteRange>,
    pub resource: Option<ByteRange>,
    pub color: Option<ByteRange>,
    pub subtree: Option<ByteRange>,
}

/// The fully decoded model of a `.bgui` file.
pub struct BguiFile {
    buffer: Vec<u8>,
    pub header: HeaderFacts,
    pub containers: Vec<Container>,
    pub register: Vec<RegisterEntry>,
    pub register_start: usize,
    /// Primary root of the logical tree (first register entry).
    pub root: Option<TreeNode>,
    /// Any roots beyond the first; only non-empty for pathological files
    /// (see `WarningKind::SecondRoot`).
    pub extra_roots: Vec<TreeNode>,
    containers_by_id: HashMap<u32, Container>,
}

impl BguiFile {
    /// The raw input buffer, for a host that wants to re-slice a ByteRange
    /// itself (e.g. to feed a hex pane).
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn container_by_id(&self, id: u32) -> Option<&Container> {
        self.containers_by_id.get(&id)
    }

    /// The byte-range index for a container: header/body/reserved/resource/
    /// color sub-ranges. `subtree` is left `None` here; subtree ranges are
    /// keyed by TreeNode id, see [`BguiFile::node_ranges`].
    pub fn container_ranges(&self, container: &Container) -> EntityRanges {
        EntityRanges {
            header: Some(container.header_range()),
            body: Some(container.body_range()),
            reserved: Some(ByteRange::new(
                container.body_offset + 20,
                container.body_offset + 20 + 44,
            )),
            resource: container.resource.as_ref().map(|r| r.range),
            color: container.color_range,
            subtree: None,
        }
    }

    /// The byte-range index for a tree node: its own container's ranges
    /// (if any) plus the computed subtree range.
    pub fn node_ranges(&self, node: &TreeNode) -> EntityRanges {
        let mut ranges = self
            .container_by_id(node.id)
            .map(|c| self.container_ranges(c))
            .unwrap_or_default();
        ranges.subtree = node.subtree_range;
        ranges
    }
}

/// Run the full C2 → C3 → C1 → C4 pipeline over `bytes` and return the
/// decoded model together with every recoverable anomaly noticed along the
/// way.
///
/// Component order follows the ordering guarantees, not the summary data-flow
/// sketch: the register (C2) bounds the container region, the container scan
/// (C3) in turn reports `header_end` back to the header decoder (C1), and the
/// tree builder (C4) runs last once both the register and the containers
/// exist to join against.
pub fn parse(bytes: Vec<u8>, options: ParseOptions) -> Result<(BguiFile, Vec<Warning>)> {
    let len = bytes.len();
    if len < MIN_FILE_LEN {
        return Err(BguiError::FileTooShort {
            len,
            min: MIN_FILE_LEN,
        });
    }

    let mut warnings = Vec::new();

    let register_location = register::locate_register(&bytes, &mut warnings)?;
    let register_ids: HashSet<u32> = register_location.entries.iter().map(|e| e.id).collect();

    let (containers, header_end) = container::scan_containers(
        &bytes,
        register_location.register_start,
        &register_ids,
        &mut warnings,
    );

    let header = header::parse_header(&bytes, header_end, &mut warnings);

    let container_ids: HashSet<u32> = containers.iter().map(|c| c.id).collect();
    let mut roots = tree::build_tree(&register_location.entries, &container_ids, &mut warnings);

    // First wins on a duplicate id, matching the `DuplicateId` warning
    // container.rs already raises for this case.
    let mut containers_by_id: HashMap<u32, Container> = HashMap::with_capacity(containers.len());
    for c in &containers {
        containers_by_id.entry(c.id).or_insert_with(|| c.clone());
    }
    tree::annotate_subtree_ranges(&mut roots, &containers_by_id);

    let mut roots_iter = roots.into_iter();
    let root = roots_iter.next();
    let extra_roots = roots_iter.collect();

    if !options.collect_warnings {
        warnings.clear();
    }

    let file = BguiFile {
        buffer: bytes,
        header,
        containers,
        register: register_location.entries,
        register_start: register_location.register_start,
        root,
        extra_roots,
        containers_by_id,
    };

    Ok((file, warnings))
}
