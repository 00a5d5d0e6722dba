//! C4 — Tree Builder.
//!
//! Consumes register entries in order with a child-count stack to hydrate
//! the logical tree, then computes each node's subtree byte range in a
//! single post-order pass.
//!
//! The stack bookkeeping here defers attaching a node to its parent's
//! `children` list until the node's own child-count is satisfied (or the
//! register runs out), rather than appending-then-mutating-in-place as the
//! prose algorithm describes. Both produce the same tree; deferring the
//! attach sidesteps holding two live mutable views of the same node, which
//! Rust's ownership rules don't allow.

use std::collections::{HashMap, HashSet};

use crate::byte_range::ByteRange;
use crate::container::Container;
use crate::register::RegisterEntry;
use crate::warning::{Warning, WarningKind};

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: u32,
    pub dangling: bool,
    pub child_count: u32,
    pub children: Vec<TreeNode>,
    pub subtree_range: Option<ByteRange>,
}

struct Frame {
    id: u32,
    dangling: bool,
    child_count: u32,
    remaining: u32,
    children: Vec<TreeNode>,
    entry_offset: usize,
}

/// Build the tree(s) described by the register. Returns one root in the
/// standard variant; pathological files may yield more (each beyond the
/// first is reported with a `SecondRoot` warning).
pub fn build_tree(
    entries: &[RegisterEntry],
    container_ids: &HashSet<u32>,
    warnings: &mut Vec<Warning>,
) -> Vec<TreeNode> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut roots: Vec<TreeNode> = Vec::new();

    for e in entries {
        let dangling = !container_ids.contains(&e.id);
        if dangling {
            warnings.push(Warning::new(
                WarningKind::DanglingRegisterId,
                e.offset,
                format!("register references id {} with no matching container", e.id),
            ));
        }

        if e.child_count == 0 {
            let node = TreeNode {
                id: e.id,
                dangling,
                child_count: 0,
                children: Vec::new(),
                subtree_range: None,
            };
            attach(&mut stack, &mut roots, warnings, node);
        } else {
            stack.push(Frame {
                id: e.id,
                dangling,
                child_count: e.child_count,
                remaining: e.child_count,
                children: Vec::new(),
                entry_offset: e.offset,
            });
        }
    }

    // Anything still open when entries run out is a register shortfall:
    // close it anyway (so the viewer can still render it) but flag it.
    while let Some(frame) = stack.pop() {
        if frame.remaining > 0 {
            warnings.push(Warning::new(
                WarningKind::RegisterShortfall,
                frame.entry_offset,
                format!(
                    "container id {} declared {} children but the register ended after {}",
                    frame.id,
                    frame.child_count,
                    frame.child_count - frame.remaining
                ),
            ));
        }
        let node = TreeNode {
            id: frame.id,
            dangling: frame.dangling,
            child_count: frame.child_count,
            children: frame.children,
            subtree_range: None,
        };
        match stack.last_mut() {
            Some(parent) => {
                parent.children.push(node);
                parent.remaining = parent.remaining.saturating_sub(1);
            }
            None => {
                if !roots.is_empty() {
                    warnings.push(Warning::new(
                        WarningKind::SecondRoot,
                        0,
                        format!("container id {} forms a second root", node.id),
                    ));
                }
                roots.push(node);
            }
        }
    }

    roots
}

/// Attach a completed node to its parent (decrementing the parent's
/// remaining counter and cascading the close if that satisfies it), or to
/// the root list if there is no open parent.
fn attach(stack: &mut Vec<Frame>, roots: &mut Vec<TreeNode>, warnings: &mut Vec<Warning>, node: TreeNode) {
    match stack.last_mut() {
        None => {
            if !roots.is_empty() {
                warnings.push(Warning::new(
                    WarningKind::SecondRoot,
                    0,
                    format!("container id {} forms a second root", node.id),
                ));
            }
            roots.push(node);
        }
        Some(parent) => {
            parent.children.push(node);
            parent.remaining -= 1;
            if parent.remaining == 0 {
                let closed = stack.pop().unwrap();
                let closed_node = TreeNode {
                    id: closed.id,
                    dangling: closed.dangling,
                    child_count: closed.child_count,
                    children: closed.children,
                    subtree_range: None,
                };
                attach(stack, roots, warnings, closed_node);
            }
        }
    }
}

/// Single post-order pass computing each node's subtree byte range: the
/// union of its own container's `[marker_offset, block_end)` (if any) and
/// every child's subtree range. Dangling nodes with no children contribute
/// nothing and get `None`.
pub fn annotate_subtree_ranges(nodes: &mut [TreeNode], containers_by_id: &HashMap<u32, Container>) {
    for node in nodes {
        annotate_one(node, containers_by_id);
    }
}

fn annotate_one(node: &mut TreeNode, containers_by_id: &HashMap<u32, Container>) -> Option<ByteRange> {
    let mut range = containers_by_id
        .get(&node.id)
        .map(|c| ByteRange::new(c.marker_offset, c.block_end));

    for child in &mut node.children {
        let child_range = annotate_one(child, containers_by_id);
        range = match (range, child_range) {
            (Some(r), Some(cr)) => Some(r.union(&cr)),
            (Some(r), None) => Some(r),
            (None, Some(cr)) => Some(cr),
            (None, None) => None,
        };
    }

    node.subtree_range = range;
    range
}
