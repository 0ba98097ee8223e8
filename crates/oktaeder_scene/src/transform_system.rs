//! Transform System
//!
//! Invalidation is eager, recomputation is lazy:
//!
//! - [`mark_world_dirty`] runs on every TRS change or reparent and flags the
//!   subtree below the changed node.
//! - [`resolve_world_matrix`] runs on read and recomputes only the dirty
//!   chain between the node and its nearest clean ancestor.
//!
//! Both borrow only the node arena, so they can run while other parts of
//! the scene are borrowed.
//!
//! Invariant: a node with a dirty world matrix has only dirty descendants.
//! Resolution always cleans ancestors before descendants, and invalidation
//! always flags the whole subtree, so the invariant survives both.

use glam::Mat4;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::NodeHandle;
use crate::node::Node;

/// Flags the world matrix of `root` and all its descendants as stale.
///
/// `root` itself is always flagged and its children always visited, because
/// a TRS setter may have flagged it already. Below that the walk stops at
/// nodes that are already dirty, since their subtrees are dirty too.
pub fn mark_world_dirty(nodes: &mut SlotMap<NodeHandle, Node>, root: NodeHandle) {
    let Some(node) = nodes.get_mut(root) else {
        return;
    };
    node.transform.mark_world_dirty();
    let mut stack: SmallVec<[NodeHandle; 16]> = SmallVec::from_slice(&node.children);

    while let Some(handle) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };
        if node.transform.is_world_dirty() {
            continue;
        }
        node.transform.mark_world_dirty();
        stack.extend_from_slice(&node.children);
    }
}

/// Returns the up-to-date world matrix of `handle`, or `None` for a stale
/// handle.
pub fn resolve_world_matrix(
    nodes: &mut SlotMap<NodeHandle, Node>,
    handle: NodeHandle,
) -> Option<Mat4> {
    // Walk up until the first clean ancestor (or past the root).
    let mut chain: SmallVec<[NodeHandle; 16]> = SmallVec::new();
    let mut parent_world = Mat4::IDENTITY;
    let mut current = Some(handle);

    while let Some(h) = current {
        let node = nodes.get(h)?;
        if let Some(world) = node.transform.cached_world_matrix() {
            parent_world = world;
            break;
        }
        chain.push(h);
        current = node.parent;
    }

    // Recompute downward from the topmost dirty node.
    for &h in chain.iter().rev() {
        let node = nodes.get_mut(h)?;
        parent_world *= node.transform.local_matrix();
        node.transform.set_world_matrix(parent_world);
    }

    Some(parent_world)
}
