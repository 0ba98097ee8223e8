use slotmap::SlotMap;

use crate::NodeHandle;
use crate::node::Node;

/// Depth-first pre-order walk: a node, then its children left to right.
///
/// Created fresh by [`Scene::pre_order`](crate::Scene::pre_order), so every
/// walk starts from the roots regardless of earlier ones.
pub struct PreOrder<'a> {
    nodes: &'a SlotMap<NodeHandle, Node>,
    stack: Vec<NodeHandle>,
}

impl<'a> PreOrder<'a> {
    pub(crate) fn new(nodes: &'a SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) -> Self {
        let mut stack = Vec::with_capacity(roots.len().max(16));
        stack.extend(roots.iter().rev());
        Self { nodes, stack }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (NodeHandle, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.stack.pop() {
            if let Some(node) = self.nodes.get(handle) {
                // Reversed so the first child is popped next.
                self.stack.extend(node.children.iter().rev());
                return Some((handle, node));
            }
        }
        None
    }
}
