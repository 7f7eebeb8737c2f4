//! Indexable node storage
//!
//! Nodes refer to their parent by index into this table. The table never
//! removes nodes, so indices stay valid for the whole session.

use std::ops::{Index, IndexMut};

use crate::scene::node::{NodeIndex, Primitive, SceneNode};
use crate::SceneError;

/// A renderable primitive addressed by node and primitive index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderableEntry {
    /// Owning node
    pub node: NodeIndex,
    /// Primitive within the node
    pub primitive: usize,
}

impl RenderableEntry {
    /// Create a new entry
    pub const fn new(node: NodeIndex, primitive: usize) -> Self {
        Self { node, primitive }
    }
}

/// Flat table of scene nodes
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: Vec<SceneNode>,
}

impl NodeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its index
    pub fn push(&mut self, node: SceneNode) -> NodeIndex {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the table has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `index`
    pub fn get(&self, index: NodeIndex) -> Option<&SceneNode> {
        self.nodes.get(index)
    }

    /// Mutable node at `index`
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut SceneNode> {
        self.nodes.get_mut(index)
    }

    /// Node at `index`, or [`SceneError::NodeOutOfRange`]
    pub fn try_get(&self, index: NodeIndex) -> Result<&SceneNode, SceneError> {
        self.nodes.get(index).ok_or(SceneError::NodeOutOfRange(index))
    }

    /// Iterate over all nodes in index order
    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter()
    }

    /// Iterate mutably over all nodes in index order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneNode> {
        self.nodes.iter_mut()
    }

    /// Re-parent a node after checking the new link keeps the hierarchy valid
    pub fn set_parent(&mut self, node: NodeIndex, parent: Option<NodeIndex>) -> Result<(), SceneError> {
        self.try_get(node)?;
        if let Some(p) = parent {
            if p == node {
                return Err(SceneError::SelfParent(node));
            }
            if p >= self.nodes.len() {
                return Err(SceneError::MissingParent { node, parent: p });
            }
            // Linking under one of our own descendants closes a loop
            if self.ancestors(p).any(|a| a == node) {
                return Err(SceneError::CyclicHierarchy(node));
            }
        }

        self.nodes[node].set_parent(parent);
        Ok(())
    }

    /// Check every parent link: in range, not self, no cycles
    pub fn validate(&self) -> Result<(), SceneError> {
        for (index, node) in self.nodes.iter().enumerate() {
            match node.parent() {
                Some(p) if p == index => return Err(SceneError::SelfParent(index)),
                Some(p) if p >= self.nodes.len() => {
                    return Err(SceneError::MissingParent { node: index, parent: p });
                }
                _ => {}
            }
        }

        for index in 0..self.nodes.len() {
            // An acyclic chain is at most len() links long
            if self.ancestors(index).nth(self.nodes.len()).is_some() {
                return Err(SceneError::CyclicHierarchy(index));
            }
        }
        Ok(())
    }

    /// Parent chain of `index`, nearest first, excluding the node itself
    ///
    /// Stops at a missing parent. On a cyclic table this never ends, so
    /// callers bound it.
    pub fn ancestors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(self.nodes.get(index).and_then(SceneNode::parent), |&current| {
            self.nodes.get(current).and_then(SceneNode::parent)
        })
        .take_while(|&p| p < self.nodes.len())
    }

    /// Topmost ancestor of a node; a parentless node is its own root
    ///
    /// Bounded by the table size so a malformed cycle still terminates.
    pub fn root_of(&self, index: NodeIndex) -> NodeIndex {
        self.ancestors(index)
            .take(self.nodes.len())
            .last()
            .unwrap_or(index)
    }

    /// Every (node, primitive) pair in the table
    pub fn renderable_entries(&self) -> Vec<RenderableEntry> {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(node, n)| (0..n.primitives().len()).map(move |p| RenderableEntry::new(node, p)))
            .collect()
    }

    /// Primitive addressed by `entry`, `None` if either index is out of range
    pub fn primitive(&self, entry: RenderableEntry) -> Option<&Primitive> {
        self.nodes.get(entry.node)?.primitives().get(entry.primitive)
    }

    /// Total number of primitives across all nodes
    pub fn primitive_count(&self) -> usize {
        self.nodes.iter().map(|n| n.primitives().len()).sum()
    }

    /// Borrow two distinct nodes mutably at once
    ///
    /// # Panics
    /// Panics if `a == b` or either index is out of range.
    pub fn pair_mut(&mut self, a: NodeIndex, b: NodeIndex) -> (&mut SceneNode, &mut SceneNode) {
        assert_ne!(a, b, "pair_mut needs two distinct nodes");
        if a < b {
            let (head, tail) = self.nodes.split_at_mut(b);
            (&mut head[a], &mut tail[0])
        } else {
            let (head, tail) = self.nodes.split_at_mut(a);
            (&mut tail[0], &mut head[b])
        }
    }
}

impl Index<NodeIndex> for NodeTable {
    type Output = SceneNode;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

impl IndexMut<NodeIndex> for NodeTable {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

impl FromIterator<SceneNode> for NodeTable {
    fn from_iter<I: IntoIterator<Item = SceneNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> NodeTable {
        let mut table = NodeTable::new();
        for i in 0..len {
            let mut node = SceneNode::new(format!("n{i}"));
            if i > 0 {
                node = node.with_parent(i - 1);
            }
            table.push(node);
        }
        table
    }

    #[test]
    fn test_root_of_chain() {
        let table = chain(4);
        assert_eq!(table.root_of(3), 0);
        assert_eq!(table.root_of(0), 0);
        assert_eq!(table.ancestors(3).collect::<Vec<_>>(), vec![2, 1, 0]);
    }

    #[test]
    fn test_validate_rejects_bad_links() {
        let mut table = chain(2);
        table.push(SceneNode::new("orphan").with_parent(17));
        assert!(matches!(
            table.validate(),
            Err(SceneError::MissingParent { node: 2, parent: 17 })
        ));

        let mut table = NodeTable::new();
        table.push(SceneNode::new("self").with_parent(0));
        assert!(matches!(table.validate(), Err(SceneError::SelfParent(0))));
    }

    #[test]
    fn test_validate_detects_cycle() {
        let mut table = NodeTable::new();
        table.push(SceneNode::new("a").with_parent(2));
        table.push(SceneNode::new("b").with_parent(0));
        table.push(SceneNode::new("c").with_parent(1));
        assert!(matches!(table.validate(), Err(SceneError::CyclicHierarchy(_))));

        // root_of stays bounded on the malformed table
        let _ = table.root_of(0);
    }

    #[test]
    fn test_set_parent_refuses_cycle() {
        let mut table = chain(3);
        assert!(matches!(table.set_parent(0, Some(2)), Err(SceneError::CyclicHierarchy(0))));
        assert!(matches!(table.set_parent(1, Some(1)), Err(SceneError::SelfParent(1))));
        assert!(matches!(table.set_parent(9, None), Err(SceneError::NodeOutOfRange(9))));

        table.set_parent(2, None).unwrap();
        assert_eq!(table.root_of(2), 2);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_renderable_entries() {
        let mut table = NodeTable::new();
        table.push(SceneNode::new("empty"));
        table.push(
            SceneNode::new("two")
                .with_primitive(Primitive::unit_cube())
                .with_primitive(Primitive::unit_cube()),
        );
        assert_eq!(
            table.renderable_entries(),
            vec![RenderableEntry::new(1, 0), RenderableEntry::new(1, 1)]
        );
        assert_eq!(table.primitive_count(), 2);

        assert!(table.primitive(RenderableEntry::new(1, 1)).is_some());
        assert!(table.primitive(RenderableEntry::new(0, 0)).is_none());
        assert!(table.primitive(RenderableEntry::new(5, 0)).is_none());
    }

    #[test]
    fn test_pair_mut_order() {
        let mut table = chain(3);
        let (a, b) = table.pair_mut(2, 0);
        assert_eq!(a.name(), "n2");
        assert_eq!(b.name(), "n0");
    }
}
