//! World transform resolution
//!
//! Each node's world matrix is composed by walking its parent chain from the
//! node upward, multiplying parent local matrices onto the left of an
//! accumulated matrix until a stopping rule fires:
//!
//! - a joint whose parent is not a joint (or which has no parent) stops at
//!   its own local matrix, so a skeleton is relative to its skin root
//! - a parentless node stops
//! - a static node stops, its local matrix is already in world space
//! - a moveable-root node takes exactly one multiply by its topmost ancestor
//! - anything else composes with its parent and the walk continues there

use crate::foundation::math::Mat4;
use crate::scene::node::{MovementClass, NodeIndex};
use crate::scene::node_table::NodeTable;

/// Resolves world matrices with a reusable local-matrix cache
///
/// The visited set is a per-walk epoch stamp so that no allocation happens
/// per node.
#[derive(Debug, Default)]
pub struct TransformResolver {
    locals: Vec<Mat4>,
    stamps: Vec<u32>,
    epoch: u32,
}

impl TransformResolver {
    /// Create a resolver with empty caches
    pub fn new() -> Self {
        Self::default()
    }

    /// World matrix of a single node
    ///
    /// Rebuilds the local matrix cache first; prefer
    /// [`resolve_all`](Self::resolve_all) when updating a whole table.
    pub fn resolve_world_matrix(&mut self, nodes: &NodeTable, index: NodeIndex) -> Mat4 {
        self.cache_locals(nodes);
        self.walk(nodes, index)
    }

    /// Resolve and store the world matrix of every node
    pub fn resolve_all(&mut self, nodes: &mut NodeTable) {
        self.cache_locals(nodes);
        let worlds: Vec<Mat4> = (0..nodes.len()).map(|i| self.walk(nodes, i)).collect();
        for (node, world) in nodes.iter_mut().zip(worlds) {
            node.set_world_matrix(world);
        }
    }

    /// Re-resolve `root` and every node below it after a local change
    ///
    /// Returns the refreshed indices; world matrices outside the subtree are
    /// left as cached.
    pub fn resolve_subtree(&mut self, nodes: &mut NodeTable, root: NodeIndex) -> Vec<NodeIndex> {
        if root >= nodes.len() {
            return Vec::new();
        }
        self.cache_locals(nodes);

        let bound = nodes.len();
        let members: Vec<NodeIndex> = (0..nodes.len())
            .filter(|&i| i == root || nodes.ancestors(i).take(bound).any(|a| a == root))
            .collect();
        for &index in &members {
            let world = self.walk(nodes, index);
            nodes[index].set_world_matrix(world);
        }
        members
    }

    fn cache_locals(&mut self, nodes: &NodeTable) {
        self.locals.clear();
        self.locals.extend(nodes.iter().map(|n| n.local_matrix()));
        self.stamps.resize(nodes.len(), 0);
    }

    fn next_epoch(&mut self) -> u32 {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            self.stamps.fill(0);
            self.epoch = 1;
        }
        self.epoch
    }

    fn walk(&mut self, nodes: &NodeTable, index: NodeIndex) -> Mat4 {
        let epoch = self.next_epoch();
        let mut current = index;
        let mut accumulated = self.locals[index];
        self.stamps[index] = epoch;

        loop {
            let node = &nodes[current];
            let parent = node.parent().filter(|&p| p < nodes.len());

            if node.is_joint() && parent.map_or(true, |p| !nodes[p].is_joint()) {
                return accumulated;
            }
            let Some(parent) = parent else {
                return accumulated;
            };

            match node.movement_class() {
                MovementClass::Static => return accumulated,
                MovementClass::MoveableRoot => {
                    let top = nodes.root_of(current);
                    return self.locals[top] * accumulated;
                }
                MovementClass::Free => {
                    if self.stamps[parent] == epoch {
                        log::warn!(
                            "Cycle in parent chain of node {} ('{}') at node {}; using partial transform",
                            index,
                            nodes[index].name(),
                            parent
                        );
                        return accumulated;
                    }
                    self.stamps[parent] = epoch;
                    accumulated = self.locals[parent] * accumulated;
                    current = parent;
                }
            }
        }
    }
}
