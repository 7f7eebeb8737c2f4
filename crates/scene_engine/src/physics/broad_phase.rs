//! Broad-phase collision detection
//!
//! Exhaustive pairwise AABB test over every renderable primitive. Scenes are
//! small enough that no spatial partitioning is used; any acceleration
//! structure must produce the same candidate set.

use crate::scene::{NodeIndex, NodeTable, RenderableEntry};

/// Two primitives whose world AABBs overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidatePair {
    /// First primitive (lower index in traversal order)
    pub a: RenderableEntry,
    /// Second primitive
    pub b: RenderableEntry,
}

/// Broad phase with reusable scratch storage
#[derive(Debug, Default)]
pub struct BroadPhase {
    entries: Vec<RenderableEntry>,
    roots: Vec<NodeIndex>,
    candidates: Vec<CandidatePair>,
}

impl BroadPhase {
    /// Create a broad phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect candidate pairs for the current bounding volumes
    ///
    /// Skipped: primitives of the same node, nodes sharing a root (no
    /// subtree self-collision) and pairs of two static nodes.
    pub fn find_candidates(&mut self, nodes: &NodeTable) -> &[CandidatePair] {
        self.entries = nodes.renderable_entries();
        self.roots.clear();
        self.roots.extend((0..nodes.len()).map(|i| nodes.root_of(i)));
        self.candidates.clear();

        for (i, a) in self.entries.iter().enumerate() {
            let node_a = &nodes[a.node];
            let aabb_a = node_a.primitives()[a.primitive].aabb();

            for b in &self.entries[i + 1..] {
                if a.node == b.node || self.roots[a.node] == self.roots[b.node] {
                    continue;
                }
                let node_b = &nodes[b.node];
                if node_a.is_static() && node_b.is_static() {
                    continue;
                }
                if aabb_a.intersects(node_b.primitives()[b.primitive].aabb()) {
                    self.candidates.push(CandidatePair { a: *a, b: *b });
                }
            }
        }

        log::trace!(
            "Broad phase: {} primitives, {} candidate pairs",
            self.entries.len(),
            self.candidates.len()
        );
        &self.candidates
    }

    /// Candidates from the last call to [`find_candidates`](Self::find_candidates)
    pub fn candidates(&self) -> &[CandidatePair] {
        &self.candidates
    }
}
