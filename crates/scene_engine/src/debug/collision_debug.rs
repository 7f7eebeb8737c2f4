//! Collision-specific debug visualization
//!
//! Draws the OBB and AABB of every visible primitive, highlighting those
//! that are part of a broad-phase candidate pair this frame.

use std::collections::HashSet;

use crate::debug::draw::{DebugDrawSystem, DebugLine};
use crate::foundation::math::Vec4;
use crate::physics::CandidatePair;
use crate::scene::{NodeTable, RenderableEntry};

/// Color scheme for collision visualization
#[derive(Clone, Debug)]
pub struct CollisionDebugColors {
    /// Oriented boxes of primitives with no candidate
    pub obb: Vec4,

    /// Axis-aligned boxes
    pub aabb: Vec4,

    /// Oriented boxes of primitives in a candidate pair
    pub candidate: Vec4,
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            obb: Vec4::new(0.0, 1.0, 0.0, 1.0),       // Green
            aabb: Vec4::new(0.5, 0.8, 1.0, 0.5),      // Light blue, transparent
            candidate: Vec4::new(1.0, 0.0, 0.0, 1.0), // Red
        }
    }
}

/// Builds bounding volume line lists for a frame
#[derive(Debug, Clone)]
pub struct CollisionDebugVisualizer {
    debug_draw: DebugDrawSystem,
    colors: CollisionDebugColors,

    /// Draw oriented boxes
    pub show_obbs: bool,

    /// Draw axis-aligned boxes
    pub show_aabbs: bool,
}

impl CollisionDebugVisualizer {
    /// Create a new collision debug visualizer
    pub fn new() -> Self {
        Self {
            debug_draw: DebugDrawSystem::new(),
            colors: CollisionDebugColors::default(),
            show_obbs: true,
            show_aabbs: true,
        }
    }

    /// Set custom color scheme
    #[must_use]
    pub fn with_colors(mut self, colors: CollisionDebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Line list for every visible primitive; hidden nodes are skipped
    pub fn build_lines(&mut self, nodes: &NodeTable, candidates: &[CandidatePair]) -> Vec<DebugLine> {
        let highlighted: HashSet<RenderableEntry> = candidates.iter().flat_map(|p| [p.a, p.b]).collect();

        for entry in nodes.renderable_entries() {
            let node = &nodes[entry.node];
            if node.is_hidden() {
                continue;
            }
            let primitive = &node.primitives()[entry.primitive];

            if self.show_obbs {
                let color = if highlighted.contains(&entry) {
                    self.colors.candidate
                } else {
                    self.colors.obb
                };
                self.debug_draw.draw_box_corners(&primitive.obb().corners, color);
            }
            if self.show_aabbs {
                self.debug_draw.draw_aabb(primitive.aabb(), self.colors.aabb);
            }
        }

        self.debug_draw.take_lines()
    }
}

impl Default for CollisionDebugVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::{update_all_bounds, Primitive, SceneNode, TransformResolver};

    #[test]
    fn test_hidden_nodes_are_skipped() {
        let mut nodes = NodeTable::new();
        nodes.push(SceneNode::new("shown").with_primitive(Primitive::unit_cube()));
        nodes.push(
            SceneNode::new("ghost")
                .with_position(Vec3::new(5.0, 0.0, 0.0))
                .with_primitive(Primitive::unit_cube())
                .hidden(),
        );
        TransformResolver::new().resolve_all(&mut nodes);
        update_all_bounds(&mut nodes);

        let mut visualizer = CollisionDebugVisualizer::new();
        let lines = visualizer.build_lines(&nodes, &[]);
        // One OBB and one AABB
        assert_eq!(lines.len(), 24);
    }

    #[test]
    fn test_candidates_are_highlighted() {
        let mut nodes = NodeTable::new();
        nodes.push(SceneNode::new("a").with_primitive(Primitive::unit_cube()));
        nodes.push(SceneNode::new("b").with_primitive(Primitive::unit_cube()));
        TransformResolver::new().resolve_all(&mut nodes);
        update_all_bounds(&mut nodes);

        let pair = CandidatePair {
            a: RenderableEntry::new(0, 0),
            b: RenderableEntry::new(1, 0),
        };
        let mut visualizer = CollisionDebugVisualizer::new();
        visualizer.show_aabbs = false;
        let colors = CollisionDebugColors::default();
        let lines = visualizer.build_lines(&nodes, &[pair]);

        assert_eq!(lines.len(), 24);
        assert!(lines.iter().all(|l| l.color == colors.candidate));
    }
}
