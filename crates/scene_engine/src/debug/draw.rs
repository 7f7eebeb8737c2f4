//! Debug line lists
//!
//! Debug geometry is rebuilt every frame as a flat list of colored line
//! segments the renderer can draw without any further processing.

use crate::foundation::math::{Vec3, Vec4};
use crate::scene::Aabb;

/// Colored line segment in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    /// Segment start
    pub start: Vec3,
    /// Segment end
    pub end: Vec3,
    /// RGBA color
    pub color: Vec4,
}

/// Corner pairs forming the 12 edges of a box in corner-bit order
fn box_edges() -> impl Iterator<Item = (usize, usize)> {
    (0..8_usize).flat_map(|i| {
        [1_usize, 2, 4]
            .into_iter()
            .filter(move |bit| i & bit == 0)
            .map(move |bit| (i, i | bit))
    })
}

/// Per-frame debug line collector
#[derive(Debug, Clone)]
pub struct DebugDrawSystem {
    lines: Vec<DebugLine>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create a new, enabled debug draw system
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            enabled: true,
        }
    }

    /// Draw a line segment
    pub fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4) {
        if !self.enabled {
            return;
        }
        self.lines.push(DebugLine { start, end, color });
    }

    /// Draw the 12 edges of a box given its corners in corner-bit order
    pub fn draw_box_corners(&mut self, corners: &[Vec3; 8], color: Vec4) {
        for (from, to) in box_edges() {
            self.draw_line(corners[from], corners[to], color);
        }
    }

    /// Draw an axis-aligned box
    pub fn draw_aabb(&mut self, aabb: &Aabb, color: Vec4) {
        let corners = std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { aabb.min.x } else { aabb.max.x },
                if i & 2 == 0 { aabb.min.y } else { aabb.max.y },
                if i & 4 == 0 { aabb.min.z } else { aabb.max.z },
            )
        });
        self.draw_box_corners(&corners, color);
    }

    /// Lines drawn since the last clear
    pub fn lines(&self) -> &[DebugLine] {
        &self.lines
    }

    /// Hand over the collected lines and start a new frame
    pub fn take_lines(&mut self) -> Vec<DebugLine> {
        std::mem::take(&mut self.lines)
    }

    /// Get the number of collected lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Clear all lines
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_has_twelve_unit_edges() {
        let mut system = DebugDrawSystem::new();
        system.draw_aabb(
            &Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
        );

        assert_eq!(system.line_count(), 12);
        assert!(system.lines().iter().all(|l| (l.end - l.start).magnitude() == 1.0));
    }

    #[test]
    fn test_disabled_system_draws_nothing() {
        let mut system = DebugDrawSystem::new();
        system.enabled = false;
        system.draw_line(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(system.line_count(), 0);
    }

    #[test]
    fn test_take_lines_clears() {
        let mut system = DebugDrawSystem::new();
        system.draw_line(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0), Vec4::new(1.0, 1.0, 1.0, 1.0));

        assert_eq!(system.take_lines().len(), 1);
        assert_eq!(system.line_count(), 0);
    }
}
