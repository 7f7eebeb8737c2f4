//! Bounding volumes and the bounding volume updater
//!
//! Every frame, after world transforms are resolved, each primitive's
//! local-space min/max corners are pushed through its node's world matrix to
//! produce an oriented box (8 corners, 6 outward face normals) and the tight
//! axis-aligned box around those corners. The collision phases only ever read
//! these derived volumes.

use crate::foundation::math::{transform_point, try_direction, Mat4, Vec3};
use crate::scene::node::SceneNode;
use crate::scene::node_table::NodeTable;

/// Shortest edge cross product treated as a usable face normal
const NORMAL_EPSILON: f32 = 1e-8;

/// Axis-Aligned Bounding Box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Tight bound of a set of points, `None` for an empty set
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(Self { min, max })
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Vertical size of the box
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check if this AABB intersects another AABB (touching counts)
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Smallest AABB containing both boxes
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Same box moved by `delta`
    pub fn translated(&self, delta: &Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

/// Oriented bounding box in world space
///
/// Corner `i` takes the max local coordinate on x when bit 0 of `i` is set,
/// on y for bit 1 and on z for bit 2. Normals are ordered
/// `[+x, -x, +y, -y, +z, -z]` in the box's own frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// The 8 world-space corners
    pub corners: [Vec3; 8],
    /// The 6 outward unit face normals
    pub normals: [Vec3; 6],
}

impl Obb {
    /// Build the world-space box for local corners `min`/`max` under `world`
    pub fn from_local_bounds(world: &Mat4, min: &Vec3, max: &Vec3) -> Self {
        let corners: [Vec3; 8] = std::array::from_fn(|i| {
            let local = Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            transform_point(world, &local)
        });

        let normals = face_normals(world, &corners);
        Self { corners, normals }
    }

    /// Centroid of the corners
    pub fn center(&self) -> Vec3 {
        self.corners.iter().sum::<Vec3>() / 8.0
    }

    /// The three distinct face axes (x, y, z faces)
    pub const fn face_axes(&self) -> [Vec3; 3] {
        [self.normals[0], self.normals[2], self.normals[4]]
    }

    /// Project all corners onto `axis`, returning the covered interval
    pub fn project(&self, axis: &Vec3) -> (f32, f32) {
        self.corners.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), c| {
            let d = c.dot(axis);
            (lo.min(d), hi.max(d))
        })
    }

    /// Tight axis-aligned bound of the corners
    pub fn enclosing_aabb(&self) -> Aabb {
        let (min, max) = self.corners[1..]
            .iter()
            .fold((self.corners[0], self.corners[0]), |(min, max), c| (min.inf(c), max.sup(c)));
        Aabb { min, max }
    }

    /// Same box moved by `delta`
    pub fn translated(&self, delta: &Vec3) -> Self {
        Self {
            corners: self.corners.map(|c| c + delta),
            normals: self.normals,
        }
    }
}

/// Outward face normals from the box edge vectors
///
/// A flat box has a vanishing edge cross product on some faces; those fall
/// back to the matching world matrix basis column, then to the world axis.
fn face_normals(world: &Mat4, corners: &[Vec3; 8]) -> [Vec3; 6] {
    let edge_x = corners[1] - corners[0];
    let edge_y = corners[2] - corners[0];
    let edge_z = corners[4] - corners[0];

    let candidates = [
        (edge_y.cross(&edge_z), edge_x, 0),
        (edge_z.cross(&edge_x), edge_y, 1),
        (edge_x.cross(&edge_y), edge_z, 2),
    ];

    let mut normals = [Vec3::zeros(); 6];
    for (slot, (cross, along, column)) in candidates.into_iter().enumerate() {
        let normal = match try_direction(&cross, NORMAL_EPSILON) {
            // Mirrored transforms flip the cross product inward
            Some(n) if n.dot(&along) < 0.0 => -n,
            Some(n) => n,
            None => basis_axis(world, column),
        };
        normals[slot * 2] = normal;
        normals[slot * 2 + 1] = -normal;
    }
    normals
}

fn basis_axis(world: &Mat4, column: usize) -> Vec3 {
    let basis = world.fixed_view::<3, 1>(0, column).into_owned();
    try_direction(&basis, NORMAL_EPSILON).unwrap_or_else(|| {
        let mut axis = Vec3::zeros();
        axis[column] = 1.0;
        axis
    })
}

/// Recompute OBB and AABB of every primitive of one node from its world matrix
pub fn update_node_bounds(node: &mut SceneNode) {
    let world = *node.world_matrix();
    for primitive in node.primitives_mut() {
        let obb = Obb::from_local_bounds(&world, primitive.local_min(), primitive.local_max());
        let aabb = obb.enclosing_aabb();
        primitive.set_bounds(obb, aabb);
    }
}

/// Recompute bounding volumes for the whole table
///
/// Must run after transform resolution and before any collision query.
pub fn update_all_bounds(nodes: &mut NodeTable) {
    for node in nodes.iter_mut() {
        update_node_bounds(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Transform};
    use crate::scene::node::Primitive;
    use approx::assert_relative_eq;

    fn rotated_node() -> SceneNode {
        let mut node = SceneNode::new("box")
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Quat::from_euler_angles(0.3, 0.9, -0.4))
            .with_scale(Vec3::new(1.0, 2.0, 0.5))
            .with_primitive(Primitive::from_bounds(Vec3::new(-1.0, -0.5, -2.0), Vec3::new(1.5, 0.5, 2.0)));
        let world = node.local_matrix();
        node.set_world_matrix(world);
        node
    }

    #[test]
    fn test_aabb_is_tight_bound_of_obb_corners() {
        let mut node = rotated_node();
        update_node_bounds(&mut node);

        let primitive = &node.primitives()[0];
        let corners = primitive.obb().corners;
        for d in 0..3 {
            let min = corners.iter().map(|c| c[d]).fold(f32::INFINITY, f32::min);
            let max = corners.iter().map(|c| c[d]).fold(f32::NEG_INFINITY, f32::max);
            assert_eq!(primitive.aabb().min[d], min);
            assert_eq!(primitive.aabb().max[d], max);
        }
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut node = rotated_node();
        update_node_bounds(&mut node);
        let first = node.primitives()[0].clone();

        update_node_bounds(&mut node);
        assert_eq!(node.primitives()[0], first);
    }

    #[test]
    fn test_normals_are_outward_unit_vectors() {
        let mut node = rotated_node();
        update_node_bounds(&mut node);

        let obb = node.primitives()[0].obb();
        let center = obb.center();
        for (face, normal) in obb.normals.iter().enumerate() {
            assert_relative_eq!(normal.magnitude(), 1.0, epsilon = 1e-5);
            // The face centre lies on the positive side of its normal
            let axis_bit = 1 << (face / 2);
            let on_max_side = face % 2 == 0;
            let face_center = obb
                .corners
                .iter()
                .enumerate()
                .filter(|(i, _)| (i & axis_bit != 0) == on_max_side)
                .map(|(_, c)| *c)
                .sum::<Vec3>()
                / 4.0;
            assert!((face_center - center).dot(normal) > 0.0);
        }
    }

    #[test]
    fn test_mirrored_scale_keeps_normals_outward() {
        let world = Transform::from_parts(Vec3::zeros(), Quat::identity(), Vec3::new(-1.0, 1.0, 1.0)).to_matrix();
        let obb = Obb::from_local_bounds(&world, &Vec3::new(-0.5, -0.5, -0.5), &Vec3::new(0.5, 0.5, 0.5));
        // Corner 1 is the local +x corner, which mirrors to world -x
        assert!(obb.corners[1].x < obb.corners[0].x);
        assert_relative_eq!(obb.normals[0], Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_flat_box_falls_back_to_basis() {
        let obb = Obb::from_local_bounds(
            &Mat4::identity(),
            &Vec3::new(-5.0, 0.0, -5.0),
            &Vec3::new(5.0, 0.0, 5.0),
        );
        assert_relative_eq!(obb.normals[0], Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(obb.normals[2], Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(obb.normals[4], Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        assert!(obb.normals.iter().all(|n| n.iter().all(|v| v.is_finite())));
    }

    #[test]
    fn test_aabb_intersects() {
        let aabb1 = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
        let aabb2 = Aabb::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        let aabb3 = Aabb::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(7.0, 7.0, 7.0));

        assert!(aabb1.intersects(&aabb2));
        assert!(!aabb1.intersects(&aabb3));
    }

    #[test]
    fn test_aabb_from_points() {
        assert!(Aabb::from_points(&[]).is_none());
        let aabb = Aabb::from_points(&[Vec3::new(1.0, -1.0, 0.0), Vec3::new(-2.0, 4.0, 0.5)]).unwrap();
        assert_eq!(aabb.min, Vec3::new(-2.0, -1.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 0.5));
        assert_eq!(aabb.height(), 5.0);
    }
}
