//! Separating axis test between two oriented boxes
//!
//! Candidate axes are the 3 face axes of each box plus the 9 cross products
//! of one face axis from each. Both boxes' corners are projected onto every
//! axis; a gap on any axis means no collision.

use crate::foundation::math::{try_direction, Vec3};
use crate::scene::Obb;

/// Cross products shorter than this (parallel edges) are not tested
const AXIS_EPSILON: f32 = 1.0e-6;

/// Penetration found by the separating axis test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatResult {
    /// Unit axis of least overlap, pointing from the second box toward the first
    pub axis: Vec3,
    /// Overlap along `axis`
    pub depth: f32,
}

impl SatResult {
    /// Minimum translation vector that pushes the first box out of the second
    pub fn mtv(&self) -> Vec3 {
        self.axis * self.depth
    }
}

fn candidate_axes(a: &Obb, b: &Obb) -> impl Iterator<Item = Vec3> {
    let faces_a = a.face_axes();
    let faces_b = b.face_axes();
    let crosses = faces_a
        .into_iter()
        .flat_map(move |ea| faces_b.into_iter().map(move |eb| ea.cross(&eb)));

    faces_a
        .into_iter()
        .chain(faces_b)
        .chain(crosses)
        .filter_map(|axis| try_direction(&axis, AXIS_EPSILON))
}

/// Test two boxes, returning the minimum translation if they overlap
///
/// Touching boxes overlap with zero depth. Ties between axes keep the
/// first one tested.
pub fn test_obb_pair(a: &Obb, b: &Obb) -> Option<SatResult> {
    let mut best: Option<SatResult> = None;

    for axis in candidate_axes(a, b) {
        let (min_a, max_a) = a.project(&axis);
        let (min_b, max_b) = b.project(&axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap < 0.0 {
            return None;
        }
        if best.map_or(true, |current| overlap < current.depth) {
            best = Some(SatResult { axis, depth: overlap });
        }
    }

    let mut result = best?;
    if result.axis.dot(&(a.center() - b.center())) < 0.0 {
        result.axis = -result.axis;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4, Quat, Transform};
    use approx::assert_relative_eq;

    fn cube(position: Vec3, rotation: Quat) -> Obb {
        let world = Transform::from_parts(position, rotation, Vec3::new(1.0, 1.0, 1.0)).to_matrix();
        Obb::from_local_bounds(&world, &Vec3::new(-0.5, -0.5, -0.5), &Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_half_overlap_along_x() {
        let a = cube(Vec3::zeros(), Quat::identity());
        let b = cube(Vec3::new(0.5, 0.0, 0.0), Quat::identity());

        let result = test_obb_pair(&a, &b).expect("cubes overlap");
        assert_relative_eq!(result.depth, 0.5, epsilon = 1e-6);
        assert_relative_eq!(result.axis.x.abs(), 1.0, epsilon = 1e-6);
        // Pushes the first cube away from the second
        assert!(result.axis.x < 0.0);
    }

    #[test]
    fn test_separated_cubes() {
        let a = cube(Vec3::zeros(), Quat::identity());
        let b = cube(Vec3::new(2.0, 0.0, 0.0), Quat::identity());
        assert!(test_obb_pair(&a, &b).is_none());
    }

    #[test]
    fn test_rotated_box_gap_found_on_face_axis() {
        // A 45 degree cube reaches ~0.707 along x
        let a = cube(Vec3::zeros(), Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_4));
        let near = cube(Vec3::new(1.1, 0.0, 0.0), Quat::identity());
        let far = cube(Vec3::new(1.3, 0.0, 0.0), Quat::identity());

        assert!(test_obb_pair(&a, &near).is_some());
        assert!(test_obb_pair(&a, &far).is_none());
    }

    #[test]
    fn test_parallel_boxes_skip_zero_crosses() {
        let a = Obb::from_local_bounds(&Mat4::identity(), &Vec3::zeros(), &Vec3::new(1.0, 1.0, 1.0));
        let result = test_obb_pair(&a, &a).expect("identical boxes overlap");
        assert!(result.axis.iter().all(|v| v.is_finite()));
        assert_relative_eq!(result.depth, 1.0, epsilon = 1e-6);
    }
}
