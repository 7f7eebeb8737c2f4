//! Penetration resolution
//!
//! Splits a minimum translation vector between two nodes by a mix of mass
//! and approach speed, with a step-climbing override for the player and
//! landing on vertical contacts. A moved node and everything below it get
//! fresh world matrices and bounds at once, so later pairs in the same frame
//! test against the corrected geometry.

use crate::foundation::math::{try_direction, Vec3};
use crate::scene::{update_node_bounds, NodeIndex, NodeTable, RenderableEntry, SceneNode, TransformResolver};

/// A confirmed overlap ready to be resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// First primitive, pushed along `+mtv`
    pub a: RenderableEntry,
    /// Second primitive, pushed along `-mtv`
    pub b: RenderableEntry,
    /// Minimum translation vector separating `a` from `b`
    pub mtv: Vec3,
    /// Position the first node's offset is applied to
    pub base_a: Vec3,
    /// Position the second node's offset is applied to
    pub base_b: Vec3,
}

/// Shares of the MTV each node takes
fn proportions(a: &SceneNode, b: &SceneNode, normal: &Vec3, relative_speed: f32) -> (f32, f32) {
    // Static geometry is pre-baked and never pushed
    let mass_a = a.mass().filter(|_| !a.is_static());
    let mass_b = b.mass().filter(|_| !b.is_static());

    match (mass_a, mass_b) {
        (None, None) => (1.0, 1.0),
        (None, Some(_)) => (0.0, 1.0),
        (Some(_), None) => (1.0, 0.0),
        (Some(m1), Some(m2)) => {
            let total_mass = m1 + m2;
            let speed = relative_speed.abs();
            let factor_a = (1.0 - m1) / total_mass + a.motion.current_velocity().dot(normal).abs() / speed;
            let factor_b = (1.0 - m2) / total_mass + b.motion.current_velocity().dot(normal).abs() / speed;

            let sum = factor_a + factor_b;
            if sum.abs() <= f32::EPSILON || !sum.is_finite() {
                return (0.5, 0.5);
            }
            let share_a = (factor_a / sum).clamp(0.0, 1.0);
            (share_a, 1.0 - share_a)
        }
    }
}

/// Lift for a player whose feet are just below the top of the other box
fn step_climb(player: &SceneNode, player_entry: RenderableEntry, other: &SceneNode, other_entry: RenderableEntry) -> Option<f32> {
    let height = player.combined_aabb()?.height();
    let player_bottom = player.primitives().get(player_entry.primitive)?.aabb().min.y;
    let other_top = other.primitives().get(other_entry.primitive)?.aabb().max.y;

    let gap = other_top - player_bottom;
    (gap > 0.0 && gap < height / 3.0).then_some(gap)
}

fn move_node(node: &mut SceneNode, target: Vec3) -> bool {
    if *node.position() == target {
        return false;
    }
    node.set_position(target);
    true
}

fn refresh_subtree(nodes: &mut NodeTable, resolver: &mut TransformResolver, root: NodeIndex) {
    for index in resolver.resolve_subtree(nodes, root) {
        update_node_bounds(&mut nodes[index]);
    }
}

/// Push two overlapping nodes apart
///
/// Returns whether either node was moved. Zero relative speed along the MTV
/// is a resting touch and is left alone, as is a contact that names the same
/// node twice or a primitive that does not exist.
pub fn offset_nodes(nodes: &mut NodeTable, resolver: &mut TransformResolver, contact: &Contact) -> bool {
    if contact.a.node == contact.b.node || nodes.primitive(contact.a).is_none() || nodes.primitive(contact.b).is_none() {
        return false;
    }
    let Some(normal) = try_direction(&contact.mtv, f32::EPSILON) else {
        return false;
    };
    let (node_a, node_b) = nodes.pair_mut(contact.a.node, contact.b.node);

    let relative_speed = (node_a.motion.current_velocity() - node_b.motion.current_velocity()).dot(&normal);
    if relative_speed == 0.0 {
        return false;
    }

    let (share_a, share_b) = proportions(node_a, node_b, &normal, relative_speed);
    let mut offset_a = contact.mtv * share_a;
    let mut offset_b = -contact.mtv * share_b;

    let climb = if node_a.is_player() {
        step_climb(node_a, contact.a, node_b, contact.b).map(|gap| (true, gap))
    } else if node_b.is_player() {
        step_climb(node_b, contact.b, node_a, contact.a).map(|gap| (false, gap))
    } else {
        None
    };
    if let Some((player_is_a, gap)) = climb {
        let lift = Vec3::new(0.0, gap, 0.0);
        if player_is_a {
            offset_a = lift;
            offset_b = Vec3::zeros();
            node_a.motion.grounded = true;
        } else {
            offset_a = Vec3::zeros();
            offset_b = lift;
            node_b.motion.grounded = true;
        }
        log::trace!("Step climb of {gap:.3}");
    }

    let moved_a = move_node(node_a, contact.base_a + offset_a);
    let moved_b = move_node(node_b, contact.base_b + offset_b);

    if contact.mtv.y != 0.0 {
        if node_a.motion.current_velocity().y <= node_b.motion.current_velocity().y {
            node_a.motion.land();
        } else {
            node_b.motion.land();
        }
    }

    if moved_a {
        refresh_subtree(nodes, resolver, contact.a.node);
    }
    if moved_b {
        refresh_subtree(nodes, resolver, contact.b.node);
    }
    moved_a || moved_b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::{update_all_bounds, Primitive, PLAYER_NAME};
    use approx::assert_relative_eq;

    fn prepared(mut nodes: NodeTable) -> NodeTable {
        TransformResolver::new().resolve_all(&mut nodes);
        update_all_bounds(&mut nodes);
        nodes
    }

    fn offset(nodes: &mut NodeTable, contact: &Contact) -> bool {
        offset_nodes(nodes, &mut TransformResolver::new(), contact)
    }

    fn contact(nodes: &NodeTable, mtv: Vec3) -> Contact {
        Contact {
            a: RenderableEntry::new(0, 0),
            b: RenderableEntry::new(1, 0),
            mtv,
            base_a: *nodes[0].position(),
            base_b: *nodes[1].position(),
        }
    }

    #[test]
    fn test_infinite_mass_takes_no_correction() {
        let mut nodes = NodeTable::new();
        nodes.push(
            SceneNode::new("crate")
                .with_mass(1.0)
                .unwrap()
                .with_velocity(Vec3::new(-1.0, 0.0, 0.0))
                .with_primitive(Primitive::unit_cube()),
        );
        nodes.push(SceneNode::new("pillar").with_position(Vec3::new(-0.5, 0.0, 0.0)).with_primitive(Primitive::unit_cube()));
        let mut nodes = prepared(nodes);

        let c = contact(&nodes, Vec3::new(0.5, 0.0, 0.0));
        assert!(offset(&mut nodes, &c));
        assert_relative_eq!(*nodes[0].position(), Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(*nodes[1].position(), Vec3::new(-0.5, 0.0, 0.0));
        // Bounds follow the correction
        assert_relative_eq!(nodes[0].primitives()[0].aabb().min.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_both_infinite_masses_double_correct() {
        let mut nodes = NodeTable::new();
        nodes.push(SceneNode::new("a").with_velocity(Vec3::new(-1.0, 0.0, 0.0)).with_primitive(Primitive::unit_cube()));
        nodes.push(SceneNode::new("b").with_position(Vec3::new(-0.5, 0.0, 0.0)).with_primitive(Primitive::unit_cube()));
        let mut nodes = prepared(nodes);

        let c = contact(&nodes, Vec3::new(0.5, 0.0, 0.0));
        assert!(offset(&mut nodes, &c));
        // Each node receives the full MTV
        assert_relative_eq!(*nodes[0].position(), Vec3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(*nodes[1].position(), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_relative_velocity_skips() {
        let mut nodes = NodeTable::new();
        nodes.push(SceneNode::new("a").with_mass(1.0).unwrap().with_primitive(Primitive::unit_cube()));
        nodes.push(
            SceneNode::new("b")
                .with_mass(1.0)
                .unwrap()
                .with_position(Vec3::new(0.5, 0.0, 0.0))
                .with_primitive(Primitive::unit_cube()),
        );
        let mut nodes = prepared(nodes);

        let c = contact(&nodes, Vec3::new(-0.5, 0.0, 0.0));
        assert!(!offset(&mut nodes, &c));
        assert_eq!(*nodes[0].position(), Vec3::zeros());
        assert_eq!(*nodes[1].position(), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_equal_masses_split_by_approach_speed() {
        let mut nodes = NodeTable::new();
        nodes.push(
            SceneNode::new("a")
                .with_mass(0.5)
                .unwrap()
                .with_velocity(Vec3::new(1.0, 0.0, 0.0))
                .with_primitive(Primitive::unit_cube()),
        );
        nodes.push(
            SceneNode::new("b")
                .with_mass(0.5)
                .unwrap()
                .with_position(Vec3::new(0.5, 0.0, 0.0))
                .with_velocity(Vec3::new(-1.0, 0.0, 0.0))
                .with_primitive(Primitive::unit_cube()),
        );
        let mut nodes = prepared(nodes);

        let c = contact(&nodes, Vec3::new(-0.5, 0.0, 0.0));
        assert!(offset(&mut nodes, &c));
        assert_relative_eq!(nodes[0].position().x, -0.25, epsilon = 1e-6);
        assert_relative_eq!(nodes[1].position().x, 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_player_step_climb() {
        let mut nodes = NodeTable::new();
        // Player 1.8 tall with feet at y = 0
        nodes.push(
            SceneNode::new(PLAYER_NAME)
                .with_mass(1.0)
                .unwrap()
                .with_velocity(Vec3::new(1.0, 0.0, 0.0))
                .with_primitive(Primitive::from_bounds(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 1.8, 0.3))),
        );
        // Step whose top is 0.3 above the player's feet
        nodes.push(
            SceneNode::new("step")
                .with_position(Vec3::new(0.5, 0.0, 0.0))
                .with_primitive(Primitive::from_bounds(Vec3::new(-0.5, -1.0, -0.5), Vec3::new(0.5, 0.3, 0.5))),
        );
        let mut nodes = prepared(nodes);
        nodes[0].motion.grounded = false;

        let c = contact(&nodes, Vec3::new(-0.2, 0.0, 0.0));
        assert!(offset(&mut nodes, &c));
        assert_relative_eq!(*nodes[0].position(), Vec3::new(0.0, 0.3, 0.0), epsilon = 1e-6);
        assert_eq!(*nodes[1].position(), Vec3::new(0.5, 0.0, 0.0));
        assert!(nodes[0].motion.grounded);
    }

    #[test]
    fn test_tall_obstacle_is_not_climbed() {
        let mut nodes = NodeTable::new();
        nodes.push(
            SceneNode::new(PLAYER_NAME)
                .with_mass(1.0)
                .unwrap()
                .with_velocity(Vec3::new(1.0, 0.0, 0.0))
                .with_primitive(Primitive::from_bounds(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 1.8, 0.3))),
        );
        nodes.push(
            SceneNode::new("wall")
                .with_position(Vec3::new(0.5, 0.0, 0.0))
                .with_primitive(Primitive::from_bounds(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 3.0, 0.5))),
        );
        let mut nodes = prepared(nodes);

        let c = contact(&nodes, Vec3::new(-0.2, 0.0, 0.0));
        assert!(offset(&mut nodes, &c));
        assert_relative_eq!(*nodes[0].position(), Vec3::new(-0.2, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_vertical_contact_lands_falling_node() {
        let mut nodes = NodeTable::new();
        nodes.push(
            SceneNode::new("rock")
                .with_mass(1.0)
                .unwrap()
                .with_gravity(true)
                .with_position(Vec3::new(0.0, 0.9, 0.0))
                .with_primitive(Primitive::unit_cube()),
        );
        nodes.push(SceneNode::new("ground").with_primitive(Primitive::unit_cube()));
        let mut nodes = prepared(nodes);
        nodes[0].motion.gravity_accumulator = 3.0;

        let c = contact(&nodes, Vec3::new(0.0, 0.1, 0.0));
        assert!(offset(&mut nodes, &c));
        assert_relative_eq!(nodes[0].position().y, 1.0, epsilon = 1e-6);
        assert!(nodes[0].motion.grounded);
        assert_eq!(nodes[0].motion.gravity_accumulator, 0.0);
    }

    #[test]
    fn test_correction_under_scaled_parent_refreshes_bounds() {
        let mut nodes = NodeTable::new();
        let rig = nodes.push(SceneNode::new("rig").with_scale(Vec3::new(2.0, 2.0, 2.0)));
        let crate_node = nodes.push(
            SceneNode::new("crate")
                .with_parent(rig)
                .with_mass(1.0)
                .unwrap()
                .with_velocity(Vec3::new(-1.0, 0.0, 0.0))
                .with_primitive(Primitive::unit_cube()),
        );
        let pillar = nodes.push(SceneNode::new("pillar").with_position(Vec3::new(-1.5, 0.0, 0.0)).with_primitive(Primitive::unit_cube()));
        let lid = nodes.push(
            SceneNode::new("lid")
                .with_parent(crate_node)
                .with_position(Vec3::new(0.0, 1.0, 0.0))
                .with_primitive(Primitive::unit_cube()),
        );
        let mut nodes = prepared(nodes);

        let c = Contact {
            a: RenderableEntry::new(crate_node, 0),
            b: RenderableEntry::new(pillar, 0),
            mtv: Vec3::new(0.5, 0.0, 0.0),
            base_a: *nodes[crate_node].position(),
            base_b: *nodes[pillar].position(),
        };
        assert!(offset(&mut nodes, &c));
        assert_relative_eq!(*nodes[crate_node].position(), Vec3::new(0.5, 0.0, 0.0));

        // Half a parent-space unit is a whole world unit under the scale of 2
        assert_relative_eq!(nodes[crate_node].primitives()[0].aabb().min.x, 0.0, epsilon = 1e-6);

        // Bounds match a full re-resolve, descendants included
        let mut expected = nodes.clone();
        TransformResolver::new().resolve_all(&mut expected);
        update_all_bounds(&mut expected);
        for index in [crate_node, lid] {
            let got = nodes[index].primitives()[0].aabb();
            let want = expected[index].primitives()[0].aabb();
            assert_relative_eq!(got.min, want.min, epsilon = 1e-6);
            assert_relative_eq!(got.max, want.max, epsilon = 1e-6);
        }
        assert_relative_eq!(nodes[lid].primitives()[0].aabb().min.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_malformed_contact_is_ignored() {
        let mut nodes = NodeTable::new();
        nodes.push(
            SceneNode::new("a")
                .with_mass(1.0)
                .unwrap()
                .with_velocity(Vec3::new(1.0, 0.0, 0.0))
                .with_primitive(Primitive::unit_cube()),
        );
        nodes.push(SceneNode::new("b").with_position(Vec3::new(0.5, 0.0, 0.0)).with_primitive(Primitive::unit_cube()));
        let mut nodes = prepared(nodes);
        let mtv = Vec3::new(-0.5, 0.0, 0.0);

        let same_node = Contact {
            b: RenderableEntry::new(0, 0),
            ..contact(&nodes, mtv)
        };
        assert!(!offset(&mut nodes, &same_node));

        let missing_primitive = Contact {
            b: RenderableEntry::new(1, 3),
            ..contact(&nodes, mtv)
        };
        assert!(!offset(&mut nodes, &missing_primitive));

        let missing_node = Contact {
            b: RenderableEntry::new(9, 0),
            ..contact(&nodes, mtv)
        };
        assert!(!offset(&mut nodes, &missing_node));
        assert_eq!(*nodes[0].position(), Vec3::zeros());
    }
}
