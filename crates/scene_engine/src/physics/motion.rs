//! Motion integration
//!
//! Records where every node started the frame, then moves non-static nodes
//! by their driven velocity and accumulated fall speed. Kind-specific updates
//! are dispatched on [`EntityKind`].

use crate::config::SimulationConfig;
use crate::scene::{EntityKind, NodeTable, SceneNode};

/// Store each node's current position as its previous-frame position
pub fn record_previous_positions(nodes: &mut NodeTable) {
    for node in nodes.iter_mut() {
        node.motion.previous_position = *node.position();
    }
}

/// Integrate one node over `elapsed_ms`
///
/// Static nodes never move.
pub fn integrate(node: &mut SceneNode, elapsed_ms: f32, config: &SimulationConfig) {
    if node.is_static() {
        return;
    }
    let dt = elapsed_ms / 1000.0;

    let jumped = match node.kind() {
        EntityKind::Player => apply_jump(node, config),
        EntityKind::Generic => false,
    };

    let motion = &mut node.motion;
    if motion.uses_gravity {
        if !jumped {
            // Regained each frame by landing on something
            motion.grounded = false;
        }
        motion.gravity_accumulator = (motion.gravity_accumulator + config.gravity * dt).min(config.max_fall_speed);
    }

    let step = node.motion.current_velocity() * dt;
    let position = node.position() + step;
    node.set_position(position);
}

/// Consume a pending jump request; only a grounded player leaves the ground
fn apply_jump(node: &mut SceneNode, config: &SimulationConfig) -> bool {
    let motion = &mut node.motion;
    if !std::mem::take(&mut motion.jump_requested) || !motion.grounded {
        return false;
    }
    motion.gravity_accumulator = -config.player_jump_speed;
    motion.grounded = false;
    log::debug!("'{}' jumped", node.name());
    true
}

/// Integrate every node in the table
pub fn integrate_all(nodes: &mut NodeTable, elapsed_ms: f32, config: &SimulationConfig) {
    for node in nodes.iter_mut() {
        integrate(node, elapsed_ms, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::{MovementClass, PLAYER_NAME};
    use approx::assert_relative_eq;

    #[test]
    fn test_static_node_does_not_move() {
        let mut node = SceneNode::new("wall")
            .with_movement_class(MovementClass::Static)
            .with_velocity(Vec3::new(1.0, 0.0, 0.0))
            .with_gravity(true);
        integrate(&mut node, 16.0, &SimulationConfig::default());
        assert_eq!(*node.position(), Vec3::zeros());
    }

    #[test]
    fn test_velocity_integrates_in_seconds() {
        let mut node = SceneNode::new("crate").with_velocity(Vec3::new(2.0, 0.0, 0.0));
        integrate(&mut node, 500.0, &SimulationConfig::default());
        assert_relative_eq!(node.position().x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gravity_accumulates_and_caps() {
        let config = SimulationConfig {
            max_fall_speed: 1.0,
            ..SimulationConfig::default()
        };
        let mut node = SceneNode::new("rock").with_gravity(true);
        integrate(&mut node, 100.0, &config);
        assert_relative_eq!(node.motion.gravity_accumulator, 0.981, epsilon = 1e-5);
        assert!(node.position().y < 0.0);

        for _ in 0..10 {
            integrate(&mut node, 100.0, &config);
        }
        assert_eq!(node.motion.gravity_accumulator, 1.0);
    }

    #[test]
    fn test_grounded_player_jumps() {
        let config = SimulationConfig::default();
        let mut player = SceneNode::new(PLAYER_NAME);
        player.motion.land();
        player.motion.jump_requested = true;

        integrate(&mut player, 10.0, &config);
        assert!(!player.motion.jump_requested);
        assert!(player.motion.gravity_accumulator < 0.0);
        assert!(player.position().y > 0.0);
    }

    #[test]
    fn test_airborne_player_cannot_jump() {
        let config = SimulationConfig::default();
        let mut player = SceneNode::new(PLAYER_NAME);
        player.motion.jump_requested = true;

        integrate(&mut player, 10.0, &config);
        assert!(!player.motion.jump_requested);
        assert!(player.motion.gravity_accumulator > 0.0);
    }

    #[test]
    fn test_record_previous_positions() {
        let mut nodes = NodeTable::new();
        let a = nodes.push(SceneNode::new("a").with_position(Vec3::new(1.0, 0.0, 0.0)));
        nodes[a].set_position(Vec3::new(3.0, 0.0, 0.0));
        record_previous_positions(&mut nodes);
        assert_eq!(nodes[a].motion.previous_position, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(nodes[a].frame_displacement(), Vec3::zeros());
    }
}
