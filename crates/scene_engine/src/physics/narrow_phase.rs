//! Narrow-phase collision detection and response
//!
//! Runs the separating axis test on broad-phase candidates whose nodes moved
//! this frame and resolves confirmed overlaps. In swept mode the test is
//! repeated at poses stepped back toward the previous frame, and only the
//! first overlap found (walking back from the current pose) is resolved.

use crate::config::{CollisionMode, MotionGate, SimulationConfig};
use crate::foundation::math::{clamp_length, Vec3};
use crate::physics::broad_phase::CandidatePair;
use crate::physics::resolution::{offset_nodes, Contact};
use crate::physics::sat::test_obb_pair;
use crate::scene::{NodeIndex, NodeTable, Obb, TransformResolver};

/// Narrow phase settings taken from the simulation config
#[derive(Debug, Clone, PartialEq)]
pub struct NarrowPhase {
    mode: CollisionMode,
    motion_gate: MotionGate,
    movement_epsilon: f32,
    fixed_time_step_ms: f32,
    max_backstep: f32,
    steps_per_unit: f32,
}

impl NarrowPhase {
    /// Build from configuration
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            mode: config.collision_mode,
            motion_gate: config.motion_gate,
            movement_epsilon: config.movement_epsilon,
            fixed_time_step_ms: config.fixed_time_step_ms,
            max_backstep: config.max_continuous_backstep,
            steps_per_unit: config.continuous_steps_per_unit,
        }
    }

    /// Collision mode in use
    pub const fn mode(&self) -> CollisionMode {
        self.mode
    }

    /// Test and resolve every candidate; returns whether any node moved
    ///
    /// `resolver` refreshes the world matrices and bounds of corrected nodes
    /// between pairs. Pairs naming one node twice or a missing primitive are
    /// skipped.
    pub fn process(
        &self,
        nodes: &mut NodeTable,
        resolver: &mut TransformResolver,
        candidates: &[CandidatePair],
        elapsed_ms: f32,
    ) -> bool {
        let mut adjusted = false;
        let mut tested = 0_usize;

        for pair in candidates {
            if pair.a.node == pair.b.node || !self.is_moving(nodes, pair) {
                continue;
            }
            tested += 1;
            adjusted |= match self.mode {
                CollisionMode::Sat => self.resolve_discrete(nodes, resolver, pair),
                CollisionMode::SatContinuous => self.resolve_swept(nodes, resolver, pair, elapsed_ms),
                CollisionMode::Disabled => false,
            };
        }

        log::trace!("Narrow phase ({}): tested {tested} of {} pairs", self.mode, candidates.len());
        adjusted
    }

    fn is_moving(&self, nodes: &NodeTable, pair: &CandidatePair) -> bool {
        let moved = |node: NodeIndex| {
            nodes
                .get(node)
                .is_some_and(|n| n.frame_displacement().magnitude() > self.movement_epsilon)
        };
        self.motion_gate.admits(moved(pair.a.node), moved(pair.b.node))
    }

    fn resolve_discrete(&self, nodes: &mut NodeTable, resolver: &mut TransformResolver, pair: &CandidatePair) -> bool {
        let Some((obb_a, obb_b)) = obbs(nodes, pair) else {
            return false;
        };
        let Some(hit) = test_obb_pair(&obb_a, &obb_b) else {
            return false;
        };

        let contact = Contact {
            a: pair.a,
            b: pair.b,
            mtv: hit.mtv(),
            base_a: *nodes[pair.a.node].position(),
            base_b: *nodes[pair.b.node].position(),
        };
        offset_nodes(nodes, resolver, &contact)
    }

    #[allow(clippy::cast_precision_loss)]
    fn resolve_swept(
        &self,
        nodes: &mut NodeTable,
        resolver: &mut TransformResolver,
        pair: &CandidatePair,
        elapsed_ms: f32,
    ) -> bool {
        let Some((obb_a, obb_b)) = obbs(nodes, pair) else {
            return false;
        };
        let node_a = &nodes[pair.a.node];
        let node_b = &nodes[pair.b.node];
        let (position_a, position_b) = (*node_a.position(), *node_b.position());
        let displacement_a = node_a.frame_displacement();
        let displacement_b = node_b.frame_displacement();

        let combined = displacement_a.magnitude() + displacement_b.magnitude();
        let steps = sweep_steps(self.steps_per_unit, combined);
        let max_fraction = if elapsed_ms > 0.0 {
            (self.fixed_time_step_ms / elapsed_ms).min(1.0)
        } else {
            1.0
        };

        for step in 0..=steps {
            let fraction = (step as f32 / steps as f32).min(max_fraction);
            let back_a = clamp_length(displacement_a * fraction, self.max_backstep);
            let back_b = clamp_length(displacement_b * fraction, self.max_backstep);

            let Some(hit) = test_obb_pair(&obb_a.translated(&-back_a), &obb_b.translated(&-back_b)) else {
                continue;
            };

            let contact = Contact {
                a: pair.a,
                b: pair.b,
                mtv: hit.mtv(),
                base_a: position_a - back_a,
                base_b: position_b - back_b,
            };
            // One correction per pair per frame
            return offset_nodes(nodes, resolver, &contact);
        }
        false
    }
}

fn obbs(nodes: &NodeTable, pair: &CandidatePair) -> Option<(Obb, Obb)> {
    Some((*nodes.primitive(pair.a)?.obb(), *nodes.primitive(pair.b)?.obb()))
}

/// `ceil(steps_per_unit * combined)`, at least 1
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sweep_steps(steps_per_unit: f32, combined_displacement: f32) -> usize {
    let steps = (steps_per_unit * combined_displacement).ceil();
    if steps.is_finite() && steps >= 1.0 {
        steps as usize
    } else {
        1
    }
}
