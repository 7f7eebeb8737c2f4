//! Scene coordinator: owns the scene and runs the per-frame pipeline
//!
//! Frame order:
//!
//! ```text
//! record previous positions → integrate motion → animate
//!      ↓
//! resolve world transforms → update bounding volumes
//!      ↓
//! broad phase → narrow phase → (if adjusted) re-resolve transforms and bounds
//!      ↓
//! render-ready buffers
//! ```
//!
//! The coordinator is the only mutator of the node table during an update;
//! each phase borrows the table explicitly.

use crate::animation::{AnimationClip, ClipKey, SkeletalAnimator, Skin, SkinKey};
use crate::config::{CollisionMode, SimulationConfig};
use crate::debug::CollisionDebugVisualizer;
use crate::foundation::math::{normal_matrix, Mat4};
use crate::physics::{motion, BroadPhase, NarrowPhase};
use crate::scene::bounds::update_all_bounds;
use crate::scene::frame::{to_gpu_matrix, FrameOutput, PrimitiveBounds, SkinMatrices};
use crate::scene::node::{NodeIndex, SceneNode};
use crate::scene::node_table::NodeTable;
use crate::scene::transform_resolver::TransformResolver;
use crate::SceneError;

/// Owns the node table, animation state and per-frame scratch buffers
#[derive(Debug)]
pub struct SceneCoordinator {
    nodes: NodeTable,
    config: SimulationConfig,
    resolver: TransformResolver,
    animator: SkeletalAnimator,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    debug_visualizer: CollisionDebugVisualizer,
    frame_count: u64,
}

impl SceneCoordinator {
    /// Take ownership of a scene after validating it and the configuration
    ///
    /// World transforms and bounding volumes are resolved immediately so the
    /// scene is queryable before the first update.
    pub fn new(nodes: NodeTable, config: SimulationConfig) -> Result<Self, SceneError> {
        config.validate()?;
        nodes.validate()?;

        let mut coordinator = Self {
            animator: SkeletalAnimator::new(config.animation_playback_speed),
            narrow_phase: NarrowPhase::from_config(&config),
            nodes,
            config,
            resolver: TransformResolver::new(),
            broad_phase: BroadPhase::new(),
            debug_visualizer: CollisionDebugVisualizer::new(),
            frame_count: 0,
        };
        coordinator.refresh_world_state();

        log::info!(
            "Scene coordinator ready: {} nodes, {} primitives, collision mode {}",
            coordinator.nodes.len(),
            coordinator.nodes.primitive_count(),
            coordinator.config.collision_mode
        );
        Ok(coordinator)
    }

    /// Run one frame of the pipeline
    ///
    /// Never fails: numeric degeneracies are recovered inside each phase.
    /// A negative or non-finite `elapsed_ms` is treated as zero.
    pub fn update(&mut self, elapsed_ms: f32) -> FrameOutput {
        let elapsed_ms = if elapsed_ms.is_finite() && elapsed_ms >= 0.0 {
            elapsed_ms
        } else {
            log::warn!("Ignoring invalid frame delta {elapsed_ms} ms");
            0.0
        };

        motion::record_previous_positions(&mut self.nodes);
        motion::integrate_all(&mut self.nodes, elapsed_ms, &self.config);
        self.animator.update(elapsed_ms, &mut self.nodes);
        self.refresh_world_state();

        let candidate_pairs = self.broad_phase.find_candidates(&self.nodes).len();
        let nodes_adjusted = if self.config.collision_mode == CollisionMode::Disabled {
            false
        } else {
            self.narrow_phase.process(
                &mut self.nodes,
                &mut self.resolver,
                self.broad_phase.candidates(),
                elapsed_ms,
            )
        };
        if nodes_adjusted {
            self.refresh_world_state();
        }

        self.frame_count += 1;
        log::debug!(
            "Frame {}: {:.2} ms, {} candidate pairs, adjusted = {}",
            self.frame_count,
            elapsed_ms,
            candidate_pairs,
            nodes_adjusted
        );

        self.build_output(candidate_pairs, nodes_adjusted)
    }

    fn refresh_world_state(&mut self) {
        self.resolver.resolve_all(&mut self.nodes);
        update_all_bounds(&mut self.nodes);
    }

    fn build_output(&mut self, candidate_pairs: usize, nodes_adjusted: bool) -> FrameOutput {
        let world_matrices = self.nodes.iter().map(|n| to_gpu_matrix(n.world_matrix())).collect();

        let normal_matrices = self
            .nodes
            .iter()
            .map(|node| {
                let normal = normal_matrix(node.world_matrix()).unwrap_or_else(|| {
                    log::warn!("Singular world matrix on '{}', using identity normal matrix", node.name());
                    Mat4::identity()
                });
                to_gpu_matrix(&normal)
            })
            .collect();

        let primitive_bounds = self
            .nodes
            .renderable_entries()
            .into_iter()
            .filter_map(|entry| Some(PrimitiveBounds::capture(entry, self.nodes.primitive(entry)?)))
            .collect();

        let joint_matrices = self
            .animator
            .joint_matrices(&self.nodes)
            .into_iter()
            .map(|(skin, matrices)| SkinMatrices {
                skin,
                matrices: matrices.iter().map(to_gpu_matrix).collect(),
            })
            .collect();

        let debug_lines = if self.config.debug_draw {
            self.debug_visualizer
                .build_lines(&self.nodes, self.broad_phase.candidates())
        } else {
            Vec::new()
        };

        FrameOutput {
            world_matrices,
            normal_matrices,
            primitive_bounds,
            joint_matrices,
            debug_lines,
            candidate_pairs,
            nodes_adjusted,
        }
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), SceneError> {
        config.validate()?;
        self.narrow_phase = NarrowPhase::from_config(&config);
        self.animator.set_playback_speed(config.animation_playback_speed);
        log::info!("Collision mode set to {}", config.collision_mode);
        self.config = config;
        Ok(())
    }

    /// Current configuration
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Add an animation clip
    pub fn add_clip(&mut self, clip: AnimationClip) -> Result<ClipKey, SceneError> {
        self.animator.add_clip(clip, &self.nodes)
    }

    /// Remove an animation clip
    pub fn remove_clip(&mut self, key: ClipKey) -> Option<AnimationClip> {
        self.animator.remove_clip(key)
    }

    /// Pause or resume a clip; returns false for an unknown key
    pub fn set_clip_playing(&mut self, key: ClipKey, playing: bool) -> bool {
        self.animator.set_playing(key, playing)
    }

    /// Register a skin; its joints switch to joint transform resolution
    pub fn add_skin(&mut self, skin: Skin) -> Result<SkinKey, SceneError> {
        let key = self.animator.add_skin(skin, &mut self.nodes)?;
        self.refresh_world_state();
        Ok(key)
    }

    /// Animator state
    pub const fn animator(&self) -> &SkeletalAnimator {
        &self.animator
    }

    /// Ask a node to jump on the next update (only the player acts on it)
    pub fn request_jump(&mut self, index: NodeIndex) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(index).ok_or(SceneError::NodeOutOfRange(index))?;
        node.motion.jump_requested = true;
        Ok(())
    }

    /// The node table
    pub const fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    /// Mutable node table for input and scripts between updates
    ///
    /// Parent links should be changed through [`NodeTable::set_parent`] so the
    /// hierarchy stays acyclic.
    pub fn nodes_mut(&mut self) -> &mut NodeTable {
        &mut self.nodes
    }

    /// Node at `index`
    pub fn node(&self, index: NodeIndex) -> Option<&SceneNode> {
        self.nodes.get(index)
    }

    /// Number of completed updates
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
