//! # Scene Engine
//!
//! The per-frame scene update pipeline of a real-time 3D renderer: everything
//! that happens to the scene between input and draw submission.
//!
//! ## Features
//!
//! - **Transform Resolution**: world matrices from a node table with static,
//!   moveable-root, free and joint node semantics
//! - **Skeletal Animation**: STEP/LINEAR keyframe channels and skin joint matrices
//! - **Bounding Volumes**: per-primitive OBB, AABB and face normals
//! - **Collision**: exhaustive AABB broad phase, discrete and swept SAT narrow
//!   phase with mass/velocity weighted resolution and step climbing
//! - **Render Buffers**: world, normal and bounding buffers ready for upload
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::config::MotionGate;
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut nodes = NodeTable::new();
//!     let floor = nodes.push(
//!         SceneNode::new("Floor")
//!             .with_movement_class(MovementClass::Static)
//!             .with_primitive(Primitive::from_bounds(
//!                 Vec3::new(-10.0, -0.5, -10.0),
//!                 Vec3::new(10.0, 0.0, 10.0),
//!             )),
//!     );
//!     let player = nodes.push(
//!         SceneNode::new(PLAYER_NAME)
//!             .with_mass(1.0)?
//!             .with_position(Vec3::new(0.0, 2.0, 0.0))
//!             .with_primitive(Primitive::from_bounds(
//!                 Vec3::new(-0.3, 0.0, -0.3),
//!                 Vec3::new(0.3, 1.8, 0.3),
//!             )),
//!     );
//!     let _ = (floor, player);
//!
//!     // Either moved node triggers a test, so the player lands on the static floor
//!     let config = SimulationConfig::default().with_motion_gate(MotionGate::Either);
//!     let mut coordinator = SceneCoordinator::new(nodes, config)?;
//!     let frame = coordinator.update(16.0);
//!     log::info!("adjusted: {}", frame.nodes_adjusted);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scene;
pub mod animation;
pub mod physics;
pub mod debug;

mod error;

pub use error::SceneError;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        SceneError,
        animation::{
            AnimationChannel, AnimationClip, ChannelPath, ClipKey, InterpolationMode,
            KeyframeTrack, Skin, SkinKey, SkeletalAnimator,
        },
        config::{CollisionMode, Config, ConfigError, SimulationConfig},
        foundation::math::{Mat4, Point3, Quat, Transform, Vec3},
        physics::{BroadPhase, CandidatePair, NarrowPhase, RenderableEntry},
        scene::{
            Aabb, EntityKind, FrameOutput, MovementClass, NodeFlags, NodeIndex, NodeTable, Obb,
            Primitive, SceneCoordinator, SceneNode, PLAYER_NAME,
        },
    };
}
