//! Debug module for visualization
//!
//! Bounding volume line lists produced when debug drawing is enabled.

pub mod draw;
pub mod collision_debug;

pub use draw::{DebugDrawSystem, DebugLine};
pub use collision_debug::{CollisionDebugColors, CollisionDebugVisualizer};
