//! Physics: motion integration and two-phase collision
//!
//! The collision detection system is split into two phases. The broad phase
//! finds primitive pairs whose world AABBs overlap; the narrow phase runs an
//! exact separating axis test on those pairs and pushes overlapping nodes
//! apart.

pub mod motion;
pub mod broad_phase;
pub mod sat;
pub mod narrow_phase;
pub mod resolution;

pub use broad_phase::{BroadPhase, CandidatePair};
pub use narrow_phase::NarrowPhase;
pub use resolution::{offset_nodes, Contact};
pub use sat::{test_obb_pair, SatResult};
pub use crate::scene::RenderableEntry;
