//! Scene-level errors
//!
//! Everything in here is a configuration or construction problem: corrupt
//! asset data, bad configuration files or malformed hierarchies. Numeric
//! degeneracies during a frame are recovered locally and never show up here.

use thiserror::Error;

use crate::config::ConfigError;
use crate::scene::NodeIndex;

/// Errors raised while building or configuring a scene
#[derive(Error, Debug)]
pub enum SceneError {
    /// A mass that is zero, negative or not finite
    #[error("Invalid mass {0}: mass must be positive and finite (use no mass for immovable)")]
    InvalidMass(f32),

    /// A node references a parent that does not exist
    #[error("Node {node} references missing parent {parent}")]
    MissingParent {
        /// Offending node
        node: NodeIndex,
        /// Parent index that is out of range
        parent: NodeIndex,
    },

    /// A node lists itself as its parent
    #[error("Node {0} is its own parent")]
    SelfParent(NodeIndex),

    /// The parent chain of a node loops back on itself
    #[error("Cyclic hierarchy detected at node {0}")]
    CyclicHierarchy(NodeIndex),

    /// An index that does not address a node in the table
    #[error("Node index {0} is out of range")]
    NodeOutOfRange(NodeIndex),

    /// A primitive index that does not exist on its node
    #[error("Node {node} has no primitive {primitive}")]
    PrimitiveOutOfRange {
        /// Node that was addressed
        node: NodeIndex,
        /// Missing primitive index
        primitive: usize,
    },

    /// Keyframe interpolation mode this pipeline does not understand
    #[error("Unknown interpolation mode: {0}")]
    UnknownInterpolation(String),

    /// A keyframe track whose times and values do not line up
    #[error("Malformed keyframe track: {0}")]
    MalformedTrack(String),

    /// A skin whose joint and inverse bind matrix counts differ
    #[error("Skin has {joints} joints but {matrices} inverse bind matrices")]
    SkinMismatch {
        /// Number of joints
        joints: usize,
        /// Number of inverse bind matrices
        matrices: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
