//! Skins: joint sets with their inverse bind matrices

use crate::foundation::math::Mat4;
use crate::scene::{NodeIndex, NodeTable};
use crate::SceneError;

/// Ordered joint list plus one inverse bind matrix per joint
///
/// Joint `i` of the skin corresponds to joint index `i` in the skinning shader.
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    /// Skin name
    pub name: String,
    joints: Vec<NodeIndex>,
    inverse_bind_matrices: Vec<Mat4>,
}

impl Skin {
    /// Create a skin, checking there is one inverse bind matrix per joint
    pub fn new(
        name: impl Into<String>,
        joints: Vec<NodeIndex>,
        inverse_bind_matrices: Vec<Mat4>,
    ) -> Result<Self, SceneError> {
        if joints.len() != inverse_bind_matrices.len() {
            return Err(SceneError::SkinMismatch {
                joints: joints.len(),
                matrices: inverse_bind_matrices.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            joints,
            inverse_bind_matrices,
        })
    }

    /// Joint node indices
    pub fn joints(&self) -> &[NodeIndex] {
        &self.joints
    }

    /// Inverse bind matrices in joint order
    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind_matrices
    }

    /// `world(joint) * inverse_bind` for every joint
    ///
    /// World matrices must already be resolved for this frame.
    pub fn joint_matrices(&self, nodes: &NodeTable) -> Vec<Mat4> {
        self.joints
            .iter()
            .zip(&self.inverse_bind_matrices)
            .map(|(&joint, inverse_bind)| match nodes.get(joint) {
                Some(node) => node.world_matrix() * inverse_bind,
                None => Mat4::identity(),
            })
            .collect()
    }
}
