//! Render-ready per-frame buffers
//!
//! Everything the renderer needs after an update, laid out for direct upload.
//! Matrices are column-major `[[f32; 4]; 4]` (one inner array per column).

use crate::animation::SkinKey;
use crate::debug::DebugLine;
use crate::foundation::math::{Mat4, Vec3};
use crate::scene::node::Primitive;
use crate::scene::node_table::RenderableEntry;

/// Column-major 4x4 matrix as uploaded to the GPU
pub type GpuMatrix = [[f32; 4]; 4];

/// Convert a matrix to its upload layout
pub fn to_gpu_matrix(matrix: &Mat4) -> GpuMatrix {
    (*matrix).into()
}

fn to_array(v: &Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

/// World-space bounds of one primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveBounds {
    /// Which primitive these bounds belong to
    pub entry: RenderableEntry,
    /// OBB corners in corner-index order
    pub obb_corners: [[f32; 3]; 8],
    /// AABB minimum corner
    pub aabb_min: [f32; 3],
    /// AABB maximum corner
    pub aabb_max: [f32; 3],
}

impl PrimitiveBounds {
    /// Rows per primitive in [`FrameOutput::bounds_buffer`]
    pub const PACKED_ROWS: usize = 10;

    pub(crate) fn capture(entry: RenderableEntry, primitive: &Primitive) -> Self {
        Self {
            entry,
            obb_corners: primitive.obb().corners.map(|c| to_array(&c)),
            aabb_min: to_array(&primitive.aabb().min),
            aabb_max: to_array(&primitive.aabb().max),
        }
    }

    fn packed_rows(&self) -> impl Iterator<Item = [f32; 4]> + '_ {
        self.obb_corners
            .iter()
            .chain([&self.aabb_min, &self.aabb_max])
            .map(|p| [p[0], p[1], p[2], 1.0])
    }
}

/// Joint matrices of one skin
#[derive(Debug, Clone, PartialEq)]
pub struct SkinMatrices {
    /// Skin these matrices belong to
    pub skin: SkinKey,
    /// `world(joint) * inverse_bind` per joint, in joint order
    pub matrices: Vec<GpuMatrix>,
}

impl SkinMatrices {
    /// Byte view for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }
}

/// Output of one scene update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    /// World matrix per node, in node order
    pub world_matrices: Vec<GpuMatrix>,
    /// Inverse-transpose of the world matrix per node (identity when singular)
    pub normal_matrices: Vec<GpuMatrix>,
    /// Bounds per primitive, in node then primitive order
    pub primitive_bounds: Vec<PrimitiveBounds>,
    /// Joint matrices per registered skin
    pub joint_matrices: Vec<SkinMatrices>,
    /// Debug line list (empty unless debug drawing is enabled)
    pub debug_lines: Vec<DebugLine>,
    /// Broad-phase candidate pairs this frame
    pub candidate_pairs: usize,
    /// Whether collision response moved any node this frame
    pub nodes_adjusted: bool,
}

impl FrameOutput {
    /// World matrix buffer as bytes
    pub fn world_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.world_matrices)
    }

    /// Normal matrix buffer as bytes
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normal_matrices)
    }

    /// Bounds packed as `vec4` rows: 8 OBB corners then AABB min and max
    /// per primitive, `w = 1`
    pub fn bounds_buffer(&self) -> Vec<[f32; 4]> {
        self.primitive_bounds
            .iter()
            .flat_map(PrimitiveBounds::packed_rows)
            .collect()
    }
}
