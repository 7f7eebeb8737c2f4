//! Math utilities and types
//!
//! Provides fundamental math types for the scene pipeline. All helpers here
//! are value-returning: nothing writes through an output parameter.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type (column-major, column vectors)
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// World up direction (Y-up right-handed)
pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from all three components
    pub const fn from_parts(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Create a transform from a transformation matrix
    ///
    /// Shear is lost; a zero scale axis yields an identity rotation.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        let scale_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude();
        let scale_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude();
        let scale_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude();
        let scale = Vec3::new(scale_x, scale_y, scale_z);

        let rotation = if scale_x > 0.0 && scale_y > 0.0 && scale_z > 0.0 {
            let rotation_matrix = Mat3::new(
                matrix.m11 / scale_x, matrix.m12 / scale_y, matrix.m13 / scale_z,
                matrix.m21 / scale_x, matrix.m22 / scale_y, matrix.m23 / scale_z,
                matrix.m31 / scale_x, matrix.m32 / scale_y, matrix.m33 / scale_z,
            );
            Quat::from_matrix(&rotation_matrix)
        } else {
            Quat::identity()
        };

        Self {
            position,
            rotation,
            scale,
        }
    }
}

/// Transform a point by a 4x4 matrix
#[inline]
pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(*point)).coords
}

/// Inverse-transpose of a world matrix, used to transform normals
///
/// Returns `None` when the matrix is singular (for example a zero scale axis).
pub fn normal_matrix(matrix: &Mat4) -> Option<Mat4> {
    matrix.try_inverse().map(|inverse| inverse.transpose())
}

/// Normalize a vector, or `None` if it is too short to carry a direction
#[inline]
pub fn try_direction(vector: &Vec3, min_length: f32) -> Option<Vec3> {
    vector.try_normalize(min_length)
}

/// Clamp the length of a vector to at most `max_length`
pub fn clamp_length(vector: Vec3, max_length: f32) -> Vec3 {
    let length = vector.magnitude();
    if length > max_length && length > 0.0 {
        vector * (max_length / length)
    } else {
        vector
    }
}

/// Math utility functions
pub mod utils {
    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}
