//! Uniform block layouts for shader upload
//!
//! Matrices are copied verbatim, column-major. Every `mat3` is stored as
//! three `vec4` columns so the structs match std140 without manual padding,
//! and `bytemuck::bytes_of` gives the bytes to hand to a buffer.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat3, Mat4};

/// std140 `mat4`
pub type GpuMat4 = [[f32; 4]; 4];

/// std140 `mat3`, each column padded to a `vec4`
pub type GpuMat3 = [[f32; 4]; 3];

/// Column-major copy of a 4x4 matrix
pub fn gpu_mat4(matrix: &Mat4) -> GpuMat4 {
    (*matrix).into()
}

/// Column-major copy of a 3x3 matrix with padded columns
pub fn gpu_mat3(matrix: &Mat3) -> GpuMat3 {
    let columns: [[f32; 3]; 3] = (*matrix).into();
    columns.map(|[x, y, z]| [x, y, z, 0.0])
}

/// Per-observer uniform data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObserverUniforms {
    /// World to eye
    pub view: GpuMat4,
    /// Eye to world
    pub view_inverse: GpuMat4,
    /// Eye to clip
    pub projection: GpuMat4,
    /// Clip to eye
    pub projection_inverse: GpuMat4,
}

impl ObserverUniforms {
    /// Pack observer matrices
    pub fn new(view: &Mat4, view_inverse: &Mat4, projection: &Mat4, projection_inverse: &Mat4) -> Self {
        Self {
            view: gpu_mat4(view),
            view_inverse: gpu_mat4(view_inverse),
            projection: gpu_mat4(projection),
            projection_inverse: gpu_mat4(projection_inverse),
        }
    }
}

/// Per-instance uniform data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceUniforms {
    /// Object to world
    pub model: GpuMat4,
    /// Object to eye
    pub model_view: GpuMat4,
    /// Normal transform
    pub normal: GpuMat3,
    /// Texture coordinate transform
    pub uv: GpuMat3,
}

impl InstanceUniforms {
    /// Pack instance matrices
    pub fn new(model: &Mat4, model_view: &Mat4, normal: &Mat3, uv: &Mat3) -> Self {
        Self {
            model: gpu_mat4(model),
            model_view: gpu_mat4(model_view),
            normal: gpu_mat3(normal),
            uv: gpu_mat3(uv),
        }
    }
}

/// Per-light uniform data for projective lights
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ProjectiveLightUniforms {
    /// World to light eye
    pub projective_view: GpuMat4,
    /// Light eye to clip
    pub projective_projection: GpuMat4,
}

impl ProjectiveLightUniforms {
    /// Pack projective light matrices
    pub fn new(projective_view: &Mat4, projective_projection: &Mat4) -> Self {
        Self {
            projective_view: gpu_mat4(projective_view),
            projective_projection: gpu_mat4(projective_projection),
        }
    }
}

/// Per-instance uniform data while rendering under a projective light
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ProjectiveInstanceUniforms {
    /// Observer-relative instance matrices
    pub instance: InstanceUniforms,
    /// Object to light eye
    pub projective_model_view: GpuMat4,
    /// Light eye to clip
    pub projective_projection: GpuMat4,
}

impl ProjectiveInstanceUniforms {
    /// Pack instance matrices together with the light-relative ones
    pub fn new(instance: &InstanceUniforms, projective_model_view: &Mat4, projective_projection: &Mat4) -> Self {
        Self {
            instance: *instance,
            projective_model_view: gpu_mat4(projective_model_view),
            projective_projection: gpu_mat4(projective_projection),
        }
    }
}
