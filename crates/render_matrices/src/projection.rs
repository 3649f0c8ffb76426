//! Projection resolver
//!
//! Turns a camera or light projection description into a 4x4 eye-to-clip
//! matrix. The formulas are the classic `glFrustum` / `glOrtho` ones; the
//! depth row is remapped when the configured clip depth is `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::config::DepthRange;
use crate::error::{MatrixError, MatrixResult};
use crate::foundation::math::{utils, Mat4};

/// Projection parameters for an observer or a projective light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectionDescription {
    /// Symmetric perspective from a vertical field of view
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
        /// Width divided by height
        aspect: f32,
        /// Distance to the near plane (> 0)
        near: f32,
        /// Distance to the far plane (> near)
        far: f32,
    },
    /// Perspective from explicit near-plane extents
    Frustum {
        /// Left extent at the near plane
        left: f32,
        /// Right extent at the near plane
        right: f32,
        /// Bottom extent at the near plane
        bottom: f32,
        /// Top extent at the near plane
        top: f32,
        /// Distance to the near plane (> 0)
        near: f32,
        /// Distance to the far plane (> near)
        far: f32,
    },
    /// Parallel projection of an axis-aligned box
    Orthographic {
        /// Left plane
        left: f32,
        /// Right plane
        right: f32,
        /// Bottom plane
        bottom: f32,
        /// Top plane
        top: f32,
        /// Near plane
        near: f32,
        /// Far plane
        far: f32,
    },
}

impl ProjectionDescription {
    /// Perspective projection with the field of view given in degrees
    pub fn perspective_degrees(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::Perspective {
            fov_y: utils::deg_to_rad(fov_y_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Symmetric frustum with the given half-extents at the near plane
    pub fn symmetric_frustum(half_width: f32, half_height: f32, near: f32, far: f32) -> Self {
        Self::Frustum {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
            near,
            far,
        }
    }

    /// Near and far plane distances
    pub const fn near_far(&self) -> (f32, f32) {
        match *self {
            Self::Perspective { near, far, .. }
            | Self::Frustum { near, far, .. }
            | Self::Orthographic { near, far, .. } => (near, far),
        }
    }

    /// Check that the description yields a finite, invertible matrix
    pub fn validate(&self) -> MatrixResult<()> {
        let (near, far) = self.near_far();

        let values = match *self {
            Self::Perspective { fov_y, aspect, near, far } => vec![fov_y, aspect, near, far],
            Self::Frustum { left, right, bottom, top, near, far }
            | Self::Orthographic { left, right, bottom, top, near, far } => {
                vec![left, right, bottom, top, near, far]
            }
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err(invalid("parameters must be finite"));
        }

        match *self {
            Self::Perspective { fov_y, aspect, .. } => {
                if fov_y <= 0.0 || fov_y >= std::f32::consts::PI {
                    return Err(invalid(format!("field of view {fov_y} must be in (0, pi)")));
                }
                if aspect <= 0.0 {
                    return Err(invalid(format!("aspect ratio {aspect} must be positive")));
                }
                if near <= 0.0 {
                    return Err(invalid(format!("near plane {near} must be positive")));
                }
            }
            Self::Frustum { left, right, bottom, top, .. } => {
                if near <= 0.0 {
                    return Err(invalid(format!("near plane {near} must be positive")));
                }
                check_extents(left, right, bottom, top)?;
            }
            Self::Orthographic { left, right, bottom, top, .. } => {
                check_extents(left, right, bottom, top)?;
            }
        }

        if far <= near {
            return Err(invalid(format!("far plane {far} must be beyond near plane {near}")));
        }
        Ok(())
    }

    /// Eye-to-clip matrix for this description
    pub fn to_matrix(&self, depth_range: DepthRange) -> Mat4 {
        projection_matrix(self, depth_range)
    }
}

fn invalid(reason: impl Into<String>) -> MatrixError {
    MatrixError::InvalidProjection { reason: reason.into() }
}

fn check_extents(left: f32, right: f32, bottom: f32, top: f32) -> MatrixResult<()> {
    if right == left {
        return Err(invalid("left and right planes coincide"));
    }
    if top == bottom {
        return Err(invalid("bottom and top planes coincide"));
    }
    Ok(())
}

/// Eye-to-clip matrix for a projection description
pub fn projection_matrix(description: &ProjectionDescription, depth_range: DepthRange) -> Mat4 {
    let matrix = match *description {
        ProjectionDescription::Perspective { fov_y, aspect, near, far } => {
            let top = near * (fov_y * 0.5).tan();
            let right = top * aspect;
            frustum(-right, right, -top, top, near, far)
        }
        ProjectionDescription::Frustum { left, right, bottom, top, near, far } => {
            frustum(left, right, bottom, top, near, far)
        }
        ProjectionDescription::Orthographic { left, right, bottom, top, near, far } => {
            orthographic(left, right, bottom, top, near, far)
        }
    };

    match depth_range {
        DepthRange::NegativeOneToOne => matrix,
        DepthRange::ZeroToOne => zero_to_one_remap() * matrix,
    }
}

/// Perspective matrix from near-plane extents, clip depth `[-1, 1]`
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let width = right - left;
    let height = top - bottom;
    let depth = far - near;

    let mut result = Mat4::zeros();
    result[(0, 0)] = (2.0 * near) / width;
    result[(1, 1)] = (2.0 * near) / height;
    result[(0, 2)] = (right + left) / width;
    result[(1, 2)] = (top + bottom) / height;
    result[(2, 2)] = -(far + near) / depth;
    result[(2, 3)] = -(2.0 * far * near) / depth;
    result[(3, 2)] = -1.0;
    result
}

/// Orthographic matrix, clip depth `[-1, 1]`
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let width = right - left;
    let height = top - bottom;
    let depth = far - near;

    let mut result = Mat4::identity();
    result[(0, 0)] = 2.0 / width;
    result[(1, 1)] = 2.0 / height;
    result[(2, 2)] = -2.0 / depth;
    result[(0, 3)] = -(right + left) / width;
    result[(1, 3)] = -(top + bottom) / height;
    result[(2, 3)] = -(far + near) / depth;
    result
}

/// Maps clip depth `[-1, 1]` onto `[0, 1]`
fn zero_to_one_remap() -> Mat4 {
    Mat4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}
