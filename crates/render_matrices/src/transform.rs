//! Transform resolver
//!
//! Pure functions turning an instance description into the per-instance
//! matrices: model, model-view and normal. Nothing here holds state.

use serde::{Deserialize, Serialize};

use crate::config::DegenerateNormalPolicy;
use crate::foundation::math::{upper_left_3x3, Mat3, Mat4, Transform};

/// How an instance places itself in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InstanceTransform {
    /// Translation, rotation and scale, composed as `T * R * S`
    Trs(Transform),
    /// An explicit object-to-world matrix, used as-is
    Matrix(Mat4),
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::Trs(Transform::identity())
    }
}

impl InstanceTransform {
    /// Object-to-world matrix for this transform
    pub fn model(&self) -> Mat4 {
        match self {
            Self::Trs(transform) => transform.to_matrix(),
            Self::Matrix(matrix) => *matrix,
        }
    }
}

impl From<Transform> for InstanceTransform {
    fn from(transform: Transform) -> Self {
        Self::Trs(transform)
    }
}

impl From<Mat4> for InstanceTransform {
    fn from(matrix: Mat4) -> Self {
        Self::Matrix(matrix)
    }
}

/// Everything a scope needs to compute one instance's matrices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceDescription {
    /// Object-to-world placement
    pub transform: InstanceTransform,
    /// Texture coordinate transform, passed through untouched
    pub uv_matrix: Mat3,
}

impl Default for InstanceDescription {
    fn default() -> Self {
        Self {
            transform: InstanceTransform::default(),
            uv_matrix: Mat3::identity(),
        }
    }
}

impl InstanceDescription {
    /// Create from a TRS transform with an identity UV matrix
    pub fn from_transform(transform: Transform) -> Self {
        Self {
            transform: InstanceTransform::Trs(transform),
            ..Default::default()
        }
    }

    /// Create from an explicit model matrix with an identity UV matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            transform: InstanceTransform::Matrix(matrix),
            ..Default::default()
        }
    }

    /// Builder pattern: Set UV matrix
    #[must_use]
    pub fn with_uv_matrix(mut self, uv_matrix: Mat3) -> Self {
        self.uv_matrix = uv_matrix;
        self
    }
}

/// Whether a normal matrix came from a real inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalOutcome {
    /// The upper-left 3x3 was invertible
    Inverted,
    /// The upper-left 3x3 was singular and the fallback was used
    Degenerate,
}

/// Object-to-world matrix of a transform
pub fn model(transform: &InstanceTransform) -> Mat4 {
    transform.model()
}

/// `view * model`
pub fn model_view(view: &Mat4, model: &Mat4) -> Mat4 {
    view * model
}

/// `transpose(inverse(upper_left_3x3(model_view)))`
///
/// A singular upper-left block means a degenerate (zero-scale) instance; the
/// policy decides the replacement and the outcome reports that it happened.
pub fn normal_matrix(model_view: &Mat4, policy: DegenerateNormalPolicy) -> (Mat3, NormalOutcome) {
    let upper = upper_left_3x3(model_view);

    match upper.try_inverse() {
        Some(inverse) if inverse.iter().all(|v| v.is_finite()) => {
            (inverse.transpose(), NormalOutcome::Inverted)
        }
        _ => {
            let fallback = match policy {
                DegenerateNormalPolicy::Identity => Mat3::identity(),
                DegenerateNormalPolicy::Zeroed => upper.transpose(),
            };
            (fallback, NormalOutcome::Degenerate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Vec3};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_explicit_matrix_is_returned_directly() {
        let matrix = Mat4::new(
            1.0, 2.0, 3.0, 4.0,
            5.0, 6.0, 7.0, 8.0,
            9.0, 10.0, 11.0, 12.0,
            0.0, 0.0, 0.0, 1.0,
        );
        assert_eq!(model(&InstanceTransform::Matrix(matrix)), matrix);
    }

    #[test]
    fn test_model_view_applies_model_first() {
        let view = Mat4::new_translation(&Vec3::new(0.0, 0.0, -5.0));
        let model = Mat4::new_scaling(2.0);
        let expected = Mat4::new(
            2.0, 0.0, 0.0, 0.0,
            0.0, 2.0, 0.0, 0.0,
            0.0, 0.0, 2.0, -5.0,
            0.0, 0.0, 0.0, 1.0,
        );
        assert_relative_eq!(model_view(&view, &model), expected, epsilon = EPSILON);
    }

    #[test]
    fn test_normal_matrix_of_rotation_is_the_rotation() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), 0.7);
        let model_view = rotation.to_homogeneous();
        let (normal, outcome) = normal_matrix(&model_view, DegenerateNormalPolicy::Identity);

        assert_eq!(outcome, NormalOutcome::Inverted);
        assert_relative_eq!(normal, upper_left_3x3(&model_view), epsilon = EPSILON);
    }

    #[test]
    fn test_normal_matrix_inverts_non_uniform_scale() {
        let model_view = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 4.0, 0.5));
        let (normal, outcome) = normal_matrix(&model_view, DegenerateNormalPolicy::Identity);

        assert_eq!(outcome, NormalOutcome::Inverted);
        assert_relative_eq!(normal, Mat3::from_diagonal(&Vec3::new(0.5, 0.25, 2.0)), epsilon = EPSILON);
    }

    #[test]
    fn test_singular_model_view_falls_back_to_identity() {
        let model_view = Mat4::from_diagonal(&crate::foundation::math::Vec4::new(0.0, 0.0, 0.0, 3.0));
        let (normal, outcome) = normal_matrix(&model_view, DegenerateNormalPolicy::Identity);

        assert_eq!(outcome, NormalOutcome::Degenerate);
        assert_eq!(normal, Mat3::identity());
        assert!(normal.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_singular_model_view_zeroed_policy() {
        let model_view = Mat4::from_diagonal(&crate::foundation::math::Vec4::new(0.0, 0.0, 0.0, 3.0));
        let (normal, outcome) = normal_matrix(&model_view, DegenerateNormalPolicy::Zeroed);

        assert_eq!(outcome, NormalOutcome::Degenerate);
        assert_eq!(normal, Mat3::zeros());
    }

    #[test]
    fn test_instance_description_defaults() {
        let instance = InstanceDescription::default();
        assert_eq!(instance.uv_matrix, Mat3::identity());
        assert_eq!(instance.transform.model(), Mat4::identity());

        let uv = Mat3::new_scaling(0.5);
        let instance = InstanceDescription::from_matrix(Mat4::new_scaling(3.0)).with_uv_matrix(uv);
        assert_eq!(instance.uv_matrix, uv);
        assert_eq!(instance.transform.model(), Mat4::new_scaling(3.0));
    }
}
