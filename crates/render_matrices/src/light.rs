//! Projective light descriptions
//!
//! A projective light is a light that also acts as a second camera. Its view
//! and projection come from its own pose and projection parameters and never
//! from the observer.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::projection::ProjectionDescription;

/// Position and orientation of a camera-like object in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightPose {
    /// World space position
    pub position: Vec3,
    /// World space orientation; identity looks down -Z with +Y up
    pub orientation: Quat,
}

impl Default for LightPose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
        }
    }
}

impl LightPose {
    /// Create a pose from position and orientation
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    /// Pose at `eye` looking towards `target`
    ///
    /// `up` must not be parallel to `target - eye`. Degenerate input yields the
    /// identity orientation.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = target - eye;
        let orientation = if forward.norm_squared() > f32::EPSILON
            && forward.cross(&up).norm_squared() > f32::EPSILON
        {
            // face_towards aligns +Z with the direction, so aim it backwards
            Quat::face_towards(&-forward, &up)
        } else {
            log::warn!("Degenerate look_at (eye {:?}, target {:?}, up {:?}), using identity orientation", eye, target, up);
            Quat::identity()
        };
        Self::new(eye, orientation)
    }

    /// Pose-to-world matrix `T * R`
    pub fn to_world_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position) * self.orientation.to_homogeneous()
    }

    /// World-to-eye matrix, the inverse of [`Self::to_world_matrix`]
    pub fn view_matrix(&self) -> Mat4 {
        self.orientation.inverse().to_homogeneous() * Mat4::new_translation(&-self.position)
    }
}

/// Everything a scope needs to compute a projective light's matrices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectiveLightDescription {
    /// Where the light sits and where it points
    pub pose: LightPose,
    /// The light's own projection
    pub projection: ProjectionDescription,
}

impl ProjectiveLightDescription {
    /// Create a projective light description
    pub fn new(pose: LightPose, projection: ProjectionDescription) -> Self {
        Self { pose, projection }
    }
}
