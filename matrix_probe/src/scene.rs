//! Scene description loaded by the probe
//!
//! Any file the `Config` loader understands works (`.toml` or `.ron`). Run
//! the probe with `--dump-scene <path>` to get a template.

use render_matrices::foundation::math::{utils, Mat3, Quat, Transform, Vec3};
use render_matrices::{
    Config, InstanceDescription, LightPose, MatrixConfig, ProjectionDescription,
    ProjectiveLightDescription,
};
use serde::{Deserialize, Serialize};

/// The camera every pass renders through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDescription {
    /// Camera placement
    pub pose: LightPose,
    /// Camera projection
    pub projection: ProjectionDescription,
}

/// An instance with a name for log output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedInstance {
    /// Label used in log lines
    pub name: String,
    /// Placement and UV transform
    pub instance: InstanceDescription,
}

/// A projective light with a name for log output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedLight {
    /// Label used in log lines
    pub name: String,
    /// Pose and projection of the light
    pub light: ProjectiveLightDescription,
}

/// Everything one probe run computes matrices for
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Matrix computation settings
    pub config: MatrixConfig,
    /// Observer camera
    pub camera: CameraDescription,
    /// Instances drawn by the opaque pass and every projective light
    pub instances: Vec<NamedInstance>,
    /// Lights that project onto the instances
    pub projective_lights: Vec<NamedLight>,
}

impl Config for SceneDescription {}

impl Default for SceneDescription {
    /// A teapot, a scaled crate, a flattened decal and one spotlight
    fn default() -> Self {
        let teapot = Transform::from_position_rotation(
            Vec3::new(0.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(30.0)),
        );
        let crate_box = Transform::from_position(Vec3::new(3.0, 0.5, -2.0)).with_scale(Vec3::new(1.0, 1.0, 2.0));
        let decal = Transform::from_position(Vec3::new(-2.0, 0.0, 1.0)).with_scale(Vec3::new(1.0, 0.0, 1.0));

        Self {
            config: MatrixConfig::default(),
            camera: CameraDescription {
                pose: LightPose::look_at(Vec3::new(2.0, 2.0, 10.0), Vec3::zeros(), Vec3::y()),
                projection: ProjectionDescription::perspective_degrees(45.0, 800.0 / 600.0, 0.1, 100.0),
            },
            instances: vec![
                NamedInstance {
                    name: "teapot".to_string(),
                    instance: InstanceDescription::from_transform(teapot),
                },
                NamedInstance {
                    name: "crate".to_string(),
                    instance: InstanceDescription::from_transform(crate_box)
                        .with_uv_matrix(Mat3::new_scaling(2.0)),
                },
                NamedInstance {
                    name: "decal".to_string(),
                    instance: InstanceDescription::from_transform(decal),
                },
            ],
            projective_lights: vec![NamedLight {
                name: "spotlight".to_string(),
                light: ProjectiveLightDescription::new(
                    LightPose::look_at(Vec3::new(0.0, 8.0, 4.0), Vec3::zeros(), Vec3::y()),
                    ProjectionDescription::perspective_degrees(40.0, 1.0, 1.0, 30.0),
                ),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene_is_valid() {
        let scene = SceneDescription::default();
        assert!(scene.camera.projection.validate().is_ok());
        assert!(scene.projective_lights.iter().all(|l| l.light.projection.validate().is_ok()));
        assert_eq!(scene.instances.len(), 3);
    }

    #[test]
    fn test_scene_survives_ron_file() {
        let path = std::env::temp_dir().join(format!("matrix_probe_scene_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let scene = SceneDescription::default();
        scene.save_to_file(&path).unwrap();
        let loaded = SceneDescription::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.instances.len(), scene.instances.len());
        assert_eq!(loaded.instances[1].name, "crate");
        assert_eq!(loaded.config, scene.config);
        assert_eq!(loaded.camera.projection, scene.camera.projection);
    }
}
