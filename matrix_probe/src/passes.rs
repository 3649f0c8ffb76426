//! Render passes driven through the scope stack
//!
//! Each pass opens the scopes a real renderer would, reads the matrices and
//! packs the uniform blocks. Nothing is drawn; the probe only logs.

use render_matrices::foundation::math::Mat4;
use render_matrices::{Instance, InstanceWithProjective, MatrixError, Observer, ScopeStack};

use crate::scene::{NamedInstance, NamedLight, SceneDescription};

/// Counts collected while rendering one frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Instances drawn by the opaque pass
    pub opaque_instances: usize,
    /// Projective lights whose scope opened
    pub projective_lights: usize,
    /// Instances drawn under a projective light
    pub projected_instances: usize,
    /// Scopes refused with an active or inactive error
    pub skipped: usize,
    /// Total uniform bytes that would be uploaded
    pub uniform_bytes: usize,
}

/// Render one frame of `scene` on `stack`
///
/// # Errors
/// Returns the first error that is not an active/inactive refusal, such as an
/// invalid camera projection.
pub fn render_frame(stack: &ScopeStack, scene: &SceneDescription) -> Result<FrameReport, MatrixError> {
    let view = scene.camera.pose.view_matrix();
    stack.with_observer(view, &scene.camera.projection, |observer| {
        let mut report = FrameReport::default();
        let observer_uniforms = observer.uniforms();
        report.uniform_bytes += bytemuck::bytes_of(&observer_uniforms).len();
        log_matrix("view", &observer.matrix_view());
        log_matrix("projection", &observer.matrix_projection());

        opaque_pass(observer, &scene.instances, &mut report)?;
        for light in &scene.projective_lights {
            projective_pass(observer, light, &scene.instances, &mut report)?;
        }
        Ok(report)
    })
}

fn opaque_pass(observer: &Observer, instances: &[NamedInstance], report: &mut FrameReport) -> Result<(), MatrixError> {
    for named in instances {
        let drawn = observer.with_instance(&named.instance, |instance| {
            Ok::<_, MatrixError>(draw_instance(&named.name, instance))
        });
        match skip_refused(drawn, &named.name)? {
            Some(bytes) => {
                report.opaque_instances += 1;
                report.uniform_bytes += bytes;
            }
            None => report.skipped += 1,
        }
    }
    Ok(())
}

fn projective_pass(
    observer: &Observer,
    named_light: &NamedLight,
    instances: &[NamedInstance],
    report: &mut FrameReport,
) -> Result<(), MatrixError> {
    let lit = observer.with_projective_light(&named_light.light, |light| {
        log::info!("Projective light '{}'", named_light.name);
        log_matrix("projective_view", &light.matrix_projective_view());
        log_matrix("projective_projection", &light.matrix_projective_projection());
        let mut bytes = bytemuck::bytes_of(&light.uniforms()).len();
        let mut drawn = 0;
        let mut skipped = 0;

        for named in instances {
            let result = light.with_instance(&named.instance, |instance| {
                Ok::<_, MatrixError>(draw_projected_instance(&named.name, instance))
            });
            match skip_refused(result, &named.name)? {
                Some(instance_bytes) => {
                    drawn += 1;
                    bytes += instance_bytes;
                }
                None => skipped += 1,
            }
        }
        Ok::<_, MatrixError>((drawn, skipped, bytes))
    });

    match skip_refused(lit, &named_light.name)? {
        Some((drawn, skipped, bytes)) => {
            report.projective_lights += 1;
            report.projected_instances += drawn;
            report.skipped += skipped;
            report.uniform_bytes += bytes;
        }
        None => report.skipped += 1,
    }
    Ok(())
}

fn draw_instance(name: &str, instance: &Instance) -> usize {
    log::info!("Instance '{}'", name);
    log_matrix("model", &instance.matrix_model());
    log_matrix("model_view", &instance.matrix_model_view());
    log::debug!("  normal: {:?}", instance.matrix_normal());
    log::debug!("  uv: {:?}", instance.matrix_uv());
    bytemuck::bytes_of(&instance.uniforms()).len()
}

fn draw_projected_instance(name: &str, instance: &InstanceWithProjective) -> usize {
    log::info!("Projected instance '{}'", name);
    log_matrix("projective_model_view", &instance.matrix_projective_model_view());
    bytemuck::bytes_of(&instance.uniforms()).len()
}

/// Turn active/inactive refusals into `None`, pass everything else through
fn skip_refused<T>(result: Result<T, MatrixError>, name: &str) -> Result<Option<T>, MatrixError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.is_active_error() || error.is_inactive_error() => {
            log::warn!("Skipping '{}': {}", name, error);
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

fn log_matrix(label: &str, matrix: &Mat4) {
    log::info!("  {}: {:?}", label, matrix.as_slice());
}
