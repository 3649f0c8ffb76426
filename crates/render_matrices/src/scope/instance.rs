//! Instance handles, observer-relative and projective-light-relative

use super::state::{
    stale_read, Generation, HandleKind, InstanceFrame, ObserverFrame, ProjectiveFrame,
    ProjectiveInstanceFrame, SharedState,
};
use crate::foundation::math::{Mat3, Mat4};
use crate::uniforms::{InstanceUniforms, ProjectiveInstanceUniforms};

/// Handle to an open instance scope inside an observer
#[derive(Debug, Clone)]
pub struct Instance {
    shared: SharedState,
    observer: Generation,
    generation: Generation,
}

impl Instance {
    pub(super) fn new(shared: SharedState, observer: Generation, generation: Generation) -> Self {
        Self {
            shared,
            observer,
            generation,
        }
    }

    fn read<T>(&self, matrix: &str, f: impl FnOnce(&ObserverFrame, &InstanceFrame) -> T) -> T {
        let state = self.shared.borrow();
        let staleness = match state.innermost_instance(self.observer, self.generation) {
            Ok((observer, instance)) => return f(observer, instance),
            Err(staleness) => staleness,
        };
        drop(state);
        stale_read(HandleKind::Instance, matrix, staleness)
    }

    /// Object-to-world matrix
    pub fn matrix_model(&self) -> Mat4 {
        self.read("model", |_, instance| instance.model)
    }

    /// Object-to-eye matrix, `view * model`
    pub fn matrix_model_view(&self) -> Mat4 {
        self.read("model_view", |_, instance| instance.model_view)
    }

    /// Inverse transpose of the model-view's upper-left 3x3
    pub fn matrix_normal(&self) -> Mat3 {
        self.read("normal", |_, instance| instance.normal)
    }

    /// Texture coordinate transform supplied with the instance
    pub fn matrix_uv(&self) -> Mat3 {
        self.read("uv", |_, instance| instance.uv)
    }

    /// The enclosing observer's world-to-eye matrix
    pub fn matrix_view(&self) -> Mat4 {
        self.read("view", |observer, _| observer.view)
    }

    /// The enclosing observer's eye-to-clip matrix
    pub fn matrix_projection(&self) -> Mat4 {
        self.read("projection", |observer, _| observer.projection)
    }

    /// All instance matrices packed for upload
    pub fn uniforms(&self) -> InstanceUniforms {
        self.read("uniforms", |_, instance| {
            InstanceUniforms::new(&instance.model, &instance.model_view, &instance.normal, &instance.uv)
        })
    }

    /// True while this instance scope is open
    pub fn is_active(&self) -> bool {
        self.shared
            .borrow()
            .innermost_instance(self.observer, self.generation)
            .is_ok()
    }
}

/// Handle to an open instance scope inside a projective light
///
/// Carries both the observer-relative matrices and the model-view relative
/// to the light.
#[derive(Debug, Clone)]
pub struct InstanceWithProjective {
    shared: SharedState,
    observer: Generation,
    projective: Generation,
    generation: Generation,
}

impl InstanceWithProjective {
    pub(super) fn new(
        shared: SharedState,
        observer: Generation,
        projective: Generation,
        generation: Generation,
    ) -> Self {
        Self {
            shared,
            observer,
            projective,
            generation,
        }
    }

    fn read<T>(&self, matrix: &str, f: impl FnOnce(&ProjectiveFrame, &ProjectiveInstanceFrame) -> T) -> T {
        let state = self.shared.borrow();
        let staleness =
            match state.innermost_projective_instance(self.observer, self.projective, self.generation) {
                Ok((light, instance)) => return f(light, instance),
                Err(staleness) => staleness,
            };
        drop(state);
        stale_read(HandleKind::InstanceWithProjective, matrix, staleness)
    }

    /// Object-to-world matrix
    pub fn matrix_model(&self) -> Mat4 {
        self.read("model", |_, frame| frame.instance.model)
    }

    /// Object-to-eye matrix relative to the observer
    pub fn matrix_model_view(&self) -> Mat4 {
        self.read("model_view", |_, frame| frame.instance.model_view)
    }

    /// Inverse transpose of the observer-relative model-view's upper-left 3x3
    pub fn matrix_normal(&self) -> Mat3 {
        self.read("normal", |_, frame| frame.instance.normal)
    }

    /// Texture coordinate transform supplied with the instance
    pub fn matrix_uv(&self) -> Mat3 {
        self.read("uv", |_, frame| frame.instance.uv)
    }

    /// Object-to-light-eye matrix, `projective_view * model`
    pub fn matrix_projective_model_view(&self) -> Mat4 {
        self.read("projective_model_view", |_, frame| frame.projective_model_view)
    }

    /// The enclosing light's eye-to-clip matrix
    pub fn matrix_projective_projection(&self) -> Mat4 {
        self.read("projective_projection", |light, _| light.projection)
    }

    /// All matrices packed for upload
    pub fn uniforms(&self) -> ProjectiveInstanceUniforms {
        self.read("uniforms", |light, frame| {
            let instance = &frame.instance;
            ProjectiveInstanceUniforms::new(
                &InstanceUniforms::new(&instance.model, &instance.model_view, &instance.normal, &instance.uv),
                &frame.projective_model_view,
                &light.projection,
            )
        })
    }

    /// True while this instance scope is open
    pub fn is_active(&self) -> bool {
        self.shared
            .borrow()
            .innermost_projective_instance(self.observer, self.projective, self.generation)
            .is_ok()
    }
}
