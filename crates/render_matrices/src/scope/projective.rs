//! Projective light handle

use std::rc::Rc;

use super::instance::InstanceWithProjective;
use super::state::{stale_read, Generation, HandleKind, OpenScope, ProjectiveFrame, ScopeGuard, SharedState};
use crate::error::MatrixError;
use crate::foundation::math::Mat4;
use crate::light::ProjectiveLightDescription;
use crate::transform::InstanceDescription;
use crate::uniforms::ProjectiveLightUniforms;

/// Handle to an open projective light scope
///
/// Readable only while no instance is open inside it.
#[derive(Debug, Clone)]
pub struct ProjectiveLight {
    shared: SharedState,
    observer: Generation,
    generation: Generation,
}

impl ProjectiveLight {
    pub(super) fn new(shared: SharedState, observer: Generation, generation: Generation) -> Self {
        Self {
            shared,
            observer,
            generation,
        }
    }

    fn read<T>(&self, matrix: &str, f: impl FnOnce(&ProjectiveFrame) -> T) -> T {
        let state = self.shared.borrow();
        let staleness = match state.innermost_projective(self.observer, self.generation) {
            Ok(light) => return f(light),
            Err(staleness) => staleness,
        };
        drop(state);
        stale_read(HandleKind::ProjectiveLight, matrix, staleness)
    }

    /// World-to-light-eye matrix
    pub fn matrix_projective_view(&self) -> Mat4 {
        self.read("projective_view", |light| light.view)
    }

    /// Light-eye-to-world matrix
    pub fn matrix_projective_view_inverse(&self) -> Mat4 {
        self.read("projective_view_inverse", |light| light.view_inverse)
    }

    /// Light-eye-to-clip matrix
    pub fn matrix_projective_projection(&self) -> Mat4 {
        self.read("projective_projection", |light| light.projection)
    }

    /// The description this light scope was opened with
    pub fn light(&self) -> ProjectiveLightDescription {
        self.read("light description", |light| light.light)
    }

    /// Light matrices packed for upload
    pub fn uniforms(&self) -> ProjectiveLightUniforms {
        self.read("uniforms", |light| ProjectiveLightUniforms::new(&light.view, &light.projection))
    }

    /// True while this light is open and has no open instance
    pub fn is_active(&self) -> bool {
        self.shared
            .borrow()
            .innermost_projective(self.observer, self.generation)
            .is_ok()
    }

    /// Open an instance scope relative to this light and run `f` inside it
    ///
    /// # Errors
    /// - [`MatrixError::ObserverInactive`] if the enclosing observer has closed
    /// - [`MatrixError::ProjectiveInactive`] if this light has closed
    /// - [`MatrixError::InstanceActive`] if this light already has an open instance
    /// - whatever `f` returns
    pub fn with_instance<R, E, F>(&self, instance: &InstanceDescription, f: F) -> Result<R, E>
    where
        F: FnOnce(&InstanceWithProjective) -> Result<R, E>,
        E: From<MatrixError>,
    {
        let opened = self
            .shared
            .borrow_mut()
            .open_projective_instance(self.observer, self.generation, instance);
        let generation = match opened {
            Ok(generation) => generation,
            Err(error) => {
                log::warn!("Refused to open projective instance scope: {}", error);
                return Err(error.into());
            }
        };

        let _guard = ScopeGuard::new(&self.shared, OpenScope::ProjectiveInstance(generation));
        let handle = InstanceWithProjective::new(Rc::clone(&self.shared), self.observer, self.generation, generation);
        f(&handle)
    }
}
