//! Observer handle

use std::rc::Rc;

use super::instance::Instance;
use super::projective::ProjectiveLight;
use super::state::{stale_read, Generation, HandleKind, ObserverFrame, OpenScope, ScopeGuard, SharedState};
use crate::error::MatrixError;
use crate::foundation::math::Mat4;
use crate::light::ProjectiveLightDescription;
use crate::projection::ProjectionDescription;
use crate::transform::InstanceDescription;
use crate::uniforms::ObserverUniforms;

/// Handle to an open observer (camera) scope
///
/// Readable only while no instance or projective light is open inside it.
#[derive(Debug, Clone)]
pub struct Observer {
    shared: SharedState,
    generation: Generation,
}

impl Observer {
    pub(super) fn new(shared: SharedState, generation: Generation) -> Self {
        Self { shared, generation }
    }

    fn read<T>(&self, matrix: &str, f: impl FnOnce(&ObserverFrame) -> T) -> T {
        let state = self.shared.borrow();
        let staleness = match state.innermost_observer(self.generation) {
            Ok(frame) => return f(frame),
            Err(staleness) => staleness,
        };
        drop(state);
        stale_read(HandleKind::Observer, matrix, staleness)
    }

    /// World-to-eye matrix
    pub fn matrix_view(&self) -> Mat4 {
        self.read("view", |frame| frame.view)
    }

    /// Eye-to-world matrix
    pub fn matrix_view_inverse(&self) -> Mat4 {
        self.read("view_inverse", |frame| frame.view_inverse)
    }

    /// Eye-to-clip matrix
    pub fn matrix_projection(&self) -> Mat4 {
        self.read("projection", |frame| frame.projection)
    }

    /// Clip-to-eye matrix
    pub fn matrix_projection_inverse(&self) -> Mat4 {
        self.read("projection_inverse", |frame| frame.projection_inverse)
    }

    /// The projection description this observer was opened with
    pub fn projection(&self) -> ProjectionDescription {
        self.read("projection description", |frame| frame.projection_description)
    }

    /// All observer matrices packed for upload
    pub fn uniforms(&self) -> ObserverUniforms {
        self.read("uniforms", |frame| {
            ObserverUniforms::new(
                &frame.view,
                &frame.view_inverse,
                &frame.projection,
                &frame.projection_inverse,
            )
        })
    }

    /// True while this observer is open and has no open child
    pub fn is_active(&self) -> bool {
        self.shared.borrow().innermost_observer(self.generation).is_ok()
    }

    /// Open an instance scope inside this observer and run `f` inside it
    ///
    /// # Errors
    /// - [`MatrixError::ObserverInactive`] if this observer has closed
    /// - [`MatrixError::InstanceActive`] if this observer already has an open child
    /// - whatever `f` returns
    pub fn with_instance<R, E, F>(&self, instance: &InstanceDescription, f: F) -> Result<R, E>
    where
        F: FnOnce(&Instance) -> Result<R, E>,
        E: From<MatrixError>,
    {
        let opened = self.shared.borrow_mut().open_instance(self.generation, instance);
        let generation = match opened {
            Ok(generation) => generation,
            Err(error) => {
                log::warn!("Refused to open instance scope: {}", error);
                return Err(error.into());
            }
        };

        let _guard = ScopeGuard::new(&self.shared, OpenScope::Instance(generation));
        let handle = Instance::new(Rc::clone(&self.shared), self.generation, generation);
        f(&handle)
    }

    /// Open a projective light scope inside this observer and run `f` inside it
    ///
    /// The light's view and projection come only from `light`.
    ///
    /// # Errors
    /// - [`MatrixError::ObserverInactive`] if this observer has closed
    /// - [`MatrixError::ProjectiveActive`] if this observer already has an open child
    /// - [`MatrixError::InvalidProjection`] if the light's projection fails validation
    /// - whatever `f` returns
    pub fn with_projective_light<R, E, F>(&self, light: &ProjectiveLightDescription, f: F) -> Result<R, E>
    where
        F: FnOnce(&ProjectiveLight) -> Result<R, E>,
        E: From<MatrixError>,
    {
        let opened = self.shared.borrow_mut().open_projective(self.generation, light);
        let generation = match opened {
            Ok(generation) => generation,
            Err(error) => {
                log::warn!("Refused to open projective light scope: {}", error);
                return Err(error.into());
            }
        };

        let _guard = ScopeGuard::new(&self.shared, OpenScope::Projective(generation));
        let handle = ProjectiveLight::new(Rc::clone(&self.shared), self.generation, generation);
        f(&handle)
    }
}
