//! # Scope Stack
//!
//! Gates every computed matrix behind a hierarchy of callback scopes:
//!
//! ```text
//! ScopeStack ─ with_observer ─► Observer ─┬─ with_instance ─────────► Instance
//!                                          └─ with_projective_light ─► ProjectiveLight
//!                                                                      └─ with_instance ─► InstanceWithProjective
//! ```
//!
//! Matrices are computed once when a scope opens and can only be read while
//! that scope is the innermost open scope on its branch. Each level holds at
//! most one open child. A scope closes when its callback returns, whether it
//! returns `Ok`, `Err`, or unwinds.
//!
//! ## Misuse
//!
//! - Opening a second child where one is already open returns an `*Active`
//!   error and leaves the stack untouched.
//! - Opening a child through a handle whose own scope (or an ancestor) has
//!   closed returns an `*Inactive` error.
//! - Reading a matrix through a handle that is not innermost panics. Handles
//!   are `Clone`, so they can be smuggled out of their callback, but they
//!   stop being readable the moment the callback returns.
//!
//! ## Threading
//!
//! Handles share the stack's state through `Rc`, so neither the stack nor its
//! handles are `Send`. Use one stack per thread.
//!
//! ## Example
//!
//! ```rust
//! use render_matrices::prelude::*;
//!
//! let stack = ScopeStack::new();
//! let projection = ProjectionDescription::perspective_degrees(60.0, 16.0 / 9.0, 0.1, 100.0);
//! let instance = InstanceDescription::from_transform(Transform::from_position(Vec3::new(0.0, 0.0, -5.0)));
//!
//! let model_view = stack.with_observer(Mat4::identity(), &projection, |observer| {
//!     observer.with_instance(&instance, |instance| Ok::<_, MatrixError>(instance.matrix_model_view()))
//! })?;
//! assert_eq!(model_view[(2, 3)], -5.0);
//! # Ok::<(), MatrixError>(())
//! ```

mod instance;
mod observer;
mod projective;
mod state;


use std::cell::RefCell;
use std::rc::Rc;

pub use instance::{Instance, InstanceWithProjective};
pub use observer::Observer;
pub use projective::ProjectiveLight;
pub use state::{HandleKind, ScopeState};

use crate::config::MatrixConfig;
use crate::error::MatrixError;
use crate::foundation::math::Mat4;
use crate::projection::ProjectionDescription;
use state::{OpenScope, ScopeGuard, SharedState, StackState};

/// Entry point for all matrix computation
///
/// Create one per frame (or per independent sub-computation) and run any
/// number of non-overlapping observer scopes on it.
#[derive(Debug)]
pub struct ScopeStack {
    shared: SharedState,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// Create a stack with the default configuration
    pub fn new() -> Self {
        Self::with_config(MatrixConfig::default())
    }

    /// Create a stack with an explicit configuration
    pub fn with_config(config: MatrixConfig) -> Self {
        Self {
            shared: Rc::new(RefCell::new(StackState::new(config))),
        }
    }

    /// Configuration this stack computes matrices with
    pub fn config(&self) -> MatrixConfig {
        self.shared.borrow().config
    }

    /// Which scopes are open right now
    pub fn state(&self) -> ScopeState {
        self.shared.borrow().scope_state()
    }

    /// Open an observer scope and run `f` inside it
    ///
    /// Computes the view inverse, the projection matrix and its inverse, then
    /// calls `f` exactly once and returns its result. The observer scope is
    /// closed before this returns.
    ///
    /// # Errors
    /// - [`MatrixError::ObserverActive`] if an observer is already open here
    /// - [`MatrixError::InvalidProjection`] if `projection` fails validation
    /// - whatever `f` returns
    pub fn with_observer<R, E, F>(
        &self,
        view: Mat4,
        projection: &ProjectionDescription,
        f: F,
    ) -> Result<R, E>
    where
        F: FnOnce(&Observer) -> Result<R, E>,
        E: From<MatrixError>,
    {
        let opened = self.shared.borrow_mut().open_observer(view, projection);
        let generation = match opened {
            Ok(generation) => generation,
            Err(error) => {
                log::warn!("Refused to open observer scope: {}", error);
                return Err(error.into());
            }
        };

        let _guard = ScopeGuard::new(&self.shared, OpenScope::Observer(generation));
        let observer = Observer::new(Rc::clone(&self.shared), generation);
        f(&observer)
    }
}
