//! # Render Matrices
//!
//! The transform-computation core of a deferred/forward hybrid renderer.
//! Derives every matrix later rendering stages consume (model, view,
//! model-view, normal, UV and projective-light variants) and only lets them be
//! read while they are valid.
//!
//! ## Features
//!
//! - **Scoped access**: matrices live inside nested callback scopes
//!   (observer, instance, projective light, instance-with-projective)
//! - **Stale-handle detection**: handles kept past their scope fail loudly
//! - **Typed misuse errors**: opening overlapping scopes returns an error
//!   instead of corrupting state
//! - **Upload-ready**: `bytemuck` uniform blocks with std140 layout
//!
//! ## Quick Start
//!
//! ```rust
//! use render_matrices::prelude::*;
//!
//! let stack = ScopeStack::new();
//! let camera = LightPose::look_at(Vec3::new(0.0, 2.0, 5.0), Vec3::zeros(), Vec3::y());
//! let projection = ProjectionDescription::perspective_degrees(75.0, 16.0 / 9.0, 0.1, 100.0);
//! let teapot = InstanceDescription::from_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
//!
//! stack.with_observer(camera.view_matrix(), &projection, |observer| {
//!     observer.with_instance(&teapot, |instance| {
//!         let uniforms = instance.uniforms();
//!         let _bytes = bytemuck::bytes_of(&uniforms);
//!         Ok::<_, MatrixError>(())
//!     })
//! })?;
//! # Ok::<(), MatrixError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod error;
pub mod foundation;
pub mod light;
pub mod projection;
pub mod scope;
pub mod transform;
pub mod uniforms;

pub use config::{Config, ConfigError, DegenerateNormalPolicy, DepthRange, MatrixConfig};
pub use error::{MatrixError, MatrixResult};
pub use light::{LightPose, ProjectiveLightDescription};
pub use projection::ProjectionDescription;
pub use scope::{
    HandleKind, Instance, InstanceWithProjective, Observer, ProjectiveLight, ScopeStack, ScopeState,
};
pub use transform::{InstanceDescription, InstanceTransform};

/// Common imports for users of the crate
pub mod prelude {
    pub use crate::{
        config::{Config, DegenerateNormalPolicy, DepthRange, MatrixConfig},
        error::{MatrixError, MatrixResult},
        foundation::math::{Mat3, Mat4, Quat, Transform, Vec3, Vec4},
        light::{LightPose, ProjectiveLightDescription},
        projection::ProjectionDescription,
        scope::{Instance, InstanceWithProjective, Observer, ProjectiveLight, ScopeStack, ScopeState},
        transform::{InstanceDescription, InstanceTransform},
    };
}
