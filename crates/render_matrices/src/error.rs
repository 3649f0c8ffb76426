//! Error types for scope-stack operations
//!
//! Only recoverable misuse shows up here. Reading a matrix through a handle
//! whose scope is not the innermost open scope panics instead.

use thiserror::Error;

/// Recoverable errors raised by the `with_*` entry points
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    /// An observer scope is already open on this stack
    #[error("an observer scope is already active on this stack")]
    ObserverActive,

    /// The parent scope already has an open child and cannot open an instance
    #[error("cannot open an instance scope: the parent already has an active child scope")]
    InstanceActive,

    /// The observer already has an open child and cannot open a projective light
    #[error("cannot open a projective light scope: the observer already has an active child scope")]
    ProjectiveActive,

    /// The observer this handle belongs to has already closed
    #[error("the observer scope this handle belongs to is no longer active")]
    ObserverInactive,

    /// The projective light this handle belongs to has already closed
    #[error("the projective light scope this handle belongs to is no longer active")]
    ProjectiveInactive,

    /// A projection description cannot produce a usable matrix
    #[error("invalid projection: {reason}")]
    InvalidProjection {
        /// What is wrong with the description
        reason: String,
    },
}

impl MatrixError {
    /// True for errors caused by opening a scope while a sibling is open
    pub const fn is_active_error(&self) -> bool {
        matches!(
            self,
            Self::ObserverActive | Self::InstanceActive | Self::ProjectiveActive
        )
    }

    /// True for errors caused by using a handle after an ancestor closed
    pub const fn is_inactive_error(&self) -> bool {
        matches!(self, Self::ObserverInactive | Self::ProjectiveInactive)
    }
}

/// Result type for scope-stack operations
pub type MatrixResult<T> = Result<T, MatrixError>;
