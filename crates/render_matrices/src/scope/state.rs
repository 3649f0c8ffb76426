//! Shared bookkeeping behind a scope stack and all of its handles
//!
//! Every opened scope gets a fresh generation number. Handles remember the
//! generations of their own scope and its ancestors, and every read or
//! transition compares them against what is currently open.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::config::MatrixConfig;
use crate::error::{MatrixError, MatrixResult};
use crate::foundation::math::{Mat3, Mat4};
use crate::light::ProjectiveLightDescription;
use crate::projection::ProjectionDescription;
use crate::transform::{self, InstanceDescription, NormalOutcome};

/// State shared between a [`ScopeStack`](super::ScopeStack) and its handles
pub(crate) type SharedState = Rc<RefCell<StackState>>;

/// Identifies one opening of one scope
pub(crate) type Generation = u64;

/// The kinds of scope handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// A camera scope
    Observer,
    /// An instance inside an observer
    Instance,
    /// A projective light inside an observer
    ProjectiveLight,
    /// An instance inside a projective light
    InstanceWithProjective,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Observer => "Observer",
            Self::Instance => "Instance",
            Self::ProjectiveLight => "ProjectiveLight",
            Self::InstanceWithProjective => "InstanceWithProjective",
        };
        f.write_str(name)
    }
}

/// Why a handle cannot be read right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Staleness {
    /// The handle's scope has closed
    Closed,
    /// The scope is open but a child scope of this kind is innermost
    ChildOpen(HandleKind),
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("its scope has already closed"),
            Self::ChildOpen(kind) => write!(f, "a child {kind} scope is currently open"),
        }
    }
}

/// Matrices of an open observer scope
#[derive(Debug)]
pub(crate) struct ObserverFrame {
    pub generation: Generation,
    pub view: Mat4,
    pub view_inverse: Mat4,
    pub projection: Mat4,
    pub projection_inverse: Mat4,
    pub projection_description: ProjectionDescription,
    pub child: ObserverChild,
}

/// The single child slot of an observer
#[derive(Debug)]
pub(crate) enum ObserverChild {
    Vacant,
    Instance(InstanceFrame),
    Projective(ProjectiveFrame),
}

impl ObserverChild {
    const fn kind(&self) -> Option<HandleKind> {
        match self {
            Self::Vacant => None,
            Self::Instance(_) => Some(HandleKind::Instance),
            Self::Projective(_) => Some(HandleKind::ProjectiveLight),
        }
    }
}

/// Matrices of an open instance scope
#[derive(Debug)]
pub(crate) struct InstanceFrame {
    pub generation: Generation,
    pub model: Mat4,
    pub model_view: Mat4,
    pub normal: Mat3,
    pub uv: Mat3,
}

impl InstanceFrame {
    fn compute(
        generation: Generation,
        view: &Mat4,
        instance: &InstanceDescription,
        config: &MatrixConfig,
    ) -> Self {
        let model = transform::model(&instance.transform);
        let model_view = transform::model_view(view, &model);
        let (normal, outcome) = transform::normal_matrix(&model_view, config.degenerate_normal);
        if outcome == NormalOutcome::Degenerate {
            log::debug!(
                "Singular model-view for instance scope {}, using {:?} normal matrix",
                generation,
                config.degenerate_normal
            );
        }

        Self {
            generation,
            model,
            model_view,
            normal,
            uv: instance.uv_matrix,
        }
    }
}

/// Matrices of an open projective light scope
#[derive(Debug)]
pub(crate) struct ProjectiveFrame {
    pub generation: Generation,
    pub light: ProjectiveLightDescription,
    pub view: Mat4,
    pub view_inverse: Mat4,
    pub projection: Mat4,
    pub child: Option<ProjectiveInstanceFrame>,
}

/// Matrices of an open instance scope inside a projective light
#[derive(Debug)]
pub(crate) struct ProjectiveInstanceFrame {
    pub instance: InstanceFrame,
    pub projective_model_view: Mat4,
}

/// Everything the stack knows about what is open
#[derive(Debug)]
pub(crate) struct StackState {
    pub config: MatrixConfig,
    next_generation: Generation,
    pub observer: Option<ObserverFrame>,
}

impl StackState {
    pub(crate) const fn new(config: MatrixConfig) -> Self {
        Self {
            config,
            next_generation: 1,
            observer: None,
        }
    }

    // Transitions. Each `open_*` checks everything before touching any state,
    // so a refused open leaves the stack exactly as it was.

    pub(crate) fn open_observer(
        &mut self,
        view: Mat4,
        projection: &ProjectionDescription,
    ) -> MatrixResult<Generation> {
        if self.observer.is_some() {
            return Err(MatrixError::ObserverActive);
        }
        projection.validate()?;

        let view_inverse = view.try_inverse().unwrap_or_else(|| {
            log::warn!("Observer view matrix is singular, using identity as its inverse");
            Mat4::identity()
        });
        let projection_matrix = projection.to_matrix(self.config.depth_range);
        let projection_inverse = projection_matrix.try_inverse().unwrap_or_else(|| {
            log::warn!("Observer projection matrix is singular, using identity as its inverse");
            Mat4::identity()
        });

        let generation = self.allocate_generation();
        self.observer = Some(ObserverFrame {
            generation,
            view,
            view_inverse,
            projection: projection_matrix,
            projection_inverse,
            projection_description: *projection,
            child: ObserverChild::Vacant,
        });
        Ok(generation)
    }

    pub(crate) fn open_instance(
        &mut self,
        observer: Generation,
        instance: &InstanceDescription,
    ) -> MatrixResult<Generation> {
        let generation = self.next_generation;
        let config = self.config;
        let frame = open_observer_mut(&mut self.observer, observer)?;
        if frame.child.kind().is_some() {
            return Err(MatrixError::InstanceActive);
        }

        frame.child = ObserverChild::Instance(InstanceFrame::compute(generation, &frame.view, instance, &config));
        self.next_generation += 1;
        Ok(generation)
    }

    pub(crate) fn open_projective(
        &mut self,
        observer: Generation,
        light: &ProjectiveLightDescription,
    ) -> MatrixResult<Generation> {
        let generation = self.next_generation;
        let depth_range = self.config.depth_range;
        let frame = open_observer_mut(&mut self.observer, observer)?;
        if frame.child.kind().is_some() {
            return Err(MatrixError::ProjectiveActive);
        }
        light.projection.validate()?;

        let view = light.pose.view_matrix();
        frame.child = ObserverChild::Projective(ProjectiveFrame {
            generation,
            light: *light,
            view,
            view_inverse: light.pose.to_world_matrix(),
            projection: light.projection.to_matrix(depth_range),
            child: None,
        });
        self.next_generation += 1;
        Ok(generation)
    }

    pub(crate) fn open_projective_instance(
        &mut self,
        observer: Generation,
        projective: Generation,
        instance: &InstanceDescription,
    ) -> MatrixResult<Generation> {
        let generation = self.next_generation;
        let config = self.config;
        let frame = open_observer_mut(&mut self.observer, observer)?;
        let light = match &mut frame.child {
            ObserverChild::Projective(light) if light.generation == projective => light,
            _ => return Err(MatrixError::ProjectiveInactive),
        };
        if light.child.is_some() {
            return Err(MatrixError::InstanceActive);
        }

        let instance = InstanceFrame::compute(generation, &frame.view, instance, &config);
        let projective_model_view = transform::model_view(&light.view, &instance.model);
        light.child = Some(ProjectiveInstanceFrame {
            instance,
            projective_model_view,
        });
        self.next_generation += 1;
        Ok(generation)
    }

    /// Close a scope. Only the scope opened with `scope`'s generation is
    /// affected; anything else is left alone.
    pub(crate) fn close(&mut self, scope: OpenScope) {
        match scope {
            OpenScope::Observer(generation) => {
                if self.observer.as_ref().is_some_and(|f| f.generation == generation) {
                    self.observer = None;
                }
            }
            OpenScope::Instance(generation) | OpenScope::Projective(generation) => {
                if let Some(frame) = self.observer.as_mut() {
                    let matches = match &frame.child {
                        ObserverChild::Instance(instance) => instance.generation == generation,
                        ObserverChild::Projective(light) => light.generation == generation,
                        ObserverChild::Vacant => false,
                    };
                    if matches {
                        frame.child = ObserverChild::Vacant;
                    }
                }
            }
            OpenScope::ProjectiveInstance(generation) => {
                if let Some(ObserverChild::Projective(light)) = self.observer.as_mut().map(|f| &mut f.child) {
                    if light.child.as_ref().is_some_and(|c| c.instance.generation == generation) {
                        light.child = None;
                    }
                }
            }
        }
    }

    fn allocate_generation(&mut self) -> Generation {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    // Reads. Each returns the frame only if it is the innermost open scope
    // on its branch.

    pub(crate) fn innermost_observer(&self, observer: Generation) -> Result<&ObserverFrame, Staleness> {
        let frame = self.observer_frame(observer)?;
        match frame.child.kind() {
            None => Ok(frame),
            Some(kind) => Err(Staleness::ChildOpen(kind)),
        }
    }

    pub(crate) fn innermost_instance(
        &self,
        observer: Generation,
        instance: Generation,
    ) -> Result<(&ObserverFrame, &InstanceFrame), Staleness> {
        let frame = self.observer_frame(observer)?;
        match &frame.child {
            ObserverChild::Instance(child) if child.generation == instance => Ok((frame, child)),
            _ => Err(Staleness::Closed),
        }
    }

    pub(crate) fn open_projective_frame(
        &self,
        observer: Generation,
        projective: Generation,
    ) -> Result<&ProjectiveFrame, Staleness> {
        let frame = self.observer_frame(observer)?;
        match &frame.child {
            ObserverChild::Projective(light) if light.generation == projective => Ok(light),
            _ => Err(Staleness::Closed),
        }
    }

    pub(crate) fn innermost_projective(
        &self,
        observer: Generation,
        projective: Generation,
    ) -> Result<&ProjectiveFrame, Staleness> {
        let light = self.open_projective_frame(observer, projective)?;
        if light.child.is_some() {
            return Err(Staleness::ChildOpen(HandleKind::InstanceWithProjective));
        }
        Ok(light)
    }

    pub(crate) fn innermost_projective_instance(
        &self,
        observer: Generation,
        projective: Generation,
        instance: Generation,
    ) -> Result<(&ProjectiveFrame, &ProjectiveInstanceFrame), Staleness> {
        let light = self.open_projective_frame(observer, projective)?;
        match &light.child {
            Some(child) if child.instance.generation == instance => Ok((light, child)),
            _ => Err(Staleness::Closed),
        }
    }

    fn observer_frame(&self, observer: Generation) -> Result<&ObserverFrame, Staleness> {
        self.observer
            .as_ref()
            .filter(|frame| frame.generation == observer)
            .ok_or(Staleness::Closed)
    }

    /// Coarse view of what is open
    pub(crate) fn scope_state(&self) -> ScopeState {
        match &self.observer {
            None => ScopeState::Idle,
            Some(frame) => match &frame.child {
                ObserverChild::Vacant => ScopeState::Observer,
                ObserverChild::Instance(_) => ScopeState::ObserverInstance,
                ObserverChild::Projective(light) if light.child.is_some() => {
                    ScopeState::ObserverProjectiveInstance
                }
                ObserverChild::Projective(_) => ScopeState::ObserverProjective,
            },
        }
    }
}

fn open_observer_mut(
    observer: &mut Option<ObserverFrame>,
    generation: Generation,
) -> MatrixResult<&mut ObserverFrame> {
    observer
        .as_mut()
        .filter(|frame| frame.generation == generation)
        .ok_or(MatrixError::ObserverInactive)
}

/// Which scopes of a stack are currently open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    /// Nothing is open
    Idle,
    /// An observer with no child
    Observer,
    /// An observer and one of its instances
    ObserverInstance,
    /// An observer and a projective light with no child
    ObserverProjective,
    /// An observer, a projective light and one of the light's instances
    ObserverProjectiveInstance,
}

/// A scope to close when its callback returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpenScope {
    Observer(Generation),
    Instance(Generation),
    Projective(Generation),
    ProjectiveInstance(Generation),
}

/// Closes a scope on drop, so the scope closes on every exit path of its
/// callback, unwinding included
pub(crate) struct ScopeGuard<'a> {
    shared: &'a SharedState,
    scope: OpenScope,
}

impl<'a> ScopeGuard<'a> {
    pub(crate) fn new(shared: &'a SharedState, scope: OpenScope) -> Self {
        log::trace!("Opened {:?}", scope);
        Self { shared, scope }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        match self.shared.try_borrow_mut() {
            Ok(mut state) => {
                state.close(self.scope);
                log::trace!("Closed {:?}", self.scope);
            }
            Err(_) => log::error!("Scope stack still borrowed while closing {:?}", self.scope),
        }
    }
}

/// Report a read through a handle that is not the innermost open scope
pub(crate) fn stale_read(kind: HandleKind, matrix: &str, staleness: Staleness) -> ! {
    log::error!("Stale read of {kind} {matrix}: {staleness}");
    panic!("{kind} handle read {matrix} while not the innermost open scope: {staleness}");
}
