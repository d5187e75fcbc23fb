//! Paint interaction state machine
//!
//! A [`PaintInteractionController`] gates when pointer motion becomes paint.
//! It is driven by three external signals: selection of its object, the
//! painting modifier key, and pointer movement.
//!
//! ```text
//! Idle --select--> Armed --key down--> Drawing --key up--> Armed
//!   ^                |                    |
//!   +----deselect----+-----deselect-------+  (implicit commit)
//! ```
//!
//! While `Drawing` the transform gizmo is suspended, and it is handed back
//! on every exit from `Drawing`. Listener tokens live inside the state, so
//! leaving a state always releases exactly the listeners it registered.

use texpaint_config::PaintConfig;
use tracing::{debug, info, warn};

use crate::brush::{Brush, BrushSettings, BrushStrategy};
use crate::camera::RayProjector;
use crate::commit::{CommitOutcome, CommitRequest, CommitSink};
use crate::intersect::{PaintTarget, SurfaceIntersector};
use crate::texture::PaintableTexture;
use crate::types::{BrushMode, ObjectId, PointerSample, ProjectionMode};

/// The shared translate/rotate manipulator
pub trait TransformGizmo {
    /// Show the gizmo on `owner`. A disabled gizmo is visible but inert.
    fn attach(&mut self, owner: &ObjectId, enabled: bool);

    /// Release the gizmo while `owner` is being painted
    fn suspend(&mut self, owner: &ObjectId);

    /// Release the gizmo because `owner` is no longer selected
    fn detach(&mut self, owner: &ObjectId);
}

/// Event streams a controller can listen to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    ModifierKey,
    PointerMove,
}

/// Proof of a listener registration. Not `Clone`: a registration is
/// released exactly once, by handing the token back.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ListenerToken {
    id: u64,
    owner: ObjectId,
    kind: ListenerKind,
}

impl ListenerToken {
    pub fn new(id: u64, owner: ObjectId, kind: ListenerKind) -> Self {
        Self { id, owner, kind }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn owner(&self) -> &ObjectId {
        &self.owner
    }

    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

/// Routes input events to registered owners
pub trait InputRouter {
    fn register(&mut self, owner: &ObjectId, kind: ListenerKind) -> ListenerToken;
    fn unregister(&mut self, token: ListenerToken);
}

/// External services a controller needs while handling an event
pub struct Collaborators<'a> {
    pub gizmo: &'a mut dyn TransformGizmo,
    pub input: &'a mut dyn InputRouter,
    pub commits: &'a mut dyn CommitSink,
}

/// Observable interaction phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    Armed,
    Drawing,
}

#[derive(Debug)]
enum State {
    Idle,
    Armed {
        key: ListenerToken,
    },
    Drawing {
        key: ListenerToken,
        pointer: ListenerToken,
    },
}

/// Brush and projection settings a controller starts with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintSettings {
    pub brush: BrushSettings,
    pub mode: BrushMode,
    pub projection: ProjectionMode,
}

impl From<&PaintConfig> for PaintSettings {
    fn from(config: &PaintConfig) -> Self {
        Self {
            brush: BrushSettings::from(&config.brush),
            mode: config.brush.kind.into(),
            projection: config.projection.into(),
        }
    }
}

/// Turns pointer motion over one object into paint strokes
#[derive(Debug)]
pub struct PaintInteractionController {
    owner: ObjectId,
    locked: bool,
    brush: Brush,
    intersector: SurfaceIntersector,
    state: State,
}

impl PaintInteractionController {
    pub fn new(owner: ObjectId, settings: PaintSettings) -> Self {
        Self {
            owner,
            locked: false,
            brush: Brush::new(settings.mode, settings.brush),
            intersector: SurfaceIntersector::new(settings.projection),
            state: State::Idle,
        }
    }

    pub fn from_config(owner: ObjectId, config: &PaintConfig) -> Self {
        Self::new(owner, PaintSettings::from(config))
    }

    pub fn owner(&self) -> &ObjectId {
        &self.owner
    }

    pub fn phase(&self) -> InteractionPhase {
        match self.state {
            State::Idle => InteractionPhase::Idle,
            State::Armed { .. } => InteractionPhase::Armed,
            State::Drawing { .. } => InteractionPhase::Drawing,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    /// Adjust brush settings. Mode changes go through [`Self::set_brush_mode`].
    pub fn brush_settings_mut(&mut self) -> &mut BrushSettings {
        self.brush.settings_mut()
    }

    pub fn intersector(&self) -> SurfaceIntersector {
        self.intersector
    }

    /// Swap the brush strategy. The current stroke is forgotten.
    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        if self.brush.mode() != mode {
            debug!("{}: brush mode {:?}", self.owner, mode);
        }
        self.brush.set_mode(mode);
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.intersector.mode = mode;
        self.brush.reset_stroke();
    }

    /// The texture was re-seeded. A stroke in progress must not continue
    /// from a coordinate of the old buffer.
    pub fn surface_changed(&mut self) {
        self.brush.reset_stroke();
    }

    /// Locked objects keep their gizmo visible but disabled
    pub fn set_locked(&mut self, locked: bool, gizmo: &mut dyn TransformGizmo) {
        self.locked = locked;
        if matches!(self.state, State::Armed { .. }) {
            gizmo.attach(&self.owner, !locked);
        }
    }

    /// The owning object gained or lost selection.
    ///
    /// Losing selection mid-stroke commits the stroke; the outcome is returned.
    pub fn selection_changed<M: Clone>(
        &mut self,
        selected: bool,
        texture: &mut PaintableTexture<M>,
        ctx: &mut Collaborators<'_>,
    ) -> Option<CommitOutcome> {
        match (selected, std::mem::replace(&mut self.state, State::Idle)) {
            (true, State::Idle) => {
                let key = ctx.input.register(&self.owner, ListenerKind::ModifierKey);
                texture.set_enabled(true);
                ctx.gizmo.attach(&self.owner, !self.locked);
                self.state = State::Armed { key };
                info!("{}: paint armed", self.owner);
                None
            }
            (true, state) => {
                self.state = state;
                None
            }
            (false, State::Idle) => None,
            (false, State::Armed { key }) => {
                ctx.input.unregister(key);
                texture.set_enabled(false);
                ctx.gizmo.detach(&self.owner);
                info!("{}: paint disarmed", self.owner);
                None
            }
            (false, State::Drawing { key, pointer }) => {
                ctx.input.unregister(pointer);
                ctx.input.unregister(key);
                self.brush.reset_stroke();
                let outcome = self.commit(texture, ctx.commits);
                texture.set_enabled(false);
                ctx.gizmo.detach(&self.owner);
                info!("{}: selection lost while drawing, stroke committed", self.owner);
                Some(outcome)
            }
        }
    }

    /// The painting modifier went down
    pub fn modifier_pressed(&mut self, ctx: &mut Collaborators<'_>) {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Armed { key } => {
                let pointer = ctx.input.register(&self.owner, ListenerKind::PointerMove);
                ctx.gizmo.suspend(&self.owner);
                self.brush.reset_stroke();
                self.state = State::Drawing { key, pointer };
                info!("{}: drawing", self.owner);
            }
            // Key repeat while drawing, or no selection
            state => self.state = state,
        }
    }

    /// The pointer moved. Returns true if the texture changed.
    ///
    /// A miss ends the current stroke segment so the next hit starts fresh.
    pub fn pointer_moved<M: Clone>(
        &mut self,
        sample: PointerSample,
        target: &dyn PaintTarget,
        camera: &dyn RayProjector,
        texture: &mut PaintableTexture<M>,
    ) -> bool {
        if !matches!(self.state, State::Drawing { .. }) {
            return false;
        }

        let Some(coordinate) = self.intersector.project(sample, target, camera) else {
            self.brush.reset_stroke();
            return false;
        };

        // Unseeded textures accept the stroke silently
        let Some(canvas) = texture.to_canvas(coordinate) else {
            return false;
        };

        debug!(
            "{}: draw at surface ({:.3}, {:.3}) canvas ({:.1}, {:.1})",
            self.owner, coordinate.x, coordinate.y, canvas.x, canvas.y
        );
        texture.draw(&mut self.brush, canvas)
    }

    /// The painting modifier went up: commit the stroke and hand the gizmo back
    pub fn modifier_released<M: Clone>(
        &mut self,
        texture: &mut PaintableTexture<M>,
        ctx: &mut Collaborators<'_>,
    ) -> Option<CommitOutcome> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Drawing { key, pointer } => {
                ctx.input.unregister(pointer);
                self.brush.reset_stroke();
                let outcome = self.commit(texture, ctx.commits);
                ctx.gizmo.attach(&self.owner, !self.locked);
                self.state = State::Armed { key };
                info!("{}: stroke finished", self.owner);
                Some(outcome)
            }
            state => {
                self.state = state;
                None
            }
        }
    }

    fn commit<M: Clone>(&self, texture: &PaintableTexture<M>, commits: &mut dyn CommitSink) -> CommitOutcome {
        if !texture.is_seeded() {
            return CommitOutcome::NothingToCommit;
        }

        let image = match texture.export() {
            Ok(image) => image,
            Err(e) => {
                warn!("{}: failed to export texture: {}", self.owner, e);
                return CommitOutcome::Failed(e);
            }
        };

        let request = CommitRequest {
            owner: self.owner.clone(),
            image,
        };
        match commits.submit(request) {
            Ok(()) => CommitOutcome::Submitted,
            Err(e) => {
                warn!("{}: failed to queue texture commit: {}", self.owner, e);
                CommitOutcome::Failed(e)
            }
        }
    }
}
