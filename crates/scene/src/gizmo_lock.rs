//! Exclusive ownership of the transform gizmo
//!
//! Only one object holds the gizmo at a time. Painting suspends it so the
//! manipulator never competes with a stroke for pointer input.

use bevy::prelude::*;
use texpaint_painting::{ObjectId, TransformGizmo};

use crate::paintable::PaintableImage;

/// Current gizmo holder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GizmoHolder {
    pub owner: ObjectId,
    /// Disabled gizmos are shown but cannot move the object
    pub enabled: bool,
}

/// Resource implementing [`TransformGizmo`] for the scene
#[derive(Resource, Debug, Default)]
pub struct GizmoLock {
    holder: Option<GizmoHolder>,
}

impl GizmoLock {
    pub fn holder(&self) -> Option<&GizmoHolder> {
        self.holder.as_ref()
    }

    /// Whether `owner` may currently be moved with the gizmo
    pub fn is_enabled_for(&self, owner: &ObjectId) -> bool {
        self.holder
            .as_ref()
            .is_some_and(|h| h.enabled && &h.owner == owner)
    }

    fn release(&mut self, owner: &ObjectId) -> bool {
        if self.holder.as_ref().is_some_and(|h| &h.owner == owner) {
            self.holder = None;
            true
        } else {
            false
        }
    }
}

impl TransformGizmo for GizmoLock {
    fn attach(&mut self, owner: &ObjectId, enabled: bool) {
        if let Some(previous) = self.holder.as_ref().filter(|h| &h.owner != owner) {
            debug!("Gizmo moves from {} to {}", previous.owner, owner);
        }
        self.holder = Some(GizmoHolder {
            owner: owner.clone(),
            enabled,
        });
    }

    fn suspend(&mut self, owner: &ObjectId) {
        if self.release(owner) {
            debug!("Gizmo suspended for {}", owner);
        }
    }

    fn detach(&mut self, owner: &ObjectId) {
        if self.release(owner) {
            debug!("Gizmo detached from {}", owner);
        }
    }
}

/// Draw the gizmo axes on the object holding an enabled gizmo
pub(crate) fn render_gizmo(
    lock: Res<GizmoLock>,
    objects: Query<(&PaintableImage, &GlobalTransform)>,
    mut gizmos: Gizmos,
) {
    let Some(holder) = lock.holder().filter(|h| h.enabled) else {
        return;
    };

    for (image, transform) in objects.iter() {
        if image.owner == holder.owner {
            gizmos.axes(*transform, 0.75);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_is_exclusive() {
        let mut lock = GizmoLock::default();
        let a = ObjectId::from("a");
        let b = ObjectId::from("b");

        lock.attach(&a, true);
        lock.attach(&b, false);
        assert_eq!(lock.holder().map(|h| &h.owner), Some(&b));
        assert!(!lock.is_enabled_for(&a));
        assert!(!lock.is_enabled_for(&b));
    }

    #[test]
    fn test_release_ignores_other_owners() {
        let mut lock = GizmoLock::default();
        let a = ObjectId::from("a");
        let b = ObjectId::from("b");

        lock.attach(&a, true);
        lock.suspend(&b);
        lock.detach(&b);
        assert!(lock.is_enabled_for(&a));

        lock.suspend(&a);
        assert!(lock.holder().is_none());
    }
}
