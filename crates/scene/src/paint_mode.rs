//! Paint mode input handling
//!
//! Selection, the painting modifier and cursor motion are routed to each
//! object's [`PaintInteractionController`]. Holding the modifier over a
//! selected image paints on it; releasing it commits the stroke.
//!
//! [`PaintInteractionController`]: texpaint_painting::PaintInteractionController

use bevy::prelude::*;
use bevy::window::{CursorMoved, PrimaryWindow};

use texpaint_config::PaintConfig;
use texpaint_painting::{Collaborators, InteractionPhase, ListenerKind, MeshTarget, ObjectId};

use crate::adapters::{BevyCamera, MainCamera, world_transform};
use crate::commit_system::{PaintCommits, PaintNotifications, report_outcome};
use crate::gizmo_lock::GizmoLock;
use crate::input::{InputRegistry, modifier_key_codes};
use crate::paintable::{ImagePainter, cached_raycast_data};

/// The object currently selected for painting
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct PaintSelection {
    pub selected: Option<ObjectId>,
}

impl PaintSelection {
    pub fn is_selected(&self, owner: &ObjectId) -> bool {
        self.selected.as_ref() == Some(owner)
    }
}

/// Plugin for paint mode functionality
pub struct PaintModePlugin;

impl Plugin for PaintModePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PaintSelection>().add_systems(
            Update,
            (route_selection, route_modifier_key, route_pointer_moves).chain(),
        );
    }
}

/// Arm painters that became selected and disarm the rest
fn route_selection(
    selection: Res<PaintSelection>,
    mut gizmo: ResMut<GizmoLock>,
    mut input: ResMut<InputRegistry>,
    mut commits: ResMut<PaintCommits>,
    mut notifications: ResMut<PaintNotifications>,
    mut painters: Query<&mut ImagePainter>,
) {
    for mut painter in painters.iter_mut() {
        let selected = selection.is_selected(painter.controller.owner());
        let active = painter.controller.phase() != InteractionPhase::Idle;
        if selected == active {
            continue;
        }

        let ImagePainter {
            controller,
            texture,
            ..
        } = &mut *painter;
        let owner = controller.owner().clone();
        let mut ctx = Collaborators {
            gizmo: &mut *gizmo,
            input: &mut *input,
            commits: &mut *commits,
        };
        let outcome = controller.selection_changed(selected, texture, &mut ctx);
        report_outcome(&owner, outcome, &mut notifications);
    }
}

/// Start and end strokes on the painting modifier
fn route_modifier_key(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<PaintConfig>,
    mut gizmo: ResMut<GizmoLock>,
    mut input: ResMut<InputRegistry>,
    mut commits: ResMut<PaintCommits>,
    mut notifications: ResMut<PaintNotifications>,
    mut painters: Query<&mut ImagePainter>,
) {
    let codes = modifier_key_codes(config.input.modifier);
    // A key already held when an image becomes armed starts drawing too
    let pressed = keys.any_just_pressed(codes) || keys.any_pressed(codes);
    // Either physical key still down keeps the stroke going
    let released = keys.any_just_released(codes) && !keys.any_pressed(codes);
    if !pressed && !released {
        return;
    }

    for mut painter in painters.iter_mut() {
        if !input.is_listening(painter.controller.owner(), ListenerKind::ModifierKey) {
            continue;
        }

        let ImagePainter {
            controller,
            texture,
            ..
        } = &mut *painter;
        let owner = controller.owner().clone();
        let mut ctx = Collaborators {
            gizmo: &mut *gizmo,
            input: &mut *input,
            commits: &mut *commits,
        };
        if pressed {
            controller.modifier_pressed(&mut ctx);
        }
        if released {
            let outcome = controller.modifier_released(texture, &mut ctx);
            report_outcome(&owner, outcome, &mut notifications);
        }
    }
}

/// Feed every cursor position of the frame to drawing painters
fn route_pointer_moves(
    mut cursor_moves: MessageReader<CursorMoved>,
    windows: Query<(Entity, &Window), With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    meshes: Res<Assets<Mesh>>,
    input: Res<InputRegistry>,
    mut painters: Query<(&mut ImagePainter, &Mesh3d, &GlobalTransform)>,
) {
    let Ok((window_entity, window)) = windows.single() else {
        return;
    };

    // All positions, not just the last, so fast strokes stay continuous
    let positions: Vec<Vec2> = cursor_moves
        .read()
        .filter(|e| e.window == window_entity)
        .map(|e| e.position)
        .collect();
    if positions.is_empty() {
        return;
    }

    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let camera = BevyCamera::new(camera, camera_transform, window);

    for (mut painter, mesh, transform) in painters.iter_mut() {
        if !input.is_listening(painter.controller.owner(), ListenerKind::PointerMove) {
            continue;
        }

        let ImagePainter {
            controller,
            texture,
            raycast,
            ..
        } = &mut *painter;
        let Some(data) = cached_raycast_data(raycast, mesh, &meshes) else {
            continue;
        };
        let target = MeshTarget::new(data, world_transform(transform));

        for &position in &positions {
            if let Some(sample) = camera.sample(position) {
                controller.pointer_moved(sample, &target, &camera, texture);
            }
        }
    }
}
