//! Hotkey handling for texpaint
//!
//! - Tab: select the next paintable image
//! - Escape: clear the selection
//! - B / E: paint or erase brush
//! - [ / ]: shrink or grow the brush
//! - P: toggle UV and analytic projection

use bevy::prelude::*;
use texpaint_config::{BrushKind, PaintConfig, ProjectionKind};
use texpaint_ipc::{PaintCommand, to_json};
use texpaint_scene::{PaintCommandMessage, PaintNotifications, PaintSelection, PaintableImage};

const BRUSH_SIZE_STEP: f32 = 1.25;

pub struct HotkeyPlugin;

impl Plugin for HotkeyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_selection_hotkeys, handle_brush_hotkeys, forward_notifications),
        );
    }
}

/// Handle Tab and Escape
fn handle_selection_hotkeys(
    key_input: Res<ButtonInput<KeyCode>>,
    images: Query<&PaintableImage>,
    mut selection: ResMut<PaintSelection>,
) {
    if key_input.just_pressed(KeyCode::Escape) && selection.selected.is_some() {
        selection.selected = None;
        info!("Selection cleared");
        return;
    }

    if key_input.just_pressed(KeyCode::Tab) {
        let mut owners: Vec<_> = images.iter().map(|image| &image.owner).collect();
        owners.sort();

        let next = match selection.selected.as_ref() {
            Some(current) => owners
                .iter()
                .position(|owner| *owner == current)
                .and_then(|i| owners.get(i + 1))
                .or(owners.first()),
            None => owners.first(),
        };

        if let Some(next) = next {
            info!("Selected {}", next);
            selection.selected = Some((*next).clone());
        }
    }
}

/// Translate brush hotkeys into paint commands
fn handle_brush_hotkeys(
    key_input: Res<ButtonInput<KeyCode>>,
    config: Res<PaintConfig>,
    mut commands: MessageWriter<PaintCommandMessage>,
) {
    let mut send = |command| {
        commands.write(PaintCommandMessage(command));
    };

    if key_input.just_pressed(KeyCode::KeyB) {
        send(PaintCommand::SetBrushMode {
            mode: BrushKind::Paint,
        });
    }
    if key_input.just_pressed(KeyCode::KeyE) {
        send(PaintCommand::SetBrushMode {
            mode: BrushKind::Erase,
        });
    }
    if key_input.just_pressed(KeyCode::BracketLeft) {
        send(PaintCommand::SetBrushSize {
            size: (config.brush.size / BRUSH_SIZE_STEP).max(1.0),
        });
    }
    if key_input.just_pressed(KeyCode::BracketRight) {
        send(PaintCommand::SetBrushSize {
            size: config.brush.size * BRUSH_SIZE_STEP,
        });
    }
    if key_input.just_pressed(KeyCode::KeyP) {
        let mode = match config.projection {
            ProjectionKind::Uv => ProjectionKind::Analytic,
            ProjectionKind::Analytic => ProjectionKind::Uv,
        };
        info!("Projection mode {:?}", mode);
        send(PaintCommand::SetProjectionMode { mode });
    }
}

/// Log notifications in their wire format until a UI consumes them
fn forward_notifications(mut notifications: ResMut<PaintNotifications>) {
    for notification in notifications.drain() {
        match to_json(&notification) {
            Ok(json) if notification.is_error() => warn!("{}", json),
            Ok(json) => info!("{}", json),
            Err(e) => error!("Failed to serialize notification: {}", e),
        }
    }
}
