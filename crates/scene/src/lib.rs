//! Bevy scene integration for texpaint
//!
//! This crate wires the renderer-agnostic painting core into a Bevy app:
//! paintable billboards, per-object input routing, the exclusive transform
//! gizmo, GPU texture upload and background persistence of strokes.

use bevy::prelude::*;
use texpaint_config::PaintConfig;

mod adapters;
mod commit_system;
mod gizmo_lock;
mod input;
mod paint_mode;
mod paintable;
mod painting_system;

pub use adapters::{BevyCamera, MainCamera, mesh_raycast_data, world_transform};
pub use commit_system::{
    CommitSystemPlugin, PaintCommandMessage, PaintCommits, PaintNotifications, SceneObjects,
};
pub use gizmo_lock::{GizmoHolder, GizmoLock};
pub use input::{InputRegistry, modifier_key_codes};
pub use paint_mode::{PaintModePlugin, PaintSelection};
pub use paintable::{ImagePainter, PaintableImage, rgba_from_image};
pub use painting_system::{BevyTextureBackend, PaintMaterial, PaintingSystemPlugin};

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        // Applications may insert their own config before this plugin
        app.init_resource::<PaintConfig>()
            .init_resource::<GizmoLock>()
            .init_resource::<InputRegistry>();

        app.add_plugins(CommitSystemPlugin);
        app.add_plugins(PaintModePlugin);
        app.add_plugins(PaintingSystemPlugin);

        app.add_systems(Update, gizmo_lock::render_gizmo);
    }
}
