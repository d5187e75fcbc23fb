//! texpaint - paint directly onto images in a 3D view
//!
//! Select an image with Tab, hold the paint modifier (Shift by default) and
//! move the cursor to paint. Releasing the modifier saves the texture.

use bevy::prelude::*;
use bevy::window::WindowResolution;
use texpaint_config::{ConfigError, PaintConfig};
use texpaint_scene::ScenePlugin;

mod demo;
mod hotkeys;

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;

/// Config loading result, held until logging is running
#[derive(Resource)]
struct ConfigStatus {
    error: Option<ConfigError>,
}

fn main() {
    let (config, error) = PaintConfig::from_env();

    let window_config = Window {
        title: "texpaint".into(),
        resolution: WindowResolution::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
        present_mode: bevy::window::PresentMode::AutoVsync,
        ..default()
    };

    App::new()
        .insert_resource(config)
        .insert_resource(ConfigStatus { error })
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(window_config),
                    ..default()
                })
                .set(bevy::log::LogPlugin {
                    level: bevy::log::Level::INFO,
                    ..default()
                }),
        )
        .add_plugins(ScenePlugin)
        .add_plugins(demo::DemoScenePlugin)
        .add_plugins(hotkeys::HotkeyPlugin)
        .add_systems(Startup, report_config)
        .run();
}

fn report_config(config: Res<PaintConfig>, mut status: ResMut<ConfigStatus>) {
    if let Some(e) = status.error.take() {
        warn!("Ignoring paint config: {}", e);
    }
    info!(
        "Starting texpaint in {}",
        config.assets.project_root.display()
    );
}
