//! Demo scene: a camera looking at two paintable billboards

use bevy::asset::RenderAssetUsages;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use texpaint_painting::ObjectId;
use texpaint_scene::{MainCamera, PaintableImage};

pub struct DemoScenePlugin;

impl Plugin for DemoScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene);
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut images: ResMut<Assets<Image>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 0.0, 2.5).looking_at(Vec3::ZERO, Vec3::Y),
        Tonemapping::Reinhard,
        MainCamera,
    ));

    // Billboards are unit quads scaled to their image's aspect ratio
    let quad = meshes.add(Rectangle::new(1.0, 1.0));

    let checker = images.add(checker_image(256, 256, 32));
    commands.spawn((
        Mesh3d(quad.clone()),
        Transform::from_xyz(-0.7, 0.0, 0.0),
        PaintableImage::new(ObjectId::from("checker"), checker),
        Name::new("Checker"),
    ));

    let gradient = images.add(gradient_image(384, 256));
    let mut paintable = PaintableImage::new(ObjectId::from("gradient"), gradient);
    paintable.height = 0.8;
    commands.spawn((
        Mesh3d(quad),
        Transform::from_xyz(0.7, 0.0, 0.0),
        paintable,
        Name::new("Gradient"),
    ));
}

fn rgba_image(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> Image {
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .flat_map(|(x, y)| pixel(x, y))
        .collect();
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::all(),
    )
}

fn checker_image(width: u32, height: u32, cell: u32) -> Image {
    rgba_image(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            [235, 235, 235, 255]
        } else {
            [180, 180, 180, 255]
        }
    })
}

fn gradient_image(width: u32, height: u32) -> Image {
    rgba_image(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let b = (y * 255 / height.max(1)) as u8;
        [r, 160, b, 255]
    })
}
