//! Paintable billboard entities
//!
//! A [`PaintableImage`] is an image shown on a billboard quad. Once its source
//! image has loaded, the entity gets an [`ImagePainter`] holding the raster
//! buffer and the interaction controller, and the billboard is scaled to the
//! image's aspect ratio.

use bevy::prelude::*;
use image::RgbaImage;
use texpaint_config::PaintConfig;
use texpaint_painting::{
    ExportFormat, MeshRaycastData, ObjectId, PaintInteractionController, PaintableTexture,
    billboard_scale,
};

use crate::adapters::{from_glam_vec3, mesh_raycast_data};
use crate::commit_system::SceneObjects;
use crate::gizmo_lock::GizmoLock;
use crate::painting_system::{BevyTextureBackend, PaintMaterial};

/// A scene object whose image can be painted on
#[derive(Component, Debug, Clone)]
pub struct PaintableImage {
    pub owner: ObjectId,
    /// Image the buffer is seeded from; replacing it re-seeds
    pub source: Handle<Image>,
    /// World height of the billboard; the width follows the image's aspect ratio
    pub height: f32,
    /// Locked objects cannot be moved with the gizmo
    pub locked: bool,
    pub opacity: f32,
}

impl PaintableImage {
    pub fn new(owner: ObjectId, source: Handle<Image>) -> Self {
        Self {
            owner,
            source,
            height: 1.0,
            locked: false,
            opacity: 1.0,
        }
    }
}

/// Paint state attached to a [`PaintableImage`]
#[derive(Component)]
pub struct ImagePainter {
    pub controller: PaintInteractionController,
    pub texture: PaintableTexture<PaintMaterial>,
    seeded_from: Option<AssetId<Image>>,
    pub(crate) raycast: Option<(AssetId<Mesh>, MeshRaycastData)>,
}

impl ImagePainter {
    pub fn new(owner: ObjectId, config: &PaintConfig) -> Self {
        Self {
            controller: PaintInteractionController::from_config(owner, config),
            texture: PaintableTexture::new(ExportFormat::from(&config.export)),
            seeded_from: None,
            raycast: None,
        }
    }
}

/// Picking geometry for `mesh`, rebuilt when the entity's mesh changes
pub(crate) fn cached_raycast_data<'a>(
    cache: &'a mut Option<(AssetId<Mesh>, MeshRaycastData)>,
    mesh: &Mesh3d,
    meshes: &Assets<Mesh>,
) -> Option<&'a MeshRaycastData> {
    let id = mesh.0.id();
    if !matches!(cache, Some((cached, _)) if *cached == id) {
        let data = mesh_raycast_data(meshes.get(id)?)?;
        *cache = Some((id, data));
    }
    cache.as_ref().map(|(_, data)| data)
}

/// Copy a Bevy image into an 8-bit sRGB-encoded RGBA buffer.
///
/// Supports 8-bit RGBA and 32-bit float RGBA textures. Linear formats are
/// encoded to sRGB so the buffer matches the file it is saved to.
pub fn rgba_from_image(image: &Image) -> Option<RgbaImage> {
    use bevy::render::render_resource::TextureFormat;

    let data = image.data.as_ref()?;
    let linear: Vec<[f32; 4]> = match image.texture_descriptor.format {
        TextureFormat::Rgba8UnormSrgb => {
            return RgbaImage::from_raw(image.width(), image.height(), data.clone());
        }
        TextureFormat::Rgba8Unorm => data
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]].map(|v| v as f32 / 255.0))
            .collect(),
        TextureFormat::Rgba32Float => data
            .chunks_exact(16)
            .map(|c| {
                let mut pixel = [0.0f32; 4];
                for (value, raw) in pixel.iter_mut().zip(c.chunks_exact(4)) {
                    *value = f32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]);
                }
                pixel
            })
            .collect(),
        _ => return None,
    };

    let bytes = linear
        .into_iter()
        .flat_map(|[r, g, b, a]| {
            let srgb = Srgba::from(LinearRgba::new(r, g, b, a));
            [srgb.red, srgb.green, srgb.blue, srgb.alpha]
                .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        })
        .collect();
    RgbaImage::from_raw(image.width(), image.height(), bytes)
}

pub(crate) fn apply_opacity(
    materials: &mut Assets<StandardMaterial>,
    material: &PaintMaterial,
    opacity: f32,
) {
    if let Some(material) = materials.get_mut(&material.material) {
        material.base_color = Color::WHITE.with_alpha(opacity.clamp(0.0, 1.0));
    }
}

/// Create painters for new paintable images
pub(crate) fn setup_image_painters(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut gizmo: ResMut<GizmoLock>,
    config: Res<PaintConfig>,
    objects: Res<SceneObjects>,
    query: Query<(Entity, &PaintableImage), Without<ImagePainter>>,
) {
    for (entity, image) in query.iter() {
        let mut painter = ImagePainter::new(image.owner.clone(), &config);
        painter.controller.set_locked(image.locked, &mut *gizmo);

        let material = {
            let mut backend = BevyTextureBackend::new(&mut images, &mut materials);
            painter.texture.bind_material(&mut backend)
        };
        apply_opacity(&mut materials, &material, image.opacity);

        if !objects.0.contains(&image.owner) {
            if let Err(e) = objects.0.insert_object(image.owner.clone(), Vec::new()) {
                warn!("Failed to register {} in the scene store: {}", image.owner, e);
            }
        }

        commands
            .entity(entity)
            .insert((painter, MeshMaterial3d(material.material)));

        info!("Paintable image {} ready", image.owner);
    }
}

/// Seed painters from their source image once it has loaded
pub(crate) fn seed_image_painters(
    images: Res<Assets<Image>>,
    mut query: Query<(&PaintableImage, &mut ImagePainter, &mut Transform)>,
) {
    for (paintable, mut painter, mut transform) in query.iter_mut() {
        let source = paintable.source.id();
        if painter.seeded_from == Some(source) {
            continue;
        }
        let Some(image) = images.get(source) else {
            // Still loading
            continue;
        };
        painter.seeded_from = Some(source);

        let Some(rgba) = rgba_from_image(image) else {
            warn!(
                "Cannot paint on {}: unsupported image format {:?}",
                paintable.owner, image.texture_descriptor.format
            );
            continue;
        };

        match painter.texture.seed_from(&rgba) {
            Ok(()) => {
                painter.controller.surface_changed();
                let scale = billboard_scale(paintable.height, rgba.width(), rgba.height());
                transform.scale = from_glam_vec3(scale);
            }
            Err(e) => warn!("Cannot paint on {}: {}", paintable.owner, e),
        }
    }
}

/// Follow lock and opacity changes on paintable images
pub(crate) fn sync_image_properties(
    mut gizmo: ResMut<GizmoLock>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut query: Query<(&PaintableImage, &mut ImagePainter), Changed<PaintableImage>>,
) {
    for (image, mut painter) in query.iter_mut() {
        if painter.controller.is_locked() != image.locked {
            painter.controller.set_locked(image.locked, &mut *gizmo);
        }
        if let Some(material) = painter.texture.material() {
            apply_opacity(&mut materials, material, image.opacity);
        }
    }
}
