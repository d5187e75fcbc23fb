//! Painting system for Bevy integration
//!
//! This module gives each paintable image a GPU texture and keeps it in sync
//! with the CPU raster buffer, uploading only dirty tiles after the first
//! full upload. The buffer holds sRGB-encoded values like the exported
//! file; color channels are linearized on upload to the Rgba32Float texture.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages};

use texpaint_painting::{TextureBackend, TextureUpload};

use crate::paintable::{
    ImagePainter, seed_image_painters, setup_image_painters, sync_image_properties,
};

/// Bytes per Rgba32Float pixel
const BYTES_PER_PIXEL: usize = 16;

/// Convert the color channels of Rgba32Float pixels from sRGB to linear
fn linearize(bytes: &mut [u8]) {
    for pixel in bytes.chunks_exact_mut(BYTES_PER_PIXEL) {
        let mut channels = [0.0f32; 4];
        for (value, raw) in channels.iter_mut().zip(pixel.chunks_exact(4)) {
            *value = f32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]);
        }
        let linear = LinearRgba::from(Srgba::new(
            channels[0],
            channels[1],
            channels[2],
            channels[3],
        ));
        for (raw, value) in pixel
            .chunks_exact_mut(4)
            .zip([linear.red, linear.green, linear.blue])
        {
            raw.copy_from_slice(&value.to_ne_bytes());
        }
    }
}

/// Texture and material displaying a paintable image
#[derive(Debug, Clone, PartialEq)]
pub struct PaintMaterial {
    /// Rgba32Float texture mirroring the raster buffer
    pub image: Handle<Image>,
    pub material: Handle<StandardMaterial>,
}

/// [`TextureBackend`] over Bevy's image and material assets
pub struct BevyTextureBackend<'a> {
    images: &'a mut Assets<Image>,
    materials: &'a mut Assets<StandardMaterial>,
}

impl<'a> BevyTextureBackend<'a> {
    pub fn new(
        images: &'a mut Assets<Image>,
        materials: &'a mut Assets<StandardMaterial>,
    ) -> Self {
        Self { images, materials }
    }
}

impl TextureBackend for BevyTextureBackend<'_> {
    type Material = PaintMaterial;

    fn create_material(&mut self) -> PaintMaterial {
        // Placeholder until the first full upload sizes it
        let mut image = Image::new_fill(
            Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            bytemuck::bytes_of(&[1.0f32, 1.0f32, 1.0f32, 1.0f32]),
            TextureFormat::Rgba32Float,
            RenderAssetUsages::all(),
        );
        image.texture_descriptor.usage = TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST;
        let image = self.images.add(image);

        let material = self.materials.add(StandardMaterial {
            base_color_texture: Some(image.clone()),
            base_color: Color::WHITE,
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        });

        PaintMaterial { image, material }
    }

    fn upload(&mut self, material: &PaintMaterial, upload: TextureUpload<'_>) -> bool {
        let Some(image) = self.images.get_mut(&material.image) else {
            return false;
        };

        match upload {
            TextureUpload::Full {
                width,
                height,
                bytes,
            } => {
                image.texture_descriptor.size = Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                };
                let mut data = bytes.to_vec();
                linearize(&mut data);
                image.data = Some(data);
                true
            }
            TextureUpload::Tiles { surface, tiles } => {
                let Some(ref mut image_data) = image.data else {
                    return false;
                };
                let expected =
                    surface.width() as usize * surface.height() as usize * BYTES_PER_PIXEL;
                if image_data.len() != expected {
                    return false;
                }
                let row_bytes = surface.width() as usize * BYTES_PER_PIXEL;
                for tile_coord in tiles {
                    surface.write_tile_bytes(tile_coord, image_data);
                    let (x, y, w, h) = surface.get_tile_bounds(tile_coord);
                    for row in y as usize..(y + h) as usize {
                        let start = row * row_bytes + x as usize * BYTES_PER_PIXEL;
                        let end = start + w as usize * BYTES_PER_PIXEL;
                        if let Some(span) = image_data.get_mut(start..end) {
                            linearize(span);
                        }
                    }
                }
                true
            }
        }
    }
}

/// Plugin for the painting system
pub struct PaintingSystemPlugin;

impl Plugin for PaintingSystemPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                setup_image_painters,
                seed_image_painters,
                sync_image_properties,
            )
                .chain(),
        )
        .add_systems(PostUpdate, upload_dirty_textures);
    }
}

/// Upload dirty tiles to GPU
fn upload_dirty_textures(
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut painters: Query<&mut ImagePainter>,
) {
    let mut backend = BevyTextureBackend::new(&mut images, &mut materials);
    for mut painter in painters.iter_mut() {
        if painter.texture.is_dirty() {
            painter.texture.sync(&mut backend);
        }
    }
}
