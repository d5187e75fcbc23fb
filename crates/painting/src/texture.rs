//! Paintable texture: a raster buffer bound to a renderer material
//!
//! [`PaintableTexture`] owns the CPU copy of a texture, knows which parts of
//! it changed since the last upload, and encodes it for storage. The
//! renderer side is reached through [`TextureBackend`].

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use tracing::{debug, info};

use crate::brush::{Brush, BrushStrategy};
use crate::constants::{DEFAULT_TILE_SIZE, MAX_TEXTURE_SIZE};
use crate::error::PaintError;
use crate::surface::CpuSurface;
use crate::tiles::{TileCoord, TiledSurface};
use crate::types::{CanvasCoordinate, EncodedImage, ExportFormat, SurfaceCoordinate};

/// Pixels handed to the renderer
pub enum TextureUpload<'a> {
    /// The whole buffer as Rgba32Float bytes
    Full { width: u32, height: u32, bytes: &'a [u8] },
    /// Only these tiles changed
    Tiles {
        surface: &'a TiledSurface,
        tiles: Vec<TileCoord>,
    },
}

/// Renderer side of a paintable texture
pub trait TextureBackend {
    /// Handle to a texture-backed material
    type Material: Clone;

    fn create_material(&mut self) -> Self::Material;

    /// Copy pixels into the material's texture. Returns false when the
    /// texture is not available yet; the caller retries with a full upload.
    fn upload(&mut self, material: &Self::Material, upload: TextureUpload<'_>) -> bool;
}

/// A raster buffer that can be painted on, displayed and exported
pub struct PaintableTexture<M> {
    surface: Option<TiledSurface>,
    material: Option<M>,
    needs_full_upload: bool,
    enabled: bool,
    format: ExportFormat,
}

impl<M: Clone> PaintableTexture<M> {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            surface: None,
            material: None,
            needs_full_upload: false,
            enabled: false,
            format,
        }
    }

    /// Replace the buffer with a copy of `image` and schedule a full upload
    pub fn seed_from(&mut self, image: &RgbaImage) -> Result<(), PaintError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
            return Err(PaintError::InvalidDimensions {
                width,
                height,
                max: MAX_TEXTURE_SIZE,
            });
        }

        self.surface = Some(TiledSurface::from_surface(
            CpuSurface::from_rgba8(image),
            DEFAULT_TILE_SIZE,
        ));
        self.mark_dirty();

        info!("Seeded paintable texture ({}x{})", width, height);
        Ok(())
    }

    /// Decode an encoded image (PNG or JPEG) and seed from it
    pub fn seed_from_bytes(&mut self, bytes: &[u8]) -> Result<(), PaintError> {
        let image = decode_image(bytes)?;
        self.seed_from(&image)
    }

    /// Create the material on first use; later calls return the same handle
    pub fn bind_material<B>(&mut self, backend: &mut B) -> M
    where
        B: TextureBackend<Material = M>,
    {
        if let Some(material) = &self.material {
            return material.clone();
        }

        let material = backend.create_material();
        self.material = Some(material.clone());
        self.needs_full_upload = true;
        material
    }

    pub fn material(&self) -> Option<&M> {
        self.material.as_ref()
    }

    /// Flag the whole texture for re-upload
    pub fn mark_dirty(&mut self) {
        self.needs_full_upload = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.needs_full_upload
            || self
                .surface
                .as_ref()
                .is_some_and(TiledSurface::has_dirty_tiles)
    }

    pub fn is_seeded(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabled textures ignore draws but keep rendering their last state
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn set_format(&mut self, format: ExportFormat) {
        self.format = format;
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(|s| (s.width(), s.height()))
    }

    pub fn surface(&self) -> Option<&TiledSurface> {
        self.surface.as_ref()
    }

    /// Map a surface coordinate into this buffer's pixel space
    pub fn to_canvas(&self, coordinate: SurfaceCoordinate) -> Option<CanvasCoordinate> {
        let (width, height) = self.dimensions()?;
        Some(coordinate.to_canvas(width, height))
    }

    /// Continue the brush's stroke to `at`.
    ///
    /// Returns true if any pixel changed. Disabled or unseeded textures are
    /// left untouched.
    pub fn draw(&mut self, brush: &mut Brush, at: CanvasCoordinate) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        brush.draw(at, surface) > 0
    }

    /// Push pending changes to the renderer. Returns true if anything was uploaded.
    pub fn sync<B>(&mut self, backend: &mut B) -> bool
    where
        B: TextureBackend<Material = M>,
    {
        let (Some(surface), Some(material)) = (self.surface.as_mut(), self.material.as_ref()) else {
            return false;
        };

        let uploaded = if self.needs_full_upload {
            surface.take_dirty_tiles();
            let upload = TextureUpload::Full {
                width: surface.width(),
                height: surface.height(),
                bytes: surface.surface().as_bytes(),
            };
            backend.upload(material, upload)
        } else {
            let tiles = surface.take_dirty_tiles();
            if tiles.is_empty() {
                return false;
            }
            debug!("Uploading {} dirty tiles", tiles.len());
            backend.upload(
                material,
                TextureUpload::Tiles {
                    surface: &*surface,
                    tiles,
                },
            )
        };

        self.needs_full_upload = !uploaded;
        uploaded
    }

    /// Encode the buffer in the configured format
    pub fn export(&self) -> Result<EncodedImage, PaintError> {
        let surface = self.surface.as_ref().ok_or(PaintError::NotSeeded)?;
        let rgba = surface.surface().to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut bytes = Vec::new();
        match self.format {
            ExportFormat::Png => {
                PngEncoder::new(&mut bytes).write_image(
                    rgba.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )?;
            }
            ExportFormat::Jpeg { quality } => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
                JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )?;
            }
        }

        debug!(
            "Exported {}x{} texture as {} ({} bytes)",
            width,
            height,
            self.format.extension(),
            bytes.len()
        );

        Ok(EncodedImage {
            format: self.format,
            width,
            height,
            bytes,
        })
    }
}

/// Decode a PNG or JPEG blob into 8-bit RGBA
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, PaintError> {
    let image = image::load_from_memory(bytes).map_err(PaintError::Decode)?;
    Ok(image.to_rgba8())
}
