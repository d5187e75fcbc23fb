use std::fmt;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use texpaint_config::{BrushKind, ExportConfig, ImageFormatKind, ProjectionKind};

/// Identity of a scene object in the application store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Screen-space rectangle of the rendered viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Viewport anchored at the screen origin
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// Pointer position in normalized device coordinates ([-1, 1], +y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Normalize a raw screen position against the viewport.
    ///
    /// Returns `None` for an empty viewport.
    pub fn from_screen(position: Vec2, viewport: ViewportRect) -> Option<Self> {
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return None;
        }
        Some(Self {
            x: ((position.x - viewport.left) / viewport.width) * 2.0 - 1.0,
            y: -((position.y - viewport.top) / viewport.height) * 2.0 + 1.0,
        })
    }

    /// Inverse of [`PointerSample::from_screen`]
    pub fn to_screen(self, viewport: ViewportRect) -> Vec2 {
        Vec2::new(
            viewport.left + (self.x + 1.0) * 0.5 * viewport.width,
            viewport.top + (1.0 - self.y) * 0.5 * viewport.height,
        )
    }
}

/// Position within a surface's 0..1 parameterization.
///
/// Origin is the bottom-left corner, y grows upward (the UV convention).
/// `z` is only reported by analytic projection: the hit's distance from
/// the billboard plane in the object's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceCoordinate {
    pub x: f32,
    pub y: f32,
    pub z: Option<f32>,
}

impl SurfaceCoordinate {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }

    /// Convert to raster space (top-left origin) for a buffer of the given size
    pub fn to_canvas(self, width: u32, height: u32) -> CanvasCoordinate {
        CanvasCoordinate {
            x: self.x * width as f32,
            y: (1.0 - self.y) * height as f32,
        }
    }
}

/// Pixel position within the raster buffer (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasCoordinate {
    pub x: f32,
    pub y: f32,
}

impl CanvasCoordinate {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// How a ray hit becomes a surface coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Use the UV interpolated at the hit
    Uv,
    /// Reconstruct the billboard rectangle from the object's world transform
    #[default]
    Analytic,
}

impl From<ProjectionKind> for ProjectionMode {
    fn from(kind: ProjectionKind) -> Self {
        match kind {
            ProjectionKind::Uv => Self::Uv,
            ProjectionKind::Analytic => Self::Analytic,
        }
    }
}

/// Brush strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrushMode {
    #[default]
    Paint,
    Erase,
}

impl From<BrushKind> for BrushMode {
    fn from(kind: BrushKind) -> Self {
        match kind {
            BrushKind::Paint => Self::Paint,
            BrushKind::Erase => Self::Erase,
        }
    }
}

/// Blend modes for dab application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlendMode {
    #[default]
    Normal = 0,
    Erase = 1,
}

/// A world-space ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Normalized direction
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Result of intersecting a ray with a paint target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit position
    pub point: Vec3,
    /// Distance along the ray
    pub distance: f32,
    /// Interpolated UV (bottom-left origin), if the mesh carries UVs
    pub uv: Option<Vec2>,
}

/// World transform of a scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl WorldTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Local point to world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * local)
    }

    /// World point to local space
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        (self.rotation.inverse() * (world - self.translation)) / self.scale
    }

    /// World direction to local space (not normalized, so ray distances are preserved)
    pub fn inverse_transform_vector(&self, world: Vec3) -> Vec3 {
        (self.rotation.inverse() * world) / self.scale
    }
}

/// Encoded image format for exported textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg {
        quality: u8,
    },
}

impl ExportFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

impl From<&ExportConfig> for ExportFormat {
    fn from(config: &ExportConfig) -> Self {
        match config.format {
            ImageFormatKind::Png => Self::Png,
            ImageFormatKind::Jpeg => Self::Jpeg {
                quality: config.jpeg_quality.clamp(1, 100),
            },
        }
    }
}

/// An encoded texture ready for durable storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_from_screen() {
        let viewport = ViewportRect::new(100.0, 50.0, 800.0, 600.0);

        let center = PointerSample::from_screen(Vec2::new(500.0, 350.0), viewport).unwrap();
        assert!(center.x.abs() < 1e-6 && center.y.abs() < 1e-6);

        let top_left = PointerSample::from_screen(Vec2::new(100.0, 50.0), viewport).unwrap();
        assert_eq!(top_left, PointerSample::new(-1.0, 1.0));

        let bottom_right = PointerSample::from_screen(Vec2::new(900.0, 650.0), viewport).unwrap();
        assert_eq!(bottom_right, PointerSample::new(1.0, -1.0));
    }

    #[test]
    fn test_pointer_empty_viewport() {
        let viewport = ViewportRect::from_size(0.0, 600.0);
        assert!(PointerSample::from_screen(Vec2::new(10.0, 10.0), viewport).is_none());
    }

    #[test]
    fn test_pointer_to_screen_inverts() {
        let viewport = ViewportRect::new(10.0, 20.0, 640.0, 480.0);
        let screen = Vec2::new(123.0, 321.0);
        let sample = PointerSample::from_screen(screen, viewport).unwrap();
        assert!((sample.to_screen(viewport) - screen).length() < 1e-3);
    }

    #[test]
    fn test_surface_to_canvas_flips_vertical() {
        let bottom_left = SurfaceCoordinate::new(0.0, 0.0).to_canvas(200, 100);
        assert_eq!(bottom_left, CanvasCoordinate::new(0.0, 100.0));

        let top_right = SurfaceCoordinate::new(1.0, 1.0).to_canvas(200, 100);
        assert_eq!(top_right, CanvasCoordinate::new(200.0, 0.0));
    }

    #[test]
    fn test_world_transform_inverse() {
        let transform = WorldTransform::from_scale_rotation_translation(
            Vec3::new(2.0, 3.0, 1.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(1.0, -2.0, 5.0),
        );
        let local = Vec3::new(0.25, -0.4, 0.1);
        let world = transform.transform_point(local);
        assert!((transform.inverse_transform_point(world) - local).length() < 1e-5);
    }

    #[test]
    fn test_export_format_from_config() {
        let config = ExportConfig {
            format: ImageFormatKind::Jpeg,
            jpeg_quality: 0,
        };
        assert_eq!(ExportFormat::from(&config), ExportFormat::Jpeg { quality: 1 });
        assert_eq!(ExportFormat::Png.extension(), "png");
        assert_eq!(ExportFormat::Jpeg { quality: 80 }.extension(), "jpg");
    }
}
