/// Default tile size for CPU surface.
pub const DEFAULT_TILE_SIZE: u32 = 128;

/// Largest texture edge accepted when seeding a surface.
pub const MAX_TEXTURE_SIZE: u32 = 8192;

/// Pointer moves shorter than this (in pixels) do not advance a stroke.
pub const MIN_STROKE_DISTANCE: f32 = 0.001;

/// Epsilon for floating point comparisons in ray intersection.
pub const RAY_EPSILON: f32 = 1e-6;

/// Smallest distance between dab centers, in pixels.
pub const MIN_DAB_SPACING: f32 = 0.1;
