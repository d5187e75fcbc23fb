//! Tile management and dirty tracking for CPU surfaces

mod dab_application;
mod data_access;
mod dirty_tracking;

use crate::surface::CpuSurface;
use std::collections::HashSet;

pub use dab_application::calculate_hardness_falloff;

/// Tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// Manages tiled access to a surface with dirty tracking
pub struct TiledSurface {
    pub(crate) surface: CpuSurface,
    pub(crate) tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
}

impl TiledSurface {
    /// Create a new tiled surface with the given dimensions and tile size
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self::from_surface(CpuSurface::new(width, height), tile_size)
    }

    /// Wrap an existing surface. Nothing is marked dirty.
    pub fn from_surface(surface: CpuSurface, tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        let tiles_x = surface.width.div_ceil(tile_size);
        let tiles_y = surface.height.div_ceil(tile_size);

        Self {
            surface,
            tile_size,
            tiles_x,
            tiles_y,
            dirty_tiles: HashSet::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.surface.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.surface.height
    }

    /// Get the tile size
    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Get the number of tiles in x direction
    #[inline]
    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    /// Get the number of tiles in y direction
    #[inline]
    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    /// Get the underlying surface for direct pixel access
    #[inline]
    pub fn surface(&self) -> &CpuSurface {
        &self.surface
    }

    /// Get mutable access to the underlying surface
    #[inline]
    pub fn surface_mut(&mut self) -> &mut CpuSurface {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlendMode;

    #[test]
    fn test_tiled_surface_creation() {
        let surface = TiledSurface::new(256, 256, 128);
        assert_eq!(surface.tiles_x(), 2);
        assert_eq!(surface.tiles_y(), 2);
        assert_eq!(surface.tile_size(), 128);
    }

    #[test]
    fn test_tiled_surface_non_aligned() {
        // 300x300 with 128 tile size should give 3x3 tiles
        let surface = TiledSurface::new(300, 300, 128);
        assert_eq!(surface.tiles_x(), 3);
        assert_eq!(surface.tiles_y(), 3);
    }

    #[test]
    fn test_from_surface_keeps_pixels() {
        let mut raw = CpuSurface::new(10, 20);
        raw.set_pixel(3, 4, [0.5, 0.5, 0.5, 1.0]);

        let tiled = TiledSurface::from_surface(raw, 8);
        assert_eq!(tiled.width(), 10);
        assert_eq!(tiled.height(), 20);
        assert_eq!(tiled.tiles_x(), 2);
        assert_eq!(tiled.tiles_y(), 3);
        assert_eq!(tiled.surface().get_pixel(3, 4), Some([0.5, 0.5, 0.5, 1.0]));
        assert!(!tiled.has_dirty_tiles());
    }

    #[test]
    fn test_mark_dirty() {
        let mut surface = TiledSurface::new(256, 256, 128);

        surface.mark_dirty(0, 0);
        assert!(surface.has_dirty_tiles());
        assert_eq!(surface.dirty_tile_count(), 1);

        surface.mark_dirty(130, 130);
        assert_eq!(surface.dirty_tile_count(), 2);

        let tiles = surface.take_dirty_tiles();
        assert_eq!(tiles.len(), 2);
        assert!(!surface.has_dirty_tiles());
    }

    #[test]
    fn test_mark_region_dirty() {
        let mut surface = TiledSurface::new(256, 256, 128);

        // Mark a region that spans all 4 tiles
        surface.mark_region_dirty(100, 100, 56, 56);
        assert_eq!(surface.dirty_tile_count(), 4);
    }

    #[test]
    fn test_mark_all_dirty() {
        let mut surface = TiledSurface::new(300, 130, 128);
        surface.mark_all_dirty();
        assert_eq!(surface.dirty_tile_count(), 6);
    }

    #[test]
    fn test_get_tile_data() {
        let mut surface = TiledSurface::new(256, 256, 128);

        surface.surface_mut().set_pixel(0, 0, [1.0, 0.0, 0.0, 1.0]);

        let tile_data = surface.get_tile_data(TileCoord { x: 0, y: 0 });
        assert_eq!(tile_data.len(), 128 * 128);
        assert_eq!(tile_data[0], [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_apply_dab() {
        let mut surface = TiledSurface::new(256, 256, 128);
        surface.surface_mut().clear([1.0, 1.0, 1.0, 1.0]);

        let result = surface.apply_dab(128.0, 128.0, 10.0, [1.0, 0.0, 0.0, 1.0], 1.0, 1.0, BlendMode::Normal);

        let (_x, _y, w, h) = result.unwrap();
        assert!(w > 0 && h > 0);

        let center = surface.surface().get_pixel(128, 128).unwrap();
        assert!((center[0] - 1.0).abs() < 0.01);
        assert!(center[1] < 0.5);

        // Outside the radius stays white
        let outside = surface.surface().get_pixel(128, 140).unwrap();
        assert_eq!(outside, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_apply_dab_marks_dirty() {
        let mut surface = TiledSurface::new(256, 256, 128);

        surface.apply_dab(128.0, 128.0, 10.0, [1.0, 0.0, 0.0, 1.0], 1.0, 1.0, BlendMode::Normal);

        // Straddles the corner shared by all four tiles
        assert_eq!(surface.dirty_tile_count(), 4);
    }

    #[test]
    fn test_apply_dab_erase() {
        let mut surface = TiledSurface::new(256, 256, 128);
        surface.surface_mut().clear([1.0, 0.0, 0.0, 1.0]);

        let result = surface.apply_dab(128.0, 128.0, 10.0, [0.0, 0.0, 0.0, 1.0], 1.0, 1.0, BlendMode::Erase);
        assert!(result.is_some());

        let center = surface.surface().get_pixel(128, 128).unwrap();
        assert_eq!(center[3], 0.0);
    }

    #[test]
    fn test_apply_dab_outside_surface() {
        let mut surface = TiledSurface::new(64, 64, 32);
        let result = surface.apply_dab(-50.0, -50.0, 5.0, [1.0, 0.0, 0.0, 1.0], 1.0, 1.0, BlendMode::Normal);
        assert!(result.is_none());
        assert!(!surface.has_dirty_tiles());
    }

    #[test]
    fn test_hardness_falloff() {
        // Hard brush (hardness = 1.0)
        assert_eq!(calculate_hardness_falloff(0.0, 1.0), 1.0);
        assert_eq!(calculate_hardness_falloff(0.5, 1.0), 1.0);
        assert_eq!(calculate_hardness_falloff(1.0, 1.0), 1.0);

        // Soft brush (hardness = 0.0)
        assert_eq!(calculate_hardness_falloff(0.0, 0.0), 1.0);
        assert_eq!(calculate_hardness_falloff(0.5, 0.0), 0.5);
        assert_eq!(calculate_hardness_falloff(1.0, 0.0), 0.0);

        let mid = calculate_hardness_falloff(0.5, 0.5);
        assert!(mid > 0.5 && mid < 1.0);
    }

    #[test]
    fn test_edge_tile_data() {
        let surface = TiledSurface::new(150, 150, 128);

        // Edge tile is 22x22 pixels
        let tile_data = surface.get_tile_data(TileCoord { x: 1, y: 1 });
        assert_eq!(tile_data.len(), 22 * 22);
    }

    #[test]
    fn test_get_tile_bounds() {
        let surface = TiledSurface::new(150, 150, 128);

        let (x, y, w, h) = surface.get_tile_bounds(TileCoord { x: 0, y: 0 });
        assert_eq!((x, y, w, h), (0, 0, 128, 128));

        let (x, y, w, h) = surface.get_tile_bounds(TileCoord { x: 1, y: 1 });
        assert_eq!((x, y, w, h), (128, 128, 22, 22));
    }

    #[test]
    fn test_write_tile_bytes_matches_full_copy() {
        let mut surface = TiledSurface::new(20, 12, 8);
        surface.apply_dab(15.0, 9.0, 3.0, [0.2, 0.4, 0.6, 1.0], 1.0, 1.0, BlendMode::Normal);

        let mut uploaded = vec![0u8; surface.surface().as_bytes().len()];
        for tile in surface.take_dirty_tiles() {
            surface.write_tile_bytes(tile, &mut uploaded);
        }

        // Every changed pixel lives in a dirty tile, untouched pixels are zero in both
        assert_eq!(uploaded.as_slice(), surface.surface().as_bytes());
    }
}
