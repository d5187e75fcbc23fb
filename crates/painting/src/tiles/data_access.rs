//! Tile data access for incremental uploads

use super::{TileCoord, TiledSurface};

/// Bytes per Rgba32Float pixel
const BYTES_PER_PIXEL: usize = 16;

impl TiledSurface {
    /// Pixel data for one tile in row-major order.
    /// Edge tiles are smaller than tile_size * tile_size.
    pub fn get_tile_data(&self, coord: TileCoord) -> Vec<[f32; 4]> {
        let (start_x, start_y, tile_width, tile_height) = self.get_tile_bounds(coord);

        let mut data = Vec::with_capacity((tile_width * tile_height) as usize);
        for dy in 0..tile_height {
            for dx in 0..tile_width {
                if let Some(pixel) = self.surface.get_pixel(start_x + dx, start_y + dy) {
                    data.push(pixel);
                }
            }
        }

        data
    }

    /// Get tile bounds (x, y, width, height) in pixel coordinates
    pub fn get_tile_bounds(&self, coord: TileCoord) -> (u32, u32, u32, u32) {
        let tile_start_x = coord.x * self.tile_size;
        let tile_start_y = coord.y * self.tile_size;

        let tile_width = self.tile_size.min(self.surface.width.saturating_sub(tile_start_x));
        let tile_height = self.tile_size.min(self.surface.height.saturating_sub(tile_start_y));

        (tile_start_x, tile_start_y, tile_width, tile_height)
    }

    /// Copy one tile into `dst`, a row-major Rgba32Float buffer covering the
    /// whole surface. Rows falling outside `dst` are skipped.
    pub fn write_tile_bytes(&self, coord: TileCoord, dst: &mut [u8]) {
        let (tile_x, tile_y, tile_w, tile_h) = self.get_tile_bounds(coord);
        let tile_data = self.get_tile_data(coord);
        let surface_width = self.surface.width as usize;

        for local_y in 0..tile_h as usize {
            let src_start = local_y * tile_w as usize;
            let src_end = src_start + tile_w as usize;
            let Some(src_slice) = tile_data.get(src_start..src_end) else {
                continue;
            };
            let src_bytes: &[u8] = bytemuck::cast_slice(src_slice);

            let global_y = tile_y as usize + local_y;
            let dst_start = (global_y * surface_width + tile_x as usize) * BYTES_PER_PIXEL;
            let dst_end = dst_start + src_bytes.len();

            if let Some(dst_row) = dst.get_mut(dst_start..dst_end) {
                dst_row.copy_from_slice(src_bytes);
            }
        }
    }
}
