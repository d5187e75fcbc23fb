//! CPU raster buffer backing a paintable texture

use image::RgbaImage;

/// A floating point RGBA CPU surface for painting.
/// Stores sRGB-encoded pixels as [f32; 4] in 0.0-1.0, straight alpha.
pub struct CpuSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order, top row first
    pixels: Vec<[f32; 4]>,
}

impl CpuSurface {
    /// Create a new surface with the given dimensions, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![[0.0, 0.0, 0.0, 0.0]; pixel_count],
        }
    }

    /// Create a surface holding a copy of an 8-bit image
    pub fn from_rgba8(image: &RgbaImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| {
                [
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                    p[3] as f32 / 255.0,
                ]
            })
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }

    /// Quantize the surface to an 8-bit image (round to nearest)
    pub fn to_rgba8(&self) -> RgbaImage {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            for channel in pixel {
                bytes.push((channel.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
        // Length always matches width * height * 4
        RgbaImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// Clear the surface to a solid color
    pub fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        Some(self.pixels[index])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        self.pixels[index] = color;
    }

    /// Blend a color onto an existing pixel (source-over, straight alpha)
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], opacity: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        let dst = self.pixels[index];

        let src_alpha = (color[3] * opacity).clamp(0.0, 1.0);
        let dst_weight = dst[3] * (1.0 - src_alpha);
        let out_alpha = src_alpha + dst_weight;
        if out_alpha <= 0.0 {
            self.pixels[index] = [dst[0], dst[1], dst[2], 0.0];
            return;
        }

        let channel = |i: usize| (color[i] * src_alpha + dst[i] * dst_weight) / out_alpha;
        self.pixels[index] = [channel(0), channel(1), channel(2), out_alpha];
    }

    /// Erase a pixel toward transparency (destination-out)
    /// The erase_amount (0-1) determines how much alpha is removed; color is kept
    #[inline]
    pub fn erase_pixel(&mut self, x: u32, y: u32, erase_amount: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        let remaining = (1.0 - erase_amount).clamp(0.0, 1.0);
        self.pixels[index][3] *= remaining;
    }

    /// Raw pixel data for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_new_surface() {
        let surface = CpuSurface::new(100, 100);
        assert_eq!(surface.width, 100);
        assert_eq!(surface.height, 100);
        assert_eq!(surface.pixel_count(), 10000);
        assert_eq!(surface.get_pixel(0, 0), Some([0.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_get_set_pixel() {
        let mut surface = CpuSurface::new(10, 10);
        let color = [1.0, 0.5, 0.25, 1.0];

        surface.set_pixel(5, 5, color);
        assert_eq!(surface.get_pixel(5, 5), Some(color));

        // Out of bounds should return None
        assert_eq!(surface.get_pixel(100, 100), None);
    }

    #[test]
    fn test_blend_pixel() {
        let mut surface = CpuSurface::new(10, 10);
        surface.clear([1.0, 1.0, 1.0, 1.0]);

        // Blend 50% opaque red
        surface.blend_pixel(5, 5, [1.0, 0.0, 0.0, 1.0], 0.5);

        let result = surface.get_pixel(5, 5).unwrap();
        assert!((result[0] - 1.0).abs() < 0.01);
        assert!((result[1] - 0.5).abs() < 0.01);
        assert!((result[2] - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_erase_pixel_full() {
        let mut surface = CpuSurface::new(4, 4);
        surface.clear([0.2, 0.4, 0.6, 1.0]);

        surface.erase_pixel(1, 1, 1.0);
        assert_eq!(surface.get_pixel(1, 1), Some([0.2, 0.4, 0.6, 0.0]));
        assert_eq!(surface.get_pixel(0, 0), Some([0.2, 0.4, 0.6, 1.0]));
    }

    #[test]
    fn test_partial_erase_keeps_color() {
        let mut surface = CpuSurface::new(1, 1);
        surface.clear([1.0, 1.0, 1.0, 1.0]);
        surface.erase_pixel(0, 0, 0.5);
        assert_eq!(surface.to_rgba8().get_pixel(0, 0).0, [255, 255, 255, 128]);
    }

    #[test]
    fn test_partial_blend_keeps_color() {
        let mut surface = CpuSurface::new(1, 1);
        surface.blend_pixel(0, 0, [1.0, 0.0, 0.0, 1.0], 0.5);
        assert_eq!(surface.to_rgba8().get_pixel(0, 0).0, [255, 0, 0, 128]);

        // A second half-opaque dab mixes by coverage
        surface.blend_pixel(0, 0, [0.0, 0.0, 1.0, 1.0], 0.5);
        let pixel = surface.get_pixel(0, 0).unwrap();
        assert!((pixel[3] - 0.75).abs() < 1e-6);
        assert!((pixel[0] - 1.0 / 3.0).abs() < 1e-6);
        assert!((pixel[2] - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_translucent_color_over_transparent() {
        let mut surface = CpuSurface::new(1, 1);
        surface.clear([0.0, 1.0, 0.0, 0.0]);
        surface.blend_pixel(0, 0, [0.2, 0.4, 0.6, 0.5], 1.0);
        let pixel = surface.get_pixel(0, 0).unwrap();
        assert!((pixel[0] - 0.2).abs() < 1e-6);
        assert!((pixel[1] - 0.4).abs() < 1e-6);
        assert!((pixel[2] - 0.6).abs() < 1e-6);
        assert!((pixel[3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_alpha_blend_leaves_pixel() {
        let mut surface = CpuSurface::new(1, 1);
        surface.clear([0.3, 0.3, 0.3, 0.0]);
        surface.blend_pixel(0, 0, [1.0, 1.0, 1.0, 1.0], 0.0);
        assert_eq!(surface.get_pixel(0, 0), Some([0.3, 0.3, 0.3, 0.0]));
    }

    #[test]
    fn test_rgba8_conversion_is_lossless() {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([12, 34, 56, 78]));
        image.put_pixel(2, 1, Rgba([1, 254, 128, 0]));

        let surface = CpuSurface::from_rgba8(&image);
        assert_eq!(surface.width, 3);
        assert_eq!(surface.height, 2);
        assert_eq!(surface.get_pixel(0, 0), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(surface.to_rgba8(), image);
    }

    #[test]
    fn test_as_bytes() {
        let surface = CpuSurface::new(2, 2);
        // 4 pixels * 4 components * 4 bytes per f32 = 64 bytes
        assert_eq!(surface.as_bytes().len(), 64);
    }
}
