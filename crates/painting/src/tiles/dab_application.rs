//! Dab application for brush strokes

use tracing::trace;

use super::TiledSurface;
use crate::types::BlendMode;

impl TiledSurface {
    /// Stamp a circular dab onto the surface.
    ///
    /// Returns the bounding box of the affected region (x, y, width, height),
    /// or None if the dab is completely outside the surface.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_dab(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        color: [f32; 4],
        opacity: f32,
        hardness: f32,
        blend_mode: BlendMode,
    ) -> Option<(u32, u32, u32, u32)> {
        trace!(
            "apply_dab: center=({:.1}, {:.1}), radius={:.1}, opacity={:.2}, hardness={:.2}, mode={:?}",
            center_x, center_y, radius, opacity, hardness, blend_mode
        );

        if radius <= 0.0 || opacity <= 0.0 || !center_x.is_finite() || !center_y.is_finite() {
            return None;
        }

        let x_min_f = (center_x - radius).floor();
        let y_min_f = (center_y - radius).floor();
        let x_max_f = (center_x + radius).ceil();
        let y_max_f = (center_y + radius).ceil();

        // Clamp to surface bounds
        let x_min = (x_min_f.max(0.0) as u32).min(self.surface.width);
        let y_min = (y_min_f.max(0.0) as u32).min(self.surface.height);
        let x_max = (x_max_f.max(0.0) as u32).min(self.surface.width);
        let y_max = (y_max_f.max(0.0) as u32).min(self.surface.height);

        if x_min >= x_max || y_min >= y_max {
            return None;
        }

        let radius_sq = radius * radius;

        for py in y_min..y_max {
            for px in x_min..x_max {
                // Distance from the pixel center
                let dx = (px as f32 + 0.5) - center_x;
                let dy = (py as f32 + 0.5) - center_y;
                let dist_sq = dx * dx + dy * dy;

                if dist_sq > radius_sq {
                    continue;
                }

                let falloff = calculate_hardness_falloff(dist_sq.sqrt() / radius, hardness);
                if falloff <= 0.0 {
                    continue;
                }

                let effective_opacity = opacity * falloff;
                match blend_mode {
                    BlendMode::Normal => self.surface.blend_pixel(px, py, color, effective_opacity),
                    BlendMode::Erase => self.surface.erase_pixel(px, py, effective_opacity),
                }
            }
        }

        let width = x_max - x_min;
        let height = y_max - y_min;
        self.mark_region_dirty(x_min, y_min, width, height);

        Some((x_min, y_min, width, height))
    }
}

/// Calculate falloff based on hardness
/// distance_normalized is 0 at center, 1 at edge
/// hardness is 0.0 (soft) to 1.0 (hard)
#[inline]
pub fn calculate_hardness_falloff(distance_normalized: f32, hardness: f32) -> f32 {
    if hardness >= 1.0 {
        if distance_normalized <= 1.0 { 1.0 } else { 0.0 }
    } else {
        let t = distance_normalized.clamp(0.0, 1.0);
        let soft = 1.0 - t;
        let hard = if distance_normalized <= 1.0 { 1.0 } else { 0.0 };
        soft * (1.0 - hardness) + hard * hardness
    }
}
