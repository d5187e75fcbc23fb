//! Brush strategies for stroking a tiled surface
//!
//! A brush turns a sequence of canvas coordinates into circular dabs. The
//! [`StrokeInterpolator`] fills the space between consecutive coordinates of
//! the same stroke so fast pointer motion does not leave gaps.

use texpaint_config::BrushConfig;
use tracing::debug;

use crate::constants::{MIN_DAB_SPACING, MIN_STROKE_DISTANCE};
use crate::tiles::TiledSurface;
use crate::types::{BlendMode, BrushMode, CanvasCoordinate};

/// Brush parameters shared by every strategy
#[derive(Debug, Clone, PartialEq)]
pub struct BrushSettings {
    /// Diameter in pixels
    pub size: f32,
    /// Straight-alpha sRGB-encoded RGBA
    pub color: [f32; 4],
    /// 0.0 = soft, 1.0 = hard
    pub hardness: f32,
    pub opacity: f32,
    /// Fraction of the diameter between dabs
    pub spacing: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::from(&BrushConfig::default())
    }
}

impl From<&BrushConfig> for BrushSettings {
    fn from(config: &BrushConfig) -> Self {
        Self {
            size: config.size.max(0.0),
            color: config.color,
            hardness: config.hardness.clamp(0.0, 1.0),
            opacity: config.opacity.clamp(0.0, 1.0),
            spacing: config.spacing.max(0.0),
        }
    }
}

impl BrushSettings {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }

    /// Distance between dab centers in pixels, never more than the radius
    pub fn spacing_distance(&self) -> f32 {
        let radius = self.radius();
        (self.size * self.spacing).min(radius).max(MIN_DAB_SPACING)
    }
}

/// Places evenly spaced dab centers along a stroke
#[derive(Debug, Clone, Default)]
pub struct StrokeInterpolator {
    last: Option<CanvasCoordinate>,
    /// Distance travelled since the last emitted dab
    carry: f32,
}

impl StrokeInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous coordinate of the current stroke
    pub fn previous(&self) -> Option<CanvasCoordinate> {
        self.last
    }

    /// Forget the previous coordinate; the next point starts a new stroke
    pub fn reset(&mut self) {
        self.last = None;
        self.carry = 0.0;
    }

    /// Advance the stroke to `to`, returning the dab centers to stamp.
    ///
    /// The first point of a stroke always yields a dab at that point.
    pub fn advance(&mut self, to: CanvasCoordinate, spacing: f32) -> Vec<CanvasCoordinate> {
        let Some(from) = self.last else {
            self.last = Some(to);
            self.carry = 0.0;
            return vec![to];
        };

        let distance = from.distance(to);
        if distance < MIN_STROKE_DISTANCE {
            return Vec::new();
        }

        let spacing = spacing.max(MIN_DAB_SPACING);
        let mut dabs = Vec::new();
        let mut next = (spacing - self.carry).max(0.0);
        let mut last_emitted = None;

        while next <= distance {
            dabs.push(from.lerp(to, next / distance));
            last_emitted = Some(next);
            next += spacing;
        }

        self.carry = match last_emitted {
            Some(at) => distance - at,
            None => self.carry + distance,
        };
        self.last = Some(to);

        dabs
    }
}

/// A tool that mutates a surface along a stroke
pub trait BrushStrategy {
    fn mode(&self) -> BrushMode;

    /// Continue the current stroke to `at`. Returns the number of dabs stamped.
    fn draw(&mut self, at: CanvasCoordinate, surface: &mut TiledSurface) -> usize;

    /// End the current stroke without drawing
    fn reset_stroke(&mut self);
}

fn stamp_along(
    stroke: &mut StrokeInterpolator,
    settings: &BrushSettings,
    at: CanvasCoordinate,
    surface: &mut TiledSurface,
    blend_mode: BlendMode,
) -> usize {
    let radius = settings.radius();
    let dabs = stroke.advance(at, settings.spacing_distance());

    let mut stamped = 0;
    for dab in &dabs {
        if surface
            .apply_dab(
                dab.x,
                dab.y,
                radius,
                settings.color,
                settings.opacity,
                settings.hardness,
                blend_mode,
            )
            .is_some()
        {
            stamped += 1;
        }
    }

    if !dabs.is_empty() {
        debug!(
            "{:?} brush: {} dabs ({} on surface) ending at ({:.1}, {:.1})",
            blend_mode,
            dabs.len(),
            stamped,
            at.x,
            at.y
        );
    }

    stamped
}

/// Stamps opaque circular marks in the brush color
#[derive(Debug, Clone, Default)]
pub struct PaintBrush {
    pub settings: BrushSettings,
    stroke: StrokeInterpolator,
}

impl PaintBrush {
    pub fn new(settings: BrushSettings) -> Self {
        Self {
            settings,
            stroke: StrokeInterpolator::new(),
        }
    }
}

impl BrushStrategy for PaintBrush {
    fn mode(&self) -> BrushMode {
        BrushMode::Paint
    }

    fn draw(&mut self, at: CanvasCoordinate, surface: &mut TiledSurface) -> usize {
        stamp_along(&mut self.stroke, &self.settings, at, surface, BlendMode::Normal)
    }

    fn reset_stroke(&mut self) {
        self.stroke.reset();
    }
}

/// Clears pixels to transparency
#[derive(Debug, Clone, Default)]
pub struct EraseBrush {
    pub settings: BrushSettings,
    stroke: StrokeInterpolator,
}

impl EraseBrush {
    pub fn new(settings: BrushSettings) -> Self {
        Self {
            settings,
            stroke: StrokeInterpolator::new(),
        }
    }
}

impl BrushStrategy for EraseBrush {
    fn mode(&self) -> BrushMode {
        BrushMode::Erase
    }

    fn draw(&mut self, at: CanvasCoordinate, surface: &mut TiledSurface) -> usize {
        stamp_along(&mut self.stroke, &self.settings, at, surface, BlendMode::Erase)
    }

    fn reset_stroke(&mut self) {
        self.stroke.reset();
    }
}

/// The active brush
#[derive(Debug, Clone)]
pub enum Brush {
    Paint(PaintBrush),
    Erase(EraseBrush),
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(BrushMode::default(), BrushSettings::default())
    }
}

impl Brush {
    pub fn new(mode: BrushMode, settings: BrushSettings) -> Self {
        match mode {
            BrushMode::Paint => Self::Paint(PaintBrush::new(settings)),
            BrushMode::Erase => Self::Erase(EraseBrush::new(settings)),
        }
    }

    pub fn from_config(config: &BrushConfig) -> Self {
        Self::new(config.kind.into(), BrushSettings::from(config))
    }

    pub fn settings(&self) -> &BrushSettings {
        match self {
            Self::Paint(brush) => &brush.settings,
            Self::Erase(brush) => &brush.settings,
        }
    }

    pub fn settings_mut(&mut self) -> &mut BrushSettings {
        match self {
            Self::Paint(brush) => &mut brush.settings,
            Self::Erase(brush) => &mut brush.settings,
        }
    }

    /// Swap the strategy, keeping settings. Stroke memory is always dropped.
    pub fn set_mode(&mut self, mode: BrushMode) {
        let settings = self.settings().clone();
        *self = Self::new(mode, settings);
    }
}

impl BrushStrategy for Brush {
    fn mode(&self) -> BrushMode {
        match self {
            Self::Paint(brush) => brush.mode(),
            Self::Erase(brush) => brush.mode(),
        }
    }

    fn draw(&mut self, at: CanvasCoordinate, surface: &mut TiledSurface) -> usize {
        match self {
            Self::Paint(brush) => brush.draw(at, surface),
            Self::Erase(brush) => brush.draw(at, surface),
        }
    }

    fn reset_stroke(&mut self) {
        match self {
            Self::Paint(brush) => brush.reset_stroke(),
            Self::Erase(brush) => brush.reset_stroke(),
        }
    }
}
