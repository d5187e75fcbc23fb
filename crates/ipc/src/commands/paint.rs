//! Paint command types for the surface painting system.

use serde::{Deserialize, Serialize};
use texpaint_config::{BrushKind, ProjectionKind};

/// Commands for controlling the painting system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PaintCommand {
    /// Switch between the paint and erase brushes
    SetBrushMode { mode: BrushKind },
    /// Set brush diameter in pixels
    SetBrushSize { size: f32 },
    /// Set brush color (RGBA, 0.0-1.0)
    SetBrushColor { color: [f32; 4] },
    /// Switch between UV lookup and analytic billboard projection
    SetProjectionMode { mode: ProjectionKind },
}
