//! Shared configuration for texpaint
//!
//! This crate provides the single source of truth for brush defaults,
//! surface projection, export format, asset layout and input bindings
//! shared by the painting core, the asset committer and the Bevy scene.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Environment variable holding the path of a JSON config file
pub const CONFIG_ENV: &str = "TEXPAINT_CONFIG";

/// Environment variable overriding the project root directory
pub const PROJECT_ROOT_ENV: &str = "TEXPAINT_PROJECT_ROOT";

/// Default brush diameter in pixels
pub const DEFAULT_BRUSH_SIZE: f32 = 5.0;

/// Default dab spacing as a fraction of the brush diameter
pub const DEFAULT_BRUSH_SPACING: f32 = 0.25;

/// Project-relative directory painted textures are written to
pub const DEFAULT_ASSETS_SUBDIR: &str = "models/images";

/// Suffix appended to the owner id to build the texture filename
pub const DEFAULT_ASSET_SUFFIX: &str = "-texture";

/// Default JPEG quality (1-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which brush strategy is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushKind {
    #[default]
    Paint,
    Erase,
}

/// Brush defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub kind: BrushKind,
    /// Diameter in pixels
    pub size: f32,
    /// Straight-alpha RGBA, 0.0-1.0, sRGB-encoded like the saved texture
    pub color: [f32; 4],
    /// 0.0 = soft edge, 1.0 = hard edge
    pub hardness: f32,
    pub opacity: f32,
    /// Fraction of the diameter between dabs
    pub spacing: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            kind: BrushKind::Paint,
            size: DEFAULT_BRUSH_SIZE,
            color: [0.0, 0.0, 0.0, 1.0],
            hardness: 1.0,
            opacity: 1.0,
            spacing: DEFAULT_BRUSH_SPACING,
        }
    }
}

/// How pointer hits are turned into surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Use the mesh's UV at the hit point
    Uv,
    /// Reconstruct the billboard rectangle from the object's transform
    #[default]
    Analytic,
}

/// Encoded format for exported textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormatKind {
    #[default]
    Png,
    Jpeg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ImageFormatKind,
    /// Only used for JPEG
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ImageFormatKind::Png,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Where committed textures land on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub project_root: PathBuf,
    pub subdir: String,
    pub suffix: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            subdir: DEFAULT_ASSETS_SUBDIR.to_string(),
            suffix: DEFAULT_ASSET_SUFFIX.to_string(),
        }
    }
}

/// Key that must be held while painting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKey {
    #[default]
    Shift,
    Control,
    Alt,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub modifier: ModifierKey,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct PaintConfig {
    pub brush: BrushConfig,
    pub projection: ProjectionKind,
    pub export: ExportConfig,
    pub assets: AssetsConfig,
    pub input: InputConfig,
}

impl PaintConfig {
    /// Parse a config from a JSON string. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Build the config from `TEXPAINT_CONFIG` and `TEXPAINT_PROJECT_ROOT`.
    ///
    /// A file that fails to load falls back to defaults. The error is handed
    /// back so the caller can report it once logging is running.
    pub fn from_env() -> (Self, Option<ConfigError>) {
        Self::from_sources(
            std::env::var_os(CONFIG_ENV),
            std::env::var_os(PROJECT_ROOT_ENV),
        )
    }

    fn from_sources(
        path: Option<OsString>,
        project_root: Option<OsString>,
    ) -> (Self, Option<ConfigError>) {
        let (mut config, error) = match path.map(Self::load) {
            Some(Ok(config)) => (config, None),
            Some(Err(e)) => (Self::default(), Some(e)),
            None => (Self::default(), None),
        };

        if let Some(root) = project_root {
            config.assets.project_root = PathBuf::from(root);
        }

        (config, error)
    }
}
