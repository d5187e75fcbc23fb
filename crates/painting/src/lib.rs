//! texpaint painting core - paint directly onto objects in a 3D view
//!
//! This crate is renderer-agnostic. It provides:
//! - [`camera`] - Pointer rays from a perspective camera
//! - [`raycast`] - Ray-mesh intersection
//! - [`intersect`] - Pointer to surface coordinate projection (UV or analytic)
//! - [`surface`] - CPU float RGBA surface
//! - [`tiles`] - Tile management with dirty tracking
//! - [`brush`] - Paint and erase brushes with gap-free stroke interpolation
//! - [`texture`] - Paintable texture: seeding, renderer upload, export
//! - [`controller`] - Interaction state machine gating paint strokes
//! - [`commit`] - Hand-off of exported textures to persistence

pub mod brush;
pub mod camera;
pub mod commit;
pub mod constants;
pub mod controller;
pub mod error;
pub mod intersect;
pub mod raycast;
pub mod surface;
pub mod texture;
pub mod tiles;
pub mod types;

pub use brush::*;
pub use camera::*;
pub use commit::*;
pub use constants::*;
pub use controller::*;
pub use error::*;
pub use intersect::*;
pub use raycast::*;
pub use surface::*;
pub use texture::*;
pub use tiles::*;
pub use types::*;
