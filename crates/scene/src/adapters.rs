//! Bevy views of the painting core's renderer boundary
//!
//! The painting crate speaks plain glam; these adapters translate Bevy's
//! camera, mesh and transform types into it.

use bevy::mesh::{Indices, VertexAttributeValues};
use bevy::prelude::*;

use texpaint_painting::{
    MeshRaycastData, PointerSample, Ray, RayProjector, ViewportRect, WorldTransform,
};

/// Marker for the camera pointer rays are cast from
#[derive(Component)]
pub struct MainCamera;

pub(crate) fn to_glam_vec2(v: Vec2) -> glam::Vec2 {
    glam::Vec2::from_array(v.to_array())
}

pub(crate) fn to_glam_vec3(v: Vec3) -> glam::Vec3 {
    glam::Vec3::from_array(v.to_array())
}

pub(crate) fn from_glam_vec3(v: glam::Vec3) -> Vec3 {
    Vec3::from_array(v.to_array())
}

/// World transform of a Bevy entity
pub fn world_transform(transform: &GlobalTransform) -> WorldTransform {
    let (scale, rotation, translation) = transform.to_scale_rotation_translation();
    WorldTransform::from_scale_rotation_translation(
        to_glam_vec3(scale),
        glam::Quat::from_array(rotation.to_array()),
        to_glam_vec3(translation),
    )
}

/// A Bevy camera seen as a [`RayProjector`]
pub struct BevyCamera<'a> {
    pub camera: &'a Camera,
    pub transform: &'a GlobalTransform,
    /// Screen rectangle the pointer samples were normalized against
    pub viewport: ViewportRect,
}

impl<'a> BevyCamera<'a> {
    /// Use the camera's own viewport, or the whole window when it has none yet
    pub fn new(camera: &'a Camera, transform: &'a GlobalTransform, window: &Window) -> Self {
        let viewport = camera
            .logical_viewport_rect()
            .map(|rect| ViewportRect::new(rect.min.x, rect.min.y, rect.width(), rect.height()))
            .unwrap_or_else(|| ViewportRect::from_size(window.width(), window.height()));
        Self {
            camera,
            transform,
            viewport,
        }
    }

    /// Normalize a window cursor position for this camera
    pub fn sample(&self, cursor: Vec2) -> Option<PointerSample> {
        PointerSample::from_screen(to_glam_vec2(cursor), self.viewport)
    }
}

impl RayProjector for BevyCamera<'_> {
    fn ray_from_ndc(&self, sample: PointerSample) -> Option<Ray> {
        let screen = sample.to_screen(self.viewport);
        let viewport_position = Vec2::new(screen.x - self.viewport.left, screen.y - self.viewport.top);
        let ray = self
            .camera
            .viewport_to_world(self.transform, viewport_position)
            .ok()?;
        Some(Ray::new(to_glam_vec3(ray.origin), to_glam_vec3(*ray.direction)))
    }
}

/// Extract triangle data for picking from a Bevy mesh.
///
/// Bevy UVs have their origin at the top-left; they are flipped to the
/// bottom-left origin used for surface coordinates. Non-indexed meshes are
/// read as consecutive triangles.
pub fn mesh_raycast_data(mesh: &Mesh) -> Option<MeshRaycastData> {
    let positions = match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
        Some(VertexAttributeValues::Float32x3(v)) => v,
        _ => return None,
    };

    let indices = match mesh.indices() {
        Some(Indices::U32(i)) => i.clone(),
        Some(Indices::U16(i)) => i.iter().map(|&x| x as u32).collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let uvs = match mesh.attribute(Mesh::ATTRIBUTE_UV_0) {
        Some(VertexAttributeValues::Float32x2(v)) => {
            v.iter().map(|[x, y]| glam::Vec2::new(*x, 1.0 - y)).collect()
        }
        _ => Vec::new(),
    };

    Some(MeshRaycastData {
        positions: positions.iter().map(|p| glam::Vec3::from_array(*p)).collect(),
        indices,
        uvs,
    })
}
