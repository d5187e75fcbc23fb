//! Ray-mesh intersection
//!
//! Möller-Trumbore ray-triangle intersection over plain vertex arrays, with
//! barycentric interpolation of UVs at the hit.

use glam::{Vec2, Vec3};

use crate::constants::RAY_EPSILON;

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Ray parameter at the intersection point
    pub t: f32,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f32,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f32,
}

/// Moller-Trumbore ray-triangle intersection algorithm.
///
/// Both faces are hit. `ray_dir` need not be normalized; `t` is expressed in
/// units of its length.
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray_dir.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray parallel to the triangle plane
    if det.abs() < RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray_origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray_dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;

    // Only accept hits in front of the ray
    if t < RAY_EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Interpolate a Vec2 attribute (like UVs) using barycentric coordinates.
pub fn interpolate_vec2(v0: Vec2, v1: Vec2, v2: Vec2, u: f32, v: f32) -> Vec2 {
    let w = 1.0 - u - v;
    v0 * w + v1 * u + v2 * v
}

/// Closest hit in mesh local space
#[derive(Debug, Clone, Copy)]
pub struct LocalHit {
    pub t: f32,
    pub point: Vec3,
    pub uv: Option<Vec2>,
}

/// Mesh geometry extracted for raycasting
#[derive(Debug, Clone, Default)]
pub struct MeshRaycastData {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Triangle indices (3 per triangle)
    pub indices: Vec<u32>,
    /// Vertex UVs with a bottom-left origin (same length as positions, or empty)
    pub uvs: Vec<Vec2>,
}

impl MeshRaycastData {
    /// Unit quad centered at the origin in the XY plane, facing +Z.
    /// UVs run from (0, 0) at the bottom-left to (1, 1) at the top-right.
    pub fn quad() -> Self {
        Self {
            positions: vec![
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
            uvs: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
        }
    }

    /// Get the number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the vertex indices for a triangle
    pub fn triangle_indices(&self, tri_index: usize) -> (usize, usize, usize) {
        let base = tri_index * 3;
        (
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        )
    }

    fn triangle_positions(&self, tri_index: usize) -> Option<(Vec3, Vec3, Vec3)> {
        let (i0, i1, i2) = self.triangle_indices(tri_index);
        Some((
            *self.positions.get(i0)?,
            *self.positions.get(i1)?,
            *self.positions.get(i2)?,
        ))
    }

    fn triangle_uvs(&self, tri_index: usize) -> Option<(Vec2, Vec2, Vec2)> {
        let (i0, i1, i2) = self.triangle_indices(tri_index);
        Some((*self.uvs.get(i0)?, *self.uvs.get(i1)?, *self.uvs.get(i2)?))
    }
}

/// Cast a ray (in mesh local space) against mesh data and return the closest hit.
///
/// Triangles referencing missing vertices are skipped.
pub fn raycast_mesh(ray_origin: Vec3, ray_dir: Vec3, mesh_data: &MeshRaycastData) -> Option<LocalHit> {
    let mut closest_hit: Option<(TriangleHit, usize)> = None;

    // Brute force; billboard meshes are a handful of triangles
    for tri_idx in 0..mesh_data.triangle_count() {
        let Some((v0, v1, v2)) = mesh_data.triangle_positions(tri_idx) else {
            continue;
        };

        if let Some(hit) = ray_triangle_intersection(ray_origin, ray_dir, v0, v1, v2) {
            let closer = match &closest_hit {
                Some((prev, _)) => hit.t < prev.t,
                None => true,
            };
            if closer {
                closest_hit = Some((hit, tri_idx));
            }
        }
    }

    closest_hit.map(|(hit, tri_idx)| LocalHit {
        t: hit.t,
        point: ray_origin + ray_dir * hit.t,
        uv: mesh_data
            .triangle_uvs(tri_idx)
            .map(|(uv0, uv1, uv2)| interpolate_vec2(uv0, uv1, uv2, hit.u, hit.v)),
    })
}
