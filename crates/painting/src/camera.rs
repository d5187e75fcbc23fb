//! Camera rays for pointer picking

use glam::{Mat4, Vec3};

use crate::types::{PointerSample, Ray};

/// Builds world-space rays through normalized device coordinates
pub trait RayProjector {
    /// Ray from the camera through `sample`, or None if the camera cannot
    /// unproject (degenerate projection)
    fn ray_from_ndc(&self, sample: PointerSample) -> Option<Ray>;
}

/// A perspective camera described by glam matrices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub world_from_view: Mat4,
    pub clip_from_view: Mat4,
}

impl PerspectiveCamera {
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 1000.0;

    pub fn new(world_from_view: Mat4, clip_from_view: Mat4) -> Self {
        Self {
            world_from_view,
            clip_from_view,
        }
    }

    /// Camera at `eye` looking at `target`, vertical field of view in radians
    pub fn looking_at(eye: Vec3, target: Vec3, up: Vec3, fov_y: f32, aspect: f32) -> Self {
        let view_from_world = Mat4::look_at_rh(eye, target, up);
        Self {
            world_from_view: view_from_world.inverse(),
            clip_from_view: Mat4::perspective_rh(fov_y, aspect, Self::NEAR, Self::FAR),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.world_from_view.transform_point3(Vec3::ZERO)
    }

    /// Project a world point to NDC. None when the point is behind the camera.
    pub fn world_to_ndc(&self, point: Vec3) -> Option<PointerSample> {
        let clip = self.clip_from_view * self.world_from_view.inverse() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(PointerSample::new(clip.x / clip.w, clip.y / clip.w))
    }
}

impl RayProjector for PerspectiveCamera {
    fn ray_from_ndc(&self, sample: PointerSample) -> Option<Ray> {
        let world_from_ndc = self.world_from_view * self.clip_from_view.inverse();

        // glam's perspective maps the near plane to depth 0 and the far plane to 1
        let near = world_from_ndc.project_point3(Vec3::new(sample.x, sample.y, 0.0));
        let far = world_from_ndc.project_point3(Vec3::new(sample.x, sample.y, 1.0));

        let direction = far - near;
        if !near.is_finite() || !direction.is_finite() || direction.length_squared() == 0.0 {
            return None;
        }

        Some(Ray::new(near, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y, 1.0, 1.5)
    }

    #[test]
    fn test_center_ray_points_forward() {
        let ray = camera().ray_from_ndc(PointerSample::new(0.0, 0.0)).unwrap();
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
        assert!(ray.origin.x.abs() < 1e-4 && ray.origin.y.abs() < 1e-4);
    }

    #[test]
    fn test_ray_passes_through_projected_point() {
        let camera = camera();
        let point = Vec3::new(0.7, -0.4, 1.0);

        let ndc = camera.world_to_ndc(point).unwrap();
        let ray = camera.ray_from_ndc(ndc).unwrap();

        // Distance from the point to the ray
        let to_point = point - ray.origin;
        let along = to_point.dot(ray.direction);
        assert!((ray.at(along) - point).length() < 1e-3);
    }

    #[test]
    fn test_point_behind_camera() {
        assert!(camera().world_to_ndc(Vec3::new(0.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn test_degenerate_projection() {
        let camera = PerspectiveCamera::new(Mat4::IDENTITY, Mat4::ZERO);
        assert!(camera.ray_from_ndc(PointerSample::new(0.0, 0.0)).is_none());
    }
}
