//! Screen-to-surface inversion
//!
//! [`SurfaceIntersector`] casts a camera ray through a pointer sample against
//! a [`PaintTarget`] and turns the hit into a [`SurfaceCoordinate`], either by
//! reading the interpolated UV or by reconstructing the billboard rectangle
//! from the target's world transform.

use glam::Vec3;
use tracing::trace;

use crate::camera::RayProjector;
use crate::raycast::{MeshRaycastData, raycast_mesh};
use crate::types::{PointerSample, ProjectionMode, Ray, RayHit, SurfaceCoordinate, WorldTransform};

/// Something that can be painted on
pub trait PaintTarget {
    fn world_transform(&self) -> WorldTransform;

    /// Closest world-space hit of `ray`, if any
    fn intersect(&self, ray: &Ray) -> Option<RayHit>;
}

/// A triangle mesh placed in the world
#[derive(Debug, Clone, Copy)]
pub struct MeshTarget<'a> {
    pub mesh: &'a MeshRaycastData,
    pub transform: WorldTransform,
}

impl<'a> MeshTarget<'a> {
    pub fn new(mesh: &'a MeshRaycastData, transform: WorldTransform) -> Self {
        Self { mesh, transform }
    }
}

impl PaintTarget for MeshTarget<'_> {
    fn world_transform(&self) -> WorldTransform {
        self.transform
    }

    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        // Unnormalized local direction keeps the ray parameter in world units
        let local_origin = self.transform.inverse_transform_point(ray.origin);
        let local_dir = self.transform.inverse_transform_vector(ray.direction);

        let hit = raycast_mesh(local_origin, local_dir, self.mesh)?;
        Some(RayHit {
            point: ray.at(hit.t),
            distance: hit.t,
            uv: hit.uv,
        })
    }
}

/// Converts pointer samples into surface coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceIntersector {
    pub mode: ProjectionMode,
}

impl SurfaceIntersector {
    pub fn new(mode: ProjectionMode) -> Self {
        Self { mode }
    }

    /// Project a pointer sample onto `target` as seen from `camera`.
    ///
    /// None means the ray missed the target.
    pub fn project(
        &self,
        sample: PointerSample,
        target: &dyn PaintTarget,
        camera: &dyn RayProjector,
    ) -> Option<SurfaceCoordinate> {
        let ray = camera.ray_from_ndc(sample)?;
        self.project_ray(&ray, target)
    }

    pub fn project_ray(&self, ray: &Ray, target: &dyn PaintTarget) -> Option<SurfaceCoordinate> {
        let hit = target.intersect(ray)?;

        let coordinate = match (self.mode, hit.uv) {
            (ProjectionMode::Uv, Some(uv)) => SurfaceCoordinate::new(uv.x, uv.y),
            // Meshes without UVs fall back to the billboard rectangle
            (ProjectionMode::Uv, None) | (ProjectionMode::Analytic, _) => {
                analytic_coordinate(hit.point, &target.world_transform())
            }
        };

        trace!(
            "hit at {:?} -> surface ({:.3}, {:.3})",
            hit.point, coordinate.x, coordinate.y
        );
        Some(coordinate)
    }
}

/// Locate a world point on a unit billboard scaled, rotated and placed by `transform`.
///
/// The rectangle spans `scale.x` by `scale.y` around the translation in the
/// rotated XY plane. Returns a bottom-left origin coordinate; `z` is the
/// point's offset from the plane along the rotated Z axis. In-plane scale
/// must be non-zero.
pub fn analytic_coordinate(point: Vec3, transform: &WorldTransform) -> SurfaceCoordinate {
    let half_extent = transform.rotation * Vec3::new(transform.scale.x, -transform.scale.y, 0.0) / 2.0;
    let top_left = transform.translation - half_extent;
    let bottom_right = transform.translation + half_extent;

    let unrotate = transform.rotation.inverse();
    let top_left = unrotate * top_left;
    let bottom_right = unrotate * bottom_right;
    let local = unrotate * point;

    let extent = bottom_right - top_left;
    let offset = local - top_left;
    let from_top = offset.y / extent.y;

    SurfaceCoordinate {
        x: offset.x / extent.x,
        y: 1.0 - from_top,
        z: Some(offset.z),
    }
}

/// World scale giving a unit billboard the source image's aspect ratio
pub fn billboard_scale(height: f32, image_width: u32, image_height: u32) -> Vec3 {
    let aspect = if image_height == 0 {
        1.0
    } else {
        image_width as f32 / image_height as f32
    };
    Vec3::new(height * aspect, height, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use glam::{Quat, Vec2};

    const EPSILON: f32 = 1e-3;

    /// Deterministic pseudo-random source for transform sampling
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> f32 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 40) as f32) / ((1u64 << 24) as f32)
        }

        fn range(&mut self, min: f32, max: f32) -> f32 {
            min + (max - min) * self.next()
        }

        fn sign(&mut self) -> f32 {
            if self.next() < 0.2 { -1.0 } else { 1.0 }
        }
    }

    fn random_transform(rng: &mut Lcg) -> WorldTransform {
        let scale = Vec3::new(
            rng.range(0.1, 8.0) * rng.sign(),
            rng.range(0.1, 8.0) * rng.sign(),
            rng.range(0.1, 3.0),
        );
        let axis = Vec3::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0), rng.range(-1.0, 1.0));
        let axis = if axis.length_squared() < 1e-4 { Vec3::Y } else { axis.normalize() };
        let rotation = Quat::from_axis_angle(axis, rng.range(-3.1, 3.1));
        let translation = Vec3::new(rng.range(-50.0, 50.0), rng.range(-50.0, 50.0), rng.range(-50.0, 50.0));
        WorldTransform::from_scale_rotation_translation(scale, rotation, translation)
    }

    #[test]
    fn test_analytic_round_trip() {
        let mut rng = Lcg(0x5eed);
        for _ in 0..500 {
            let transform = random_transform(&mut rng);
            let (u, v) = (rng.next(), rng.next());

            let world = transform.transform_point(Vec3::new(u - 0.5, v - 0.5, 0.0));
            let coordinate = analytic_coordinate(world, &transform);

            assert!((coordinate.x - u).abs() < EPSILON, "x {} vs {} for {:?}", coordinate.x, u, transform);
            assert!((coordinate.y - v).abs() < EPSILON, "y {} vs {} for {:?}", coordinate.y, v, transform);
            assert!(coordinate.z.unwrap().abs() < 0.01);
        }
    }

    #[test]
    fn test_analytic_corners() {
        let transform = WorldTransform::from_scale_rotation_translation(
            Vec3::new(4.0, 2.0, 1.0),
            Quat::IDENTITY,
            Vec3::new(10.0, 0.0, 0.0),
        );

        let top_left = analytic_coordinate(Vec3::new(8.0, 1.0, 0.0), &transform);
        assert!((top_left.x - 0.0).abs() < EPSILON && (top_left.y - 1.0).abs() < EPSILON);

        let bottom_right = analytic_coordinate(Vec3::new(12.0, -1.0, 0.0), &transform);
        assert!((bottom_right.x - 1.0).abs() < EPSILON && bottom_right.y.abs() < EPSILON);
    }

    #[test]
    fn test_analytic_reports_plane_offset() {
        let rotation = Quat::from_rotation_y(0.8);
        let transform = WorldTransform::from_scale_rotation_translation(Vec3::new(2.0, 3.0, 1.0), rotation, Vec3::ONE);

        let on_plane = transform.transform_point(Vec3::new(0.1, 0.2, 0.0));
        let off_plane = on_plane + rotation * Vec3::Z * 0.3;
        let coordinate = analytic_coordinate(off_plane, &transform);

        assert!((coordinate.z.unwrap() - 0.3).abs() < EPSILON);
        assert!((coordinate.x - 0.6).abs() < EPSILON);
    }

    #[test]
    fn test_billboard_scale() {
        assert_eq!(billboard_scale(2.0, 400, 200), Vec3::new(4.0, 2.0, 1.0));
        assert_eq!(billboard_scale(2.0, 400, 0), Vec3::new(2.0, 2.0, 1.0));
    }

    fn scene() -> (MeshRaycastData, WorldTransform, PerspectiveCamera) {
        let transform = WorldTransform::from_scale_rotation_translation(
            Vec3::new(3.0, 2.0, 1.0),
            Quat::from_rotation_y(0.4) * Quat::from_rotation_z(0.2),
            Vec3::new(0.5, 0.3, -1.0),
        );
        let camera = PerspectiveCamera::looking_at(Vec3::new(0.0, 0.0, 6.0), Vec3::ZERO, Vec3::Y, 1.0, 16.0 / 9.0);
        (MeshRaycastData::quad(), transform, camera)
    }

    #[test]
    fn test_project_both_modes_agree() {
        let (mesh, transform, camera) = scene();
        let target = MeshTarget::new(&mesh, transform);

        for (u, v) in [(0.5, 0.5), (0.1, 0.8), (0.9, 0.2), (0.3, 0.3)] {
            let world = transform.transform_point(Vec3::new(u - 0.5, v - 0.5, 0.0));
            let sample = camera.world_to_ndc(world).unwrap();

            for mode in [ProjectionMode::Uv, ProjectionMode::Analytic] {
                let coordinate = SurfaceIntersector::new(mode).project(sample, &target, &camera).unwrap();
                assert!((coordinate.x - u).abs() < EPSILON, "{:?} x {} vs {}", mode, coordinate.x, u);
                assert!((coordinate.y - v).abs() < EPSILON, "{:?} y {} vs {}", mode, coordinate.y, v);
            }
        }
    }

    #[test]
    fn test_uv_mode_returns_hit_uv_unchanged() {
        let mut mesh = MeshRaycastData::quad();
        // Remap UVs into a sub-rectangle of an atlas
        for uv in &mut mesh.uvs {
            *uv = *uv * 0.5 + Vec2::new(0.25, 0.0);
        }
        let target = MeshTarget::new(&mesh, WorldTransform::IDENTITY);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);

        let uv = SurfaceIntersector::new(ProjectionMode::Uv).project_ray(&ray, &target).unwrap();
        assert!((uv.x - 0.5).abs() < EPSILON && (uv.y - 0.25).abs() < EPSILON);
        assert!(uv.z.is_none());
    }

    #[test]
    fn test_uv_mode_without_uvs_falls_back() {
        let mut mesh = MeshRaycastData::quad();
        mesh.uvs.clear();
        let target = MeshTarget::new(&mesh, WorldTransform::IDENTITY);
        let ray = Ray::new(Vec3::new(0.25, 0.25, 3.0), Vec3::NEG_Z);

        let coordinate = SurfaceIntersector::new(ProjectionMode::Uv).project_ray(&ray, &target).unwrap();
        assert!((coordinate.x - 0.75).abs() < EPSILON && (coordinate.y - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_project_miss() {
        let (mesh, transform, camera) = scene();
        let target = MeshTarget::new(&mesh, transform);

        // Far corner of the screen looks past the billboard
        let intersector = SurfaceIntersector::default();
        assert!(intersector.project(PointerSample::new(0.99, 0.99), &target, &camera).is_none());
    }

    #[test]
    fn test_mesh_target_hit_distance() {
        let mesh = MeshRaycastData::quad();
        let transform = WorldTransform::from_scale_rotation_translation(Vec3::splat(4.0), Quat::IDENTITY, Vec3::ZERO);
        let target = MeshTarget::new(&mesh, transform);

        let hit = target.intersect(&Ray::new(Vec3::new(1.0, 1.0, 10.0), Vec3::NEG_Z)).unwrap();
        assert!((hit.distance - 10.0).abs() < EPSILON);
        assert!((hit.point - Vec3::new(1.0, 1.0, 0.0)).length() < EPSILON);
    }
}
