//! Pinhole camera generating primary rays.

use glam::{Mat4, Vec2, Vec3A};

use crate::ray::{Ray, RayHit};

/// Pinhole camera.
///
/// The basis is computed on construction, so a camera can be shared read-only
/// by every render task. Pixel `(0, 0)` is the top-left corner of the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees
    vfov: f32,
    /// Camera position in world space
    center: Vec3A,
    /// Camera frame basis vector pointing right (u)
    u: Vec3A,
    /// Camera frame basis vector pointing up (v)
    v: Vec3A,
    /// Camera frame basis vector pointing opposite view direction (w)
    w: Vec3A,
    /// tan(vfov / 2)
    half_height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3A::new(0.0, 0.0, 30.0), Vec3A::ZERO, Vec3A::Y, 50.0)
    }
}

impl Camera {
    /// Camera at `lookfrom` looking at `lookat`, with `vup` as the up hint.
    pub fn new(lookfrom: Vec3A, lookat: Vec3A, vup: Vec3A, vfov: f32) -> Self {
        let w = (lookfrom - lookat).normalize();
        let u = vup.cross(w).normalize();
        let v = w.cross(u);
        Self::from_basis(lookfrom, u, v, w, vfov)
    }

    /// Camera from a right-handed world-to-view matrix, as produced by a
    /// flythrough controller or `Mat4::look_at_rh`.
    pub fn from_view(view: Mat4, vfov: f32) -> Self {
        let camera_to_world = view.inverse();
        Self::from_basis(
            camera_to_world.w_axis.truncate().into(),
            camera_to_world.x_axis.truncate().into(),
            camera_to_world.y_axis.truncate().into(),
            camera_to_world.z_axis.truncate().into(),
            vfov,
        )
    }

    fn from_basis(center: Vec3A, u: Vec3A, v: Vec3A, w: Vec3A, vfov: f32) -> Self {
        Self {
            vfov,
            center,
            u,
            v,
            w,
            half_height: (vfov.to_radians() / 2.0).tan(),
        }
    }

    /// Eye position in world space.
    pub fn position(&self) -> Vec3A {
        self.center
    }

    /// Primary ray through pixel `(x, y)` of an `xres * yres` image, offset
    /// from the pixel center by `jitter` (in pixels).
    pub fn primary_ray(&self, x: u32, y: u32, xres: u32, yres: u32, jitter: Vec2) -> RayHit {
        let aspect = xres as f32 / yres as f32;
        let sx = (x as f32 + 0.5 + jitter.x) / xres as f32;
        let sy = (y as f32 + 0.5 + jitter.y) / yres as f32;

        let px = (2.0 * sx - 1.0) * self.half_height * aspect;
        let py = (1.0 - 2.0 * sy) * self.half_height;

        let direction = px * self.u + py * self.v - self.w;
        RayHit::new(Ray::new(self.center, direction))
    }
}
