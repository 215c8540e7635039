//! Ray representation for ocean intersection and raymarching.
//!
//! A ray is defined as r(t) = origin + t * direction. Rays are created fresh per
//! pixel per sample and live on the stack of the task tracing them.

use glam::Vec3A;

/// Ray in 3D space defined by origin, unit direction and current hit distance.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Starting point of the ray in world coordinates.
    pub origin: Vec3A,

    /// Normalized direction of travel.
    pub direction: Vec3A,

    /// Current hit distance along the ray.
    ///
    /// Infinity until the bounding volume test or the raymarch records a hit.
    pub t: f32,
}

impl Ray {
    /// Create a new ray; `direction` is normalized here.
    pub fn new(origin: Vec3A, direction: Vec3A) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            t: f32::INFINITY,
        }
    }

    /// Compute a point at parameter t along the ray.
    ///
    /// Returns r(t) = origin + t * direction.
    pub fn at(&self, t: f32) -> Vec3A {
        self.origin + t * self.direction
    }
}

/// Surface point recorded by an intersection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceHit {
    /// World-space position of the hit.
    pub pos: Vec3A,
}

/// A ray together with the position of its latest hit.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// The ray; `t` is updated by each successful test.
    pub ray: Ray,
    /// Where the ray last touched the box or the surface.
    pub hit: SurfaceHit,
}

impl RayHit {
    /// Fresh record with the hit position at the ray origin.
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            hit: SurfaceHit { pos: ray.origin },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ray_is_normalized_and_unhit() {
        let r = Ray::new(Vec3A::ZERO, Vec3A::new(0.0, -4.0, 0.0));
        assert_eq!(r.direction, Vec3A::new(0.0, -1.0, 0.0));
        assert!(r.t.is_infinite());
        assert_eq!(r.at(2.5), Vec3A::new(0.0, -2.5, 0.0));
    }
}
