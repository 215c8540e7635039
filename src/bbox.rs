//! Axis-aligned bounding volume and the slab intersection test.

use glam::Vec3A;

use crate::interval::Interval;
use crate::ray::RayHit;

/// Axis-aligned box given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Lowest corner
    pub min: Vec3A,
    /// Highest corner
    pub max: Vec3A,
}

impl BoundingBox {
    /// Box spanned by two opposite corners given in any order.
    pub fn new(a: Vec3A, b: Vec3A) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Slab test of `rayhit.ray` against the box.
    ///
    /// On a hit the entry distance, clamped to the ray origin, is written to
    /// `ray.t` and the entry point to `hit.pos`. A miss leaves the record untouched.
    pub fn slabs(&self, rayhit: &mut RayHit) -> bool {
        let ray = &rayhit.ray;
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;

        let range = Interval::FORWARD
            .intersect(Interval::spanning(t0.x, t1.x))
            .intersect(Interval::spanning(t0.y, t1.y))
            .intersect(Interval::spanning(t0.z, t1.z));

        if range.is_empty() {
            return false;
        }

        rayhit.ray.t = range.min;
        rayhit.hit.pos = rayhit.ray.at(range.min);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ray::Ray;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(Vec3A::splat(-1.0), Vec3A::splat(1.0))
    }

    #[test]
    fn ray_from_outside_hits_at_entry() {
        let mut rh = RayHit::new(Ray::new(Vec3A::new(0.0, 5.0, 0.0), Vec3A::NEG_Y));
        assert!(unit_box().slabs(&mut rh));
        assert!((rh.ray.t - 4.0).abs() < 1e-5);
        assert!((rh.hit.pos - Vec3A::new(0.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn ray_from_inside_hits_with_non_negative_t() {
        for dir in [Vec3A::X, Vec3A::NEG_Y, Vec3A::new(1.0, 2.0, -3.0)] {
            let mut rh = RayHit::new(Ray::new(Vec3A::new(0.2, -0.3, 0.1), dir));
            assert!(unit_box().slabs(&mut rh));
            assert!(rh.ray.t >= 0.0);
            let b = unit_box();
            assert!(rh.hit.pos.cmpge(b.min).all() && rh.hit.pos.cmple(b.max).all());
        }
    }

    #[test]
    fn ray_pointing_away_misses() {
        let origin = Vec3A::new(3.0, 3.0, 3.0);
        let mut rh = RayHit::new(Ray::new(origin, Vec3A::new(1.0, 1.0, 1.0)));
        assert!(!unit_box().slabs(&mut rh));
        assert!(rh.ray.t.is_infinite());
        assert_eq!(rh.hit.pos, origin);
    }

    #[test]
    fn axis_parallel_ray_outside_slab_misses() {
        let mut rh = RayHit::new(Ray::new(Vec3A::new(0.0, 2.0, -5.0), Vec3A::Z));
        assert!(!unit_box().slabs(&mut rh));
    }

    #[test]
    fn new_orders_corners() {
        let b = BoundingBox::new(Vec3A::new(1.0, 0.0, 1.0), Vec3A::new(-1.0, -2.0, -1.0));
        assert_eq!(b.min, Vec3A::new(-1.0, -2.0, -1.0));
        assert_eq!(b.max, Vec3A::new(1.0, 0.0, 1.0));
    }
}
