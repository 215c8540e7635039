//! Procedural ocean height field.
//!
//! The surface is a superposition of sharpened sine waves travelling in
//! directions rotated by a fixed angle per term. Each term's sampling position
//! is pushed along the previous term's slope, which gives the crests their
//! choppy look. Heights are normalized by the accumulated weights so the raw
//! field stays in `(0, 1]` whatever the iteration count.
//!
//! World height is `wave(..) * depth - depth`, sampled at `0.1 * (x, z)`.

use glam::{Vec2, Vec3A};

use crate::bbox::BoundingBox;
use crate::maths::lerp;
use crate::ray::RayHit;

/// Wave terms evaluated per raymarch step.
pub const ITERATIONS_RAYMARCH: u32 = 12;
/// Wave terms evaluated for the shading normal.
pub const ITERATIONS_NORMAL: u32 = 48;

/// World to wave-space scale applied to horizontal positions.
pub const WAVE_SCALE: f32 = 0.1;

/// Raymarch step budget.
pub const RAYMARCH_STEPS: u32 = 300;
/// Vertical tolerance at which the raymarch reports a hit.
pub const SURFACE_TOLERANCE: f32 = 0.01;
/// Default finite difference offset for [`wave_normal`].
pub const NORMAL_EPSILON: f32 = 0.01;

const DIRECTION_STEP: f32 = 12.0;
const WEIGHT_DECAY: f32 = 0.2;
const PHASE_GROWTH: f32 = 1.18;
const SPEED_GROWTH: f32 = 1.07;

/// Wave-shape parameters and the volume raymarching is confined to.
///
/// `bbox.min.y == -depth` must hold whenever the ocean is rendered; use
/// [`Ocean::set_depth`] rather than writing `depth` directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ocean {
    /// Raymarch volume, `y` in `[-depth, 0]`
    pub bbox: BoundingBox,
    /// Wave amplitude, also the distance from the rest level to the floor
    pub depth: f32,
    /// Frequency of the first wave term
    pub phase: f32,
    /// Time scale of the first wave term
    pub speed: f32,
    /// How far each term's slope pushes the next term's sample position
    pub drag: f32,
}

impl Default for Ocean {
    fn default() -> Self {
        Self::new(2.0, 6.0, 2.0, 0.048, 100.0)
    }
}

impl Ocean {
    /// Ocean whose box spans `[-half_extent, half_extent]` horizontally and
    /// `[-depth, 0]` vertically.
    pub fn new(depth: f32, phase: f32, speed: f32, drag: f32, half_extent: f32) -> Self {
        let bbox = BoundingBox::new(
            Vec3A::new(-half_extent, -depth, -half_extent),
            Vec3A::new(half_extent, 0.0, half_extent),
        );
        Self {
            bbox,
            depth,
            phase,
            speed,
            drag,
        }
    }

    /// Change the depth and move the box floor with it.
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
        self.bbox.min.y = -depth;
    }

    /// World-space surface height at horizontal position `(x, z)`.
    #[inline]
    pub fn height(&self, x: f32, z: f32, iterations: u32, time: f32) -> f32 {
        wave(self, Vec2::new(x, z) * WAVE_SCALE, iterations, time) * self.depth - self.depth
    }
}

/// Single wave term along `direction`.
///
/// Returns `(height, slope)` with `height = exp(sin(x) - 1)` in `(0, 1]` and
/// `slope = -height * cos(x)`.
#[inline(always)]
pub fn wave_dx(position: Vec2, direction: Vec2, speed: f32, freq: f32, timeshift: f32) -> Vec2 {
    let x = direction.dot(position) * freq + timeshift * speed;
    let wave = (x.sin() - 1.0).exp();
    let dx = wave * x.cos();
    Vec2::new(wave, -dx)
}

/// Weight-normalized sum of `iterations` domain-warped wave terms.
pub fn wave(ocean: &Ocean, position: Vec2, iterations: u32, time: f32) -> f32 {
    let mut pos = position;
    let mut angle = 0.0f32;
    let mut phase = ocean.phase;
    let mut speed = ocean.speed;
    let mut weight = 1.0f32;
    let mut sum = 0.0f32;
    let mut weight_sum = 0.0f32;

    for _ in 0..iterations {
        // unit length already
        let dir = Vec2::new(angle.sin(), angle.cos());
        let res = wave_dx(pos, dir, speed, phase, time);
        pos += dir * res.y * weight * ocean.drag;
        sum += res.x * weight;
        weight_sum += weight;

        angle += DIRECTION_STEP;
        weight = lerp(weight, 0.0, WEIGHT_DECAY);
        phase *= PHASE_GROWTH;
        speed *= SPEED_GROWTH;
    }

    sum / weight_sum
}

/// Surface normal at world position `(position.x, position.y)` = `(x, z)` from
/// forward differences of the high quality field.
pub fn wave_normal(ocean: &Ocean, position: Vec2, time: f32, epsilon: f32) -> Vec3A {
    let h = ocean.height(position.x, position.y, ITERATIONS_NORMAL, time);
    let hx = ocean.height(position.x - epsilon, position.y, ITERATIONS_NORMAL, time);
    let hz = ocean.height(position.x, position.y + epsilon, ITERATIONS_NORMAL, time);

    let a = Vec3A::new(position.x, h, position.y);
    let b = Vec3A::new(position.x - epsilon, hx, position.y);
    let c = Vec3A::new(position.x, hz, position.y + epsilon);

    (a - b).cross(a - c).normalize()
}

/// Test the ray against the ocean's bounding volume.
#[inline]
pub fn intersect(ocean: &Ocean, rayhit: &mut RayHit) -> bool {
    ocean.bbox.slabs(rayhit)
}

/// March from `rayhit.hit.pos` towards the surface.
///
/// Each step advances along the ray by the current vertical gap to the
/// surface. On a hit the position is stored in `hit.pos` and its distance from
/// the ray origin in `ray.t`. Running out of steps is a miss.
pub fn raymarch(ocean: &Ocean, rayhit: &mut RayHit, time: f32) -> bool {
    let mut position = rayhit.hit.pos;

    for _ in 0..RAYMARCH_STEPS {
        let h = ocean.height(position.x, position.z, ITERATIONS_RAYMARCH, time);
        if h + SURFACE_TOLERANCE > position.y {
            rayhit.hit.pos = position;
            rayhit.ray.t = rayhit.ray.origin.distance(position);
            return true;
        }
        position += rayhit.ray.direction * (position.y - h);
    }

    false
}
