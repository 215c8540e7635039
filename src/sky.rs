//! Analytic sky: a two-color vertical gradient plus a narrow sun highlight.

use glam::Vec3A;

use crate::maths::{clamp01, lerp_color, Color};

const SUN_SHARPNESS: f32 = 1000.0;
const ZENITH_BIAS: f32 = 0.75;

/// Directional light seen as a sharp highlight in the sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sun {
    /// Unit vector pointing towards the sun.
    pub direction: Vec3A,
    /// Radiance at the center of the highlight
    pub color: Color,
}

impl Default for Sun {
    fn default() -> Self {
        Self {
            direction: Vec3A::new(200.0, 100.0, 10.0).normalize(),
            color: Color::splat(2.0),
        }
    }
}

/// Background radiance model.
///
/// `color1` is seen at and below the horizon, `color2` at the zenith.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sky {
    /// Sun highlight added on top of the gradient
    pub sun: Sun,
    /// Horizon color
    pub color1: Color,
    /// Zenith color
    pub color2: Color,
}

impl Default for Sky {
    fn default() -> Self {
        Self {
            sun: Sun::default(),
            color1: Color::new(0.5, 0.7, 1.0),
            color2: Color::new(0.1, 0.2, 0.3),
        }
    }
}

/// Sun contribution along `direction`, zero when facing away from it.
#[inline]
pub fn sample_sun(direction: Vec3A, sun: &Sun) -> Color {
    let sun_dot = direction.dot(sun.direction);
    let intensity = if sun_dot > 0.0 {
        clamp01(sun_dot).powf(SUN_SHARPNESS)
    } else {
        0.0
    };
    sun.color * intensity
}

/// Sky radiance along a unit `direction`.
#[inline]
pub fn sample_sky(direction: Vec3A, sky: &Sky) -> Color {
    let t = clamp01(direction.y).powf(ZENITH_BIAS);
    lerp_color(sky.color1, sky.color2, t) + sample_sun(direction, &sky.sun)
}
