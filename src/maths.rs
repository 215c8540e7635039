//! Scalar helpers shared by the wave model, the sky and the renderer.
//!
//! Vector and matrix types come from glam; colors are `Vec3A` so that shading
//! math stays on the SIMD path.

use glam::Vec3A;

/// RGB color type using Vec3A for SIMD optimization.
pub type Color = Vec3A;

/// Display gamma applied when copying tiles into the output buffer.
pub const GAMMA: f32 = 2.2;

/// Neutral gray written in place of NaN color channels.
pub const NAN_FALLBACK: f32 = 0.5;

/// Linear interpolation, `a` at `t = 0` and `b` at `t = 1`.
#[inline(always)]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Component-wise linear interpolation between two colors.
#[inline(always)]
pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    a + (b - a) * t
}

/// Clamp to `[0, 1]`.
#[inline(always)]
pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Reflect a vector about a surface normal.
#[inline(always)]
pub fn reflect(v: Vec3A, n: Vec3A) -> Vec3A {
    v - 2.0 * v.dot(n) * n
}

/// Replace NaN channels with [`NAN_FALLBACK`].
#[inline(always)]
pub fn sanitize(c: Color) -> Color {
    Color::new(
        if c.x.is_nan() { NAN_FALLBACK } else { c.x },
        if c.y.is_nan() { NAN_FALLBACK } else { c.y },
        if c.z.is_nan() { NAN_FALLBACK } else { c.z },
    )
}

/// Power-law encode a linear channel for display.
#[inline(always)]
pub fn gamma_encode(linear: f32) -> f32 {
    linear.powf(1.0 / GAMMA)
}

/// Inverse of [`gamma_encode`].
#[inline(always)]
pub fn gamma_decode(encoded: f32) -> f32 {
    encoded.powf(GAMMA)
}
