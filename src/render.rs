//! Tile-parallel progressive renderer.
//!
//! A frame is rendered in two parallel passes:
//!
//! 1. every tile is traced by its own task into its private pixel store;
//! 2. the output buffer is filled row by row from the tile stores, with gamma
//!    encoding. Rows are disjoint, so no locking is needed.
//!
//! Tiles whose four corner rays all miss the ocean volume are treated as pure
//! sky and accumulate a running mean across frames. Tiles that see the ocean
//! are traced in full and overwrite their store every frame, since the waves
//! move between frames.

use glam::{Vec2, Vec3A};
use image::{ImageBuffer, Rgb};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::maths::{gamma_decode, gamma_encode, lerp_color, reflect, sanitize, Color, NAN_FALLBACK};
use crate::ocean::{intersect, raymarch, wave_normal, NORMAL_EPSILON};
use crate::random::NoiseTable;
use crate::ray::RayHit;
use crate::scene::Scene;
use crate::sky::sample_sky;
use crate::tile::{Tile, Tiles, TILE_SIZE};

/// Display buffer: flat row-major RGB f32, gamma encoded.
pub type FrameBuffer = ImageBuffer<Rgb<f32>, Vec<f32>>;

/// Allocate a black display buffer for `settings`.
pub fn new_frame_buffer(settings: &Settings) -> FrameBuffer {
    ImageBuffer::new(settings.xres, settings.yres)
}

/// Per-call render settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Image width in pixels
    pub xres: u32,
    /// Image height in pixels
    pub yres: u32,
    /// Animation time in seconds
    pub time: f32,
}

impl Settings {
    /// Settings for an `xres * yres` image at time 0.
    pub fn new(xres: u32, yres: u32) -> Self {
        Self { xres, yres, time: 0.0 }
    }

    /// Same resolution at another animation time.
    pub fn with_time(self, time: f32) -> Self {
        Self { time, ..self }
    }

    /// Pixels per frame.
    pub fn pixel_count(&self) -> usize {
        self.xres as usize * self.yres as usize
    }
}

/// Immutable inputs of one render call.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Snapshot taken by the host before the call.
    pub scene: &'a Scene,
    /// Jitter source
    pub noise: &'a NoiseTable,
    /// Primary ray generator
    pub camera: &'a Camera,
    /// Resolution and animation time
    pub settings: &'a Settings,
    /// Seed for the jitter lookup.
    pub frame_index: u64,
    /// Progressive sample number, starting at 1.
    pub sample_index: u64,
}

/// How a tile was handled in the last render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    /// No corner ray touched the ocean; sky accumulated.
    Sky,
    /// Traced per pixel; store overwritten.
    Traced,
}

/// Tile counts of one render call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Tiles that took the sky-only path
    pub sky_tiles: usize,
    /// Tiles traced per pixel
    pub traced_tiles: usize,
}

/// Render one frame into `buffer`.
///
/// `tiles` must have been generated for `frame.settings` and `buffer` must be
/// `xres * yres`. Every element of `buffer` is written exactly once.
pub fn render(buffer: &mut FrameBuffer, tiles: &mut Tiles, frame: &Frame) -> RenderStats {
    let settings = frame.settings;
    assert!(tiles.matches(settings), "tiles generated for another resolution");
    assert_eq!(
        buffer.dimensions(),
        (settings.xres, settings.yres),
        "frame buffer does not match settings"
    );

    let traced_tiles = tiles
        .tiles
        .par_iter_mut()
        .map(|tile| render_tile(tile, frame))
        .filter(|kind| *kind == TileKind::Traced)
        .count();

    copy_to_buffer(buffer, tiles);

    RenderStats {
        sky_tiles: tiles.count - traced_tiles,
        traced_tiles,
    }
}

/// Trace one tile into its pixel store.
pub fn render_tile(tile: &mut Tile, frame: &Frame) -> TileKind {
    fill_jitter(tile, frame);

    let ocean = &frame.scene.ocean;
    let corners = [
        (tile.x_start, tile.y_start),
        (tile.x_end - 1, tile.y_start),
        (tile.x_start, tile.y_end - 1),
        (tile.x_end - 1, tile.y_end - 1),
    ];
    let sees_ocean = corners.iter().any(|&(x, y)| {
        let mut rayhit = primary_ray(tile, frame, x, y);
        intersect(ocean, &mut rayhit)
    });

    if sees_ocean {
        trace_full(tile, frame);
        TileKind::Traced
    } else {
        accumulate_sky(tile, frame);
        TileKind::Sky
    }
}

/// Color seen along a primary ray: the sky reflected off the ocean where the
/// raymarch finds the surface, the sky itself otherwise.
pub fn shade(scene: &Scene, mut rayhit: RayHit, time: f32) -> Color {
    let ocean = &scene.ocean;
    if intersect(ocean, &mut rayhit) && raymarch(ocean, &mut rayhit, time) {
        let pos = rayhit.hit.pos;
        let normal = wave_normal(ocean, Vec2::new(pos.x, pos.z), time, NORMAL_EPSILON);
        let r = reflect(rayhit.ray.direction, normal);
        return sample_sky(r, &scene.sky);
    }
    sample_sky(rayhit.ray.direction, &scene.sky)
}

fn fill_jitter(tile: &mut Tile, frame: &Frame) {
    for y in tile.y_start..tile.y_end {
        for x in tile.x_start..tile.x_end {
            let i = tile.index(x, y) * 2;
            let j = frame.noise.jitter(x, y, frame.frame_index, frame.sample_index);
            tile.jitter[i] = j.x;
            tile.jitter[i + 1] = j.y;
        }
    }
}

#[inline]
fn primary_ray(tile: &Tile, frame: &Frame, x: u32, y: u32) -> RayHit {
    let i = tile.index(x, y) * 2;
    let jitter = Vec2::new(tile.jitter[i], tile.jitter[i + 1]);
    let settings = frame.settings;
    frame.camera.primary_ray(x, y, settings.xres, settings.yres, jitter)
}

fn trace_full(tile: &mut Tile, frame: &Frame) {
    let time = frame.settings.time;
    for y in tile.y_start..tile.y_end {
        for x in tile.x_start..tile.x_end {
            let rayhit = primary_ray(tile, frame, x, y);
            let color = sanitize(shade(frame.scene, rayhit, time));
            let i = tile.index(x, y);
            tile.pixels[i] = color;
        }
    }
}

fn accumulate_sky(tile: &mut Tile, frame: &Frame) {
    let weight = 1.0 / frame.sample_index.max(1) as f32;
    for y in tile.y_start..tile.y_end {
        for x in tile.x_start..tile.x_end {
            let rayhit = primary_ray(tile, frame, x, y);
            let color = sanitize(sample_sky(rayhit.ray.direction, &frame.scene.sky));
            let i = tile.index(x, y);
            tile.pixels[i] = lerp_color(tile.pixels[i], color, weight);
        }
    }
}

/// Display value of a linear channel: NaN and negative radiance become
/// gray and black before encoding, so the buffer never holds NaN.
#[inline(always)]
fn encode_channel(linear: f32) -> f32 {
    if linear.is_nan() {
        gamma_encode(NAN_FALLBACK)
    } else {
        gamma_encode(linear.max(0.0))
    }
}

/// Gamma encode every tile store into its region of `buffer`.
fn copy_to_buffer(buffer: &mut FrameBuffer, tiles: &Tiles) {
    let row_len = tiles.xres as usize * 3;
    buffer
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            for tile in tiles.band((y / TILE_SIZE) as usize) {
                let src = tile.row(y - tile.y_start);
                let dst = &mut row[tile.x_start as usize * 3..tile.x_end as usize * 3];
                for (out, c) in dst.chunks_exact_mut(3).zip(src) {
                    out[0] = encode_channel(c.x);
                    out[1] = encode_channel(c.y);
                    out[2] = encode_channel(c.z);
                }
            }
        });
}

/// Linear color of a display buffer pixel.
pub fn linear_pixel(buffer: &FrameBuffer, x: u32, y: u32) -> Color {
    let p = buffer.get_pixel(x, y);
    Vec3A::new(gamma_decode(p[0]), gamma_decode(p[1]), gamma_decode(p[2]))
}
