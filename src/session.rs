//! Render session: owns the tiles, the display buffer and the progressive
//! sample counter across frames.

use std::error::Error;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::camera::Camera;
use crate::random::NoiseTable;
use crate::render::{new_frame_buffer, render, Frame, FrameBuffer, RenderStats, Settings};
use crate::scene::{Scene, SceneState};
use crate::tile::{generate_tiles, Tiles};

/// Outcome of one [`RenderSession::render_frame`] call.
#[derive(Debug, Clone, Copy)]
pub struct FrameReport {
    /// Frames rendered before this one
    pub frame_index: u64,
    /// Sample number used for sky accumulation, from 1
    pub sample_index: u64,
    /// Tile classification counts
    pub stats: RenderStats,
    /// Wall time of the render call
    pub elapsed: Duration,
}

/// Progressive renderer state that outlives a single frame.
pub struct RenderSession {
    settings: Settings,
    tiles: Tiles,
    buffer: FrameBuffer,
    noise: NoiseTable,
    camera: Camera,
    frame_index: u64,
    /// Samples accumulated so far in sky tiles.
    samples: u64,
    /// Revision of the last [`SceneState`] rendered.
    scene_revision: Option<u64>,
}

fn check_resolution(xres: u32, yres: u32) -> Result<(), Box<dyn Error>> {
    if xres == 0 || yres == 0 {
        return Err(format!("resolution must be positive, got {}x{}", xres, yres).into());
    }
    Ok(())
}

impl RenderSession {
    /// Session for an `xres * yres` image. Both dimensions must be positive.
    pub fn new(xres: u32, yres: u32, camera: Camera, noise: NoiseTable) -> Result<Self, Box<dyn Error>> {
        check_resolution(xres, yres)?;
        let settings = Settings::new(xres, yres);
        let tiles = generate_tiles(&settings);
        info!(
            "Session {}x{}: {} tiles on {} threads",
            xres,
            yres,
            tiles.count,
            rayon::current_num_threads()
        );
        Ok(Self {
            buffer: new_frame_buffer(&settings),
            settings,
            tiles,
            noise,
            camera,
            frame_index: 0,
            samples: 0,
            scene_revision: None,
        })
    }

    /// Change resolution. Tiles and the display buffer are reallocated and
    /// accumulation restarts. Zero dimensions are rejected and leave the
    /// session unchanged.
    pub fn resize(&mut self, xres: u32, yres: u32) -> Result<(), Box<dyn Error>> {
        check_resolution(xres, yres)?;
        if (xres, yres) == (self.settings.xres, self.settings.yres) {
            return Ok(());
        }
        self.settings = Settings::new(xres, yres).with_time(self.settings.time);
        self.tiles = generate_tiles(&self.settings);
        self.buffer = new_frame_buffer(&self.settings);
        self.samples = 0;
        info!("Resized to {}x{} ({} tiles)", xres, yres, self.tiles.count);
        Ok(())
    }

    /// Move the camera; accumulated sky samples are dropped if it changed.
    pub fn set_camera(&mut self, camera: Camera) {
        if camera != self.camera {
            self.camera = camera;
            debug!("Camera moved to {}", camera.position());
            self.restart_accumulation();
        }
    }

    /// Drop accumulated sky samples; the next frame is sample 1.
    pub fn restart_accumulation(&mut self) {
        self.tiles.reset_accumulation();
        self.samples = 0;
    }

    /// Render the next frame from a snapshot of `state`, restarting
    /// accumulation first if the scene was edited since the last call.
    pub fn render_state(&mut self, state: &SceneState, time: f32) -> FrameReport {
        let revision = state.revision();
        if self.scene_revision.is_some_and(|seen| seen != revision) {
            debug!("Scene edited (revision {}), restarting accumulation", revision);
            self.restart_accumulation();
        }
        self.scene_revision = Some(revision);
        self.render_frame(&state.snapshot(), time)
    }

    /// Render the next frame of `scene` at animation `time`.
    pub fn render_frame(&mut self, scene: &Scene, time: f32) -> FrameReport {
        self.settings.time = time;
        let sample_index = self.samples + 1;

        let frame = Frame {
            scene,
            noise: &self.noise,
            camera: &self.camera,
            settings: &self.settings,
            frame_index: self.frame_index,
            sample_index,
        };

        let start = Instant::now();
        let stats = render(&mut self.buffer, &mut self.tiles, &frame);
        let elapsed = start.elapsed();

        debug!(
            "Frame {} (sample {}, t={:.3}s): {} traced / {} sky tiles in {:.2?}",
            self.frame_index, sample_index, time, stats.traced_tiles, stats.sky_tiles, elapsed
        );

        let report = FrameReport {
            frame_index: self.frame_index,
            sample_index,
            stats,
            elapsed,
        };
        self.frame_index += 1;
        self.samples = sample_index;
        report
    }

    /// Display buffer of the last frame, gamma encoded.
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Resolution and time of the last frame.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Tiles for the current resolution.
    pub fn tiles(&self) -> &Tiles {
        &self.tiles
    }

    /// Current viewpoint.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}
