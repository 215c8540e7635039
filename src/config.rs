//! Scene and render configuration loaded from a TOML file.
//!
//! Every section and field is optional; missing values fall back to the
//! built-in scene (a calm ocean seen from 30 units away under a low sun).

use serde::{Deserialize, Serialize};
use std::path::Path;

use glam::{Mat4, Vec3A};

use crate::camera::Camera;
use crate::ocean::Ocean;
use crate::random::{DEFAULT_NOISE_SIZE, MAX_NOISE_SIZE};
use crate::render::Settings;
use crate::scene::Scene;
use crate::sky::{Sky, Sun};

/// Contents of a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[ocean]` section
    pub ocean: OceanConfig,
    /// `[sky]` section
    pub sky: SkyConfig,
    /// `[camera]` section
    pub camera: CameraConfig,
    /// `[render]` section
    pub render: RenderConfig,
}

/// Wave parameters, see [`Ocean`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanConfig {
    /// Wave amplitude and box floor, non-negative
    pub depth: f32,
    /// Frequency of the first wave term
    pub phase: f32,
    /// Time scale of the first wave term
    pub speed: f32,
    /// Domain warp strength
    pub drag: f32,
    /// Horizontal half size of the raymarch volume.
    pub half_extent: f32,
}

/// Sky gradient and sun. Colors are linear and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    /// Horizon color
    pub color1: [f32; 3],
    /// Zenith color
    pub color2: [f32; 3],
    /// Towards the sun; normalized on load.
    pub sun_direction: [f32; 3],
    /// Sun highlight radiance
    pub sun_color: [f32; 3],
}

/// Viewpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position
    pub position: [f32; 3],
    /// Point looked at
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Column-major world-to-view matrix exported by a flythrough tool.
    /// Replaces `position` and `target` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<[f32; 16]>,
}

/// Image size, frame sequence and jitter table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Progressive frames rendered per run
    pub frames: u32,
    /// Animation time of the first frame, seconds
    pub start_time: f32,
    /// Animation time advanced per frame, seconds
    pub time_step: f32,
    /// Seed of the jitter table
    pub noise_seed: u64,
    /// Edge length of the jitter table, at most `MAX_NOISE_SIZE`
    pub noise_size: u32,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            depth: 2.0,
            phase: 6.0,
            speed: 2.0,
            drag: 0.048,
            half_extent: 100.0,
        }
    }
}

impl Default for SkyConfig {
    fn default() -> Self {
        let sky = Sky::default();
        Self {
            color1: sky.color1.into(),
            color2: sky.color2.into(),
            sun_direction: sky.sun.direction.into(),
            sun_color: sky.sun.color.into(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 30.0],
            target: [0.0, 0.0, 0.0],
            vfov: 50.0,
            view: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frames: 1,
            start_time: 0.0,
            time_step: 1.0 / 60.0,
            noise_seed: 0,
            noise_size: DEFAULT_NOISE_SIZE,
        }
    }
}

impl Config {
    /// Load `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            log::info!("No config at {}, using built-in scene", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        let config = Self::parse(&text)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn parse(text: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the kernel relies on.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err("render.width and render.height must be positive".into());
        }
        if render.frames == 0 {
            return Err("render.frames must be at least 1".into());
        }
        if render.noise_size == 0 || render.noise_size > MAX_NOISE_SIZE {
            return Err(format!(
                "render.noise_size must be in [1, {MAX_NOISE_SIZE}], got {}",
                render.noise_size
            )
            .into());
        }
        if !render.start_time.is_finite() || !render.time_step.is_finite() {
            return Err("render.start_time and render.time_step must be finite".into());
        }

        let ocean = &self.ocean;
        if !(ocean.depth >= 0.0 && ocean.depth.is_finite()) {
            return Err(format!("ocean.depth must be finite and non-negative, got {}", ocean.depth).into());
        }
        if ![ocean.phase, ocean.speed, ocean.drag].iter().all(|v| v.is_finite()) {
            return Err("ocean.phase, ocean.speed and ocean.drag must be finite".into());
        }
        if !(ocean.half_extent > 0.0 && ocean.half_extent.is_finite()) {
            return Err("ocean.half_extent must be positive".into());
        }

        let sky = &self.sky;
        for (name, v) in [
            ("sky.color1", sky.color1),
            ("sky.color2", sky.color2),
            ("sky.sun_direction", sky.sun_direction),
            ("sky.sun_color", sky.sun_color),
            ("camera.position", self.camera.position),
            ("camera.target", self.camera.target),
        ] {
            if !is_finite_vec3(v) {
                return Err(format!("{name} must contain finite values").into());
            }
        }
        for (name, v) in [
            ("sky.color1", sky.color1),
            ("sky.color2", sky.color2),
            ("sky.sun_color", sky.sun_color),
        ] {
            if v.iter().any(|c| *c < 0.0) {
                return Err(format!("{name} must not be negative, got {v:?}").into());
            }
        }
        if Vec3A::from(sky.sun_direction).length_squared() == 0.0 {
            return Err("sky.sun_direction must be non-zero".into());
        }

        let camera = &self.camera;
        if camera.position == camera.target {
            return Err("camera.position and camera.target must differ".into());
        }
        let forward = Vec3A::from(camera.target) - Vec3A::from(camera.position);
        if forward.cross(Vec3A::Y).length_squared() <= 1e-12 * forward.length_squared() {
            return Err("camera must not look straight up or down".into());
        }
        if !(camera.vfov > 0.0 && camera.vfov < 180.0) {
            return Err(format!("camera.vfov must be in (0, 180), got {}", camera.vfov).into());
        }
        if let Some(view) = camera.view {
            let m = Mat4::from_cols_array(&view);
            if !m.is_finite() || m.determinant().abs() <= f32::EPSILON {
                return Err("camera.view must be a finite, invertible matrix".into());
            }
        }
        Ok(())
    }

    /// Scene described by the `[ocean]` and `[sky]` sections.
    pub fn scene(&self) -> Scene {
        let o = &self.ocean;
        let s = &self.sky;
        Scene {
            ocean: Ocean::new(o.depth, o.phase, o.speed, o.drag, o.half_extent),
            sky: Sky {
                sun: Sun {
                    direction: Vec3A::from(s.sun_direction).normalize(),
                    color: s.sun_color.into(),
                },
                color1: s.color1.into(),
                color2: s.color2.into(),
            },
        }
    }

    /// Camera from `camera.view` if given, else from position and target.
    pub fn camera(&self) -> Camera {
        if let Some(view) = self.camera.view {
            return Camera::from_view(Mat4::from_cols_array(&view), self.camera.vfov);
        }
        Camera::new(
            self.camera.position.into(),
            self.camera.target.into(),
            Vec3A::Y,
            self.camera.vfov,
        )
    }

    /// Settings of frame `k` of the run.
    pub fn settings(&self, k: u32) -> Settings {
        let r = &self.render;
        Settings::new(r.width, r.height).with_time(r.start_time + k as f32 * r.time_step)
    }
}

fn is_finite_vec3(v: [f32; 3]) -> bool {
    v.iter().all(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = Config::parse("").expect("empty config is valid");
        assert_eq!(config, Config::default());

        let scene = config.scene();
        let builtin = Scene::default();
        assert_eq!(scene.ocean, builtin.ocean);
        assert_eq!(scene.sky.color1, builtin.sky.color1);
        assert!((scene.sky.sun.direction - builtin.sky.sun.direction).length() < 1e-6);
    }

    #[test]
    fn partial_sections_override_only_given_fields() {
        let config = Config::parse(
            r#"
            [ocean]
            depth = 3.5

            [render]
            width = 320
            height = 200
            frames = 8
            "#,
        )
        .expect("valid config");

        assert_eq!(config.ocean.depth, 3.5);
        assert_eq!(config.ocean.phase, 6.0);
        assert_eq!(config.scene().ocean.bbox.min.y, -3.5);
        assert_eq!(config.render.frames, 8);
        assert_eq!(config.settings(0).xres, 320);
    }

    #[test]
    fn frame_time_advances_by_step() {
        let mut config = Config::default();
        config.render.start_time = 1.0;
        config.render.time_step = 0.5;
        assert_eq!(config.settings(0).time, 1.0);
        assert_eq!(config.settings(4).time, 3.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Config::parse("[render]\nwidth = 0").is_err());
        assert!(Config::parse("[ocean]\ndepth = -1.0").is_err());
        assert!(Config::parse("[camera]\nvfov = 190.0").is_err());
        assert!(Config::parse("[sky]\nsun_direction = [0.0, 0.0, 0.0]").is_err());
        assert!(Config::parse("[camera]\nposition = [0.0, 0.0, 0.0]\ntarget = [0.0, 0.0, 0.0]").is_err());
        assert!(Config::parse("[camera]\nposition = [0.0, 9.0, 0.0]").is_err());
        assert!(Config::parse("[render]\nwidth = \"wide\"").is_err());
        assert!(Config::parse("[render]\nnoise_size = 70000").is_err());
        assert!(Config::parse("[camera]\nview = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]").is_err());
    }

    #[test]
    fn negative_sky_colors_are_rejected() {
        assert!(Config::parse("[sky]\ncolor1 = [-0.2, 0.7, 1.0]").is_err());
        assert!(Config::parse("[sky]\ncolor2 = [0.1, -0.01, 0.3]").is_err());
        assert!(Config::parse("[sky]\nsun_color = [2.0, 2.0, -2.0]").is_err());
        assert!(Config::parse("[sky]\ncolor1 = [0.0, 0.0, 0.0]").is_ok());
        assert!(Config::parse(&format!("[render]\nnoise_size = {MAX_NOISE_SIZE}")).is_ok());
    }

    #[test]
    fn view_matrix_overrides_position_and_target() {
        let eye = glam::Vec3::new(5.0, 3.0, 12.0);
        let view = Mat4::look_at_rh(eye, glam::Vec3::ZERO, glam::Vec3::Y);
        let mut config = Config::default();
        config.camera.view = Some(view.to_cols_array());
        config.validate().expect("valid view");

        let camera = config.camera();
        assert!((camera.position() - Vec3A::from(eye)).length() < 1e-4);
        let expected = Camera::new(eye.into(), Vec3A::ZERO, Vec3A::Y, config.camera.vfov);
        let a = camera.primary_ray(3, 4, 16, 9, glam::Vec2::ZERO).ray.direction;
        let b = expected.primary_ray(3, 4, 16, 9, glam::Vec2::ZERO).ray.direction;
        assert!((a - b).length() < 1e-4);
    }

    #[test]
    fn serialized_default_round_trips() {
        let text = toml::to_string_pretty(&Config::default()).expect("serializable");
        assert_eq!(Config::parse(&text).expect("valid"), Config::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/oceantracer.toml")).expect("defaults");
        assert_eq!(config, Config::default());
    }
}
