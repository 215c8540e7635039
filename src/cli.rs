use clap::{Parser, ValueEnum};
use log::LevelFilter;

use oceantracer::config::Config;
use oceantracer::scene::SceneState;

/// Custom enum for log levels that can be used with clap's ValueEnum
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convert our custom LogLevel enum to log crate's LevelFilter
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments structure using clap derive macros
#[derive(Parser, Debug)]
#[command(name = "oceantracer")]
#[command(about = "Renders a procedural ocean under an analytic sky")]
pub struct Args {
    /// Scene and render configuration file (TOML); missing file means defaults
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Set the logging level (defaults to "info")
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub debug_level: LogLevel,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of progressive frames to render
    #[arg(long, short = 'f')]
    pub frames: Option<u32>,

    /// Animation time of the first frame in seconds
    #[arg(long)]
    pub time: Option<f32>,

    /// Animation time advanced per frame in seconds
    #[arg(long)]
    pub time_step: Option<f32>,

    /// Ocean depth (also moves the raymarch volume floor)
    #[arg(long)]
    pub depth: Option<f32>,

    /// Base wave frequency
    #[arg(long)]
    pub phase: Option<f32>,

    /// Base wave speed
    #[arg(long)]
    pub speed: Option<f32>,

    /// Domain warp strength
    #[arg(long)]
    pub drag: Option<f32>,

    /// Send image to TEV for real-time visualization
    #[arg(long, help = "Send image to TEV for real-time visualization")]
    pub tev: bool,

    /// TEV client IP address and port (automatically enables --tev)
    #[arg(long, help = "TEV client IP address and port (automatically enables --tev)")]
    pub tev_address: Option<String>,

    /// Output file path (.png for 8-bit display values, .exr for HDR linear)
    #[arg(short, long, default_value = "ocean.png")]
    pub output: String,

    /// Render the configured frames without writing output and report frame timings
    #[arg(long)]
    pub bench: bool,
}

impl Args {
    /// Apply render overrides to `config`. Ocean overrides go through
    /// [`SceneState`] instead, see [`Args::apply_scene_overrides`].
    pub fn apply_render_overrides(&self, config: &mut Config) {
        let render = &mut config.render;
        if let Some(width) = self.width {
            render.width = width;
        }
        if let Some(height) = self.height {
            render.height = height;
        }
        if let Some(frames) = self.frames {
            render.frames = frames;
        }
        if let Some(time) = self.time {
            render.start_time = time;
        }
        if let Some(step) = self.time_step {
            render.time_step = step;
        }
    }

    /// Apply ocean edits to the live scene.
    pub fn apply_scene_overrides(&self, state: &mut SceneState) {
        if let Some(depth) = self.depth {
            state.set_depth(depth);
        }
        if let Some(phase) = self.phase {
            state.set_phase(phase);
        }
        if let Some(speed) = self.speed {
            state.set_speed(speed);
        }
        if let Some(drag) = self.drag {
            state.set_drag(drag);
        }
    }

    pub fn tev_target(&self) -> Option<&str> {
        match (&self.tev_address, self.tev) {
            (Some(address), _) => Some(address.as_str()),
            (None, true) => Some("localhost"),
            (None, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oceantracer::scene::Scene;

    #[test]
    fn overrides_reach_config_and_scene() {
        let args = Args::parse_from([
            "oceantracer",
            "--width",
            "64",
            "--frames",
            "3",
            "--depth",
            "4.5",
            "--tev-address",
            "host:1234",
        ]);

        let mut config = Config::default();
        args.apply_render_overrides(&mut config);
        assert_eq!(config.render.width, 64);
        assert_eq!(config.render.height, 720);
        assert_eq!(config.render.frames, 3);

        let mut state = SceneState::new(Scene::default());
        args.apply_scene_overrides(&mut state);
        let scene = state.snapshot();
        assert_eq!(scene.ocean.depth, 4.5);
        assert_eq!(scene.ocean.bbox.min.y, -4.5);

        assert_eq!(args.tev_target(), Some("host:1234"));
    }

    #[test]
    fn tev_flag_defaults_to_localhost() {
        let args = Args::parse_from(["oceantracer", "--tev"]);
        assert_eq!(args.tev_target(), Some("localhost"));
        assert!(Args::parse_from(["oceantracer"]).tev_target().is_none());
    }
}
