use std::path::Path;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;
use oceantracer::config::Config;
use oceantracer::output::{save_image, send_image_to_tev, OutputFormat};
use oceantracer::random::NoiseTable;
use oceantracer::scene::SceneState;
use oceantracer::session::RenderSession;

/// Load the config file and apply the render overrides from the command line.
fn load_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = Config::load(Path::new(&args.config))?;
    args.apply_render_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn exit_with_error(message: impl std::fmt::Display) -> ! {
    error!("{}", message);
    std::process::exit(1);
}

fn main() {
    let args = Args::parse();

    init_logger(args.debug_level.clone().into());

    // Log application startup with version information
    info!("OceanTracer - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    let config = load_config(&args).unwrap_or_else(|e| exit_with_error(e));

    // Fail on a bad output path before spending time rendering
    let format = if args.bench {
        None
    } else {
        match OutputFormat::from_path(&args.output) {
            Some(format) => Some(format),
            None => exit_with_error(format!(
                "Unsupported file extension '{}'. Only .png and .exr formats are supported.",
                Path::new(&args.output).extension().unwrap_or_default().to_string_lossy()
            )),
        }
    };

    let mut state = SceneState::new(config.scene());
    args.apply_scene_overrides(&mut state);
    let depth = state.snapshot().ocean.depth;
    if !(depth >= 0.0 && depth.is_finite()) {
        exit_with_error(format!("--depth must be finite and non-negative, got {}", depth));
    }

    let render = &config.render;
    info!(
        "Image resolution: {}x{}, frames: {}, time step: {:.4}s",
        render.width, render.height, render.frames, render.time_step
    );

    let noise = NoiseTable::new(render.noise_seed, render.noise_size);
    let mut session = RenderSession::new(render.width, render.height, config.camera(), noise)
        .unwrap_or_else(|e| exit_with_error(e));
    info!(
        "Camera at {}, {} tiles",
        session.camera().position(),
        session.tiles().count
    );

    let pb = ProgressBar::new(render.frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40} {pos}/{len} frames ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut frame_times = Vec::with_capacity(render.frames as usize);
    for k in 0..render.frames {
        let time = config.settings(k).time;
        let report = session.render_state(&state, time);
        frame_times.push(report.elapsed);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let total: Duration = frame_times.iter().sum();
    info!("Rendered {} frames in {:.2?}", frame_times.len(), total);

    if args.bench {
        report_bench(&frame_times, session.settings().pixel_count());
        return;
    }

    if let Some(address) = args.tev_target() {
        send_image_to_tev(session.buffer(), address);
    }

    if let Some(format) = format {
        save_image(session.buffer(), &args.output, format);
    }
}

/// Log min/mean/max frame time and pixel throughput.
fn report_bench(frame_times: &[Duration], pixels_per_frame: usize) {
    let (Some(min), Some(max)) = (frame_times.iter().min(), frame_times.iter().max()) else {
        return;
    };
    let total: Duration = frame_times.iter().sum();
    let mean = total / frame_times.len() as u32;
    let mpix = (pixels_per_frame * frame_times.len()) as f64 / total.as_secs_f64().max(1e-9) / 1e6;

    info!("================== BENCHMARK RESULTS ==================");
    info!("Frames:     {:>8}", frame_times.len());
    info!("Min:        {:>8.2?}", min);
    info!("Mean:       {:>8.2?}", mean);
    info!("Max:        {:>8.2?}", max);
    info!("Throughput: {:>8.1} Mpix/s", mpix);
    info!("========================================================");
}
