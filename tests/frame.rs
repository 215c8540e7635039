//! End-to-end render through the public API.

use glam::Vec3A;
use oceantracer::camera::Camera;
use oceantracer::config::Config;
use oceantracer::random::NoiseTable;
use oceantracer::render::{new_frame_buffer, render, Frame, Settings};
use oceantracer::scene::{Scene, SceneState};
use oceantracer::session::RenderSession;
use oceantracer::tile::generate_tiles;

const XRES: u32 = 53;
const YRES: u32 = 35;

/// Level camera above the water: the top tile band sees only sky.
fn horizon_camera() -> Camera {
    Camera::new(Vec3A::new(0.0, 4.0, 30.0), Vec3A::new(0.0, 4.0, 0.0), Vec3A::Y, 50.0)
}

fn render_once(scene: &Scene, time: f32) -> Vec<f32> {
    let settings = Settings::new(XRES, YRES).with_time(time);
    let mut tiles = generate_tiles(&settings);
    let mut buffer = new_frame_buffer(&settings);
    let noise = NoiseTable::new(7, 32);
    let camera = horizon_camera();
    let frame = Frame {
        scene,
        noise: &noise,
        camera: &camera,
        settings: &settings,
        frame_index: 0,
        sample_index: 1,
    };
    render(&mut buffer, &mut tiles, &frame);
    buffer.into_raw()
}

#[test]
fn frame_is_complete_and_finite() {
    let scene = Scene::default();
    let settings = Settings::new(XRES, YRES).with_time(0.5);
    let mut tiles = generate_tiles(&settings);
    let mut buffer = new_frame_buffer(&settings);
    buffer.iter_mut().for_each(|v| *v = f32::NAN);

    let noise = NoiseTable::new(7, 32);
    let camera = horizon_camera();
    let frame = Frame {
        scene: &scene,
        noise: &noise,
        camera: &camera,
        settings: &settings,
        frame_index: 0,
        sample_index: 1,
    };
    let stats = render(&mut buffer, &mut tiles, &frame);

    assert_eq!(stats.sky_tiles + stats.traced_tiles, tiles.count);
    assert!(stats.traced_tiles > 0, "camera sees the ocean");
    assert!(stats.sky_tiles > 0, "camera sees open sky");
    assert!(buffer.iter().all(|v| v.is_finite() && *v >= 0.0));
}

#[test]
fn same_inputs_render_identically() {
    let scene = Scene::default();
    assert_eq!(render_once(&scene, 1.25), render_once(&scene, 1.25));
}

#[test]
fn depth_edit_changes_the_picture() {
    let mut state = SceneState::new(Scene::default());
    let calm = render_once(&state.snapshot(), 0.0);
    state.set_depth(6.0);
    let rough = render_once(&state.snapshot(), 0.0);
    assert_ne!(calm, rough);
}

#[test]
fn session_driven_by_config() {
    let config = Config::parse(
        r#"
        [camera]
        position = [0.0, 4.0, 30.0]

        [render]
        width = 33
        height = 17
        frames = 3
        time_step = 0.25
        "#,
    )
    .expect("valid config");

    let scene = config.scene();
    let render = &config.render;
    let noise = NoiseTable::new(render.noise_seed, render.noise_size);
    let mut session =
        RenderSession::new(render.width, render.height, config.camera(), noise).expect("valid size");

    let mut last = None;
    for k in 0..render.frames {
        last = Some(session.render_frame(&scene, config.settings(k).time));
    }
    let last = last.expect("at least one frame");
    assert_eq!(last.frame_index, 2);
    assert_eq!(last.sample_index, 3);
    assert_eq!(session.settings().time, 0.5);
    assert_eq!(session.buffer().dimensions(), (33, 17));
    assert!(session.buffer().iter().all(|v| v.is_finite()));
}
