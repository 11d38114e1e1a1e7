mod demo_scenes;

use demo_scenes::DemoScene;
use glam::{Mat4, Vec3};
use tinyrender::renderer::{MainRenderer, RecordingDevice, RenderMode, ShaderLibrary};
use tinyrender::{RenderError, RenderSettings};

const ACTIVE_SCENE: DemoScene = DemoScene::Transparency;
const FRAMES: usize = 4;

fn run() -> Result<(), RenderError> {
    let settings = RenderSettings::load();
    let resolution = &settings.resolution;
    let aspect = resolution.width as f32 / resolution.height as f32;

    let mut device = RecordingDevice::new(resolution.width, resolution.height);
    let shaders = ShaderLibrary::load_engine_programs(&mut device)?;
    let mut renderer = MainRenderer::new(&mut device, &settings)?;
    let mut scene = ACTIVE_SCENE.build(aspect);

    let modes = [
        RenderMode::Normal,
        RenderMode::DepthOnly,
        RenderMode::SemanticOnly,
        RenderMode::NoSubmit,
    ];

    for frame_index in 0..FRAMES {
        if let Some(camera) = scene.current_camera_mut() {
            camera.orbit_by(0.4, 0.0);
        }

        let mut options = scene.render_options(&settings);
        options.mode = modes[frame_index % modes.len()];
        options.use_shadow_mapping = true;
        options.use_blending = true;
        options.use_fog = true;
        options.use_skybox = true;
        options.use_face_culling = true;
        options.use_frustum_culling = true;
        options.show_shadow_volume = true;

        log::info!("Frame {} options:\n{}", frame_index, options);

        device.clear_commands();
        let mut frame = renderer.begin(options);
        frame.submit(scene.renderables());
        for renderable in scene.renderables() {
            if let Some(bbox) = renderable.world_bbox() {
                frame
                    .debug_drawer()
                    .draw_aabb(&bbox, &Mat4::IDENTITY, Vec3::new(0.0, 1.0, 0.0));
            }
        }
        frame.render(&mut device, &shaders);
        let stats = frame.end();

        log::info!(
            "Frame {}: {} draw calls, {}/{} meshes in view, {} device commands",
            frame_index,
            stats.draw_calls(),
            stats.in_view_meshes,
            stats.visible_meshes,
            device.commands().len()
        );
    }

    Ok(())
}

fn main() {
    tinyrender::init_logging();
    if let Err(err) = run() {
        log::error!("Renderer error: {err}");
        std::process::exit(1);
    }
}
