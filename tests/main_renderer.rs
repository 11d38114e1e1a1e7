use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};
use tinyrender::renderer::{
    Capability, ClearFlags, CullingGeom, DeviceCommand, FramebufferId, GeometryId,
    GraphicsDevice, Light, MainRenderer, Material, MeshRendererState, Primitive,
    RecordingDevice, RenderMode, RenderOptions, ShaderKind, ShaderLibrary, TextureId, Viewport,
    SHADOW_VOLUME_COLOR,
};
use tinyrender::scene::{Aabb, Camera, Geometry, Mesh, Model, Renderable, Transform};
use tinyrender::{Fog, RenderSettings, Skybox};

const SKY_CUBE: GeometryId = GeometryId(900);

fn cube(id: u32, position: Vec3) -> Mesh {
    Mesh::new(
        format!("cube{id}"),
        Geometry::new(GeometryId(id), 36, Aabb::unit()),
        Rc::new(Material::phong("m")),
    )
    .with_position(position)
}

fn setup() -> (RecordingDevice, ShaderLibrary, MainRenderer) {
    let mut device = RecordingDevice::new(640, 480);
    let shaders = ShaderLibrary::load_engine_programs(&mut device).unwrap();
    let renderer = MainRenderer::new(&mut device, &RenderSettings::default()).unwrap();
    device.clear_commands();
    (device, shaders, renderer)
}

#[test]
fn normal_frame_runs_shadow_then_color_then_skybox() {
    let (mut device, shaders, mut renderer) = setup();
    let camera = Camera::default();
    let light = Light::directional(Vec3::new(-0.5, -1.0, -0.3));
    let fog = Fog::default();
    let skybox = Skybox::new(TextureId(901), SKY_CUBE);
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light)
        .with_fog(&fog)
        .with_skybox(&skybox);
    options.use_shadow_mapping = true;
    options.use_fog = true;
    options.use_skybox = true;

    let renderables: Vec<Renderable> = vec![
        cube(1, Vec3::ZERO).into(),
        cube(2, Vec3::new(1.5, 0.0, 0.0)).into(),
    ];
    let mut frame = renderer.begin(options);
    frame.submit(&renderables);
    let stats = frame.render(&mut device, &shaders);

    let shadow_fb = renderer.shadow_map().framebuffer();
    let draws = device.draw_calls();
    assert_eq!(draws.len(), 5);
    assert_eq!(stats.draw_calls(), 5);

    let shadow = shaders.get(ShaderKind::ShadowMapping);
    let lit = shaders.get(ShaderKind::lit(true, true));
    let sky = shaders.get(ShaderKind::Skybox { fog: true });
    assert_eq!(device.programs_used(), vec![shadow, lit, sky]);

    assert!(draws[..2]
        .iter()
        .all(|d| d.program == Some(shadow) && d.framebuffer == Some(shadow_fb)));
    assert_eq!(draws[0].viewport, Viewport::new(2048, 2048));
    assert!(draws[2..4]
        .iter()
        .all(|d| d.program == Some(lit) && d.framebuffer.is_none()));
    assert_eq!(draws[4].geometry, SKY_CUBE);
    assert!(!draws[4].indexed);
    assert!(!draws[4].depth_write);
    assert!(device.depth_write());

    // the main target is cleared once, between the shadow and color draws
    let clears: Vec<usize> = device
        .commands()
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == DeviceCommand::Clear(ClearFlags::COLOR | ClearFlags::DEPTH))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(clears.len(), 1);
    let draw_positions: Vec<usize> = device
        .commands()
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            matches!(
                c,
                DeviceCommand::DrawIndexed { .. } | DeviceCommand::DrawArrays { .. }
            )
        })
        .map(|(i, _)| i)
        .collect();
    assert!(draw_positions[..2].iter().all(|&i| i < clears[0]));
    assert!(draw_positions[2..].iter().all(|&i| i > clears[0]));
}

#[test]
fn shadow_pass_is_skipped_without_redraw() {
    let (mut device, shaders, mut renderer) = setup();
    let camera = Camera::default();
    let light = Light::directional(Vec3::NEG_Y);
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    options.use_shadow_mapping = true;
    options.redraw_shadow_map = false;

    let renderables: Vec<Renderable> = vec![cube(1, Vec3::ZERO).into()];
    let mut frame = renderer.begin(options);
    frame.submit(&renderables);
    let stats = frame.render(&mut device, &shaders);

    assert!(stats.shadow_pass.is_none());
    // the lit pass still samples the existing map
    assert_eq!(
        device.programs_used(),
        vec![shaders.get(ShaderKind::lit(true, false))]
    );
}

#[test]
fn frustum_culling_drops_offscreen_renderables_from_color_pass_only() {
    let (mut device, shaders, mut renderer) = setup();
    let camera = Camera::default();
    let light = Light::directional(Vec3::NEG_Y);

    for geom in [CullingGeom::Box, CullingGeom::Sphere] {
        let mut options = RenderOptions::default()
            .with_camera(&camera)
            .with_light(&light);
        options.use_frustum_culling = true;
        options.culling_geom = geom;
        options.use_shadow_mapping = true;

        let renderables: Vec<Renderable> = vec![
            cube(1, Vec3::ZERO).into(),
            cube(2, Vec3::new(500.0, 0.0, 0.0)).into(),
            cube(3, Vec3::new(0.0, 0.0, 50.0)).into(),
        ];
        device.clear_commands();
        let mut frame = renderer.begin(options);
        frame.submit(&renderables);
        let stats = frame.render(&mut device, &shaders);

        assert_eq!(stats.visible_meshes, 3, "{geom:?}");
        assert_eq!(stats.in_view_meshes, 1, "{geom:?}");
        assert_eq!(stats.culled_renderables, 2, "{geom:?}");
        assert_eq!(stats.shadow_pass.map(|p| p.draw_calls), Some(3));
        assert_eq!(stats.main_pass.map(|p| p.draw_calls), Some(1));
    }
}

#[test]
fn hidden_renderables_are_never_drawn() {
    let (mut device, shaders, mut renderer) = setup();
    let camera = Camera::default();
    let light = Light::directional(Vec3::NEG_Y);
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    options.use_shadow_mapping = true;

    let renderables: Vec<Renderable> = vec![
        cube(1, Vec3::ZERO).with_visible(false).into(),
        cube(2, Vec3::X).into(),
    ];
    let mut frame = renderer.begin(options);
    frame.submit(&renderables);
    frame.render(&mut device, &shaders);

    assert!(device
        .draw_calls()
        .iter()
        .all(|d| d.geometry == GeometryId(2)));
    assert_eq!(device.draw_calls().len(), 2);
}

#[test]
fn no_submit_frame_only_clears() {
    let (mut device, shaders, mut renderer) = setup();
    let camera = Camera::default();
    let options = RenderOptions::default()
        .with_camera(&camera)
        .with_mode(RenderMode::NoSubmit);

    let renderables: Vec<Renderable> = vec![cube(1, Vec3::ZERO).into()];
    let mut frame = renderer.begin(options);
    frame.submit(&renderables);
    let stats = frame.render(&mut device, &shaders);

    assert_eq!(stats.visible_meshes, 1);
    assert_eq!(stats.draw_calls(), 0);
    assert!(stats.main_pass.is_none());
    assert!(device.draw_calls().is_empty());
    assert!(device
        .commands()
        .contains(&DeviceCommand::Clear(ClearFlags::COLOR | ClearFlags::DEPTH)));
    assert_eq!(renderer.mesh_renderer().state(), MeshRendererState::Idle);
}

#[test]
#[should_panic(expected = "before submit")]
fn render_without_submit_panics() {
    let (mut device, shaders, mut renderer) = setup();
    let camera = Camera::default();
    let light = Light::point(Vec3::Y);
    let options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    renderer.begin(options).render(&mut device, &shaders);
}

#[test]
fn frame_restores_device_state() {
    let (mut device, shaders, mut renderer) = setup();
    let camera = Camera::default();
    let light = Light::spot(Vec3::new(0.0, 5.0, 5.0), Vec3::new(0.0, -1.0, -1.0), 0.3, 0.5);
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    options.use_shadow_mapping = true;
    options.use_blending = true;
    options.use_face_culling = true;
    options.viewport = Some(Viewport::new(320, 200));
    options.render_target = Some(FramebufferId(77));

    let glass = Rc::new(Material::blinn_phong("glass").with_alpha(0.5));
    let renderables: Vec<Renderable> = vec![
        cube(1, Vec3::ZERO).into(),
        Mesh::new("pane", Geometry::new(GeometryId(2), 6, Aabb::unit()), glass)
            .with_wireframe(true)
            .into(),
    ];
    let before = device.viewport();
    let mut frame = renderer.begin(options);
    frame.submit(&renderables);
    frame.render(&mut device, &shaders);

    let color_draws: Vec<_> = device
        .draw_calls()
        .iter()
        .filter(|d| d.framebuffer == Some(FramebufferId(77)))
        .collect();
    assert_eq!(color_draws.len(), 2);
    assert!(color_draws
        .iter()
        .all(|d| d.viewport == Viewport::new(320, 200)));

    assert_eq!(device.viewport(), before);
    assert_eq!(device.bound_framebuffer(), None);
    assert_eq!(device.active_program(), None);
    assert!(!device.capability_enabled(Capability::Blending));
    assert!(!device.capability_enabled(Capability::FaceCulling));
    assert!(device.capability_enabled(Capability::DepthTest));
    assert!(device.depth_write());
}

#[test]
fn models_flatten_into_world_space_submeshes() {
    let (mut device, shaders, mut renderer) = setup();
    let camera = Camera::default();
    let light = Light::directional(Vec3::NEG_Y);
    let options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light)
        .with_mode(RenderMode::Normal);

    let model_transform = Transform::from_trs(
        Vec3::new(0.0, 0.5, 0.0),
        Quat::from_rotation_y(0.5),
        Vec3::splat(0.5),
    );
    let model = Model::new(
        "pair",
        vec![
            cube(1, Vec3::new(1.0, 0.0, 0.0)),
            cube(2, Vec3::new(-1.0, 0.0, 0.0)).with_visible(false),
        ],
    )
    .with_transform(model_transform)
    .with_mask_id(9);
    let renderables: Vec<Renderable> = vec![model.into()];

    let mut frame = renderer.begin(options);
    frame.submit(&renderables);
    let stats = frame.render(&mut device, &shaders);

    assert_eq!(stats.visible_meshes, 1);
    assert_eq!(device.draw_calls().len(), 1);

    let lit = shaders.get(ShaderKind::lit(false, false));
    let expected = model_transform.matrix() * Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
    let written = device
        .uniform(lit, "u_modelMatrix")
        .and_then(|v| v.as_mat4())
        .unwrap();
    assert!(written.abs_diff_eq(expected, 1e-5));
}

#[test]
fn non_uniform_model_scale_reaches_the_lit_shader_unchanged() {
    let (mut device, shaders, mut renderer) = setup();
    let camera = Camera::default();
    let light = Light::directional(Vec3::NEG_Y);
    let options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);

    let blade = cube(1, Vec3::ZERO).with_transform(
        Transform::IDENTITY.with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_4)),
    );
    let model = Model::new("fan", vec![blade.clone()])
        .with_transform(Transform::IDENTITY.with_scale(Vec3::new(3.0, 1.0, 1.0)));
    let expected = model.matrix() * blade.model_matrix();
    let renderables: Vec<Renderable> = vec![model.into()];

    let mut frame = renderer.begin(options);
    frame.submit(&renderables);
    frame.render(&mut device, &shaders);

    let lit = shaders.get(ShaderKind::lit(false, false));
    let model_matrix = device
        .uniform(lit, "u_modelMatrix")
        .and_then(|v| v.as_mat4())
        .unwrap();
    assert!(model_matrix.abs_diff_eq(expected, 1e-5));
    let tip = model_matrix.transform_point3(Vec3::X);
    assert!(tip.abs_diff_eq(Vec3::new(2.1213207, 0.7071067, 0.0), 1e-5), "{tip:?}");

    let normal_matrix = device
        .uniform(lit, "u_normalMatrix")
        .and_then(|v| v.as_mat4())
        .unwrap();
    assert!(normal_matrix.abs_diff_eq(expected.inverse().transpose(), 1e-4));
}

#[test]
fn debug_overlay_draws_after_skybox_and_empties_its_queue() {
    let (mut device, shaders, mut renderer) = setup();
    let camera = Camera::default();
    let light = Light::directional(Vec3::new(-0.5, -1.0, -0.3));
    let skybox = Skybox::new(TextureId(901), SKY_CUBE);
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light)
        .with_skybox(&skybox);
    options.use_shadow_mapping = true;
    options.use_skybox = true;
    options.show_shadow_volume = true;

    let renderables: Vec<Renderable> = vec![cube(1, Vec3::ZERO).into()];
    let mut frame = renderer.begin(options);
    frame.submit(&renderables);
    frame
        .debug_drawer()
        .draw_aabb(&Aabb::unit(), &Mat4::IDENTITY, Vec3::X);
    let stats = frame.render(&mut device, &shaders);

    let draws = device.draw_calls();
    let sky = draws
        .iter()
        .position(|d| d.geometry == SKY_CUBE)
        .expect("skybox drawn");
    let overlay = draws.len() - 1;
    assert_eq!(sky + 1, overlay);
    assert_eq!(draws[overlay].primitive, Primitive::Lines);
    assert_eq!(draws[overlay].program, Some(shaders.get(ShaderKind::DebugLines)));
    assert!(draws[overlay].framebuffer.is_none());
    // the box plus the twelve edges of the light volume
    assert_eq!(draws[overlay].count, 2 * 24);
    assert_eq!(stats.debug_pass.map(|p| p.draw_calls), Some(1));
    assert_eq!(stats.draw_calls(), draws.len());

    let volume = device
        .line_vertices()
        .iter()
        .filter(|v| v.color == SHADOW_VOLUME_COLOR);
    let light_space = renderer.shadow_map().light_space_view_proj();
    for vertex in volume {
        let ndc = light_space.project_point3(vertex.position);
        assert!(ndc.abs().max_element() < 1.0 + 1e-3, "{ndc:?}");
    }
    assert!(renderer.debug_drawer().is_empty());

    // next frame starts with an empty overlay
    device.clear_commands();
    let options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    let mut frame = renderer.begin(options);
    frame.submit(&renderables);
    let stats = frame.render(&mut device, &shaders);
    assert!(stats.debug_pass.is_none());
    assert!(device.draw_calls().iter().all(|d| d.primitive == Primitive::Triangles));
}
