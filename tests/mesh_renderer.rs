use std::rc::Rc;

use glam::Vec3;
use tinyrender::renderer::{
    Bucket, Capability, GeometryId, Light, Material, MeshRenderer, MeshRendererState,
    RecordingDevice, RenderOptions, ShaderKind, ShaderLibrary, ShadowMap, TextureId,
};
use tinyrender::scene::{Aabb, Camera, Geometry, Mesh};
use tinyrender::Fog;

fn mesh(id: u32, material: &Rc<Material>, position: Vec3) -> Mesh {
    Mesh::new(
        format!("mesh{id}"),
        Geometry::new(GeometryId(id), 36, Aabb::unit()),
        Rc::clone(material),
    )
    .with_position(position)
}

fn setup() -> (RecordingDevice, ShaderLibrary) {
    let mut device = RecordingDevice::new(320, 240);
    let shaders = ShaderLibrary::load_engine_programs(&mut device).unwrap();
    device.clear_commands();
    (device, shaders)
}

#[test]
fn buckets_partition_submitted_meshes() {
    let camera = Camera::default();
    let light = Light::directional(Vec3::NEG_Y);
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    options.use_blending = true;

    let solid = Rc::new(Material::phong("solid"));
    let glass = Rc::new(Material::phong("glass").with_alpha(0.5));
    let meshes = [
        mesh(1, &solid, Vec3::ZERO),
        mesh(2, &glass, Vec3::X).with_casts_shadows(false),
        mesh(3, &solid, Vec3::NEG_X).with_casts_shadows(false),
        mesh(4, &glass, Vec3::Y),
    ];
    let visible: Vec<&Mesh> = meshes.iter().collect();
    let in_view: Vec<&Mesh> = meshes[..3].iter().collect();

    let mut renderer = MeshRenderer::new(7);
    renderer.submit(&visible, &in_view, &options, None);

    assert_eq!(renderer.state(), MeshRendererState::Submitted);
    assert_eq!(
        renderer.bucket_geometries(Bucket::ShadowCasters),
        vec![GeometryId(1), GeometryId(4)]
    );
    assert_eq!(
        renderer.bucket_geometries(Bucket::NonCasters),
        vec![GeometryId(2), GeometryId(3)]
    );
    assert_eq!(
        renderer.bucket_geometries(Bucket::Opaque),
        vec![GeometryId(1), GeometryId(3)]
    );
    assert_eq!(renderer.bucket_geometries(Bucket::Transparent), vec![GeometryId(2)]);

    // every visible mesh sits in exactly one shadow bucket
    assert_eq!(
        renderer.bucket_len(Bucket::ShadowCasters) + renderer.bucket_len(Bucket::NonCasters),
        visible.len()
    );
    assert_eq!(
        renderer.bucket_len(Bucket::Opaque) + renderer.bucket_len(Bucket::Transparent),
        in_view.len()
    );
}

#[test]
fn translucent_meshes_are_opaque_without_blending() {
    let camera = Camera::default();
    let light = Light::directional(Vec3::NEG_Y);
    let options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    let glass = Rc::new(Material::lambert("glass").with_alpha(0.2));
    let meshes = [mesh(1, &glass, Vec3::ZERO)];
    let refs: Vec<&Mesh> = meshes.iter().collect();

    let mut renderer = MeshRenderer::new(0);
    renderer.submit(&refs, &refs, &options, None);
    assert_eq!(renderer.bucket_len(Bucket::Opaque), 1);
    assert_eq!(renderer.bucket_len(Bucket::Transparent), 0);
}

#[test]
fn submit_is_idempotent() {
    let camera = Camera::default();
    let light = Light::directional(Vec3::NEG_Y);
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    options.use_blending = true;

    let solid = Rc::new(Material::lambert("solid"));
    let glass = Rc::new(Material::blinn_phong("glass").with_alpha(0.4));
    let meshes = [
        mesh(1, &solid, Vec3::ZERO),
        mesh(2, &glass, Vec3::new(0.0, 0.0, -2.0)),
        mesh(3, &glass, Vec3::new(0.0, 0.0, 1.0)),
    ];
    let refs: Vec<&Mesh> = meshes.iter().collect();

    let mut renderer = MeshRenderer::new(0);
    renderer.submit(&refs, &refs, &options, None);
    let first: Vec<_> = [
        Bucket::ShadowCasters,
        Bucket::NonCasters,
        Bucket::Opaque,
        Bucket::Transparent,
    ]
    .map(|b| renderer.bucket_geometries(b))
    .to_vec();

    renderer.submit(&refs, &refs, &options, None);
    let second: Vec<_> = [
        Bucket::ShadowCasters,
        Bucket::NonCasters,
        Bucket::Opaque,
        Bucket::Transparent,
    ]
    .map(|b| renderer.bucket_geometries(b))
    .to_vec();

    assert_eq!(first, second);
}

#[test]
fn transparent_meshes_draw_back_to_front_with_blending() {
    let camera = Camera::default(); // at (0, 0, 3)
    let light = Light::point(Vec3::new(0.0, 4.0, 0.0));
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    options.use_blending = true;

    let solid = Rc::new(Material::phong("solid"));
    let glass = Rc::new(Material::phong("glass").with_alpha(0.5));
    let meshes = [
        mesh(10, &glass, Vec3::new(0.0, 0.0, 2.0)),
        mesh(11, &glass, Vec3::new(0.0, 0.0, -4.0)),
        mesh(1, &solid, Vec3::ZERO),
        mesh(12, &glass, Vec3::new(0.0, 0.0, 0.0)),
    ];
    let refs: Vec<&Mesh> = meshes.iter().collect();

    let (mut device, shaders) = setup();
    let mut renderer = MeshRenderer::new(0);
    renderer.submit(&refs, &refs, &options, None);
    let stats = renderer.render(&mut device, &shaders, false);

    let draws = device.draw_calls();
    assert_eq!(stats.draw_calls, 4);
    let order: Vec<_> = draws.iter().map(|d| d.geometry).collect();
    assert_eq!(
        order,
        vec![GeometryId(1), GeometryId(11), GeometryId(12), GeometryId(10)]
    );
    assert!(!draws[0].blending);
    assert!(draws[1..].iter().all(|d| d.blending));
    assert!(!device.capability_enabled(Capability::Blending));
    assert_eq!(renderer.state(), MeshRendererState::ColorPassDone);
}

#[test]
fn lambert_and_transparent_phong_share_one_lit_program() {
    let camera = Camera::default();
    let light = Light::directional(Vec3::new(-0.3, -1.0, -0.2));
    let fog = Fog::default();
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light)
        .with_fog(&fog);
    options.use_blending = true;
    options.use_fog = true;
    options.use_shadow_mapping = true;
    options.pcf_count = 2;

    let (mut device, shaders) = setup();
    let mut map = ShadowMap::new(&mut device, 512, 512).unwrap();
    map.setup(&light, &options.shadow_range, Some(&camera));
    device.clear_commands();

    let lambert = Rc::new(Material::lambert("floor").with_albedo_map(TextureId(900)));
    let phong = Rc::new(Material::phong("glass").with_alpha(0.3));
    let meshes = [
        mesh(1, &lambert, Vec3::ZERO),
        mesh(2, &phong, Vec3::new(0.0, 1.0, 0.0)),
    ];
    let refs: Vec<&Mesh> = meshes.iter().collect();

    let mut renderer = MeshRenderer::new(0);
    renderer.submit(&refs, &refs, &options, Some(&map));
    let stats = renderer.render(&mut device, &shaders, true);

    let lit = shaders.get(ShaderKind::lit(true, true));
    assert_eq!(device.programs_used(), vec![lit]);
    assert_eq!(stats.program, Some(lit));
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(device.draw_calls().len(), 2);
    assert_eq!(
        device.uniform(lit, "u_pcfCount").and_then(|v| v.as_int()),
        Some(2)
    );
    assert_eq!(
        device.uniform(lit, "u_material.type").and_then(|v| v.as_int()),
        Some(1)
    );
    // program and texture units are released after the pass
    assert_eq!(device.active_program(), None);
    assert_eq!(device.texture_on_unit(3), None);
}

#[test]
fn non_casters_skip_shadow_pass_but_are_lit() {
    let camera = Camera::default();
    let light = Light::directional(Vec3::NEG_Y);
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    options.use_shadow_mapping = true;

    let (mut device, shaders) = setup();
    let mut map = ShadowMap::new(&mut device, 256, 256).unwrap();
    map.setup(&light, &options.shadow_range, Some(&camera));

    let material = Rc::new(Material::lambert("ground"));
    let meshes = [mesh(5, &material, Vec3::ZERO).with_casts_shadows(false)];
    let refs: Vec<&Mesh> = meshes.iter().collect();

    let mut renderer = MeshRenderer::new(0);
    renderer.submit(&refs, &refs, &options, Some(&map));

    device.clear_commands();
    let shadow = {
        let mut binding = map.bind(&mut device);
        renderer.render_to_shadow_map(binding.device(), &shaders)
    };
    assert_eq!(shadow.draw_calls, 0);
    assert_eq!(renderer.state(), MeshRendererState::ShadowPassDone);

    let color = renderer.render(&mut device, &shaders, true);
    assert_eq!(color.draw_calls, 1);
    assert_eq!(device.draw_calls()[0].geometry, GeometryId(5));
    assert_eq!(device.draw_calls()[0].framebuffer, None);
}

#[test]
fn face_culling_follows_mesh_flags() {
    let camera = Camera::default();
    let light = Light::directional(Vec3::NEG_Y);
    let mut options = RenderOptions::default()
        .with_camera(&camera)
        .with_light(&light);
    options.use_face_culling = true;

    let material = Rc::new(Material::phong("m"));
    let meshes = [
        mesh(1, &material, Vec3::ZERO).with_cull_faces(false),
        mesh(2, &material, Vec3::X),
    ];
    let refs: Vec<&Mesh> = meshes.iter().collect();

    let (mut device, shaders) = setup();
    let mut renderer = MeshRenderer::new(0);
    renderer.submit(&refs, &refs, &options, None);
    renderer.render(&mut device, &shaders, false);

    let culling: Vec<_> = device
        .draw_calls()
        .iter()
        .map(|d| (d.geometry, d.face_culling))
        .collect();
    assert!(culling.contains(&(GeometryId(2), true)));
    assert!(culling.contains(&(GeometryId(1), false)));
    assert!(!device.capability_enabled(Capability::FaceCulling));
}

#[test]
#[should_panic(expected = "requires a light")]
fn normal_submit_without_light_panics() {
    let camera = Camera::default();
    let options = RenderOptions::default().with_camera(&camera);
    MeshRenderer::new(0).submit(&[], &[], &options, None);
}
