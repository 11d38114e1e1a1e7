use std::rc::Rc;

use glam::{Quat, Vec3};
use log::info;
use tinyrender::renderer::{GeometryId, Light, Material, TextureId};
use tinyrender::scene::{
    Aabb, Camera, Geometry, Mesh, Model, ProjectionData, Scene, Transform,
};
use tinyrender::{Fog, Skybox};

const CUBE: GeometryId = GeometryId(1000);
const SKY_CUBE: GeometryId = GeometryId(1001);
const CHECKER_TEXTURE: TextureId = TextureId(2000);
const SKY_CUBEMAP: TextureId = TextureId(2001);

#[allow(dead_code)]
#[derive(Clone, Copy, Debug)]
pub enum DemoScene {
    ShadowTest,
    Transparency,
    Grid { size: i32 },
}

impl DemoScene {
    pub fn build(self, aspect: f32) -> Scene {
        let mut scene = Scene::new();
        let projection = ProjectionData::perspective(45f32.to_radians(), aspect, 0.1, 100.0);
        let mut camera = Camera::orbit(Vec3::ZERO, 12.0, projection);
        camera.orbit_by(0.0, 0.35);
        scene.add_camera(camera);
        scene.add_fog(Fog::exponential(Vec3::new(0.66, 0.76, 0.85), 0.03, 1.5));
        scene.add_skybox(Skybox::new(SKY_CUBEMAP, SKY_CUBE));

        match self {
            DemoScene::ShadowTest => setup_shadow_test_scene(&mut scene),
            DemoScene::Transparency => setup_transparency_scene(&mut scene),
            DemoScene::Grid { size } => setup_grid_scene(&mut scene, size),
        }
        scene
    }
}

fn cube_geometry() -> Geometry {
    Geometry::new(CUBE, 36, Aabb::unit())
}

fn add_floor(scene: &mut Scene) {
    let floor_material = Rc::new(
        Material::lambert("floor")
            .with_color(Vec3::splat(0.8))
            .with_albedo_map(CHECKER_TEXTURE),
    );
    scene.add_renderable(
        Mesh::new("floor", cube_geometry(), floor_material)
            .with_transform(Transform::from_trs(
                Vec3::new(0.0, -0.05, 0.0),
                Quat::IDENTITY,
                Vec3::new(25.0, 0.1, 25.0),
            ))
            .with_casts_shadows(false)
            .with_mask_id(1),
    );
}

fn setup_shadow_test_scene(scene: &mut Scene) {
    info!("Creating shadow map test scene...");
    add_floor(scene);

    let cube_material = Rc::new(
        Material::phong("cube")
            .with_color(Vec3::new(0.86, 0.86, 0.9))
            .with_specular(Vec3::splat(0.5), 64.0),
    );
    scene.add_renderable(
        Mesh::new("shadow test cube", cube_geometry(), cube_material)
            .with_transform(Transform::from_trs(
                Vec3::new(0.0, 1.0, 0.0),
                Quat::IDENTITY,
                Vec3::splat(1.5),
            ))
            .with_mask_id(2),
    );

    scene.add_light(
        Light::directional(Vec3::new(-0.6, -1.0, -0.4))
            .with_colors(Vec3::splat(0.2), Vec3::splat(0.9), Vec3::splat(0.9))
            .with_intensity(1.0),
    );
}

fn setup_transparency_scene(scene: &mut Scene) {
    info!("Creating transparency scene...");
    add_floor(scene);

    let glass = Rc::new(
        Material::blinn_phong("glass")
            .with_color(Vec3::new(0.4, 0.7, 0.9))
            .with_alpha(0.35),
    );
    for i in 0..4 {
        scene.add_renderable(
            Mesh::new(format!("pane {i}"), cube_geometry(), Rc::clone(&glass))
                .with_transform(Transform::from_trs(
                    Vec3::new(0.0, 1.0, -3.0 + 2.0 * i as f32),
                    Quat::IDENTITY,
                    Vec3::new(3.0, 2.0, 0.1),
                ))
                .with_cull_faces(false)
                .with_mask_id(10 + i),
        );
    }

    let frame_material = Rc::new(Material::phong("frame").with_color(Vec3::splat(0.3)));
    let post = |x: f32| {
        Mesh::new("post", cube_geometry(), Rc::clone(&frame_material)).with_transform(
            Transform::from_trs(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY, Vec3::new(0.2, 2.5, 0.2)),
        )
    };
    scene.add_renderable(
        Model::new("rack", vec![post(-1.6), post(1.6)])
            .with_transform(Transform::from_translation(Vec3::new(0.0, 1.25, 0.0)))
            .with_mask_id(20),
    );

    scene.add_light(
        Light::spot(Vec3::new(0.0, 8.0, 4.0), Vec3::new(0.0, -1.0, -0.5), 0.3, 0.5)
            .with_intensity(2.0),
    );
}

fn setup_grid_scene(scene: &mut Scene, size: i32) {
    info!("Creating {}x{} grid scene...", size, size);
    add_floor(scene);

    let kinds = [
        Material::lambert("lambert"),
        Material::phong("phong"),
        Material::blinn_phong("blinn-phong"),
    ]
    .map(Rc::new);

    for x in -size..=size {
        for z in -size..=size {
            let material = Rc::clone(&kinds[(x + z).rem_euclid(3) as usize]);
            scene.add_renderable(
                Mesh::new(format!("cube {x},{z}"), cube_geometry(), material)
                    .with_position(Vec3::new(x as f32 * 2.0, 0.5, z as f32 * 2.0))
                    .with_mask_id(100 + (x + size) * (2 * size + 1) + (z + size)),
            );
        }
    }

    scene.add_light(Light::point(Vec3::new(0.0, 6.0, 0.0)).with_intensity(3.0));
}
