// scene/scene.rs - arena of everything a frame can render
use crate::environment::{Fog, Skybox};
use crate::renderer::lights::Light;
use crate::renderer::options::RenderOptions;
use crate::scene::camera::Camera;
use crate::scene::mesh::Renderable;
use crate::settings::RenderSettings;

/// Owns renderables, cameras, lights, fogs and skyboxes; one of each
/// collaborator kind is "current" at a time and is what frames borrow.
#[derive(Debug, Default)]
pub struct Scene {
    renderables: Vec<Renderable>,
    cameras: Vec<Camera>,
    lights: Vec<Light>,
    fogs: Vec<Fog>,
    skyboxes: Vec<Skybox>,
    current_camera: Option<usize>,
    current_light: Option<usize>,
    current_fog: Option<usize>,
    current_skybox: Option<usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_renderable(&mut self, renderable: impl Into<Renderable>) -> usize {
        self.renderables.push(renderable.into());
        self.renderables.len() - 1
    }

    /// The first camera added becomes current.
    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        let index = self.cameras.len() - 1;
        self.current_camera.get_or_insert(index);
        index
    }

    /// The first light added becomes current.
    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        let index = self.lights.len() - 1;
        self.current_light.get_or_insert(index);
        index
    }

    /// The first fog added becomes current.
    pub fn add_fog(&mut self, fog: Fog) -> usize {
        self.fogs.push(fog);
        let index = self.fogs.len() - 1;
        self.current_fog.get_or_insert(index);
        index
    }

    /// The first skybox added becomes current.
    pub fn add_skybox(&mut self, skybox: Skybox) -> usize {
        self.skyboxes.push(skybox);
        let index = self.skyboxes.len() - 1;
        self.current_skybox.get_or_insert(index);
        index
    }

    /// Returns false, leaving the current camera unchanged, for an unknown index.
    pub fn set_current_camera(&mut self, index: usize) -> bool {
        select(&mut self.current_camera, index, self.cameras.len())
    }

    pub fn set_current_light(&mut self, index: usize) -> bool {
        select(&mut self.current_light, index, self.lights.len())
    }

    pub fn set_current_fog(&mut self, index: usize) -> bool {
        select(&mut self.current_fog, index, self.fogs.len())
    }

    pub fn set_current_skybox(&mut self, index: usize) -> bool {
        select(&mut self.current_skybox, index, self.skyboxes.len())
    }

    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables
    }

    pub fn renderables_mut(&mut self) -> &mut [Renderable] {
        &mut self.renderables
    }

    pub fn current_camera(&self) -> Option<&Camera> {
        self.current_camera.map(|i| &self.cameras[i])
    }

    pub fn current_camera_mut(&mut self) -> Option<&mut Camera> {
        let index = self.current_camera?;
        self.cameras.get_mut(index)
    }

    pub fn current_light(&self) -> Option<&Light> {
        self.current_light.map(|i| &self.lights[i])
    }

    pub fn current_fog(&self) -> Option<&Fog> {
        self.current_fog.map(|i| &self.fogs[i])
    }

    pub fn current_skybox(&self) -> Option<&Skybox> {
        self.current_skybox.map(|i| &self.skyboxes[i])
    }

    /// Frame options seeded from `settings` with the current collaborators
    /// attached.
    pub fn render_options(&self, settings: &RenderSettings) -> RenderOptions<'_> {
        let mut options = RenderOptions::from_settings(settings);
        options.camera = self.current_camera();
        options.light = self.current_light();
        options.fog = self.current_fog();
        options.skybox = self.current_skybox();
        options
    }
}

fn select(current: &mut Option<usize>, index: usize, len: usize) -> bool {
    if index < len {
        *current = Some(index);
        true
    } else {
        log::warn!("Ignoring selection of index {} out of {}", index, len);
        false
    }
}
