use glam::Vec3;

use crate::error::RenderError;
use crate::renderer::debug_drawer::{DebugDrawer, SHADOW_VOLUME_COLOR};
use crate::renderer::device::{ClearFlags, FramebufferId, GraphicsDevice, Viewport};
use crate::renderer::mesh_renderer::{MeshRenderer, PassStats};
use crate::renderer::options::{CullingGeom, RenderMode, RenderOptions};
use crate::renderer::shader::ShaderLibrary;
use crate::renderer::shadow_map::ShadowMap;
use crate::renderer::skybox_renderer::SkyboxRenderer;
use crate::scene::bounds::Frustum;
use crate::scene::mesh::{Mesh, Renderable};
use crate::settings::RenderSettings;

/// Summary of one frame, for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Meshes of visible renderables.
    pub visible_meshes: usize,
    /// Meshes left after frustum culling.
    pub in_view_meshes: usize,
    pub culled_renderables: usize,
    pub shadow_pass: Option<PassStats>,
    pub main_pass: Option<PassStats>,
    pub skybox_pass: Option<PassStats>,
    pub debug_pass: Option<PassStats>,
}

impl FrameStats {
    pub fn draw_calls(&self) -> usize {
        [
            self.shadow_pass,
            self.main_pass,
            self.skybox_pass,
            self.debug_pass,
        ]
            .iter()
            .flatten()
            .map(|pass| pass.draw_calls)
            .sum()
    }
}

/// Owns the shadow map, the mesh/skybox renderers and the debug overlay, and
/// sequences their passes each frame.
pub struct MainRenderer {
    shadow_map: ShadowMap,
    mesh_renderer: MeshRenderer,
    skybox_renderer: SkyboxRenderer,
    debug_drawer: DebugDrawer,
}

impl MainRenderer {
    pub fn new(device: &mut dyn GraphicsDevice, settings: &RenderSettings) -> Result<Self, RenderError> {
        let shadow_map = ShadowMap::new(
            device,
            settings.shadow_map_width,
            settings.shadow_map_height,
        )?;
        log::info!("Main renderer ready");

        Ok(Self {
            shadow_map,
            mesh_renderer: MeshRenderer::new(settings.semantic_color_seed),
            skybox_renderer: SkyboxRenderer::new(),
            debug_drawer: DebugDrawer::new(),
        })
    }

    /// Starts a frame. Fog and skybox requests without a matching scene
    /// resource are switched off with a warning; a missing camera, or a
    /// missing light in `Normal` mode, panics.
    pub fn begin<'r, 'a>(&'r mut self, mut options: RenderOptions<'a>) -> Frame<'r, 'a> {
        let camera = match options.camera {
            Some(camera) => camera,
            None => panic!("main renderer requires a camera"),
        };
        assert!(
            options.mode != RenderMode::Normal || options.light.is_some(),
            "main renderer requires a light in {:?} mode",
            options.mode
        );

        if options.use_fog && options.fog.is_none() {
            log::warn!("Fog enabled but the scene has no fog, disabling it for this frame");
            options.use_fog = false;
        }
        if options.use_skybox && options.skybox.is_none() {
            log::warn!("Skybox enabled but the scene has no skybox, disabling it for this frame");
            options.use_skybox = false;
        }

        if options.use_shadow_mapping {
            match options.light {
                Some(light) => {
                    self.shadow_map
                        .setup(light, &options.shadow_range, Some(camera));
                }
                None => {
                    log::warn!("Shadow mapping needs a light, disabling it for this frame");
                    options.use_shadow_mapping = false;
                }
            }
        }

        if options.use_skybox {
            self.skybox_renderer.begin(&options);
        }

        Frame {
            renderer: self,
            options,
            submitted: false,
            stats: FrameStats::default(),
        }
    }

    pub fn shadow_map(&self) -> &ShadowMap {
        &self.shadow_map
    }

    pub fn mesh_renderer(&self) -> &MeshRenderer {
        &self.mesh_renderer
    }

    pub fn debug_drawer(&self) -> &DebugDrawer {
        &self.debug_drawer
    }

    /// Queue for the overlay of the next rendered frame.
    pub fn debug_drawer_mut(&mut self) -> &mut DebugDrawer {
        &mut self.debug_drawer
    }

    /// See [`MeshRenderer::semantic_color`].
    pub fn semantic_color(&mut self, mask_id: i32) -> Vec3 {
        self.mesh_renderer.semantic_color(mask_id)
    }
}

/// One frame in flight. Borrows the renderer and the scene collaborators in
/// its options until `end`.
pub struct Frame<'r, 'a> {
    renderer: &'r mut MainRenderer,
    options: RenderOptions<'a>,
    submitted: bool,
    stats: FrameStats,
}

impl<'r, 'a> Frame<'r, 'a> {
    /// Options after `begin`'s adjustments.
    pub fn options(&self) -> &RenderOptions<'a> {
        &self.options
    }

    /// Overlay drawn on top of this frame by `render`.
    pub fn debug_drawer(&mut self) -> &mut DebugDrawer {
        &mut self.renderer.debug_drawer
    }

    pub fn submit(&mut self, renderables: &[Renderable]) {
        let visible: Vec<&Renderable> = renderables.iter().filter(|r| r.visible()).collect();

        let in_view: Vec<&Renderable> = if self.options.use_frustum_culling {
            // camera presence checked in begin
            let camera = self.options.camera.map(|c| c.view_proj()).unwrap_or_default();
            let frustum = Frustum::from_view_proj(&camera);
            let geom = self.options.culling_geom;
            visible
                .iter()
                .copied()
                .filter(|r| !certainly_outside(&frustum, geom, r))
                .collect()
        } else {
            visible.clone()
        };

        let visible_meshes: Vec<Mesh> = visible.iter().flat_map(|r| r.meshes()).collect();
        let in_view_meshes: Vec<Mesh> = in_view.iter().flat_map(|r| r.meshes()).collect();

        self.stats.visible_meshes = visible_meshes.len();
        self.stats.in_view_meshes = in_view_meshes.len();
        self.stats.culled_renderables = visible.len() - in_view.len();

        if self.options.mode == RenderMode::NoSubmit {
            return;
        }

        let visible_refs: Vec<&Mesh> = visible_meshes.iter().collect();
        let in_view_refs: Vec<&Mesh> = in_view_meshes.iter().collect();
        self.renderer.mesh_renderer.submit(
            &visible_refs,
            &in_view_refs,
            &self.options,
            Some(&self.renderer.shadow_map),
        );
        self.submitted = true;
    }

    /// Runs the passes of the frame's render mode. Panics if meshes were
    /// never submitted, except in `NoSubmit` mode.
    pub fn render(&mut self, device: &mut dyn GraphicsDevice, shaders: &ShaderLibrary) -> FrameStats {
        let mode = self.options.mode;
        assert!(
            self.submitted || mode == RenderMode::NoSubmit,
            "frame rendered before submit"
        );
        let renderer = &mut *self.renderer;

        if mode == RenderMode::Normal
            && self.options.use_shadow_mapping
            && self.options.redraw_shadow_map
        {
            let mut binding = renderer.shadow_map.bind(device);
            let stats = renderer
                .mesh_renderer
                .render_to_shadow_map(binding.device(), shaders);
            self.stats.shadow_pass = Some(stats);
        }

        let mut target = TargetScope::enter(device, self.options.viewport, self.options.render_target);
        target.device().clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        let main = match mode {
            RenderMode::Normal => Some(renderer.mesh_renderer.render(
                target.device(),
                shaders,
                self.options.use_shadow_mapping,
            )),
            RenderMode::DepthOnly => Some(
                renderer
                    .mesh_renderer
                    .render_depth_only(target.device(), shaders),
            ),
            RenderMode::SemanticOnly => Some(
                renderer
                    .mesh_renderer
                    .render_semantic_only(target.device(), shaders),
            ),
            RenderMode::NoSubmit => None,
        };
        self.stats.main_pass = main;

        if mode == RenderMode::Normal && self.options.use_skybox {
            let stats = renderer.skybox_renderer.render(target.device(), shaders);
            self.stats.skybox_pass = Some(stats);
        }

        if mode == RenderMode::NoSubmit {
            renderer.debug_drawer.clear();
        } else {
            if mode == RenderMode::Normal
                && self.options.use_shadow_mapping
                && self.options.show_shadow_volume
            {
                let volume = renderer.shadow_map.light_space_view_proj();
                renderer
                    .debug_drawer
                    .draw_clip_volume(&volume, SHADOW_VOLUME_COLOR);
            }
            let view_proj = self.options.camera.map(|c| c.view_proj()).unwrap_or_default();
            let stats = renderer.debug_drawer.render(target.device(), shaders, view_proj);
            if stats.draw_calls > 0 {
                self.stats.debug_pass = Some(stats);
            }
        }
        drop(target);

        log::debug!(
            "Frame rendered: {} draw calls ({} of {} meshes in view)",
            self.stats.draw_calls(),
            self.stats.in_view_meshes,
            self.stats.visible_meshes
        );
        self.stats
    }

    pub fn end(self) -> FrameStats {
        self.stats
    }
}

fn certainly_outside(frustum: &Frustum, geom: CullingGeom, renderable: &Renderable) -> bool {
    match geom {
        CullingGeom::Box => renderable
            .world_bbox()
            .is_some_and(|bbox| frustum.certainly_outside_box(&bbox)),
        CullingGeom::Sphere => renderable
            .world_bsphere()
            .is_some_and(|sphere| frustum.certainly_outside_sphere(&sphere)),
    }
}

/// Viewport and framebuffer of the main passes, restored on drop.
struct TargetScope<'a> {
    device: &'a mut dyn GraphicsDevice,
    previous_viewport: Viewport,
    previous_framebuffer: Option<FramebufferId>,
}

impl<'a> TargetScope<'a> {
    fn enter(
        device: &'a mut dyn GraphicsDevice,
        viewport: Option<Viewport>,
        framebuffer: Option<FramebufferId>,
    ) -> Self {
        let previous_viewport = device.viewport();
        let previous_framebuffer = device.bound_framebuffer();
        if let Some(viewport) = viewport {
            device.set_viewport(viewport);
        }
        device.bind_framebuffer(framebuffer);
        Self {
            device,
            previous_viewport,
            previous_framebuffer,
        }
    }

    fn device(&mut self) -> &mut dyn GraphicsDevice {
        &mut *self.device
    }
}

impl Drop for TargetScope<'_> {
    fn drop(&mut self) {
        self.device.bind_framebuffer(self.previous_framebuffer);
        self.device.set_viewport(self.previous_viewport);
    }
}
