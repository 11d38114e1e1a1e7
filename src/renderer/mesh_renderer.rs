use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::renderer::context::FrameContext;
use crate::renderer::device::{
    Capability, GeometryId, GraphicsDevice, PolygonMode, ShaderId, TextureTarget,
};
use crate::renderer::material::{Material, MaterialKind};
use crate::renderer::options::{DepthViewConfig, RenderOptions};
use crate::renderer::shader::{BoundShader, ShaderKind, ShaderLibrary};
use crate::renderer::shadow_map::ShadowMap;
use crate::renderer::uniforms::{
    DEPTH_MAP_TEXTURE, LIGHT_SPACE_VIEW_PROJ, LIGHT_SPACE_VIEW_PROJ_LIT, MODEL_MATRIX,
    NORMAL_MATRIX, PCF_COUNT, SHADOW_DEPTH_UNIT, VIEWER_POSITION, VIEW_PROJ_MATRIX,
};
use crate::scene::mesh::{Geometry, Mesh};

/// Progress of the mesh renderer through a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshRendererState {
    Idle,
    Submitted,
    ShadowPassDone,
    ColorPassDone,
    DepthOnlyDone,
    SemanticOnlyDone,
}

/// Buckets filled by [`MeshRenderer::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    ShadowCasters,
    NonCasters,
    Opaque,
    Transparent,
}

/// What a pass sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassStats {
    pub program: Option<ShaderId>,
    pub draw_calls: usize,
}

/// Frame-local copy of a submitted mesh.
#[derive(Debug, Clone)]
pub(crate) struct DrawItem {
    pub geometry: Geometry,
    pub model: Mat4,
    pub position: Vec3,
    pub material: Rc<Material>,
    pub casts_shadows: bool,
    pub cull_faces: bool,
    pub wireframe: bool,
    pub mask_id: i32,
}

impl DrawItem {
    fn snapshot(mesh: &Mesh) -> Self {
        Self {
            geometry: mesh.geometry,
            model: mesh.model_matrix(),
            position: mesh.position(),
            material: Rc::clone(&mesh.material),
            casts_shadows: mesh.casts_shadows,
            cull_faces: mesh.cull_faces,
            wireframe: mesh.wireframe,
            mask_id: mesh.mask_id,
        }
    }
}

/// Per-id colors of the semantic view. Generated colors live as long as the
/// renderer.
#[derive(Debug)]
struct SemanticPalette {
    rng: SmallRng,
    generated: HashMap<i32, Vec3>,
}

impl SemanticPalette {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            generated: HashMap::new(),
        }
    }

    fn color(&mut self, id: i32, explicit: Option<&HashMap<i32, Vec3>>) -> Vec3 {
        if let Some(color) = explicit.and_then(|map| map.get(&id)) {
            return *color;
        }
        let rng = &mut self.rng;
        *self
            .generated
            .entry(id)
            .or_insert_with(|| Vec3::new(rng.gen(), rng.gen(), rng.gen()))
    }
}

/// Classifies submitted meshes and issues the mesh draw calls of a frame.
#[derive(Debug)]
pub struct MeshRenderer {
    state: MeshRendererState,
    context: Option<FrameContext>,
    visible_items: Vec<DrawItem>,
    view_items: Vec<DrawItem>,
    // indices into `visible_items`
    shadow_casters: Vec<usize>,
    non_casters: Vec<usize>,
    // indices into `view_items`
    opaque: Vec<usize>,
    transparent: Vec<usize>,
    palette: SemanticPalette,
}

impl MeshRenderer {
    pub fn new(semantic_color_seed: u64) -> Self {
        Self {
            state: MeshRendererState::Idle,
            context: None,
            visible_items: Vec::new(),
            view_items: Vec::new(),
            shadow_casters: Vec::new(),
            non_casters: Vec::new(),
            opaque: Vec::new(),
            transparent: Vec::new(),
            palette: SemanticPalette::new(semantic_color_seed),
        }
    }

    pub fn state(&self) -> MeshRendererState {
        self.state
    }

    pub fn context(&self) -> Option<&FrameContext> {
        self.context.as_ref()
    }

    /// Classifies the frame's meshes and snapshots the frame context.
    ///
    /// `visible` feeds the shadow buckets and `in_view` the color buckets, so
    /// casters outside the camera still reach the shadow map. Panics when the
    /// options lack a camera, or a light in `Normal` mode.
    pub fn submit(
        &mut self,
        visible: &[&Mesh],
        in_view: &[&Mesh],
        options: &RenderOptions<'_>,
        shadow_map: Option<&ShadowMap>,
    ) {
        let context = FrameContext::assemble(options, shadow_map);

        self.visible_items.clear();
        self.view_items.clear();
        self.shadow_casters.clear();
        self.non_casters.clear();
        self.opaque.clear();
        self.transparent.clear();

        self.visible_items
            .extend(visible.iter().map(|mesh| DrawItem::snapshot(mesh)));
        for (index, item) in self.visible_items.iter().enumerate() {
            if item.casts_shadows {
                self.shadow_casters.push(index);
            } else {
                self.non_casters.push(index);
            }
        }

        self.view_items
            .extend(in_view.iter().map(|mesh| DrawItem::snapshot(mesh)));
        for (index, item) in self.view_items.iter().enumerate() {
            if context.use_blending && item.material.is_translucent() {
                self.transparent.push(index);
            } else {
                self.opaque.push(index);
            }
        }

        if context.use_blending {
            sort_back_to_front(&mut self.transparent, &self.view_items, context.camera_position);
        }

        log::debug!(
            "Mesh submit: {} casters, {} non-casters, {} opaque, {} transparent",
            self.shadow_casters.len(),
            self.non_casters.len(),
            self.opaque.len(),
            self.transparent.len()
        );

        self.context = Some(context);
        self.state = MeshRendererState::Submitted;
    }

    /// Depth pass over the shadow casters. The shadow map must already be
    /// bound on `device`.
    pub fn render_to_shadow_map(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shaders: &ShaderLibrary,
    ) -> PassStats {
        let context = self.submitted_context();
        let shadow = match context.shadow {
            Some(shadow) => shadow,
            None => panic!("shadow pass requires shadow mapping and a shadow map"),
        };

        let program = shaders.get(ShaderKind::ShadowMapping);
        let mut shader = BoundShader::new(device, program);
        shader.set_mat4(LIGHT_SPACE_VIEW_PROJ, shadow.light_space_view_proj);

        let mut draw_calls = 0;
        for &index in &self.shadow_casters {
            let item = &self.visible_items[index];
            shader.set_mat4(MODEL_MATRIX, item.model);
            shader
                .device()
                .draw_indexed(item.geometry.id, item.geometry.index_count);
            draw_calls += 1;
        }
        drop(shader);

        self.state = MeshRendererState::ShadowPassDone;
        PassStats {
            program: Some(program),
            draw_calls,
        }
    }

    /// Lit color pass: opaque meshes grouped by material kind, then
    /// transparent meshes back to front with blending.
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shaders: &ShaderLibrary,
        use_shadow_mapping: bool,
    ) -> PassStats {
        let context = self.submitted_context();
        let light = match &context.light {
            Some(light) => light,
            None => panic!("color pass requires a light"),
        };
        let shadow = if use_shadow_mapping {
            context.shadow
        } else {
            None
        };

        let program = shaders.get(ShaderKind::lit(shadow.is_some(), context.fog.is_some()));
        let mut shader = BoundShader::new(device, program);

        shader.set_mat4(VIEW_PROJ_MATRIX, context.view_proj);
        shader.set_vec3(VIEWER_POSITION, context.camera_position);
        light.bind(&mut shader);
        if let Some(shadow) = shadow {
            shader.set_mat4(LIGHT_SPACE_VIEW_PROJ_LIT, shadow.light_space_view_proj);
            shader.bind_texture(
                DEPTH_MAP_TEXTURE,
                SHADOW_DEPTH_UNIT,
                TextureTarget::Texture2d,
                shadow.depth_texture,
            );
            shader.set_int(PCF_COUNT, shadow.pcf_count);
        }
        if let Some(fog) = &context.fog {
            fog.bind(&mut shader);
        }

        let mut draw_calls = 0;
        for kind in MaterialKind::ALL {
            let bucket: Vec<&DrawItem> = self
                .opaque
                .iter()
                .map(|&index| &self.view_items[index])
                .filter(|item| item.material.kind == kind)
                .collect();
            if bucket.is_empty() {
                continue;
            }

            kind.bind(&mut shader);
            if context.use_face_culling {
                let (culled, unculled): (Vec<&DrawItem>, Vec<&DrawItem>) =
                    bucket.into_iter().partition(|item| item.cull_faces);
                if !culled.is_empty() {
                    shader.device().set_capability(Capability::FaceCulling, true);
                    for item in culled {
                        draw_lit(&mut shader, item);
                        draw_calls += 1;
                    }
                    shader.device().set_capability(Capability::FaceCulling, false);
                }
                for item in unculled {
                    draw_lit(&mut shader, item);
                    draw_calls += 1;
                }
            } else {
                for item in bucket {
                    draw_lit(&mut shader, item);
                    draw_calls += 1;
                }
            }
        }

        if !self.transparent.is_empty() {
            shader.device().set_capability(Capability::Blending, true);
            let mut current_kind = None;
            let mut culling = false;
            for &index in &self.transparent {
                let item = &self.view_items[index];
                if current_kind != Some(item.material.kind) {
                    item.material.kind.bind(&mut shader);
                    current_kind = Some(item.material.kind);
                }
                let wants_culling = context.use_face_culling && item.cull_faces;
                if wants_culling != culling {
                    shader
                        .device()
                        .set_capability(Capability::FaceCulling, wants_culling);
                    culling = wants_culling;
                }
                draw_lit(&mut shader, item);
                draw_calls += 1;
            }
            if culling {
                shader.device().set_capability(Capability::FaceCulling, false);
            }
            shader.device().set_capability(Capability::Blending, false);
        }
        drop(shader);

        self.state = MeshRendererState::ColorPassDone;
        PassStats {
            program: Some(program),
            draw_calls,
        }
    }

    /// Depth visualization over every in-view mesh.
    pub fn render_depth_only(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shaders: &ShaderLibrary,
    ) -> PassStats {
        let context = self.submitted_context();
        let program = shaders.get(ShaderKind::DepthView);
        let mut shader = BoundShader::new(device, program);

        shader.set_mat4(VIEW_PROJ_MATRIX, context.view_proj);
        shader.set_float("u_depthView.znear", context.depth_view_near);
        shader.set_float("u_depthView.zfar", context.depth_view_far);
        shader.set_float("u_depthView.zmin", context.depth_view.zmin);
        shader.set_float("u_depthView.zmax", context.depth_view.zmax);
        shader.set_vec3("u_depthView.zminColor", context.depth_view.zmin_color);
        shader.set_vec3("u_depthView.zmaxColor", context.depth_view.zmax_color);

        let mut draw_calls = 0;
        for &index in self.opaque.iter().chain(&self.transparent) {
            let item = &self.view_items[index];
            shader.set_mat4(MODEL_MATRIX, item.model);
            shader
                .device()
                .draw_indexed(item.geometry.id, item.geometry.index_count);
            draw_calls += 1;
        }
        drop(shader);

        self.state = MeshRendererState::DepthOnlyDone;
        PassStats {
            program: Some(program),
            draw_calls,
        }
    }

    /// Flat per-object-id colors over every in-view mesh.
    pub fn render_semantic_only(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shaders: &ShaderLibrary,
    ) -> PassStats {
        let context = match &self.context {
            Some(context) if self.state != MeshRendererState::Idle => context,
            _ => panic!("mesh renderer pass called before submit"),
        };
        let program = shaders.get(ShaderKind::SemanticView);
        let mut shader = BoundShader::new(device, program);
        shader.set_mat4(VIEW_PROJ_MATRIX, context.view_proj);

        let mut draw_calls = 0;
        for &index in self.opaque.iter().chain(&self.transparent) {
            let item = &self.view_items[index];
            let color = self
                .palette
                .color(item.mask_id, Some(&context.semantic_view_id_map));
            shader.set_vec3("u_maskColor", color);
            shader.set_mat4(MODEL_MATRIX, item.model);
            shader
                .device()
                .draw_indexed(item.geometry.id, item.geometry.index_count);
            draw_calls += 1;
        }
        drop(shader);

        self.state = MeshRendererState::SemanticOnlyDone;
        PassStats {
            program: Some(program),
            draw_calls,
        }
    }

    /// Color the semantic view uses for `mask_id`: the explicit map entry of
    /// the submitted frame, else a generated color that stays fixed for the
    /// lifetime of this renderer.
    pub fn semantic_color(&mut self, mask_id: i32) -> Vec3 {
        let explicit = self.context.as_ref().map(|c| &c.semantic_view_id_map);
        self.palette.color(mask_id, explicit)
    }

    /// CPU mirror of the depth-view ramp for a linear view depth.
    pub fn depth_view_color(&self, z: f32) -> Vec3 {
        self.context
            .as_ref()
            .map(|c| c.depth_view)
            .unwrap_or_else(DepthViewConfig::default)
            .color(z)
    }

    pub fn bucket_len(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::ShadowCasters => self.shadow_casters.len(),
            Bucket::NonCasters => self.non_casters.len(),
            Bucket::Opaque => self.opaque.len(),
            Bucket::Transparent => self.transparent.len(),
        }
    }

    /// Geometry of every mesh in `bucket`, in draw order.
    pub fn bucket_geometries(&self, bucket: Bucket) -> Vec<GeometryId> {
        let (indices, items) = match bucket {
            Bucket::ShadowCasters => (&self.shadow_casters, &self.visible_items),
            Bucket::NonCasters => (&self.non_casters, &self.visible_items),
            Bucket::Opaque => (&self.opaque, &self.view_items),
            Bucket::Transparent => (&self.transparent, &self.view_items),
        };
        indices.iter().map(|&i| items[i].geometry.id).collect()
    }

    fn submitted_context(&self) -> &FrameContext {
        match &self.context {
            Some(context) if self.state != MeshRendererState::Idle => context,
            _ => panic!("mesh renderer pass called before submit"),
        }
    }
}

fn draw_lit(shader: &mut BoundShader<'_>, item: &DrawItem) {
    item.material.bind(shader);
    shader.set_mat4(MODEL_MATRIX, item.model);
    shader.set_mat4(NORMAL_MATRIX, item.model.inverse().transpose());

    if item.wireframe {
        shader.device().set_polygon_mode(PolygonMode::Line);
    }
    shader
        .device()
        .draw_indexed(item.geometry.id, item.geometry.index_count);
    if item.wireframe {
        shader.device().set_polygon_mode(PolygonMode::Fill);
    }
}

// stable: equal distances keep submission order
fn sort_back_to_front(indices: &mut [usize], items: &[DrawItem], camera_pos: Vec3) {
    indices.sort_by(|&a, &b| {
        let da = (items[a].position - camera_pos).length_squared();
        let db = (items[b].position - camera_pos).length_squared();
        db.partial_cmp(&da).unwrap_or(Ordering::Equal)
    });
}
