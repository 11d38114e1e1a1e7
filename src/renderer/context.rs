use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::environment::Fog;
use crate::renderer::device::TextureId;
use crate::renderer::lights::Light;
use crate::renderer::options::{DepthViewConfig, RenderMode, RenderOptions};
use crate::renderer::shadow_map::ShadowMap;

/// Shadow inputs of the lit pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    pub light_space_view_proj: Mat4,
    pub depth_texture: TextureId,
    pub pcf_count: i32,
}

/// Everything the mesh passes read for one frame, copied out of the scene so
/// the frame no longer borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContext {
    pub mode: RenderMode,
    pub view: Mat4,
    pub proj: Mat4,
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub camera_near: f32,
    pub camera_far: f32,
    pub light: Option<Light>,
    /// Set only when shadow mapping is on and a map exists.
    pub shadow: Option<ShadowParams>,
    /// Set only when fog is on and the scene has one.
    pub fog: Option<Fog>,
    pub use_face_culling: bool,
    pub use_blending: bool,
    pub depth_view: DepthViewConfig,
    /// Depth-view range with the camera planes filled in.
    pub depth_view_near: f32,
    pub depth_view_far: f32,
    pub semantic_view_id_map: HashMap<i32, Vec3>,
}

impl FrameContext {
    /// Panics when no camera is set, or when `mode` is `Normal` and no light
    /// is set.
    pub fn assemble(options: &RenderOptions<'_>, shadow_map: Option<&ShadowMap>) -> Self {
        let camera = match options.camera {
            Some(camera) => camera,
            None => panic!("frame context requires a camera"),
        };
        assert!(
            options.mode != RenderMode::Normal || options.light.is_some(),
            "frame context requires a light in {:?} mode",
            options.mode
        );

        let proj_data = camera.proj_data();
        let shadow = match (options.use_shadow_mapping, shadow_map) {
            (true, Some(map)) => Some(ShadowParams {
                light_space_view_proj: map.light_space_view_proj(),
                depth_texture: map.depth_texture(),
                pcf_count: options.pcf_count,
            }),
            _ => None,
        };
        let fog = if options.use_fog {
            options.fog.copied()
        } else {
            None
        };

        Self {
            mode: options.mode,
            view: camera.view_matrix(),
            proj: camera.proj_matrix(),
            view_proj: camera.view_proj(),
            camera_position: camera.position(),
            camera_near: proj_data.near,
            camera_far: proj_data.far,
            light: options.light.copied(),
            shadow,
            fog,
            use_face_culling: options.use_face_culling,
            use_blending: options.use_blending,
            depth_view: options.depth_view,
            depth_view_near: options.depth_view.znear.unwrap_or(proj_data.near),
            depth_view_far: options.depth_view.zfar.unwrap_or(proj_data.far),
            semantic_view_id_map: options.semantic_view_id_map.clone(),
        }
    }
}
