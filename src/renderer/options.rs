use std::collections::HashMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::environment::{Fog, Skybox};
use crate::renderer::device::{FramebufferId, Viewport};
use crate::renderer::lights::Light;
use crate::scene::camera::Camera;
use crate::settings::RenderSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Lit color pass.
    #[default]
    Normal,
    DepthOnly,
    SemanticOnly,
    /// Nothing reaches the mesh renderer.
    NoSubmit,
}

/// Bounding volume used when frustum culling renderables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CullingGeom {
    Box,
    #[default]
    Sphere,
}

/// Color ramp of the depth-only view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthViewConfig {
    /// Overrides the camera near plane when set.
    pub znear: Option<f32>,
    /// Overrides the camera far plane when set.
    pub zfar: Option<f32>,
    pub zmin: f32,
    pub zmax: f32,
    pub zmin_color: Vec3,
    pub zmax_color: Vec3,
}

impl Default for DepthViewConfig {
    fn default() -> Self {
        Self {
            znear: None,
            zfar: None,
            zmin: 0.0,
            zmax: 6.0,
            zmin_color: Vec3::ONE,
            zmax_color: Vec3::ZERO,
        }
    }
}

impl DepthViewConfig {
    /// Color for a linear view depth `z`, clamped to the ramp ends.
    pub fn color(&self, z: f32) -> Vec3 {
        let span = self.zmax - self.zmin;
        let t = if span.abs() <= f32::EPSILON {
            if z < self.zmin {
                0.0
            } else {
                1.0
            }
        } else {
            ((z - self.zmin) / span).clamp(0.0, 1.0)
        };
        self.zmin_color.lerp(self.zmax_color, t)
    }
}

/// Side of the default fixed shadow volume, in world units.
pub const DEFAULT_FIXED_EXTENT: f32 = 20.0;

/// Volume covered by the shadow map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShadowRange {
    /// Box of the given size centred on `ShadowRangeConfig::focus_point`.
    FixedUser { width: f32, height: f32, depth: f32 },
    /// Tight box around the camera frustum, padded in world units on each
    /// side of every light-space axis.
    AutoFitCamera {
        extra_width: f32,
        extra_height: f32,
        extra_depth: f32,
    },
}

impl Default for ShadowRange {
    fn default() -> Self {
        ShadowRange::FixedUser {
            width: DEFAULT_FIXED_EXTENT,
            height: DEFAULT_FIXED_EXTENT,
            depth: DEFAULT_FIXED_EXTENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowRangeConfig {
    pub world_up: Vec3,
    pub focus_point: Vec3,
    pub range: ShadowRange,
    /// Point and spot lights only.
    pub fov_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for ShadowRangeConfig {
    fn default() -> Self {
        Self {
            world_up: Vec3::Y,
            focus_point: Vec3::ZERO,
            range: ShadowRange::default(),
            fov_radians: 90f32.to_radians(),
            znear: 0.1,
            zfar: 40.0,
        }
    }
}

impl ShadowRangeConfig {
    pub fn auto_fit(extra: f32) -> Self {
        Self {
            range: ShadowRange::AutoFitCamera {
                extra_width: extra,
                extra_height: extra,
                extra_depth: extra,
            },
            ..Self::default()
        }
    }
}

/// Per-frame configuration handed to `MainRenderer::begin`.
///
/// Scene collaborators are borrowed for the duration of the frame only.
#[derive(Debug, Clone)]
pub struct RenderOptions<'a> {
    pub mode: RenderMode,
    pub use_frustum_culling: bool,
    pub culling_geom: CullingGeom,
    pub use_face_culling: bool,
    pub use_shadow_mapping: bool,
    pub redraw_shadow_map: bool,
    pub pcf_count: i32,
    pub use_blending: bool,
    pub use_fog: bool,
    pub use_skybox: bool,
    pub skybox_fog_lower_limit: f32,
    pub skybox_fog_upper_limit: f32,
    /// Outlines the shadow map's light volume in the debug overlay.
    pub show_shadow_volume: bool,
    /// `None` keeps the device's current viewport.
    pub viewport: Option<Viewport>,
    /// `None` renders into the default framebuffer.
    pub render_target: Option<FramebufferId>,
    pub depth_view: DepthViewConfig,
    pub semantic_view_id_map: HashMap<i32, Vec3>,
    pub shadow_range: ShadowRangeConfig,
    pub camera: Option<&'a Camera>,
    pub light: Option<&'a Light>,
    pub fog: Option<&'a Fog>,
    pub skybox: Option<&'a Skybox>,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            mode: RenderMode::Normal,
            use_frustum_culling: false,
            culling_geom: CullingGeom::Sphere,
            use_face_culling: false,
            use_shadow_mapping: false,
            redraw_shadow_map: true,
            pcf_count: 1,
            use_blending: false,
            use_fog: false,
            use_skybox: false,
            skybox_fog_lower_limit: 0.0,
            skybox_fog_upper_limit: 0.25,
            show_shadow_volume: false,
            viewport: None,
            render_target: None,
            depth_view: DepthViewConfig::default(),
            semantic_view_id_map: HashMap::new(),
            shadow_range: ShadowRangeConfig::default(),
            camera: None,
            light: None,
            fog: None,
            skybox: None,
        }
    }
}

impl<'a> RenderOptions<'a> {
    /// Options seeded from the persisted pipeline settings, with no scene
    /// collaborators attached.
    pub fn from_settings(settings: &RenderSettings) -> Self {
        let pipeline = &settings.pipeline;
        Self {
            mode: pipeline.mode,
            use_frustum_culling: pipeline.use_frustum_culling,
            culling_geom: pipeline.culling_geom,
            use_face_culling: pipeline.use_face_culling,
            use_shadow_mapping: pipeline.use_shadow_mapping,
            redraw_shadow_map: pipeline.redraw_shadow_map,
            pcf_count: pipeline.pcf_count,
            use_blending: pipeline.use_blending,
            use_fog: pipeline.use_fog,
            use_skybox: pipeline.use_skybox,
            skybox_fog_lower_limit: pipeline.skybox_fog_lower_limit,
            skybox_fog_upper_limit: pipeline.skybox_fog_upper_limit,
            show_shadow_volume: pipeline.show_shadow_volume,
            viewport: Some(Viewport::new(
                settings.resolution.width,
                settings.resolution.height,
            )),
            render_target: None,
            depth_view: pipeline.depth_view,
            semantic_view_id_map: pipeline.semantic_view_id_map.clone(),
            shadow_range: pipeline.shadow_range,
            camera: None,
            light: None,
            fog: None,
            skybox: None,
        }
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_camera(mut self, camera: &'a Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_light(mut self, light: &'a Light) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_fog(mut self, fog: &'a Fog) -> Self {
        self.fog = Some(fog);
        self
    }

    pub fn with_skybox(mut self, skybox: &'a Skybox) -> Self {
        self.skybox = Some(skybox);
        self
    }
}

impl fmt::Display for RenderOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mode              : {:?}", self.mode)?;
        writeln!(
            f,
            "frustum culling   : {} ({:?})",
            self.use_frustum_culling, self.culling_geom
        )?;
        writeln!(f, "face culling      : {}", self.use_face_culling)?;
        writeln!(
            f,
            "shadow mapping    : {} (redraw: {}, pcf: {})",
            self.use_shadow_mapping, self.redraw_shadow_map, self.pcf_count
        )?;
        writeln!(f, "shadow range      : {:?}", self.shadow_range.range)?;
        writeln!(f, "shadow volume     : {}", self.show_shadow_volume)?;
        writeln!(f, "blending          : {}", self.use_blending)?;
        writeln!(f, "fog               : {}", self.use_fog)?;
        writeln!(
            f,
            "skybox            : {} (fog limits: {} .. {})",
            self.use_skybox, self.skybox_fog_lower_limit, self.skybox_fog_upper_limit
        )?;
        match self.viewport {
            Some(vp) => writeln!(
                f,
                "viewport          : {}x{} at ({}, {})",
                vp.width, vp.height, vp.x, vp.y
            )?,
            None => writeln!(f, "viewport          : current")?,
        }
        writeln!(f, "render target     : {:?}", self.render_target)?;
        writeln!(
            f,
            "depth view        : z in [{}, {}]",
            self.depth_view.zmin, self.depth_view.zmax
        )?;
        writeln!(
            f,
            "semantic id map   : {} entries",
            self.semantic_view_id_map.len()
        )?;
        write!(
            f,
            "collaborators     : camera={} light={} fog={} skybox={}",
            self.camera.is_some(),
            self.light.is_some(),
            self.fog.is_some(),
            self.skybox.is_some()
        )
    }
}
