use std::collections::HashMap;
use std::fs;
use std::path::Path;

use glam::Vec3;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::renderer::options::{CullingGeom, DepthViewConfig, RenderMode, ShadowRangeConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "RenderSettings::default_shadow_map_size")]
    pub shadow_map_width: u32,
    #[serde(default = "RenderSettings::default_shadow_map_size")]
    pub shadow_map_height: u32,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    /// Seed for the semantic view's generated colors.
    #[serde(default = "RenderSettings::default_semantic_color_seed")]
    pub semantic_color_seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shadow_map_width: Self::default_shadow_map_size(),
            shadow_map_height: Self::default_shadow_map_size(),
            resolution: Resolution::default(),
            pipeline: PipelineSettings::default(),
            semantic_color_seed: Self::default_semantic_color_seed(),
        }
    }
}

impl RenderSettings {
    pub const DEFAULT_PATH: &'static str = "settings.json";

    pub fn load() -> Self {
        Self::load_from_path(Self::DEFAULT_PATH)
    }

    /// Like [`try_load_from_path`](Self::try_load_from_path), but any failure
    /// yields the defaults. A missing file is not worth a warning.
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_path(path) {
            Ok(settings) => {
                info!("Render settings loaded from {}", path.display());
                settings
            }
            Err(SettingsError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!("No render settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("{err}; using default render settings");
                Self::default()
            }
        }
    }

    pub fn try_load_from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(settings.validate())
    }

    /// Replaces values the renderer cannot work with.
    pub fn validate(mut self) -> Self {
        if self.shadow_map_width == 0 || self.shadow_map_height == 0 {
            warn!(
                "Shadow map of {}x{} is unusable, falling back to {}",
                self.shadow_map_width,
                self.shadow_map_height,
                Self::default_shadow_map_size()
            );
            self.shadow_map_width = Self::default_shadow_map_size();
            self.shadow_map_height = Self::default_shadow_map_size();
        }

        let resolution = &self.resolution;
        if resolution.width == 0 || resolution.height == 0 {
            warn!(
                "Resolution {}x{} is unusable, falling back to the default",
                resolution.width, resolution.height
            );
            self.resolution = Resolution::default();
        }

        let pipeline = &mut self.pipeline;
        if pipeline.pcf_count < 0 {
            warn!("Negative PCF count {} clamped to 0", pipeline.pcf_count);
            pipeline.pcf_count = 0;
        }
        if pipeline.skybox_fog_lower_limit > pipeline.skybox_fog_upper_limit {
            warn!("Skybox fog limits are inverted, swapping them");
            std::mem::swap(
                &mut pipeline.skybox_fog_lower_limit,
                &mut pipeline.skybox_fog_upper_limit,
            );
        }

        self
    }

    const fn default_shadow_map_size() -> u32 {
        2048
    }

    const fn default_semantic_color_seed() -> u64 {
        0x5eed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Persisted subset of the per-frame render options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
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
    pub show_shadow_volume: bool,
    pub depth_view: DepthViewConfig,
    pub semantic_view_id_map: HashMap<i32, Vec3>,
    pub shadow_range: ShadowRangeConfig,
}

impl Default for PipelineSettings {
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
            depth_view: DepthViewConfig::default(),
            semantic_view_id_map: HashMap::new(),
            shadow_range: ShadowRangeConfig::default(),
        }
    }
}
