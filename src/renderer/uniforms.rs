// renderer/uniforms.rs
use glam::{Mat4, Vec3};

/// A value written to a named uniform of the bound program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            UniformValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            UniformValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_mat4(&self) -> Option<Mat4> {
        match self {
            UniformValue::Mat4(v) => Some(*v),
            _ => None,
        }
    }
}

/// Texture units reserved by the mesh passes.
pub const ALBEDO_MAP_UNIT: u32 = 0;
pub const SPECULAR_MAP_UNIT: u32 = 1;
pub const NORMAL_MAP_UNIT: u32 = 2;
pub const SHADOW_DEPTH_UNIT: u32 = 3;
pub const SKYBOX_CUBEMAP_UNIT: u32 = 0;

pub const VIEW_PROJ_MATRIX: &str = "u_viewProjMatrix";
pub const MODEL_MATRIX: &str = "u_modelMatrix";
pub const NORMAL_MATRIX: &str = "u_normalMatrix";
pub const VIEWER_POSITION: &str = "u_viewerPosition";
pub const LIGHT_SPACE_VIEW_PROJ: &str = "u_lightSpaceViewProjMatrix";
pub const LIGHT_SPACE_VIEW_PROJ_LIT: &str = "u_viewProjLightSpaceMatrix";
pub const DEPTH_MAP_TEXTURE: &str = "u_depthmapTexture";
pub const PCF_COUNT: &str = "u_pcfCount";
pub const MATERIAL_TYPE: &str = "u_material.type";
