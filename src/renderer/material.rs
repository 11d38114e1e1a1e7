// renderer/material.rs (forward-lit version)
use glam::Vec3;

use crate::renderer::device::{TextureId, TextureTarget};
use crate::renderer::shader::BoundShader;
use crate::renderer::uniforms::{ALBEDO_MAP_UNIT, MATERIAL_TYPE, NORMAL_MAP_UNIT, SPECULAR_MAP_UNIT};

/// Shading model of a surface. Drives which uniform set a mesh needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialKind {
    /// Diffuse only.
    Lambert,
    #[default]
    Phong,
    BlinnPhong,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 3] = [
        MaterialKind::Lambert,
        MaterialKind::Phong,
        MaterialKind::BlinnPhong,
    ];

    /// Value written to `u_material.type`.
    pub fn uniform_value(self) -> i32 {
        match self {
            MaterialKind::Lambert => 0,
            MaterialKind::Phong => 1,
            MaterialKind::BlinnPhong => 2,
        }
    }

    pub fn uses_specular(self) -> bool {
        !matches!(self, MaterialKind::Lambert)
    }

    pub(crate) fn bind(self, shader: &mut BoundShader<'_>) {
        shader.set_int(MATERIAL_TYPE, self.uniform_value());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
    pub albedo_map: Option<TextureId>,
    pub specular_map: Option<TextureId>,
    pub normal_map: Option<TextureId>,
    pub alpha: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            kind: MaterialKind::Phong,
            ambient: Vec3::new(0.2, 0.3, 0.4),
            diffuse: Vec3::new(0.2, 0.3, 0.4),
            specular: Vec3::splat(0.2),
            shininess: 32.0,
            albedo_map: None,
            specular_map: None,
            normal_map: None,
            alpha: 1.0,
        }
    }
}

impl Material {
    pub fn new(name: impl Into<String>, kind: MaterialKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn lambert(name: impl Into<String>) -> Self {
        Self::new(name, MaterialKind::Lambert)
    }

    pub fn phong(name: impl Into<String>) -> Self {
        Self::new(name, MaterialKind::Phong)
    }

    pub fn blinn_phong(name: impl Into<String>) -> Self {
        Self::new(name, MaterialKind::BlinnPhong)
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.ambient = color;
        self.diffuse = color;
        self
    }

    pub fn with_specular(mut self, specular: Vec3, shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }

    pub fn with_albedo_map(mut self, texture: TextureId) -> Self {
        self.albedo_map = Some(texture);
        self
    }

    pub fn with_specular_map(mut self, texture: TextureId) -> Self {
        self.specular_map = Some(texture);
        self
    }

    pub fn with_normal_map(mut self, texture: TextureId) -> Self {
        self.normal_map = Some(texture);
        self
    }

    /// Sets the alpha, clamped to [0, 1]. Anything below one is translucent.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn uses_specular(&self) -> bool {
        self.kind.uses_specular()
    }

    /// Whether blending must be used for this material when it is enabled
    /// globally.
    pub fn is_translucent(&self) -> bool {
        self.alpha < 1.0
    }

    /// Writes the per-mesh material uniforms. Lambert materials skip the
    /// specular set entirely.
    pub(crate) fn bind(&self, shader: &mut BoundShader<'_>) {
        shader.set_vec3("u_material.ambient", self.ambient);
        shader.set_vec3("u_material.diffuse", self.diffuse);
        shader.set_float("u_material.alpha", self.alpha);
        bind_map(
            shader,
            "u_material.albedoMap",
            "u_material.albedoMapActive",
            ALBEDO_MAP_UNIT,
            self.albedo_map,
        );

        if !self.uses_specular() {
            return;
        }

        shader.set_vec3("u_material.specular", self.specular);
        shader.set_float("u_material.shininess", self.shininess);
        bind_map(
            shader,
            "u_material.specularMap",
            "u_material.specularMapActive",
            SPECULAR_MAP_UNIT,
            self.specular_map,
        );
        bind_map(
            shader,
            "u_material.normalMap",
            "u_material.normalMapActive",
            NORMAL_MAP_UNIT,
            self.normal_map,
        );
    }
}

fn bind_map(
    shader: &mut BoundShader<'_>,
    sampler: &str,
    active_flag: &str,
    unit: u32,
    texture: Option<TextureId>,
) {
    match texture {
        Some(texture) => {
            shader.set_int(active_flag, 1);
            shader.bind_texture(sampler, unit, TextureTarget::Texture2d, texture);
        }
        None => shader.set_int(active_flag, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::device::ShaderId;
    use crate::renderer::recording::RecordingDevice;
    use crate::renderer::uniforms::UniformValue;

    #[test]
    fn lambert_never_writes_specular_uniforms() {
        let mut device = RecordingDevice::new(16, 16);
        let program = ShaderId(1);
        let material = Material::lambert("matte").with_specular(Vec3::ONE, 64.0);
        {
            let mut shader = BoundShader::new(&mut device, program);
            material.bind(&mut shader);
        }

        assert!(device.uniform(program, "u_material.diffuse").is_some());
        assert_eq!(device.uniform(program, "u_material.specular"), None);
        assert_eq!(device.uniform(program, "u_material.shininess"), None);
    }

    #[test]
    fn missing_maps_emit_inactive_flags() {
        let mut device = RecordingDevice::new(16, 16);
        let program = ShaderId(1);
        {
            let mut shader = BoundShader::new(&mut device, program);
            Material::phong("plain").bind(&mut shader);
        }

        for flag in [
            "u_material.albedoMapActive",
            "u_material.specularMapActive",
            "u_material.normalMapActive",
        ] {
            assert_eq!(device.uniform(program, flag), Some(UniformValue::Int(0)));
        }
    }

    #[test]
    fn present_maps_bind_their_units() {
        let mut device = RecordingDevice::new(16, 16);
        let program = ShaderId(1);
        let material = Material::blinn_phong("tiles")
            .with_albedo_map(TextureId(20))
            .with_specular_map(TextureId(21));
        {
            let mut shader = BoundShader::new(&mut device, program);
            material.bind(&mut shader);
            assert_eq!(shader.device().viewport().width, 16);
        }

        assert_eq!(
            device.uniform(program, "u_material.albedoMap"),
            Some(UniformValue::Int(ALBEDO_MAP_UNIT as i32))
        );
        assert_eq!(
            device.uniform(program, "u_material.specularMap"),
            Some(UniformValue::Int(SPECULAR_MAP_UNIT as i32))
        );
        // released by the guard
        assert_eq!(device.texture_on_unit(ALBEDO_MAP_UNIT), None);
    }

    #[test]
    fn with_alpha_marks_transparency() {
        let glass = Material::phong("glass").with_alpha(0.4);
        assert!(glass.is_translucent());
        assert!(!Material::default().is_translucent());
        assert!(!Material::phong("clamped").with_alpha(3.0).is_translucent());
    }
}
