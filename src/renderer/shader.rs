use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::error::RenderError;
use crate::renderer::device::{GraphicsDevice, ShaderId, TextureId, TextureTarget};
use crate::renderer::uniforms::UniformValue;

/// Engine programs the passes know how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    ShadowMapping,
    /// Forward-lit mesh program, one variant per shadow/fog combination.
    Lit { shadows: bool, fog: bool },
    DepthView,
    SemanticView,
    Skybox { fog: bool },
    /// Unlit, per-vertex colored line list.
    DebugLines,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 10] = [
        ShaderKind::ShadowMapping,
        ShaderKind::Lit { shadows: false, fog: false },
        ShaderKind::Lit { shadows: false, fog: true },
        ShaderKind::Lit { shadows: true, fog: false },
        ShaderKind::Lit { shadows: true, fog: true },
        ShaderKind::DepthView,
        ShaderKind::SemanticView,
        ShaderKind::Skybox { fog: false },
        ShaderKind::Skybox { fog: true },
        ShaderKind::DebugLines,
    ];

    pub fn lit(shadows: bool, fog: bool) -> Self {
        ShaderKind::Lit { shadows, fog }
    }

    pub fn program_name(self) -> &'static str {
        match self {
            ShaderKind::ShadowMapping => "engine_shadow_mapping",
            ShaderKind::Lit {
                shadows: false,
                fog: false,
            } => "engine_phong_no_shadows_no_fog",
            ShaderKind::Lit {
                shadows: false,
                fog: true,
            } => "engine_phong_no_shadows_fog",
            ShaderKind::Lit {
                shadows: true,
                fog: false,
            } => "engine_phong_shadows_no_fog",
            ShaderKind::Lit {
                shadows: true,
                fog: true,
            } => "engine_phong_shadows_fog",
            ShaderKind::DepthView => "engine_depth_view",
            ShaderKind::SemanticView => "engine_semantic_view",
            ShaderKind::Skybox { fog: false } => "engine_skybox_no_fog",
            ShaderKind::Skybox { fog: true } => "engine_skybox_fog",
            ShaderKind::DebugLines => "engine_debug_lines",
        }
    }
}

/// Programs available to the renderers, keyed by kind.
///
/// Built once at startup and handed to every pass by reference.
#[derive(Debug, Default, Clone)]
pub struct ShaderLibrary {
    programs: HashMap<ShaderKind, ShaderId>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every `ShaderKind` through the device.
    pub fn load_engine_programs(device: &mut dyn GraphicsDevice) -> Result<Self, RenderError> {
        let mut library = Self::new();
        for kind in ShaderKind::ALL {
            let program = device.create_program(kind.program_name())?;
            library.insert(kind, program);
        }
        log::info!("Loaded {} engine programs", library.programs.len());
        Ok(library)
    }

    pub fn insert(&mut self, kind: ShaderKind, program: ShaderId) {
        self.programs.insert(kind, program);
    }

    pub fn try_get(&self, kind: ShaderKind) -> Option<ShaderId> {
        self.programs.get(&kind).copied()
    }

    /// Panics when the program was never registered.
    pub fn get(&self, kind: ShaderKind) -> ShaderId {
        match self.try_get(kind) {
            Some(program) => program,
            None => panic!(
                "missing shader program '{}' ({kind:?})",
                kind.program_name()
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

/// Scoped use of a program.
///
/// Texture units bound through the guard are released, and the program
/// unbound, when the guard is dropped.
pub struct BoundShader<'a> {
    device: &'a mut dyn GraphicsDevice,
    program: ShaderId,
    bound_units: Vec<(u32, TextureTarget)>,
}

impl<'a> BoundShader<'a> {
    pub fn new(device: &'a mut dyn GraphicsDevice, program: ShaderId) -> Self {
        device.use_program(Some(program));
        Self {
            device,
            program,
            bound_units: Vec::new(),
        }
    }

    pub fn program(&self) -> ShaderId {
        self.program
    }

    pub fn device(&mut self) -> &mut dyn GraphicsDevice {
        &mut *self.device
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.device.set_uniform(name, UniformValue::Int(value));
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.device.set_uniform(name, UniformValue::Float(value));
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.device.set_uniform(name, UniformValue::Vec3(value));
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.device.set_uniform(name, UniformValue::Mat4(value));
    }

    /// Binds `texture` on `unit` and points the sampler uniform `name` at it.
    pub fn bind_texture(&mut self, name: &str, unit: u32, target: TextureTarget, texture: TextureId) {
        self.set_int(name, unit as i32);
        self.device.bind_texture(unit, target, Some(texture));
        if !self.bound_units.contains(&(unit, target)) {
            self.bound_units.push((unit, target));
        }
    }
}

impl Drop for BoundShader<'_> {
    fn drop(&mut self) {
        // highest unit first so unit 0 ends up active
        self.bound_units.sort_by(|a, b| b.0.cmp(&a.0));
        for (unit, target) in self.bound_units.drain(..) {
            self.device.bind_texture(unit, target, None);
        }
        self.device.use_program(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::{DeviceCommand, RecordingDevice};

    #[test]
    fn program_names_are_unique() {
        let mut names: Vec<_> = ShaderKind::ALL.iter().map(|k| k.program_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ShaderKind::ALL.len());
    }

    #[test]
    fn load_registers_every_kind() {
        let mut device = RecordingDevice::new(32, 32);
        let library = ShaderLibrary::load_engine_programs(&mut device).unwrap();
        for kind in ShaderKind::ALL {
            assert!(library.try_get(kind).is_some());
        }
    }

    #[test]
    #[should_panic(expected = "missing shader program")]
    fn get_panics_for_unregistered_kind() {
        ShaderLibrary::new().get(ShaderKind::DepthView);
    }

    #[test]
    fn guard_releases_units_and_program_on_drop() {
        let mut device = RecordingDevice::new(32, 32);
        {
            let mut shader = BoundShader::new(&mut device, ShaderId(3));
            shader.bind_texture("u_a", 2, TextureTarget::Texture2d, TextureId(10));
            shader.bind_texture("u_b", 0, TextureTarget::Texture2d, TextureId(11));
        }

        assert_eq!(device.active_program(), None);
        assert_eq!(device.texture_on_unit(0), None);
        assert_eq!(device.texture_on_unit(2), None);

        let unbinds: Vec<_> = device
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                DeviceCommand::BindTexture {
                    unit,
                    texture: None,
                    ..
                } => Some(*unit),
                _ => None,
            })
            .collect();
        assert_eq!(unbinds, vec![2, 0]);
    }
}
