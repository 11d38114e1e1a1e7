use std::collections::{HashMap, HashSet};

use crate::error::RenderError;
use crate::renderer::device::{
    Capability, ClearFlags, DepthTarget, FramebufferId, GeometryId, GraphicsDevice, LineVertex,
    PolygonMode, Primitive, ShaderId, TextureId, TextureTarget, Viewport,
};
use crate::renderer::uniforms::UniformValue;

/// One call made against a [`RecordingDevice`], in submission order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateDepthTarget {
        framebuffer: FramebufferId,
        width: u32,
        height: u32,
    },
    CreateProgram {
        name: String,
        program: ShaderId,
    },
    BindFramebuffer(Option<FramebufferId>),
    SetViewport(Viewport),
    Clear(ClearFlags),
    UseProgram(Option<ShaderId>),
    SetUniform {
        program: ShaderId,
        name: String,
        value: UniformValue,
    },
    BindTexture {
        unit: u32,
        target: TextureTarget,
        texture: Option<TextureId>,
    },
    SetCapability {
        capability: Capability,
        enabled: bool,
    },
    SetDepthMask(bool),
    SetPolygonMode(PolygonMode),
    DrawIndexed {
        geometry: GeometryId,
        count: u32,
    },
    DrawArrays {
        geometry: GeometryId,
        count: u32,
    },
    DrawLines {
        vertex_count: u32,
    },
}

/// Pipeline state captured at the moment of a draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRecord {
    pub program: Option<ShaderId>,
    pub framebuffer: Option<FramebufferId>,
    pub viewport: Viewport,
    pub geometry: GeometryId,
    pub count: u32,
    pub indexed: bool,
    pub primitive: Primitive,
    pub face_culling: bool,
    pub blending: bool,
    pub depth_write: bool,
    pub polygon_mode: PolygonMode,
}

/// Headless [`GraphicsDevice`] that keeps the bound state in memory and logs
/// every command.
///
/// Programs are handed out by name and never fail to resolve; uniforms are
/// stored per program so tests can inspect the last value written.
#[derive(Debug)]
pub struct RecordingDevice {
    next_id: u32,
    viewport: Viewport,
    framebuffer: Option<FramebufferId>,
    program: Option<ShaderId>,
    programs: HashMap<String, ShaderId>,
    uniforms: HashMap<(ShaderId, String), UniformValue>,
    textures: HashMap<u32, TextureId>,
    capabilities: HashSet<Capability>,
    depth_write: bool,
    polygon_mode: PolygonMode,
    commands: Vec<DeviceCommand>,
    draws: Vec<DrawRecord>,
    line_vertices: Vec<LineVertex>,
    fail_framebuffer_allocation: bool,
}

impl RecordingDevice {
    pub fn new(width: u32, height: u32) -> Self {
        let mut capabilities = HashSet::new();
        capabilities.insert(Capability::DepthTest);
        Self {
            next_id: 1,
            viewport: Viewport::new(width, height),
            framebuffer: None,
            program: None,
            programs: HashMap::new(),
            uniforms: HashMap::new(),
            textures: HashMap::new(),
            capabilities,
            depth_write: true,
            polygon_mode: PolygonMode::Fill,
            commands: Vec::new(),
            draws: Vec::new(),
            line_vertices: Vec::new(),
            fail_framebuffer_allocation: false,
        }
    }

    /// Makes every following `create_depth_target` call fail.
    pub fn set_fail_framebuffer_allocation(&mut self, fail: bool) {
        self.fail_framebuffer_allocation = fail;
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn draw_calls(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Every vertex streamed through `draw_lines`, across batches.
    pub fn line_vertices(&self) -> &[LineVertex] {
        &self.line_vertices
    }

    /// Forgets recorded commands and draws; bound state is kept.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
        self.draws.clear();
        self.line_vertices.clear();
    }

    /// Distinct programs made current, in first-use order.
    pub fn programs_used(&self) -> Vec<ShaderId> {
        let mut used = Vec::new();
        for cmd in &self.commands {
            if let DeviceCommand::UseProgram(Some(program)) = cmd {
                if !used.contains(program) {
                    used.push(*program);
                }
            }
        }
        used
    }

    pub fn program_named(&self, name: &str) -> Option<ShaderId> {
        self.programs.get(name).copied()
    }

    pub fn uniform(&self, program: ShaderId, name: &str) -> Option<UniformValue> {
        self.uniforms.get(&(program, name.to_string())).copied()
    }

    /// Number of times `name` was written while `program` was current.
    pub fn uniform_writes(&self, program: ShaderId, name: &str) -> usize {
        self.commands
            .iter()
            .filter(|cmd| {
                matches!(cmd, DeviceCommand::SetUniform { program: p, name: n, .. }
                    if *p == program && n == name)
            })
            .count()
    }

    pub fn active_program(&self) -> Option<ShaderId> {
        self.program
    }

    pub fn texture_on_unit(&self, unit: u32) -> Option<TextureId> {
        self.textures.get(&unit).copied()
    }

    pub fn capability_enabled(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn record_draw(&mut self, geometry: GeometryId, count: u32, indexed: bool, primitive: Primitive) {
        self.draws.push(DrawRecord {
            program: self.program,
            framebuffer: self.framebuffer,
            viewport: self.viewport,
            geometry,
            count,
            indexed,
            primitive,
            face_culling: self.capability_enabled(Capability::FaceCulling),
            blending: self.capability_enabled(Capability::Blending),
            depth_write: self.depth_write,
            polygon_mode: self.polygon_mode,
        });
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_depth_target(&mut self, width: u32, height: u32) -> Result<DepthTarget, RenderError> {
        if self.fail_framebuffer_allocation {
            return Err(RenderError::FramebufferAllocation {
                width,
                height,
                reason: "allocation disabled on recording device".to_string(),
            });
        }
        let framebuffer = FramebufferId(self.allocate_id());
        let depth_texture = TextureId(self.allocate_id());
        self.commands.push(DeviceCommand::CreateDepthTarget {
            framebuffer,
            width,
            height,
        });
        Ok(DepthTarget {
            framebuffer,
            depth_texture,
            width,
            height,
        })
    }

    fn create_program(&mut self, name: &str) -> Result<ShaderId, RenderError> {
        if let Some(program) = self.programs.get(name) {
            return Ok(*program);
        }
        let program = ShaderId(self.allocate_id());
        self.programs.insert(name.to_string(), program);
        self.commands.push(DeviceCommand::CreateProgram {
            name: name.to_string(),
            program,
        });
        Ok(program)
    }

    fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.framebuffer
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        self.framebuffer = framebuffer;
        self.commands.push(DeviceCommand::BindFramebuffer(framebuffer));
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.commands.push(DeviceCommand::SetViewport(viewport));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.commands.push(DeviceCommand::Clear(flags));
    }

    fn use_program(&mut self, program: Option<ShaderId>) {
        self.program = program;
        self.commands.push(DeviceCommand::UseProgram(program));
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let Some(program) = self.program else {
            log::warn!("Uniform '{}' set with no program bound, ignored", name);
            return;
        };
        self.uniforms.insert((program, name.to_string()), value);
        self.commands.push(DeviceCommand::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<TextureId>) {
        match texture {
            Some(id) => {
                self.textures.insert(unit, id);
            }
            None => {
                self.textures.remove(&unit);
            }
        }
        self.commands.push(DeviceCommand::BindTexture {
            unit,
            target,
            texture,
        });
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        if enabled {
            self.capabilities.insert(capability);
        } else {
            self.capabilities.remove(&capability);
        }
        self.commands.push(DeviceCommand::SetCapability {
            capability,
            enabled,
        });
    }

    fn set_depth_mask(&mut self, write: bool) {
        self.depth_write = write;
        self.commands.push(DeviceCommand::SetDepthMask(write));
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.polygon_mode = mode;
        self.commands.push(DeviceCommand::SetPolygonMode(mode));
    }

    fn draw_indexed(&mut self, geometry: GeometryId, index_count: u32) {
        self.commands.push(DeviceCommand::DrawIndexed {
            geometry,
            count: index_count,
        });
        self.record_draw(geometry, index_count, true, Primitive::Triangles);
    }

    fn draw_arrays(&mut self, geometry: GeometryId, vertex_count: u32) {
        self.commands.push(DeviceCommand::DrawArrays {
            geometry,
            count: vertex_count,
        });
        self.record_draw(geometry, vertex_count, false, Primitive::Triangles);
    }

    fn draw_lines(&mut self, vertices: &[LineVertex]) {
        if vertices.len() % 2 != 0 {
            log::warn!("Line list with {} vertices, last one dropped", vertices.len());
        }
        let used = &vertices[..vertices.len() & !1];
        let count = used.len() as u32;
        self.commands.push(DeviceCommand::DrawLines { vertex_count: count });
        self.line_vertices.extend_from_slice(used);
        self.record_draw(GeometryId::STREAMED, count, false, Primitive::Lines);
    }
}
