use bitflags::bitflags;
use glam::Vec3;

use crate::error::RenderError;
use crate::renderer::uniforms::UniformValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u32);

/// Device-side vertex/index buffers for one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u32);

impl GeometryId {
    /// Vertices uploaded with the draw call instead of living in a buffer.
    pub const STREAMED: GeometryId = GeometryId(0);
}

/// Colored endpoint of a streamed line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineVertex {
    pub position: Vec3,
    pub color: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Primitive {
    #[default]
    Triangles,
    Lines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// A framebuffer with a single depth attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthTarget {
    pub framebuffer: FramebufferId,
    pub depth_texture: TextureId,
    pub width: u32,
    pub height: u32,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    FaceCulling,
    /// Standard `src_alpha, 1 - src_alpha` blending.
    Blending,
    DepthTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureTarget {
    Texture2d,
    CubeMap,
}

/// Immediate-mode graphics context consumed by the renderers.
///
/// Mirrors a single OpenGL-style context: one bound framebuffer, one active
/// program, a set of texture units and global capability toggles. All calls
/// happen on the thread that owns the context and take effect in call order.
pub trait GraphicsDevice {
    /// Allocates a depth-only render target of the given size.
    fn create_depth_target(&mut self, width: u32, height: u32) -> Result<DepthTarget, RenderError>;

    /// Resolves an engine program by name (`ShaderKind::program_name`).
    fn create_program(&mut self, name: &str) -> Result<ShaderId, RenderError>;

    /// `None` is the default (window) framebuffer.
    fn bound_framebuffer(&self) -> Option<FramebufferId>;
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);

    fn viewport(&self) -> Viewport;
    fn set_viewport(&mut self, viewport: Viewport);

    fn clear(&mut self, flags: ClearFlags);

    fn use_program(&mut self, program: Option<ShaderId>);
    /// Writes a uniform of the program selected with `use_program`.
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<TextureId>);

    fn set_capability(&mut self, capability: Capability, enabled: bool);
    fn set_depth_mask(&mut self, write: bool);
    fn set_polygon_mode(&mut self, mode: PolygonMode);

    fn draw_indexed(&mut self, geometry: GeometryId, index_count: u32);
    fn draw_arrays(&mut self, geometry: GeometryId, vertex_count: u32);
    /// Streams `vertices` and draws them as a line list, two per segment.
    fn draw_lines(&mut self, vertices: &[LineVertex]);
}
