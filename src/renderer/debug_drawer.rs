use glam::{Mat4, Vec3};

use crate::renderer::device::{GraphicsDevice, LineVertex};
use crate::renderer::mesh_renderer::PassStats;
use crate::renderer::shader::{BoundShader, ShaderKind, ShaderLibrary};
use crate::renderer::uniforms::VIEW_PROJ_MATRIX;
use crate::scene::bounds::{Aabb, Frustum};

/// Lines streamed per draw call.
pub const LINE_BATCH_SIZE: usize = 1024;

/// Color of the shadow map's light volume in the overlay.
pub const SHADOW_VOLUME_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.0);

/// Corner pairs of a box whose corners are ordered x fastest, then y, then z,
/// as in [`Aabb::corners`] and [`Frustum::corners`].
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Vec3,
}

impl DebugLine {
    fn vertices(&self) -> [LineVertex; 2] {
        [
            LineVertex {
                position: self.start,
                color: self.color,
            },
            LineVertex {
                position: self.end,
                color: self.color,
            },
        ]
    }
}

/// World-space line overlay.
///
/// Shapes are queued as colored segments during the frame and flushed in
/// batches of [`LINE_BATCH_SIZE`] by [`DebugDrawer::render`], which empties
/// the queue. While disabled, queued shapes are ignored.
#[derive(Debug)]
pub struct DebugDrawer {
    lines: Vec<DebugLine>,
    enabled: bool,
}

impl Default for DebugDrawer {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            enabled: true,
        }
    }
}

impl DebugDrawer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.lines.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn lines(&self) -> &[DebugLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drops everything queued so far.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec3) {
        if self.enabled {
            self.lines.push(DebugLine { start, end, color });
        }
    }

    /// Shaft plus four head strokes a tenth of the arrow long.
    pub fn draw_arrow(&mut self, start: Vec3, end: Vec3, color: Vec3) {
        self.draw_line(start, end, color);

        let shaft = end - start;
        let Some(forward) = shaft.try_normalize() else {
            return;
        };
        let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        let side = shaft.length() / 10.0;

        let base = end - forward * side;
        for offset in [right, -right, up, -up] {
            self.draw_line(end, base + offset * side, color);
        }
    }

    /// Wireframe of a box of full extents `size` centred at the origin of
    /// `transform`.
    pub fn draw_box(&mut self, size: Vec3, transform: &Mat4, color: Vec3) {
        let local = Aabb::from_center_half_extents(Vec3::ZERO, size * 0.5);
        self.draw_aabb(&local, transform, color);
    }

    /// Wireframe of `aabb` after `transform`, which may rotate it.
    pub fn draw_aabb(&mut self, aabb: &Aabb, transform: &Mat4, color: Vec3) {
        let corners = aabb.corners().map(|c| transform.transform_point3(c));
        self.draw_corners(&corners, color);
    }

    /// Wireframe of the volume a clip matrix maps onto the `[-1, 1]` cube:
    /// a camera frustum for a view-projection, a box for an orthographic one.
    pub fn draw_clip_volume(&mut self, clip: &Mat4, color: Vec3) {
        let corners = Frustum::from_view_proj(clip).corners;
        self.draw_corners(&corners, color);
    }

    /// Red, green and blue arrows along the basis columns of `frame`.
    pub fn draw_frame(&mut self, frame: &Mat4, size: f32) {
        let origin = frame.w_axis.truncate();
        let axes = [frame.x_axis, frame.y_axis, frame.z_axis];
        for (axis, color) in axes.into_iter().zip([Vec3::X, Vec3::Y, Vec3::Z]) {
            self.draw_arrow(origin, origin + axis.truncate() * size, color);
        }
    }

    fn draw_corners(&mut self, corners: &[Vec3; 8], color: Vec3) {
        for (a, b) in BOX_EDGES {
            self.draw_line(corners[a], corners[b], color);
        }
    }

    /// Draws and empties the queue.
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shaders: &ShaderLibrary,
        view_proj: Mat4,
    ) -> PassStats {
        if self.lines.is_empty() {
            return PassStats::default();
        }

        let program = shaders.get(ShaderKind::DebugLines);
        let mut shader = BoundShader::new(device, program);
        shader.set_mat4(VIEW_PROJ_MATRIX, view_proj);

        let mut vertices = Vec::with_capacity(2 * self.lines.len().min(LINE_BATCH_SIZE));
        let mut draw_calls = 0;
        for batch in self.lines.chunks(LINE_BATCH_SIZE) {
            vertices.clear();
            vertices.extend(batch.iter().flat_map(DebugLine::vertices));
            shader.device().draw_lines(&vertices);
            draw_calls += 1;
        }
        drop(shader);

        log::trace!("Debug overlay: {} lines in {} batches", self.lines.len(), draw_calls);
        self.lines.clear();
        PassStats {
            program: Some(program),
            draw_calls,
        }
    }
}
