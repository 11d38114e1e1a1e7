use glam::Vec3;

use crate::renderer::device::{GeometryId, TextureId};
use crate::renderer::shader::BoundShader;

/// Distance fog applied by the lit and skybox programs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fog {
    Linear {
        color: Vec3,
        dist_start: f32,
        dist_end: f32,
    },
    /// Visibility `exp(-(d * density)^gradient)`.
    Exponential {
        color: Vec3,
        density: f32,
        gradient: f32,
    },
}

impl Fog {
    pub fn linear(color: Vec3, dist_start: f32, dist_end: f32) -> Self {
        Fog::Linear {
            color,
            dist_start,
            dist_end,
        }
    }

    pub fn exponential(color: Vec3, density: f32, gradient: f32) -> Self {
        Fog::Exponential {
            color,
            density,
            gradient,
        }
    }

    pub fn color(&self) -> Vec3 {
        match *self {
            Fog::Linear { color, .. } | Fog::Exponential { color, .. } => color,
        }
    }

    /// Value written to `u_fog.type`.
    pub fn type_id(&self) -> i32 {
        match self {
            Fog::Linear { .. } => 0,
            Fog::Exponential { .. } => 1,
        }
    }

    /// Surface visibility at `distance` from the viewer: 1 is unfogged, 0 is
    /// fully covered by the fog color.
    pub fn factor(&self, distance: f32) -> f32 {
        let visibility = match *self {
            Fog::Linear {
                dist_start,
                dist_end,
                ..
            } => {
                let span = dist_end - dist_start;
                if span.abs() <= f32::EPSILON {
                    if distance < dist_start {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    (dist_end - distance) / span
                }
            }
            Fog::Exponential {
                density, gradient, ..
            } => (-(distance.max(0.0) * density).powf(gradient)).exp(),
        };
        visibility.clamp(0.0, 1.0)
    }

    pub(crate) fn bind(&self, shader: &mut BoundShader<'_>) {
        shader.set_int("u_fog.enabled", 1);
        shader.set_int("u_fog.type", self.type_id());
        shader.set_vec3("u_fog.color", self.color());
        match *self {
            Fog::Linear {
                dist_start,
                dist_end,
                ..
            } => {
                shader.set_float("u_fog.distStart", dist_start);
                shader.set_float("u_fog.distEnd", dist_end);
            }
            Fog::Exponential {
                density, gradient, ..
            } => {
                shader.set_float("u_fog.density", density);
                shader.set_float("u_fog.gradient", gradient);
            }
        }
    }
}

impl Default for Fog {
    fn default() -> Self {
        Fog::exponential(Vec3::new(0.66, 0.76, 0.85), 0.05, 1.5)
    }
}

/// Environment cube drawn behind the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skybox {
    pub cubemap: TextureId,
    /// Unindexed 36-vertex cube.
    pub cube: GeometryId,
}

impl Skybox {
    pub const VERTEX_COUNT: u32 = 36;

    pub fn new(cubemap: TextureId, cube: GeometryId) -> Self {
        Self { cubemap, cube }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::device::ShaderId;
    use crate::renderer::recording::RecordingDevice;
    use crate::renderer::uniforms::UniformValue;

    #[test]
    fn linear_fog_ramps_between_start_and_end() {
        let fog = Fog::linear(Vec3::ONE, 10.0, 20.0);
        assert_eq!(fog.factor(5.0), 1.0);
        assert!((fog.factor(15.0) - 0.5).abs() < 1e-6);
        assert_eq!(fog.factor(25.0), 0.0);
    }

    #[test]
    fn exponential_fog_decays_with_distance() {
        let fog = Fog::exponential(Vec3::ONE, 0.1, 1.0);
        assert_eq!(fog.factor(0.0), 1.0);
        assert!(fog.factor(10.0) < fog.factor(5.0));
        assert!((fog.factor(10.0) - (-1.0f32).exp()).abs() < 1e-6);
    }

    #[test]
    fn bind_writes_type_specific_parameters() {
        let mut device = RecordingDevice::new(8, 8);
        let program = ShaderId(1);
        {
            let mut shader = BoundShader::new(&mut device, program);
            Fog::linear(Vec3::ZERO, 1.0, 4.0).bind(&mut shader);
        }
        assert_eq!(device.uniform(program, "u_fog.type"), Some(UniformValue::Int(0)));
        assert_eq!(
            device.uniform(program, "u_fog.distEnd"),
            Some(UniformValue::Float(4.0))
        );
        assert_eq!(device.uniform(program, "u_fog.density"), None);
    }
}
