use glam::Vec3;

use crate::renderer::shader::BoundShader;

/// Constant, linear and quadratic distance attenuation terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

impl LightType {
    fn uniform_block(self) -> &'static str {
        match self {
            LightType::Directional => "u_directionalLight",
            LightType::Point => "u_pointLight",
            LightType::Spot => "u_spotLight",
        }
    }
}

/// Type-specific light parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Directional {
        direction: Vec3,
    },
    Point {
        position: Vec3,
        attenuation: Attenuation,
    },
    Spot {
        position: Vec3,
        direction: Vec3,
        attenuation: Attenuation,
        /// Radians.
        inner_cutoff: f32,
        /// Radians.
        outer_cutoff: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    pub fn directional(direction: Vec3) -> Self {
        Self::with_kind(LightKind::Directional {
            direction: safe_normalize(direction, Vec3::NEG_Y),
        })
    }

    pub fn point(position: Vec3) -> Self {
        Self::with_kind(LightKind::Point {
            position,
            attenuation: Attenuation::default(),
        })
    }

    pub fn spot(position: Vec3, direction: Vec3, inner_cutoff: f32, outer_cutoff: f32) -> Self {
        Self::with_kind(LightKind::Spot {
            position,
            direction: safe_normalize(direction, Vec3::NEG_Z),
            attenuation: Attenuation::default(),
            inner_cutoff,
            outer_cutoff,
        })
    }

    fn with_kind(kind: LightKind) -> Self {
        Self {
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::splat(0.8),
            intensity: 1.0,
            kind,
        }
    }

    pub fn with_colors(mut self, ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_attenuation(mut self, value: Attenuation) -> Self {
        match &mut self.kind {
            LightKind::Point { attenuation, .. } | LightKind::Spot { attenuation, .. } => {
                *attenuation = value;
            }
            LightKind::Directional { .. } => {
                log::warn!("Attenuation ignored for directional light");
            }
        }
        self
    }

    pub fn light_type(&self) -> LightType {
        match self.kind {
            LightKind::Directional { .. } => LightType::Directional,
            LightKind::Point { .. } => LightType::Point,
            LightKind::Spot { .. } => LightType::Spot,
        }
    }

    pub fn position(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional { .. } => None,
            LightKind::Point { position, .. } | LightKind::Spot { position, .. } => Some(position),
        }
    }

    pub fn direction(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional { direction } | LightKind::Spot { direction, .. } => {
                Some(direction)
            }
            LightKind::Point { .. } => None,
        }
    }

    /// Writes this light as the only enabled light of the bound program.
    pub(crate) fn bind(&self, shader: &mut BoundShader<'_>) {
        for ty in [LightType::Directional, LightType::Point, LightType::Spot] {
            shader.set_int(&format!("{}.enabled", ty.uniform_block()), 0);
        }

        let block = self.light_type().uniform_block();
        shader.set_int(&format!("{block}.enabled"), 1);
        shader.set_vec3(&format!("{block}.ambient"), self.ambient);
        shader.set_vec3(&format!("{block}.diffuse"), self.diffuse);
        shader.set_vec3(&format!("{block}.specular"), self.specular);
        shader.set_float(&format!("{block}.intensity"), self.intensity);

        match self.kind {
            LightKind::Directional { direction } => {
                shader.set_vec3(&format!("{block}.direction"), direction);
            }
            LightKind::Point {
                position,
                attenuation,
            } => {
                shader.set_vec3(&format!("{block}.position"), position);
                bind_attenuation(shader, block, attenuation);
            }
            LightKind::Spot {
                position,
                direction,
                attenuation,
                inner_cutoff,
                outer_cutoff,
            } => {
                let (inner, outer) = if inner_cutoff > outer_cutoff {
                    (outer_cutoff, inner_cutoff)
                } else {
                    (inner_cutoff, outer_cutoff)
                };
                shader.set_vec3(&format!("{block}.position"), position);
                shader.set_vec3(&format!("{block}.direction"), direction);
                bind_attenuation(shader, block, attenuation);
                shader.set_float(&format!("{block}.innerCutoffCos"), inner.cos());
                shader.set_float(&format!("{block}.outerCutoffCos"), outer.cos());
            }
        }
    }
}

fn bind_attenuation(shader: &mut BoundShader<'_>, block: &str, attenuation: Attenuation) {
    shader.set_float(&format!("{block}.attnk0"), attenuation.constant);
    shader.set_float(&format!("{block}.attnk1"), attenuation.linear);
    shader.set_float(&format!("{block}.attnk2"), attenuation.quadratic);
}

pub(crate) fn safe_normalize(vec: Vec3, fallback: Vec3) -> Vec3 {
    if vec.length_squared() > 1e-6 {
        vec.normalize()
    } else {
        fallback
    }
}
