use glam::{Mat4, Quat, Vec3};

/// World axis treated as "up" by a camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UpAxis {
    X,
    #[default]
    Y,
    Z,
}

impl UpAxis {
    pub fn vector(self) -> Vec3 {
        match self {
            UpAxis::X => Vec3::X,
            UpAxis::Y => Vec3::Y,
            UpAxis::Z => Vec3::Z,
        }
    }

    /// Rotation taking the canonical Y-up frame into this axis' frame.
    fn from_y_up(self) -> Quat {
        Quat::from_rotation_arc(Vec3::Y, self.vector())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective { fov_y_radians: f32, aspect: f32 },
    Orthographic { width: f32, height: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionData {
    pub projection: Projection,
    pub near: f32,
    pub far: f32,
}

impl ProjectionData {
    pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Perspective {
                fov_y_radians,
                aspect,
            },
            near,
            far,
        }
    }

    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Orthographic { width, height },
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective {
                fov_y_radians,
                aspect,
            } => Mat4::perspective_rh_gl(fov_y_radians, aspect, self.near, self.far),
            Projection::Orthographic { width, height } => Mat4::orthographic_rh_gl(
                -0.5 * width,
                0.5 * width,
                -0.5 * height,
                0.5 * height,
                self.near,
                self.far,
            ),
        }
    }
}

impl Default for ProjectionData {
    fn default() -> Self {
        Self::perspective(45f32.to_radians(), 1024.0 / 768.0, 0.1, 100.0)
    }
}

/// How a camera derives its pose. Each variant carries only what it needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraController {
    Fixed {
        position: Vec3,
        target: Vec3,
    },
    /// Spherical coordinates around `target`, expressed in the Y-up frame.
    Orbit {
        target: Vec3,
        radius: f32,
        azimuth: f32,
        elevation: f32,
    },
    Fps {
        position: Vec3,
        yaw: f32,
        pitch: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub controller: CameraController,
    pub projection: ProjectionData,
    pub up_axis: UpAxis,
}

impl Camera {
    pub fn fixed(position: Vec3, target: Vec3, projection: ProjectionData) -> Self {
        Self {
            controller: CameraController::Fixed { position, target },
            projection,
            up_axis: UpAxis::Y,
        }
    }

    pub fn orbit(target: Vec3, radius: f32, projection: ProjectionData) -> Self {
        Self {
            controller: CameraController::Orbit {
                target,
                radius,
                azimuth: 0.0,
                elevation: 0.0,
            },
            projection,
            up_axis: UpAxis::Y,
        }
    }

    pub fn fps(position: Vec3, projection: ProjectionData) -> Self {
        Self {
            controller: CameraController::Fps {
                position,
                yaw: 0.0,
                pitch: 0.0,
            },
            projection,
            up_axis: UpAxis::Y,
        }
    }

    pub fn with_up_axis(mut self, up_axis: UpAxis) -> Self {
        self.up_axis = up_axis;
        self
    }

    pub fn position(&self) -> Vec3 {
        match self.controller {
            CameraController::Fixed { position, .. } => position,
            CameraController::Fps { position, .. } => position,
            CameraController::Orbit {
                target,
                radius,
                azimuth,
                elevation,
            } => {
                let offset = Vec3::new(
                    elevation.cos() * azimuth.sin(),
                    elevation.sin(),
                    elevation.cos() * azimuth.cos(),
                ) * radius;
                target + self.up_axis.from_y_up() * offset
            }
        }
    }

    pub fn target(&self) -> Vec3 {
        match self.controller {
            CameraController::Fixed { target, .. } => target,
            CameraController::Orbit { target, .. } => target,
            CameraController::Fps { position, .. } => position + self.front(),
        }
    }

    pub fn front(&self) -> Vec3 {
        match self.controller {
            CameraController::Fps { yaw, pitch, .. } => {
                let local = Vec3::new(
                    pitch.cos() * yaw.sin(),
                    pitch.sin(),
                    -pitch.cos() * yaw.cos(),
                );
                (self.up_axis.from_y_up() * local).normalize()
            }
            _ => (self.target() - self.position()).normalize_or_zero(),
        }
    }

    /// Moves an orbit camera around its target. Other controllers are left
    /// untouched.
    pub fn orbit_by(&mut self, delta_azimuth: f32, delta_elevation: f32) {
        if let CameraController::Orbit {
            azimuth, elevation, ..
        } = &mut self.controller
        {
            *azimuth += delta_azimuth;
            *elevation = (*elevation + delta_elevation).clamp(-1.5, 1.5);
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target(), self.up_axis.vector())
    }

    pub fn proj_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj_matrix() * self.view_matrix()
    }

    pub fn proj_data(&self) -> ProjectionData {
        self.projection
    }

    pub fn set_aspect(&mut self, new_aspect: f32) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection.projection {
            *aspect = new_aspect;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::fixed(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, ProjectionData::default())
    }
}
