use std::f32::consts::FRAC_PI_2;

use glam::{Mat3, Mat4, Vec3};

use crate::environment::Skybox;
use crate::renderer::device::{GraphicsDevice, TextureTarget};
use crate::renderer::mesh_renderer::PassStats;
use crate::renderer::options::RenderOptions;
use crate::renderer::shader::{BoundShader, ShaderKind, ShaderLibrary};
use crate::renderer::uniforms::{SKYBOX_CUBEMAP_UNIT, VIEW_PROJ_MATRIX};
use crate::scene::camera::UpAxis;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SkyFog {
    color: Vec3,
    lower_limit: f32,
    upper_limit: f32,
}

/// Draws the environment cube around the camera.
#[derive(Debug, Default)]
pub struct SkyboxRenderer {
    view: Mat4,
    proj: Mat4,
    fog: Option<SkyFog>,
    skybox: Option<Skybox>,
}

impl SkyboxRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the camera rotation, projection and fog for this frame.
    pub fn begin(&mut self, options: &RenderOptions<'_>) {
        let camera = match options.camera {
            Some(camera) => camera,
            None => panic!("skybox renderer requires a camera"),
        };

        // translation dropped so the cube stays centred on the viewer
        let rotation = Mat4::from_mat3(Mat3::from_mat4(camera.view_matrix()));
        self.view = rotation * up_axis_correction(camera.up_axis);
        self.proj = camera.proj_matrix();
        self.skybox = options.skybox.copied();
        self.fog = match (options.use_fog, options.fog) {
            (true, Some(fog)) => Some(SkyFog {
                color: fog.color(),
                lower_limit: options.skybox_fog_lower_limit,
                upper_limit: options.skybox_fog_upper_limit,
            }),
            _ => None,
        };
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }

    pub fn render(&mut self, device: &mut dyn GraphicsDevice, shaders: &ShaderLibrary) -> PassStats {
        let Some(skybox) = self.skybox else {
            log::warn!("Skybox pass skipped, no skybox in this frame");
            return PassStats::default();
        };

        let program = shaders.get(ShaderKind::Skybox {
            fog: self.fog.is_some(),
        });
        let mut shader = BoundShader::new(device, program);
        shader.set_mat4(VIEW_PROJ_MATRIX, self.view_proj());
        if let Some(fog) = self.fog {
            shader.set_vec3("u_fog.color", fog.color);
            shader.set_float("u_fog.lowerLimit", fog.lower_limit);
            shader.set_float("u_fog.upperLimit", fog.upper_limit);
        }
        shader.bind_texture(
            "u_skybox",
            SKYBOX_CUBEMAP_UNIT,
            TextureTarget::CubeMap,
            skybox.cubemap,
        );

        shader.device().set_depth_mask(false);
        shader.device().draw_arrays(skybox.cube, Skybox::VERTEX_COUNT);
        shader.device().set_depth_mask(true);

        PassStats {
            program: Some(program),
            draw_calls: 1,
        }
    }
}

/// Rotates the Y-up cube so its top faces the camera's up axis.
fn up_axis_correction(up_axis: UpAxis) -> Mat4 {
    match up_axis {
        UpAxis::X => Mat4::from_rotation_z(-FRAC_PI_2),
        UpAxis::Y => Mat4::IDENTITY,
        UpAxis::Z => Mat4::from_rotation_x(FRAC_PI_2),
    }
}
