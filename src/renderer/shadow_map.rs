use glam::{Mat4, Vec3};

use crate::error::RenderError;
use crate::renderer::device::{
    ClearFlags, DepthTarget, FramebufferId, GraphicsDevice, TextureId, Viewport,
};
use crate::renderer::lights::{safe_normalize, Light, LightKind};
use crate::renderer::options::{ShadowRange, ShadowRangeConfig, DEFAULT_FIXED_EXTENT};
use crate::scene::bounds::{Aabb, Frustum};
use crate::scene::camera::Camera;

/// View and projection used to render the scene from the light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpaceTransform {
    pub view: Mat4,
    pub proj: Mat4,
    /// Padded light-space bounds of the camera frustum, auto-fit only.
    /// Expressed in the light's rotation frame (looking down -Z).
    pub bounds: Option<Aabb>,
}

impl LightSpaceTransform {
    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }
}

/// Computes the light-space view/projection for `light`.
///
/// `camera` is only read by the auto-fit range; `aspect` is the shadow map's
/// width over height and only shapes perspective (point/spot) projections.
pub fn compute_light_space_transform(
    light: &Light,
    config: &ShadowRangeConfig,
    camera: Option<&Camera>,
    aspect: f32,
) -> LightSpaceTransform {
    match light.kind {
        LightKind::Directional { direction } => {
            let direction = safe_normalize(direction, Vec3::NEG_Y);
            match (config.range, camera) {
                (
                    ShadowRange::AutoFitCamera {
                        extra_width,
                        extra_height,
                        extra_depth,
                    },
                    Some(camera),
                ) => fit_to_camera(
                    direction,
                    config.world_up,
                    camera,
                    Vec3::new(extra_width, extra_height, extra_depth),
                ),
                (ShadowRange::AutoFitCamera { .. }, None) => {
                    log::warn!("Auto-fit shadow range needs a camera, using the default fixed range");
                    let extent = DEFAULT_FIXED_EXTENT;
                    fixed_directional(direction, config, extent, extent, extent)
                }
                (
                    ShadowRange::FixedUser {
                        width,
                        height,
                        depth,
                    },
                    _,
                ) => fixed_directional(direction, config, width, height, depth),
            }
        }
        LightKind::Point { position, .. } => {
            if matches!(config.range, ShadowRange::AutoFitCamera { .. }) {
                log::warn!("Auto-fit shadow range only applies to directional lights");
            }
            let direction = safe_normalize(config.focus_point - position, Vec3::NEG_Y);
            perspective_from(position, direction, config, aspect)
        }
        LightKind::Spot {
            position,
            direction,
            ..
        } => {
            if matches!(config.range, ShadowRange::AutoFitCamera { .. }) {
                log::warn!("Auto-fit shadow range only applies to directional lights");
            }
            let direction = safe_normalize(direction, Vec3::NEG_Y);
            perspective_from(position, direction, config, aspect)
        }
    }
}

fn fixed_directional(
    direction: Vec3,
    config: &ShadowRangeConfig,
    width: f32,
    height: f32,
    depth: f32,
) -> LightSpaceTransform {
    let depth = depth.max(1e-3);
    let focus = config.focus_point;
    let eye = focus - direction * (0.5 * depth);
    let up = shadow_up(direction, config.world_up);

    let view = Mat4::look_at_rh(eye, focus, up);
    let proj = Mat4::orthographic_rh_gl(
        -0.5 * width,
        0.5 * width,
        -0.5 * height,
        0.5 * height,
        0.0,
        depth,
    );

    LightSpaceTransform {
        view,
        proj,
        bounds: None,
    }
}

fn fit_to_camera(direction: Vec3, world_up: Vec3, camera: &Camera, extra: Vec3) -> LightSpaceTransform {
    let up = shadow_up(direction, world_up);
    let light_rotation = Mat4::look_at_rh(Vec3::ZERO, direction, up);

    let frustum = Frustum::from_view_proj(&camera.view_proj());
    let light_space = frustum.corners.map(|corner| light_rotation.transform_point3(corner));
    let tight = Aabb::from_points(light_space).unwrap_or(Aabb::unit());
    let extra = extra.max(Vec3::ZERO);
    let bounds = Aabb::new(tight.min - extra, tight.max + extra);

    // light looks down -Z: the eye sits on the max-z face of the box
    let center = bounds.center();
    let eye = Vec3::new(center.x, center.y, bounds.max.z);
    let view = Mat4::from_translation(-eye) * light_rotation;

    let half = bounds.half_extents();
    let depth = (bounds.max.z - bounds.min.z).max(1e-3);
    let proj = Mat4::orthographic_rh_gl(-half.x, half.x, -half.y, half.y, 0.0, depth);

    LightSpaceTransform {
        view,
        proj,
        bounds: Some(bounds),
    }
}

fn perspective_from(
    position: Vec3,
    direction: Vec3,
    config: &ShadowRangeConfig,
    aspect: f32,
) -> LightSpaceTransform {
    let up = shadow_up(direction, config.world_up);
    let view = Mat4::look_at_rh(position, position + direction, up);
    let near = config.znear.max(1e-3);
    let far = config.zfar.max(near + 1e-3);
    let proj = Mat4::perspective_rh_gl(config.fov_radians, aspect.max(1e-3), near, far);

    LightSpaceTransform {
        view,
        proj,
        bounds: None,
    }
}

/// Up vector for a light looking along `direction`, kept away from parallel.
fn shadow_up(direction: Vec3, world_up: Vec3) -> Vec3 {
    let up = safe_normalize(world_up, Vec3::Y);
    if direction.dot(up).abs() > 0.95 {
        if up.z.abs() > 0.95 {
            Vec3::X
        } else {
            Vec3::Z
        }
    } else {
        up
    }
}

/// Offscreen depth target rendered from the light's point of view.
#[derive(Debug)]
pub struct ShadowMap {
    target: DepthTarget,
    transform: LightSpaceTransform,
}

impl ShadowMap {
    pub fn new(device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidShadowMapSize { width, height });
        }
        let target = device.create_depth_target(width, height)?;
        log::info!("Created {}x{} shadow map", width, height);

        Ok(Self {
            target,
            transform: LightSpaceTransform {
                view: Mat4::IDENTITY,
                proj: Mat4::IDENTITY,
                bounds: None,
            },
        })
    }

    /// Recomputes the light-space transform for this frame.
    pub fn setup(&mut self, light: &Light, config: &ShadowRangeConfig, camera: Option<&Camera>) {
        let aspect = self.target.width as f32 / self.target.height as f32;
        self.transform = compute_light_space_transform(light, config, camera, aspect);
    }

    /// Makes the depth target current until the returned guard is dropped.
    pub fn bind<'a>(&self, device: &'a mut dyn GraphicsDevice) -> ShadowMapBinding<'a> {
        let previous_viewport = device.viewport();
        let previous_framebuffer = device.bound_framebuffer();

        device.set_viewport(Viewport::new(self.target.width, self.target.height));
        device.bind_framebuffer(Some(self.target.framebuffer));
        device.clear(ClearFlags::DEPTH);

        ShadowMapBinding {
            device,
            previous_viewport,
            previous_framebuffer,
        }
    }

    pub fn width(&self) -> u32 {
        self.target.width
    }

    pub fn height(&self) -> u32 {
        self.target.height
    }

    pub fn depth_texture(&self) -> TextureId {
        self.target.depth_texture
    }

    pub fn framebuffer(&self) -> FramebufferId {
        self.target.framebuffer
    }

    pub fn light_space_transform(&self) -> &LightSpaceTransform {
        &self.transform
    }

    pub fn light_space_view(&self) -> Mat4 {
        self.transform.view
    }

    pub fn light_space_proj(&self) -> Mat4 {
        self.transform.proj
    }

    pub fn light_space_view_proj(&self) -> Mat4 {
        self.transform.view_proj()
    }
}

/// Scoped binding of a shadow map's framebuffer. Restores the previous
/// framebuffer and viewport on drop.
pub struct ShadowMapBinding<'a> {
    device: &'a mut dyn GraphicsDevice,
    previous_viewport: Viewport,
    previous_framebuffer: Option<FramebufferId>,
}

impl ShadowMapBinding<'_> {
    pub fn device(&mut self) -> &mut dyn GraphicsDevice {
        &mut *self.device
    }
}

impl Drop for ShadowMapBinding<'_> {
    fn drop(&mut self) {
        self.device.bind_framebuffer(self.previous_framebuffer);
        self.device.set_viewport(self.previous_viewport);
    }
}
