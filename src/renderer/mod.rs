pub mod context;
pub mod debug_drawer;
pub mod device;
pub mod lights;
pub mod main_renderer;
pub mod material;
pub mod mesh_renderer;
pub mod options;
pub mod recording;
pub mod shader;
pub mod shadow_map;
pub mod skybox_renderer;
pub mod uniforms;

pub use context::{FrameContext, ShadowParams};
pub use debug_drawer::{DebugDrawer, DebugLine, LINE_BATCH_SIZE, SHADOW_VOLUME_COLOR};
pub use device::{
    Capability, ClearFlags, DepthTarget, FramebufferId, GeometryId, GraphicsDevice, LineVertex,
    PolygonMode, Primitive, ShaderId, TextureId, TextureTarget, Viewport,
};
pub use lights::{Attenuation, Light, LightKind, LightType};
pub use main_renderer::{Frame, FrameStats, MainRenderer};
pub use material::{Material, MaterialKind};
pub use mesh_renderer::{Bucket, MeshRenderer, MeshRendererState, PassStats};
pub use options::{
    CullingGeom, DepthViewConfig, RenderMode, RenderOptions, ShadowRange, ShadowRangeConfig,
};
pub use recording::{DeviceCommand, DrawRecord, RecordingDevice};
pub use shader::{BoundShader, ShaderKind, ShaderLibrary};
pub use shadow_map::{compute_light_space_transform, LightSpaceTransform, ShadowMap, ShadowMapBinding};
pub use skybox_renderer::SkyboxRenderer;
pub use uniforms::UniformValue;
