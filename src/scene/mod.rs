// scene/mod.rs

pub mod bounds;
pub mod camera;
pub mod mesh;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use bounds::{Aabb, BoundingSphere, Frustum};
pub use camera::{Camera, CameraController, Projection, ProjectionData, UpAxis};
pub use mesh::{Geometry, Mesh, Model, Renderable};
pub use scene::Scene;
pub use transform::Transform;
