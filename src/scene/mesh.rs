use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::renderer::device::GeometryId;
use crate::renderer::material::Material;
use crate::scene::bounds::{Aabb, BoundingSphere};
use crate::scene::transform::Transform;

/// Handle to device-side vertex/index buffers plus their model-space bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub id: GeometryId,
    pub index_count: u32,
    pub bounds: Aabb,
}

impl Geometry {
    pub fn new(id: GeometryId, index_count: u32, bounds: Aabb) -> Self {
        Self {
            id,
            index_count,
            bounds,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub transform: Transform,
    /// World matrix of the owning model, applied after `transform`.
    pub parent: Mat4,
    pub material: Rc<Material>,
    pub casts_shadows: bool,
    pub cull_faces: bool,
    pub wireframe: bool,
    pub visible: bool,
    /// Object id used by the semantic view.
    pub mask_id: i32,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: Rc<Material>) -> Self {
        Self {
            name: name.into(),
            geometry,
            transform: Transform::IDENTITY,
            parent: Mat4::IDENTITY,
            material,
            casts_shadows: true,
            cull_faces: true,
            wireframe: false,
            visible: true,
            mask_id: 0,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.translation = position;
        self
    }

    pub fn with_casts_shadows(mut self, casts_shadows: bool) -> Self {
        self.casts_shadows = casts_shadows;
        self
    }

    pub fn with_cull_faces(mut self, cull_faces: bool) -> Self {
        self.cull_faces = cull_faces;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_mask_id(mut self, mask_id: i32) -> Self {
        self.mask_id = mask_id;
        self
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.parent * self.transform.matrix()
    }

    pub fn position(&self) -> Vec3 {
        self.model_matrix().w_axis.truncate()
    }

    pub fn world_bbox(&self) -> Aabb {
        self.geometry.bounds.transformed(&self.model_matrix())
    }

    pub fn world_bsphere(&self) -> BoundingSphere {
        self.geometry
            .bounds
            .bounding_sphere()
            .transformed(&self.model_matrix())
    }
}

/// A group of sub-meshes placed with one transform. Sub-mesh transforms are
/// relative to the model.
#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    pub transform: Transform,
    pub submeshes: Vec<Mesh>,
    pub visible: bool,
    pub mask_id: i32,
}

impl Model {
    pub fn new(name: impl Into<String>, submeshes: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            submeshes,
            visible: true,
            mask_id: 0,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mask_id(mut self, mask_id: i32) -> Self {
        self.mask_id = mask_id;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        self.transform.matrix()
    }

    /// World-space copies of the visible sub-meshes, tagged with the model's
    /// mask id. The model matrix is composed as a matrix so non-uniform
    /// scale over a rotated sub-mesh keeps its shear.
    pub fn flatten(&self) -> Vec<Mesh> {
        let model = self.matrix();
        self.submeshes
            .iter()
            .filter(|mesh| mesh.visible)
            .map(|mesh| {
                let mut world = mesh.clone();
                world.parent = model * mesh.parent;
                world.mask_id = self.mask_id;
                world
            })
            .collect()
    }

    pub fn world_bbox(&self) -> Option<Aabb> {
        let model = self.matrix();
        let corners = self.submeshes.iter().flat_map(|mesh| {
            mesh.geometry
                .bounds
                .transformed(&(model * mesh.model_matrix()))
                .corners()
        });
        Aabb::from_points(corners)
    }
}

/// Anything the scene hands to the main renderer.
#[derive(Clone, Debug)]
pub enum Renderable {
    Mesh(Mesh),
    Model(Model),
}

impl Renderable {
    pub fn name(&self) -> &str {
        match self {
            Renderable::Mesh(mesh) => &mesh.name,
            Renderable::Model(model) => &model.name,
        }
    }

    pub fn visible(&self) -> bool {
        match self {
            Renderable::Mesh(mesh) => mesh.visible,
            Renderable::Model(model) => model.visible,
        }
    }

    pub fn world_bbox(&self) -> Option<Aabb> {
        match self {
            Renderable::Mesh(mesh) => Some(mesh.world_bbox()),
            Renderable::Model(model) => model.world_bbox(),
        }
    }

    pub fn world_bsphere(&self) -> Option<BoundingSphere> {
        match self {
            Renderable::Mesh(mesh) => Some(mesh.world_bsphere()),
            Renderable::Model(model) => model.world_bbox().map(|b| b.bounding_sphere()),
        }
    }

    /// Meshes to draw for this renderable, in world space.
    pub fn meshes(&self) -> Vec<Mesh> {
        match self {
            Renderable::Mesh(mesh) => vec![mesh.clone()],
            Renderable::Model(model) => model.flatten(),
        }
    }
}

impl From<Mesh> for Renderable {
    fn from(mesh: Mesh) -> Self {
        Renderable::Mesh(mesh)
    }
}

impl From<Model> for Renderable {
    fn from(model: Model) -> Self {
        Renderable::Model(model)
    }
}
