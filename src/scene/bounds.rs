use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box spanning `[-half, half]` around `center`.
    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    /// Unit cube centred on the origin, the bounds of the engine's box geometry.
    pub fn unit() -> Self {
        Self::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5))
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after `matrix`, re-fitted to the world axes.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = self.corners().map(|c| matrix.transform_point3(c));
        // eight corners, never empty
        Self::from_points(corners).unwrap_or(*self)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere {
            center: self.center(),
            radius: self.half_extents().length(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere after `matrix`; the radius grows with the largest axis scale.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let scale = matrix
            .x_axis
            .xyz()
            .length()
            .max(matrix.y_axis.xyz().length())
            .max(matrix.z_axis.xyz().length());
        Self {
            center: matrix.transform_point3(self.center),
            radius: self.radius * scale,
        }
    }
}

/// Camera frustum as six inward-facing planes plus its world-space corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    /// `xyz` is the unit normal, `w` the offset: `dot(n, p) + w >= 0` inside.
    pub planes: [Vec4; 6],
    /// Near face first, then far face, each as (-x,-y) (x,-y) (-x,y) (x,y).
    pub corners: [Vec3; 8],
}

impl Frustum {
    /// Extracts the frustum of an OpenGL-convention view-projection matrix.
    pub fn from_view_proj(view_proj: &Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r3 + r2, r3 - r2].map(|plane| {
            let len = plane.xyz().length();
            if len > 0.0 {
                plane / len
            } else {
                plane
            }
        });

        let inv = view_proj.inverse();
        let mut corners = [Vec3::ZERO; 8];
        let mut i = 0;
        for z in [-1.0, 1.0] {
            for y in [-1.0, 1.0] {
                for x in [-1.0, 1.0] {
                    corners[i] = inv.project_point3(Vec3::new(x, y, z));
                    i += 1;
                }
            }
        }

        Self { planes, corners }
    }

    fn distance(plane: Vec4, point: Vec3) -> f32 {
        plane.xyz().dot(point) + plane.w
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| Self::distance(*p, point) >= 0.0)
    }

    /// True only when the whole box lies behind one of the planes. Boxes
    /// straddling a frustum corner may be reported as visible.
    pub fn certainly_outside_box(&self, aabb: &Aabb) -> bool {
        self.planes.iter().any(|plane| {
            let n = plane.xyz();
            let positive = Vec3::select(n.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            Self::distance(*plane, positive) < 0.0
        })
    }

    pub fn certainly_outside_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .any(|plane| Self::distance(*plane, sphere.center) < -sphere.radius)
    }
}
