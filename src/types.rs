use glam::{Vec2, Vec3};

/// Per-vertex shading attribute bundle, immutable once loaded.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub emissive: Vec3,
}

/// Point light owned by the ray-tracing driver.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub intensity: Vec3,
}

/// Attribute access the ray pipeline needs to denormalize indexed meshes
/// into triangles. Keeps the pipeline generic over the vertex layout.
pub trait MeshVertex: Copy + Send + Sync + 'static {
    fn position(&self) -> Vec3;
    fn normal(&self) -> Vec3;
    fn ambient(&self) -> Vec3;
    fn diffuse(&self) -> Vec3;
    fn emissive(&self) -> Vec3;
}

impl MeshVertex for Vertex {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn normal(&self) -> Vec3 {
        self.normal
    }

    fn ambient(&self) -> Vec3 {
        self.ambient
    }

    fn diffuse(&self) -> Vec3 {
        self.diffuse
    }

    fn emissive(&self) -> Vec3 {
        self.emissive
    }
}

/// Barycentric blend of three vertices, used by the rasterizer to produce
/// fragment attributes. Weights are expected to sum to 1.
pub trait Interpolate {
    fn interpolate(a: &Self, b: &Self, c: &Self, weights: Vec3) -> Self;
}

impl Interpolate for Vertex {
    fn interpolate(a: &Self, b: &Self, c: &Self, w: Vec3) -> Self {
        Vertex {
            position: a.position * w.x + b.position * w.y + c.position * w.z,
            normal: a.normal * w.x + b.normal * w.y + c.normal * w.z,
            uv: a.uv * w.x + b.uv * w.y + c.uv * w.z,
            ambient: a.ambient * w.x + b.ambient * w.y + c.ambient * w.z,
            diffuse: a.diffuse * w.x + b.diffuse * w.y + c.diffuse * w.z,
            emissive: a.emissive * w.x + b.emissive * w.y + c.emissive * w.z,
        }
    }
}
