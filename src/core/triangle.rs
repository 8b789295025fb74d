use crate::core::bvh::BVHPrimitive;
use crate::math::AABB;
use crate::types::MeshVertex;
use glam::Vec3;

/// Triangle denormalized from an indexed mesh for hit shading: positions,
/// cached edges, per-vertex normals and per-face material colors.
#[derive(Copy, Clone, Debug)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub ba: Vec3,
    pub ca: Vec3,
    pub na: Vec3,
    pub nb: Vec3,
    pub nc: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub emissive: Vec3,
}

impl Triangle {
    pub fn from_vertices<V: MeshVertex>(a: &V, b: &V, c: &V) -> Self {
        let (pa, pb, pc) = (a.position(), b.position(), c.position());
        Self {
            a: pa,
            b: pb,
            c: pc,
            ba: pb - pa,
            ca: pc - pa,
            na: a.normal(),
            nb: b.normal(),
            nc: c.normal(),
            ambient: a.ambient(),
            diffuse: a.diffuse(),
            emissive: a.emissive(),
        }
    }

    /// Geometric normal from the winding, zero for degenerate triangles.
    pub fn face_normal(&self) -> Vec3 {
        self.ba.cross(self.ca).normalize_or_zero()
    }

    /// Smooth normal at the given barycentric weights.
    pub fn normal_at(&self, bary: Vec3) -> Vec3 {
        (self.na * bary.x + self.nb * bary.y + self.nc * bary.z).normalize_or_zero()
    }
}

impl BVHPrimitive for Triangle {
    fn bounds(&self) -> AABB {
        AABB::from_points(&[self.a, self.b, self.c])
    }
}

/// Result of a ray/triangle intersection test.
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray.
    pub t: f32,
    /// Barycentric weights for vertices a, b, c; sums to 1.
    pub bary: Vec3,
}

/// Möller-Trumbore ray/triangle intersection against the cached edges.
///
/// Degenerate input (zero-area triangle, near-parallel ray) and non-finite
/// results report no hit instead of leaking NaN into the payload.
pub fn intersect_triangle(ray_origin: Vec3, ray_dir: Vec3, triangle: &Triangle) -> Option<TriangleHit> {
    const EPSILON: f32 = 1e-6;

    let h = ray_dir.cross(triangle.ca);
    let det = triangle.ba.dot(h);

    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray_origin - triangle.a;
    let u = inv_det * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(triangle.ba);
    let v = inv_det * ray_dir.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * triangle.ca.dot(q);

    if t < EPSILON || !t.is_finite() {
        return None;
    }

    Some(TriangleHit {
        t,
        bary: Vec3::new(1.0 - u - v, u, v),
    })
}
