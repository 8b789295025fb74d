use std::sync::Arc;

use glam::Vec3;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::color::{Color, FromColor};
use crate::core::bvh::BVHNode;
use crate::core::triangle::{intersect_triangle, Triangle, TriangleHit};
use crate::error::RenderError;
use crate::math::{intersect_aabb, Ray};
use crate::resource::Resource;
use crate::types::MeshVertex;

/// Per-ray mutable state threaded through a trace call.
#[derive(Copy, Clone, Debug)]
pub struct Payload {
    /// Hit distance along the ray; negative when nothing was hit.
    pub t: f32,
    /// Barycentric weights of the hit for vertices a, b, c.
    pub bary: Vec3,
    pub color: Color,
}

impl Default for Payload {
    fn default() -> Self {
        Self {
            t: -1.0,
            bary: Vec3::ZERO,
            color: Color::BLACK,
        }
    }
}

/// Invoked when a ray intersects no geometry.
pub type MissShader = Box<dyn Fn(&Ray) -> Payload + Send + Sync>;

/// Occlusion decision for the shadow pass; true means the ray is blocked.
pub type AnyHitShader = Box<dyn Fn(&Ray) -> bool + Send + Sync>;

/// Invoked for the nearest intersected triangle. May cast further rays
/// through [`TraceContext::trace_ray`] with `depth + 1`.
pub type ClosestHitShader = Box<
    dyn Fn(&TraceContext<'_>, &mut StdRng, &Ray, Payload, &Triangle, u32) -> Payload + Send + Sync,
>;

/// Immutable snapshot of the scene's triangles; rebuilt whenever the bound
/// buffers change, read-only while tracing. An empty scene has no root.
struct AccelerationStructure {
    root: Option<BVHNode>,
}

/// Read-only tracing state handed to hit shaders so they can recurse
/// without re-borrowing the pipeline.
pub struct TraceContext<'a> {
    triangles: &'a [Triangle],
    root: Option<&'a BVHNode>,
    miss_shader: &'a MissShader,
    closest_hit_shader: Option<&'a ClosestHitShader>,
    any_hit_shader: Option<&'a AnyHitShader>,
    max_depth: u32,
}

impl TraceContext<'_> {
    /// Resolves the nearest intersection and dispatches to the hit or miss
    /// shader. At or beyond the depth bound the trace short-circuits to the
    /// miss shader's terminal payload, guaranteeing termination.
    pub fn trace_ray(&self, ray: &Ray, depth: u32, rng: &mut StdRng) -> Payload {
        if depth >= self.max_depth {
            return (self.miss_shader)(ray);
        }

        match self.nearest_hit(ray) {
            None => (self.miss_shader)(ray),
            Some((index, hit)) => {
                let payload = Payload {
                    t: hit.t,
                    bary: hit.bary,
                    color: Color::BLACK,
                };
                match self.closest_hit_shader {
                    Some(shader) => shader(self, rng, ray, payload, &self.triangles[index], depth),
                    None => payload,
                }
            }
        }
    }

    /// Early-exit occlusion query within `(0, max_t)`, independent of
    /// closest-hit bookkeeping. The any-hit shader, when bound, decides
    /// whether the blocking candidate actually occludes.
    pub fn occluded(&self, ray: &Ray, max_t: f32) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        if !any_hit(root, self.triangles, ray, max_t) {
            return false;
        }
        match self.any_hit_shader {
            Some(shader) => shader(ray),
            None => true,
        }
    }

    fn nearest_hit(&self, ray: &Ray) -> Option<(usize, TriangleHit)> {
        let root = self.root?;
        let mut best: Option<(usize, TriangleHit)> = None;
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            let bounds = node.bounds();
            let Some((entry, _)) =
                intersect_aabb(ray.position, ray.direction, bounds.min, bounds.max)
            else {
                continue;
            };
            // An inside origin has a negative entry; never prune that node.
            if let Some((_, hit)) = &best {
                if entry.max(0.0) > hit.t {
                    continue;
                }
            }

            match node {
                BVHNode::Leaf {
                    primitive_indices, ..
                } => {
                    for &index in primitive_indices {
                        let triangle = &self.triangles[index as usize];
                        if let Some(hit) = intersect_triangle(ray.position, ray.direction, triangle)
                        {
                            if best.map_or(true, |(_, b)| hit.t < b.t) {
                                best = Some((index as usize, hit));
                            }
                        }
                    }
                }
                BVHNode::Internal { left, right, .. } => {
                    // Push the farther child first so the nearer one pops first.
                    let distance = |n: &BVHNode| {
                        let b = n.bounds();
                        intersect_aabb(ray.position, ray.direction, b.min, b.max)
                            .map(|(entry, _)| entry.max(0.0))
                    };
                    match (distance(left), distance(right)) {
                        (Some(dl), Some(dr)) if dl <= dr => {
                            stack.push(right.as_ref());
                            stack.push(left.as_ref());
                        }
                        _ => {
                            stack.push(left.as_ref());
                            stack.push(right.as_ref());
                        }
                    }
                }
            }
        }

        best
    }
}

fn any_hit(root: &BVHNode, triangles: &[Triangle], ray: &Ray, max_t: f32) -> bool {
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        let bounds = node.bounds();
        match intersect_aabb(ray.position, ray.direction, bounds.min, bounds.max) {
            Some((entry, _)) if entry.max(0.0) <= max_t => {}
            _ => continue,
        }

        match node {
            BVHNode::Leaf {
                primitive_indices, ..
            } => {
                for &index in primitive_indices {
                    if let Some(hit) =
                        intersect_triangle(ray.position, ray.direction, &triangles[index as usize])
                    {
                        if hit.t < max_t {
                            return true;
                        }
                    }
                }
            }
            BVHNode::Internal { left, right, .. } => {
                stack.push(left.as_ref());
                stack.push(right.as_ref());
            }
        }
    }

    false
}

/// Decorrelates neighbouring pixels' sample streams.
const PIXEL_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Recursive ray-tracing pipeline: viewport, owned render target, per-shape
/// mesh buffers, an acceleration structure and the three shader hooks.
pub struct Raytracer<V, C> {
    width: usize,
    height: usize,
    render_target: Option<Resource<C>>,
    vertex_buffers: Vec<Arc<Resource<V>>>,
    index_buffers: Vec<Arc<Resource<u32>>>,
    triangles: Vec<Triangle>,
    acceleration: Option<AccelerationStructure>,
    max_depth: u32,
    seed: u64,
    pub miss_shader: Option<MissShader>,
    pub closest_hit_shader: Option<ClosestHitShader>,
    pub any_hit_shader: Option<AnyHitShader>,
}

impl<V, C> Default for Raytracer<V, C>
where
    V: MeshVertex,
    C: FromColor,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C> Raytracer<V, C>
where
    V: MeshVertex,
    C: FromColor,
{
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            render_target: None,
            vertex_buffers: Vec::new(),
            index_buffers: Vec::new(),
            triangles: Vec::new(),
            acceleration: None,
            max_depth: 1,
            seed: 0,
            miss_shader: None,
            closest_hit_shader: None,
            any_hit_shader: None,
        }
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    pub fn set_render_target(&mut self, target: Resource<C>) {
        self.render_target = Some(target);
    }

    pub fn render_target(&self) -> Result<&Resource<C>, RenderError> {
        self.render_target
            .as_ref()
            .ok_or(RenderError::Precondition("render target not set"))
    }

    /// Binding new buffers invalidates any built acceleration structure.
    pub fn set_vertex_buffers(&mut self, buffers: Vec<Arc<Resource<V>>>) {
        self.vertex_buffers = buffers;
        self.acceleration = None;
    }

    pub fn set_index_buffers(&mut self, buffers: Vec<Arc<Resource<u32>>>) {
        self.index_buffers = buffers;
        self.acceleration = None;
    }

    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    /// Seed for the per-pixel sample streams; a fixed seed makes
    /// `ray_generation` reproducible.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn clear_render_target(&mut self, color: C) -> Result<(), RenderError> {
        let target = self
            .render_target
            .as_mut()
            .ok_or(RenderError::Precondition("render target not set"))?;
        target.fill(color);
        Ok(())
    }

    /// Denormalizes every bound shape into triangles and builds the BVH.
    /// Must run after any buffer change and before tracing.
    pub fn build_acceleration_structure(&mut self) -> Result<(), RenderError> {
        if self.vertex_buffers.len() != self.index_buffers.len() {
            return Err(RenderError::Precondition(
                "vertex and index buffer lists do not match",
            ));
        }

        let mut triangles = Vec::new();
        for (vertices, indices) in self.vertex_buffers.iter().zip(&self.index_buffers) {
            let index_data = indices.data();
            for face in index_data.chunks_exact(3) {
                let a = vertices.item(face[0] as usize)?;
                let b = vertices.item(face[1] as usize)?;
                let c = vertices.item(face[2] as usize)?;
                let triangle = Triangle::from_vertices(a, b, c);
                // Zero-area triangles can never be hit; drop them here so the
                // intersection loop stays NaN-free.
                if triangle.ba.cross(triangle.ca).length_squared() > 0.0 {
                    triangles.push(triangle);
                }
            }
        }

        let root = if triangles.is_empty() {
            None
        } else {
            let root = BVHNode::build(&triangles);
            let stats = root.stats();
            debug!(
                "BVH built: {} triangles, {} nodes, depth {}",
                stats.total_primitives, stats.num_nodes, stats.max_depth
            );
            Some(root)
        };

        self.triangles = triangles;
        self.acceleration = Some(AccelerationStructure { root });
        Ok(())
    }

    /// Borrow the tracing state; fails before `build_acceleration_structure`
    /// or without a miss shader.
    pub fn context(&self) -> Result<TraceContext<'_>, RenderError> {
        let acceleration = self
            .acceleration
            .as_ref()
            .ok_or(RenderError::Precondition("acceleration structure not built"))?;
        let miss_shader = self
            .miss_shader
            .as_ref()
            .ok_or(RenderError::Precondition("miss shader not set"))?;

        Ok(TraceContext {
            triangles: &self.triangles,
            root: acceleration.root.as_ref(),
            miss_shader,
            closest_hit_shader: self.closest_hit_shader.as_ref(),
            any_hit_shader: self.any_hit_shader.as_ref(),
            max_depth: self.max_depth,
        })
    }

    pub fn trace_ray(&self, ray: &Ray, depth: u32, rng: &mut StdRng) -> Result<Payload, RenderError> {
        Ok(self.context()?.trace_ray(ray, depth, rng))
    }

    /// Shadow query: is anything blocking the ray within `max_t`?
    pub fn trace_occlusion(&self, ray: &Ray, max_t: f32) -> Result<bool, RenderError> {
        Ok(self.context()?.occluded(ray, max_t))
    }

    /// Casts `sample_count` primary rays per pixel (first through the pixel
    /// center, the rest jittered), averages the traced colors and writes the
    /// quantized result. Rows run in parallel; every pixel derives its own
    /// rng stream from the seed, so output is deterministic and pixels stay
    /// independent. `right`/`up` arrive pre-scaled by tan(fov/2).
    pub fn ray_generation(
        &mut self,
        position: Vec3,
        forward: Vec3,
        right: Vec3,
        up: Vec3,
        max_depth: u32,
        sample_count: u32,
    ) -> Result<(), RenderError> {
        self.max_depth = max_depth;

        if self.width == 0 || self.height == 0 {
            return Err(RenderError::Precondition("viewport not set"));
        }

        let mut target = self
            .render_target
            .take()
            .ok_or(RenderError::Precondition("render target not set"))?;
        if target.count() != self.width * self.height {
            self.render_target = Some(target);
            return Err(RenderError::Precondition(
                "render target does not match viewport",
            ));
        }

        let result = self.context().map(|context| {
            let (width, height) = (self.width, self.height);
            let samples = sample_count.max(1);
            let seed = self.seed;

            target
                .data_mut()
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, pixel) in row.iter_mut().enumerate() {
                        let pixel_index = (y * width + x) as u64;
                        let mut rng = StdRng::seed_from_u64(
                            seed.wrapping_add(pixel_index.wrapping_mul(PIXEL_SEED_MIX)),
                        );

                        let mut accumulated = Vec3::ZERO;
                        for sample in 0..samples {
                            let (jitter_x, jitter_y) = if sample == 0 {
                                (0.5, 0.5)
                            } else {
                                (rng.gen::<f32>(), rng.gen::<f32>())
                            };
                            let u = 2.0 * (x as f32 + jitter_x) / width as f32 - 1.0;
                            let v = 1.0 - 2.0 * (y as f32 + jitter_y) / height as f32;
                            let ray = Ray::new(position, forward + right * u + up * v);

                            let payload = context.trace_ray(&ray, 0, &mut rng);
                            accumulated += payload.color.to_float3();
                        }

                        let averaged = accumulated / samples as f32;
                        *pixel = C::from_color(Color::from_float3(averaged));
                    }
                });
        });

        self.render_target = Some(target);
        result
    }
}
