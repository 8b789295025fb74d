pub mod bvh;
pub mod rasterizer;
pub mod raytracer;
pub mod triangle;

pub use rasterizer::Rasterizer;
pub use raytracer::{Payload, Raytracer, TraceContext};
pub use triangle::{intersect_triangle, Triangle, TriangleHit};
