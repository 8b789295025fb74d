pub mod camera;
pub mod cli;
pub mod color;
pub mod core;
pub mod error;
pub mod loaders;
pub mod math;
pub mod output;
pub mod renderer;
pub mod resource;
pub mod settings;
pub mod types;

pub use crate::color::{Color, FromColor, UnsignedColor};
pub use crate::core::{Payload, Rasterizer, Raytracer, Triangle};
pub use crate::error::RenderError;
pub use crate::math::Ray;
pub use crate::resource::Resource;
pub use crate::types::{Light, Vertex};
