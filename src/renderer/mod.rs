pub mod rasterizer_renderer;
pub mod raytracer_renderer;

use anyhow::Result;
use glam::Vec3;

use crate::camera::Camera;
use crate::cli::RenderMode;
use crate::settings::Settings;

pub use rasterizer_renderer::RasterizationRenderer;
pub use raytracer_renderer::RayTracingRenderer;

/// A renderer driver owns one pipeline, wires scene-specific shaders into it
/// and runs the per-frame sequence: clear, configure, draw/trace, persist.
pub trait Renderer {
    fn init(&mut self) -> Result<()>;
    fn render(&mut self) -> Result<()>;
}

pub fn create(mode: RenderMode, settings: Settings) -> Box<dyn Renderer> {
    match mode {
        RenderMode::Raster => Box::new(RasterizationRenderer::new(settings)),
        RenderMode::Trace => Box::new(RayTracingRenderer::new(settings)),
    }
}

/// Camera configured from the settings block; recomputed once per frame.
pub(crate) fn configure_camera(settings: &Settings) -> Camera {
    let mut camera = Camera::new();
    camera.set_width(settings.width as f32);
    camera.set_height(settings.height as f32);
    camera.set_position(Vec3::from_array(settings.camera_position));
    camera.set_phi(settings.camera_phi);
    camera.set_theta(settings.camera_theta);
    camera.set_angle_of_view(settings.camera_angle_of_view);
    camera.set_z_near(settings.camera_z_near);
    camera.set_z_far(settings.camera_z_far);
    camera
}
