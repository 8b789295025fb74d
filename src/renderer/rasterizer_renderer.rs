use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec3;
use log::{debug, info};

use crate::camera::Camera;
use crate::color::{Color, UnsignedColor};
use crate::core::Rasterizer;
use crate::loaders::{load_obj, Model};
use crate::output;
use crate::renderer::{configure_camera, Renderer};
use crate::resource::Resource;
use crate::settings::Settings;
use crate::types::Vertex;

// Illustrative shading constants. The ambient + diffuse + specular + glow
// structure is the contract; the coefficients are tunable placeholders.
const LIGHT_DIRECTION: Vec3 = Vec3::new(1.0, 1.0, 1.0);
const VIEW_DIRECTION: Vec3 = Vec3::new(0.0, 0.0, 1.0);
const SPECULAR_COLOR: Vec3 = Vec3::new(1.0, 1.0, 1.0);
const SPECULAR_SHININESS: f32 = 64.0;
const GLOW_COLOR: Vec3 = Vec3::new(1.0, 0.5, 0.0);
const GLOW_INTENSITY: f32 = 0.5;

/// Driver for the scanline pipeline.
pub struct RasterizationRenderer {
    settings: Settings,
    camera: Camera,
    rasterizer: Rasterizer<Vertex, UnsignedColor>,
    model: Option<Model>,
}

impl RasterizationRenderer {
    pub fn new(settings: Settings) -> Self {
        let camera = configure_camera(&settings);
        Self {
            settings,
            camera,
            rasterizer: Rasterizer::new(),
            model: None,
        }
    }
}

impl Renderer for RasterizationRenderer {
    fn init(&mut self) -> Result<()> {
        self.rasterizer
            .set_viewport(self.settings.width, self.settings.height);
        self.rasterizer.set_render_target(
            Resource::new_2d(self.settings.width, self.settings.height),
            Resource::new_2d(self.settings.width, self.settings.height),
        );

        let model = load_obj(&self.settings.model_path)?;
        for shape in model.shapes() {
            debug!(
                "Vertex buffer: {} bytes, index buffer: {} bytes",
                shape.vertex_buffer.size_bytes(),
                shape.index_buffer.size_bytes()
            );
        }
        self.model = Some(model);

        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let model = self
            .model
            .as_ref()
            .context("rasterization renderer not initialized")?;

        let matrix =
            self.camera.projection_matrix() * self.camera.view_matrix() * model.world_matrix();

        self.rasterizer.vertex_shader = Some(Box::new(move |position, vertex_data| {
            (matrix * position, vertex_data)
        }));

        self.rasterizer.pixel_shader = Some(Box::new(|vertex_data, _depth| {
            let light_dir = LIGHT_DIRECTION.normalize();
            let normal = vertex_data.normal.normalize_or_zero();
            let diffuse_intensity = normal.dot(light_dir).max(0.0);

            let view_dir = VIEW_DIRECTION.normalize();
            let reflect_dir = -light_dir - 2.0 * normal.dot(-light_dir) * normal;
            let specular_intensity = view_dir.dot(reflect_dir).max(0.0).powf(SPECULAR_SHININESS);

            let shaded = vertex_data.ambient
                + vertex_data.diffuse * diffuse_intensity
                + SPECULAR_COLOR * specular_intensity
                + GLOW_COLOR * GLOW_INTENSITY;

            Color::from_float3(shaded)
        }));

        let start = Instant::now();
        self.rasterizer
            .clear_render_target(UnsignedColor::default())?;

        for shape in model.shapes() {
            self.rasterizer
                .set_vertex_buffer(shape.vertex_buffer.clone());
            self.rasterizer.set_index_buffer(shape.index_buffer.clone());
            self.rasterizer.draw(shape.index_buffer.count(), 0)?;
        }
        info!(
            "Rasterization took {:.1} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        output::save_resource(self.rasterizer.render_target()?, &self.settings.result_path)
    }
}
