use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec3;
use log::info;
use rand::Rng;

use crate::camera::Camera;
use crate::color::{Color, UnsignedColor};
use crate::core::{Payload, Raytracer};
use crate::loaders::{load_obj, Model};
use crate::math::Ray;
use crate::output;
use crate::renderer::{configure_camera, Renderer};
use crate::resource::Resource;
use crate::settings::Settings;
use crate::types::{Light, Vertex};

/// Offset applied to secondary-ray origins to escape the surface.
const SHADOW_BIAS: f32 = 1e-3;

/// Driver for the recursive ray-tracing pipeline. A second tracer instance
/// bound to the same geometry answers shadow queries through its any-hit
/// shader only.
pub struct RayTracingRenderer {
    settings: Settings,
    camera: Camera,
    raytracer: Raytracer<Vertex, UnsignedColor>,
    model: Option<Model>,
    lights: Vec<Light>,
}

impl RayTracingRenderer {
    pub fn new(settings: Settings) -> Self {
        let camera = configure_camera(&settings);
        let lights = settings
            .lights
            .iter()
            .map(|l| Light {
                position: Vec3::from_array(l.position),
                intensity: Vec3::from_array(l.intensity),
            })
            .collect();
        Self {
            settings,
            camera,
            raytracer: Raytracer::new(),
            model: None,
            lights,
        }
    }
}

impl Renderer for RayTracingRenderer {
    fn init(&mut self) -> Result<()> {
        let model = load_obj(&self.settings.model_path)?;

        self.raytracer
            .set_viewport(self.settings.width, self.settings.height);
        self.raytracer.set_render_target(Resource::new_2d(
            self.settings.width,
            self.settings.height,
        ));
        self.raytracer.set_vertex_buffers(model.vertex_buffers());
        self.raytracer.set_index_buffers(model.index_buffers());

        self.model = Some(model);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let model = self
            .model
            .as_ref()
            .context("ray-tracing renderer not initialized")?;

        // Shadow tracer: same geometry, any-hit/miss shaders only.
        let mut shadow_raytracer = Raytracer::<Vertex, UnsignedColor>::new();
        shadow_raytracer.set_vertex_buffers(model.vertex_buffers());
        shadow_raytracer.set_index_buffers(model.index_buffers());
        shadow_raytracer.miss_shader = Some(Box::new(|_| Payload::default()));
        shadow_raytracer.any_hit_shader = Some(Box::new(|_| true));
        shadow_raytracer.build_acceleration_structure()?;
        let shadow_raytracer = Arc::new(shadow_raytracer);

        self.raytracer
            .clear_render_target(UnsignedColor::default())?;
        self.raytracer.miss_shader = Some(Box::new(|_| Payload::default()));

        let lights = self.lights.clone();
        self.raytracer.closest_hit_shader = Some(Box::new(
            move |context, rng, ray, mut payload, triangle, depth| {
                let position = ray.at(payload.t);
                let normal = triangle.normal_at(payload.bary);

                let mut result = triangle.emissive;

                // Direct lighting, shadow-tested against the second tracer.
                for light in &lights {
                    let to_light = light.position - position;
                    let distance = to_light.length();
                    if distance <= SHADOW_BIAS {
                        continue;
                    }
                    let shadow_ray = Ray::new(position + normal * SHADOW_BIAS, to_light);
                    if let Ok(false) =
                        shadow_raytracer.trace_occlusion(&shadow_ray, distance - SHADOW_BIAS)
                    {
                        result += triangle.diffuse
                            * light.intensity
                            * normal.dot(to_light / distance).max(0.0);
                    }
                }

                // Single-bounce Monte-Carlo term: a uniform random direction
                // flipped into the normal's hemisphere rather than resampled.
                let mut random_direction = Vec3::new(
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                );
                if normal.dot(random_direction) < 0.0 {
                    random_direction = -random_direction;
                }
                let bounce = Ray::new(position + normal * SHADOW_BIAS, random_direction);
                let next = context.trace_ray(&bounce, depth + 1, rng);
                result += triangle.diffuse
                    * next.color.to_float3()
                    * normal.dot(bounce.direction).max(0.0);

                payload.color = Color::from_float3(result);
                payload
            },
        ));

        self.raytracer.build_acceleration_structure()?;
        self.raytracer.set_seed(self.settings.sample_seed);

        let tan_half_fov = (self.camera.angle_of_view() * 0.5).tan();
        let start = Instant::now();
        self.raytracer.ray_generation(
            self.camera.position(),
            self.camera.direction(),
            self.camera.right() * tan_half_fov * self.camera.aspect_ratio(),
            self.camera.up() * tan_half_fov,
            self.settings.raytracing_depth,
            self.settings.accumulation_num,
        )?;
        info!(
            "Raytracing took {:.1} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        output::save_resource(self.raytracer.render_target()?, &self.settings.result_path)
    }
}
