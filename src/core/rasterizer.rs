use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};

use crate::color::{Color, FromColor};
use crate::error::RenderError;
use crate::resource::Resource;
use crate::types::{Interpolate, MeshVertex};

/// Transforms a clip-space position and its vertex attributes; invoked once
/// per vertex per draw call.
pub type VertexShader<V> = Box<dyn Fn(Vec4, V) -> (Vec4, V) + Send + Sync>;

/// Computes the fragment color from interpolated attributes and depth;
/// invoked once per fragment that passes the depth test.
pub type PixelShader<V> = Box<dyn Fn(&V, f32) -> Color + Send + Sync>;

const W_EPSILON: f32 = 1e-6;

/// Scanline rasterization pipeline: viewport, owned color/depth targets,
/// bound mesh buffers and the two shader hooks.
///
/// The fragment loop is single-threaded per draw call; the depth-buffer
/// read-modify-write makes fragments order-dependent within one draw.
pub struct Rasterizer<V, C> {
    width: usize,
    height: usize,
    render_target: Option<Resource<C>>,
    depth_buffer: Option<Resource<f32>>,
    vertex_buffer: Option<Arc<Resource<V>>>,
    index_buffer: Option<Arc<Resource<u32>>>,
    pub vertex_shader: Option<VertexShader<V>>,
    pub pixel_shader: Option<PixelShader<V>>,
}

impl<V, C> Default for Rasterizer<V, C>
where
    V: MeshVertex + Interpolate,
    C: FromColor,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C> Rasterizer<V, C>
where
    V: MeshVertex + Interpolate,
    C: FromColor,
{
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            render_target: None,
            depth_buffer: None,
            vertex_buffer: None,
            index_buffer: None,
            vertex_shader: None,
            pixel_shader: None,
        }
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Hands the pipeline ownership of the frame-sized targets.
    pub fn set_render_target(&mut self, target: Resource<C>, depth: Resource<f32>) {
        self.render_target = Some(target);
        self.depth_buffer = Some(depth);
    }

    pub fn set_vertex_buffer(&mut self, buffer: Arc<Resource<V>>) {
        self.vertex_buffer = Some(buffer);
    }

    pub fn set_index_buffer(&mut self, buffer: Arc<Resource<u32>>) {
        self.index_buffer = Some(buffer);
    }

    pub fn render_target(&self) -> Result<&Resource<C>, RenderError> {
        self.render_target
            .as_ref()
            .ok_or(RenderError::Precondition("render target not set"))
    }

    pub fn depth_buffer(&self) -> Result<&Resource<f32>, RenderError> {
        self.depth_buffer
            .as_ref()
            .ok_or(RenderError::Precondition("depth buffer not set"))
    }

    /// Fills the color target and resets the depth buffer to the far-plane
    /// sentinel; the pipeline owns this reset, not the caller.
    pub fn clear_render_target(&mut self, color: C) -> Result<(), RenderError> {
        let target = self
            .render_target
            .as_mut()
            .ok_or(RenderError::Precondition("render target not set"))?;
        target.fill(color);

        let depth = self
            .depth_buffer
            .as_mut()
            .ok_or(RenderError::Precondition("depth buffer not set"))?;
        depth.fill(f32::MAX);
        Ok(())
    }

    /// Rasterizes `vertex_count / 3` triangles of consecutive indices
    /// starting at `start_index`.
    pub fn draw(&mut self, vertex_count: usize, start_index: usize) -> Result<(), RenderError> {
        let vertex_buffer = self
            .vertex_buffer
            .as_ref()
            .ok_or(RenderError::Precondition("vertex buffer not bound"))?;
        let index_buffer = self
            .index_buffer
            .as_ref()
            .ok_or(RenderError::Precondition("index buffer not bound"))?;
        let vertex_shader = self
            .vertex_shader
            .as_ref()
            .ok_or(RenderError::Precondition("vertex shader not set"))?;
        let pixel_shader = self
            .pixel_shader
            .as_ref()
            .ok_or(RenderError::Precondition("pixel shader not set"))?;
        let render_target = self
            .render_target
            .as_mut()
            .ok_or(RenderError::Precondition("render target not set"))?;
        let depth_buffer = self
            .depth_buffer
            .as_mut()
            .ok_or(RenderError::Precondition("depth buffer not set"))?;

        let (width, height) = (self.width, self.height);
        let color_data = render_target.data_mut();
        let depth_data = depth_buffer.data_mut();

        for triangle in 0..vertex_count / 3 {
            let base = start_index + triangle * 3;

            let mut screen = [Vec2::ZERO; 3];
            let mut depth = [0.0f32; 3];
            let mut inv_w = [0.0f32; 3];
            let mut attrs: [Option<V>; 3] = [None, None, None];

            for corner in 0..3 {
                let index = *index_buffer.item(base + corner)? as usize;
                let vertex = *vertex_buffer.item(index)?;

                let position = vertex.position();
                let (clip, data) =
                    vertex_shader(Vec4::new(position.x, position.y, position.z, 1.0), vertex);

                // Behind the eye; no near-plane clipping beyond this guard.
                if clip.w <= W_EPSILON {
                    break;
                }

                let w_recip = 1.0 / clip.w;
                let ndc = clip.truncate() * w_recip;
                screen[corner] = Vec2::new(
                    (ndc.x + 1.0) * 0.5 * width as f32,
                    (1.0 - ndc.y) * 0.5 * height as f32,
                );
                depth[corner] = ndc.z;
                inv_w[corner] = w_recip;
                attrs[corner] = Some(data);
            }
            // A discarded corner leaves a hole here and drops the triangle.
            let [Some(a0), Some(a1), Some(a2)] = attrs else {
                continue;
            };

            let [s0, s1, s2] = screen;
            let area = edge_function(s0, s1, s2);
            if !area.is_finite() || area.abs() < f32::EPSILON {
                // Degenerate triangle, recovered locally.
                continue;
            }
            let inv_area = 1.0 / area;

            let min = s0.min(s1).min(s2);
            let max = s0.max(s1).max(s2);

            // Sample points sit at pixel centers (x + 0.5, y + 0.5).
            let x_min = ((min.x - 0.5).ceil().max(0.0)) as usize;
            let y_min = ((min.y - 0.5).ceil().max(0.0)) as usize;
            let x_max = ((max.x - 0.5).floor()).min(width as f32 - 1.0);
            let y_max = ((max.y - 0.5).floor()).min(height as f32 - 1.0);
            if x_max < 0.0 || y_max < 0.0 {
                continue;
            }
            let (x_max, y_max) = (x_max as usize, y_max as usize);

            for y in y_min..=y_max {
                for x in x_min..=x_max {
                    let sample = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

                    // Signed ratios stay positive inside for either winding.
                    let bary = Vec3::new(
                        edge_function(s1, s2, sample) * inv_area,
                        edge_function(s2, s0, sample) * inv_area,
                        edge_function(s0, s1, sample) * inv_area,
                    );
                    if bary.min_element() < 0.0 {
                        continue;
                    }

                    // Depth is affine in screen space.
                    let fragment_depth = bary.dot(Vec3::from_array(depth));
                    if !fragment_depth.is_finite() {
                        continue;
                    }

                    let cell = y * width + x;
                    // Strictly closer wins; ties keep the existing fragment.
                    if fragment_depth >= depth_data[cell] {
                        continue;
                    }

                    // Perspective-correct attribute weights.
                    let q = bary * Vec3::from_array(inv_w);
                    let q_sum = q.element_sum();
                    if q_sum.abs() < f32::EPSILON {
                        continue;
                    }
                    let interpolated = V::interpolate(&a0, &a1, &a2, q / q_sum);

                    let color = pixel_shader(&interpolated, fragment_depth);
                    color_data[cell] = C::from_color(color);
                    depth_data[cell] = fragment_depth;
                }
            }
        }

        Ok(())
    }
}

fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_function_sign() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        assert!(edge_function(a, b, Vec2::new(0.5, 1.0)) > 0.0);
        assert!(edge_function(a, b, Vec2::new(0.5, -1.0)) < 0.0);
        assert_eq!(edge_function(a, b, Vec2::new(0.5, 0.0)), 0.0);
    }
}
