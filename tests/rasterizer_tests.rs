use std::sync::Arc;

use glam::{Vec3, Vec4};
use scanray::color::Color;
use scanray::core::Rasterizer;
use scanray::error::RenderError;
use scanray::resource::Resource;
use scanray::types::Vertex;

fn ndc_vertex(x: f32, y: f32, z: f32) -> Vertex {
    Vertex {
        position: Vec3::new(x, y, z),
        normal: Vec3::Z,
        diffuse: Vec3::ONE,
        ..Default::default()
    }
}

/// Pipeline with a passthrough vertex shader and a pixel shader returning
/// the interpolated diffuse color; positions double as clip coordinates.
fn pipeline(width: usize, height: usize) -> Rasterizer<Vertex, Color> {
    let mut rasterizer = Rasterizer::new();
    rasterizer.set_viewport(width, height);
    rasterizer.set_render_target(
        Resource::new_2d(width, height),
        Resource::new_2d(width, height),
    );
    rasterizer.vertex_shader = Some(Box::new(|position: Vec4, vertex: Vertex| (position, vertex)));
    rasterizer.pixel_shader = Some(Box::new(|vertex, _| Color::from_float3(vertex.diffuse)));
    rasterizer
}

fn bind_triangle(rasterizer: &mut Rasterizer<Vertex, Color>, vertices: Vec<Vertex>) {
    let indices: Vec<u32> = (0..vertices.len() as u32).collect();
    rasterizer.set_vertex_buffer(Arc::new(Resource::from_vec(vertices)));
    rasterizer.set_index_buffer(Arc::new(Resource::from_vec(indices)));
}

#[cfg(test)]
mod coverage_tests {
    use super::*;

    #[test]
    fn test_inset_triangle_covers_exactly_the_inside_samples() {
        let mut rasterizer = pipeline(4, 4);
        bind_triangle(
            &mut rasterizer,
            vec![
                ndc_vertex(-0.5, -0.5, 0.0),
                ndc_vertex(0.5, -0.5, 0.0),
                ndc_vertex(0.0, 0.5, 0.0),
            ],
        );

        rasterizer.clear_render_target(Color::BLACK).unwrap();
        rasterizer.draw(3, 0).unwrap();

        // Pixel centers sit at NDC (+-0.25, +-0.75); only (+-0.25, -0.25)
        // fall inside this triangle, which is row 2, columns 1 and 2.
        let target = rasterizer.render_target().unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let shaded = target.item_2d(x, y).unwrap().to_float3().length() > 0.0;
                let expected = y == 2 && (x == 1 || x == 2);
                assert_eq!(shaded, expected, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_covered_fragment_depth_is_interpolated() {
        let mut rasterizer = pipeline(4, 4);
        bind_triangle(
            &mut rasterizer,
            vec![
                ndc_vertex(-0.5, -0.5, 0.2),
                ndc_vertex(0.5, -0.5, 0.2),
                ndc_vertex(0.0, 0.5, 0.2),
            ],
        );

        rasterizer.clear_render_target(Color::BLACK).unwrap();
        rasterizer.draw(3, 0).unwrap();

        let depth = rasterizer.depth_buffer().unwrap();
        assert!((depth.item_2d(1, 2).unwrap() - 0.2).abs() < 1e-5);
        assert!((depth.item_2d(2, 2).unwrap() - 0.2).abs() < 1e-5);
        assert_eq!(*depth.item_2d(0, 0).unwrap(), f32::MAX);
    }

    #[test]
    fn test_offscreen_triangle_shades_nothing() {
        let mut rasterizer = pipeline(4, 4);
        bind_triangle(
            &mut rasterizer,
            vec![
                ndc_vertex(2.0, 2.0, 0.0),
                ndc_vertex(3.0, 2.0, 0.0),
                ndc_vertex(2.5, 3.0, 0.0),
            ],
        );

        rasterizer.clear_render_target(Color::BLACK).unwrap();
        rasterizer.draw(3, 0).unwrap();

        let target = rasterizer.render_target().unwrap();
        assert!(target.data().iter().all(|c| *c == Color::BLACK));
    }

    #[test]
    fn test_degenerate_triangle_is_skipped() {
        let mut rasterizer = pipeline(4, 4);
        bind_triangle(
            &mut rasterizer,
            vec![
                ndc_vertex(-0.5, 0.0, 0.0),
                ndc_vertex(0.0, 0.0, 0.0),
                ndc_vertex(0.5, 0.0, 0.0),
            ],
        );

        rasterizer.clear_render_target(Color::BLACK).unwrap();
        rasterizer.draw(3, 0).unwrap();

        let target = rasterizer.render_target().unwrap();
        assert!(target.data().iter().all(|c| *c == Color::BLACK));
    }
}

#[cfg(test)]
mod interpolation_tests {
    use super::*;

    /// 3x3 viewport: the center pixel samples NDC (0, 0) exactly, where the
    /// triangle below has barycentric weights (0.25, 0.25, 0.5).
    fn center_weight_triangle() -> Vec<Vertex> {
        vec![
            ndc_vertex(-1.0, -1.0, 0.1),
            ndc_vertex(1.0, -1.0, 0.3),
            ndc_vertex(0.0, 1.0, 0.5),
        ]
    }

    #[test]
    fn test_affine_attribute_interpolation_with_uniform_w() {
        let mut rasterizer = pipeline(3, 3);
        let mut vertices = center_weight_triangle();
        vertices[0].diffuse = Vec3::X;
        vertices[1].diffuse = Vec3::ZERO;
        vertices[2].diffuse = Vec3::ZERO;
        bind_triangle(&mut rasterizer, vertices);

        rasterizer.clear_render_target(Color::BLACK).unwrap();
        rasterizer.draw(3, 0).unwrap();

        let center = rasterizer.render_target().unwrap().item_2d(1, 1).unwrap().r;
        assert!((center - 0.25).abs() < 1e-4, "affine weight, got {}", center);
    }

    #[test]
    fn test_perspective_correct_attribute_interpolation() {
        let mut rasterizer = pipeline(3, 3);
        let mut vertices = center_weight_triangle();
        vertices[0].diffuse = Vec3::X;
        vertices[1].diffuse = Vec3::ZERO;
        vertices[2].diffuse = Vec3::ZERO;
        // Encode a per-vertex w in uv.x: 1, 1, 2.
        vertices[0].uv.x = 1.0;
        vertices[1].uv.x = 1.0;
        vertices[2].uv.x = 2.0;
        bind_triangle(&mut rasterizer, vertices);

        // Multiply through by w so the NDC positions stay unchanged while
        // 1/w varies across the triangle.
        rasterizer.vertex_shader = Some(Box::new(|position: Vec4, vertex: Vertex| {
            let w = vertex.uv.x;
            (
                Vec4::new(position.x * w, position.y * w, position.z * w, w),
                vertex,
            )
        }));

        rasterizer.clear_render_target(Color::BLACK).unwrap();
        rasterizer.draw(3, 0).unwrap();

        // q = (0.25/1, 0.25/1, 0.5/2) normalized = (1/3, 1/3, 1/3):
        // the perspective-correct value is 1/3, not the affine 0.25.
        let center = rasterizer.render_target().unwrap().item_2d(1, 1).unwrap().r;
        assert!(
            (center - 1.0 / 3.0).abs() < 1e-4,
            "perspective-correct weight, got {}",
            center
        );
    }

    #[test]
    fn test_depth_interpolates_ndc_z() {
        let mut rasterizer = pipeline(3, 3);
        bind_triangle(&mut rasterizer, center_weight_triangle());

        rasterizer.clear_render_target(Color::BLACK).unwrap();
        rasterizer.draw(3, 0).unwrap();

        let expected = 0.25 * 0.1 + 0.25 * 0.3 + 0.5 * 0.5;
        let depth = *rasterizer.depth_buffer().unwrap().item_2d(1, 1).unwrap();
        assert!((depth - expected).abs() < 1e-5, "depth {}", depth);
    }
}

#[cfg(test)]
mod depth_test_tests {
    use super::*;

    #[test]
    fn test_redrawing_identical_triangle_changes_nothing() {
        let mut rasterizer = pipeline(4, 4);
        bind_triangle(
            &mut rasterizer,
            vec![
                ndc_vertex(-0.5, -0.5, 0.2),
                ndc_vertex(0.5, -0.5, 0.4),
                ndc_vertex(0.0, 0.5, 0.6),
            ],
        );

        rasterizer.clear_render_target(Color::BLACK).unwrap();
        rasterizer.draw(3, 0).unwrap();

        let colors_before = rasterizer.render_target().unwrap().data().to_vec();
        let depths_before = rasterizer.depth_buffer().unwrap().data().to_vec();

        rasterizer.draw(3, 0).unwrap();

        assert_eq!(rasterizer.render_target().unwrap().data(), &colors_before[..]);
        assert_eq!(rasterizer.depth_buffer().unwrap().data(), &depths_before[..]);
    }

    #[test]
    fn test_closer_fragment_wins_either_draw_order() {
        for near_first in [false, true] {
            let mut rasterizer = pipeline(4, 4);

            let mut near = vec![
                ndc_vertex(-0.5, -0.5, 0.2),
                ndc_vertex(0.5, -0.5, 0.2),
                ndc_vertex(0.0, 0.5, 0.2),
            ];
            for v in &mut near {
                v.diffuse = Vec3::X;
            }
            let mut far = vec![
                ndc_vertex(-0.5, -0.5, 0.8),
                ndc_vertex(0.5, -0.5, 0.8),
                ndc_vertex(0.0, 0.5, 0.8),
            ];
            for v in &mut far {
                v.diffuse = Vec3::Y;
            }

            let (first, second) = if near_first { (near, far) } else { (far, near) };

            rasterizer.clear_render_target(Color::BLACK).unwrap();
            bind_triangle(&mut rasterizer, first);
            rasterizer.draw(3, 0).unwrap();
            bind_triangle(&mut rasterizer, second);
            rasterizer.draw(3, 0).unwrap();

            let center = *rasterizer.render_target().unwrap().item_2d(1, 2).unwrap();
            assert!(
                (center.to_float3() - Vec3::X).length() < 1e-5,
                "near triangle must win (near_first = {}), got {:?}",
                near_first,
                center
            );
        }
    }
}

#[cfg(test)]
mod precondition_tests {
    use super::*;

    #[test]
    fn test_draw_without_buffers_fails() {
        let mut rasterizer: Rasterizer<Vertex, Color> = Rasterizer::new();
        rasterizer.set_viewport(4, 4);
        rasterizer.set_render_target(Resource::new_2d(4, 4), Resource::new_2d(4, 4));
        rasterizer.vertex_shader = Some(Box::new(|p, v| (p, v)));
        rasterizer.pixel_shader = Some(Box::new(|_, _| Color::BLACK));

        assert!(matches!(
            rasterizer.draw(3, 0),
            Err(RenderError::Precondition(_))
        ));
    }

    #[test]
    fn test_draw_without_render_target_fails() {
        let mut rasterizer: Rasterizer<Vertex, Color> = Rasterizer::new();
        rasterizer.set_viewport(4, 4);
        rasterizer.vertex_shader = Some(Box::new(|p, v| (p, v)));
        rasterizer.pixel_shader = Some(Box::new(|_, _| Color::BLACK));
        bind_triangle(
            &mut rasterizer,
            vec![
                ndc_vertex(-0.5, -0.5, 0.0),
                ndc_vertex(0.5, -0.5, 0.0),
                ndc_vertex(0.0, 0.5, 0.0),
            ],
        );

        assert!(matches!(
            rasterizer.draw(3, 0),
            Err(RenderError::Precondition(_))
        ));
    }

    #[test]
    fn test_clear_without_target_fails() {
        let mut rasterizer: Rasterizer<Vertex, Color> = Rasterizer::new();
        assert!(rasterizer.clear_render_target(Color::BLACK).is_err());
    }
}

#[cfg(test)]
mod lighting_tests {
    use super::*;

    /// A white-diffuse triangle lit from above its centroid: interior pixels
    /// shade non-black, the viewport border stays black.
    #[test]
    fn test_lit_triangle_interior_bright_border_black() {
        let mut rasterizer = pipeline(4, 4);
        bind_triangle(
            &mut rasterizer,
            vec![
                ndc_vertex(-0.5, -0.5, 0.0),
                ndc_vertex(0.5, -0.5, 0.0),
                ndc_vertex(0.0, 0.5, 0.0),
            ],
        );

        let light_position = Vec3::new(0.0, -1.0 / 6.0, 1.0);
        rasterizer.pixel_shader = Some(Box::new(move |vertex, _| {
            let to_light = (light_position - vertex.position).normalize();
            let intensity = vertex.normal.normalize().dot(to_light).max(0.0);
            Color::from_float3(vertex.diffuse * intensity)
        }));

        rasterizer.clear_render_target(Color::BLACK).unwrap();
        rasterizer.draw(3, 0).unwrap();

        let target = rasterizer.render_target().unwrap();
        assert!(
            target.item_2d(1, 2).unwrap().to_float3().length() > 0.1,
            "interior pixel must be lit"
        );
        for i in 0..4 {
            for (x, y) in [(i, 0), (i, 3), (0, i), (3, i)] {
                assert_eq!(
                    *target.item_2d(x, y).unwrap(),
                    Color::BLACK,
                    "border pixel ({}, {})",
                    x,
                    y
                );
            }
        }
    }
}
