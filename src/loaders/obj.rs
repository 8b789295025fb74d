use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Mat4, Vec2, Vec3};
use log::{info, warn};

use crate::resource::Resource;
use crate::types::Vertex;

/// One mesh shape: immutable vertex and index buffers shared with the
/// pipelines.
pub struct Shape {
    pub vertex_buffer: Arc<Resource<Vertex>>,
    pub index_buffer: Arc<Resource<u32>>,
}

/// A loaded model: per-shape buffers plus the model-to-world transform.
pub struct Model {
    shapes: Vec<Shape>,
    world: Mat4,
}

impl Model {
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn vertex_buffers(&self) -> Vec<Arc<Resource<Vertex>>> {
        self.shapes
            .iter()
            .map(|s| Arc::clone(&s.vertex_buffer))
            .collect()
    }

    pub fn index_buffers(&self) -> Vec<Arc<Resource<u32>>> {
        self.shapes
            .iter()
            .map(|s| Arc::clone(&s.index_buffer))
            .collect()
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }
}

/// Loads an OBJ file (with its MTL library) into per-shape buffers.
/// Vertex ambient/diffuse come from the material, emissive from its `Ke`
/// line; missing normals fall back to area-weighted face normals.
pub fn load_obj(path: &Path) -> Result<Model> {
    let (models, materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
        .with_context(|| format!("Failed to load OBJ file {:?}", path))?;

    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            warn!("No usable material library for {:?}: {}", path, e);
            Vec::new()
        }
    };

    let mut shapes = Vec::with_capacity(models.len());
    for model in &models {
        let mesh = &model.mesh;
        let vertex_count = mesh.positions.len() / 3;

        let (ambient, diffuse, emissive) = mesh
            .material_id
            .and_then(|id| materials.get(id))
            .map(material_colors)
            .unwrap_or((Vec3::splat(0.1), Vec3::splat(0.8), Vec3::ZERO));

        let normals = if mesh.normals.is_empty() {
            face_normals(&mesh.positions, &mesh.indices)
        } else {
            mesh.normals
                .chunks_exact(3)
                .map(|n| Vec3::new(n[0], n[1], n[2]))
                .collect()
        };

        let mut vertices = Vec::with_capacity(vertex_count);
        for i in 0..vertex_count {
            let position = Vec3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            );
            let uv = if mesh.texcoords.len() >= (i + 1) * 2 {
                Vec2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
            } else {
                Vec2::ZERO
            };
            vertices.push(Vertex {
                position,
                normal: normals.get(i).copied().unwrap_or(Vec3::Y),
                uv,
                ambient,
                diffuse,
                emissive,
            });
        }

        info!(
            "Shape {:?}: {} vertices, {} indices",
            model.name,
            vertices.len(),
            mesh.indices.len()
        );

        shapes.push(Shape {
            vertex_buffer: Arc::new(Resource::from_vec(vertices)),
            index_buffer: Arc::new(Resource::from_vec(mesh.indices.clone())),
        });
    }

    info!("Loaded {:?}: {} shapes", path, shapes.len());

    Ok(Model {
        shapes,
        world: Mat4::IDENTITY,
    })
}

fn material_colors(material: &tobj::Material) -> (Vec3, Vec3, Vec3) {
    let ambient = material
        .ambient
        .map(Vec3::from_array)
        .unwrap_or(Vec3::splat(0.1));
    let diffuse = material
        .diffuse
        .map(Vec3::from_array)
        .unwrap_or(Vec3::splat(0.8));
    // tobj has no emissive field; Ke survives in the unknown parameters.
    let emissive = material
        .unknown_param
        .get("Ke")
        .map(|value| {
            let mut channels = value.split_whitespace().filter_map(|c| c.parse::<f32>().ok());
            Vec3::new(
                channels.next().unwrap_or(0.0),
                channels.next().unwrap_or(0.0),
                channels.next().unwrap_or(0.0),
            )
        })
        .unwrap_or(Vec3::ZERO);
    (ambient, diffuse, emissive)
}

/// Area-weighted per-vertex normals computed from the triangle faces.
fn face_normals(positions: &[f32], indices: &[u32]) -> Vec<Vec3> {
    let vertex_count = positions.len() / 3;
    let position = |i: usize| {
        Vec3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2])
    };

    let mut normals = vec![Vec3::ZERO; vertex_count];
    for face in indices.chunks_exact(3) {
        let (i0, i1, i2) = (face[0] as usize, face[1] as usize, face[2] as usize);
        let face_normal = (position(i1) - position(i0)).cross(position(i2) - position(i0));
        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }

    for normal in &mut normals {
        *normal = normal.normalize_or(Vec3::Y);
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_normals_flat_quad() {
        // Two triangles in the z = 0 plane, counter-clockwise.
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ];
        let indices = [0, 1, 2, 0, 2, 3];

        let normals = face_normals(&positions, &indices);
        assert_eq!(normals.len(), 4);
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-6);
        }
    }
}
