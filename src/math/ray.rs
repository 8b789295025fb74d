use glam::Vec3;

/// A ray in world space. The constructor normalizes non-zero directions;
/// shading code relies on unit directions for cosine terms.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub position: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.position + self.direction * t
    }
}

/// Slab test: the (entry, exit) interval along the ray, or None when the ray
/// misses the box entirely. A negative entry means the origin is inside.
pub fn intersect_aabb(
    ray_origin: Vec3,
    ray_dir: Vec3,
    box_min: Vec3,
    box_max: Vec3,
) -> Option<(f32, f32)> {
    const EPSILON: f32 = 1e-8;

    // Clamp near-zero components so the reciprocal stays finite.
    let inv_dir = Vec3::new(
        if ray_dir.x.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.x) } else { 1.0 / ray_dir.x },
        if ray_dir.y.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.y) } else { 1.0 / ray_dir.y },
        if ray_dir.z.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.z) } else { 1.0 / ray_dir.z },
    );

    let t_min = (box_min - ray_origin) * inv_dir;
    let t_max = (box_max - ray_origin) * inv_dir;

    let t1 = t_min.min(t_max);
    let t2 = t_min.max(t_max);

    let t_near = t1.x.max(t1.y).max(t1.z);
    let t_far = t2.x.min(t2.y).min(t2.z);

    if t_near > t_far || t_far < 0.0 {
        return None;
    }

    Some((t_near, t_far))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert_eq!(ray.at(2.0), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_intersect_aabb_hit() {
        let (entry, exit) = intersect_aabb(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(5.0, -1.0, -1.0),
            Vec3::new(10.0, 1.0, 1.0),
        )
        .expect("ray should hit the box");
        assert!((entry - 5.0).abs() < 0.01);
        assert!((exit - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_intersect_aabb_miss() {
        let interval = intersect_aabb(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(5.0, 2.0, 2.0),
            Vec3::new(10.0, 3.0, 3.0),
        );
        assert!(interval.is_none());
    }

    #[test]
    fn test_intersect_aabb_from_inside_has_negative_entry() {
        let (entry, exit) = intersect_aabb(
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::X,
            Vec3::new(0.0, -1.0, -1.0),
            Vec3::new(10.0, 1.0, 1.0),
        )
        .expect("origin is inside the box");
        assert!(entry < 0.0);
        assert!((exit - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_intersect_aabb_pointing_away() {
        let interval = intersect_aabb(
            Vec3::ZERO,
            Vec3::NEG_X,
            Vec3::new(5.0, -1.0, -1.0),
            Vec3::new(10.0, 1.0, 1.0),
        );
        assert!(interval.is_none());
    }
}
