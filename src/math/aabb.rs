use glam::Vec3;

#[derive(Copy, Clone, Debug)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all the given points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = AABB::new(Vec3::splat(f32::MAX), Vec3::splat(f32::MIN));
        for &p in points {
            aabb = aabb.grow(p);
        }
        aabb
    }

    pub fn grow(&self, point: Vec3) -> AABB {
        AABB {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn surface_area(&self) -> f32 {
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_center() {
        let aabb = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_aabb_surface_area_unit_cube() {
        let aabb = AABB::new(Vec3::ZERO, Vec3::ONE);
        assert!((aabb.surface_area() - 6.0).abs() < 0.01);
    }

    #[test]
    fn test_aabb_union() {
        let a = AABB::new(Vec3::ZERO, Vec3::ONE);
        let b = AABB::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));
        let union = a.union(&b);
        assert_eq!(union.min, Vec3::ZERO);
        assert_eq!(union.max, Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = AABB::from_points(&[
            Vec3::new(-1.0, 2.0, 0.0),
            Vec3::new(3.0, -2.0, 1.0),
            Vec3::new(0.0, 0.0, 5.0),
        ]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 2.0, 5.0));
    }
}
