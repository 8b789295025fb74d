use crate::math::AABB;
use glam::Vec3;

/// Maximum primitives per leaf node before splitting
const MAX_LEAF_SIZE: usize = 4;

/// Number of SAH buckets for binned building
const SAH_BUCKETS: usize = 12;

/// BVH node over triangle primitives, built once per frame and read-only
/// while tracing.
#[derive(Clone, Debug)]
pub enum BVHNode {
    Leaf {
        bounds: AABB,
        primitive_indices: Vec<u32>,
    },
    Internal {
        bounds: AABB,
        left: Box<BVHNode>,
        right: Box<BVHNode>,
    },
}

/// Primitive trait for objects that can be inserted into the BVH
pub trait BVHPrimitive {
    fn bounds(&self) -> AABB;
    fn centroid(&self) -> Vec3 {
        self.bounds().center()
    }
}

/// BVH build statistics for logging and tests
#[derive(Debug, Clone, Copy)]
pub struct BVHStats {
    pub num_nodes: usize,
    pub num_leaves: usize,
    pub max_depth: usize,
    pub total_primitives: usize,
    pub avg_leaf_size: f32,
}

impl BVHNode {
    /// Build a BVH using binned SAH splits. Panics on an empty slice; the
    /// pipeline represents an empty scene as the absence of a root node.
    pub fn build<P: BVHPrimitive>(primitives: &[P]) -> Self {
        assert!(!primitives.is_empty(), "BVH build needs at least one primitive");
        let indices: Vec<u32> = (0..primitives.len() as u32).collect();
        Self::build_recursive(primitives, indices, 0)
    }

    fn build_recursive<P: BVHPrimitive>(
        primitives: &[P],
        mut indices: Vec<u32>,
        depth: usize,
    ) -> Self {
        let bounds = indices.iter().fold(
            primitives[indices[0] as usize].bounds(),
            |acc, &idx| acc.union(&primitives[idx as usize].bounds()),
        );

        if indices.len() <= MAX_LEAF_SIZE {
            return BVHNode::Leaf {
                bounds,
                primitive_indices: indices,
            };
        }

        let (split_axis, split_pos) = Self::find_best_split(primitives, &indices, &bounds);

        let mid = Self::partition_primitives(primitives, &mut indices, split_axis, split_pos);

        // Partition failed (all centroids on one side): keep a fat leaf.
        if mid == 0 || mid == indices.len() {
            return BVHNode::Leaf {
                bounds,
                primitive_indices: indices,
            };
        }

        let right_indices = indices.split_off(mid);
        let left = Box::new(Self::build_recursive(primitives, indices, depth + 1));
        let right = Box::new(Self::build_recursive(primitives, right_indices, depth + 1));

        BVHNode::Internal {
            bounds,
            left,
            right,
        }
    }

    /// Find best split using binned SAH
    fn find_best_split<P: BVHPrimitive>(
        primitives: &[P],
        indices: &[u32],
        bounds: &AABB,
    ) -> (usize, f32) {
        let mut best_cost = f32::INFINITY;
        let mut best_axis = 0;
        let mut best_pos = 0.0;

        for axis in 0..3 {
            let (cost, pos) = Self::evaluate_sah_axis(primitives, indices, bounds, axis);
            if cost < best_cost {
                best_cost = cost;
                best_axis = axis;
                best_pos = pos;
            }
        }

        (best_axis, best_pos)
    }

    /// Evaluate SAH cost for a given axis using binning
    fn evaluate_sah_axis<P: BVHPrimitive>(
        primitives: &[P],
        indices: &[u32],
        bounds: &AABB,
        axis: usize,
    ) -> (f32, f32) {
        let mut bucket_bounds: Vec<Option<AABB>> = vec![None; SAH_BUCKETS];
        let mut bucket_counts = vec![0; SAH_BUCKETS];

        let extent = bounds.max - bounds.min;
        let axis_extent = extent[axis];

        if axis_extent < 1e-6 {
            return (f32::INFINITY, 0.0);
        }

        for &idx in indices {
            let centroid = primitives[idx as usize].centroid();
            let offset = (centroid[axis] - bounds.min[axis]) / axis_extent;
            let bucket_idx = ((offset * SAH_BUCKETS as f32) as usize).min(SAH_BUCKETS - 1);

            bucket_counts[bucket_idx] += 1;
            let prim_bounds = primitives[idx as usize].bounds();
            bucket_bounds[bucket_idx] = Some(match bucket_bounds[bucket_idx] {
                Some(b) => b.union(&prim_bounds),
                None => prim_bounds,
            });
        }

        let mut best_cost = f32::INFINITY;
        let mut best_split = 0;

        for split in 1..SAH_BUCKETS {
            let (left_bounds, left_count) =
                Self::accumulate_buckets(&bucket_bounds, &bucket_counts, 0, split);
            let (right_bounds, right_count) =
                Self::accumulate_buckets(&bucket_bounds, &bucket_counts, split, SAH_BUCKETS);

            if let (Some(lb), Some(rb)) = (left_bounds, right_bounds) {
                let cost = Self::sah_cost(
                    lb.surface_area(),
                    left_count,
                    rb.surface_area(),
                    right_count,
                );

                if cost < best_cost {
                    best_cost = cost;
                    best_split = split;
                }
            }
        }

        let split_pos = bounds.min[axis] + (best_split as f32 / SAH_BUCKETS as f32) * axis_extent;

        (best_cost, split_pos)
    }

    fn accumulate_buckets(
        bucket_bounds: &[Option<AABB>],
        bucket_counts: &[usize],
        start: usize,
        end: usize,
    ) -> (Option<AABB>, usize) {
        let mut combined_bounds: Option<AABB> = None;
        let mut total_count = 0;

        for i in start..end {
            if let Some(bounds) = bucket_bounds[i] {
                combined_bounds = Some(match combined_bounds {
                    Some(b) => b.union(&bounds),
                    None => bounds,
                });
                total_count += bucket_counts[i];
            }
        }

        (combined_bounds, total_count)
    }

    /// SAH cost function
    fn sah_cost(left_area: f32, left_count: usize, right_area: f32, right_count: usize) -> f32 {
        const TRAVERSAL_COST: f32 = 0.125;
        const INTERSECTION_COST: f32 = 1.0;

        TRAVERSAL_COST
            + INTERSECTION_COST * (left_area * left_count as f32 + right_area * right_count as f32)
    }

    /// Partition primitives along axis at split position
    fn partition_primitives<P: BVHPrimitive>(
        primitives: &[P],
        indices: &mut [u32],
        axis: usize,
        split_pos: f32,
    ) -> usize {
        let mut left = 0;
        let mut right = indices.len();

        while left < right {
            let centroid = primitives[indices[left] as usize].centroid();
            if centroid[axis] < split_pos {
                left += 1;
            } else {
                right -= 1;
                indices.swap(left, right);
            }
        }

        left
    }

    /// Get bounding box for this node
    pub fn bounds(&self) -> &AABB {
        match self {
            BVHNode::Leaf { bounds, .. } => bounds,
            BVHNode::Internal { bounds, .. } => bounds,
        }
    }

    /// Gather statistics about the BVH
    pub fn stats(&self) -> BVHStats {
        let mut stats = BVHStats {
            num_nodes: 0,
            num_leaves: 0,
            max_depth: 0,
            total_primitives: 0,
            avg_leaf_size: 0.0,
        };

        self.gather_stats(&mut stats, 0);

        if stats.num_leaves > 0 {
            stats.avg_leaf_size = stats.total_primitives as f32 / stats.num_leaves as f32;
        }

        stats
    }

    fn gather_stats(&self, stats: &mut BVHStats, depth: usize) {
        stats.num_nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);

        match self {
            BVHNode::Leaf {
                primitive_indices, ..
            } => {
                stats.num_leaves += 1;
                stats.total_primitives += primitive_indices.len();
            }
            BVHNode::Internal { left, right, .. } => {
                left.gather_stats(stats, depth + 1);
                right.gather_stats(stats, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestPrimitive {
        bounds: AABB,
    }

    impl BVHPrimitive for TestPrimitive {
        fn bounds(&self) -> AABB {
            self.bounds
        }
    }

    fn unit_box_at(x: f32) -> TestPrimitive {
        TestPrimitive {
            bounds: AABB::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0)),
        }
    }

    #[test]
    fn test_bvh_single_primitive() {
        let prims = vec![unit_box_at(0.0)];

        let bvh = BVHNode::build(&prims);
        match bvh {
            BVHNode::Leaf {
                primitive_indices, ..
            } => {
                assert_eq!(primitive_indices.len(), 1);
                assert_eq!(primitive_indices[0], 0);
            }
            _ => panic!("Expected leaf node"),
        }
    }

    #[test]
    fn test_bvh_splits_above_leaf_size() {
        let prims: Vec<_> = (0..5).map(|i| unit_box_at(i as f32 * 10.0)).collect();

        match BVHNode::build(&prims) {
            BVHNode::Internal { .. } => {}
            BVHNode::Leaf { .. } => panic!("Expected internal node for 5 primitives"),
        }
    }

    #[test]
    fn test_bvh_stats() {
        let prims: Vec<_> = (0..10).map(|i| unit_box_at(i as f32 * 10.0)).collect();

        let stats = BVHNode::build(&prims).stats();

        assert_eq!(stats.total_primitives, 10);
        assert!(stats.num_leaves > 0);
        assert!(stats.max_depth > 0);
        assert!(stats.avg_leaf_size > 0.0);
    }

    #[test]
    fn test_bounds_union_in_build() {
        let prims = vec![
            TestPrimitive {
                bounds: AABB::new(Vec3::splat(-5.0), Vec3::ZERO),
            },
            TestPrimitive {
                bounds: AABB::new(Vec3::ZERO, Vec3::splat(5.0)),
            },
        ];

        let bvh = BVHNode::build(&prims);
        let bounds = bvh.bounds();

        assert_eq!(bounds.min, Vec3::splat(-5.0));
        assert_eq!(bounds.max, Vec3::splat(5.0));
    }
}
