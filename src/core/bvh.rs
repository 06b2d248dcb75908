// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f, FLOAT_MAX};
use crate::math::ray::Ray3f;

const SAH_BUCKETS: usize = 12;
const DEFAULT_MAX_LEAF_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMethod {
    /// Median of the primitive centroids along the widest axis.
    Naive,
    /// Surface area heuristic over fixed buckets.
    Sah,
}

impl Default for SplitMethod {
    fn default() -> Self {
        SplitMethod::Sah
    }
}

#[derive(Clone)]
struct BVHNode {
    bounds: AABB,
    left: Option<usize>,
    right: Option<usize>,
    start: usize,
    count: usize,
}

impl BVHNode {
    fn leaf(bounds: AABB, start: usize, count: usize) -> Self {
        Self { bounds, left: None, right: None, start, count }
    }

    fn interior(bounds: AABB, left: usize, right: usize) -> Self {
        Self { bounds, left: Some(left), right: Some(right), start: 0, count: 0 }
    }

    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// Bounding volume hierarchy over opaque primitives.
///
/// Only bounds and centroids are stored; intersection is delegated to the
/// caller through a callback, so the same structure serves scene objects and
/// the triangles inside a mesh. Built once, read-only afterwards.
pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
    prim_bounds: Vec<AABB>,
    prim_centroids: Vec<Vector3f>,
    max_leaf_size: usize,
    split_method: SplitMethod,
}

impl BVH {
    pub fn new(prim_bounds: Vec<AABB>, prim_centroids: Vec<Vector3f>, split_method: SplitMethod) -> Self {
        Self::with_max_leaf_size(prim_bounds, prim_centroids, split_method, DEFAULT_MAX_LEAF_SIZE)
    }

    pub fn from_bounds(prim_bounds: Vec<AABB>, split_method: SplitMethod) -> Self {
        let prim_centroids = prim_bounds.iter().map(|b| b.center()).collect();
        Self::new(prim_bounds, prim_centroids, split_method)
    }

    pub fn with_max_leaf_size(
        prim_bounds: Vec<AABB>,
        prim_centroids: Vec<Vector3f>,
        split_method: SplitMethod,
        max_leaf_size: usize,
    ) -> Self {
        let mut bvh = Self {
            indices: (0..prim_bounds.len()).collect(),
            nodes: Vec::new(),
            prim_bounds,
            prim_centroids,
            max_leaf_size: max_leaf_size.max(1),
            split_method,
        };

        if !bvh.indices.is_empty() {
            let (bounds, centroid_bounds) = bvh.compute_bounds(0, bvh.indices.len());
            bvh.build(0, bvh.indices.len(), bounds, centroid_bounds);
        }

        bvh
    }

    pub fn bounds(&self) -> AABB {
        self.nodes.first().map(|n| n.bounds).unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }


    /// Closest hit reported by `hit_fn`, which returns the hit and its `t`.
    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        if self.nodes.is_empty() {
            return None;
        }

        let mut closest: Option<(usize, T)> = None;
        let mut closest_t = FLOAT_MAX;
        let mut stack = vec![0usize];

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            match node.bounds.ray_intersect_range(ray) {
                Some((t_enter, _)) if t_enter <= closest_t => {}
                _ => continue,
            }

            if node.is_leaf() {
                for i in 0..node.count {
                    let prim_idx = self.indices[node.start + i];
                    if let Some((hit, t)) = hit_fn(prim_idx, ray) {
                        if t < closest_t {
                            closest_t = t;
                            closest = Some((prim_idx, hit));
                        }
                    }
                }
            } else {
                if let Some(left) = node.left {
                    stack.push(left);
                }
                if let Some(right) = node.right {
                    stack.push(right);
                }
            }
        }

        closest
    }

    fn build(&mut self, start: usize, end: usize, bounds: AABB, centroid_bounds: AABB) -> usize {
        let count = end - start;
        if count <= self.max_leaf_size {
            return self.push_leaf(bounds, start, count);
        }

        let axis = centroid_bounds.max_extent() as usize;
        let axis_min = centroid_bounds.p_min[axis];
        let axis_max = centroid_bounds.p_max[axis];
        if (axis_max - axis_min).abs() < 1e-6 {
            // All centroids coincide; no split can separate them.
            return self.push_leaf(bounds, start, count);
        }

        let split_method = self.split_method;
        let mid = match split_method {
            SplitMethod::Naive => Some(self.partition_median(start, end, axis)),
            SplitMethod::Sah => self.partition_sah(start, end, axis, axis_min, axis_max, &bounds),
        };

        let mid = match mid {
            Some(mid) if mid > start && mid < end => mid,
            _ => return self.push_leaf(bounds, start, count),
        };

        let (left_bounds, left_centroids) = self.compute_bounds(start, mid);
        let (right_bounds, right_centroids) = self.compute_bounds(mid, end);
        let node_idx = self.nodes.len();
        self.nodes.push(BVHNode::leaf(bounds, 0, 0));
        let left = self.build(start, mid, left_bounds, left_centroids);
        let right = self.build(mid, end, right_bounds, right_centroids);
        self.nodes[node_idx] = BVHNode::interior(bounds, left, right);
        node_idx
    }

    fn push_leaf(&mut self, bounds: AABB, start: usize, count: usize) -> usize {
        let node_idx = self.nodes.len();
        self.nodes.push(BVHNode::leaf(bounds, start, count));
        node_idx
    }

    fn partition_median(&mut self, start: usize, end: usize, axis: usize) -> usize {
        let mid = start + (end - start) / 2;
        let centroids = &self.prim_centroids;
        self.indices[start..end].select_nth_unstable_by(mid - start, |a, b| {
            centroids[*a][axis]
                .partial_cmp(&centroids[*b][axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        mid
    }

    fn bucket_of(&self, prim_idx: usize, axis: usize, axis_min: Float, axis_max: Float) -> usize {
        let c = self.prim_centroids[prim_idx][axis];
        let b = ((c - axis_min) / (axis_max - axis_min) * SAH_BUCKETS as Float) as usize;
        b.min(SAH_BUCKETS - 1)
    }

    /// Returns `None` when a leaf is cheaper than any split.
    fn partition_sah(&mut self, start: usize, end: usize, axis: usize,
                     axis_min: Float, axis_max: Float, bounds: &AABB) -> Option<usize> {
        let mut buckets = vec![(0usize, AABB::default()); SAH_BUCKETS];
        for i in start..end {
            let idx = self.indices[i];
            let b = self.bucket_of(idx, axis, axis_min, axis_max);
            buckets[b].0 += 1;
            buckets[b].1.expand_by_aabb(&self.prim_bounds[idx]);
        }

        let area = bounds.surface_area().max(1e-6);
        let mut min_cost = FLOAT_MAX;
        let mut min_split = 0usize;
        for i in 0..(SAH_BUCKETS - 1) {
            let mut b0 = AABB::default();
            let mut b1 = AABB::default();
            let mut count0 = 0usize;
            let mut count1 = 0usize;
            for bucket in &buckets[..=i] {
                count0 += bucket.0;
                b0.expand_by_aabb(&bucket.1);
            }
            for bucket in &buckets[(i + 1)..] {
                count1 += bucket.0;
                b1.expand_by_aabb(&bucket.1);
            }
            let cost0 = (count0 as Float) * b0.surface_area();
            let cost1 = (count1 as Float) * b1.surface_area();
            let cost = 1.0 + (cost0 + cost1) / area;
            if cost < min_cost {
                min_cost = cost;
                min_split = i;
            }
        }

        let leaf_cost = (end - start) as Float;
        if min_cost >= leaf_cost {
            return None;
        }

        let mut mid = start;
        for i in start..end {
            let idx = self.indices[i];
            if self.bucket_of(idx, axis, axis_min, axis_max) <= min_split {
                self.indices.swap(i, mid);
                mid += 1;
            }
        }
        Some(mid)
    }

    fn compute_bounds(&self, start: usize, end: usize) -> (AABB, AABB) {
        let mut bounds = AABB::default();
        let mut centroid_bounds = AABB::default();
        for i in start..end {
            let idx = self.indices[i];
            bounds.expand_by_aabb(&self.prim_bounds[idx]);
            centroid_bounds.expand_by_point(&self.prim_centroids[idx]);
        }
        (bounds, centroid_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::{SplitMethod, BVH};
    use crate::core::shape::Shape;
    use crate::math::constants::{Float, Vector3f};
    use crate::math::ray::Ray3f;
    use crate::shapes::triangle::Triangle;

    fn build_triangles() -> Vec<Triangle> {
        let mut tris = Vec::new();
        for i in 0..32 {
            let x = (i % 8) as Float * 2.0;
            let z = -((i / 8) as Float);
            let p0 = Vector3f::new(x, 0.0, z);
            let p1 = Vector3f::new(x + 0.5, 0.0, z);
            let p2 = Vector3f::new(x, 0.5, z);
            tris.push(Triangle::new(p0, p1, p2));
        }
        tris
    }

    fn closest_t(bvh: &BVH, triangles: &[Triangle], ray: &Ray3f) -> Option<(usize, Float)> {
        bvh.ray_intersection(ray, |prim_idx, ray| {
            triangles[prim_idx].ray_intersection(ray).map(|h| (h.t(), h.t()))
        })
    }

    fn check_against_naive(split_method: SplitMethod) {
        let triangles = build_triangles();
        let prim_bounds = triangles.iter().map(|t| t.bounding_box()).collect();
        let bvh = BVH::from_bounds(prim_bounds, split_method);
        assert!(bvh.node_count() > 1);

        for i in 0..8 {
            let origin = Vector3f::new(i as Float * 2.0 + 0.1, 0.1, 1.0);
            let ray = Ray3f::new(origin, Vector3f::new(0.0, 0.0, -1.0), None, None);

            let (bvh_idx, bvh_t) = closest_t(&bvh, &triangles, &ray).expect("BVH miss");

            let mut naive: Option<(usize, Float)> = None;
            for (idx, tri) in triangles.iter().enumerate() {
                if let Some(hit) = tri.ray_intersection(&ray) {
                    if naive.map_or(true, |(_, cur)| hit.t() < cur) {
                        naive = Some((idx, hit.t()));
                    }
                }
            }

            let (naive_idx, naive_t) = naive.expect("Naive miss");
            assert_eq!(bvh_idx, naive_idx);
            assert!((bvh_t - naive_t).abs() < 1e-5);
            assert!((bvh_t - 1.0).abs() < 1e-5);
        }

        let miss_ray = Ray3f::new(Vector3f::new(100.0, 100.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(closest_t(&bvh, &triangles, &miss_ray).is_none());
    }

    #[test]
    fn test_sah_bvh_vs_naive_triangles() {
        check_against_naive(SplitMethod::Sah);
    }

    #[test]
    fn test_median_bvh_vs_naive_triangles() {
        check_against_naive(SplitMethod::Naive);
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = BVH::from_bounds(Vec::new(), SplitMethod::Naive);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit: Option<(usize, Float)> = bvh.ray_intersection(&ray, |_, _| Some((0.0, 0.0)));
        assert!(hit.is_none());
        assert!(!bvh.bounds().is_valid());
    }
}
