// Copyright 2020 @TwoCookingMice

use super::constants::{ Int, Float, Vector3f,
                       FLOAT_MIN, FLOAT_MAX };
use super::ray::Ray3f;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f
}

impl Default for AABB {
    // An empty box: expanding it by anything yields that thing's bounds.
    fn default() -> Self {
        Self { p_min: Vector3f::new(FLOAT_MAX, FLOAT_MAX, FLOAT_MAX),
               p_max: Vector3f::new(FLOAT_MIN, FLOAT_MIN, FLOAT_MIN) }
    }
}

impl AABB {
    pub fn new(p_min: Vector3f, p_max: Vector3f) -> Self {
        Self { p_min: p_min.inf(&p_max), p_max: p_max.sup(&p_min) }
    }

    pub fn from_points(points: &[Vector3f]) -> Self {
        let mut bound = AABB::default();
        for p in points {
            bound.expand_by_point(p);
        }
        bound
    }

    pub fn center(&self) -> Vector3f {
        0.5 * self.p_min + 0.5 * self.p_max
    }

    pub fn expand_by_point(&mut self, p: &Vector3f) {
        self.p_min = self.p_min.inf(p);
        self.p_max = self.p_max.sup(p);
    }

    pub fn expand_by_aabb(&mut self, other: &AABB) {
        self.p_min = self.p_min.inf(&other.p_min);
        self.p_max = self.p_max.sup(&other.p_max);
    }

    /// Slab test. Returns the parametric overlap of the ray segment with the box.
    pub fn ray_intersect_range(&self, ray: &Ray3f) -> Option<(Float, Float)> {
        if !self.is_valid() {
            return None;
        }

        let o = ray.origin();
        let d = ray.dir();
        let mut t_min = ray.min_t;
        let mut t_max = ray.max_t;

        for idx in 0..3 {
            let dir = d[idx];
            if dir.abs() < 1e-8 {
                if o[idx] < self.p_min[idx] || o[idx] > self.p_max[idx] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t0 = (self.p_min[idx] - o[idx]) * inv;
            let mut t1 = (self.p_max[idx] - o[idx]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }

        Some((t_min, t_max))
    }

    pub fn ray_intersect(&self, ray: &Ray3f) -> bool {
        self.ray_intersect_range(ray).is_some()
    }

    pub fn surface_area(&self) -> Float {
        if !self.is_valid() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn max_extent(&self) -> Int {
        let diagonal = self.diagonal();
        if diagonal[0] > diagonal[1] && diagonal[0] > diagonal[2] {
            0
        } else if diagonal[1] > diagonal[2] {
            1
        } else {
            2
        }
    }

    pub fn is_valid(&self) -> bool {
        (0..3).all(|idx| self.p_min[idx] <= self.p_max[idx])
    }
}

/* Test for AABB */
