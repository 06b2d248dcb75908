// Copyright @yucwang 2023


use crate::core::computation_node::ComputationNode;
use crate::core::shape::Shape;
use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_triangle;

/// Determinants below this are treated as a ray parallel to the triangle.
const PARALLEL_EPSILON: Float = 1e-8;

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f
}

impl ComputationNode for Triangle {
    fn to_string(&self) -> String {
        format!("Triangle: {{ {:?}, {:?}, {:?} }}",
                self.p0.as_slice(), self.p1.as_slice(), self.p2.as_slice())
    }
}

impl Shape for Triangle {
    fn bounding_box(&self) -> AABB {
        AABB::from_points(&[self.p0, self.p1, self.p2])
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (t, b1, b2) = self.intersect(ray)?;
        let p = ray.at(t);
        let uv = Vector2f::new(b1, b2);
        Some(SurfaceIntersection::new(p, self.geometric_normal(), uv, t))
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let bary = square_to_triangle(u);
        let p = self.p0 * bary.x + self.p1 * bary.y + self.p2 * bary.z;
        let interaction = SurfaceIntersection::new(p, self.geometric_normal(), bary.yz(), 0.0);

        SurfaceSampleRecord::new(interaction, 1.0 / self.surface_area())
    }

    fn surface_area(&self) -> Float {
        0.5 * ((self.p1 - self.p0).cross(&(self.p2 - self.p0))).norm()
    }
}

impl Triangle {
    pub fn new(new_p0: Vector3f, new_p1: Vector3f, new_p2: Vector3f) -> Self {
        Triangle {
            p0: new_p0,
            p1: new_p1,
            p2: new_p2,
        }
    }

    /// Möller–Trumbore. Returns `(t, b1, b2)` where the hit point is
    /// `(1 - b1 - b2) p0 + b1 p1 + b2 p2`.
    pub fn intersect(&self, ray: &Ray3f) -> Option<(Float, Float, Float)> {
        let e1 = self.p1 - self.p0;
        let e2 = self.p2 - self.p0;
        let s1 = ray.dir().cross(&e2);
        let det = s1.dot(&e1);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin() - self.p0;
        let b1 = s1.dot(&s) * inv_det;
        if b1 < 0.0 || b1 > 1.0 {
            return None;
        }

        let s2 = s.cross(&e1);
        let b2 = s2.dot(&ray.dir()) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = s2.dot(&e2) * inv_det;
        if !ray.test_segment(t) {
            return None;
        }

        Some((t, b1, b2))
    }

    pub fn geometric_normal(&self) -> Vector3f {
        let edge0 = self.p1 - self.p0;
        let edge1 = self.p2 - self.p0;
        edge0.cross(&edge1).normalize()
    }

    pub fn vertices(&self) -> (Vector3f, Vector3f, Vector3f) {
        (self.p0, self.p1, self.p2)
    }
}
