// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f, INV_2PI, INV_PI, PI};
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_sphere;

pub struct Sphere {
    center: Vector3f,
    radius: Float,
    reverse_orientation: bool,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius: radius.abs(), reverse_orientation: false }
    }

    /// Normals point toward the center, e.g. for an enclosing emitter.
    pub fn with_reversed_orientation(mut self) -> Self {
        self.reverse_orientation = true;
        self
    }

    fn normal_at(&self, p: &Vector3f) -> Vector3f {
        let n = (p - self.center) / self.radius;
        if self.reverse_orientation { -n } else { n }
    }

    fn uv_at(&self, p: &Vector3f) -> Vector2f {
        let d = (p - self.center) / self.radius;
        let theta = d.z.max(-1.0).min(1.0).acos();
        let mut phi = d.y.atan2(d.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        Vector2f::new(phi * INV_2PI, theta * INV_PI)
    }
}

impl ComputationNode for Sphere {
    fn to_string(&self) -> String {
        format!("Sphere: {{ center: {:?}, radius: {}, reversed: {} }}",
                self.center.as_slice(), self.radius, self.reverse_orientation)
    }
}

impl Shape for Sphere {
    fn bounding_box(&self) -> AABB {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        AABB::new(self.center - r, self.center + r)
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        // |o + t d - c|^2 = r^2 with |d| = 1.
        let oc = ray.origin() - self.center;
        let half_b = oc.dot(&ray.dir());
        let c = oc.norm_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let near = -half_b - sqrt_d;
        let far = -half_b + sqrt_d;
        let t = if ray.test_segment(near) {
            near
        } else if ray.test_segment(far) {
            far
        } else {
            return None;
        };

        let p = ray.at(t);
        Some(SurfaceIntersection::new(p, self.normal_at(&p), self.uv_at(&p), t))
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let d = sample_uniform_sphere(u);
        let p = self.center + d * self.radius;
        let intersection = SurfaceIntersection::new(p, self.normal_at(&p), self.uv_at(&p), 0.0);

        SurfaceSampleRecord::new(intersection, 1.0 / self.surface_area())
    }

    fn surface_area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit_from_outside_and_inside() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, 0.0), 2.0);

        let outside = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = sphere.ray_intersection(&outside).expect("hit from outside");
        assert!((hit.t() - 3.0).abs() < 1e-5);
        assert!((hit.normal() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-5);

        let inside = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = sphere.ray_intersection(&inside).expect("hit from inside");
        assert!((hit.t() - 2.0).abs() < 1e-5);

        let away = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(sphere.ray_intersection(&away).is_none());

        let short = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, Some(2.5));
        assert!(sphere.ray_intersection(&short).is_none());
    }

    #[test]
    fn test_reversed_orientation_faces_center() {
        let sphere = Sphere::new(Vector3f::new(1.0, 0.0, 0.0), 3.0).with_reversed_orientation();
        let ray = Ray3f::new(Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0), None, None);
        let hit = sphere.ray_intersection(&ray).expect("hit from inside");
        assert!((hit.normal() - Vector3f::new(0.0, -1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_sphere_samples_on_surface() {
        let center = Vector3f::new(1.0, -2.0, 0.5);
        let sphere = Sphere::new(center, 1.5);
        let expected_pdf = 1.0 / (4.0 * PI * 1.5 * 1.5);
        for i in 0..10 {
            for j in 0..10 {
                let u = Vector2f::new((i as Float + 0.5) / 10.0, (j as Float + 0.5) / 10.0);
                let sample = sphere.sample(&u);
                let its = sample.intersection();
                assert!(((its.p() - center).norm() - 1.5).abs() < 1e-4);
                assert!((its.normal() - (its.p() - center) / 1.5).norm() < 1e-4);
                assert!((sample.pdf() - expected_pdf).abs() < 1e-6);
                let uv = its.uv();
                assert!(uv.x >= 0.0 && uv.x <= 1.0 && uv.y >= 0.0 && uv.y <= 1.0);
            }
        }
    }
}
