// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::bvh::{SplitMethod, BVH};
use crate::core::computation_node::ComputationNode;
use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::rng::Sampler;
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use std::sync::Arc;

pub struct SceneObject {
    pub shape: Arc<dyn Shape>,
    pub material: Arc<dyn BSDF>,
    pub name: Option<String>,
}

impl SceneObject {
    pub fn new(shape: Arc<dyn Shape>, material: Arc<dyn BSDF>) -> Self {
        Self { shape, material, name: None }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn shape(&self) -> &Arc<dyn Shape> {
        &self.shape
    }

    pub fn material(&self) -> &Arc<dyn BSDF> {
        &self.material
    }

    pub fn has_emission(&self) -> bool {
        self.material.has_emission()
    }

    pub fn surface_area(&self) -> Float {
        self.shape.surface_area()
    }
}

/// Objects plus the acceleration structure over them.
///
/// `build_bvh` must run once after the last `add_object`; until then the
/// scene reports no hits. Once built the scene is only read.
pub struct Scene {
    objects: Vec<SceneObject>,
    scene_bounds: AABB,
    bvh: Option<BVH>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            scene_bounds: AABB::default(),
            bvh: None,
        }
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
        self.bvh = None;
    }

    pub fn objects(&self) -> &Vec<SceneObject> {
        &self.objects
    }

    pub fn scene_bounds(&self) -> &AABB {
        &self.scene_bounds
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn is_built(&self) -> bool {
        self.bvh.is_some()
    }

    pub fn emitter_count(&self) -> usize {
        self.objects.iter().filter(|o| o.has_emission()).count()
    }

    pub fn emissive_area(&self) -> Float {
        self.objects
            .iter()
            .filter(|o| o.has_emission())
            .map(|o| o.surface_area())
            .sum()
    }

    pub fn build_bvh(&mut self) {
        self.build_bvh_with(SplitMethod::default());
    }

    pub fn build_bvh_with(&mut self, split_method: SplitMethod) {
        log::info!("Generating BVH over {} objects ({:?} split).", self.objects.len(), split_method);

        let mut prim_bounds = Vec::with_capacity(self.objects.len());
        let mut prim_centroids = Vec::with_capacity(self.objects.len());
        let mut scene_bounds = AABB::default();
        for (idx, obj) in self.objects.iter().enumerate() {
            let bounds = obj.shape.bounding_box();
            log::debug!("  [{}] {} {} {} area={:.3} emissive={}",
                        idx,
                        obj.name.as_deref().unwrap_or("<unnamed>"),
                        ComputationNode::to_string(obj.shape.as_ref()),
                        obj.material.name(),
                        obj.surface_area(),
                        obj.has_emission());
            prim_centroids.push(bounds.center());
            prim_bounds.push(bounds);
            scene_bounds.expand_by_aabb(&bounds);
        }

        self.bvh = Some(BVH::new(prim_bounds, prim_centroids, split_method));
        self.scene_bounds = scene_bounds;

        let emitters = self.emitter_count();
        if emitters == 0 {
            log::warn!("Scene has no emissive objects; direct lighting will be black.");
        }
        log::info!("BVH ready: {} emitters, emissive area {:.3}, bounds {:?} - {:?}.",
                   emitters, self.emissive_area(),
                   scene_bounds.p_min, scene_bounds.p_max);
    }

    /// Nearest hit over all objects, with emission, material and owner filled in.
    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let bvh = self.bvh.as_ref()?;
        let (idx, hit) = bvh.ray_intersection(ray, |prim_idx, ray| {
            self.objects[prim_idx].shape.ray_intersection(ray).map(|h| {
                let t = h.t();
                (h, t)
            })
        })?;

        Some(self.attach_object(hit, idx))
    }

    /// Uniformly samples a point on the union of emissive surfaces.
    ///
    /// An emitter is chosen with probability proportional to its area (first
    /// object in insertion order whose running area sum exceeds the draw), then
    /// the point comes from its shape. The pdf is with respect to area over
    /// all emitters, `pdf_shape * area_k / A`, not the chosen shape's own
    /// `1 / area_k`; divide by it once and do not scale by the selection
    /// probability again. Returns `None` when the scene has no emitters.
    pub fn sample_light(&self, sampler: &mut dyn Sampler) -> Option<SurfaceSampleRecord> {
        let emit_area_sum = self.emissive_area();
        if emit_area_sum <= 0.0 {
            return None;
        }

        let p = sampler.next_1d() * emit_area_sum;
        let mut accum = 0.0;
        let mut chosen = None;
        for (idx, obj) in self.objects.iter().enumerate() {
            if !obj.has_emission() {
                continue;
            }
            accum += obj.surface_area();
            chosen = Some(idx);
            if accum > p {
                break;
            }
        }

        let idx = chosen?;
        let object = &self.objects[idx];
        let sample = object.shape.sample(&sampler.next_2d());
        let select_pdf = object.surface_area() / emit_area_sum;
        let pdf = sample.pdf() * select_pdf;
        let intersection = self.attach_object(sample.into_intersection(), idx);

        Some(SurfaceSampleRecord::new(intersection, pdf))
    }

    fn attach_object(&self, intersection: SurfaceIntersection, idx: usize) -> SurfaceIntersection {
        let object = &self.objects[idx];
        intersection
            .with_le(object.material.emission())
            .with_material(object.material.clone())
            .with_object_index(Some(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::math::constants::{Vector3f, PI};
    use crate::math::spectrum::RGBSpectrum;
    use crate::shapes::sphere::Sphere;

    fn diffuse() -> Arc<dyn BSDF> {
        Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.5)))
    }

    fn light(le: Float) -> Arc<dyn BSDF> {
        Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::default())
            .with_emission(RGBSpectrum::splat(le)))
    }

    fn sphere(x: Float, radius: Float) -> Arc<dyn Shape> {
        Arc::new(Sphere::new(Vector3f::new(x, 0.0, 0.0), radius))
    }

    #[test]
    fn test_scene_ray_intersection_closest_hit() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(sphere(0.0, 1.0), diffuse()).with_name("near"));
        scene.add_object(SceneObject::new(sphere(5.0, 1.0), light(1.0)).with_name("far"));
        scene.build_bvh();

        let ray = Ray3f::new(Vector3f::new(-5.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = scene.ray_intersection(&ray).expect("expected intersection");

        assert!((hit.t() - 4.0).abs() < 1e-4);
        assert_eq!(hit.object_index(), Some(0));
        assert!(hit.le().is_black());
        assert!(hit.material().is_some());

        let from_inside = Ray3f::new(Vector3f::new(2.5, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = scene.ray_intersection(&from_inside).expect("expected light hit");
        assert_eq!(hit.object_index(), Some(1));
        assert_eq!(hit.le(), RGBSpectrum::splat(1.0));
    }

    #[test]
    fn test_unbuilt_scene_reports_no_hit() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(sphere(0.0, 1.0), diffuse()));
        let ray = Ray3f::new(Vector3f::new(-5.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        assert!(!scene.is_built());
        assert!(scene.ray_intersection(&ray).is_none());

        scene.build_bvh_with(SplitMethod::Naive);
        assert!(scene.ray_intersection(&ray).is_some());

        // Adding an object discards the structure; it has to be rebuilt.
        scene.add_object(SceneObject::new(sphere(4.0, 1.0), diffuse()));
        assert!(!scene.is_built());
    }

    #[test]
    fn test_sample_light_without_emitters() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(sphere(0.0, 1.0), diffuse()));
        scene.build_bvh();
        let mut rng = LcgRng::new(1);
        assert_eq!(scene.emissive_area(), 0.0);
        assert!(scene.sample_light(&mut rng).is_none());
    }

    #[test]
    fn test_sample_light_area_weighted_selection() {
        let small = Vector3f::new(-10.0, 0.0, 0.0);
        let large = Vector3f::new(10.0, 0.0, 0.0);
        let large_radius = (3.0 as Float).sqrt();

        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(sphere(0.0, 2.0), diffuse()));
        scene.add_object(SceneObject::new(sphere(small.x, 1.0), light(1.0)));
        scene.add_object(SceneObject::new(sphere(large.x, large_radius), light(4.0)));
        scene.build_bvh();

        let total_area = 4.0 * PI * (1.0 + 3.0);
        assert!((scene.emissive_area() - total_area).abs() < 1e-3);

        let mut rng = LcgRng::new(42);
        let n = 20_000;
        let mut large_count = 0usize;
        for _ in 0..n {
            let sample = scene.sample_light(&mut rng).expect("scene has emitters");
            let its = sample.intersection();
            assert!((sample.pdf() - 1.0 / total_area).abs() < 1e-5);
            match its.object_index() {
                Some(1) => {
                    assert!(((its.p() - small).norm() - 1.0).abs() < 1e-3);
                    assert_eq!(its.le(), RGBSpectrum::splat(1.0));
                }
                Some(2) => {
                    assert!(((its.p() - large).norm() - large_radius).abs() < 1e-3);
                    assert_eq!(its.le(), RGBSpectrum::splat(4.0));
                    large_count += 1;
                }
                other => panic!("sampled a non-emissive object: {:?}", other),
            }
        }

        let fraction = large_count as Float / n as Float;
        assert!((fraction - 0.75).abs() < 0.02, "large emitter picked {}", fraction);
    }
}
