// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::core::settings::{DEFAULT_MAX_DEPTH, DEFAULT_RUSSIAN_ROULETTE};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// BSDF sample densities at or below this are discarded.
pub const PDF_EPSILON: Float = 5e-4;
/// Slack when deciding whether a shadow ray reached the sampled light point.
pub const SHADOW_EPSILON: Float = 5e-4;
/// Lower ray bound for rays leaving a surface.
pub const RAY_EPSILON: Float = 1e-3;
pub const MIN_RUSSIAN_ROULETTE: Float = 1e-2;

/// Unidirectional path tracer with next-event estimation.
///
/// Every non-emissive hit gathers one light sample (direct term) and, if the
/// path survives Russian roulette, one BSDF-sampled bounce (indirect term).
/// Emitters are only ever counted through the direct term. `max_depth` caps
/// the number of indirect bounces; paths normally end by Russian roulette
/// long before reaching it.
pub struct PathIntegrator {
    pub max_depth: u32,
    pub samples_per_pixel: u32,
    russian_roulette: Float,
}

impl Default for PathIntegrator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, 1)
    }
}

impl PathIntegrator {
    pub fn new(max_depth: u32, samples_per_pixel: u32) -> Self {
        Self { max_depth, samples_per_pixel, russian_roulette: DEFAULT_RUSSIAN_ROULETTE }
    }

    pub fn with_russian_roulette(mut self, survival: Float) -> Self {
        let clamped = if survival.is_nan() {
            DEFAULT_RUSSIAN_ROULETTE
        } else {
            survival.max(MIN_RUSSIAN_ROULETTE).min(1.0)
        };
        if clamped != survival {
            log::warn!("Russian roulette probability {} clamped to {}.", survival, clamped);
        }
        self.russian_roulette = clamped;
        self
    }

    pub fn russian_roulette(&self) -> Float {
        self.russian_roulette
    }

    /// Radiance arriving along `ray`; black when nothing is hit.
    pub fn cast_ray(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        match scene.ray_intersection(ray) {
            Some(hit) => self.shade(scene, &hit, &(-ray.dir()), sampler, 0),
            None => RGBSpectrum::default(),
        }
    }

    /// Outgoing radiance at `hit` toward `wo`.
    pub fn shade(&self, scene: &Scene, hit: &SurfaceIntersection, wo: &Vector3f,
                 sampler: &mut dyn Sampler, depth: u32) -> RGBSpectrum {
        let material = match hit.material() {
            Some(m) => m,
            None => return RGBSpectrum::default(),
        };

        if material.has_emission() {
            return material.emission();
        }

        let direct = self.direct_lighting(scene, hit, material, wo, sampler);
        let indirect = self.indirect_lighting(scene, hit, material, wo, sampler, depth);

        direct + indirect
    }

    /// One light sample with a shadow test.
    pub fn direct_lighting(&self, scene: &Scene, hit: &SurfaceIntersection, material: &dyn BSDF,
                           wo: &Vector3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let light = match scene.sample_light(sampler) {
            Some(sample) => sample,
            None => return RGBSpectrum::default(),
        };
        let light_pdf = light.pdf();
        if !(light_pdf > 0.0 && light_pdf.is_finite()) {
            return RGBSpectrum::default();
        }

        let light_point = light.intersection();
        let to_light = light_point.p() - hit.p();
        let dist2 = to_light.norm_squared();
        if dist2 <= RAY_EPSILON * RAY_EPSILON {
            return RGBSpectrum::default();
        }
        let dist = dist2.sqrt();
        let wi = to_light / dist;

        let shadow_ray = Ray3f::new(hit.p(), wi, Some(RAY_EPSILON), None);
        let visible = match scene.ray_intersection(&shadow_ray) {
            Some(blocker) => blocker.t() - dist > -SHADOW_EPSILON * dist.max(1.0),
            None => false,
        };
        if !visible {
            return RGBSpectrum::default();
        }

        let n = hit.normal();
        let f = material.eval(&wi, wo, &n);
        let cos_surface = n.dot(&wi).max(0.0);
        let cos_light = light_point.normal().dot(&(-wi)).max(0.0);

        light_point.le() * f * (cos_surface * cos_light / dist2 / light_pdf)
    }

    /// One BSDF-sampled bounce, continued with probability `russian_roulette`.
    pub fn indirect_lighting(&self, scene: &Scene, hit: &SurfaceIntersection, material: &dyn BSDF,
                             wo: &Vector3f, sampler: &mut dyn Sampler, depth: u32) -> RGBSpectrum {
        if depth >= self.max_depth {
            log::trace!("Path cut at depth cap {}.", self.max_depth);
            return RGBSpectrum::default();
        }

        if sampler.next_1d() >= self.russian_roulette {
            return RGBSpectrum::default();
        }

        let n = hit.normal();
        let wi = material.sample(&sampler.next_2d(), wo, &n);
        let wi_len = wi.norm();
        if !(wi_len > 0.0) {
            return RGBSpectrum::default();
        }
        let wi = wi / wi_len;

        let pdf = material.pdf(&wi, wo, &n);
        if !(pdf > PDF_EPSILON) {
            return RGBSpectrum::default();
        }

        let next = match scene.ray_intersection(&Ray3f::new(hit.p(), wi, Some(RAY_EPSILON), None)) {
            Some(next) => next,
            None => return RGBSpectrum::default(),
        };
        match next.material() {
            Some(m) if !m.has_emission() => {}
            _ => return RGBSpectrum::default(),
        }

        let f = material.eval(&wi, wo, &n);
        let cos_theta = n.dot(&wi).max(0.0);
        let incoming = self.shade(scene, &next, &(-wi), sampler, depth + 1);

        incoming * f * (cos_theta / pdf / self.russian_roulette)
    }
}

impl Integrator for PathIntegrator {
    fn trace_ray_forward(&self, scene: &Scene, sensor: &dyn Sensor, pixel: Vector2f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let width = sensor.width().max(1) as Float;
        let height = sensor.height().max(1) as Float;
        let jitter = sampler.next_2d();
        let u = Vector2f::new((pixel.x + jitter.x) / width, (pixel.y + jitter.y) / height);
        let ray = sensor.sample_ray(&u);

        self.cast_ray(scene, &ray, sampler)
    }

    fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }
}
