// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFValue, BSDF};
use crate::math::constants::{ Float, INV_PI, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

/// Ideal diffuse reflector, optionally also an area light.
pub struct LambertianDiffuseBSDF {
    color: RGBSpectrum,
    emission: RGBSpectrum,
}

impl BSDF for LambertianDiffuseBSDF {
    fn emission(&self) -> RGBSpectrum {
        self.emission
    }

    fn eval(&self, wi: &Vector3f, wo: &Vector3f, n: &Vector3f) -> BSDFValue {
        if n.dot(wi) <= 0.0 || n.dot(wo) <= 0.0 {
            return RGBSpectrum::default();
        }

        self.color * INV_PI
    }

    fn sample(&self, u: &Vector2f, _wo: &Vector3f, n: &Vector3f) -> Vector3f {
        let local = sample_cosine_hemisphere(u);
        Frame::from_normal(n).from_local(&local).normalize()
    }

    fn pdf(&self, wi: &Vector3f, _wo: &Vector3f, n: &Vector3f) -> Float {
        let cos_theta = n.dot(wi);
        if cos_theta <= 0.0 {
            return 0.0;
        }

        sample_cosine_hemisphere_pdf(cos_theta)
    }
}

impl LambertianDiffuseBSDF {
    pub fn new(rgb: RGBSpectrum) -> Self {
        Self {
            color: rgb,
            emission: RGBSpectrum::default(),
        }
    }

    pub fn with_emission(mut self, emission: RGBSpectrum) -> Self {
        self.emission = emission;
        self
    }
}
