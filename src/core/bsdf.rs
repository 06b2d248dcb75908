// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

pub type BSDFValue = RGBSpectrum;

/// Surface scattering and emission, evaluated in world space.
///
/// Every direction passed in or returned is unit length and points away
/// from the surface: `wo` toward the viewer, `wi` toward the light or the
/// next bounce. `n` is the unit geometric normal at the shading point.
pub trait BSDF: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn emission(&self) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    fn has_emission(&self) -> bool {
        !self.emission().is_black()
    }

    fn eval(&self, wi: &Vector3f, wo: &Vector3f, n: &Vector3f) -> BSDFValue;

    /// Importance-sample an incident direction from a 2-D uniform sample.
    fn sample(&self, u: &Vector2f, wo: &Vector3f, n: &Vector3f) -> Vector3f;

    /// Solid-angle density of `sample` producing `wi`.
    fn pdf(&self, wi: &Vector3f, wo: &Vector3f, n: &Vector3f) -> Float;
}
