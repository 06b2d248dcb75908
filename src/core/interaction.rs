// Copyright @yucwang 2023

use crate::core::bsdf::BSDF;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

/// A ray hit, or a sampled surface point.
///
/// Shapes fill in geometry only; the scene attaches emission, material and
/// the index of the owning object.
#[derive(Clone)]
pub struct SurfaceIntersection {
    p: Vector3f,
    normal: Vector3f,
    uv: Vector2f,
    t: Float,
    le: RGBSpectrum,
    material: Option<Arc<dyn BSDF>>,
    object_index: Option<usize>,
}

pub struct SurfaceSampleRecord {
    intersection: SurfaceIntersection,
    pdf: Float,
}

impl SurfaceIntersection {
    pub fn new(new_p: Vector3f,
               new_normal: Vector3f,
               new_uv: Vector2f,
               new_t: Float) -> Self {
        Self { p: new_p, normal: new_normal, uv: new_uv, t: new_t,
               le: RGBSpectrum::default(), material: None, object_index: None }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn le(&self) -> RGBSpectrum {
        self.le
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn uv(&self) -> Vector2f {
        self.uv
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn material(&self) -> Option<&dyn BSDF> {
        self.material.as_deref()
    }

    pub fn object_index(&self) -> Option<usize> {
        self.object_index
    }

    pub fn with_le(mut self, new_le: RGBSpectrum) -> Self {
        self.le = new_le;
        self
    }

    pub fn with_material(mut self, new_material: Arc<dyn BSDF>) -> Self {
        self.material = Some(new_material);
        self
    }

    pub fn with_object_index(mut self, new_object_index: Option<usize>) -> Self {
        self.object_index = new_object_index;
        self
    }
}

impl SurfaceSampleRecord {
    pub fn new(new_intersection: SurfaceIntersection,
               new_pdf: Float) -> Self {
        Self { intersection: new_intersection, pdf: new_pdf }
    }

    pub fn intersection(&self) -> &SurfaceIntersection {
        &self.intersection
    }

    pub fn into_intersection(self) -> SurfaceIntersection {
        self.intersection
    }

    pub fn pdf(&self) -> Float {
        self.pdf
    }
}
