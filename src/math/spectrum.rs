// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use std::ops;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0f32, 0.0f32, 0.0f32) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn splat(v: Float) -> Self {
        Self::new(v, v, v)
    }

    pub fn is_black(&self) -> bool {
        self.rgb.iter().all(|c| *c == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.rgb.iter().all(|c| c.is_finite())
    }

    pub fn max_component(&self) -> Float {
        self.rgb.max()
    }

    pub fn luminance(&self) -> Float {
        0.2126 * self.rgb.x + 0.7152 * self.rgb.y + 0.0722 * self.rgb.z
    }

    pub fn to_vector(&self) -> Vector3f {
        self.rgb
    }
}

impl From<Vector3f> for RGBSpectrum {
    fn from(rgb: Vector3f) -> Self {
        Self { rgb }
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, index: usize) -> &Float {
        &self.rgb[index]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { rgb: self.rgb + rhs.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        self.rgb += rhs.rgb;
    }
}

impl ops::Sub for RGBSpectrum {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { rgb: self.rgb - rhs.rgb }
    }
}

// Component-wise product, used for radiance * reflectance.
impl ops::Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self { rgb: self.rgb.component_mul(&rhs.rgb) }
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self { rgb: self.rgb * rhs }
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        Self { rgb: self.rgb / rhs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_arithmetic() {
        let a = RGBSpectrum::new(1.0, 2.0, 3.0);
        let b = RGBSpectrum::splat(0.5);

        assert_eq!(a * b, RGBSpectrum::new(0.5, 1.0, 1.5));
        assert_eq!(a + b, RGBSpectrum::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, RGBSpectrum::new(0.5, 1.5, 2.5));
        assert_eq!(a * 2.0, RGBSpectrum::new(2.0, 4.0, 6.0));
        assert_eq!(a / 2.0, RGBSpectrum::new(0.5, 1.0, 1.5));
        assert_eq!(a.max_component(), 3.0);

        let mut c = RGBSpectrum::default();
        c += a;
        assert_eq!(c[2], 3.0);
    }

    #[test]
    fn test_spectrum_black_and_finite() {
        assert!(RGBSpectrum::default().is_black());
        assert!(!RGBSpectrum::new(0.0, 0.0, 1e-6).is_black());
        assert!(RGBSpectrum::splat(1.0).is_finite());
        assert!(!(RGBSpectrum::splat(1.0) / 0.0).is_finite());
    }

    #[test]
    fn test_luminance_weights() {
        assert!((RGBSpectrum::splat(1.0).luminance() - 1.0).abs() < 1e-6);
        assert!(RGBSpectrum::new(0.0, 1.0, 0.0).luminance() > RGBSpectrum::new(1.0, 0.0, 0.0).luminance());
        assert!(RGBSpectrum::new(1.0, 0.0, 0.0).luminance() > RGBSpectrum::new(0.0, 0.0, 1.0).luminance());
        let from_vector = RGBSpectrum::from(Vector3f::new(0.2, 0.4, 0.6));
        assert!((from_vector.luminance() - (0.2126 * 0.2 + 0.7152 * 0.4 + 0.0722 * 0.6)).abs() < 1e-6);
    }
}
