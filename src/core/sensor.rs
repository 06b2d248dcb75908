// Copyright @yucwang 2026

use crate::math::constants::Vector2f;
use crate::math::ray::Ray3f;

pub trait Sensor: Sync {
    /// Ray through film position `u` in `[0, 1]^2`, `(0, 0)` at the top left.
    fn sample_ray(&self, u: &Vector2f) -> Ray3f;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn describe(&self) -> String {
        String::from("Sensor")
    }
}
