// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, FLOAT_MAX };

/// A ray with a normalized direction, so `t` is a world-space distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(FLOAT_MAX) }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }

    pub fn with_max_t(&self, max_t: Float) -> Self {
        Self { max_t, ..*self }
    }
}

/* Tests for Ray */
