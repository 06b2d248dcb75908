// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};

/// Source of uniform samples in `[0, 1)`.
///
/// Integrators and scenes never own randomness; a sampler is handed down
/// through every call that draws, so each render task can keep its own.
pub trait Sampler {
    fn next_1d(&mut self) -> Float;

    fn next_2d(&mut self) -> Vector2f {
        let x = self.next_1d();
        let y = self.next_1d();
        Vector2f::new(x, y)
    }
}

#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Stream for one pixel. Every bit of `seed` and both coordinates go
    /// through the mixer, so nearby pixels do not start from nearby states.
    pub fn for_pixel(seed: u64, x: usize, y: usize) -> Self {
        let pixel = ((y as u64) << 32) ^ (x as u64);
        Self::new(splitmix64(splitmix64(seed) ^ pixel))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    pub fn next_f32(&mut self) -> Float {
        // 24 mantissa bits keep the result strictly below 1.
        ((self.next_u32() >> 8) as Float) * (1.0 / 16_777_216.0)
    }
}

/// SplitMix64 finalizer.
fn splitmix64(v: u64) -> u64 {
    let mut z = v.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl Sampler for LcgRng {
    fn next_1d(&mut self) -> Float {
        self.next_f32()
    }
}
