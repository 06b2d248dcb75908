// Copyright @yucwang 2021

use crate::core::computation_node::ComputationNode;
use crate::core::integrator::Integrator;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2f, Vector3f};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

pub use super::renderer::Renderer;

const BLOCK_SIZE: usize = 32;

/// Renders block by block on the calling thread.
///
/// Each pixel owns an `LcgRng` seeded from `(seed, x, y)`, so the image does
/// not depend on the order in which blocks are visited.
pub struct SimpleRenderer {
    integrator: Box<dyn Integrator>,
    seed: u64,
}

impl ComputationNode for SimpleRenderer {
    fn to_string(&self) -> String {
        format!("SimpleRenderer: {{ spp: {}, seed: {} }}", self.integrator.samples_per_pixel(), self.seed)
    }
}

impl SimpleRenderer {
    pub fn new(integrator: Box<dyn Integrator>, seed: u64) -> Self {
        Self { integrator, seed }
    }

    fn render_pixel(&self, scene: &Scene, sensor: &dyn Sensor, x: usize, y: usize, spp: u32) -> Vector3f {
        let mut rng = LcgRng::for_pixel(self.seed, x, y);
        let pixel = Vector2f::new(x as Float, y as Float);
        let mut color = Vector3f::zeros();
        for _sample in 0..spp {
            let rgb = self.integrator.trace_ray_forward(scene, sensor, pixel, &mut rng);
            if rgb.is_finite() {
                color += rgb.to_vector();
            } else {
                log::debug!("Dropped non-finite sample at pixel ({}, {}).", x, y);
            }
        }
        color / (spp as Float)
    }
}

impl Renderer for SimpleRenderer {
    fn render(&self, scene: &Scene, sensor: &dyn Sensor) -> Bitmap {
        let width = sensor.width();
        let height = sensor.height();
        if width == 0 || height == 0 {
            return Bitmap::new(0, 0);
        }
        let spp = match self.integrator.samples_per_pixel() {
            0 => 1,
            v => v,
        };

        let blocks_x = (width + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let blocks_y = (height + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let total_blocks = blocks_x * blocks_y;

        log::info!("Rendering {}x{} at {} spp with {}.", width, height, spp, sensor.describe());
        let start = Instant::now();

        let progress = ProgressBar::new(total_blocks as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut bitmap = Bitmap::new(width, height);
        for block_index in 0..total_blocks {
            let x0 = (block_index % blocks_x) * BLOCK_SIZE;
            let y0 = (block_index / blocks_x) * BLOCK_SIZE;
            let x1 = (x0 + BLOCK_SIZE).min(width);
            let y1 = (y0 + BLOCK_SIZE).min(height);

            for y in y0..y1 {
                for x in x0..x1 {
                    bitmap[(x, y)] = self.render_pixel(scene, sensor, x, y, spp);
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        log::info!("Rendered {} blocks in {:.2?}.", total_blocks, start.elapsed());
        bitmap
    }
}
