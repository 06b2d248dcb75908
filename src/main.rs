// Copyright 2020 TwoCookingMice

use cornell::core::computation_node::ComputationNode;
use cornell::core::settings::RenderSettings;
use cornell::integrators::path::PathIntegrator;
use cornell::math::spectrum::RGBSpectrum;
use cornell::renderers::simple::{Renderer, SimpleRenderer};
use cornell::scenes::cornell::{cornell_box_with, cornell_camera};

use std::env;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("cornell");
    let settings = match RenderSettings::from_args(&args[1.min(args.len())..]) {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("{}", RenderSettings::usage(program));
            process::exit(1);
        }
    };
    log::info!("{:?}", settings);

    let scene = match cornell_box_with(settings.split_method) {
        Ok(scene) => scene,
        Err(err) => {
            log::error!("Failed to build the Cornell box: {}", err);
            process::exit(1);
        }
    };
    let camera = cornell_camera(settings.width, settings.height);

    let integrator = PathIntegrator::new(settings.max_depth, settings.samples_per_pixel)
        .with_russian_roulette(settings.russian_roulette);
    let renderer = SimpleRenderer::new(Box::new(integrator), settings.seed);
    log::info!("{}", ComputationNode::to_string(&renderer));
    let image = renderer.render(&scene, &camera);

    let mean = RGBSpectrum::from(image.mean());
    log::info!("Mean radiance: ({:.4}, {:.4}, {:.4}), luminance {:.4}.",
               mean[0], mean[1], mean[2], mean.luminance());
}
