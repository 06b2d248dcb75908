// Copyright @yucwang 2021

pub mod bsdf;
pub mod bvh;
pub mod computation_node;
pub mod integrator;
pub mod interaction;
pub mod rng;
pub mod scene;
pub mod sensor;
pub mod settings;
pub mod shape;
