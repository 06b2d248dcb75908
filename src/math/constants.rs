/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;
pub type Int = i32;
pub type UInt = u32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;

pub const EPSILON: Float = 1e-4;
pub const PI: Float = 3.14159265359;
pub const INV_PI: Float = 0.31830988618;
pub const INV_2PI: Float = 0.15915494309;
pub const INV_4PI: Float = 0.07957747154;

pub const FLOAT_MAX: Float = std::f32::MAX;
pub const FLOAT_MIN: Float = std::f32::MIN;
