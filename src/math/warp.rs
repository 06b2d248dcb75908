// Copyright @yucwang 2023

use super::constants::{ INV_4PI, INV_PI, PI, Float, Vector2f, Vector3f };

pub fn sample_uniform_sphere(u: &Vector2f) -> Vector3f {
    let z: Float = 1. - 2. * u.x;
    let r: Float = (1. - z * z).max(0.).sqrt();
    let phi: Float = 2. * PI * u.y;

    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn sample_uniform_sphere_pdf() -> Float {
    INV_4PI
}

pub fn sample_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        r = 0.0;
        phi = 0.0;
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    Vector2f::new(r * cos_phi, r * sin_phi)
}

/// Malley's method: lift a concentric disk sample onto the hemisphere.
pub fn sample_cosine_hemisphere(u: &Vector2f) -> Vector3f {
    let p = sample_uniform_disk_concentric(u);
    let z = (1. - p.x * p.x - p.y * p.y).max(0.).sqrt();

    Vector3f::new(p.x, p.y, z)
}

pub fn sample_cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Uniform barycentric coordinates `(b0, b1, b2)` over a triangle.
pub fn square_to_triangle(u: &Vector2f) -> Vector3f {
    let su = u.x.max(0.).sqrt();
    let b0 = 1. - su;
    let b1 = u.y * su;

    Vector3f::new(b0, b1, 1. - b0 - b1)
}
