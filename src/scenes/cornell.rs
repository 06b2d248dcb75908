// Copyright @yucwang 2026

//! The Cornell box, in millimetres, with the camera looking down `+z`.

use crate::core::bsdf::BSDF;
use crate::core::bvh::SplitMethod;
use crate::core::scene::{Scene, SceneObject};
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::triangle_mesh::{MeshError, TriangleMesh};

use std::sync::Arc;

pub const FOV_Y_DEGREES: Float = 40.0;

/// Triangle `tri` of `vertices`, rewound if needed so its normal has a
/// positive component along `facing`.
fn oriented(vertices: &[Vector3f], tri: [usize; 3], facing: &Vector3f) -> [usize; 3] {
    let e1 = vertices[tri[1]] - vertices[tri[0]];
    let e2 = vertices[tri[2]] - vertices[tri[0]];
    if e1.cross(&e2).dot(facing) < 0.0 {
        [tri[0], tri[2], tri[1]]
    } else {
        tri
    }
}

/// Planar quad whose normal points along `facing`.
pub fn quad(corners: [Vector3f; 4], facing: Vector3f) -> Result<TriangleMesh, MeshError> {
    let indices = [
        oriented(&corners, [0, 1, 2], &facing),
        oriented(&corners, [0, 2, 3], &facing),
    ];
    TriangleMesh::new(corners.to_vec(), &indices)
}

/// Closed block standing on `y = 0` under the given top face, normals outward.
pub fn block(top: [Vector3f; 4]) -> Result<TriangleMesh, MeshError> {
    let mut vertices = top.to_vec();
    vertices.extend(top.iter().map(|v| Vector3f::new(v.x, 0.0, v.z)));
    let center = vertices.iter().fold(Vector3f::zeros(), |acc, v| acc + v) / vertices.len() as Float;

    let mut faces: Vec<[usize; 4]> = vec![[0, 1, 2, 3]];
    for i in 0..4 {
        let j = (i + 1) % 4;
        faces.push([i, j, j + 4, i + 4]);
    }

    let mut indices = Vec::with_capacity(faces.len() * 2);
    for face in faces {
        let face_center = face.iter().fold(Vector3f::zeros(), |acc, &i| acc + vertices[i]) / 4.0;
        let outward = face_center - center;
        indices.push(oriented(&vertices, [face[0], face[1], face[2]], &outward));
        indices.push(oriented(&vertices, [face[0], face[2], face[3]], &outward));
    }
    TriangleMesh::new(vertices, &indices)
}

fn diffuse(r: Float, g: Float, b: Float) -> Arc<dyn BSDF> {
    Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::new(r, g, b)))
}

pub fn light_emission() -> RGBSpectrum {
    RGBSpectrum::new(0.747 + 0.058, 0.747 + 0.258, 0.747) * 8.0
        + RGBSpectrum::new(0.740 + 0.287, 0.740 + 0.160, 0.740) * 15.6
        + RGBSpectrum::new(0.737 + 0.642, 0.737 + 0.159, 0.737) * 18.4
}

fn v(x: Float, y: Float, z: Float) -> Vector3f {
    Vector3f::new(x, y, z)
}

/// Five walls, two blocks and the ceiling light, with the BVH built.
pub fn cornell_box() -> Result<Scene, MeshError> {
    cornell_box_with(SplitMethod::default())
}

pub fn cornell_box_with(split_method: SplitMethod) -> Result<Scene, MeshError> {
    let red = diffuse(0.63, 0.065, 0.05);
    let green = diffuse(0.14, 0.45, 0.091);
    let white = diffuse(0.725, 0.71, 0.68);
    let light: Arc<dyn BSDF> = Arc::new(
        LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.65)).with_emission(light_emission()));

    let up = v(0.0, 1.0, 0.0);
    let down = v(0.0, -1.0, 0.0);

    let floor = quad([v(552.8, 0.0, 0.0), v(0.0, 0.0, 0.0), v(0.0, 0.0, 559.2), v(549.6, 0.0, 559.2)], up)?;
    let ceiling = quad([v(556.0, 548.8, 0.0), v(556.0, 548.8, 559.2), v(0.0, 548.8, 559.2), v(0.0, 548.8, 0.0)], down)?;
    let back = quad([v(549.6, 0.0, 559.2), v(0.0, 0.0, 559.2), v(0.0, 548.8, 559.2), v(556.0, 548.8, 559.2)],
                    v(0.0, 0.0, -1.0))?;
    let left = quad([v(552.8, 0.0, 0.0), v(549.6, 0.0, 559.2), v(556.0, 548.8, 559.2), v(556.0, 548.8, 0.0)],
                    v(-1.0, 0.0, 0.0))?;
    let right = quad([v(0.0, 0.0, 559.2), v(0.0, 0.0, 0.0), v(0.0, 548.8, 0.0), v(0.0, 548.8, 559.2)],
                     v(1.0, 0.0, 0.0))?;
    let lamp = quad([v(343.0, 548.7, 227.0), v(343.0, 548.7, 332.0), v(213.0, 548.7, 332.0), v(213.0, 548.7, 227.0)],
                    down)?;
    let short_block = block([v(130.0, 165.0, 65.0), v(82.0, 165.0, 225.0), v(240.0, 165.0, 272.0), v(290.0, 165.0, 114.0)])?;
    let tall_block = block([v(423.0, 330.0, 247.0), v(265.0, 330.0, 296.0), v(314.0, 330.0, 456.0), v(472.0, 330.0, 406.0)])?;

    let mut scene = Scene::new();
    scene.add_object(SceneObject::new(Arc::new(floor), white.clone()).with_name("floor"));
    scene.add_object(SceneObject::new(Arc::new(ceiling), white.clone()).with_name("ceiling"));
    scene.add_object(SceneObject::new(Arc::new(back), white.clone()).with_name("back"));
    scene.add_object(SceneObject::new(Arc::new(left), red).with_name("left"));
    scene.add_object(SceneObject::new(Arc::new(right), green).with_name("right"));
    scene.add_object(SceneObject::new(Arc::new(short_block), white.clone()).with_name("short_block"));
    scene.add_object(SceneObject::new(Arc::new(tall_block), white).with_name("tall_block"));
    scene.add_object(SceneObject::new(Arc::new(lamp), light).with_name("light"));
    scene.build_bvh_with(split_method);

    Ok(scene)
}

pub fn cornell_camera(width: usize, height: usize) -> PerspectiveCamera {
    PerspectiveCamera::new(v(278.0, 273.0, -800.0),
                           v(278.0, 273.0, 0.0),
                           v(0.0, 1.0, 0.0),
                           FOV_Y_DEGREES.to_radians(),
                           width, height)
}
