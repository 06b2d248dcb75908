// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

/// Pinhole camera with a vertical field of view.
pub struct PerspectiveCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov_y: Float,
    aspect: Float,
    near_clip: Float,
    far_clip: Float,
    width: usize,
    height: usize,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               width: usize,
               height: usize) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward).normalize();
        let aspect = if height > 0 { width as Float / height as Float } else { 1.0 };

        Self {
            origin,
            forward,
            right,
            up,
            tan_half_fov_y: (0.5 * fov_y_radians).tan(),
            aspect,
            near_clip: 0.0,
            far_clip: Float::MAX,
            width,
            height,
        }
    }

    pub fn with_clip(mut self, near_clip: Float, far_clip: Float) -> Self {
        self.near_clip = near_clip.max(0.0);
        self.far_clip = far_clip.max(self.near_clip);
        self
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }
}

impl ComputationNode for PerspectiveCamera {
    fn to_string(&self) -> String {
        format!("PerspectiveCamera: {{ origin: {:?}, forward: {:?}, size: {}x{}, tan_half_fov_y: {} }}",
                self.origin.as_slice(), self.forward.as_slice(), self.width, self.height, self.tan_half_fov_y)
    }
}

impl Sensor for PerspectiveCamera {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let px = (2.0 * u.x - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * u.y) * self.tan_half_fov_y;

        let d_camera = Vector3f::new(px, py, 1.0).normalize();
        let dir = (self.right * d_camera.x + self.up * d_camera.y + self.forward * d_camera.z).normalize();

        // Clip planes are distances along the view axis.
        let inv_z = 1.0 / d_camera.z;
        let near_t = self.near_clip * inv_z;
        let far_t = if self.far_clip == Float::MAX { Float::MAX } else { self.far_clip * inv_z };
        Ray3f::new(self.origin, dir, Some(near_t), Some(far_t))
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn describe(&self) -> String {
        ComputationNode::to_string(self)
    }
}
