//! Position, rotation and scale of an entity, and the world matrix they
//! compose to.

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::math::compose_world;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    /// Euler angles in radians: x is pitch, y is yaw, z is roll.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    matrix: Matrix4<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            matrix: Matrix4::identity(),
        }
    }
}

impl Transform {
    pub fn new(position: Vector3<f32>, rotation: Vector3<f32>, scale: Vector3<f32>) -> Self {
        let mut transform = Self {
            position,
            rotation,
            scale,
            matrix: Matrix4::identity(),
        };
        transform.update(0.0);
        transform
    }

    /// Recomposes the world matrix. The time step is unused; the transform
    /// has no motion of its own.
    pub fn update(&mut self, _delta_time: f32) {
        self.matrix = compose_world(self.position, self.rotation, self.scale);
    }

    pub fn set_transform(&mut self, position: Vector3<f32>, rotation: Vector3<f32>, scale: Vector3<f32>) {
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    pub fn rotation(&self) -> Vector3<f32> {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vector3<f32>) {
        self.rotation = rotation;
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
    }

    /// World matrix as of the last [`Transform::update`].
    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }
}
