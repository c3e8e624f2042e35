//! First-person camera: WASD moves along the view direction, mouse motion
//! turns it.

use cgmath::{InnerSpace, Matrix4, Vector3};
use winit::keyboard::KeyCode;

use crate::{input::InputState, math::look_at_lh};

/// Pitch stays strictly inside straight up and straight down.
pub const PITCH_LIMIT: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub forward: Vector3<f32>,
    pub right: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 2.0, -5.0), Vector3::new(0.0, 2.0, 0.0))
    }
}

impl Camera {
    /// A camera at `position` looking at `target`. A target on the
    /// position itself looks down +z.
    pub fn new(position: Vector3<f32>, target: Vector3<f32>) -> Self {
        let direction = target - position;
        let (yaw, pitch) = if direction.magnitude2() > 0.0 {
            let d = direction.normalize();
            (d.z.atan2(d.x), d.y.asin().clamp(-PITCH_LIMIT, PITCH_LIMIT))
        } else {
            (std::f32::consts::FRAC_PI_2, 0.0)
        };
        let mut camera = Self {
            position,
            target,
            up: Vector3::unit_y(),
            forward: Vector3::unit_z(),
            right: Vector3::unit_x(),
            yaw,
            pitch,
        };
        camera.update_vectors();
        camera
    }

    /// W/S move along `forward`, A/D along `right`.
    pub fn move_with_input(&mut self, input: &InputState, delta_time: f32, speed: f32) {
        let step = speed * delta_time;
        if input.is_pressed(KeyCode::KeyW) {
            self.position += self.forward * step;
        }
        if input.is_pressed(KeyCode::KeyS) {
            self.position -= self.forward * step;
        }
        if input.is_pressed(KeyCode::KeyA) {
            self.position -= self.right * step;
        }
        if input.is_pressed(KeyCode::KeyD) {
            self.position += self.right * step;
        }
        self.target = self.position + self.forward;
    }

    /// Turns by a mouse movement in pixels. Moving right turns right, moving
    /// down looks down.
    pub fn rotate(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw -= dx * sensitivity;
        self.pitch = (self.pitch - dy * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    fn update_vectors(&mut self) {
        self.forward = Vector3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize();
        self.right = self.up.cross(self.forward).normalize();
        self.target = self.position + self.forward;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        look_at_lh(self.position, self.target, self.up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::ElementState;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn starts_looking_down_z_with_x_to_the_right() {
        let camera = Camera::default();
        assert!(close(camera.forward, Vector3::unit_z()), "{:?}", camera.forward);
        assert!(close(camera.right, Vector3::unit_x()), "{:?}", camera.right);
        assert!(close(camera.target, Vector3::new(0.0, 2.0, -4.0)));
    }

    #[test]
    fn looks_at_its_target() {
        let target = Vector3::new(0.0, 1.0, 0.0);
        let camera = Camera::new(Vector3::new(0.0, 3.0, -6.0), target);
        assert!(camera.pitch < 0.0);
        let p = camera.view_matrix() * target.extend(1.0);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5, "{p:?}");
        assert!((p.z - 40f32.sqrt()).abs() < 1e-4, "{p:?}");
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.rotate(0.0, -10_000.0, 0.1);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        assert!(camera.forward.y > 0.99);
        camera.rotate(0.0, 10_000.0, 0.1);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn moving_right_turns_right() {
        let mut camera = Camera::default();
        camera.rotate(10.0, 0.0, 0.01);
        assert!(camera.forward.x > 0.0);
    }

    #[test]
    fn wasd_moves_relative_to_the_view() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.on_key(KeyCode::KeyW, ElementState::Pressed);
        input.on_key(KeyCode::KeyD, ElementState::Pressed);
        camera.move_with_input(&input, 0.5, 2.0);
        assert!(close(camera.position, Vector3::new(1.0, 2.0, -4.0)), "{:?}", camera.position);
    }
}
