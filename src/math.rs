//! Left-handed matrix helpers.
//!
//! Matrices use cgmath's column-vector convention, so `a * b` applies `b`
//! first. Stored column by column they are exactly what a row-vector
//! Direct3D-style matrix looks like after a transpose, which is the layout
//! the shader reads.

use cgmath::{InnerSpace, Matrix4, Rad, Vector3, Vector4};

/// Rotation by Euler angles in radians: roll about z, then pitch about x,
/// then yaw about y.
pub fn rotation_roll_pitch_yaw(pitch: f32, yaw: f32, roll: f32) -> Matrix4<f32> {
    Matrix4::from_angle_y(Rad(yaw)) * Matrix4::from_angle_x(Rad(pitch)) * Matrix4::from_angle_z(Rad(roll))
}

/// World matrix: scale, then rotate, then translate. `rotation` holds
/// (pitch, yaw, roll).
pub fn compose_world(position: Vector3<f32>, rotation: Vector3<f32>, scale: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(position)
        * rotation_roll_pitch_yaw(rotation.x, rotation.y, rotation.z)
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

/// View matrix of an eye at `eye` looking along `direction`.
pub fn look_to_lh(eye: Vector3<f32>, direction: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    let z = direction.normalize();
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    Matrix4::from_cols(
        Vector4::new(x.x, y.x, z.x, 0.0),
        Vector4::new(x.y, y.y, z.y, 0.0),
        Vector4::new(x.z, y.z, z.z, 0.0),
        Vector4::new(-x.dot(eye), -y.dot(eye), -z.dot(eye), 1.0),
    )
}

/// View matrix of an eye at `eye` looking at `target`.
pub fn look_at_lh(eye: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    look_to_lh(eye, target - eye, up)
}

/// Perspective projection mapping view depth `near..far` to `0..1`.
pub fn perspective_fov_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let h = 1.0 / (fov_y * 0.5).tan();
    let w = h / aspect;
    let range = far / (far - near);
    Matrix4::from_cols(
        Vector4::new(w, 0.0, 0.0, 0.0),
        Vector4::new(0.0, h, 0.0, 0.0),
        Vector4::new(0.0, 0.0, range, 1.0),
        Vector4::new(0.0, 0.0, -range * near, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point3, Transform};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn look_to_puts_the_eye_at_the_origin() {
        let eye = Vector3::new(1.0, 2.0, -5.0);
        let view = look_to_lh(eye, Vector3::unit_z(), Vector3::unit_y());
        let p = view.transform_point(Point3::new(1.0, 2.0, -5.0));
        assert!(close(p.x, 0.0) && close(p.y, 0.0) && close(p.z, 0.0), "{p:?}");
        let ahead = view.transform_point(Point3::new(1.0, 2.0, -3.0));
        assert!(close(ahead.z, 2.0), "{ahead:?}");
        let right = view.transform_point(Point3::new(2.0, 2.0, -5.0));
        assert!(close(right.x, 1.0), "{right:?}");
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth() {
        let proj = perspective_fov_lh(std::f32::consts::FRAC_PI_4, 1.5, 0.01, 100.0);
        let near = proj * Vector4::new(0.0, 0.0, 0.01, 1.0);
        let far = proj * Vector4::new(0.0, 0.0, 100.0, 1.0);
        assert!(close(near.z / near.w, 0.0));
        assert!(close(far.z / far.w, 1.0));
    }
}
