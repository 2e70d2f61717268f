use glam::{EulerRot, Mat4, Quat, Vec3};

/// First-person camera: position plus yaw/pitch orientation.
///
/// Orientation is yaw-then-pitch with roll fixed at zero, so the horizon
/// stays upright no matter how the mouse moves. Looking straight ahead at
/// zero rotation means looking down -Z.
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 1.0),
            yaw: 0.0,
            pitch: 0.0,
            fov_y: 88.8f32.to_radians(),
            aspect: width as f32 / height as f32,
            z_near: 0.01,
            z_far: 1000.0,
        }
    }

    /// Current orientation as a quaternion (yaw about Y, then pitch about X).
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation() * Vec3::Y
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_to_rh(self.eye, self.forward(), self.up());
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }

    /// Reset to the spawn pose (origin-facing, one unit back from the cube).
    pub fn reset(&mut self) {
        self.eye = Vec3::new(0.0, 0.0, 1.0);
        self.yaw = 0.0;
        self.pitch = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rotation_looks_down_negative_z() {
        let cam = Camera::new(800, 600);
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((cam.right() - Vec3::X).length() < 1e-6);
        assert!((cam.up() - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn right_vector_stays_horizontal() {
        // Roll-free guarantee: right() never leaves the horizontal plane.
        let mut cam = Camera::new(800, 600);
        for (yaw, pitch) in [(0.3, 0.0), (2.0, 1.2), (-4.5, -1.5), (10.0, 0.7)] {
            cam.yaw = yaw;
            cam.pitch = pitch;
            assert!(cam.right().y.abs() < 1e-6, "rolled at yaw={yaw} pitch={pitch}");
        }
    }

    #[test]
    fn set_aspect_tracks_window() {
        let mut cam = Camera::new(800, 600);
        cam.set_aspect(1920, 1080);
        assert!((cam.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }
}
