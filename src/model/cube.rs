use glam::{Mat4, Quat};

/// Angular rate of the demo cube, radians per second about each local axis.
pub const SPIN_RATE: f32 = std::f32::consts::PI;

/// Edge length of the demo cube in world units.
pub const CUBE_SIZE: f32 = 0.2;

/// Spin state of the demo cube.
pub struct Cube {
    pub orientation: Quat,
}

impl Cube {
    pub fn new() -> Self {
        Self {
            orientation: Quat::IDENTITY,
        }
    }

    /// Advance the spin by one frame: rotate about local X, Y and Z in turn,
    /// each by `SPIN_RATE * dt`.
    pub fn advance(&mut self, dt: f32) {
        let angle = SPIN_RATE * dt;
        self.orientation = (self.orientation
            * Quat::from_rotation_x(angle)
            * Quat::from_rotation_y(angle)
            * Quat::from_rotation_z(angle))
        .normalize();
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_rotates_and_stays_normalized() {
        let mut cube = Cube::new();
        for _ in 0..600 {
            cube.advance(1.0 / 60.0);
        }
        assert!((cube.orientation.length() - 1.0).abs() < 1e-4);
        assert!(cube.orientation.angle_between(Quat::IDENTITY) > 1e-3);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut cube = Cube::new();
        cube.advance(0.0);
        assert!(cube.orientation.angle_between(Quat::IDENTITY) < 1e-6);
    }
}
