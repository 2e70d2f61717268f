// MODEL: scene state and data
pub mod camera;
pub mod cube;

pub use camera::Camera;
pub use cube::{Cube, CUBE_SIZE, SPIN_RATE};
