// CONTROLLER: input and per-frame update logic
pub mod camera_controller;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod frame_loop;

pub use camera_controller::{CameraController, FRICTION_HALF_LIFE};
pub use input::{InputEvent, InputProcessor, InputState, KeyBindings, MoveInput};
#[cfg(target_arch = "wasm32")]
pub use frame_loop::FrameLoopContext;
