use std::cell::RefCell;
use std::rc::Rc;

use web_sys::Window;
use wgpu::{Device, Queue, Surface, TextureView};

use crate::controller::camera_controller::CameraController;
use crate::controller::input::{InputProcessor, InputState};
use crate::model::{Camera, Cube};
use crate::view::render::{create_depth_texture, surface_config, CameraUniform, ModelUniform, RenderState};

/// Per-frame update state for the browser game loop.
pub struct FrameLoopContext {
    pub camera: Rc<RefCell<Camera>>,
    pub cube: Rc<RefCell<Cube>>,
    pub input_state: Rc<RefCell<InputState>>,
    pub input_processor: InputProcessor,
    pub camera_controller: CameraController,
    pub camera_buffer: wgpu::Buffer,
    pub model_buffer: wgpu::Buffer,
    pub depth_view_cell: Rc<RefCell<TextureView>>,
    pub last_time: Rc<RefCell<f64>>,
}

impl FrameLoopContext {
    /// Advance camera and cube by one frame and sync GPU uniforms.
    pub fn update(
        &mut self,
        device: &Device,
        queue: &Queue,
        window: &Window,
        surface: &Surface,
        render_state: &mut RenderState,
    ) {
        // Time step, clamped so a background tab doesn't integrate a huge jump
        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        let mut last = self.last_time.borrow_mut();
        let dt = ((now - *last) / 1000.0).clamp(0.0, 0.1) as f32;
        *last = now;
        drop(last);

        // Consume look input before snapshotting the movement flags
        let look = self.input_state.borrow_mut().consume_look();
        let held = self.input_processor.move_input(&self.input_state.borrow());

        self.camera_controller
            .update(&mut self.camera.borrow_mut(), &held, look, dt);
        self.cube.borrow_mut().advance(dt);

        self.handle_resize(window, device, surface, render_state);

        let cam_uniform = CameraUniform {
            view_proj: self.camera.borrow().view_proj().to_cols_array_2d(),
        };
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&cam_uniform));

        let model_uniform = ModelUniform {
            transform: self.cube.borrow().model_matrix().to_cols_array_2d(),
        };
        queue.write_buffer(&self.model_buffer, 0, bytemuck::bytes_of(&model_uniform));
    }

    fn handle_resize(
        &self,
        window: &Window,
        device: &Device,
        surface: &Surface,
        render_state: &mut RenderState,
    ) {
        if let (Ok(w), Ok(h)) = (window.inner_width(), window.inner_height()) {
            let nw = w.as_f64().unwrap_or(800.0) as u32;
            let nh = h.as_f64().unwrap_or(600.0) as u32;
            if nw != render_state.width || nh != render_state.height {
                self.camera.borrow_mut().set_aspect(nw, nh);
                render_state.width = nw;
                render_state.height = nh;

                surface.configure(
                    device,
                    &surface_config(render_state.format, render_state.alpha_mode, nw, nh),
                );

                let (_, depth_view) = create_depth_texture(device, nw, nh);
                *self.depth_view_cell.borrow_mut() = depth_view;
            }
        }
    }
}
