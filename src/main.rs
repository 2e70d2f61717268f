use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use flycam::{controller, logging, mesh, model, view};

use controller::{CameraController, MoveInput};
use model::{Camera, Cube, CUBE_SIZE};
use view::render::{self, CameraUniform, ModelUniform};
use view::GpuContext;

struct App {
    // Core GPU resources
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    window: Arc<Window>,

    // Rendering state
    pipeline: wgpu::RenderPipeline,
    cube_mesh: mesh::MeshBuffer,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    camera_buffer: wgpu::Buffer,
    model_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    // egui
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Scene state
    camera: Camera,
    cube: Cube,
    camera_controller: CameraController,

    // Input handling
    pressed_keys: HashSet<KeyCode>,
    look_delta: (f32, f32),
    mouse_locked: bool,

    // Frame timing
    last_frame_time: std::time::Instant,
    fps: f32,
    frame_count: u32,
    fps_timer: f32,
}

impl App {
    async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let gpu = GpuContext::new_native(window.clone()).await;
        let device = gpu.device.clone();
        let queue = gpu.queue.clone();
        let config = gpu.config.clone();

        let depth_format = wgpu::TextureFormat::Depth32Float;
        let (depth_texture, depth_view) =
            render::create_depth_texture(&device, size.width, size.height);

        let camera = Camera::new(size.width, size.height);
        let cube = Cube::new();

        let scene = render::create_scene_resources(&device);
        let cam_uniform = CameraUniform {
            view_proj: camera.view_proj().to_cols_array_2d(),
        };
        queue.write_buffer(&scene.camera_buffer, 0, bytemuck::bytes_of(&cam_uniform));

        let pipeline =
            render::create_cube_pipeline(&device, config.format, &scene.bind_group_layout, depth_format);
        let cube_mesh = mesh::create_cube_mesh(CUBE_SIZE).upload(&device);

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&device, config.format, egui_wgpu::RendererOptions::default());

        Self {
            surface: gpu.surface,
            device,
            queue,
            config,
            size,
            window,
            pipeline,
            cube_mesh,
            depth_texture,
            depth_view,
            camera_buffer: scene.camera_buffer,
            model_buffer: scene.model_buffer,
            bind_group: scene.bind_group,
            egui_renderer,
            egui_state,
            egui_ctx,
            camera,
            cube,
            camera_controller: CameraController::new(),
            pressed_keys: HashSet::new(),
            look_delta: (0.0, 0.0),
            mouse_locked: false,
            last_frame_time: std::time::Instant::now(),
            fps: 0.0,
            frame_count: 0,
            fps_timer: 0.0,
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // Let egui process the event first
        let egui_captured = self
            .egui_state
            .on_window_event(self.window.as_ref(), event)
            .consumed;
        if egui_captured {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    state, physical_key, ..
                },
                ..
            } => {
                if let PhysicalKey::Code(code) = physical_key {
                    match state {
                        ElementState::Pressed => {
                            self.pressed_keys.insert(*code);

                            if *code == KeyCode::KeyR {
                                self.camera.reset();
                            }
                            // Release the cursor on Escape
                            if *code == KeyCode::Escape {
                                self.set_mouse_locked(false);
                            }
                        }
                        ElementState::Released => {
                            self.pressed_keys.remove(code);
                        }
                    }
                }
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if *state == ElementState::Pressed && *button == MouseButton::Left {
                    self.set_mouse_locked(true);
                }
                true
            }
            _ => false,
        }
    }

    /// Grab/release the cursor; grab failures are logged, never fatal.
    fn set_mouse_locked(&mut self, locked: bool) {
        let mode = if locked {
            winit::window::CursorGrabMode::Locked
        } else {
            winit::window::CursorGrabMode::None
        };
        if let Err(e) = self.window.set_cursor_grab(mode) {
            warn!("cursor grab change failed: {e}");
            return;
        }
        self.window.set_cursor_visible(!locked);
        self.mouse_locked = locked;
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config =
                render::surface_config(self.config.format, self.config.alpha_mode, new_size.width, new_size.height);
            self.surface.configure(&self.device, &self.config);

            let (depth_texture, depth_view) =
                render::create_depth_texture(&self.device, new_size.width, new_size.height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;
            self.camera.set_aspect(new_size.width, new_size.height);
        }
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        if self.mouse_locked {
            self.look_delta.0 += dx as f32;
            self.look_delta.1 += dy as f32;
        }
    }

    fn move_input(&self) -> MoveInput {
        MoveInput {
            forward: self.pressed_keys.contains(&KeyCode::KeyW)
                || self.pressed_keys.contains(&KeyCode::ArrowUp),
            backward: self.pressed_keys.contains(&KeyCode::KeyS)
                || self.pressed_keys.contains(&KeyCode::ArrowDown),
            left: self.pressed_keys.contains(&KeyCode::KeyA)
                || self.pressed_keys.contains(&KeyCode::ArrowLeft),
            right: self.pressed_keys.contains(&KeyCode::KeyD)
                || self.pressed_keys.contains(&KeyCode::ArrowRight),
            up: self.pressed_keys.contains(&KeyCode::Space),
            down: self.pressed_keys.contains(&KeyCode::ShiftLeft)
                || self.pressed_keys.contains(&KeyCode::ShiftRight),
        }
    }

    fn update(&mut self, dt: f32) {
        // FPS counter for the debug overlay
        self.frame_count += 1;
        self.fps_timer += dt;
        if self.fps_timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
        }

        let held = self.move_input();
        let look = std::mem::take(&mut self.look_delta);
        self.camera_controller
            .update(&mut self.camera, &held, look, dt);
        self.cube.advance(dt);

        let cam_uniform = CameraUniform {
            view_proj: self.camera.view_proj().to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&cam_uniform));

        let model_uniform = ModelUniform {
            transform: self.cube.model_matrix().to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.model_buffer, 0, bytemuck::bytes_of(&model_uniform));
    }

    fn render_ui(&mut self) -> (Vec<egui::epaint::ClippedShape>, egui::TexturesDelta) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Debug")
                .default_pos([8.0, 8.0])
                .default_size([160.0, 100.0])
                .show(ctx, |ui| {
                    ui.label(egui::RichText::new(format!("FPS: {:.0}", self.fps)).small());
                    let eye = self.camera.eye;
                    ui.label(
                        egui::RichText::new(format!(
                            "Pos: {:.2}, {:.2}, {:.2}",
                            eye.x, eye.y, eye.z
                        ))
                        .small(),
                    );
                    ui.label(
                        egui::RichText::new(format!(
                            "Yaw: {:.2}  Pitch: {:.2}",
                            self.camera.yaw, self.camera.pitch
                        ))
                        .small(),
                    );

                    let mut fov_deg = self.camera.fov_y.to_degrees().clamp(30.0, 120.0);
                    ui.label(egui::RichText::new("FOV").small());
                    if ui
                        .add(egui::Slider::new(&mut fov_deg, 30.0..=120.0).step_by(1.0))
                        .changed()
                    {
                        self.camera.fov_y = fov_deg.to_radians();
                    }
                });
        });

        self.egui_state
            .handle_platform_output(&self.window, output.platform_output);
        (output.shapes, output.textures_delta)
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (shapes, textures_delta) = self.render_ui();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };
        let primitives = self
            .egui_ctx
            .tessellate(shapes, self.window.scale_factor() as f32);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &primitives,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.03,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.cube_mesh.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.cube_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.cube_mesh.index_count, 0, 0..1);
        }

        // egui overlay on top
        {
            let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
        }

        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn main() {
    logging::init();

    let event_loop = EventLoop::new().unwrap();
    let window_attributes = Window::default_attributes()
        .with_title("flycam")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = event_loop.create_window(window_attributes).unwrap();
    let window = Arc::new(window);

    let mut app = pollster::block_on(App::new(window.clone()));

    event_loop
        .run(move |event, elwt| {
            match event {
                Event::WindowEvent {
                    ref event,
                    window_id,
                } if window_id == app.window.id() => {
                    if !app.input(event) {
                        match event {
                            WindowEvent::CloseRequested => elwt.exit(),
                            WindowEvent::Resized(physical_size) => {
                                app.resize(*physical_size);
                            }
                            WindowEvent::RedrawRequested => {
                                let now = std::time::Instant::now();
                                let dt = (now - app.last_frame_time).as_secs_f32();
                                app.last_frame_time = now;

                                app.update(dt);

                                match app.render() {
                                    Ok(_) => {}
                                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                        app.resize(app.size)
                                    }
                                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                    Err(e) => warn!("surface error: {e:?}"),
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Event::DeviceEvent {
                    event: winit::event::DeviceEvent::MouseMotion { delta },
                    ..
                } => {
                    app.handle_mouse_motion(delta.0, delta.1);
                }
                Event::AboutToWait => {
                    app.window.request_redraw();
                }
                _ => {}
            }
        })
        .unwrap();
    // App drops here: GPU resources are released by ownership once the loop exits
}
