// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod mesh;

// MVC architecture
pub mod controller;
pub mod model;
pub mod view;

#[cfg(not(target_arch = "wasm32"))]
pub mod server;

// Common imports for the WASM entry path
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, Window};

#[cfg(target_arch = "wasm32")]
use controller::{CameraController, FrameLoopContext, InputEvent, InputProcessor, InputState};
#[cfg(target_arch = "wasm32")]
use model::{Camera, Cube, CUBE_SIZE};
#[cfg(target_arch = "wasm32")]
use view::render::{self, CameraUniform};
#[cfg(target_arch = "wasm32")]
use view::GpuContext;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logging::init();
    let (window, document, canvas) = init_canvas()?;
    setup_app(&window, &document, &canvas).await
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
) -> Result<(), JsValue> {
    let width = canvas.width();
    let height = canvas.height();

    let gpu = GpuContext::new(canvas, width, height)
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e:?}")))?;

    // Scene state: camera one unit back from the spinning cube
    let camera = Rc::new(RefCell::new(Camera::new(width, height)));
    let cube = Rc::new(RefCell::new(Cube::new()));
    let input_state = Rc::new(RefCell::new(InputState::new()));

    // Uniforms, pipeline, depth buffer
    let scene = render::create_scene_resources(gpu.device.as_ref());
    let cam_uniform = CameraUniform {
        view_proj: camera.borrow().view_proj().to_cols_array_2d(),
    };
    gpu.queue
        .as_ref()
        .write_buffer(&scene.camera_buffer, 0, bytemuck::bytes_of(&cam_uniform));

    let depth_format = wgpu::TextureFormat::Depth32Float;
    let (_depth_tex, depth_view) = render::create_depth_texture(gpu.device.as_ref(), width, height);
    let depth_view_cell = Rc::new(RefCell::new(depth_view));

    let pipeline =
        render::create_cube_pipeline(gpu.device.as_ref(), gpu.format, &scene.bind_group_layout, depth_format);
    let cube_mesh = mesh::create_cube_mesh(CUBE_SIZE).upload(gpu.device.as_ref());

    setup_input_listeners(document, window, canvas, input_state.clone(), camera.clone())?;

    let mut render_state = render::RenderState {
        format: gpu.format,
        alpha_mode: gpu.config.alpha_mode,
        width,
        height,
        pipeline,
        cube_mesh,
    };

    let mut frame_ctx = FrameLoopContext {
        camera,
        cube,
        input_state,
        input_processor: InputProcessor::default(),
        camera_controller: CameraController::new(),
        camera_buffer: scene.camera_buffer,
        model_buffer: scene.model_buffer,
        depth_view_cell,
        last_time: Rc::new(RefCell::new(
            window.performance().map(|p| p.now()).unwrap_or(0.0),
        )),
    };
    let bind_group = scene.bind_group;

    // Continuous redraw using requestAnimationFrame
    let f = RcCellCallback::new(window.clone(), {
        let window_for_loop = window.clone();

        move || {
            frame_ctx.update(
                gpu.device.as_ref(),
                gpu.queue.as_ref(),
                &window_for_loop,
                &gpu.surface,
                &mut render_state,
            );

            let dv = frame_ctx.depth_view_cell.borrow();
            render_state.draw_frame(
                gpu.device.as_ref(),
                gpu.queue.as_ref(),
                &gpu.surface,
                &dv,
                &bind_group,
            );
        }
    });
    f.start();

    Ok(())
}

/// Wire all DOM event listeners into the platform-agnostic input state
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    input_state: Rc<RefCell<InputState>>,
    camera: Rc<RefCell<Camera>>,
) -> Result<(), JsValue> {
    let input_processor = InputProcessor::default();

    // Keyboard down
    {
        let input_state = input_state.clone();
        let document_for_exit = document.clone();
        let input_processor = input_processor.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let key = e.key();

            if input_processor.is_escape(&key) {
                document_for_exit.exit_pointer_lock();
            } else if input_processor.wants_reset(&key) {
                camera.borrow_mut().reset();
                e.prevent_default();
            }

            // Keep movement keys away from browser scrolling
            if matches!(
                key.as_str(),
                "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | "w" | "a" | "s" | "d"
                    | "W" | "A" | "S" | "D" | " " | "Shift"
            ) {
                e.prevent_default();
            }

            input_state
                .borrow_mut()
                .process_event(&InputEvent::KeyDown(key));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let input_state = input_state.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            input_state
                .borrow_mut()
                .process_event(&InputEvent::KeyUp(e.key()));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - clear held keys so nothing sticks
    {
        let input_state = input_state.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            input_state.borrow_mut().process_event(&InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Pointer lock change
    {
        let input_state = input_state.clone();
        let doc_pl = document.clone();
        let plc = Closure::wrap(Box::new(move |_e: Event| {
            let locked = doc_pl.pointer_lock_element().is_some();
            input_state
                .borrow_mut()
                .process_event(&InputEvent::PointerLockChanged { locked });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("pointerlockchange", plc.as_ref().unchecked_ref())?;
        plc.forget();
    }

    // Pointer lock denial: log and keep running
    {
        let ple = Closure::wrap(Box::new(move |_e: Event| {
            tracing::warn!("pointer lock request was denied");
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("pointerlockerror", ple.as_ref().unchecked_ref())?;
        ple.forget();
    }

    // Canvas click: recenter the mouse tracker and (re)enter pointer lock
    {
        let input_state = input_state.clone();
        let canvas_click = canvas.clone();
        let window_click = window.clone();
        let doc_click = document.clone();
        let click = Closure::wrap(Box::new(move |_e: MouseEvent| {
            recenter_and_lock(&window_click, &doc_click, &canvas_click, &input_state);
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        click.forget();
    }

    // Mouse move
    {
        let input_state = input_state.clone();
        let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
            input_state.borrow_mut().process_event(&InputEvent::MouseMove {
                dx: e.movement_x() as f32,
                dy: e.movement_y() as f32,
            });
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
        mm.forget();
    }

    // Window resize: grow the canvas with the window and re-engage pointer
    // lock; the frame loop picks up the new size and reconfigures the surface
    {
        let input_state = input_state.clone();
        let window_rs = window.clone();
        let doc_rs = document.clone();
        let canvas_rs = canvas.clone();
        let resize = Closure::wrap(Box::new(move |_e: Event| {
            let (w, h) = window_inner_size(&window_rs);
            canvas_rs.set_width(w);
            canvas_rs.set_height(h);
            if input_state.borrow().pointer_locked {
                recenter_and_lock(&window_rs, &doc_rs, &canvas_rs, &input_state);
            }
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
        resize.forget();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn recenter_and_lock(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    input_state: &Rc<RefCell<InputState>>,
) {
    let (w, h) = window_inner_size(window);
    input_state.borrow_mut().center_mouse(w as f32, h as f32);

    // Release any existing lock before asking again
    if document.pointer_lock_element().is_some() {
        document.exit_pointer_lock();
    }
    canvas.request_pointer_lock();
}

#[cfg(target_arch = "wasm32")]
fn window_inner_size(window: &Window) -> (u32, u32) {
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0) as u32;
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(600.0) as u32;
    (w, h)
}

#[cfg(target_arch = "wasm32")]
fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;

    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    let (w, h) = window_inner_size(&window);
    canvas_el.set_width(w);
    canvas_el.set_height(h);
    body.append_child(&canvas_el)?;

    // FPS controls hide the cursor
    if let Ok(el) = body.dyn_into::<HtmlElement>() {
        let _ = el.style().set_property("cursor", "none");
    }

    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            inner.borrow_mut().as_mut()();

            // Recursively schedule next frame
            let cb_ref = callback_clone.borrow();
            window
                .request_animation_frame(cb_ref.as_ref().unwrap().as_ref().unchecked_ref())
                .expect("RAF failed");
        }) as Box<dyn FnMut()>));

        self.window
            .request_animation_frame(
                callback.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
            )
            .expect("RAF start failed");

        // Leak the closure to keep it alive for the life of the page
        std::mem::forget(callback);
    }
}
