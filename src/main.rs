//! Balloon Pop entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, PageTransitionEvent, TouchEvent};

    use balloon_pop::renderer::RenderState;
    use balloon_pop::sim::{AnimationDriver, LoopHandle, Scene, TickInput, spawn_batch};
    use balloon_pop::{PhysicsTuning, SceneSettings};

    struct App {
        scene: Scene,
        driver: AnimationDriver,
        loop_handle: Option<LoopHandle>,
        render_state: Option<RenderState>,
        /// Pointer input collected between frames
        input: TickInput,
        raf_id: Option<i32>,
        /// Last value written to the counter element
        shown_remaining: Option<usize>,
    }

    impl App {
        fn new(scene: Scene) -> Self {
            Self {
                scene,
                driver: AnimationDriver::new(),
                loop_handle: None,
                render_state: None,
                input: TickInput::default(),
                raf_id: None,
                shown_remaining: None,
            }
        }

        fn start(&mut self, now: f64) {
            self.loop_handle = Some(self.driver.start(now));
        }

        /// Tick and draw one frame. Returns false once the loop was stopped
        fn frame(&mut self, time: f64) -> bool {
            let input = std::mem::take(&mut self.input);
            if !self.driver.frame(&mut self.scene, &input, time) {
                return false;
            }
            self.render();
            self.update_counter();
            true
        }

        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.scene.views()) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let viewport = render_state.viewport;
                        render_state.resize(render_state.size.0, render_state.size.1, viewport);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Balloons-left counter in the DOM
        fn update_counter(&mut self) {
            let remaining = self.scene.remaining();
            if self.shown_remaining == Some(remaining) {
                return;
            }
            self.shown_remaining = Some(remaining);

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("balloons-left") {
                el.set_text_content(Some(&remaining.to_string()));
            }
        }

        fn resize(&mut self, canvas: &HtmlCanvasElement, dpr: f64) {
            let client_w = canvas.client_width();
            let client_h = canvas.client_height();
            if client_w <= 0 || client_h <= 0 {
                return;
            }
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);

            let viewport = Vec2::new(client_w as f32, client_h as f32);
            self.scene.resize(viewport.x, viewport.y);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height, viewport);
            }
            log::debug!("Viewport resized to {}x{}", client_w, client_h);
        }

        /// Restart a loop stopped by `shutdown`. Returns false if it was still running
        fn resume(&mut self, now: f64) -> bool {
            if self.driver.is_running() {
                return false;
            }
            let resumed = self.scene.resume_pops();
            self.start(now);
            log::info!("Page restored, {} pop animations resumed", resumed);
            true
        }

        /// Stop the loop, cancel the pending frame and every pop timer
        fn shutdown(&mut self) {
            if let Some(handle) = self.loop_handle.take() {
                self.driver.stop(handle, &mut self.scene);
            }
            if let Some(id) = self.raf_id.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Balloon Pop starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Canvas backing store in physical pixels, simulation in CSS pixels
        let dpr = window.device_pixel_ratio();
        let mut client_w = canvas.client_width() as f32;
        let mut client_h = canvas.client_height() as f32;
        if client_w <= 0.0 || client_h <= 0.0 {
            client_w = balloon_pop::consts::FALLBACK_WIDTH;
            client_h = balloon_pop::consts::FALLBACK_HEIGHT;
        }
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = SceneSettings::load();
        let tuning = PhysicsTuning::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let settings = settings.with_seed(seed);

        let mut scene = Scene::new(client_w, client_h, settings, tuning, seed);
        spawn_batch(&mut scene);
        let app = Rc::new(RefCell::new(App::new(scene)));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state =
            RenderState::new(surface, &adapter, width, height, Vec2::new(client_w, client_h)).await;
        app.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, app.clone());
        setup_resize(&canvas, app.clone());
        setup_teardown(app.clone());

        app.borrow_mut().start(js_sys::Date::now());
        request_animation_frame(app);

        log::info!("Balloon Pop running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse click: offset is already relative to the canvas in CSS pixels
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let tap = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                app.borrow_mut().input.taps.push(tap);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start: every new finger is a tap
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let rect = canvas_clone.get_bounding_client_rect();
                let touches = event.changed_touches();
                let mut a = app.borrow_mut();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let x = touch.client_x() as f32 - rect.left() as f32;
                        let y = touch.client_y() as f32 - rect.top() as f32;
                        a.input.taps.push(Vec2::new(x, y));
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            app.borrow_mut().resize(&canvas, dpr);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_teardown(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        // Leaving the page stops the loop and every pop timer
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().shutdown();
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restored from the back/forward cache: pick up where it stopped
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PageTransitionEvent| {
                if !event.persisted() {
                    return;
                }
                let resumed = app.borrow_mut().resume(js_sys::Date::now());
                if resumed {
                    request_animation_frame(app.clone());
                }
            });
            let _ = window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let app_clone = app.clone();
        let closure = Closure::once(move |time: f64| {
            app_loop(app_clone, time);
        });
        if let Ok(id) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            app.borrow_mut().raf_id = Some(id);
        }
        closure.forget();
    }

    fn app_loop(app: Rc<RefCell<App>>, time: f64) {
        let keep_running = {
            let mut a = app.borrow_mut();
            a.raf_id = None;
            a.frame(time)
        };

        if keep_running {
            request_animation_frame(app);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Balloon Pop (native) starting...");
    log::info!("Native mode runs a headless simulation - run with `trunk serve` for the web version");

    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Spawn a field, pop a balloon every half second and report how it went
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use balloon_pop::consts::{FALLBACK_HEIGHT, FALLBACK_WIDTH};
    use balloon_pop::sim::{AnimationDriver, Scene, TickInput, spawn_batch};
    use balloon_pop::{PhysicsTuning, SceneSettings};

    let settings = SceneSettings::load();
    let tuning = PhysicsTuning::load();
    let seed = settings.seed.unwrap_or(2024);
    let settings = settings.with_seed(seed);
    let frame_ms = tuning.frame_ms as f64;

    let mut scene = Scene::new(FALLBACK_WIDTH, FALLBACK_HEIGHT, settings, tuning, seed);
    spawn_batch(&mut scene);

    let mut driver = AnimationDriver::new();
    let handle = driver.start(0.0);

    let mut now = 0.0;
    let mut pops = 0;
    for frame in 1..=3600u32 {
        now += frame_ms;
        let mut input = TickInput::default();
        if frame % 30 == 0 {
            // Tap the middle of the topmost floating balloon
            if let Some(target) = scene.balloons.iter().rev().find(|b| b.is_active()) {
                input.taps.push(target.pos);
                pops += 1;
            }
        }
        driver.frame(&mut scene, &input, now);

        if scene.balloons.is_empty() {
            break;
        }
    }

    log::info!(
        "{} frames, {} taps, {} balloons left",
        driver.frames(),
        pops,
        scene.remaining()
    );
    driver.stop(handle, &mut scene);
    println!(
        "✓ Simulated {:.1}s: {} of {} balloons popped",
        now / 1000.0,
        scene.settings.count as usize - scene.remaining(),
        scene.settings.count
    );
}
