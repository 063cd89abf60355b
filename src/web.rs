#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use anyhow::{anyhow, Result};
use gloo_events::EventListener;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlCanvasElement, MouseEvent, WebGl2RenderingContext, Window};

use crate::app::Demo;
use crate::config::DemoConfig;
use crate::frame_loop::{AnimationFrameDriver, LoopState};
use crate::logger::Logger;
use crate::shader::{ShaderSources, DEFAULT_FRAGMENT_SHADER, DEFAULT_VERTEX_SHADER};

type BrowserDemo = Demo<WebGl2RenderingContext, HtmlCanvasElement, AnimationFrameDriver>;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    let _ = wasm_logger::init(wasm_logger::Config::default());
}

#[wasm_bindgen(js_name = defaultVertexShader)]
pub fn default_vertex_shader() -> String {
    DEFAULT_VERTEX_SHADER.to_string()
}

#[wasm_bindgen(js_name = defaultFragmentShader)]
pub fn default_fragment_shader() -> String {
    DEFAULT_FRAGMENT_SHADER.to_string()
}

/// Optional overrides passed to [`WebDemo`]; unset fields keep their defaults.
#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct DemoOptions {
    config: DemoConfig,
}

#[wasm_bindgen]
impl DemoOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> DemoOptions {
        Self::default()
    }

    #[wasm_bindgen(js_name = setCanvasSelector)]
    pub fn set_canvas_selector(&mut self, selector: String) {
        self.config.canvas_selector = selector;
    }

    #[wasm_bindgen(js_name = setClearColor)]
    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.config.clear_color = [r, g, b, a];
    }

    #[wasm_bindgen(js_name = setFieldOfView)]
    pub fn set_field_of_view(&mut self, degrees: f32) {
        self.config.field_of_view_degrees = degrees;
    }

    #[wasm_bindgen(js_name = setClipPlanes)]
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.config.z_near = near;
        self.config.z_far = far;
    }

    #[wasm_bindgen(js_name = setModelTranslation)]
    pub fn set_model_translation(&mut self, x: f32, y: f32, z: f32) {
        self.config.model_translation = glam::Vec3::new(x, y, z);
    }

    #[wasm_bindgen(js_name = setMaxDevicePixelRatio)]
    pub fn set_max_device_pixel_ratio(&mut self, ratio: f64) {
        self.config.max_device_pixel_ratio = ratio;
    }

    #[wasm_bindgen(js_name = setPositionComponents)]
    pub fn set_position_components(&mut self, components: i32) {
        self.config.position_components = components;
    }
}

/// The demo bound to a page canvas.
#[wasm_bindgen]
pub struct WebDemo {
    demo: Rc<BrowserDemo>,
    listening: bool,
}

#[wasm_bindgen]
impl WebDemo {
    /// Finds the canvas, sizes it to the window and builds the program.
    /// Nothing is drawn until [`WebDemo::start`].
    #[wasm_bindgen(constructor)]
    pub fn new(
        vertex_source: String,
        fragment_source: String,
        options: Option<DemoOptions>,
    ) -> Result<WebDemo, JsValue> {
        let config = options.map(|options| options.config).unwrap_or_default();
        let sources = ShaderSources::new(vertex_source, fragment_source);
        let logger = Rc::new(Logger::browser());

        let (canvas, context, driver) = acquire(&config.canvas_selector).map_err(|err| {
            let message = format!("{err:#}");
            logger.error(&message);
            JsValue::from_str(&message)
        })?;

        let demo = Demo::new(context, canvas, &sources, config, logger, Rc::new(driver))
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(Self {
            demo: Rc::new(demo),
            listening: false,
        })
    }

    #[wasm_bindgen(js_name = withDefaultShaders)]
    pub fn with_default_shaders(options: Option<DemoOptions>) -> Result<WebDemo, JsValue> {
        Self::new(
            DEFAULT_VERTEX_SHADER.to_string(),
            DEFAULT_FRAGMENT_SHADER.to_string(),
            options,
        )
    }

    /// Subscribes to window resize and pointer moves, then starts drawing.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if !self.listening {
            listen(&self.demo).map_err(|err| JsValue::from_str(&format!("{err:#}")))?;
            self.listening = true;
        }
        self.demo
            .start()
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.demo.state() == LoopState::Running
    }
}

fn acquire(
    selector: &str,
) -> Result<(HtmlCanvasElement, WebGl2RenderingContext, AnimationFrameDriver)> {
    let window = window().ok_or_else(|| anyhow!("window not available"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow!("document not available"))?;
    let canvas = document
        .query_selector(selector)
        .map_err(|err| anyhow!("invalid canvas selector {selector:?}: {err:?}"))?
        .ok_or_else(|| anyhow!("no element matches {selector:?}"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow!("element {selector:?} is not a canvas"))?;

    let (width, height) = inner_size(&window);
    canvas.set_width(width.round() as u32);
    canvas.set_height(height.round() as u32);

    let context = canvas
        .get_context("webgl2")
        .map_err(|err| anyhow!("failed to request a webgl2 context: {err:?}"))?
        .ok_or_else(|| anyhow!("unable to initialize WebGL2; the browser may not support it"))?
        .dyn_into::<WebGl2RenderingContext>()
        .map_err(|_| anyhow!("context is not a WebGL2RenderingContext"))?;

    let driver = AnimationFrameDriver::new()?;
    Ok((canvas, context, driver))
}

fn inner_size(window: &Window) -> (f64, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    (width, height)
}

// Both listeners live as long as the page.
fn listen(demo: &Rc<BrowserDemo>) -> Result<()> {
    let window = window().ok_or_else(|| anyhow!("window not available"))?;

    {
        let demo = Rc::clone(demo);
        let source = window.clone();
        EventListener::new(&window, "resize", move |_event| {
            demo.resize(source.device_pixel_ratio());
        })
        .forget();
    }

    {
        let demo = Rc::clone(demo);
        let source = window.clone();
        EventListener::new(&window, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let (width, height) = inner_size(&source);
            demo.pointer_moved(
                f64::from(event.client_x()),
                f64::from(event.client_y()),
                width,
                height,
            );
        })
        .forget();
    }

    Ok(())
}
