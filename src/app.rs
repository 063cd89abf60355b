use std::cell::RefCell;
use std::rc::Rc;

use crate::buffers::init_buffers;
use crate::camera::Camera;
use crate::config::DemoConfig;
use crate::error::StartupError;
use crate::frame_loop::{FrameDriver, FrameLoop, LoopState};
use crate::geometry::plane;
use crate::gl::{ClearMask, GraphicsContext};
use crate::logger::Logger;
use crate::program::{DemoUniform, ProgramInfo};
use crate::render::Renderer;
use crate::resize::resize_to_client;
use crate::shader::{compile_program, ShaderSources};
use crate::surface::CanvasSurface;

/// Builds everything the first frame needs.
///
/// Each failure is logged once at error severity and returned; nothing is
/// scheduled in that case.
pub fn startup<C, S>(
    context: C,
    surface: S,
    sources: &ShaderSources,
    config: &DemoConfig,
    logger: &Logger,
) -> Result<Renderer<C, S>, StartupError>
where
    C: GraphicsContext,
    S: CanvasSurface,
{
    if let Err(err) = config.validate() {
        let err = StartupError::from(err);
        logger.error(&err.to_string());
        return Err(err);
    }

    context.clear_color(config.clear_color);
    context.clear(ClearMask::COLOR);

    let program = compile_program(&context, logger, sources)?;
    let program: ProgramInfo<C, DemoUniform> = ProgramInfo::resolve(&context, program, logger);

    let buffers = match init_buffers(&context, &plane(), config.position_components) {
        Ok(buffers) => buffers,
        Err(err) => {
            context.delete_program(&program.program);
            let err = StartupError::from(err);
            logger.error(&err.to_string());
            return Err(err);
        }
    };

    log::info!(
        "plane demo ready: {} vertices, {}-component positions",
        buffers.vertex_count,
        buffers.position_components
    );
    Ok(Renderer::new(
        context,
        surface,
        program,
        buffers,
        Camera::from_config(config),
        config.clear_color,
    ))
}

/// A started (or startable) demo: the renderer plus the loop driving it.
pub struct Demo<C: GraphicsContext, S, D> {
    renderer: Rc<RefCell<Renderer<C, S>>>,
    frame_loop: FrameLoop<D>,
    logger: Rc<Logger>,
    config: DemoConfig,
}

impl<C, S, D> Demo<C, S, D>
where
    C: GraphicsContext + 'static,
    S: CanvasSurface + 'static,
    D: FrameDriver + 'static,
{
    /// Runs [`startup`] without scheduling any frame.
    pub fn new(
        context: C,
        surface: S,
        sources: &ShaderSources,
        config: DemoConfig,
        logger: Rc<Logger>,
        driver: Rc<D>,
    ) -> Result<Self, StartupError> {
        let renderer = startup(context, surface, sources, &config, &logger)?;
        Ok(Self {
            renderer: Rc::new(RefCell::new(renderer)),
            frame_loop: FrameLoop::new(driver, Rc::clone(&logger)),
            logger,
            config,
        })
    }

    /// Runs [`startup`] and schedules the first frame.
    pub fn launch(
        context: C,
        surface: S,
        sources: &ShaderSources,
        config: DemoConfig,
        logger: Rc<Logger>,
        driver: Rc<D>,
    ) -> Result<Self, StartupError> {
        let demo = Self::new(context, surface, sources, config, logger, driver)?;
        demo.start()?;
        Ok(demo)
    }

    /// Starts the frame loop. Frame errors are logged as warnings and do
    /// not stop the loop.
    pub fn start(&self) -> Result<(), StartupError> {
        let renderer = Rc::clone(&self.renderer);
        let logger = Rc::clone(&self.logger);
        self.frame_loop
            .start(move |now| {
                if let Err(err) = renderer.borrow_mut().render_frame(now) {
                    logger.warn(&format!("frame at {now:.1} ms: {err}"));
                }
            })
            .map_err(|err| {
                let err = StartupError::Schedule(format!("{err:#}"));
                self.logger.error(&err.to_string());
                err
            })
    }

    pub fn state(&self) -> LoopState {
        self.frame_loop.state()
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn renderer(&self) -> Rc<RefCell<Renderer<C, S>>> {
        Rc::clone(&self.renderer)
    }

    /// Window resize: refits the drawing buffer to the canvas client size.
    pub fn resize(&self, device_pixel_ratio: f64) -> (u32, u32) {
        let renderer = self.renderer.borrow();
        resize_to_client(
            renderer.surface(),
            device_pixel_ratio,
            self.config.max_device_pixel_ratio,
        )
    }

    /// Pointer move in window client coordinates.
    pub fn pointer_moved(
        &self,
        client_x: f64,
        client_y: f64,
        inner_width: f64,
        inner_height: f64,
    ) {
        self.renderer
            .borrow_mut()
            .pointer_moved(client_x, client_y, inner_width, inner_height);
    }
}
