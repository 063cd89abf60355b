//! Self-rescheduling frame loop on top of the host's per-frame callback.
//!
//! Each frame runs to completion and then asks the driver for the next one,
//! so there is never more than one pending request and no reentrancy.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::Result;

use crate::logger::Logger;

/// Callback invoked with the host timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Host facility that runs a callback before the next repaint.
pub trait FrameDriver {
    fn request_frame(&self, callback: FrameCallback) -> Result<()>;
}

impl<T> FrameDriver for Rc<T>
where
    T: FrameDriver + ?Sized,
{
    fn request_frame(&self, callback: FrameCallback) -> Result<()> {
        (**self).request_frame(callback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

pub struct FrameLoop<D> {
    driver: Rc<D>,
    state: Rc<Cell<LoopState>>,
    logger: Rc<Logger>,
}

impl<D> FrameLoop<D>
where
    D: FrameDriver + 'static,
{
    pub fn new(driver: Rc<D>, logger: Rc<Logger>) -> Self {
        Self {
            driver,
            state: Rc::new(Cell::new(LoopState::Idle)),
            logger,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    /// Requests the first frame and keeps `frame` running every frame after.
    ///
    /// Calling this while the loop is already running does nothing.
    pub fn start<F>(&self, frame: F) -> Result<()>
    where
        F: FnMut(f64) + 'static,
    {
        if self.state.get() == LoopState::Running {
            return Ok(());
        }
        self.state.set(LoopState::Running);
        let frame: Rc<RefCell<dyn FnMut(f64)>> = Rc::new(RefCell::new(frame));
        let result = schedule(
            Rc::clone(&self.driver),
            frame,
            Rc::clone(&self.state),
            Rc::clone(&self.logger),
        );
        if result.is_err() {
            self.state.set(LoopState::Idle);
        }
        result
    }
}

fn schedule<D>(
    driver: Rc<D>,
    frame: Rc<RefCell<dyn FnMut(f64)>>,
    state: Rc<Cell<LoopState>>,
    logger: Rc<Logger>,
) -> Result<()>
where
    D: FrameDriver + 'static,
{
    let next_driver = Rc::clone(&driver);
    driver.request_frame(Box::new(move |now| {
        (&mut *frame.borrow_mut())(now);
        let loop_state = Rc::clone(&state);
        let loop_logger = Rc::clone(&logger);
        if let Err(err) = schedule(next_driver, frame, state, logger) {
            loop_logger.error(&format!("failed to schedule next frame: {err:#}"));
            loop_state.set(LoopState::Idle);
        }
    }))
}

/// Driver that queues requests until [`ManualFrameDriver::run_pending`] is
/// called; stands in for the browser off the web.
#[derive(Default)]
pub struct ManualFrameDriver {
    pending: RefCell<VecDeque<FrameCallback>>,
    requested: Cell<usize>,
}

impl ManualFrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Total requests received so far.
    pub fn requested(&self) -> usize {
        self.requested.get()
    }

    /// Runs the callbacks queued before this call; requests they make wait
    /// for the next call. Returns how many ran.
    pub fn run_pending(&self, now_ms: f64) -> usize {
        let ready: Vec<FrameCallback> = self.pending.borrow_mut().drain(..).collect();
        let count = ready.len();
        for callback in ready {
            callback(now_ms);
        }
        count
    }
}

impl FrameDriver for ManualFrameDriver {
    fn request_frame(&self, callback: FrameCallback) -> Result<()> {
        self.pending.borrow_mut().push_back(callback);
        self.requested.set(self.requested.get() + 1);
        Ok(())
    }
}

/// Schedules frames with `window.requestAnimationFrame`.
#[cfg(target_arch = "wasm32")]
pub struct AnimationFrameDriver {
    window: web_sys::Window,
}

#[cfg(target_arch = "wasm32")]
impl AnimationFrameDriver {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("window not available"))?;
        Ok(Self { window })
    }
}

#[cfg(target_arch = "wasm32")]
impl FrameDriver for AnimationFrameDriver {
    fn request_frame(&self, callback: FrameCallback) -> Result<()> {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::JsCast;

        let closure = Closure::once_into_js(move |now: f64| callback(now));
        self.window
            .request_animation_frame(closure.unchecked_ref::<js_sys::Function>())
            .map_err(|err| anyhow::anyhow!("requestAnimationFrame failed: {err:?}"))?;
        Ok(())
    }
}
