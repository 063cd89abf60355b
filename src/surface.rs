use std::rc::Rc;
use std::sync::Arc;

use parking_lot::RwLock;

/// Drawable surface the rendering context is bound to.
pub trait CanvasSurface {
    /// Layout size in CSS pixels.
    fn client_size(&self) -> (f64, f64);
    /// Backing drawing-buffer size in device pixels.
    fn drawing_buffer_size(&self) -> (u32, u32);
    fn set_drawing_buffer_size(&self, width: u32, height: u32);
}

/// Surface with explicitly set sizes, used off the browser.
#[derive(Debug)]
pub struct StaticSurface {
    client: RwLock<(f64, f64)>,
    buffer: RwLock<(u32, u32)>,
}

impl StaticSurface {
    /// A surface whose backing buffer matches its client size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            client: RwLock::new((f64::from(width), f64::from(height))),
            buffer: RwLock::new((width, height)),
        }
    }

    pub fn set_client_size(&self, width: f64, height: f64) {
        *self.client.write() = (width.max(0.0), height.max(0.0));
    }
}

impl CanvasSurface for StaticSurface {
    fn client_size(&self) -> (f64, f64) {
        *self.client.read()
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        *self.buffer.read()
    }

    fn set_drawing_buffer_size(&self, width: u32, height: u32) {
        *self.buffer.write() = (width, height);
    }
}

impl<T> CanvasSurface for Arc<T>
where
    T: CanvasSurface + ?Sized,
{
    fn client_size(&self) -> (f64, f64) {
        (**self).client_size()
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (**self).drawing_buffer_size()
    }

    fn set_drawing_buffer_size(&self, width: u32, height: u32) {
        (**self).set_drawing_buffer_size(width, height)
    }
}

impl<T> CanvasSurface for Rc<T>
where
    T: CanvasSurface + ?Sized,
{
    fn client_size(&self) -> (f64, f64) {
        (**self).client_size()
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (**self).drawing_buffer_size()
    }

    fn set_drawing_buffer_size(&self, width: u32, height: u32) {
        (**self).set_drawing_buffer_size(width, height)
    }
}

#[cfg(target_arch = "wasm32")]
impl CanvasSurface for web_sys::HtmlCanvasElement {
    fn client_size(&self) -> (f64, f64) {
        (f64::from(self.client_width()), f64::from(self.client_height()))
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn set_drawing_buffer_size(&self, width: u32, height: u32) {
        self.set_width(width);
        self.set_height(height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_surface_tracks_both_sizes() {
        let surface = Arc::new(StaticSurface::new(640, 480));
        assert_eq!(surface.client_size(), (640.0, 480.0));

        surface.set_client_size(800.0, 600.0);
        surface.set_drawing_buffer_size(1600, 1200);
        assert_eq!(surface.client_size(), (800.0, 600.0));
        assert_eq!(surface.drawing_buffer_size(), (1600, 1200));
    }
}
