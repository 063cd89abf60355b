use crate::surface::CanvasSurface;

pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

/// Backing-buffer size for a client area at the given pixel ratio, with the
/// ratio capped at `max_ratio`.
pub fn backing_size(
    client_width: f64,
    client_height: f64,
    device_pixel_ratio: f64,
    max_ratio: f64,
) -> (u32, u32) {
    let ratio = device_pixel_ratio.min(max_ratio);
    let scale = |length: f64| (length * ratio).round().max(0.0) as u32;
    (scale(client_width), scale(client_height))
}

/// Resizes the surface's drawing buffer to match its client size.
pub fn resize_to_client<S>(surface: &S, device_pixel_ratio: f64, max_ratio: f64) -> (u32, u32)
where
    S: CanvasSurface + ?Sized,
{
    let (client_width, client_height) = surface.client_size();
    let (width, height) = backing_size(client_width, client_height, device_pixel_ratio, max_ratio);
    surface.set_drawing_buffer_size(width, height);
    log::debug!("resized drawing buffer to {width}x{height} (dpr {device_pixel_ratio})");
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::StaticSurface;

    #[test]
    fn scales_by_device_pixel_ratio() {
        assert_eq!(backing_size(800.0, 600.0, 1.5, MAX_DEVICE_PIXEL_RATIO), (1200, 900));
        assert_eq!(backing_size(800.0, 600.0, 1.0, MAX_DEVICE_PIXEL_RATIO), (800, 600));
    }

    #[test]
    fn ratio_is_capped() {
        assert_eq!(backing_size(800.0, 600.0, 3.0, MAX_DEVICE_PIXEL_RATIO), (1600, 1200));
        assert_eq!(backing_size(100.0, 100.0, 4.0, 1.0), (100, 100));
    }

    #[test]
    fn rounds_to_nearest_pixel() {
        assert_eq!(backing_size(333.0, 101.0, 1.25, MAX_DEVICE_PIXEL_RATIO), (416, 126));
        assert_eq!(backing_size(10.5, 0.0, 1.0, MAX_DEVICE_PIXEL_RATIO), (11, 0));
    }

    #[test]
    fn applies_size_to_surface() {
        let surface = StaticSurface::new(10, 10);
        surface.set_client_size(300.0, 150.0);
        let size = resize_to_client(&surface, 2.0, MAX_DEVICE_PIXEL_RATIO);
        assert_eq!(size, (600, 300));
        assert_eq!(surface.drawing_buffer_size(), (600, 300));
    }
}
