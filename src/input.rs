use glam::Vec2;

/// Last known pointer position in clip space ([-1, 1] on both axes, y up).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    position: Vec2,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Records a pointer event given in window client coordinates.
    pub fn update(
        &mut self,
        client_x: f64,
        client_y: f64,
        inner_width: f64,
        inner_height: f64,
    ) -> Vec2 {
        self.position = to_clip_space(client_x, client_y, inner_width, inner_height);
        self.position
    }
}

/// Maps window client coordinates (origin top-left, y down) to clip space.
pub fn to_clip_space(client_x: f64, client_y: f64, inner_width: f64, inner_height: f64) -> Vec2 {
    let x = if inner_width > 0.0 {
        (client_x / inner_width) * 2.0 - 1.0
    } else {
        0.0
    };
    let y = if inner_height > 0.0 {
        (client_y / inner_height) * -2.0 + 1.0
    } else {
        0.0
    };
    Vec2::new(x as f32, y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_map_to_clip_space_extents() {
        assert_eq!(to_clip_space(0.0, 0.0, 800.0, 600.0), Vec2::new(-1.0, 1.0));
        assert_eq!(to_clip_space(800.0, 600.0, 800.0, 600.0), Vec2::new(1.0, -1.0));
        assert_eq!(to_clip_space(400.0, 300.0, 800.0, 600.0), Vec2::ZERO);
    }

    #[test]
    fn zero_sized_window_maps_to_origin() {
        assert_eq!(to_clip_space(10.0, 10.0, 0.0, 0.0), Vec2::ZERO);
    }

    #[test]
    fn pointer_state_keeps_last_position() {
        let mut pointer = PointerState::new();
        pointer.update(200.0, 150.0, 800.0, 600.0);
        assert_eq!(pointer.position(), Vec2::new(-0.5, 0.5));
    }
}
