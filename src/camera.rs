use glam::{Mat4, Vec3};

use crate::config::DemoConfig;

/// Fixed camera: a perspective projection and a single model translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_y_radians: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub translation: Vec3,
}

impl Camera {
    pub fn from_config(config: &DemoConfig) -> Self {
        Self {
            fov_y_radians: config.field_of_view_degrees.to_radians(),
            z_near: config.z_near,
            z_far: config.z_far,
            translation: config.model_translation,
        }
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.01), self.z_near, self.z_far)
    }

    pub fn model_view(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&DemoConfig::default())
    }
}

/// Width over height of the client area; 1.0 when it has no height.
pub fn aspect_ratio(client_width: f64, client_height: f64) -> f32 {
    if client_height <= 0.0 {
        1.0
    } else {
        (client_width / client_height) as f32
    }
}
