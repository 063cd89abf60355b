use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CANVAS_SELECTOR: &str = "#gpuCanvas";

/// Tunables for the demo. Every field has a default, so hosts only supply
/// what they want to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DemoConfig {
    pub canvas_selector: String,
    pub clear_color: [f32; 4],
    pub field_of_view_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub model_translation: Vec3,
    pub max_device_pixel_ratio: f64,
    pub position_components: i32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            canvas_selector: DEFAULT_CANVAS_SELECTOR.to_string(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            field_of_view_degrees: 45.0,
            z_near: 0.1,
            z_far: 100.0,
            model_translation: Vec3::new(0.0, 0.0, -0.5),
            max_device_pixel_ratio: 2.0,
            position_components: 2,
        }
    }
}

impl DemoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fov = self.field_of_view_degrees;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ConfigError::FieldOfView(fov));
        }
        if !(self.z_near > 0.0 && self.z_far > self.z_near) {
            return Err(ConfigError::ClipPlanes {
                near: self.z_near,
                far: self.z_far,
            });
        }
        if !(2..=3).contains(&self.position_components) {
            return Err(ConfigError::PositionComponents(self.position_components));
        }
        if !(self.max_device_pixel_ratio > 0.0) {
            return Err(ConfigError::PixelRatioCap(self.max_device_pixel_ratio));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DemoConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.canvas_selector, "#gpuCanvas");
        assert_eq!(config.position_components, 2);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: DemoConfig =
            serde_json::from_str(r#"{ "fieldOfViewDegrees": 60.0, "zFar": 50.0 }"#).unwrap();
        assert_eq!(config.field_of_view_degrees, 60.0);
        assert_eq!(config.z_far, 50.0);
        assert_eq!(config.z_near, 0.1);
        assert_eq!(config.model_translation, Vec3::new(0.0, 0.0, -0.5));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = DemoConfig {
            field_of_view_degrees: 180.0,
            ..DemoConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::FieldOfView(180.0)));

        config.field_of_view_degrees = 45.0;
        config.z_far = 0.05;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ClipPlanes { .. })
        ));

        config.z_far = 100.0;
        config.position_components = 4;
        assert_eq!(config.validate(), Err(ConfigError::PositionComponents(4)));

        config.position_components = 3;
        config.max_device_pixel_ratio = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PixelRatioCap(_))
        ));
    }
}
