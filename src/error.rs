use std::fmt;

use thiserror::Error;

use crate::gl::ShaderStage;

/// Kind of driver object whose creation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlObject {
    Shader(ShaderStage),
    Program,
    Buffer,
}

impl fmt::Display for GlObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlObject::Shader(stage) => write!(f, "{stage} shader"),
            GlObject::Program => f.write_str("shader program"),
            GlObject::Buffer => f.write_str("buffer"),
        }
    }
}

/// Error flag returned by `getError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlErrorCode(pub u32);

impl GlErrorCode {
    pub const INVALID_ENUM: Self = Self(0x0500);
    pub const INVALID_VALUE: Self = Self(0x0501);
    pub const INVALID_OPERATION: Self = Self(0x0502);
    pub const OUT_OF_MEMORY: Self = Self(0x0505);
    pub const INVALID_FRAMEBUFFER_OPERATION: Self = Self(0x0506);
    pub const CONTEXT_LOST: Self = Self(0x9242);

    fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::INVALID_ENUM => "INVALID_ENUM",
            Self::INVALID_VALUE => "INVALID_VALUE",
            Self::INVALID_OPERATION => "INVALID_OPERATION",
            Self::OUT_OF_MEMORY => "OUT_OF_MEMORY",
            Self::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
            Self::CONTEXT_LOST => "CONTEXT_LOST_WEBGL",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for GlErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} (0x{:04x})", self.0),
            None => write!(f, "unknown error 0x{:04x}", self.0),
        }
    }
}

/// Failure while building the shader program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    #[error("failed to create {0}")]
    ObjectCreation(GlObject),
    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("failed to link shader program: {log}")]
    Link { log: String },
}

/// Failure while uploading resources or drawing a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("failed to create {0}")]
    ObjectCreation(GlObject),
    #[error("graphics driver reported {0}")]
    Driver(GlErrorCode),
}

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("field of view must be within (0, 180) degrees, got {0}")]
    FieldOfView(f32),
    #[error("clip planes must satisfy 0 < near < far, got near={near} far={far}")]
    ClipPlanes { near: f32, far: f32 },
    #[error("position attribute must have 2 or 3 components, got {0}")]
    PositionComponents(i32),
    #[error("device pixel ratio cap must be positive, got {0}")]
    PixelRatioCap(f64),
}

/// Reason startup stopped before the first frame was scheduled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to schedule the first frame: {0}")]
    Schedule(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_render_their_names() {
        assert_eq!(
            GlErrorCode::INVALID_OPERATION.to_string(),
            "INVALID_OPERATION (0x0502)"
        );
        assert_eq!(GlErrorCode(0x1234).to_string(), "unknown error 0x1234");
    }

    #[test]
    fn object_creation_names_the_stage() {
        let err = ShaderError::ObjectCreation(GlObject::Shader(ShaderStage::Fragment));
        assert_eq!(err.to_string(), "failed to create fragment shader");
    }
}
