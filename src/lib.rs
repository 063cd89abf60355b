//! A minimal WebGL2 demo that draws a full-screen plane with a fragment
//! shader fed by time and pointer uniforms.
//!
//! All GL work goes through the [`GraphicsContext`] trait. In the browser it
//! is backed by `WebGl2RenderingContext`; natively `HeadlessContext`
//! records every call, which lets the whole startup and frame pipeline run
//! under `cargo test`.

pub mod app;
pub mod buffers;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod frame_loop;
pub mod geometry;
pub mod gl;
pub mod input;
pub mod logger;
pub mod program;
pub mod render;
pub mod resize;
pub mod shader;
pub mod surface;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{startup, Demo};
pub use buffers::{init_buffers, GeometryBuffers};
pub use camera::Camera;
pub use config::DemoConfig;
pub use error::{ConfigError, GlErrorCode, GlObject, RenderError, ShaderError, StartupError};
pub use frame::{FrameState, FrameTiming};
pub use frame_loop::{FrameDriver, FrameLoop, LoopState, ManualFrameDriver};
pub use geometry::{plane, PlaneGeometry};
pub use gl::{GraphicsContext, ShaderStage};
#[cfg(not(target_arch = "wasm32"))]
pub use gl::HeadlessContext;
pub use input::PointerState;
pub use logger::{Level, LogSink, Logger, MemorySink};
pub use program::{DemoUniform, ProgramInfo, UniformKey};
pub use render::Renderer;
pub use resize::resize_to_client;
pub use shader::{compile_program, ShaderSources};
pub use surface::{CanvasSurface, StaticSurface};
