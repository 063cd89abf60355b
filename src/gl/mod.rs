//! Explicit handle over the subset of WebGL2 the demo drives.
//!
//! Every call takes the context by reference, so there is no hidden global
//! GL state: whoever owns the context owns the pipeline. The browser binds
//! this trait to `WebGl2RenderingContext`; natively `headless::HeadlessContext`
//! records calls so the full pipeline runs under `cargo test`.

use std::fmt;

use crate::error::GlErrorCode;

#[cfg(not(target_arch = "wasm32"))]
pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod webgl;

#[cfg(not(target_arch = "wasm32"))]
pub use headless::{GlCall, HeadlessContext};

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once, read by many draws.
    StaticDraw,
    DynamicDraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Triangles,
    TriangleStrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    DepthTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    Less,
    LessEqual,
}

/// Which buffers a `clear` touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: Self = Self {
        color: true,
        depth: false,
    };
    pub const COLOR_AND_DEPTH: Self = Self {
        color: true,
        depth: true,
    };
}

/// How a float vertex attribute is pulled out of the bound array buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLayout {
    pub components: i32,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

impl AttributeLayout {
    /// Tightly packed, unnormalized floats.
    pub const fn floats(components: i32) -> Self {
        Self {
            components,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }
}

/// Rendering context the demo issues commands against.
pub trait GraphicsContext {
    type Shader;
    type Program;
    type Buffer;
    type UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn shader_compile_status(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String>;
    fn delete_shader(&self, shader: &Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn program_link_status(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> Option<String>;
    fn delete_program(&self, program: &Self::Program);
    fn use_program(&self, program: Option<&Self::Program>);

    /// `None` when the program has no active attribute with that name.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(
        &self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_array_buffer(&self, buffer: Option<&Self::Buffer>);
    /// Fills the currently bound array buffer.
    fn array_buffer_data(&self, data: &[f32], usage: BufferUsage);
    fn vertex_attrib_pointer(&self, location: u32, layout: &AttributeLayout);
    fn enable_vertex_attrib_array(&self, location: u32);

    /// Writes to the current program; a `None` location is ignored.
    fn uniform1f(&self, location: Option<&Self::UniformLocation>, value: f32);
    fn uniform_matrix4(&self, location: Option<&Self::UniformLocation>, matrix: &[f32; 16]);

    fn clear_color(&self, color: [f32; 4]);
    fn clear_depth(&self, depth: f32);
    fn enable(&self, capability: Capability);
    fn depth_func(&self, func: DepthFunc);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear(&self, mask: ClearMask);
    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32);

    /// Pops one pending error flag, `None` when the driver reports none.
    fn error(&self) -> Option<GlErrorCode>;
}
