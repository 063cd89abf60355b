use web_sys::{
    WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation,
};

use super::{
    AttributeLayout, BufferUsage, Capability, ClearMask, DepthFunc, DrawMode, GraphicsContext,
    ShaderStage,
};
use crate::error::GlErrorCode;

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => Gl::VERTEX_SHADER,
        ShaderStage::Fragment => Gl::FRAGMENT_SHADER,
    }
}

fn usage_enum(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => Gl::STATIC_DRAW,
        BufferUsage::DynamicDraw => Gl::DYNAMIC_DRAW,
    }
}

fn mode_enum(mode: DrawMode) -> u32 {
    match mode {
        DrawMode::Triangles => Gl::TRIANGLES,
        DrawMode::TriangleStrip => Gl::TRIANGLE_STRIP,
    }
}

fn mask_bits(mask: ClearMask) -> u32 {
    let mut bits = 0;
    if mask.color {
        bits |= Gl::COLOR_BUFFER_BIT;
    }
    if mask.depth {
        bits |= Gl::DEPTH_BUFFER_BIT;
    }
    bits
}

impl GraphicsContext for Gl {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type UniformLocation = WebGlUniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<WebGlShader> {
        Gl::create_shader(self, stage_enum(stage))
    }

    fn shader_source(&self, shader: &WebGlShader, source: &str) {
        Gl::shader_source(self, shader, source);
    }

    fn compile_shader(&self, shader: &WebGlShader) {
        Gl::compile_shader(self, shader);
    }

    fn shader_compile_status(&self, shader: &WebGlShader) -> bool {
        self.get_shader_parameter(shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> Option<String> {
        self.get_shader_info_log(shader)
    }

    fn delete_shader(&self, shader: &WebGlShader) {
        Gl::delete_shader(self, Some(shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        Gl::create_program(self)
    }

    fn attach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        Gl::attach_shader(self, program, shader);
    }

    fn link_program(&self, program: &WebGlProgram) {
        Gl::link_program(self, program);
    }

    fn program_link_status(&self, program: &WebGlProgram) -> bool {
        self.get_program_parameter(program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &WebGlProgram) -> Option<String> {
        self.get_program_info_log(program)
    }

    fn delete_program(&self, program: &WebGlProgram) {
        Gl::delete_program(self, Some(program));
    }

    fn use_program(&self, program: Option<&WebGlProgram>) {
        Gl::use_program(self, program);
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        u32::try_from(self.get_attrib_location(program, name)).ok()
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.get_uniform_location(program, name)
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        Gl::create_buffer(self)
    }

    fn bind_array_buffer(&self, buffer: Option<&WebGlBuffer>) {
        self.bind_buffer(Gl::ARRAY_BUFFER, buffer);
    }

    fn array_buffer_data(&self, data: &[f32], usage: BufferUsage) {
        self.buffer_data_with_u8_array(
            Gl::ARRAY_BUFFER,
            bytemuck::cast_slice(data),
            usage_enum(usage),
        );
    }

    fn vertex_attrib_pointer(&self, location: u32, layout: &AttributeLayout) {
        self.vertex_attrib_pointer_with_i32(
            location,
            layout.components,
            Gl::FLOAT,
            layout.normalized,
            layout.stride,
            layout.offset,
        );
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        Gl::enable_vertex_attrib_array(self, location);
    }

    fn uniform1f(&self, location: Option<&WebGlUniformLocation>, value: f32) {
        Gl::uniform1f(self, location, value);
    }

    fn uniform_matrix4(&self, location: Option<&WebGlUniformLocation>, matrix: &[f32; 16]) {
        self.uniform_matrix4fv_with_f32_array(location, false, matrix);
    }

    fn clear_color(&self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        Gl::clear_color(self, r, g, b, a);
    }

    fn clear_depth(&self, depth: f32) {
        Gl::clear_depth(self, depth);
    }

    fn enable(&self, capability: Capability) {
        match capability {
            Capability::DepthTest => Gl::enable(self, Gl::DEPTH_TEST),
        }
    }

    fn depth_func(&self, func: DepthFunc) {
        let func = match func {
            DepthFunc::Less => Gl::LESS,
            DepthFunc::LessEqual => Gl::LEQUAL,
        };
        Gl::depth_func(self, func);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        Gl::viewport(self, x, y, width, height);
    }

    fn clear(&self, mask: ClearMask) {
        Gl::clear(self, mask_bits(mask));
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        Gl::draw_arrays(self, mode_enum(mode), first, count);
    }

    fn error(&self) -> Option<GlErrorCode> {
        match self.get_error() {
            Gl::NO_ERROR => None,
            code => Some(GlErrorCode(code)),
        }
    }
}
