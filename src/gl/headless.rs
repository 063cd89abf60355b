//! Recording [`GraphicsContext`] used by tests and native runs.
//!
//! Handles are plain integers. Shader sources are parsed and validated by
//! naga's GLSL frontend; the resulting module supplies the active inputs and
//! uniforms, so attribute and uniform lookups behave like a driver would
//! after linking.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use naga::front::glsl::{Frontend, Options};
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::{
    AttributeLayout, BufferUsage, Capability, ClearMask, DepthFunc, DrawMode, GraphicsContext,
    ShaderStage,
};
use crate::error::{GlErrorCode, GlObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessShader(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessProgram(u32);

impl HeadlessProgram {
    pub fn id(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessBuffer(u32);

impl HeadlessBuffer {
    pub fn id(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessUniform {
    program: u32,
    location: u32,
    name: String,
}

impl HeadlessUniform {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> u32 {
        self.location
    }
}

/// One recorded command.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader(ShaderStage),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram,
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    CreateBuffer,
    BindArrayBuffer(Option<u32>),
    ArrayBufferData { len: usize, usage: BufferUsage },
    VertexAttribPointer { location: u32, layout: AttributeLayout },
    EnableVertexAttribArray(u32),
    Uniform1f { name: Option<String>, value: f32 },
    UniformMatrix4 { name: Option<String>, matrix: [f32; 16] },
    ClearColor([f32; 4]),
    ClearDepth(f32),
    Enable(Capability),
    DepthFunc(DepthFunc),
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    Clear(ClearMask),
    DrawArrays { mode: DrawMode, first: i32, count: i32 },
}

const DESKTOP_VERSION: &str = "#version 450";

/// Names a compiled stage exposes.
#[derive(Debug, Default, Clone)]
struct StageInterface {
    /// Location-bound entry point inputs, in declaration order.
    inputs: Vec<String>,
    uniforms: Vec<String>,
    /// Module-scope variables, outputs included.
    globals: Vec<String>,
    has_main: bool,
}

impl StageInterface {
    fn of(module: &naga::Module) -> Self {
        let inputs = module
            .entry_points
            .iter()
            .flat_map(|entry| entry.function.arguments.iter())
            .filter(|argument| matches!(argument.binding, Some(naga::Binding::Location { .. })))
            .filter_map(|argument| argument.name.clone())
            .collect();

        let mut uniforms = Vec::new();
        let mut globals = Vec::new();
        for (_, variable) in module.global_variables.iter() {
            let Some(name) = variable.name.clone() else {
                continue;
            };
            match variable.space {
                naga::AddressSpace::Uniform | naga::AddressSpace::Handle => uniforms.push(name),
                _ => globals.push(name),
            }
        }

        Self {
            inputs,
            uniforms,
            globals,
            has_main: !module.entry_points.is_empty(),
        }
    }
}

#[derive(Debug)]
struct ShaderRecord {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    info_log: Option<String>,
    interface: StageInterface,
}

#[derive(Debug, Default)]
struct ProgramRecord {
    attached: Vec<u32>,
    linked: bool,
    info_log: Option<String>,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: u32,
    calls: Vec<GlCall>,
    shaders: HashMap<u32, ShaderRecord>,
    programs: HashMap<u32, ProgramRecord>,
    buffers: HashMap<u32, Vec<f32>>,
    bound_array_buffer: Option<u32>,
    current_program: Option<u32>,
    failing: HashSet<GlObject>,
    errors: VecDeque<GlErrorCode>,
}

impl HeadlessState {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn raise(&mut self, code: GlErrorCode) {
        if !self.errors.contains(&code) {
            self.errors.push_back(code);
        }
    }
}

/// Shared-state recording context. Clones observe the same call log.
#[derive(Debug, Clone, Default)]
pub struct HeadlessContext {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later creation of `object` return no handle.
    pub fn fail_creation(&self, object: GlObject) {
        self.state.borrow_mut().failing.insert(object);
    }

    /// Queues an error flag for the next `error()` query.
    pub fn push_error(&self, code: GlErrorCode) {
        self.state.borrow_mut().raise(code);
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn draw_calls(&self) -> Vec<(DrawMode, i32, i32)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                GlCall::DrawArrays { mode, first, count } => Some((*mode, *first, *count)),
                _ => None,
            })
            .collect()
    }

    /// Values written through `uniform1f` to the uniform named `name`.
    pub fn uniform_writes(&self, name: &str) -> Vec<f32> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                GlCall::Uniform1f {
                    name: Some(written),
                    value,
                } if written == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn buffer_data(&self, buffer: &HeadlessBuffer) -> Option<Vec<f32>> {
        self.state.borrow().buffers.get(&buffer.0).cloned()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn create(&self, object: GlObject, call: GlCall) -> Option<u32> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if state.failing.contains(&object) {
            return None;
        }
        Some(state.allocate())
    }
}

impl GraphicsContext for HeadlessContext {
    type Shader = HeadlessShader;
    type Program = HeadlessProgram;
    type Buffer = HeadlessBuffer;
    type UniformLocation = HeadlessUniform;

    fn create_shader(&self, stage: ShaderStage) -> Option<HeadlessShader> {
        let id = self.create(GlObject::Shader(stage), GlCall::CreateShader(stage))?;
        self.state.borrow_mut().shaders.insert(
            id,
            ShaderRecord {
                stage,
                source: String::new(),
                compiled: false,
                info_log: None,
                interface: StageInterface::default(),
            },
        );
        Some(HeadlessShader(id))
    }

    fn shader_source(&self, shader: &HeadlessShader, source: &str) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::ShaderSource(shader.0));
        match state.shaders.get_mut(&shader.0) {
            Some(record) => record.source = source.to_string(),
            None => state.raise(GlErrorCode::INVALID_VALUE),
        }
    }

    fn compile_shader(&self, shader: &HeadlessShader) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::CompileShader(shader.0));
        let Some(record) = state.shaders.get_mut(&shader.0) else {
            state.raise(GlErrorCode::INVALID_VALUE);
            return;
        };
        match compile_glsl(record.stage, &record.source) {
            Ok(interface) => {
                record.compiled = true;
                record.info_log = None;
                record.interface = interface;
            }
            Err(log) => {
                record.compiled = false;
                record.info_log = Some(log);
            }
        }
    }

    fn shader_compile_status(&self, shader: &HeadlessShader) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader.0)
            .map_or(false, |record| record.compiled)
    }

    fn shader_info_log(&self, shader: &HeadlessShader) -> Option<String> {
        self.state
            .borrow()
            .shaders
            .get(&shader.0)
            .map(|record| record.info_log.clone().unwrap_or_default())
    }

    fn delete_shader(&self, shader: &HeadlessShader) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::DeleteShader(shader.0));
        state.shaders.remove(&shader.0);
    }

    fn create_program(&self) -> Option<HeadlessProgram> {
        let id = self.create(GlObject::Program, GlCall::CreateProgram)?;
        self.state
            .borrow_mut()
            .programs
            .insert(id, ProgramRecord::default());
        Some(HeadlessProgram(id))
    }

    fn attach_shader(&self, program: &HeadlessProgram, shader: &HeadlessShader) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::AttachShader {
            program: program.0,
            shader: shader.0,
        });
        match state.programs.get_mut(&program.0) {
            Some(record) => record.attached.push(shader.0),
            None => state.raise(GlErrorCode::INVALID_VALUE),
        }
    }

    fn link_program(&self, program: &HeadlessProgram) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::LinkProgram(program.0));
        let Some(record) = state.programs.get(&program.0) else {
            state.raise(GlErrorCode::INVALID_VALUE);
            return;
        };
        let outcome = link(&state.shaders, &record.attached);
        if let Some(record) = state.programs.get_mut(&program.0) {
            match outcome {
                Ok((attributes, uniforms)) => {
                    record.linked = true;
                    record.info_log = None;
                    record.attributes = attributes;
                    record.uniforms = uniforms;
                }
                Err(log) => {
                    record.linked = false;
                    record.info_log = Some(log);
                    record.attributes.clear();
                    record.uniforms.clear();
                }
            }
        }
    }

    fn program_link_status(&self, program: &HeadlessProgram) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .map_or(false, |record| record.linked)
    }

    fn program_info_log(&self, program: &HeadlessProgram) -> Option<String> {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .map(|record| record.info_log.clone().unwrap_or_default())
    }

    fn delete_program(&self, program: &HeadlessProgram) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::DeleteProgram(program.0));
        state.programs.remove(&program.0);
        if state.current_program == Some(program.0) {
            state.current_program = None;
        }
    }

    fn use_program(&self, program: Option<&HeadlessProgram>) {
        let mut state = self.state.borrow_mut();
        let id = program.map(|program| program.0);
        state.calls.push(GlCall::UseProgram(id));
        match id {
            Some(id) if !state.programs.get(&id).map_or(false, |p| p.linked) => {
                state.raise(GlErrorCode::INVALID_OPERATION);
            }
            _ => state.current_program = id,
        }
    }

    fn attrib_location(&self, program: &HeadlessProgram, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let record = state.programs.get(&program.0).filter(|p| p.linked)?;
        record
            .attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|index| index as u32)
    }

    fn uniform_location(&self, program: &HeadlessProgram, name: &str) -> Option<HeadlessUniform> {
        let state = self.state.borrow();
        let record = state.programs.get(&program.0).filter(|p| p.linked)?;
        let index = record.uniforms.iter().position(|uniform| uniform == name)?;
        Some(HeadlessUniform {
            program: program.0,
            location: index as u32,
            name: name.to_string(),
        })
    }

    fn create_buffer(&self) -> Option<HeadlessBuffer> {
        let id = self.create(GlObject::Buffer, GlCall::CreateBuffer)?;
        self.state.borrow_mut().buffers.insert(id, Vec::new());
        Some(HeadlessBuffer(id))
    }

    fn bind_array_buffer(&self, buffer: Option<&HeadlessBuffer>) {
        let mut state = self.state.borrow_mut();
        let id = buffer.map(|buffer| buffer.0);
        state.calls.push(GlCall::BindArrayBuffer(id));
        state.bound_array_buffer = id;
    }

    fn array_buffer_data(&self, data: &[f32], usage: BufferUsage) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::ArrayBufferData {
            len: data.len(),
            usage,
        });
        let bound = state.bound_array_buffer;
        match bound.and_then(|id| state.buffers.get_mut(&id)) {
            Some(contents) => *contents = data.to_vec(),
            None => state.raise(GlErrorCode::INVALID_OPERATION),
        }
    }

    fn vertex_attrib_pointer(&self, location: u32, layout: &AttributeLayout) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::VertexAttribPointer {
            location,
            layout: *layout,
        });
        if state.bound_array_buffer.is_none() {
            state.raise(GlErrorCode::INVALID_OPERATION);
        } else if !(1..=4).contains(&layout.components) {
            state.raise(GlErrorCode::INVALID_VALUE);
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.record(GlCall::EnableVertexAttribArray(location));
    }

    fn uniform1f(&self, location: Option<&HeadlessUniform>, value: f32) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::Uniform1f {
            name: location.map(|location| location.name.clone()),
            value,
        });
        check_uniform_target(&mut state, location);
    }

    fn uniform_matrix4(&self, location: Option<&HeadlessUniform>, matrix: &[f32; 16]) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::UniformMatrix4 {
            name: location.map(|location| location.name.clone()),
            matrix: *matrix,
        });
        check_uniform_target(&mut state, location);
    }

    fn clear_color(&self, color: [f32; 4]) {
        self.record(GlCall::ClearColor(color));
    }

    fn clear_depth(&self, depth: f32) {
        self.record(GlCall::ClearDepth(depth));
    }

    fn enable(&self, capability: Capability) {
        self.record(GlCall::Enable(capability));
    }

    fn depth_func(&self, func: DepthFunc) {
        self.record(GlCall::DepthFunc(func));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear(&self, mask: ClearMask) {
        self.record(GlCall::Clear(mask));
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::DrawArrays { mode, first, count });
        if state.current_program.is_none() {
            state.raise(GlErrorCode::INVALID_OPERATION);
        }
    }

    fn error(&self) -> Option<GlErrorCode> {
        self.state.borrow_mut().errors.pop_front()
    }
}

fn check_uniform_target(state: &mut HeadlessState, location: Option<&HeadlessUniform>) {
    if let Some(location) = location {
        if state.current_program != Some(location.program) {
            state.raise(GlErrorCode::INVALID_OPERATION);
        }
    }
}

fn link(
    shaders: &HashMap<u32, ShaderRecord>,
    attached: &[u32],
) -> Result<(Vec<String>, Vec<String>), String> {
    let stage = |wanted: ShaderStage| {
        attached
            .iter()
            .filter_map(|id| shaders.get(id))
            .find(|record| record.stage == wanted)
    };
    let vertex = stage(ShaderStage::Vertex)
        .ok_or_else(|| "error: program has no vertex shader attached".to_string())?;
    let fragment = stage(ShaderStage::Fragment)
        .ok_or_else(|| "error: program has no fragment shader attached".to_string())?;

    for record in [vertex, fragment] {
        if !record.compiled {
            return Err(format!("error: {} shader was not compiled", record.stage));
        }
        if !record.interface.has_main {
            return Err(format!(
                "error: no main() function found in {} shader",
                record.stage
            ));
        }
    }

    for input in &fragment.interface.inputs {
        if !vertex.interface.globals.contains(input) {
            return Err(format!(
                "error: fragment input '{input}' is not declared by the vertex shader"
            ));
        }
    }

    let attributes = vertex.interface.inputs.clone();
    let mut uniforms = vertex.interface.uniforms.clone();
    for name in &fragment.interface.uniforms {
        if !uniforms.contains(name) {
            uniforms.push(name.clone());
        }
    }
    Ok((attributes, uniforms))
}

/// Parses and validates one stage with naga, returning its interface.
///
/// Errors carry naga's rendered diagnostic, which becomes the info log.
fn compile_glsl(stage: ShaderStage, source: &str) -> Result<StageInterface, String> {
    let source = desktop_profile(source);
    let options = Options::from(match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    });
    let module = Frontend::default()
        .parse(&options, &source)
        .map_err(|errors| errors.emit_to_string(&source))?;

    // Inputs without a layout all land on location 0 and loose uniforms have
    // no binding; a driver assigns both at link time.
    Validator::new(
        ValidationFlags::all().difference(ValidationFlags::BINDINGS),
        Capabilities::all(),
    )
    .validate(&module)
    .map_err(|error| error.emit_to_string(&source))?;

    Ok(StageInterface::of(&module))
}

/// naga only reads desktop GLSL. The `#version` line is rewritten in place
/// so diagnostics keep their line numbers.
fn desktop_profile(source: &str) -> String {
    let is_version = |line: &str| line.trim_start().starts_with("#version");
    if !source.lines().any(is_version) {
        return format!("{DESKTOP_VERSION}\n{source}");
    }
    let mut rewritten = String::with_capacity(source.len());
    let mut replaced = false;
    for line in source.split_inclusive('\n') {
        if !replaced && is_version(line) {
            rewritten.push_str(DESKTOP_VERSION);
            rewritten.push('\n');
            replaced = true;
        } else {
            rewritten.push_str(line);
        }
    }
    rewritten
}
