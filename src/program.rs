//! Resolved program locations and the helpers that bind data to them.

use std::collections::HashMap;
use std::hash::Hash;

use crate::gl::{AttributeLayout, GraphicsContext};
use crate::logger::Logger;

pub const POSITION_ATTRIBUTE: &str = "aVertexPosition";
pub const UV_ATTRIBUTE: &str = "aUv";
pub const PROJECTION_UNIFORM: &str = "uProjectionMatrix";
pub const MODEL_VIEW_UNIFORM: &str = "uModelViewMatrix";

/// Scalar uniforms a program exposes beyond the two matrices.
pub trait UniformKey: Copy + Eq + Hash + 'static {
    const ALL: &'static [Self];

    fn uniform_name(self) -> &'static str;
}

/// Per-frame scalars fed to the demo shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoUniform {
    DeltaTime,
    ElapsedTime,
    MouseX,
    MouseY,
}

impl UniformKey for DemoUniform {
    const ALL: &'static [Self] = &[
        DemoUniform::DeltaTime,
        DemoUniform::ElapsedTime,
        DemoUniform::MouseX,
        DemoUniform::MouseY,
    ];

    fn uniform_name(self) -> &'static str {
        match self {
            DemoUniform::DeltaTime => "uDeltaTime",
            DemoUniform::ElapsedTime => "uElapsedTime",
            DemoUniform::MouseX => "uMouseX",
            DemoUniform::MouseY => "uMouseY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLocations {
    pub position: Option<u32>,
    pub uv: Option<u32>,
}

pub struct UniformLocations<C: GraphicsContext, K> {
    pub projection_matrix: Option<C::UniformLocation>,
    pub model_view_matrix: Option<C::UniformLocation>,
    scalars: HashMap<K, Option<C::UniformLocation>>,
}

impl<C: GraphicsContext, K: UniformKey> UniformLocations<C, K> {
    pub fn scalar(&self, key: K) -> Option<&C::UniformLocation> {
        self.scalars.get(&key).and_then(Option::as_ref)
    }
}

/// A linked program with every location the demo needs, resolved once.
pub struct ProgramInfo<C: GraphicsContext, K> {
    pub program: C::Program,
    pub attributes: AttributeLocations,
    pub uniforms: UniformLocations<C, K>,
}

impl<C: GraphicsContext, K: UniformKey> ProgramInfo<C, K> {
    /// Looks up attribute and uniform locations on a linked program.
    ///
    /// Names the program does not expose resolve to no location; they are
    /// reported as warnings because drivers strip unused declarations.
    pub fn resolve(context: &C, program: C::Program, logger: &Logger) -> Self {
        let attribute = |name: &str| {
            let location = context.attrib_location(&program, name);
            if location.is_none() {
                logger.warn(&format!("attribute {name} is not active in the program"));
            }
            location
        };
        let attributes = AttributeLocations {
            position: attribute(POSITION_ATTRIBUTE),
            uv: attribute(UV_ATTRIBUTE),
        };

        let uniform = |name: &str| {
            let location = context.uniform_location(&program, name);
            if location.is_none() {
                logger.warn(&format!("uniform {name} is not active in the program"));
            }
            location
        };
        let projection_matrix = uniform(PROJECTION_UNIFORM);
        let model_view_matrix = uniform(MODEL_VIEW_UNIFORM);
        let scalars = K::ALL
            .iter()
            .map(|key| (*key, uniform(key.uniform_name())))
            .collect();

        Self {
            program,
            attributes,
            uniforms: UniformLocations {
                projection_matrix,
                model_view_matrix,
                scalars,
            },
        }
    }
}

/// Points `location` at `buffer` and enables the attribute array.
///
/// Attribute state is global to the context, so this runs before every draw.
/// A missing location is skipped.
pub fn bind_attribute<C>(
    context: &C,
    location: Option<u32>,
    buffer: &C::Buffer,
    layout: &AttributeLayout,
) where
    C: GraphicsContext,
{
    let Some(location) = location else {
        return;
    };
    context.bind_array_buffer(Some(buffer));
    context.vertex_attrib_pointer(location, layout);
    context.enable_vertex_attrib_array(location);
}

pub fn set_position_attribute<C, K>(
    context: &C,
    info: &ProgramInfo<C, K>,
    buffer: &C::Buffer,
    components: i32,
) where
    C: GraphicsContext,
{
    bind_attribute(
        context,
        info.attributes.position,
        buffer,
        &AttributeLayout::floats(components),
    );
}

pub fn set_uv_attribute<C, K>(context: &C, info: &ProgramInfo<C, K>, buffer: &C::Buffer)
where
    C: GraphicsContext,
{
    bind_attribute(context, info.attributes.uv, buffer, &AttributeLayout::floats(2));
}

/// Writes a float uniform through its precomputed location.
///
/// Makes the program current first, so the write always lands on it.
pub fn set_uniform<C, K>(context: &C, info: &ProgramInfo<C, K>, key: K, value: f32)
where
    C: GraphicsContext,
    K: UniformKey,
{
    context.use_program(Some(&info.program));
    context.uniform1f(info.uniforms.scalar(key), value);
}

/// Writes a float uniform, looking its location up by name.
pub fn set_uniform_by_name<C>(context: &C, program: &C::Program, name: &str, value: f32)
where
    C: GraphicsContext,
{
    let location = context.uniform_location(program, name);
    context.use_program(Some(program));
    context.uniform1f(location.as_ref(), value);
}
