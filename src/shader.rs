//! Shader compilation and program linking.

use crate::error::{GlObject, ShaderError};
use crate::gl::{GraphicsContext, ShaderStage};
use crate::logger::Logger;

/// Vertex stage of the bundled plane effect.
pub const DEFAULT_VERTEX_SHADER: &str = include_str!("shaders/plane.vert");
/// Fragment stage of the bundled plane effect.
pub const DEFAULT_FRAGMENT_SHADER: &str = include_str!("shaders/plane.frag");

/// Vertex and fragment source, supplied verbatim by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self::new(DEFAULT_VERTEX_SHADER, DEFAULT_FRAGMENT_SHADER)
    }
}

/// Compiles both stages and links them into a program.
///
/// Failures are reported once through `logger` at error severity and
/// returned; objects created along the way are deleted.
pub fn compile_program<C>(
    context: &C,
    logger: &Logger,
    sources: &ShaderSources,
) -> Result<C::Program, ShaderError>
where
    C: GraphicsContext,
{
    let result = link_stages(context, sources);
    if let Err(err) = &result {
        logger.error(&err.to_string());
    }
    result
}

fn link_stages<C>(context: &C, sources: &ShaderSources) -> Result<C::Program, ShaderError>
where
    C: GraphicsContext,
{
    let vertex = compile_stage(context, ShaderStage::Vertex, &sources.vertex)?;
    let fragment = match compile_stage(context, ShaderStage::Fragment, &sources.fragment) {
        Ok(shader) => shader,
        Err(err) => {
            context.delete_shader(&vertex);
            return Err(err);
        }
    };

    let Some(program) = context.create_program() else {
        context.delete_shader(&vertex);
        context.delete_shader(&fragment);
        return Err(ShaderError::ObjectCreation(GlObject::Program));
    };
    context.attach_shader(&program, &vertex);
    context.attach_shader(&program, &fragment);
    context.link_program(&program);

    if !context.program_link_status(&program) {
        let log = context.program_info_log(&program).unwrap_or_default();
        context.delete_program(&program);
        context.delete_shader(&vertex);
        context.delete_shader(&fragment);
        return Err(ShaderError::Link {
            log: log.trim_end().to_string(),
        });
    }

    log::debug!("linked shader program");
    Ok(program)
}

fn compile_stage<C>(context: &C, stage: ShaderStage, source: &str) -> Result<C::Shader, ShaderError>
where
    C: GraphicsContext,
{
    let shader = context
        .create_shader(stage)
        .ok_or(ShaderError::ObjectCreation(GlObject::Shader(stage)))?;
    context.shader_source(&shader, source);
    context.compile_shader(&shader);

    if !context.shader_compile_status(&shader) {
        let log = context.shader_info_log(&shader).unwrap_or_default();
        context.delete_shader(&shader);
        return Err(ShaderError::Compile {
            stage,
            log: log.trim_end().to_string(),
        });
    }
    Ok(shader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::HeadlessContext;
    use crate::logger::{Level, MemorySink};

    const MINIMAL_VERTEX: &str = "#version 300 es
in vec4 aVertexPosition;
void main() { gl_Position = aVertexPosition; }
";
    const MINIMAL_FRAGMENT: &str = "#version 300 es
precision mediump float;
out vec4 color;
void main() { color = vec4(1.0); }
";

    fn logger() -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        (Logger::empty().with_sink(sink.clone()), sink)
    }

    #[test]
    fn links_minimal_sources() {
        let context = HeadlessContext::new();
        let (logger, sink) = logger();
        let program = compile_program(
            &context,
            &logger,
            &ShaderSources::new(MINIMAL_VERTEX, MINIMAL_FRAGMENT),
        )
        .unwrap();

        assert!(context.program_link_status(&program));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn bundled_sources_link() {
        let context = HeadlessContext::new();
        let (logger, _sink) = logger();
        let program = compile_program(&context, &logger, &ShaderSources::default()).unwrap();
        assert_eq!(context.attrib_location(&program, "aUv"), Some(1));
        assert!(context.uniform_location(&program, "uMouseY").is_some());
    }

    #[test]
    fn compile_failure_is_returned_and_logged_once() {
        let context = HeadlessContext::new();
        let (logger, sink) = logger();
        let broken = "#version 300 es\nvoid main() {\n    float x = (1.0;\n}\n";

        let err = compile_program(
            &context,
            &logger,
            &ShaderSources::new(MINIMAL_VERTEX, broken),
        )
        .unwrap_err();

        match &err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(*stage, ShaderStage::Fragment);
                assert!(!log.trim().is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(sink.count(Level::Error), 1);
        assert!(sink.records()[0].message.contains("fragment shader"));
        assert_eq!(context.live_shaders(), 0);
        assert_eq!(context.live_programs(), 0);
    }

    #[test]
    fn link_failure_cleans_up() {
        let context = HeadlessContext::new();
        let (logger, sink) = logger();
        let unmatched = "#version 300 es
precision mediump float;
in vec2 vTexCoord;
out vec4 color;
void main() { color = vec4(vTexCoord, 0.0, 1.0); }
";

        let err = compile_program(
            &context,
            &logger,
            &ShaderSources::new(MINIMAL_VERTEX, unmatched),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ShaderError::Link {
                log: "error: fragment input 'vTexCoord' is not declared by the vertex shader"
                    .to_string()
            }
        );
        assert_eq!(sink.count(Level::Error), 1);
        assert_eq!(context.live_shaders(), 0);
        assert_eq!(context.live_programs(), 0);
    }

    #[test]
    fn object_creation_failure_is_named() {
        let context = HeadlessContext::new();
        context.fail_creation(GlObject::Program);
        let (logger, sink) = logger();

        let err = compile_program(
            &context,
            &logger,
            &ShaderSources::new(MINIMAL_VERTEX, MINIMAL_FRAGMENT),
        )
        .unwrap_err();

        assert_eq!(err, ShaderError::ObjectCreation(GlObject::Program));
        assert_eq!(sink.records()[0].message, "failed to create shader program");
        assert_eq!(context.live_shaders(), 0);
    }
}
