use glam::Vec2;

use crate::buffers::GeometryBuffers;
use crate::camera::{aspect_ratio, Camera};
use crate::error::RenderError;
use crate::frame::{FrameState, FrameTiming};
use crate::gl::{Capability, ClearMask, DepthFunc, DrawMode, GraphicsContext};
use crate::input::PointerState;
use crate::program::{
    set_position_attribute, set_uniform, set_uv_attribute, DemoUniform, ProgramInfo,
};
use crate::surface::CanvasSurface;

/// Owns the context, the linked program and the plane buffers, and draws
/// the plane once per frame.
pub struct Renderer<C: GraphicsContext, S> {
    context: C,
    surface: S,
    program: ProgramInfo<C, DemoUniform>,
    buffers: GeometryBuffers<C>,
    camera: Camera,
    clear_color: [f32; 4],
    frame: FrameState,
    pointer: PointerState,
}

impl<C, S> Renderer<C, S>
where
    C: GraphicsContext,
    S: CanvasSurface,
{
    pub fn new(
        context: C,
        surface: S,
        program: ProgramInfo<C, DemoUniform>,
        buffers: GeometryBuffers<C>,
        camera: Camera,
        clear_color: [f32; 4],
    ) -> Self {
        Self {
            context,
            surface,
            program,
            buffers,
            camera,
            clear_color,
            frame: FrameState::new(),
            pointer: PointerState::new(),
        }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn program(&self) -> &ProgramInfo<C, DemoUniform> {
        &self.program
    }

    pub fn frame_state(&self) -> &FrameState {
        &self.frame
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Advances time to `now_ms`, pushes the timing uniforms and draws.
    pub fn render_frame(&mut self, now_ms: f64) -> Result<FrameTiming, RenderError> {
        let timing = self.frame.advance(now_ms);
        set_uniform(
            &self.context,
            &self.program,
            DemoUniform::DeltaTime,
            timing.delta as f32,
        );
        set_uniform(
            &self.context,
            &self.program,
            DemoUniform::ElapsedTime,
            timing.elapsed as f32,
        );
        self.draw_scene()?;
        Ok(timing)
    }

    /// Records a pointer move in window client coordinates and writes the
    /// clip-space position to the shader right away.
    pub fn pointer_moved(
        &mut self,
        client_x: f64,
        client_y: f64,
        inner_width: f64,
        inner_height: f64,
    ) -> Vec2 {
        let position = self
            .pointer
            .update(client_x, client_y, inner_width, inner_height);
        set_uniform(&self.context, &self.program, DemoUniform::MouseX, position.x);
        set_uniform(&self.context, &self.program, DemoUniform::MouseY, position.y);
        position
    }

    fn draw_scene(&self) -> Result<(), RenderError> {
        let gl = &self.context;

        gl.clear_color(self.clear_color);
        gl.clear_depth(1.0);
        gl.enable(Capability::DepthTest);
        gl.depth_func(DepthFunc::LessEqual);

        let (width, height) = self.surface.drawing_buffer_size();
        gl.viewport(0, 0, width as i32, height as i32);
        gl.clear(ClearMask::COLOR_AND_DEPTH);

        let (client_width, client_height) = self.surface.client_size();
        let projection = self
            .camera
            .projection(aspect_ratio(client_width, client_height));
        let model_view = self.camera.model_view();

        set_position_attribute(
            gl,
            &self.program,
            &self.buffers.position,
            self.buffers.position_components,
        );
        set_uv_attribute(gl, &self.program, &self.buffers.uv);

        gl.use_program(Some(&self.program.program));
        gl.uniform_matrix4(
            self.program.uniforms.projection_matrix.as_ref(),
            &projection.to_cols_array(),
        );
        gl.uniform_matrix4(
            self.program.uniforms.model_view_matrix.as_ref(),
            &model_view.to_cols_array(),
        );

        gl.draw_arrays(DrawMode::TriangleStrip, 0, self.buffers.vertex_count);

        // getError hands back one flag per call; all of them belong to this frame.
        let mut first = None;
        while let Some(code) = gl.error() {
            first.get_or_insert(code);
        }
        match first {
            Some(code) => Err(RenderError::Driver(code)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::app::startup;
    use crate::config::DemoConfig;
    use crate::error::GlErrorCode;
    use crate::gl::{GlCall, HeadlessContext};
    use crate::logger::Logger;
    use crate::shader::ShaderSources;
    use crate::surface::StaticSurface;

    fn renderer(context: &HeadlessContext) -> Renderer<HeadlessContext, StaticSurface> {
        let surface = StaticSurface::new(800, 400);
        let renderer = startup(
            context.clone(),
            surface,
            &ShaderSources::default(),
            &DemoConfig::default(),
            &Logger::empty(),
        )
        .unwrap();
        context.clear_calls();
        renderer
    }

    #[test]
    fn frame_issues_clear_then_one_strip_draw() {
        let context = HeadlessContext::new();
        let mut renderer = renderer(&context);

        renderer.render_frame(500.0).unwrap();

        let calls = context.calls();
        let clear = calls
            .iter()
            .position(|call| *call == GlCall::Clear(ClearMask::COLOR_AND_DEPTH))
            .unwrap();
        let draw = calls
            .iter()
            .position(|call| matches!(call, GlCall::DrawArrays { .. }))
            .unwrap();
        assert!(clear < draw);
        assert_eq!(draw, calls.len() - 1);
        assert!(calls.contains(&GlCall::Viewport {
            x: 0,
            y: 0,
            width: 800,
            height: 400
        }));
        assert!(calls.contains(&GlCall::DepthFunc(DepthFunc::LessEqual)));
        assert_eq!(context.draw_calls(), vec![(DrawMode::TriangleStrip, 0, 4)]);
    }

    #[test]
    fn timing_uniforms_follow_the_frame_clock() {
        let context = HeadlessContext::new();
        let mut renderer = renderer(&context);

        renderer.render_frame(1000.0).unwrap();
        renderer.render_frame(1500.0).unwrap();

        assert_eq!(context.uniform_writes("uDeltaTime"), vec![1.0, 0.5]);
        assert_eq!(context.uniform_writes("uElapsedTime"), vec![1.0, 1.5]);
        assert_eq!(renderer.frame_state().elapsed(), 1.5);
    }

    #[test]
    fn projection_uses_client_aspect() {
        let context = HeadlessContext::new();
        let mut renderer = renderer(&context);
        renderer.render_frame(16.0).unwrap();

        let expected = Mat4::perspective_rh_gl(45f32.to_radians(), 2.0, 0.1, 100.0);
        let uploaded = context.calls().into_iter().find_map(|call| match call {
            GlCall::UniformMatrix4 { name: Some(name), matrix } if name == "uProjectionMatrix" => {
                Some(matrix)
            }
            _ => None,
        });
        assert_eq!(uploaded, Some(expected.to_cols_array()));
    }

    #[test]
    fn driver_errors_are_surfaced() {
        let context = HeadlessContext::new();
        let mut renderer = renderer(&context);
        context.push_error(GlErrorCode::OUT_OF_MEMORY);

        let err = renderer.render_frame(16.0).unwrap_err();
        assert_eq!(err, RenderError::Driver(GlErrorCode::OUT_OF_MEMORY));
        assert_eq!(context.draw_calls().len(), 1);
        assert!(renderer.render_frame(32.0).is_ok());
    }

    #[test]
    fn every_pending_flag_is_drained_in_one_frame() {
        let context = HeadlessContext::new();
        let mut renderer = renderer(&context);
        context.push_error(GlErrorCode::OUT_OF_MEMORY);
        context.push_error(GlErrorCode::INVALID_VALUE);

        let err = renderer.render_frame(16.0).unwrap_err();
        assert_eq!(err, RenderError::Driver(GlErrorCode::OUT_OF_MEMORY));
        assert_eq!(context.error(), None);
        assert!(renderer.render_frame(32.0).is_ok());
        assert_eq!(context.draw_calls().len(), 2);
    }
}
