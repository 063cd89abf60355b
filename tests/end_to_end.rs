use std::rc::Rc;

use dominique::gl::DrawMode;
use dominique::{
    Demo, DemoConfig, GlErrorCode, GraphicsContext, HeadlessContext, Level, Logger, LoopState, ManualFrameDriver,
    MemorySink, ShaderError, ShaderSources, ShaderStage, StartupError, StaticSurface,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn logger() -> (Rc<Logger>, MemorySink) {
    let sink = MemorySink::new();
    let logger = Logger::default().with_sink(sink.clone());
    (Rc::new(logger), sink)
}

fn launch(
    sources: &ShaderSources,
) -> (
    Result<Demo<HeadlessContext, StaticSurface, ManualFrameDriver>, StartupError>,
    HeadlessContext,
    Rc<ManualFrameDriver>,
    MemorySink,
) {
    init_logging();
    let context = HeadlessContext::new();
    let driver = Rc::new(ManualFrameDriver::new());
    let (logger, sink) = logger();
    let demo = Demo::launch(
        context.clone(),
        StaticSurface::new(640, 480),
        sources,
        DemoConfig::default(),
        logger,
        Rc::clone(&driver),
    );
    (demo, context, driver, sink)
}

#[test]
fn bundled_shaders_draw_one_strip_per_frame() {
    let (demo, context, driver, sink) = launch(&ShaderSources::default());
    let demo = demo.unwrap();
    assert_eq!(demo.state(), LoopState::Running);
    assert_eq!(context.live_programs(), 1);

    for frame in 1..=5 {
        driver.run_pending(f64::from(frame) * 16.0);
    }

    assert_eq!(context.draw_calls(), vec![(DrawMode::TriangleStrip, 0, 4); 5]);
    assert_eq!(driver.pending(), 1);
    assert_eq!(sink.count(Level::Error), 0);
    assert_eq!(sink.count(Level::Warning), 0);
}

#[test]
fn fragment_syntax_error_stops_before_the_first_frame() {
    let fragment = "#version 300 es\nprecision highp float;\nout vec4 fragColor;\nvoid main() {\n    fragColor = vec4(1.0);\n";
    let sources = ShaderSources::new(dominique::shader::DEFAULT_VERTEX_SHADER, fragment);
    let (demo, context, driver, sink) = launch(&sources);

    match demo {
        Err(StartupError::Shader(ShaderError::Compile { stage, log })) => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!log.trim().is_empty());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("broken fragment shader must not start"),
    }
    assert_eq!(sink.count(Level::Error), 1);
    assert_eq!(driver.requested(), 0);
    assert!(context.draw_calls().is_empty());
    assert_eq!(context.live_programs(), 0);
    assert_eq!(context.live_shaders(), 0);
}

#[test]
fn invalid_fragment_statements_stop_before_the_first_frame() {
    let fragment = "#version 300 es
precision highp float;
out vec4 fragColor;
void main() {
    fragColor = vec4(1.0) +;
    undeclared_thing = 3;
}
";
    let sources = ShaderSources::new(dominique::shader::DEFAULT_VERTEX_SHADER, fragment);
    let (demo, context, driver, sink) = launch(&sources);

    assert!(matches!(
        demo,
        Err(StartupError::Shader(ShaderError::Compile {
            stage: ShaderStage::Fragment,
            ..
        }))
    ));
    assert_eq!(sink.count(Level::Error), 1);
    assert_eq!(driver.requested(), 0);
    assert!(context.draw_calls().is_empty());
}

#[test]
fn driver_error_is_a_warning_and_the_loop_continues() {
    let (demo, context, driver, sink) = launch(&ShaderSources::default());
    let _demo = demo.unwrap();

    driver.run_pending(16.0);
    context.push_error(GlErrorCode::CONTEXT_LOST);
    driver.run_pending(32.0);
    driver.run_pending(48.0);

    let warnings: Vec<_> = sink
        .records()
        .into_iter()
        .filter(|record| record.level == Level::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("CONTEXT_LOST_WEBGL"));
    assert_eq!(context.draw_calls().len(), 3);
    assert_eq!(driver.pending(), 1);
}

#[test]
fn queued_driver_errors_are_reported_once() {
    let (demo, context, driver, sink) = launch(&ShaderSources::default());
    let _demo = demo.unwrap();

    context.push_error(GlErrorCode::OUT_OF_MEMORY);
    context.push_error(GlErrorCode::INVALID_VALUE);
    driver.run_pending(16.0);
    driver.run_pending(32.0);

    let warnings: Vec<_> = sink
        .records()
        .into_iter()
        .filter(|record| record.level == Level::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("OUT_OF_MEMORY"));
    assert_eq!(context.draw_calls().len(), 2);
    assert_eq!(context.error(), None);
}

#[test]
fn elapsed_time_uniform_never_decreases() {
    let (demo, context, driver, _sink) = launch(&ShaderSources::default());
    let _demo = demo.unwrap();

    for now in [5.0, 21.0, 21.0, 37.5, 30.0, 120.0] {
        driver.run_pending(now);
    }

    let elapsed = context.uniform_writes("uElapsedTime");
    assert_eq!(elapsed.len(), 6);
    assert!(elapsed.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(context
        .uniform_writes("uDeltaTime")
        .iter()
        .all(|delta| *delta >= 0.0));
}

#[test]
fn pointer_and_resize_between_frames() {
    let (demo, context, driver, _sink) = launch(&ShaderSources::default());
    let demo = demo.unwrap();

    driver.run_pending(16.0);
    demo.pointer_moved(640.0, 0.0, 640.0, 480.0);
    assert_eq!(demo.resize(1.0), (640, 480));
    driver.run_pending(32.0);

    assert_eq!(context.uniform_writes("uMouseX"), vec![1.0]);
    assert_eq!(context.uniform_writes("uMouseY"), vec![1.0]);
    assert_eq!(context.draw_calls().len(), 2);
    assert_eq!(context.error(), None);
}
