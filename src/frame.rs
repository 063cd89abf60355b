/// Timing pushed to the shader for one frame, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTiming {
    pub delta: f64,
    pub elapsed: f64,
}

/// Time bookkeeping carried from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    then: f64,
    elapsed: f64,
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous frame timestamp in seconds.
    pub fn then(&self) -> f64 {
        self.then
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advances to a host timestamp given in milliseconds.
    ///
    /// The first frame measures from zero, matching the host clock origin.
    /// A timestamp older than the previous one yields a zero delta.
    pub fn advance(&mut self, now_ms: f64) -> FrameTiming {
        let now = now_ms * 0.001;
        let delta = (now - self.then).max(0.0);
        self.elapsed += delta;
        self.then = self.then.max(now);
        FrameTiming {
            delta,
            elapsed: self.elapsed,
        }
    }
}
