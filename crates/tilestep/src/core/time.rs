use std::collections::VecDeque;

/// Fixed timestep accumulator, in milliseconds.
/// Optional: by default the session steps with the raw frame time.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    /// Steps run per frame at most; excess time is dropped.
    pub const MAX_STEPS: u32 = 10;

    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;
        self.accumulator = self.accumulator.min(self.dt * Self::MAX_STEPS as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Fraction of a tick left in the accumulator (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Rolling frame-rate average for the HUD.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    samples: VecDeque<f32>,
    window: usize,
}

impl FpsCounter {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            samples: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Record one frame of `dt` ms.
    pub fn record(&mut self, dt: f32) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(dt);
    }

    /// Frames per second over the window, 0 before any positive sample.
    pub fn fps(&self) -> f32 {
        let total: f32 = self.samples.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        1000.0 * self.samples.len() as f32 / total
    }

    pub fn text(&self) -> String {
        format!("FPS: {}", self.fps().round() as u32)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(30)
    }
}
