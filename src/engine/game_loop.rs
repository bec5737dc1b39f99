//! Fixed timestep accumulator
//!
//! Physics and collision run at a constant rate no matter how long a
//! rendered frame took. Frame time is fed in by the caller, so stepping is
//! deterministic and testable without a clock.

use std::time::Duration;

/// Default physics/update rate (60 updates per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Maximum number of physics steps per frame to prevent spiral of death
pub const MAX_PHYSICS_STEPS: u32 = 5;

/// Accumulates frame time and hands out whole fixed steps
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Accumulated time not yet consumed by a step
    accumulator: Duration,

    /// Length of one step
    step: Duration,

    /// Upper bound on steps returned per frame
    max_steps: u32,

    /// Whether stepping is paused
    paused: bool,

    /// Total steps handed out
    step_count: u64,
}

impl FixedTimestep {
    /// Create an accumulator for steps of `step_secs` seconds.
    /// Non-positive or non-finite values fall back to [`FIXED_TIMESTEP`].
    pub fn new(step_secs: f32, max_steps: u32) -> Self {
        let step_secs = if step_secs.is_finite() && step_secs > 0.0 {
            step_secs
        } else {
            log::warn!(
                "Invalid timestep {}, using {}",
                step_secs,
                FIXED_TIMESTEP
            );
            FIXED_TIMESTEP
        };

        Self {
            accumulator: Duration::ZERO,
            step: Duration::from_secs_f32(step_secs),
            max_steps: max_steps.max(1),
            paused: false,
            step_count: 0,
        }
    }

    /// Add a frame's worth of time and return how many steps to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        // Drop the backlog we refused to simulate
        if steps == self.max_steps && self.accumulator >= self.step {
            log::debug!(
                "Dropping {:?} of simulation time after {} steps",
                self.accumulator,
                steps
            );
            self.accumulator = Duration::ZERO;
        }

        self.step_count += steps as u64;
        steps
    }

    /// Step length in seconds
    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Interpolation alpha between the last two steps
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent update burst
            self.accumulator = Duration::ZERO;
            log::info!("Simulation resumed");
        }
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(FIXED_TIMESTEP, MAX_PHYSICS_STEPS)
    }
}
