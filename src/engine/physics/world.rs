use std::time::Duration;

use super::collision::Collision;
use super::layer::LayerRegistry;
use super::system::{CollisionConfig, CollisionSystem};
use crate::engine::game_loop::{FixedTimestep, FIXED_TIMESTEP, MAX_PHYSICS_STEPS};

/// Default gravity in world units per second squared, along +Y (screen down)
pub const DEFAULT_GRAVITY: f32 = 9.81;

/// Simulation-wide physics settings
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsSettings {
    /// Gravity constant applied along +Y to bodies that use gravity
    pub gravity: f32,
    /// Fixed step length in seconds
    pub timestep: f32,
    /// Upper bound on fixed steps per rendered frame
    pub max_steps_per_frame: u32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            timestep: FIXED_TIMESTEP,
            max_steps_per_frame: MAX_PHYSICS_STEPS,
        }
    }
}

/// Physics world that owns the collision system and drives it at a fixed rate
///
/// Each world is independent; game code passes it around explicitly instead
/// of reaching for a global.
#[derive(Debug)]
pub struct PhysicsWorld {
    /// Gravity and timing
    settings: PhysicsSettings,

    /// Collider registry and per-tick pipeline
    collisions: CollisionSystem,

    /// Frame time accumulator
    clock: FixedTimestep,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        Self::with_settings(
            PhysicsSettings::default(),
            LayerRegistry::new(),
            CollisionConfig::default(),
        )
    }

    pub fn with_settings(
        settings: PhysicsSettings,
        layers: LayerRegistry,
        config: CollisionConfig,
    ) -> Self {
        let clock = FixedTimestep::new(settings.timestep, settings.max_steps_per_frame);
        let settings = PhysicsSettings {
            timestep: clock.step_secs(),
            ..settings
        };
        Self {
            settings,
            collisions: CollisionSystem::with_config(layers, config),
            clock,
        }
    }

    /// Step the simulation forward by one fixed timestep:
    /// integrate every physics owner, then run collision detection.
    pub fn step(&mut self) -> Vec<Collision> {
        let dt = self.settings.timestep;

        for owner in self.collisions.live_owners() {
            let Ok(mut guard) = owner.lock() else {
                continue;
            };
            if let Some(physics) = guard.physics_mut() {
                physics.integrate(dt, &self.settings);
            }
        }

        self.collisions.update()
    }

    /// Feed a rendered frame's duration and run the fixed steps it covers
    pub fn advance(&mut self, frame_time: Duration) -> Vec<Collision> {
        let steps = self.clock.advance(frame_time);
        let mut collisions = Vec::new();
        for _ in 0..steps {
            collisions.extend(self.step());
        }
        collisions
    }

    pub fn collisions(&self) -> &CollisionSystem {
        &self.collisions
    }

    pub fn collisions_mut(&mut self) -> &mut CollisionSystem {
        &mut self.collisions
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    /// Set gravity for the physics world
    pub fn set_gravity(&mut self, gravity: f32) {
        self.settings.gravity = gravity;
    }

    /// Get current gravity
    pub fn gravity(&self) -> f32 {
        self.settings.gravity
    }

    /// Get the current timestep
    pub fn timestep(&self) -> f32 {
        self.settings.timestep
    }

    /// Interpolation alpha for rendering between steps
    pub fn alpha(&self) -> f32 {
        self.clock.alpha()
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
