//! Balloon Pop - a floating balloon landing page
//!
//! Core modules:
//! - `sim`: Balloon physics (collisions, boundaries, pop shockwaves) and the frame driver
//! - `renderer`: WebGPU rendering of the balloon field
//! - `settings`: Scene setup (balloon count, size, spawn policy)
//! - `tuning`: Physics constants, overridable at runtime
//! - `error`: Configuration errors

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use settings::SceneSettings;
pub use tuning::PhysicsTuning;

use glam::Vec2;
use rand::Rng;

/// Default configuration constants
pub mod consts {
    /// Milliseconds in one normalized frame (60 fps target)
    pub const FRAME_MS: f32 = 16.67;
    /// Largest normalized delta a single frame may integrate (4 frames)
    pub const MAX_FRAME_DELTA: f32 = 4.0;

    /// Downward acceleration per frame (balloons float, so disabled)
    pub const GRAVITY: f32 = 0.0;
    /// Air resistance, applied to velocity once per physics step
    pub const FRICTION: f32 = 0.99;
    /// Fraction of speed kept after bouncing off a screen edge
    pub const BOUNCE_DAMPING: f32 = 0.8;
    /// Velocity components below this snap to zero
    pub const MIN_VELOCITY: f32 = 0.1;

    /// Reach of a pop shockwave (pixels)
    pub const POP_IMPACT_RADIUS: f32 = 150.0;
    /// Shockwave force at the epicenter
    pub const POP_IMPACT_FORCE: f32 = 8.0;
    /// Length of the pop animation before the balloon is removed
    pub const POP_DURATION_MS: f32 = 300.0;

    /// Balloon defaults
    pub const BALLOON_COUNT: u32 = 29;
    pub const BALLOON_RADIUS: f32 = 25.0;
    pub const BALLOON_MASS: f32 = 1.0;
    pub const BALLOON_ELASTICITY: f32 = 0.8;

    /// Spawn policy
    pub const SPAWN_MAX_ATTEMPTS: u32 = 10;
    pub const SPAWN_MIN_SPACING: f32 = 10.0;
    pub const SPAWN_MIN_SPEED: f32 = 0.5;
    pub const SPAWN_MAX_SPEED: f32 = 2.5;

    /// Viewport used when the host cannot report one
    pub const FALLBACK_WIDTH: f32 = 1920.0;
    pub const FALLBACK_HEIGHT: f32 = 1080.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Random velocity with a uniform direction in [0, 2π) and a speed in [min_speed, max_speed]
pub fn random_velocity<R: Rng + ?Sized>(rng: &mut R, min_speed: f32, max_speed: f32) -> Vec2 {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    let speed = min_speed + rng.random::<f32>() * (max_speed - min_speed);
    Vec2::new(angle.cos(), angle.sin()) * speed
}
