//! Balloon simulation
//!
//! Everything that moves lives here. This module stays deterministic:
//! - Seeded RNG only
//! - Time only enters through frame deltas handed in by the host
//! - Stable iteration order (balloons sorted by id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod driver;
pub mod impact;
pub mod integrate;
pub mod schedule;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{
    CollisionResult, check_boundary_collision, collide_pairs, detect_collision, resolve_collision,
};
pub use driver::{AnimationDriver, FrameClock, FrameDelta, LoopHandle};
pub use impact::{ImpactEffect, apply_impacts, calculate_pop_impact, shockwave_force};
pub use integrate::update_physics;
pub use schedule::{Scheduler, TaskHandle};
pub use spawn::spawn_batch;
pub use state::{
    Balloon, BalloonColor, BalloonId, BalloonRegistry, BalloonState, BalloonView, Scene,
};
pub use tick::{PopOutcome, TickInput, TickReport, pop_balloon, tick};
