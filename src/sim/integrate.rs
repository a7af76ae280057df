//! Per-frame motion integration

use super::state::Balloon;
use crate::tuning::PhysicsTuning;

/// Advance one Active balloon by `dt` normalized frames
///
/// Gravity is integrated over `dt`, friction is applied once per call,
/// position uses explicit Euler, and components that have slowed below
/// `min_velocity` snap to zero so balloons come to rest instead of jittering.
pub fn update_physics(balloon: &mut Balloon, dt: f32, tuning: &PhysicsTuning) {
    if !balloon.is_active() {
        return;
    }

    balloon.vel.y += tuning.gravity * dt;
    balloon.vel *= tuning.friction;
    balloon.pos += balloon.vel * dt;

    if balloon.vel.x.abs() < tuning.min_velocity {
        balloon.vel.x = 0.0;
    }
    if balloon.vel.y.abs() < tuning.min_velocity {
        balloon.vel.y = 0.0;
    }
}
