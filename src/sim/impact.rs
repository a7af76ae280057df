//! Pop shockwave
//!
//! A popping balloon pushes every Active neighbour within the impact radius
//! straight away from the epicenter. Force falls off with the cube of the
//! normalized distance, so neighbours right next to the pop fly off while
//! balloons near the edge of the radius barely move.

use glam::Vec2;
use serde::Serialize;

use super::state::{Balloon, BalloonId, BalloonRegistry};
use crate::tuning::PhysicsTuning;

/// Velocity change a pop imparts on one neighbour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactEffect {
    pub balloon: BalloonId,
    pub velocity_change: Vec2,
    /// Distance from the epicenter
    pub distance: f32,
}

/// Shockwave force at `distance` from the epicenter
///
/// `impact_force * (1 - d / impact_radius)^3` for `0 < d < impact_radius`, 0 elsewhere.
#[inline]
pub fn shockwave_force(distance: f32, tuning: &PhysicsTuning) -> f32 {
    if distance <= 0.0 || distance >= tuning.impact_radius {
        return 0.0;
    }
    let falloff = 1.0 - distance / tuning.impact_radius;
    tuning.impact_force * falloff * falloff * falloff
}

/// Impacts of a pop at `epicenter` on every Active balloon in range
///
/// Balloons exactly at the epicenter have no direction to be pushed in and
/// are skipped. Nothing is mutated.
pub fn calculate_pop_impact(
    epicenter: Vec2,
    balloons: &[Balloon],
    tuning: &PhysicsTuning,
) -> Vec<ImpactEffect> {
    balloons
        .iter()
        .filter(|b| b.is_active())
        .filter_map(|b| {
            let offset = b.pos - epicenter;
            let distance = offset.length();
            if distance <= 0.0 || distance >= tuning.impact_radius {
                return None;
            }
            let force = shockwave_force(distance, tuning);
            Some(ImpactEffect {
                balloon: b.id(),
                velocity_change: offset / distance * (force / b.mass()),
                distance,
            })
        })
        .collect()
}

/// Add each impact to its balloon's velocity, skipping balloons that are
/// gone or no longer Active. Returns how many were applied
pub fn apply_impacts(registry: &mut BalloonRegistry, impacts: &[ImpactEffect]) -> usize {
    let mut applied = 0;
    for impact in impacts {
        if let Some(balloon) = registry.get_mut(impact.balloon) {
            if balloon.is_active() {
                balloon.vel += impact.velocity_change;
                applied += 1;
            }
        }
    }
    applied
}
