//! Initial balloon batch
//!
//! Balloons are scattered uniformly over the viewport. Each one retries its
//! position a few times to keep clear of balloons already placed, then
//! settles for the last candidate; the collision pass separates any overlap
//! that is left on the first frames.

use glam::Vec2;
use rand::Rng;

use super::state::{Balloon, BalloonColor, Scene};
use crate::random_velocity;

/// Pick a coordinate along one axis keeping `radius` clear of both edges
fn spawn_axis<R: Rng + ?Sized>(rng: &mut R, extent: f32, radius: f32) -> f32 {
    let span = extent - 2.0 * radius;
    if span <= 0.0 {
        // Viewport narrower than a balloon: center it
        return extent / 2.0;
    }
    radius + rng.random::<f32>() * span
}

/// Whether a balloon of `radius` at `pos` would crowd an existing one
fn is_crowded(scene: &Scene, pos: Vec2, radius: f32) -> bool {
    let spacing = scene.settings.min_spacing;
    scene
        .balloons
        .iter()
        .any(|b| b.pos.distance(pos) < b.radius() + radius + spacing)
}

/// Populate the scene with `settings.count` Active balloons. Returns how many were added
pub fn spawn_batch(scene: &mut Scene) -> usize {
    let count = scene.settings.count;
    let radius = scene.settings.radius;
    let attempts = scene.settings.max_spawn_attempts.max(1);
    let mut crowded = 0;

    for i in 0..count {
        let mut pos = Vec2::ZERO;
        for attempt in 0..attempts {
            pos = Vec2::new(
                spawn_axis(&mut scene.rng, scene.width, radius),
                spawn_axis(&mut scene.rng, scene.height, radius),
            );
            if !is_crowded(scene, pos, radius) {
                break;
            }
            if attempt + 1 == attempts {
                crowded += 1;
            }
        }

        let vel = random_velocity(
            &mut scene.rng,
            scene.settings.min_speed,
            scene.settings.max_speed,
        );
        let color = BalloonColor::ALL[scene.rng.random_range(0..BalloonColor::ALL.len())];

        let id = scene.next_balloon_id();
        let mut balloon = Balloon::new(
            id,
            pos,
            vel,
            radius,
            scene.settings.mass,
            scene.settings.elasticity,
        );
        balloon.number = i + 1;
        balloon.color = color;
        balloon.created_at_ms = scene.now_ms();
        scene.balloons.push(balloon);
    }

    if crowded > 0 {
        log::debug!("{} balloons spawned overlapping after {} attempts", crowded, attempts);
    }
    log::info!(
        "Spawned {} balloons in {}x{} (seed {})",
        count,
        scene.width,
        scene.height,
        scene.seed
    );

    count as usize
}
