//! Frame tick
//!
//! Advances the balloon field by one rendered frame: pop timers, pointer
//! input, motion, collisions, walls and cleanup, always in that order.

use glam::Vec2;
use serde::Serialize;

use super::collision::{check_boundary_collision, collide_pairs};
use super::driver::FrameDelta;
use super::impact::{apply_impacts, calculate_pop_impact};
use super::integrate::update_physics;
use super::schedule::TaskHandle;
use super::state::{BalloonId, Scene};

/// Input collected since the previous frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Balloons clicked directly
    pub clicks: Vec<BalloonId>,
    /// Pointer/touch positions in viewport pixels, resolved with `hit_test`
    pub taps: Vec<Vec2>,
}

/// Result of popping one balloon
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopOutcome {
    pub balloon: BalloonId,
    pub epicenter: Vec2,
    /// Neighbours whose velocity was changed by the shockwave
    pub impacts_applied: usize,
    #[serde(skip)]
    pub timer: TaskHandle,
}

/// Counts for one tick, mostly for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub popped: usize,
    pub collisions: usize,
    /// Balloons removed after their pop animation finished
    pub removed: usize,
}

/// Pop an Active balloon
///
/// Marks it Popping, pushes neighbours away with the shockwave and schedules
/// the Popped transition. Unknown or non-Active balloons are ignored.
pub fn pop_balloon(scene: &mut Scene, id: BalloonId) -> Option<PopOutcome> {
    let now = scene.now_ms();
    let balloon = scene.balloons.get_mut(id)?;
    if !balloon.begin_pop(now) {
        return None;
    }
    let epicenter = balloon.pos;
    let number = balloon.number;

    let impacts = calculate_pop_impact(epicenter, scene.balloons.as_slice(), &scene.tuning);
    let impacts_applied = apply_impacts(&mut scene.balloons, &impacts);
    let timer = scene
        .timers
        .schedule(scene.tuning.pop_duration_ms as f64, id);

    log::debug!(
        "Popped #{} ({}) at ({:.0}, {:.0}), {} neighbours pushed",
        number,
        id,
        epicenter.x,
        epicenter.y,
        impacts_applied
    );

    Some(PopOutcome {
        balloon: id,
        epicenter,
        impacts_applied,
        timer,
    })
}

/// Advance the scene by one frame
pub fn tick(scene: &mut Scene, input: &TickInput, frame: FrameDelta) -> TickReport {
    let mut report = TickReport::default();

    // Finished pop animations. The clock moves before input is handled so a
    // pop starting this frame is timed from the current scene time.
    for id in scene.timers.advance(frame.elapsed_ms) {
        if let Some(balloon) = scene.balloons.get_mut(id) {
            balloon.finish_pop();
        }
    }

    // Clicks, then taps in arrival order. A tap resolves against the scene
    // as left by earlier input, so two taps on one spot pop two balloons.
    for &id in &input.clicks {
        if pop_balloon(scene, id).is_some() {
            report.popped += 1;
        }
    }
    for &point in &input.taps {
        let hit = scene.hit_test(point);
        if hit.and_then(|id| pop_balloon(scene, id)).is_some() {
            report.popped += 1;
        }
    }

    for balloon in scene.balloons.iter_mut() {
        update_physics(balloon, frame.dt, &scene.tuning);
    }

    report.collisions = collide_pairs(scene.balloons.as_mut_slice());

    let (width, height) = (scene.width, scene.height);
    let damping = scene.tuning.bounce_damping;
    for balloon in scene.balloons.iter_mut() {
        check_boundary_collision(balloon, width, height, damping);
    }

    report.removed = scene.balloons.remove_popped();

    if report.popped > 0 && scene.is_cleared() {
        log::info!("All balloons popped");
    }
    log::trace!(
        "tick dt={:.2} popped={} collisions={} removed={} remaining={}",
        frame.dt,
        report.popped,
        report.collisions,
        report.removed,
        scene.remaining()
    );

    report
}
