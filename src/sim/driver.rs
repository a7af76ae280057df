//! Frame timing and loop lifecycle
//!
//! The host calls [`AnimationDriver::frame`] from its display callback with a
//! millisecond timestamp. The driver turns timestamps into frame deltas,
//! ticks the scene, and owns the start/stop handle for the loop.

use super::state::Scene;
use super::tick::{TickInput, tick};
use crate::tuning::PhysicsTuning;

/// Time covered by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDelta {
    /// Wall-clock milliseconds since the previous frame (drives pop timers)
    pub elapsed_ms: f64,
    /// Normalized frames for physics, clamped to `max_frame_delta`
    pub dt: f32,
}

impl FrameDelta {
    pub fn from_elapsed(elapsed_ms: f64, tuning: &PhysicsTuning) -> Self {
        let elapsed_ms = elapsed_ms.max(0.0);
        Self {
            elapsed_ms,
            dt: tuning.normalize_delta(elapsed_ms as f32),
        }
    }

    /// Exactly one nominal frame
    pub fn nominal(tuning: &PhysicsTuning) -> Self {
        Self::from_elapsed(tuning.frame_ms as f64, tuning)
    }
}

/// Converts successive timestamps into [`FrameDelta`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first frame counts as one nominal frame. A timestamp earlier than
    /// the previous one counts as no time passing.
    pub fn advance(&mut self, now_ms: f64, tuning: &PhysicsTuning) -> FrameDelta {
        let delta = match self.last_ms {
            Some(last) => FrameDelta::from_elapsed(now_ms - last, tuning),
            None => FrameDelta::nominal(tuning),
        };
        self.last_ms = Some(match self.last_ms {
            Some(last) => last.max(now_ms),
            None => now_ms,
        });
        delta
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Proof of a running loop, required to stop it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopHandle(u32);

/// Start/stop state of the frame loop
#[derive(Debug, Clone, Default)]
pub struct AnimationDriver {
    clock: FrameClock,
    running: Option<LoopHandle>,
    generation: u32,
    frames: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the loop. Any earlier handle becomes stale
    pub fn start(&mut self, now_ms: f64) -> LoopHandle {
        self.generation = self.generation.wrapping_add(1);
        let handle = LoopHandle(self.generation);
        self.running = Some(handle);
        self.clock.reset();
        self.frames = 0;
        log::info!("Animation loop started at {:.0} ms", now_ms);
        handle
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Frames ticked since the last start
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Tick the scene for a frame at `now_ms`
    ///
    /// Returns false without touching the scene once the loop is stopped, so
    /// the host knows not to schedule another frame.
    pub fn frame(&mut self, scene: &mut Scene, input: &TickInput, now_ms: f64) -> bool {
        if self.running.is_none() {
            return false;
        }
        let delta = self.clock.advance(now_ms, &scene.tuning);
        tick(scene, input, delta);
        self.frames += 1;
        true
    }

    /// Stop the loop and tear the scene down
    ///
    /// Pending pop timers are cancelled so nothing mutates the scene after
    /// this returns. A stale or foreign handle is a no-op returning false.
    pub fn stop(&mut self, handle: LoopHandle, scene: &mut Scene) -> bool {
        if self.running != Some(handle) {
            log::debug!("Ignoring stop with stale loop handle");
            return false;
        }
        self.running = None;
        let cancelled = scene.teardown();
        log::info!(
            "Animation loop stopped after {} frames ({} pop timers cancelled)",
            self.frames,
            cancelled
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SceneSettings;
    use crate::sim::state::BalloonState;
    use glam::Vec2;

    fn scene() -> Scene {
        Scene::new(
            800.0,
            600.0,
            SceneSettings::default(),
            PhysicsTuning::default(),
            9,
        )
    }

    #[test]
    fn test_frame_delta_normalizes_and_clamps() {
        let tuning = PhysicsTuning::default();
        let one = FrameDelta::from_elapsed(16.67, &tuning);
        assert!((one.dt - 1.0).abs() < 1e-5);

        let half = FrameDelta::from_elapsed(8.335, &tuning);
        assert!((half.dt - 0.5).abs() < 1e-4);

        // Backgrounded tab: timers see the real gap, physics is clamped
        let stall = FrameDelta::from_elapsed(5000.0, &tuning);
        assert_eq!(stall.elapsed_ms, 5000.0);
        assert_eq!(stall.dt, tuning.max_frame_delta);

        let backwards = FrameDelta::from_elapsed(-3.0, &tuning);
        assert_eq!(backwards.elapsed_ms, 0.0);
        assert_eq!(backwards.dt, 0.0);
    }

    #[test]
    fn test_clock_first_frame_is_nominal() {
        let tuning = PhysicsTuning::default();
        let mut clock = FrameClock::new();
        let first = clock.advance(12_345.0, &tuning);
        assert!((first.dt - 1.0).abs() < 1e-5);

        let second = clock.advance(12_345.0 + 33.34, &tuning);
        assert!((second.dt - 2.0).abs() < 1e-3);

        // Clock going backwards is treated as a zero-length frame
        let back = clock.advance(12_000.0, &tuning);
        assert_eq!(back.dt, 0.0);
        let next = clock.advance(12_345.0 + 33.34 + 16.67, &tuning);
        assert!((next.dt - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_frame_requires_start() {
        let mut scene = scene();
        let id = scene.insert(Vec2::new(400.0, 300.0), Vec2::new(2.0, 0.0));
        let mut driver = AnimationDriver::new();
        assert!(!driver.is_running());
        assert!(!driver.frame(&mut scene, &TickInput::default(), 0.0));
        assert_eq!(scene.balloons.get(id).map(|b| b.pos.x), Some(400.0));

        driver.start(0.0);
        assert!(driver.frame(&mut scene, &TickInput::default(), 16.67));
        assert_eq!(driver.frames(), 1);
        assert!(scene.balloons.get(id).is_some_and(|b| b.pos.x > 400.0));
    }

    #[test]
    fn test_stop_cancels_pop_timers() {
        let mut scene = scene();
        let id = scene.insert(Vec2::new(400.0, 300.0), Vec2::ZERO);
        let mut driver = AnimationDriver::new();
        let handle = driver.start(0.0);

        let click = TickInput {
            clicks: vec![id],
            ..Default::default()
        };
        driver.frame(&mut scene, &click, 0.0);
        assert_eq!(scene.timers.pending(), 1);

        assert!(driver.stop(handle, &mut scene));
        assert!(!driver.is_running());
        assert_eq!(scene.timers.pending(), 0);

        for t in 1..40 {
            assert!(!driver.frame(&mut scene, &TickInput::default(), t as f64 * 16.67));
        }
        assert_eq!(
            scene.balloons.get(id).map(|b| b.state()),
            Some(BalloonState::Popping)
        );
    }

    #[test]
    fn test_restart_after_stop_finishes_interrupted_pop() {
        let mut scene = scene();
        let id = scene.insert(Vec2::new(400.0, 300.0), Vec2::ZERO);
        let other = scene.insert(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0));
        let mut driver = AnimationDriver::new();
        let handle = driver.start(0.0);

        let click = TickInput {
            clicks: vec![id],
            ..Default::default()
        };
        driver.frame(&mut scene, &click, 0.0);
        assert!(driver.stop(handle, &mut scene));

        // Page restored much later
        assert_eq!(scene.resume_pops(), 1);
        assert_eq!(scene.timers.pending(), 1);
        driver.start(60_000.0);
        assert!(driver.frame(&mut scene, &TickInput::default(), 60_000.0));
        assert_eq!(
            scene.balloons.get(id).map(|b| b.state()),
            Some(BalloonState::Popping)
        );
        let x = scene.balloons.get(other).map(|b| b.pos.x);

        driver.frame(&mut scene, &TickInput::default(), 60_400.0);
        assert!(scene.balloons.get(id).is_none());
        assert!(scene.balloons.get(other).map(|b| b.pos.x) > x, "still moving");
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let mut scene = scene();
        let mut driver = AnimationDriver::new();
        let old = driver.start(0.0);
        let current = driver.start(100.0);
        assert_ne!(old, current);

        assert!(!driver.stop(old, &mut scene));
        assert!(driver.is_running());
        assert!(driver.stop(current, &mut scene));
        assert!(!driver.stop(current, &mut scene), "already stopped");
    }

    #[test]
    fn test_pop_completes_in_wall_clock_time() {
        let mut scene = scene();
        let id = scene.insert(Vec2::new(400.0, 300.0), Vec2::ZERO);
        let mut driver = AnimationDriver::new();
        driver.start(1000.0);

        let click = TickInput {
            clicks: vec![id],
            ..Default::default()
        };
        driver.frame(&mut scene, &click, 1000.0);
        // One long stalled frame covers the whole animation
        driver.frame(&mut scene, &TickInput::default(), 2000.0);
        assert!(scene.balloons.get(id).is_none());
    }
}
