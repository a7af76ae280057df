//! Balloon entities and the scene that owns them
//!
//! The scene is the single owner of every balloon for its whole lifetime.
//! Physics functions borrow balloons from it; nothing else holds references.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::schedule::Scheduler;
use crate::distance;
use crate::settings::SceneSettings;
use crate::tuning::PhysicsTuning;

/// Stable identifier for a balloon, unique within its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BalloonId(pub u32);

impl std::fmt::Display for BalloonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "balloon-{}", self.0)
    }
}

/// Balloon lifecycle. Only ever moves forward: Active -> Popping -> Popped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalloonState {
    /// Floating, simulated and clickable
    Active,
    /// Clicked; pop animation playing, excluded from physics and clicks
    Popping,
    /// Finished; removed on the next cleanup pass
    Popped,
}

/// Pixel palette for balloons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalloonColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Pink,
    Cyan,
}

impl BalloonColor {
    pub const ALL: [BalloonColor; 8] = [
        BalloonColor::Red,
        BalloonColor::Blue,
        BalloonColor::Green,
        BalloonColor::Yellow,
        BalloonColor::Purple,
        BalloonColor::Orange,
        BalloonColor::Pink,
        BalloonColor::Cyan,
    ];

    /// 0xRRGGBB
    pub fn hex(&self) -> u32 {
        match self {
            BalloonColor::Red => 0xFF4444,
            BalloonColor::Blue => 0x4444FF,
            BalloonColor::Green => 0x44FF44,
            BalloonColor::Yellow => 0xFFFF44,
            BalloonColor::Purple => 0xFF44FF,
            BalloonColor::Orange => 0xFF8844,
            BalloonColor::Pink => 0xFF88CC,
            BalloonColor::Cyan => 0x44FFFF,
        }
    }

    /// Linear 0-1 RGBA, fully opaque
    pub fn rgba(&self) -> [f32; 4] {
        let hex = self.hex();
        [
            ((hex >> 16) & 0xFF) as f32 / 255.0,
            ((hex >> 8) & 0xFF) as f32 / 255.0,
            (hex & 0xFF) as f32 / 255.0,
            1.0,
        ]
    }
}

/// A balloon entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balloon {
    id: BalloonId,
    /// 1-based label drawn on the balloon
    pub number: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    radius: f32,
    mass: f32,
    elasticity: f32,
    pub color: BalloonColor,
    state: BalloonState,
    /// Scene time the pop started (for animation progress)
    pop_started_ms: Option<f64>,
    /// Scene time at creation, informational
    pub created_at_ms: f64,
}

impl Balloon {
    pub fn new(id: BalloonId, pos: Vec2, vel: Vec2, radius: f32, mass: f32, elasticity: f32) -> Self {
        Self {
            id,
            number: id.0,
            pos,
            vel,
            radius,
            mass,
            elasticity,
            color: BalloonColor::Red,
            state: BalloonState::Active,
            pop_started_ms: None,
            created_at_ms: 0.0,
        }
    }

    #[inline]
    pub fn id(&self) -> BalloonId {
        self.id
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn elasticity(&self) -> f32 {
        self.elasticity
    }

    #[inline]
    pub fn state(&self) -> BalloonState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == BalloonState::Active
    }

    /// Active -> Popping. Returns false (and changes nothing) from any other state
    pub fn begin_pop(&mut self, now_ms: f64) -> bool {
        if self.state != BalloonState::Active {
            return false;
        }
        self.state = BalloonState::Popping;
        self.pop_started_ms = Some(now_ms);
        true
    }

    /// Popping -> Popped. Returns false (and changes nothing) from any other state
    pub fn finish_pop(&mut self) -> bool {
        if self.state != BalloonState::Popping {
            return false;
        }
        self.state = BalloonState::Popped;
        true
    }

    /// Restart the pop animation of a Popping balloon from `now_ms`
    pub fn restart_pop(&mut self, now_ms: f64) -> bool {
        if self.state != BalloonState::Popping {
            return false;
        }
        self.pop_started_ms = Some(now_ms);
        true
    }

    /// Whether `point` lies on the balloon's circle
    pub fn contains(&self, point: Vec2) -> bool {
        distance(self.pos, point) <= self.radius
    }

    /// Pop animation progress in [0, 1]; 0 while Active, 1 once Popped
    pub fn pop_progress(&self, now_ms: f64, pop_duration_ms: f32) -> f32 {
        match (self.state, self.pop_started_ms) {
            (BalloonState::Active, _) => 0.0,
            (BalloonState::Popped, _) => 1.0,
            (BalloonState::Popping, Some(start)) => {
                if pop_duration_ms <= 0.0 {
                    1.0
                } else {
                    (((now_ms - start) / pop_duration_ms as f64) as f32).clamp(0.0, 1.0)
                }
            }
            (BalloonState::Popping, None) => 0.0,
        }
    }
}

/// What the renderer needs to draw one balloon
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalloonView {
    pub id: BalloonId,
    pub number: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub color: BalloonColor,
    pub state: BalloonState,
    pub pop_progress: f32,
}

/// Live balloons, kept sorted by id
///
/// Ids are allocated in increasing order and balloons are only ever
/// appended, so the Vec stays sorted and lookups are a binary search.
/// Cleanup is a single `retain` pass.
#[derive(Debug, Clone, Default)]
pub struct BalloonRegistry {
    balloons: Vec<Balloon>,
}

impl BalloonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, balloon: Balloon) {
        let in_order = self.balloons.last().is_none_or(|last| last.id < balloon.id);
        if in_order {
            self.balloons.push(balloon);
            return;
        }

        // Out-of-order insert; keep the sort invariant
        let at = self.balloons.partition_point(|b| b.id < balloon.id);
        if self.balloons.get(at).is_some_and(|b| b.id == balloon.id) {
            log::warn!("Duplicate {} ignored", balloon.id);
            return;
        }
        self.balloons.insert(at, balloon);
    }

    pub fn get(&self, id: BalloonId) -> Option<&Balloon> {
        self.balloons
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &self.balloons[i])
    }

    pub fn get_mut(&mut self, id: BalloonId) -> Option<&mut Balloon> {
        match self.balloons.binary_search_by_key(&id, |b| b.id) {
            Ok(i) => Some(&mut self.balloons[i]),
            Err(_) => None,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Balloon> {
        self.balloons.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Balloon> {
        self.balloons.iter_mut()
    }

    pub fn as_slice(&self) -> &[Balloon] {
        &self.balloons
    }

    pub fn as_mut_slice(&mut self) -> &mut [Balloon] {
        &mut self.balloons
    }

    pub fn len(&self) -> usize {
        self.balloons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balloons.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.balloons.iter().filter(|b| b.is_active()).count()
    }

    /// Drop every Popped balloon, returning how many were removed
    pub fn remove_popped(&mut self) -> usize {
        let before = self.balloons.len();
        self.balloons.retain(|b| b.state != BalloonState::Popped);
        before - self.balloons.len()
    }
}

/// The balloon field: viewport, balloons, pop timers and RNG
#[derive(Debug, Clone)]
pub struct Scene {
    /// Viewport size in pixels
    pub width: f32,
    pub height: f32,
    pub settings: SceneSettings,
    pub tuning: PhysicsTuning,
    pub balloons: BalloonRegistry,
    /// Pending Popping -> Popped transitions; also the scene clock
    pub timers: Scheduler<BalloonId>,
    pub rng: Pcg32,
    pub seed: u64,
    next_id: u32,
}

impl Scene {
    /// Create an empty scene; see [`super::spawn::spawn_batch`] to populate it
    pub fn new(
        width: f32,
        height: f32,
        settings: SceneSettings,
        tuning: PhysicsTuning,
        seed: u64,
    ) -> Self {
        Self {
            width,
            height,
            settings,
            tuning,
            balloons: BalloonRegistry::new(),
            timers: Scheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            next_id: 1,
        }
    }

    /// Allocate a new balloon id
    pub fn next_balloon_id(&mut self) -> BalloonId {
        let id = BalloonId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Milliseconds of simulated time since the scene was created
    pub fn now_ms(&self) -> f64 {
        self.timers.now_ms()
    }

    /// Add an Active balloon with the configured radius, mass and elasticity
    pub fn insert(&mut self, pos: Vec2, vel: Vec2) -> BalloonId {
        let id = self.next_balloon_id();
        let mut balloon = Balloon::new(
            id,
            pos,
            vel,
            self.settings.radius,
            self.settings.mass,
            self.settings.elasticity,
        );
        balloon.created_at_ms = self.now_ms();
        self.balloons.push(balloon);
        id
    }

    /// Topmost Active balloon under `point`
    ///
    /// Balloons are drawn in registry order, so the last match is on top.
    pub fn hit_test(&self, point: Vec2) -> Option<BalloonId> {
        self.balloons
            .iter()
            .rev()
            .find(|b| b.is_active() && b.contains(point))
            .map(|b| b.id())
    }

    /// Number of balloons still floating
    pub fn remaining(&self) -> usize {
        self.balloons.active_count()
    }

    pub fn is_cleared(&self) -> bool {
        self.remaining() == 0
    }

    /// Snapshot for the renderer
    pub fn views(&self) -> Vec<BalloonView> {
        let now = self.now_ms();
        let duration = self.tuning.pop_duration_ms;
        self.balloons
            .iter()
            .map(|b| BalloonView {
                id: b.id(),
                number: b.number,
                pos: b.pos,
                radius: b.radius(),
                color: b.color,
                state: b.state(),
                pop_progress: b.pop_progress(now, duration),
            })
            .collect()
    }

    /// Viewport changed; the next boundary pass pulls balloons back inside
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.width = width;
            self.height = height;
        }
    }

    /// Cancel every pending pop timer. Returns how many were cancelled
    pub fn teardown(&mut self) -> usize {
        self.timers.cancel_all()
    }

    /// Reschedule every Popping balloon after a teardown, restarting its
    /// animation from the current scene time. Returns how many were resumed
    pub fn resume_pops(&mut self) -> usize {
        self.timers.cancel_all();
        let now = self.now_ms();
        let delay = self.tuning.pop_duration_ms as f64;
        let mut resumed = 0;
        for balloon in self.balloons.iter_mut() {
            if balloon.restart_pop(now) {
                self.timers.schedule(delay, balloon.id());
                resumed += 1;
            }
        }
        resumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(
            800.0,
            600.0,
            SceneSettings::default(),
            PhysicsTuning::default(),
            1,
        )
    }

    #[test]
    fn test_lifecycle_only_moves_forward() {
        let mut b = Balloon::new(BalloonId(1), Vec2::ZERO, Vec2::ZERO, 25.0, 1.0, 0.8);
        assert!(b.is_active());
        assert!(!b.finish_pop(), "cannot skip Popping");
        assert!(b.begin_pop(10.0));
        assert!(!b.begin_pop(20.0), "double click is a no-op");
        assert_eq!(b.state(), BalloonState::Popping);
        assert!(b.finish_pop());
        assert_eq!(b.state(), BalloonState::Popped);
        assert!(!b.begin_pop(30.0));
        assert_eq!(b.state(), BalloonState::Popped);
    }

    #[test]
    fn test_pop_progress() {
        let mut b = Balloon::new(BalloonId(1), Vec2::ZERO, Vec2::ZERO, 25.0, 1.0, 0.8);
        assert_eq!(b.pop_progress(0.0, 300.0), 0.0);
        b.begin_pop(100.0);
        assert!((b.pop_progress(250.0, 300.0) - 0.5).abs() < 1e-6);
        assert_eq!(b.pop_progress(1000.0, 300.0), 1.0);
        b.finish_pop();
        assert_eq!(b.pop_progress(0.0, 300.0), 1.0);
    }

    #[test]
    fn test_palette_rgba() {
        assert_eq!(BalloonColor::Red.rgba(), [1.0, 68.0 / 255.0, 68.0 / 255.0, 1.0]);
        assert_eq!(BalloonColor::Cyan.rgba()[0], 68.0 / 255.0);
        assert_eq!(BalloonColor::ALL.len(), 8);
    }

    #[test]
    fn test_registry_lookup_and_cleanup() {
        let mut scene = scene();
        let a = scene.insert(Vec2::new(100.0, 100.0), Vec2::ZERO);
        let b = scene.insert(Vec2::new(300.0, 100.0), Vec2::ZERO);
        let c = scene.insert(Vec2::new(500.0, 100.0), Vec2::ZERO);
        assert_eq!(scene.balloons.len(), 3);
        assert_eq!(scene.balloons.get(b).map(|x| x.pos.x), Some(300.0));

        let balloon = scene.balloons.get_mut(b).unwrap();
        balloon.begin_pop(0.0);
        balloon.finish_pop();

        assert_eq!(scene.balloons.remove_popped(), 1);
        assert!(scene.balloons.get(b).is_none());
        assert!(scene.balloons.get(a).is_some());
        assert!(scene.balloons.get(c).is_some());
        assert_eq!(scene.balloons.remove_popped(), 0);
    }

    #[test]
    fn test_registry_out_of_order_push_stays_sorted() {
        let mut registry = BalloonRegistry::new();
        for id in [5, 2, 9, 1] {
            registry.push(Balloon::new(BalloonId(id), Vec2::ZERO, Vec2::ZERO, 1.0, 1.0, 1.0));
        }
        // Duplicate is ignored
        registry.push(Balloon::new(BalloonId(2), Vec2::ONE, Vec2::ZERO, 1.0, 1.0, 1.0));

        let ids: Vec<u32> = registry.iter().map(|b| b.id().0).collect();
        assert_eq!(ids, vec![1, 2, 5, 9]);
        assert_eq!(registry.get(BalloonId(2)).map(|b| b.pos), Some(Vec2::ZERO));
        assert!(registry.get(BalloonId(3)).is_none());
    }

    #[test]
    fn test_hit_test_picks_topmost_active() {
        let mut scene = scene();
        let below = scene.insert(Vec2::new(100.0, 100.0), Vec2::ZERO);
        let above = scene.insert(Vec2::new(110.0, 100.0), Vec2::ZERO);

        assert_eq!(scene.hit_test(Vec2::new(105.0, 100.0)), Some(above));
        assert_eq!(scene.hit_test(Vec2::new(80.0, 100.0)), Some(below));
        assert_eq!(scene.hit_test(Vec2::new(400.0, 400.0)), None);

        scene.balloons.get_mut(above).unwrap().begin_pop(0.0);
        assert_eq!(scene.hit_test(Vec2::new(105.0, 100.0)), Some(below));
    }

    #[test]
    fn test_remaining_and_views() {
        let mut scene = scene();
        let a = scene.insert(Vec2::new(100.0, 100.0), Vec2::ZERO);
        scene.insert(Vec2::new(300.0, 100.0), Vec2::ZERO);
        assert_eq!(scene.remaining(), 2);

        scene.balloons.get_mut(a).unwrap().begin_pop(0.0);
        assert_eq!(scene.remaining(), 1);
        assert!(!scene.is_cleared());

        let views = scene.views();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].state, BalloonState::Popping);
        assert_eq!(views[0].radius, 25.0);
        assert_eq!(views[1].state, BalloonState::Active);
    }

    #[test]
    fn test_resize_ignores_degenerate_sizes() {
        let mut scene = scene();
        scene.resize(1024.0, 768.0);
        assert_eq!((scene.width, scene.height), (1024.0, 768.0));
        scene.resize(0.0, 500.0);
        assert_eq!((scene.width, scene.height), (1024.0, 768.0));
    }

    #[test]
    fn test_balloon_serializes() {
        let b = Balloon::new(BalloonId(3), Vec2::new(1.0, 2.0), Vec2::ZERO, 25.0, 1.0, 0.8);
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains("\"Active\""));
        let back: Balloon = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), BalloonId(3));
        assert_eq!(back.radius(), 25.0);
    }
}
