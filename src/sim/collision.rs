//! Collision detection and response between balloons and against the viewport
//!
//! Balloons are circles. Two balloons collide when their circles overlap;
//! the response is an impulse along the line between centers followed by a
//! positional push so overlapping pairs do not stick together.

use super::state::{Balloon, BalloonId};

/// Result of a balloon-balloon collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether the circles overlap
    pub hit: bool,
    pub first: BalloonId,
    pub second: BalloonId,
    /// |v1 - v2| scaled by the lighter mass (informational)
    pub impact_force: f32,
}

impl CollisionResult {
    pub fn miss(first: BalloonId, second: BalloonId) -> Self {
        Self {
            hit: false,
            first,
            second,
            impact_force: 0.0,
        }
    }
}

/// Check whether two Active balloons overlap
pub fn detect_collision(b1: &Balloon, b2: &Balloon) -> CollisionResult {
    if !b1.is_active() || !b2.is_active() {
        return CollisionResult::miss(b1.id(), b2.id());
    }

    let dist = (b2.pos - b1.pos).length();
    if dist >= b1.radius() + b2.radius() {
        return CollisionResult::miss(b1.id(), b2.id());
    }

    CollisionResult {
        hit: true,
        first: b1.id(),
        second: b2.id(),
        impact_force: (b1.vel - b2.vel).length() * b1.mass().min(b2.mass()),
    }
}

/// Resolve an overlapping pair
///
/// Impulse along the normal n = (p2 - p1) / d with restitution equal to the
/// pair's average elasticity. Pairs already separating along n keep their
/// velocities. Coincident centers have no normal and are left untouched.
///
/// The impulse is `(1 + e) * vn / (m1 + m2)`, not `2 * e * vn / (m1 + m2)`:
/// the two agree at e = 1, but only this one stops the approach at e = 0
/// (at the default e = 0.8 it is 1.8 vs 1.6 times `vn / (m1 + m2)`).
pub fn resolve_collision(b1: &mut Balloon, b2: &mut Balloon) {
    let delta = b2.pos - b1.pos;
    let dist = delta.length();
    if dist == 0.0 {
        return;
    }
    let normal = delta / dist;

    // Relative velocity of b2 seen from b1, along the normal (> 0: moving apart)
    let vn = (b2.vel - b1.vel).dot(normal);
    if vn > 0.0 {
        return;
    }

    let elasticity = (b1.elasticity() + b2.elasticity()) / 2.0;
    let (m1, m2) = (b1.mass(), b2.mass());
    let impulse = (1.0 + elasticity) * vn / (m1 + m2);

    b1.vel += normal * (impulse * m2);
    b2.vel -= normal * (impulse * m1);

    let overlap = b1.radius() + b2.radius() - dist;
    if overlap > 0.0 {
        let push = normal * (overlap / 2.0);
        b1.pos -= push;
        b2.pos += push;
    }
}

/// Run detection and resolution over every unordered pair exactly once.
/// Returns the number of collisions resolved
pub fn collide_pairs(balloons: &mut [Balloon]) -> usize {
    let mut collisions = 0;
    for j in 1..balloons.len() {
        let (head, tail) = balloons.split_at_mut(j);
        let b2 = &mut tail[0];
        if !b2.is_active() {
            continue;
        }
        for b1 in head.iter_mut() {
            if detect_collision(b1, b2).hit {
                resolve_collision(b1, b2);
                collisions += 1;
            }
        }
    }
    collisions
}

/// Keep an Active balloon inside a `width` x `height` viewport
///
/// Any edge the balloon crosses clamps it back to touching that edge and
/// sends the matching velocity component back inward, scaled by `damping`.
pub fn check_boundary_collision(balloon: &mut Balloon, width: f32, height: f32, damping: f32) {
    if !balloon.is_active() {
        return;
    }
    let r = balloon.radius();

    // Left
    if balloon.pos.x - r < 0.0 {
        balloon.pos.x = r;
        balloon.vel.x = balloon.vel.x.abs() * damping;
    }
    // Right
    if balloon.pos.x + r > width {
        balloon.pos.x = width - r;
        balloon.vel.x = -balloon.vel.x.abs() * damping;
    }
    // Top
    if balloon.pos.y - r < 0.0 {
        balloon.pos.y = r;
        balloon.vel.y = balloon.vel.y.abs() * damping;
    }
    // Bottom
    if balloon.pos.y + r > height {
        balloon.pos.y = height - r;
        balloon.vel.y = -balloon.vel.y.abs() * damping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn balloon(id: u32, x: f32, y: f32, vx: f32, vy: f32, elasticity: f32) -> Balloon {
        Balloon::new(
            BalloonId(id),
            Vec2::new(x, y),
            Vec2::new(vx, vy),
            25.0,
            1.0,
            elasticity,
        )
    }

    fn normal_energy(b1: &Balloon, b2: &Balloon, n: Vec2) -> f32 {
        let v1 = b1.vel.dot(n);
        let v2 = b2.vel.dot(n);
        0.5 * b1.mass() * v1 * v1 + 0.5 * b2.mass() * v2 * v2
    }

    #[test]
    fn test_detect_overlapping() {
        let a = balloon(1, 100.0, 100.0, 0.0, 0.0, 0.8);
        let b = balloon(2, 110.0, 100.0, 0.0, 0.0, 0.8);
        let result = detect_collision(&a, &b);
        assert!(result.hit);
        assert_eq!((result.first, result.second), (BalloonId(1), BalloonId(2)));
        assert_eq!(result.impact_force, 0.0);
    }

    #[test]
    fn test_detect_touching_is_not_a_collision() {
        let a = balloon(1, 100.0, 100.0, 0.0, 0.0, 0.8);
        let b = balloon(2, 150.0, 100.0, 0.0, 0.0, 0.8);
        assert!(!detect_collision(&a, &b).hit);
    }

    #[test]
    fn test_detect_ignores_non_active() {
        let a = balloon(1, 100.0, 100.0, 0.0, 0.0, 0.8);
        let mut b = balloon(2, 110.0, 100.0, 0.0, 0.0, 0.8);
        b.begin_pop(0.0);
        assert!(!detect_collision(&a, &b).hit);
        assert!(!detect_collision(&b, &a).hit);
    }

    #[test]
    fn test_impact_force_uses_lighter_mass() {
        let a = Balloon::new(BalloonId(1), Vec2::ZERO, Vec2::new(3.0, 0.0), 25.0, 2.0, 0.8);
        let b = Balloon::new(BalloonId(2), Vec2::new(10.0, 0.0), Vec2::new(0.0, 4.0), 25.0, 0.5, 0.8);
        let result = detect_collision(&a, &b);
        assert!(result.hit);
        assert!((result.impact_force - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_resting_overlap_only_separates() {
        let mut a = balloon(1, 100.0, 100.0, 0.0, 0.0, 0.8);
        let mut b = balloon(2, 110.0, 100.0, 0.0, 0.0, 0.8);
        resolve_collision(&mut a, &mut b);

        // overlap = 50 - 10 = 40, each pushed 20 along x
        assert!((a.pos.x - 80.0).abs() < 1e-4);
        assert!((b.pos.x - 130.0).abs() < 1e-4);
        assert_eq!(a.pos.y, 100.0);
        assert_eq!(b.pos.y, 100.0);
        assert_eq!(a.vel, Vec2::ZERO);
        assert_eq!(b.vel, Vec2::ZERO);
    }

    #[test]
    fn test_head_on_elastic_swaps_velocities() {
        let mut a = balloon(1, 100.0, 100.0, 2.0, 0.0, 1.0);
        let mut b = balloon(2, 140.0, 100.0, -1.0, 0.0, 1.0);
        resolve_collision(&mut a, &mut b);
        assert!((a.vel.x - -1.0).abs() < 1e-5);
        assert!((b.vel.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_elastic_conserves_normal_energy() {
        let mut a = balloon(1, 100.0, 100.0, 1.5, 0.7, 1.0);
        let mut b = balloon(2, 130.0, 120.0, -0.4, -1.1, 1.0);
        let n = (b.pos - a.pos).normalize();
        let before = normal_energy(&a, &b, n);
        resolve_collision(&mut a, &mut b);
        let after = normal_energy(&a, &b, n);
        assert!((before - after).abs() < 1e-4, "{before} vs {after}");
    }

    #[test]
    fn test_inelastic_stops_approach() {
        let mut a = balloon(1, 100.0, 100.0, 2.0, 0.5, 0.0);
        let mut b = balloon(2, 130.0, 110.0, -1.0, 0.0, 0.0);
        let n = (b.pos - a.pos).normalize();
        resolve_collision(&mut a, &mut b);
        let vn = (b.vel - a.vel).dot(n);
        assert!(vn >= -1e-5, "still approaching: {vn}");
    }

    #[test]
    fn test_separating_pair_keeps_velocity() {
        let mut a = balloon(1, 100.0, 100.0, -1.0, 0.0, 0.8);
        let mut b = balloon(2, 120.0, 100.0, 1.0, 0.0, 0.8);
        resolve_collision(&mut a, &mut b);
        assert_eq!(a.vel, Vec2::new(-1.0, 0.0));
        assert_eq!(b.vel, Vec2::new(1.0, 0.0));
        // Already moving apart, so no positional push either
        assert_eq!(a.pos, Vec2::new(100.0, 100.0));
        assert_eq!(b.pos, Vec2::new(120.0, 100.0));
    }

    #[test]
    fn test_coincident_centers_are_untouched() {
        let mut a = balloon(1, 100.0, 100.0, 1.0, 2.0, 0.8);
        let mut b = balloon(2, 100.0, 100.0, -3.0, 0.5, 0.8);
        resolve_collision(&mut a, &mut b);
        assert_eq!(a.vel, Vec2::new(1.0, 2.0));
        assert_eq!(b.vel, Vec2::new(-3.0, 0.5));
        assert_eq!(a.pos, b.pos);
        assert!(a.vel.is_finite() && b.vel.is_finite());
    }

    #[test]
    fn test_collide_pairs_counts_each_pair_once() {
        let mut balloons = vec![
            balloon(1, 100.0, 100.0, 0.0, 0.0, 0.8),
            balloon(2, 120.0, 100.0, 0.0, 0.0, 0.8),
            balloon(3, 400.0, 400.0, 0.0, 0.0, 0.8),
        ];
        assert_eq!(collide_pairs(&mut balloons), 1);
        assert!(balloons[1].pos.x - balloons[0].pos.x >= 50.0 - 1e-4);
        assert_eq!(balloons[2].pos, Vec2::new(400.0, 400.0));
    }

    #[test]
    fn test_collide_pairs_skips_popping() {
        let mut balloons = vec![
            balloon(1, 100.0, 100.0, 0.0, 0.0, 0.8),
            balloon(2, 120.0, 100.0, 0.0, 0.0, 0.8),
        ];
        balloons[0].begin_pop(0.0);
        assert_eq!(collide_pairs(&mut balloons), 0);
        assert_eq!(balloons[0].pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_boundary_left_and_bottom() {
        let mut b = balloon(1, 10.0, 590.0, -2.0, 3.0, 0.8);
        check_boundary_collision(&mut b, 800.0, 600.0, 0.8);
        assert_eq!(b.pos, Vec2::new(25.0, 575.0));
        assert!((b.vel.x - 1.6).abs() < 1e-6);
        assert!((b.vel.y - -2.4).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_right_and_top() {
        let mut b = balloon(1, 790.0, 5.0, 4.0, -1.0, 0.8);
        check_boundary_collision(&mut b, 800.0, 600.0, 0.8);
        assert_eq!(b.pos, Vec2::new(775.0, 25.0));
        assert!((b.vel.x - -3.2).abs() < 1e-6);
        assert!((b.vel.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_inside_is_untouched() {
        let mut b = balloon(1, 400.0, 300.0, 4.0, -1.0, 0.8);
        check_boundary_collision(&mut b, 800.0, 600.0, 0.8);
        assert_eq!(b.pos, Vec2::new(400.0, 300.0));
        assert_eq!(b.vel, Vec2::new(4.0, -1.0));
    }

    #[test]
    fn test_boundary_ignores_popping() {
        let mut b = balloon(1, -10.0, 300.0, -4.0, 0.0, 0.8);
        b.begin_pop(0.0);
        check_boundary_collision(&mut b, 800.0, 600.0, 0.8);
        assert_eq!(b.pos.x, -10.0);
    }

    proptest! {
        #[test]
        fn prop_boundary_contains(
            x in -500.0f32..1500.0,
            y in -500.0f32..1500.0,
            vx in -20.0f32..20.0,
            vy in -20.0f32..20.0,
            width in 50.0f32..1200.0,
            height in 50.0f32..1200.0,
        ) {
            let mut b = balloon(1, x, y, vx, vy, 0.8);
            check_boundary_collision(&mut b, width, height, 0.8);
            prop_assert!(b.pos.x - b.radius() >= -1e-3);
            prop_assert!(b.pos.x + b.radius() <= width + 1e-3);
            prop_assert!(b.pos.y - b.radius() >= -1e-3);
            prop_assert!(b.pos.y + b.radius() <= height + 1e-3);
            prop_assert!(b.vel.length() <= Vec2::new(vx, vy).length() + 1e-4);
        }

        #[test]
        fn prop_detect_is_symmetric(
            x1 in 0.0f32..300.0, y1 in 0.0f32..300.0,
            x2 in 0.0f32..300.0, y2 in 0.0f32..300.0,
        ) {
            let a = balloon(1, x1, y1, 0.0, 0.0, 0.8);
            let b = balloon(2, x2, y2, 0.0, 0.0, 0.8);
            let ab = detect_collision(&a, &b);
            let ba = detect_collision(&b, &a);
            prop_assert_eq!(ab.hit, ba.hit);
            prop_assert_eq!(ab.hit, a.pos.distance(b.pos) < 50.0);
        }

        #[test]
        fn prop_resolve_conserves_momentum(
            vx1 in -5.0f32..5.0, vy1 in -5.0f32..5.0,
            vx2 in -5.0f32..5.0, vy2 in -5.0f32..5.0,
            dx in 1.0f32..45.0, dy in -20.0f32..20.0,
            e in 0.0f32..=1.0,
        ) {
            let mut a = Balloon::new(BalloonId(1), Vec2::new(200.0, 200.0), Vec2::new(vx1, vy1), 25.0, 1.0, e);
            let mut b = Balloon::new(BalloonId(2), Vec2::new(200.0 + dx, 200.0 + dy), Vec2::new(vx2, vy2), 25.0, 2.0, e);
            let before = a.vel * a.mass() + b.vel * b.mass();
            resolve_collision(&mut a, &mut b);
            let after = a.vel * a.mass() + b.vel * b.mass();
            prop_assert!((before - after).length() < 1e-3);
        }
    }
}
