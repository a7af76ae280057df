//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::sim::{BalloonState, BalloonView};

/// Size a popping balloon grows to by the end of its animation
const POP_SCALE: f32 = 1.5;

/// Enough segments that an outline looks round at this radius
pub fn segments_for(radius: f32) -> u32 {
    ((radius * 0.8) as u32).clamp(12, 64)
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let dir1 = Vec2::new(theta1.cos(), theta1.sin());
        let dir2 = Vec2::new(theta2.cos(), theta2.sin());
        let inner1 = center + dir1 * inner_radius;
        let outer1 = center + dir1 * outer_radius;
        let inner2 = center + dir2 * inner_radius;
        let outer2 = center + dir2 * outer_radius;

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Vertices for one balloon: knot, body and highlight
///
/// A popping balloon swells to 1.5x while fading out, with a thin ring
/// flashing around it. Popped balloons draw nothing.
pub fn balloon(view: &BalloonView) -> Vec<Vertex> {
    let (scale, opacity) = match view.state {
        BalloonState::Active => (1.0, 1.0),
        BalloonState::Popping => {
            let t = view.pop_progress.clamp(0.0, 1.0);
            (1.0 + (POP_SCALE - 1.0) * t, 1.0 - t)
        }
        BalloonState::Popped => return Vec::new(),
    };
    if opacity <= 0.0 {
        return Vec::new();
    }

    let r = view.radius * scale;
    let c = view.pos;
    let body = colors::fade(view.color.rgba(), opacity);
    let segments = segments_for(r);

    let mut vertices = Vec::with_capacity((segments * 6 + 3) as usize);

    // Knot: small triangle hanging under the body (y grows downward)
    let knot = colors::shade(body, 0.7);
    let tip = c + Vec2::new(0.0, r * 1.18);
    vertices.push(Vertex::new(c.x - r * 0.14, c.y + r * 0.96, knot));
    vertices.push(Vertex::new(c.x + r * 0.14, c.y + r * 0.96, knot));
    vertices.push(Vertex::new(tip.x, tip.y, knot));

    vertices.extend(circle(c, r, body, segments));

    let highlight = colors::fade(colors::HIGHLIGHT, opacity);
    vertices.extend(circle(
        c + Vec2::new(-r * 0.35, -r * 0.35),
        r * 0.25,
        highlight,
        (segments / 2).max(8),
    ));

    if view.state == BalloonState::Popping {
        let flash = colors::fade(colors::POP_RING, opacity);
        vertices.extend(ring(c, r, r + 2.0, flash, segments));
    }

    vertices
}

/// All balloons in draw order (later views on top)
pub fn scene_vertices(views: &[BalloonView]) -> Vec<Vertex> {
    views.iter().flat_map(balloon).collect()
}
