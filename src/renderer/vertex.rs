//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex with position and color
///
/// Shapes are built in viewport pixels (y down); the render state maps
/// positions to clip space just before upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for scene elements that do not come from the balloon palette
pub mod colors {
    /// Soft night-sky backdrop behind the balloons
    pub const BACKGROUND: [f32; 4] = [0.06, 0.05, 0.12, 1.0];
    /// Glossy spot on each balloon
    pub const HIGHLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.35];
    /// Ring flashed around a popping balloon
    pub const POP_RING: [f32; 4] = [1.0, 1.0, 1.0, 0.8];

    /// Scale the RGB channels, keeping alpha
    pub fn shade(color: [f32; 4], factor: f32) -> [f32; 4] {
        [
            (color[0] * factor).clamp(0.0, 1.0),
            (color[1] * factor).clamp(0.0, 1.0),
            (color[2] * factor).clamp(0.0, 1.0),
            color[3],
        ]
    }

    /// Multiply alpha by `opacity`
    pub fn fade(color: [f32; 4], opacity: f32) -> [f32; 4] {
        [color[0], color[1], color[2], color[3] * opacity.clamp(0.0, 1.0)]
    }
}
