use glam::Vec2;

use super::collider::{Collider, Shape};

/// Debug line geometry for colliders
///
/// Produces an indexed line list that a renderer can upload as-is. Drawing
/// it is up to the caller.
#[derive(Debug, Clone, Default)]
pub struct DebugLines {
    vertices: Vec<DebugVertex>,
    indices: Vec<u16>,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Colour scheme by collider state
pub mod colors {
    pub const SOLID: [f32; 4] = [0.0, 1.0, 0.0, 0.8]; // Green
    pub const TRIGGER: [f32; 4] = [1.0, 0.85, 0.0, 0.8]; // Yellow
    pub const INACTIVE: [f32; 4] = [0.5, 0.5, 0.5, 0.5]; // Gray
    pub const COLLIDING: [f32; 4] = [1.0, 0.2, 0.2, 0.9]; // Red
}

const CIRCLE_SEGMENTS: usize = 16;

impl DebugLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Vertex data ready for a GPU buffer
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data ready for a GPU buffer
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of line segments
    pub fn line_count(&self) -> usize {
        self.indices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Add a collider, coloured by its state
    pub fn add_collider(&mut self, collider: &Collider, colliding: bool) {
        let color = if !collider.is_active() {
            colors::INACTIVE
        } else if colliding {
            colors::COLLIDING
        } else if collider.is_trigger() {
            colors::TRIGGER
        } else {
            colors::SOLID
        };
        self.draw_collider(collider, color);
    }

    fn draw_collider(&mut self, collider: &Collider, color: [f32; 4]) {
        match collider.shape() {
            Shape::Circle { radius } => self.draw_circle(collider.position(), *radius, color),
            Shape::Box { .. } | Shape::Custom { .. } => {
                let bounds = collider.bounds();
                self.draw_box(bounds.min(), bounds.max(), color);
            }
            Shape::Compound { children } => {
                if children.is_empty() {
                    self.draw_cross(collider.position(), 0.5, color);
                }
                for child in children {
                    self.draw_collider(child, color);
                }
            }
        }
    }

    /// Draw a circle
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let Some(start_idx) = self.reserve(CIRCLE_SEGMENTS) else {
            return;
        };

        for i in 0..CIRCLE_SEGMENTS {
            let angle = (i as f32 / CIRCLE_SEGMENTS as f32) * std::f32::consts::TAU;
            let point = center + Vec2::new(angle.cos(), angle.sin()) * radius;
            self.push_vertex(point, color);

            // Add line segment
            let next = (i + 1) % CIRCLE_SEGMENTS;
            self.indices.push(start_idx + i as u16);
            self.indices.push(start_idx + next as u16);
        }
    }

    /// Draw a box
    fn draw_box(&mut self, min: Vec2, max: Vec2, color: [f32; 4]) {
        let Some(start_idx) = self.reserve(4) else {
            return;
        };

        // Four corners
        for corner in [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ] {
            self.push_vertex(corner, color);
        }

        // Four edges
        for i in 0..4 {
            self.indices.push(start_idx + i);
            self.indices.push(start_idx + (i + 1) % 4);
        }
    }

    /// Draw a cross (for shapes with no extent)
    fn draw_cross(&mut self, at: Vec2, size: f32, color: [f32; 4]) {
        let Some(start_idx) = self.reserve(4) else {
            return;
        };

        for offset in [
            Vec2::new(-size, 0.0),
            Vec2::new(size, 0.0),
            Vec2::new(0.0, -size),
            Vec2::new(0.0, size),
        ] {
            self.push_vertex(at + offset, color);
        }

        for i in 0..4 {
            self.indices.push(start_idx + i);
        }
    }

    fn push_vertex(&mut self, point: Vec2, color: [f32; 4]) {
        self.vertices.push(DebugVertex {
            position: point.to_array(),
            color,
        });
    }

    // u16 indices cap the buffer; extra shapes are skipped
    fn reserve(&self, count: usize) -> Option<u16> {
        let start = self.vertices.len();
        if start + count > u16::MAX as usize {
            log::warn!("Debug line buffer full, skipping shape");
            return None;
        }
        Some(start as u16)
    }
}
