//! Triangle-list tessellation of drawing commands
//!
//! `VertexBatch` is the surface used by the GPU presenter and the headless host.
//! Gradients are evaluated per vertex; the rasterizer interpolates between them.

use glam::Vec2;
use std::f32::consts::TAU;

use super::surface::{Color, DrawingSurface, Layer, Paint};
use super::vertex::Vertex;
use crate::sim::Rect;
use crate::sim::placement::{GLYPH_ADVANCE, text_extent};

/// Segments used for a full ellipse
const ELLIPSE_SEGMENTS: u32 = 32;
/// Block glyph size relative to the font size
const GLYPH_WIDTH: f32 = 0.45;
const GLYPH_HEIGHT: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct VertexBatch {
    size: Vec2,
    vertices: Vec<Vertex>,
    clear_color: Color,
    /// Layer markers with the vertex index where each layer starts
    layers: Vec<(Layer, usize)>,
}

impl VertexBatch {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            vertices: Vec::with_capacity(16 * 1024),
            clear_color: Color::BLACK,
            layers: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Vertex count per announced layer, in draw order
    pub fn layer_vertex_counts(&self) -> Vec<(Layer, usize)> {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, &(layer, start))| {
                let end = self
                    .layers
                    .get(i + 1)
                    .map_or(self.vertices.len(), |&(_, next)| next);
                (layer, end - start)
            })
            .collect()
    }

    fn push(&mut self, p: Vec2, color: Color) {
        self.vertices.push(Vertex::new(p.x, p.y, color.to_array()));
    }

    fn push_painted(&mut self, p: Vec2, paint: &Paint) {
        self.push(p, paint.color_at(p));
    }

    fn quad(&mut self, corners: [Vec2; 4], paint: &Paint) {
        let [a, b, c, d] = corners;
        for p in [a, b, c, c, d, a] {
            self.push_painted(p, paint);
        }
    }
}

impl DrawingSurface for VertexBatch {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn begin_layer(&mut self, layer: Layer) {
        self.layers.push((layer, self.vertices.len()));
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.vertices.clear();
        // Only the layer that issued the clear survives, now starting at zero
        let current = self.layers.last().map(|&(layer, _)| layer);
        self.layers.clear();
        if let Some(layer) = current {
            self.layers.push((layer, 0));
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        if rect.is_empty() || paint.is_invisible() {
            return;
        }
        self.quad(rect.corners(), paint);
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        if points.len() < 3 || paint.is_invisible() {
            return;
        }
        let anchor = points[0];
        for pair in points[1..].windows(2) {
            self.push_painted(anchor, paint);
            self.push_painted(pair[0], paint);
            self.push_painted(pair[1], paint);
        }
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, paint: &Paint) {
        if radii.x <= 0.0 || radii.y <= 0.0 || paint.is_invisible() {
            return;
        }
        let center_color = paint.color_at(center);
        for i in 0..ELLIPSE_SEGMENTS {
            let theta1 = (i as f32 / ELLIPSE_SEGMENTS as f32) * TAU;
            let theta2 = ((i + 1) as f32 / ELLIPSE_SEGMENTS as f32) * TAU;
            let p1 = center + Vec2::new(theta1.cos(), theta1.sin()) * radii;
            let p2 = center + Vec2::new(theta2.cos(), theta2.sin()) * radii;

            self.push(center, center_color);
            self.push_painted(p1, paint);
            self.push_painted(p2, paint);
        }
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Color) {
        if points.len() < 2 || width <= 0.0 || color.a <= 0.0 {
            return;
        }
        let paint = Paint::Solid(color);
        let half = width / 2.0;
        let closing = closed.then(|| (points[points.len() - 1], points[0]));
        let segments = points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing);
        for (p1, p2) in segments {
            let dir = (p2 - p1).normalize_or_zero();
            let perp = Vec2::new(-dir.y, dir.x) * half;
            // Extend along the segment so corners join without gaps
            let ext = dir * half;
            self.quad(
                [
                    p1 - ext + perp,
                    p2 + ext + perp,
                    p2 + ext - perp,
                    p1 - ext - perp,
                ],
                &paint,
            );
        }
    }

    fn measure_text(&self, text: &str, font_px: f32) -> Vec2 {
        text_extent(text, font_px)
    }

    /// Text is drawn as one block per visible character
    fn draw_text(&mut self, text: &str, center: Vec2, font_px: f32, color: Color) {
        if color.a <= 0.0 {
            return;
        }
        let extent = text_extent(text, font_px);
        let advance = font_px * GLYPH_ADVANCE;
        let glyph = Vec2::new(font_px * GLYPH_WIDTH, font_px * GLYPH_HEIGHT);
        let left = center.x - extent.x / 2.0;
        let paint = Paint::Solid(color);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let glyph_center = Vec2::new(left + advance * (i as f32 + 0.5), center.y);
            self.quad(Rect::from_center(glyph_center, glyph).corners(), &paint);
        }
    }
}
