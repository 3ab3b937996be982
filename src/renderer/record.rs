//! Recording surface
//!
//! Captures draw calls instead of rasterizing them. Used by tests and by hosts
//! that want to inspect or replay a frame.

use glam::Vec2;

use super::surface::{Color, DrawingSurface, ImageId, Layer, Paint};
use crate::sim::Rect;
use crate::sim::placement::text_extent;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginLayer(Layer),
    Clear(Color),
    Image {
        image: ImageId,
        dest: Rect,
        alpha: f32,
    },
    Rect {
        rect: Rect,
        paint: Paint,
    },
    Polygon {
        points: Vec<Vec2>,
        paint: Paint,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        paint: Paint,
    },
    Polyline {
        points: Vec<Vec2>,
        closed: bool,
        width: f32,
        color: Color,
    },
    Text {
        text: String,
        center: Vec2,
        font_px: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub size: Vec2,
    pub commands: Vec<DrawCommand>,
    /// Images the surface pretends to have loaded
    pub images: Vec<ImageId>,
}

impl RecordingSurface {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Layers in the order they were announced
    pub fn layers(&self) -> Vec<Layer> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::BeginLayer(layer) => Some(*layer),
                _ => None,
            })
            .collect()
    }

    /// Commands issued between `begin_layer(layer)` and the next layer
    pub fn commands_in(&self, layer: Layer) -> Vec<&DrawCommand> {
        let mut current = None;
        let mut out = Vec::new();
        for command in &self.commands {
            match command {
                DrawCommand::BeginLayer(l) => current = Some(*l),
                other if current == Some(layer) => out.push(other),
                _ => {}
            }
        }
        out
    }

    /// Text strings drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn begin_layer(&mut self, layer: Layer) {
        self.commands.push(DrawCommand::BeginLayer(layer));
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_image(&mut self, image: ImageId, dest: Rect, alpha: f32) -> bool {
        if !self.images.contains(&image) {
            return false;
        }
        self.commands.push(DrawCommand::Image { image, dest, alpha });
        true
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.commands.push(DrawCommand::Rect {
            rect,
            paint: *paint,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            paint: *paint,
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, paint: &Paint) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            radii,
            paint: *paint,
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Color) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            closed,
            width,
            color,
        });
    }

    fn measure_text(&self, text: &str, font_px: f32) -> Vec2 {
        text_extent(text, font_px)
    }

    fn draw_text(&mut self, text: &str, center: Vec2, font_px: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            center,
            font_px,
            color,
        });
    }
}
