//! Drawing surface abstraction
//!
//! The compositor only talks to a `DrawingSurface`. Backends decide how the
//! primitives become pixels (vertex batches for the GPU, a command log in tests).

use glam::Vec2;

use crate::sim::Rect;
use crate::sim::state::Rgb;

/// Linear RGBA color, components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb(rgb: Rgb) -> Self {
        Self::rgba(
            rgb.r as f32 / 255.0,
            rgb.g as f32 / 255.0,
            rgb.b as f32 / 255.0,
            1.0,
        )
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Multiply alpha by `factor`
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }

    /// Component-wise interpolation (alpha included)
    pub fn mix(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgba(
            crate::lerp(self.r, other.r, t),
            crate::lerp(self.g, other.g, t),
            crate::lerp(self.b, other.b, t),
            crate::lerp(self.a, other.a, t),
        )
    }

    /// Move the color channels `t` of the way toward white, keeping alpha
    pub fn toward_white(self, t: f32) -> Self {
        Self {
            a: self.a,
            ..self.mix(Color::WHITE, t)
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Fill style
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Interpolates `from` at `start` to `to` at `end`, projected onto the segment
    Linear {
        start: Vec2,
        end: Vec2,
        from: Color,
        to: Color,
    },
    /// Elliptical gradient from `inner` at the center to `outer` at the rim
    Radial {
        center: Vec2,
        radii: Vec2,
        inner: Color,
        outer: Color,
    },
}

impl Paint {
    /// Color of the paint at `p`
    pub fn color_at(&self, p: Vec2) -> Color {
        match *self {
            Paint::Solid(color) => color,
            Paint::Linear {
                start,
                end,
                from,
                to,
            } => {
                let axis = end - start;
                let len_sq = axis.length_squared();
                let t = if len_sq > 0.0 {
                    (p - start).dot(axis) / len_sq
                } else {
                    0.0
                };
                from.mix(to, t)
            }
            Paint::Radial {
                center,
                radii,
                inner,
                outer,
            } => {
                let d = (p - center) / radii.max(Vec2::splat(f32::EPSILON));
                inner.mix(outer, d.length())
            }
        }
    }

    /// Whether every color of the paint is fully transparent
    pub fn is_invisible(&self) -> bool {
        match *self {
            Paint::Solid(c) => c.a <= 0.0,
            Paint::Linear { from, to, .. } => from.a <= 0.0 && to.a <= 0.0,
            Paint::Radial { inner, outer, .. } => inner.a <= 0.0 && outer.a <= 0.0,
        }
    }
}

/// Compositor layers, in draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Clear,
    Background,
    ZoneOverlay,
    Particles,
    Bodies,
    Beams,
    Labels,
    BorderGlow,
}

impl Layer {
    pub const ORDER: [Layer; 8] = [
        Layer::Clear,
        Layer::Background,
        Layer::ZoneOverlay,
        Layer::Particles,
        Layer::Bodies,
        Layer::Beams,
        Layer::Labels,
        Layer::BorderGlow,
    ];
}

/// Opaque handle to a host-loaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// Immediate-mode drawing target
pub trait DrawingSurface {
    /// Surface size in canvas pixels
    fn size(&self) -> Vec2;

    /// Called once before each compositor layer
    fn begin_layer(&mut self, _layer: Layer) {}

    fn clear(&mut self, color: Color);

    /// Draw a host image; returns false if the image is unavailable
    fn draw_image(&mut self, _image: ImageId, _dest: Rect, _alpha: f32) -> bool {
        false
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint);

    /// Convex polygon
    fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint);

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, paint: &Paint);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.fill_ellipse(center, Vec2::splat(radius), paint);
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Color);

    /// Text extent without padding
    fn measure_text(&self, text: &str, font_px: f32) -> Vec2;

    fn draw_text(&mut self, text: &str, center: Vec2, font_px: f32, color: Color);
}
