//! Fixed-order frame compositor
//!
//! Every frame is drawn in the same layer order:
//! clear, background, zone overlay, particles, bodies, beams, labels, border glow.
//! Bodies, beams and labels are separate passes over all items so a label is never
//! covered by a body spawned after it.

use glam::{Mat2, Vec2};

use super::beam::draw_beam;
use super::style::{LabelStyleProvider, category_color, resolve_label_style};
use super::surface::{Color, DrawingSurface, ImageId, Layer, Paint};
use crate::settings::SceneSettings;
use crate::sim::ambient::ParticleField;
use crate::sim::placement::LabelLayout;
use crate::sim::{AnimatedItem, Boundary, ItemHandle, Rect};

/// Border glow pulse (radians per ms)
const GLOW_SPEED: f32 = 0.0015;
/// Card half extent as a fraction of the body radius
const CARD_HALF_EXTENT: f32 = 0.8;

/// Cosmetic overlays the host can switch on and off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    pub zone_overlay: bool,
    pub particles: bool,
    pub beams: bool,
    pub border_glow: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            zone_overlay: false,
            particles: true,
            beams: true,
            border_glow: false,
        }
    }
}

impl Toggles {
    pub const NAMES: [&'static str; 4] = ["zone_overlay", "particles", "beams", "border_glow"];

    fn slot(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "zone_overlay" => Some(&mut self.zone_overlay),
            "particles" => Some(&mut self.particles),
            "beams" => Some(&mut self.beams),
            "border_glow" => Some(&mut self.border_glow),
            _ => None,
        }
    }

    /// Set a toggle by name; returns false for unknown names
    pub fn set(&mut self, name: &str, enabled: bool) -> bool {
        match self.slot(name) {
            Some(slot) => {
                *slot = enabled;
                true
            }
            None => false,
        }
    }

    /// Flip a toggle by name; returns the new value
    pub fn flip(&mut self, name: &str) -> Option<bool> {
        let slot = self.slot(name)?;
        *slot = !*slot;
        Some(*slot)
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        match name {
            "zone_overlay" => Some(self.zone_overlay),
            "particles" => Some(self.particles),
            "beams" => Some(self.beams),
            "border_glow" => Some(self.border_glow),
            _ => None,
        }
    }
}

/// Background: an optional host image over a vertical gradient, plus a theme tint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    pub image: Option<ImageId>,
    pub top: Color,
    pub bottom: Color,
    pub tint: Option<Color>,
}

impl Default for Backdrop {
    fn default() -> Self {
        Self {
            image: None,
            top: Color::rgba(0.06, 0.07, 0.13, 1.0),
            bottom: Color::rgba(0.01, 0.01, 0.03, 1.0),
            tint: None,
        }
    }
}

/// Everything the compositor reads besides the items
pub struct FrameView<'a> {
    pub boundary: &'a Boundary,
    pub particles: &'a ParticleField,
    pub toggles: Toggles,
    pub hovered: Option<ItemHandle>,
    pub backdrop: &'a Backdrop,
    pub settings: &'a SceneSettings,
    pub style: &'a dyn LabelStyleProvider,
    /// Scene clock (ms), drives the border glow
    pub time_ms: f32,
}

/// Draw one frame
///
/// Takes the items mutably only to record each label's size the first time it is drawn.
pub fn render_frame(surface: &mut dyn DrawingSurface, items: &mut [AnimatedItem], frame: &FrameView) {
    let canvas = Rect::new(0.0, 0.0, surface.size().x, surface.size().y);

    surface.begin_layer(Layer::Clear);
    surface.clear(Color::BLACK);

    surface.begin_layer(Layer::Background);
    draw_background(surface, canvas, frame.backdrop);

    surface.begin_layer(Layer::ZoneOverlay);
    if frame.toggles.zone_overlay {
        draw_zone_overlay(surface, frame.boundary);
    }

    surface.begin_layer(Layer::Particles);
    if frame.toggles.particles {
        draw_particles(surface, frame.particles);
    }

    surface.begin_layer(Layer::Bodies);
    for item in items.iter() {
        draw_body(surface, item, frame.settings.body_radius);
    }

    surface.begin_layer(Layer::Beams);
    if frame.toggles.beams {
        for item in items.iter() {
            draw_beam(surface, item, &frame.settings.beam, frame.settings.body_radius);
        }
    }

    surface.begin_layer(Layer::Labels);
    let layout = LabelLayout::from(frame.settings);
    for item in items.iter_mut() {
        let hovered = frame.hovered == Some(item.id);
        draw_label(surface, item, &layout, frame.style, hovered);
    }

    surface.begin_layer(Layer::BorderGlow);
    if frame.toggles.border_glow {
        draw_border_glow(surface, canvas, frame.time_ms);
    }
}

fn draw_background(surface: &mut dyn DrawingSurface, canvas: Rect, backdrop: &Backdrop) {
    let drew_image = backdrop
        .image
        .is_some_and(|image| surface.draw_image(image, canvas, 1.0));
    if !drew_image {
        surface.fill_rect(
            canvas,
            &Paint::Linear {
                start: Vec2::new(0.0, canvas.y),
                end: Vec2::new(0.0, canvas.y + canvas.h),
                from: backdrop.top,
                to: backdrop.bottom,
            },
        );
    }
    if let Some(tint) = backdrop.tint {
        surface.fill_rect(canvas, &Paint::Solid(tint));
    }
}

fn draw_zone_overlay(surface: &mut dyn DrawingSurface, boundary: &Boundary) {
    let color = Color::rgba(0.3, 0.9, 0.6, 0.5);
    for outline in boundary.outlines() {
        surface.stroke_polyline(&outline, true, 1.5, color);
    }
}

fn draw_particles(surface: &mut dyn DrawingSurface, field: &ParticleField) {
    for p in field.particles() {
        let alpha = ParticleField::alpha(p);
        surface.fill_circle(
            p.pos,
            p.size,
            &Paint::Solid(Color::rgba(0.8, 0.85, 1.0, alpha)),
        );
    }
}

/// Corners of a card centered on the item, rotated and scaled
pub fn card_corners(item: &AnimatedItem, body_radius: f32) -> [Vec2; 4] {
    let h = body_radius * CARD_HALF_EXTENT * item.scale;
    let rot = Mat2::from_angle(item.rotation);
    [
        Vec2::new(-h, -h),
        Vec2::new(h, -h),
        Vec2::new(h, h),
        Vec2::new(-h, h),
    ]
    .map(|corner| item.position + rot * corner)
}

fn draw_body(surface: &mut dyn DrawingSurface, item: &AnimatedItem, body_radius: f32) {
    if item.body_alpha <= 0.0 {
        return;
    }
    let base = category_color(item.item.category);
    let corners = card_corners(item, body_radius);
    surface.fill_polygon(
        &corners,
        &Paint::Linear {
            start: corners[0],
            end: corners[2],
            from: base.toward_white(0.25).fade(item.body_alpha),
            to: base.mix(Color::BLACK, 0.3).fade(item.body_alpha),
        },
    );
    surface.stroke_polyline(
        &corners,
        true,
        1.5,
        Color::WHITE.with_alpha(0.6 * item.body_alpha),
    );
}

fn draw_label(
    surface: &mut dyn DrawingSurface,
    item: &mut AnimatedItem,
    layout: &LabelLayout,
    provider: &dyn LabelStyleProvider,
    hovered: bool,
) {
    if item.label_alpha <= 0.0 {
        return;
    }
    let text = item.item.label_text();
    if item.label_size.is_none() {
        let measured = layout.padded(surface.measure_text(&text, layout.font_px));
        item.measure_label(measured);
    }
    let Some(rect) = item.label_rect() else {
        return;
    };

    let style = resolve_label_style(provider, &item.item, hovered);
    let alpha = item.label_alpha;
    surface.fill_rect(rect, &Paint::Solid(style.background.fade(alpha)));
    surface.stroke_polyline(&rect.corners(), true, style.border_width, style.border.fade(alpha));
    surface.draw_text(&text, rect.center(), layout.font_px, style.text.fade(alpha));
}

fn draw_border_glow(surface: &mut dyn DrawingSurface, canvas: Rect, time_ms: f32) {
    let pulse = 0.5 + 0.5 * (time_ms * GLOW_SPEED).sin();
    let color = Color::rgba(0.45, 0.6, 1.0, 1.0);
    for (i, width) in [10.0_f32, 5.0, 2.0].into_iter().enumerate() {
        let alpha = (0.12 + 0.1 * i as f32) * (0.6 + 0.4 * pulse);
        let inset = canvas.expand(-width / 2.0);
        surface.stroke_polyline(&inset.corners(), true, width, color.with_alpha(alpha));
    }
}

/// Newest item whose label contains `(x, y)`
///
/// Skips invisible and never-measured labels. Non-finite coordinates match nothing.
pub fn hit_test_label(items: &[AnimatedItem], x: f32, y: f32) -> Option<&AnimatedItem> {
    if !(x.is_finite() && y.is_finite()) {
        return None;
    }
    let p = Vec2::new(x, y);
    items.iter().rev().find(|item| {
        item.label_alpha > 0.0 && item.label_rect().is_some_and(|rect| rect.contains(p))
    })
}
