//! Placement search for card bodies and their labels
//!
//! Both searches are bounded and degrade gracefully: bodies relax the edge
//! requirement before giving up, labels fall back to the first candidate and
//! accept overlap.

use glam::Vec2;
use rand::{Rng, RngCore};

use super::boundary::{Boundary, Rect};
use super::pool::Item;
use super::state::AnimatedItem;
use crate::error::{DropError, Result};
use crate::settings::SceneSettings;

/// Horizontal advance per character, as a fraction of the font size
pub const GLYPH_ADVANCE: f32 = 0.6;
/// Line height as a fraction of the font size
pub const LINE_HEIGHT: f32 = 1.25;

/// Fixed-advance text extent, used wherever real font metrics are unavailable
pub fn text_extent(text: &str, font_px: f32) -> Vec2 {
    let chars = text.chars().count() as f32;
    Vec2::new(chars * font_px * GLYPH_ADVANCE, font_px * LINE_HEIGHT)
}

/// Body search parameters
#[derive(Debug, Clone, Copy)]
pub struct BodySearch {
    pub body_radius: f32,
    pub attempts: u32,
    pub relaxed_attempts: u32,
    pub edge_probe: f32,
}

impl From<&SceneSettings> for BodySearch {
    fn from(settings: &SceneSettings) -> Self {
        Self {
            body_radius: settings.body_radius,
            attempts: settings.placement_attempts,
            relaxed_attempts: settings.relaxed_attempts,
            edge_probe: settings.edge_probe,
        }
    }
}

/// Label layout parameters
#[derive(Debug, Clone, Copy)]
pub struct LabelLayout {
    pub body_radius: f32,
    pub gap: f32,
    pub proximity: f32,
    pub font_px: f32,
    pub padding: f32,
}

impl From<&SceneSettings> for LabelLayout {
    fn from(settings: &SceneSettings) -> Self {
        Self {
            body_radius: settings.body_radius,
            gap: settings.label_gap,
            proximity: settings.label_proximity,
            font_px: settings.label_font_px,
            padding: settings.label_padding,
        }
    }
}

impl LabelLayout {
    /// Size estimate for labels that have not been drawn yet
    pub fn estimate_size(&self, item: &Item) -> Vec2 {
        self.padded(text_extent(&item.label_text(), self.font_px))
    }

    /// Text extent plus padding on every side
    pub fn padded(&self, text: Vec2) -> Vec2 {
        text + Vec2::splat(self.padding * 2.0)
    }

    /// Measured size if known, estimate otherwise
    pub fn size_of(&self, item: &AnimatedItem) -> Vec2 {
        item.label_size
            .unwrap_or_else(|| self.estimate_size(&item.item))
    }

    /// Candidate label centers relative to the body center, in preference order:
    /// above, further above, right, left, below, above-right, above-left
    pub fn candidates(&self, size: Vec2) -> [Vec2; 7] {
        let r = self.body_radius;
        let g = self.gap;
        let (hw, hh) = (size.x / 2.0, size.y / 2.0);
        let diag = r * 0.7;
        [
            Vec2::new(0.0, -(r + g + hh)),
            Vec2::new(0.0, -(r + g * 2.0 + size.y + hh)),
            Vec2::new(r + g + hw, 0.0),
            Vec2::new(-(r + g + hw), 0.0),
            Vec2::new(0.0, r + g + hh),
            Vec2::new(diag + g + hw, -(diag + g + hh)),
            Vec2::new(-(diag + g + hw), -(diag + g + hh)),
        ]
    }
}

/// Find a spot for a new body
///
/// Candidates come from the region's own generator when it has one, otherwise
/// from uniform canvas sampling. Never returns a point outside the boundary.
pub fn find_body_position(
    boundary: &Boundary,
    occupied: &[AnimatedItem],
    search: &BodySearch,
    rng: &mut dyn RngCore,
) -> Result<Vec2> {
    let min_dist = search.body_radius * 2.0;
    let clear_of_others = |p: Vec2| {
        occupied
            .iter()
            .all(|other| other.position.distance(p) >= min_dist)
    };
    let probe_ok = |p: Vec2| boundary.contains(p) || !boundary.on_canvas(p);
    let away_from_edge = |p: Vec2| {
        let up = p - Vec2::new(0.0, search.edge_probe);
        let down = p + Vec2::new(0.0, search.edge_probe);
        probe_ok(up) && probe_ok(down)
    };

    for _ in 0..search.attempts {
        let p = candidate(boundary, rng);
        if boundary.contains(p) && clear_of_others(p) && away_from_edge(p) {
            return Ok(p);
        }
    }

    for _ in 0..search.relaxed_attempts {
        let p = candidate(boundary, rng);
        if boundary.contains(p) && clear_of_others(p) {
            log::debug!("Placed body at {:?} after relaxing the edge rule", p);
            return Ok(p);
        }
    }

    Err(DropError::NoValidPosition {
        attempts: search.attempts + search.relaxed_attempts,
    })
}

fn candidate(boundary: &Boundary, rng: &mut dyn RngCore) -> Vec2 {
    boundary.random_point(rng).unwrap_or_else(|| {
        let canvas = boundary.canvas();
        Vec2::new(
            rng.random::<f32>() * canvas.x,
            rng.random::<f32>() * canvas.y,
        )
    })
}

/// First candidate offset whose rectangle overlaps none of `obstacles`,
/// or the first candidate when every one overlaps something
pub fn place_label(position: Vec2, size: Vec2, obstacles: &[Rect], layout: &LabelLayout) -> Vec2 {
    let candidates = layout.candidates(size);
    candidates
        .iter()
        .copied()
        .find(|&offset| {
            let rect = Rect::from_center(position + offset, size);
            !obstacles.iter().any(|o| o.intersects(&rect))
        })
        .unwrap_or(candidates[0])
}

/// Current label rectangles of visible labels, indexed like `items`
pub fn label_rects(items: &[AnimatedItem], layout: &LabelLayout) -> Vec<Option<Rect>> {
    items
        .iter()
        .map(|it| {
            (it.label_alpha > 0.0).then(|| it.label_rect_with(layout.size_of(it)))
        })
        .collect()
}

/// Choose a label offset for `items[index]` against every other visible label
pub fn place_label_for(items: &[AnimatedItem], index: usize, layout: &LabelLayout) -> Vec2 {
    let rects = label_rects(items, layout);
    let obstacles: Vec<Rect> = obstacles_except(&rects, index);
    let subject = &items[index];
    place_label(subject.position, layout.size_of(subject), &obstacles, layout)
}

fn obstacles_except(rects: &[Option<Rect>], index: usize) -> Vec<Rect> {
    rects
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != index)
        .filter_map(|(_, r)| *r)
        .collect()
}

/// Re-target labels that overlap or crowd the label of `items[new_index]`
///
/// Results go to `label_target_offset` so the physics step can animate them.
/// Rectangles are taken from current offsets, which makes a second call with no
/// new arrivals produce the same targets. Returns how many targets changed.
pub fn reposition_nearby(items: &mut [AnimatedItem], new_index: usize, layout: &LabelLayout) -> usize {
    let rects = label_rects(items, layout);
    let Some(new_rect) = rects.get(new_index).copied().flatten() else {
        return 0;
    };

    let mut changed = 0;
    for i in 0..items.len() {
        if i == new_index {
            continue;
        }
        let Some(rect) = rects[i] else {
            continue;
        };
        let crowded = rect.intersects(&new_rect) || rect.corner_distance(&new_rect) <= layout.proximity;
        if !crowded {
            continue;
        }

        let obstacles = obstacles_except(&rects, i);
        let size = layout.size_of(&items[i]);
        let target = place_label(items[i].position, size, &obstacles, layout);
        if target != items[i].label_target_offset {
            changed += 1;
        }
        items[i].label_target_offset = target;
    }
    changed
}
