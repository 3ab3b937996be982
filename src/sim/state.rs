//! Runtime entity types
//!
//! One `AnimatedItem` per visible drop. Mutated by the physics step every frame
//! and by label repositioning when other items land nearby.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boundary::{Boundary, Rect};
use super::pool::{Category, Item};
use crate::consts::ENTRANCE_SCALE;
use crate::settings::SceneSettings;

/// Stable handle to a live item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemHandle(pub u32);

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Per-category beam configuration, as supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamConfig {
    pub enabled: bool,
    /// Hex color (`#rgb` or `#rrggbb`)
    pub color: Option<String>,
}

impl BeamConfig {
    pub fn off() -> Self {
        Self::default()
    }

    pub fn colored(hex: impl Into<String>) -> Self {
        Self {
            enabled: true,
            color: Some(hex.into()),
        }
    }
}

/// Beam configuration for every category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeamTable(pub [BeamConfig; 4]);

impl BeamTable {
    pub fn for_category(&self, category: Category) -> &BeamConfig {
        &self.0[category.rank()]
    }

    pub fn set(&mut self, category: Category, config: BeamConfig) {
        self.0[category.rank()] = config;
    }
}

/// Beam state copied into the item at spawn
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BeamState {
    pub enabled: bool,
    pub color: Option<Rgb>,
    pub age_ms: f32,
}

impl BeamState {
    /// Only drawn when enabled and colored
    pub fn is_visible(&self) -> bool {
        self.enabled && self.color.is_some()
    }
}

/// Ambient background mote (cosmetic only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per reference frame
    pub vel: Vec2,
    pub size: f32,
    /// Twinkle phase (radians)
    pub phase: f32,
}

/// Lifecycle phase, derived from continuous state each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Outside the region, pulled back in by gravity
    Arriving,
    /// Inside, still moving
    Settling,
    /// Inside and at rest
    Resting,
    /// Body fading out
    FadingBody,
    /// Body gone, label fading out
    FadingLabel,
    /// Nothing left to draw
    Expired,
}

/// A visible drop
#[derive(Debug, Clone)]
pub struct AnimatedItem {
    pub id: ItemHandle,
    pub item: Item,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians
    pub rotation: f32,
    /// Radians per reference frame
    pub rotation_speed: f32,
    pub scale: f32,
    pub body_alpha: f32,
    /// Milliseconds since spawn
    pub age_ms: f32,
    /// Label center relative to the body center
    pub label_offset: Vec2,
    pub label_target_offset: Vec2,
    /// Measured once, on first draw
    pub label_size: Option<Vec2>,
    pub label_alpha: f32,
    pub beam: BeamState,
    /// Inside point an arriving item steers toward; dropped once inside
    pub arrival_target: Option<Vec2>,
}

impl AnimatedItem {
    pub fn new(id: ItemHandle, item: Item, position: Vec2) -> Self {
        Self {
            id,
            item,
            position,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            rotation_speed: 0.0,
            scale: ENTRANCE_SCALE,
            body_alpha: 1.0,
            age_ms: 0.0,
            label_offset: Vec2::ZERO,
            label_target_offset: Vec2::ZERO,
            label_size: None,
            label_alpha: 1.0,
            beam: BeamState::default(),
            arrival_target: None,
        }
    }

    /// Whether both velocity components are below epsilon
    pub fn is_slow(&self, epsilon: f32) -> bool {
        self.velocity.x.abs() < epsilon && self.velocity.y.abs() < epsilon
    }

    /// Current label rectangle (uses `fallback_size` until measured)
    pub fn label_rect_with(&self, fallback_size: Vec2) -> Rect {
        let size = self.label_size.unwrap_or(fallback_size);
        Rect::from_center(self.position + self.label_offset, size)
    }

    /// Label rectangle for hit-testing; None until measured
    pub fn label_rect(&self) -> Option<Rect> {
        self.label_size
            .map(|size| Rect::from_center(self.position + self.label_offset, size))
    }

    /// Record the measured label size; later calls are ignored
    pub fn measure_label(&mut self, size: Vec2) -> Vec2 {
        *self.label_size.get_or_insert(size)
    }

    pub fn phase(&self, boundary: &Boundary, settings: &SceneSettings) -> Phase {
        let lifetime = &settings.lifetime;
        if self.body_alpha <= 0.0 && self.label_alpha <= 0.0 {
            Phase::Expired
        } else if self.body_alpha <= 0.0
            || self.age_ms > lifetime.body_fade_start_ms + lifetime.body_fade_duration_ms
        {
            Phase::FadingLabel
        } else if self.age_ms > lifetime.body_fade_start_ms {
            Phase::FadingBody
        } else if !boundary.contains(self.position) {
            Phase::Arriving
        } else if self.is_slow(settings.physics.settle_epsilon) {
            Phase::Resting
        } else {
            Phase::Settling
        }
    }
}
