//! Scene settings and tunables
//!
//! Loaded by the host (usually from JSON) and handed to the scene at construction.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{DropError, Result};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Maximum visible items for this preset
    pub fn max_items(&self) -> usize {
        match self {
            QualityPreset::Low => 60,
            QualityPreset::Medium => 100,
            QualityPreset::High => MAX_VISIBLE_ITEMS,
        }
    }

    /// Ambient particle count
    pub fn ambient_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 0,
            QualityPreset::Medium => 48,
            QualityPreset::High => 120,
        }
    }
}

impl FromStr for QualityPreset {
    type Err = DropError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            _ => Err(DropError::UnknownPreset(s.to_string())),
        }
    }
}

/// When an item leaves the live collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RetirementPolicy {
    /// Retire at the hard age ceiling or once the body is fully transparent
    #[default]
    BodyFaded,
    /// Keep the item until its label has faded out as well
    LabelFaded,
}

/// Physics tunables, expressed per reference frame (see `REFERENCE_FRAME_MS`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Acceleration applied while outside the region (px / frame²)
    pub gravity: f32,
    /// Speed cap while arriving (px / frame)
    pub max_fall_speed: f32,
    /// Velocity multiplier while settling inside the region
    pub friction: f32,
    pub air_resistance: f32,
    /// Below this speed on both axes an item is settled
    pub settle_epsilon: f32,
    /// Velocity retained (and inverted) when an axis move would leave the region
    pub bounce_damping: f32,
    /// Rotation speed multiplier once settled
    pub rotation_decay: f32,
    /// Fraction of the remaining label distance covered per frame
    pub label_lerp: f32,
    /// Label snaps to its target within this distance (px)
    pub label_snap: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            max_fall_speed: 15.0,
            friction: 0.92,
            air_resistance: 0.98,
            settle_epsilon: 0.1,
            bounce_damping: 0.5,
            rotation_decay: 0.9,
            label_lerp: 0.15,
            label_snap: 0.5,
        }
    }
}

/// Lifetime tunables (milliseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimeSettings {
    pub body_fade_start_ms: f32,
    pub body_fade_duration_ms: f32,
    pub label_fade_start_ms: f32,
    pub label_fade_duration_ms: f32,
    pub retire_after_ms: f32,
    pub retirement: RetirementPolicy,
}

impl Default for LifetimeSettings {
    fn default() -> Self {
        Self {
            body_fade_start_ms: BODY_FADE_START_MS,
            body_fade_duration_ms: BODY_FADE_DURATION_MS,
            label_fade_start_ms: LABEL_FADE_START_MS,
            label_fade_duration_ms: LABEL_FADE_DURATION_MS,
            retire_after_ms: RETIRE_AFTER_MS,
            retirement: RetirementPolicy::BodyFaded,
        }
    }
}

/// Beam pulse parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSettings {
    pub pulse_min: f32,
    pub pulse_max: f32,
    /// Radians per millisecond
    pub pulse_speed: f32,
    /// Cone height as a fraction of canvas height
    pub height_fraction: f32,
}

impl Default for BeamSettings {
    fn default() -> Self {
        Self {
            pulse_min: 0.35,
            pulse_max: 0.85,
            pulse_speed: 0.003,
            height_fraction: 0.35,
        }
    }
}

/// Complete scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Maximum visible items (eviction cap)
    pub max_items: usize,
    /// Card body radius used for spacing (px)
    pub body_radius: f32,
    /// Gap between body and label (px)
    pub label_gap: f32,
    /// Labels closer than this (top-left corner to corner) get repositioned (px)
    pub label_proximity: f32,
    /// Label text size (px)
    pub label_font_px: f32,
    /// Label padding around the text (px)
    pub label_padding: f32,
    /// Placement attempt budgets
    pub placement_attempts: u32,
    pub relaxed_attempts: u32,
    /// Edge probe distance (px)
    pub edge_probe: f32,
    pub physics: PhysicsSettings,
    pub lifetime: LifetimeSettings,
    pub beam: BeamSettings,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            max_items: MAX_VISIBLE_ITEMS,
            body_radius: BODY_RADIUS,
            label_gap: 6.0,
            label_proximity: 120.0,
            label_font_px: 13.0,
            label_padding: 5.0,
            placement_attempts: 500,
            relaxed_attempts: 200,
            edge_probe: 10.0,
            physics: PhysicsSettings::default(),
            lifetime: LifetimeSettings::default(),
            beam: BeamSettings::default(),
        }
    }
}

impl SceneSettings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.max_items = preset.max_items();
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        log::info!(
            "Loaded scene settings (quality {}, max {} items)",
            settings.quality.as_str(),
            settings.max_items
        );
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Effective item cap (never zero)
    pub fn item_cap(&self) -> usize {
        self.max_items.max(1)
    }
}
