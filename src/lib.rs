//! Dropfield - a 2D presentation engine for weighted "card drop" events
//!
//! Core modules:
//! - `sim`: Weighted sampling, containment zones, placement search, settling physics
//! - `renderer`: Fixed-order compositor, beam effect, vertex batching and WebGPU presentation
//! - `settings`: Data-driven tunables (physics, timings, capacity)
//! - `diagnostics`: Host-owned warning sink
//! - `error`: Error taxonomy

pub mod diagnostics;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{DropError, Result};
pub use settings::{QualityPreset, RetirementPolicy, SceneSettings};
pub use sim::{
    AnimatedItem, Boundary, Category, Item, ItemHandle, SceneController, WeightedPool,
};

/// Engine configuration constants
pub mod consts {
    /// Reference frame duration (ms). Damping factors are expressed per reference frame.
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest physics substep (ms)
    pub const MAX_STEP_MS: f32 = 50.0;
    /// Maximum physics substeps per update to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Maximum number of concurrently visible items
    pub const MAX_VISIBLE_ITEMS: usize = 150;
    /// Default card body radius (px)
    pub const BODY_RADIUS: f32 = 22.0;

    /// Body fade begins at this age (ms)
    pub const BODY_FADE_START_MS: f32 = 30_000.0;
    pub const BODY_FADE_DURATION_MS: f32 = 5_000.0;
    /// Label fade begins later so labels outlive bodies
    pub const LABEL_FADE_START_MS: f32 = 40_000.0;
    pub const LABEL_FADE_DURATION_MS: f32 = 10_000.0;
    /// Hard age ceiling (ms)
    pub const RETIRE_AFTER_MS: f32 = 35_000.0;

    /// Entrance "pop" animation
    pub const ENTRANCE_SCALE: f32 = 0.35;
    pub const ENTRANCE_MS: f32 = 350.0;

    /// Default fallback boundary covers this fraction of the canvas per axis
    pub const FALLBACK_REGION_FRACTION: f32 = 0.8;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Ease-out cubic on [0, 1]
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Linear fade from 1 to 0 starting at `start`, reaching 0 at `start + duration`
#[inline]
pub fn linear_fade(age: f32, start: f32, duration: f32) -> f32 {
    if age <= start {
        1.0
    } else if duration <= 0.0 || age >= start + duration {
        0.0
    } else {
        1.0 - (age - start) / duration
    }
}
