//! Simulation module
//!
//! Selection, containment, placement, physics and the scene controller.
//! Randomness comes only from the seeded RNG the scene owns, so a run with the
//! same seed and the same calls replays identically.

pub mod ambient;
pub mod boundary;
pub mod placement;
pub mod pool;
pub mod scene;
pub mod state;
pub mod tick;

pub use boundary::{
    Boundary, BoundarySource, Coverage, CoverageSampler, MaskBuffer, MaskRegion, PolygonRegion,
    Rect, Region, ZoneRegion,
};
pub use placement::{BodySearch, LabelLayout, find_body_position, place_label, reposition_nearby};
pub use pool::{Category, Item, WeightedPool};
pub use scene::SceneController;
pub use state::{AnimatedItem, BeamConfig, BeamTable, ItemHandle, Phase, Rgb};
pub use tick::update_items;
