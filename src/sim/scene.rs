//! Scene controller
//!
//! Owns the live items and everything a frame needs. Hosts drive it with
//! `update` then `render` once per display frame and spawn between frames.
//! Every mutating method takes `&mut self`, so a spawn can never run inside an
//! update or render pass.

use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ambient::ParticleField;
use super::boundary::{Boundary, CoverageSampler, Region};
use super::placement::{BodySearch, LabelLayout, find_body_position, place_label_for, reposition_nearby};
use super::pool::{Item, WeightedPool};
use super::state::{AnimatedItem, BeamConfig, BeamTable, ItemHandle};
use super::tick::update_items;
use crate::diagnostics::{DiagnosticSink, OnceLog};
use crate::error::Result;
use crate::renderer::beam::resolve_beam;
use crate::renderer::pipeline::{Backdrop, FrameView, Toggles, hit_test_label, render_frame};
use crate::renderer::style::{DefaultLabelStyle, LabelStyleProvider};
use crate::renderer::surface::DrawingSurface;
use crate::settings::SceneSettings;

/// Initial toss applied to a new item (px and radians per reference frame)
const TOSS_SPEED_X: f32 = 3.0;
const TOSS_SPEED_Y: f32 = 2.0;
const TOSS_SPIN: f32 = 0.2;
const TOSS_TILT: f32 = 0.6;

pub struct SceneController {
    canvas: Vec2,
    settings: SceneSettings,
    /// Insertion order; newest last
    items: Vec<AnimatedItem>,
    boundary: Arc<Boundary>,
    region: Option<Arc<dyn Region>>,
    mask: Option<Arc<dyn CoverageSampler>>,
    toggles: Toggles,
    hovered: Option<ItemHandle>,
    rng: Pcg32,
    next_id: u32,
    clock_ms: f32,
    particles: ParticleField,
    backdrop: Backdrop,
    style: Box<dyn LabelStyleProvider>,
    diagnostics: Box<dyn DiagnosticSink>,
}

impl SceneController {
    pub fn new(canvas: Vec2, settings: SceneSettings, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let particles = ParticleField::new(settings.quality.ambient_particles(), canvas, &mut rng);
        log::info!(
            "Scene created: {}x{} canvas, cap {}, seed {}",
            canvas.x,
            canvas.y,
            settings.item_cap(),
            seed
        );
        Self {
            canvas,
            settings,
            items: Vec::new(),
            boundary: Arc::new(Boundary::fallback(canvas)),
            region: None,
            mask: None,
            toggles: Toggles::default(),
            hovered: None,
            rng,
            next_id: 1,
            clock_ms: 0.0,
            particles,
            backdrop: Backdrop::default(),
            style: Box::new(DefaultLabelStyle),
            diagnostics: Box::new(OnceLog::new()),
        }
    }

    /// Replace the diagnostic sink (defaults to a one-shot logger)
    pub fn set_diagnostics(&mut self, sink: Box<dyn DiagnosticSink>) {
        self.diagnostics = sink;
    }

    pub fn set_style_provider(&mut self, provider: Box<dyn LabelStyleProvider>) {
        self.style = provider;
    }

    pub fn set_backdrop(&mut self, backdrop: Backdrop) {
        self.backdrop = backdrop;
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Supply the boundary sources; `None` for both selects the fallback rectangle
    pub fn set_boundary_source(
        &mut self,
        region: Option<Arc<dyn Region>>,
        mask: Option<Arc<dyn CoverageSampler>>,
    ) {
        self.region = region;
        self.mask = mask;
        self.resolve_boundary();
    }

    fn resolve_boundary(&mut self) {
        let boundary = Boundary::resolve(
            self.canvas,
            self.region.clone(),
            self.mask.clone(),
            self.diagnostics.as_mut(),
        );
        log::info!("Boundary resolved from {:?}", boundary.source());
        self.boundary = Arc::new(boundary);
    }

    /// Snapshot of the active boundary
    pub fn boundary(&self) -> Arc<Boundary> {
        Arc::clone(&self.boundary)
    }

    /// Insert a new item
    ///
    /// An explicit position is used only if it is inside the boundary; otherwise the
    /// placement search picks one. At capacity the oldest items make room; if no
    /// position is found they stay and the scene is left unchanged.
    pub fn spawn(
        &mut self,
        item: Item,
        explicit_position: Option<Vec2>,
        beam: &BeamConfig,
    ) -> Result<ItemHandle> {
        let evicted = self.evict_for_insert();

        let boundary = Arc::clone(&self.boundary);
        let position = match explicit_position.filter(|p| boundary.contains(*p)) {
            Some(p) => p,
            None => {
                if let Some(p) = explicit_position {
                    log::debug!("Spawn position {:?} is outside the boundary, searching", p);
                }
                let search = BodySearch::from(&self.settings);
                match find_body_position(&boundary, &self.items, &search, &mut self.rng) {
                    Ok(p) => p,
                    Err(e) => {
                        // Nothing is inserted, so nothing is evicted
                        self.restore_evicted(evicted);
                        return Err(e);
                    }
                }
            }
        };
        for (_, gone) in &evicted {
            if self.hovered == Some(gone.id) {
                self.hovered = None;
            }
            log::debug!("Evicted {:?} at age {:.0} ms", gone.id, gone.age_ms);
        }

        let id = self.next_item_id();
        let mut animated = AnimatedItem::new(id, item, position);
        animated.velocity = Vec2::new(
            (self.rng.random::<f32>() - 0.5) * TOSS_SPEED_X,
            -self.rng.random::<f32>() * TOSS_SPEED_Y,
        );
        animated.rotation = (self.rng.random::<f32>() - 0.5) * TOSS_TILT;
        animated.rotation_speed = (self.rng.random::<f32>() - 0.5) * TOSS_SPIN;
        animated.beam = resolve_beam(beam, self.diagnostics.as_mut());

        log::debug!(
            "Spawned {:?} '{}' ({}) at {:?}",
            id,
            animated.item.name,
            animated.item.category.as_str(),
            position
        );
        self.items.push(animated);

        let index = self.items.len() - 1;
        let layout = LabelLayout::from(&self.settings);
        let offset = place_label_for(&self.items, index, &layout);
        self.items[index].label_offset = offset;
        self.items[index].label_target_offset = offset;
        let moved = reposition_nearby(&mut self.items, index, &layout);
        if moved > 0 {
            log::debug!("Moved {} nearby labels for {:?}", moved, id);
        }

        Ok(id)
    }

    /// Sample an item from `pool` and spawn it with its category's beam
    pub fn spawn_from_pool(&mut self, pool: &WeightedPool, beams: &BeamTable) -> Result<ItemHandle> {
        let item = pool.sample(&mut self.rng)?.clone();
        let beam = beams.for_category(item.category).clone();
        self.spawn(item, None, &beam)
    }

    fn next_item_id(&mut self) -> ItemHandle {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        ItemHandle(id)
    }

    /// Take out the oldest items until one more fits (ties go to the lowest handle)
    ///
    /// Returns them with their indices at removal time so a failed spawn can put
    /// them back with `restore_evicted`.
    fn evict_for_insert(&mut self) -> Vec<(usize, AnimatedItem)> {
        let cap = self.settings.item_cap();
        let mut evicted = Vec::new();
        while self.items.len() >= cap {
            let Some(oldest) = self
                .items
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.age_ms.total_cmp(&b.age_ms).then(b.id.cmp(&a.id)))
                .map(|(i, _)| i)
            else {
                break;
            };
            evicted.push((oldest, self.items.remove(oldest)));
        }
        evicted
    }

    fn restore_evicted(&mut self, evicted: Vec<(usize, AnimatedItem)>) {
        for (index, item) in evicted.into_iter().rev() {
            self.items.insert(index, item);
        }
    }

    /// Advance the scene by `elapsed_ms`
    pub fn update(&mut self, elapsed_ms: f32) {
        if !(elapsed_ms.is_finite() && elapsed_ms > 0.0) {
            return;
        }
        self.clock_ms += elapsed_ms;

        let retired = update_items(&mut self.items, &self.boundary, &self.settings, elapsed_ms);
        if let Some(hovered) = self.hovered
            && retired.contains(&hovered)
        {
            self.hovered = None;
        }
        if !retired.is_empty() {
            log::debug!("Retired {} items", retired.len());
        }

        if self.toggles.particles {
            self.particles.update(self.canvas, elapsed_ms);
        }
    }

    /// Draw the current frame
    pub fn render(&mut self, surface: &mut dyn DrawingSurface) {
        let frame = FrameView {
            boundary: &self.boundary,
            particles: &self.particles,
            toggles: self.toggles,
            hovered: self.hovered,
            backdrop: &self.backdrop,
            settings: &self.settings,
            style: self.style.as_ref(),
            time_ms: self.clock_ms,
        };
        render_frame(surface, &mut self.items, &frame);
    }

    pub fn set_hovered(&mut self, handle: Option<ItemHandle>) {
        self.hovered = handle.filter(|h| self.items.iter().any(|it| it.id == *h));
    }

    pub fn hovered(&self) -> Option<ItemHandle> {
        self.hovered
    }

    /// Hover whatever label is under `(x, y)`
    pub fn set_hovered_at(&mut self, x: f32, y: f32) -> Option<ItemHandle> {
        self.hovered = self.hit_test_label(x, y).map(|it| it.id);
        self.hovered
    }

    pub fn hit_test_label(&self, x: f32, y: f32) -> Option<&AnimatedItem> {
        hit_test_label(&self.items, x, y)
    }

    /// Set an ambient toggle; unknown names are ignored and reported
    pub fn set_toggle(&mut self, name: &str, enabled: bool) {
        if !self.toggles.set(name, enabled) {
            self.diagnostics
                .report("toggle.unknown", &format!("Unknown ambient toggle '{}'", name));
        }
    }

    /// Flip an ambient toggle; returns the new state
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let flipped = self.toggles.flip(name);
        if flipped.is_none() {
            self.diagnostics
                .report("toggle.unknown", &format!("Unknown ambient toggle '{}'", name));
        }
        flipped
    }

    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    /// Remove every item
    pub fn clear(&mut self) {
        log::info!("Cleared {} items", self.items.len());
        self.items.clear();
        self.hovered = None;
    }

    /// Canvas changed size; boundary sources are re-resolved against it
    pub fn resize(&mut self, canvas: Vec2) {
        if canvas == self.canvas {
            return;
        }
        self.canvas = canvas;
        self.resolve_boundary();
        self.particles = ParticleField::new(
            self.settings.quality.ambient_particles(),
            canvas,
            &mut self.rng,
        );
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    /// Milliseconds simulated so far
    pub fn clock_ms(&self) -> f32 {
        self.clock_ms
    }

    pub fn items(&self) -> &[AnimatedItem] {
        &self.items
    }

    pub fn get(&self, handle: ItemHandle) -> Option<&AnimatedItem> {
        self.items.iter().find(|it| it.id == handle)
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DropError;
    use crate::renderer::record::RecordingSurface;
    use crate::sim::boundary::{MaskBuffer, Rect, ZoneRegion};
    use crate::sim::pool::Category;
    use crate::sim::state::Rgb;
    use std::cell::RefCell;
    use std::rc::Rc;

    const CANVAS: Vec2 = Vec2::new(800.0, 600.0);

    #[derive(Default, Clone)]
    struct SharedSink(Rc<RefCell<Vec<String>>>);

    impl DiagnosticSink for SharedSink {
        fn report(&mut self, key: &str, _message: &str) {
            self.0.borrow_mut().push(key.to_string());
        }
    }

    fn scene() -> SceneController {
        SceneController::new(CANVAS, SceneSettings::default(), 42)
    }

    fn gem(name: &str) -> Item {
        Item::new(name, 1.0, 25.0, Category::Rare)
    }

    #[test]
    fn test_spawn_lands_inside_boundary() {
        let mut s = scene();
        let pool = WeightedPool::load(vec![gem("Only")]).expect("pool");
        let id = s.spawn_from_pool(&pool, &BeamTable::default()).expect("spawned");
        let item = s.get(id).expect("live");
        assert_eq!(item.item.name, "Only");
        assert!(s.boundary().contains(item.position));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_explicit_position_only_if_inside() {
        let mut s = scene();
        let inside = Vec2::new(400.0, 300.0);
        let id = s.spawn(gem("A"), Some(inside), &BeamConfig::off()).expect("spawned");
        assert_eq!(s.get(id).map(|it| it.position), Some(inside));

        let outside = Vec2::new(5.0, 5.0);
        let id = s.spawn(gem("B"), Some(outside), &BeamConfig::off()).expect("spawned");
        let pos = s.get(id).map(|it| it.position).expect("live");
        assert_ne!(pos, outside);
        assert!(s.boundary().contains(pos));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let settings = SceneSettings {
            max_items: 3,
            ..SceneSettings::default()
        };
        let mut s = SceneController::new(CANVAS, settings, 7);
        let mut handles = Vec::new();
        for i in 0..3 {
            handles.push(s.spawn(gem(&format!("g{}", i)), None, &BeamConfig::off()).expect("spawned"));
            s.update(100.0);
        }
        s.set_hovered(Some(handles[0]));
        let newest = s.spawn(gem("g3"), None, &BeamConfig::off()).expect("spawned");

        assert_eq!(s.len(), 3);
        assert!(s.get(handles[0]).is_none());
        assert!(s.get(handles[1]).is_some());
        assert!(s.get(newest).is_some());
        assert_eq!(s.hovered(), None);
    }

    #[test]
    fn test_eviction_tie_goes_to_lowest_handle() {
        let settings = SceneSettings {
            max_items: 2,
            ..SceneSettings::default()
        };
        let mut s = SceneController::new(CANVAS, settings, 7);
        let a = s.spawn(gem("a"), None, &BeamConfig::off()).expect("spawned");
        let b = s.spawn(gem("b"), None, &BeamConfig::off()).expect("spawned");
        s.spawn(gem("c"), None, &BeamConfig::off()).expect("spawned");
        assert!(s.get(a).is_none());
        assert!(s.get(b).is_some());
    }

    #[test]
    fn test_failed_spawn_at_capacity_keeps_items() {
        let settings = SceneSettings {
            max_items: 3,
            body_radius: 25.0,
            ..SceneSettings::default()
        };
        let mut s = SceneController::new(Vec2::new(200.0, 200.0), settings, 9);
        let zone: Arc<dyn Region> = Arc::new(ZoneRegion::single(Rect::new(0.0, 0.0, 60.0, 60.0)));
        s.set_boundary_source(Some(zone), None);

        let center = Vec2::new(30.0, 30.0);
        let handles: Vec<ItemHandle> = (0..3)
            .map(|i| s.spawn(gem(&format!("g{}", i)), Some(center), &BeamConfig::off()).expect("spawned"))
            .collect();
        s.set_hovered(Some(handles[0]));

        let err = s.spawn(gem("crowded"), None, &BeamConfig::off()).expect_err("no room");
        assert!(matches!(err, DropError::NoValidPosition { .. }));
        assert_eq!(s.len(), 3);
        let order: Vec<ItemHandle> = s.items().iter().map(|it| it.id).collect();
        assert_eq!(order, handles);
        assert_eq!(s.hovered(), Some(handles[0]));
    }

    #[test]
    fn test_empty_pool_surfaces_error() {
        let mut s = scene();
        let err = s
            .spawn_from_pool(&WeightedPool::default(), &BeamTable::default())
            .unwrap_err();
        assert!(matches!(err, DropError::EmptyPool));
        assert!(s.is_empty());
    }

    #[test]
    fn test_beam_copied_at_spawn() {
        let mut s = scene();
        let mut table = BeamTable::default();
        table.set(Category::Legendary, BeamConfig::colored("#ff0000"));
        let pool = WeightedPool::load(vec![Item::new("Crown", 1.0, 9000.0, Category::Legendary)])
            .expect("pool");
        let id = s.spawn_from_pool(&pool, &table).expect("spawned");

        // Later table changes do not reach the live item
        table.set(Category::Legendary, BeamConfig::off());
        let beam = s.get(id).map(|it| it.beam).expect("live");
        assert!(beam.enabled);
        assert_eq!(beam.color, Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn test_unknown_toggle_is_reported() {
        let mut s = scene();
        let sink = SharedSink::default();
        s.set_diagnostics(Box::new(sink.clone()));
        s.set_toggle("confetti", true);
        assert_eq!(s.toggle("confetti"), None);
        s.set_toggle("border_glow", true);
        assert!(s.toggles().border_glow);
        assert_eq!(*sink.0.borrow(), vec!["toggle.unknown", "toggle.unknown"]);
    }

    #[test]
    fn test_render_measures_and_hit_tests() {
        let mut s = scene();
        let id = s.spawn(gem("Target"), Some(Vec2::new(400.0, 300.0)), &BeamConfig::off()).expect("spawned");
        assert!(s.hit_test_label(400.0, 300.0).is_none());

        let mut surface = RecordingSurface::new(CANVAS);
        s.render(&mut surface);
        let rect = s.get(id).and_then(|it| it.label_rect()).expect("measured");
        let c = rect.center();
        assert_eq!(s.set_hovered_at(c.x, c.y), Some(id));
        assert_eq!(s.set_hovered_at(f32::NAN, c.y), None);
    }

    #[test]
    fn test_region_and_mask_priority() {
        let mut s = scene();
        let sink = SharedSink::default();
        s.set_diagnostics(Box::new(sink.clone()));

        let mask: Arc<dyn CoverageSampler> =
            Arc::new(MaskBuffer::from_fn(80, 60, |x, _| x < 40).expect("mask"));
        let bad_region: Arc<dyn Region> =
            Arc::new(ZoneRegion::single(Rect::new(-500.0, 0.0, 100.0, 100.0)));
        s.set_boundary_source(Some(bad_region), Some(mask));
        assert_eq!(s.boundary().source(), crate::sim::BoundarySource::Mask);
        assert_eq!(*sink.0.borrow(), vec!["boundary.region"]);

        s.set_boundary_source(None, None);
        assert_eq!(s.boundary().source(), crate::sim::BoundarySource::Fallback);
    }

    #[test]
    fn test_resize_re_resolves_boundary() {
        let mut s = scene();
        let region: Arc<dyn Region> = Arc::new(ZoneRegion::single(Rect::new(500.0, 100.0, 200.0, 200.0)));
        s.set_boundary_source(Some(region), None);
        assert_eq!(s.boundary().source(), crate::sim::BoundarySource::Region);

        // The region no longer fits the smaller canvas
        s.resize(Vec2::new(400.0, 300.0));
        assert_eq!(s.boundary().canvas(), Vec2::new(400.0, 300.0));
        assert_eq!(s.boundary().source(), crate::sim::BoundarySource::Fallback);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let run = || {
            let mut s = scene();
            let pool = WeightedPool::load(vec![gem("a"), gem("b"), gem("c")]).expect("pool");
            for _ in 0..20 {
                s.spawn_from_pool(&pool, &BeamTable::default()).expect("spawned");
                s.update(16.0);
            }
            s.items()
                .iter()
                .map(|it| (it.item.name.clone(), it.position))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_clear_and_retirement_drop_hover() {
        let mut s = scene();
        let id = s.spawn(gem("x"), None, &BeamConfig::off()).expect("spawned");
        s.set_hovered(Some(id));
        assert_eq!(s.hovered(), Some(id));
        s.update(35_000.0);
        assert!(s.is_empty());
        assert_eq!(s.hovered(), None);

        s.spawn(gem("y"), None, &BeamConfig::off()).expect("spawned");
        s.clear();
        assert!(s.is_empty());
        s.set_hovered(Some(ItemHandle(999)));
        assert_eq!(s.hovered(), None);
    }
}
