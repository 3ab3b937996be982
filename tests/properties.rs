//! Randomized invariants for sampling, containment, placement and the beam pulse

use std::sync::Arc;

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use dropfield::consts::REFERENCE_FRAME_MS;
use dropfield::diagnostics::VecSink;
use dropfield::renderer::pulse_opacity;
use dropfield::settings::BeamSettings;
use dropfield::sim::{
    AnimatedItem, BodySearch, Boundary, CoverageSampler, ItemHandle, LabelLayout, MaskBuffer,
    Phase, PolygonRegion, Rect, Region, ZoneRegion, find_body_position, reposition_nearby,
    update_items,
};
use dropfield::{Category, DropError, Item, SceneSettings, WeightedPool};

const CANVAS: Vec2 = Vec2::new(400.0, 300.0);

fn zone_boundary() -> Boundary {
    let region: Arc<dyn Region> = Arc::new(ZoneRegion::new(vec![
        Rect::new(20.0, 20.0, 160.0, 120.0),
        Rect::new(220.0, 120.0, 160.0, 160.0),
    ]));
    Boundary::resolve(CANVAS, Some(region), None, &mut VecSink::default())
}

fn triangle_boundary() -> Boundary {
    let region: Arc<dyn Region> = Arc::new(PolygonRegion::new(vec![
        Vec2::new(200.0, 10.0),
        Vec2::new(390.0, 290.0),
        Vec2::new(10.0, 290.0),
    ]));
    Boundary::resolve(CANVAS, Some(region), None, &mut VecSink::default())
}

/// Ring-shaped mask with a hole in the middle of the canvas
fn ring_boundary() -> Boundary {
    let mask: Arc<dyn CoverageSampler> = Arc::new(
        MaskBuffer::from_fn(100, 75, |x, y| {
            let d = Vec2::new(x as f32 - 50.0, y as f32 - 37.5).length();
            (15.0..=33.0).contains(&d)
        })
        .expect("mask"),
    );
    Boundary::resolve(CANVAS, None, Some(mask), &mut VecSink::default())
}

fn animated(id: u32, position: Vec2) -> AnimatedItem {
    let item = Item::new(format!("Gem {}", id), 1.0, 120.0, Category::Rare);
    AnimatedItem::new(ItemHandle(id), item, position)
}

proptest! {
    #[test]
    fn sample_returns_a_pool_member(
        weights in prop::collection::vec(0.01f64..100.0, 1..12),
        r in 0.0f64..1.0,
    ) {
        let items: Vec<Item> = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Item::new(format!("item{}", i), w, 1.0, Category::Common))
            .collect();
        let pool = WeightedPool::load(items.clone()).expect("positive weights load");
        let picked = pool.sample_with(|| r).expect("non-empty pool");
        prop_assert!(items.iter().any(|it| it == picked));
    }

    #[test]
    fn containment_is_stable(x in -50.0f32..450.0, y in -50.0f32..350.0) {
        for boundary in [zone_boundary(), triangle_boundary(), Boundary::fallback(CANVAS)] {
            let first = boundary.is_inside(x, y);
            prop_assert_eq!(first, boundary.is_inside(x, y));
            prop_assert!(!first || boundary.on_canvas(Vec2::new(x, y)));
        }
    }

    #[test]
    fn non_finite_points_are_outside(x in -50.0f32..450.0) {
        let boundary = zone_boundary();
        prop_assert!(!boundary.is_inside(f32::NAN, x));
        prop_assert!(!boundary.is_inside(x, f32::INFINITY));
    }

    #[test]
    fn placement_is_inside_and_spaced(
        occupied in prop::collection::vec((0.0f32..400.0, 0.0f32..300.0), 0..25),
        seed in any::<u64>(),
    ) {
        let boundary = zone_boundary();
        let items: Vec<AnimatedItem> = occupied
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| animated(i as u32, Vec2::new(x, y)))
            .collect();
        let search = BodySearch::from(&SceneSettings::default());
        let mut rng = Pcg32::seed_from_u64(seed);

        match find_body_position(&boundary, &items, &search, &mut rng) {
            Ok(p) => {
                prop_assert!(boundary.contains(p));
                for other in &items {
                    prop_assert!(other.position.distance(p) >= search.body_radius * 2.0);
                }
            }
            Err(e) => {
                let is_no_valid_position = matches!(e, DropError::NoValidPosition { .. });
                prop_assert!(is_no_valid_position);
            }
        }
    }

    #[test]
    fn arrival_enters_irregular_regions_and_settles(
        x in 0.0f32..400.0,
        y in 0.0f32..300.0,
        shape in 0usize..3,
    ) {
        let boundary = match shape {
            0 => zone_boundary(),
            1 => triangle_boundary(),
            _ => ring_boundary(),
        };
        let start = Vec2::new(x, y);
        prop_assume!(!boundary.contains(start));

        let settings = SceneSettings::default();
        let mut items = vec![animated(0, start)];
        let mut settled = false;
        for _ in 0..900 {
            update_items(&mut items, &boundary, &settings, REFERENCE_FRAME_MS);
            if items[0].phase(&boundary, &settings) == Phase::Resting {
                settled = true;
                break;
            }
        }
        prop_assert!(settled, "stuck near {:?}", items[0].position);
        prop_assert!(boundary.contains(items[0].position));
    }

    #[test]
    fn beam_opacity_stays_in_range(age_ms in 0.0f32..10_000_000.0) {
        let params = BeamSettings::default();
        let opacity = pulse_opacity(age_ms, &params);
        prop_assert!(opacity >= params.pulse_min && opacity <= params.pulse_max);
    }

    #[test]
    fn reposition_is_idempotent(
        positions in prop::collection::vec((40.0f32..360.0, 40.0f32..260.0), 2..10),
    ) {
        let layout = LabelLayout::from(&SceneSettings::default());
        let mut items: Vec<AnimatedItem> = positions
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| animated(i as u32, Vec2::new(x, y)))
            .collect();
        let newest = items.len() - 1;

        reposition_nearby(&mut items, newest, &layout);
        let targets: Vec<Vec2> = items.iter().map(|it| it.label_target_offset).collect();

        prop_assert_eq!(reposition_nearby(&mut items, newest, &layout), 0);
        let again: Vec<Vec2> = items.iter().map(|it| it.label_target_offset).collect();
        prop_assert_eq!(targets, again);
    }
}
