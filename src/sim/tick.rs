//! Per-frame physics and aging
//!
//! Damping factors are defined per reference frame and raised to the power of
//! `dt / REFERENCE_FRAME_MS`, so behavior does not depend on the display rate.

use glam::Vec2;

use super::boundary::{Boundary, Rect};
use super::state::{AnimatedItem, ItemHandle};
use crate::consts::*;
use crate::settings::{RetirementPolicy, SceneSettings};
use crate::{ease_out_cubic, lerp, linear_fade};

/// Rotation speeds below this snap to zero once settled
const ROTATION_REST: f32 = 1e-4;
/// Velocity kept across (or away from) the arrival direction per reference frame
const CROSS_DAMPING: f32 = 0.8;

/// Advance all items by `elapsed_ms` and drop retired ones
///
/// Physics runs in substeps of at most `MAX_STEP_MS`; time beyond
/// `MAX_SUBSTEPS` substeps is dropped for physics but still counts for aging.
/// Returns the handles of retired items.
pub fn update_items(
    items: &mut Vec<AnimatedItem>,
    boundary: &Boundary,
    settings: &SceneSettings,
    elapsed_ms: f32,
) -> Vec<ItemHandle> {
    if !(elapsed_ms.is_finite() && elapsed_ms > 0.0) {
        return Vec::new();
    }

    let physics_ms = elapsed_ms.min(MAX_STEP_MS * MAX_SUBSTEPS as f32);
    let substeps = (physics_ms / MAX_STEP_MS).ceil().max(1.0) as u32;
    let dt = physics_ms / substeps as f32;

    for item in items.iter_mut() {
        for _ in 0..substeps {
            step_motion(item, boundary, settings, dt);
        }
        age(item, settings, elapsed_ms);
    }

    let mut retired = Vec::new();
    items.retain(|item| {
        if should_retire(item, settings) {
            retired.push(item.id);
            false
        } else {
            true
        }
    });
    retired
}

/// One physics substep: arrival gravity, settling, per-axis commit, label easing
pub fn step_motion(item: &mut AnimatedItem, boundary: &Boundary, settings: &SceneSettings, dt_ms: f32) {
    let p = &settings.physics;
    let ratio = dt_ms / REFERENCE_FRAME_MS;

    if !boundary.contains(item.position) {
        // Arriving: free flight toward an inside point
        let target = arrival_target(item, boundary);
        let dir = match target {
            Some(t) => (t - item.position).normalize_or_zero(),
            None => bounds_pull(item.position, boundary.bounds()),
        };
        let damping = CROSS_DAMPING.powf(ratio);
        let mut along = item.velocity.dot(dir);
        let across = (item.velocity - dir * along) * damping;
        // Overshooting the target: brake on the way back
        if along < 0.0 {
            along *= damping;
        }
        item.velocity = dir * (along + p.gravity * ratio) + across;
        item.velocity = item.velocity.clamp_length_max(p.max_fall_speed);
        item.position += item.velocity * ratio;
    } else if !item.is_slow(p.settle_epsilon) {
        item.arrival_target = None;
        item.velocity *= (p.friction * p.air_resistance).powf(ratio);
        commit_axes(item, boundary, settings, ratio);
    } else {
        item.arrival_target = None;
        item.velocity = Vec2::ZERO;
        item.rotation_speed *= p.rotation_decay.powf(ratio);
        if item.rotation_speed.abs() < ROTATION_REST {
            item.rotation_speed = 0.0;
        }
    }
    item.rotation += item.rotation_speed * ratio;

    ease_label(item, settings, ratio);
}

/// Inside point the item steers toward while outside the region
///
/// Cached on the item and recomputed when a boundary swap leaves it outside.
/// For an item above the region the nearest inside point is straight below, so
/// the pull acts as plain gravity. Items beside or below the region are pulled
/// sideways or upward, which goes beyond gravity on purpose: a layout change can
/// leave live items anywhere on the canvas, including in gaps and holes.
fn arrival_target(item: &mut AnimatedItem, boundary: &Boundary) -> Option<Vec2> {
    if let Some(t) = item.arrival_target
        && boundary.contains(t)
    {
        return Some(t);
    }
    item.arrival_target = boundary.nearest_inside(item.position);
    item.arrival_target
}

/// Bounding-box pull for regions without a usable inside point
fn bounds_pull(pos: Vec2, bounds: Rect) -> Vec2 {
    let min = bounds.min();
    let max = bounds.max();
    let x = if pos.x < min.x {
        1.0
    } else if pos.x > max.x {
        -1.0
    } else {
        0.0
    };
    let y = if pos.y > max.y { -1.0 } else { 1.0 };
    Vec2::new(x, y).normalize_or_zero()
}

/// Move each axis only if it stays inside; otherwise bounce that axis
fn commit_axes(item: &mut AnimatedItem, boundary: &Boundary, settings: &SceneSettings, ratio: f32) {
    let p = &settings.physics;
    let step = item.velocity * ratio;

    let nx = item.position.x + step.x;
    if boundary.is_inside(nx, item.position.y) {
        item.position.x = nx;
    } else if item.velocity.x.abs() < p.settle_epsilon {
        item.velocity.x = 0.0;
    } else {
        item.velocity.x = -item.velocity.x * p.bounce_damping;
    }

    let ny = item.position.y + step.y;
    if boundary.is_inside(item.position.x, ny) {
        item.position.y = ny;
    } else if item.velocity.y.abs() < p.settle_epsilon {
        item.velocity.y = 0.0;
    } else {
        item.velocity.y = -item.velocity.y * p.bounce_damping;
    }
}

/// Move the label a fixed fraction of the remaining distance toward its target
fn ease_label(item: &mut AnimatedItem, settings: &SceneSettings, ratio: f32) {
    let p = &settings.physics;
    let delta = item.label_target_offset - item.label_offset;
    if delta.length() <= p.label_snap {
        item.label_offset = item.label_target_offset;
    } else {
        let t = 1.0 - (1.0 - p.label_lerp).powf(ratio);
        item.label_offset += delta * t;
    }
}

/// Advance age, entrance scale, fades and the beam clock
pub fn age(item: &mut AnimatedItem, settings: &SceneSettings, dt_ms: f32) {
    let lifetime = &settings.lifetime;
    item.age_ms += dt_ms;
    item.beam.age_ms += dt_ms;

    item.scale = lerp(ENTRANCE_SCALE, 1.0, ease_out_cubic(item.age_ms / ENTRANCE_MS));

    // min() keeps the alphas non-increasing
    let body = linear_fade(
        item.age_ms,
        lifetime.body_fade_start_ms,
        lifetime.body_fade_duration_ms,
    );
    let label = linear_fade(
        item.age_ms,
        lifetime.label_fade_start_ms,
        lifetime.label_fade_duration_ms,
    );
    item.body_alpha = item.body_alpha.min(body).clamp(0.0, 1.0);
    item.label_alpha = item.label_alpha.min(label).clamp(0.0, 1.0);
}

pub fn should_retire(item: &AnimatedItem, settings: &SceneSettings) -> bool {
    match settings.lifetime.retirement {
        RetirementPolicy::BodyFaded => {
            item.age_ms >= settings.lifetime.retire_after_ms || item.body_alpha <= 0.0
        }
        RetirementPolicy::LabelFaded => item.body_alpha <= 0.0 && item.label_alpha <= 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::VecSink;
    use crate::sim::boundary::{Region, ZoneRegion};
    use crate::sim::pool::{Category, Item};
    use crate::sim::state::Phase;
    use std::sync::Arc;

    fn boundary() -> Boundary {
        let mut sink = VecSink::default();
        let region: Arc<dyn Region> = Arc::new(ZoneRegion::single(Rect::new(50.0, 100.0, 300.0, 200.0)));
        Boundary::resolve(Vec2::new(400.0, 400.0), Some(region), None, &mut sink)
    }

    fn item_at(pos: Vec2) -> AnimatedItem {
        AnimatedItem::new(ItemHandle(1), Item::new("Orb", 1.0, 3.0, Category::Epic), pos)
    }

    #[test]
    fn test_arrival_settles_inside() {
        let b = boundary();
        let settings = SceneSettings::default();
        let mut items = vec![item_at(Vec2::new(200.0, 20.0))];

        let mut settled_at = None;
        for frame in 0..600 {
            update_items(&mut items, &b, &settings, REFERENCE_FRAME_MS);
            let it = &items[0];
            if it.phase(&b, &settings) == Phase::Resting {
                settled_at = Some(frame);
                break;
            }
        }
        let frame = settled_at.expect("item should settle");
        assert!(frame < 300, "took {} frames", frame);
        assert!(b.contains(items[0].position));
    }

    #[test]
    fn test_arrival_from_gap_between_zones() {
        let mut sink = VecSink::default();
        let region: Arc<dyn Region> = Arc::new(ZoneRegion::new(vec![
            Rect::new(0.0, 0.0, 100.0, 300.0),
            Rect::new(200.0, 0.0, 100.0, 300.0),
        ]));
        let b = Boundary::resolve(Vec2::new(400.0, 400.0), Some(region), None, &mut sink);
        let settings = SceneSettings::default();
        let mut items = vec![item_at(Vec2::new(150.0, 50.0))];

        let mut settled_at = None;
        for frame in 0..1700 {
            update_items(&mut items, &b, &settings, REFERENCE_FRAME_MS);
            if settled_at.is_none() && items[0].phase(&b, &settings) == Phase::Resting {
                settled_at = Some(frame);
            }
            if settled_at.is_some() {
                assert!(b.contains(items[0].position), "left at {:?}", items[0].position);
            }
        }
        let frame = settled_at.expect("item should settle");
        assert!(frame < 600, "took {} frames", frame);
        assert_eq!(items[0].arrival_target, None);
    }

    #[test]
    fn test_arrival_target_follows_boundary_swap() {
        let mut sink = VecSink::default();
        let settings = SceneSettings::default();
        let canvas = Vec2::new(400.0, 400.0);
        let left: Arc<dyn Region> = Arc::new(ZoneRegion::single(Rect::new(0.0, 200.0, 100.0, 100.0)));
        let right: Arc<dyn Region> =
            Arc::new(ZoneRegion::single(Rect::new(300.0, 200.0, 100.0, 100.0)));
        let first = Boundary::resolve(canvas, Some(left), None, &mut sink);
        let second = Boundary::resolve(canvas, Some(right), None, &mut sink);
        let mut it = item_at(Vec2::new(200.0, 100.0));
        step_motion(&mut it, &first, &settings, REFERENCE_FRAME_MS);
        assert!(it.arrival_target.is_some_and(|t| first.contains(t)));
        step_motion(&mut it, &second, &settings, REFERENCE_FRAME_MS);
        assert!(it.arrival_target.is_some_and(|t| second.contains(t)));
    }

    #[test]
    fn test_settled_item_stays_put() {
        let b = boundary();
        let settings = SceneSettings::default();
        let mut items = vec![item_at(Vec2::new(200.0, 200.0))];
        items[0].rotation_speed = 0.2;
        for _ in 0..120 {
            update_items(&mut items, &b, &settings, REFERENCE_FRAME_MS);
        }
        assert_eq!(items[0].position, Vec2::new(200.0, 200.0));
        assert_eq!(items[0].rotation_speed, 0.0);
    }

    #[test]
    fn test_bounce_keeps_item_inside() {
        let b = boundary();
        let settings = SceneSettings::default();
        let mut items = vec![item_at(Vec2::new(340.0, 200.0))];
        items[0].velocity = Vec2::new(12.0, -9.0);
        for _ in 0..240 {
            update_items(&mut items, &b, &settings, REFERENCE_FRAME_MS);
            assert!(b.contains(items[0].position), "escaped to {:?}", items[0].position);
        }
        assert!(items[0].is_slow(settings.physics.settle_epsilon));
    }

    #[test]
    fn test_frame_rate_independent_damping() {
        let b = boundary();
        let settings = SceneSettings::default();
        let mut fast = item_at(Vec2::new(200.0, 200.0));
        let mut slow = fast.clone();
        fast.velocity = Vec2::new(2.0, 0.0);
        slow.velocity = Vec2::new(2.0, 0.0);
        for _ in 0..4 {
            step_motion(&mut fast, &b, &settings, REFERENCE_FRAME_MS / 2.0);
        }
        for _ in 0..2 {
            step_motion(&mut slow, &b, &settings, REFERENCE_FRAME_MS);
        }
        assert!((fast.velocity.x - slow.velocity.x).abs() < 1e-4);
    }

    #[test]
    fn test_label_eases_then_snaps() {
        let b = boundary();
        let settings = SceneSettings::default();
        let mut it = item_at(Vec2::new(200.0, 200.0));
        it.label_target_offset = Vec2::new(0.0, -40.0);
        step_motion(&mut it, &b, &settings, REFERENCE_FRAME_MS);
        assert!((it.label_offset.y - -6.0).abs() < 1e-3);
        for _ in 0..200 {
            step_motion(&mut it, &b, &settings, REFERENCE_FRAME_MS);
        }
        assert_eq!(it.label_offset, it.label_target_offset);
    }

    #[test]
    fn test_body_fade_and_retirement() {
        let b = boundary();
        let settings = SceneSettings::default();
        let mut items = vec![item_at(Vec2::new(200.0, 200.0))];

        let mut last_alpha = 1.0;
        let mut t = 0.0;
        while t < 32_500.0 {
            update_items(&mut items, &b, &settings, 100.0);
            t += 100.0;
            assert!(items[0].body_alpha <= last_alpha);
            last_alpha = items[0].body_alpha;
        }
        assert!((items[0].body_alpha - 0.5).abs() < 1e-3);
        assert_eq!(items[0].label_alpha, 1.0);

        let retired = update_items(&mut items, &b, &settings, 2_500.0);
        assert_eq!(retired, vec![ItemHandle(1)]);
        assert!(items.is_empty());
    }

    #[test]
    fn test_label_faded_policy_outlives_body() {
        let b = boundary();
        let mut settings = SceneSettings::default();
        settings.lifetime.retirement = RetirementPolicy::LabelFaded;
        let mut items = vec![item_at(Vec2::new(200.0, 200.0))];

        update_items(&mut items, &b, &settings, 45_000.0);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].body_alpha, 0.0);
        assert!((items[0].label_alpha - 0.5).abs() < 1e-3);

        update_items(&mut items, &b, &settings, 5_000.0);
        assert!(items.is_empty());
    }

    #[test]
    fn test_entrance_scale() {
        let settings = SceneSettings::default();
        let mut it = item_at(Vec2::ZERO);
        assert_eq!(it.scale, ENTRANCE_SCALE);
        age(&mut it, &settings, ENTRANCE_MS);
        assert!((it.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_elapsed_is_ignored() {
        let b = boundary();
        let settings = SceneSettings::default();
        let mut items = vec![item_at(Vec2::new(200.0, 200.0))];
        assert!(update_items(&mut items, &b, &settings, f32::NAN).is_empty());
        assert!(update_items(&mut items, &b, &settings, -5.0).is_empty());
        assert_eq!(items[0].age_ms, 0.0);
    }
}
