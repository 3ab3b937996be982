//! Category beam effect
//!
//! A pulsing light column rising from an item: a scatter dome at the base, a wide
//! outer cone and a bright narrow core. The pulse never decays; the beam goes away
//! with its body through the body alpha.

use glam::Vec2;

use super::surface::{Color, DrawingSurface, Paint};
use crate::diagnostics::DiagnosticSink;
use crate::error::{DropError, Result};
use crate::settings::BeamSettings;
use crate::sim::AnimatedItem;
use crate::sim::state::{BeamConfig, BeamState, Rgb};

/// Per-layer opacity multipliers
const SCATTER_STRENGTH: f32 = 0.8;
const OUTER_STRENGTH: f32 = 0.4;
const CORE_STRENGTH: f32 = 1.0;

/// Whitening applied to the base color per layer
const SCATTER_WHITEN: f32 = 0.3;
const CORE_WHITEN: f32 = 0.7;

/// Pulse opacity at `age_ms`, always within `[pulse_min, pulse_max]`
pub fn pulse_opacity(age_ms: f32, params: &BeamSettings) -> f32 {
    let (lo, hi) = if params.pulse_min <= params.pulse_max {
        (params.pulse_min, params.pulse_max)
    } else {
        (params.pulse_max, params.pulse_min)
    };
    let wave = 0.5 + 0.5 * (age_ms * params.pulse_speed).sin();
    (lo + (hi - lo) * wave).clamp(lo, hi)
}

/// Parse `#rgb` or `#rrggbb` (the `#` is optional)
pub fn parse_hex_color(input: &str) -> Result<Rgb> {
    let malformed = || DropError::MalformedColor(input.to_string());
    let hex = input.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(malformed());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| malformed());
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, slot) in out.iter_mut().enumerate() {
                let v = channel(&hex[i..i + 1])?;
                *slot = v * 17;
            }
            Ok(Rgb::new(out[0], out[1], out[2]))
        }
        6 => Ok(Rgb::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => Err(malformed()),
    }
}

/// Parse a color, degrading to white on malformed input
pub fn parse_hex_or_white(input: &str, sink: &mut dyn DiagnosticSink) -> Rgb {
    match parse_hex_color(input) {
        Ok(rgb) => rgb,
        Err(err) => {
            sink.report("beam.color", &err.to_string());
            Rgb::WHITE
        }
    }
}

/// Beam state copied into an item at spawn
pub fn resolve_beam(config: &BeamConfig, sink: &mut dyn DiagnosticSink) -> BeamState {
    BeamState {
        enabled: config.enabled,
        color: config
            .color
            .as_deref()
            .map(|hex| parse_hex_or_white(hex, sink)),
        age_ms: 0.0,
    }
}

/// Draw the three beam layers for `item`; returns false if nothing was drawn
pub fn draw_beam(
    surface: &mut dyn DrawingSurface,
    item: &AnimatedItem,
    params: &BeamSettings,
    body_radius: f32,
) -> bool {
    let Some(rgb) = item.beam.color.filter(|_| item.beam.enabled) else {
        return false;
    };
    let opacity = pulse_opacity(item.beam.age_ms, params) * item.body_alpha;
    if opacity <= 0.0 {
        return false;
    }

    let base_color = Color::from_rgb(rgb);
    let r = body_radius * item.scale;
    let base = item.position;
    let height = surface.size().y * params.height_fraction;
    let top = base - Vec2::new(0.0, height);

    surface.fill_ellipse(
        base,
        Vec2::new(r * 2.2, r * 0.9),
        &Paint::Radial {
            center: base,
            radii: Vec2::new(r * 2.2, r * 0.9),
            inner: base_color
                .toward_white(SCATTER_WHITEN)
                .with_alpha(SCATTER_STRENGTH * opacity),
            outer: base_color.with_alpha(0.0),
        },
    );

    surface.fill_polygon(
        &cone(base, top, r * 1.2, r * 0.5),
        &Paint::Linear {
            start: base,
            end: top,
            from: base_color.with_alpha(OUTER_STRENGTH * opacity),
            to: base_color.with_alpha(0.0),
        },
    );

    let core = base_color.toward_white(CORE_WHITEN);
    surface.fill_polygon(
        &cone(base, top, r * 0.45, r * 0.12),
        &Paint::Linear {
            start: base,
            end: top,
            from: core.with_alpha(CORE_STRENGTH * opacity),
            to: core.with_alpha(0.0),
        },
    );
    true
}

/// Trapezoid from a wide base to a narrow top, counter-clockwise
fn cone(base: Vec2, top: Vec2, base_half_width: f32, top_half_width: f32) -> [Vec2; 4] {
    [
        Vec2::new(base.x - base_half_width, base.y),
        Vec2::new(base.x + base_half_width, base.y),
        Vec2::new(top.x + top_half_width, top.y),
        Vec2::new(top.x - top_half_width, top.y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::VecSink;
    use crate::renderer::record::{DrawCommand, RecordingSurface};
    use crate::sim::ItemHandle;
    use crate::sim::pool::{Category, Item};

    fn beamed_item(color: Option<Rgb>) -> AnimatedItem {
        let mut it = AnimatedItem::new(
            ItemHandle(3),
            Item::new("Crown", 1.0, 5000.0, Category::Legendary),
            Vec2::new(200.0, 300.0),
        );
        it.beam = BeamState {
            enabled: true,
            color,
            age_ms: 0.0,
        };
        it
    }

    #[test]
    fn test_pulse_stays_in_range() {
        let params = BeamSettings::default();
        for i in 0..5000 {
            let v = pulse_opacity(i as f32 * 7.3, &params);
            assert!((params.pulse_min..=params.pulse_max).contains(&v), "{}", v);
        }
        // Half way at age zero
        assert!((pulse_opacity(0.0, &params) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_hex_color("#fc0").expect("short"), Rgb::new(255, 204, 0));
        assert_eq!(parse_hex_color("ff8800").expect("long"), Rgb::new(255, 136, 0));
        assert_eq!(parse_hex_color(" #0A0b0C ").expect("mixed case"), Rgb::new(10, 11, 12));
        assert!(matches!(parse_hex_color("#12345"), Err(DropError::MalformedColor(_))));
        assert!(parse_hex_color("#gg0000").is_err());
        assert!(parse_hex_color("#ééé").is_err());
        assert!(parse_hex_color("#+f+f+f").is_err());
        assert!(parse_hex_color("+ff").is_err());
    }

    #[test]
    fn test_malformed_color_degrades_to_white() {
        let mut sink = VecSink::default();
        let state = resolve_beam(&BeamConfig::colored("nope"), &mut sink);
        assert_eq!(state.color, Some(Rgb::WHITE));
        assert_eq!(sink.reports.len(), 1);
        assert_eq!(sink.reports[0].0, "beam.color");

        let signed = resolve_beam(&BeamConfig::colored("#+f+f+f"), &mut sink);
        assert_eq!(signed.color, Some(Rgb::WHITE));
        assert_eq!(sink.reports.len(), 2);

        let off = resolve_beam(&BeamConfig::off(), &mut sink);
        assert!(!off.is_visible());
        assert_eq!(sink.reports.len(), 2);
    }

    #[test]
    fn test_draws_three_layers() {
        let mut surface = RecordingSurface::new(Vec2::new(400.0, 600.0));
        let item = beamed_item(Some(Rgb::new(255, 0, 0)));
        assert!(draw_beam(&mut surface, &item, &BeamSettings::default(), 22.0));
        assert_eq!(surface.commands.len(), 3);
        assert!(matches!(surface.commands[0], DrawCommand::Ellipse { .. }));
        let DrawCommand::Polygon { ref points, .. } = surface.commands[1] else {
            panic!("outer cone should be a polygon");
        };
        // Cone reaches 35% of the canvas height above the item
        assert!((points[2].y - (300.0 - 210.0)).abs() < 1e-3);
    }

    #[test]
    fn test_no_color_or_faded_body_draws_nothing() {
        let mut surface = RecordingSurface::new(Vec2::new(400.0, 600.0));
        let params = BeamSettings::default();
        assert!(!draw_beam(&mut surface, &beamed_item(None), &params, 22.0));

        let mut faded = beamed_item(Some(Rgb::WHITE));
        faded.body_alpha = 0.0;
        assert!(!draw_beam(&mut surface, &faded, &params, 22.0));
        assert!(surface.commands.is_empty());
    }
}
