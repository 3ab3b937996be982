//! Label and body styling

use super::surface::Color;
use crate::sim::pool::{Category, Item};

/// Fully resolved label style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub text: Color,
    pub background: Color,
    pub border: Color,
    pub border_width: f32,
}

/// Host hook for label styling; `None` selects the built-in value buckets
pub trait LabelStyleProvider {
    fn style_for(&self, item: &Item, hovered: bool) -> Option<LabelStyle>;
}

/// Provider that always defers to the default buckets
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLabelStyle;

impl LabelStyleProvider for DefaultLabelStyle {
    fn style_for(&self, _item: &Item, _hovered: bool) -> Option<LabelStyle> {
        None
    }
}

/// Value thresholds and their accent colors, lowest first
const VALUE_BUCKETS: [(f64, Color); 5] = [
    (0.0, Color::rgba(0.62, 0.65, 0.70, 1.0)),
    (10.0, Color::rgba(0.35, 0.80, 0.45, 1.0)),
    (100.0, Color::rgba(0.30, 0.60, 1.00, 1.0)),
    (1_000.0, Color::rgba(0.70, 0.40, 1.00, 1.0)),
    (10_000.0, Color::rgba(1.00, 0.78, 0.25, 1.0)),
];

/// Index of the value bucket for `value`
pub fn value_bucket(value: f64) -> usize {
    VALUE_BUCKETS
        .iter()
        .rposition(|(threshold, _)| value >= *threshold)
        .unwrap_or(0)
}

/// Built-in style: accent color by value bucket, brighter when hovered
pub fn default_label_style(item: &Item, hovered: bool) -> LabelStyle {
    let accent = VALUE_BUCKETS[value_bucket(item.value)].1;
    if hovered {
        LabelStyle {
            text: Color::WHITE,
            background: accent.mix(Color::BLACK, 0.35).with_alpha(0.95),
            border: Color::WHITE,
            border_width: 2.0,
        }
    } else {
        LabelStyle {
            text: accent.toward_white(0.6),
            background: Color::rgba(0.05, 0.06, 0.10, 0.78),
            border: accent.with_alpha(0.8),
            border_width: 1.0,
        }
    }
}

/// Resolve through the provider, falling back to the default buckets
pub fn resolve_label_style(
    provider: &dyn LabelStyleProvider,
    item: &Item,
    hovered: bool,
) -> LabelStyle {
    provider
        .style_for(item, hovered)
        .unwrap_or_else(|| default_label_style(item, hovered))
}

/// Body fill color per category
pub fn category_color(category: Category) -> Color {
    match category {
        Category::Common => Color::rgba(0.55, 0.58, 0.64, 1.0),
        Category::Rare => Color::rgba(0.25, 0.55, 0.95, 1.0),
        Category::Epic => Color::rgba(0.62, 0.32, 0.92, 1.0),
        Category::Legendary => Color::rgba(0.98, 0.72, 0.18, 1.0),
    }
}
