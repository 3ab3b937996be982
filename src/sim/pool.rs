//! Weighted item pool
//!
//! An immutable snapshot of the catalog with precomputed cumulative weights.
//! Sampling is a binary search over the running sums.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DropError, Result};

/// Ranked item tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Common,
        Category::Rare,
        Category::Epic,
        Category::Legendary,
    ];

    /// Rank index (0 = lowest tier)
    pub fn rank(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Common => "common",
            Category::Rare => "rare",
            Category::Epic => "epic",
            Category::Legendary => "legendary",
        }
    }
}

/// A selectable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub category: Category,
}

impl Item {
    pub fn new(name: impl Into<String>, weight: f64, value: f64, category: Category) -> Self {
        Self {
            name: name.into(),
            weight,
            value,
            category,
        }
    }

    /// Text shown on the floating label
    pub fn label_text(&self) -> String {
        format!("{} · {}", self.name, format_value(self.value))
    }
}

/// Compact value formatting (1234 -> "1.2k")
pub fn format_value(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Immutable weighted snapshot of the catalog
#[derive(Debug, Clone, Default)]
pub struct WeightedPool {
    items: Vec<Item>,
    total_weight: f64,
    cumulative_weights: Vec<f64>,
}

impl WeightedPool {
    /// Build a pool; items without a positive finite weight are dropped
    pub fn load(items: Vec<Item>) -> Result<Self> {
        let mut kept = Vec::with_capacity(items.len());
        let mut cumulative_weights = Vec::with_capacity(items.len());
        let mut total_weight = 0.0;

        for item in items {
            if !(item.weight.is_finite() && item.weight > 0.0) {
                log::warn!("Skipping item {:?} with weight {}", item.name, item.weight);
                continue;
            }
            total_weight += item.weight;
            cumulative_weights.push(total_weight);
            kept.push(item);
        }

        if kept.is_empty() {
            return Err(DropError::EmptyCatalog);
        }

        log::info!(
            "Loaded pool with {} items (total weight {})",
            kept.len(),
            total_weight
        );

        Ok(Self {
            items: kept,
            total_weight,
            cumulative_weights,
        })
    }

    /// Build a pool from a JSON array of items
    pub fn from_json(json: &str) -> Result<Self> {
        let items: Vec<Item> = serde_json::from_str(json)?;
        Self::load(items)
    }

    /// Sample with a caller-supplied uniform generator in [0, 1)
    ///
    /// A single-item pool never calls `random_unit`, so seeded sequences stay
    /// aligned whatever the pool size.
    pub fn sample_with(&self, mut random_unit: impl FnMut() -> f64) -> Result<&Item> {
        match self.items.len() {
            0 => Err(DropError::EmptyPool),
            1 => Ok(&self.items[0]),
            n => {
                let r = random_unit().clamp(0.0, 1.0) * self.total_weight;
                let index = self.cumulative_weights.partition_point(|&c| c <= r);
                Ok(&self.items[index.min(n - 1)])
            }
        }
    }

    /// Sample using a `rand` generator
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<&Item> {
        self.sample_with(|| rng.random::<f64>())
    }

    /// Selection probability of the item at `index`
    pub fn probability(&self, index: usize) -> Option<f64> {
        self.items
            .get(index)
            .map(|item| item.weight / self.total_weight)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn cumulative_weights(&self) -> &[f64] {
        &self.cumulative_weights
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
