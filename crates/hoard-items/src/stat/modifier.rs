use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::effect::EffectId;
use crate::item::ItemId;

/// How a modifier combines with the running value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// `result += value`
    Add,
    /// Summed with other percentage-adds of the same order, then `result *= max(0, 1 + sum)`
    PercentageAdd,
    /// `result *= max(0, 1 + value)`, applied on its own
    PercentageMultiply,
}

impl ModifierKind {
    /// Order used when a modifier doesn't specify one
    pub fn default_order(self) -> i32 {
        match self {
            Self::Add => 0,
            Self::PercentageAdd => 100,
            Self::PercentageMultiply => 200,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::PercentageAdd => "PercentageAdd",
            Self::PercentageMultiply => "PercentageMultiply",
        }
    }
}

/// Identifies one live modifier on one stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModifierKey(pub u64);

/// Who owns a modifier. Used for bulk removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierSource {
    /// Attached by an action of this effect
    Effect(EffectId),
    /// Attached by the `index`-th modifier description of `item`
    Description { item: ItemId, index: usize },
    /// Gameplay code outside the item tree (buffs, debug tools)
    External(Uuid),
}

/// A single adjustment to a stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub value: f32,
    pub order: i32,
    pub source: ModifierSource,
}

impl Modifier {
    /// Create a modifier at its kind's default order
    pub fn new(kind: ModifierKind, value: f32, source: ModifierSource) -> Self {
        Self {
            kind,
            value,
            order: kind.default_order(),
            source,
        }
    }

    pub fn add(value: f32, source: ModifierSource) -> Self {
        Self::new(ModifierKind::Add, value, source)
    }

    pub fn percentage_add(value: f32, source: ModifierSource) -> Self {
        Self::new(ModifierKind::PercentageAdd, value, source)
    }

    pub fn percentage_multiply(value: f32, source: ModifierSource) -> Self {
        Self::new(ModifierKind::PercentageMultiply, value, source)
    }

    /// Override the resolution order
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}
