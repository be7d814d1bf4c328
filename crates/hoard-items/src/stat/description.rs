use serde::{Deserialize, Serialize};

use super::modifier::{Modifier, ModifierKey, ModifierKind, ModifierSource};
use crate::item::{ItemId, RelativeTarget};

/// Declarative rule: "while conditions hold, apply this modifier to that item's stat"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierDescription {
    #[serde(default)]
    pub target: RelativeTarget,
    pub stat_key: String,
    pub kind: ModifierKind,
    pub value: f32,
    /// Explicit order, otherwise the kind's default
    #[serde(default)]
    pub order: Option<i32>,
}

impl ModifierDescription {
    pub fn new(target: RelativeTarget, stat_key: impl Into<String>, kind: ModifierKind, value: f32) -> Self {
        Self {
            target,
            stat_key: stat_key.into(),
            kind,
            value,
            order: None,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Build the live modifier this description stands for
    pub fn to_modifier(&self, source: ModifierSource) -> Modifier {
        let modifier = Modifier::new(self.kind, self.value, source);
        match self.order {
            Some(order) => modifier.with_order(order),
            None => modifier,
        }
    }
}

/// Where a description's modifier currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedModifier {
    pub target: ItemId,
    pub key: ModifierKey,
}

/// A description together with its applied state
#[derive(Debug, Clone, PartialEq)]
pub struct DescribedModifier {
    pub description: ModifierDescription,
    pub applied: Option<AppliedModifier>,
}

impl DescribedModifier {
    pub fn new(description: ModifierDescription) -> Self {
        Self {
            description,
            applied: None,
        }
    }
}
