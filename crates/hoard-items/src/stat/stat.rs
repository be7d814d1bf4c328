use std::cell::Cell;

use serde::{Deserialize, Serialize};

use super::modifier::{Modifier, ModifierKey, ModifierKind, ModifierSource};

/// Resolve a base value against a set of modifiers.
///
/// Modifiers are applied in ascending `order`, keeping insertion order for
/// ties. Consecutive `PercentageAdd` modifiers at the same order are summed and
/// applied as one multiplier; every multiplier is clamped at zero.
pub fn resolve_value<'a>(base_value: f32, modifiers: impl IntoIterator<Item = &'a Modifier>) -> f32 {
    let mut sorted: Vec<&Modifier> = modifiers.into_iter().collect();
    // sort_by_key is stable
    sorted.sort_by_key(|m| m.order);

    let mut result = base_value;
    let mut accumulator = 0.0f32;
    let mut accumulating = false;
    let mut last_order: Option<i32> = None;

    for modifier in sorted {
        let order_changed = last_order != Some(modifier.order);
        if accumulating && (order_changed || modifier.kind != ModifierKind::PercentageAdd) {
            result *= (1.0 + accumulator).max(0.0);
            accumulator = 0.0;
            accumulating = false;
        }
        last_order = Some(modifier.order);

        match modifier.kind {
            ModifierKind::Add => result += modifier.value,
            ModifierKind::PercentageAdd => {
                accumulator += modifier.value;
                accumulating = true;
            }
            ModifierKind::PercentageMultiply => result *= (1.0 + modifier.value).max(0.0),
        }
    }

    if accumulating {
        result *= (1.0 + accumulator).max(0.0);
    }
    result
}

/// A named numeric attribute with a lazily resolved value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stat {
    key: String,
    base_value: f32,
    #[serde(skip)]
    modifiers: Vec<(ModifierKey, Modifier)>,
    #[serde(skip)]
    next_key: u64,
    #[serde(skip)]
    cached: Cell<f32>,
    /// Base value the cache was computed from
    #[serde(skip)]
    cached_base: Cell<f32>,
    #[serde(skip, default = "dirty")]
    dirty: Cell<bool>,
}

fn dirty() -> Cell<bool> {
    Cell::new(true)
}

impl Stat {
    pub fn new(key: impl Into<String>, base_value: f32) -> Self {
        Self {
            key: key.into(),
            base_value,
            modifiers: Vec::new(),
            next_key: 0,
            cached: Cell::new(base_value),
            cached_base: Cell::new(base_value),
            dirty: Cell::new(true),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn base_value(&self) -> f32 {
        self.base_value
    }

    /// Change the base value. Returns `true` if it actually changed.
    pub fn set_base_value(&mut self, value: f32) -> bool {
        if self.base_value.to_bits() == value.to_bits() {
            return false;
        }
        self.base_value = value;
        self.dirty.set(true);
        true
    }

    /// Resolved value. Recomputes only when dirty or the base changed.
    pub fn value(&self) -> f32 {
        if self.dirty.get() || self.cached_base.get().to_bits() != self.base_value.to_bits() {
            let resolved = resolve_value(self.base_value, self.modifiers.iter().map(|(_, m)| m));
            self.cached.set(resolved);
            self.cached_base.set(self.base_value);
            self.dirty.set(false);
        }
        self.cached.get()
    }

    /// Whether the next `value()` call will recompute
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn add_modifier(&mut self, modifier: Modifier) -> ModifierKey {
        let key = ModifierKey(self.next_key);
        self.next_key += 1;
        self.modifiers.push((key, modifier));
        self.dirty.set(true);
        key
    }

    /// Remove a modifier. Returns it if it was attached.
    pub fn remove_modifier(&mut self, key: ModifierKey) -> Option<Modifier> {
        let pos = self.modifiers.iter().position(|(k, _)| *k == key)?;
        self.dirty.set(true);
        Some(self.modifiers.remove(pos).1)
    }

    /// Change an attached modifier's value in place
    pub fn set_modifier_value(&mut self, key: ModifierKey, value: f32) -> bool {
        let Some((_, modifier)) = self.modifiers.iter_mut().find(|(k, _)| *k == key) else {
            return false;
        };
        modifier.value = value;
        self.dirty.set(true);
        true
    }

    /// Remove every modifier owned by `source`. Returns the number removed.
    pub fn remove_all_from_source(&mut self, source: ModifierSource) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|(_, m)| m.source != source);
        let removed = before - self.modifiers.len();
        if removed > 0 {
            self.dirty.set(true);
        }
        removed
    }

    pub fn modifier(&self, key: ModifierKey) -> Option<&Modifier> {
        self.modifiers.iter().find(|(k, _)| *k == key).map(|(_, m)| m)
    }

    /// Attached modifiers in insertion order
    pub fn modifiers(&self) -> impl Iterator<Item = (ModifierKey, &Modifier)> + '_ {
        self.modifiers.iter().map(|(k, m)| (*k, m))
    }

    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }
}

impl PartialEq for Stat {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.base_value == other.base_value && self.modifiers == other.modifiers
    }
}
