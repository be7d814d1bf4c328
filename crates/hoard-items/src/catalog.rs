//! Item catalog
//!
//! Templates describe item types; a [`Catalog`] hands them out by type id.
//! Instantiation is asynchronous so catalogs can sit behind asset loading or
//! a network fetch.

use std::collections::HashMap;
use std::future::{self, Future};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::effect::EffectTemplate;
use crate::error::CatalogError;
use crate::item::{ItemTypeId, Slot};
use crate::stat::{ModifierDescription, Stat};

/// Inventory an item type comes with
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InventoryTemplate {
    /// Falls back to the world's default capacity
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// Everything needed to create an item of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemTemplate {
    pub type_id: ItemTypeId,
    pub name: String,
    pub order: i32,
    pub is_character: bool,
    pub max_stack_count: u32,
    /// Initial stack count
    pub stack_count: u32,
    pub unit_weight: f32,
    pub value: f32,
    pub quality: i32,
    pub max_durability: Option<f32>,
    pub tags: Vec<String>,
    pub stats: Vec<Stat>,
    pub slots: Vec<Slot>,
    pub inventory: Option<InventoryTemplate>,
    pub modifiers: Vec<ModifierDescription>,
    pub effects: Vec<EffectTemplate>,
}

impl Default for ItemTemplate {
    fn default() -> Self {
        Self {
            type_id: ItemTypeId::default(),
            name: String::new(),
            order: 0,
            is_character: false,
            max_stack_count: 1,
            stack_count: 1,
            unit_weight: 0.0,
            value: 0.0,
            quality: 0,
            max_durability: None,
            tags: Vec::new(),
            stats: Vec::new(),
            slots: Vec::new(),
            inventory: None,
            modifiers: Vec::new(),
            effects: Vec::new(),
        }
    }
}

impl ItemTemplate {
    pub fn new(type_id: ItemTypeId, name: impl Into<String>) -> Self {
        Self {
            type_id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn stackable(mut self, max_stack_count: u32) -> Self {
        self.max_stack_count = max_stack_count;
        self
    }

    pub fn stack(mut self, stack_count: u32) -> Self {
        self.stack_count = stack_count;
        self
    }

    pub fn weight(mut self, unit_weight: f32) -> Self {
        self.unit_weight = unit_weight;
        self
    }

    pub fn value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }

    pub fn quality(mut self, quality: i32) -> Self {
        self.quality = quality;
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn character(mut self) -> Self {
        self.is_character = true;
        self
    }

    pub fn durability(mut self, max: f32) -> Self {
        self.max_durability = Some(max);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn stat(mut self, key: impl Into<String>, base_value: f32) -> Self {
        self.stats.push(Stat::new(key, base_value));
        self
    }

    pub fn slot(mut self, slot: Slot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn inventory(mut self, capacity: usize) -> Self {
        self.inventory = Some(InventoryTemplate {
            capacity: Some(capacity),
        });
        self
    }

    pub fn modifier(mut self, description: ModifierDescription) -> Self {
        self.modifiers.push(description);
        self
    }

    pub fn effect(mut self, effect: EffectTemplate) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Source of item templates
pub trait Catalog {
    /// Produce the template for a new item of `type_id`
    fn instantiate(&self, type_id: ItemTypeId) -> impl Future<Output = Result<ItemTemplate, CatalogError>>;
}

/// In-memory catalog, typically loaded from a JSON file
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    templates: HashMap<ItemTypeId, ItemTemplate>,
}

#[derive(Deserialize)]
struct CatalogFile {
    items: Vec<ItemTemplate>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{ "items": [ ... ] }`
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for template in file.items {
            catalog.insert(template);
        }
        debug!(count = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Add or replace a template
    pub fn insert(&mut self, template: ItemTemplate) {
        self.templates.insert(template.type_id, template);
    }

    pub fn get(&self, type_id: ItemTypeId) -> Option<&ItemTemplate> {
        self.templates.get(&type_id)
    }

    /// All templates, ordered by type id
    pub fn templates(&self) -> Vec<&ItemTemplate> {
        let mut all: Vec<_> = self.templates.values().collect();
        all.sort_by_key(|t| t.type_id);
        all
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn instantiate(&self, type_id: ItemTypeId) -> impl Future<Output = Result<ItemTemplate, CatalogError>> {
        let result = if self.templates.is_empty() {
            Err(CatalogError::NotConfigured)
        } else {
            self.templates
                .get(&type_id)
                .cloned()
                .ok_or(CatalogError::NotFound(type_id))
        };
        future::ready(result)
    }
}
