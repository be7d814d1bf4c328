//! Scripted session that runs the item engine end to end

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use hoard_items::{
    Catalog, InventoryId, ItemId, ItemTypeId, ItemWorld, Modifier, ModifierSource, TagRegistry,
};
use tracing::{debug, info};
use uuid::Uuid;

pub const HERO: ItemTypeId = ItemTypeId(1);
pub const BACKPACK: ItemTypeId = ItemTypeId(2);
pub const ARROWS: ItemTypeId = ItemTypeId(3);
pub const BREAD: ItemTypeId = ItemTypeId(4);
pub const DAGGER: ItemTypeId = ItemTypeId(5);
pub const RING: ItemTypeId = ItemTypeId(6);
pub const VEST: ItemTypeId = ItemTypeId(7);

/// Catalog used when no catalog file is configured
pub const CATALOG: &str = r#"{
    "items": [
        { "type_id": 1, "name": "Adventurer", "is_character": true,
          "stats": [
            { "key": "strength", "base_value": 10.0 },
            { "key": "dexterity", "base_value": 8.0 },
            { "key": "armor", "base_value": 0.0 }
          ],
          "slots": [
            { "key": "finger", "required_tags": ["ring"] },
            { "key": "back", "required_tags": ["bag"] },
            { "key": "chest", "required_tags": ["armor"] }
          ] },
        { "type_id": 2, "name": "Backpack", "tags": ["bag"], "unit_weight": 1.5,
          "inventory": { "capacity": 8 } },
        { "type_id": 3, "name": "Arrows", "tags": ["ammo"], "max_stack_count": 20, "unit_weight": 0.05 },
        { "type_id": 4, "name": "Bread", "tags": ["food"], "max_stack_count": 5, "unit_weight": 0.3, "value": 2.0 },
        { "type_id": 5, "name": "Dagger", "tags": ["weapon"], "unit_weight": 0.8, "max_durability": 40.0,
          "stats": [{ "key": "damage", "base_value": 6.0 }] },
        { "type_id": 6, "name": "Ring of Might", "tags": ["ring"], "unit_weight": 0.05, "value": 120.0, "quality": 3,
          "modifiers": [
            { "target": "character", "stat_key": "dexterity", "kind": "percentage_add", "value": 0.1 }
          ],
          "effects": [
            { "name": "might",
              "triggers": [{ "type": "equipped" }],
              "actions": [{ "type": "modify_stat", "target": "character", "stat_key": "strength", "kind": "add", "value": 5.0 }] },
            { "name": "hum",
              "triggers": [{ "type": "event", "name": "rest" }],
              "actions": [{ "type": "log", "message": "the ring hums softly" }] }
          ] },
        { "type_id": 7, "name": "Leather Vest", "tags": ["armor"], "unit_weight": 2.0, "max_durability": 60.0,
          "modifiers": [{ "target": "parent", "stat_key": "armor", "kind": "add", "value": 4.0 }],
          "effects": [
            { "name": "wear",
              "triggers": [{ "type": "tick", "interval": 1.0 }],
              "actions": [{ "type": "adjust_durability", "delta": -5.0 }] }
          ] }
    ]
}"#;

/// Tag priorities used by the demo catalog
pub fn tags() -> TagRegistry {
    let mut tags = TagRegistry::new();
    tags.register("weapon", 1, "Weapons");
    tags.register("armor", 1, "Armor");
    tags.register("ammo", 2, "Ammunition");
    tags.register("food", 3, "Provisions");
    tags
}

/// What the session ended with
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub items: usize,
    pub events: usize,
    pub strength_equipped: f32,
    pub strength_unequipped: f32,
    pub dexterity: f32,
    pub armor: f32,
    pub carried_weight: f32,
    pub diagnostics: usize,
}

async fn spawn_stack<C: Catalog>(world: &mut ItemWorld, catalog: &C, type_id: ItemTypeId, count: u32) -> Result<ItemId> {
    let id = world
        .spawn_from(catalog, type_id)
        .await
        .with_context(|| format!("failed to spawn {type_id:?}"))?;
    world.set_stack_count(id, count)?;
    Ok(id)
}

fn stat(world: &ItemWorld, item: ItemId, key: &str) -> f32 {
    world.stat_value(item, key).unwrap_or_default()
}

fn log_contents(world: &ItemWorld, inventory: InventoryId, label: &str) {
    let Some(inv) = world.inventory(inventory) else {
        return;
    };
    for (index, id) in inv.iter() {
        if let Some(item) = world.item(id) {
            info!(index, locked = inv.is_locked(index), "{label}: {} x{}", item.name, item.stack_count());
        }
    }
}

pub async fn run<C: Catalog>(world: &mut ItemWorld, catalog: &C) -> Result<Summary> {
    let events = Rc::new(Cell::new(0usize));
    let counter = events.clone();
    let subscription = world.subscribe(move |event| {
        debug!(?event, "item event");
        counter.set(counter.get() + 1);
    });

    let hero = spawn_stack(world, catalog, HERO, 1).await?;
    let pack = spawn_stack(world, catalog, BACKPACK, 1).await?;
    world.plug(hero, "back", pack)?;
    let inv = world
        .item(pack)
        .and_then(|p| p.inventory())
        .context("backpack has no inventory")?;

    for (type_id, count) in [(ARROWS, 7), (BREAD, 2), (DAGGER, 1), (ARROWS, 16), (BREAD, 4)] {
        let id = spawn_stack(world, catalog, type_id, count).await?;
        world.add_item(inv, id)?;
    }
    world.set_locked(inv, 2, true)?;
    log_contents(world, inv, "before sort");

    world.sort_inventory(inv)?;
    log_contents(world, inv, "after sort");

    let arrows = world
        .find_type(inv, ARROWS)
        .into_iter()
        .next()
        .context("no arrows after sort")?;
    let split = world.split(catalog, arrows, 5).await?;
    world.add_item(inv, split)?;
    info!(
        kept = world.item(arrows).map(|i| i.stack_count()),
        split = world.item(split).map(|i| i.stack_count()),
        "split arrows"
    );

    let ring = spawn_stack(world, catalog, RING, 1).await?;
    world.plug(hero, "finger", ring)?;
    let vest = spawn_stack(world, catalog, VEST, 1).await?;
    world.plug(hero, "chest", vest)?;

    let well_rested = ModifierSource::External(Uuid::new_v4());
    world.add_modifier(hero, "strength", Modifier::add(2.0, well_rested))?;
    world.dispatch_event(hero, "rest")?;

    for _ in 0..3 {
        world.tick(1.0);
    }
    info!(durability = ?world.item(vest).and_then(|v| v.durability()), "vest after wear");

    let strength_equipped = stat(world, hero, "strength");
    let dexterity = stat(world, hero, "dexterity");
    let armor = stat(world, hero, "armor");
    info!(strength = strength_equipped, dexterity, armor, "equipped stats");
    if let Some(stats) = world.item(hero).and_then(|h| h.stats()) {
        debug!("hero stats: {}", serde_json::to_string(stats)?);
    }

    let carried_weight = world.total_weight(hero);
    info!(
        carried = carried_weight,
        backpack = world.inventory_weight(inv),
        "weights"
    );

    world.unplug(hero, "finger")?;
    let strength_unequipped = stat(world, hero, "strength");
    info!(strength = strength_unequipped, "ring removed");

    world.unsubscribe(subscription);
    let diagnostics = world.diagnostics().len();
    Ok(Summary {
        items: world.item_count(),
        events: events.get(),
        strength_equipped,
        strength_unequipped,
        dexterity,
        armor,
        carried_weight,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoard_items::{ItemConfig, StaticCatalog};

    #[tokio::test]
    async fn test_demo_session() {
        let catalog = StaticCatalog::from_json(CATALOG).unwrap();
        let mut world = ItemWorld::with_tags(ItemConfig::default(), tags());
        let summary = run(&mut world, &catalog).await.unwrap();

        assert_eq!(summary.strength_equipped, 17.0);
        assert_eq!(summary.strength_unequipped, 12.0);
        assert!((summary.dexterity - 8.8).abs() < 1e-4);
        assert_eq!(summary.armor, 4.0);
        assert!((summary.carried_weight - 7.3).abs() < 1e-3);
        // hero, pack, two arrow stacks plus the split, two bread stacks, dagger, ring, vest
        assert_eq!(summary.items, 10);
        assert_eq!(summary.diagnostics, 0);
        assert!(summary.events > 0);
    }

    #[tokio::test]
    async fn test_sort_respects_lock() {
        let catalog = StaticCatalog::from_json(CATALOG).unwrap();
        let mut world = ItemWorld::with_tags(ItemConfig::default(), tags());
        run(&mut world, &catalog).await.unwrap();

        let (_, dagger) = world.items().find(|(_, i)| i.type_id() == DAGGER).unwrap();
        let inv = dagger.in_inventory().unwrap();
        let bag = world.inventory(inv).unwrap();
        assert_eq!(bag.get(2).and_then(|id| world.item(id)).map(|i| i.type_id()), Some(DAGGER));
        let arrows: Vec<u32> = world
            .find_type(inv, ARROWS)
            .into_iter()
            .map(|id| world.item(id).unwrap().stack_count())
            .collect();
        assert_eq!(arrows.iter().sum::<u32>(), 23);
    }
}
