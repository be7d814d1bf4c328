//! End-to-end scenarios through the public item world API

use std::cell::RefCell;
use std::rc::Rc;

use hoard_items::{
    ActionTemplate, CatalogError, DiagnosticKind, EffectTemplate, ItemConfig, ItemError, ItemEvent, ItemId,
    ItemTemplate, ItemTypeId, ItemWorld, Modifier, ModifierDescription, ModifierKind, ModifierSource,
    RelativeTarget, Slot, StaticCatalog, TagRegistry, TriggerKind,
};
use uuid::Uuid;

const CATALOG: &str = r#"{
    "items": [
        { "type_id": 1, "name": "Adventurer", "is_character": true,
          "stats": [{ "key": "strength", "base_value": 10.0 }, { "key": "armor", "base_value": 0.0 }],
          "slots": [{ "key": "finger", "required_tags": ["ring"] }, { "key": "back", "required_tags": ["bag"] }] },
        { "type_id": 2, "name": "Backpack", "tags": ["bag"], "unit_weight": 1.5, "inventory": { "capacity": 6 } },
        { "type_id": 3, "name": "Arrows", "tags": ["ammo"], "max_stack_count": 10, "unit_weight": 0.1 },
        { "type_id": 4, "name": "Ring of Might", "tags": ["ring"], "unit_weight": 0.05,
          "modifiers": [{ "target": "character", "stat_key": "strength", "kind": "add", "value": 5.0 }] },
        { "type_id": 5, "name": "Dagger", "tags": ["weapon"], "unit_weight": 0.8 }
    ]
}"#;

fn world() -> ItemWorld {
    let mut tags = TagRegistry::new();
    tags.register("weapon", 1, "Weapons");
    tags.register("ammo", 2, "Ammunition");
    ItemWorld::with_tags(ItemConfig::default(), tags)
}

fn catalog() -> StaticCatalog {
    StaticCatalog::from_json(CATALOG).unwrap()
}

fn counts(world: &ItemWorld, ids: &[ItemId]) -> Vec<u32> {
    ids.iter().map(|id| world.item(*id).unwrap().stack_count()).collect()
}

#[tokio::test]
async fn test_character_loadout() {
    let catalog = catalog();
    let mut world = world();
    let hero = world.spawn_from(&catalog, ItemTypeId(1)).await.unwrap();
    let pack = world.spawn_from(&catalog, ItemTypeId(2)).await.unwrap();
    let ring = world.spawn_from(&catalog, ItemTypeId(4)).await.unwrap();

    assert_eq!(world.stat_value(hero, "strength"), Some(10.0));
    world.plug(hero, "finger", ring).unwrap();
    assert_eq!(world.stat_value(hero, "strength"), Some(15.0));

    world.plug(hero, "back", pack).unwrap();
    let inv = world.item(pack).unwrap().inventory().unwrap();
    let arrows = world.spawn(&catalog.get(ItemTypeId(3)).unwrap().clone().stack(8));
    world.add_item(inv, arrows).unwrap();

    assert_eq!(world.get_root(arrows), hero);
    assert_eq!(world.character_item(arrows), Some(hero));
    let expected = 1.5 + 0.05 + 0.8;
    assert!((world.total_weight(hero) - expected).abs() < 1e-4);

    world.unplug(hero, "finger").unwrap();
    assert_eq!(world.stat_value(hero, "strength"), Some(10.0));
    assert!(world.diagnostics().is_empty());
}

#[test]
fn test_slot_rejects_wrong_tag() {
    let catalog = catalog();
    let mut world = world();
    let hero = world.spawn(catalog.get(ItemTypeId(1)).unwrap());
    let dagger = world.spawn(catalog.get(ItemTypeId(5)).unwrap());
    assert!(matches!(
        world.plug(hero, "finger", dagger),
        Err(ItemError::SlotRejected { .. })
    ));
    assert_eq!(world.item(dagger).unwrap().plugged_into(), None);
}

#[test]
fn test_merge_four_and_nine() {
    let catalog = catalog();
    let mut world = world();
    let arrows = catalog.get(ItemTypeId(3)).unwrap().clone();
    let a = world.spawn(&arrows.clone().stack(4));
    let b = world.spawn(&arrows.stack(9));
    let merged = world.merge_stacks(vec![a, b]);
    assert_eq!(counts(&world, &merged), vec![10, 3]);
    assert_eq!(world.item_count(), 2);
}

#[test]
fn test_sort_with_locked_slots() {
    let catalog = catalog();
    let mut world = world();
    let pack = world.spawn(catalog.get(ItemTypeId(2)).unwrap());
    let inv = world.item(pack).unwrap().inventory().unwrap();
    let arrows = catalog.get(ItemTypeId(3)).unwrap().clone();

    let ring = world.spawn(catalog.get(ItemTypeId(4)).unwrap());
    let a = world.spawn(&arrows.clone().stack(4));
    let dagger = world.spawn(catalog.get(ItemTypeId(5)).unwrap());
    let b = world.spawn(&arrows.stack(9));
    world.add_at(inv, ring, 0).unwrap();
    world.add_at(inv, a, 1).unwrap();
    world.add_at(inv, dagger, 2).unwrap();
    world.add_at(inv, b, 4).unwrap();
    world.set_locked(inv, 0, true).unwrap();
    world.set_locked(inv, 2, true).unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    world.subscribe(move |e| {
        if let ItemEvent::ContentChanged { .. } = e {
            sink.borrow_mut().push(e.clone());
        }
    });
    world.sort_inventory(inv).unwrap();

    let bag = world.inventory(inv).unwrap();
    assert_eq!(bag.get(0), Some(ring));
    assert_eq!(bag.get(2), Some(dagger));
    let stacks: Vec<u32> = bag
        .items()
        .into_iter()
        .filter(|id| world.item(*id).unwrap().type_id() == ItemTypeId(3))
        .map(|id| world.item(id).unwrap().stack_count())
        .collect();
    assert_eq!(stacks.iter().sum::<u32>(), 13);
    assert_eq!(stacks.len(), 2);
    assert_eq!(
        *events.borrow(),
        vec![ItemEvent::ContentChanged { inventory: inv, index: None }]
    );
}

#[test]
fn test_cycles_are_refused() {
    let catalog = catalog();
    let mut world = world();
    let outer = world.spawn(catalog.get(ItemTypeId(2)).unwrap());
    let inner = world.spawn(catalog.get(ItemTypeId(2)).unwrap());
    let outer_inv = world.item(outer).unwrap().inventory().unwrap();
    let inner_inv = world.item(inner).unwrap().inventory().unwrap();

    world.add_item(outer_inv, inner).unwrap();
    assert!(matches!(
        world.add_item(inner_inv, outer),
        Err(ItemError::WouldCreateCycle { .. })
    ));
    assert!(matches!(
        world.add_item(outer_inv, outer),
        Err(ItemError::WouldCreateCycle { .. })
    ));
    assert_eq!(world.get_all_children(outer, true, true), vec![inner]);
    assert_eq!(world.get_all_parents(inner, true), vec![outer]);
}

#[test]
fn test_parent_exclusivity() {
    let catalog = catalog();
    let mut world = world();
    let hero = world.spawn(catalog.get(ItemTypeId(1)).unwrap());
    let pack = world.spawn(catalog.get(ItemTypeId(2)).unwrap());
    let ring = world.spawn(catalog.get(ItemTypeId(4)).unwrap());
    let inv = world.item(pack).unwrap().inventory().unwrap();
    world.add_item(inv, ring).unwrap();

    assert_eq!(world.plug(hero, "finger", ring), Err(ItemError::AlreadyParented(ring)));
    assert_eq!(world.diagnostics().count(DiagnosticKind::Configuration), 1);
    assert_eq!(world.parent_item(ring), Some(pack));
    assert_eq!(world.stat_value(hero, "strength"), Some(10.0));
}

#[test]
fn test_percentage_batching() {
    let mut world = world();
    let hero = world.spawn(&ItemTemplate::new(ItemTypeId(1), "Hero").character().stat("damage", 100.0));
    let rage = ModifierSource::External(Uuid::new_v4());
    world.add_modifier(hero, "damage", Modifier::percentage_add(0.10, rage)).unwrap();
    world.add_modifier(hero, "damage", Modifier::percentage_add(0.05, rage)).unwrap();
    assert!((world.stat_value(hero, "damage").unwrap() - 115.0).abs() < 1e-3);

    let focus = ModifierSource::External(Uuid::new_v4());
    world
        .add_modifier(hero, "damage", Modifier::percentage_add(0.05, focus).with_order(150))
        .unwrap();
    assert!((world.stat_value(hero, "damage").unwrap() - 120.75).abs() < 1e-3);

    assert_eq!(world.remove_modifiers_from_source(hero, rage), 2);
    assert!((world.stat_value(hero, "damage").unwrap() - 105.0).abs() < 1e-3);
}

#[test]
fn test_broken_armor_stops_buffing() {
    let mut world = world();
    let hero = world.spawn(
        &ItemTemplate::new(ItemTypeId(1), "Hero")
            .character()
            .stat("armor", 0.0)
            .slot(Slot::new("chest")),
    );
    let vest = world.spawn(
        &ItemTemplate::new(ItemTypeId(7), "Vest")
            .durability(50.0)
            .modifier(ModifierDescription::new(
                RelativeTarget::Parent,
                "armor",
                ModifierKind::Add,
                12.0,
            ))
            .effect(
                EffectTemplate::new("padding")
                    .trigger(TriggerKind::Equipped)
                    .action(ActionTemplate::ModifyStat {
                        target: RelativeTarget::Parent,
                        stat_key: "armor".into(),
                        kind: ModifierKind::PercentageAdd,
                        value: 0.5,
                        order: None,
                    }),
            ),
    );

    world.plug(hero, "chest", vest).unwrap();
    assert_eq!(world.stat_value(hero, "armor"), Some(18.0));

    world.set_durability(vest, 0.0).unwrap();
    assert!(!world.item(vest).unwrap().effects_active());
    assert_eq!(world.stat_value(hero, "armor"), Some(0.0));

    world.set_durability(vest, 50.0).unwrap();
    assert_eq!(world.stat_value(hero, "armor"), Some(18.0));
}

#[tokio::test]
async fn test_split_through_catalog() {
    let catalog = catalog();
    let mut world = world();
    let pack = world.spawn_from(&catalog, ItemTypeId(2)).await.unwrap();
    let inv = world.item(pack).unwrap().inventory().unwrap();
    let arrows = world.spawn(&catalog.get(ItemTypeId(3)).unwrap().clone().stack(9));
    world.add_item(inv, arrows).unwrap();

    let split = world.split(&catalog, arrows, 4).await.unwrap();
    assert_eq!(counts(&world, &[arrows, split]), vec![5, 4]);
    assert_eq!(world.item(split).unwrap().in_inventory(), None);

    world.add_item(inv, split).unwrap();
    assert!((world.inventory_weight(inv) - 0.9).abs() < 1e-4);
}

#[tokio::test]
async fn test_split_rolls_back_on_catalog_failure() {
    let mut world = world();
    let arrows = world.spawn(&ItemTemplate::new(ItemTypeId(3), "Arrows").stackable(10).stack(6));
    let empty = StaticCatalog::new();

    let result = world.split(&empty, arrows, 2).await;
    assert_eq!(result, Err(ItemError::Catalog(CatalogError::NotConfigured)));
    assert_eq!(world.item(arrows).unwrap().stack_count(), 6);
    assert_eq!(world.item_count(), 1);
}

#[test]
fn test_destroy_tree_removes_everything() {
    let catalog = catalog();
    let mut world = world();
    let hero = world.spawn(catalog.get(ItemTypeId(1)).unwrap());
    let pack = world.spawn(catalog.get(ItemTypeId(2)).unwrap());
    let ring = world.spawn(catalog.get(ItemTypeId(4)).unwrap());
    world.plug(hero, "back", pack).unwrap();
    let inv = world.item(pack).unwrap().inventory().unwrap();
    world.add_item(inv, ring).unwrap();

    let destroyed = Rc::new(RefCell::new(Vec::new()));
    let sink = destroyed.clone();
    world.subscribe(move |e| {
        if let ItemEvent::Destroyed { item } = e {
            sink.borrow_mut().push(*item);
        }
    });

    world.destroy_tree(hero);
    assert_eq!(world.item_count(), 0);
    assert!(world.inventory(inv).is_none());
    assert_eq!(destroyed.borrow().last(), Some(&hero));
    assert_eq!(destroyed.borrow().len(), 3);
}
