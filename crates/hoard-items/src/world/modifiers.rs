//! Stat mutation and modifier descriptions

use super::ItemWorld;
use crate::error::ItemError;
use crate::events::ItemEvent;
use crate::item::{ItemId, RelativeTarget};
use crate::stat::{AppliedModifier, Modifier, ModifierKey, ModifierSource};

impl ItemWorld {
    /// Attach a modifier to a stat
    pub fn add_modifier(&mut self, item: ItemId, stat_key: &str, modifier: Modifier) -> Result<ModifierKey, ItemError> {
        let stat = self
            .items
            .get_mut(item)
            .ok_or(ItemError::ItemNotFound(item))?
            .stats
            .as_mut()
            .and_then(|s| s.get_mut(stat_key))
            .ok_or_else(|| ItemError::StatNotFound {
                item,
                key: stat_key.to_string(),
            })?;
        let key = stat.add_modifier(modifier);
        self.emit(ItemEvent::StatDirty {
            item,
            key: stat_key.to_string(),
        });
        Ok(key)
    }

    /// Detach a modifier. Returns `false` if it wasn't attached.
    pub fn remove_modifier(&mut self, item: ItemId, stat_key: &str, key: ModifierKey) -> bool {
        let removed = self
            .items
            .get_mut(item)
            .and_then(|i| i.stats.as_mut())
            .and_then(|s| s.get_mut(stat_key))
            .and_then(|stat| stat.remove_modifier(key))
            .is_some();
        if removed {
            self.emit(ItemEvent::StatDirty {
                item,
                key: stat_key.to_string(),
            });
        }
        removed
    }

    pub fn set_modifier_value(&mut self, item: ItemId, stat_key: &str, key: ModifierKey, value: f32) -> bool {
        let changed = self
            .items
            .get_mut(item)
            .and_then(|i| i.stats.as_mut())
            .and_then(|s| s.get_mut(stat_key))
            .is_some_and(|stat| stat.set_modifier_value(key, value));
        if changed {
            self.emit(ItemEvent::StatDirty {
                item,
                key: stat_key.to_string(),
            });
        }
        changed
    }

    /// Remove every modifier `source` owns on `item`. Returns the number removed.
    pub fn remove_modifiers_from_source(&mut self, item: ItemId, source: ModifierSource) -> usize {
        let Some(stats) = self.items.get_mut(item).and_then(|i| i.stats.as_mut()) else {
            return 0;
        };
        let mut removed = 0;
        let mut touched = Vec::new();
        for key in stats.iter().map(|s| s.key().to_string()).collect::<Vec<_>>() {
            if let Some(stat) = stats.get_mut(&key) {
                let count = stat.remove_all_from_source(source);
                if count > 0 {
                    removed += count;
                    touched.push(key);
                }
            }
        }
        for key in touched {
            self.emit(ItemEvent::StatDirty { item, key });
        }
        removed
    }

    pub fn set_base_value(&mut self, item: ItemId, stat_key: &str, value: f32) -> Result<(), ItemError> {
        let stat = self
            .items
            .get_mut(item)
            .ok_or(ItemError::ItemNotFound(item))?
            .stats
            .as_mut()
            .and_then(|s| s.get_mut(stat_key))
            .ok_or_else(|| ItemError::StatNotFound {
                item,
                key: stat_key.to_string(),
            })?;
        if stat.set_base_value(value) {
            self.emit(ItemEvent::StatDirty {
                item,
                key: stat_key.to_string(),
            });
        }
        Ok(())
    }

    /// Bring every description on `item` in line with where it sits now.
    ///
    /// A description applies when the item isn't broken or being destroyed,
    /// its target resolves and carries the stat, and (for parent/character
    /// targets) the item's effects are active.
    pub(crate) fn refresh_descriptions(&mut self, item: ItemId) {
        let Some(it) = self.items.get(item) else {
            return;
        };
        let blocked = it.is_broken() || it.being_destroyed;
        let active = it.effects_active;
        let count = it.descriptions.len();

        for index in 0..count {
            let Some(entry) = self.items.get(item).and_then(|i| i.descriptions.get(index)) else {
                break;
            };
            let description = entry.description.clone();
            let applied = entry.applied;

            let wanted = if blocked || (description.target != RelativeTarget::SelfItem && !active) {
                None
            } else {
                self.resolve_target(item, description.target)
            };
            let wanted = match wanted {
                Some(target) if self.items.get(target).is_some_and(|t| t.has_stat(&description.stat_key)) => {
                    Some(target)
                }
                Some(target) => {
                    self.report_configuration(
                        &item,
                        format!("modifier description targets {target:?}, which has no stat '{}'", description.stat_key),
                    );
                    None
                }
                None => None,
            };

            if let (Some(current), Some(target)) = (applied, wanted) {
                if current.target == target {
                    continue;
                }
            }
            if let Some(current) = applied {
                self.remove_modifier(current.target, &description.stat_key, current.key);
                self.set_applied(item, index, None);
            }
            if let Some(target) = wanted {
                let modifier = description.to_modifier(ModifierSource::Description { item, index });
                if let Ok(key) = self.add_modifier(target, &description.stat_key, modifier) {
                    self.set_applied(item, index, Some(AppliedModifier { target, key }));
                }
            }
        }
    }

    fn set_applied(&mut self, item: ItemId, index: usize, applied: Option<AppliedModifier>) {
        if let Some(entry) = self
            .items
            .get_mut(item)
            .and_then(|i| i.descriptions.get_mut(index))
        {
            entry.applied = applied;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemTemplate;
    use crate::item::{ItemTypeId, Slot};
    use crate::stat::{ModifierDescription, ModifierKind};
    use hoard_core::DiagnosticKind;
    use uuid::Uuid;

    fn make_hero(world: &mut ItemWorld) -> ItemId {
        world.spawn(
            &ItemTemplate::new(ItemTypeId(1), "Hero")
                .character()
                .stat("armor", 10.0)
                .slot(Slot::new("body"))
                .inventory(4),
        )
    }

    fn make_vest(world: &mut ItemWorld) -> ItemId {
        world.spawn(
            &ItemTemplate::new(ItemTypeId(2), "Vest")
                .durability(10.0)
                .stat("armor", 5.0)
                .modifier(ModifierDescription::new(
                    RelativeTarget::Character,
                    "armor",
                    ModifierKind::Add,
                    5.0,
                ))
                .modifier(ModifierDescription::new(
                    RelativeTarget::SelfItem,
                    "armor",
                    ModifierKind::PercentageAdd,
                    1.0,
                )),
        )
    }

    #[test]
    fn test_self_description_always_applies() {
        let mut world = ItemWorld::default();
        let vest = make_vest(&mut world);
        assert_eq!(world.stat_value(vest, "armor"), Some(10.0));
    }

    #[test]
    fn test_character_description_follows_equip() {
        let mut world = ItemWorld::default();
        let hero = make_hero(&mut world);
        let vest = make_vest(&mut world);
        assert_eq!(world.stat_value(hero, "armor"), Some(10.0));

        world.plug(hero, "body", vest).unwrap();
        assert_eq!(world.stat_value(hero, "armor"), Some(15.0));

        // In the backpack the vest isn't worn
        world.unplug(hero, "body").unwrap();
        let inv = world.item(hero).unwrap().inventory().unwrap();
        world.add_item(inv, vest).unwrap();
        assert_eq!(world.stat_value(hero, "armor"), Some(10.0));
    }

    #[test]
    fn test_broken_item_drops_modifiers() {
        let mut world = ItemWorld::default();
        let hero = make_hero(&mut world);
        let vest = make_vest(&mut world);
        world.plug(hero, "body", vest).unwrap();

        world.set_durability(vest, 0.0).unwrap();
        assert_eq!(world.stat_value(hero, "armor"), Some(10.0));
        assert_eq!(world.stat_value(vest, "armor"), Some(5.0));

        world.set_durability(vest, 3.0).unwrap();
        assert_eq!(world.stat_value(hero, "armor"), Some(15.0));
        assert_eq!(world.stat_value(vest, "armor"), Some(10.0));
    }

    #[test]
    fn test_missing_target_stat_reported() {
        let mut world = ItemWorld::default();
        let hero = world.spawn(&ItemTemplate::new(ItemTypeId(1), "Ghost").character().slot(Slot::new("body")));
        let vest = make_vest(&mut world);
        world.plug(hero, "body", vest).unwrap();
        assert!(world.diagnostics().count(DiagnosticKind::Configuration) >= 1);
    }

    #[test]
    fn test_external_source_removal() {
        let mut world = ItemWorld::default();
        let hero = make_hero(&mut world);
        let buff = ModifierSource::External(Uuid::new_v4());
        world
            .add_modifier(hero, "armor", Modifier::add(4.0, buff))
            .unwrap();
        world
            .add_modifier(hero, "armor", Modifier::percentage_multiply(0.5, buff))
            .unwrap();
        assert_eq!(world.stat_value(hero, "armor"), Some(21.0));
        assert_eq!(world.remove_modifiers_from_source(hero, buff), 2);
        assert_eq!(world.stat_value(hero, "armor"), Some(10.0));
    }

    #[test]
    fn test_set_base_value() {
        let mut world = ItemWorld::default();
        let hero = make_hero(&mut world);
        world.set_base_value(hero, "armor", 12.0).unwrap();
        assert_eq!(world.stat_value(hero, "armor"), Some(12.0));
        assert!(matches!(
            world.set_base_value(hero, "speed", 1.0),
            Err(ItemError::StatNotFound { .. })
        ));
    }
}
