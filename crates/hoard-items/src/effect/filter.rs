use std::fmt;

use crate::item::{ItemId, RelativeTarget};
use crate::world::ItemWorld;

use super::EffectId;

/// What a filter gets to look at
pub struct FilterContext<'a> {
    pub world: &'a ItemWorld,
    /// The item owning the effect
    pub item: ItemId,
    pub effect: EffectId,
    pub positive: bool,
}

/// A gate between a trigger and its actions
pub trait Filter: fmt::Debug {
    fn evaluate(&self, ctx: &FilterContext<'_>) -> bool;
}

/// Passes when the target item carries a tag
#[derive(Debug, Clone)]
pub struct HasTag {
    pub target: RelativeTarget,
    pub tag: String,
}

impl HasTag {
    pub fn new(target: RelativeTarget, tag: impl Into<String>) -> Self {
        Self {
            target,
            tag: tag.into(),
        }
    }
}

impl Filter for HasTag {
    fn evaluate(&self, ctx: &FilterContext<'_>) -> bool {
        ctx.world
            .resolve_target(ctx.item, self.target)
            .and_then(|id| ctx.world.item(id))
            .is_some_and(|item| item.has_tag(&self.tag))
    }
}

/// Passes while durability is above a fraction of its maximum.
/// Items without durability always pass.
#[derive(Debug, Clone, Copy)]
pub struct DurabilityAbove {
    pub fraction: f32,
}

impl Filter for DurabilityAbove {
    fn evaluate(&self, ctx: &FilterContext<'_>) -> bool {
        match ctx.world.item(ctx.item).and_then(|i| i.durability()) {
            Some(durability) => durability.fraction() > self.fraction,
            None => true,
        }
    }
}

/// Passes when a stat on the target resolves to at least `value`
#[derive(Debug, Clone)]
pub struct StatAtLeast {
    pub target: RelativeTarget,
    pub stat_key: String,
    pub value: f32,
}

impl Filter for StatAtLeast {
    fn evaluate(&self, ctx: &FilterContext<'_>) -> bool {
        ctx.world
            .resolve_target(ctx.item, self.target)
            .and_then(|id| ctx.world.item(id))
            .and_then(|item| item.stat_value(&self.stat_key))
            .is_some_and(|v| v >= self.value)
    }
}

/// Passes with the given probability
#[derive(Debug, Clone, Copy)]
pub struct Chance {
    pub probability: f32,
}

impl Filter for Chance {
    fn evaluate(&self, _ctx: &FilterContext<'_>) -> bool {
        rand::random::<f32>() < self.probability
    }
}

/// Inverts another filter
#[derive(Debug)]
pub struct Not(pub Box<dyn Filter>);

impl Filter for Not {
    fn evaluate(&self, ctx: &FilterContext<'_>) -> bool {
        !self.0.evaluate(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemTemplate;
    use crate::item::ItemTypeId;
    use hoard_core::ItemConfig;

    fn ctx(world: &ItemWorld, item: ItemId) -> FilterContext<'_> {
        FilterContext {
            world,
            item,
            effect: EffectId(0),
            positive: true,
        }
    }

    #[test]
    fn has_tag_and_not() {
        let mut world = ItemWorld::new(ItemConfig::default());
        let sword = world.spawn(&ItemTemplate::new(ItemTypeId(1), "Sword").tag("weapon"));
        let c = ctx(&world, sword);
        assert!(HasTag::new(RelativeTarget::SelfItem, "weapon").evaluate(&c));
        assert!(!HasTag::new(RelativeTarget::Parent, "weapon").evaluate(&c));
        assert!(Not(Box::new(HasTag::new(RelativeTarget::SelfItem, "food"))).evaluate(&c));
    }

    #[test]
    fn stat_threshold() {
        let mut world = ItemWorld::new(ItemConfig::default());
        let sword = world.spawn(&ItemTemplate::new(ItemTypeId(1), "Sword").stat("damage", 12.0));
        let c = ctx(&world, sword);
        let at_least = |value| StatAtLeast {
            target: RelativeTarget::SelfItem,
            stat_key: "damage".into(),
            value,
        };
        assert!(at_least(12.0).evaluate(&c));
        assert!(!at_least(12.5).evaluate(&c));
    }

    #[test]
    fn chance_extremes() {
        let mut world = ItemWorld::new(ItemConfig::default());
        let coin = world.spawn(&ItemTemplate::new(ItemTypeId(1), "Coin"));
        let c = ctx(&world, coin);
        assert!(Chance { probability: 1.0 }.evaluate(&c));
        assert!(!Chance { probability: 0.0 }.evaluate(&c));
    }

    #[test]
    fn durability_fraction() {
        let mut world = ItemWorld::new(ItemConfig::default());
        let helmet = world.spawn(&ItemTemplate::new(ItemTypeId(1), "Helmet").durability(100.0));
        world.set_durability(helmet, 40.0).unwrap();
        let c = ctx(&world, helmet);
        assert!(DurabilityAbove { fraction: 0.25 }.evaluate(&c));
        assert!(!DurabilityAbove { fraction: 0.5 }.evaluate(&c));
    }
}
