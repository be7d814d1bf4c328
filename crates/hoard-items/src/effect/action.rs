use std::fmt;

use tracing::{debug, info};

use crate::item::{ItemId, RelativeTarget};
use crate::stat::{Modifier, ModifierKey, ModifierKind, ModifierSource};
use crate::world::ItemWorld;

use super::EffectId;

/// What an action gets to work with
pub struct ActionContext<'a> {
    pub world: &'a mut ItemWorld,
    /// The item owning the effect
    pub item: ItemId,
    pub effect: EffectId,
}

/// Reacts to a trigger event that made it through the filters
pub trait Action: fmt::Debug {
    fn on_triggered(&mut self, _ctx: &mut ActionContext<'_>, _positive: bool) {}
    fn on_triggered_positive(&mut self, _ctx: &mut ActionContext<'_>) {}
    fn on_triggered_negative(&mut self, _ctx: &mut ActionContext<'_>) {}
    /// The owning item moved in the tree while its effects stayed active.
    /// Actions holding on to a relative target resolve it again here.
    fn on_tree_changed(&mut self, _ctx: &mut ActionContext<'_>) {}
}

/// Deliver a trigger event: `on_triggered`, then exactly one of the
/// positive/negative hooks
pub fn notify_triggered(action: &mut dyn Action, ctx: &mut ActionContext<'_>, positive: bool) {
    action.on_triggered(ctx, positive);
    if positive {
        action.on_triggered_positive(ctx);
    } else {
        action.on_triggered_negative(ctx);
    }
}

/// Attaches a modifier on positive, detaches it on negative
#[derive(Debug, Clone)]
pub struct ModifyStat {
    pub target: RelativeTarget,
    pub stat_key: String,
    pub kind: ModifierKind,
    pub value: f32,
    pub order: Option<i32>,
    applied: Option<(ItemId, ModifierKey)>,
    /// Between a positive and the matching negative
    engaged: bool,
}

impl ModifyStat {
    pub fn new(target: RelativeTarget, stat_key: impl Into<String>, kind: ModifierKind, value: f32) -> Self {
        Self {
            target,
            stat_key: stat_key.into(),
            kind,
            value,
            order: None,
            applied: None,
            engaged: false,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// The item and key of the live modifier, if attached
    pub fn applied(&self) -> Option<(ItemId, ModifierKey)> {
        self.applied
    }

    fn attach(&mut self, ctx: &mut ActionContext<'_>, target: ItemId) {
        let mut modifier = Modifier::new(self.kind, self.value, ModifierSource::Effect(ctx.effect));
        if let Some(order) = self.order {
            modifier = modifier.with_order(order);
        }
        match ctx.world.add_modifier(target, &self.stat_key, modifier) {
            Ok(key) => self.applied = Some((target, key)),
            Err(err) => ctx
                .world
                .report_configuration(&ctx.effect, format!("modify stat on {target:?}: {err}")),
        }
    }

    fn detach(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some((target, key)) = self.applied.take() {
            ctx.world.remove_modifier(target, &self.stat_key, key);
        }
    }
}

impl Action for ModifyStat {
    fn on_triggered_positive(&mut self, ctx: &mut ActionContext<'_>) {
        self.engaged = true;
        if self.applied.is_some() {
            return;
        }
        let Some(target) = ctx.world.resolve_target(ctx.item, self.target) else {
            debug!(item = ?ctx.item, target = ?self.target, "modify stat: no target");
            return;
        };
        self.attach(ctx, target);
    }

    fn on_triggered_negative(&mut self, ctx: &mut ActionContext<'_>) {
        self.engaged = false;
        self.detach(ctx);
    }

    fn on_tree_changed(&mut self, ctx: &mut ActionContext<'_>) {
        if !self.engaged {
            return;
        }
        let wanted = ctx.world.resolve_target(ctx.item, self.target);
        if self.applied.map(|(target, _)| target) == wanted {
            return;
        }
        self.detach(ctx);
        if let Some(target) = wanted {
            self.attach(ctx, target);
        }
    }
}

/// Changes the owning item's durability on positive triggers
#[derive(Debug, Clone, Copy)]
pub struct AdjustDurability {
    pub delta: f32,
}

impl Action for AdjustDurability {
    fn on_triggered_positive(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(current) = ctx.world.item(ctx.item).and_then(|i| i.durability()) else {
            return;
        };
        if let Err(err) = ctx.world.set_durability(ctx.item, current.current + self.delta) {
            debug!(item = ?ctx.item, %err, "adjust durability failed");
        }
    }
}

/// Removes `count` from the owning item's stack on positive triggers.
/// A stack consumed to zero destroys the item.
#[derive(Debug, Clone, Copy)]
pub struct ConsumeStack {
    pub count: u32,
}

impl Action for ConsumeStack {
    fn on_triggered_positive(&mut self, ctx: &mut ActionContext<'_>) {
        let Some(current) = ctx.world.item(ctx.item).map(|i| i.stack_count()) else {
            return;
        };
        let remaining = current.saturating_sub(self.count);
        if let Err(err) = ctx.world.set_stack_count(ctx.item, remaining) {
            debug!(item = ?ctx.item, %err, "consume stack failed");
        }
    }
}

/// Logs a message on every trigger
#[derive(Debug, Clone)]
pub struct LogMessage {
    pub message: String,
}

impl LogMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Action for LogMessage {
    fn on_triggered(&mut self, ctx: &mut ActionContext<'_>, positive: bool) {
        info!(item = ?ctx.item, effect = ?ctx.effect, positive, "{}", self.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemTemplate;
    use crate::item::ItemTypeId;
    use hoard_core::ItemConfig;

    #[derive(Debug, Default)]
    struct Recorder(Vec<&'static str>);

    impl Action for Recorder {
        fn on_triggered(&mut self, _ctx: &mut ActionContext<'_>, positive: bool) {
            self.0.push(if positive { "any+" } else { "any-" });
        }
        fn on_triggered_positive(&mut self, _ctx: &mut ActionContext<'_>) {
            self.0.push("positive");
        }
        fn on_triggered_negative(&mut self, _ctx: &mut ActionContext<'_>) {
            self.0.push("negative");
        }
    }

    #[test]
    fn notify_calls_both_hooks() {
        let mut world = ItemWorld::new(ItemConfig::default());
        let item = world.spawn(&ItemTemplate::new(ItemTypeId(1), "Charm"));
        let mut ctx = ActionContext {
            world: &mut world,
            item,
            effect: EffectId(0),
        };
        let mut rec = Recorder::default();
        notify_triggered(&mut rec, &mut ctx, true);
        notify_triggered(&mut rec, &mut ctx, false);
        assert_eq!(rec.0, vec!["any+", "positive", "any-", "negative"]);
    }

    #[test]
    fn modify_stat_is_idempotent() {
        let mut world = ItemWorld::new(ItemConfig::default());
        let item = world.spawn(&ItemTemplate::new(ItemTypeId(1), "Charm").stat("luck", 1.0));
        let mut ctx = ActionContext {
            world: &mut world,
            item,
            effect: EffectId(0),
        };
        let mut action = ModifyStat::new(RelativeTarget::SelfItem, "luck", ModifierKind::Add, 2.0);
        notify_triggered(&mut action, &mut ctx, true);
        notify_triggered(&mut action, &mut ctx, true);
        assert_eq!(world.stat_value(item, "luck"), Some(3.0));

        let mut ctx = ActionContext {
            world: &mut world,
            item,
            effect: EffectId(0),
        };
        notify_triggered(&mut action, &mut ctx, false);
        assert!(action.applied().is_none());
        assert_eq!(world.stat_value(item, "luck"), Some(1.0));
    }

    #[test]
    fn modify_missing_stat_is_reported() {
        let mut world = ItemWorld::new(ItemConfig::default());
        let item = world.spawn(&ItemTemplate::new(ItemTypeId(1), "Charm"));
        let mut ctx = ActionContext {
            world: &mut world,
            item,
            effect: EffectId(0),
        };
        let mut action = ModifyStat::new(RelativeTarget::SelfItem, "luck", ModifierKind::Add, 2.0);
        notify_triggered(&mut action, &mut ctx, true);
        assert!(action.applied().is_none());
        assert_eq!(world.diagnostics().count(hoard_core::DiagnosticKind::Configuration), 1);
    }
}
