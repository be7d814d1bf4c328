//! Effect dispatch, activity and durability

use std::mem;

use tracing::debug;

use super::ItemWorld;
use crate::effect::{
    notify_triggered, ActionContext, ComponentId, Delivery, Effect, EffectId, EffectTemplate, FilterContext,
    TriggerKind,
};
use crate::error::ItemError;
use crate::events::ItemEvent;
use crate::item::ItemId;

impl ItemWorld {
    /// Build an effect from a template and attach it to an item
    pub fn add_effect(&mut self, item: ItemId, template: &EffectTemplate) -> Result<EffectId, ItemError> {
        self.get(item)?;
        let effect = template.build(self.allocate_effect_id());
        self.attach_effect(item, effect)
    }

    /// An empty effect with a fresh id, to be filled in and attached
    pub fn new_effect(&mut self, name: impl Into<String>) -> Effect {
        Effect::new(self.allocate_effect_id(), name)
    }

    /// Attach a hand-built effect. Its components are validated.
    pub fn attach_effect(&mut self, item: ItemId, effect: Effect) -> Result<EffectId, ItemError> {
        let id = effect.id();
        let equipped = effect.has_trigger(|k| matches!(k, TriggerKind::Equipped));
        let it = self.items.get_mut(item).ok_or(ItemError::ItemNotFound(item))?;
        it.effects.push(effect);
        let active = it.effects_active;
        self.validate_effects(item);
        if active && equipped {
            self.run_effect(item, id, true, true);
        }
        Ok(id)
    }

    /// Report configuration problems in an item's effects. Returns how many were found.
    pub fn validate_effects(&self, item: ItemId) -> usize {
        let Some(it) = self.items.get(item) else {
            return 0;
        };
        let mut found = 0;
        for effect in &it.effects {
            for problem in effect.validate() {
                self.report_configuration(&item, problem);
                found += 1;
            }
        }
        found
    }

    /// Fire one trigger. Returns whether the actions ran.
    pub fn fire_trigger(
        &mut self,
        item: ItemId,
        effect: EffectId,
        trigger: ComponentId,
        positive: bool,
    ) -> Result<bool, ItemError> {
        let e = self
            .get(item)?
            .effect(effect)
            .ok_or(ItemError::EffectNotFound { item, effect })?;
        let component = e
            .triggers()
            .iter()
            .find(|t| t.id() == trigger)
            .ok_or(ItemError::ComponentNotFound {
                effect,
                component: trigger,
            })?;
        if !component.is_live_in(effect) {
            return Ok(false);
        }
        Ok(self.run_effect(item, effect, positive, true))
    }

    /// Filters, then actions. Skipped when the effect is disabled, or when
    /// `require_active` is set and the item's effects are inactive.
    pub(crate) fn run_effect(&mut self, item: ItemId, effect: EffectId, positive: bool, require_active: bool) -> bool {
        {
            let Some(it) = self.items.get(item) else {
                return false;
            };
            if require_active && !it.effects_active {
                return false;
            }
            let Some(e) = it.effect(effect) else {
                return false;
            };
            if !e.is_enabled() {
                return false;
            }
            let ctx = FilterContext {
                world: &*self,
                item,
                effect,
                positive,
            };
            if !e.passes_filters(&ctx) {
                debug!(item = ?item, effect = ?effect, positive, "filtered out");
                return false;
            }
        }

        self.deliver(item, effect, Delivery::Trigger { positive });
        true
    }

    /// Hand `delivery` to every live action of the effect. Actions are taken
    /// out while they run so they can borrow the world; anything delivered to
    /// the same effect meanwhile is queued and replayed once they are back.
    fn deliver(&mut self, item: ItemId, effect: EffectId, delivery: Delivery) {
        let Some(e) = self.items.get_mut(item).and_then(|i| i.effect_mut(effect)) else {
            return;
        };
        if e.running {
            e.deferred.push(delivery);
            return;
        }
        let mut actions = mem::take(&mut e.actions);
        e.running = true;
        {
            let mut ctx = ActionContext {
                world: self,
                item,
                effect,
            };
            for action in actions.iter_mut().filter(|a| a.is_live_in(effect)) {
                match delivery {
                    Delivery::Trigger { positive } => notify_triggered(action.inner.as_mut(), &mut ctx, positive),
                    Delivery::TreeChanged => action.inner.on_tree_changed(&mut ctx),
                }
            }
        }

        let Some(e) = self.items.get_mut(item).and_then(|i| i.effect_mut(effect)) else {
            // The item was destroyed by its own actions; they still owe a negative
            let mut ctx = ActionContext {
                world: self,
                item,
                effect,
            };
            for action in actions.iter_mut().filter(|a| a.is_live_in(effect)) {
                notify_triggered(action.inner.as_mut(), &mut ctx, false);
            }
            return;
        };
        let added = mem::replace(&mut e.actions, actions);
        e.actions.extend(added);
        e.running = false;
        let deferred = mem::take(&mut e.deferred);
        for next in deferred {
            self.deliver(item, effect, next);
        }
    }

    /// Fire every effect on `item` that has an enabled trigger matching `pred`
    fn fire_matching(&mut self, item: ItemId, pred: impl Fn(&TriggerKind) -> bool, positive: bool) -> usize {
        let ids: Vec<EffectId> = match self.items.get(item) {
            Some(it) => it
                .effects
                .iter()
                .filter(|e| e.has_trigger(&pred))
                .map(Effect::id)
                .collect(),
            None => return 0,
        };
        ids.into_iter()
            .filter(|id| self.run_effect(item, *id, positive, true))
            .count()
    }

    /// Use an item: fires its `Used` triggers. Returns how many effects ran.
    pub fn use_item(&mut self, item: ItemId) -> Result<usize, ItemError> {
        self.get(item)?;
        Ok(self.fire_matching(item, |k| matches!(k, TriggerKind::Used), true))
    }

    /// Fire `Event { name }` triggers on the item and everything below it
    pub fn dispatch_event(&mut self, item: ItemId, name: &str) -> Result<usize, ItemError> {
        self.get(item)?;
        let mut ran = 0;
        for id in self.get_all_children(item, true, false) {
            ran += self.fire_matching(id, |k| matches!(k, TriggerKind::Event { name: n } if n == name), true);
        }
        Ok(ran)
    }

    /// Advance tick triggers on every item with active effects
    pub fn tick(&mut self, dt: f32) -> usize {
        let mut due = Vec::new();
        for id in self.items.handles() {
            let Some(it) = self.items.get_mut(id) else {
                continue;
            };
            if !it.effects_active {
                continue;
            }
            for effect in it.effects.iter_mut().filter(|e| e.enabled) {
                let eid = effect.id();
                let fired = effect
                    .triggers
                    .iter_mut()
                    .filter(|t| t.is_live_in(eid))
                    .fold(false, |acc, t| t.inner.advance(dt) | acc);
                if fired {
                    due.push((id, eid));
                }
            }
        }
        due.into_iter()
            .filter(|(item, effect)| self.run_effect(*item, *effect, true, true))
            .count()
    }

    // -- Enable / disable --

    /// Disabling an effect delivers a negative trigger first
    pub fn set_effect_enabled(&mut self, item: ItemId, effect: EffectId, enabled: bool) -> Result<(), ItemError> {
        let current = self
            .get(item)?
            .effect(effect)
            .ok_or(ItemError::EffectNotFound { item, effect })?
            .is_enabled();
        if current == enabled {
            return Ok(());
        }
        if !enabled {
            self.run_effect(item, effect, false, true);
        }
        if let Some(e) = self.items.get_mut(item).and_then(|i| i.effect_mut(effect)) {
            e.enabled = enabled;
        }
        Ok(())
    }

    /// Disabling a trigger delivers a negative trigger through its effect
    pub fn set_trigger_enabled(
        &mut self,
        item: ItemId,
        effect: EffectId,
        component: ComponentId,
        enabled: bool,
    ) -> Result<(), ItemError> {
        let e = self.effect_mut(item, effect)?;
        let trigger = e.trigger_mut(component).ok_or(ItemError::ComponentNotFound { effect, component })?;
        if trigger.enabled == enabled {
            return Ok(());
        }
        trigger.enabled = enabled;
        trigger.inner.reset();
        if !enabled {
            self.run_effect(item, effect, false, true);
        }
        Ok(())
    }

    /// Disabling a filter delivers a negative trigger through its effect
    pub fn set_filter_enabled(
        &mut self,
        item: ItemId,
        effect: EffectId,
        component: ComponentId,
        enabled: bool,
    ) -> Result<(), ItemError> {
        let e = self.effect_mut(item, effect)?;
        let filter = e
            .filters
            .iter_mut()
            .find(|f| f.id == component)
            .ok_or(ItemError::ComponentNotFound { effect, component })?;
        if filter.enabled == enabled {
            return Ok(());
        }
        if enabled {
            filter.enabled = true;
        } else {
            // The gate still applies to the negative it synthesizes
            self.run_effect(item, effect, false, true);
            if let Ok(e) = self.effect_mut(item, effect) {
                if let Some(f) = e.filters.iter_mut().find(|f| f.id == component) {
                    f.enabled = false;
                }
            }
        }
        Ok(())
    }

    /// Disabling an action delivers a negative trigger to that action alone
    pub fn set_action_enabled(
        &mut self,
        item: ItemId,
        effect: EffectId,
        component: ComponentId,
        enabled: bool,
    ) -> Result<(), ItemError> {
        let e = self.effect_mut(item, effect)?;
        let index = e
            .actions
            .iter()
            .position(|a| a.id == component)
            .ok_or(ItemError::ComponentNotFound { effect, component })?;
        if e.actions[index].enabled == enabled {
            return Ok(());
        }
        let owned = e.actions[index].master == Some(effect);
        e.actions[index].enabled = enabled;
        if enabled || !owned || !self.items.get(item).is_some_and(|i| i.effects_active) {
            return Ok(());
        }

        let mut action = self.effect_mut(item, effect)?.actions.remove(index);
        {
            let mut ctx = ActionContext {
                world: self,
                item,
                effect,
            };
            notify_triggered(action.inner.as_mut(), &mut ctx, false);
        }
        if let Ok(e) = self.effect_mut(item, effect) {
            let at = index.min(e.actions.len());
            e.actions.insert(at, action);
        }
        Ok(())
    }

    fn effect_mut(&mut self, item: ItemId, effect: EffectId) -> Result<&mut Effect, ItemError> {
        self.items
            .get_mut(item)
            .ok_or(ItemError::ItemNotFound(item))?
            .effect_mut(effect)
            .ok_or(ItemError::EffectNotFound { item, effect })
    }

    /// Let the live actions of an active item re-resolve their targets
    pub(crate) fn retarget_effects(&mut self, item: ItemId) {
        let ids: Vec<EffectId> = match self.items.get(item) {
            Some(it) if it.effects_active => it.effects.iter().filter(|e| e.enabled).map(Effect::id).collect(),
            _ => return,
        };
        for id in ids {
            self.deliver(item, id, Delivery::TreeChanged);
        }
    }

    // -- Activity --

    /// Character roots and plugged items are active unless broken
    pub fn effects_should_be_active(&self, item: ItemId) -> bool {
        self.items.get(item).is_some_and(|it| {
            (it.is_character || it.plugged_into.is_some()) && !it.is_broken() && !it.being_destroyed
        })
    }

    /// Recompute whether the item's effects are active. Going inactive sends a
    /// negative trigger through every effect; going active fires `Equipped`.
    pub(crate) fn handle_effects_active(&mut self, item: ItemId) {
        let should = self.effects_should_be_active(item);
        let Some(it) = self.items.get_mut(item) else {
            return;
        };
        if it.effects_active == should {
            return;
        }

        if should {
            it.effects_active = true;
            self.emit(ItemEvent::EffectsActiveChanged { item, active: true });
            self.fire_matching(item, |k| matches!(k, TriggerKind::Equipped), true);
        } else {
            let ids: Vec<EffectId> = it.effects.iter().map(Effect::id).collect();
            for id in ids {
                self.run_effect(item, id, false, false);
            }
            if let Some(it) = self.items.get_mut(item) {
                it.effects_active = false;
            }
            self.emit(ItemEvent::EffectsActiveChanged { item, active: false });
        }
        self.refresh_descriptions(item);
    }

    /// Set durability, clamped to `0..=max`
    pub fn set_durability(&mut self, item: ItemId, value: f32) -> Result<(), ItemError> {
        let it = self.items.get_mut(item).ok_or(ItemError::ItemNotFound(item))?;
        let durability = it.durability.as_mut().ok_or(ItemError::NoDurability(item))?;
        let value = value.clamp(0.0, durability.max);
        if durability.current == value {
            return Ok(());
        }
        let was_depleted = durability.is_depleted();
        durability.current = value;
        let depleted = durability.is_depleted();

        self.emit(ItemEvent::DurabilityChanged { item });
        if depleted && !was_depleted {
            self.fire_matching(item, |k| matches!(k, TriggerKind::DurabilityDepleted), true);
        }
        self.refresh_descriptions(item);
        self.handle_effects_active(item);
        if was_depleted && !depleted {
            self.fire_matching(item, |k| matches!(k, TriggerKind::DurabilityDepleted), false);
        }
        Ok(())
    }
}
