use std::collections::HashSet;

use super::action::Action;
use super::component::{ActionComponent, ComponentId, EffectComponent, FilterComponent, FilterSlot, TriggerComponent};
use super::filter::{Filter, FilterContext};
use super::trigger::{Trigger, TriggerKind};
use super::EffectId;

/// Triggers, filters and actions owned by one item
#[derive(Debug)]
pub struct Effect {
    id: EffectId,
    pub name: String,
    pub(crate) enabled: bool,
    pub(crate) triggers: Vec<TriggerComponent>,
    pub(crate) filters: Vec<FilterComponent>,
    pub(crate) actions: Vec<ActionComponent>,
    next_component: u32,
    /// Actions are checked out to the world while they run
    pub(crate) running: bool,
    /// Deliveries that arrived while the actions were checked out
    pub(crate) deferred: Vec<Delivery>,
}

/// Something handed to every live action of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Trigger { positive: bool },
    TreeChanged,
}

impl Effect {
    pub fn new(id: EffectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            triggers: Vec::new(),
            filters: Vec::new(),
            actions: Vec::new(),
            next_component: 0,
            running: false,
            deferred: Vec::new(),
        }
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn adopt<T>(&mut self, inner: T) -> EffectComponent<T> {
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        EffectComponent {
            id,
            enabled: true,
            master: Some(self.id),
            inner,
        }
    }

    pub fn add_trigger(&mut self, kind: TriggerKind) -> ComponentId {
        let component = self.adopt(Trigger::new(kind));
        let id = component.id;
        self.triggers.push(component);
        id
    }

    pub fn add_filter(&mut self, filter: Box<dyn Filter>, ignore_negative_trigger: bool) -> ComponentId {
        let component = self.adopt(FilterSlot {
            filter,
            ignore_negative_trigger,
        });
        let id = component.id;
        self.filters.push(component);
        id
    }

    pub fn add_action(&mut self, action: Box<dyn Action>) -> ComponentId {
        let component = self.adopt(action);
        let id = component.id;
        self.actions.push(component);
        id
    }

    /// Insert a component built elsewhere, keeping its id and master as-is.
    /// [`validate`](Self::validate) reports anything that doesn't belong here.
    pub fn insert_trigger(&mut self, component: TriggerComponent) {
        self.triggers.push(component);
    }

    pub fn insert_filter(&mut self, component: FilterComponent) {
        self.filters.push(component);
    }

    pub fn insert_action(&mut self, component: ActionComponent) {
        self.actions.push(component);
    }

    pub fn triggers(&self) -> &[TriggerComponent] {
        &self.triggers
    }

    pub fn filters(&self) -> &[FilterComponent] {
        &self.filters
    }

    pub fn actions(&self) -> &[ActionComponent] {
        &self.actions
    }

    pub(crate) fn trigger_mut(&mut self, id: ComponentId) -> Option<&mut TriggerComponent> {
        self.triggers.iter_mut().find(|c| c.id == id)
    }

    /// Whether a live trigger of this effect matches `pred`
    pub fn has_trigger(&self, pred: impl Fn(&TriggerKind) -> bool) -> bool {
        self.triggers.iter().any(|t| t.is_live_in(self.id) && pred(&t.inner.kind))
    }

    /// Run the filter chain. Disabled filters and filters owned by another
    /// effect are skipped; filters that ignore negative triggers pass them
    /// unconditionally.
    pub fn passes_filters(&self, ctx: &FilterContext<'_>) -> bool {
        self.filters.iter().filter(|f| f.is_live_in(self.id)).all(|f| {
            (!ctx.positive && f.inner.ignore_negative_trigger) || f.inner.filter.evaluate(ctx)
        })
    }

    /// Configuration problems: components with no master, a foreign master,
    /// or an id that appears twice
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        self.check_list("trigger", self.triggers.iter().map(|c| (c.id, c.master)), &mut problems);
        self.check_list("filter", self.filters.iter().map(|c| (c.id, c.master)), &mut problems);
        self.check_list("action", self.actions.iter().map(|c| (c.id, c.master)), &mut problems);
        problems
    }

    fn check_list(
        &self,
        what: &str,
        entries: impl Iterator<Item = (ComponentId, Option<EffectId>)>,
        problems: &mut Vec<String>,
    ) {
        let mut seen = HashSet::new();
        for (id, master) in entries {
            match master {
                None => problems.push(format!("{what} {:?} in effect '{}' has no master", id, self.name)),
                Some(m) if m != self.id => problems.push(format!(
                    "{what} {:?} in effect '{}' belongs to effect {:?}",
                    id, self.name, m
                )),
                Some(_) => {}
            }
            if !seen.insert(id) {
                problems.push(format!("{what} {:?} listed twice in effect '{}'", id, self.name));
            }
        }
    }
}
