use super::action::Action;
use super::filter::Filter;
use super::trigger::Trigger;
use super::EffectId;

/// Identifies a component within its effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

/// A trigger, filter or action together with its enable flag and owning effect
#[derive(Debug)]
pub struct EffectComponent<T> {
    pub(crate) id: ComponentId,
    pub(crate) enabled: bool,
    /// The effect this component reports to. `None` is a configuration error.
    pub master: Option<EffectId>,
    pub inner: T,
}

impl<T> EffectComponent<T> {
    /// A detached component, enabled, with no master yet
    pub fn new(inner: T) -> Self {
        Self {
            id: ComponentId(u32::MAX),
            enabled: true,
            master: None,
            inner,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enabled and reporting to `effect`. Anything else is inert.
    pub fn is_live_in(&self, effect: EffectId) -> bool {
        self.enabled && self.master == Some(effect)
    }
}

/// A filter plus its negative-trigger policy
#[derive(Debug)]
pub struct FilterSlot {
    pub filter: Box<dyn Filter>,
    /// Pass negative triggers without consulting the filter
    pub ignore_negative_trigger: bool,
}

pub type TriggerComponent = EffectComponent<Trigger>;
pub type FilterComponent = EffectComponent<FilterSlot>;
pub type ActionComponent = EffectComponent<Box<dyn Action>>;
