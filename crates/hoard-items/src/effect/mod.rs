//! Effect graph
//!
//! An effect is a bundle of triggers, filters and actions owned by one item.
//! Triggers fire positive or negative events into their effect; filters gate
//! them; actions react. Firing is driven by the [`ItemWorld`](crate::world::ItemWorld).

mod action;
mod component;
#[allow(clippy::module_inception)]
mod effect;
mod filter;
mod template;
mod trigger;

use serde::{Deserialize, Serialize};

pub use action::{
    notify_triggered, Action, ActionContext, AdjustDurability, ConsumeStack, LogMessage, ModifyStat,
};
pub use component::{ActionComponent, ComponentId, EffectComponent, FilterComponent, FilterSlot, TriggerComponent};
pub(crate) use effect::Delivery;
pub use effect::Effect;
pub use filter::{Chance, DurabilityAbove, Filter, FilterContext, HasTag, Not, StatAtLeast};
pub use template::{ActionTemplate, EffectTemplate, FilterSpec, FilterTemplate};
pub use trigger::{Trigger, TriggerKind};

/// Identifies an effect for the lifetime of its world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(pub u32);
