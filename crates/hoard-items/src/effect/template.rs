//! Declarative effect definitions, as found in catalog files

use serde::{Deserialize, Serialize};

use super::action::{Action, AdjustDurability, ConsumeStack, LogMessage, ModifyStat};
use super::effect::Effect;
use super::filter::{Chance, DurabilityAbove, Filter, HasTag, Not, StatAtLeast};
use super::trigger::TriggerKind;
use super::EffectId;
use crate::item::RelativeTarget;
use crate::stat::ModifierKind;

/// Blueprint for an [`Effect`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectTemplate {
    pub name: String,
    #[serde(default)]
    pub triggers: Vec<TriggerKind>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub actions: Vec<ActionTemplate>,
}

impl EffectTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triggers: Vec::new(),
            filters: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn trigger(mut self, kind: TriggerKind) -> Self {
        self.triggers.push(kind);
        self
    }

    pub fn filter(mut self, filter: FilterTemplate) -> Self {
        self.filters.push(FilterSpec {
            filter,
            ignore_negative_trigger: false,
        });
        self
    }

    /// Add a filter that lets negative triggers through untested
    pub fn filter_positive_only(mut self, filter: FilterTemplate) -> Self {
        self.filters.push(FilterSpec {
            filter,
            ignore_negative_trigger: true,
        });
        self
    }

    pub fn action(mut self, action: ActionTemplate) -> Self {
        self.actions.push(action);
        self
    }

    pub fn build(&self, id: EffectId) -> Effect {
        let mut effect = Effect::new(id, self.name.clone());
        for kind in &self.triggers {
            effect.add_trigger(kind.clone());
        }
        for spec in &self.filters {
            effect.add_filter(spec.filter.build(), spec.ignore_negative_trigger);
        }
        for action in &self.actions {
            effect.add_action(action.build());
        }
        effect
    }
}

/// A filter definition plus its negative-trigger policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(flatten)]
    pub filter: FilterTemplate,
    #[serde(default)]
    pub ignore_negative_trigger: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterTemplate {
    HasTag {
        #[serde(default)]
        target: RelativeTarget,
        tag: String,
    },
    DurabilityAbove {
        fraction: f32,
    },
    StatAtLeast {
        #[serde(default)]
        target: RelativeTarget,
        stat_key: String,
        value: f32,
    },
    Chance {
        probability: f32,
    },
    Not {
        filter: Box<FilterTemplate>,
    },
}

impl FilterTemplate {
    pub fn build(&self) -> Box<dyn Filter> {
        match self {
            Self::HasTag { target, tag } => Box::new(HasTag::new(*target, tag.clone())),
            Self::DurabilityAbove { fraction } => Box::new(DurabilityAbove { fraction: *fraction }),
            Self::StatAtLeast {
                target,
                stat_key,
                value,
            } => Box::new(StatAtLeast {
                target: *target,
                stat_key: stat_key.clone(),
                value: *value,
            }),
            Self::Chance { probability } => Box::new(Chance {
                probability: *probability,
            }),
            Self::Not { filter } => Box::new(Not(filter.build())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionTemplate {
    ModifyStat {
        #[serde(default)]
        target: RelativeTarget,
        stat_key: String,
        kind: ModifierKind,
        value: f32,
        #[serde(default)]
        order: Option<i32>,
    },
    AdjustDurability {
        delta: f32,
    },
    ConsumeStack {
        count: u32,
    },
    Log {
        message: String,
    },
}

impl ActionTemplate {
    pub fn build(&self) -> Box<dyn Action> {
        match self {
            Self::ModifyStat {
                target,
                stat_key,
                kind,
                value,
                order,
            } => {
                let action = ModifyStat::new(*target, stat_key.clone(), *kind, *value);
                Box::new(match order {
                    Some(order) => action.with_order(*order),
                    None => action,
                })
            }
            Self::AdjustDurability { delta } => Box::new(AdjustDurability { delta: *delta }),
            Self::ConsumeStack { count } => Box::new(ConsumeStack { count: *count }),
            Self::Log { message } => Box::new(LogMessage::new(message.clone())),
        }
    }
}
