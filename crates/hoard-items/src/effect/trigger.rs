use serde::{Deserialize, Serialize};

/// What makes a trigger fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerKind {
    /// Only fired explicitly by gameplay code
    Manual,
    /// Fires positive every `interval` seconds of world ticks while active
    Tick { interval: f32 },
    /// Fires positive when the item is used
    Used,
    /// Positive when the item's effects become active, negative when they stop
    Equipped,
    /// Positive when durability runs out, negative when it is restored
    DurabilityDepleted,
    /// Fires positive on a named gameplay event
    Event { name: String },
}

impl TriggerKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Tick { .. } => "tick",
            Self::Used => "used",
            Self::Equipped => "equipped",
            Self::DurabilityDepleted => "durability_depleted",
            Self::Event { .. } => "event",
        }
    }
}

/// Trigger state
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub kind: TriggerKind,
    /// Time accumulated towards the next tick
    elapsed: f32,
}

impl Trigger {
    pub fn new(kind: TriggerKind) -> Self {
        Self { kind, elapsed: 0.0 }
    }

    /// Advance a tick trigger. Returns `true` when it should fire.
    /// Fires at most once per call; leftover time carries over.
    pub fn advance(&mut self, dt: f32) -> bool {
        let TriggerKind::Tick { interval } = self.kind else {
            return false;
        };
        if interval <= 0.0 {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= interval {
            self.elapsed -= interval;
            true
        } else {
            false
        }
    }

    pub(crate) fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn matches_event(&self, name: &str) -> bool {
        matches!(&self.kind, TriggerKind::Event { name: n } if n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_fires_on_interval() {
        let mut t = Trigger::new(TriggerKind::Tick { interval: 1.0 });
        assert!(!t.advance(0.5));
        assert!(t.advance(0.6));
        assert!(!t.advance(0.5));
        assert!(t.advance(0.5));
    }

    #[test]
    fn non_tick_never_advances() {
        let mut t = Trigger::new(TriggerKind::Used);
        assert!(!t.advance(100.0));
    }

    #[test]
    fn zero_interval_never_fires() {
        let mut t = Trigger::new(TriggerKind::Tick { interval: 0.0 });
        assert!(!t.advance(1.0));
    }

    #[test]
    fn kind_from_json() {
        let kind: TriggerKind = serde_json::from_str(r#"{ "type": "event", "name": "hit" }"#).unwrap();
        assert_eq!(kind, TriggerKind::Event { name: "hit".into() });
        assert!(Trigger::new(kind).matches_event("hit"));
    }
}
