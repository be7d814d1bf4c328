//! Change notifications
//!
//! Every logical mutation emits its event exactly once, after the state has
//! changed and cached weights have been invalidated.

use std::fmt;

use tracing::trace;

use crate::item::{InventoryId, ItemId};

/// Something observable happened to an item or inventory
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEvent {
    /// An inventory position changed. `None` means the whole inventory (sort).
    ContentChanged {
        inventory: InventoryId,
        index: Option<usize>,
    },
    /// A slot on `item` was plugged or unplugged
    SlotContentChanged { item: ItemId, slot: String },
    /// The tree above `item` changed (fired for the moved item and its descendants)
    ItemTreeChanged { item: ItemId },
    /// `item` gained, lost or changed its direct parent
    ParentChanged { item: ItemId },
    SetStackCount { item: ItemId },
    DurabilityChanged { item: ItemId },
    /// A stat's resolved value must be recomputed
    StatDirty { item: ItemId, key: String },
    EffectsActiveChanged { item: ItemId, active: bool },
    Destroyed { item: ItemId },
}

/// Identifies a subscriber so it can be removed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Subscriber = Box<dyn FnMut(&ItemEvent)>;

/// Observer list for [`ItemEvent`]s
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&ItemEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: ItemEvent) {
        trace!(?event, "item event");
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
