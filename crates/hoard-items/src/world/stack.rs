//! Stack counts: set, combine, split

use tracing::warn;

use super::ItemWorld;
use crate::catalog::{Catalog, ItemTemplate};
use crate::error::ItemError;
use crate::events::ItemEvent;
use crate::item::{ItemId, ItemTypeId};

/// Stack count taken off a source item by [`ItemWorld::begin_split`],
/// waiting to become a new item or to be given back
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a split reservation must be completed or rolled back"]
pub struct SplitReservation {
    source: ItemId,
    type_id: ItemTypeId,
    count: u32,
}

impl SplitReservation {
    pub fn source(&self) -> ItemId {
        self.source
    }

    pub fn type_id(&self) -> ItemTypeId {
        self.type_id
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl ItemWorld {
    /// Set an item's stack count. Zero destroys the item.
    pub fn set_stack_count(&mut self, item: ItemId, count: u32) -> Result<(), ItemError> {
        let it = self.get(item)?;
        if count > it.max_stack_count() {
            return Err(ItemError::StackOutOfRange {
                requested: count,
                max: it.max_stack_count(),
            });
        }
        if count == it.stack_count() {
            return Ok(());
        }
        if count == 0 {
            return self.destroy(item);
        }

        if let Some(it) = self.items.get_mut(item) {
            it.stack_count = count;
        }
        self.notify_child_changed(item);
        self.emit(ItemEvent::SetStackCount { item });
        Ok(())
    }

    /// Move as much of `donor`'s stack into `target` as fits. A donor emptied
    /// this way is destroyed. Returns the amount moved.
    pub fn combine(&mut self, target: ItemId, donor: ItemId) -> Result<u32, ItemError> {
        if target == donor {
            return Ok(0);
        }
        let t = self.get(target)?;
        let d = self.get(donor)?;
        if t.type_id() != d.type_id() {
            return Err(ItemError::TypeMismatch {
                expected: t.type_id(),
                got: d.type_id(),
            });
        }
        if !t.is_stackable() {
            return Err(ItemError::NotStackable(t.type_id()));
        }
        let moved = d.stack_count().min(t.stack_space());
        if moved == 0 {
            return Ok(0);
        }
        let target_count = t.stack_count() + moved;
        let donor_count = d.stack_count() - moved;

        self.set_stack_count(target, target_count)?;
        self.set_stack_count(donor, donor_count)?;
        Ok(moved)
    }

    /// First half of a split: take `count` off the source stack
    pub fn begin_split(&mut self, item: ItemId, count: u32) -> Result<SplitReservation, ItemError> {
        let it = self.get(item)?;
        if !it.is_stackable() {
            return Err(ItemError::NotStackable(it.type_id()));
        }
        let available = it.stack_count();
        if count == 0 || count >= available {
            return Err(ItemError::SplitOutOfRange {
                requested: count,
                available,
            });
        }
        let type_id = it.type_id();
        self.set_stack_count(item, available - count)?;
        Ok(SplitReservation {
            source: item,
            type_id,
            count,
        })
    }

    /// Second half of a split: create the new stack from the catalog's
    /// template. A template of the wrong type rolls the reservation back;
    /// whatever doesn't fit under the template's stack limit goes back to
    /// the source.
    pub fn complete_split(&mut self, reservation: SplitReservation, template: &ItemTemplate) -> Result<ItemId, ItemError> {
        if template.type_id != reservation.type_id {
            let err = ItemError::TypeMismatch {
                expected: reservation.type_id,
                got: template.type_id,
            };
            self.rollback_split(reservation)?;
            return Err(err);
        }
        let id = self.spawn(template);
        let fits = reservation.count.min(self.get(id)?.max_stack_count());
        self.set_stack_count(id, fits)?;

        let overflow = reservation.count - fits;
        if overflow > 0 {
            warn!(item = ?reservation.source, overflow, "split exceeds the new stack's limit, returning the rest");
            self.rollback_split(SplitReservation {
                count: overflow,
                ..reservation
            })?;
        }
        Ok(id)
    }

    /// Give a reserved count back to its source
    pub fn rollback_split(&mut self, reservation: SplitReservation) -> Result<(), ItemError> {
        let it = self.get(reservation.source)?;
        let restored = it.stack_count() + reservation.count;
        let max = it.max_stack_count();
        if restored > max {
            warn!(item = ?reservation.source, restored, max, "split rollback overflows the stack, clamping");
        }
        self.set_stack_count(reservation.source, restored.min(max))
    }

    /// Split `count` off a stack into a new item fetched from `catalog`.
    /// If the catalog fails the source gets its count back.
    pub async fn split<C: Catalog>(&mut self, catalog: &C, item: ItemId, count: u32) -> Result<ItemId, ItemError> {
        let reservation = self.begin_split(item, count)?;
        match catalog.instantiate(reservation.type_id).await {
            Ok(template) => self.complete_split(reservation, &template),
            Err(err) => {
                warn!(item = ?item, %err, "split failed, rolling back");
                self.rollback_split(reservation)?;
                Err(err.into())
            }
        }
    }
}
