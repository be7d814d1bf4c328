//! Slot sockets
//!
//! A slot holds at most one item. Tag requirements and same-type exclusion
//! decide what may be plugged in.

use serde::{Deserialize, Serialize};

use super::{Item, ItemId, ItemTypeId};

/// Identifies one slot on one item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub owner: ItemId,
    pub key: String,
}

/// Why a slot refused an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRejection {
    MissingRequiredTag,
    HasExcludedTag,
    SameTypeAsOwner,
}

impl SlotRejection {
    pub fn reason(self) -> &'static str {
        match self {
            Self::MissingRequiredTag => "missing required tag",
            Self::HasExcludedTag => "has excluded tag",
            Self::SameTypeAsOwner => "same type as slot owner",
        }
    }
}

/// A single-item socket on an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub key: String,
    /// The item must carry every one of these
    #[serde(default)]
    pub required_tags: Vec<String>,
    /// The item must carry none of these
    #[serde(default)]
    pub excluded_tags: Vec<String>,
    /// Refuse items of the owner's own type (a bag inside the same bag type)
    #[serde(default)]
    pub forbid_same_type: bool,
    #[serde(skip)]
    pub(crate) content: Option<ItemId>,
}

impl Slot {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            required_tags: Vec::new(),
            excluded_tags: Vec::new(),
            forbid_same_type: false,
            content: None,
        }
    }

    pub fn require_tag(mut self, tag: impl Into<String>) -> Self {
        self.required_tags.push(tag.into());
        self
    }

    pub fn exclude_tag(mut self, tag: impl Into<String>) -> Self {
        self.excluded_tags.push(tag.into());
        self
    }

    pub fn forbid_same_type(mut self) -> Self {
        self.forbid_same_type = true;
        self
    }

    /// Copy of the definition with nothing plugged in
    pub(crate) fn cleared(&self) -> Self {
        Self {
            content: None,
            ..self.clone()
        }
    }

    pub fn content(&self) -> Option<ItemId> {
        self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Check tags and type against this slot's rules
    pub fn can_plug(&self, item: &Item, owner_type: ItemTypeId) -> Result<(), SlotRejection> {
        if self.forbid_same_type && item.type_id() == owner_type {
            return Err(SlotRejection::SameTypeAsOwner);
        }
        if !self.required_tags.iter().all(|t| item.has_tag(t)) {
            return Err(SlotRejection::MissingRequiredTag);
        }
        if self.excluded_tags.iter().any(|t| item.has_tag(t)) {
            return Err(SlotRejection::HasExcludedTag);
        }
        Ok(())
    }
}

/// The slots of one item, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Slots {
    slots: Vec<Slot>,
}

impl Slots {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.key == key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Plugged items, in slot order
    pub fn contents(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.slots.iter().filter_map(|s| s.content)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemTemplate;

    fn make_ring() -> Item {
        Item::from_template(&ItemTemplate::new(ItemTypeId(3), "Ring").tag("ring").tag("jewelry"))
    }

    #[test]
    fn required_and_excluded_tags() {
        let ring = make_ring();
        let owner = ItemTypeId(100);
        assert!(Slot::new("finger").require_tag("ring").can_plug(&ring, owner).is_ok());
        assert_eq!(
            Slot::new("neck").require_tag("amulet").can_plug(&ring, owner),
            Err(SlotRejection::MissingRequiredTag)
        );
        assert_eq!(
            Slot::new("weapon").exclude_tag("jewelry").can_plug(&ring, owner),
            Err(SlotRejection::HasExcludedTag)
        );
    }

    #[test]
    fn same_type_forbidden() {
        let ring = make_ring();
        let slot = Slot::new("inner").forbid_same_type();
        assert_eq!(
            slot.can_plug(&ring, ItemTypeId(3)),
            Err(SlotRejection::SameTypeAsOwner)
        );
        assert!(slot.can_plug(&ring, ItemTypeId(4)).is_ok());
    }
}
