//! Slots and slot snapshots

use serde::{Deserialize, Serialize};
use tf_interfaces::{Equippable, SlotIndex};
use tf_items::{EquipType, InstanceId, ItemId, ItemInstance};

/// What a slot accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    /// Any item
    Generic,
    /// Only items of the matching equip type
    Equip(EquipType),
}

impl SlotKind {
    /// Check if an item is allowed in this slot
    pub fn accepts(&self, item: &dyn Equippable) -> bool {
        match self {
            Self::Generic => true,
            Self::Equip(slot_type) => item.fits(*slot_type),
        }
    }

    /// Check if this is a generic slot
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic)
    }

    /// Equip type, for equip slots
    pub fn equip_type(&self) -> Option<EquipType> {
        match self {
            Self::Generic => None,
            Self::Equip(t) => Some(*t),
        }
    }
}

/// A single container cell
#[derive(Debug)]
pub struct Slot {
    pub(crate) index: SlotIndex,
    pub(crate) kind: SlotKind,
    pub(crate) item: Option<ItemInstance>,
}

impl Slot {
    pub(crate) fn new(index: SlotIndex, kind: SlotKind) -> Self {
        Self {
            index,
            kind,
            item: None,
        }
    }

    /// Slot index
    pub fn index(&self) -> SlotIndex {
        self.index
    }

    /// Slot kind
    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    /// Item held, if any
    pub fn item(&self) -> Option<&ItemInstance> {
        self.item.as_ref()
    }

    /// Check if the slot is empty
    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    /// Stack count (0 when empty)
    pub fn count(&self) -> u32 {
        self.item.as_ref().map(ItemInstance::count).unwrap_or(0)
    }

    /// Copy of the slot state for observers and the presentation layer
    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            index: self.index,
            kind: self.kind,
            item: self.item.as_ref().map(ItemSnapshot::from_instance),
        }
    }
}

/// Serializable copy of an item for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Definition id
    pub item_id: ItemId,
    /// Instance id
    pub instance: InstanceId,
    /// Display name
    pub name: String,
    /// Icon reference
    pub icon: String,
    /// Stack count
    pub count: u32,
    /// Max stack size
    pub max_stack: u32,
    /// Current durability, for items that have it
    pub durability: Option<f32>,
}

impl ItemSnapshot {
    /// Copy the displayable state of an instance
    pub fn from_instance(item: &ItemInstance) -> Self {
        let definition = item.definition();
        Self {
            item_id: definition.id.clone(),
            instance: item.id(),
            name: definition.name.clone(),
            icon: definition.icon.clone(),
            count: item.count(),
            max_stack: definition.max_stack,
            durability: item.state().and_then(|s| s.durability),
        }
    }
}

/// Serializable copy of a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    /// Slot index
    pub index: SlotIndex,
    /// Slot kind
    pub kind: SlotKind,
    /// Item copy, if occupied
    pub item: Option<ItemSnapshot>,
}

impl SlotSnapshot {
    /// Check if the slot was empty
    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    /// Stack count (0 when empty)
    pub fn count(&self) -> u32 {
        self.item.as_ref().map(|i| i.count).unwrap_or(0)
    }

    /// Definition id, if occupied
    pub fn item_id(&self) -> Option<&ItemId> {
        self.item.as_ref().map(|i| &i.item_id)
    }
}
