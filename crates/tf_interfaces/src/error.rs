//! Inventory error taxonomy
//!
//! Every error is recoverable at the call site. The engine returns the
//! specific error to its caller; presentation code maps it to feedback.

use thiserror::Error;
use tf_items::{EquipType, ItemId, ItemInstance, RegistryError};

use crate::id::ContainerId;
use crate::SlotIndex;

/// Inventory engine errors
#[derive(Debug, Error)]
pub enum InventoryError {
    /// No room for the item anywhere in the container
    #[error("Inventory full: no room for {count} x '{item}'")]
    InventoryFull { item: ItemId, count: u32 },

    /// Slot index out of range
    #[error("Invalid slot {slot} (capacity {capacity})")]
    InvalidSlot { slot: SlotIndex, capacity: usize },

    /// Requested more than the slot holds
    #[error("Insufficient count in slot {slot}: requested {requested}, available {available}")]
    InsufficientCount {
        slot: SlotIndex,
        requested: u32,
        available: u32,
    },

    /// Slot kind does not accept the item, or the destination is incompatible
    #[error("Slot {slot} cannot hold '{item}'")]
    SlotMismatch { slot: SlotIndex, item: ItemId },

    /// Item is not equippable, or the container has no slot of its type
    #[error("No matching equip slot for {0:?}")]
    NoMatchingEquipSlot(Option<EquipType>),

    /// Target equip slot already holds an item
    #[error("Equip slot {slot} is occupied by '{occupant}'")]
    SlotOccupied { slot: SlotIndex, occupant: ItemId },

    /// No free generic slot to unequip into
    #[error("Container full: no free slot to unequip '{item}'")]
    ContainerFull { item: ItemId },

    /// Persisted data references an item the registry does not know
    #[error("Snapshot references unknown item '{0}'")]
    VersionMismatch(ItemId),

    /// Operation needs an item but the slot is empty
    #[error("Slot {0} is empty")]
    EmptySlot(SlotIndex),

    /// Carrying the item would exceed the weight limit
    #[error("Weight limit exceeded: {current:.1} + {additional:.1} > {limit:.1}")]
    WeightLimitExceeded {
        current: f32,
        additional: f32,
        limit: f32,
    },

    /// Definition forbids dropping
    #[error("Item '{0}' cannot be dropped")]
    NotDroppable(ItemId),

    /// Persisted data is malformed
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Transfer source and destination are the same container
    #[error("Source and destination are the same container")]
    SameContainer,

    /// No container with this id is reachable
    #[error("Unknown container {0}")]
    UnknownContainer(ContainerId),

    /// A backpack is already equipped
    #[error("A backpack is already equipped")]
    BackpackEquipped,

    /// Operation needs an equipped backpack
    #[error("No backpack equipped")]
    NoBackpack,

    /// The holder cannot carry a backpack
    #[error("Backpacks are not supported by this holder")]
    BackpackUnsupported,

    /// The owning character no longer exists
    #[error("Character has been despawned")]
    CharacterDespawned,

    /// Registry lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

/// A rejected add, handing the item back to the caller
///
/// The instance is never lost: a failed add returns ownership.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct AddError {
    /// Why the item was rejected
    pub error: InventoryError,
    /// The rejected item, unchanged
    pub item: ItemInstance,
}

impl AddError {
    /// Create a new add error
    pub fn new(error: InventoryError, item: ItemInstance) -> Self {
        Self { error, item }
    }

    /// Split into the error and the returned item
    pub fn into_parts(self) -> (InventoryError, ItemInstance) {
        (self.error, self.item)
    }
}

impl From<AddError> for InventoryError {
    fn from(e: AddError) -> Self {
        e.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = InventoryError::InsufficientCount {
            slot: 0,
            requested: 10,
            available: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient count in slot 0: requested 10, available 5"
        );

        let err = InventoryError::NoMatchingEquipSlot(Some(EquipType::Weapon));
        assert_eq!(err.to_string(), "No matching equip slot for Some(Weapon)");
    }

    #[test]
    fn test_registry_errors_convert() {
        let err: InventoryError = RegistryError::UnknownItem("ghost".into()).into();
        assert_eq!(err.to_string(), "Unknown item: ghost");
    }
}
