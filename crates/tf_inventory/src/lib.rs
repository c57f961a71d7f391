//! TF Inventory - Inventory Container Engine
//!
//! The slot array, stacking and merge rules, add/remove/move/split
//! operations, equip-slot exclusivity and change notification.
//!
//! # Features
//!
//! - Fixed-capacity containers with generic and equip slots
//! - First-fit stacking with max stack sizes
//! - Atomic operations: failures leave the container untouched
//! - Versioned change events delivered synchronously to observers
//! - Snapshot/restore for external persistence
//! - Deadlock-free cross-container transfers
//! - Backpacks that add slots and carry weight at runtime
//!
//! # Example
//!
//! ```ignore
//! use tf_inventory::prelude::*;
//!
//! let layout = ContainerLayout::new(20).with_equip_slot(EquipType::Weapon);
//! let mut inventory = InventoryContainer::new(registry.clone(), layout);
//!
//! let sword = registry.instantiate("iron_sword", 1)?;
//! let slot = inventory.add(sword, None)?;
//! inventory.equip(slot)?;
//! ```

pub mod backpack;
pub mod config;
pub mod container;
pub mod equipment;
pub mod event;
pub mod slot;
pub mod snapshot;
pub mod transfer;

pub mod prelude {
    pub use crate::config::{ConfigError, ContainerLayout, InventoryConfig};
    pub use crate::container::InventoryContainer;
    pub use crate::equipment::{EquipPolicy, EquipmentSet, EquipmentSnapshot};
    pub use crate::event::{ChangeEvent, ChangeKind, ContainerView, ObserverId};
    pub use crate::slot::{ItemSnapshot, Slot, SlotKind, SlotSnapshot};
    pub use crate::snapshot::{
        ContainerSnapshot, RestoreMode, SnapshotEntry, SnapshotError, SnapshotFormat,
    };
    pub use crate::transfer::{lock_pair, transfer, ContainerHandle, SharedContainer};
    pub use tf_interfaces::{AddError, InventoryError, InventoryResult, SlotIndex};
    pub use tf_items::{BackpackStats, EquipType};
}

pub use prelude::*;
