//! TF Characters - Character Inventory Adapter
//!
//! Binds characters to inventory containers and provides the interactable
//! world entities characters pick items from.
//!
//! # Features
//!
//! - One container per character, created on spawn and released on despawn
//! - Observer registration on behalf of the presentation layer
//! - Capability-based interaction dispatch
//! - World item pickups with partial pickup
//! - Storage chests with their own containers
//! - Keyed chests that unlock for whoever holds the key
//! - Backpack pickups that equip on the spot
//!
//! # Example
//!
//! ```ignore
//! use tf_characters::prelude::*;
//!
//! let mut hero = CharacterInventory::spawn(EntityId::new(), registry.clone(), &config)?;
//! let mut pickup = WorldItemPickup::new(registry.clone(), registry.instantiate("arrow", 20)?);
//!
//! let result = hero.interact(&mut pickup);
//! assert!(result.is_success());
//! ```

pub mod adapter;
pub mod pickup;
pub mod storage;

pub mod prelude {
    pub use crate::adapter::{CharacterInventory, ObserverHandle};
    pub use crate::pickup::WorldItemPickup;
    pub use crate::storage::StorageContainer;
    pub use tf_interfaces::{
        Entity, EntityId, Interactable, InteractionResult, Inventoriable, InventoryError,
        InventoryResult, Lockable,
    };
}

pub use prelude::*;
