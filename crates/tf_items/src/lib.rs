//! TF Items - Item Registry and Instance Model
//!
//! This crate provides the static item data and the stateful item instances
//! that the inventory engine moves between slots.
//!
//! # Features
//!
//! - Immutable, shared item definitions
//! - Item instances with unique ids, stack counts and per-instance state
//! - An explicitly owned item registry (no global singleton)
//! - TOML item manifests loaded once at startup
//! - Backpack items that extend the capacity of whoever picks them up
//!
//! # Example
//!
//! ```ignore
//! use tf_items::prelude::*;
//!
//! let registry = ItemRegistry::new();
//! registry.register(
//!     ItemDefinition::new("iron_sword", "Iron Sword")
//!         .with_category(ItemCategory::Equipment)
//!         .with_equip_type(EquipType::Weapon)
//!         .with_durability(100.0),
//! )?;
//!
//! let sword = registry.instantiate("iron_sword", 1)?;
//! ```

pub mod error;
pub mod id;
pub mod item;
pub mod manifest;
pub mod registry;

pub mod prelude {
    pub use crate::error::{RegistryError, Result};
    pub use crate::id::{IdGenerator, InstanceId};
    pub use crate::item::{
        BackpackStats, EquipType, InstanceState, ItemCategory, ItemDefinition, ItemId, ItemInstance,
        ItemProperty,
    };
    pub use crate::manifest::{load_manifest, parse_manifest};
    pub use crate::registry::ItemRegistry;
}

pub use prelude::*;
