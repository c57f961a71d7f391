//! TF Interfaces - Capability Contracts
//!
//! Abstract contracts that sit below the character, inventory and widget
//! crates so none of them depends on another's concrete types.
//!
//! # Features
//!
//! - `Inventoriable`: something that can hold items
//! - `Equippable`: something that can be worn or wielded
//! - `Interactable`: something a character can query and act on
//! - `Lockable`: something a held key item can lock and unlock
//! - Capability sets queried at runtime instead of an actor hierarchy
//! - The shared inventory error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use tf_interfaces::prelude::*;
//!
//! fn poke(target: &mut dyn Entity, who: &mut dyn Inventoriable) -> InteractionResult {
//!     match target.as_interactable_mut() {
//!         Some(interactable) => interactable.interact(who),
//!         None => InteractionResult::NotInteractable,
//!     }
//! }
//! ```

pub mod capability;
pub mod error;
pub mod id;
pub mod interaction;

/// Position of a slot inside a container
pub type SlotIndex = usize;

pub mod prelude {
    pub use crate::capability::{Capability, CapabilitySet, Entity, Equippable, Inventoriable};
    pub use crate::error::{AddError, InventoryError, InventoryResult};
    pub use crate::id::{ContainerId, EntityId};
    pub use crate::interaction::{
        Interactable, InteractionData, InteractionResult, Lockable, DEFAULT_INTERACTION_DISTANCE,
    };
    pub use crate::SlotIndex;
}

pub use prelude::*;
