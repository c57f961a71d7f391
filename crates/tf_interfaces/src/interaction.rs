//! Interaction contract

use tf_items::ItemId;

use crate::capability::Inventoriable;
use crate::error::InventoryError;
use crate::id::ContainerId;

/// Default reach for interactions, in world units
pub const DEFAULT_INTERACTION_DISTANCE: f32 = 200.0;

/// Static description of how an interaction behaves
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionData {
    /// Hold time before the interaction fires (0 = instant)
    pub duration: f32,
    /// Whether the interaction is currently allowed
    pub can_interact: bool,
    /// Prompt shown to the player
    pub prompt: String,
}

impl Default for InteractionData {
    fn default() -> Self {
        Self {
            duration: 0.0,
            can_interact: true,
            prompt: "Interact".to_string(),
        }
    }
}

/// Outcome of an interaction
#[derive(Debug)]
pub enum InteractionResult {
    /// Items moved into the instigator's inventory
    PickedUp {
        item: ItemId,
        count: u32,
        /// Units left behind in the world
        remaining: u32,
    },
    /// A storage container was opened
    Opened { container: ContainerId },
    /// Generic activation (switches, levers)
    Activated,
    /// Target refused the instigator
    Rejected { reason: String },
    /// Inventory engine refused the change
    Failed(InventoryError),
    /// Target does not implement the interactable capability
    NotInteractable,
}

impl InteractionResult {
    /// Check if the interaction had an effect
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::PickedUp { .. } | Self::Opened { .. } | Self::Activated
        )
    }
}

/// Something that can be locked, optionally with a key item
///
/// A key is any held unit of the required item. Locks without a key can only
/// be changed by game logic, never by a character.
pub trait Lockable {
    /// Check if currently locked
    fn is_locked(&self) -> bool;

    /// Item that works the lock, if any
    fn required_key(&self) -> Option<&ItemId>;

    /// Check if the instigator may lock or unlock
    fn can_toggle_lock(&self, instigator: &dyn Inventoriable) -> bool {
        self.required_key()
            .map_or(false, |key| instigator.has_item(key.as_str()))
    }

    /// Flip the lock, returning the new locked state
    ///
    /// Fails with `None` when the instigator holds no key.
    fn toggle_lock(&mut self, instigator: &dyn Inventoriable) -> Option<bool>;
}

/// Something a character can query and act on
pub trait Interactable {
    /// Perform the interaction
    fn interact(&mut self, instigator: &mut dyn Inventoriable) -> InteractionResult;

    /// Check if the instigator may interact right now
    fn can_interact(&self, _instigator: &dyn Inventoriable) -> bool {
        true
    }

    /// Interaction metadata for prompts
    fn interaction_data(&self) -> InteractionData {
        InteractionData::default()
    }

    /// Maximum reach
    fn interaction_distance(&self) -> f32 {
        DEFAULT_INTERACTION_DISTANCE
    }
}
