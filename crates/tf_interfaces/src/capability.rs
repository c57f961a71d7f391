//! Capability contracts
//!
//! Entities declare which capabilities they support instead of inheriting
//! from a base actor type. Callers query the capability set and use the
//! interface accessors to dispatch.

use std::fmt;

use tf_items::{BackpackStats, EquipType, ItemDefinition, ItemInstance};

use crate::error::{AddError, InventoryError, InventoryResult};
use crate::id::EntityId;
use crate::interaction::{Interactable, Lockable};
use crate::SlotIndex;

/// A single capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Can hold items
    Inventoriable,
    /// Can be worn or wielded
    Equippable,
    /// Can be interacted with by a character
    Interactable,
    /// Can be locked and unlocked
    Lockable,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Self::Inventoriable => 1 << 0,
            Self::Equippable => 1 << 1,
            Self::Interactable => 1 << 2,
            Self::Lockable => 1 << 3,
        }
    }

    /// Get a human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inventoriable => "inventoriable",
            Self::Equippable => "equippable",
            Self::Interactable => "interactable",
            Self::Lockable => "lockable",
        }
    }
}

/// Set of capabilities an entity supports
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// The empty set
    pub const EMPTY: Self = Self(0);

    /// Add a capability
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Check membership
    pub const fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Check if no capability is present
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate over present capabilities
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        [
            Capability::Inventoriable,
            Capability::Equippable,
            Capability::Interactable,
            Capability::Lockable,
        ]
        .into_iter()
        .filter(move |c| self.contains(*c))
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|c| c.name())).finish()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Something that can hold items
pub trait Inventoriable {
    /// Entity owning the inventory, if any
    fn owner(&self) -> Option<EntityId>;

    /// Add an item, handing it back on failure
    fn add_item(&mut self, item: ItemInstance) -> Result<SlotIndex, AddError>;

    /// Total units of an item held
    fn count_item(&self, item_id: &str) -> u32;

    /// Check if at least one unit of an item is held
    fn has_item(&self, item_id: &str) -> bool {
        self.count_item(item_id) > 0
    }

    /// How many units of a definition could be added right now
    fn capacity_for(&self, definition: &ItemDefinition) -> u32;

    /// Number of empty general-purpose slots
    fn free_slots(&self) -> usize;

    /// Check if a backpack is equipped
    fn has_backpack(&self) -> bool {
        false
    }

    /// Equip a backpack, extending capacity
    fn equip_backpack(&mut self, _stats: BackpackStats) -> InventoryResult<()> {
        Err(InventoryError::BackpackUnsupported)
    }
}

/// Something that can be worn or wielded
pub trait Equippable {
    /// Equip slot type, or `None` if not equippable
    fn equip_type(&self) -> Option<EquipType>;

    /// Check if it fits a slot of the given type
    fn fits(&self, slot: EquipType) -> bool {
        self.equip_type() == Some(slot)
    }
}

impl Equippable for ItemDefinition {
    fn equip_type(&self) -> Option<EquipType> {
        self.equip_type
    }
}

impl Equippable for ItemInstance {
    fn equip_type(&self) -> Option<EquipType> {
        self.definition().equip_type
    }
}

/// A world entity exposing its capabilities
///
/// The capability set is derived from the accessors, so an implementor only
/// overrides the accessors for what it supports.
pub trait Entity {
    /// Entity id
    fn entity_id(&self) -> EntityId;

    /// Inventory view, if the entity holds items
    fn as_inventoriable(&self) -> Option<&dyn Inventoriable> {
        None
    }

    /// Mutable inventory view
    fn as_inventoriable_mut(&mut self) -> Option<&mut dyn Inventoriable> {
        None
    }

    /// Equippable view
    fn as_equippable(&self) -> Option<&dyn Equippable> {
        None
    }

    /// Interactable view
    fn as_interactable(&self) -> Option<&dyn Interactable> {
        None
    }

    /// Mutable interactable view
    fn as_interactable_mut(&mut self) -> Option<&mut dyn Interactable> {
        None
    }

    /// Lock view
    fn as_lockable(&self) -> Option<&dyn Lockable> {
        None
    }

    /// Mutable lock view
    fn as_lockable_mut(&mut self) -> Option<&mut dyn Lockable> {
        None
    }

    /// Capabilities this entity supports
    fn capabilities(&self) -> CapabilitySet {
        let mut set = CapabilitySet::EMPTY;
        if self.as_inventoriable().is_some() {
            set = set.with(Capability::Inventoriable);
        }
        if self.as_equippable().is_some() {
            set = set.with(Capability::Equippable);
        }
        if self.as_interactable().is_some() {
            set = set.with(Capability::Interactable);
        }
        if self.as_lockable().is_some() {
            set = set.with(Capability::Lockable);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionResult;

    struct Lever {
        id: EntityId,
        pulled: bool,
    }

    impl Interactable for Lever {
        fn interact(&mut self, _instigator: &mut dyn Inventoriable) -> InteractionResult {
            self.pulled = !self.pulled;
            InteractionResult::Activated
        }
    }

    impl Entity for Lever {
        fn entity_id(&self) -> EntityId {
            self.id
        }

        fn as_interactable(&self) -> Option<&dyn Interactable> {
            Some(self)
        }

        fn as_interactable_mut(&mut self) -> Option<&mut dyn Interactable> {
            Some(self)
        }
    }

    struct Rock(EntityId);

    impl Entity for Rock {
        fn entity_id(&self) -> EntityId {
            self.0
        }
    }

    #[test]
    fn test_capability_set() {
        let set: CapabilitySet = [Capability::Interactable, Capability::Equippable]
            .into_iter()
            .collect();

        assert!(set.contains(Capability::Interactable));
        assert!(set.contains(Capability::Equippable));
        assert!(!set.contains(Capability::Inventoriable));
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn test_capabilities_derived_from_accessors() {
        let lever = Lever {
            id: EntityId::new(),
            pulled: false,
        };
        assert!(lever.capabilities().contains(Capability::Interactable));
        assert!(!lever.capabilities().contains(Capability::Inventoriable));
        assert!(!lever.pulled);

        let rock = Rock(EntityId::new());
        assert!(rock.capabilities().is_empty());
    }

    #[test]
    fn test_equippable_definition() {
        let shield = ItemDefinition::new("shield", "Shield").with_equip_type(EquipType::OffHand);
        assert!(shield.fits(EquipType::OffHand));
        assert!(!shield.fits(EquipType::Weapon));

        let apple = ItemDefinition::new("apple", "Apple");
        assert_eq!(Equippable::equip_type(&apple), None);
    }
}
