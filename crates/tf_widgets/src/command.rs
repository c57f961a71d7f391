//! UI commands

use serde::{Deserialize, Serialize};
use tf_interfaces::{InventoryResult, SlotIndex};
use tf_inventory::{InventoryContainer, ItemSnapshot};
use tf_items::{EquipType, ItemInstance};

/// A player action on an inventory panel
///
/// Commands carry exactly what the player did; the engine decides whether
/// it is legal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UiCommand {
    /// Drag a stack (or part of it) onto another slot
    Move {
        from: SlotIndex,
        to: SlotIndex,
        #[serde(default)]
        count: Option<u32>,
    },
    /// Split units off into a free slot
    Split { slot: SlotIndex, count: u32 },
    /// Equip the item in a slot
    Equip {
        slot: SlotIndex,
        #[serde(default)]
        swap: bool,
    },
    /// Unequip an equip slot
    Unequip { equip_type: EquipType },
    /// Drop units into the world
    Drop { slot: SlotIndex, count: u32 },
    /// Inspect a slot
    Examine { slot: SlotIndex },
}

/// What a successful command produced
#[derive(Debug)]
pub enum CommandOutcome {
    /// Move finished (possibly a no-op)
    Moved,
    /// Split landed in this slot, `None` for a zero count
    Split(Option<SlotIndex>),
    /// Item now sits in this equip slot
    Equipped(SlotIndex),
    /// Item returned to this generic slot
    Unequipped(SlotIndex),
    /// Dropped units, for the caller to place in the world
    Dropped(Option<ItemInstance>),
    /// Copy of the examined slot's item
    Examined(Option<ItemSnapshot>),
}

impl UiCommand {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Split { .. } => "split",
            Self::Equip { .. } => "equip",
            Self::Unequip { .. } => "unequip",
            Self::Drop { .. } => "drop",
            Self::Examine { .. } => "examine",
        }
    }

    /// Run the command against a container
    pub fn apply(&self, container: &mut InventoryContainer) -> InventoryResult<CommandOutcome> {
        match *self {
            Self::Move { from, to, count } => {
                container.move_item(from, to, count)?;
                Ok(CommandOutcome::Moved)
            }
            Self::Split { slot, count } => container.split(slot, count).map(CommandOutcome::Split),
            Self::Equip { slot, swap } => {
                let policy = if swap {
                    tf_inventory::EquipPolicy::Swap
                } else {
                    tf_inventory::EquipPolicy::FailIfOccupied
                };
                container
                    .equip_with(slot, policy)
                    .map(CommandOutcome::Equipped)
            }
            Self::Unequip { equip_type } => {
                container.unequip(equip_type).map(CommandOutcome::Unequipped)
            }
            Self::Drop { slot, count } => {
                container.drop_item(slot, count).map(CommandOutcome::Dropped)
            }
            Self::Examine { slot } => {
                let snapshot = container.slot_snapshot(slot).ok_or(
                    tf_interfaces::InventoryError::InvalidSlot {
                        slot,
                        capacity: container.capacity(),
                    },
                )?;
                Ok(CommandOutcome::Examined(snapshot.item))
            }
        }
    }
}
