//! Change events and observers
//!
//! Observers are invoked synchronously, in registration order, after every
//! successful mutation and before the mutating call returns. A failed
//! operation never notifies.
//!
//! Observers run while the container is borrowed. They receive a read-only
//! [`ContainerView`] and must not try to reach the container another way
//! (for example through a shared handle), which would deadlock.

use serde::{Deserialize, Serialize};
use std::fmt;
use tf_interfaces::{ContainerId, SlotIndex};

use crate::container::InventoryContainer;
use crate::slot::SlotSnapshot;

/// What kind of mutation happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Item added (merged or placed)
    Added,
    /// Units removed
    Removed,
    /// Units dropped into the world
    Dropped,
    /// Stack moved to an empty slot
    Moved,
    /// Units merged into a compatible stack
    Merged,
    /// Two stacks exchanged slots
    Swapped,
    /// Stack split into a new slot
    Split,
    /// Item moved into an equip slot
    Equipped,
    /// Item moved out of an equip slot
    Unequipped,
    /// Contents replaced from a snapshot
    Restored,
    /// Units received from another container
    TransferredIn,
    /// Units sent to another container
    TransferredOut,
    /// Backpack slots appended
    BackpackEquipped,
    /// Backpack slots removed
    BackpackRemoved,
}

/// A single committed mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Container that changed
    pub container: ContainerId,
    /// Container version after the change
    pub version: u64,
    /// Kind of change
    pub kind: ChangeKind,
    /// Affected slots
    pub slots: Vec<SlotIndex>,
}

impl ChangeEvent {
    /// Check if a slot was affected
    pub fn touches(&self, slot: SlotIndex) -> bool {
        self.slots.contains(&slot)
    }
}

/// Observer registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Get the raw ID
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Observer callback
pub type Observer = Box<dyn Fn(&ChangeEvent, &ContainerView<'_>) + Send + Sync>;

/// Registered observers, in registration order
#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    entries: Vec<(ObserverId, Observer)>,
}

impl ObserverList {
    pub(crate) fn register(&mut self, observer: Observer) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify(&self, event: &ChangeEvent, view: &ContainerView<'_>) {
        for (_, observer) in &self.entries {
            observer(event, view);
        }
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// Read-only view handed to observers
#[derive(Clone, Copy)]
pub struct ContainerView<'a> {
    container: &'a InventoryContainer,
}

impl<'a> ContainerView<'a> {
    pub(crate) fn new(container: &'a InventoryContainer) -> Self {
        Self { container }
    }

    /// Container id
    pub fn id(&self) -> ContainerId {
        self.container.id()
    }

    /// Current version
    pub fn version(&self) -> u64 {
        self.container.version()
    }

    /// Total slot count
    pub fn capacity(&self) -> usize {
        self.container.capacity()
    }

    /// Snapshot of a single slot
    pub fn slot(&self, index: SlotIndex) -> Option<SlotSnapshot> {
        self.container.slot_snapshot(index)
    }

    /// Snapshots of the given slots, skipping invalid indices
    pub fn slots(&self, indices: &[SlotIndex]) -> Vec<SlotSnapshot> {
        indices.iter().filter_map(|&i| self.slot(i)).collect()
    }

    /// Snapshots of every slot
    pub fn all_slots(&self) -> Vec<SlotSnapshot> {
        self.container.slots_snapshot()
    }

    /// Total units of an item held
    pub fn count_of(&self, item_id: &str) -> u32 {
        self.container.count_of(item_id)
    }

    /// Current carried weight
    pub fn current_weight(&self) -> f32 {
        self.container.current_weight()
    }

    /// Carried weight as a fraction of the limit
    pub fn weight_percent(&self) -> f32 {
        self.container.weight_percent()
    }
}

impl fmt::Debug for ContainerView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerView")
            .field("id", &self.id())
            .field("version", &self.version())
            .finish()
    }
}
