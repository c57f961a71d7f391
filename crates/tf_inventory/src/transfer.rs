//! Shared containers and cross-container transfers
//!
//! A [`SharedContainer`] serializes every mutation of one container behind a
//! mutex. Operations spanning two containers lock both in ascending
//! [`ContainerId`] order, so concurrent transfers in opposite directions
//! cannot deadlock.

use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::{Arc, Weak};
use tf_interfaces::{ContainerId, InventoryError, InventoryResult, SlotIndex};

use crate::container::InventoryContainer;
use crate::event::{ChangeKind, ContainerView, ObserverId};

/// Reference-counted, lock-protected container
#[derive(Clone)]
pub struct SharedContainer {
    id: ContainerId,
    inner: Arc<Mutex<InventoryContainer>>,
}

impl SharedContainer {
    /// Wrap a container
    pub fn new(container: InventoryContainer) -> Self {
        Self {
            id: container.id(),
            inner: Arc::new(Mutex::new(container)),
        }
    }

    /// Container id, readable without locking
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Lock for reading or mutation
    pub fn lock(&self) -> MutexGuard<'_, InventoryContainer> {
        self.inner.lock()
    }

    /// Weak, read-only handle
    pub fn handle(&self) -> ContainerHandle {
        ContainerHandle {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Check if both refer to the same container
    pub fn ptr_eq(&self, other: &SharedContainer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<InventoryContainer> for SharedContainer {
    fn from(container: InventoryContainer) -> Self {
        Self::new(container)
    }
}

impl fmt::Debug for SharedContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedContainer")
            .field("id", &self.id)
            .field("strong", &Arc::strong_count(&self.inner))
            .finish()
    }
}

/// Weak handle handed to the presentation layer
///
/// Never keeps the container alive and only exposes read access.
#[derive(Clone)]
pub struct ContainerHandle {
    id: ContainerId,
    inner: Weak<Mutex<InventoryContainer>>,
}

impl ContainerHandle {
    /// Container id
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Check if the container still exists
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Read the container, if it still exists
    ///
    /// Must not be called from inside an observer of the same container.
    pub fn read<R>(&self, f: impl FnOnce(&ContainerView<'_>) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let container = inner.lock();
        Some(f(&ContainerView::new(&container)))
    }

    /// Remove an observer registered directly on the container
    ///
    /// Returns `false` when the container is gone or the id is unknown.
    pub fn unregister_observer(&self, id: ObserverId) -> bool {
        self.inner
            .upgrade()
            .map_or(false, |inner| inner.lock().unregister_observer(id))
    }
}

impl fmt::Debug for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerHandle")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Lock two distinct containers in ascending id order
///
/// Guards are returned in argument order.
pub fn lock_pair<'a>(
    first: &'a SharedContainer,
    second: &'a SharedContainer,
) -> InventoryResult<(
    MutexGuard<'a, InventoryContainer>,
    MutexGuard<'a, InventoryContainer>,
)> {
    if first.ptr_eq(second) || first.id == second.id {
        return Err(InventoryError::SameContainer);
    }
    if first.id < second.id {
        let a = first.lock();
        let b = second.lock();
        Ok((a, b))
    } else {
        let b = second.lock();
        let a = first.lock();
        Ok((a, b))
    }
}

/// Move units from a slot of one container into another
///
/// `None` moves the whole stack. The destination is checked before anything
/// is removed, so a rejected transfer leaves both containers untouched.
/// Returns the destination slot, or `None` for a zero count.
pub fn transfer(
    source: &SharedContainer,
    slot: SlotIndex,
    destination: &SharedContainer,
    count: Option<u32>,
) -> InventoryResult<Option<SlotIndex>> {
    let (mut src, mut dst) = lock_pair(source, destination)?;
    src.transfer_to(&mut dst, slot, count)
}

impl InventoryContainer {
    /// Move units into another container already borrowed by the caller
    pub fn transfer_to(
        &mut self,
        destination: &mut InventoryContainer,
        slot: SlotIndex,
        count: Option<u32>,
    ) -> InventoryResult<Option<SlotIndex>> {
        self.check_slot(slot)?;
        if count == Some(0) {
            return Ok(None);
        }
        let item = self.slots[slot]
            .item
            .as_ref()
            .ok_or(InventoryError::EmptySlot(slot))?;
        let available = item.count();
        let amount = count.unwrap_or(available);
        if amount > available {
            return Err(InventoryError::InsufficientCount {
                slot,
                requested: amount,
                available,
            });
        }

        destination.plan_add(item.definition(), amount, item.state().is_some(), None)?;

        let portion = self
            .take_units(slot, amount)
            .ok_or(InventoryError::EmptySlot(slot))?;
        let item_id = portion.item_id().clone();

        match destination.add_as(portion, None, ChangeKind::TransferredIn) {
            Ok(target) => {
                self.sync_equip_origin(slot);
                log::debug!(
                    "Transferred {} x '{}' from {} slot {} to {} slot {}",
                    amount,
                    item_id,
                    self.id(),
                    slot,
                    destination.id(),
                    target
                );
                self.commit(ChangeKind::TransferredOut, vec![slot]);
                Ok(Some(target))
            }
            Err(rejected) => {
                let (error, portion) = rejected.into_parts();
                log::error!(
                    "{} rejected '{}' after a successful check: {}",
                    destination.id(),
                    item_id,
                    error
                );
                self.put_back(slot, portion);
                Err(error)
            }
        }
    }
}
