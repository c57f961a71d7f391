//! World storage containers (chests, crates)

use std::sync::Arc;

use tf_interfaces::{
    Entity, EntityId, Interactable, InteractionData, InteractionResult, Inventoriable, Lockable,
};
use tf_inventory::{ContainerLayout, InventoryContainer, SharedContainer};
use tf_items::{ItemId, ItemRegistry};

/// Default chest capacity
pub const DEFAULT_STORAGE_SLOTS: usize = 10;

/// A storage chest with its own container
///
/// Interacting opens it; items then move between the chest and a character
/// through `tf_inventory::transfer`. A locked chest with a required key opens
/// for anyone holding the key, unlocking it on the way.
pub struct StorageContainer {
    /// Entity id
    id: EntityId,
    /// Display name
    name: String,
    /// Chest contents
    container: SharedContainer,
    /// Locked chests refuse to open
    locked: bool,
    /// Item that locks and unlocks the chest
    key: Option<ItemId>,
}

impl StorageContainer {
    /// Create a chest with generic slots only
    pub fn new(registry: Arc<ItemRegistry>, name: impl Into<String>, slots: usize) -> Self {
        let id = EntityId::new();
        let container = InventoryContainer::new(registry, ContainerLayout::new(slots.max(1)))
            .with_owner(id);
        Self {
            id,
            name: name.into(),
            container: SharedContainer::new(container),
            locked: false,
            key: None,
        }
    }

    /// Require a key item to unlock or lock
    pub fn with_required_key(mut self, key: impl Into<ItemId>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Start locked
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chest contents
    pub fn container(&self) -> &SharedContainer {
        &self.container
    }

    /// Check if locked
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lock or unlock
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}

impl Lockable for StorageContainer {
    fn is_locked(&self) -> bool {
        self.locked
    }

    fn required_key(&self) -> Option<&ItemId> {
        self.key.as_ref()
    }

    fn toggle_lock(&mut self, instigator: &dyn Inventoriable) -> Option<bool> {
        if !self.can_toggle_lock(instigator) {
            return None;
        }
        self.locked = !self.locked;
        log::info!(
            "{} {} by {:?}",
            self.name,
            if self.locked { "locked" } else { "unlocked" },
            instigator.owner()
        );
        Some(self.locked)
    }
}

impl Interactable for StorageContainer {
    fn interact(&mut self, instigator: &mut dyn Inventoriable) -> InteractionResult {
        if self.locked && self.toggle_lock(&*instigator).is_none() {
            let reason = match &self.key {
                Some(key) => format!("{} is locked (needs '{}')", self.name, key),
                None => format!("{} is locked", self.name),
            };
            return InteractionResult::Rejected { reason };
        }
        log::debug!(
            "{} opened by {:?}",
            self.name,
            instigator.owner()
        );
        InteractionResult::Opened {
            container: self.container.id(),
        }
    }

    fn interaction_data(&self) -> InteractionData {
        let prompt = if self.locked && self.key.is_some() {
            format!("Unlock {}", self.name)
        } else {
            format!("Open {}", self.name)
        };
        InteractionData {
            can_interact: !self.locked || self.key.is_some(),
            prompt,
            ..Default::default()
        }
    }
}

impl Entity for StorageContainer {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn as_interactable(&self) -> Option<&dyn Interactable> {
        Some(self)
    }

    fn as_interactable_mut(&mut self) -> Option<&mut dyn Interactable> {
        Some(self)
    }

    fn as_lockable(&self) -> Option<&dyn Lockable> {
        Some(self)
    }

    fn as_lockable_mut(&mut self) -> Option<&mut dyn Lockable> {
        Some(self)
    }
}

impl std::fmt::Debug for StorageContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageContainer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("container", &self.container)
            .field("locked", &self.locked)
            .field("key", &self.key)
            .finish()
    }
}
