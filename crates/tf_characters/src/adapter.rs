//! Character inventory adapter
//!
//! Owns the strong reference to a character's container. The presentation
//! layer only ever receives weak handles and observer registrations, both of
//! which are revoked when the character despawns.

use std::sync::Arc;

use tf_interfaces::{
    AddError, ContainerId, Entity, EntityId, Inventoriable, InteractionResult, InventoryError,
    InventoryResult, SlotIndex,
};
use tf_inventory::{
    ChangeEvent, ConfigError, ContainerHandle, ContainerView, EquipmentSnapshot, InventoryConfig,
    InventoryContainer, ObserverId, SharedContainer,
};
use tf_items::{BackpackStats, ItemDefinition, ItemInstance, ItemRegistry};

/// Observer registered through an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle {
    container: ContainerId,
    id: ObserverId,
}

impl ObserverHandle {
    /// Container the observer is attached to
    pub fn container(&self) -> ContainerId {
        self.container
    }
}

/// A character bound to its inventory container
pub struct CharacterInventory {
    /// Character entity
    owner: EntityId,
    /// Container, `None` after despawn
    container: Option<SharedContainer>,
    /// Observers registered through this adapter
    observers: Vec<ObserverHandle>,
}

impl CharacterInventory {
    /// Spawn a character with a fresh container built from configuration
    pub fn spawn(
        owner: EntityId,
        registry: Arc<ItemRegistry>,
        config: &InventoryConfig,
    ) -> Result<Self, ConfigError> {
        let container = InventoryContainer::from_config(registry, config)?;
        Ok(Self::from_container(owner, container))
    }

    /// Bind a character to an existing container
    pub fn from_container(owner: EntityId, container: InventoryContainer) -> Self {
        let container = container.with_owner(owner);
        log::info!("Spawned {} with {}", owner, container.id());
        Self {
            owner,
            container: Some(SharedContainer::new(container)),
            observers: Vec::new(),
        }
    }

    /// Character entity id
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Check if the character is still spawned
    pub fn is_spawned(&self) -> bool {
        self.container.is_some()
    }

    fn shared(&self) -> InventoryResult<&SharedContainer> {
        self.container
            .as_ref()
            .ok_or(InventoryError::CharacterDespawned)
    }

    /// Shared container, for transfers
    pub fn container(&self) -> InventoryResult<SharedContainer> {
        self.shared().cloned()
    }

    /// Container id
    pub fn container_id(&self) -> InventoryResult<ContainerId> {
        self.shared().map(SharedContainer::id)
    }

    /// Weak read-only handle for the presentation layer
    pub fn handle(&self) -> InventoryResult<ContainerHandle> {
        self.shared().map(SharedContainer::handle)
    }

    /// Copy of the equip slots
    pub fn equipment_set(&self) -> InventoryResult<EquipmentSnapshot> {
        self.with_container(|container| container.equipment().snapshot())
    }

    /// Run an engine operation on the container
    ///
    /// Observers run inside this call; they must not call back into the
    /// same character.
    pub fn with_container<R>(
        &self,
        f: impl FnOnce(&mut InventoryContainer) -> R,
    ) -> InventoryResult<R> {
        let shared = self.shared()?;
        let mut container = shared.lock();
        Ok(f(&mut container))
    }

    /// Register a change observer on the character's container
    pub fn register_observer<F>(
        &mut self,
        container: ContainerId,
        observer: F,
    ) -> InventoryResult<ObserverHandle>
    where
        F: Fn(&ChangeEvent, &ContainerView<'_>) + Send + Sync + 'static,
    {
        let shared = self.shared()?;
        if shared.id() != container {
            return Err(InventoryError::UnknownContainer(container));
        }

        let id = shared.lock().register_observer(observer);
        let handle = ObserverHandle { container, id };
        self.observers.push(handle);
        log::debug!("{} registered observer {} on {}", self.owner, id.raw(), container);
        Ok(handle)
    }

    /// Unregister an observer, returning whether it was registered
    pub fn unregister_observer(&mut self, handle: ObserverHandle) -> InventoryResult<bool> {
        let shared = self.shared()?;
        if shared.id() != handle.container {
            return Err(InventoryError::UnknownContainer(handle.container));
        }

        let removed = shared.lock().unregister_observer(handle.id);
        self.observers.retain(|h| *h != handle);
        Ok(removed)
    }

    /// Revoke every observer and release the container
    ///
    /// Weak handles stop resolving once no other strong reference remains.
    pub fn despawn(&mut self) {
        let Some(shared) = self.container.take() else {
            return;
        };

        {
            let mut container = shared.lock();
            for handle in self.observers.drain(..) {
                container.unregister_observer(handle.id);
            }
        }
        log::info!("Despawned {} ({} released)", self.owner, shared.id());
    }

    /// Take off the backpack, returning the items its slots held
    pub fn remove_backpack(&mut self) -> InventoryResult<Vec<ItemInstance>> {
        self.with_container(|container| container.remove_backpack())?
    }

    /// Lock or unlock a world entity with a held key
    pub fn toggle_lock(&mut self, target: &mut dyn Entity) -> InteractionResult {
        let target_id = target.entity_id();
        let Some(lockable) = target.as_lockable_mut() else {
            return InteractionResult::NotInteractable;
        };
        if !self.is_spawned() {
            return InteractionResult::Failed(InventoryError::CharacterDespawned);
        }
        match lockable.toggle_lock(&*self) {
            Some(locked) => {
                log::debug!("{} set {} locked={}", self.owner, target_id, locked);
                InteractionResult::Activated
            }
            None => InteractionResult::Rejected {
                reason: "Requires a key".to_string(),
            },
        }
    }

    /// Interact with a world entity
    pub fn interact(&mut self, target: &mut dyn Entity) -> InteractionResult {
        let target_id = target.entity_id();
        let Some(interactable) = target.as_interactable_mut() else {
            log::debug!("{} is not interactable", target_id);
            return InteractionResult::NotInteractable;
        };
        if !self.is_spawned() {
            return InteractionResult::Failed(InventoryError::CharacterDespawned);
        }
        if !interactable.can_interact(&*self) {
            return InteractionResult::Rejected {
                reason: format!("{} refused {}", target_id, self.owner),
            };
        }

        let result = interactable.interact(self);
        log::debug!("{} interacted with {}: {:?}", self.owner, target_id, result);
        result
    }
}

impl Drop for CharacterInventory {
    fn drop(&mut self) {
        self.despawn();
    }
}

impl std::fmt::Debug for CharacterInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterInventory")
            .field("owner", &self.owner)
            .field("container", &self.container)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Inventoriable for CharacterInventory {
    fn owner(&self) -> Option<EntityId> {
        Some(self.owner)
    }

    fn add_item(&mut self, item: ItemInstance) -> Result<SlotIndex, AddError> {
        match &self.container {
            Some(shared) => shared.lock().add(item, None),
            None => Err(AddError::new(InventoryError::CharacterDespawned, item)),
        }
    }

    fn count_item(&self, item_id: &str) -> u32 {
        self.with_container(|c| c.count_of(item_id)).unwrap_or(0)
    }

    fn capacity_for(&self, definition: &ItemDefinition) -> u32 {
        self.with_container(|c| c.capacity_for(definition))
            .unwrap_or(0)
    }

    fn free_slots(&self) -> usize {
        self.with_container(|c| c.free_slots()).unwrap_or(0)
    }

    fn has_backpack(&self) -> bool {
        self.with_container(|c| c.has_backpack()).unwrap_or(false)
    }

    fn equip_backpack(&mut self, stats: BackpackStats) -> InventoryResult<()> {
        self.with_container(|c| c.equip_backpack(stats).map(|_| ()))?
    }
}

impl Entity for CharacterInventory {
    fn entity_id(&self) -> EntityId {
        self.owner
    }

    fn as_inventoriable(&self) -> Option<&dyn Inventoriable> {
        Some(self)
    }

    fn as_inventoriable_mut(&mut self) -> Option<&mut dyn Inventoriable> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tf_interfaces::{Capability, Interactable};
    use tf_items::EquipType;

    fn registry() -> Arc<ItemRegistry> {
        Arc::new(
            ItemRegistry::from_definitions([
                ItemDefinition::new("bread", "Bread").with_max_stack(10),
                ItemDefinition::new("hat", "Hat").with_equip_type(EquipType::Head),
            ])
            .unwrap(),
        )
    }

    fn spawn() -> CharacterInventory {
        let config = InventoryConfig {
            slots: 4,
            equip_slots: vec!["head".into()],
            max_weight: None,
        };
        CharacterInventory::spawn(EntityId::new(), registry(), &config).unwrap()
    }

    #[test]
    fn test_spawn_binds_owner() {
        let hero = spawn();
        let owner = hero.with_container(|c| c.owner()).unwrap();
        assert_eq!(owner, Some(hero.owner()));
        assert!(hero.capabilities().contains(Capability::Inventoriable));
    }

    #[test]
    fn test_inventoriable_delegates() {
        let mut hero = spawn();
        let registry = hero.with_container(|c| Arc::clone(c.registry())).unwrap();

        hero.add_item(registry.instantiate("bread", 6).unwrap()).unwrap();
        assert_eq!(hero.count_item("bread"), 6);
        assert!(hero.has_item("bread"));
        assert_eq!(hero.free_slots(), 3);

        let bread = registry.lookup("bread").unwrap();
        assert_eq!(hero.capacity_for(&bread), 4 + 3 * 10);
    }

    #[test]
    fn test_backpack_round_trip() {
        let mut hero = spawn();
        let registry = hero.with_container(|c| Arc::clone(c.registry())).unwrap();
        assert!(!hero.has_backpack());

        hero.equip_backpack(BackpackStats::new(2, 0.0)).unwrap();
        assert!(hero.has_backpack());
        assert_eq!(hero.free_slots(), 6);
        assert!(matches!(
            hero.equip_backpack(BackpackStats::new(2, 0.0)),
            Err(InventoryError::BackpackEquipped)
        ));

        hero.with_container(|c| {
            let bread = registry.instantiate("bread", 3).unwrap();
            c.add(bread, Some(6)).unwrap();
        })
        .unwrap();
        let displaced = hero.remove_backpack().unwrap();
        assert_eq!(displaced.len(), 1);
        assert_eq!(displaced[0].count(), 3);
        assert_eq!(hero.count_item("bread"), 0);
        assert!(matches!(hero.remove_backpack(), Err(InventoryError::NoBackpack)));
    }

    #[test]
    fn test_equipment_set() {
        let hero = spawn();
        let registry = hero.with_container(|c| Arc::clone(c.registry())).unwrap();
        hero.with_container(|c| {
            let slot = c.add(registry.instantiate("hat", 1).unwrap(), None).unwrap();
            c.equip(slot).unwrap();
        })
        .unwrap();

        let set = hero.equipment_set().unwrap();
        assert!(set.is_occupied(EquipType::Head));
    }

    #[test]
    fn test_observer_registration() {
        let mut hero = spawn();
        let calls = Arc::new(AtomicUsize::new(0));
        let id = hero.container_id().unwrap();

        let sink = Arc::clone(&calls);
        let handle = hero
            .register_observer(id, move |_, _| {
                sink.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(handle.container(), id);

        let registry = hero.with_container(|c| Arc::clone(c.registry())).unwrap();
        hero.add_item(registry.instantiate("bread", 1).unwrap()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(hero.unregister_observer(handle).unwrap());
        hero.add_item(registry.instantiate("bread", 1).unwrap()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wrong_container_id() {
        let mut hero = spawn();
        let other = spawn();
        let foreign = other.container_id().unwrap();

        assert!(matches!(
            hero.register_observer(foreign, |_, _| {}),
            Err(InventoryError::UnknownContainer(id)) if id == foreign
        ));
    }

    #[test]
    fn test_despawn_revokes_everything() {
        let mut hero = spawn();
        let id = hero.container_id().unwrap();
        let handle = hero.handle().unwrap();
        hero.register_observer(id, |_, _| {}).unwrap();

        hero.despawn();

        assert!(!hero.is_spawned());
        assert!(!handle.is_alive());
        assert!(matches!(
            hero.container(),
            Err(InventoryError::CharacterDespawned)
        ));
        assert_eq!(hero.count_item("bread"), 0);

        let registry = registry();
        let err = hero.add_item(registry.instantiate("bread", 2).unwrap()).unwrap_err();
        assert!(matches!(err.error, InventoryError::CharacterDespawned));
        assert_eq!(err.item.count(), 2);
    }

    struct Door {
        id: EntityId,
        open: bool,
    }

    impl Interactable for Door {
        fn interact(&mut self, _instigator: &mut dyn Inventoriable) -> InteractionResult {
            self.open = !self.open;
            InteractionResult::Activated
        }
    }

    impl Entity for Door {
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

    struct Boulder(EntityId);

    impl Entity for Boulder {
        fn entity_id(&self) -> EntityId {
            self.0
        }
    }

    #[test]
    fn test_interact_dispatch() {
        let mut hero = spawn();
        let mut door = Door {
            id: EntityId::new(),
            open: false,
        };

        assert!(matches!(hero.interact(&mut door), InteractionResult::Activated));
        assert!(door.open);

        let mut boulder = Boulder(EntityId::new());
        assert!(matches!(
            hero.interact(&mut boulder),
            InteractionResult::NotInteractable
        ));

        hero.despawn();
        assert!(matches!(
            hero.interact(&mut door),
            InteractionResult::Failed(InventoryError::CharacterDespawned)
        ));
    }
}
