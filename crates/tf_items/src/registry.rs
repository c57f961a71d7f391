//! Item registry
//!
//! Owns every item definition for the process. Populated once at startup and
//! read-mostly afterwards; runtime registration goes through the write lock,
//! so there is a single writer and many readers.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RegistryError, Result};
use crate::id::{IdGenerator, InstanceId};
use crate::item::{InstanceState, ItemDefinition, ItemId, ItemInstance};

/// Registry of item definitions
///
/// Constructed explicitly and passed to the engine and UI; there is no global
/// instance, so tests can build isolated registries.
#[derive(Debug, Default)]
pub struct ItemRegistry {
    /// Definitions by id
    definitions: RwLock<HashMap<ItemId, Arc<ItemDefinition>>>,
    /// Instance id source
    instance_ids: IdGenerator,
}

impl ItemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of definitions
    ///
    /// Stops at the first invalid or duplicate definition.
    pub fn from_definitions(definitions: impl IntoIterator<Item = ItemDefinition>) -> Result<Self> {
        let registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Register a new definition
    pub fn register(&self, definition: ItemDefinition) -> Result<Arc<ItemDefinition>> {
        definition
            .validate()
            .map_err(|reason| RegistryError::InvalidDefinition {
                id: definition.id.clone(),
                reason,
            })?;

        let mut definitions = self.definitions.write();
        if definitions.contains_key(&definition.id) {
            return Err(RegistryError::DuplicateDefinition(definition.id));
        }

        let id = definition.id.clone();
        let definition = Arc::new(definition);
        definitions.insert(id.clone(), Arc::clone(&definition));
        log::debug!("Registered item definition '{}'", id);

        Ok(definition)
    }

    /// Look up a definition
    pub fn lookup(&self, id: &str) -> Result<Arc<ItemDefinition>> {
        self.definitions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownItem(ItemId::from(id)))
    }

    /// Check if a definition exists
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.read().contains_key(id)
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }

    /// All registered ids, sorted
    pub fn ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<_> = self.definitions.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Snapshot of all definitions, sorted by id
    pub fn definitions(&self) -> Vec<Arc<ItemDefinition>> {
        let mut definitions: Vec<_> = self.definitions.read().values().cloned().collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }

    /// Create a new instance of a registered item
    ///
    /// Definitions with durability start at full durability.
    pub fn instantiate(&self, id: &str, count: u32) -> Result<ItemInstance> {
        let definition = self.lookup(id)?;
        let state = definition.max_durability.map(InstanceState::with_durability);
        self.build_instance(definition, count, state)
    }

    /// Create an instance with explicit per-instance state
    ///
    /// Used when restoring persisted inventories. State is ignored for
    /// definitions that do not carry any.
    pub fn instantiate_with_state(
        &self,
        id: &str,
        count: u32,
        state: Option<InstanceState>,
    ) -> Result<ItemInstance> {
        let definition = self.lookup(id)?;
        let state = if definition.has_instance_state() {
            state.or_else(|| definition.max_durability.map(InstanceState::with_durability))
        } else {
            None
        };
        self.build_instance(definition, count, state)
    }

    /// Reserve a fresh instance id, e.g. for a stack split
    pub fn mint_instance_id(&self) -> InstanceId {
        self.instance_ids.next()
    }

    fn build_instance(
        &self,
        definition: Arc<ItemDefinition>,
        count: u32,
        state: Option<InstanceState>,
    ) -> Result<ItemInstance> {
        if count == 0 || count > definition.max_stack {
            return Err(RegistryError::InvalidCount {
                id: definition.id.clone(),
                count,
                max_stack: definition.max_stack,
            });
        }
        Ok(ItemInstance::new(
            self.instance_ids.next(),
            definition,
            count,
            state,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{EquipType, ItemCategory};

    fn registry() -> ItemRegistry {
        ItemRegistry::from_definitions([
            ItemDefinition::new("gold", "Gold Coin").with_max_stack(100),
            ItemDefinition::new("iron_sword", "Iron Sword")
                .with_category(ItemCategory::Equipment)
                .with_equip_type(EquipType::Weapon)
                .with_durability(100.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = registry();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("gold").unwrap().max_stack, 100);
        assert!(matches!(
            registry.lookup("silver"),
            Err(RegistryError::UnknownItem(id)) if id.as_str() == "silver"
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = registry();
        let result = registry.register(ItemDefinition::new("gold", "Fake Gold"));

        assert!(matches!(result, Err(RegistryError::DuplicateDefinition(_))));
        assert_eq!(registry.lookup("gold").unwrap().name, "Gold Coin");
    }

    #[test]
    fn test_invalid_definition_rejected() {
        let registry = ItemRegistry::new();
        let result = registry.register(
            ItemDefinition::new("bad_sword", "Bad Sword")
                .with_durability(50.0)
                .with_max_stack(10),
        );

        assert!(matches!(result, Err(RegistryError::InvalidDefinition { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_instantiate() {
        let registry = registry();

        let gold = registry.instantiate("gold", 40).unwrap();
        assert_eq!(gold.count(), 40);
        assert!(gold.state().is_none());

        let sword = registry.instantiate("iron_sword", 1).unwrap();
        assert_eq!(sword.state().unwrap().durability, Some(100.0));
        assert_ne!(gold.id(), sword.id());
    }

    #[test]
    fn test_instantiate_invalid_count() {
        let registry = registry();

        assert!(matches!(
            registry.instantiate("gold", 0),
            Err(RegistryError::InvalidCount { .. })
        ));
        assert!(matches!(
            registry.instantiate("gold", 101),
            Err(RegistryError::InvalidCount { .. })
        ));
    }

    #[test]
    fn test_definitions_are_shared() {
        let registry = registry();
        let a = registry.instantiate("gold", 1).unwrap();
        let b = registry.instantiate("gold", 2).unwrap();

        assert!(Arc::ptr_eq(a.definition(), b.definition()));
    }
}
