//! Character interaction flows: pickups, chests and despawn

use parking_lot::Mutex;
use std::sync::Arc;
use tf_characters::prelude::*;
use tf_inventory::{transfer, InventoryConfig, SlotSnapshot};
use tf_items::{ItemDefinition, ItemRegistry};

fn registry() -> Arc<ItemRegistry> {
    Arc::new(
        ItemRegistry::from_definitions([
            ItemDefinition::new("herb", "Herb").with_max_stack(10),
            ItemDefinition::new("anvil", "Anvil").with_weight(40.0),
            ItemDefinition::new("vault_key", "Vault Key"),
            ItemDefinition::new("rucksack", "Rucksack").with_backpack(3, 40.0),
        ])
        .unwrap(),
    )
}

fn hero(registry: &Arc<ItemRegistry>, slots: usize, max_weight: Option<f32>) -> CharacterInventory {
    let config = InventoryConfig {
        slots,
        equip_slots: Vec::new(),
        max_weight,
    };
    CharacterInventory::spawn(EntityId::new(), Arc::clone(registry), &config).unwrap()
}

#[test]
fn pickup_takes_what_fits_and_leaves_the_rest() {
    let registry = registry();
    let mut hero = hero(&registry, 1, None);
    hero.add_item(registry.instantiate("herb", 4).unwrap()).unwrap();
    let mut herbs = WorldItemPickup::new(Arc::clone(&registry), registry.instantiate("herb", 10).unwrap());

    let result = hero.interact(&mut herbs);
    assert!(matches!(
        result,
        InteractionResult::PickedUp { count: 6, remaining: 4, .. }
    ));
    assert_eq!(hero.count_item("herb"), 10);
    assert_eq!(herbs.remaining(), 4);

    // Full now: the remainder stays in the world.
    assert!(matches!(
        hero.interact(&mut herbs),
        InteractionResult::Failed(InventoryError::InventoryFull { .. })
    ));
    assert_eq!(herbs.remaining(), 4);

    hero.with_container(|c| c.remove(0, 5)).unwrap().unwrap();
    assert!(hero.interact(&mut herbs).is_success());
    assert!(herbs.is_consumed());
    assert_eq!(hero.count_item("herb"), 9);
}

#[test]
fn pickup_respects_weight_limit() {
    let registry = registry();
    let mut hero = hero(&registry, 4, Some(50.0));
    let mut first = WorldItemPickup::new(Arc::clone(&registry), registry.instantiate("anvil", 1).unwrap());
    let mut second = WorldItemPickup::new(Arc::clone(&registry), registry.instantiate("anvil", 1).unwrap());

    assert!(hero.interact(&mut first).is_success());
    assert!(matches!(
        hero.interact(&mut second),
        InteractionResult::Failed(InventoryError::WeightLimitExceeded { .. })
    ));
    assert!(!second.is_consumed());
}

#[test]
fn restricted_pickup_rejects_other_characters() {
    let registry = registry();
    let mut owner = hero(&registry, 2, None);
    let mut thief = hero(&registry, 2, None);
    let mut loot = WorldItemPickup::new(Arc::clone(&registry), registry.instantiate("herb", 3).unwrap())
        .with_allowed_pickers(vec![owner.owner()]);

    assert!(matches!(
        thief.interact(&mut loot),
        InteractionResult::Rejected { .. }
    ));
    assert_eq!(thief.count_item("herb"), 0);
    assert!(owner.interact(&mut loot).is_success());
}

#[test]
fn chest_opens_and_exchanges_items() {
    let registry = registry();
    let mut hero = hero(&registry, 4, None);
    let mut chest = StorageContainer::new(Arc::clone(&registry), "Chest", 10);
    chest
        .container()
        .lock()
        .add(registry.instantiate("herb", 8).unwrap(), None)
        .unwrap();

    let opened = match hero.interact(&mut chest) {
        InteractionResult::Opened { container } => container,
        other => panic!("unexpected result {:?}", other),
    };
    assert_eq!(opened, chest.container().id());

    let mine = hero.container().unwrap();
    let placed = transfer(chest.container(), 0, &mine, Some(5)).unwrap();
    assert_eq!(placed, Some(0));
    assert_eq!(hero.count_item("herb"), 5);
    assert_eq!(chest.container().lock().count_of("herb"), 3);

    transfer(&mine, 0, chest.container(), None).unwrap();
    assert_eq!(hero.count_item("herb"), 0);
    assert_eq!(chest.container().lock().count_of("herb"), 8);
}

#[test]
fn locked_chest_stays_shut() {
    let registry = registry();
    let mut hero = hero(&registry, 4, None);
    let mut chest = StorageContainer::new(Arc::clone(&registry), "Strongbox", 4).locked();

    assert!(matches!(
        hero.interact(&mut chest),
        InteractionResult::Rejected { .. }
    ));
    chest.set_locked(false);
    assert!(hero.interact(&mut chest).is_success());
}

#[test]
fn keyed_chest_opens_for_key_holders() {
    let registry = registry();
    let mut hero = hero(&registry, 4, None);
    let mut chest = StorageContainer::new(Arc::clone(&registry), "Vault", 4)
        .with_required_key("vault_key")
        .locked();

    match hero.interact(&mut chest) {
        InteractionResult::Rejected { reason } => assert!(reason.contains("vault_key")),
        other => panic!("unexpected result {:?}", other),
    }
    assert!(matches!(
        hero.toggle_lock(&mut chest),
        InteractionResult::Rejected { .. }
    ));
    assert!(chest.is_locked());

    let mut key = WorldItemPickup::new(Arc::clone(&registry), registry.instantiate("vault_key", 1).unwrap());
    assert!(hero.interact(&mut key).is_success());

    // Holding the key opens the chest and leaves it unlocked.
    assert!(matches!(
        hero.interact(&mut chest),
        InteractionResult::Opened { .. }
    ));
    assert!(!chest.is_locked());
    assert_eq!(hero.count_item("vault_key"), 1);

    assert!(matches!(hero.toggle_lock(&mut chest), InteractionResult::Activated));
    assert!(chest.is_locked());
    assert!(matches!(hero.toggle_lock(&mut chest), InteractionResult::Activated));
    assert!(!chest.is_locked());

    let mut herbs = WorldItemPickup::new(Arc::clone(&registry), registry.instantiate("herb", 1).unwrap());
    assert!(matches!(
        hero.toggle_lock(&mut herbs),
        InteractionResult::NotInteractable
    ));
}

#[test]
fn backpack_pickup_extends_capacity() {
    let registry = registry();
    let mut hero = hero(&registry, 1, Some(50.0));
    hero.add_item(registry.instantiate("anvil", 1).unwrap()).unwrap();

    let mut pack = WorldItemPickup::new(Arc::clone(&registry), registry.instantiate("rucksack", 1).unwrap());
    assert!(hero.interact(&mut pack).is_success());
    assert!(pack.is_consumed());
    assert!(hero.has_backpack());
    assert_eq!(hero.free_slots(), 3);

    // The bonus makes room for a second anvil in a backpack slot.
    assert!(hero.add_item(registry.instantiate("anvil", 1).unwrap()).is_ok());

    let mut spare = WorldItemPickup::new(Arc::clone(&registry), registry.instantiate("rucksack", 1).unwrap());
    assert!(matches!(
        hero.interact(&mut spare),
        InteractionResult::Rejected { .. }
    ));
    assert!(!spare.is_consumed());

    // The second anvil sat in a backpack slot.
    let displaced = hero.remove_backpack().unwrap();
    assert_eq!(displaced.len(), 1);
    assert_eq!(hero.count_item("anvil"), 1);
    assert!(!hero.has_backpack());
}

#[test]
fn despawn_stops_observers_and_interactions() {
    let registry = registry();
    let mut hero = hero(&registry, 4, None);
    let rows: Arc<Mutex<Vec<SlotSnapshot>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&rows);
    let id = hero.container_id().unwrap();
    hero.register_observer(id, move |event, view| {
        sink.lock().extend(view.slots(&event.slots));
    })
    .unwrap();

    let mut herbs = WorldItemPickup::new(Arc::clone(&registry), registry.instantiate("herb", 4).unwrap());
    assert!(hero.interact(&mut herbs).is_success());
    assert_eq!(rows.lock().len(), 1);

    hero.despawn();

    let mut more = WorldItemPickup::new(Arc::clone(&registry), registry.instantiate("herb", 2).unwrap());
    assert!(matches!(
        hero.interact(&mut more),
        InteractionResult::Failed(InventoryError::CharacterDespawned)
    ));
    assert_eq!(more.remaining(), 2);
    assert_eq!(rows.lock().len(), 1);
}
