//! Property-based tests for container invariants
//!
//! Validates, for arbitrary operation sequences:
//! - Per-item totals equal successful adds minus successful removals
//! - Stacks never exceed their max stack size
//! - Failed operations leave every slot and the version unchanged
//! - Every visible change bumps the version by exactly one, and only a
//!   visible change bumps it
//! - Observers see exactly one event per version

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tf_inventory::prelude::*;
use tf_items::{ItemDefinition, ItemRegistry};

const ITEMS: &[(&str, u32)] = &[
    ("potion", 5),
    ("stone", 10),
    ("sword", 1),
    ("mail", 1),
    ("ring", 1),
];

const EQUIP_TYPES: &[EquipType] = &[EquipType::Weapon, EquipType::Armor, EquipType::Accessory];

fn registry() -> Arc<ItemRegistry> {
    Arc::new(
        ItemRegistry::from_definitions([
            ItemDefinition::new("potion", "Potion").with_max_stack(5),
            ItemDefinition::new("stone", "Stone").with_max_stack(10),
            ItemDefinition::new("sword", "Sword")
                .with_equip_type(EquipType::Weapon)
                .with_durability(50.0),
            ItemDefinition::new("mail", "Mail").with_equip_type(EquipType::Armor),
            ItemDefinition::new("ring", "Ring").with_equip_type(EquipType::Accessory),
        ])
        .unwrap(),
    )
}

fn container() -> InventoryContainer {
    InventoryContainer::new(
        registry(),
        ContainerLayout::new(6).with_equip_slots(EQUIP_TYPES.iter().copied()),
    )
}

#[derive(Debug, Clone)]
enum Op {
    Add {
        item: usize,
        count: u32,
        preferred: Option<usize>,
    },
    Remove {
        slot: usize,
        count: u32,
    },
    Drop {
        slot: usize,
        count: u32,
    },
    Move {
        from: usize,
        to: usize,
        count: Option<u32>,
    },
    Split {
        slot: usize,
        count: u32,
    },
    Equip {
        slot: usize,
        swap: bool,
    },
    Unequip {
        equip: usize,
    },
    EquipBackpack {
        slots: usize,
    },
    RemoveBackpack,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // Slot indices go one past capacity to exercise InvalidSlot.
    prop_oneof![
        3 => (0..ITEMS.len(), 1u32..=10, proptest::option::of(0usize..10))
            .prop_map(|(item, count, preferred)| Op::Add { item, count, preferred }),
        1 => (0usize..10, 0u32..8).prop_map(|(slot, count)| Op::Remove { slot, count }),
        1 => (0usize..10, 0u32..8).prop_map(|(slot, count)| Op::Drop { slot, count }),
        2 => (0usize..10, 0usize..10, proptest::option::of(0u32..8))
            .prop_map(|(from, to, count)| Op::Move { from, to, count }),
        1 => (0usize..10, 0u32..8).prop_map(|(slot, count)| Op::Split { slot, count }),
        1 => (0usize..10, any::<bool>()).prop_map(|(slot, swap)| Op::Equip { slot, swap }),
        1 => (0..EQUIP_TYPES.len()).prop_map(|equip| Op::Unequip { equip }),
        1 => (0usize..4).prop_map(|slots| Op::EquipBackpack { slots }),
        1 => Just(Op::RemoveBackpack),
    ]
}

/// Apply an op, returning the signed change per item id, or `None` on failure
fn apply(inv: &mut InventoryContainer, op: &Op) -> Option<HashMap<String, i64>> {
    let mut delta = HashMap::new();
    let removed = |delta: &mut HashMap<String, i64>, item: Option<tf_items::ItemInstance>| {
        if let Some(item) = item {
            *delta.entry(item.item_id().to_string()).or_insert(0) -= item.count() as i64;
        }
    };

    match op {
        Op::Add {
            item,
            count,
            preferred,
        } => {
            let (id, max) = ITEMS[*item];
            let count = (*count).min(max);
            let instance = inv.registry().instantiate(id, count).ok()?;
            inv.add(instance, *preferred).ok()?;
            delta.insert(id.to_string(), count as i64);
        }
        Op::Remove { slot, count } => removed(&mut delta, inv.remove(*slot, *count).ok()?),
        Op::Drop { slot, count } => removed(&mut delta, inv.drop_item(*slot, *count).ok()?),
        Op::Move { from, to, count } => inv.move_item(*from, *to, *count).ok()?,
        Op::Split { slot, count } => {
            inv.split(*slot, *count).ok()?;
        }
        Op::Equip { slot, swap } => {
            let policy = if *swap {
                EquipPolicy::Swap
            } else {
                EquipPolicy::FailIfOccupied
            };
            inv.equip_with(*slot, policy).ok()?;
        }
        Op::Unequip { equip } => {
            inv.unequip(EQUIP_TYPES[*equip]).ok()?;
        }
        Op::EquipBackpack { slots } => {
            inv.equip_backpack(BackpackStats::new(*slots, 0.0)).ok()?;
        }
        Op::RemoveBackpack => {
            for item in inv.remove_backpack().ok()? {
                removed(&mut delta, Some(item));
            }
        }
    }
    Some(delta)
}

proptest! {
    /// Property: container invariants hold after every operation
    #[test]
    fn operations_preserve_invariants(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut inv = container();
        let events = Arc::new(AtomicU64::new(0));
        let sink = Arc::clone(&events);
        inv.register_observer(move |_, _| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        let mut expected: HashMap<String, i64> = HashMap::new();

        for op in &ops {
            let before = inv.slots_snapshot();
            let version = inv.version();

            match apply(&mut inv, op) {
                Some(delta) => {
                    for (id, change) in delta {
                        *expected.entry(id).or_insert(0) += change;
                    }
                    let after = inv.slots_snapshot();
                    if after != before {
                        prop_assert_eq!(inv.version(), version + 1, "{:?} changed slots", op);
                    } else {
                        prop_assert_eq!(inv.version(), version, "{:?} bumped the version without a change", op);
                    }
                }
                None => {
                    prop_assert_eq!(&inv.slots_snapshot(), &before, "{:?} failed but changed slots", op);
                    prop_assert_eq!(inv.version(), version, "{:?} failed but bumped version", op);
                }
            }

            for (id, max) in ITEMS {
                prop_assert_eq!(
                    inv.count_of(id) as i64,
                    expected.get(*id).copied().unwrap_or(0),
                    "conservation broken for '{}' after {:?}", id, op
                );
                for slot in inv.slots() {
                    if let Some(item) = slot.item() {
                        if item.item_id().as_str() == *id {
                            prop_assert!(item.count() >= 1 && item.count() <= *max);
                        }
                    }
                }
            }

            for slot in inv.slots() {
                if let (SlotKind::Equip(t), Some(item)) = (slot.kind(), slot.item()) {
                    prop_assert_eq!(item.equip_type(), Some(t));
                }
            }
        }

        prop_assert_eq!(events.load(Ordering::SeqCst), inv.version());
    }

    /// Property: equipping then unequipping restores the slots
    #[test]
    fn equip_unequip_round_trip(
        fillers in prop::collection::vec((0usize..2, 1u32..=5), 0..5),
        preferred in 0usize..6,
    ) {
        let mut inv = container();
        for (item, count) in fillers {
            let (id, max) = ITEMS[item];
            let instance = inv.registry().instantiate(id, count.min(max)).unwrap();
            let _ = inv.add(instance, None);
        }

        let sword = inv.registry().instantiate("sword", 1).unwrap();
        let slot = match inv.add(sword, Some(preferred)) {
            Ok(slot) => slot,
            Err(_) => return Ok(()),
        };
        let before = inv.slots_snapshot();

        inv.equip(slot).unwrap();
        prop_assert!(inv.equipment().is_occupied(EquipType::Weapon));
        prop_assert_eq!(inv.unequip(EquipType::Weapon).unwrap(), slot);
        prop_assert_eq!(inv.slots_snapshot(), before);
    }

    /// Property: a move onto a stack never overfills it and conserves units
    #[test]
    fn move_merge_respects_max_stack(a in 1u32..=5, b in 1u32..=5, amount in 1u32..=5) {
        let mut inv = container();
        let stacks = ContainerSnapshot::new()
            .with_entry(0, "potion", a, None)
            .with_entry(1, "potion", b, None);
        inv.restore(&stacks, RestoreMode::Strict).unwrap();

        let amount = amount.min(b);
        let result = inv.move_item(1, 0, Some(amount));
        prop_assert!(result.is_ok());

        let slot0 = inv.slot(0).unwrap().count();
        let slot1 = inv.slot(1).unwrap().count();
        prop_assert!(slot0 <= 5);
        prop_assert_eq!(slot0 + slot1, a + b);
        prop_assert_eq!(slot0, (a + amount).min(5));
    }
}
