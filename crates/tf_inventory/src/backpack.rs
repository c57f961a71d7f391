//! Backpacks
//!
//! A backpack appends generic slots after the equip slots and raises the
//! carry weight limit by its bonus. Removing it takes those slots away again
//! and hands back whatever they held.

use std::ops::Range;

use tf_interfaces::{InventoryError, InventoryResult, SlotIndex};
use tf_items::{BackpackStats, ItemInstance};

use crate::container::{InventoryContainer, WEIGHT_EPSILON};
use crate::event::ChangeKind;
use crate::slot::{Slot, SlotKind};

impl InventoryContainer {
    /// Check if a backpack is equipped
    pub fn has_backpack(&self) -> bool {
        self.backpack.is_some()
    }

    /// Equipped backpack
    pub fn backpack(&self) -> Option<BackpackStats> {
        self.backpack
    }

    /// Indices of the backpack slots (empty without a backpack)
    pub fn backpack_slots(&self) -> Range<SlotIndex> {
        self.layout().capacity()..self.slots.len()
    }

    /// Carried weight as a fraction of the limit, clamped to `0.0..=1.0`
    ///
    /// Zero when there is no limit.
    pub fn weight_percent(&self) -> f32 {
        match self.max_weight() {
            Some(limit) if limit > 0.0 => (self.current_weight() / limit).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Equip a backpack, returning the slots it added
    ///
    /// At least one slot is always added and a negative bonus counts as none.
    pub fn equip_backpack(&mut self, stats: BackpackStats) -> InventoryResult<Range<SlotIndex>> {
        if self.backpack.is_some() {
            return Err(InventoryError::BackpackEquipped);
        }

        let stats = BackpackStats::new(stats.slots.max(1), stats.weight_bonus.max(0.0));
        let start = self.slots.len();
        let added = start..start + stats.slots;
        self.slots
            .extend(added.clone().map(|index| Slot::new(index, SlotKind::Generic)));
        self.backpack = Some(stats);

        log::info!(
            "{} equipped a backpack ({} slots, +{:.1} weight)",
            self.id(),
            stats.slots,
            stats.weight_bonus
        );
        self.commit(ChangeKind::BackpackEquipped, added.clone().collect());
        Ok(added)
    }

    /// Remove the backpack, returning the items its slots held
    ///
    /// Fails without touching anything when what stays behind would exceed
    /// the weight limit once the bonus is gone.
    pub fn remove_backpack(&mut self) -> InventoryResult<Vec<ItemInstance>> {
        if self.backpack.is_none() {
            return Err(InventoryError::NoBackpack);
        }
        let removed = self.backpack_slots();

        if let Some(limit) = self.max_weight {
            let kept: f32 = self.slots[..removed.start]
                .iter()
                .filter_map(Slot::item)
                .map(ItemInstance::weight)
                .sum();
            if kept > limit + WEIGHT_EPSILON {
                return Err(InventoryError::WeightLimitExceeded {
                    current: kept,
                    additional: 0.0,
                    limit,
                });
            }
        }

        let displaced: Vec<ItemInstance> = self
            .slots
            .drain(removed.clone())
            .filter_map(|slot| slot.item)
            .collect();
        self.backpack = None;
        self.equip_origins.retain(|_, origin| *origin < removed.start);

        log::info!(
            "{} removed its backpack ({} items displaced)",
            self.id(),
            displaced.len()
        );
        self.commit(ChangeKind::BackpackRemoved, removed.collect());
        Ok(displaced)
    }

    /// Add items one at a time, handing back those that do not fit
    pub fn restore_items(
        &mut self,
        items: impl IntoIterator<Item = ItemInstance>,
    ) -> Vec<ItemInstance> {
        let mut leftovers = Vec::new();
        let mut restored = 0;
        for item in items {
            match self.add(item, None) {
                Ok(_) => restored += 1,
                Err(rejected) => {
                    log::warn!("{} could not restore item: {}", self.id(), rejected.error);
                    leftovers.push(rejected.item);
                }
            }
        }
        log::debug!(
            "{} restored {} items, {} left over",
            self.id(),
            restored,
            leftovers.len()
        );
        leftovers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContainerLayout;
    use std::sync::Arc;
    use tf_items::{EquipType, ItemDefinition, ItemRegistry};

    fn container() -> InventoryContainer {
        let registry = Arc::new(
            ItemRegistry::from_definitions([
                ItemDefinition::new("stone", "Stone")
                    .with_max_stack(10)
                    .with_weight(2.0),
                ItemDefinition::new("hat", "Hat").with_equip_type(EquipType::Head),
            ])
            .unwrap(),
        );
        let layout = ContainerLayout::new(2).with_equip_slot(EquipType::Head);
        InventoryContainer::new(registry, layout).with_max_weight(20.0)
    }

    fn add(inv: &mut InventoryContainer, id: &str, count: u32) -> SlotIndex {
        let item = inv.registry().instantiate(id, count).unwrap();
        inv.add(item, None).unwrap()
    }

    #[test]
    fn test_equip_backpack_appends_slots() {
        let mut inv = container();
        assert!(!inv.has_backpack());
        assert!(inv.backpack_slots().is_empty());

        let added = inv.equip_backpack(BackpackStats::new(3, 10.0)).unwrap();
        assert_eq!(added, 3..6);
        assert_eq!(inv.capacity(), 6);
        assert_eq!(inv.free_slots(), 5);
        assert_eq!(inv.max_weight(), Some(30.0));
        assert_eq!(inv.equip_slot_index(EquipType::Head), Some(2));
        assert_eq!(inv.version(), 1);

        assert!(matches!(
            inv.equip_backpack(BackpackStats::new(1, 0.0)),
            Err(InventoryError::BackpackEquipped)
        ));
        assert_eq!(inv.version(), 1);
    }

    #[test]
    fn test_backpack_slots_fill_after_base_slots() {
        let mut inv = container();
        inv.equip_backpack(BackpackStats::new(2, 10.0)).unwrap();

        assert_eq!(add(&mut inv, "stone", 10), 0);
        assert_eq!(add(&mut inv, "stone", 1), 1);
        inv.split(0, 4).unwrap();
        assert_eq!(inv.slot(3).unwrap().count(), 4);
    }

    #[test]
    fn test_remove_backpack_returns_displaced_items() {
        let mut inv = container();
        inv.equip_backpack(BackpackStats::new(2, 10.0)).unwrap();
        add(&mut inv, "stone", 2);
        let item = inv.registry().instantiate("stone", 3).unwrap();
        inv.add(item, Some(4)).unwrap();
        // the second add merged into slot 0 first
        let item = inv.registry().instantiate("hat", 1).unwrap();
        inv.add(item, Some(4)).unwrap();

        let displaced = inv.remove_backpack().unwrap();
        assert_eq!(displaced.len(), 1);
        assert_eq!(displaced[0].item_id().as_str(), "hat");
        assert_eq!(inv.capacity(), 3);
        assert_eq!(inv.max_weight(), Some(20.0));
        assert_eq!(inv.count_of("stone"), 5);

        assert!(matches!(inv.remove_backpack(), Err(InventoryError::NoBackpack)));
    }

    #[test]
    fn test_remove_backpack_is_all_or_nothing() {
        let mut inv = container();
        inv.equip_backpack(BackpackStats::new(1, 10.0)).unwrap();
        add(&mut inv, "stone", 10);
        add(&mut inv, "stone", 2);
        let before = inv.slots_snapshot();
        let version = inv.version();

        assert!(matches!(
            inv.remove_backpack(),
            Err(InventoryError::WeightLimitExceeded { .. })
        ));
        assert!(inv.has_backpack());
        assert_eq!(inv.slots_snapshot(), before);
        assert_eq!(inv.version(), version);
    }

    #[test]
    fn test_restore_items_returns_leftovers() {
        let mut inv = container();
        let registry = Arc::clone(inv.registry());
        let items = vec![
            registry.instantiate("hat", 1).unwrap(),
            registry.instantiate("stone", 5).unwrap(),
            registry.instantiate("stone", 10).unwrap(),
        ];

        let leftovers = inv.restore_items(items);
        assert_eq!(leftovers.len(), 1);
        assert_eq!(leftovers[0].count(), 10);
        assert_eq!(inv.count_of("stone"), 5);
        assert_eq!(inv.count_of("hat"), 1);
    }

    #[test]
    fn test_weight_percent() {
        let mut inv = container();
        assert_eq!(inv.weight_percent(), 0.0);

        add(&mut inv, "stone", 5);
        assert!((inv.weight_percent() - 0.5).abs() < 1e-6);

        inv.equip_backpack(BackpackStats::new(1, 20.0)).unwrap();
        assert!((inv.weight_percent() - 0.25).abs() < 1e-6);

        let unlimited = InventoryContainer::new(Arc::clone(inv.registry()), ContainerLayout::new(1));
        assert_eq!(unlimited.weight_percent(), 0.0);
    }
}
