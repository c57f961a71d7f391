//! Equipment view over a container's equip slots
//!
//! Equip slots live in the container itself, so exclusivity (one item per
//! equip type) falls out of the slot array. This module only adds a typed
//! view and the policy for equipping into an occupied slot.

use serde::{Deserialize, Serialize};
use tf_interfaces::SlotIndex;
use tf_items::{EquipType, ItemInstance};

use crate::container::InventoryContainer;
use crate::slot::SlotSnapshot;

/// What to do when the target equip slot is occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EquipPolicy {
    /// Fail with `SlotOccupied`
    #[default]
    FailIfOccupied,
    /// Move the equipped item into the vacated generic slot
    Swap,
}

/// Borrowed view of the equip slots
#[derive(Clone, Copy)]
pub struct EquipmentSet<'a> {
    container: &'a InventoryContainer,
}

impl<'a> EquipmentSet<'a> {
    pub(crate) fn new(container: &'a InventoryContainer) -> Self {
        Self { container }
    }

    /// Configured equip types, in slot order
    pub fn types(&self) -> &'a [EquipType] {
        self.container.layout().equip_slots()
    }

    /// Check if the container has a slot for a type
    pub fn has_slot(&self, equip_type: EquipType) -> bool {
        self.slot_of(equip_type).is_some()
    }

    /// Slot index for a type
    pub fn slot_of(&self, equip_type: EquipType) -> Option<SlotIndex> {
        self.container.equip_slot_index(equip_type)
    }

    /// Item equipped for a type
    pub fn equipped(&self, equip_type: EquipType) -> Option<&'a ItemInstance> {
        let index = self.slot_of(equip_type)?;
        self.container.slot(index)?.item()
    }

    /// Check if a type is occupied
    pub fn is_occupied(&self, equip_type: EquipType) -> bool {
        self.equipped(equip_type).is_some()
    }

    /// Generic slot the item of a type was equipped from
    pub fn origin_of(&self, equip_type: EquipType) -> Option<SlotIndex> {
        self.container.equip_origins.get(&equip_type).copied()
    }

    /// Iterate over every equip slot
    pub fn iter(&self) -> impl Iterator<Item = (EquipType, Option<&'a ItemInstance>)> + 'a {
        let set = *self;
        self.types()
            .iter()
            .map(move |&equip_type| (equip_type, set.equipped(equip_type)))
    }

    /// Number of occupied equip slots
    pub fn equipped_count(&self) -> usize {
        self.iter().filter(|(_, item)| item.is_some()).count()
    }

    /// Sum of a numeric property over equipped items
    pub fn total_property(&self, key: &str) -> f64 {
        self.iter()
            .filter_map(|(_, item)| item)
            .filter_map(|item| item.definition().get_property(key))
            .filter_map(|value| value.as_float())
            .sum()
    }

    /// Owned copy of the equip slots
    pub fn snapshot(&self) -> EquipmentSnapshot {
        let slots = self
            .types()
            .iter()
            .filter_map(|&equip_type| {
                let index = self.slot_of(equip_type)?;
                Some((equip_type, self.container.slot_snapshot(index)?))
            })
            .collect();
        EquipmentSnapshot { slots }
    }
}

impl std::fmt::Debug for EquipmentSet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|(t, item)| (t, item.map(|i| i.item_id().as_str()))),
            )
            .finish()
    }
}

/// Owned copy of a container's equip slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSnapshot {
    /// Equip type and slot copy, in slot order
    pub slots: Vec<(EquipType, SlotSnapshot)>,
}

impl EquipmentSnapshot {
    /// Slot copy for a type
    pub fn get(&self, equip_type: EquipType) -> Option<&SlotSnapshot> {
        self.slots
            .iter()
            .find(|(t, _)| *t == equip_type)
            .map(|(_, slot)| slot)
    }

    /// Check if a type is occupied
    pub fn is_occupied(&self, equip_type: EquipType) -> bool {
        self.get(equip_type).map(|s| !s.is_empty()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContainerLayout;
    use std::sync::Arc;
    use tf_items::{ItemDefinition, ItemProperty, ItemRegistry};

    fn container() -> InventoryContainer {
        let registry = ItemRegistry::from_definitions([
            ItemDefinition::new("helm", "Helm")
                .with_equip_type(EquipType::Head)
                .with_property("armor", ItemProperty::Float(3.0)),
            ItemDefinition::new("mail", "Mail")
                .with_equip_type(EquipType::Armor)
                .with_property("armor", ItemProperty::Float(7.5)),
        ])
        .unwrap();
        let layout = ContainerLayout::new(4).with_equip_slots([EquipType::Head, EquipType::Armor]);
        InventoryContainer::new(Arc::new(registry), layout)
    }

    #[test]
    fn test_equipment_view() {
        let mut inv = container();
        let helm = inv.registry().instantiate("helm", 1).unwrap();
        let slot = inv.add(helm, None).unwrap();
        inv.equip(slot).unwrap();

        let set = inv.equipment();
        assert_eq!(set.types(), &[EquipType::Head, EquipType::Armor]);
        assert_eq!(set.slot_of(EquipType::Head), Some(4));
        assert!(set.is_occupied(EquipType::Head));
        assert!(!set.is_occupied(EquipType::Armor));
        assert!(!set.has_slot(EquipType::Feet));
        assert_eq!(set.origin_of(EquipType::Head), Some(slot));
        assert_eq!(set.equipped_count(), 1);
    }

    #[test]
    fn test_total_property() {
        let mut inv = container();
        for id in ["helm", "mail"] {
            let item = inv.registry().instantiate(id, 1).unwrap();
            let slot = inv.add(item, None).unwrap();
            inv.equip(slot).unwrap();
        }
        assert!((inv.equipment().total_property("armor") - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot() {
        let mut inv = container();
        let mail = inv.registry().instantiate("mail", 1).unwrap();
        let slot = inv.add(mail, None).unwrap();
        inv.equip(slot).unwrap();

        let snapshot = inv.equipment().snapshot();
        assert_eq!(snapshot.slots.len(), 2);
        assert!(snapshot.is_occupied(EquipType::Armor));
        assert!(!snapshot.is_occupied(EquipType::Head));
        assert_eq!(
            snapshot.get(EquipType::Armor).unwrap().item_id().unwrap().as_str(),
            "mail"
        );
    }
}
