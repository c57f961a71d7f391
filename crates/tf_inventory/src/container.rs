//! Inventory container engine
//!
//! A container is an array of slots: `generic` general-purpose slots
//! followed by one slot per configured equip type, then the generic slots of
//! an equipped backpack, if any. Every operation either
//! fully succeeds, bumps the version by one and notifies observers, or fails
//! and leaves the container exactly as it was.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tf_interfaces::{
    AddError, ContainerId, EntityId, Inventoriable, InventoryError, InventoryResult, SlotIndex,
};
use tf_items::{BackpackStats, EquipType, ItemDefinition, ItemInstance, ItemRegistry};

use crate::config::{ConfigError, ContainerLayout, InventoryConfig};
use crate::equipment::{EquipPolicy, EquipmentSet};
use crate::event::{ChangeEvent, ChangeKind, ContainerView, ObserverId, ObserverList};
use crate::slot::{Slot, SlotKind, SlotSnapshot};

/// Tolerance for weight-limit comparisons
pub(crate) const WEIGHT_EPSILON: f32 = 1e-4;

/// Where an add will put its units
#[derive(Debug, Default)]
pub(crate) struct AddPlan {
    /// Existing stacks to top up, in order
    merges: Vec<(SlotIndex, u32)>,
    /// Empty slot for the remainder
    place: Option<SlotIndex>,
}

impl AddPlan {
    fn slots(&self) -> Vec<SlotIndex> {
        self.merges
            .iter()
            .map(|(slot, _)| *slot)
            .chain(self.place)
            .collect()
    }

    fn last_slot(&self) -> Option<SlotIndex> {
        self.place.or_else(|| self.merges.last().map(|(slot, _)| *slot))
    }
}

enum MovePlan {
    Relocate(u32),
    Merge(u32),
    Swap,
}

/// Slot-based item container
pub struct InventoryContainer {
    /// Container id (also the cross-container lock order)
    id: ContainerId,
    /// Owning entity
    owner: Option<EntityId>,
    /// Item definitions
    registry: Arc<ItemRegistry>,
    /// Slot layout
    layout: ContainerLayout,
    /// Slots: generic, equip, then backpack
    pub(crate) slots: Vec<Slot>,
    /// Carry weight limit without a backpack
    pub(crate) max_weight: Option<f32>,
    /// Equipped backpack
    pub(crate) backpack: Option<BackpackStats>,
    /// Incremented once per committed mutation
    version: u64,
    /// Generic slot each equipped item came from
    pub(crate) equip_origins: HashMap<EquipType, SlotIndex>,
    /// Change observers
    observers: ObserverList,
}

impl InventoryContainer {
    /// Create an empty container
    pub fn new(registry: Arc<ItemRegistry>, layout: ContainerLayout) -> Self {
        let id = ContainerId::new();
        let slots = layout
            .kinds()
            .enumerate()
            .map(|(index, kind)| Slot::new(index, kind))
            .collect::<Vec<_>>();

        log::debug!(
            "Created {} with {} generic and {} equip slots",
            id,
            layout.generic_slots(),
            layout.equip_slots().len()
        );

        Self {
            id,
            owner: None,
            registry,
            layout,
            slots,
            max_weight: None,
            backpack: None,
            version: 0,
            equip_origins: HashMap::new(),
            observers: ObserverList::default(),
        }
    }

    /// Create a container from configuration
    pub fn from_config(
        registry: Arc<ItemRegistry>,
        config: &InventoryConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut container = Self::new(registry, config.layout()?);
        container.max_weight = config.max_weight;
        Ok(container)
    }

    /// Set a carry weight limit
    pub fn with_max_weight(mut self, limit: f32) -> Self {
        self.max_weight = Some(limit);
        self
    }

    /// Set the owning entity
    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Container id
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Owning entity
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Item registry backing this container
    pub fn registry(&self) -> &Arc<ItemRegistry> {
        &self.registry
    }

    /// Slot layout
    pub fn layout(&self) -> &ContainerLayout {
        &self.layout
    }

    /// Total slot count
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Carry weight limit, backpack bonus included
    pub fn max_weight(&self) -> Option<f32> {
        self.max_weight
            .map(|limit| limit + self.backpack.map_or(0.0, |pack| pack.weight_bonus))
    }

    /// Get a slot
    pub fn slot(&self, index: SlotIndex) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// All slots, in index order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Snapshot of a single slot
    pub fn slot_snapshot(&self, index: SlotIndex) -> Option<SlotSnapshot> {
        self.slots.get(index).map(Slot::snapshot)
    }

    /// Snapshots of every slot
    pub fn slots_snapshot(&self) -> Vec<SlotSnapshot> {
        self.slots.iter().map(Slot::snapshot).collect()
    }

    /// Iterate over occupied slots
    pub fn items(&self) -> impl Iterator<Item = (SlotIndex, &ItemInstance)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.item.as_ref().map(|item| (slot.index, item)))
    }

    /// Total units of an item, equip slots included
    pub fn count_of(&self, item_id: &str) -> u32 {
        self.items()
            .filter(|(_, item)| item.item_id().as_str() == item_id)
            .map(|(_, item)| item.count())
            .sum()
    }

    /// First slot holding an item
    pub fn find(&self, item_id: &str) -> Option<SlotIndex> {
        self.items()
            .find(|(_, item)| item.item_id().as_str() == item_id)
            .map(|(slot, _)| slot)
    }

    /// Number of empty generic slots
    pub fn free_slots(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.kind.is_generic() && slot.is_empty())
            .count()
    }

    /// Number of occupied slots
    pub fn used_slots(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_empty()).count()
    }

    /// Check if nothing is held
    pub fn is_empty(&self) -> bool {
        self.used_slots() == 0
    }

    /// Total carried weight
    pub fn current_weight(&self) -> f32 {
        self.items().map(|(_, item)| item.weight()).sum()
    }

    /// Index of the equip slot for a type
    pub fn equip_slot_index(&self, equip_type: EquipType) -> Option<SlotIndex> {
        self.layout
            .equip_slots()
            .iter()
            .position(|t| *t == equip_type)
            .map(|offset| self.layout.generic_slots() + offset)
    }

    /// View of the equip slots
    pub fn equipment(&self) -> EquipmentSet<'_> {
        EquipmentSet::new(self)
    }

    /// How many units of a definition could be added right now
    pub fn capacity_for(&self, definition: &ItemDefinition) -> u32 {
        let empty = self.free_slots() as u32;
        let mut units = if definition.is_stackable() && !definition.has_instance_state() {
            let stack_space: u32 = self
                .slots
                .iter()
                .filter(|slot| slot.kind.is_generic())
                .filter_map(|slot| slot.item.as_ref())
                .filter(|item| item.item_id() == &definition.id && item.state().is_none())
                .map(ItemInstance::space)
                .sum();
            stack_space.saturating_add(empty.saturating_mul(definition.max_stack))
        } else {
            empty
        };

        if let Some(limit) = self.max_weight() {
            if definition.weight > 0.0 {
                let free = (limit - self.current_weight() + WEIGHT_EPSILON).max(0.0);
                units = units.min((free / definition.weight).floor() as u32);
            }
        }
        units
    }

    /// Check whether an item would be accepted, without changing anything
    pub fn check_add(&self, item: &ItemInstance) -> InventoryResult<()> {
        self.plan_add(item.definition(), item.count(), item.state().is_some(), None)
            .map(|_| ())
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register a change observer
    pub fn register_observer<F>(&mut self, observer: F) -> ObserverId
    where
        F: Fn(&ChangeEvent, &ContainerView<'_>) + Send + Sync + 'static,
    {
        self.observers.register(Box::new(observer))
    }

    /// Unregister an observer, returning whether it was registered
    pub fn unregister_observer(&mut self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    /// Remove every observer
    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add an item, merging into existing stacks first
    ///
    /// Returns the last slot written. On failure the item is handed back
    /// unchanged inside the [`AddError`].
    pub fn add(
        &mut self,
        item: ItemInstance,
        preferred: Option<SlotIndex>,
    ) -> Result<SlotIndex, AddError> {
        self.add_as(item, preferred, ChangeKind::Added)
    }

    pub(crate) fn add_as(
        &mut self,
        mut item: ItemInstance,
        preferred: Option<SlotIndex>,
        kind: ChangeKind,
    ) -> Result<SlotIndex, AddError> {
        if item.is_empty() {
            let error = InventoryError::InsufficientCount {
                slot: preferred.unwrap_or_default(),
                requested: 0,
                available: 0,
            };
            return Err(AddError::new(error, item));
        }

        let plan = match self.plan_add(
            item.definition(),
            item.count(),
            item.state().is_some(),
            preferred,
        ) {
            Ok(plan) => plan,
            Err(error) => {
                log::debug!(
                    "{} rejected {} x '{}': {}",
                    self.id,
                    item.count(),
                    item.item_id(),
                    error
                );
                return Err(AddError::new(error, item));
            }
        };

        log::debug!("{} adding {} x '{}'", self.id, item.count(), item.item_id());

        for &(index, _) in &plan.merges {
            if let Some(existing) = self.slots[index].item.as_mut() {
                existing.absorb(&mut item);
            }
        }
        if let Some(index) = plan.place {
            self.slots[index].item = Some(item);
        }

        let slots = plan.slots();
        let last = plan.last_slot().unwrap_or_default();
        self.commit(kind, slots);
        Ok(last)
    }

    /// Remove units from a slot
    ///
    /// A full removal returns the stored instance; a partial one splits off
    /// a new instance.
    pub fn remove(
        &mut self,
        slot: SlotIndex,
        count: u32,
    ) -> InventoryResult<Option<ItemInstance>> {
        self.take(slot, count, ChangeKind::Removed)
    }

    /// Remove units from a slot to drop them into the world
    pub fn drop_item(
        &mut self,
        slot: SlotIndex,
        count: u32,
    ) -> InventoryResult<Option<ItemInstance>> {
        self.check_slot(slot)?;
        if let Some(item) = &self.slots[slot].item {
            if count > 0 && !item.definition().droppable {
                return Err(InventoryError::NotDroppable(item.item_id().clone()));
            }
        }
        self.take(slot, count, ChangeKind::Dropped)
    }

    /// Split units off a stack into the first empty generic slot
    ///
    /// Returns the new slot, or `None` for a zero count.
    pub fn split(&mut self, slot: SlotIndex, count: u32) -> InventoryResult<Option<SlotIndex>> {
        self.check_slot(slot)?;
        if count == 0 {
            return Ok(None);
        }

        let item = self.slots[slot]
            .item
            .as_ref()
            .ok_or(InventoryError::EmptySlot(slot))?;
        let available = item.count();
        if count >= available {
            return Err(InventoryError::InsufficientCount {
                slot,
                requested: count,
                available,
            });
        }
        let target = self
            .first_empty_generic()
            .ok_or_else(|| InventoryError::InventoryFull {
                item: item.item_id().clone(),
                count,
            })?;

        let portion = self
            .take_units(slot, count)
            .ok_or(InventoryError::EmptySlot(slot))?;
        self.slots[target].item = Some(portion);

        self.commit(ChangeKind::Split, vec![slot, target]);
        Ok(Some(target))
    }

    /// Move units between slots
    ///
    /// `None` moves the whole stack. Moving onto a compatible stack merges as
    /// much as fits; moving a whole stack onto an incompatible item swaps
    /// them when each slot accepts the other item.
    pub fn move_item(
        &mut self,
        from: SlotIndex,
        to: SlotIndex,
        count: Option<u32>,
    ) -> InventoryResult<()> {
        self.check_slot(from)?;
        self.check_slot(to)?;
        if from == to || count == Some(0) {
            return Ok(());
        }

        let plan = {
            let source = self.slots[from]
                .item
                .as_ref()
                .ok_or(InventoryError::EmptySlot(from))?;
            let available = source.count();
            let amount = count.unwrap_or(available);
            if amount > available {
                return Err(InventoryError::InsufficientCount {
                    slot: from,
                    requested: amount,
                    available,
                });
            }

            let destination = &self.slots[to];
            match &destination.item {
                None => {
                    if !destination.kind.accepts(source) {
                        return Err(InventoryError::SlotMismatch {
                            slot: to,
                            item: source.item_id().clone(),
                        });
                    }
                    MovePlan::Relocate(amount)
                }
                Some(target) if target.can_stack_with(source) => {
                    MovePlan::Merge(amount.min(target.space()))
                }
                Some(target) => {
                    if amount != available || !destination.kind.accepts(source) {
                        return Err(InventoryError::SlotMismatch {
                            slot: to,
                            item: source.item_id().clone(),
                        });
                    }
                    if !self.slots[from].kind.accepts(target) {
                        return Err(InventoryError::SlotMismatch {
                            slot: from,
                            item: target.item_id().clone(),
                        });
                    }
                    MovePlan::Swap
                }
            }
        };

        let kind = match plan {
            MovePlan::Relocate(amount) => {
                let item = self
                    .take_units(from, amount)
                    .ok_or(InventoryError::EmptySlot(from))?;
                self.slots[to].item = Some(item);
                self.sync_equip_origin(from);
                self.note_arrival(to, from);
                ChangeKind::Moved
            }
            MovePlan::Merge(0) => return Ok(()),
            MovePlan::Merge(amount) => {
                let mut portion = self
                    .take_units(from, amount)
                    .ok_or(InventoryError::EmptySlot(from))?;
                if let Some(target) = self.slots[to].item.as_mut() {
                    target.absorb(&mut portion);
                }
                self.sync_equip_origin(from);
                ChangeKind::Merged
            }
            MovePlan::Swap => {
                let source = self.slots[from].item.take();
                let target = std::mem::replace(&mut self.slots[to].item, source);
                self.slots[from].item = target;
                self.note_arrival(to, from);
                self.note_arrival(from, to);
                ChangeKind::Swapped
            }
        };

        self.commit(kind, vec![from, to]);
        Ok(())
    }

    /// Equip the item in a generic slot, failing if the equip slot is taken
    pub fn equip(&mut self, slot: SlotIndex) -> InventoryResult<SlotIndex> {
        self.equip_with(slot, EquipPolicy::default())
    }

    /// Equip the item in a generic slot
    ///
    /// Returns the equip slot index. Equipping an item that already sits in
    /// an equip slot does nothing.
    pub fn equip_with(&mut self, slot: SlotIndex, policy: EquipPolicy) -> InventoryResult<SlotIndex> {
        self.check_slot(slot)?;
        let item = self.slots[slot]
            .item
            .as_ref()
            .ok_or(InventoryError::EmptySlot(slot))?;
        if !self.slots[slot].kind.is_generic() {
            return Ok(slot);
        }

        let item_id = item.item_id().clone();
        let equip_type = item
            .equip_type()
            .ok_or(InventoryError::NoMatchingEquipSlot(None))?;
        let target = self
            .equip_slot_index(equip_type)
            .ok_or(InventoryError::NoMatchingEquipSlot(Some(equip_type)))?;

        if let Some(occupant) = &self.slots[target].item {
            if policy == EquipPolicy::FailIfOccupied {
                return Err(InventoryError::SlotOccupied {
                    slot: target,
                    occupant: occupant.item_id().clone(),
                });
            }
        }

        let incoming = self.slots[slot].item.take();
        let previous = std::mem::replace(&mut self.slots[target].item, incoming);
        self.slots[slot].item = previous;
        self.equip_origins.insert(equip_type, slot);

        log::debug!("{} equipped '{}' as {}", self.id, item_id, equip_type);
        self.commit(ChangeKind::Equipped, vec![slot, target]);
        Ok(target)
    }

    /// Return an equipped item to the generic slots
    ///
    /// Prefers the slot it was equipped from, then the first empty generic
    /// slot. Returns the slot it landed in.
    pub fn unequip(&mut self, equip_type: EquipType) -> InventoryResult<SlotIndex> {
        let source = self
            .equip_slot_index(equip_type)
            .ok_or(InventoryError::NoMatchingEquipSlot(Some(equip_type)))?;
        let item_id = self.slots[source]
            .item
            .as_ref()
            .ok_or(InventoryError::EmptySlot(source))?
            .item_id()
            .clone();

        let origin = self
            .equip_origins
            .get(&equip_type)
            .copied()
            .filter(|&index| {
                self.slots
                    .get(index)
                    .map(|slot| slot.kind.is_generic() && slot.is_empty())
                    .unwrap_or(false)
            });
        let target = origin
            .or_else(|| self.first_empty_generic())
            .ok_or_else(|| InventoryError::ContainerFull {
                item: item_id.clone(),
            })?;

        let item = self.slots[source].item.take();
        self.slots[target].item = item;
        self.equip_origins.remove(&equip_type);

        log::debug!("{} unequipped '{}' from {}", self.id, item_id, equip_type);
        self.commit(ChangeKind::Unequipped, vec![source, target]);
        Ok(target)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) fn check_slot(&self, slot: SlotIndex) -> InventoryResult<()> {
        if slot < self.slots.len() {
            Ok(())
        } else {
            Err(InventoryError::InvalidSlot {
                slot,
                capacity: self.slots.len(),
            })
        }
    }

    pub(crate) fn first_empty_generic(&self) -> Option<SlotIndex> {
        self.slots
            .iter()
            .find(|slot| slot.kind.is_generic() && slot.is_empty())
            .map(Slot::index)
    }

    pub(crate) fn check_weight(&self, additional: f32) -> InventoryResult<()> {
        if let Some(limit) = self.max_weight() {
            let current = self.current_weight();
            if current + additional > limit + WEIGHT_EPSILON {
                return Err(InventoryError::WeightLimitExceeded {
                    current,
                    additional,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Work out where `count` units would go without touching any slot
    pub(crate) fn plan_add(
        &self,
        definition: &ItemDefinition,
        count: u32,
        stateful: bool,
        preferred: Option<SlotIndex>,
    ) -> InventoryResult<AddPlan> {
        if let Some(slot) = preferred {
            self.check_slot(slot)?;
        }
        self.check_weight(definition.weight * count as f32)?;

        let mut plan = AddPlan::default();
        let mut remaining = count;

        if definition.is_stackable() && !stateful {
            let order = preferred
                .into_iter()
                .chain((0..self.slots.len()).filter(|&index| Some(index) != preferred));
            for index in order {
                let slot = &self.slots[index];
                if !slot.kind.is_generic() {
                    continue;
                }
                let Some(existing) = &slot.item else {
                    continue;
                };
                if existing.item_id() != &definition.id || existing.state().is_some() {
                    continue;
                }
                let take = existing.space().min(remaining);
                if take == 0 {
                    continue;
                }
                plan.merges.push((index, take));
                remaining -= take;
                if remaining == 0 {
                    break;
                }
            }
        }

        if remaining > 0 {
            let preferred_empty = preferred
                .filter(|&index| self.slots[index].kind.is_generic() && self.slots[index].is_empty());
            let place = preferred_empty
                .or_else(|| self.first_empty_generic())
                .ok_or_else(|| InventoryError::InventoryFull {
                    item: definition.id.clone(),
                    count,
                })?;
            plan.place = Some(place);
        }

        Ok(plan)
    }

    fn take(
        &mut self,
        slot: SlotIndex,
        count: u32,
        kind: ChangeKind,
    ) -> InventoryResult<Option<ItemInstance>> {
        self.check_slot(slot)?;
        if count == 0 {
            return Ok(None);
        }
        let available = self.slots[slot].count();
        if count > available {
            return Err(InventoryError::InsufficientCount {
                slot,
                requested: count,
                available,
            });
        }

        let item = self
            .take_units(slot, count)
            .ok_or(InventoryError::EmptySlot(slot))?;
        self.sync_equip_origin(slot);

        log::debug!("{} removed {} x '{}' from slot {}", self.id, count, item.item_id(), slot);
        self.commit(kind, vec![slot]);
        Ok(Some(item))
    }

    /// Detach `count` units from a slot; the whole instance when it covers the stack
    pub(crate) fn take_units(&mut self, slot: SlotIndex, count: u32) -> Option<ItemInstance> {
        if count >= self.slots[slot].count() {
            return self.slots[slot].item.take();
        }
        let id = self.registry.mint_instance_id();
        self.slots[slot].item.as_mut()?.split(count, id)
    }

    /// Put units detached by `take_units` back where they came from
    pub(crate) fn put_back(&mut self, slot: SlotIndex, mut item: ItemInstance) {
        match self.slots[slot].item.as_mut() {
            Some(existing) => {
                existing.absorb(&mut item);
            }
            None => self.slots[slot].item = Some(item),
        }
    }

    /// Forget the origin of an equip slot that became empty
    pub(crate) fn sync_equip_origin(&mut self, slot: SlotIndex) {
        if let SlotKind::Equip(equip_type) = self.slots[slot].kind {
            if self.slots[slot].is_empty() {
                self.equip_origins.remove(&equip_type);
            }
        }
    }

    /// Record where the item now in `slot` came from
    fn note_arrival(&mut self, slot: SlotIndex, origin: SlotIndex) {
        if let SlotKind::Equip(equip_type) = self.slots[slot].kind {
            if !self.slots[slot].is_empty() && self.slots[origin].kind.is_generic() {
                self.equip_origins.insert(equip_type, origin);
            } else {
                self.equip_origins.remove(&equip_type);
            }
        }
    }

    /// Bump the version and notify observers
    pub(crate) fn commit(&mut self, kind: ChangeKind, mut slots: Vec<SlotIndex>) {
        let mut seen = Vec::with_capacity(slots.len());
        slots.retain(|slot| {
            if seen.contains(slot) {
                false
            } else {
                seen.push(*slot);
                true
            }
        });

        self.version += 1;
        let event = ChangeEvent {
            container: self.id,
            version: self.version,
            kind,
            slots,
        };
        log::trace!("{} v{} {:?} {:?}", self.id, event.version, kind, event.slots);
        self.observers.notify(&event, &ContainerView::new(self));
    }
}

impl Inventoriable for InventoryContainer {
    fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    fn add_item(&mut self, item: ItemInstance) -> Result<SlotIndex, AddError> {
        self.add(item, None)
    }

    fn count_item(&self, item_id: &str) -> u32 {
        self.count_of(item_id)
    }

    fn capacity_for(&self, definition: &ItemDefinition) -> u32 {
        InventoryContainer::capacity_for(self, definition)
    }

    fn free_slots(&self) -> usize {
        InventoryContainer::free_slots(self)
    }

    fn has_backpack(&self) -> bool {
        InventoryContainer::has_backpack(self)
    }

    fn equip_backpack(&mut self, stats: BackpackStats) -> InventoryResult<()> {
        InventoryContainer::equip_backpack(self, stats).map(|_| ())
    }
}

impl fmt::Debug for InventoryContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryContainer")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("layout", &self.layout)
            .field("used_slots", &self.used_slots())
            .field("backpack", &self.backpack)
            .field("version", &self.version)
            .field("observers", &self.observers)
            .finish()
    }
}
