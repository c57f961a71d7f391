//! World item pickups

use std::sync::Arc;

use tf_interfaces::{
    Entity, EntityId, Interactable, InteractionData, InteractionResult, Inventoriable,
    DEFAULT_INTERACTION_DISTANCE,
};
use tf_items::{BackpackStats, ItemInstance, ItemRegistry};

/// An item lying in the world
///
/// Interacting adds as much of the item as the instigator can carry. Whatever
/// does not fit stays in the world; the pickup is consumed once empty.
/// Backpack items are never stored: picking one up equips it instead.
pub struct WorldItemPickup {
    /// Entity id
    id: EntityId,
    /// Item left to pick up
    item: Option<ItemInstance>,
    /// Source of instance ids for partial pickups
    registry: Arc<ItemRegistry>,
    /// Entities allowed to pick up (empty = anyone)
    allowed_pickers: Vec<EntityId>,
    /// Whether the pickup is enabled
    enabled: bool,
    /// Interaction reach
    distance: f32,
}

impl WorldItemPickup {
    /// Create a new pickup
    pub fn new(registry: Arc<ItemRegistry>, item: ItemInstance) -> Self {
        Self {
            id: EntityId::new(),
            item: Some(item),
            registry,
            allowed_pickers: Vec::new(),
            enabled: true,
            distance: DEFAULT_INTERACTION_DISTANCE,
        }
    }

    /// Restrict who may pick up
    pub fn with_allowed_pickers(mut self, pickers: Vec<EntityId>) -> Self {
        self.allowed_pickers = pickers;
        self
    }

    /// Set interaction reach
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    /// Enable or disable
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Item still in the world
    pub fn item(&self) -> Option<&ItemInstance> {
        self.item.as_ref()
    }

    /// Units still in the world
    pub fn remaining(&self) -> u32 {
        self.item.as_ref().map(ItemInstance::count).unwrap_or(0)
    }

    /// Check if everything was picked up
    pub fn is_consumed(&self) -> bool {
        self.item.is_none()
    }

    /// Check if an entity may pick this up
    pub fn can_pickup(&self, picker: Option<EntityId>) -> bool {
        if !self.enabled || self.item.is_none() {
            return false;
        }
        self.allowed_pickers.is_empty()
            || picker.map_or(false, |id| self.allowed_pickers.contains(&id))
    }
}

impl WorldItemPickup {
    fn pickup_backpack(
        &mut self,
        item: ItemInstance,
        stats: BackpackStats,
        instigator: &mut dyn Inventoriable,
    ) -> InteractionResult {
        if instigator.has_backpack() {
            self.item = Some(item);
            return InteractionResult::Rejected {
                reason: "Already have a backpack".to_string(),
            };
        }
        match instigator.equip_backpack(stats) {
            Ok(()) => {
                log::info!(
                    "{} equipped '{}' ({} slots)",
                    self.id,
                    item.item_id(),
                    stats.slots
                );
                InteractionResult::PickedUp {
                    item: item.item_id().clone(),
                    count: item.count(),
                    remaining: 0,
                }
            }
            Err(error) => {
                log::debug!("{} backpack refused: {}", self.id, error);
                self.item = Some(item);
                InteractionResult::Failed(error)
            }
        }
    }
}

impl Interactable for WorldItemPickup {
    fn interact(&mut self, instigator: &mut dyn Inventoriable) -> InteractionResult {
        if !self.can_pickup(instigator.owner()) {
            return InteractionResult::Rejected {
                reason: "Cannot pick this up".to_string(),
            };
        }
        let Some(mut item) = self.item.take() else {
            return InteractionResult::Rejected {
                reason: "Nothing left to pick up".to_string(),
            };
        };

        let backpack = item.definition().backpack;
        if let Some(stats) = backpack {
            return self.pickup_backpack(item, stats, instigator);
        }

        let item_id = item.item_id().clone();
        let total = item.count();
        let capacity = instigator.capacity_for(item.definition());

        // Partial pickup: split off what fits, the rest stays here.
        let portion = if capacity > 0 && capacity < total {
            item.split(capacity, self.registry.mint_instance_id())
        } else {
            None
        };

        let result = match portion {
            Some(portion) => match instigator.add_item(portion) {
                Ok(_) => {
                    self.item = Some(item);
                    Ok(capacity)
                }
                Err(rejected) => {
                    let (error, mut portion) = rejected.into_parts();
                    item.absorb(&mut portion);
                    self.item = Some(item);
                    Err(error)
                }
            },
            None => match instigator.add_item(item) {
                Ok(_) => Ok(total),
                Err(rejected) => {
                    let (error, item) = rejected.into_parts();
                    self.item = Some(item);
                    Err(error)
                }
            },
        };

        match result {
            Ok(count) => {
                let remaining = self.remaining();
                log::debug!(
                    "{} picked up {} x '{}' ({} left)",
                    self.id,
                    count,
                    item_id,
                    remaining
                );
                InteractionResult::PickedUp {
                    item: item_id,
                    count,
                    remaining,
                }
            }
            Err(error) => {
                log::debug!("{} pickup of '{}' failed: {}", self.id, item_id, error);
                InteractionResult::Failed(error)
            }
        }
    }

    fn can_interact(&self, instigator: &dyn Inventoriable) -> bool {
        self.can_pickup(instigator.owner())
    }

    fn interaction_data(&self) -> InteractionData {
        let prompt = match &self.item {
            Some(item) if item.count() > 1 => {
                format!("Pick up {} ({})", item.definition().name, item.count())
            }
            Some(item) => format!("Pick up {}", item.definition().name),
            None => "Pick up".to_string(),
        };
        InteractionData {
            can_interact: self.enabled && self.item.is_some(),
            prompt,
            ..Default::default()
        }
    }

    fn interaction_distance(&self) -> f32 {
        self.distance
    }
}

impl Entity for WorldItemPickup {
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

impl std::fmt::Debug for WorldItemPickup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldItemPickup")
            .field("id", &self.id)
            .field("item", &self.item)
            .field("enabled", &self.enabled)
            .finish()
    }
}
