//! Item definitions and item instances

use crate::id::InstanceId;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of an item definition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new item id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    /// Food, drinks, potions
    Consumable,
    /// Anything that can be worn or wielded
    Equipment,
    /// Quest items
    Quest,
    /// Crafting materials
    Material,
    /// Ammunition
    Ammo,
    /// Misc items
    Misc,
}

impl Default for ItemCategory {
    fn default() -> Self {
        Self::Misc
    }
}

/// Equip slot type an item can occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipType {
    /// Helmets, hats
    Head,
    /// Body armor
    Armor,
    /// Gloves
    Hands,
    /// Boots
    Feet,
    /// Main hand weapon
    Weapon,
    /// Shield or second weapon
    OffHand,
    /// Cape, backpack
    Back,
    /// Ring, amulet
    Accessory,
    /// Game-specific slot
    Custom(u32),
}

impl EquipType {
    /// Get all standard equip types
    pub fn all_standard() -> Vec<Self> {
        vec![
            Self::Head,
            Self::Armor,
            Self::Hands,
            Self::Feet,
            Self::Weapon,
            Self::OffHand,
            Self::Back,
            Self::Accessory,
        ]
    }
}

impl fmt::Display for EquipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => write!(f, "head"),
            Self::Armor => write!(f, "armor"),
            Self::Hands => write!(f, "hands"),
            Self::Feet => write!(f, "feet"),
            Self::Weapon => write!(f, "weapon"),
            Self::OffHand => write!(f, "offhand"),
            Self::Back => write!(f, "back"),
            Self::Accessory => write!(f, "accessory"),
            Self::Custom(n) => write!(f, "custom:{}", n),
        }
    }
}

impl std::str::FromStr for EquipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "head" | "helmet" => Ok(Self::Head),
            "armor" | "chest" | "body" => Ok(Self::Armor),
            "hands" | "gloves" => Ok(Self::Hands),
            "feet" | "boots" => Ok(Self::Feet),
            "weapon" | "mainhand" => Ok(Self::Weapon),
            "offhand" | "shield" => Ok(Self::OffHand),
            "back" | "backpack" => Ok(Self::Back),
            "accessory" | "ring" | "amulet" => Ok(Self::Accessory),
            other => other
                .strip_prefix("custom:")
                .and_then(|n| n.parse().ok())
                .map(Self::Custom)
                .ok_or_else(|| format!("Unknown equip type: {}", s)),
        }
    }
}

/// Item property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemProperty {
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// String value
    String(String),
}

impl ItemProperty {
    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

/// Item definition
///
/// Static data, registered once and shared by every instance of the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique identifier
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Category
    pub category: ItemCategory,
    /// Equip slot type, if the item can be equipped
    pub equip_type: Option<EquipType>,
    /// Maximum stack size (1 = not stackable)
    pub max_stack: u32,
    /// Base value/price
    pub value: u32,
    /// Weight per unit
    pub weight: f32,
    /// Icon reference for the presentation layer
    pub icon: String,
    /// Whether the item can be dropped into the world
    pub droppable: bool,
    /// Maximum durability; present when instances carry per-instance state
    pub max_durability: Option<f32>,
    /// Extra carrying capacity granted when picked up as a backpack
    pub backpack: Option<BackpackStats>,
    /// Custom properties
    pub properties: HashMap<String, ItemProperty>,
}

impl ItemDefinition {
    /// Create a new item definition
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: ItemCategory::default(),
            equip_type: None,
            max_stack: 1,
            value: 0,
            weight: 0.0,
            icon: String::new(),
            droppable: true,
            max_durability: None,
            backpack: None,
            properties: HashMap::new(),
        }
    }

    /// Set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Set category
    pub fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = category;
        self
    }

    /// Make the item equippable in the given slot type
    pub fn with_equip_type(mut self, equip_type: EquipType) -> Self {
        self.equip_type = Some(equip_type);
        self
    }

    /// Set max stack size
    ///
    /// Zero is kept as-is so the registry can reject it.
    pub fn with_max_stack(mut self, max: u32) -> Self {
        self.max_stack = max;
        self
    }

    /// Set value
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    /// Set weight per unit
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Set icon reference
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Give instances per-instance durability
    pub fn with_durability(mut self, max: f32) -> Self {
        self.max_durability = Some(max);
        self
    }

    /// Make non-droppable
    pub fn non_droppable(mut self) -> Self {
        self.droppable = false;
        self
    }

    /// Add a property
    pub fn with_property(mut self, key: impl Into<String>, value: ItemProperty) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Make the item a backpack granting extra slots and carry weight
    pub fn with_backpack(mut self, slots: usize, weight_bonus: f32) -> Self {
        self.backpack = Some(BackpackStats::new(slots, weight_bonus));
        self
    }

    /// Get property value
    pub fn get_property(&self, key: &str) -> Option<&ItemProperty> {
        self.properties.get(key)
    }

    /// Check if stackable
    pub fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }

    /// Check if instances carry per-instance state
    pub fn has_instance_state(&self) -> bool {
        self.max_durability.is_some()
    }

    /// Check if the item can be equipped
    pub fn is_equippable(&self) -> bool {
        self.equip_type.is_some()
    }

    /// Check if picking the item up equips it as a backpack
    pub fn is_backpack(&self) -> bool {
        self.backpack.is_some()
    }

    /// Check registry invariants, returning the reason on failure
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().is_empty() {
            return Err("empty identifier".into());
        }
        if self.max_stack == 0 {
            return Err("max stack must be at least 1".into());
        }
        if self.has_instance_state() && self.max_stack > 1 {
            return Err(format!(
                "items with per-instance state cannot stack (max stack {})",
                self.max_stack
            ));
        }
        if self.weight < 0.0 {
            return Err(format!("negative weight {}", self.weight));
        }
        if let Some(backpack) = &self.backpack {
            if self.max_stack > 1 {
                return Err("backpacks cannot stack".into());
            }
            if backpack.slots == 0 {
                return Err("backpack must add at least one slot".into());
            }
            if backpack.weight_bonus.is_nan() || backpack.weight_bonus < 0.0 {
                return Err(format!("negative backpack weight bonus {}", backpack.weight_bonus));
            }
        }
        Ok(())
    }
}

/// Capacity a backpack adds to the container that equips it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackpackStats {
    /// Generic slots added
    pub slots: usize,
    /// Added to the carry weight limit, when the container has one
    pub weight_bonus: f32,
}

impl BackpackStats {
    /// Create backpack stats
    pub fn new(slots: usize, weight_bonus: f32) -> Self {
        Self {
            slots,
            weight_bonus,
        }
    }
}

/// Per-instance state carried by non-stackable items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceState {
    /// Current durability
    pub durability: Option<f32>,
    /// Enchantment applied to this instance
    pub enchantment: Option<String>,
    /// Instance-specific properties
    #[serde(default)]
    pub properties: HashMap<String, ItemProperty>,
}

impl InstanceState {
    /// Fresh state at full durability
    pub fn with_durability(durability: f32) -> Self {
        Self {
            durability: Some(durability),
            ..Default::default()
        }
    }

    /// Set enchantment
    pub fn with_enchantment(mut self, enchantment: impl Into<String>) -> Self {
        self.enchantment = Some(enchantment.into());
        self
    }
}

/// A stateful item instance
///
/// Instances are deliberately not `Clone`: one instance lives in exactly one
/// slot, or in the hands of the caller while it is in transit.
pub struct ItemInstance {
    id: InstanceId,
    definition: Arc<ItemDefinition>,
    count: u32,
    state: Option<InstanceState>,
}

impl ItemInstance {
    /// Create an instance; the registry is the normal entry point
    pub(crate) fn new(
        id: InstanceId,
        definition: Arc<ItemDefinition>,
        count: u32,
        state: Option<InstanceState>,
    ) -> Self {
        Self {
            id,
            definition,
            count,
            state,
        }
    }

    /// Unique instance id
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Shared definition
    pub fn definition(&self) -> &Arc<ItemDefinition> {
        &self.definition
    }

    /// Definition id
    pub fn item_id(&self) -> &ItemId {
        &self.definition.id
    }

    /// Current stack count
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Maximum stack size of the definition
    pub fn max_stack(&self) -> u32 {
        self.definition.max_stack
    }

    /// Room left in this stack
    pub fn space(&self) -> u32 {
        self.max_stack().saturating_sub(self.count)
    }

    /// Per-instance state
    pub fn state(&self) -> Option<&InstanceState> {
        self.state.as_ref()
    }

    /// Mutable per-instance state
    pub fn state_mut(&mut self) -> Option<&mut InstanceState> {
        self.state.as_mut()
    }

    /// Total weight of the stack
    pub fn weight(&self) -> f32 {
        self.definition.weight * self.count as f32
    }

    /// Equip type of the definition
    pub fn equip_type(&self) -> Option<EquipType> {
        self.definition.equip_type
    }

    /// Check if another instance may merge into this stack
    pub fn can_stack_with(&self, other: &ItemInstance) -> bool {
        self.definition.id == other.definition.id
            && self.definition.is_stackable()
            && self.state.is_none()
            && other.state.is_none()
    }

    /// Move as many units as fit from `other` into this stack
    ///
    /// Returns the number of units moved. Does nothing for incompatible stacks.
    pub fn absorb(&mut self, other: &mut ItemInstance) -> u32 {
        if !self.can_stack_with(other) {
            return 0;
        }
        let moved = other.count.min(self.space());
        self.count += moved;
        other.count -= moved;
        moved
    }

    /// Split `amount` units off into a new instance with the given id
    ///
    /// Returns `None` unless `0 < amount < count`.
    pub fn split(&mut self, amount: u32, id: InstanceId) -> Option<ItemInstance> {
        if amount == 0 || amount >= self.count {
            return None;
        }
        self.count -= amount;
        Some(ItemInstance {
            id,
            definition: Arc::clone(&self.definition),
            count: amount,
            state: self.state.clone(),
        })
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl PartialEq for ItemInstance {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.definition.id == other.definition.id
            && self.count == other.count
            && self.state == other.state
    }
}

impl fmt::Debug for ItemInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemInstance")
            .field("id", &self.id)
            .field("item", &self.definition.id)
            .field("count", &self.count)
            .field("state", &self.state)
            .finish()
    }
}
