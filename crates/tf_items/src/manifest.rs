//! Item manifest parser - TOML to ItemDefinition conversion
//!
//! Item definitions are loaded once at startup from a manifest file.
//!
//! # Manifest Format
//!
//! ```toml
//! [[item]]
//! id = "iron_sword"
//! name = "Iron Sword"
//! category = "equipment"
//! equip = "weapon"
//! weight = 3.5
//! value = 40
//! icon = "icons/iron_sword.png"
//! max_durability = 100.0
//!
//! [[item]]
//! id = "travel_pack"
//! name = "Travel Pack"
//! backpack = { slots = 6, weight_bonus = 25.0 }
//!
//! [[item]]
//! id = "arrow"
//! name = "Arrow"
//! category = "ammo"
//! max_stack = 50
//! weight = 0.05
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{RegistryError, Result};
use crate::item::{BackpackStats, EquipType, ItemCategory, ItemDefinition, ItemProperty};
use crate::registry::ItemRegistry;

/// Raw TOML structure for one item
#[derive(Debug, Deserialize)]
struct ItemToml {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: Option<ItemCategory>,
    #[serde(default)]
    equip: Option<String>,
    #[serde(default = "default_max_stack")]
    max_stack: u32,
    #[serde(default)]
    value: u32,
    #[serde(default)]
    weight: f32,
    #[serde(default)]
    icon: String,
    #[serde(default = "default_droppable")]
    droppable: bool,
    #[serde(default)]
    max_durability: Option<f32>,
    #[serde(default)]
    backpack: Option<BackpackToml>,
    #[serde(default)]
    properties: HashMap<String, toml::Value>,
}

/// Raw TOML structure for backpack stats
#[derive(Debug, Deserialize)]
struct BackpackToml {
    slots: usize,
    #[serde(default)]
    weight_bonus: f32,
}

/// Root TOML structure
#[derive(Debug, Deserialize)]
struct ManifestToml {
    #[serde(default)]
    item: Vec<ItemToml>,
}

fn default_max_stack() -> u32 {
    1
}

fn default_droppable() -> bool {
    true
}

fn convert_property(value: toml::Value) -> Option<ItemProperty> {
    match value {
        toml::Value::Integer(v) => Some(ItemProperty::Int(v)),
        toml::Value::Float(v) => Some(ItemProperty::Float(v)),
        toml::Value::Boolean(v) => Some(ItemProperty::Bool(v)),
        toml::Value::String(v) => Some(ItemProperty::String(v)),
        _ => None,
    }
}

fn convert_item(raw: ItemToml) -> Result<ItemDefinition> {
    let equip_type = raw
        .equip
        .as_deref()
        .map(str::parse::<EquipType>)
        .transpose()
        .map_err(|reason| RegistryError::InvalidDefinition {
            id: raw.id.as_str().into(),
            reason,
        })?;

    // Equippable items default to the equipment category
    let category = raw.category.unwrap_or(if equip_type.is_some() {
        ItemCategory::Equipment
    } else {
        ItemCategory::Misc
    });

    let mut definition = ItemDefinition::new(raw.id, raw.name)
        .with_description(raw.description)
        .with_category(category)
        .with_max_stack(raw.max_stack)
        .with_value(raw.value)
        .with_weight(raw.weight)
        .with_icon(raw.icon);

    definition.equip_type = equip_type;
    definition.droppable = raw.droppable;
    definition.max_durability = raw.max_durability;
    definition.backpack = raw
        .backpack
        .map(|pack| BackpackStats::new(pack.slots, pack.weight_bonus));

    for (key, value) in raw.properties {
        match convert_property(value) {
            Some(property) => {
                definition.properties.insert(key, property);
            }
            None => log::warn!(
                "Item '{}': ignoring unsupported property '{}'",
                definition.id,
                key
            ),
        }
    }

    Ok(definition)
}

/// Parse item definitions from a TOML string
pub fn parse_manifest(content: &str) -> Result<Vec<ItemDefinition>> {
    let raw: ManifestToml = toml::from_str(content)?;
    raw.item.into_iter().map(convert_item).collect()
}

/// Load item definitions from a manifest file
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<ItemDefinition>> {
    let content = std::fs::read_to_string(path)?;
    parse_manifest(&content)
}

impl ItemRegistry {
    /// Build a registry from a TOML manifest string
    ///
    /// A duplicate id aborts initialization.
    pub fn from_manifest_str(content: &str) -> Result<Self> {
        let registry = Self::from_definitions(parse_manifest(content)?)?;
        log::info!("Item registry initialized with {} definitions", registry.len());
        Ok(registry)
    }

    /// Build a registry from a manifest file
    pub fn from_manifest_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_manifest_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
        [[item]]
        id = "iron_sword"
        name = "Iron Sword"
        equip = "weapon"
        weight = 3.5
        max_durability = 100.0

        [[item]]
        id = "arrow"
        name = "Arrow"
        category = "ammo"
        max_stack = 50
        weight = 0.05

        [item.properties]
        damage = 4
        element = "none"

        [[item]]
        id = "letter"
        name = "Sealed Letter"
        category = "quest"
        droppable = false

        [[item]]
        id = "travel_pack"
        name = "Travel Pack"
        backpack = { slots = 6, weight_bonus = 25.0 }
    "#;

    #[test]
    fn test_parse_manifest() {
        let items = parse_manifest(MANIFEST).unwrap();
        assert_eq!(items.len(), 4);

        let sword = &items[0];
        assert_eq!(sword.equip_type, Some(EquipType::Weapon));
        assert_eq!(sword.category, ItemCategory::Equipment);
        assert_eq!(sword.max_stack, 1);
        assert_eq!(sword.max_durability, Some(100.0));

        let arrow = &items[1];
        assert_eq!(arrow.max_stack, 50);
        assert_eq!(arrow.get_property("damage"), Some(&ItemProperty::Int(4)));

        assert!(!items[2].droppable);
        assert_eq!(items[3].backpack, Some(BackpackStats::new(6, 25.0)));
        assert!(items[1].backpack.is_none());
    }

    #[test]
    fn test_unknown_equip_type() {
        let result = parse_manifest(
            r#"
            [[item]]
            id = "tail"
            name = "Tail"
            equip = "tail"
            "#,
        );
        assert!(matches!(result, Err(RegistryError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_duplicate_aborts_initialization() {
        let result = ItemRegistry::from_manifest_str(
            r#"
            [[item]]
            id = "gem"
            name = "Gem"

            [[item]]
            id = "gem"
            name = "Other Gem"
            "#,
        );
        assert!(matches!(result, Err(RegistryError::DuplicateDefinition(_))));
    }

    #[test]
    fn test_registry_from_manifest() {
        let registry = ItemRegistry::from_manifest_str(MANIFEST).unwrap();
        assert_eq!(registry.len(), 4);
        assert!(registry.contains("letter"));
    }
}
