//! Container layout and TOML configuration
//!
//! ```toml
//! slots = 24
//! equip_slots = ["head", "armor", "weapon", "offhand"]
//! max_weight = 80.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tf_items::EquipType;

use crate::slot::SlotKind;

/// Default number of general-purpose slots
pub const DEFAULT_SLOTS: usize = 20;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Slot layout of a container
///
/// Generic slots occupy indices `0..generic`, followed by one slot per
/// equip type in insertion order. Each equip type appears at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLayout {
    generic: usize,
    equip: Vec<EquipType>,
}

impl ContainerLayout {
    /// Layout with only generic slots
    pub fn new(generic: usize) -> Self {
        Self {
            generic,
            equip: Vec::new(),
        }
    }

    /// Add an equip slot; duplicates are ignored
    pub fn with_equip_slot(mut self, equip_type: EquipType) -> Self {
        if self.equip.contains(&equip_type) {
            log::warn!("Ignoring duplicate equip slot '{}'", equip_type);
        } else {
            self.equip.push(equip_type);
        }
        self
    }

    /// Add several equip slots
    pub fn with_equip_slots(self, types: impl IntoIterator<Item = EquipType>) -> Self {
        types.into_iter().fold(self, Self::with_equip_slot)
    }

    /// Number of generic slots
    pub fn generic_slots(&self) -> usize {
        self.generic
    }

    /// Equip slot types, in slot order
    pub fn equip_slots(&self) -> &[EquipType] {
        &self.equip
    }

    /// Total slot count
    pub fn capacity(&self) -> usize {
        self.generic + self.equip.len()
    }

    /// Kind of every slot, in index order
    pub fn kinds(&self) -> impl Iterator<Item = SlotKind> + '_ {
        std::iter::repeat(SlotKind::Generic)
            .take(self.generic)
            .chain(self.equip.iter().copied().map(SlotKind::Equip))
    }
}

impl Default for ContainerLayout {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS)
    }
}

/// Inventory configuration as loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Number of general-purpose slots
    pub slots: usize,
    /// Equip slot names (see `EquipType` for accepted aliases)
    pub equip_slots: Vec<String>,
    /// Carry weight limit (none = unlimited)
    pub max_weight: Option<f32>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOTS,
            equip_slots: EquipType::all_standard()
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_weight: None,
        }
    }
}

impl InventoryConfig {
    /// Parse and validate a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots == 0 {
            return Err(ConfigError::Invalid(
                "slots must be greater than zero".to_string(),
            ));
        }
        if let Some(limit) = self.max_weight {
            if limit.is_nan() || limit <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "max_weight must be positive, got {}",
                    limit
                )));
            }
        }
        self.equip_types().map(|_| ())
    }

    /// Parsed equip slot types
    pub fn equip_types(&self) -> Result<Vec<EquipType>, ConfigError> {
        self.equip_slots
            .iter()
            .map(|name| name.parse::<EquipType>().map_err(ConfigError::Invalid))
            .collect()
    }

    /// Build the container layout
    pub fn layout(&self) -> Result<ContainerLayout, ConfigError> {
        Ok(ContainerLayout::new(self.slots).with_equip_slots(self.equip_types()?))
    }
}
