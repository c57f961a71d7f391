//! Runtime Configuration
//!
//! Everything is read from one configuration directory:
//!
//! - `items.toml`: item manifest (built-in item set when missing)
//! - `inventory.toml`: character inventory layout (defaults when missing)
//! - `session.toml`: scripted session (built-in demo when missing)
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variable: `TF_CONFIG_DIR=/path/to/config`
//! 2. `config/` in the working directory
//!
//! # Example inventory.toml
//!
//! ```toml
//! slots = 12
//! equip_slots = ["head", "armor", "weapon", "offhand"]
//! max_weight = 60.0
//! ```

use std::path::PathBuf;
use thiserror::Error;

use tf_interfaces::InventoryError;
use tf_inventory::{ConfigError, InventoryConfig, SnapshotError};
use tf_items::{ItemRegistry, RegistryError};
use tf_widgets::WidgetError;

use crate::session::SessionScript;

/// Environment variable naming the configuration directory
pub const CONFIG_DIR_ENV: &str = "TF_CONFIG_DIR";

/// Configuration directory used when the variable is unset
pub const DEFAULT_CONFIG_DIR: &str = "config";

const DEFAULT_ITEMS: &str = include_str!("default_items.toml");

/// Runtime errors
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Item registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("Inventory config: {0}")]
    Inventory(#[from] ConfigError),

    #[error("Session script {path}: {source}")]
    Session {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Engine(#[from] InventoryError),

    #[error(transparent)]
    Widget(#[from] WidgetError),
}

/// Loaded runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Directory the files were read from
    pub config_dir: PathBuf,
    /// Item manifest, if present
    pub items_path: Option<PathBuf>,
    /// Character inventory layout
    pub inventory: InventoryConfig,
    /// Session script
    pub session: SessionScript,
    /// Session script path, if present
    pub session_path: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Load from `TF_CONFIG_DIR` or `config/`
    pub fn load() -> Result<Self, RuntimeError> {
        let dir = std::env::var(CONFIG_DIR_ENV)
            .ok()
            .filter(|dir| !dir.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string());
        Self::load_from_dir(dir)
    }

    /// Load from a specific directory
    ///
    /// Missing files fall back to defaults; present but malformed files are
    /// errors.
    pub fn load_from_dir(dir: impl Into<PathBuf>) -> Result<Self, RuntimeError> {
        let config_dir = dir.into();
        if !config_dir.is_dir() {
            log::warn!(
                "Config directory {} not found, using defaults",
                config_dir.display()
            );
        }

        let items_path = existing(config_dir.join("items.toml"));

        let inventory = match existing(config_dir.join("inventory.toml")) {
            Some(path) => {
                log::info!("Loaded inventory config from {}", path.display());
                InventoryConfig::load(&path)?
            }
            None => InventoryConfig::default(),
        };

        let session_path = existing(config_dir.join("session.toml"));
        let session = match &session_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content).map_err(|source| RuntimeError::Session {
                    path: path.clone(),
                    source,
                })?
            }
            None => SessionScript::demo(),
        };

        Ok(Self {
            config_dir,
            items_path,
            inventory,
            session,
            session_path,
        })
    }

    /// Populate the item registry
    ///
    /// A duplicate id is an error; the caller treats it as fatal.
    pub fn build_registry(&self) -> Result<ItemRegistry, RegistryError> {
        match &self.items_path {
            Some(path) => {
                log::info!("Loading item manifest from {}", path.display());
                ItemRegistry::from_manifest_file(path)
            }
            None => {
                log::info!("No item manifest found, using built-in items");
                ItemRegistry::from_manifest_str(DEFAULT_ITEMS)
            }
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("=== Runtime Configuration ===");
        log::info!("Config dir: {}", self.config_dir.display());
        log::info!(
            "Items: {}",
            self.items_path
                .as_deref()
                .map_or_else(|| "built-in".to_string(), |p| p.display().to_string())
        );
        log::info!("Slots: {}", self.inventory.slots);
        log::info!("Equip slots: {}", self.inventory.equip_slots.join(", "));
        match self.inventory.max_weight {
            Some(limit) => log::info!("Max weight: {:.1}", limit),
            None => log::info!("Max weight: unlimited"),
        }
        log::info!(
            "Session: {}",
            self.session_path
                .as_deref()
                .map_or_else(|| "built-in demo".to_string(), |p| p.display().to_string())
        );
        log::info!("=============================");
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}
