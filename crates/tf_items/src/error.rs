//! Error types for the item registry

use crate::item::ItemId;
use thiserror::Error;

/// Item registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A definition with this id is already registered
    #[error("Item definition already registered: {0}")]
    DuplicateDefinition(ItemId),

    /// No definition with this id exists
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// Definition violates a registry invariant
    #[error("Invalid item definition '{id}': {reason}")]
    InvalidDefinition { id: ItemId, reason: String },

    /// Requested stack count is outside 1..=max_stack
    #[error("Invalid count {count} for item '{id}' (max stack {max_stack})")]
    InvalidCount { id: ItemId, count: u32, max_stack: u32 },

    /// Manifest could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest could not be parsed
    #[error("TOML parse error: {0}")]
    Manifest(#[from] toml::de::Error),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
