//! Container snapshots for external persistence
//!
//! A snapshot is a list of `(slot, item id, count, state)` entries plus the
//! equipped backpack. It carries no instance ids; restoring mints fresh ones
//! from the registry.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tf_interfaces::{InventoryError, InventoryResult, SlotIndex};
use tf_items::{BackpackStats, InstanceState, ItemId, ItemInstance};

use crate::container::{InventoryContainer, WEIGHT_EPSILON};
use crate::event::ChangeKind;
use crate::slot::{Slot, SlotKind};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 2;

/// Snapshot encoding errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// Format version mismatch
    #[error("Version mismatch: snapshot version {0}, current version {1}")]
    VersionMismatch(u32, u32),
}

/// Snapshot encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotFormat {
    /// JSON (human readable)
    Json,
    /// Binary (compact)
    Binary,
}

impl Default for SnapshotFormat {
    fn default() -> Self {
        Self::Binary
    }
}

/// How to treat entries whose item id is no longer registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreMode {
    /// Fail with `VersionMismatch`
    #[default]
    Strict,
    /// Drop the entry and log a warning
    Lenient,
}

/// One occupied slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Slot index
    pub slot: SlotIndex,
    /// Definition id
    pub item_id: ItemId,
    /// Stack count
    pub count: u32,
    /// Per-instance state
    pub state: Option<InstanceState>,
}

/// Serializable container contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    /// Format version
    pub version: u32,
    /// Equipped backpack
    pub backpack: Option<BackpackStats>,
    /// Occupied slots, in slot order
    pub entries: Vec<SnapshotEntry>,
}

impl ContainerSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            backpack: None,
            entries: Vec::new(),
        }
    }

    /// Record an equipped backpack
    pub fn with_backpack(mut self, stats: BackpackStats) -> Self {
        self.backpack = Some(stats);
        self
    }

    /// Add an entry
    pub fn with_entry(
        mut self,
        slot: SlotIndex,
        item_id: impl Into<ItemId>,
        count: u32,
        state: Option<InstanceState>,
    ) -> Self {
        self.entries.push(SnapshotEntry {
            slot,
            item_id: item_id.into(),
            count,
            state,
        });
        self
    }

    /// Check if the snapshot holds no items
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode in the given format
    pub fn encode(&self, format: SnapshotFormat) -> Result<Vec<u8>, SnapshotError> {
        match format {
            SnapshotFormat::Json => serde_json::to_vec_pretty(self)
                .map_err(|e| SnapshotError::Serialization(e.to_string())),
            SnapshotFormat::Binary => {
                bincode::serialize(self).map_err(|e| SnapshotError::Serialization(e.to_string()))
            }
        }
    }

    /// Decode from the given format
    pub fn decode(bytes: &[u8], format: SnapshotFormat) -> Result<Self, SnapshotError> {
        let snapshot: Self = match format {
            SnapshotFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| SnapshotError::Deserialization(e.to_string()))?,
            SnapshotFormat::Binary => bincode::deserialize(bytes)
                .map_err(|e| SnapshotError::Deserialization(e.to_string()))?,
        };

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch(
                snapshot.version,
                SNAPSHOT_VERSION,
            ));
        }
        Ok(snapshot)
    }

    /// Encode as JSON text
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    /// Decode from JSON text
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Self::decode(json.as_bytes(), SnapshotFormat::Json)
    }
}

impl Default for ContainerSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryContainer {
    /// Capture the current contents
    pub fn snapshot(&self) -> ContainerSnapshot {
        let entries = self
            .items()
            .map(|(slot, item)| SnapshotEntry {
                slot,
                item_id: item.item_id().clone(),
                count: item.count(),
                state: item.state().cloned(),
            })
            .collect();

        ContainerSnapshot {
            version: SNAPSHOT_VERSION,
            backpack: self.backpack(),
            entries,
        }
    }

    /// Replace the contents with a snapshot
    ///
    /// All-or-nothing: any invalid entry, or contents heavier than the weight
    /// limit, leave the container untouched. The backpack is equipped or
    /// removed to match the snapshot. Returns the number of entries dropped
    /// in lenient mode.
    pub fn restore(
        &mut self,
        snapshot: &ContainerSnapshot,
        mode: RestoreMode,
    ) -> InventoryResult<usize> {
        let base = self.layout().capacity();
        if snapshot.backpack.map_or(false, |pack| pack.slots == 0) {
            return Err(InventoryError::CorruptSnapshot(
                "backpack without slots".to_string(),
            ));
        }
        let capacity = base + snapshot.backpack.map_or(0, |pack| pack.slots);
        let kind_at = |index: SlotIndex| {
            if index < base {
                self.slots[index].kind
            } else {
                SlotKind::Generic
            }
        };

        let mut restored: Vec<(SlotIndex, ItemInstance)> = Vec::with_capacity(snapshot.entries.len());
        let mut seen = HashSet::new();
        let mut dropped = 0;

        for entry in &snapshot.entries {
            if entry.slot >= capacity {
                return Err(InventoryError::InvalidSlot {
                    slot: entry.slot,
                    capacity,
                });
            }
            if !seen.insert(entry.slot) {
                return Err(InventoryError::CorruptSnapshot(format!(
                    "slot {} appears more than once",
                    entry.slot
                )));
            }

            let definition = match self.registry().lookup(entry.item_id.as_str()) {
                Ok(definition) => definition,
                Err(_) if mode == RestoreMode::Lenient => {
                    log::warn!(
                        "Dropping unknown item '{}' from slot {} during restore",
                        entry.item_id,
                        entry.slot
                    );
                    dropped += 1;
                    continue;
                }
                Err(_) => return Err(InventoryError::VersionMismatch(entry.item_id.clone())),
            };

            if entry.count == 0 || entry.count > definition.max_stack {
                return Err(InventoryError::CorruptSnapshot(format!(
                    "slot {} holds {} x '{}' (max stack {})",
                    entry.slot, entry.count, entry.item_id, definition.max_stack
                )));
            }
            if !kind_at(entry.slot).accepts(&*definition) {
                return Err(InventoryError::SlotMismatch {
                    slot: entry.slot,
                    item: entry.item_id.clone(),
                });
            }

            let item = self.registry().instantiate_with_state(
                entry.item_id.as_str(),
                entry.count,
                entry.state.clone(),
            )?;
            restored.push((entry.slot, item));
        }

        if let Some(limit) = self.max_weight {
            let limit = limit + snapshot.backpack.map_or(0.0, |pack| pack.weight_bonus.max(0.0));
            let weight: f32 = restored.iter().map(|(_, item)| item.weight()).sum();
            if weight > limit + WEIGHT_EPSILON {
                return Err(InventoryError::WeightLimitExceeded {
                    current: 0.0,
                    additional: weight,
                    limit,
                });
            }
        }

        let previous = self.slots.len();
        self.slots.truncate(base);
        for slot in &mut self.slots {
            slot.item = None;
        }
        self.slots
            .extend((base..capacity).map(|index| Slot::new(index, SlotKind::Generic)));
        self.backpack = snapshot
            .backpack
            .map(|pack| BackpackStats::new(pack.slots, pack.weight_bonus.max(0.0)));
        self.equip_origins.clear();
        for (index, item) in restored {
            self.slots[index].item = Some(item);
        }

        log::info!(
            "{} restored {} entries ({} dropped)",
            self.id(),
            snapshot.entries.len() - dropped,
            dropped
        );
        let all = (0..previous.max(capacity)).collect();
        self.commit(ChangeKind::Restored, all);
        Ok(dropped)
    }
}
