//! Scripted inventory sessions
//!
//! A session spawns one character, scatters pickups, loots chests, replays
//! panel commands through an attached widget and finally checks that the
//! inventory survives a snapshot round trip.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use tf_characters::storage::DEFAULT_STORAGE_SLOTS;
use tf_characters::{CharacterInventory, StorageContainer, WorldItemPickup};
use tf_interfaces::{EntityId, InteractionResult, InventoryError, SlotIndex};
use tf_inventory::{
    transfer, ContainerSnapshot, InventoryConfig, InventoryContainer, RestoreMode, Slot,
    SnapshotFormat,
};
use tf_items::{EquipType, ItemInstance, ItemRegistry};
use tf_widgets::{describe_row, CommandOutcome, InventoryWidget, UiCommand, WidgetError};

use crate::config::RuntimeError;

/// Items placed in the world or in a chest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    /// Item id
    pub item: String,
    /// Total units, split into full stacks
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

fn default_chest_slots() -> usize {
    DEFAULT_STORAGE_SLOTS
}

/// A chest to open and loot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChestSpec {
    /// Display name
    pub name: String,
    /// Capacity
    #[serde(default = "default_chest_slots")]
    pub slots: usize,
    /// Locked chests refuse to open
    #[serde(default)]
    pub locked: bool,
    /// Item that unlocks the chest
    #[serde(default)]
    pub key: Option<String>,
    /// Contents
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

/// Session script as loaded from `session.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionScript {
    /// World pickups, picked up in order
    pub pickups: Vec<ItemSpec>,
    /// Chests, looted in order
    pub chests: Vec<ChestSpec>,
    /// Panel commands, replayed in order
    pub commands: Vec<UiCommand>,
    /// Encoding for the final snapshot
    pub snapshot_format: SnapshotFormat,
    /// Where to write the final snapshot
    pub save_to: Option<PathBuf>,
}

impl SessionScript {
    /// Built-in demo, matching the built-in item set
    pub fn demo() -> Self {
        let spec = |item: &str, count| ItemSpec {
            item: item.to_string(),
            count,
        };
        Self {
            pickups: vec![
                spec("gold_coin", 120),
                spec("health_potion", 14),
                spec("iron_sword", 1),
                spec("leather_armor", 1),
                spec("travel_pack", 1),
            ],
            chests: vec![
                ChestSpec {
                    name: "Old Chest".to_string(),
                    slots: DEFAULT_STORAGE_SLOTS,
                    locked: false,
                    key: None,
                    items: vec![spec("gold_coin", 50), spec("quest_key", 1)],
                },
                ChestSpec {
                    name: "Sealed Chest".to_string(),
                    slots: DEFAULT_STORAGE_SLOTS,
                    locked: true,
                    key: Some("quest_key".to_string()),
                    items: vec![spec("gold_coin", 30)],
                },
            ],
            commands: vec![
                UiCommand::Equip { slot: 3, swap: false },
                UiCommand::Equip { slot: 4, swap: false },
                UiCommand::Move { from: 2, to: 1, count: None },
                UiCommand::Split { slot: 0, count: 20 },
                UiCommand::Drop { slot: 5, count: 1 },
                UiCommand::Drop { slot: 2, count: 2 },
                UiCommand::Unequip { equip_type: EquipType::Weapon },
                UiCommand::Examine { slot: 0 },
            ],
            snapshot_format: SnapshotFormat::default(),
            save_to: None,
        }
    }
}

/// What a session did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Units picked up from the world
    pub picked_up: u32,
    /// Units moved out of chests
    pub looted: u32,
    /// Commands the engine accepted
    pub commands_ok: usize,
    /// Commands the engine refused
    pub commands_refused: usize,
    /// Units lying in the world at the end
    pub left_in_world: u32,
    /// Container version at the end
    pub version: u64,
    /// Encoded snapshot size
    pub snapshot_bytes: usize,
}

/// Run a session for one freshly spawned character
pub fn run(
    registry: Arc<ItemRegistry>,
    inventory: &InventoryConfig,
    script: &SessionScript,
) -> Result<SessionReport, RuntimeError> {
    let mut report = SessionReport::default();
    let mut hero = CharacterInventory::spawn(EntityId::new(), Arc::clone(&registry), inventory)?;
    let mut widget = InventoryWidget::attach(&mut hero)?;

    let mut world = Vec::new();
    for spec in &script.pickups {
        for stack in instantiate_stacks(&registry, spec)? {
            world.push(WorldItemPickup::new(Arc::clone(&registry), stack));
        }
    }
    for pickup in &mut world {
        match hero.interact(pickup) {
            InteractionResult::PickedUp {
                item,
                count,
                remaining,
            } => {
                log::info!("Picked up {} x '{}' ({} left)", count, item, remaining);
                report.picked_up += count;
            }
            other => log::warn!("Pickup failed: {:?}", other),
        }
    }
    world.retain(|pickup| !pickup.is_consumed());

    for spec in &script.chests {
        report.looted += loot_chest(&registry, &mut hero, spec)?;
    }

    for command in &script.commands {
        match widget.execute(&hero, command.clone()) {
            Ok(outcome) => {
                report.commands_ok += 1;
                match outcome {
                    CommandOutcome::Dropped(Some(item)) => {
                        log::info!("Dropped {} x '{}'", item.count(), item.item_id());
                        world.push(WorldItemPickup::new(Arc::clone(&registry), item));
                    }
                    CommandOutcome::Examined(Some(item)) => {
                        log::info!("Examined {} x{} ({})", item.name, item.count, item.icon);
                    }
                    other => log::debug!("{} -> {:?}", command.name(), other),
                }
            }
            Err(WidgetError::Rejected(error)) => {
                report.commands_refused += 1;
                log::warn!("{} refused: {}", command.name(), error);
            }
            Err(error) => return Err(error.into()),
        }
    }
    report.left_in_world = world.iter().map(WorldItemPickup::remaining).sum();

    println!();
    println!("Inventory:");
    for row in widget.rows() {
        println!("  {}", describe_row(&row));
    }
    if !widget.feedback().is_empty() {
        println!("Feedback:");
        for note in widget.feedback().iter() {
            println!("  {}: {}", note.title, note.body);
        }
    }
    println!();

    let weight = hero.with_container(|c| c.weight_percent())?;
    log::info!("Carrying {:.0}% of the weight limit", weight * 100.0);

    report.snapshot_bytes = verify_snapshot(&registry, inventory, &hero, script)?;
    report.version = hero.with_container(|c| c.version())?;

    widget.detach(&mut hero)?;
    hero.despawn();
    Ok(report)
}

/// Build full stacks for a spec
fn instantiate_stacks(
    registry: &ItemRegistry,
    spec: &ItemSpec,
) -> Result<Vec<ItemInstance>, RuntimeError> {
    let max_stack = registry.lookup(&spec.item)?.max_stack;
    let mut stacks = Vec::new();
    let mut remaining = spec.count;
    while remaining > 0 {
        let count = remaining.min(max_stack);
        stacks.push(registry.instantiate(&spec.item, count)?);
        remaining -= count;
    }
    Ok(stacks)
}

/// Open a chest and move everything into the character's inventory
fn loot_chest(
    registry: &Arc<ItemRegistry>,
    hero: &mut CharacterInventory,
    spec: &ChestSpec,
) -> Result<u32, RuntimeError> {
    let mut chest = StorageContainer::new(Arc::clone(registry), spec.name.as_str(), spec.slots);
    if let Some(key) = &spec.key {
        registry.lookup(key)?;
        chest = chest.with_required_key(key.as_str());
    }
    chest.set_locked(spec.locked);
    {
        let mut contents = chest.container().lock();
        for item in &spec.items {
            for stack in instantiate_stacks(registry, item)? {
                if let Err(rejected) = contents.add(stack, None) {
                    log::warn!("{} has no room: {}", spec.name, rejected.error);
                }
            }
        }
    }

    match hero.interact(&mut chest) {
        InteractionResult::Opened { container } => {
            log::info!("Opened {} ({})", spec.name, container)
        }
        other => {
            log::info!("{} did not open: {:?}", spec.name, other);
            return Ok(0);
        }
    }

    let mine = hero.container()?;
    let occupied: Vec<SlotIndex> = chest
        .container()
        .lock()
        .items()
        .map(|(slot, _)| slot)
        .collect();

    let mut looted = 0;
    for slot in occupied {
        let count = chest.container().lock().slot(slot).map_or(0, Slot::count);
        match transfer(chest.container(), slot, &mine, None) {
            Ok(_) => looted += count,
            Err(error) => log::warn!("Left slot {} in {}: {}", slot, spec.name, error),
        }
    }
    Ok(looted)
}

/// Encode, decode and restore the character's inventory into a fresh container
///
/// Returns the encoded size.
fn verify_snapshot(
    registry: &Arc<ItemRegistry>,
    inventory: &InventoryConfig,
    hero: &CharacterInventory,
    script: &SessionScript,
) -> Result<usize, RuntimeError> {
    let (snapshot, original) = hero.with_container(|c| (c.snapshot(), contents(c)))?;
    let bytes = snapshot.encode(script.snapshot_format)?;
    if let Some(path) = &script.save_to {
        std::fs::write(path, &bytes)?;
        log::info!("Saved snapshot to {}", path.display());
    }

    let decoded = ContainerSnapshot::decode(&bytes, script.snapshot_format)?;
    let mut restored = InventoryContainer::from_config(Arc::clone(registry), inventory)?;
    restored.restore(&decoded, RestoreMode::Strict)?;
    if contents(&restored) != original {
        return Err(InventoryError::CorruptSnapshot("restored contents differ".to_string()).into());
    }

    log::info!(
        "Snapshot round trip ok: {} entries, {} bytes ({:?})",
        decoded.entries.len(),
        bytes.len(),
        script.snapshot_format
    );
    Ok(bytes.len())
}

fn contents(container: &InventoryContainer) -> Vec<(SlotIndex, String, u32)> {
    container
        .items()
        .map(|(slot, item)| (slot, item.item_id().to_string(), item.count()))
        .collect()
}
