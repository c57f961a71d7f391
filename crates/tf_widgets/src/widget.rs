//! Inventory panel binding
//!
//! A widget never holds the container. It keeps a weak handle, an observer
//! registration and a cache of slot copies that the observer patches in
//! place, one affected slot at a time.

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

use tf_characters::{CharacterInventory, ObserverHandle};
use tf_interfaces::{ContainerId, EntityId, InventoryError, SlotIndex};
use tf_inventory::{ChangeEvent, ContainerHandle, ContainerView, SlotKind, SlotSnapshot};

use crate::command::{CommandOutcome, UiCommand};
use crate::feedback::{FeedbackLog, Notification};

/// Widget errors
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The character despawned or the widget was detached
    #[error("Widget is detached from its container")]
    Detached,

    /// The command was issued through a different character
    #[error("Widget belongs to {expected}, not {actual}")]
    WrongCharacter { expected: EntityId, actual: EntityId },

    /// The engine refused the command
    #[error(transparent)]
    Rejected(InventoryError),
}

impl From<InventoryError> for WidgetError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::CharacterDespawned => Self::Detached,
            other => Self::Rejected(other),
        }
    }
}

/// Result type for widget operations
pub type WidgetResult<T> = Result<T, WidgetError>;

/// Rows as last delivered by the container
#[derive(Debug, Default)]
pub(crate) struct RowCache {
    pub(crate) rows: Vec<SlotSnapshot>,
    pub(crate) version: u64,
    /// Slots patched since the last `take_dirty`
    pub(crate) dirty: Vec<SlotIndex>,
}

impl RowCache {
    pub(crate) fn new(rows: Vec<SlotSnapshot>, version: u64) -> Self {
        Self {
            rows,
            version,
            dirty: Vec::new(),
        }
    }

    /// Replace every row and mark them all dirty
    pub(crate) fn reload(&mut self, rows: Vec<SlotSnapshot>, version: u64) {
        self.dirty = (0..rows.len()).collect();
        self.rows = rows;
        self.version = version;
    }

    /// Apply one change event
    ///
    /// Rows follow the container's capacity, so slots a backpack adds or
    /// takes away appear and disappear here too.
    pub(crate) fn patch(&mut self, event: &ChangeEvent, view: &ContainerView<'_>) {
        let capacity = view.capacity();
        if self.rows.len() > capacity {
            self.rows.truncate(capacity);
            self.dirty.retain(|&index| index < capacity);
        }
        while self.rows.len() < capacity {
            let Some(snapshot) = view.slot(self.rows.len()) else {
                break;
            };
            self.mark(snapshot.index);
            self.rows.push(snapshot);
        }

        for snapshot in view.slots(&event.slots) {
            let index = snapshot.index;
            if let Some(row) = self.rows.get_mut(index) {
                *row = snapshot;
                self.mark(index);
            }
        }
        self.version = event.version;
    }

    fn mark(&mut self, index: SlotIndex) {
        if !self.dirty.contains(&index) {
            self.dirty.push(index);
        }
    }
}

/// Inventory panel bound to one character
pub struct InventoryWidget {
    /// Character the panel shows
    character: EntityId,
    /// Container the panel shows
    container: ContainerId,
    /// Weak handle for re-reads
    handle: ContainerHandle,
    /// Observer registration, `None` once detached
    observer: Option<ObserverHandle>,
    /// Rows shared with the observer
    cache: Arc<Mutex<RowCache>>,
    /// Player feedback
    feedback: FeedbackLog,
}

impl InventoryWidget {
    /// Attach a panel to a character's inventory
    pub fn attach(character: &mut CharacterInventory) -> WidgetResult<Self> {
        let handle = character.handle()?;
        let container = handle.id();
        let (rows, version) = handle
            .read(|view| (view.all_slots(), view.version()))
            .ok_or(WidgetError::Detached)?;

        let cache = Arc::new(Mutex::new(RowCache::new(rows, version)));
        let sink = Arc::clone(&cache);
        let observer = character.register_observer(container, move |event, view| {
            sink.lock().patch(event, view);
        })?;

        log::debug!("Widget attached to {} ({})", character.owner(), container);
        Ok(Self {
            character: character.owner(),
            container,
            handle,
            observer: Some(observer),
            cache,
            feedback: FeedbackLog::new(),
        })
    }

    /// Container shown
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Check if still bound to a live container
    pub fn is_attached(&self) -> bool {
        self.observer.is_some() && self.handle.is_alive()
    }

    /// Copy of every row
    pub fn rows(&self) -> Vec<SlotSnapshot> {
        self.cache.lock().rows.clone()
    }

    /// Copy of one row
    pub fn row(&self, index: SlotIndex) -> Option<SlotSnapshot> {
        self.cache.lock().rows.get(index).cloned()
    }

    /// Last version the cache saw
    pub fn version(&self) -> u64 {
        self.cache.lock().version
    }

    /// Slots patched since the last call, in patch order
    pub fn take_dirty(&mut self) -> Vec<SlotIndex> {
        std::mem::take(&mut self.cache.lock().dirty)
    }

    /// Check whether the cache lags the container
    ///
    /// A widget whose container is gone is always stale.
    pub fn is_stale(&self) -> bool {
        match self.handle.read(|view| view.version()) {
            Some(version) => version != self.version(),
            None => true,
        }
    }

    /// Re-read every row
    pub fn refresh(&mut self) -> WidgetResult<()> {
        if self.observer.is_none() {
            return Err(WidgetError::Detached);
        }
        let (rows, version) = self
            .handle
            .read(|view| (view.all_slots(), view.version()))
            .ok_or(WidgetError::Detached)?;

        self.cache.lock().reload(rows, version);
        Ok(())
    }

    /// Forward a player command to the engine
    ///
    /// Refused commands are reported to the feedback log and returned; they
    /// are never retried.
    pub fn execute(
        &mut self,
        character: &CharacterInventory,
        command: UiCommand,
    ) -> WidgetResult<CommandOutcome> {
        if self.observer.is_none() {
            return Err(WidgetError::Detached);
        }
        if character.owner() != self.character {
            return Err(WidgetError::WrongCharacter {
                expected: self.character,
                actual: character.owner(),
            });
        }

        match character.with_container(|container| command.apply(container))? {
            Ok(outcome) => {
                log::debug!("{} {} ok", self.container, command.name());
                if let CommandOutcome::Dropped(Some(item)) = &outcome {
                    self.feedback.push(
                        Notification::item(format!("Dropped {}", item.definition().name))
                            .with_body(format!("x{}", item.count())),
                    );
                }
                Ok(outcome)
            }
            Err(error) => {
                log::debug!("{} {} refused: {}", self.container, command.name(), error);
                self.feedback.push(Notification::from_error(&error));
                Err(error.into())
            }
        }
    }

    /// Player feedback
    pub fn feedback(&self) -> &FeedbackLog {
        &self.feedback
    }

    /// Mutable player feedback, for timers
    pub fn feedback_mut(&mut self) -> &mut FeedbackLog {
        &mut self.feedback
    }

    /// Unregister from the character
    ///
    /// Detaching after the character despawned reports `Detached`; its
    /// observers are already gone.
    pub fn detach(&mut self, character: &mut CharacterInventory) -> WidgetResult<()> {
        let observer = self.observer.take().ok_or(WidgetError::Detached)?;
        character.unregister_observer(observer)?;
        log::debug!("Widget detached from {}", self.container);
        Ok(())
    }
}

impl std::fmt::Debug for InventoryWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryWidget")
            .field("character", &self.character)
            .field("container", &self.container)
            .field("attached", &self.observer.is_some())
            .field("version", &self.version())
            .finish()
    }
}

/// One-line text for a row
///
/// Counts of one are hidden, as in the slot grid.
pub fn describe_row(row: &SlotSnapshot) -> String {
    let label = match row.kind {
        SlotKind::Generic => format!("[{}]", row.index),
        SlotKind::Equip(equip_type) => format!("[{}:{}]", row.index, equip_type),
    };
    match &row.item {
        Some(item) if item.count > 1 => format!("{} {} x{}", label, item.name, item.count),
        Some(item) => format!("{} {}", label, item.name),
        None => format!("{} -", label),
    }
}
