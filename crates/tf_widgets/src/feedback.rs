//! Player feedback

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tf_interfaces::InventoryError;

/// Feedback category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeedbackKind {
    /// General information
    #[default]
    Info,
    /// Command succeeded
    Success,
    /// Command refused for a gameplay reason
    Warning,
    /// Command failed unexpectedly
    Error,
    /// Item picked up or dropped
    Item,
}

impl FeedbackKind {
    /// Get icon name for this kind
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "check",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Item => "bag",
        }
    }
}

/// A message shown to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Category
    pub kind: FeedbackKind,
    /// Title text
    pub title: String,
    /// Body text
    pub body: String,
    /// Display duration in seconds
    pub duration: f32,
    /// Time remaining
    pub time_remaining: f32,
}

impl Notification {
    /// Create a new notification
    pub fn new(kind: FeedbackKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: String::new(),
            duration: 3.0,
            time_remaining: 3.0,
        }
    }

    /// Set body text
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set duration
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self.time_remaining = duration;
        self
    }

    /// Advance the timer, returning whether it is still visible
    pub fn update(&mut self, delta_time: f32) -> bool {
        self.time_remaining -= delta_time;
        self.time_remaining > 0.0
    }

    /// Info notification
    pub fn info(title: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Info, title)
    }

    /// Success notification
    pub fn success(title: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Success, title)
    }

    /// Warning notification
    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Warning, title)
    }

    /// Error notification
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Error, title)
    }

    /// Item notification
    pub fn item(title: impl Into<String>) -> Self {
        Self::new(FeedbackKind::Item, title).with_duration(2.0)
    }

    /// Map an engine error to something the player can read
    pub fn from_error(error: &InventoryError) -> Self {
        let title = match error {
            InventoryError::InventoryFull { .. } | InventoryError::ContainerFull { .. } => {
                "Inventory full"
            }
            InventoryError::WeightLimitExceeded { .. } => "Too heavy",
            InventoryError::SlotMismatch { .. } => "Can't put that there",
            InventoryError::NoMatchingEquipSlot(_) => "Can't equip that",
            InventoryError::SlotOccupied { .. } => "Slot already in use",
            InventoryError::InsufficientCount { .. } => "Not enough items",
            InventoryError::EmptySlot(_) => "Nothing there",
            InventoryError::NotDroppable(_) => "Can't drop that",
            InventoryError::InvalidSlot { .. } => "No such slot",
            InventoryError::CharacterDespawned => "Character is gone",
            InventoryError::BackpackEquipped => "Already have a backpack",
            InventoryError::NoBackpack => "No backpack equipped",
            _ => "Something went wrong",
        };
        let kind = match error {
            InventoryError::VersionMismatch(_)
            | InventoryError::CorruptSnapshot(_)
            | InventoryError::SameContainer
            | InventoryError::UnknownContainer(_)
            | InventoryError::Registry(_) => FeedbackKind::Error,
            _ => FeedbackKind::Warning,
        };
        Self::new(kind, title).with_body(error.to_string())
    }
}

/// Rolling log of recent notifications
#[derive(Debug)]
pub struct FeedbackLog {
    /// Visible notifications, oldest first
    entries: VecDeque<Notification>,
    /// Maximum kept entries
    pub max_visible: usize,
}

impl FeedbackLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            max_visible: 5,
        }
    }

    /// Push a notification, evicting the oldest when full
    pub fn push(&mut self, notification: Notification) {
        while self.entries.len() >= self.max_visible.max(1) {
            self.entries.pop_front();
        }
        self.entries.push_back(notification);
    }

    /// Expire old notifications
    pub fn update(&mut self, delta_time: f32) {
        self.entries.retain_mut(|n| n.update(delta_time));
    }

    /// Most recent notification
    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    /// Iterate oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Get notification count
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for FeedbackLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_items::ItemId;

    #[test]
    fn test_notification_expires() {
        let mut notif = Notification::info("Test").with_duration(1.0);

        assert!(notif.update(0.5));
        assert!(!notif.update(0.6));
    }

    #[test]
    fn test_from_error() {
        let full = Notification::from_error(&InventoryError::InventoryFull {
            item: ItemId::new("herb"),
            count: 3,
        });
        assert_eq!(full.kind, FeedbackKind::Warning);
        assert_eq!(full.title, "Inventory full");
        assert!(full.body.contains("herb"));

        let corrupt = Notification::from_error(&InventoryError::CorruptSnapshot("bad".into()));
        assert_eq!(corrupt.kind, FeedbackKind::Error);

        let pack = Notification::from_error(&InventoryError::BackpackEquipped);
        assert_eq!(pack.title, "Already have a backpack");
        assert_eq!(pack.kind, FeedbackKind::Warning);
    }

    #[test]
    fn test_log_evicts_oldest() {
        let mut log = FeedbackLog::new();
        log.max_visible = 2;

        log.push(Notification::info("one"));
        log.push(Notification::info("two"));
        log.push(Notification::info("three"));

        assert_eq!(log.count(), 2);
        let titles: Vec<_> = log.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["two", "three"]);
        assert_eq!(log.latest().unwrap().title, "three");
    }

    #[test]
    fn test_log_update() {
        let mut log = FeedbackLog::default();
        log.push(Notification::item("Herb").with_duration(1.0));
        log.push(Notification::warning("Too heavy").with_duration(5.0));

        log.update(2.0);
        assert_eq!(log.count(), 1);
        assert_eq!(log.latest().unwrap().kind.icon_name(), "warning");
    }
}
