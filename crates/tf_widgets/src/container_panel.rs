//! Panels for storage containers
//!
//! A chest belongs to no character, so its panel registers on the shared
//! container directly. Like the inventory panel it only keeps a weak handle
//! and a row cache patched by its observer.

use parking_lot::Mutex;
use std::sync::Arc;

use tf_interfaces::{ContainerId, SlotIndex};
use tf_inventory::{ContainerHandle, ObserverId, SharedContainer, SlotSnapshot};

use crate::widget::{RowCache, WidgetError, WidgetResult};

/// Panel showing a storage container
pub struct ContainerPanel {
    handle: ContainerHandle,
    /// `None` once closed
    observer: Option<ObserverId>,
    cache: Arc<Mutex<RowCache>>,
}

impl ContainerPanel {
    /// Open a panel on a container
    pub fn open(container: &SharedContainer) -> Self {
        let handle = container.handle();
        let mut inner = container.lock();
        let cache = Arc::new(Mutex::new(RowCache::new(
            inner.slots_snapshot(),
            inner.version(),
        )));

        let sink = Arc::clone(&cache);
        let observer = inner.register_observer(move |event, view| {
            sink.lock().patch(event, view);
        });
        log::debug!("Panel opened on {}", container.id());

        Self {
            handle,
            observer: Some(observer),
            cache,
        }
    }

    /// Container shown
    pub fn container(&self) -> ContainerId {
        self.handle.id()
    }

    /// Check if the panel is open on a live container
    pub fn is_open(&self) -> bool {
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

    /// Stop following the container
    ///
    /// Closing twice reports `Detached`.
    pub fn close(&mut self) -> WidgetResult<()> {
        let observer = self.observer.take().ok_or(WidgetError::Detached)?;
        if !self.handle.unregister_observer(observer) {
            log::debug!("{} was gone before its panel closed", self.handle.id());
        }
        Ok(())
    }
}

impl Drop for ContainerPanel {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            self.handle.unregister_observer(observer);
        }
    }
}

impl std::fmt::Debug for ContainerPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerPanel")
            .field("container", &self.handle.id())
            .field("open", &self.observer.is_some())
            .field("version", &self.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_inventory::{ContainerLayout, InventoryContainer};
    use tf_items::{ItemDefinition, ItemRegistry};

    fn chest() -> SharedContainer {
        let registry = Arc::new(
            ItemRegistry::from_definitions([ItemDefinition::new("gem", "Gem").with_max_stack(5)])
                .unwrap(),
        );
        SharedContainer::new(InventoryContainer::new(registry, ContainerLayout::new(3)))
    }

    #[test]
    fn test_panel_follows_container() {
        let chest = chest();
        let mut panel = ContainerPanel::open(&chest);
        assert_eq!(panel.rows().len(), 3);
        assert_eq!(panel.version(), 0);

        {
            let mut inner = chest.lock();
            let gems = inner.registry().instantiate("gem", 5).unwrap();
            inner.add(gems, Some(2)).unwrap();
        }
        assert_eq!(panel.take_dirty(), vec![2]);
        assert_eq!(panel.row(2).unwrap().count(), 5);
        assert!(!panel.is_stale());
    }

    #[test]
    fn test_close_unregisters() {
        let chest = chest();
        let mut panel = ContainerPanel::open(&chest);
        panel.close().unwrap();
        assert!(!panel.is_open());
        assert!(matches!(panel.close(), Err(WidgetError::Detached)));

        {
            let mut inner = chest.lock();
            let gems = inner.registry().instantiate("gem", 1).unwrap();
            inner.add(gems, None).unwrap();
        }
        assert!(panel.take_dirty().is_empty());
        assert!(panel.is_stale());
        assert!(matches!(panel.refresh(), Err(WidgetError::Detached)));
    }

    #[test]
    fn test_drop_releases_observer() {
        let chest = chest();
        let panel = ContainerPanel::open(&chest);
        drop(panel);

        let again = ContainerPanel::open(&chest);
        assert!(again.is_open());
        // Dropping the container leaves the panel stale.
        drop(chest);
        assert!(!again.is_open());
        assert!(again.is_stale());
    }
}
