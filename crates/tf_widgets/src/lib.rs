//! TF Widgets - Inventory Presentation Layer
//!
//! Binds inventory panels to a character's container, and chest panels to
//! a storage container, without owning either.
//!
//! # Features
//!
//! - Row caches refreshed only for the slots a change touched
//! - Staleness detection by container version
//! - Chest panels that follow a storage container while it is open
//! - UI commands forwarded verbatim to the engine
//! - Player-facing feedback for rejected commands
//!
//! # Example
//!
//! ```ignore
//! use tf_widgets::prelude::*;
//!
//! let mut widget = InventoryWidget::attach(&mut character)?;
//! widget.execute(&character, UiCommand::Equip { slot: 3 })?;
//!
//! for row in widget.rows() {
//!     println!("{}", describe_row(&row));
//! }
//! ```

pub mod command;
pub mod container_panel;
pub mod feedback;
pub mod widget;

pub mod prelude {
    pub use crate::command::{CommandOutcome, UiCommand};
    pub use crate::container_panel::ContainerPanel;
    pub use crate::feedback::{FeedbackKind, FeedbackLog, Notification};
    pub use crate::widget::{describe_row, InventoryWidget, WidgetError, WidgetResult};
}

pub use prelude::*;
