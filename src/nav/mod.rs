//! Navigation tree extraction, persistence and the controller driving it.

pub mod controller;
pub mod extract;
pub mod history;
pub mod model;
pub mod store;

pub use controller::{ContentPane, LoadMode, NavigationController, PageTransition, SectionState};
pub use extract::{NavigationOrigin, NavigationSettings, load_navigation};
pub use history::SessionHistory;
pub use model::{ItemId, NavItem, NavigationTree, Section};
pub use store::{FileStore, MemoryStore, SnapshotStore};
