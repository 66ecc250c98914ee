//! In-memory review session state and its persistence triggers

mod coordinator;

pub use coordinator::{DEBOUNCE_INTERVAL, SessionCoordinator};
