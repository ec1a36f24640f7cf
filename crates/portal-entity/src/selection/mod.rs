//! Per-user view state: selected and expanded folders.

pub mod state;

pub use state::SelectionState;
