//! Per-user folder selection.

pub mod service;

pub use service::SelectionService;
