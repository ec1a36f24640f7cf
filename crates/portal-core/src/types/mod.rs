//! Core type definitions used across the portal workspace.

pub mod direction;
pub mod id;
pub mod page;

pub use direction::Direction;
pub use id::*;
pub use page::{Page, PageMap};
