//! Request handlers, grouped by area.

pub mod folder;
pub mod health;
pub mod home;
pub mod selection;
pub mod sharing;
