//! Favorite (bookmark) entities.

pub mod model;

pub use model::{CreateFavorite, Favorite};
