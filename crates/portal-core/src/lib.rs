//! # portal-core
//!
//! Core crate for the home portal. Contains configuration schemas,
//! typed identifiers, the page and direction vocabularies, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other portal crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
