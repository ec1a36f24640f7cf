//! # portal-entity
//!
//! Domain entity models for the home portal. Row structs derive
//! `sqlx::FromRow`; the folder arena, the rank resequencer, and the
//! per-user selection state are pure in-memory logic with no I/O, so
//! the service layer can load a scope, mutate it here, and write back
//! the result inside one transaction.

pub mod favorite;
pub mod folder;
pub mod rank;
pub mod selection;
pub mod user;
