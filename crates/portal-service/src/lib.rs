//! # portal-service
//!
//! Business logic for the home portal. Each service holds the shared
//! store and runs every operation inside one store transaction: load the
//! affected scope, mutate it with the pure entity logic, write back the
//! changed rows, commit.
//!
//! Services follow constructor injection: dependencies are provided at
//! construction time via `Arc` references.

pub mod context;
pub mod folder;
pub mod home;
pub mod selection;

pub use context::RequestContext;
pub use folder::{FolderService, SharingService, TreeService};
pub use home::{HomeGridService, MoveOutcome};
pub use selection::SelectionService;
