//! PostgreSQL queries, one repository per table.
//!
//! Repositories take a borrowed connection so the same queries run inside
//! whichever transaction the caller holds.

pub mod editor;
pub mod favorite;
pub mod folder;
pub mod user;

pub use editor::EditorRepository;
pub use favorite::FavoriteRepository;
pub use folder::FolderRepository;
pub use user::UserRepository;
