//! Folder domain entities.

pub mod arena;
pub mod model;
pub mod tree;

pub use arena::{EditorChange, EditorDelta, FolderArena, FolderRecord, Grant, validate_sharing};
pub use model::{CreateFolder, EditorLink, Folder};
pub use tree::{FolderTree, FolderTreeEntry, breadcrumbs};
