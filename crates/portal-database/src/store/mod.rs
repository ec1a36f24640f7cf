//! Transactional store seam.
//!
//! Every service operation opens one [`StoreTx`], performs all of its reads
//! and writes through it, and commits once. Dropping a transaction without
//! committing discards its writes.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use portal_core::result::AppResult;
use portal_core::types::{FavoriteId, FolderId, Page, UserId};
use portal_entity::favorite::{CreateFavorite, Favorite};
use portal_entity::folder::{CreateFolder, EditorChange, EditorLink, Folder};
use portal_entity::user::User;

/// Factory for store transactions.
#[async_trait]
pub trait PortalStore: Send + Sync {
    /// Open a transaction.
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>>;

    /// Whether the backing store is reachable.
    async fn ping(&self) -> AppResult<bool>;
}

/// One unit of work against the store.
#[async_trait]
pub trait StoreTx: Send {
    /// Serialize writers acting on one owner's rows until commit.
    async fn lock_owner(&mut self, owner: UserId) -> AppResult<()>;

    // Users

    /// Find a user by id.
    async fn find_user(&mut self, id: UserId) -> AppResult<Option<User>>;

    /// Create a user.
    async fn insert_user(&mut self, username: &str) -> AppResult<User>;

    // Folders

    /// Find a folder by id.
    async fn find_folder(&mut self, id: FolderId) -> AppResult<Option<Folder>>;

    /// All folders `owner` owns on `page`.
    async fn owned_folders(&mut self, owner: UserId, page: Page) -> AppResult<Vec<Folder>>;

    /// Folders on `page` that `user` owns or may edit, ordered by name.
    async fn visible_folders(&mut self, user: UserId, page: Page) -> AppResult<Vec<Folder>>;

    /// Folders `owner` pinned to `column`, in rank order, locked for update.
    async fn column_folders(&mut self, owner: UserId, column: i32) -> AppResult<Vec<Folder>>;

    /// Every pinned folder `user` owns or may edit, ordered by column then rank.
    async fn pinned_folders(&mut self, user: UserId) -> AppResult<Vec<Folder>>;

    /// Insert a folder.
    async fn insert_folder(&mut self, data: &CreateFolder) -> AppResult<Folder>;

    /// Write back the mutable columns of a folder.
    async fn update_folder(&mut self, folder: &Folder) -> AppResult<Folder>;

    /// Delete folders and unfile every leaf item filed in them.
    async fn delete_folders(&mut self, ids: &[FolderId]) -> AppResult<u64>;

    // Editors

    /// Editor links on the folders `owner` owns on `page`.
    async fn editor_links(&mut self, owner: UserId, page: Page) -> AppResult<Vec<EditorLink>>;

    /// Persist grant changes recorded by a folder arena.
    async fn apply_editor_changes(&mut self, changes: &[EditorChange]) -> AppResult<()>;

    // Favorites

    /// Find a favorite by id.
    async fn find_favorite(&mut self, id: FavoriteId) -> AppResult<Option<Favorite>>;

    /// Insert a favorite.
    async fn insert_favorite(&mut self, data: &CreateFavorite) -> AppResult<Favorite>;

    /// Pinned favorites `owner` filed in `folder`, in rank order, locked for update.
    async fn pinned_favorites(
        &mut self,
        owner: UserId,
        folder: Option<FolderId>,
    ) -> AppResult<Vec<Favorite>>;

    /// Pinned favorites filed in any of `folders`, in rank order.
    async fn favorites_in_folders(&mut self, folders: &[FolderId]) -> AppResult<Vec<Favorite>>;

    /// Write back the mutable columns of a favorite.
    async fn update_favorite(&mut self, favorite: &Favorite) -> AppResult<Favorite>;

    /// Make the transaction's writes visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
