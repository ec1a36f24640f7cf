//! PostgreSQL store backed by sqlx transactions.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::types::{FavoriteId, FolderId, Page, UserId};
use portal_entity::favorite::{CreateFavorite, Favorite};
use portal_entity::folder::{CreateFolder, EditorChange, EditorLink, Folder};
use portal_entity::user::User;

use super::{PortalStore, StoreTx};
use crate::connection::DatabasePool;
use crate::repositories::{EditorRepository, FavoriteRepository, FolderRepository, UserRepository};

/// Store that runs each operation in one PostgreSQL transaction.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabasePool,
}

impl PgStore {
    /// Wrap a connected pool.
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PortalStore for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
        let tx = self.db.pool().begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> AppResult<bool> {
        self.db.ping().await
    }
}

/// An open PostgreSQL transaction.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn lock_owner(&mut self, owner: UserId) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(owner)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to acquire owner lock", e)
            })?;
        Ok(())
    }

    async fn find_user(&mut self, id: UserId) -> AppResult<Option<User>> {
        UserRepository::find_by_id(&mut self.tx, id).await
    }

    async fn insert_user(&mut self, username: &str) -> AppResult<User> {
        UserRepository::create(&mut self.tx, username).await
    }

    async fn find_folder(&mut self, id: FolderId) -> AppResult<Option<Folder>> {
        FolderRepository::find_by_id(&mut self.tx, id).await
    }

    async fn owned_folders(&mut self, owner: UserId, page: Page) -> AppResult<Vec<Folder>> {
        FolderRepository::find_owned(&mut self.tx, owner, page).await
    }

    async fn visible_folders(&mut self, user: UserId, page: Page) -> AppResult<Vec<Folder>> {
        FolderRepository::find_visible(&mut self.tx, user, page).await
    }

    async fn column_folders(&mut self, owner: UserId, column: i32) -> AppResult<Vec<Folder>> {
        FolderRepository::lock_column(&mut self.tx, owner, column).await
    }

    async fn pinned_folders(&mut self, user: UserId) -> AppResult<Vec<Folder>> {
        FolderRepository::find_pinned(&mut self.tx, user).await
    }

    async fn insert_folder(&mut self, data: &CreateFolder) -> AppResult<Folder> {
        FolderRepository::create(&mut self.tx, data).await
    }

    async fn update_folder(&mut self, folder: &Folder) -> AppResult<Folder> {
        FolderRepository::update(&mut self.tx, folder).await
    }

    async fn delete_folders(&mut self, ids: &[FolderId]) -> AppResult<u64> {
        FolderRepository::delete_many(&mut self.tx, ids).await
    }

    async fn editor_links(&mut self, owner: UserId, page: Page) -> AppResult<Vec<EditorLink>> {
        EditorRepository::find_for_owner(&mut self.tx, owner, page).await
    }

    async fn apply_editor_changes(&mut self, changes: &[EditorChange]) -> AppResult<()> {
        EditorRepository::apply(&mut self.tx, changes).await
    }

    async fn find_favorite(&mut self, id: FavoriteId) -> AppResult<Option<Favorite>> {
        FavoriteRepository::find_by_id(&mut self.tx, id).await
    }

    async fn insert_favorite(&mut self, data: &CreateFavorite) -> AppResult<Favorite> {
        FavoriteRepository::create(&mut self.tx, data).await
    }

    async fn pinned_favorites(
        &mut self,
        owner: UserId,
        folder: Option<FolderId>,
    ) -> AppResult<Vec<Favorite>> {
        FavoriteRepository::lock_pinned(&mut self.tx, owner, folder).await
    }

    async fn favorites_in_folders(&mut self, folders: &[FolderId]) -> AppResult<Vec<Favorite>> {
        FavoriteRepository::find_pinned_in(&mut self.tx, folders).await
    }

    async fn update_favorite(&mut self, favorite: &Favorite) -> AppResult<Favorite> {
        FavoriteRepository::update(&mut self.tx, favorite).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }
}
