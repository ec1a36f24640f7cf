//! Folder repository implementation.

use sqlx::PgConnection;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::types::{FolderId, Page, UserId};
use portal_entity::folder::{CreateFolder, Folder};

/// Queries against `folders`.
#[derive(Debug, Clone, Copy)]
pub struct FolderRepository;

impl FolderRepository {
    /// Find a folder by ID.
    pub async fn find_by_id(conn: &mut PgConnection, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    /// All folders an owner has on a page.
    pub async fn find_owned(
        conn: &mut PgConnection,
        owner: UserId,
        page: Page,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE user_id = $1 AND page = $2 ORDER BY name ASC, id ASC",
        )
        .bind(owner)
        .bind(page)
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    /// Folders on a page the user owns or holds an editor link on.
    pub async fn find_visible(
        conn: &mut PgConnection,
        user: UserId,
        page: Page,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT f.* FROM folders f \
             WHERE f.page = $2 AND (f.user_id = $1 OR EXISTS ( \
                 SELECT 1 FROM folder_editors e WHERE e.folder_id = f.id AND e.user_id = $1)) \
             ORDER BY f.name ASC, f.id ASC",
        )
        .bind(user)
        .bind(page)
        .fetch_all(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list visible folders", e)
        })
    }

    /// Lock and return one home grid column.
    pub async fn lock_column(
        conn: &mut PgConnection,
        owner: UserId,
        column: i32,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE user_id = $1 AND home_column = $2 \
             ORDER BY home_rank ASC NULLS LAST, id ASC FOR UPDATE",
        )
        .bind(owner)
        .bind(column)
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock column", e))
    }

    /// Every pinned folder visible to the user.
    pub async fn find_pinned(conn: &mut PgConnection, user: UserId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT f.* FROM folders f \
             WHERE f.home_column > 0 AND (f.user_id = $1 OR EXISTS ( \
                 SELECT 1 FROM folder_editors e WHERE e.folder_id = f.id AND e.user_id = $1)) \
             ORDER BY f.home_column ASC, f.home_rank ASC NULLS LAST, f.id ASC",
        )
        .bind(user)
        .fetch_all(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list pinned folders", e)
        })
    }

    /// Create a new folder.
    pub async fn create(conn: &mut PgConnection, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (user_id, page, name, parent_id, home_column, home_rank) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.page)
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(data.home_column)
        .bind(data.home_rank)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create folder", e))
    }

    /// Write back name, parent, placement, and view flags.
    pub async fn update(conn: &mut PgConnection, folder: &Folder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $2, parent_id = $3, home_column = $4, home_rank = $5, \
             selected = $6, active = $7, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(folder.id)
        .bind(&folder.name)
        .bind(folder.parent_id)
        .bind(folder.home_column)
        .bind(folder.home_rank)
        .bind(folder.selected)
        .bind(folder.active)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update folder", e))?
        .ok_or_else(|| AppError::not_found(format!("Folder {} not found", folder.id)))
    }

    /// Delete folders. Leaf items are unfiled by their `ON DELETE SET NULL`
    /// foreign keys; editor links cascade.
    pub async fn delete_many(conn: &mut PgConnection, ids: &[FolderId]) -> AppResult<u64> {
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let result = sqlx::query("DELETE FROM folders WHERE id = ANY($1)")
            .bind(raw)
            .execute(conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete folders", e)
            })?;
        Ok(result.rows_affected())
    }
}
