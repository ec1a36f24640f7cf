//! Folder editor (sharing) repository.

use sqlx::PgConnection;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::types::{FolderId, Page, UserId};
use portal_entity::folder::{EditorChange, EditorLink, Grant};

/// Queries against `folder_editors`.
#[derive(Debug, Clone, Copy)]
pub struct EditorRepository;

impl EditorRepository {
    /// Links on every folder an owner has on a page.
    pub async fn find_for_owner(
        conn: &mut PgConnection,
        owner: UserId,
        page: Page,
    ) -> AppResult<Vec<EditorLink>> {
        sqlx::query_as::<_, EditorLink>(
            "SELECT e.folder_id, e.user_id, e.inherited FROM folder_editors e \
             JOIN folders f ON f.id = e.folder_id \
             WHERE f.user_id = $1 AND f.page = $2",
        )
        .bind(owner)
        .bind(page)
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load editors", e))
    }

    /// Insert or upgrade a link.
    pub async fn upsert(
        conn: &mut PgConnection,
        folder_id: FolderId,
        user_id: UserId,
        grant: Grant,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO folder_editors (folder_id, user_id, inherited) VALUES ($1, $2, $3) \
             ON CONFLICT (folder_id, user_id) DO UPDATE SET inherited = EXCLUDED.inherited",
        )
        .bind(folder_id)
        .bind(user_id)
        .bind(grant.is_inherited())
        .execute(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to grant editor", e))?;
        Ok(())
    }

    /// Delete a link.
    pub async fn delete(
        conn: &mut PgConnection,
        folder_id: FolderId,
        user_id: UserId,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM folder_editors WHERE folder_id = $1 AND user_id = $2")
            .bind(folder_id)
            .bind(user_id)
            .execute(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke editor", e))?;
        Ok(())
    }

    /// Apply a batch of arena changes in order.
    pub async fn apply(conn: &mut PgConnection, changes: &[EditorChange]) -> AppResult<()> {
        for change in changes {
            match *change {
                EditorChange::Granted {
                    folder_id,
                    user_id,
                    grant,
                } => Self::upsert(&mut *conn, folder_id, user_id, grant).await?,
                EditorChange::Revoked { folder_id, user_id } => {
                    Self::delete(&mut *conn, folder_id, user_id).await?
                }
            }
        }
        Ok(())
    }
}
