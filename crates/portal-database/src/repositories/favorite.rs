//! Favorite repository implementation.

use sqlx::PgConnection;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::types::{FavoriteId, FolderId, UserId};
use portal_entity::favorite::{CreateFavorite, Favorite};

/// Queries against `favorites`.
#[derive(Debug, Clone, Copy)]
pub struct FavoriteRepository;

impl FavoriteRepository {
    /// Find a favorite by id.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: FavoriteId,
    ) -> AppResult<Option<Favorite>> {
        sqlx::query_as::<_, Favorite>("SELECT * FROM favorites WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find favorite", e))
    }

    /// Create a favorite.
    pub async fn create(conn: &mut PgConnection, data: &CreateFavorite) -> AppResult<Favorite> {
        sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorites (user_id, folder_id, name, url, home_rank) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.url)
        .bind(data.home_rank)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create favorite", e))
    }

    /// Lock and return the pinned favorites of one folder (or the unfiled bucket).
    pub async fn lock_pinned(
        conn: &mut PgConnection,
        owner: UserId,
        folder: Option<FolderId>,
    ) -> AppResult<Vec<Favorite>> {
        sqlx::query_as::<_, Favorite>(
            "SELECT * FROM favorites \
             WHERE user_id = $1 AND folder_id IS NOT DISTINCT FROM $2 AND home_rank > 0 \
             ORDER BY home_rank ASC, id ASC FOR UPDATE",
        )
        .bind(owner)
        .bind(folder)
        .fetch_all(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to lock pinned favorites", e)
        })
    }

    /// Pinned favorites across several folders.
    pub async fn find_pinned_in(
        conn: &mut PgConnection,
        folders: &[FolderId],
    ) -> AppResult<Vec<Favorite>> {
        let raw: Vec<i64> = folders.iter().map(|id| id.get()).collect();
        sqlx::query_as::<_, Favorite>(
            "SELECT * FROM favorites WHERE folder_id = ANY($1) AND home_rank > 0 \
             ORDER BY folder_id ASC, home_rank ASC, id ASC",
        )
        .bind(raw)
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list favorites", e))
    }

    /// Write back folder, label, url, and rank.
    pub async fn update(conn: &mut PgConnection, favorite: &Favorite) -> AppResult<Favorite> {
        sqlx::query_as::<_, Favorite>(
            "UPDATE favorites SET folder_id = $2, name = $3, url = $4, home_rank = $5, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(favorite.id)
        .bind(favorite.folder_id)
        .bind(&favorite.name)
        .bind(&favorite.url)
        .bind(favorite.home_rank)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update favorite", e))?
        .ok_or_else(|| AppError::not_found(format!("Favorite {} not found", favorite.id)))
    }
}
