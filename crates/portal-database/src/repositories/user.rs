//! User repository implementation.

use sqlx::PgConnection;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::types::UserId;
use portal_entity::user::User;

/// Queries against `users`.
#[derive(Debug, Clone, Copy)]
pub struct UserRepository;

impl UserRepository {
    /// Find a user by id.
    pub async fn find_by_id(conn: &mut PgConnection, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Create a user.
    pub async fn create(conn: &mut PgConnection, username: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>("INSERT INTO users (username) VALUES ($1) RETURNING *")
            .bind(username)
            .fetch_one(conn)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err)
                    if db_err.constraint() == Some("users_username_key") =>
                {
                    AppError::conflict(format!("Username '{username}' already exists"))
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
            })
    }
}
