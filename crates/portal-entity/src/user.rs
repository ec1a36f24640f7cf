//! Minimal account row. Authentication lives outside the portal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use portal_core::types::UserId;

/// An account that can own folders or be granted edit access to them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
