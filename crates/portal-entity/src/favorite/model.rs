//! Favorite entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use portal_core::types::{FavoriteId, FolderId, UserId};

use crate::rank::Ranked;

/// A bookmarked link, optionally filed in a favorites-page folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Favorite {
    /// Unique favorite identifier.
    pub id: FavoriteId,
    /// The owning user.
    pub user_id: UserId,
    /// Containing folder (null means unfiled).
    pub folder_id: Option<FolderId>,
    /// Display label.
    pub name: String,
    /// Target URL.
    pub url: String,
    /// Position under its folder on the home grid; 0 or null means not pinned.
    pub home_rank: Option<i32>,
    /// When the favorite was created.
    pub created_at: DateTime<Utc>,
    /// When the favorite was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Favorite {
    /// Whether the favorite is shown on the home grid.
    pub fn is_pinned(&self) -> bool {
        self.home_rank.is_some_and(|rank| rank > 0)
    }
}

impl Ranked for Favorite {
    fn rank(&self) -> Option<i32> {
        self.home_rank
    }

    fn set_rank(&mut self, rank: i32) {
        self.home_rank = Some(rank);
    }

    fn tiebreak(&self) -> i64 {
        self.id.get()
    }
}

/// Data required to create a new favorite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFavorite {
    /// The owning user.
    pub user_id: UserId,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
    /// Display label.
    pub name: String,
    /// Target URL.
    pub url: String,
    /// Initial home rank.
    pub home_rank: Option<i32>,
}
