//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use portal_core::types::{FolderId, Page, UserId};

use crate::rank::Ranked;

/// A named node in a per-page, per-user folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// The owning user.
    pub user_id: UserId,
    /// Page namespace of the tree this folder belongs to.
    pub page: Page,
    /// Display label.
    pub name: String,
    /// Parent folder ID (null for root folders).
    pub parent_id: Option<FolderId>,
    /// Home grid column; 0 or null means not pinned.
    pub home_column: Option<i32>,
    /// 1-based position within the home grid column.
    pub home_rank: Option<i32>,
    /// View flag kept for older clients.
    pub selected: Option<i32>,
    /// View flag kept for older clients.
    pub active: Option<i32>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// The home grid column this folder is pinned to, if any.
    pub fn pinned_column(&self) -> Option<i32> {
        self.home_column.filter(|column| *column > 0)
    }

    /// Whether the folder is shown on the home grid.
    pub fn is_pinned(&self) -> bool {
        self.pinned_column().is_some()
    }

    /// Remove the folder from the home grid.
    pub fn unpin(&mut self) {
        self.home_column = Some(0);
        self.home_rank = Some(0);
    }
}

impl Ranked for Folder {
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

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The folder owner.
    pub user_id: UserId,
    /// Page namespace.
    pub page: Page,
    /// Folder name.
    pub name: String,
    /// Parent folder (None for root).
    pub parent_id: Option<FolderId>,
    /// Home grid column.
    pub home_column: Option<i32>,
    /// Home grid rank.
    pub home_rank: Option<i32>,
}

/// One row of the editor join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EditorLink {
    /// The shared folder.
    pub folder_id: FolderId,
    /// The user granted edit access.
    pub user_id: UserId,
    /// True when the grant was copied down from an ancestor.
    pub inherited: bool,
}
