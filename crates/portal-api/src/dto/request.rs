//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{Direction, FavoriteId, FolderId, Page, UserId};

/// Runs `validator` rules and reports the first failure set as a
/// validation error.
pub fn validated<T: Validate>(body: T) -> AppResult<T> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(body)
}

/// Create folder request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFolderBody {
    /// Page the folder lives on.
    pub page: Page,
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1 to 255 characters"))]
    pub name: String,
    /// Optional parent folder.
    pub parent_id: Option<FolderId>,
    /// Pin to this home grid column on creation.
    #[validate(range(min = 1, message = "Column numbers start at 1"))]
    pub home_column: Option<i32>,
}

/// Update folder request. Absent fields are left alone.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateFolderBody {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1 to 255 characters"))]
    pub name: Option<String>,
    /// Selected flag.
    pub selected: Option<i32>,
    /// Active flag.
    pub active: Option<i32>,
    /// Home grid column; 0 takes the folder off the grid.
    #[validate(range(min = 0, message = "Column numbers start at 1; 0 unpins"))]
    pub home_column: Option<i32>,
    /// 1-based rank within the column.
    #[validate(range(min = 1, message = "Ranks start at 1"))]
    pub home_rank: Option<i32>,
}

/// Reparent request; a missing or null parent moves the folder to the root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReparentBody {
    /// New parent.
    #[serde(default)]
    pub parent_id: Option<FolderId>,
}

/// Share a folder with another user.
#[derive(Debug, Clone, Deserialize)]
pub struct AddEditorBody {
    /// The user gaining edit access.
    pub user_id: UserId,
}

/// One-step folder move.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveFolderBody {
    /// Folder to move.
    pub folder_id: FolderId,
    /// Where to move it.
    pub direction: Direction,
}

/// One-step favorite move.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveFavoriteBody {
    /// Favorite to move.
    pub favorite_id: FavoriteId,
    /// Up or down.
    pub direction: Direction,
}

/// Drop a folder into a column.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceFolderBody {
    /// Folder being dragged.
    pub folder_id: FolderId,
    /// Destination column.
    pub target_column: i32,
    /// 0-based slot in the destination column; the end when absent.
    pub target_position: Option<usize>,
}

/// Swap two folders in one column.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapFoldersBody {
    /// Folder being dragged.
    pub dragged_id: FolderId,
    /// Folder it was dropped on.
    pub target_id: FolderId,
}

/// Insert a folder at another folder's rank.
#[derive(Debug, Clone, Deserialize)]
pub struct InsertFolderBody {
    /// Folder being dragged.
    pub dragged_id: FolderId,
    /// Folder it was dropped on.
    pub target_id: FolderId,
    /// Column holding the target.
    pub target_column: i32,
}

/// Swap two favorites in one folder.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapFavoritesBody {
    /// Favorite being dragged.
    pub dragged_id: FavoriteId,
    /// Favorite it was dropped on.
    pub target_id: FavoriteId,
}

/// Insert a favorite at another favorite's rank in their folder.
#[derive(Debug, Clone, Deserialize)]
pub struct InsertFavoriteBody {
    /// Favorite being dragged.
    pub dragged_id: FavoriteId,
    /// Favorite it was dropped on.
    pub target_id: FavoriteId,
    /// Land just below the target instead of taking its rank.
    #[serde(default)]
    pub insert_below: bool,
}

/// Refile a favorite into another folder.
#[derive(Debug, Clone, Deserialize)]
pub struct RefileFavoriteBody {
    /// Favorite being dragged.
    pub dragged_id: FavoriteId,
    /// Folder it was dropped into.
    pub folder_id: FolderId,
    /// Favorite it was dropped on; the top of the folder when absent.
    #[serde(default)]
    pub target_id: Option<FavoriteId>,
    /// Land just below the target instead of taking its rank.
    #[serde(default)]
    pub insert_below: bool,
}

/// New order for the pinned favorites of one folder.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderFavoritesBody {
    /// Folder whose favorites are reordered.
    pub folder_id: FolderId,
    /// Every pinned favorite of the folder, top first.
    pub favorite_ids: Vec<FavoriteId>,
}

/// Query string for pinning or unpinning a folder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToggleFolderQuery {
    /// Column to pin into; the configured default when absent.
    pub column: Option<i32>,
}

/// Select a folder on a page.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectFolderBody {
    /// Folder to select.
    pub folder_id: FolderId,
}

/// Query string for tree listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeQuery {
    /// Folder to centre the tree on; the page's selection when absent.
    pub selected: Option<FolderId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_fails_validation() {
        let body = CreateFolderBody {
            page: Page::Notes,
            name: String::new(),
            parent_id: None,
            home_column: None,
        };
        assert!(validated(body).unwrap_err().is_validation());
    }

    #[test]
    fn test_column_zero_fails_validation() {
        let body = CreateFolderBody {
            page: Page::Notes,
            name: "Ideas".into(),
            parent_id: None,
            home_column: Some(0),
        };
        assert!(validated(body).is_err());
    }

    #[test]
    fn test_update_rank_zero_fails_validation() {
        let body: UpdateFolderBody =
            serde_json::from_str(r#"{"home_column": 2, "home_rank": 0}"#).unwrap();
        assert!(validated(body).unwrap_err().is_validation());
    }

    #[test]
    fn test_refile_body_defaults() {
        let body: RefileFavoriteBody =
            serde_json::from_str(r#"{"dragged_id": 3, "folder_id": 9}"#).unwrap();
        assert_eq!(body.target_id, None);
        assert!(!body.insert_below);
    }

    #[test]
    fn test_move_body_parses_direction() {
        let body: MoveFolderBody =
            serde_json::from_str(r#"{"folder_id": 4, "direction": "left"}"#).unwrap();
        assert_eq!(body.folder_id, FolderId(4));
        assert_eq!(body.direction, Direction::Left);
    }
}
