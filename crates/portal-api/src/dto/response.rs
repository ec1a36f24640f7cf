//! Response DTOs.

use serde::Serialize;

use portal_core::types::{FolderId, Page};
use portal_entity::folder::Folder;
use portal_service::MoveOutcome;
use portal_service::home::HomeColumn;

use crate::error::ApiError;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Body of the JSON movement endpoints: `{"success": bool, "error"?: string}`
/// plus where the entity ended up.
#[derive(Debug, Clone, Serialize)]
pub struct MoveResponse {
    /// False on any failure, including malformed input.
    pub success: bool,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Resulting position on success.
    #[serde(flatten)]
    pub outcome: Option<MoveOutcome>,
}

impl MoveResponse {
    /// A completed request; boundary no-ops are successes too.
    pub fn moved(outcome: MoveOutcome) -> Self {
        Self {
            success: true,
            error: None,
            outcome: Some(outcome),
        }
    }

    /// A rejected request.
    pub fn failed(err: &ApiError) -> Self {
        Self {
            success: false,
            error: Some(err.0.message.clone()),
            outcome: None,
        }
    }
}

/// The home page.
#[derive(Debug, Clone, Serialize)]
pub struct HomeResponse {
    /// Grid columns left to right.
    pub columns: Vec<HomeColumn>,
    /// Pinned task folders, shown in their own section.
    pub task_folders: Vec<Folder>,
    /// Folder touched by the previous move, for highlighting.
    pub moved_folder: Option<FolderId>,
}

/// Selection and expansion state for one page.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionResponse {
    /// The page.
    pub page: Page,
    /// Selected folder, if it still exists.
    pub selected_folder: Option<Folder>,
    /// Multi-selection on the tasks page.
    pub selected_tasks: Vec<FolderId>,
    /// Folder new tasks are filed into.
    pub active_task_folder: Option<FolderId>,
    /// Expanded folder ids.
    pub expanded: Vec<FolderId>,
    /// Root-first path to the selection.
    pub folder_path: Vec<FolderId>,
}

/// Result of toggling a flag.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FlagResponse {
    /// The flag after the request.
    pub value: bool,
}

/// Folders removed by a delete, parents first.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    /// Deleted folder ids.
    pub deleted: Vec<FolderId>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Whether the store answered.
    pub store: bool,
}

#[cfg(test)]
mod tests {
    use portal_core::error::AppError;

    use super::*;

    #[test]
    fn test_failed_move_shape() {
        let err = ApiError(AppError::malformed("expected value"));
        let json = serde_json::to_value(MoveResponse::failed(&err)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "expected value"})
        );
    }

    #[test]
    fn test_moved_flattens_outcome() {
        let json = serde_json::to_value(MoveResponse::moved(MoveOutcome {
            moved: true,
            column: Some(2),
            rank: 1,
        }))
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "moved": true, "column": 2, "rank": 1})
        );
    }
}
