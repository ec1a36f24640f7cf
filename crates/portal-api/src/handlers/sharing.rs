//! Editor grant handlers.

use axum::Json;
use axum::extract::{Path, State};

use portal_core::types::{FolderId, UserId};
use portal_service::folder::FolderEditor;

use crate::dto::request::AddEditorBody;
use crate::dto::response::{ApiResponse, FlagResponse};
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::extractors::path::parse_id;
use crate::state::AppState;

/// GET /api/folders/{id}/editors
pub async fn list_editors(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<FolderEditor>>>, ApiError> {
    let id: FolderId = parse_id(&id, "Folder")?;
    let editors = state.sharing.editors(&user, id).await?;
    Ok(Json(ApiResponse::ok(editors)))
}

/// POST /api/folders/{id}/editors
///
/// `value` is false when the user already had a direct grant.
pub async fn add_editor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<AddEditorBody>,
) -> Result<Json<ApiResponse<FlagResponse>>, ApiError> {
    let id: FolderId = parse_id(&id, "Folder")?;
    let added = state.sharing.add_editor(&user, id, body.user_id).await?;
    Ok(Json(ApiResponse::ok(FlagResponse { value: added })))
}

/// DELETE /api/folders/{id}/editors/{user_id}
pub async fn remove_editor(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, editor)): Path<(String, String)>,
) -> Result<Json<ApiResponse<FlagResponse>>, ApiError> {
    let id: FolderId = parse_id(&id, "Folder")?;
    let editor: UserId = parse_id(&editor, "User")?;
    state.sharing.remove_editor(&user, id, editor).await?;
    Ok(Json(ApiResponse::ok(FlagResponse { value: true })))
}
