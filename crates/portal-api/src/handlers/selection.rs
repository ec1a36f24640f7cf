//! Selection and expansion handlers.
//!
//! State is per user and lives in memory; see
//! [`portal_service::SelectionService`].

use axum::Json;
use axum::extract::{Path, State};

use portal_core::types::{FolderId, Page};

use crate::dto::request::SelectFolderBody;
use crate::dto::response::{ApiResponse, FlagResponse, SelectionResponse};
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::extractors::path::{parse_id, parse_page};
use crate::state::AppState;

async fn snapshot(
    state: &AppState,
    user: &CurrentUser,
    page: Page,
) -> Result<SelectionResponse, ApiError> {
    // Resolve first: a stale selection is dropped before the snapshot.
    let selected_folder = state.selection.selected_folder(user, page).await?;
    let current = state.selection.state(user);
    Ok(SelectionResponse {
        page,
        selected_folder,
        selected_tasks: current.selected_tasks.clone(),
        active_task_folder: current.active_task_folder,
        expanded: current.expanded.get(page).iter().copied().collect(),
        folder_path: current.folder_path(page).to_vec(),
    })
}

/// GET /api/pages/{page}/selection
pub async fn get_selection(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(page): Path<String>,
) -> Result<Json<ApiResponse<SelectionResponse>>, ApiError> {
    let page = parse_page(&page)?;
    Ok(Json(ApiResponse::ok(snapshot(&state, &user, page).await?)))
}

/// POST /api/pages/{page}/selection
pub async fn select_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(page): Path<String>,
    Json(body): Json<SelectFolderBody>,
) -> Result<Json<ApiResponse<SelectionResponse>>, ApiError> {
    let page = parse_page(&page)?;
    state.selection.select_folder(&user, page, body.folder_id).await?;
    Ok(Json(ApiResponse::ok(snapshot(&state, &user, page).await?)))
}

/// DELETE /api/pages/{page}/selection
pub async fn clear_selection(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(page): Path<String>,
) -> Result<Json<ApiResponse<SelectionResponse>>, ApiError> {
    let page = parse_page(&page)?;
    state.selection.clear(&user, page);
    Ok(Json(ApiResponse::ok(snapshot(&state, &user, page).await?)))
}

/// POST /api/pages/{page}/expanded/{id}
pub async fn toggle_expanded(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((page, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<FlagResponse>>, ApiError> {
    let page = parse_page(&page)?;
    let id: FolderId = parse_id(&id, "Folder")?;
    let expanded = state.selection.toggle_expanded(&user, page, id);
    Ok(Json(ApiResponse::ok(FlagResponse { value: expanded })))
}

/// POST /api/tasks/active-folder
pub async fn activate_task_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<SelectFolderBody>,
) -> Result<Json<ApiResponse<SelectionResponse>>, ApiError> {
    state
        .selection
        .activate_task_folder(&user, body.folder_id)
        .await?;
    Ok(Json(ApiResponse::ok(snapshot(&state, &user, Page::Tasks).await?)))
}
