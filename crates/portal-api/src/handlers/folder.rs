//! Folder CRUD, listing, tree, and reparent handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use portal_core::types::FolderId;
use portal_entity::folder::{Folder, FolderTree};
use portal_service::folder::{CreateFolderRequest, ReparentResult, UpdateFolderRequest};

use crate::dto::request::{CreateFolderBody, ReparentBody, TreeQuery, UpdateFolderBody, validated};
use crate::dto::response::{ApiResponse, DeletedResponse};
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::extractors::path::{parse_id, parse_page};
use crate::state::AppState;

/// GET /api/pages/{page}/folders
pub async fn list_for_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(page): Path<String>,
) -> Result<Json<ApiResponse<Vec<Folder>>>, ApiError> {
    let page = parse_page(&page)?;
    let folders = state.tree.folders_for_page(&user, page).await?;
    Ok(Json(ApiResponse::ok(folders)))
}

/// GET /api/pages/{page}/tree?selected=N
///
/// Without `selected`, the tree centres on the page's current selection.
pub async fn tree(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(page): Path<String>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<ApiResponse<FolderTree>>, ApiError> {
    let page = parse_page(&page)?;
    let selected = match query.selected {
        Some(id) => Some(id),
        None => state
            .selection
            .selected_folder(&user, page)
            .await?
            .map(|folder| folder.id),
    };
    let tree = state.tree.folder_tree(&user, page, selected).await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/pages/{page}/breadcrumbs/{id}
pub async fn breadcrumbs(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((page, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<Folder>>>, ApiError> {
    let page = parse_page(&page)?;
    let id: FolderId = parse_id(&id, "Folder")?;
    let crumbs = state.tree.breadcrumbs(&user, page, id).await?;
    Ok(Json(ApiResponse::ok(crumbs)))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateFolderBody>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    let body = validated(body)?;
    let folder = state
        .folders
        .create_folder(
            &user,
            CreateFolderRequest {
                page: body.page,
                name: body.name,
                parent_id: body.parent_id,
                home_column: body.home_column,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    let id: FolderId = parse_id(&id, "Folder")?;
    let folder = state.folders.get_folder(&user, id).await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// PUT /api/folders/{id}
pub async fn update_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateFolderBody>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    let id: FolderId = parse_id(&id, "Folder")?;
    let body = validated(body)?;
    let folder = state
        .folders
        .update_folder(
            &user,
            id,
            UpdateFolderRequest {
                name: body.name,
                selected: body.selected,
                active: body.active,
                home_column: body.home_column,
                home_rank: body.home_rank,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let id: FolderId = parse_id(&id, "Folder")?;
    let deleted = state.folders.delete_folder(&user, id).await?;
    state.selection.forget_folders(&user, &deleted);
    Ok(Json(ApiResponse::ok(DeletedResponse { deleted })))
}

/// PUT /api/folders/{id}/parent
pub async fn reparent(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<ReparentBody>,
) -> Result<Json<ApiResponse<ReparentResult>>, ApiError> {
    let id: FolderId = parse_id(&id, "Folder")?;
    let result = state.tree.move_folder(&user, id, body.parent_id).await?;
    state
        .selection
        .refresh_folder_path(&user, result.folder.page)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}
