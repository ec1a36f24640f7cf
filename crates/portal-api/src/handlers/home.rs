//! Home grid handlers: the page itself, the legacy redirect links, pin
//! toggles, and the JSON movement endpoints.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use portal_core::types::{FavoriteId, FolderId};
use portal_entity::favorite::Favorite;
use portal_entity::folder::Folder;
use portal_service::MoveOutcome;

use crate::dto::request::{
    InsertFavoriteBody, InsertFolderBody, MoveFavoriteBody, MoveFolderBody, PlaceFolderBody,
    RefileFavoriteBody, ReorderFavoritesBody, SwapFavoritesBody, SwapFoldersBody,
    ToggleFolderQuery,
};
use crate::dto::response::{ApiResponse, HomeResponse, MoveResponse};
use crate::error::ApiError;
use crate::extractors::path::{parse_direction, parse_id};
use crate::extractors::{CurrentUser, json_body};
use crate::state::AppState;

/// Where the legacy links send the browser back to.
pub const HOME_PATH: &str = "/home";

fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Highlight the folder holding a favorite that just moved.
async fn mark_favorite_folder(
    state: &AppState,
    user: &CurrentUser,
    id: FavoriteId,
) -> Result<(), ApiError> {
    if let Some(folder_id) = state.home_grid.favorite(user, id).await?.folder_id {
        state.selection.mark_moved(user, folder_id);
    }
    Ok(())
}

fn respond(result: Result<MoveOutcome, ApiError>) -> Response {
    match result {
        Ok(outcome) => Json(MoveResponse::moved(outcome)).into_response(),
        Err(err) => {
            tracing::debug!(message = %err.0.message, "Move request rejected");
            let (status, _) = err.status();
            (status, Json(MoveResponse::failed(&err))).into_response()
        }
    }
}

/// GET /home
pub async fn home(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<HomeResponse>>, ApiError> {
    let grid = state.home_grid.grid(&user).await?;
    let moved_folder = state.selection.take_moved_folder(&user);
    Ok(Json(ApiResponse::ok(HomeResponse {
        columns: grid.columns,
        task_folders: grid.task_folders,
        moved_folder,
    })))
}

/// GET /home/folder/{id}/{direction}/
pub async fn legacy_move_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, direction)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let id: FolderId = parse_id(&id, "Folder")?;
    let direction = parse_direction(&direction)?;
    state.home_grid.move_folder(&user, id, direction).await?;
    state.selection.mark_moved(&user, id);
    Ok(found(HOME_PATH))
}

/// GET /home/favorite/{id}/{direction}/
pub async fn legacy_move_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, direction)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let id: FavoriteId = parse_id(&id, "Favorite")?;
    let direction = parse_direction(&direction)?;
    state.home_grid.move_favorite(&user, id, direction).await?;
    mark_favorite_folder(&state, &user, id).await?;
    Ok(found(HOME_PATH))
}

/// POST /api/home/folders/{id}/toggle?column=N
pub async fn toggle_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<ToggleFolderQuery>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    let id: FolderId = parse_id(&id, "Folder")?;
    let folder = state
        .home_grid
        .toggle_folder_home(&user, id, query.column)
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// POST /api/home/favorites/{id}/toggle
pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Favorite>>, ApiError> {
    let id: FavoriteId = parse_id(&id, "Favorite")?;
    let favorite = state.home_grid.toggle_favorite_home(&user, id).await?;
    Ok(Json(ApiResponse::ok(favorite)))
}

/// POST /api/home/folders/move
pub async fn move_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<MoveFolderBody>, JsonRejection>,
) -> Response {
    let result = async {
        let body = json_body(payload)?;
        let outcome = state
            .home_grid
            .move_folder(&user, body.folder_id, body.direction)
            .await?;
        state.selection.mark_moved(&user, body.folder_id);
        Ok::<_, ApiError>(outcome)
    }
    .await;
    respond(result)
}

/// POST /api/home/favorites/move
pub async fn move_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<MoveFavoriteBody>, JsonRejection>,
) -> Response {
    let result = async {
        let body = json_body(payload)?;
        let outcome = state
            .home_grid
            .move_favorite(&user, body.favorite_id, body.direction)
            .await?;
        mark_favorite_folder(&state, &user, body.favorite_id).await?;
        Ok::<_, ApiError>(outcome)
    }
    .await;
    respond(result)
}

/// POST /api/home/folders/place
pub async fn place_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<PlaceFolderBody>, JsonRejection>,
) -> Response {
    let result = async {
        let body = json_body(payload)?;
        let outcome = state
            .home_grid
            .place_folder(&user, body.folder_id, body.target_column, body.target_position)
            .await?;
        state.selection.mark_moved(&user, body.folder_id);
        Ok::<_, ApiError>(outcome)
    }
    .await;
    respond(result)
}

/// POST /api/home/folders/swap
pub async fn swap_folders(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<SwapFoldersBody>, JsonRejection>,
) -> Response {
    let result = async {
        let body = json_body(payload)?;
        let outcome = state
            .home_grid
            .swap_folders(&user, body.dragged_id, body.target_id)
            .await?;
        state.selection.mark_moved(&user, body.dragged_id);
        Ok::<_, ApiError>(outcome)
    }
    .await;
    respond(result)
}

/// POST /api/home/folders/insert
pub async fn insert_folder(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<InsertFolderBody>, JsonRejection>,
) -> Response {
    let result = async {
        let body = json_body(payload)?;
        let outcome = state
            .home_grid
            .insert_folder_at(&user, body.dragged_id, body.target_id, body.target_column)
            .await?;
        state.selection.mark_moved(&user, body.dragged_id);
        Ok::<_, ApiError>(outcome)
    }
    .await;
    respond(result)
}

/// POST /api/home/favorites/swap
pub async fn swap_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<SwapFavoritesBody>, JsonRejection>,
) -> Response {
    let result = async {
        let body = json_body(payload)?;
        let outcome = state
            .home_grid
            .swap_favorites(&user, body.dragged_id, body.target_id)
            .await?;
        Ok::<_, ApiError>(outcome)
    }
    .await;
    respond(result)
}

/// POST /api/home/favorites/insert
pub async fn insert_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<InsertFavoriteBody>, JsonRejection>,
) -> Response {
    let result = async {
        let body = json_body(payload)?;
        let outcome = state
            .home_grid
            .insert_favorite_at(&user, body.dragged_id, body.target_id, body.insert_below)
            .await?;
        Ok::<_, ApiError>(outcome)
    }
    .await;
    respond(result)
}

/// POST /api/home/favorites/refile
pub async fn refile_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<RefileFavoriteBody>, JsonRejection>,
) -> Response {
    let result = async {
        let body = json_body(payload)?;
        let outcome = state
            .home_grid
            .move_favorite_to_folder(
                &user,
                body.dragged_id,
                body.folder_id,
                body.target_id,
                body.insert_below,
            )
            .await?;
        state.selection.mark_moved(&user, body.folder_id);
        Ok::<_, ApiError>(outcome)
    }
    .await;
    respond(result)
}

/// POST /api/home/favorites/reorder
pub async fn reorder_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<ReorderFavoritesBody>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<Favorite>>>, ApiError> {
    let body = json_body(payload)?;
    let favorites = state
        .home_grid
        .reorder_favorites(&user, body.folder_id, &body.favorite_ids)
        .await?;
    Ok(Json(ApiResponse::ok(favorites)))
}
