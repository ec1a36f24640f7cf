//! Route definitions for the home portal HTTP API.
//!
//! The legacy redirect links live at the top level next to `/home`; the
//! JSON API is mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the request logging layer.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(home_routes())
        .merge(folder_routes())
        .merge(page_routes());

    Router::new()
        .merge(legacy_routes())
        .route("/health", get(handlers::health::health))
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// The home page and the one-click move links it renders.
fn legacy_routes() -> Router<AppState> {
    Router::new()
        .route("/home", get(handlers::home::home))
        .route("/home/", get(handlers::home::home))
        .route(
            "/home/folder/{id}/{direction}",
            get(handlers::home::legacy_move_folder),
        )
        .route(
            "/home/folder/{id}/{direction}/",
            get(handlers::home::legacy_move_folder),
        )
        .route(
            "/home/favorite/{id}/{direction}",
            get(handlers::home::legacy_move_favorite),
        )
        .route(
            "/home/favorite/{id}/{direction}/",
            get(handlers::home::legacy_move_favorite),
        )
}

/// JSON home grid endpoints.
fn home_routes() -> Router<AppState> {
    Router::new()
        .route("/home", get(handlers::home::home))
        .route("/home/folders/move", post(handlers::home::move_folder))
        .route("/home/folders/place", post(handlers::home::place_folder))
        .route("/home/folders/swap", post(handlers::home::swap_folders))
        .route("/home/folders/insert", post(handlers::home::insert_folder))
        .route(
            "/home/folders/{id}/toggle",
            post(handlers::home::toggle_folder),
        )
        .route("/home/favorites/move", post(handlers::home::move_favorite))
        .route("/home/favorites/swap", post(handlers::home::swap_favorites))
        .route(
            "/home/favorites/insert",
            post(handlers::home::insert_favorite),
        )
        .route(
            "/home/favorites/refile",
            post(handlers::home::refile_favorite),
        )
        .route(
            "/home/favorites/reorder",
            post(handlers::home::reorder_favorites),
        )
        .route(
            "/home/favorites/{id}/toggle",
            post(handlers::home::toggle_favorite),
        )
}

/// Folder CRUD, reparenting, and sharing.
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", post(handlers::folder::create_folder))
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder)
                .put(handlers::folder::update_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route("/folders/{id}/parent", put(handlers::folder::reparent))
        .route(
            "/folders/{id}/editors",
            get(handlers::sharing::list_editors).post(handlers::sharing::add_editor),
        )
        .route(
            "/folders/{id}/editors/{user_id}",
            axum::routing::delete(handlers::sharing::remove_editor),
        )
        .route(
            "/tasks/active-folder",
            post(handlers::selection::activate_task_folder),
        )
}

/// Page-scoped listings and selection state.
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/pages/{page}/folders", get(handlers::folder::list_for_page))
        .route("/pages/{page}/tree", get(handlers::folder::tree))
        .route(
            "/pages/{page}/breadcrumbs/{id}",
            get(handlers::folder::breadcrumbs),
        )
        .route(
            "/pages/{page}/selection",
            get(handlers::selection::get_selection)
                .post(handlers::selection::select_folder)
                .delete(handlers::selection::clear_selection),
        )
        .route(
            "/pages/{page}/expanded/{id}",
            post(handlers::selection::toggle_expanded),
        )
}
