//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use portal_core::config::AppConfig;
use portal_database::PortalStore;
use portal_service::{
    FolderService, HomeGridService, SelectionService, SharingService, TreeService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Services hold
/// `Arc`s internally, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Backing store.
    pub store: Arc<dyn PortalStore>,

    /// Folder CRUD.
    pub folders: FolderService,
    /// Folder listings, trees, and reparenting.
    pub tree: TreeService,
    /// Editor grants.
    pub sharing: SharingService,
    /// Home grid moves and placement.
    pub home_grid: HomeGridService,
    /// Per-user selection and expansion state.
    pub selection: SelectionService,
}

impl AppState {
    /// Builds every service over one store.
    pub fn new(config: AppConfig, store: Arc<dyn PortalStore>) -> Self {
        let home = config.home.clone();
        Self {
            folders: FolderService::new(Arc::clone(&store), home.clone()),
            tree: TreeService::new(Arc::clone(&store), home.clone()),
            sharing: SharingService::new(Arc::clone(&store), home.clone()),
            home_grid: HomeGridService::new(Arc::clone(&store), home.clone()),
            selection: SelectionService::new(Arc::clone(&store), home),
            config: Arc::new(config),
            store,
        }
    }
}
