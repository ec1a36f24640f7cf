//! Selection and expansion state, kept per user for the life of the process.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use portal_core::config::HomeConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{FolderId, Page, UserId};
use portal_database::PortalStore;
use portal_entity::folder::{Folder, FolderArena};
use portal_entity::selection::SelectionState;

use crate::context::RequestContext;

/// Tracks which folders each user has selected and expanded.
#[derive(Clone)]
pub struct SelectionService {
    store: Arc<dyn PortalStore>,
    home: HomeConfig,
    states: Arc<DashMap<UserId, SelectionState>>,
}

impl SelectionService {
    /// Creates a new selection service with empty state.
    pub fn new(store: Arc<dyn PortalStore>, home: HomeConfig) -> Self {
        Self {
            store,
            home,
            states: Arc::new(DashMap::new()),
        }
    }

    /// Snapshot of the caller's state.
    pub fn state(&self, ctx: &RequestContext) -> SelectionState {
        self.states
            .get(&ctx.user_id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    fn update<R>(&self, ctx: &RequestContext, f: impl FnOnce(&mut SelectionState) -> R) -> R {
        let mut entry = self.states.entry(ctx.user_id).or_default();
        f(entry.value_mut())
    }

    async fn visible_arena(&self, ctx: &RequestContext, page: Page) -> AppResult<FolderArena> {
        let mut tx = self.store.begin().await?;
        let folders = tx.visible_folders(ctx.user_id, page).await?;
        Ok(FolderArena::from_rows(
            self.home.max_folder_depth,
            folders,
            Vec::new(),
        ))
    }

    /// Select a folder on `page`; on the tasks page this toggles it.
    ///
    /// Returns whether the folder is selected afterwards.
    pub async fn select_folder(
        &self,
        ctx: &RequestContext,
        page: Page,
        id: FolderId,
    ) -> AppResult<bool> {
        let arena = self.visible_arena(ctx, page).await?;
        let mut path = arena.ancestor_ids(id)?;
        path.push(id);

        let selected = self.update(ctx, |state| {
            let selected = state.select(page, id);
            if page != Page::Tasks {
                state.set_folder_path(page, path);
            }
            selected
        });
        debug!(user_id = %ctx.user_id, page = %page, folder_id = %id, selected, "Folder selection changed");
        Ok(selected)
    }

    /// Drop the selection on `page`.
    pub fn clear(&self, ctx: &RequestContext, page: Page) {
        self.update(ctx, |state| state.clear(page));
    }

    /// The selected folder on `page`. A selection that no longer resolves
    /// to a visible folder is cleared and reported as no selection.
    pub async fn selected_folder(
        &self,
        ctx: &RequestContext,
        page: Page,
    ) -> AppResult<Option<Folder>> {
        let Some(id) = self.state(ctx).selected_folder(page) else {
            return Ok(None);
        };
        let arena = self.visible_arena(ctx, page).await?;
        match arena.folder(id) {
            Ok(folder) => Ok(Some(folder.clone())),
            Err(e) if e.is_not_found() => {
                self.update(ctx, |state| state.forget_folders(&[id]));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Make `id` the folder new tasks are filed into.
    pub async fn activate_task_folder(&self, ctx: &RequestContext, id: FolderId) -> AppResult<()> {
        let arena = self.visible_arena(ctx, Page::Tasks).await?;
        if arena.get(id).is_none() {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        }
        self.update(ctx, |state| state.activate_task_folder(id));
        Ok(())
    }

    /// Flip whether `id` is expanded on `page`. Returns the new flag.
    pub fn toggle_expanded(&self, ctx: &RequestContext, page: Page, id: FolderId) -> bool {
        self.update(ctx, |state| state.toggle_expanded(page, id))
    }

    /// Recompute the cached path to the selected folder on `page`, after a
    /// reparent may have changed it.
    pub async fn refresh_folder_path(&self, ctx: &RequestContext, page: Page) -> AppResult<()> {
        let Some(selected) = self.state(ctx).selected_folder(page) else {
            return Ok(());
        };
        let arena = self.visible_arena(ctx, page).await?;
        let path = match arena.ancestor_ids(selected) {
            Ok(mut path) => {
                path.push(selected);
                path
            }
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };
        self.update(ctx, |state| state.set_folder_path(page, path));
        Ok(())
    }

    /// Remember the folder a home grid move touched.
    pub fn mark_moved(&self, ctx: &RequestContext, id: FolderId) {
        self.update(ctx, |state| state.mark_moved(id));
    }

    /// Read and reset the last moved folder.
    pub fn take_moved_folder(&self, ctx: &RequestContext) -> Option<FolderId> {
        self.update(ctx, |state| state.take_moved_folder())
    }

    /// Forget deleted folders.
    pub fn forget_folders(&self, ctx: &RequestContext, removed: &[FolderId]) {
        self.update(ctx, |state| state.forget_folders(removed));
    }
}
