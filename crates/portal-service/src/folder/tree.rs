//! Folder listing, tree building, and reparenting.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use portal_core::config::HomeConfig;
use portal_core::result::AppResult;
use portal_core::types::{FolderId, Page};
use portal_database::PortalStore;
use portal_entity::folder::{EditorDelta, Folder, FolderArena, FolderTree, breadcrumbs};

use super::{check_parent_page, load_arena, owned_folder};
use crate::context::RequestContext;

/// Outcome of moving a folder under a new parent.
#[derive(Debug, Clone, Serialize)]
pub struct ReparentResult {
    /// The folder after the move.
    pub folder: Folder,
    /// Root-first ids from the top of the tree down to the folder.
    pub path: Vec<FolderId>,
    /// Editors gained and lost by the moved subtree.
    pub editors: EditorDelta,
}

/// Builds folder trees and moves folders between parents.
#[derive(Clone)]
pub struct TreeService {
    store: Arc<dyn PortalStore>,
    home: HomeConfig,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(store: Arc<dyn PortalStore>, home: HomeConfig) -> Self {
        Self { store, home }
    }

    /// Folders on `page` the caller owns or may edit, ordered by name.
    pub async fn folders_for_page(&self, ctx: &RequestContext, page: Page) -> AppResult<Vec<Folder>> {
        let mut tx = self.store.begin().await?;
        tx.visible_folders(ctx.user_id, page).await
    }

    async fn visible_arena(&self, ctx: &RequestContext, page: Page) -> AppResult<FolderArena> {
        let folders = self.folders_for_page(ctx, page).await?;
        Ok(FolderArena::from_rows(
            self.home.max_folder_depth,
            folders,
            Vec::new(),
        ))
    }

    /// Path to `selected` plus its children, or the root folders when
    /// nothing is selected.
    pub async fn folder_tree(
        &self,
        ctx: &RequestContext,
        page: Page,
        selected: Option<FolderId>,
    ) -> AppResult<FolderTree> {
        let arena = self.visible_arena(ctx, page).await?;
        FolderTree::build(&arena, selected)
    }

    /// Root-first path ending at `selected`.
    pub async fn breadcrumbs(
        &self,
        ctx: &RequestContext,
        page: Page,
        selected: FolderId,
    ) -> AppResult<Vec<Folder>> {
        let arena = self.visible_arena(ctx, page).await?;
        Ok(breadcrumbs(&arena, selected)?.into_iter().cloned().collect())
    }

    /// Move a folder under `new_parent` (or to the root) and bring the
    /// editor grants of the moved subtree in line with its new ancestors.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        id: FolderId,
        new_parent: Option<FolderId>,
    ) -> AppResult<ReparentResult> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let folder = owned_folder(tx.as_mut(), ctx.user_id, id).await?;
        if let Some(parent_id) = new_parent {
            check_parent_page(tx.as_mut(), ctx.user_id, folder.page, parent_id).await?;
        }

        let mut arena = load_arena(
            tx.as_mut(),
            ctx.user_id,
            folder.page,
            self.home.max_folder_depth,
        )
        .await?;
        let editors = arena.reparent(id, new_parent)?;
        let moved = arena.folder(id)?.clone();
        let mut path = arena.ancestor_ids(id)?;
        path.push(id);

        let folder = tx.update_folder(&moved).await?;
        tx.apply_editor_changes(&arena.take_changes()).await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %id,
            parent_id = ?new_parent,
            editors_added = editors.added.len(),
            editors_removed = editors.removed.len(),
            "Folder moved"
        );
        Ok(ReparentResult {
            folder,
            path,
            editors,
        })
    }
}
