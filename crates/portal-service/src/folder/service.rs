//! Folder CRUD operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use portal_core::config::HomeConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{FolderId, Page};
use portal_database::PortalStore;
use portal_entity::folder::{CreateFolder, Folder};
use portal_entity::rank::{max_rank, resequence};

use super::{check_parent_page, load_arena, owned_folder};
use crate::context::RequestContext;
use crate::home::placement::place_in_column;
use crate::home::resequence_column;

/// Manages folder creation, edits, and deletion.
#[derive(Clone)]
pub struct FolderService {
    store: Arc<dyn PortalStore>,
    home: HomeConfig,
}

/// Request to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Page the folder belongs to.
    pub page: Page,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for root-level).
    pub parent_id: Option<FolderId>,
    /// Pin the new folder to this home grid column.
    pub home_column: Option<i32>,
}

/// Request to edit a folder. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolderRequest {
    /// New name.
    pub name: Option<String>,
    /// New selected flag.
    pub selected: Option<i32>,
    /// New active flag.
    pub active: Option<i32>,
    /// Home grid column; 0 takes the folder off the grid.
    pub home_column: Option<i32>,
    /// 1-based rank within the home grid column.
    pub home_rank: Option<i32>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(store: Arc<dyn PortalStore>, home: HomeConfig) -> Self {
        Self { store, home }
    }

    /// Gets a folder the caller owns.
    pub async fn get_folder(&self, ctx: &RequestContext, id: FolderId) -> AppResult<Folder> {
        let mut tx = self.store.begin().await?;
        owned_folder(tx.as_mut(), ctx.user_id, id).await
    }

    /// Creates a folder, checking its parent and copying the parent's
    /// editor grants onto it.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Folder> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }

        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;

        if let Some(parent_id) = req.parent_id {
            check_parent_page(tx.as_mut(), ctx.user_id, req.page, parent_id).await?;
        }
        let mut arena = load_arena(
            tx.as_mut(),
            ctx.user_id,
            req.page,
            self.home.max_folder_depth,
        )
        .await?;
        if let Some(parent_id) = req.parent_id {
            arena.check_parent(None, parent_id, ctx.user_id, req.page)?;
        }

        let (home_column, home_rank) = match req.home_column.filter(|c| *c > 0) {
            Some(column) => {
                if !self.home.is_column(column) {
                    return Err(AppError::validation(format!(
                        "Home column must be between 1 and {}",
                        self.home.columns
                    )));
                }
                let scope = resequence_column(tx.as_mut(), ctx.user_id, column).await?;
                (Some(column), Some(max_rank(&scope) + 1))
            }
            None => (None, None),
        };

        let folder = tx
            .insert_folder(&CreateFolder {
                user_id: ctx.user_id,
                page: req.page,
                name: name.to_string(),
                parent_id: req.parent_id,
                home_column,
                home_rank,
            })
            .await?;

        arena.insert(folder.clone());
        arena.adopt_parent_grants(folder.id)?;
        tx.apply_editor_changes(&arena.take_changes()).await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            page = %folder.page,
            "Folder created"
        );
        Ok(folder)
    }

    /// Renames a folder, changes its view flags, or moves it on the home
    /// grid.
    ///
    /// A new column or rank goes through the same placement as a drag and
    /// drop: the destination column is renumbered around the folder and the
    /// column it left is closed up. Column 0 unpins the folder.
    pub async fn update_folder(
        &self,
        ctx: &RequestContext,
        id: FolderId,
        req: UpdateFolderRequest,
    ) -> AppResult<Folder> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let mut folder = owned_folder(tx.as_mut(), ctx.user_id, id).await?;

        if let Some(name) = req.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("Folder name cannot be empty"));
            }
            folder.name = name.to_string();
        }
        if req.selected.is_some() {
            folder.selected = req.selected;
        }
        if req.active.is_some() {
            folder.active = req.active;
        }
        if req.home_rank.is_some_and(|rank| rank < 1) {
            return Err(AppError::validation("Home rank must be at least 1"));
        }

        let mut folder = tx.update_folder(&folder).await?;
        match (req.home_column, req.home_rank) {
            (Some(0), _) => {
                if let Some(old_column) = folder.pinned_column() {
                    folder.unpin();
                    folder = tx.update_folder(&folder).await?;
                    resequence_column(tx.as_mut(), ctx.user_id, old_column).await?;
                }
            }
            (None, None) => {}
            (column, rank) => {
                let column = match column.or(folder.pinned_column()) {
                    Some(column) => column,
                    None => {
                        return Err(AppError::validation(format!(
                            "Folder {id} is not on the home grid; give a home column"
                        )));
                    }
                };
                if !self.home.is_column(column) {
                    return Err(AppError::validation(format!(
                        "Home column must be between 1 and {}",
                        self.home.columns
                    )));
                }
                let target_position = rank.map(|rank| (rank - 1) as usize);
                place_in_column(tx.as_mut(), folder, column, target_position).await?;
                folder = owned_folder(tx.as_mut(), ctx.user_id, id).await?;
            }
        }
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %id,
            column = ?folder.home_column,
            rank = ?folder.home_rank,
            "Folder updated"
        );
        Ok(folder)
    }

    /// Deletes a folder and its subtree. Items filed in the deleted folders
    /// become unfiled, and the home grid columns they occupied are closed up.
    ///
    /// Returns the deleted folder ids, parents first.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        id: FolderId,
    ) -> AppResult<Vec<FolderId>> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let folder = owned_folder(tx.as_mut(), ctx.user_id, id).await?;

        let mut arena = load_arena(
            tx.as_mut(),
            ctx.user_id,
            folder.page,
            self.home.max_folder_depth,
        )
        .await?;
        let columns: Vec<i32> = std::iter::once(id)
            .chain(arena.descendants(id))
            .filter_map(|f| arena.get(f).and_then(|r| r.folder.pinned_column()))
            .collect();
        let removed = arena.remove_subtree(id)?;

        tx.delete_folders(&removed).await?;
        for column in columns {
            let mut scope = tx.column_folders(ctx.user_id, column).await?;
            for index in resequence(&mut scope) {
                tx.update_folder(&scope[index]).await?;
            }
        }
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %id,
            removed = removed.len(),
            "Folder deleted"
        );
        Ok(removed)
    }
}
