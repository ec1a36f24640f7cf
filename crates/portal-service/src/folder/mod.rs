//! Folder management, tree, and sharing services.

pub mod service;
pub mod sharing;
pub mod tree;

pub use service::{CreateFolderRequest, FolderService, UpdateFolderRequest};
pub use sharing::{FolderEditor, SharingService};
pub use tree::{ReparentResult, TreeService};

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{FolderId, Page, UserId};
use portal_database::StoreTx;
use portal_entity::folder::{Folder, FolderArena};

/// Fetch a folder the caller owns. Other users' folders read as missing.
pub(crate) async fn owned_folder(
    tx: &mut dyn StoreTx,
    owner: UserId,
    id: FolderId,
) -> AppResult<Folder> {
    tx.find_folder(id)
        .await?
        .filter(|folder| folder.user_id == owner)
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
}

/// Load an owner's page into an arena, editor links included.
pub(crate) async fn load_arena(
    tx: &mut dyn StoreTx,
    owner: UserId,
    page: Page,
    max_depth: usize,
) -> AppResult<FolderArena> {
    let folders = tx.owned_folders(owner, page).await?;
    let links = tx.editor_links(owner, page).await?;
    Ok(FolderArena::from_rows(max_depth, folders, links))
}

/// Reject a parent on another page before the page-scoped arena is
/// consulted; the arena would only report it as missing.
pub(crate) async fn check_parent_page(
    tx: &mut dyn StoreTx,
    owner: UserId,
    page: Page,
    parent_id: FolderId,
) -> AppResult<()> {
    let parent = tx
        .find_folder(parent_id)
        .await?
        .filter(|folder| folder.user_id == owner)
        .ok_or_else(|| AppError::not_found(format!("Parent folder {parent_id} not found")))?;
    if parent.page != page {
        return Err(AppError::validation(
            "A folder's parent must be on the same page",
        ));
    }
    Ok(())
}
