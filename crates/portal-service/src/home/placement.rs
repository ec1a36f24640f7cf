//! Drag-and-drop placement on the home grid.

use std::collections::BTreeSet;

use tracing::info;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{FavoriteId, FolderId, Page};
use portal_database::StoreTx;
use portal_entity::favorite::Favorite;
use portal_entity::folder::Folder;
use portal_entity::rank::resequence;

use super::movement::{HomeGridService, MoveOutcome, owned_favorite, pinned_column};
use super::{position, resequence_column, resequence_favorites, save_folders};
use crate::context::RequestContext;
use crate::folder::owned_folder;

impl HomeGridService {
    fn check_column(&self, column: i32) -> AppResult<()> {
        if self.home.is_column(column) {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Invalid target column; expected 1 to {}",
                self.home.columns
            )))
        }
    }

    /// Drop a folder into `column` at a 0-based `position`, or at the bottom
    /// when no position is given. Positions past the end clamp to the end.
    pub async fn place_folder(
        &self,
        ctx: &RequestContext,
        id: FolderId,
        column: i32,
        target_position: Option<usize>,
    ) -> AppResult<MoveOutcome> {
        self.check_column(column)?;
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let folder = owned_folder(tx.as_mut(), ctx.user_id, id).await?;
        let outcome = place_in_column(tx.as_mut(), folder, column, target_position).await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %id,
            column,
            rank = outcome.rank,
            moved = outcome.moved,
            "Folder placed"
        );
        Ok(outcome)
    }

    /// Swap two folders in the same column.
    pub async fn swap_folders(
        &self,
        ctx: &RequestContext,
        dragged: FolderId,
        target: FolderId,
    ) -> AppResult<MoveOutcome> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let dragged_folder = owned_folder(tx.as_mut(), ctx.user_id, dragged).await?;
        let target_folder = owned_folder(tx.as_mut(), ctx.user_id, target).await?;

        let column = pinned_column(&dragged_folder)?;
        if target_folder.pinned_column() != Some(column) {
            return Err(AppError::validation(
                "Folders must be in the same column to swap",
            ));
        }

        let mut scope = resequence_column(tx.as_mut(), ctx.user_id, column).await?;
        let a = position(&scope, dragged.get())?;
        let b = position(&scope, target.get())?;
        scope.swap(a, b);
        let changed = resequence(&mut scope);
        save_folders(tx.as_mut(), &scope, &changed).await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            dragged = %dragged,
            target = %target,
            column,
            "Folders swapped"
        );
        Ok(MoveOutcome {
            moved: a != b,
            column: Some(column),
            rank: b as i32 + 1,
        })
    }

    /// Put `dragged` at `target`'s rank in `column`, pushing `target` and
    /// everything below it down one, then close the gap in the column
    /// `dragged` came from.
    pub async fn insert_folder_at(
        &self,
        ctx: &RequestContext,
        dragged: FolderId,
        target: FolderId,
        column: i32,
    ) -> AppResult<MoveOutcome> {
        self.check_column(column)?;
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let mut folder = owned_folder(tx.as_mut(), ctx.user_id, dragged).await?;
        let target_folder = owned_folder(tx.as_mut(), ctx.user_id, target).await?;
        if target_folder.pinned_column() != Some(column) {
            return Err(AppError::validation(format!(
                "Folder {target} is not in column {column}"
            )));
        }

        let origin_column = folder.pinned_column();
        let mut scope = resequence_column(tx.as_mut(), ctx.user_id, column).await?;
        if dragged == target {
            let rank = position(&scope, target.get())? as i32 + 1;
            tx.commit().await?;
            return Ok(MoveOutcome {
                moved: false,
                column: Some(column),
                rank,
            });
        }

        if origin_column == Some(column) {
            let from = position(&scope, dragged.get())?;
            folder = scope.remove(from);
        }
        let to = position(&scope, target.get())?;
        folder.home_column = Some(column);
        scope.insert(to, folder);
        let mut changed = resequence(&mut scope);
        if !changed.contains(&to) {
            changed.push(to);
        }
        save_folders(tx.as_mut(), &scope, &changed).await?;

        if let Some(origin) = origin_column.filter(|c| *c != column) {
            resequence_column(tx.as_mut(), ctx.user_id, origin).await?;
        }
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            dragged = %dragged,
            target = %target,
            column,
            rank = to + 1,
            "Folder inserted"
        );
        Ok(MoveOutcome {
            moved: true,
            column: Some(column),
            rank: to as i32 + 1,
        })
    }

    /// Swap two pinned favorites filed in the same folder.
    pub async fn swap_favorites(
        &self,
        ctx: &RequestContext,
        dragged: FavoriteId,
        target: FavoriteId,
    ) -> AppResult<MoveOutcome> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let dragged_favorite = owned_favorite(tx.as_mut(), ctx, dragged).await?;
        let target_favorite = owned_favorite(tx.as_mut(), ctx, target).await?;

        if dragged_favorite.folder_id != target_favorite.folder_id {
            return Err(AppError::validation(
                "Favorites must be in the same folder to swap",
            ));
        }
        if !dragged_favorite.is_pinned() || !target_favorite.is_pinned() {
            return Err(AppError::validation(
                "Only favorites on the home grid can be swapped",
            ));
        }

        let mut scope =
            resequence_favorites(tx.as_mut(), ctx.user_id, dragged_favorite.folder_id).await?;
        let a = position(&scope, dragged.get())?;
        let b = position(&scope, target.get())?;
        scope.swap(a, b);
        for index in resequence(&mut scope) {
            tx.update_favorite(&scope[index]).await?;
        }
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            dragged = %dragged,
            target = %target,
            "Favorites swapped"
        );
        Ok(MoveOutcome {
            moved: a != b,
            column: None,
            rank: b as i32 + 1,
        })
    }

    /// Put `dragged` at `target`'s rank among the pinned favorites of their
    /// shared folder, or just below it, pushing the rest down one.
    pub async fn insert_favorite_at(
        &self,
        ctx: &RequestContext,
        dragged: FavoriteId,
        target: FavoriteId,
        below: bool,
    ) -> AppResult<MoveOutcome> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let dragged_favorite = owned_favorite(tx.as_mut(), ctx, dragged).await?;
        let target_favorite = owned_favorite(tx.as_mut(), ctx, target).await?;

        if dragged_favorite.folder_id != target_favorite.folder_id {
            return Err(AppError::validation(
                "Favorites must be in the same folder",
            ));
        }
        if !target_favorite.is_pinned() {
            return Err(AppError::validation(format!(
                "Favorite {target} is not on the home grid"
            )));
        }
        if dragged == target {
            let scope =
                resequence_favorites(tx.as_mut(), ctx.user_id, target_favorite.folder_id).await?;
            let rank = position(&scope, target.get())? as i32 + 1;
            tx.commit().await?;
            return Ok(MoveOutcome {
                moved: false,
                column: None,
                rank,
            });
        }

        let folder = target_favorite.folder_id;
        let (from, to) =
            drop_favorite(tx.as_mut(), dragged_favorite, folder, Some((target, below))).await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            dragged = %dragged,
            target = %target,
            below,
            rank = to + 1,
            "Favorite inserted"
        );
        Ok(MoveOutcome {
            moved: from != Some(to),
            column: None,
            rank: to as i32 + 1,
        })
    }

    /// Refile a favorite into another favorites folder and pin it there,
    /// at `target`'s slot (or just below it) or at the top when the drop
    /// had no target. The folder it left is closed up.
    pub async fn move_favorite_to_folder(
        &self,
        ctx: &RequestContext,
        dragged: FavoriteId,
        folder_id: FolderId,
        target: Option<FavoriteId>,
        below: bool,
    ) -> AppResult<MoveOutcome> {
        if target == Some(dragged) {
            return Err(AppError::validation(
                "A favorite cannot be dropped on itself",
            ));
        }

        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let favorite = owned_favorite(tx.as_mut(), ctx, dragged).await?;
        let folder = owned_folder(tx.as_mut(), ctx.user_id, folder_id).await?;
        if folder.page != Page::Favorites {
            return Err(AppError::validation(format!(
                "Folder {folder_id} does not hold favorites"
            )));
        }
        if let Some(target) = target {
            let target_favorite = owned_favorite(tx.as_mut(), ctx, target).await?;
            if target_favorite.folder_id != Some(folder_id) || !target_favorite.is_pinned() {
                return Err(AppError::validation(format!(
                    "Favorite {target} is not pinned in folder {folder_id}"
                )));
            }
        }

        let origin = favorite.folder_id;
        let (from, to) = drop_favorite(
            tx.as_mut(),
            favorite,
            Some(folder_id),
            target.map(|t| (t, below)),
        )
        .await?;
        if origin != Some(folder_id) {
            resequence_favorites(tx.as_mut(), ctx.user_id, origin).await?;
        }
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            favorite_id = %dragged,
            from_folder = ?origin,
            folder_id = %folder_id,
            rank = to + 1,
            "Favorite refiled"
        );
        Ok(MoveOutcome {
            moved: origin != Some(folder_id) || from != Some(to),
            column: None,
            rank: to as i32 + 1,
        })
    }

    /// Renumber the pinned favorites of a folder in the given order.
    ///
    /// `order` must name every pinned favorite of the folder exactly once.
    pub async fn reorder_favorites(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        order: &[FavoriteId],
    ) -> AppResult<Vec<Favorite>> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        owned_folder(tx.as_mut(), ctx.user_id, folder_id).await?;

        let mut scope = resequence_favorites(tx.as_mut(), ctx.user_id, Some(folder_id)).await?;
        let wanted: BTreeSet<FavoriteId> = order.iter().copied().collect();
        let present: BTreeSet<FavoriteId> = scope.iter().map(|f| f.id).collect();
        if wanted.len() != order.len() || wanted != present {
            return Err(AppError::validation(format!(
                "Order must list each pinned favorite of folder {folder_id} exactly once"
            )));
        }

        scope.sort_by_key(|f| order.iter().position(|id| *id == f.id));
        for index in resequence(&mut scope) {
            tx.update_favorite(&scope[index]).await?;
        }
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            count = scope.len(),
            "Favorites reordered"
        );
        Ok(scope)
    }
}

/// Put `folder` into `column` at a 0-based `target_position` (the bottom
/// when `None`) and close the gap in the column it left. The caller holds
/// the owner lock and has checked `column`.
pub(crate) async fn place_in_column(
    tx: &mut dyn StoreTx,
    mut folder: Folder,
    column: i32,
    target_position: Option<usize>,
) -> AppResult<MoveOutcome> {
    let owner = folder.user_id;
    let id = folder.id;
    let origin_column = folder.pinned_column();

    let mut scope = resequence_column(tx, owner, column).await?;
    let from = if origin_column == Some(column) {
        let from = position(&scope, id.get())?;
        if target_position.is_none() {
            return Ok(MoveOutcome {
                moved: false,
                column: Some(column),
                rank: from as i32 + 1,
            });
        }
        folder = scope.remove(from);
        Some(from)
    } else {
        None
    };

    let to = target_position.unwrap_or(scope.len()).min(scope.len());
    folder.home_column = Some(column);
    scope.insert(to, folder);
    let mut changed = resequence(&mut scope);
    if !changed.contains(&to) {
        changed.push(to);
    }
    save_folders(tx, &scope, &changed).await?;

    if let Some(origin) = origin_column.filter(|c| *c != column) {
        resequence_column(tx, owner, origin).await?;
    }

    Ok(MoveOutcome {
        moved: from != Some(to),
        column: Some(column),
        rank: to as i32 + 1,
    })
}

/// Drop `favorite` into the pinned favorites of `folder`, at the slot of
/// `target` (or just below it), or at the top when there is no target.
/// Returns the favorite's old and new 0-based slots in that folder.
async fn drop_favorite(
    tx: &mut dyn StoreTx,
    mut favorite: Favorite,
    folder: Option<FolderId>,
    target: Option<(FavoriteId, bool)>,
) -> AppResult<(Option<usize>, usize)> {
    let mut scope = resequence_favorites(tx, favorite.user_id, folder).await?;
    let from = scope.iter().position(|f| f.id == favorite.id);
    if let Some(from) = from {
        favorite = scope.remove(from);
    }

    let to = match target {
        Some((target, below)) => {
            (position(&scope, target.get())? + usize::from(below)).min(scope.len())
        }
        None => 0,
    };
    favorite.folder_id = folder;
    scope.insert(to, favorite);
    let mut changed = resequence(&mut scope);
    if !changed.contains(&to) {
        changed.push(to);
    }
    for index in changed {
        tx.update_favorite(&scope[index]).await?;
    }
    Ok((from, to))
}
