//! One-step moves and pin toggles on the home grid.
//!
//! Every operation locks the owner, resequences the scope it is about to
//! touch, computes the move against the dense ranks, and commits once.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use portal_core::config::HomeConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{Direction, FavoriteId, FolderId};
use portal_database::{PortalStore, StoreTx};
use portal_entity::favorite::Favorite;
use portal_entity::folder::Folder;
use portal_entity::rank::max_rank;

use super::{position, resequence_column, resequence_favorites, save_folders, swap_neighbour};
use crate::context::RequestContext;
use crate::folder::owned_folder;

/// Where an entity ended up after a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    /// False when the request hit a boundary and nothing changed.
    pub moved: bool,
    /// Home grid column; `None` for favorites, which are scoped by folder.
    pub column: Option<i32>,
    /// 1-based rank within the scope.
    pub rank: i32,
}

/// Moves folders and favorites around the home grid.
#[derive(Clone)]
pub struct HomeGridService {
    pub(super) store: Arc<dyn PortalStore>,
    pub(super) home: HomeConfig,
}

pub(crate) async fn owned_favorite(
    tx: &mut dyn StoreTx,
    ctx: &RequestContext,
    id: FavoriteId,
) -> AppResult<Favorite> {
    tx.find_favorite(id)
        .await?
        .filter(|favorite| favorite.user_id == ctx.user_id)
        .ok_or_else(|| AppError::not_found(format!("Favorite {id} not found")))
}

pub(super) fn pinned_column(folder: &Folder) -> AppResult<i32> {
    folder.pinned_column().ok_or_else(|| {
        AppError::validation(format!("Folder {} is not on the home grid", folder.id))
    })
}

impl HomeGridService {
    /// Creates a new home grid service.
    pub fn new(store: Arc<dyn PortalStore>, home: HomeConfig) -> Self {
        Self { store, home }
    }

    /// Grid settings in effect.
    pub fn config(&self) -> &HomeConfig {
        &self.home
    }

    /// A favorite the caller owns.
    pub async fn favorite(&self, ctx: &RequestContext, id: FavoriteId) -> AppResult<Favorite> {
        let mut tx = self.store.begin().await?;
        owned_favorite(tx.as_mut(), ctx, id).await
    }

    /// Move a pinned folder one step.
    ///
    /// Up and down swap it with its neighbour in the column. Left and right
    /// append it to the bottom of the adjacent column and close the gap it
    /// left. Moving past the first or last rank, or past the outer columns,
    /// changes nothing and reports `moved: false`.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        id: FolderId,
        direction: Direction,
    ) -> AppResult<MoveOutcome> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let mut folder = owned_folder(tx.as_mut(), ctx.user_id, id).await?;
        let origin_column = pinned_column(&folder)?;

        let outcome = if direction.is_vertical() {
            let mut scope = resequence_column(tx.as_mut(), ctx.user_id, origin_column).await?;
            let origin = position(&scope, id.get())?;
            match swap_neighbour(&mut scope, origin, direction) {
                Some(changed) => {
                    save_folders(tx.as_mut(), &scope, &changed).await?;
                    MoveOutcome {
                        moved: true,
                        column: Some(origin_column),
                        rank: position(&scope, id.get())? as i32 + 1,
                    }
                }
                None => MoveOutcome {
                    moved: false,
                    column: Some(origin_column),
                    rank: origin as i32 + 1,
                },
            }
        } else {
            let destination = match direction {
                Direction::Left if origin_column > 1 => origin_column - 1,
                Direction::Right if origin_column < self.home.columns => origin_column + 1,
                _ => origin_column,
            };

            if destination == origin_column {
                let scope = resequence_column(tx.as_mut(), ctx.user_id, origin_column).await?;
                MoveOutcome {
                    moved: false,
                    column: Some(origin_column),
                    rank: position(&scope, id.get())? as i32 + 1,
                }
            } else {
                let target = resequence_column(tx.as_mut(), ctx.user_id, destination).await?;
                let rank = max_rank(&target) + 1;
                folder.home_column = Some(destination);
                folder.home_rank = Some(rank);
                tx.update_folder(&folder).await?;
                resequence_column(tx.as_mut(), ctx.user_id, origin_column).await?;
                MoveOutcome {
                    moved: true,
                    column: Some(destination),
                    rank,
                }
            }
        };

        tx.commit().await?;
        log_outcome(ctx, "folder", id.get(), direction, &outcome);
        Ok(outcome)
    }

    /// Move a pinned favorite one step up or down among the pinned
    /// favorites of its folder.
    pub async fn move_favorite(
        &self,
        ctx: &RequestContext,
        id: FavoriteId,
        direction: Direction,
    ) -> AppResult<MoveOutcome> {
        if !direction.is_vertical() {
            return Err(AppError::validation(
                "Favorites can only move up or down",
            ));
        }

        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let favorite = owned_favorite(tx.as_mut(), ctx, id).await?;
        if !favorite.is_pinned() {
            return Err(AppError::validation(format!(
                "Favorite {id} is not on the home grid"
            )));
        }

        let mut scope = resequence_favorites(tx.as_mut(), ctx.user_id, favorite.folder_id).await?;
        let origin = position(&scope, id.get())?;
        let outcome = match swap_neighbour(&mut scope, origin, direction) {
            Some(changed) => {
                for index in changed {
                    tx.update_favorite(&scope[index]).await?;
                }
                MoveOutcome {
                    moved: true,
                    column: None,
                    rank: position(&scope, id.get())? as i32 + 1,
                }
            }
            None => MoveOutcome {
                moved: false,
                column: None,
                rank: origin as i32 + 1,
            },
        };

        tx.commit().await?;
        log_outcome(ctx, "favorite", id.get(), direction, &outcome);
        Ok(outcome)
    }

    /// Pin a folder to the bottom of `column` (or the default pin column),
    /// or unpin it and close the gap it leaves.
    pub async fn toggle_folder_home(
        &self,
        ctx: &RequestContext,
        id: FolderId,
        column: Option<i32>,
    ) -> AppResult<Folder> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let mut folder = owned_folder(tx.as_mut(), ctx.user_id, id).await?;

        let folder = match folder.pinned_column() {
            Some(old_column) => {
                folder.unpin();
                let folder = tx.update_folder(&folder).await?;
                resequence_column(tx.as_mut(), ctx.user_id, old_column).await?;
                info!(user_id = %ctx.user_id, folder_id = %id, column = old_column, "Folder unpinned");
                folder
            }
            None => {
                let column = column.unwrap_or_else(|| self.home.pin_column());
                if !self.home.is_column(column) {
                    return Err(AppError::validation(format!(
                        "Home column must be between 1 and {}",
                        self.home.columns
                    )));
                }
                let scope = resequence_column(tx.as_mut(), ctx.user_id, column).await?;
                folder.home_column = Some(column);
                folder.home_rank = Some(max_rank(&scope) + 1);
                let folder = tx.update_folder(&folder).await?;
                info!(
                    user_id = %ctx.user_id,
                    folder_id = %id,
                    column,
                    rank = ?folder.home_rank,
                    "Folder pinned"
                );
                folder
            }
        };

        tx.commit().await?;
        Ok(folder)
    }

    /// Pin a favorite at rank 1 of its folder, or unpin it.
    ///
    /// Pinning does not renumber the folder's other favorites; the next
    /// move in that folder resequences them.
    pub async fn toggle_favorite_home(
        &self,
        ctx: &RequestContext,
        id: FavoriteId,
    ) -> AppResult<Favorite> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let mut favorite = owned_favorite(tx.as_mut(), ctx, id).await?;

        let pinned = !favorite.is_pinned();
        favorite.home_rank = Some(if pinned { 1 } else { 0 });
        let favorite = tx.update_favorite(&favorite).await?;
        tx.commit().await?;

        info!(user_id = %ctx.user_id, favorite_id = %id, pinned, "Favorite home toggled");
        Ok(favorite)
    }
}

fn log_outcome(
    ctx: &RequestContext,
    kind: &'static str,
    id: i64,
    direction: Direction,
    outcome: &MoveOutcome,
) {
    if outcome.moved {
        info!(
            user_id = %ctx.user_id,
            kind,
            id,
            %direction,
            column = ?outcome.column,
            rank = outcome.rank,
            "Moved on home grid"
        );
    } else {
        debug!(user_id = %ctx.user_id, kind, id, %direction, "Move stopped at boundary");
    }
}

#[cfg(test)]
mod tests {
    use portal_core::types::{Page, UserId};
    use portal_database::MemoryStore;
    use portal_entity::favorite::CreateFavorite;
    use portal_entity::folder::CreateFolder;

    use super::*;

    struct Grid {
        store: Arc<dyn PortalStore>,
        service: HomeGridService,
        ctx: RequestContext,
    }

    async fn grid() -> Grid {
        let store: Arc<dyn PortalStore> = Arc::new(MemoryStore::new());
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user("alice").await.unwrap();
        tx.commit().await.unwrap();
        Grid {
            service: HomeGridService::new(Arc::clone(&store), HomeConfig::default()),
            store,
            ctx: RequestContext::new(user.id, user.username),
        }
    }

    impl Grid {
        async fn pin(&self, name: &str, column: i32, rank: i32) -> FolderId {
            let mut tx = self.store.begin().await.unwrap();
            let folder = tx
                .insert_folder(&CreateFolder {
                    user_id: self.ctx.user_id,
                    page: Page::Favorites,
                    name: name.into(),
                    parent_id: None,
                    home_column: Some(column),
                    home_rank: Some(rank),
                })
                .await
                .unwrap();
            tx.commit().await.unwrap();
            folder.id
        }

        async fn favorite(&self, folder: FolderId, rank: i32) -> FavoriteId {
            let mut tx = self.store.begin().await.unwrap();
            let favorite = tx
                .insert_favorite(&CreateFavorite {
                    user_id: self.ctx.user_id,
                    folder_id: Some(folder),
                    name: format!("link {rank}"),
                    url: "https://example.org".into(),
                    home_rank: Some(rank),
                })
                .await
                .unwrap();
            tx.commit().await.unwrap();
            favorite.id
        }

        async fn column(&self, column: i32) -> Vec<(FolderId, Option<i32>)> {
            let mut tx = self.store.begin().await.unwrap();
            tx.column_folders(self.ctx.user_id, column)
                .await
                .unwrap()
                .into_iter()
                .map(|f| (f.id, f.home_rank))
                .collect()
        }

        async fn favorite_rank(&self, id: FavoriteId) -> Option<i32> {
            let mut tx = self.store.begin().await.unwrap();
            tx.find_favorite(id).await.unwrap().unwrap().home_rank
        }
    }

    #[tokio::test]
    async fn test_move_up_swaps_with_neighbour() {
        let g = grid().await;
        let ids = [
            g.pin("a", 1, 1).await,
            g.pin("b", 1, 2).await,
            g.pin("c", 1, 3).await,
            g.pin("d", 1, 4).await,
        ];

        let outcome = g.service.move_folder(&g.ctx, ids[1], Direction::Up).await.unwrap();
        assert!(outcome.moved);
        assert_eq!(outcome.rank, 1);
        assert_eq!(
            g.column(1).await,
            vec![
                (ids[1], Some(1)),
                (ids[0], Some(2)),
                (ids[2], Some(3)),
                (ids[3], Some(4)),
            ]
        );
    }

    #[tokio::test]
    async fn test_move_past_ends_is_noop() {
        let g = grid().await;
        let top = g.pin("a", 2, 1).await;
        let bottom = g.pin("b", 2, 2).await;

        let up = g.service.move_folder(&g.ctx, top, Direction::Up).await.unwrap();
        let down = g.service.move_folder(&g.ctx, bottom, Direction::Down).await.unwrap();
        assert!(!up.moved);
        assert!(!down.moved);
        assert_eq!(g.column(2).await, vec![(top, Some(1)), (bottom, Some(2))]);
    }

    #[tokio::test]
    async fn test_move_heals_gaps_first() {
        let g = grid().await;
        let a = g.pin("a", 1, 3).await;
        let b = g.pin("b", 1, 7).await;
        let outcome = g.service.move_folder(&g.ctx, b, Direction::Up).await.unwrap();
        assert_eq!(outcome.rank, 1);
        assert_eq!(g.column(1).await, vec![(b, Some(1)), (a, Some(2))]);
    }

    #[tokio::test]
    async fn test_move_right_appends_and_repacks_origin() {
        let g = grid().await;
        let left: Vec<FolderId> = vec![
            g.pin("a", 1, 1).await,
            g.pin("b", 1, 2).await,
            g.pin("c", 1, 3).await,
            g.pin("d", 1, 4).await,
        ];
        let right = g.pin("e", 2, 1).await;

        let outcome = g.service.move_folder(&g.ctx, left[1], Direction::Right).await.unwrap();
        assert_eq!(outcome.column, Some(2));
        assert_eq!(outcome.rank, 2);
        assert_eq!(
            g.column(1).await,
            vec![(left[0], Some(1)), (left[2], Some(2)), (left[3], Some(3))]
        );
        assert_eq!(g.column(2).await, vec![(right, Some(1)), (left[1], Some(2))]);
    }

    #[tokio::test]
    async fn test_move_left_from_first_column_is_noop() {
        let g = grid().await;
        let a = g.pin("a", 1, 1).await;
        let outcome = g.service.move_folder(&g.ctx, a, Direction::Left).await.unwrap();
        assert!(!outcome.moved);
        let last = g.pin("z", 4, 1).await;
        let outcome = g.service.move_folder(&g.ctx, last, Direction::Right).await.unwrap();
        assert!(!outcome.moved);
        assert_eq!(outcome.column, Some(4));
    }

    #[tokio::test]
    async fn test_unpinned_folder_cannot_move() {
        let g = grid().await;
        let a = g.pin("a", 0, 0).await;
        let err = g.service.move_folder(&g.ctx, a, Direction::Up).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_unknown_folder_is_not_found() {
        let g = grid().await;
        let err = g
            .service
            .move_folder(&g.ctx, FolderId(4040), Direction::Up)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_other_owner_cannot_move() {
        let g = grid().await;
        let a = g.pin("a", 1, 1).await;
        let stranger = RequestContext::new(UserId(999), "mallory");
        let err = g.service.move_folder(&stranger, a, Direction::Down).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_favorite_moves_within_folder() {
        let g = grid().await;
        let folder = g.pin("links", 1, 1).await;
        let first = g.favorite(folder, 1).await;
        let second = g.favorite(folder, 2).await;

        let top = g.service.move_favorite(&g.ctx, first, Direction::Up).await.unwrap();
        assert!(!top.moved);
        assert_eq!(g.favorite_rank(first).await, Some(1));

        let outcome = g.service.move_favorite(&g.ctx, first, Direction::Down).await.unwrap();
        assert!(outcome.moved);
        assert_eq!(g.favorite_rank(first).await, Some(2));
        assert_eq!(g.favorite_rank(second).await, Some(1));
    }

    #[tokio::test]
    async fn test_favorite_cannot_move_sideways() {
        let g = grid().await;
        let folder = g.pin("links", 1, 1).await;
        let fav = g.favorite(folder, 1).await;
        let err = g.service.move_favorite(&g.ctx, fav, Direction::Left).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_toggle_folder_home() {
        let g = grid().await;
        let a = g.pin("a", 4, 1).await;
        let b = g.pin("b", 4, 2).await;
        let loose = g.pin("loose", 0, 0).await;

        let pinned = g.service.toggle_folder_home(&g.ctx, loose, None).await.unwrap();
        assert_eq!(pinned.home_column, Some(4));
        assert_eq!(pinned.home_rank, Some(3));

        let unpinned = g.service.toggle_folder_home(&g.ctx, a, None).await.unwrap();
        assert_eq!(unpinned.home_column, Some(0));
        assert_eq!(g.column(4).await, vec![(b, Some(1)), (loose, Some(2))]);

        let err = g.service.toggle_folder_home(&g.ctx, a, Some(9)).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_toggle_favorite_home() {
        let g = grid().await;
        let folder = g.pin("links", 1, 1).await;
        let fav = g.favorite(folder, 3).await;

        let off = g.service.toggle_favorite_home(&g.ctx, fav).await.unwrap();
        assert_eq!(off.home_rank, Some(0));
        let on = g.service.toggle_favorite_home(&g.ctx, fav).await.unwrap();
        assert_eq!(on.home_rank, Some(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_moves_keep_columns_dense() {
        let g = grid().await;
        let mut ids = Vec::new();
        for rank in 1..=6 {
            ids.push(g.pin(&format!("f{rank}"), 1, rank).await);
        }

        let directions = [Direction::Up, Direction::Down, Direction::Right, Direction::Left];
        let mut handles = Vec::new();
        for round in 0..48 {
            let service = g.service.clone();
            let ctx = g.ctx.clone();
            let id = ids[round % ids.len()];
            let direction = directions[(round / ids.len() + round) % directions.len()];
            handles.push(tokio::spawn(async move {
                service.move_folder(&ctx, id, direction).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut seen = Vec::new();
        for column in 1..=4 {
            let slots = g.column(column).await;
            let ranks: Vec<Option<i32>> = slots.iter().map(|(_, rank)| *rank).collect();
            let dense: Vec<Option<i32>> = (1..=slots.len() as i32).map(Some).collect();
            assert_eq!(ranks, dense, "column {column} is not dense");
            seen.extend(slots.into_iter().map(|(id, _)| id));
        }
        seen.sort();
        ids.sort();
        assert_eq!(seen, ids);
    }
}
