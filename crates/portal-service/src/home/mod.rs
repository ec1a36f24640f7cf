//! Home grid: pinned folders in ranked columns, pinned favorites under
//! their folders.

pub mod grid;
pub mod movement;
pub mod placement;

pub use grid::{HomeColumn, HomeFolder, HomeGrid};
pub use movement::{HomeGridService, MoveOutcome};

use tracing::debug;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{Direction, FolderId, UserId};
use portal_database::StoreTx;
use portal_entity::favorite::Favorite;
use portal_entity::folder::Folder;
use portal_entity::rank::{Ranked, resequence};

/// Load one home grid column, close its rank gaps, and persist the fixes.
pub(crate) async fn resequence_column(
    tx: &mut dyn StoreTx,
    owner: UserId,
    column: i32,
) -> AppResult<Vec<Folder>> {
    let mut scope = tx.column_folders(owner, column).await?;
    let changed = resequence(&mut scope);
    save_folders(tx, &scope, &changed).await?;
    if !changed.is_empty() {
        debug!(user_id = %owner, column, fixed = changed.len(), "Resequenced column");
    }
    Ok(scope)
}

/// Load the pinned favorites of one folder, close their rank gaps, and
/// persist the fixes.
pub(crate) async fn resequence_favorites(
    tx: &mut dyn StoreTx,
    owner: UserId,
    folder: Option<FolderId>,
) -> AppResult<Vec<Favorite>> {
    let mut scope = tx.pinned_favorites(owner, folder).await?;
    let changed = resequence(&mut scope);
    for index in &changed {
        tx.update_favorite(&scope[*index]).await?;
    }
    if !changed.is_empty() {
        debug!(user_id = %owner, folder_id = ?folder, fixed = changed.len(), "Resequenced favorites");
    }
    Ok(scope)
}

pub(crate) async fn save_folders(
    tx: &mut dyn StoreTx,
    scope: &[Folder],
    indices: &[usize],
) -> AppResult<()> {
    for index in indices {
        tx.update_folder(&scope[*index]).await?;
    }
    Ok(())
}

/// Index of the entity matching `key` inside a loaded scope.
pub(crate) fn position<T: Ranked>(scope: &[T], key: i64) -> AppResult<usize> {
    scope
        .iter()
        .position(|item| item.tiebreak() == key)
        .ok_or_else(|| AppError::internal(format!("Entity {key} missing from its rank scope")))
}

/// Swap the entity at `origin` with its neighbour in `direction` and
/// renumber the scope. Returns the indices whose rank changed, or `None`
/// when the entity already sits at the boundary.
pub(crate) fn swap_neighbour<T: Ranked>(
    scope: &mut [T],
    origin: usize,
    direction: Direction,
) -> Option<Vec<usize>> {
    let target = match direction {
        Direction::Up => origin.checked_sub(1)?,
        Direction::Down if origin + 1 < scope.len() => origin + 1,
        _ => return None,
    };
    scope.swap(origin, target);
    Some(resequence(scope))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Slot(i64, Option<i32>);

    impl Ranked for Slot {
        fn rank(&self) -> Option<i32> {
            self.1
        }

        fn set_rank(&mut self, rank: i32) {
            self.1 = Some(rank);
        }

        fn tiebreak(&self) -> i64 {
            self.0
        }
    }

    fn column() -> Vec<Slot> {
        (1..=4).map(|i| Slot(i, Some(i as i32))).collect()
    }

    #[test]
    fn test_swap_up() {
        let mut scope = column();
        let changed = swap_neighbour(&mut scope, 1, Direction::Up).unwrap();
        assert_eq!(changed, vec![0, 1]);
        let order: Vec<i64> = scope.iter().map(|s| s.0).collect();
        assert_eq!(order, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_boundaries_are_noops() {
        let mut scope = column();
        assert!(swap_neighbour(&mut scope, 0, Direction::Up).is_none());
        assert!(swap_neighbour(&mut scope, 3, Direction::Down).is_none());
        assert!(swap_neighbour(&mut scope, 1, Direction::Left).is_none());
        let ranks: Vec<Option<i32>> = scope.iter().map(|s| s.1).collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_position() {
        let scope = column();
        assert_eq!(position(&scope, 3).unwrap(), 2);
        assert!(position(&scope, 9).is_err());
    }
}
