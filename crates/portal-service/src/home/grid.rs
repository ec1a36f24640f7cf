//! Read model for the home page.

use std::collections::BTreeMap;

use serde::Serialize;

use portal_core::result::AppResult;
use portal_core::types::{FolderId, Page};
use portal_entity::favorite::Favorite;
use portal_entity::folder::Folder;

use super::movement::HomeGridService;
use crate::context::RequestContext;

/// A pinned folder with its pinned favorites.
#[derive(Debug, Clone, Serialize)]
pub struct HomeFolder {
    /// The folder.
    pub folder: Folder,
    /// Pinned favorites filed in the folder, in rank order.
    pub favorites: Vec<Favorite>,
}

/// One column of the grid.
#[derive(Debug, Clone, Serialize)]
pub struct HomeColumn {
    /// 1-based column number.
    pub column: i32,
    /// Pinned folders in rank order.
    pub folders: Vec<HomeFolder>,
}

/// Everything shown on the home page grid.
#[derive(Debug, Clone, Serialize)]
pub struct HomeGrid {
    /// Favorites folders in columns left to right, including empty ones.
    pub columns: Vec<HomeColumn>,
    /// Pinned task folders, ordered by column then rank.
    pub task_folders: Vec<Folder>,
}

impl HomeGridService {
    /// Pinned favorites folders the caller owns or edits, grouped into
    /// columns, plus the pinned task folders. Other pages stay off the grid.
    pub async fn grid(&self, ctx: &RequestContext) -> AppResult<HomeGrid> {
        let mut tx = self.store.begin().await?;
        let (folders, rest): (Vec<Folder>, Vec<Folder>) = tx
            .pinned_folders(ctx.user_id)
            .await?
            .into_iter()
            .partition(|f| f.page == Page::Favorites);
        let task_folders: Vec<Folder> = rest
            .into_iter()
            .filter(|f| f.page == Page::Tasks)
            .collect();
        let ids: Vec<FolderId> = folders.iter().map(|f| f.id).collect();
        let favorites = tx.favorites_in_folders(&ids).await?;

        let mut by_folder: BTreeMap<FolderId, Vec<Favorite>> = BTreeMap::new();
        for favorite in favorites {
            if let Some(folder_id) = favorite.folder_id {
                by_folder.entry(folder_id).or_default().push(favorite);
            }
        }

        let mut columns: Vec<HomeColumn> = (1..=self.home.columns)
            .map(|column| HomeColumn {
                column,
                folders: Vec::new(),
            })
            .collect();
        for folder in folders {
            let Some(column) = folder.pinned_column() else {
                continue;
            };
            let index = (column - 1) as usize;
            // Rows pinned beyond the configured grid still get a column.
            while columns.len() <= index {
                let next = columns.len() as i32 + 1;
                columns.push(HomeColumn {
                    column: next,
                    folders: Vec::new(),
                });
            }
            let favorites = by_folder.remove(&folder.id).unwrap_or_default();
            columns[index].folders.push(HomeFolder { folder, favorites });
        }

        Ok(HomeGrid {
            columns,
            task_folders,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use portal_core::config::HomeConfig;
    use portal_database::{MemoryStore, PortalStore};
    use portal_entity::favorite::CreateFavorite;
    use portal_entity::folder::CreateFolder;

    use super::*;

    #[tokio::test]
    async fn test_grid_groups_by_column() {
        let store: Arc<dyn PortalStore> = Arc::new(MemoryStore::new());
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user("alice").await.unwrap();
        let mut pinned = Vec::new();
        for (column, rank) in [(2, 2), (2, 1), (4, 1)] {
            let folder = tx
                .insert_folder(&CreateFolder {
                    user_id: user.id,
                    page: Page::Favorites,
                    name: format!("{column}/{rank}"),
                    parent_id: None,
                    home_column: Some(column),
                    home_rank: Some(rank),
                })
                .await
                .unwrap();
            pinned.push(folder.id);
        }
        tx.insert_favorite(&CreateFavorite {
            user_id: user.id,
            folder_id: Some(pinned[1]),
            name: "Crates".into(),
            url: "https://crates.io".into(),
            home_rank: Some(1),
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let service = HomeGridService::new(Arc::clone(&store), HomeConfig::default());
        let ctx = RequestContext::new(user.id, user.username);
        let grid = service.grid(&ctx).await.unwrap();

        assert_eq!(grid.columns.len(), 4);
        assert!(grid.columns[0].folders.is_empty());
        let second: Vec<FolderId> = grid.columns[1].folders.iter().map(|f| f.folder.id).collect();
        assert_eq!(second, vec![pinned[1], pinned[0]]);
        assert_eq!(grid.columns[1].folders[0].favorites.len(), 1);
        assert_eq!(grid.columns[3].folders.len(), 1);
    }

    #[tokio::test]
    async fn test_grid_keeps_other_pages_out_of_columns() {
        let store: Arc<dyn PortalStore> = Arc::new(MemoryStore::new());
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user("alice").await.unwrap();
        let mut ids = Vec::new();
        for page in [Page::Favorites, Page::Tasks, Page::Contacts] {
            let folder = tx
                .insert_folder(&CreateFolder {
                    user_id: user.id,
                    page,
                    name: page.to_string(),
                    parent_id: None,
                    home_column: Some(1),
                    home_rank: Some(1),
                })
                .await
                .unwrap();
            ids.push(folder.id);
        }
        tx.commit().await.unwrap();

        let service = HomeGridService::new(Arc::clone(&store), HomeConfig::default());
        let grid = service
            .grid(&RequestContext::new(user.id, user.username))
            .await
            .unwrap();
        let first: Vec<FolderId> = grid.columns[0].folders.iter().map(|f| f.folder.id).collect();
        assert_eq!(first, vec![ids[0]]);
        let tasks: Vec<FolderId> = grid.task_folders.iter().map(|f| f.id).collect();
        assert_eq!(tasks, vec![ids[1]]);
    }
}
