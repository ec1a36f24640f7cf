//! Process-local store.
//!
//! A transaction takes the state lock for its whole lifetime, works on a
//! copy, and swaps the copy in on commit. Writers are therefore fully
//! serialized, and an uncommitted transaction leaves no trace.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{FavoriteId, FolderId, Page, UserId};
use portal_entity::favorite::{CreateFavorite, Favorite};
use portal_entity::folder::{CreateFolder, EditorChange, EditorLink, Folder, Grant};
use portal_entity::rank::rank_order;
use portal_entity::user::User;

use super::{PortalStore, StoreTx};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    last_id: i64,
    users: BTreeMap<UserId, User>,
    folders: BTreeMap<FolderId, Folder>,
    editors: BTreeMap<(FolderId, UserId), Grant>,
    favorites: BTreeMap<FavoriteId, Favorite>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn can_see(&self, user: UserId, folder: &Folder) -> bool {
        folder.user_id == user || self.editors.contains_key(&(folder.id, user))
    }
}

/// In-memory [`PortalStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortalStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryTx { guard, work }))
    }

    async fn ping(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Transaction over a [`MemoryStore`].
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

fn by_name(a: &Folder, b: &Folder) -> std::cmp::Ordering {
    a.name.cmp(&b.name).then(a.id.cmp(&b.id))
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_owner(&mut self, _owner: UserId) -> AppResult<()> {
        // The state guard already excludes every other transaction.
        Ok(())
    }

    async fn find_user(&mut self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn insert_user(&mut self, username: &str) -> AppResult<User> {
        if self.work.users.values().any(|u| u.username == username) {
            return Err(AppError::conflict(format!(
                "Username '{username}' already exists"
            )));
        }
        let user = User {
            id: UserId(self.work.next_id()),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        self.work.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_folder(&mut self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.work.folders.get(&id).cloned())
    }

    async fn owned_folders(&mut self, owner: UserId, page: Page) -> AppResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .work
            .folders
            .values()
            .filter(|f| f.user_id == owner && f.page == page)
            .cloned()
            .collect();
        folders.sort_by(by_name);
        Ok(folders)
    }

    async fn visible_folders(&mut self, user: UserId, page: Page) -> AppResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .work
            .folders
            .values()
            .filter(|f| f.page == page && self.work.can_see(user, f))
            .cloned()
            .collect();
        folders.sort_by(by_name);
        Ok(folders)
    }

    async fn column_folders(&mut self, owner: UserId, column: i32) -> AppResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .work
            .folders
            .values()
            .filter(|f| f.user_id == owner && f.home_column == Some(column))
            .cloned()
            .collect();
        folders.sort_by(rank_order);
        Ok(folders)
    }

    async fn pinned_folders(&mut self, user: UserId) -> AppResult<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .work
            .folders
            .values()
            .filter(|f| f.is_pinned() && self.work.can_see(user, f))
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.home_column.cmp(&b.home_column).then(rank_order(a, b)));
        Ok(folders)
    }

    async fn insert_folder(&mut self, data: &CreateFolder) -> AppResult<Folder> {
        let now = Utc::now();
        let folder = Folder {
            id: FolderId(self.work.next_id()),
            user_id: data.user_id,
            page: data.page,
            name: data.name.clone(),
            parent_id: data.parent_id,
            home_column: data.home_column,
            home_rank: data.home_rank,
            selected: None,
            active: None,
            created_at: now,
            updated_at: now,
        };
        self.work.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn update_folder(&mut self, folder: &Folder) -> AppResult<Folder> {
        let stored = self
            .work
            .folders
            .get_mut(&folder.id)
            .ok_or_else(|| AppError::not_found(format!("Folder {} not found", folder.id)))?;
        stored.name = folder.name.clone();
        stored.parent_id = folder.parent_id;
        stored.home_column = folder.home_column;
        stored.home_rank = folder.home_rank;
        stored.selected = folder.selected;
        stored.active = folder.active;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_folders(&mut self, ids: &[FolderId]) -> AppResult<u64> {
        let mut removed = 0;
        for id in ids {
            if self.work.folders.remove(id).is_some() {
                removed += 1;
            }
        }
        self.work.editors.retain(|(folder, _), _| !ids.contains(folder));
        for favorite in self.work.favorites.values_mut() {
            if favorite.folder_id.is_some_and(|f| ids.contains(&f)) {
                favorite.folder_id = None;
            }
        }
        Ok(removed)
    }

    async fn editor_links(&mut self, owner: UserId, page: Page) -> AppResult<Vec<EditorLink>> {
        let folders = &self.work.folders;
        Ok(self
            .work
            .editors
            .iter()
            .filter(|((folder_id, _), _)| {
                folders
                    .get(folder_id)
                    .is_some_and(|f| f.user_id == owner && f.page == page)
            })
            .map(|((folder_id, user_id), grant)| EditorLink {
                folder_id: *folder_id,
                user_id: *user_id,
                inherited: grant.is_inherited(),
            })
            .collect())
    }

    async fn apply_editor_changes(&mut self, changes: &[EditorChange]) -> AppResult<()> {
        for change in changes {
            match *change {
                EditorChange::Granted {
                    folder_id,
                    user_id,
                    grant,
                } => {
                    self.work.editors.insert((folder_id, user_id), grant);
                }
                EditorChange::Revoked { folder_id, user_id } => {
                    self.work.editors.remove(&(folder_id, user_id));
                }
            }
        }
        Ok(())
    }

    async fn find_favorite(&mut self, id: FavoriteId) -> AppResult<Option<Favorite>> {
        Ok(self.work.favorites.get(&id).cloned())
    }

    async fn insert_favorite(&mut self, data: &CreateFavorite) -> AppResult<Favorite> {
        let now = Utc::now();
        let favorite = Favorite {
            id: FavoriteId(self.work.next_id()),
            user_id: data.user_id,
            folder_id: data.folder_id,
            name: data.name.clone(),
            url: data.url.clone(),
            home_rank: data.home_rank,
            created_at: now,
            updated_at: now,
        };
        self.work.favorites.insert(favorite.id, favorite.clone());
        Ok(favorite)
    }

    async fn pinned_favorites(
        &mut self,
        owner: UserId,
        folder: Option<FolderId>,
    ) -> AppResult<Vec<Favorite>> {
        let mut favorites: Vec<Favorite> = self
            .work
            .favorites
            .values()
            .filter(|f| f.user_id == owner && f.folder_id == folder && f.is_pinned())
            .cloned()
            .collect();
        favorites.sort_by(rank_order);
        Ok(favorites)
    }

    async fn favorites_in_folders(&mut self, folders: &[FolderId]) -> AppResult<Vec<Favorite>> {
        let mut favorites: Vec<Favorite> = self
            .work
            .favorites
            .values()
            .filter(|f| f.is_pinned() && f.folder_id.is_some_and(|id| folders.contains(&id)))
            .cloned()
            .collect();
        favorites.sort_by(|a, b| a.folder_id.cmp(&b.folder_id).then(rank_order(a, b)));
        Ok(favorites)
    }

    async fn update_favorite(&mut self, favorite: &Favorite) -> AppResult<Favorite> {
        let stored = self
            .work
            .favorites
            .get_mut(&favorite.id)
            .ok_or_else(|| AppError::not_found(format!("Favorite {} not found", favorite.id)))?;
        stored.folder_id = favorite.folder_id;
        stored.name = favorite.name.clone();
        stored.url = favorite.url.clone();
        stored.home_rank = favorite.home_rank;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }
}
