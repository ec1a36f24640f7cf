//! Folder sharing: direct editor grants on root folders.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use portal_core::config::HomeConfig;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{FolderId, UserId};
use portal_database::PortalStore;

use super::{load_arena, owned_folder};
use crate::context::RequestContext;

/// One user with edit access to a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderEditor {
    /// The editor.
    pub user_id: UserId,
    /// True when access comes from an ancestor rather than this folder.
    pub inherited: bool,
}

/// Grants and revokes edit access.
#[derive(Clone)]
pub struct SharingService {
    store: Arc<dyn PortalStore>,
    home: HomeConfig,
}

impl SharingService {
    /// Creates a new sharing service.
    pub fn new(store: Arc<dyn PortalStore>, home: HomeConfig) -> Self {
        Self { store, home }
    }

    /// Editors of a folder the caller owns.
    pub async fn editors(&self, ctx: &RequestContext, id: FolderId) -> AppResult<Vec<FolderEditor>> {
        let mut tx = self.store.begin().await?;
        let folder = owned_folder(tx.as_mut(), ctx.user_id, id).await?;
        let arena = load_arena(
            tx.as_mut(),
            ctx.user_id,
            folder.page,
            self.home.max_folder_depth,
        )
        .await?;

        let record = arena
            .get(id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        Ok(record
            .editors
            .iter()
            .map(|(user_id, grant)| FolderEditor {
                user_id: *user_id,
                inherited: grant.is_inherited(),
            })
            .collect())
    }

    /// Share a root folder with `editor`. Every descendant inherits the grant.
    ///
    /// Returns `false` when the user already held a direct grant.
    pub async fn add_editor(
        &self,
        ctx: &RequestContext,
        id: FolderId,
        editor: UserId,
    ) -> AppResult<bool> {
        let mut tx = self.store.begin().await?;
        tx.lock_owner(ctx.user_id).await?;
        let folder = owned_folder(tx.as_mut(), ctx.user_id, id).await?;
        if tx.find_user(editor).await?.is_none() {
            return Err(AppError::not_found(format!("User {editor} not found")));
        }

        let mut arena = load_arena(
            tx.as_mut(),
            ctx.user_id,
            folder.page,
            self.home.max_folder_depth,
        )
        .await?;
        let granted = arena.grant(id, editor)?;
        let changes = arena.take_changes();
        tx.apply_editor_changes(&changes).await?;
        tx.commit().await?;

        if granted {
            info!(
                user_id = %ctx.user_id,
                folder_id = %id,
                editor_id = %editor,
                links = changes.len(),
                "Editor added"
            );
        }
        Ok(granted)
    }

    /// Withdraw `editor`'s direct grant and the copies below it.
    pub async fn remove_editor(
        &self,
        ctx: &RequestContext,
        id: FolderId,
        editor: UserId,
    ) -> AppResult<()> {
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
        arena.revoke(id, editor)?;
        tx.apply_editor_changes(&arena.take_changes()).await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %id,
            editor_id = %editor,
            "Editor removed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use portal_core::types::Page;
    use portal_database::MemoryStore;

    use super::*;
    use crate::folder::{CreateFolderRequest, FolderService};

    async fn setup() -> (FolderService, SharingService, RequestContext, UserId) {
        let store: Arc<dyn PortalStore> = Arc::new(MemoryStore::new());
        let mut tx = store.begin().await.unwrap();
        let owner = tx.insert_user("alice").await.unwrap();
        let friend = tx.insert_user("bob").await.unwrap();
        tx.commit().await.unwrap();
        let home = HomeConfig::default();
        (
            FolderService::new(Arc::clone(&store), home.clone()),
            SharingService::new(store, home),
            RequestContext::new(owner.id, owner.username),
            friend.id,
        )
    }

    fn folder(name: &str, parent_id: Option<FolderId>) -> CreateFolderRequest {
        CreateFolderRequest {
            page: Page::Contacts,
            name: name.into(),
            parent_id,
            home_column: None,
        }
    }

    #[tokio::test]
    async fn test_grant_reaches_existing_and_new_children() {
        let (folders, sharing, ctx, friend) = setup().await;
        let root = folders.create_folder(&ctx, folder("Root", None)).await.unwrap();
        let old_child = folders
            .create_folder(&ctx, folder("Old", Some(root.id)))
            .await
            .unwrap();

        assert!(sharing.add_editor(&ctx, root.id, friend).await.unwrap());
        assert!(!sharing.add_editor(&ctx, root.id, friend).await.unwrap());

        let new_child = folders
            .create_folder(&ctx, folder("New", Some(root.id)))
            .await
            .unwrap();

        let expected = vec![FolderEditor {
            user_id: friend,
            inherited: true,
        }];
        assert_eq!(sharing.editors(&ctx, old_child.id).await.unwrap(), expected);
        assert_eq!(sharing.editors(&ctx, new_child.id).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_nested_folder_cannot_be_shared() {
        let (folders, sharing, ctx, friend) = setup().await;
        let root = folders.create_folder(&ctx, folder("Root", None)).await.unwrap();
        let child = folders
            .create_folder(&ctx, folder("Child", Some(root.id)))
            .await
            .unwrap();
        let err = sharing.add_editor(&ctx, child.id, friend).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_remove_editor() {
        let (folders, sharing, ctx, friend) = setup().await;
        let root = folders.create_folder(&ctx, folder("Root", None)).await.unwrap();
        let child = folders
            .create_folder(&ctx, folder("Child", Some(root.id)))
            .await
            .unwrap();
        sharing.add_editor(&ctx, root.id, friend).await.unwrap();
        sharing.remove_editor(&ctx, root.id, friend).await.unwrap();

        assert!(sharing.editors(&ctx, child.id).await.unwrap().is_empty());
        let err = sharing.remove_editor(&ctx, root.id, friend).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_editor_is_not_found() {
        let (folders, sharing, ctx, _) = setup().await;
        let root = folders.create_folder(&ctx, folder("Root", None)).await.unwrap();
        let err = sharing.add_editor(&ctx, root.id, UserId(77)).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
