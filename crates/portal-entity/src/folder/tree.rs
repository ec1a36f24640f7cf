//! Breadcrumb-style folder tree for a page view.

use serde::Serialize;

use portal_core::result::AppResult;
use portal_core::types::FolderId;

use super::arena::FolderArena;
use super::model::Folder;

/// One row of a rendered folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderTreeEntry {
    /// The folder shown on this row.
    pub folder: Folder,
    /// Indentation level; roots are at 0.
    pub level: usize,
}

/// The path to the selected folder plus the selected folder's children.
///
/// With no selection the tree is the list of root folders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderTree {
    /// Rows in display order.
    pub entries: Vec<FolderTreeEntry>,
    /// Whether the last level shown has children of its own.
    pub has_children: bool,
}

impl FolderTree {
    /// Build the tree for `selected` out of `arena`.
    pub fn build(arena: &FolderArena, selected: Option<FolderId>) -> AppResult<Self> {
        let Some(selected) = selected else {
            let entries: Vec<FolderTreeEntry> = arena
                .roots()
                .into_iter()
                .map(|folder| FolderTreeEntry {
                    folder: folder.clone(),
                    level: 0,
                })
                .collect();
            let has_children = !entries.is_empty();
            return Ok(Self {
                entries,
                has_children,
            });
        };

        let mut entries: Vec<FolderTreeEntry> = breadcrumbs(arena, selected)?
            .into_iter()
            .enumerate()
            .map(|(level, folder)| FolderTreeEntry {
                folder: folder.clone(),
                level,
            })
            .collect();

        let child_level = entries.len();
        let children = arena.children(selected);
        let has_children = !children.is_empty();
        entries.extend(children.into_iter().map(|folder| FolderTreeEntry {
            folder: folder.clone(),
            level: child_level,
        }));

        Ok(Self {
            entries,
            has_children,
        })
    }

    /// Ids of every folder in the tree.
    pub fn folder_ids(&self) -> Vec<FolderId> {
        self.entries.iter().map(|entry| entry.folder.id).collect()
    }
}

/// Ancestors of `selected` followed by `selected` itself, root first.
pub fn breadcrumbs(arena: &FolderArena, selected: FolderId) -> AppResult<Vec<&Folder>> {
    let mut path = arena.ancestors(selected)?;
    path.push(arena.folder(selected)?);
    Ok(path)
}
