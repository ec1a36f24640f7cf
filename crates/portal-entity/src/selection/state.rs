//! Explicit selection context, one value per user.
//!
//! Non-task pages have a single selected folder. The tasks page shows
//! several folders at once and has one "active" folder that new tasks
//! default into.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use portal_core::types::{FolderId, Page, PageMap};

/// Selected, expanded, and recently moved folders for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Selected folder on each non-task page.
    pub selected: PageMap<Option<FolderId>>,
    /// Folders shown side by side on the tasks page.
    pub selected_tasks: Vec<FolderId>,
    /// Folder new tasks are filed into.
    pub active_task_folder: Option<FolderId>,
    /// Expanded folders per page.
    pub expanded: PageMap<BTreeSet<FolderId>>,
    /// Cached root-first path to the selected folder per page.
    pub folder_paths: PageMap<Vec<FolderId>>,
    /// Last home grid folder touched by a move, highlighted once.
    pub moved_folder: Option<FolderId>,
}

impl SelectionState {
    /// Select `folder` on `page`.
    ///
    /// On the tasks page this toggles membership in the multi-selection,
    /// and deselecting the active task folder also deactivates it.
    /// Returns whether the folder is selected afterwards.
    pub fn select(&mut self, page: Page, folder: FolderId) -> bool {
        if page != Page::Tasks {
            *self.selected.get_mut(page) = Some(folder);
            return true;
        }

        if let Some(index) = self.selected_tasks.iter().position(|id| *id == folder) {
            self.selected_tasks.remove(index);
            if self.active_task_folder == Some(folder) {
                self.active_task_folder = None;
            }
            false
        } else {
            self.selected_tasks.push(folder);
            true
        }
    }

    /// Drop the selection on `page`.
    pub fn clear(&mut self, page: Page) {
        if page == Page::Tasks {
            self.selected_tasks.clear();
            self.active_task_folder = None;
        } else {
            *self.selected.get_mut(page) = None;
        }
        self.folder_paths.get_mut(page).clear();
    }

    /// The single selected folder on a non-task page.
    pub fn selected_folder(&self, page: Page) -> Option<FolderId> {
        match page {
            Page::Tasks => self.active_task_folder,
            _ => *self.selected.get(page),
        }
    }

    /// Make `folder` the active task folder, selecting it if needed.
    pub fn activate_task_folder(&mut self, folder: FolderId) {
        if !self.selected_tasks.contains(&folder) {
            self.selected_tasks.push(folder);
        }
        self.active_task_folder = Some(folder);
    }

    /// Flip the expanded flag of `folder` on `page`. Returns the new flag.
    pub fn toggle_expanded(&mut self, page: Page, folder: FolderId) -> bool {
        let expanded = self.expanded.get_mut(page);
        if expanded.remove(&folder) {
            false
        } else {
            expanded.insert(folder);
            true
        }
    }

    /// Whether `folder` is expanded on `page`.
    pub fn is_expanded(&self, page: Page, folder: FolderId) -> bool {
        self.expanded.get(page).contains(&folder)
    }

    /// Replace the cached path to the selected folder on `page`.
    pub fn set_folder_path(&mut self, page: Page, path: Vec<FolderId>) {
        *self.folder_paths.get_mut(page) = path;
    }

    /// Cached path to the selected folder on `page`.
    pub fn folder_path(&self, page: Page) -> &[FolderId] {
        self.folder_paths.get(page)
    }

    /// Remember the folder a home grid move just touched.
    pub fn mark_moved(&mut self, folder: FolderId) {
        self.moved_folder = Some(folder);
    }

    /// Read and reset the last moved folder.
    pub fn take_moved_folder(&mut self) -> Option<FolderId> {
        self.moved_folder.take()
    }

    /// Remove every reference to deleted folders.
    pub fn forget_folders(&mut self, removed: &[FolderId]) {
        for page in Page::ALL {
            let selected = self.selected.get_mut(page);
            if selected.is_some_and(|id| removed.contains(&id)) {
                *selected = None;
            }
            self.expanded.get_mut(page).retain(|id| !removed.contains(id));
            let path = self.folder_paths.get_mut(page);
            if path.iter().any(|id| removed.contains(id)) {
                path.clear();
            }
        }
        self.selected_tasks.retain(|id| !removed.contains(id));
        if self.active_task_folder.is_some_and(|id| removed.contains(&id)) {
            self.active_task_folder = None;
        }
        if self.moved_folder.is_some_and(|id| removed.contains(&id)) {
            self.moved_folder = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_replaces_on_regular_pages() {
        let mut state = SelectionState::default();
        assert!(state.select(Page::Notes, FolderId(1)));
        assert!(state.select(Page::Notes, FolderId(2)));
        assert_eq!(state.selected_folder(Page::Notes), Some(FolderId(2)));
        assert_eq!(state.selected_folder(Page::Contacts), None);
    }

    #[test]
    fn test_task_selection_toggles_and_deactivates() {
        let mut state = SelectionState::default();
        assert!(state.select(Page::Tasks, FolderId(5)));
        assert!(state.select(Page::Tasks, FolderId(6)));
        state.activate_task_folder(FolderId(5));
        assert_eq!(state.selected_folder(Page::Tasks), Some(FolderId(5)));

        assert!(!state.select(Page::Tasks, FolderId(5)));
        assert_eq!(state.selected_tasks, vec![FolderId(6)]);
        assert_eq!(state.active_task_folder, None);
    }

    #[test]
    fn test_activate_adds_to_selection() {
        let mut state = SelectionState::default();
        state.activate_task_folder(FolderId(9));
        assert_eq!(state.selected_tasks, vec![FolderId(9)]);
    }

    #[test]
    fn test_toggle_expanded() {
        let mut state = SelectionState::default();
        assert!(state.toggle_expanded(Page::Favorites, FolderId(3)));
        assert!(state.is_expanded(Page::Favorites, FolderId(3)));
        assert!(!state.is_expanded(Page::Notes, FolderId(3)));
        assert!(!state.toggle_expanded(Page::Favorites, FolderId(3)));
    }

    #[test]
    fn test_moved_folder_is_read_once() {
        let mut state = SelectionState::default();
        state.mark_moved(FolderId(4));
        assert_eq!(state.take_moved_folder(), Some(FolderId(4)));
        assert_eq!(state.take_moved_folder(), None);
    }

    #[test]
    fn test_forget_folders_clears_references() {
        let mut state = SelectionState::default();
        state.select(Page::Notes, FolderId(2));
        state.set_folder_path(Page::Notes, vec![FolderId(1), FolderId(2)]);
        state.toggle_expanded(Page::Notes, FolderId(2));
        state.activate_task_folder(FolderId(2));

        state.forget_folders(&[FolderId(2)]);
        assert_eq!(state, SelectionState::default());
    }
}
