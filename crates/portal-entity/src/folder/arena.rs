//! Folder arena: tree operations, structural validation, and editor
//! propagation over a set of folder rows addressed by id.
//!
//! Parent links are plain ids, so ancestor and descendant walks are map
//! lookups and cycle detection is "does the candidate parent's ancestor
//! chain contain the folder being moved".
//!
//! Editor grants are materialized: a grant on a root folder is copied to
//! every descendant as an inherited link, so "which folders may this user
//! edit" is a direct lookup on the join table. Every mutation that touches
//! grants is recorded as an [`EditorChange`] for the caller to persist.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_core::types::{FolderId, Page, UserId};

use super::model::{EditorLink, Folder};

/// How a user came to hold edit access on a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grant {
    /// Assigned on this folder.
    Direct,
    /// Copied down from an ancestor.
    Inherited,
}

impl Grant {
    /// Whether this grant was copied down from an ancestor.
    pub fn is_inherited(self) -> bool {
        matches!(self, Self::Inherited)
    }
}

/// A folder row together with its editor grants.
#[derive(Debug, Clone)]
pub struct FolderRecord {
    /// The folder row.
    pub folder: Folder,
    /// Users holding edit access, keyed by user.
    pub editors: BTreeMap<UserId, Grant>,
}

impl FolderRecord {
    fn new(folder: Folder) -> Self {
        Self {
            folder,
            editors: BTreeMap::new(),
        }
    }

    /// Users granted access on this folder itself.
    pub fn direct_editors(&self) -> BTreeSet<UserId> {
        self.editors
            .iter()
            .filter(|(_, grant)| !grant.is_inherited())
            .map(|(user, _)| *user)
            .collect()
    }

    /// Whether any user was granted access on this folder itself.
    pub fn has_direct_editors(&self) -> bool {
        self.editors.values().any(|grant| !grant.is_inherited())
    }

    /// Every user with a link on this folder, direct or inherited.
    pub fn editor_ids(&self) -> BTreeSet<UserId> {
        self.editors.keys().copied().collect()
    }
}

/// A single write to the editor join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorChange {
    /// Insert or upgrade a link.
    Granted {
        /// Folder receiving the link.
        folder_id: FolderId,
        /// User receiving access.
        user_id: UserId,
        /// Kind of link.
        grant: Grant,
    },
    /// Delete a link.
    Revoked {
        /// Folder losing the link.
        folder_id: FolderId,
        /// User losing access.
        user_id: UserId,
    },
}

/// Effective editors gained and lost by a reparent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditorDelta {
    /// Users who gained access to the moved subtree.
    pub added: BTreeSet<UserId>,
    /// Users who lost access to the moved subtree.
    pub removed: BTreeSet<UserId>,
}

impl EditorDelta {
    /// Whether the move left effective access unchanged.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Reject a folder that is both nested and directly shared.
pub fn validate_sharing(parent_id: Option<FolderId>, has_direct_editors: bool) -> AppResult<()> {
    if parent_id.is_some() && has_direct_editors {
        return Err(AppError::validation(
            "A folder cannot have both a parent and editors; shared folders must stay at the root",
        ));
    }
    Ok(())
}

/// An id-addressed set of folders from one page.
#[derive(Debug, Clone)]
pub struct FolderArena {
    max_depth: usize,
    nodes: HashMap<FolderId, FolderRecord>,
    changes: Vec<EditorChange>,
}

impl FolderArena {
    /// Create an empty arena allowing `max_depth` levels of nesting.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            nodes: HashMap::new(),
            changes: Vec::new(),
        }
    }

    /// Build an arena from folder rows and editor join rows.
    ///
    /// Links pointing at folders outside the arena are ignored.
    pub fn from_rows(
        max_depth: usize,
        folders: impl IntoIterator<Item = Folder>,
        links: impl IntoIterator<Item = EditorLink>,
    ) -> Self {
        let mut arena = Self::new(max_depth);
        for folder in folders {
            arena.insert(folder);
        }
        for link in links {
            if let Some(record) = arena.nodes.get_mut(&link.folder_id) {
                let grant = if link.inherited {
                    Grant::Inherited
                } else {
                    Grant::Direct
                };
                record.editors.insert(link.user_id, grant);
            }
        }
        arena
    }

    /// Add or replace a folder row, keeping any grants already loaded.
    pub fn insert(&mut self, folder: Folder) {
        match self.nodes.get_mut(&folder.id) {
            Some(record) => record.folder = folder,
            None => {
                self.nodes.insert(folder.id, FolderRecord::new(folder));
            }
        }
    }

    /// Number of folders in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no folders.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Configured nesting limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Look up a folder record.
    pub fn get(&self, id: FolderId) -> Option<&FolderRecord> {
        self.nodes.get(&id)
    }

    /// Look up a folder row, failing with not-found.
    pub fn folder(&self, id: FolderId) -> AppResult<&Folder> {
        self.record(id).map(|record| &record.folder)
    }

    fn record(&self, id: FolderId) -> AppResult<&FolderRecord> {
        self.nodes
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    fn record_mut(&mut self, id: FolderId) -> AppResult<&mut FolderRecord> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    /// All folder rows, in no particular order.
    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.nodes.values().map(|record| &record.folder)
    }

    /// Root folders (and folders whose parent is not loaded), by name.
    pub fn roots(&self) -> Vec<&Folder> {
        let mut roots: Vec<&Folder> = self
            .folders()
            .filter(|f| f.parent_id.is_none_or(|p| !self.nodes.contains_key(&p)))
            .collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        roots
    }

    /// Direct children of a folder, by name.
    pub fn children(&self, id: FolderId) -> Vec<&Folder> {
        let mut children: Vec<&Folder> = self
            .folders()
            .filter(|f| f.parent_id == Some(id))
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        children
    }

    fn child_ids(&self, id: FolderId) -> Vec<FolderId> {
        let mut ids: Vec<FolderId> = self
            .folders()
            .filter(|f| f.parent_id == Some(id))
            .map(|f| f.id)
            .collect();
        ids.sort();
        ids
    }

    /// Walk parent links upward. Returns the chain root-first, excluding
    /// the folder itself.
    pub fn ancestors(&self, id: FolderId) -> AppResult<Vec<&Folder>> {
        let mut chain = Vec::new();
        let mut current = self.folder(id)?.parent_id;
        while let Some(parent_id) = current {
            let Some(record) = self.nodes.get(&parent_id) else {
                break;
            };
            chain.push(&record.folder);
            if chain.len() > self.nodes.len() {
                return Err(AppError::internal(format!(
                    "Folder {id} has a cyclic parent chain"
                )));
            }
            current = record.folder.parent_id;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Ids of [`FolderArena::ancestors`].
    pub fn ancestor_ids(&self, id: FolderId) -> AppResult<Vec<FolderId>> {
        Ok(self.ancestors(id)?.into_iter().map(|f| f.id).collect())
    }

    /// Every folder below `id`, parents before their children.
    pub fn descendants(&self, id: FolderId) -> Vec<FolderId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for child in self.child_ids(current) {
                if seen.insert(child) {
                    out.push(child);
                    queue.push_back(child);
                }
            }
        }
        out
    }

    /// Nesting level of a folder; roots are at depth 0.
    pub fn depth(&self, id: FolderId) -> AppResult<usize> {
        Ok(self.ancestors(id)?.len())
    }

    /// Number of levels below a folder (0 for a leaf).
    fn subtree_height(&self, id: FolderId) -> usize {
        let mut height = 0;
        let mut frontier = vec![id];
        let mut seen = HashSet::from([id]);
        loop {
            let next: Vec<FolderId> = frontier
                .iter()
                .flat_map(|f| self.child_ids(*f))
                .filter(|c| seen.insert(*c))
                .collect();
            if next.is_empty() {
                return height;
            }
            height += 1;
            frontier = next;
        }
    }

    /// Union of the editors linked to a folder and to each of its ancestors.
    pub fn inherited_editors(&self, id: FolderId) -> AppResult<BTreeSet<UserId>> {
        let mut editors = self.record(id)?.editor_ids();
        for ancestor in self.ancestor_ids(id)? {
            editors.extend(self.record(ancestor)?.editor_ids());
        }
        Ok(editors)
    }

    /// Editors a folder should hold given its current parent chain:
    /// its own direct grants plus everything linked above it.
    fn granted_editors(&self, id: FolderId) -> AppResult<BTreeSet<UserId>> {
        let mut editors = self.record(id)?.direct_editors();
        for ancestor in self.ancestor_ids(id)? {
            editors.extend(self.record(ancestor)?.editor_ids());
        }
        Ok(editors)
    }

    /// Check that `candidate` may become the parent of `moving` (or of a
    /// new folder when `moving` is `None`) owned by `owner` on `page`.
    pub fn check_parent(
        &self,
        moving: Option<FolderId>,
        candidate: FolderId,
        owner: UserId,
        page: Page,
    ) -> AppResult<()> {
        let parent = self
            .nodes
            .get(&candidate)
            .map(|record| &record.folder)
            .ok_or_else(|| AppError::not_found(format!("Parent folder {candidate} not found")))?;

        if parent.page != page {
            return Err(AppError::validation(
                "A folder's parent must be on the same page",
            ));
        }
        if parent.user_id != owner {
            return Err(AppError::validation(
                "A folder's parent must belong to the same owner",
            ));
        }

        let parent_chain = self.ancestor_ids(candidate)?;
        if let Some(moving) = moving {
            if moving == candidate {
                return Err(AppError::validation("Cannot move a folder into itself"));
            }
            if parent_chain.contains(&moving) {
                return Err(AppError::validation(
                    "Cannot move a folder into one of its descendants",
                ));
            }
        }

        let height = moving.map(|id| self.subtree_height(id)).unwrap_or(0);
        if parent_chain.len() + 1 + height >= self.max_depth {
            return Err(AppError::validation(format!(
                "Folders can be nested at most {} levels deep",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Give a newly inserted child the grants of its parent chain.
    pub fn adopt_parent_grants(&mut self, id: FolderId) -> AppResult<()> {
        let Some(parent_id) = self.folder(id)?.parent_id else {
            return Ok(());
        };
        if !self.nodes.contains_key(&parent_id) {
            return Ok(());
        }
        for user in self.inherited_editors(parent_id)? {
            self.add_inherited(id, user);
        }
        Ok(())
    }

    /// Move a folder under `new_parent` (or to the root), then bring the
    /// inherited grants of the folder and its subtree in line with the new
    /// parent chain.
    pub fn reparent(
        &mut self,
        id: FolderId,
        new_parent: Option<FolderId>,
    ) -> AppResult<EditorDelta> {
        let record = self.record(id)?;
        let owner = record.folder.user_id;
        let page = record.folder.page;
        let old_parent = record.folder.parent_id;
        let shared = record.has_direct_editors();

        if let Some(parent_id) = new_parent {
            self.check_parent(Some(id), parent_id, owner, page)?;
            validate_sharing(new_parent, shared)?;
        }
        if old_parent == new_parent {
            return Ok(EditorDelta::default());
        }

        let before = self.inherited_editors(id)?;
        self.record_mut(id)?.folder.parent_id = new_parent;
        let after = self.granted_editors(id)?;

        let delta = EditorDelta {
            added: after.difference(&before).copied().collect(),
            removed: before.difference(&after).copied().collect(),
        };

        let mut subtree = vec![id];
        subtree.extend(self.descendants(id));
        for folder_id in subtree {
            for user in &delta.removed {
                self.drop_inherited(folder_id, *user);
            }
            for user in &delta.added {
                self.add_inherited(folder_id, *user);
            }
        }

        tracing::debug!(
            folder_id = %id,
            added = delta.added.len(),
            removed = delta.removed.len(),
            "Reparented folder"
        );
        Ok(delta)
    }

    /// Grant `user` edit access to a root folder and its subtree.
    ///
    /// Returns `false` when the user already held a direct grant.
    pub fn grant(&mut self, id: FolderId, user: UserId) -> AppResult<bool> {
        let record = self.record(id)?;
        if record.folder.user_id == user {
            return Err(AppError::validation(
                "The owner of a folder cannot be added as its editor",
            ));
        }
        if !record.folder.is_root() {
            return Err(AppError::validation(
                "Only root folders can be shared; nested folders inherit editors from their root",
            ));
        }
        if record.editors.get(&user) == Some(&Grant::Direct) {
            return Ok(false);
        }

        self.record_mut(id)?.editors.insert(user, Grant::Direct);
        self.changes.push(EditorChange::Granted {
            folder_id: id,
            user_id: user,
            grant: Grant::Direct,
        });
        for descendant in self.descendants(id) {
            self.add_inherited(descendant, user);
        }
        Ok(true)
    }

    /// Withdraw a direct grant and remove the copies below it that no
    /// other ancestor still justifies.
    pub fn revoke(&mut self, id: FolderId, user: UserId) -> AppResult<()> {
        let record = self.record_mut(id)?;
        if record.editors.get(&user) != Some(&Grant::Direct) {
            return Err(AppError::not_found(format!(
                "User {user} is not an editor of folder {id}"
            )));
        }
        record.editors.remove(&user);
        self.changes.push(EditorChange::Revoked {
            folder_id: id,
            user_id: user,
        });

        for descendant in self.descendants(id) {
            let still_granted = match self.folder(descendant)?.parent_id {
                Some(parent_id) if self.nodes.contains_key(&parent_id) => {
                    self.inherited_editors(parent_id)?.contains(&user)
                }
                _ => false,
            };
            if !still_granted {
                self.drop_inherited(descendant, user);
            }
        }
        Ok(())
    }

    /// Remove a folder and its subtree. Returns the removed ids, parents first.
    pub fn remove_subtree(&mut self, id: FolderId) -> AppResult<Vec<FolderId>> {
        self.record(id)?;
        let mut removed = vec![id];
        removed.extend(self.descendants(id));
        for folder_id in &removed {
            self.nodes.remove(folder_id);
        }
        Ok(removed)
    }

    /// Drain the grant writes recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<EditorChange> {
        std::mem::take(&mut self.changes)
    }

    fn add_inherited(&mut self, folder_id: FolderId, user: UserId) {
        let Some(record) = self.nodes.get_mut(&folder_id) else {
            return;
        };
        if record.folder.user_id == user || record.editors.contains_key(&user) {
            return;
        }
        record.editors.insert(user, Grant::Inherited);
        self.changes.push(EditorChange::Granted {
            folder_id,
            user_id: user,
            grant: Grant::Inherited,
        });
    }

    fn drop_inherited(&mut self, folder_id: FolderId, user: UserId) {
        let Some(record) = self.nodes.get_mut(&folder_id) else {
            return;
        };
        if record.editors.get(&user) == Some(&Grant::Inherited) {
            record.editors.remove(&user);
            self.changes.push(EditorChange::Revoked {
                folder_id,
                user_id: user,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const OWNER: UserId = UserId(1);
    const FRIEND: UserId = UserId(2);

    fn folder(id: i64, name: &str, parent: Option<i64>) -> Folder {
        let now = Utc::now();
        Folder {
            id: FolderId(id),
            user_id: OWNER,
            page: Page::Notes,
            name: name.to_string(),
            parent_id: parent.map(FolderId),
            home_column: None,
            home_rank: None,
            selected: None,
            active: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A (1) -> B (2) -> C (3), plus roots F (10) and R (20).
    fn sample() -> FolderArena {
        FolderArena::from_rows(
            3,
            vec![
                folder(1, "A", None),
                folder(2, "B", Some(1)),
                folder(3, "C", Some(2)),
                folder(10, "F", None),
                folder(20, "R", None),
            ],
            Vec::new(),
        )
    }

    fn names(folders: &[&Folder]) -> Vec<String> {
        folders.iter().map(|f| f.name.clone()).collect()
    }

    #[test]
    fn test_ancestors_are_root_first() {
        let arena = sample();
        assert_eq!(names(&arena.ancestors(FolderId(3)).unwrap()), vec!["A", "B"]);
        assert!(arena.ancestors(FolderId(1)).unwrap().is_empty());
        assert_eq!(arena.depth(FolderId(3)).unwrap(), 2);
    }

    #[test]
    fn test_descendants_lists_whole_subtree() {
        let arena = sample();
        assert_eq!(
            arena.descendants(FolderId(1)),
            vec![FolderId(2), FolderId(3)]
        );
        assert!(arena.descendants(FolderId(3)).is_empty());
    }

    #[test]
    fn test_roots_and_children_sorted_by_name() {
        let arena = sample();
        assert_eq!(names(&arena.roots()), vec!["A", "F", "R"]);
        assert_eq!(names(&arena.children(FolderId(1))), vec!["B"]);
    }

    #[test]
    fn test_third_level_cannot_take_children() {
        let arena = sample();
        let err = arena
            .check_parent(None, FolderId(3), OWNER, Page::Notes)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.message.contains("at most 3 levels"));
        assert!(
            arena
                .check_parent(None, FolderId(2), OWNER, Page::Notes)
                .is_ok()
        );
    }

    #[test]
    fn test_moving_subtree_respects_depth_cap() {
        let mut arena = sample();
        // F gets a child, then F (height 1) cannot go under B (depth 1).
        arena.insert(folder(11, "G", Some(10)));
        let err = arena.reparent(FolderId(10), Some(FolderId(2))).unwrap_err();
        assert!(err.is_validation());
        assert!(arena.reparent(FolderId(10), Some(FolderId(1))).is_ok());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut arena = sample();
        let err = arena.reparent(FolderId(1), Some(FolderId(2))).unwrap_err();
        assert!(err.message.contains("descendants"));
        let err = arena.reparent(FolderId(1), Some(FolderId(1))).unwrap_err();
        assert!(err.message.contains("itself"));
        assert_eq!(arena.folder(FolderId(1)).unwrap().parent_id, None);
    }

    #[test]
    fn test_parent_on_other_page_is_rejected() {
        let mut arena = sample();
        let mut other = folder(30, "Elsewhere", None);
        other.page = Page::Tasks;
        arena.insert(other);
        let err = arena.reparent(FolderId(20), Some(FolderId(30))).unwrap_err();
        assert!(err.message.contains("same page"));
    }

    #[test]
    fn test_shared_root_cannot_be_nested() {
        let mut arena = sample();
        arena.grant(FolderId(10), FRIEND).unwrap();
        let err = arena.reparent(FolderId(10), Some(FolderId(20))).unwrap_err();
        assert!(err.is_validation());
        assert!(arena.folder(FolderId(10)).unwrap().is_root());
    }

    #[test]
    fn test_nested_folder_cannot_be_shared() {
        let mut arena = sample();
        let err = arena.grant(FolderId(2), FRIEND).unwrap_err();
        assert!(err.is_validation());
        assert!(arena.take_changes().is_empty());
    }

    #[test]
    fn test_owner_cannot_be_editor() {
        let mut arena = sample();
        assert!(arena.grant(FolderId(1), OWNER).is_err());
    }

    #[test]
    fn test_grant_reaches_descendants() {
        let mut arena = sample();
        assert!(arena.grant(FolderId(1), FRIEND).unwrap());
        assert!(!arena.grant(FolderId(1), FRIEND).unwrap());
        let c = arena.get(FolderId(3)).unwrap();
        assert_eq!(c.editors.get(&FRIEND), Some(&Grant::Inherited));
        assert_eq!(arena.take_changes().len(), 3);
    }

    #[test]
    fn test_revoke_clears_descendants() {
        let mut arena = sample();
        arena.grant(FolderId(1), FRIEND).unwrap();
        arena.take_changes();
        arena.revoke(FolderId(1), FRIEND).unwrap();
        assert!(arena.get(FolderId(3)).unwrap().editors.is_empty());
        assert_eq!(arena.take_changes().len(), 3);
        assert!(arena.revoke(FolderId(1), FRIEND).unwrap_err().is_not_found());
    }

    #[test]
    fn test_move_out_and_back_under_shared_root() {
        let mut arena = sample();
        arena.insert(folder(12, "G", Some(10)));
        arena.grant(FolderId(10), FRIEND).unwrap();
        assert!(
            arena
                .inherited_editors(FolderId(12))
                .unwrap()
                .contains(&FRIEND)
        );

        let delta = arena.reparent(FolderId(12), Some(FolderId(20))).unwrap();
        assert_eq!(delta.removed, BTreeSet::from([FRIEND]));
        assert!(
            !arena
                .inherited_editors(FolderId(12))
                .unwrap()
                .contains(&FRIEND)
        );

        let delta = arena.reparent(FolderId(12), Some(FolderId(10))).unwrap();
        assert_eq!(delta.added, BTreeSet::from([FRIEND]));
        assert_eq!(
            arena.get(FolderId(12)).unwrap().editors.get(&FRIEND),
            Some(&Grant::Inherited)
        );
    }

    #[test]
    fn test_move_to_root_drops_inherited_grants() {
        let mut arena = sample();
        arena.grant(FolderId(1), FRIEND).unwrap();
        let delta = arena.reparent(FolderId(2), None).unwrap();
        assert_eq!(delta.removed, BTreeSet::from([FRIEND]));
        assert!(arena.get(FolderId(2)).unwrap().editors.is_empty());
        assert!(arena.get(FolderId(3)).unwrap().editors.is_empty());
    }

    #[test]
    fn test_new_child_adopts_parent_grants() {
        let mut arena = sample();
        arena.grant(FolderId(1), FRIEND).unwrap();
        arena.take_changes();
        arena.insert(folder(4, "D", Some(1)));
        arena.adopt_parent_grants(FolderId(4)).unwrap();
        assert_eq!(
            arena.take_changes(),
            vec![EditorChange::Granted {
                folder_id: FolderId(4),
                user_id: FRIEND,
                grant: Grant::Inherited,
            }]
        );
    }

    #[test]
    fn test_remove_subtree() {
        let mut arena = sample();
        let removed = arena.remove_subtree(FolderId(2)).unwrap();
        assert_eq!(removed, vec![FolderId(2), FolderId(3)]);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_validate_sharing() {
        assert!(validate_sharing(Some(FolderId(1)), true).is_err());
        assert!(validate_sharing(Some(FolderId(1)), false).is_ok());
        assert!(validate_sharing(None, true).is_ok());
    }
}
