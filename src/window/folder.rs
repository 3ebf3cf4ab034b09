use serde::{Deserialize, Serialize};

use super::{FolderId, GeometryPatch, WindowId, ZIndex};
use crate::layout::{Point, Rect, Size};

/// Tabbed grouping of windows. `apps` is tab order; `active_app_id` is the
/// tab whose content is rendered and is always one of `apps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub apps: Vec<WindowId>,
    pub active_app_id: WindowId,
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub z_index: ZIndex,
}

impl Folder {
    /// `None` when `apps` is empty. The size is clamped to the minimum
    /// window footprint.
    pub fn new(id: FolderId, apps: Vec<WindowId>, rect: Rect, z_index: ZIndex) -> Option<Self> {
        let active_app_id = apps.first()?.clone();
        Some(Self {
            id,
            apps,
            active_app_id,
            position: rect.position(),
            size: rect.size().clamp_min(),
            z_index,
        })
    }

    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    pub fn contains(&self, id: &WindowId) -> bool {
        self.apps.contains(id)
    }

    pub fn push_member(&mut self, id: WindowId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.apps.push(id);
        true
    }

    /// Remove a member, moving the active tab to the first remaining member
    /// when needed. Returns `true` if the folder is now empty.
    pub fn remove_member(&mut self, id: &WindowId) -> bool {
        self.apps.retain(|member| member != id);
        if &self.active_app_id == id
            && let Some(first) = self.apps.first()
        {
            self.active_app_id = first.clone();
        }
        self.apps.is_empty()
    }

    pub fn set_active(&mut self, id: &WindowId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active_app_id = id.clone();
        true
    }

    pub fn apply_geometry(&mut self, patch: GeometryPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size.clamp_min();
        }
    }
}

/// Folders in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderRegistry {
    folders: Vec<Folder>,
}

impl FolderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Folder> {
        self.folders.iter()
    }

    pub fn get(&self, id: &FolderId) -> Option<&Folder> {
        self.folders.iter().find(|folder| &folder.id == id)
    }

    pub fn get_mut(&mut self, id: &FolderId) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|folder| &folder.id == id)
    }

    pub fn insert(&mut self, folder: Folder) {
        if let Some(existing) = self.get_mut(&folder.id) {
            *existing = folder;
        } else {
            self.folders.push(folder);
        }
    }

    pub fn remove(&mut self, id: &FolderId) -> Option<Folder> {
        let idx = self.folders.iter().position(|folder| &folder.id == id)?;
        Some(self.folders.remove(idx))
    }

    pub fn clear(&mut self) -> Vec<Folder> {
        std::mem::take(&mut self.folders)
    }

    pub fn retain(&mut self, keep: impl FnMut(&mut Folder) -> bool) {
        self.folders.retain_mut(keep);
    }

    pub fn folder_of(&self, window: &WindowId) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.contains(window))
    }

    pub fn max_z(&self) -> ZIndex {
        self.folders.iter().map(|f| f.z_index).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(apps: &[&str]) -> Folder {
        Folder::new(
            FolderId::new("folder-1"),
            apps.iter().map(|id| WindowId::new(*id)).collect(),
            Rect::new(0.0, 0.0, 400.0, 300.0),
            1,
        )
        .unwrap()
    }

    #[test]
    fn empty_member_list_is_rejected() {
        assert!(Folder::new(FolderId::new("f"), Vec::new(), Rect::default(), 0).is_none());
    }

    #[test]
    fn undersized_rect_is_clamped() {
        let f = Folder::new(
            FolderId::new("f"),
            vec![WindowId::new("a")],
            Rect::new(10.0, 20.0, 120.0, 90.0),
            1,
        )
        .unwrap();
        assert_eq!(f.rect(), Rect::new(10.0, 20.0, 200.0, 150.0));
    }

    #[test]
    fn first_member_is_active() {
        let f = folder(&["a", "b"]);
        assert_eq!(f.active_app_id, WindowId::new("a"));
    }

    #[test]
    fn removing_active_member_promotes_first_remaining() {
        let mut f = folder(&["a", "b", "c"]);
        f.set_active(&WindowId::new("b"));
        assert!(!f.remove_member(&WindowId::new("b")));
        assert_eq!(f.active_app_id, WindowId::new("a"));
        assert!(!f.remove_member(&WindowId::new("a")));
        assert!(f.remove_member(&WindowId::new("c")));
    }

    #[test]
    fn set_active_rejects_non_members() {
        let mut f = folder(&["a"]);
        assert!(!f.set_active(&WindowId::new("zzz")));
        assert_eq!(f.active_app_id, WindowId::new("a"));
    }

    #[test]
    fn push_member_is_idempotent() {
        let mut f = folder(&["a"]);
        assert!(f.push_member(WindowId::new("b")));
        assert!(!f.push_member(WindowId::new("b")));
        assert_eq!(f.apps.len(), 2);
    }

    #[test]
    fn wire_format_uses_apps_and_active_app_id() {
        let value = serde_json::to_value(folder(&["a", "b"])).unwrap();
        assert_eq!(value["apps"], serde_json::json!(["a", "b"]));
        assert_eq!(value["activeAppId"], "a");
    }

    #[test]
    fn registry_lookup_by_member() {
        let mut reg = FolderRegistry::new();
        reg.insert(folder(&["a", "b"]));
        assert!(reg.folder_of(&WindowId::new("b")).is_some());
        assert!(reg.folder_of(&WindowId::new("c")).is_none());
        assert!(reg.remove(&FolderId::new("folder-1")).is_some());
        assert!(reg.is_empty());
    }
}
