//! Workspace presets: named arrangements of window and folder geometry.
//!
//! Built-in presets are compiled in and read-only. Custom presets live in
//! their own storage blob alongside a lightweight metadata list used by menus.
//! Both blobs are written by other tools too, so loading is entry-by-entry and
//! anything malformed is skipped rather than failing the whole blob.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{CUSTOM_WORKSPACES_STORAGE_KEY, WORKSPACE_METADATA_STORAGE_KEY};
use crate::error::StoreResult;
use crate::layout::{LayoutType, Point, Rect, Size};
use crate::persistence::PersistenceStore;
use crate::window::WindowId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceAppConfig {
    pub id: WindowId,
    pub position: Point,
    pub size: Size,
}

impl WorkspaceAppConfig {
    pub fn new(id: &str, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: WindowId::new(id),
            position: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderPreset {
    pub apps: Vec<WindowId>,
    #[serde(default)]
    pub active_app_id: Option<WindowId>,
    pub position: Point,
    pub size: Size,
}

impl FolderPreset {
    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    pub apps: Vec<WorkspaceAppConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<FolderPreset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_type: Option<LayoutType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Menu entry for a custom workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMeta {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
}

pub const BUILTIN_WORKSPACE_KEYS: [&str; 4] = ["nexus", "main", "interview", "create"];

pub fn builtin_workspace(key: &str) -> Option<WorkspaceConfig> {
    let apps = match key {
        "nexus" => [
            WorkspaceAppConfig::new("hacker-news", 100.0, 100.0, 800.0, 500.0),
            WorkspaceAppConfig::new("todo-list", 300.0, 200.0, 600.0, 700.0),
        ],
        "main" => [
            WorkspaceAppConfig::new("hacker-news", 50.0, 50.0, 900.0, 600.0),
            WorkspaceAppConfig::new("todo-list", 400.0, 100.0, 500.0, 800.0),
        ],
        "interview" => [
            WorkspaceAppConfig::new("hacker-news", 200.0, 150.0, 700.0, 450.0),
            WorkspaceAppConfig::new("todo-list", 500.0, 300.0, 550.0, 650.0),
        ],
        "create" => [
            WorkspaceAppConfig::new("hacker-news", 150.0, 200.0, 750.0, 550.0),
            WorkspaceAppConfig::new("todo-list", 250.0, 100.0, 650.0, 750.0),
        ],
        _ => return None,
    };
    Some(WorkspaceConfig {
        apps: apps.into(),
        ..WorkspaceConfig::default()
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceLibrary {
    custom: BTreeMap<String, WorkspaceConfig>,
    metadata: Vec<WorkspaceMeta>,
}

impl WorkspaceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read both custom blobs. Absent or unreadable blobs give an empty
    /// library; individual malformed entries are dropped.
    pub fn load(store: &PersistenceStore) -> Self {
        let mut library = Self::new();

        match store.read_json::<Value>(CUSTOM_WORKSPACES_STORAGE_KEY) {
            Ok(Some(Value::Object(entries))) => {
                for (key, raw) in entries {
                    match serde_json::from_value::<WorkspaceConfig>(raw) {
                        Ok(config) => {
                            library.custom.insert(key, config);
                        }
                        Err(err) => {
                            tracing::warn!(workspace = %key, error = %err, "skipping malformed workspace");
                        }
                    }
                }
            }
            Ok(Some(_)) => tracing::warn!("custom workspace blob is not an object; ignoring"),
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "failed to read custom workspaces"),
        }

        match store.read_json::<Value>(WORKSPACE_METADATA_STORAGE_KEY) {
            Ok(Some(Value::Array(entries))) => {
                library.metadata = entries
                    .into_iter()
                    .filter_map(|raw| serde_json::from_value::<WorkspaceMeta>(raw).ok())
                    .collect();
            }
            Ok(Some(_)) => tracing::warn!("workspace metadata is not a list; ignoring"),
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "failed to read workspace metadata"),
        }

        library
    }

    /// Custom presets shadow built-ins of the same key.
    pub fn resolve(&self, key: &str) -> Option<WorkspaceConfig> {
        self.custom
            .get(key)
            .cloned()
            .or_else(|| builtin_workspace(key))
    }

    pub fn custom(&self, key: &str) -> Option<&WorkspaceConfig> {
        self.custom.get(key)
    }

    pub fn metadata(&self) -> &[WorkspaceMeta] {
        &self.metadata
    }

    /// Every key `resolve` can answer, built-ins first.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = BUILTIN_WORKSPACE_KEYS.iter().map(|k| k.to_string()).collect();
        for key in self.custom.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// Record a custom preset and write both blobs immediately.
    pub fn save(
        &mut self,
        store: &mut PersistenceStore,
        key: &str,
        name: &str,
        config: WorkspaceConfig,
    ) -> StoreResult<()> {
        self.custom.insert(key.to_string(), config);
        let meta = WorkspaceMeta {
            key: key.to_string(),
            name: name.to_string(),
            emoji: None,
            icon_name: None,
        };
        match self.metadata.iter_mut().find(|m| m.key == key) {
            Some(existing) => {
                existing.name = meta.name;
            }
            None => self.metadata.push(meta),
        }
        store.write_json(CUSTOM_WORKSPACES_STORAGE_KEY, &self.custom)?;
        store.write_json(WORKSPACE_METADATA_STORAGE_KEY, &self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryBackend;

    fn store_with(backend: &MemoryBackend) -> PersistenceStore {
        PersistenceStore::new(Box::new(backend.clone()))
    }

    #[test]
    fn builtins_cover_known_keys() {
        for key in BUILTIN_WORKSPACE_KEYS {
            let preset = builtin_workspace(key).unwrap();
            assert_eq!(preset.apps.len(), 2);
        }
        assert!(builtin_workspace("nope").is_none());
        let main = builtin_workspace("main").unwrap();
        assert_eq!(main.apps[1].rect(), Rect::new(400.0, 100.0, 500.0, 800.0));
    }

    #[test]
    fn missing_blobs_give_empty_library() {
        let backend = MemoryBackend::new();
        let library = WorkspaceLibrary::load(&store_with(&backend));
        assert_eq!(library, WorkspaceLibrary::new());
        assert!(library.resolve("nexus").is_some());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let backend = MemoryBackend::new();
        backend.seed(
            CUSTOM_WORKSPACES_STORAGE_KEY,
            r#"{
                "good": {"apps": [{"id": "todo-list", "position": {"x": 1, "y": 2}, "size": {"width": 300, "height": 200}}], "layoutType": "splits"},
                "bad": {"apps": "nope"}
            }"#,
        );
        backend.seed(
            WORKSPACE_METADATA_STORAGE_KEY,
            r#"[{"key": "good", "name": "Good", "emoji": "*"}, {"name": "no key"}]"#,
        );
        let library = WorkspaceLibrary::load(&store_with(&backend));
        let good = library.custom("good").unwrap();
        assert_eq!(good.layout_type, Some(LayoutType::Thirds));
        assert!(library.custom("bad").is_none());
        assert_eq!(library.metadata().len(), 1);
    }

    #[test]
    fn non_object_blob_is_ignored() {
        let backend = MemoryBackend::new();
        backend.seed(CUSTOM_WORKSPACES_STORAGE_KEY, "[1, 2, 3]");
        backend.seed(WORKSPACE_METADATA_STORAGE_KEY, "{garbage");
        let library = WorkspaceLibrary::load(&store_with(&backend));
        assert_eq!(library, WorkspaceLibrary::new());
    }

    #[test]
    fn custom_shadows_builtin_and_save_is_immediate() {
        let backend = MemoryBackend::new();
        let mut store = store_with(&backend);
        let mut library = WorkspaceLibrary::new();
        let preset = WorkspaceConfig {
            apps: vec![WorkspaceAppConfig::new("todo-list", 0.0, 0.0, 300.0, 300.0)],
            ..WorkspaceConfig::default()
        };
        library.save(&mut store, "main", "Mine", preset.clone()).unwrap();
        library.save(&mut store, "main", "Renamed", preset.clone()).unwrap();

        assert_eq!(library.resolve("main"), Some(preset));
        assert_eq!(backend.writes_for(CUSTOM_WORKSPACES_STORAGE_KEY), 2);
        assert_eq!(library.metadata().len(), 1);
        assert_eq!(library.metadata()[0].name, "Renamed");

        let reloaded = WorkspaceLibrary::load(&store);
        assert_eq!(reloaded, library);
        assert_eq!(reloaded.keys(), vec!["nexus", "main", "interview", "create"]);
    }
}
