pub mod folder;
pub mod interaction;
pub mod registry;
pub mod stacking;

mod window_manager;

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::constants::FOLDER_ID_PREFIX;
use crate::layout::{Point, Rect, Size, ZoneId};

pub use folder::{Folder, FolderRegistry};
pub use interaction::{InteractionController, Release};
pub use registry::WindowRegistry;
pub use window_manager::{Command, FolderView, WindowManager};

/// Stable identifier of an app window.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id: prefix, wall-clock millis and a random suffix, so two
    /// folders created in the same millisecond still differ.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{FOLDER_ID_PREFIX}-{millis}-{}", &suffix[..9]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that can be focused, dragged or snapped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityId {
    Window(WindowId),
    Folder(FolderId),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Window(id) => write!(f, "window:{id}"),
            EntityId::Folder(id) => write!(f, "folder:{id}"),
        }
    }
}

impl From<WindowId> for EntityId {
    fn from(value: WindowId) -> Self {
        Self::Window(value)
    }
}

impl From<FolderId> for EntityId {
    fn from(value: FolderId) -> Self {
        Self::Folder(value)
    }
}

/// Front-to-back paint order; higher is nearer the viewer.
pub type ZIndex = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    pub id: WindowId,
    #[serde(alias = "isLaunched")]
    pub launched: bool,
    #[serde(alias = "isVisible")]
    pub visible: bool,
    pub position: Point,
    pub size: Size,
    pub title: String,
    #[serde(default)]
    pub image_src: String,
    #[serde(default)]
    pub image_alt: String,
    #[serde(default)]
    pub z_index: ZIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dock_icon: Option<String>,
}

impl WindowRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            id: WindowId::new(id),
            launched: false,
            visible: false,
            position,
            size,
            title: title.into(),
            image_src: String::new(),
            image_alt: String::new(),
            z_index: 0,
            dock_icon: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }
}

/// Partial geometry update applied on drag/resize commit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
}

impl GeometryPatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            size: None,
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            position: None,
            size: Some(size),
        }
    }

    pub fn rect(rect: Rect) -> Self {
        Self {
            position: Some(rect.position()),
            size: Some(rect.size()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.size.is_none()
    }
}

/// Notifications for the surrounding UI, drained with
/// [`WindowManager::take_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesktopEvent {
    ZoneHoverChanged(Option<ZoneId>),
    DragStarted(EntityId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_folder_ids_are_prefixed_and_unique() {
        let a = FolderId::generate();
        let b = FolderId::generate();
        assert!(a.as_str().starts_with("folder-"));
        assert_ne!(a, b);
    }

    #[test]
    fn window_record_reads_legacy_flag_names() {
        let json = r#"{
            "id": "notes",
            "isLaunched": true,
            "isVisible": false,
            "position": {"x": 1, "y": 2},
            "size": {"width": 300, "height": 200},
            "title": "Notes",
            "imageSrc": "notes.png",
            "imageAlt": "Notes",
            "zIndex": 4
        }"#;
        let record: WindowRecord = serde_json::from_str(json).unwrap();
        assert!(record.launched);
        assert!(!record.visible);
        assert_eq!(record.z_index, 4);
        assert_eq!(record.dock_icon, None);
    }

    #[test]
    fn window_record_writes_camel_case() {
        let mut record = WindowRecord::new("a", "A", Point::new(0.0, 0.0), Size::new(300.0, 200.0));
        record.dock_icon = Some("*".into());
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("zIndex").is_some());
        assert!(value.get("imageSrc").is_some());
        assert_eq!(value["dockIcon"], "*");
    }

    #[test]
    fn empty_patch() {
        assert!(GeometryPatch::default().is_empty());
        assert!(!GeometryPatch::size(Size::new(1.0, 1.0)).is_empty());
    }
}
