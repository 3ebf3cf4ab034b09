//! Shared crate-wide constants.

use std::time::Duration;

/// Smallest width a window or folder may be resized to, in CSS pixels.
pub const MIN_WINDOW_WIDTH: f64 = 200.0;

/// Smallest height a window or folder may be resized to, in CSS pixels.
pub const MIN_WINDOW_HEIGHT: f64 = 150.0;

/// Inset between snap zones and between zones and the viewport edges.
///
/// Every zone formula is expressed in terms of this value: outer edges are
/// inset by one full padding and the gutter between two neighbouring zones
/// is also one padding wide.
pub const ZONE_PADDING: f64 = 50.0;

/// Maximum per-axis distance (in pixels) between a stored position and a
/// zone origin for the stored entity to count as occupying that zone.
pub const COLLISION_TOLERANCE: f64 = 10.0;

/// Trailing delay used to coalesce registry writes.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Height of the tab strip drawn above a folder's title bar.
pub const TAB_STRIP_HEIGHT: f64 = 40.0;

/// Side length of the square resize grip anchored at the bottom-right corner.
pub const RESIZE_HANDLE_SIZE: f64 = 16.0;

/// Prefix for generated folder ids.
pub const FOLDER_ID_PREFIX: &str = "folder";

pub const WINDOWS_STORAGE_KEY: &str = "snap_desk.windows";
pub const FOLDERS_STORAGE_KEY: &str = "snap_desk.folders";
pub const CUSTOM_WORKSPACES_STORAGE_KEY: &str = "snap_desk.custom_workspaces";
pub const WORKSPACE_METADATA_STORAGE_KEY: &str = "snap_desk.workspace_metadata";
