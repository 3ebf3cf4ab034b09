//! Stacking order shared by windows and folders.

use super::{FolderRegistry, WindowRegistry, ZIndex};

/// Next free stacking value: one above the maximum across both registries.
pub fn next_z(windows: &WindowRegistry, folders: &FolderRegistry) -> ZIndex {
    windows.max_z().max(folders.max_z()).saturating_add(1)
}
