use std::time::Duration;

use crate::constants::{COLLISION_TOLERANCE, SAVE_DEBOUNCE, ZONE_PADDING};
use crate::layout::{LayoutType, Point, Size, Viewport};
use crate::window::WindowRecord;

/// Tunables for one desktop instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DesktopConfig {
    pub viewport: Viewport,
    /// Gap between zones and between zones and the viewport edge.
    pub zone_padding: f64,
    /// Max distance, per axis, between two origins that count as the same
    /// slot when deciding whether a drop merges into a folder.
    pub collision_tolerance: f64,
    pub save_debounce: Duration,
    /// Active snap layout. `None` disables layout mode (no zones).
    pub layout: Option<LayoutType>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            zone_padding: ZONE_PADDING,
            collision_tolerance: COLLISION_TOLERANCE,
            save_debounce: SAVE_DEBOUNCE,
            layout: None,
        }
    }
}

impl DesktopConfig {
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_layout(mut self, layout: Option<LayoutType>) -> Self {
        self.layout = layout;
        self
    }
}

/// Compiled-in app catalogue. Every entry starts closed; stacking values
/// are distinct so a fresh desktop already satisfies stacking uniqueness.
pub fn default_apps() -> Vec<WindowRecord> {
    let mut hacker_news = WindowRecord::new(
        "hacker-news",
        "Hacker News",
        Point::new(100.0, 100.0),
        Size::new(800.0, 500.0),
    );
    hacker_news.image_src = "hacker-news-screenshot.png".into();
    hacker_news.image_alt = "Hacker News Screenshot".into();
    hacker_news.z_index = 1;

    let mut todo_list = WindowRecord::new(
        "todo-list",
        "Todo List",
        Point::new(300.0, 200.0),
        Size::new(600.0, 700.0),
    );
    todo_list.image_src = "notes-screenshot.png".into();
    todo_list.image_alt = "Todo List Screenshot".into();
    todo_list.z_index = 2;

    vec![hacker_news, todo_list]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn defaults_start_closed_with_distinct_stacking() {
        let apps = default_apps();
        assert!(apps.iter().all(|app| !app.launched && !app.visible));
        let z: HashSet<_> = apps.iter().map(|app| app.z_index).collect();
        assert_eq!(z.len(), apps.len());
    }

    #[test]
    fn default_config_has_layout_mode_off() {
        let config = DesktopConfig::default();
        assert_eq!(config.layout, None);
        assert_eq!(config.zone_padding, 50.0);
        assert_eq!(config.save_debounce, Duration::from_millis(500));
    }
}
