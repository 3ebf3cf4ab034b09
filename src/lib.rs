pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod persistence;
pub mod tracing_sub;
pub mod window;
pub mod workspace;

pub use config::{DesktopConfig, default_apps};
pub use error::{StoreError, StoreResult};
pub use window::{Command, DesktopEvent, EntityId, FolderId, WindowId, WindowManager};
